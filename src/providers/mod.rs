pub mod openexchangerates;
pub mod util;

pub use openexchangerates::OpenExchangeRates;

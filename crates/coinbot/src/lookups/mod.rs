//! The four chat operations
//!
//! Each lookup holds its data sources behind trait objects and is stateless
//! between calls; every invocation re-fetches from the upstream service.

pub mod chart;
pub mod convert;
pub mod news;
pub mod price;

pub use chart::{ChartRenderer, HistoryChart};
pub use convert::{Conversion, ConvertRequest, CurrencyConvert};
pub use news::NewsLookup;
pub use price::PriceLookup;

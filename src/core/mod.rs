//! Core business logic abstractions

pub mod cache;
pub mod config;
pub mod currency;
pub mod geo;
pub mod history;
pub mod log;
pub mod rates;

// Re-export main types for cleaner imports
pub use cache::Cache;
pub use currency::CurrencyDescriptor;
pub use geo::GeoLocator;
pub use history::{NoopRateRecorder, RateRecorder, SingleRateRecord};
pub use rates::{ExchangeError, RateFetcher, RateSnapshot};

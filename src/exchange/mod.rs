//! Exchange rate resolution, usage limiting and conversion

pub mod conversion;
pub mod limiter;
pub mod rate_cache;
pub mod resolver;

pub use conversion::{ConversionInfo, effective_rate};
pub use limiter::{Admission, UsageLimiter};
pub use rate_cache::RateCache;
pub use resolver::ExchangeResolver;

pub mod exchange_api;
pub mod geo;

pub use exchange_api::ExchangeApiFetcher;
pub use geo::{GeoChain, IpApiGeoLocator, StaticGeoLocator};

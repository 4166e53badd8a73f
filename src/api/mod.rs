//! HTTP surface: router, request gate, handlers and the error envelope

pub mod client;
pub mod error;
pub mod gate;
pub mod handlers;
pub mod query;
pub mod router;
pub mod state;

pub use error::ApiError;
pub use gate::ClientContext;
pub use query::ApiQuery;
pub use router::build_router;
pub use state::AppState;

//! Axum router configuration
//!
//! ```text
//! /convert       - convert an amount between two currencies
//! /auto-convert  - convert into the caller's local currency
//! /auto-toggle   - convert into the caller's currency or one of a given list
//! /rate          - single conversion rate
//! /latest        - full rate table for a base currency
//! /currencies    - static currency table
//! /status        - liveness
//! ```
//!
//! Every route, including the not-found fallback, passes through the request
//! gate.

use axum::{Router, middleware, routing::get};

use super::gate::{allow_any_origin, request_gate};
use super::handlers::*;
use super::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/convert", get(convert))
        .route("/auto-convert", get(auto_convert))
        .route("/auto-toggle", get(auto_toggle))
        .route("/rate", get(rate))
        .route("/latest", get(latest))
        .route("/currencies", get(currencies))
        .route("/status", get(status))
        .fallback(not_found)
        .layer(middleware::from_fn_with_state(state.clone(), request_gate))
        .layer(middleware::map_response(allow_any_origin))
        .with_state(state)
}

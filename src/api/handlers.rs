use axum::{
    Extension, Json,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
};
use chrono::Utc;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

use super::error::ApiError;
use super::gate::ClientContext;
use super::query::ApiQuery;
use super::state::AppState;
use crate::core::currency::{self, CurrencyDescriptor};
use crate::core::rates::{ExchangeError, RateSnapshot};
use crate::exchange::{ConversionInfo, effective_rate};

const FALLBACK_COUNTRY: &str = "US";
const FALLBACK_CURRENCY: &str = "USD";

#[derive(Serialize)]
struct InfoResponse<T: Serialize> {
    success: bool,
    info: T,
}

fn info<T: Serialize>(info: T) -> Json<InfoResponse<T>> {
    Json(InfoResponse {
        success: true,
        info,
    })
}

/// Treats an absent or empty query value as missing.
fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

fn parse_amount(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|a| a.is_finite())
}

async fn rates_for(state: &AppState, base: &str) -> Result<Arc<RateSnapshot>, ApiError> {
    state.resolver.resolve(base).await?.ok_or_else(|| {
        ApiError::Exchange(ExchangeError::Unavailable(
            "Couldn't get exchange rate".to_string(),
        ))
    })
}

/// Currency for the caller's country, then `default_country`, then the US.
fn caller_currency(country: &str, default_country: Option<&str>) -> &'static CurrencyDescriptor {
    currency::by_country(country)
        .or_else(|| default_country.and_then(currency::by_country))
        .or_else(|| currency::by_country(FALLBACK_COUNTRY))
        .unwrap_or(&US_DOLLAR)
}

static US_DOLLAR: CurrencyDescriptor = CurrencyDescriptor {
    code: "USD",
    symbol: "$",
    display_name: "United States Dollar",
};

#[derive(Debug, Deserialize)]
pub struct ConvertQuery {
    from: Option<String>,
    to: Option<String>,
    amount: Option<String>,
}

pub async fn convert(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<ConvertQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let (Some(from), Some(to), Some(amount)) = (
        present(&query.from),
        present(&query.to),
        present(&query.amount),
    ) else {
        return Err(ApiError::MissingParameters);
    };
    let amount =
        parse_amount(amount).ok_or_else(|| ApiError::BadRequest("Invalid amount".to_string()))?;
    let from = from.to_uppercase();
    let to = to.to_uppercase();

    let snapshot = state
        .resolver
        .resolve(&from)
        .await?
        .ok_or(ApiError::UnsupportedSource)?;
    let target = currency::by_currency(&to).ok_or(ApiError::UnsupportedTarget)?;

    let rate = effective_rate(&snapshot, &to);
    Ok(info(ConversionInfo::new(
        target.symbol,
        target.code,
        target.display_name,
        rate,
        amount,
    )))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AutoConvertQuery {
    default_country: Option<String>,
    amount: Option<String>,
    from: Option<String>,
}

pub async fn auto_convert(
    State(state): State<AppState>,
    Extension(client): Extension<ClientContext>,
    ApiQuery(query): ApiQuery<AutoConvertQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let amount = match present(&query.amount) {
        Some(raw) => {
            parse_amount(raw).ok_or_else(|| ApiError::BadRequest("Invalid amount".to_string()))?
        }
        None => 0.0,
    };
    let from = present(&query.from)
        .unwrap_or(FALLBACK_CURRENCY)
        .to_uppercase();
    let target = caller_currency(&client.country, present(&query.default_country));

    let snapshot = rates_for(&state, &from).await?;
    let rate = effective_rate(&snapshot, target.code);
    Ok(info(ConversionInfo::new(
        target.symbol,
        target.code,
        target.display_name,
        rate,
        amount,
    )))
}

#[derive(Debug, Deserialize)]
pub struct AutoToggleQuery {
    between: Option<String>,
    from: Option<String>,
    amount: Option<String>,
}

/// Parses the `between` list: a JSON array of currency codes. Anything other
/// than an array means US dollars only.
fn parse_between(raw: &str) -> Result<Vec<String>, ApiError> {
    let value: Value = serde_json::from_str(raw)
        .map_err(|e| ApiError::Internal(format!("Invalid between list: {e}")))?;
    match value {
        Value::Array(items) => items
            .into_iter()
            .map(|item| match item {
                Value::String(code) => Ok(code.to_uppercase()),
                _ => Err(ApiError::Internal(
                    "between must only contain strings".to_string(),
                )),
            })
            .collect(),
        _ => Ok(vec![FALLBACK_CURRENCY.to_string()]),
    }
}

pub async fn auto_toggle(
    State(state): State<AppState>,
    Extension(client): Extension<ClientContext>,
    ApiQuery(query): ApiQuery<AutoToggleQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let no_currency = || ApiError::Unprocessable("No currency passed".to_string());
    let (Some(between), Some(from), Some(amount)) = (
        present(&query.between),
        present(&query.from),
        present(&query.amount),
    ) else {
        return Err(no_currency());
    };
    let amount = parse_amount(amount)
        .ok_or_else(|| ApiError::Unprocessable("Invalid amount".to_string()))?;
    let from = from.to_uppercase();
    let candidates = parse_between(between)?;

    let home = caller_currency(&client.country, None);
    let (code, symbol, name) = if candidates.iter().any(|c| c == home.code) {
        (home.code.to_string(), home.symbol, home.display_name.to_string())
    } else {
        let picked = {
            let mut rng = rand::thread_rng();
            candidates.choose(&mut rng).cloned()
        };
        let Some(picked) = picked else {
            return Err(no_currency());
        };
        match currency::by_currency(&picked) {
            Some(d) => (picked, d.symbol, d.display_name.to_string()),
            None => (picked.clone(), "", picked),
        }
    };

    let snapshot = rates_for(&state, &from).await?;
    let rate = effective_rate(&snapshot, &code);
    Ok(info(ConversionInfo::new(symbol, &code, &name, rate, amount)))
}

#[derive(Debug, Deserialize)]
pub struct RateQuery {
    from: Option<String>,
    to: Option<String>,
}

#[derive(Serialize)]
struct RateInfo {
    from: String,
    to: String,
    rate: f64,
}

pub async fn rate(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<RateQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let (Some(from), Some(to)) = (present(&query.from), present(&query.to)) else {
        return Err(ApiError::Unprocessable(
            "Missing required parameters".to_string(),
        ));
    };
    let from = from.to_uppercase();
    let to = to.to_uppercase();
    if currency::by_currency(&to).is_none() {
        return Err(ApiError::UnsupportedTarget);
    }

    let snapshot = rates_for(&state, &from).await?;
    let rate = effective_rate(&snapshot, &to);

    // History is best-effort; a failed write never fails the lookup.
    if let Err(e) = state
        .history
        .record_rate(&from, &to, rate, Utc::now().date_naive())
        .await
    {
        debug!(error = %e, "Discarding rate history write failure");
    }

    Ok(info(RateInfo { from, to, rate }))
}

#[derive(Debug, Deserialize)]
pub struct LatestQuery {
    base: Option<String>,
}

#[derive(Serialize)]
struct LatestResponse<'a> {
    success: bool,
    base: &'a str,
    rates: &'a HashMap<String, f64>,
}

pub async fn latest(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<LatestQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let base = present(&query.base)
        .ok_or_else(|| ApiError::Unprocessable("Missing base currency".to_string()))?
        .to_uppercase();

    let snapshot = rates_for(&state, &base).await?;
    let body = serde_json::to_value(LatestResponse {
        success: true,
        base: &snapshot.base_currency,
        rates: &snapshot.rates,
    })
    .map_err(|e| ApiError::Internal(e.to_string()))?;
    Ok(Json(body))
}

pub async fn currencies() -> impl IntoResponse {
    Json(json!({
        "success": true,
        "currencies": currency::all(),
    }))
}

pub async fn status() -> impl IntoResponse {
    Json(json!({
        "success": true,
        "message": "Server is up and running",
    }))
}

pub async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, "Path not found")
}

//! Historical single-rate recording

use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SingleRateRecord {
    pub from: String,
    pub to: String,
    pub rate: f64,
    pub date: NaiveDate,
}

/// Persists at most one rate per currency pair and calendar day.
#[async_trait]
pub trait RateRecorder: Send + Sync {
    async fn record_rate(&self, from: &str, to: &str, rate: f64, date: NaiveDate) -> Result<()>;
}

/// Recorder used when history is disabled.
pub struct NoopRateRecorder;

#[async_trait]
impl RateRecorder for NoopRateRecorder {
    async fn record_rate(&self, _from: &str, _to: &str, _rate: f64, _date: NaiveDate) -> Result<()> {
        Ok(())
    }
}

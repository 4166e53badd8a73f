use crate::core::history::{RateRecorder, SingleRateRecord};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use fjall::{Keyspace, PartitionCreateOptions, PartitionHandle};
use std::path::Path;
use tracing::debug;

const PARTITION: &str = "single_rates";

/// Single-rate history persisted in a fjall partition, one record per
/// `(date, from, to)`.
pub struct DiskRateHistory {
    _keyspace: Keyspace,
    partition: PartitionHandle,
}

impl DiskRateHistory {
    pub fn open(data_path: &Path) -> Result<Self> {
        let dir = data_path.join("history");
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create directory: {}", dir.display()))?;

        let keyspace = fjall::Config::new(&dir)
            .open()
            .with_context(|| format!("Failed to open history store at {}", dir.display()))?;
        let partition = keyspace
            .open_partition(PARTITION, PartitionCreateOptions::default())
            .context("Failed to open history partition")?;

        Ok(Self {
            _keyspace: keyspace,
            partition,
        })
    }

    fn key(date: NaiveDate, from: &str, to: &str) -> String {
        format!("{}:{}:{}", date.format("%Y-%m-%d"), from, to)
    }

    pub fn get(&self, date: NaiveDate, from: &str, to: &str) -> Result<Option<SingleRateRecord>> {
        let key = Self::key(date, from, to);
        match self.partition.get(key.as_bytes())? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }
}

#[async_trait]
impl RateRecorder for DiskRateHistory {
    async fn record_rate(&self, from: &str, to: &str, rate: f64, date: NaiveDate) -> Result<()> {
        let key = Self::key(date, from, to);
        if self.partition.contains_key(key.as_bytes())? {
            debug!(%key, "Rate already recorded for today");
            return Ok(());
        }

        let record = SingleRateRecord {
            from: from.to_string(),
            to: to.to_string(),
            rate,
            date,
        };
        self.partition
            .insert(key.as_bytes(), serde_json::to_vec(&record)?)
            .with_context(|| format!("Failed to record rate {key}"))?;
        debug!(%key, rate, "Recorded single rate");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_records_once_per_day_and_pair() {
        let dir = tempdir().unwrap();
        let history = DiskRateHistory::open(dir.path()).unwrap();
        let today = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();

        assert!(history.get(today, "USD", "EUR").unwrap().is_none());

        history.record_rate("USD", "EUR", 0.92, today).await.unwrap();
        history.record_rate("USD", "EUR", 0.95, today).await.unwrap();

        let stored = history.get(today, "USD", "EUR").unwrap().unwrap();
        assert_eq!(stored.rate, 0.92);
        assert_eq!(stored.date, today);

        let tomorrow = today.succ_opt().unwrap();
        history
            .record_rate("USD", "EUR", 0.95, tomorrow)
            .await
            .unwrap();
        assert_eq!(
            history.get(tomorrow, "USD", "EUR").unwrap().unwrap().rate,
            0.95
        );
    }
}

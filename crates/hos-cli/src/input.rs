//! Batch-file loading for the duty-log commands.

use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use hos_core::{
    CertBatch, DriverId, DutyBatch, decode_certification_batch, decode_duty_batch,
    normalize_certification_batch, normalize_duty_batch,
};

/// Reads, normalizes, and merges one or more duty-event batch files.
pub fn load_duty_batches(paths: &[PathBuf]) -> Result<DutyBatch> {
    let mut merged = DutyBatch::default();
    for path in paths {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let records = decode_duty_batch(&text)
            .with_context(|| format!("invalid duty batch {}", path.display()))?;
        merged.merge(normalize_duty_batch(&records));
    }
    Ok(merged)
}

/// Reads, normalizes, and merges one or more certification batch files.
pub fn load_certification_batches(paths: &[PathBuf]) -> Result<CertBatch> {
    let mut merged = CertBatch::default();
    for path in paths {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let records = decode_certification_batch(&text)
            .with_context(|| format!("invalid certification batch {}", path.display()))?;
        merged.merge(normalize_certification_batch(&records));
    }
    Ok(merged)
}

/// Drops every driver except the requested one, when a filter is given.
pub fn retain_driver<V>(batch: &mut BTreeMap<DriverId, V>, driver: Option<&str>) {
    if let Some(driver) = driver {
        batch.retain(|id, _| id.as_str() == driver);
    }
}

//! Events command for dumping normalized duty events as JSONL.

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::Serialize;

use hos_core::{DutyEvent, Timeline};

use crate::input::{load_duty_batches, retain_driver};

#[derive(Serialize)]
struct EventRow<'a> {
    driver: &'a str,
    #[serde(flatten)]
    event: &'a DutyEvent,
}

pub fn run<W: Write>(writer: &mut W, paths: &[PathBuf], driver: Option<&str>) -> Result<()> {
    let mut batch = load_duty_batches(paths)?;
    retain_driver(&mut batch.events, driver);

    for (driver, events) in batch.events {
        let Some(timeline) = Timeline::from_events(events) else {
            continue;
        };
        for event in timeline.events() {
            let row = EventRow {
                driver: driver.as_str(),
                event,
            };
            serde_json::to_writer(&mut *writer, &row).context("failed to serialize event")?;
            // Stop quietly when the pipe closes, e.g. under `head`.
            if writeln!(writer).is_err() {
                return Ok(());
            }
        }
    }
    Ok(())
}

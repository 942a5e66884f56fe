//! Certs command for certification-gap verdicts.

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};

use hos_core::{CertificationStatus, DriverCertification, compute_certification_reports};

use crate::config::Config;
use crate::input::{load_certification_batches, load_duty_batches, retain_driver};

pub fn run<W: Write>(
    writer: &mut W,
    config: &Config,
    event_paths: &[PathBuf],
    cert_paths: &[PathBuf],
    driver: Option<&str>,
    json: bool,
) -> Result<()> {
    let mut batch = load_duty_batches(event_paths)?;
    retain_driver(&mut batch.events, driver);
    let mut certs = load_certification_batches(cert_paths)?;
    retain_driver(&mut certs.certifications, driver);

    let reports = compute_certification_reports(
        batch.events,
        &certs.certifications,
        &config.engine_config(),
    );

    if json {
        let output =
            serde_json::to_string_pretty(&reports).context("failed to serialize verdicts")?;
        writeln!(writer, "{output}")?;
    } else {
        write_text(writer, &reports)?;
    }
    Ok(())
}

fn write_text<W: Write>(writer: &mut W, reports: &[DriverCertification]) -> Result<()> {
    if reports.is_empty() {
        writeln!(writer, "No duty events found.")?;
        return Ok(());
    }

    for report in reports {
        writeln!(writer, "Driver {}", report.driver)?;
        if report.verdicts.is_empty() {
            writeln!(writer, "  (no shifts)")?;
            continue;
        }
        for verdict in &report.verdicts {
            let status = match verdict.verdict {
                CertificationStatus::Qualified => "QUALIFIED   ",
                CertificationStatus::Disqualified => "DISQUALIFIED",
            };
            writeln!(
                writer,
                "  {}  {status}  {}",
                verdict.shift_start.format("%Y-%m-%d %H:%M"),
                verdict.note,
            )?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use hos_core::{CertificationVerdict, DriverId};

    use super::*;

    #[test]
    fn text_output_aligns_verdict_columns() {
        let reports = vec![DriverCertification {
            driver: DriverId::new("D-102").unwrap(),
            verdicts: vec![
                CertificationVerdict {
                    shift_start: "2024-03-05T06:00:00".parse().unwrap(),
                    verdict: CertificationStatus::Qualified,
                    note: "all prior duty days certified".to_string(),
                },
                CertificationVerdict {
                    shift_start: "2024-03-06T06:00:00".parse().unwrap(),
                    verdict: CertificationStatus::Disqualified,
                    note: "missing timely certification for 1 day, earliest 2024-03-05"
                        .to_string(),
                },
            ],
        }];

        let mut output = Vec::new();
        write_text(&mut output, &reports).unwrap();
        let output = String::from_utf8(output).unwrap();

        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(
            lines,
            vec![
                "Driver D-102",
                "  2024-03-05 06:00  QUALIFIED     all prior duty days certified",
                "  2024-03-06 06:00  DISQUALIFIED  missing timely certification for 1 day, earliest 2024-03-05",
            ]
        );
    }

    #[test]
    fn driver_without_shifts_is_marked() {
        let reports = vec![DriverCertification {
            driver: DriverId::new("D-7").unwrap(),
            verdicts: vec![],
        }];

        let mut output = Vec::new();
        write_text(&mut output, &reports).unwrap();
        let output = String::from_utf8(output).unwrap();
        assert_eq!(output, "Driver D-7\n  (no shifts)\n");
    }
}

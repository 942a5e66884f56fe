//! Report command for per-shift hours and meal-break compliance.

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};

use hos_core::{DriverReport, MealVerdict, NearHome, compute_hours_reports, format_duration};

use crate::config::Config;
use crate::input::{load_duty_batches, retain_driver};

pub fn run<W: Write>(
    writer: &mut W,
    config: &Config,
    paths: &[PathBuf],
    driver: Option<&str>,
    json: bool,
) -> Result<()> {
    let mut batch = load_duty_batches(paths)?;
    retain_driver(&mut batch.events, driver);

    let matcher = config.home_matcher();
    let near_home = matcher
        .as_ref()
        .map(|matcher| matcher as &(dyn NearHome + Sync));
    let mut reports = compute_hours_reports(batch.events, &config.engine_config(), near_home);
    apply_routes(&mut reports, config);

    if json {
        let output =
            serde_json::to_string_pretty(&reports).context("failed to serialize report")?;
        writeln!(writer, "{output}")?;
    } else {
        write_text(writer, &reports)?;
    }
    Ok(())
}

/// Fills in configured route labels, keyed by driver and shift start date.
fn apply_routes(reports: &mut [DriverReport], config: &Config) {
    for report in reports {
        for shift in &mut report.shifts {
            if shift.route.is_none() {
                shift.route = config
                    .route_for(report.driver.as_str(), shift.start)
                    .map(str::to_string);
            }
        }
    }
}

fn write_text<W: Write>(writer: &mut W, reports: &[DriverReport]) -> Result<()> {
    if reports.is_empty() {
        writeln!(writer, "No duty events found.")?;
        return Ok(());
    }

    for report in reports {
        writeln!(writer, "Driver {}", report.driver)?;
        if report.shifts.is_empty() {
            writeln!(writer, "  (no shifts)")?;
            continue;
        }
        for shift in &report.shifts {
            writeln!(
                writer,
                "  Shift {} -> {}",
                shift.start.format("%Y-%m-%d %H:%M"),
                shift.end.format("%Y-%m-%d %H:%M"),
            )?;
            writeln!(
                writer,
                "    Payable:  {}",
                format_duration(shift.payable_minutes * 60_000)
            )?;
            writeln!(
                writer,
                "    Sleeper:  {}",
                format_duration(shift.sleeper_minutes * 60_000)
            )?;
            writeln!(
                writer,
                "    Layover:  {}",
                format_duration(shift.layover_minutes * 60_000)
            )?;
            let meal = match shift.meal.verdict {
                MealVerdict::Compliant => "compliant",
                MealVerdict::Violation => "VIOLATION",
            };
            writeln!(writer, "    Meal:     {meal} ({})", shift.meal.note)?;
            if let Some(route) = &shift.route {
                writeln!(writer, "    Route:    {route}")?;
            }
            for note in &shift.notes {
                writeln!(writer, "    Note:     {note}")?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use chrono::NaiveDateTime;
    use hos_core::{DriverId, MealOutcome, MealVerdict, Shift};

    use super::*;

    fn ts(text: &str) -> NaiveDateTime {
        text.parse().unwrap()
    }

    fn sample_shift() -> Shift {
        Shift {
            start: ts("2024-03-04T06:10:00"),
            end: ts("2024-03-04T18:00:00"),
            payable_minutes: 670,
            sleeper_minutes: 0,
            layover_minutes: 0,
            meal: MealOutcome {
                verdict: MealVerdict::Violation,
                note: "no qualifying break at all".to_string(),
            },
            notes: vec!["still on duty at end of data".to_string()],
            route: None,
        }
    }

    #[test]
    fn text_report_lists_shifts_with_notes() {
        let reports = vec![DriverReport {
            driver: DriverId::new("D-102").unwrap(),
            shifts: vec![sample_shift()],
        }];

        let mut output = Vec::new();
        write_text(&mut output, &reports).unwrap();
        let output = String::from_utf8(output).unwrap();

        insta::assert_snapshot!(output, @r"
        Driver D-102
          Shift 2024-03-04 06:10 -> 2024-03-04 18:00
            Payable:  11h 10m
            Sleeper:  0m
            Layover:  0m
            Meal:     VIOLATION (no qualifying break at all)
            Note:     still on duty at end of data
        ");
    }

    #[test]
    fn text_report_handles_empty_input() {
        let mut output = Vec::new();
        write_text(&mut output, &[]).unwrap();
        assert_eq!(String::from_utf8(output).unwrap(), "No duty events found.\n");
    }

    #[test]
    fn routes_are_applied_by_driver_and_start_date() {
        let mut routes = BTreeMap::new();
        routes.insert("D-102|2024-03-04".to_string(), "Route 7".to_string());
        let config = Config {
            routes,
            ..Config::default()
        };

        let mut reports = vec![
            DriverReport {
                driver: DriverId::new("D-102").unwrap(),
                shifts: vec![sample_shift()],
            },
            DriverReport {
                driver: DriverId::new("D-7").unwrap(),
                shifts: vec![sample_shift()],
            },
        ];
        apply_routes(&mut reports, &config);

        assert_eq!(reports[0].shifts[0].route.as_deref(), Some("Route 7"));
        assert_eq!(reports[1].shifts[0].route, None);
    }

    #[test]
    fn route_line_appears_after_meal() {
        let mut shift = sample_shift();
        shift.route = Some("Route 7".to_string());
        let reports = vec![DriverReport {
            driver: DriverId::new("D-102").unwrap(),
            shifts: vec![shift],
        }];

        let mut output = Vec::new();
        write_text(&mut output, &reports).unwrap();
        let output = String::from_utf8(output).unwrap();
        assert!(output.contains("    Route:    Route 7\n"), "got: {output}");
    }
}

//! Configuration loading and management.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use hos_core::{
    CertificationConfig, EngineConfig, HoursConfig, MealConfig, NearHome, SegmenterConfig,
};
use serde::{Deserialize, Serialize};

const MINUTE_MS: i64 = 60_000;

/// Application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Shift-detection and hours thresholds.
    pub thresholds: Thresholds,

    /// Location names treated as the home terminal. An off block near one of
    /// these never counts as a layover.
    pub home_terminals: Vec<String>,

    /// Route labels keyed by `driver|YYYY-MM-DD` of the shift start date.
    pub routes: BTreeMap<String, String>,
}

/// Tunable thresholds, all expressed in whole minutes.
///
/// Meal-break and certification deadlines are statutory and not configurable.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    /// Continuous off time that resets a shift.
    pub reset_minutes: i64,
    /// Shortfall under the reset that still closes a shift with a note.
    pub near_reset_grace_minutes: i64,
    /// Longest duty interruption absorbed into surrounding off time.
    pub blip_max_minutes: i64,
    /// Shortest away-from-home off block that counts as a layover.
    pub min_layover_minutes: i64,
    /// Shift span beyond which a long-shift note is attached.
    pub max_shift_minutes: i64,
    /// Unbroken duty run beyond which a continuous-duty note is attached.
    pub max_continuous_on_minutes: i64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            reset_minutes: 600,
            near_reset_grace_minutes: 30,
            blip_max_minutes: 10,
            min_layover_minutes: 120,
            max_shift_minutes: 1080,
            max_continuous_on_minutes: 840,
        }
    }
}

impl Config {
    /// Loads configuration from default locations.
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load() -> Result<Self, figment::Error> {
        Self::load_from(None)
    }

    /// Loads configuration, optionally from a specific file.
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, figment::Error> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        // Load from default config location
        if let Some(config_dir) = dirs_config_path() {
            figment = figment.merge(Toml::file(config_dir.join("config.toml")));
        }

        // Load from specified config file
        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        // Load from environment variables (HOS_*, nested fields via __)
        figment = figment.merge(Env::prefixed("HOS_").split("__"));

        figment.extract()
    }

    /// Converts the minute-based thresholds into the engine's configuration.
    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            segmenter: SegmenterConfig {
                reset_ms: self.thresholds.reset_minutes * MINUTE_MS,
                near_reset_grace_ms: self.thresholds.near_reset_grace_minutes * MINUTE_MS,
                blip_max_ms: self.thresholds.blip_max_minutes * MINUTE_MS,
            },
            hours: HoursConfig {
                min_layover_ms: self.thresholds.min_layover_minutes * MINUTE_MS,
                max_shift_ms: self.thresholds.max_shift_minutes * MINUTE_MS,
                max_continuous_on_ms: self.thresholds.max_continuous_on_minutes * MINUTE_MS,
            },
            meal: MealConfig::default(),
            certification: CertificationConfig::default(),
        }
    }

    /// Builds the home-terminal matcher, if any terminals are configured.
    pub fn home_matcher(&self) -> Option<HomeMatcher> {
        let matcher = HomeMatcher::new(&self.home_terminals);
        if matcher.terminals.is_empty() {
            None
        } else {
            Some(matcher)
        }
    }

    /// Looks up the route label for a driver's shift, if one is configured.
    pub fn route_for(&self, driver: &str, shift_start: NaiveDateTime) -> Option<&str> {
        let key = format!("{driver}|{}", shift_start.date().format("%Y-%m-%d"));
        self.routes.get(&key).map(String::as_str)
    }
}

/// Case-insensitive substring matcher for home-terminal locations.
#[derive(Debug, Clone)]
pub struct HomeMatcher {
    terminals: Vec<String>,
}

impl HomeMatcher {
    fn new(terminals: &[String]) -> Self {
        let terminals = terminals
            .iter()
            .map(|terminal| terminal.trim().to_lowercase())
            .filter(|terminal| !terminal.is_empty())
            .collect();
        Self { terminals }
    }

    /// Returns true if the location names any configured home terminal.
    pub fn matches(&self, location: &str) -> bool {
        let location = location.to_lowercase();
        self.terminals
            .iter()
            .any(|terminal| location.contains(terminal.as_str()))
    }
}

impl NearHome for HomeMatcher {
    fn is_near_home(&self, location: &str) -> bool {
        self.matches(location)
    }
}

/// Returns the platform-specific config directory for hos.
fn dirs_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("hos"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_thresholds_match_shipped_values() {
        let thresholds = Thresholds::default();
        assert_eq!(thresholds.reset_minutes, 600);
        assert_eq!(thresholds.near_reset_grace_minutes, 30);
        assert_eq!(thresholds.blip_max_minutes, 10);
        assert_eq!(thresholds.min_layover_minutes, 120);
        assert_eq!(thresholds.max_shift_minutes, 1080);
        assert_eq!(thresholds.max_continuous_on_minutes, 840);
    }

    #[test]
    fn test_engine_config_converts_minutes_to_milliseconds() {
        let config = Config::default();
        let engine = config.engine_config();
        assert_eq!(engine.segmenter.reset_ms, 36_000_000);
        assert_eq!(engine.segmenter.near_reset_grace_ms, 1_800_000);
        assert_eq!(engine.segmenter.blip_max_ms, 600_000);
        assert_eq!(engine.hours.min_layover_ms, 7_200_000);
        assert_eq!(engine.hours.max_shift_ms, 64_800_000);
        assert_eq!(engine.hours.max_continuous_on_ms, 50_400_000);
    }

    #[test]
    fn test_home_matcher_is_case_insensitive_substring() {
        let config = Config {
            home_terminals: vec!["Fresno Yard".to_string(), " depot 9 ".to_string()],
            ..Config::default()
        };
        let matcher = config.home_matcher().unwrap();
        assert!(matcher.matches("FRESNO YARD, CA"));
        assert!(matcher.matches("Depot 9 north gate"));
        assert!(!matcher.matches("Bakersfield Hub"));
    }

    #[test]
    fn test_home_matcher_absent_without_terminals() {
        let config = Config::default();
        assert!(config.home_matcher().is_none());

        let blank = Config {
            home_terminals: vec!["   ".to_string()],
            ..Config::default()
        };
        assert!(blank.home_matcher().is_none());
    }

    #[test]
    fn test_route_lookup_is_keyed_by_driver_and_date() {
        let mut routes = BTreeMap::new();
        routes.insert("D-102|2024-03-04".to_string(), "Route 7".to_string());
        let config = Config {
            routes,
            ..Config::default()
        };

        let start = "2024-03-04T06:10:00".parse::<NaiveDateTime>().unwrap();
        assert_eq!(config.route_for("D-102", start), Some("Route 7"));

        let other_day = "2024-03-05T06:10:00".parse::<NaiveDateTime>().unwrap();
        assert_eq!(config.route_for("D-102", other_day), None);
        assert_eq!(config.route_for("D-7", start), None);
    }
}

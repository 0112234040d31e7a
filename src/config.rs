//! Runtime configuration.
//!
//! Sources, lowest precedence first: built-in defaults, a TOML file, then
//! `FOCAS_*` environment variables, then caller overrides (the binary's
//! command-line flags) passed to [`Config::load`].

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::codes::StatusDisplay;
use crate::driver::sim::SimulatorConfig;
use crate::endpoint::ConnectionTarget;
use crate::error::FocasError;
use crate::report::ReportFormat;

pub const ENV_ADDR: &str = "FOCAS_ADDR";
pub const ENV_PORT: &str = "FOCAS_PORT";
pub const ENV_TIMEOUT: &str = "FOCAS_TIMEOUT";
pub const ENV_STATUS_DISPLAY: &str = "FOCAS_STATUS_DISPLAY";
pub const ENV_FORMAT: &str = "FOCAS_FORMAT";
pub const ENV_PAUSE: &str = "FOCAS_PAUSE";

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ReportOptions {
    pub status_display: StatusDisplay,
    pub format: ReportFormat,
    /// Wait for Enter before exiting.
    pub pause_on_exit: bool,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            status_display: StatusDisplay::Raw,
            format: ReportFormat::Text,
            pause_on_exit: true,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub target: ConnectionTarget,
    pub report: ReportOptions,
    /// Extra return-code table merged into the registry.
    pub error_codes: Option<PathBuf>,
    /// Answers for the simulated driver.
    pub simulator: Option<SimulatorConfig>,
}

impl Config {
    /// Parse a TOML document. Missing keys keep their defaults.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Result<Self, FocasError> {
        toml::from_str(s).map_err(|e| FocasError::Config(format!("config parse error: {e}")))
    }

    pub fn from_path(path: &Path) -> Result<Self, FocasError> {
        let s = std::fs::read_to_string(path)
            .map_err(|e| FocasError::Config(format!("read {}: {e}", path.display())))?;
        let mut cfg = Self::from_str(&s)?;
        // relative code tables are resolved next to the config file
        if let (Some(codes), Some(dir)) = (cfg.error_codes.as_mut(), path.parent()) {
            if codes.is_relative() {
                *codes = dir.join(&*codes);
            }
        }
        Ok(cfg)
    }

    /// Defaults, then `path` if given, then the process environment, then
    /// `overrides`; validated last.
    pub fn load<F>(path: Option<&Path>, overrides: F) -> Result<Self, FocasError>
    where
        F: FnOnce(&mut Self),
    {
        let mut cfg = match path {
            Some(p) => Self::from_path(p)?,
            None => Self::default(),
        };
        cfg.apply_env_with(|k| std::env::var(k).ok())?;
        overrides(&mut cfg);
        cfg.validate()?;
        Ok(cfg)
    }

    /// Apply `FOCAS_*` overrides read through `get`.
    pub fn apply_env_with<F>(&mut self, get: F) -> Result<(), FocasError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(addr) = get(ENV_ADDR) {
            self.target.address = addr;
        }
        if let Some(port) = get(ENV_PORT) {
            self.target.port = parse_env(ENV_PORT, &port)?;
        }
        if let Some(timeout) = get(ENV_TIMEOUT) {
            self.target.timeout = parse_env(ENV_TIMEOUT, &timeout)?;
        }
        if let Some(display) = get(ENV_STATUS_DISPLAY) {
            self.report.status_display = display
                .parse()
                .map_err(|e| FocasError::Config(format!("{ENV_STATUS_DISPLAY}: {e}")))?;
        }
        if let Some(format) = get(ENV_FORMAT) {
            self.report.format = format
                .parse()
                .map_err(|e| FocasError::Config(format!("{ENV_FORMAT}: {e}")))?;
        }
        if let Some(pause) = get(ENV_PAUSE) {
            self.report.pause_on_exit = parse_flag(ENV_PAUSE, &pause)?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), FocasError> {
        self.target.validate()
    }
}

fn parse_env<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, FocasError>
where
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e| FocasError::Config(format!("{key}={value}: {e}")))
}

fn parse_flag(key: &str, value: &str) -> Result<bool, FocasError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" => Ok(true),
        "0" | "false" | "no" => Ok(false),
        _ => Err(FocasError::Config(format!(
            "{key}={value}: expected true|false|1|0|yes|no"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn defaults_match_reference_target() {
        let cfg = Config::default();
        assert_eq!(cfg.target.address, "192.168.0.100");
        assert_eq!(cfg.target.port, 8193);
        assert_eq!(cfg.target.timeout, 6);
        assert_eq!(cfg.report.status_display, StatusDisplay::Raw);
        assert_eq!(cfg.report.format, ReportFormat::Text);
        assert!(cfg.report.pause_on_exit);
        assert!(cfg.simulator.is_none());
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let cfg = Config::from_str(
            r#"
[target]
address = "10.1.2.3"

[report]
status_display = "decoded"

[simulator]
mode_code = 5
"#,
        )
        .expect("parse config");
        assert_eq!(cfg.target.address, "10.1.2.3");
        assert_eq!(cfg.target.port, 8193);
        assert_eq!(cfg.report.status_display, StatusDisplay::Decoded);
        assert!(cfg.report.pause_on_exit);
        let sim = cfg.simulator.expect("simulator section");
        assert_eq!(sim.mode_code, 5);
        assert_eq!(sim.handle, SimulatorConfig::default().handle);
    }

    #[test]
    fn bad_toml_is_config_error() {
        let err = Config::from_str("[target]\nport = \"many\"").expect_err("should fail");
        assert!(matches!(err, FocasError::Config(_)));
    }

    #[test]
    fn env_overrides() {
        let env: HashMap<&str, &str> = [
            (ENV_ADDR, "172.16.0.9"),
            (ENV_PORT, "8194"),
            (ENV_TIMEOUT, "10"),
            (ENV_STATUS_DISPLAY, "decoded"),
            (ENV_FORMAT, "json"),
            (ENV_PAUSE, "0"),
        ]
        .into_iter()
        .collect();
        let mut cfg = Config::default();
        cfg.apply_env_with(|k| env.get(k).map(|v| (*v).to_string()))
            .expect("apply env");
        assert_eq!(cfg.target.address, "172.16.0.9");
        assert_eq!(cfg.target.port, 8194);
        assert_eq!(cfg.target.timeout, 10);
        assert_eq!(cfg.report.status_display, StatusDisplay::Decoded);
        assert_eq!(cfg.report.format, ReportFormat::Json);
        assert!(!cfg.report.pause_on_exit);
    }

    #[test]
    fn env_pause_ignores_case() {
        let cases = [
            ("TRUE", true),
            ("Yes", true),
            ("1", true),
            ("False", false),
            ("NO", false),
        ];
        for (value, expected) in cases {
            let mut cfg = Config::default();
            cfg.report.pause_on_exit = !expected;
            cfg.apply_env_with(|k| (k == ENV_PAUSE).then(|| value.to_string()))
                .expect("apply env");
            assert_eq!(cfg.report.pause_on_exit, expected, "FOCAS_PAUSE={value}");
        }
    }

    #[test]
    fn bad_env_pause_is_rejected() {
        let mut cfg = Config::default();
        let res = cfg.apply_env_with(|k| (k == ENV_PAUSE).then(|| "sometimes".to_string()));
        assert!(matches!(res, Err(FocasError::Config(_))));
        assert!(cfg.report.pause_on_exit);
    }

    #[test]
    fn bad_env_port_is_rejected() {
        let mut cfg = Config::default();
        let res = cfg.apply_env_with(|k| (k == ENV_PORT).then(|| "99999".to_string()));
        assert!(matches!(res, Err(FocasError::Config(_))));
    }
}

use std::{env, fmt, fs, path, time::Duration};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::monitoring::ProbeKind;

/// One day
const MAX_INTERVAL_SECS: u64 = 86_400;
/// Lower bound for `input_window_ms`
const MIN_INPUT_WINDOW_MS: u64 = 100;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Plain text file holding one host name per line
    pub store_path: path::PathBuf,
    pub log_file: path::PathBuf,
    pub check_interval_secs: u64,
    /// How long each cycle waits for operator input
    pub input_window_ms: u64,
    /// Hosts added when the store is empty
    pub default_targets: Vec<String>,
    pub probe: Probe,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Probe {
    pub kind: ProbeKind,
    pub timeout_secs: u64,
    /// Port used when `kind = "tcp"`
    pub tcp_port: u16,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            store_path: "domains.txt".into(),
            log_file: "hostwatch.log".into(),
            check_interval_secs: 600,
            input_window_ms: 3000,
            default_targets: vec!["example.com".into(), "google.com".into()],
            probe: Probe::default(),
        }
    }
}

impl Default for Probe {
    fn default() -> Self {
        Self { kind: ProbeKind::Ping, timeout_secs: 2, tcp_port: 443 }
    }
}

impl fmt::Display for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rows: [(&str, &dyn fmt::Display); 5] = [
            ("Store", &self.store_path.display()),
            ("Log File", &self.log_file.display()),
            ("Check Interval (s)", &self.check_interval_secs),
            ("Input Window (ms)", &self.input_window_ms),
            ("Probe", &self.probe),
        ];

        writeln!(f, "Current Internal Configuration State:")?;
        for (label, value) in rows {
            writeln!(f, "  {}: {}", label, value)?;
        }
        writeln!(f, "  Default Targets: {}", self.default_targets.join(", "))
    }
}

impl fmt::Display for Probe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (timeout {} s", self.kind, self.timeout_secs)?;
        if self.kind == ProbeKind::Tcp {
            write!(f, ", port {}", self.tcp_port)?;
        }
        write!(f, ")")
    }
}

impl Config {
    /// Load the config from `optional_path`, or the default location.
    ///
    /// A missing file is created with the defaults. The result is validated
    /// before it is returned.
    pub fn from_config(optional_path: Option<impl AsRef<path::Path>>) -> Result<Self, ConfigError> {
        let config_path = match optional_path {
            // Always read and write a .toml file, whatever name was passed
            Some(path) => path.as_ref().with_extension("toml"),
            None => Self::default_path()?,
        };

        let config: Self = if config_path.exists() {
            let raw_string = fs::read_to_string(&config_path)
                .map_err(|source| ConfigError::ReadFailed { path: config_path.clone(), source })?;
            toml::from_str(raw_string.as_str())
                .map_err(|source| ConfigError::ParseFailed { path: config_path.clone(), source })?
        } else {
            let config = Self::default();
            config.write_config(&config_path)?;
            config
        };

        config.validate()?;
        Ok(config)
    }

    /// `$XDG_CONFIG_HOME/hostwatch/config.toml`, else under `~/.config`
    fn default_path() -> Result<path::PathBuf, ConfigError> {
        env::var_os("XDG_CONFIG_HOME")
            .map(path::PathBuf::from)
            .or_else(|| env::home_dir().map(|home| home.join(".config")))
            .map(|base| base.join("hostwatch").join("config.toml"))
            .ok_or(ConfigError::ConfigPathUnavailable)
    }

    /// Serialize and write a config to a file
    pub fn write_config(&self, path: &path::Path) -> Result<(), ConfigError> {
        let config_str: String = toml::to_string_pretty(self)?;

        let write_err = |source| ConfigError::WriteFailed { path: path.to_path_buf(), source };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(write_err)?;
        }

        fs::write(path, config_str).map_err(write_err)
    }

    /// Reject values the monitor cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=MAX_INTERVAL_SECS).contains(&self.check_interval_secs) {
            return Err(ConfigError::Invalid(format!(
                "check_interval_secs must be between 1 and {}",
                MAX_INTERVAL_SECS
            )));
        }
        if self.input_window_ms < MIN_INPUT_WINDOW_MS {
            return Err(ConfigError::Invalid(format!(
                "input_window_ms must be at least {}",
                MIN_INPUT_WINDOW_MS
            )));
        }
        if self.probe.timeout_secs == 0 {
            return Err(ConfigError::Invalid("probe.timeout_secs must be at least 1".into()));
        }
        if self.probe.kind == ProbeKind::Tcp && self.probe.tcp_port == 0 {
            return Err(ConfigError::Invalid("probe.tcp_port must be set for tcp probes".into()));
        }
        Ok(())
    }

    pub fn check_interval(&self) -> Duration {
        Duration::from_secs(self.check_interval_secs.min(MAX_INTERVAL_SECS))
    }

    pub fn input_window(&self) -> Duration {
        Duration::from_millis(self.input_window_ms)
    }
}

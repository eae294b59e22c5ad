// Rust guideline compliant 2026-10-12

//! Configuration management for Libris.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;

/// Output format for command results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    /// JSON output format.
    Json,
    /// Human-readable table format.
    #[default]
    Table,
    /// Plain text format.
    Plain,
}

impl FromStr for OutputFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "json" => Ok(OutputFormat::Json),
            "table" => Ok(OutputFormat::Table),
            "plain" => Ok(OutputFormat::Plain),
            _ => Err(Error::Config(format!(
                "output format must be json, table, or plain, got {s}"
            ))),
        }
    }
}

/// Longest span, in days, any configured period may cover.
pub const MAX_PERIOD_DAYS: u32 = 3_650;

/// Highest fine rate accepted, in minor currency units per day.
pub const MAX_FINE_RATE: i64 = 1_000_000_000;

/// Largest per-item quantity accepted.
pub const MAX_ITEM_QUANTITY: u32 = 100;

/// Work factor for new password hashes.
pub const DEFAULT_PASSWORD_COST: u32 = 12;

/// Accepted range of password work factors.
pub const PASSWORD_COST_RANGE: std::ops::RangeInclusive<u32> = 4..=31;

/// Tunable library policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Fine charged per started day late, in minor currency units.
    pub fine_rate_per_day: i64,

    /// Loan length when a librarian does not give one.
    pub default_loan_days: u32,

    /// Longest loan an order may request.
    pub max_loan_days: u32,

    /// Hold length when a reader does not give one.
    pub default_hold_days: u32,

    /// Longest hold a reader may ask for.
    pub max_hold_days: u32,

    /// Days an approved order waits for pickup.
    pub pickup_days: u32,

    /// Largest quantity per order item.
    pub max_item_quantity: u32,

    /// Login session lifetime.
    pub session_ttl_hours: u32,

    /// How long a command waits for the library lock.
    pub lock_timeout_ms: u64,

    /// bcrypt work factor for new password hashes.
    pub password_cost: u32,

    /// Default output format for commands.
    pub output_format: OutputFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            fine_rate_per_day: crate::fine::DEFAULT_RATE_PER_DAY,
            default_loan_days: 14,
            max_loan_days: 60,
            default_hold_days: 2,
            max_hold_days: 14,
            pickup_days: 2,
            max_item_quantity: 5,
            session_ttl_hours: 24,
            lock_timeout_ms: crate::storage::DEFAULT_LOCK_TIMEOUT_MS,
            password_cost: DEFAULT_PASSWORD_COST,
            output_format: OutputFormat::default(),
        }
    }
}

fn env_number<T: FromStr>(name: &str, slot: &mut T) -> Result<()> {
    if let Ok(val) = std::env::var(name) {
        *slot = val
            .trim()
            .parse()
            .map_err(|_| Error::Config(format!("{name} must be a number, got {val:?}")))?;
    }
    Ok(())
}

impl Config {
    /// Loads configuration from file and environment variables.
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values
    /// 2. Configuration file at `.libris/config.toml`
    /// 3. Environment variables with `LIBRIS_` prefix
    ///
    /// # Arguments
    ///
    /// * `libris_dir` - Path to the `.libris` directory
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Configuration file exists but cannot be read
    /// - Configuration file contains invalid TOML
    /// - Configuration values fail validation
    pub fn load(libris_dir: &Path) -> Result<Self> {
        let mut config = Self::default();

        let config_path = libris_dir.join("config.toml");
        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            config = toml::from_str(&content)
                .map_err(|e| Error::Config(format!("Invalid config file: {e}")))?;
        }

        config.apply_env_overrides()?;
        config.validate()?;

        Ok(config)
    }

    /// Applies `LIBRIS_*` environment variable overrides.
    ///
    /// Supported variables mirror the field names, upper-cased:
    /// `LIBRIS_FINE_RATE_PER_DAY`, `LIBRIS_DEFAULT_LOAN_DAYS`,
    /// `LIBRIS_MAX_LOAN_DAYS`, `LIBRIS_DEFAULT_HOLD_DAYS`,
    /// `LIBRIS_MAX_HOLD_DAYS`, `LIBRIS_PICKUP_DAYS`,
    /// `LIBRIS_MAX_ITEM_QUANTITY`, `LIBRIS_SESSION_TTL_HOURS`,
    /// `LIBRIS_LOCK_TIMEOUT_MS`, `LIBRIS_PASSWORD_COST` and
    /// `LIBRIS_OUTPUT_FORMAT`.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable does not parse.
    fn apply_env_overrides(&mut self) -> Result<()> {
        env_number("LIBRIS_FINE_RATE_PER_DAY", &mut self.fine_rate_per_day)?;
        env_number("LIBRIS_DEFAULT_LOAN_DAYS", &mut self.default_loan_days)?;
        env_number("LIBRIS_MAX_LOAN_DAYS", &mut self.max_loan_days)?;
        env_number("LIBRIS_DEFAULT_HOLD_DAYS", &mut self.default_hold_days)?;
        env_number("LIBRIS_MAX_HOLD_DAYS", &mut self.max_hold_days)?;
        env_number("LIBRIS_PICKUP_DAYS", &mut self.pickup_days)?;
        env_number("LIBRIS_MAX_ITEM_QUANTITY", &mut self.max_item_quantity)?;
        env_number("LIBRIS_SESSION_TTL_HOURS", &mut self.session_ttl_hours)?;
        env_number("LIBRIS_LOCK_TIMEOUT_MS", &mut self.lock_timeout_ms)?;
        env_number("LIBRIS_PASSWORD_COST", &mut self.password_cost)?;

        if let Ok(val) = std::env::var("LIBRIS_OUTPUT_FORMAT") {
            self.output_format = val.trim().parse()?;
        }

        Ok(())
    }

    /// Validates the configuration values.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - fine_rate_per_day is negative or above [`MAX_FINE_RATE`]
    /// - a day count, the session lifetime or max_item_quantity is zero
    /// - a period is longer than [`MAX_PERIOD_DAYS`]
    /// - max_item_quantity exceeds [`MAX_ITEM_QUANTITY`]
    /// - a default exceeds its maximum
    /// - password_cost is outside [`PASSWORD_COST_RANGE`]
    pub fn validate(&self) -> Result<()> {
        if !(0..=MAX_FINE_RATE).contains(&self.fine_rate_per_day) {
            return Err(Error::Config(format!(
                "fine_rate_per_day must be between 0 and {MAX_FINE_RATE}, got {}",
                self.fine_rate_per_day
            )));
        }

        let positive = [
            ("default_loan_days", self.default_loan_days),
            ("max_loan_days", self.max_loan_days),
            ("default_hold_days", self.default_hold_days),
            ("max_hold_days", self.max_hold_days),
            ("pickup_days", self.pickup_days),
            ("max_item_quantity", self.max_item_quantity),
            ("session_ttl_hours", self.session_ttl_hours),
        ];
        if let Some((name, _)) = positive.iter().find(|(_, value)| *value == 0) {
            return Err(Error::Config(format!("{name} must be greater than 0")));
        }

        let periods = [
            ("max_loan_days", self.max_loan_days),
            ("max_hold_days", self.max_hold_days),
            ("pickup_days", self.pickup_days),
            ("session_ttl_hours", self.session_ttl_hours.div_ceil(24)),
        ];
        if let Some((name, _)) = periods.iter().find(|(_, days)| *days > MAX_PERIOD_DAYS) {
            return Err(Error::Config(format!(
                "{name} must not span more than {MAX_PERIOD_DAYS} days"
            )));
        }

        if self.max_item_quantity > MAX_ITEM_QUANTITY {
            return Err(Error::Config(format!(
                "max_item_quantity must be at most {MAX_ITEM_QUANTITY}, got {}",
                self.max_item_quantity
            )));
        }

        for (name, default, max) in [
            ("loan", self.default_loan_days, self.max_loan_days),
            ("hold", self.default_hold_days, self.max_hold_days),
        ] {
            if default > max {
                return Err(Error::Config(format!(
                    "default_{name}_days ({default}) exceeds max_{name}_days ({max})"
                )));
            }
        }

        if !PASSWORD_COST_RANGE.contains(&self.password_cost) {
            return Err(Error::Config(format!(
                "password_cost must be between {} and {}, got {}",
                PASSWORD_COST_RANGE.start(),
                PASSWORD_COST_RANGE.end(),
                self.password_cost
            )));
        }

        Ok(())
    }

    /// Saves the configuration to `config.toml`.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the write fails.
    pub fn save(&self, libris_dir: &Path) -> Result<()> {
        let config_path = libris_dir.join("config.toml");
        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {e}")))?;
        std::fs::write(&config_path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use tempfile::TempDir;

    // Environment variables are process-wide; tests touching them take turns.
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    const VARS: [&str; 11] = [
        "LIBRIS_FINE_RATE_PER_DAY",
        "LIBRIS_DEFAULT_LOAN_DAYS",
        "LIBRIS_MAX_LOAN_DAYS",
        "LIBRIS_DEFAULT_HOLD_DAYS",
        "LIBRIS_MAX_HOLD_DAYS",
        "LIBRIS_PICKUP_DAYS",
        "LIBRIS_MAX_ITEM_QUANTITY",
        "LIBRIS_SESSION_TTL_HOURS",
        "LIBRIS_LOCK_TIMEOUT_MS",
        "LIBRIS_PASSWORD_COST",
        "LIBRIS_OUTPUT_FORMAT",
    ];

    fn clear_all_env_vars() {
        for var in VARS {
            std::env::remove_var(var);
        }
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.fine_rate_per_day, 10_000);
        assert_eq!(config.default_loan_days, 14);
        assert_eq!(config.max_loan_days, 60);
        assert_eq!(config.default_hold_days, 2);
        assert_eq!(config.max_hold_days, 14);
        assert_eq!(config.max_item_quantity, 5);
        assert_eq!(config.password_cost, 12);
        assert_eq!(config.output_format, OutputFormat::Table);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_load_missing_file() {
        let _guard = ENV_LOCK.lock().unwrap();
        clear_all_env_vars();
        let temp_dir = TempDir::new().unwrap();
        let config = Config::load(temp_dir.path()).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_config_load_partial_file() {
        let _guard = ENV_LOCK.lock().unwrap();
        clear_all_env_vars();
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(
            temp_dir.path().join("config.toml"),
            "fine_rate_per_day = 500\noutput_format = \"json\"\n",
        )
        .unwrap();

        let config = Config::load(temp_dir.path()).unwrap();
        assert_eq!(config.fine_rate_per_day, 500);
        assert_eq!(config.output_format, OutputFormat::Json);
        assert_eq!(config.default_loan_days, 14);
    }

    #[test]
    fn test_config_rejects_loan_over_max() {
        let _guard = ENV_LOCK.lock().unwrap();
        clear_all_env_vars();
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(
            temp_dir.path().join("config.toml"),
            "default_loan_days = 90\nmax_loan_days = 60\n",
        )
        .unwrap();

        assert!(matches!(
            Config::load(temp_dir.path()),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_config_rejects_zero_hold() {
        let config = Config {
            default_hold_days: 0,
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_rejects_oversized_periods() {
        for config in [
            Config {
                max_loan_days: MAX_PERIOD_DAYS + 1,
                ..Config::default()
            },
            Config {
                max_hold_days: u32::MAX,
                ..Config::default()
            },
            Config {
                pickup_days: u32::MAX,
                ..Config::default()
            },
            Config {
                session_ttl_hours: u32::MAX,
                ..Config::default()
            },
            Config {
                fine_rate_per_day: i64::MAX,
                ..Config::default()
            },
            Config {
                max_item_quantity: 1_000,
                ..Config::default()
            },
            Config {
                default_hold_days: 20,
                ..Config::default()
            },
        ] {
            assert!(matches!(config.validate(), Err(Error::Config(_))), "{config:?}");
        }

        let longest = Config {
            max_loan_days: MAX_PERIOD_DAYS,
            max_hold_days: MAX_PERIOD_DAYS,
            ..Config::default()
        };
        assert!(longest.validate().is_ok());
    }

    #[test]
    fn test_config_password_cost_range() {
        let cheap = Config {
            password_cost: 4,
            ..Config::default()
        };
        assert!(cheap.validate().is_ok());
        for cost in [3, 32] {
            let config = Config {
                password_cost: cost,
                ..Config::default()
            };
            assert!(config.validate().is_err());
        }
    }

    #[test]
    fn test_config_env_overrides_file() {
        let _guard = ENV_LOCK.lock().unwrap();
        clear_all_env_vars();
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join("config.toml"), "pickup_days = 3\n").unwrap();

        std::env::set_var("LIBRIS_PICKUP_DAYS", "5");
        std::env::set_var("LIBRIS_OUTPUT_FORMAT", "plain");
        let config = Config::load(temp_dir.path()).unwrap();
        assert_eq!(config.pickup_days, 5);
        assert_eq!(config.output_format, OutputFormat::Plain);

        clear_all_env_vars();
    }

    #[test]
    fn test_config_env_invalid_values() {
        let _guard = ENV_LOCK.lock().unwrap();
        clear_all_env_vars();
        let temp_dir = TempDir::new().unwrap();

        std::env::set_var("LIBRIS_FINE_RATE_PER_DAY", "lots");
        assert!(Config::load(temp_dir.path()).is_err());
        clear_all_env_vars();

        std::env::set_var("LIBRIS_OUTPUT_FORMAT", "yaml");
        assert!(Config::load(temp_dir.path()).is_err());
        clear_all_env_vars();
    }

    #[test]
    fn test_config_save_and_load() {
        let _guard = ENV_LOCK.lock().unwrap();
        clear_all_env_vars();
        let temp_dir = TempDir::new().unwrap();

        let original = Config {
            fine_rate_per_day: 2_500,
            session_ttl_hours: 8,
            output_format: OutputFormat::Json,
            ..Config::default()
        };
        original.save(temp_dir.path()).unwrap();

        let loaded = Config::load(temp_dir.path()).unwrap();
        assert_eq!(original, loaded);
    }
}

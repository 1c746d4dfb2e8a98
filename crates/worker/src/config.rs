use std::time::Duration;

use roster_core::lifecycle::config::{
    DEFAULT_DELETE_AFTER_COURSE_END_MONTHS, DEFAULT_DISABLE_AFTER_COURSE_END_DAYS,
    DEFAULT_DISABLE_AFTER_CREATION_DAYS,
};
use roster_core::lifecycle::LifecycleConfig;
use roster_core::roles::ROLE_STUDENT;

/// Default pass interval: once a day.
const DEFAULT_INTERVAL_SECS: u64 = 86_400;

/// Errors raised while reading worker configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("{name} must be set")]
    Missing { name: &'static str },

    #[error("{name} must be a non-negative integer, got {value:?}")]
    InvalidInteger { name: &'static str, value: String },

    #[error("{name} must be true or false, got {value:?}")]
    InvalidBool { name: &'static str, value: String },

    #[error("{name} must be greater than zero")]
    Zero { name: &'static str },
}

/// Worker configuration loaded from environment variables.
///
/// Thresholds default to 21 days, 45 days and 6 months;
/// the exclusion role set is compiled in and not configurable here.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    pub database_url: String,
    /// Thresholds and exclusions for every pass run by this process.
    pub lifecycle: LifecycleConfig,
    /// Role whose holders form the evaluated population.
    pub base_role: String,
    /// Time between passes.
    pub interval: Duration,
    /// Log decisions without writing them.
    pub dry_run: bool,
}

impl WorkerConfig {
    /// Load configuration from the process environment.
    ///
    /// | Env Var                                    | Default   |
    /// |--------------------------------------------|-----------|
    /// | `DATABASE_URL`                             | required  |
    /// | `LIFECYCLE_DISABLE_AFTER_COURSE_END_DAYS`  | `21`      |
    /// | `LIFECYCLE_DISABLE_AFTER_CREATION_DAYS`    | `45`      |
    /// | `LIFECYCLE_DELETE_AFTER_COURSE_END_MONTHS` | `6`       |
    /// | `LIFECYCLE_BASE_ROLE`                      | `student` |
    /// | `LIFECYCLE_INTERVAL_SECS`                  | `86400`   |
    /// | `LIFECYCLE_DRY_RUN`                        | `false`   |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through `lookup`, which maps a variable name to its
    /// value. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let database_url = get("DATABASE_URL").ok_or(ConfigError::Missing {
            name: "DATABASE_URL",
        })?;

        let lifecycle = LifecycleConfig::new(
            parse_u32(
                "LIFECYCLE_DISABLE_AFTER_COURSE_END_DAYS",
                get("LIFECYCLE_DISABLE_AFTER_COURSE_END_DAYS"),
                DEFAULT_DISABLE_AFTER_COURSE_END_DAYS,
            )?,
            parse_u32(
                "LIFECYCLE_DISABLE_AFTER_CREATION_DAYS",
                get("LIFECYCLE_DISABLE_AFTER_CREATION_DAYS"),
                DEFAULT_DISABLE_AFTER_CREATION_DAYS,
            )?,
            parse_u32(
                "LIFECYCLE_DELETE_AFTER_COURSE_END_MONTHS",
                get("LIFECYCLE_DELETE_AFTER_COURSE_END_MONTHS"),
                DEFAULT_DELETE_AFTER_COURSE_END_MONTHS,
            )?,
        );

        let base_role = get("LIFECYCLE_BASE_ROLE").unwrap_or_else(|| ROLE_STUDENT.to_string());

        let interval_secs: u64 = match get("LIFECYCLE_INTERVAL_SECS") {
            None => DEFAULT_INTERVAL_SECS,
            Some(raw) => raw.parse().map_err(|_| ConfigError::InvalidInteger {
                name: "LIFECYCLE_INTERVAL_SECS",
                value: raw.clone(),
            })?,
        };
        if interval_secs == 0 {
            return Err(ConfigError::Zero {
                name: "LIFECYCLE_INTERVAL_SECS",
            });
        }

        let dry_run = parse_bool("LIFECYCLE_DRY_RUN", get("LIFECYCLE_DRY_RUN"))?;

        Ok(Self {
            database_url,
            lifecycle,
            base_role,
            interval: Duration::from_secs(interval_secs),
            dry_run,
        })
    }
}

fn parse_u32(name: &'static str, raw: Option<String>, default: u32) -> Result<u32, ConfigError> {
    match raw {
        None => Ok(default),
        Some(value) => value
            .parse()
            .map_err(|_| ConfigError::InvalidInteger { name, value }),
    }
}

fn parse_bool(name: &'static str, raw: Option<String>) -> Result<bool, ConfigError> {
    let lowered = raw.as_deref().map(str::to_ascii_lowercase);
    match lowered.as_deref() {
        None => Ok(false),
        Some("1" | "true" | "yes" | "on") => Ok(true),
        Some("0" | "false" | "no" | "off") => Ok(false),
        Some(_) => Err(ConfigError::InvalidBool {
            name,
            value: raw.unwrap_or_default(),
        }),
    }
}

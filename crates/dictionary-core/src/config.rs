//! Dictionary configuration.

use std::str::FromStr;

use dictionary_types::well_known;
use thiserror::Error;

/// Environment variable overriding [`DictionaryConfig::max_results`].
pub const MAX_RESULTS_ENV: &str = "CONCEPT_DICTIONARY_MAX_RESULTS";

/// Environment variable overriding [`DictionaryConfig::reference_term_purge`].
pub const REFERENCE_TERM_PURGE_ENV: &str = "CONCEPT_DICTIONARY_REFERENCE_TERM_PURGE";

/// Environment variable overriding [`DictionaryConfig::orderable_classes`],
/// as a comma-separated list.
pub const ORDERABLE_CLASSES_ENV: &str = "CONCEPT_DICTIONARY_ORDERABLE_CLASSES";

/// What to do when purging an entity that is still referenced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PurgePolicy {
    /// Refuse the purge with a conflict.
    #[default]
    Block,
    /// Remove the referencing rows, then purge.
    Cascade,
}

impl FromStr for PurgePolicy {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "block" => Ok(Self::Block),
            "cascade" => Ok(Self::Cascade),
            _ => Err(ConfigError::InvalidValue {
                key: REFERENCE_TERM_PURGE_ENV,
                value: value.to_string(),
            }),
        }
    }
}

/// Errors raised while reading configuration.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A configuration value could not be parsed.
    #[error("invalid value for {key}: {value}")]
    InvalidValue {
        /// Name of the setting.
        key: &'static str,
        /// The rejected value.
        value: String,
    },
}

/// Configuration for dictionary services.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DictionaryConfig {
    /// Upper bound on the number of rows a single search or page returns.
    /// Also the page length used when a caller passes no length.
    pub max_results: usize,
    /// Policy applied when purging a reference term used by concept maps.
    pub reference_term_purge: PurgePolicy,
    /// Names of concept classes whose concepts can be ordered even without a
    /// drug. Compared ignoring case.
    pub orderable_classes: Vec<String>,
}

impl Default for DictionaryConfig {
    fn default() -> Self {
        Self {
            max_results: 1000,
            reference_term_purge: PurgePolicy::Block,
            orderable_classes: vec![well_known::CLASS_TEST.to_string()],
        }
    }
}

impl DictionaryConfig {
    /// Creates a config that cascades reference-term purges to concept maps.
    pub fn cascading() -> Self {
        Self {
            reference_term_purge: PurgePolicy::Cascade,
            ..Self::default()
        }
    }

    /// Builds a config from the process environment, falling back to defaults
    /// for unset variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(value) = lookup(MAX_RESULTS_ENV) {
            config.max_results = value
                .trim()
                .parse()
                .ok()
                .filter(|max: &usize| *max > 0)
                .ok_or(ConfigError::InvalidValue {
                    key: MAX_RESULTS_ENV,
                    value,
                })?;
        }

        if let Some(value) = lookup(REFERENCE_TERM_PURGE_ENV) {
            config.reference_term_purge = value.parse()?;
        }

        if let Some(value) = lookup(ORDERABLE_CLASSES_ENV) {
            config.orderable_classes = value
                .split(',')
                .map(str::trim)
                .filter(|class| !class.is_empty())
                .map(str::to_string)
                .collect();
        }

        Ok(config)
    }

    /// Returns true if concepts of the named class are orderable.
    pub fn is_orderable_class(&self, class_name: &str) -> bool {
        self.orderable_classes
            .iter()
            .any(|class| class.eq_ignore_ascii_case(class_name.trim()))
    }

    /// Returns the effective page length for a requested length.
    ///
    /// Absent or zero lengths use `max_results`; larger requests are capped.
    pub fn page_length(&self, requested: Option<usize>) -> usize {
        match requested {
            Some(length) if length > 0 => length.min(self.max_results),
            _ => self.max_results,
        }
    }
}

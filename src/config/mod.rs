//! Resolver configuration

use std::env;

/// Options consumed by the metadata resolution pipeline.
///
/// Passed explicitly into [`crate::MetadataService`]; the pipeline never
/// reads ambient global state.
#[derive(Debug, Clone)]
pub struct ResolverConfig {
    /// Bearer token for the Encora API. Blank disables resolution entirely.
    pub encora_api_key: String,

    /// Bearer token for the StageMedia image API. Blank skips image
    /// enrichment.
    pub stagemedia_api_key: String,

    /// Append the recording master as a director person
    pub add_master_director: bool,

    /// Title template, e.g. `"{show} - {date}"`
    pub title_format: String,

    /// Single character substituted for unknown date components
    pub date_replace_char: String,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            encora_api_key: String::new(),
            stagemedia_api_key: String::new(),
            add_master_director: false,
            title_format: "{show} - {date}".to_string(),
            date_replace_char: "x".to_string(),
        }
    }
}

impl ResolverConfig {
    /// Load configuration from environment variables, falling back to the
    /// defaults for anything unset
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            encora_api_key: env::var("ENCORA_API_KEY").unwrap_or_default(),
            stagemedia_api_key: env::var("STAGEMEDIA_API_KEY").unwrap_or_default(),
            add_master_director: env::var("ADD_MASTER_DIRECTOR")
                .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
                .unwrap_or(false),
            title_format: env::var("TITLE_FORMAT").unwrap_or(defaults.title_format),
            date_replace_char: env::var("DATE_REPLACE_CHAR").unwrap_or(defaults.date_replace_char),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ResolverConfig::default();
        assert_eq!(config.title_format, "{show} - {date}");
        assert_eq!(config.date_replace_char, "x");
        assert!(!config.add_master_director);
        assert!(config.encora_api_key.is_empty());
    }

    const VARS: [&str; 5] = [
        "ENCORA_API_KEY",
        "STAGEMEDIA_API_KEY",
        "ADD_MASTER_DIRECTOR",
        "TITLE_FORMAT",
        "DATE_REPLACE_CHAR",
    ];

    // A single test owns the environment variables, so parallel test threads
    // never observe a partially-set state
    #[test]
    fn test_from_env_overrides_and_defaults() {
        unsafe {
            env::set_var("ENCORA_API_KEY", "enc-key");
            env::set_var("STAGEMEDIA_API_KEY", "stage-key");
            env::set_var("ADD_MASTER_DIRECTOR", "TRUE");
            env::set_var("TITLE_FORMAT", "{show} ({date_iso})");
            env::set_var("DATE_REPLACE_CHAR", "?");
        }
        let config = ResolverConfig::from_env();
        assert_eq!(config.encora_api_key, "enc-key");
        assert_eq!(config.stagemedia_api_key, "stage-key");
        assert!(config.add_master_director);
        assert_eq!(config.title_format, "{show} ({date_iso})");
        assert_eq!(config.date_replace_char, "?");

        unsafe {
            env::set_var("ADD_MASTER_DIRECTOR", "1");
        }
        assert!(ResolverConfig::from_env().add_master_director);
        unsafe {
            env::set_var("ADD_MASTER_DIRECTOR", "0");
        }
        assert!(!ResolverConfig::from_env().add_master_director);

        unsafe {
            for var in VARS {
                env::remove_var(var);
            }
        }
        let config = ResolverConfig::from_env();
        assert!(config.encora_api_key.is_empty());
        assert!(config.stagemedia_api_key.is_empty());
        assert!(!config.add_master_director);
        assert_eq!(config.title_format, "{show} - {date}");
        assert_eq!(config.date_replace_char, "x");
    }
}

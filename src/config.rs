use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

use crate::parsers::{SiteSpec, DEFAULT_FALLBACK_TITLE};

/// Main ingest configuration structure
#[derive(Debug, Deserialize, Clone, Default)]
pub struct IngestConfig {
    /// Taxonomy resolution settings
    #[serde(default)]
    pub resolver: ResolverConfig,
    /// Web extraction settings
    #[serde(default)]
    pub web: WebConfig,
    /// Settings shared by the format parsers
    #[serde(default)]
    pub parsing: ParsingConfig,
}

/// Configuration for the taxonomy entity resolver
#[derive(Debug, Deserialize, Clone)]
pub struct ResolverConfig {
    /// Maximum number of taxonomy lookups in flight for one decomposition
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
    /// Budget for a single lookup in milliseconds
    #[serde(default = "default_lookup_timeout_ms")]
    pub lookup_timeout_ms: u64,
    /// Maximum number of results requested from a fuzzy search
    #[serde(default = "default_search_limit")]
    pub search_limit: usize,
    /// Whether lookups are cached per resolver instance
    #[serde(default = "default_cache")]
    pub cache: bool,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            concurrency: default_concurrency(),
            lookup_timeout_ms: default_lookup_timeout_ms(),
            search_limit: default_search_limit(),
            cache: default_cache(),
        }
    }
}

/// Configuration for web page extraction
#[derive(Debug, Deserialize, Clone)]
pub struct WebConfig {
    /// Title given to a page that yields no recipe
    #[serde(default = "default_title")]
    pub placeholder_title: String,
    /// Domains that get their own site-specific parser
    #[serde(default = "SiteSpec::defaults")]
    pub sites: Vec<SiteSpec>,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            placeholder_title: default_title(),
            sites: SiteSpec::defaults(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ParsingConfig {
    /// Title used when neither content nor file name names a recipe
    #[serde(default = "default_title")]
    pub fallback_title: String,
}

impl Default for ParsingConfig {
    fn default() -> Self {
        Self {
            fallback_title: default_title(),
        }
    }
}

// Default value functions
fn default_concurrency() -> usize {
    4
}

fn default_lookup_timeout_ms() -> u64 {
    2000
}

fn default_search_limit() -> usize {
    1
}

fn default_cache() -> bool {
    true
}

fn default_title() -> String {
    DEFAULT_FALLBACK_TITLE.to_string()
}

impl IngestConfig {
    /// Load configuration from file and environment variables
    ///
    /// See [`load_config`] for the source priority.
    pub fn load() -> Result<Self, ConfigError> {
        load_config()
    }
}

/// Load configuration from file and environment variables
///
/// Configuration is loaded with the following priority (highest to lowest):
/// 1. Environment variables with RECIPE_INGEST__ prefix
/// 2. recipe-ingest.toml file in current directory
/// 3. Default values
///
/// Environment variable format: RECIPE_INGEST__RESOLVER__CONCURRENCY
pub fn load_config() -> Result<IngestConfig, ConfigError> {
    load_config_from("recipe-ingest")
}

/// Same as [`load_config`] with an explicit file name (extension optional).
pub fn load_config_from(file_name: &str) -> Result<IngestConfig, ConfigError> {
    let settings = Config::builder()
        // Optional config file (can be missing)
        .add_source(File::with_name(file_name).required(false))
        .add_source(
            Environment::with_prefix("RECIPE_INGEST")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    settings.try_deserialize()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_values() {
        let config = IngestConfig::default();
        assert_eq!(config.resolver.concurrency, 4);
        assert_eq!(config.resolver.lookup_timeout_ms, 2000);
        assert_eq!(config.resolver.search_limit, 1);
        assert!(config.resolver.cache);
        assert_eq!(config.parsing.fallback_title, "Untitled Recipe");
        assert_eq!(config.web.placeholder_title, "Untitled Recipe");
        assert_eq!(config.web.sites.len(), 8);
    }

    #[test]
    fn test_partial_sections_take_defaults() {
        let settings = Config::builder()
            .add_source(config::File::from_str(
                r#"
                [resolver]
                concurrency = 8

                [[web.sites]]
                domain = "Example.com"
                source = "example"
                "#,
                config::FileFormat::Toml,
            ))
            .build()
            .unwrap();
        let config: IngestConfig = settings.try_deserialize().unwrap();

        assert_eq!(config.resolver.concurrency, 8);
        assert_eq!(config.resolver.lookup_timeout_ms, 2000);
        assert_eq!(config.web.sites.len(), 1);
        assert_eq!(config.web.sites[0].source, "example");
        assert_eq!(config.parsing.fallback_title, "Untitled Recipe");
    }

    #[test]
    fn test_load_config_without_file() {
        let result = load_config_from("definitely-missing-recipe-ingest-config");
        assert!(result.is_ok());
    }
}

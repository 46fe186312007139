use anyhow::{Context, Result};
use indexmap::IndexMap;
use serde::Deserialize;
use std::path::Path;

/// Name of the config file picked up from the working directory
pub const DEFAULT_CONFIG_FILE: &str = "gettext-extract.json";

/// Configuration for gettext-extract
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Opening interpolation delimiter (e.g., "{{")
    #[serde(default = "default_start_delim")]
    pub start_delim: String,

    /// Closing interpolation delimiter (e.g., "}}")
    #[serde(default = "default_end_delim")]
    pub end_delim: String,

    /// File extension (with leading dot) to extraction strategy ("html" or "js")
    #[serde(default = "default_extensions")]
    pub extensions: IndexMap<String, String>,

    /// Catalog header entries, in output order
    #[serde(default = "default_headers")]
    pub headers: IndexMap<String, String>,

    /// Locale whose collation orders the catalog entries
    #[serde(default = "default_sort_locale")]
    pub sort_locale: String,

    /// Glob patterns for input files (CLI only)
    #[serde(default = "default_input")]
    pub input: Vec<String>,

    /// Output directory for catalogs (CLI only)
    #[serde(default = "default_output")]
    pub output: String,
}

fn default_start_delim() -> String {
    "{{".to_string()
}

fn default_end_delim() -> String {
    "}}".to_string()
}

fn default_extensions() -> IndexMap<String, String> {
    [
        (".htm", "html"),
        (".html", "html"),
        (".php", "html"),
        (".phtml", "html"),
        (".js", "js"),
    ]
    .into_iter()
    .map(|(ext, strategy)| (ext.to_string(), strategy.to_string()))
    .collect()
}

fn default_headers() -> IndexMap<String, String> {
    IndexMap::from([
        (
            "Content-Type".to_string(),
            "text/plain; charset=UTF-8".to_string(),
        ),
        ("Content-Transfer-Encoding".to_string(), "8bit".to_string()),
    ])
}

fn default_sort_locale() -> String {
    "und".to_string()
}

fn default_input() -> Vec<String> {
    default_extensions()
        .keys()
        .map(|ext| format!("src/**/*{}", ext))
        .collect()
}

fn default_output() -> String {
    "po".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            start_delim: default_start_delim(),
            end_delim: default_end_delim(),
            extensions: default_extensions(),
            headers: default_headers(),
            sort_locale: default_sort_locale(),
            input: default_input(),
            output: default_output(),
        }
    }
}

impl Config {
    /// Load configuration from a JSON file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Load configuration from a JSON string
    pub fn from_json_string(json_str: &str) -> Result<Self> {
        let config: Config = serde_json::from_str(json_str)
            .with_context(|| "Failed to parse config JSON string")?;
        Ok(config)
    }

    /// Try to load from default config file, or return default config
    pub fn load_or_default<P: AsRef<Path>>(path: Option<P>) -> Result<Self> {
        match path {
            Some(p) => Self::load(p),
            None => {
                let default_path = Path::new(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    Self::load(default_path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_json_equals_default() {
        let config = Config::from_json_string("{}").unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.start_delim, "{{");
        assert_eq!(config.end_delim, "}}");
        assert_eq!(config.extensions.get(".phtml").map(String::as_str), Some("html"));
        assert_eq!(config.extensions.get(".js").map(String::as_str), Some("js"));
        assert_eq!(
            config.headers.keys().collect::<Vec<_>>(),
            vec!["Content-Type", "Content-Transfer-Encoding"]
        );
        assert!(config.input.contains(&"src/**/*.html".to_string()));
    }

    #[test]
    fn test_camel_case_fields() {
        let config = Config::from_json_string(
            r#"{
                "startDelim": "[[",
                "endDelim": "]]",
                "extensions": { ".tpl": "html" },
                "sortLocale": "sv"
            }"#,
        )
        .unwrap();

        assert_eq!(config.start_delim, "[[");
        assert_eq!(config.end_delim, "]]");
        assert_eq!(config.extensions.len(), 1);
        assert_eq!(config.sort_locale, "sv");
        assert_eq!(config.output, "po");
    }

    #[test]
    fn test_invalid_json_has_context() {
        let err = Config::from_json_string("{ nope").unwrap_err();
        assert!(err.to_string().contains("Failed to parse config JSON string"));
    }
}

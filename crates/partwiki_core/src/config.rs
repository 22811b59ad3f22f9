use std::env;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::markup::MarkupOptions;

pub const DEFAULT_URL_PREFIX: &str = "/wiki/";
pub const DEFAULT_PAGE_SUFFIX: &str = ".part";
pub const DEFAULT_HEADER_FILE: &str = "header.html";
pub const DEFAULT_FOOTER_FILE: &str = "footer.html";
pub const DEFAULT_INDEX_PAGE: &str = "index";

#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq, Eq)]
pub struct WikiConfig {
    #[serde(default)]
    pub store: StoreSection,
    #[serde(default)]
    pub markup: MarkupSection,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct StoreSection {
    pub url_prefix: String,
    pub suffix: String,
    pub header: String,
    pub footer: String,
    pub index_page: String,
    pub create_dirs_on_read: bool,
    pub atomic_writes: bool,
}

impl Default for StoreSection {
    fn default() -> Self {
        Self {
            url_prefix: DEFAULT_URL_PREFIX.to_string(),
            suffix: DEFAULT_PAGE_SUFFIX.to_string(),
            header: DEFAULT_HEADER_FILE.to_string(),
            footer: DEFAULT_FOOTER_FILE.to_string(),
            index_page: DEFAULT_INDEX_PAGE.to_string(),
            create_dirs_on_read: true,
            atomic_writes: false,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct MarkupSection {
    pub strict: bool,
}

impl WikiConfig {
    pub fn markup_options(&self) -> MarkupOptions {
        if self.markup.strict {
            MarkupOptions::strict()
        } else {
            MarkupOptions::html()
        }
    }

    /// Apply environment overrides: env > config.
    pub fn with_env_overrides(self) -> Self {
        self.with_env_lookup(|key| env::var(key).ok())
    }

    fn with_env_lookup<F>(mut self, lookup_env: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup_env("PARTWIKI_URL_PREFIX") {
            let trimmed = value.trim();
            if !trimmed.is_empty() {
                self.store.url_prefix = trimmed.to_string();
            }
        }
        if let Some(value) = lookup_env("PARTWIKI_ATOMIC_WRITES")
            && let Some(flag) = parse_flag(&value)
        {
            self.store.atomic_writes = flag;
        }
        if let Some(value) = lookup_env("PARTWIKI_STRICT_MARKUP")
            && let Some(flag) = parse_flag(&value)
        {
            self.markup.strict = flag;
        }
        self
    }
}

/// Load and parse a WikiConfig from a TOML file. Returns default if file doesn't exist.
pub fn load_config(config_path: &Path) -> Result<WikiConfig> {
    if !config_path.exists() {
        return Ok(WikiConfig::default());
    }
    let content = fs::read_to_string(config_path)
        .with_context(|| format!("failed to read {}", config_path.display()))?;
    let parsed: WikiConfig = toml::from_str(&content)
        .with_context(|| format!("failed to parse {}", config_path.display()))?;
    Ok(parsed)
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use tempfile::tempdir;

    #[test]
    fn default_config_matches_page_layout() {
        let config = WikiConfig::default();
        assert_eq!(config.store.url_prefix, "/wiki/");
        assert_eq!(config.store.suffix, ".part");
        assert_eq!(config.store.header, "header.html");
        assert_eq!(config.store.footer, "footer.html");
        assert!(config.store.create_dirs_on_read);
        assert!(!config.store.atomic_writes);
        assert_eq!(config.markup_options(), MarkupOptions::html());
    }

    #[test]
    fn load_config_returns_default_for_missing_file() {
        let config = load_config(Path::new("/nonexistent/partwiki.toml")).expect("load config");
        assert_eq!(config, WikiConfig::default());
    }

    #[test]
    fn load_config_parses_store_section() {
        let temp = tempdir().expect("tempdir");
        let config_path = temp.path().join("partwiki.toml");
        fs::write(
            &config_path,
            r#"
[store]
url_prefix = "/pages/"
suffix = ".html"
atomic_writes = true

[markup]
strict = true
"#,
        )
        .expect("write config");

        let config = load_config(&config_path).expect("load config");
        assert_eq!(config.store.url_prefix, "/pages/");
        assert_eq!(config.store.suffix, ".html");
        assert_eq!(config.store.header, "header.html");
        assert!(config.store.atomic_writes);
        assert_eq!(config.markup_options(), MarkupOptions::strict());
    }

    #[test]
    fn load_config_tolerates_unrelated_sections() {
        let temp = tempdir().expect("tempdir");
        let config_path = temp.path().join("partwiki.toml");
        fs::write(&config_path, "[server]\nlisten = \"127.0.0.1:8080\"\n").expect("write config");

        let config = load_config(&config_path).expect("load config");
        assert_eq!(config, WikiConfig::default());
    }

    #[test]
    fn load_config_returns_error_for_invalid_toml() {
        let temp = tempdir().expect("tempdir");
        let config_path = temp.path().join("partwiki.toml");
        fs::write(&config_path, "[store\nsuffix = \"oops\"").expect("write config");
        let error = load_config(&config_path).expect_err("must fail");
        assert!(error.to_string().contains("failed to parse"));
    }

    #[test]
    fn env_overrides_take_precedence() {
        let env = HashMap::from([
            ("PARTWIKI_URL_PREFIX".to_string(), " /w/ ".to_string()),
            ("PARTWIKI_ATOMIC_WRITES".to_string(), "yes".to_string()),
            ("PARTWIKI_STRICT_MARKUP".to_string(), "maybe".to_string()),
        ]);
        let config = WikiConfig::default().with_env_lookup(|key| env.get(key).cloned());
        assert_eq!(config.store.url_prefix, "/w/");
        assert!(config.store.atomic_writes);
        assert!(!config.markup.strict);
    }
}

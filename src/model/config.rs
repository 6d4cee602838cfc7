use serde::Deserialize;
use std::fs;
use std::path::Path;
use url::Url;

const ENV_CONFIG_PATH: &str = "CREDENCE_CONFIG_PATH";
const DEFAULT_CONFIG_PATH: &str = "config.yaml";

const ENV_API_KEY: &str = "OPENAI_API_KEY";
const ENV_ANALYSIS_MODEL: &str = "ANALYSIS_MODEL";
const ENV_SYNTHESIS_MODEL: &str = "SYNTHESIS_MODEL";

/// Publisher hosts that commonly gate full text behind an abstract page
const DEFAULT_SCHOLARLY_DOMAINS: &[&str] = &[
    "springer.com",
    "springernature.com",
    "wiley.com",
    "tandfonline.com",
    "sagepub.com",
    "sciencedirect.com",
    "elsevier.com",
    "jstor.org",
    "nature.com",
    "acm.org",
    "ieee.org",
    "oup.com",
    "cambridge.org",
    "apa.org",
    "frontiersin.org",
    "mdpi.com",
    "plos.org",
    "nih.gov",
];

/// Acquisition engine configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AcquisitionConfig {
    /// Allowed hosts (whitelist). If empty, all hosts are allowed.
    pub allow: Vec<String>,
    /// Denied hosts (blacklist). Applied before the allow list.
    pub deny: Vec<String>,
    /// Hard cap on document text length, in characters
    pub max_text_length: usize,
    /// Minimum accepted text length for general domains
    pub min_text_length: usize,
    /// Minimum accepted text length for scholarly publisher domains
    pub scholarly_min_text_length: usize,
    /// Host suffixes treated as scholarly publishers
    pub scholarly_domains: Vec<String>,
    /// Timeout for HTML requests
    pub html_timeout_secs: u64,
    /// Timeout for PDF downloads
    pub pdf_timeout_secs: u64,
    /// Largest remote response body read into memory, in bytes
    pub max_fetch_bytes: usize,
    pub user_agent: String,
}

impl Default for AcquisitionConfig {
    fn default() -> Self {
        Self {
            allow: Vec::new(),
            deny: Vec::new(),
            max_text_length: 200_000,
            min_text_length: 100,
            scholarly_min_text_length: 1200,
            scholarly_domains: DEFAULT_SCHOLARLY_DOMAINS
                .iter()
                .map(|d| d.to_string())
                .collect(),
            html_timeout_secs: 20,
            pdf_timeout_secs: 30,
            max_fetch_bytes: 30 * 1024 * 1024,
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                         (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36 credence/0.1"
                .to_string(),
        }
    }
}

impl AcquisitionConfig {
    /// Check if a URL is allowed based on the allow/deny lists
    pub fn is_url_allowed(&self, url: &Url) -> bool {
        let host = match url.host_str() {
            Some(h) => h.to_lowercase(),
            None => return false,
        };

        if self.deny.iter().any(|d| host.contains(&d.to_lowercase())) {
            return false;
        }

        if self.allow.is_empty() {
            return true;
        }

        self.allow.iter().any(|a| host.contains(&a.to_lowercase()))
    }

    /// Whether the host belongs to a configured scholarly publisher
    pub fn is_scholarly_host(&self, host: &str) -> bool {
        let host = host.to_lowercase();
        self.scholarly_domains.iter().any(|domain| {
            let domain = domain.to_lowercase();
            host == domain || host.ends_with(&format!(".{}", domain))
        })
    }
}

/// External reasoning service settings
#[derive(Debug, Clone, Default)]
pub struct ReasoningConfig {
    pub api_key: Option<String>,
    pub analysis_model: Option<String>,
    pub synthesis_model: Option<String>,
}

impl ReasoningConfig {
    pub fn is_configured(&self) -> bool {
        self.api_key.as_deref().is_some_and(|k| !k.trim().is_empty())
    }
}

/// YAML configuration file structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub acquisition: AcquisitionConfig,
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub acquisition: AcquisitionConfig,
    pub reasoning: ReasoningConfig,
    pub port: u16,
    pub host: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            acquisition: AcquisitionConfig::default(),
            reasoning: ReasoningConfig::default(),
            port: 5001,
            host: "127.0.0.1".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from environment and config file
    pub fn from_env() -> Self {
        let port = std::env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(5001);

        let host = std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());

        let config_path = std::env::var(ENV_CONFIG_PATH)
            .unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());

        let acquisition = Self::load_config_file(&config_path)
            .map(|cf| cf.acquisition)
            .unwrap_or_default();

        let reasoning = ReasoningConfig {
            api_key: std::env::var(ENV_API_KEY).ok().filter(|k| !k.trim().is_empty()),
            analysis_model: std::env::var(ENV_ANALYSIS_MODEL).ok(),
            synthesis_model: std::env::var(ENV_SYNTHESIS_MODEL).ok(),
        };

        Self {
            acquisition,
            reasoning,
            port,
            host,
        }
    }

    /// Load configuration from YAML file
    fn load_config_file(path: &str) -> Option<ConfigFile> {
        let path = Path::new(path);

        if !path.exists() {
            tracing::debug!(path = %path.display(), "Config file not found, using defaults");
            return None;
        }

        match fs::read_to_string(path) {
            Ok(contents) => {
                let contents = contents.trim();
                if contents.is_empty() {
                    tracing::debug!(path = %path.display(), "Config file is empty, using defaults");
                    return Some(ConfigFile::default());
                }

                Self::parse_config(contents)
                    .inspect(|_| {
                        tracing::info!(path = %path.display(), "Loaded configuration from file")
                    })
                    .map_err(|e| {
                        tracing::warn!(path = %path.display(), error = %e, "Failed to parse config file, using defaults");
                    })
                    .ok()
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Failed to read config file, using defaults");
                None
            }
        }
    }

    fn parse_config(contents: &str) -> Result<ConfigFile, serde_yaml::Error> {
        serde_yaml::from_str(contents)
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deny_overrides_allow() {
        let config = AcquisitionConfig {
            allow: vec!["example.com".to_string()],
            deny: vec!["bad.example.com".to_string()],
            ..Default::default()
        };

        assert!(config.is_url_allowed(&Url::parse("https://www.example.com/a").unwrap()));
        assert!(!config.is_url_allowed(&Url::parse("https://bad.example.com/a").unwrap()));
        assert!(!config.is_url_allowed(&Url::parse("https://other.org/a").unwrap()));
    }

    #[test]
    fn test_scholarly_host_matches_subdomains_only() {
        let config = AcquisitionConfig::default();
        assert!(config.is_scholarly_host("link.springer.com"));
        assert!(config.is_scholarly_host("onlinelibrary.wiley.com"));
        assert!(!config.is_scholarly_host("notwiley.com"));
        assert!(!config.is_scholarly_host("en.wikipedia.org"));
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let parsed = Config::parse_config(
            "acquisition:\n  scholarly_min_text_length: 2000\n  deny: [\"ads.example\"]\n",
        )
        .unwrap();

        assert_eq!(parsed.acquisition.scholarly_min_text_length, 2000);
        assert_eq!(parsed.acquisition.min_text_length, 100);
        assert_eq!(parsed.acquisition.max_text_length, 200_000);
        assert_eq!(parsed.acquisition.deny, vec!["ads.example".to_string()]);
    }
}

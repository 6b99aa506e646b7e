use crate::error::{CropWiseError, Result};
use dialoguer::{Input, Password};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    pub llm: LlmConfig,
    #[serde(default)]
    pub geocoding: GeocodingConfig,
    #[serde(default)]
    pub planning: PlanningConfig,
}

#[derive(Clone, Deserialize, Serialize)]
pub struct LlmConfig {
    pub api_key: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_llm_base_url")]
    pub base_url: String,
}

fn default_model() -> String {
    "gemini-2.0-flash".into()
}

fn default_llm_base_url() -> String {
    "https://generativelanguage.googleapis.com".into()
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: default_model(),
            base_url: default_llm_base_url(),
        }
    }
}

impl std::fmt::Debug for LlmConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmConfig")
            .field("api_key", &"[REDACTED]")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .finish()
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GeocodingConfig {
    #[serde(default = "default_geocoding_base_url")]
    pub base_url: String,
    /// Nominatim's usage policy requires an identifying User-Agent.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default = "default_accept_language")]
    pub accept_language: String,
}

fn default_geocoding_base_url() -> String {
    "https://nominatim.openstreetmap.org".into()
}

fn default_user_agent() -> String {
    format!("CropWise/{} (cropwise@example.com)", env!("CARGO_PKG_VERSION"))
}

fn default_accept_language() -> String {
    "en".into()
}

impl Default for GeocodingConfig {
    fn default() -> Self {
        Self {
            base_url: default_geocoding_base_url(),
            user_agent: default_user_agent(),
            accept_language: default_accept_language(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PlanningConfig {
    /// Quiet period after the last location edit before estimates refresh.
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
    #[serde(default = "default_geolocation_timeout_secs")]
    pub geolocation_timeout_secs: u64,
}

fn default_debounce_ms() -> u64 {
    2500
}

fn default_geolocation_timeout_secs() -> u64 {
    15
}

impl Default for PlanningConfig {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
            geolocation_timeout_secs: default_geolocation_timeout_secs(),
        }
    }
}

impl PlanningConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn geolocation_timeout(&self) -> Duration {
        Duration::from_secs(self.geolocation_timeout_secs)
    }
}

impl Config {
    pub fn load(config_override: Option<&Path>) -> Result<Self> {
        let config_path = match config_override {
            Some(p) => p.to_path_buf(),
            None => Self::find_config_path()?,
        };

        if !config_path.exists() {
            return Err(CropWiseError::Config(format!(
                "Config file not found at {:?}. Run `cropwise init` to set up.",
                config_path
            )));
        }

        let config_str = std::fs::read_to_string(&config_path)
            .map_err(|e| CropWiseError::Config(format!("Failed to read config: {}", e)))?;

        Self::from_yaml(&config_str)
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        let content = Self::substitute_env_vars(content);

        let config: Config = serde_yaml::from_str(&content)
            .map_err(|e| CropWiseError::Config(format!("Failed to parse config: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.llm.api_key.trim().is_empty() || self.llm.api_key.starts_with("${") {
            return Err(CropWiseError::Config(
                "llm.api_key is empty - set it directly or via ${GEMINI_API_KEY}".into(),
            ));
        }
        if self.geocoding.user_agent.trim().is_empty() {
            return Err(CropWiseError::Config(
                "geocoding.user_agent must identify the application".into(),
            ));
        }
        if self.planning.geolocation_timeout_secs == 0 {
            return Err(CropWiseError::Config(
                "planning.geolocation_timeout_secs must be positive".into(),
            ));
        }
        Ok(())
    }

    /// Search for config.yaml in standard locations.
    /// Returns the path of the first found config, or the XDG default path if none found.
    fn find_config_path() -> Result<PathBuf> {
        let local_config = PathBuf::from("config/config.yaml");
        if local_config.exists() {
            return Ok(local_config);
        }

        if let Some(config_dir) = dirs::config_dir() {
            let xdg_config = config_dir.join("cropwise").join("config.yaml");
            if xdg_config.exists() {
                return Ok(xdg_config);
            }
        }

        Self::default_config_path()
    }

    pub fn exists(config_override: Option<&Path>) -> bool {
        match config_override {
            Some(p) => p.exists(),
            None => Self::find_config_path()
                .map(|p| p.exists())
                .unwrap_or(false),
        }
    }

    /// Default path for writing new config files (~/.config/cropwise/config.yaml).
    pub fn default_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| CropWiseError::Config("Cannot determine config directory".into()))?
            .join("cropwise");
        Ok(config_dir.join("config.yaml"))
    }

    /// Run interactive setup prompts and write config to disk.
    pub fn setup_interactive() -> Result<(Self, PathBuf)> {
        println!();
        println!("Let's set up CropWise!");
        println!();

        println!("Language model (Gemini)");
        let api_key: String = Password::new()
            .with_prompt("  API key (or ${GEMINI_API_KEY})")
            .interact()
            .map_err(|e| CropWiseError::Config(format!("Input error: {}", e)))?;

        let model: String = Input::new()
            .with_prompt("  Model")
            .default(default_model())
            .interact_text()
            .map_err(|e| CropWiseError::Config(format!("Input error: {}", e)))?;

        println!();

        println!("Place search (Nominatim)");
        let user_agent: String = Input::new()
            .with_prompt("  User-Agent (include a contact address)")
            .default(default_user_agent())
            .interact_text()
            .map_err(|e| CropWiseError::Config(format!("Input error: {}", e)))?;

        println!();

        let config = Config {
            llm: LlmConfig {
                api_key,
                model,
                base_url: default_llm_base_url(),
            },
            geocoding: GeocodingConfig {
                user_agent,
                ..GeocodingConfig::default()
            },
            planning: PlanningConfig::default(),
        };
        // an env placeholder is resolved at load time
        if !config.llm.api_key.starts_with("${") {
            config.validate()?;
        }

        let config_path = Self::default_config_path()?;
        config.write_to(&config_path)?;

        println!("Configuration saved to {}", config_path.display());
        println!();

        Ok((config, config_path))
    }

    pub fn write_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let yaml = serde_yaml::to_string(self)
            .map_err(|e| CropWiseError::Config(format!("Failed to serialize config: {}", e)))?;

        let content = format!(
            "# CropWise Configuration\n# Generated by `cropwise init`\n# Environment variable substitution (${{VAR}}) is supported.\n\n{}",
            yaml
        );
        std::fs::write(path, content)?;
        Ok(())
    }

    fn substitute_env_vars(content: &str) -> String {
        let mut result = content.to_string();

        let re = regex_lite::Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}").unwrap();

        for cap in re.captures_iter(content) {
            let var_name = &cap[1];
            let placeholder = &cap[0];
            if let Ok(value) = std::env::var(var_name) {
                result = result.replace(placeholder, &value);
            }
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_config_fills_defaults() {
        let config = Config::from_yaml("llm:\n  api_key: abc123\n").unwrap();
        assert_eq!(config.llm.model, "gemini-2.0-flash");
        assert_eq!(config.geocoding.base_url, "https://nominatim.openstreetmap.org");
        assert_eq!(config.geocoding.accept_language, "en");
        assert_eq!(config.planning.debounce(), Duration::from_millis(2500));
        assert_eq!(config.planning.geolocation_timeout(), Duration::from_secs(15));
    }

    #[test]
    fn env_vars_are_substituted() {
        std::env::set_var("CROPWISE_TEST_KEY_SUBST", "from-env");
        let config = Config::from_yaml("llm:\n  api_key: ${CROPWISE_TEST_KEY_SUBST}\n").unwrap();
        assert_eq!(config.llm.api_key, "from-env");
    }

    #[test]
    fn unresolved_api_key_is_rejected() {
        let err = Config::from_yaml("llm:\n  api_key: ${CROPWISE_TEST_KEY_UNSET_XYZ}\n")
            .unwrap_err();
        assert!(matches!(err, CropWiseError::Config(_)));
    }

    #[test]
    fn debug_redacts_api_key() {
        let config = Config::from_yaml("llm:\n  api_key: super-secret\n").unwrap();
        let debug = format!("{:?}", config);
        assert!(!debug.contains("super-secret"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn load_round_trips_written_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.yaml");

        let mut config = Config::default();
        config.llm.api_key = "k".into();
        config.planning.debounce_ms = 1000;
        config.write_to(&path).unwrap();

        let loaded = Config::load(Some(&path)).unwrap();
        assert_eq!(loaded.planning.debounce_ms, 1000);
        assert_eq!(loaded.llm.api_key, "k");
    }

    #[test]
    fn missing_file_is_config_error() {
        let err = Config::load(Some(Path::new("/definitely/not/here.yaml"))).unwrap_err();
        assert!(err.to_string().contains("cropwise init"));
    }
}

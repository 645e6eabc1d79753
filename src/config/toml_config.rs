use crate::adapters::horizons::{DEFAULT_CENTER, DEFAULT_ENDPOINT, DEFAULT_STEPS};
use crate::config::{validate_provider, DEFAULT_INPUT_PATH, DEFAULT_OUTPUT_PATH};
use crate::core::ConfigProvider;
use crate::domain::model::RefPlane;
use crate::utils::error::{OrbitError, Result};
use crate::utils::validation::Validate;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::OnceLock;
use std::time::Duration;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    pub source: SourceConfig,
    pub ephemeris: EphemerisConfig,
    pub io: IoConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    pub endpoint: String,
    pub timeout_seconds: Option<u64>,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout_seconds: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EphemerisConfig {
    pub center: String,
    pub ref_plane: RefPlane,
    pub steps: u32,
    pub small_body: bool,
}

impl Default for EphemerisConfig {
    fn default() -> Self {
        Self {
            center: DEFAULT_CENTER.to_string(),
            ref_plane: RefPlane::Earth,
            steps: DEFAULT_STEPS,
            small_body: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IoConfig {
    pub input_path: String,
    pub output_path: String,
}

impl Default for IoConfig {
    fn default() -> Self {
        Self {
            input_path: DEFAULT_INPUT_PATH.to_string(),
            output_path: DEFAULT_OUTPUT_PATH.to_string(),
        }
    }
}

fn env_var_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\$\{([^}]+)\}").expect("valid env var pattern"))
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(|e| OrbitError::ConfigError {
            message: format!("cannot read {}: {}", path.as_ref().display(), e),
        })?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| OrbitError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${HORIZONS_URL})，未定義的保留原樣
    fn substitute_env_vars(content: &str) -> String {
        env_var_pattern()
            .replace_all(content, |caps: &regex::Captures| {
                let var_name = &caps[1];
                std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
            })
            .into_owned()
    }
}

impl ConfigProvider for TomlConfig {
    fn api_endpoint(&self) -> &str {
        &self.source.endpoint
    }

    fn input_path(&self) -> &str {
        &self.io.input_path
    }

    fn output_path(&self) -> &str {
        &self.io.output_path
    }

    fn center(&self) -> &str {
        &self.ephemeris.center
    }

    fn ref_plane(&self) -> RefPlane {
        self.ephemeris.ref_plane
    }

    fn step_count(&self) -> u32 {
        self.ephemeris.steps
    }

    fn timeout(&self) -> Option<Duration> {
        self.source.timeout_seconds.map(Duration::from_secs)
    }

    fn small_body_ids(&self) -> bool {
        self.ephemeris.small_body
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        if self.source.timeout_seconds == Some(0) {
            return Err(OrbitError::InvalidConfigValueError {
                field: "source.timeout_seconds".to_string(),
                value: "0".to_string(),
                reason: "Timeout must be at least one second".to_string(),
            });
        }
        validate_provider(self)
    }
}

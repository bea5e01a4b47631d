use crate::adapters::rest_backend::BackendSettings;
use crate::domain::ports::ConfigProvider;
use crate::utils::error::{CizError, Result};
use crate::utils::validation::{
    validate_encoding_label, validate_non_empty_string, validate_range, validate_resolved,
    validate_socket_addr, validate_url, Validate,
};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::Path;
use std::sync::LazyLock;
use std::time::Duration;

static ENV_VAR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([^}]+)\}").expect("valid env var regex"));

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub backend: BackendConfig,
    #[serde(default)]
    pub import: ImportConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    pub url: String,
    pub anon_key: String,
    pub service_key: Option<String>,
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportConfig {
    #[serde(default = "default_max_rows")]
    pub max_rows: usize,
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    #[serde(default = "default_rpc")]
    pub rpc: String,
    #[serde(default = "default_fallback_encoding")]
    pub fallback_encoding: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
    /// CSV 上傳大小上限
    #[serde(default = "default_body_limit")]
    pub body_limit_bytes: usize,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default)]
    pub json: bool,
}

fn default_max_rows() -> usize {
    1000
}

fn default_batch_size() -> usize {
    500
}

fn default_rpc() -> String {
    "import_employees".to_string()
}

fn default_fallback_encoding() -> String {
    "shift_jis".to_string()
}

fn default_bind() -> String {
    "127.0.0.1:8080".to_string()
}

fn default_body_limit() -> usize {
    5 * 1024 * 1024
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            max_rows: default_max_rows(),
            batch_size: default_batch_size(),
            rpc: default_rpc(),
            fallback_encoding: default_fallback_encoding(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            body_limit_bytes: default_body_limit(),
        }
    }
}

impl AppConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(CizError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        let mut config: AppConfig =
            toml::from_str(&processed_content).map_err(|e| CizError::ConfigValidationError {
                field: "toml_parsing".to_string(),
                message: format!("TOML parsing error: {}", e),
            })?;

        // service_key 是選填，環境變數沒設定就當作沒有
        if config
            .backend
            .service_key
            .as_deref()
            .is_some_and(|key| key.is_empty() || key.contains("${"))
        {
            config.backend.service_key = None;
        }

        Ok(config)
    }

    /// 替換環境變數 (例如 ${CIZ_ANON_KEY})，未設定的保持原樣交給驗證處理
    fn substitute_env_vars(content: &str) -> String {
        ENV_VAR_RE
            .replace_all(content, |caps: &regex::Captures| {
                let var_name = &caps[1];
                std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
            })
            .into_owned()
    }

    pub fn validate_config(&self) -> Result<()> {
        validate_resolved("backend.url", &self.backend.url)?;
        validate_url("backend.url", &self.backend.url)?;

        validate_resolved("backend.anon_key", &self.backend.anon_key)?;
        validate_non_empty_string("backend.anon_key", &self.backend.anon_key)?;

        if let Some(timeout) = self.backend.timeout_seconds {
            validate_range("backend.timeout_seconds", timeout, 1, 300)?;
        }

        validate_range("import.max_rows", self.import.max_rows, 1, 100_000)?;
        validate_range("import.batch_size", self.import.batch_size, 1, 5_000)?;
        validate_non_empty_string("import.rpc", &self.import.rpc)?;
        validate_encoding_label("import.fallback_encoding", &self.import.fallback_encoding)?;

        validate_socket_addr("server.bind", &self.server.bind)?;
        validate_range(
            "server.body_limit_bytes",
            self.server.body_limit_bytes,
            1024,
            100 * 1024 * 1024,
        )?;

        Ok(())
    }

    pub fn bind_addr(&self) -> Result<SocketAddr> {
        validate_socket_addr("server.bind", &self.server.bind)
    }

    pub fn import_settings(&self) -> ImportSettings {
        ImportSettings {
            max_rows: self.import.max_rows,
            batch_size: self.import.batch_size,
            fallback_encoding: self.import.fallback_encoding.clone(),
        }
    }

    pub fn backend_settings(&self) -> BackendSettings {
        BackendSettings {
            url: self.backend.url.clone(),
            anon_key: self.backend.anon_key.clone(),
            service_key: self.backend.service_key.clone(),
            timeout: Duration::from_secs(self.backend.timeout_seconds.unwrap_or(30)),
            import_rpc: self.import.rpc.clone(),
        }
    }
}

/// 匯入流程用到的設定子集，可以 clone 給每個上傳請求
#[derive(Debug, Clone)]
pub struct ImportSettings {
    pub max_rows: usize,
    pub batch_size: usize,
    pub fallback_encoding: String,
}

impl Default for ImportSettings {
    fn default() -> Self {
        let import = ImportConfig::default();
        Self {
            max_rows: import.max_rows,
            batch_size: import.batch_size,
            fallback_encoding: import.fallback_encoding,
        }
    }
}

impl ConfigProvider for ImportSettings {
    fn max_rows(&self) -> usize {
        self.max_rows
    }

    fn batch_size(&self) -> usize {
        self.batch_size
    }

    fn fallback_encoding(&self) -> &str {
        &self.fallback_encoding
    }
}

impl ConfigProvider for AppConfig {
    fn max_rows(&self) -> usize {
        self.import.max_rows
    }

    fn batch_size(&self) -> usize {
        self.import.batch_size
    }

    fn fallback_encoding(&self) -> &str {
        &self.import.fallback_encoding
    }
}

impl Validate for AppConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub seed: SeedConfig,
    #[serde(default)]
    pub admin: AdminConfig,
    #[serde(default)]
    pub storefront: StorefrontConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    File,
    Memory,
}

impl std::str::FromStr for StorageBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "file" => Ok(StorageBackend::File),
            "memory" => Ok(StorageBackend::Memory),
            other => Err(format!("unknown storage backend: {other}")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: StorageBackend,
    pub data_dir: String,
    pub products_key: String,
    pub original_key: String,
    pub cart_key: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::File,
            data_dir: "./storage".to_string(),
            products_key: "productSystem_products".to_string(),
            original_key: "productSystem_originalData".to_string(),
            cart_key: "productSystem_cart".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedConfig {
    /// Local path or `http(s)://` URL of the `{ "products": [...] }` document.
    pub source: String,
    pub request_timeout_secs: u64,
    pub sample_count: usize,
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            source: "./data/products.json".to_string(),
            request_timeout_secs: 10,
            sample_count: 10,
        }
    }
}

const DEFAULT_PAGE_SIZE: usize = 10;
const DEFAULT_REFRESH_SECS: u64 = 30;
/// 管理端请求体上限，导入文档和 data URL 图片都走这里
const DEFAULT_MAX_BODY_BYTES: usize = 16 * 1024 * 1024;

fn default_max_body_bytes() -> usize {
    DEFAULT_MAX_BODY_BYTES
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminConfig {
    pub page_size: usize,
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorefrontConfig {
    pub refresh_interval_secs: u64,
}

impl Default for StorefrontConfig {
    fn default() -> Self {
        Self {
            refresh_interval_secs: DEFAULT_REFRESH_SECS,
        }
    }
}

impl Config {
    pub fn from_toml() -> anyhow::Result<Self> {
        let config_path = env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
        use std::io::ErrorKind;

        let config_result = std::fs::read_to_string(&config_path);

        let mut config: Config = match config_result {
            Ok(config_str) => Self::from_toml_str(&config_str)?,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                // 无配置文件：使用默认值，再由环境变量覆盖
                Config::default()
            }
            Err(e) => {
                anyhow::bail!("无法读取配置文件 {config_path}: {e}");
            }
        };

        config.apply_env_overrides();
        config.normalize();
        Ok(config)
    }

    pub fn from_toml_str(config_str: &str) -> anyhow::Result<Self> {
        let mut config: Config =
            toml::from_str(config_str).map_err(|e| anyhow::anyhow!("解析配置文件失败: {e}"))?;
        config.normalize();
        Ok(config)
    }

    /// 零值没有意义（零间隔的定时器会 panic），回退到默认值
    fn normalize(&mut self) {
        if self.admin.page_size == 0 {
            log::warn!("admin.page_size = 0 is invalid, using {DEFAULT_PAGE_SIZE}");
            self.admin.page_size = DEFAULT_PAGE_SIZE;
        }
        if self.admin.max_body_bytes == 0 {
            log::warn!("admin.max_body_bytes = 0 is invalid, using {DEFAULT_MAX_BODY_BYTES}");
            self.admin.max_body_bytes = DEFAULT_MAX_BODY_BYTES;
        }
        if self.storefront.refresh_interval_secs == 0 {
            log::warn!("storefront.refresh_interval_secs = 0 is invalid, using {DEFAULT_REFRESH_SECS}");
            self.storefront.refresh_interval_secs = DEFAULT_REFRESH_SECS;
        }
    }

    fn apply_env_overrides(&mut self) {
        fn get_env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
            env::var(name).ok().and_then(|v| v.parse::<T>().ok())
        }

        if let Ok(v) = env::var("SERVER_HOST") {
            self.server.host = v;
        }
        if let Some(p) = get_env_parse("SERVER_PORT") {
            self.server.port = p;
        }
        if let Some(b) = get_env_parse("STORAGE_BACKEND") {
            self.storage.backend = b;
        }
        if let Ok(v) = env::var("STORAGE_DATA_DIR") {
            self.storage.data_dir = v;
        }
        if let Ok(v) = env::var("SEED_SOURCE") {
            self.seed.source = v;
        }
        if let Some(n) = get_env_parse("SAMPLE_COUNT") {
            self.seed.sample_count = n;
        }
        if let Some(n) = get_env_parse::<usize>("ADMIN_PAGE_SIZE")
            && n > 0
        {
            self.admin.page_size = n;
        }
        if let Some(n) = get_env_parse::<usize>("ADMIN_MAX_BODY_BYTES")
            && n > 0
        {
            self.admin.max_body_bytes = n;
        }
        if let Some(n) = get_env_parse::<u64>("STOREFRONT_REFRESH_SECS")
            && n > 0
        {
            self.storefront.refresh_interval_secs = n;
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 8080,
            },
            storage: StorageConfig::default(),
            seed: SeedConfig::default(),
            admin: AdminConfig::default(),
            storefront: StorefrontConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal_config() {
        let config = Config::from_toml_str(
            r#"
            [server]
            host = "0.0.0.0"
            port = 9000
            "#,
        )
        .unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.admin.page_size, 10);
        assert_eq!(config.storefront.refresh_interval_secs, 30);
        assert_eq!(config.storage.products_key, "productSystem_products");
        assert_eq!(config.storage.backend, StorageBackend::File);
        assert_eq!(config.seed.source, "./data/products.json");
    }

    #[test]
    fn test_parse_full_config() {
        let config = Config::from_toml_str(
            r#"
            [server]
            host = "127.0.0.1"
            port = 8080

            [storage]
            backend = "memory"
            data_dir = "/tmp/showcase"
            products_key = "p"
            original_key = "o"
            cart_key = "c"

            [seed]
            source = "https://example.com/products.json"
            request_timeout_secs = 3
            sample_count = 25

            [admin]
            page_size = 20

            [storefront]
            refresh_interval_secs = 5
            "#,
        )
        .unwrap();
        assert_eq!(config.storage.backend, StorageBackend::Memory);
        assert_eq!(config.seed.sample_count, 25);
        assert_eq!(config.admin.page_size, 20);
        assert_eq!(config.admin.max_body_bytes, 16 * 1024 * 1024);
        assert_eq!(config.storefront.refresh_interval_secs, 5);
    }

    #[test]
    fn test_zero_values_fall_back_to_defaults() {
        let config = Config::from_toml_str(
            r#"
            [server]
            host = "127.0.0.1"
            port = 8080

            [admin]
            page_size = 0
            max_body_bytes = 0

            [storefront]
            refresh_interval_secs = 0
            "#,
        )
        .unwrap();
        assert_eq!(config.admin.page_size, 10);
        assert_eq!(config.admin.max_body_bytes, 16 * 1024 * 1024);
        assert_eq!(config.storefront.refresh_interval_secs, 30);
    }

    #[test]
    fn test_invalid_config_is_error() {
        assert!(Config::from_toml_str("[server]\nport = \"abc\"").is_err());
    }

    #[test]
    fn test_storage_backend_from_str() {
        assert_eq!("FILE".parse::<StorageBackend>(), Ok(StorageBackend::File));
        assert_eq!("memory".parse::<StorageBackend>(), Ok(StorageBackend::Memory));
        assert!("redis".parse::<StorageBackend>().is_err());
    }
}

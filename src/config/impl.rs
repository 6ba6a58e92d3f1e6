use config::{Config, ConfigError, Environment, File};
use std::sync::OnceLock;

use super::AppConfig;

static APP_CONFIG: OnceLock<AppConfig> = OnceLock::new();

impl AppConfig {
    /// 加载配置
    pub fn load() -> Result<Self, ConfigError> {
        let mut builder = Config::builder()
            // 内置默认值，保证没有配置文件时也能启动
            .set_default("app.system_name", "Culture Bridge Daily Report")?
            .set_default("app.environment", "development")?
            .set_default("app.log_level", "info")?
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8080)?
            .set_default("server.unix_socket_path", "")?
            .set_default("server.workers", 0)?
            .set_default("server.max_workers", 16)?
            .set_default("server.timeouts.client_request", 5000)?
            .set_default("server.timeouts.client_disconnect", 1000)?
            .set_default("server.timeouts.keep_alive", 30)?
            .set_default("server.limits.max_payload_size", 1_048_576)?
            .set_default("auth.issuer_url", "")?
            .set_default("auth.jwt_secret", "")?
            .set_default("auth.audience", "authenticated")?
            .set_default("auth.service_role_key", "")?
            .set_default("auth.admin_email", "")?
            .set_default("database.url", "dailyreport.db")?
            .set_default("database.pool_size", 10)?
            .set_default("database.timeout", 10)?
            .set_default("cache.type", "moka")?
            .set_default("cache.default_ttl", 300)?
            .set_default("cache.redis.url", "redis://127.0.0.1:6379")?
            .set_default("cache.redis.key_prefix", "dailyreport:")?
            .set_default("cache.redis.pool_size", 8)?
            .set_default("cache.memory.max_capacity", 10_000)?
            .set_default("cors.max_age", 3600)?
            .set_default("upload.dir", "uploads")?
            .set_default("upload.max_size", 20_971_520)?
            .set_default("upload.signed_url_expiry", 3600)?
            .set_default("upload.public_base_url", "http://127.0.0.1:8080")?
            .set_default("search.gemini_api_key", "")?
            .set_default("search.gemini_model", "gemini-1.5-pro")?
            .set_default(
                "search.gemini_base_url",
                "https://generativelanguage.googleapis.com/v1beta",
            )?
            .set_default("search.request_timeout", 30)?
            .set_default("search.suggestion_limit", 5)?
            // 默认配置文件
            .add_source(File::with_name("config").required(false))
            // 环境特定配置文件
            .add_source(
                File::with_name(&format!(
                    "config.{}",
                    std::env::var("APP_ENV").unwrap_or_else(|_| "development".into())
                ))
                .required(false),
            )
            // 最后加载环境变量覆盖
            .add_source(
                Environment::with_prefix("DAILYREPORT")
                    .separator("__")
                    .try_parsing(true),
            );

        // 兼容部署平台使用的环境变量名
        builder = builder
            .set_override_option("app.environment", std::env::var("APP_ENV").ok())?
            .set_override_option("app.log_level", std::env::var("RUST_LOG").ok())?
            .set_override_option("server.host", std::env::var("SERVER_HOST").ok())?
            .set_override_option("server.port", std::env::var("SERVER_PORT").ok())?
            .set_override_option("server.unix_socket_path", std::env::var("UNIX_SOCKET").ok())?
            .set_override_option("server.workers", std::env::var("CPU_COUNT").ok())?
            .set_override_option("database.url", std::env::var("DATABASE_URL").ok())?
            .set_override_option("cache.redis.url", std::env::var("REDIS_URL").ok())?
            .set_override_option("auth.issuer_url", std::env::var("SUPABASE_URL").ok())?
            .set_override_option("auth.jwt_secret", std::env::var("SUPABASE_JWT_SECRET").ok())?
            .set_override_option(
                "auth.service_role_key",
                std::env::var("SUPABASE_SERVICE_ROLE_KEY").ok(),
            )?
            .set_override_option("auth.admin_email", std::env::var("ADMIN_EMAIL").ok())?
            .set_override_option(
                "search.gemini_api_key",
                std::env::var("GEMINI_API_KEY").ok(),
            )?;

        let config = builder.build()?;
        let mut app_config: AppConfig = config.try_deserialize()?;

        // 处理工作线程数
        if app_config.server.workers == 0 {
            app_config.server.workers = num_cpus::get().min(app_config.server.max_workers);
        }

        if app_config.auth.jwt_secret.is_empty() {
            return Err(ConfigError::Message(
                "auth.jwt_secret (SUPABASE_JWT_SECRET) must be set".to_string(),
            ));
        }

        Ok(app_config)
    }

    /// 获取全局配置实例
    pub fn get() -> &'static AppConfig {
        APP_CONFIG.get_or_init(|| {
            Self::load().unwrap_or_else(|e| {
                eprintln!("Failed to load configuration: {e}");
                std::process::exit(1);
            })
        })
    }

    /// 初始化配置 (在应用启动时调用)
    pub fn init() -> Result<(), ConfigError> {
        let config = Self::load()?;
        APP_CONFIG
            .set(config)
            .map_err(|_| ConfigError::Message("Configuration already initialized".to_string()))?;
        Ok(())
    }

    /// 检查是否为生产环境
    pub fn is_production(&self) -> bool {
        self.app.environment == "production"
    }

    /// 检查是否为开发环境
    pub fn is_development(&self) -> bool {
        self.app.environment == "development"
    }

    /// 获取服务器绑定地址
    pub fn server_bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// 存储签名使用的密钥
    pub fn storage_signing_secret(&self) -> &str {
        if self.auth.service_role_key.is_empty() {
            &self.auth.jwt_secret
        } else {
            &self.auth.service_role_key
        }
    }

    /// 是否启用 AI 资源推荐
    pub fn gemini_enabled(&self) -> bool {
        !self.search.gemini_api_key.is_empty()
    }

    /// 获取 Unix 套接字路径 (如果配置了)
    #[cfg(unix)]
    pub fn unix_socket_path(&self) -> Option<&str> {
        if self.server.unix_socket_path.is_empty() {
            None
        } else {
            Some(&self.server.unix_socket_path)
        }
    }
}

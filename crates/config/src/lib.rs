//! 统一配置中心
//!
//! 提供实时事件服务的全局配置管理，包括：
//! - 部署环境（dev / staging / prod）及其默认值
//! - 投递服务器（长轮询服务）地址与接口超时
//! - Redis 发布订阅连接
//! - JWT 认证
//! - 服务监听地址与可选的数据库连接
//!
//! 加载顺序：环境默认值 -> `APP_CONFIG_FILE` 指定的文件 -> 旧版环境变量
//! （`TORNADO_URL`、`REALTIME_REDIS_URL` 等）-> `APP_` 前缀环境变量。

use std::{env, fmt, time::Duration};

use figment::{
    providers::{Env, Format, Json, Serialized, Toml, Yaml},
    Figment,
};
use serde::{Deserialize, Serialize};

/// 部署环境
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeploymentEnvironment {
    #[default]
    #[serde(alias = "development", alias = "local")]
    Dev,
    #[serde(alias = "stage")]
    Staging,
    #[serde(alias = "production")]
    Prod,
}

impl DeploymentEnvironment {
    /// 从 `APP_ENVIRONMENT` 读取部署环境，缺省为开发环境
    pub fn from_env() -> Self {
        env::var("APP_ENVIRONMENT")
            .ok()
            .and_then(|value| Self::parse(&value))
            .unwrap_or_default()
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "dev" | "development" | "local" => Some(Self::Dev),
            "staging" | "stage" => Some(Self::Staging),
            "prod" | "production" => Some(Self::Prod),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Dev => "dev",
            Self::Staging => "staging",
            Self::Prod => "prod",
        }
    }

    pub fn is_dev(&self) -> bool {
        matches!(self, Self::Dev)
    }
}

impl fmt::Display for DeploymentEnvironment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 全局应用配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// 部署环境
    #[serde(default)]
    pub environment: DeploymentEnvironment,
    /// 服务配置
    pub server: ServerConfig,
    /// 数据库配置，缺省时使用内存存储
    #[serde(default)]
    pub database: Option<DatabaseConfig>,
    /// JWT认证配置
    pub jwt: JwtConfig,
    /// 实时事件配置
    pub realtime: RealtimeConfig,
}

/// 服务器配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// 数据库配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_max_connections() -> u32 {
    5
}

/// JWT配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub expiration_hours: i64,
}

/// 实时事件配置
///
/// 投递服务器的接口地址由 `delivery_url` + `path_prefix` + 动作名拼接而成，
/// 例如 `http://localhost:8888/realtime/register`。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RealtimeConfig {
    /// 投递服务器基础地址
    pub delivery_url: String,
    /// 投递服务器接口路径前缀
    pub path_prefix: String,
    /// 发布订阅后端连接地址
    pub redis_url: String,
    /// 事件发布频道
    pub channel: String,
    pub register_timeout_secs: u64,
    pub heartbeat_timeout_secs: u64,
    pub update_timeout_secs: u64,
    pub publish_timeout_secs: u64,
    /// 客户端建立流式连接时使用的相对路径
    pub stream_path: String,
}

impl RealtimeConfig {
    pub fn for_environment(environment: DeploymentEnvironment) -> Self {
        let (delivery_url, redis_url) = match environment {
            DeploymentEnvironment::Dev => ("http://localhost:8888", "redis://localhost:6379/3"),
            DeploymentEnvironment::Staging => {
                ("http://realtime-staging:8888", "redis://redis-staging:6379/3")
            }
            DeploymentEnvironment::Prod => ("http://realtime:8888", "redis://redis:6379/3"),
        };

        Self {
            delivery_url: delivery_url.to_string(),
            path_prefix: "/realtime".to_string(),
            redis_url: redis_url.to_string(),
            channel: "discussion_events".to_string(),
            register_timeout_secs: 10,
            heartbeat_timeout_secs: 5,
            update_timeout_secs: 5,
            publish_timeout_secs: 5,
            stream_path: "/realtime".to_string(),
        }
    }

    /// 拼接投递服务器某个动作的完整地址
    pub fn endpoint(&self, action: &str) -> String {
        format!(
            "{}{}/{}",
            self.delivery_url.trim_end_matches('/'),
            self.path_prefix.trim_end_matches('/'),
            action.trim_start_matches('/')
        )
    }

    pub fn register_timeout(&self) -> Duration {
        Duration::from_secs(self.register_timeout_secs)
    }

    pub fn heartbeat_timeout(&self) -> Duration {
        Duration::from_secs(self.heartbeat_timeout_secs)
    }

    pub fn update_timeout(&self) -> Duration {
        Duration::from_secs(self.update_timeout_secs)
    }

    pub fn publish_timeout(&self) -> Duration {
        Duration::from_secs(self.publish_timeout_secs)
    }
}

impl AppConfig {
    /// 指定环境下的默认配置
    pub fn defaults_for(environment: DeploymentEnvironment) -> Self {
        let secret = match environment {
            DeploymentEnvironment::Dev => {
                "dev-secret-key-not-for-production-use-minimum-32-chars".to_string()
            }
            // 非开发环境必须显式提供密钥，空值会在 validate 中被拒绝
            _ => String::new(),
        };

        Self {
            environment,
            server: ServerConfig {
                host: if environment.is_dev() {
                    "127.0.0.1".to_string()
                } else {
                    "0.0.0.0".to_string()
                },
                port: 8080,
            },
            database: None,
            jwt: JwtConfig {
                secret,
                expiration_hours: 24,
            },
            realtime: RealtimeConfig::for_environment(environment),
        }
    }

    /// 按 默认值 -> 配置文件 -> 旧版环境变量 -> `APP_*` 环境变量 的优先级加载配置
    pub fn load() -> Result<Self, ConfigError> {
        let environment = DeploymentEnvironment::from_env();
        let mut figment = Figment::from(Serialized::defaults(Self::defaults_for(environment)));

        if let Ok(path) = env::var("APP_CONFIG_FILE") {
            figment = if path.ends_with(".yml") || path.ends_with(".yaml") {
                figment.merge(Yaml::file(path))
            } else if path.ends_with(".json") {
                figment.merge(Json::file(path))
            } else {
                figment.merge(Toml::file(path))
            };
        }

        for (var, key) in LEGACY_VARIABLES {
            if let Ok(value) = env::var(var) {
                figment = figment.merge(Serialized::default(key, value));
            }
        }

        // 部署环境已由 from_env 解析，不再交给 serde 重复解析
        let env = Env::prefixed("APP_")
            .ignore(&["environment", "config_file"])
            .split("__");
        Self::extract_from(figment.merge(env))
    }

    /// 从已组装好的 figment 中提取并校验配置
    pub fn extract_from(figment: Figment) -> Result<Self, ConfigError> {
        let config: AppConfig = figment.extract().map_err(Box::new)?;
        config.validate()?;
        Ok(config)
    }

    /// 验证配置有效性
    pub fn validate(&self) -> Result<(), ConfigError> {
        let realtime = &self.realtime;

        if realtime.delivery_url.is_empty() {
            return Err(ConfigError::invalid("realtime.delivery_url", "cannot be empty"));
        }
        if !realtime.delivery_url.starts_with("http://")
            && !realtime.delivery_url.starts_with("https://")
        {
            return Err(ConfigError::invalid(
                "realtime.delivery_url",
                "must be an http(s) URL",
            ));
        }
        if !realtime.path_prefix.is_empty() && !realtime.path_prefix.starts_with('/') {
            return Err(ConfigError::invalid(
                "realtime.path_prefix",
                "must start with '/'",
            ));
        }
        if !realtime.redis_url.starts_with("redis://") && !realtime.redis_url.starts_with("rediss://")
        {
            return Err(ConfigError::invalid("realtime.redis_url", "must be a redis URL"));
        }
        if realtime.channel.trim().is_empty() {
            return Err(ConfigError::invalid("realtime.channel", "cannot be empty"));
        }

        let timeouts = [
            ("realtime.register_timeout_secs", realtime.register_timeout_secs),
            ("realtime.heartbeat_timeout_secs", realtime.heartbeat_timeout_secs),
            ("realtime.update_timeout_secs", realtime.update_timeout_secs),
            ("realtime.publish_timeout_secs", realtime.publish_timeout_secs),
        ];
        for (field, value) in timeouts {
            if value == 0 {
                return Err(ConfigError::invalid(field, "must be greater than 0"));
            }
        }

        if let Some(database) = &self.database {
            if database.url.is_empty() {
                return Err(ConfigError::invalid("database.url", "cannot be empty"));
            }
            if database.max_connections == 0 {
                return Err(ConfigError::invalid(
                    "database.max_connections",
                    "must be greater than 0",
                ));
            }
        }

        // 验证JWT密钥长度（至少256位/32字节）
        if self.jwt.secret.len() < 32 {
            return Err(ConfigError::invalid(
                "jwt.secret",
                "must be at least 32 characters long",
            ));
        }
        if !self.environment.is_dev()
            && (self.jwt.secret.contains("dev-secret")
                || self.jwt.secret.contains("not-for-production"))
        {
            return Err(ConfigError::invalid(
                "jwt.secret",
                "cannot use development secret outside dev",
            ));
        }

        Ok(())
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::defaults_for(DeploymentEnvironment::Dev)
    }
}

const LEGACY_VARIABLES: [(&str, &str); 4] = [
    ("TORNADO_URL", "realtime.delivery_url"),
    ("REALTIME_REDIS_URL", "realtime.redis_url"),
    ("JWT_SECRET", "jwt.secret"),
    ("DATABASE_URL", "database.url"),
];

/// 配置错误类型
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] Box<figment::Error>),
    #[error("invalid configuration {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

impl ConfigError {
    fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            field,
            reason: reason.into(),
        }
    }
}

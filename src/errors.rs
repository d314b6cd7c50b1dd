use std::fmt;

use actix_web::http::StatusCode;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkpressError {
    InvalidUrl(String),
    InvalidScheme(String),
    UrlNotFound(String),
    UrlExpired(String),
    AlreadyExists(String),
    RateLimitExceeded(String),
    CacheConnection(String),
    CacheOperation(String),
    CachePluginNotFound(String),
    DatabaseConfig(String),
    DatabaseConnection(String),
    DatabaseOperation(String),
    Serialization(String),
    Config(String),
    Internal(String),
}

impl LinkpressError {
    /// 获取错误代码
    pub fn code(&self) -> &'static str {
        match self {
            LinkpressError::InvalidUrl(_) => "E001",
            LinkpressError::InvalidScheme(_) => "E002",
            LinkpressError::UrlNotFound(_) => "E003",
            LinkpressError::UrlExpired(_) => "E004",
            LinkpressError::AlreadyExists(_) => "E005",
            LinkpressError::RateLimitExceeded(_) => "E006",
            LinkpressError::CacheConnection(_) => "E007",
            LinkpressError::CacheOperation(_) => "E008",
            LinkpressError::CachePluginNotFound(_) => "E009",
            LinkpressError::DatabaseConfig(_) => "E010",
            LinkpressError::DatabaseConnection(_) => "E011",
            LinkpressError::DatabaseOperation(_) => "E012",
            LinkpressError::Serialization(_) => "E013",
            LinkpressError::Config(_) => "E014",
            LinkpressError::Internal(_) => "E015",
        }
    }

    /// 获取错误类型名称
    pub fn error_type(&self) -> &'static str {
        match self {
            LinkpressError::InvalidUrl(_) => "Invalid URL",
            LinkpressError::InvalidScheme(_) => "Invalid Scheme",
            LinkpressError::UrlNotFound(_) => "URL Not Found",
            LinkpressError::UrlExpired(_) => "URL Expired",
            LinkpressError::AlreadyExists(_) => "Already Exists",
            LinkpressError::RateLimitExceeded(_) => "Rate Limit Exceeded",
            LinkpressError::CacheConnection(_) => "Cache Connection Error",
            LinkpressError::CacheOperation(_) => "Cache Operation Error",
            LinkpressError::CachePluginNotFound(_) => "Cache Plugin Not Found",
            LinkpressError::DatabaseConfig(_) => "Database Configuration Error",
            LinkpressError::DatabaseConnection(_) => "Database Connection Error",
            LinkpressError::DatabaseOperation(_) => "Database Operation Error",
            LinkpressError::Serialization(_) => "Serialization Error",
            LinkpressError::Config(_) => "Configuration Error",
            LinkpressError::Internal(_) => "Internal Error",
        }
    }

    /// 获取错误详情
    pub fn message(&self) -> &str {
        match self {
            LinkpressError::InvalidUrl(msg)
            | LinkpressError::InvalidScheme(msg)
            | LinkpressError::UrlNotFound(msg)
            | LinkpressError::UrlExpired(msg)
            | LinkpressError::AlreadyExists(msg)
            | LinkpressError::RateLimitExceeded(msg)
            | LinkpressError::CacheConnection(msg)
            | LinkpressError::CacheOperation(msg)
            | LinkpressError::CachePluginNotFound(msg)
            | LinkpressError::DatabaseConfig(msg)
            | LinkpressError::DatabaseConnection(msg)
            | LinkpressError::DatabaseOperation(msg)
            | LinkpressError::Serialization(msg)
            | LinkpressError::Config(msg)
            | LinkpressError::Internal(msg) => msg,
        }
    }

    /// Status code the transport layer should answer with.
    pub fn http_status(&self) -> StatusCode {
        match self {
            LinkpressError::InvalidUrl(_) | LinkpressError::InvalidScheme(_) => {
                StatusCode::BAD_REQUEST
            }
            LinkpressError::UrlNotFound(_) | LinkpressError::UrlExpired(_) => {
                StatusCode::NOT_FOUND
            }
            LinkpressError::AlreadyExists(_) => StatusCode::CONFLICT,
            LinkpressError::RateLimitExceeded(_) => StatusCode::TOO_MANY_REQUESTS,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// 客户端输入或资源状态导致的错误（不是服务端故障）
    pub fn is_client_error(&self) -> bool {
        self.http_status().is_client_error()
    }

    /// 格式化为彩色输出（用于启动失败时的终端输出）
    pub fn format_colored(&self) -> String {
        use colored::Colorize;
        format!(
            "{} {} {}\n  {}",
            "[ERROR]".red().bold(),
            self.code().yellow(),
            self.error_type().red(),
            self.message().white()
        )
    }

    /// 格式化为简洁输出
    pub fn format_simple(&self) -> String {
        format!("{}: {}", self.error_type(), self.message())
    }
}

impl fmt::Display for LinkpressError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for LinkpressError {}

// 便捷的构造函数
impl LinkpressError {
    pub fn invalid_url<T: Into<String>>(msg: T) -> Self {
        LinkpressError::InvalidUrl(msg.into())
    }

    pub fn invalid_scheme<T: Into<String>>(msg: T) -> Self {
        LinkpressError::InvalidScheme(msg.into())
    }

    pub fn url_not_found<T: Into<String>>(msg: T) -> Self {
        LinkpressError::UrlNotFound(msg.into())
    }

    pub fn url_expired<T: Into<String>>(msg: T) -> Self {
        LinkpressError::UrlExpired(msg.into())
    }

    pub fn already_exists<T: Into<String>>(msg: T) -> Self {
        LinkpressError::AlreadyExists(msg.into())
    }

    pub fn rate_limit_exceeded<T: Into<String>>(msg: T) -> Self {
        LinkpressError::RateLimitExceeded(msg.into())
    }

    pub fn cache_connection<T: Into<String>>(msg: T) -> Self {
        LinkpressError::CacheConnection(msg.into())
    }

    pub fn cache_operation<T: Into<String>>(msg: T) -> Self {
        LinkpressError::CacheOperation(msg.into())
    }

    pub fn cache_plugin_not_found<T: Into<String>>(msg: T) -> Self {
        LinkpressError::CachePluginNotFound(msg.into())
    }

    pub fn database_config<T: Into<String>>(msg: T) -> Self {
        LinkpressError::DatabaseConfig(msg.into())
    }

    pub fn database_connection<T: Into<String>>(msg: T) -> Self {
        LinkpressError::DatabaseConnection(msg.into())
    }

    pub fn database_operation<T: Into<String>>(msg: T) -> Self {
        LinkpressError::DatabaseOperation(msg.into())
    }

    pub fn serialization<T: Into<String>>(msg: T) -> Self {
        LinkpressError::Serialization(msg.into())
    }

    pub fn config<T: Into<String>>(msg: T) -> Self {
        LinkpressError::Config(msg.into())
    }

    pub fn internal<T: Into<String>>(msg: T) -> Self {
        LinkpressError::Internal(msg.into())
    }
}

// 为常见的错误类型实现 From trait
impl From<sea_orm::DbErr> for LinkpressError {
    fn from(err: sea_orm::DbErr) -> Self {
        LinkpressError::DatabaseOperation(err.to_string())
    }
}

impl From<redis::RedisError> for LinkpressError {
    fn from(err: redis::RedisError) -> Self {
        if err.is_connection_dropped() || err.is_connection_refusal() || err.is_timeout() {
            LinkpressError::CacheConnection(err.to_string())
        } else {
            LinkpressError::CacheOperation(err.to_string())
        }
    }
}

impl From<serde_json::Error> for LinkpressError {
    fn from(err: serde_json::Error) -> Self {
        LinkpressError::Serialization(err.to_string())
    }
}

impl From<std::io::Error> for LinkpressError {
    fn from(err: std::io::Error) -> Self {
        LinkpressError::Internal(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, LinkpressError>;

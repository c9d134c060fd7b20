//! Redis 错误类型定义

use std::time::Duration;

use application::ChannelError;
use thiserror::Error;

/// Redis 操作错误
#[derive(Error, Debug)]
pub enum RedisError {
    /// 连接错误
    #[error("Redis 连接错误: {message}")]
    ConnectionError { message: String },

    /// 发布错误
    #[error("Redis 发布错误: {message}")]
    PublishError { message: String },

    /// 超时错误
    #[error("操作超时: {operation} ({timeout:?})")]
    TimeoutError {
        operation: &'static str,
        timeout: Duration,
    },

    /// 配置错误
    #[error("配置错误: {message}")]
    ConfigError { message: String },
}

/// Redis 结果类型
pub type RedisResult<T> = Result<T, RedisError>;

impl From<redis::RedisError> for RedisError {
    fn from(err: redis::RedisError) -> Self {
        match err.kind() {
            redis::ErrorKind::InvalidClientConfig => RedisError::ConfigError {
                message: err.to_string(),
            },
            _ if err.is_io_error() || err.is_connection_refusal() || err.is_connection_dropped() => {
                RedisError::ConnectionError {
                    message: err.to_string(),
                }
            }
            _ => RedisError::PublishError {
                message: err.to_string(),
            },
        }
    }
}

impl From<RedisError> for ChannelError {
    fn from(err: RedisError) -> Self {
        match err {
            RedisError::ConnectionError { message } | RedisError::ConfigError { message } => {
                ChannelError::Connection(message)
            }
            RedisError::PublishError { message } => ChannelError::Publish(message),
            RedisError::TimeoutError { timeout, .. } => ChannelError::Timeout(timeout),
        }
    }
}

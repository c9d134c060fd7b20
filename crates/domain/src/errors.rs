//! 领域模型错误定义
//!
//! 定义了领域层与仓储层的错误类型，提供清晰的错误上下文。

use thiserror::Error;

/// 领域模型错误类型
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    /// 无法识别的取值（例如未知的社区类型）
    #[error("无效取值: {field}: {value}")]
    InvalidValue { field: String, value: String },

    /// 队列状态转换不合法
    #[error("队列状态错误: {message}")]
    QueueStateError { message: String },
}

impl DomainError {
    /// 创建无效取值错误
    pub fn invalid_value(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.into(),
            value: value.into(),
        }
    }

    /// 创建队列状态错误
    pub fn queue_state(message: impl Into<String>) -> Self {
        Self::QueueStateError {
            message: message.into(),
        }
    }
}

/// 领域模型结果类型
pub type DomainResult<T> = Result<T, DomainError>;

/// 仓储错误类型
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RepositoryError {
    #[error("记录不存在")]
    NotFound,

    #[error("存储错误: {message}")]
    Storage { message: String },
}

impl RepositoryError {
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }
}

/// 仓储结果类型
pub type RepositoryResult<T> = Result<T, RepositoryError>;

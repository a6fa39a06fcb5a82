use crate::compare::ObjectKind;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, CompareError>;

#[derive(Error, Debug)]
pub enum CompareError {
    #[error("配置错误: {0}")]
    Config(#[from] toml::de::Error),

    #[error("数据库连接错误: {0}")]
    Connection(String),

    #[error("元数据采集错误 [{kind} {object}]: {message}")]
    Introspection {
        kind: ObjectKind,
        object: String,
        message: String,
    },

    #[error("结构比对错误: {0}")]
    Comparison(String),

    #[error("变更SQL生成错误: {0}")]
    Synthesis(String),

    #[error("IO 错误: {0}")]
    Io(#[from] std::io::Error),

    #[error("序列化错误: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("自定义错误: {0}")]
    Custom(String),

    #[error("配置文件未找到")]
    ConfigNotFound,
}

// mysql_async 的错误统一归类为连接层错误
impl From<mysql_async::Error> for CompareError {
    fn from(err: mysql_async::Error) -> Self {
        CompareError::Connection(err.to_string())
    }
}

impl CompareError {
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::Connection(msg.into())
    }

    pub fn introspection(kind: ObjectKind, object: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Introspection {
            kind,
            object: object.into(),
            message: message.into(),
        }
    }

    pub fn comparison(msg: impl Into<String>) -> Self {
        Self::Comparison(msg.into())
    }

    pub fn synthesis(msg: impl Into<String>) -> Self {
        Self::Synthesis(msg.into())
    }

    pub fn custom(msg: impl Into<String>) -> Self {
        Self::Custom(msg.into())
    }
}

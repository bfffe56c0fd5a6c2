use std::path::PathBuf;

use thiserror::Error;

use crate::models::{ArtifactKind, Language};

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// 提示词工件错误（致命，直接向调用方传播）
    #[error("提示词配置错误: {0}")]
    Prompt(#[from] PromptError),
    /// LLM 服务错误（在编排层被兜底模式吸收）
    #[error("LLM错误: {0}")]
    Llm(#[from] LlmError),
    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
    /// 文件操作错误
    #[error("文件错误: {0}")]
    File(#[from] FileError),
    /// 其他错误（用于包装第三方库错误）
    #[error("错误: {0}")]
    Other(String),
}

/// 提示词工件错误
#[derive(Debug, Error)]
pub enum PromptError {
    /// 工件文件不存在
    #[error("缺少提示词工件 {kind} ({language}): {}", .path.display())]
    ArtifactMissing {
        language: Language,
        kind: ArtifactKind,
        path: PathBuf,
    },
    /// 读取工件失败
    #[error("读取提示词工件失败 ({}): {source}", .path.display())]
    ArtifactReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// 规则配置 JSON 解析失败
    #[error("规则配置解析失败: {source}")]
    RulesConfigInvalid {
        #[source]
        source: serde_json::Error,
    },
    /// manifest 解析失败
    #[error("manifest 解析失败 ({}): {source}", .path.display())]
    ManifestInvalid {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    /// manifest 中不存在的版本
    #[error("未知的模板版本: {version}")]
    UnknownVersion { version: String },
}

/// LLM 服务错误
#[derive(Debug, Error)]
pub enum LlmError {
    /// 构建请求失败
    #[error("构建 LLM 请求失败: {source}")]
    RequestBuildFailed {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// API 调用失败
    #[error("LLM API调用失败 (模型: {model}): {source}")]
    ApiCallFailed {
        model: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 调用超时
    #[error("LLM API调用超时 (模型: {model}, {secs} 秒)")]
    Timeout { model: String, secs: u64 },
    /// 返回内容为空
    #[error("LLM返回内容为空 (模型: {model})")]
    EmptyContent { model: String },
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 环境变量解析失败
    #[error("环境变量 {var_name} 解析失败: 值 '{value}' 无法转换为 {expected_type}")]
    EnvVarParseFailed {
        var_name: String,
        value: String,
        expected_type: String,
    },
    /// 配置文件读取失败
    #[error("配置文件读取失败 ({path}): {source}")]
    FileReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// 配置文件解析失败
    #[error("配置文件解析失败 ({path}): {source}")]
    FileParseFailed {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}

/// 文件操作错误
#[derive(Debug, Error)]
pub enum FileError {
    /// 读取文件失败
    #[error("读取文件失败 ({path}): {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// 写入文件失败
    #[error("写入文件失败 ({path}): {source}")]
    WriteFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// 目录不存在
    #[error("目录不存在: {path}")]
    DirectoryNotFound { path: String },
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Other(format!("JSON序列化失败: {}", err))
    }
}

// ========== 便捷构造函数 ==========

impl AppError {
    /// 创建文件读取错误
    pub fn file_read_failed(path: impl Into<String>, source: std::io::Error) -> Self {
        AppError::File(FileError::ReadFailed {
            path: path.into(),
            source,
        })
    }

    /// 创建文件写入错误
    pub fn file_write_failed(path: impl Into<String>, source: std::io::Error) -> Self {
        AppError::File(FileError::WriteFailed {
            path: path.into(),
            source,
        })
    }

    /// 创建LLM API调用错误
    pub fn llm_api_failed(
        model: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AppError::Llm(LlmError::ApiCallFailed {
            model: model.into(),
            source: Box::new(source),
        })
    }

    /// 是否为不可恢复的配置类错误
    pub fn is_configuration(&self) -> bool {
        matches!(self, AppError::Prompt(_) | AppError::Config(_))
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_error_is_configuration() {
        let err: AppError = PromptError::UnknownVersion {
            version: "v9".to_string(),
        }
        .into();
        assert!(err.is_configuration());
        assert!(err.to_string().contains("v9"));
    }

    #[test]
    fn test_llm_error_display_carries_model() {
        let err = AppError::llm_api_failed(
            "gpt-4o-mini",
            std::io::Error::new(std::io::ErrorKind::TimedOut, "boom"),
        );
        assert!(!err.is_configuration());
        assert!(err.to_string().contains("gpt-4o-mini"));
    }
}

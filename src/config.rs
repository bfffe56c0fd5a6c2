use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::Deserialize;

use crate::error::ConfigError;
use crate::models::Language;

/// 程序配置文件
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    // --- LLM 配置 ---
    pub llm_api_key: String,
    pub llm_api_base_url: String,
    pub llm_model_name: String,
    pub llm_temperature: f32,
    pub llm_max_tokens: u32,
    /// 单次调用超时（秒）
    pub llm_timeout_secs: u64,
    // --- 提示词配置 ---
    /// 提示词工件根目录
    pub prompts_dir: PathBuf,
    /// 模板版本（为空时使用 manifest 的默认版本）
    pub template_version: Option<String>,
    /// 参考示例最多保留的行数，0 表示不截断
    pub golden_example_max_lines: usize,
    /// 未显式指定语言时的提示
    pub default_language: Option<Language>,
    // --- 批处理配置 ---
    /// 待处理口述文本所在目录
    pub input_folder: PathBuf,
    pub output_folder: PathBuf,
    /// 同时处理的文件数量
    pub max_concurrent_files: usize,
    /// 是否显示详细日志
    pub verbose_logging: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            llm_api_key: String::new(),
            llm_api_base_url: "https://api.openai.com/v1".to_string(),
            llm_model_name: "gpt-4o-mini".to_string(),
            llm_temperature: 0.1,
            llm_max_tokens: 4000,
            llm_timeout_secs: 60,
            prompts_dir: PathBuf::from("prompts"),
            template_version: None,
            golden_example_max_lines: 15,
            default_language: None,
            input_folder: PathBuf::from("dictations"),
            output_folder: PathBuf::from("section7_output"),
            max_concurrent_files: 4,
            verbose_logging: false,
        }
    }
}

fn env_string(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn env_parsed<T: FromStr>(name: &str, expected_type: &str) -> Result<Option<T>, ConfigError> {
    match env_string(name) {
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::EnvVarParseFailed {
                var_name: name.to_string(),
                value,
                expected_type: expected_type.to_string(),
            }),
        None => Ok(None),
    }
}

impl Config {
    /// 在默认值之上叠加环境变量
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::default().overlay_env()
    }

    /// 从 TOML 文件读取（缺失的键取默认值），再叠加环境变量
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| ConfigError::FileReadFailed {
            path: path.display().to_string(),
            source: e,
        })?;
        let config: Self = toml::from_str(&raw).map_err(|e| ConfigError::FileParseFailed {
            path: path.display().to_string(),
            source: e,
        })?;
        config.overlay_env()
    }

    fn overlay_env(self) -> Result<Self, ConfigError> {
        let default_language = match env_string("SECTION7_DEFAULT_LANGUAGE") {
            Some(code) => Some(Language::from_code(&code).ok_or_else(|| {
                ConfigError::EnvVarParseFailed {
                    var_name: "SECTION7_DEFAULT_LANGUAGE".to_string(),
                    value: code.clone(),
                    expected_type: "fr|en".to_string(),
                }
            })?),
            None => self.default_language,
        };

        Ok(Self {
            llm_api_key: env_string("LLM_API_KEY")
                .or_else(|| env_string("OPENAI_API_KEY"))
                .unwrap_or(self.llm_api_key),
            llm_api_base_url: env_string("LLM_API_BASE_URL").unwrap_or(self.llm_api_base_url),
            llm_model_name: env_string("LLM_MODEL_NAME").unwrap_or(self.llm_model_name),
            llm_temperature: env_parsed("LLM_TEMPERATURE", "f32")?.unwrap_or(self.llm_temperature),
            llm_max_tokens: env_parsed("LLM_MAX_TOKENS", "u32")?.unwrap_or(self.llm_max_tokens),
            llm_timeout_secs: env_parsed("LLM_TIMEOUT_SECS", "u64")?
                .unwrap_or(self.llm_timeout_secs),
            prompts_dir: env_string("SECTION7_PROMPTS_DIR")
                .map(PathBuf::from)
                .unwrap_or(self.prompts_dir),
            template_version: env_string("SECTION7_TEMPLATE_VERSION").or(self.template_version),
            golden_example_max_lines: env_parsed("SECTION7_GOLDEN_MAX_LINES", "usize")?
                .unwrap_or(self.golden_example_max_lines),
            default_language,
            input_folder: env_string("INPUT_FOLDER")
                .map(PathBuf::from)
                .unwrap_or(self.input_folder),
            output_folder: env_string("OUTPUT_FOLDER")
                .map(PathBuf::from)
                .unwrap_or(self.output_folder),
            max_concurrent_files: env_parsed("MAX_CONCURRENT_FILES", "usize")?
                .unwrap_or(self.max_concurrent_files),
            verbose_logging: env_parsed("VERBOSE_LOGGING", "bool")?.unwrap_or(self.verbose_logging),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.llm_model_name, "gpt-4o-mini");
        assert_eq!(config.llm_max_tokens, 4000);
        assert_eq!(config.golden_example_max_lines, 15);
        assert!(config.llm_api_key.is_empty());
    }

    #[test]
    fn test_toml_partial_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "llm_model_name = \"gpt-4o\"\ngolden_example_max_lines = 0\ndefault_language = \"en\""
        )
        .unwrap();

        let raw = std::fs::read_to_string(file.path()).unwrap();
        let config: Config = toml::from_str(&raw).unwrap();
        assert_eq!(config.llm_model_name, "gpt-4o");
        assert_eq!(config.golden_example_max_lines, 0);
        assert_eq!(config.default_language, Some(Language::English));
        assert_eq!(config.llm_timeout_secs, 60);
    }

    #[test]
    fn test_malformed_toml_is_reported() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "llm_max_tokens = \"many\"").unwrap();
        let err = Config::from_toml_file(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::FileParseFailed { .. }));
    }

    #[test]
    fn test_missing_file_is_reported() {
        let err = Config::from_toml_file("/nonexistent/section7.toml").unwrap_err();
        assert!(matches!(err, ConfigError::FileReadFailed { .. }));
    }
}

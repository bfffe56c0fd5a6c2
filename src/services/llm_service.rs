//! LLM 服务 - 业务能力层
//!
//! 只负责"调用生成模型"能力，不关心流程
//!
//! ## 技术栈
//! - 使用 `async-openai` crate 进行 API 调用
//! - 支持自定义 API 端点和模型
//! - 兼容 OpenAI API 的服务（如 Azure, Gemini, Doubao 等）

use std::future::Future;
use std::time::Duration;

use async_openai::{
    config::OpenAIConfig,
    types::chat::{
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
    },
    Client,
};
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::LlmError;
use crate::models::TokenUsage;

/// 一次补全请求
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub system_prompt: String,
    pub user_message: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

/// 补全结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    pub content: String,
    pub usage: Option<TokenUsage>,
}

/// 生成模型边界
///
/// 编排层只依赖这个 trait；测试中用脚本化的实现替换真实 API。
pub trait CompletionModel: Send + Sync {
    /// 写入结果元数据的模型名
    fn model_name(&self) -> &str;

    fn complete(
        &self,
        request: CompletionRequest,
    ) -> impl Future<Output = Result<Completion, LlmError>> + Send;
}

/// LLM 服务
///
/// 职责：
/// - 把系统提示词 + 用户消息发给 OpenAI 兼容接口
/// - 超时控制
/// - 不解析返回内容（JSON 契约由编排层校验）
pub struct LlmService {
    client: Client<OpenAIConfig>,
    model_name: String,
    timeout: Duration,
}

impl LlmService {
    /// 创建新的 LLM 服务
    pub fn new(config: &Config) -> Self {
        // 配置 OpenAI 客户端（兼容 OpenAI API 的服务）
        let openai_config = OpenAIConfig::new()
            .with_api_key(&config.llm_api_key)
            .with_api_base(&config.llm_api_base_url);

        Self {
            client: Client::with_config(openai_config),
            model_name: config.llm_model_name.clone(),
            timeout: Duration::from_secs(config.llm_timeout_secs),
        }
    }

    fn build_request(
        &self,
        request: &CompletionRequest,
    ) -> Result<async_openai::types::chat::CreateChatCompletionRequest, LlmError> {
        let build_failed = |e: async_openai::error::OpenAIError| LlmError::RequestBuildFailed {
            source: Box::new(e),
        };

        let messages = vec![
            ChatCompletionRequestMessage::System(
                ChatCompletionRequestSystemMessageArgs::default()
                    .content(request.system_prompt.as_str())
                    .build()
                    .map_err(build_failed)?,
            ),
            ChatCompletionRequestMessage::User(
                ChatCompletionRequestUserMessageArgs::default()
                    .content(request.user_message.as_str())
                    .build()
                    .map_err(build_failed)?,
            ),
        ];

        CreateChatCompletionRequestArgs::default()
            .model(&self.model_name)
            .messages(messages)
            .temperature(request.temperature)
            .max_tokens(request.max_tokens)
            .build()
            .map_err(build_failed)
    }
}

impl CompletionModel for LlmService {
    fn model_name(&self) -> &str {
        &self.model_name
    }

    async fn complete(&self, request: CompletionRequest) -> Result<Completion, LlmError> {
        debug!("调用 LLM API，模型: {}", self.model_name);
        debug!(
            "系统提示词 {} 字符, 用户消息 {} 字符",
            request.system_prompt.len(),
            request.user_message.len()
        );

        let api_request = self.build_request(&request)?;

        // 调用 API（带超时）
        let response = tokio::time::timeout(self.timeout, self.client.chat().create(api_request))
            .await
            .map_err(|_| {
                warn!("LLM API 调用超时 ({} 秒)", self.timeout.as_secs());
                LlmError::Timeout {
                    model: self.model_name.clone(),
                    secs: self.timeout.as_secs(),
                }
            })?
            .map_err(|e| {
                warn!("LLM API 调用失败: {}", e);
                LlmError::ApiCallFailed {
                    model: self.model_name.clone(),
                    source: Box::new(e),
                }
            })?;

        debug!("LLM API 调用成功");

        let usage = response.usage.as_ref().map(|u| TokenUsage {
            prompt_tokens: u.prompt_tokens,
            completion_tokens: u.completion_tokens,
            total_tokens: u.total_tokens,
        });

        // 提取响应内容
        let content = response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .ok_or_else(|| LlmError::EmptyContent {
                model: self.model_name.clone(),
            })?;

        Ok(Completion { content, usage })
    }
}

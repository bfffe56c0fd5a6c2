//! 第 7 节格式化器 - 编排层
//!
//! ## 流程
//!
//! 1. 语言检测
//! 2. 取回提示词工件（经缓存）并组装系统提示词
//! 3. 调用生成模型，按 JSON 契约防御性解析
//! 4. 守卫流水线
//! 5. 姓名保全（校验 → 还原 → 再校验）
//! 6. QA 关卡
//!
//! 模型调用失败时进入兜底模式：原文直接经过六个守卫后返回，`ok = false`。
//! 只有提示词工件缺失这类配置错误会以 `Err` 返回给调用方。

use std::time::Instant;

use tracing::{debug, info, info_span, warn, Instrument};

use crate::config::Config;
use crate::error::{AppResult, LlmError};
use crate::infrastructure::{FileBundleResolver, PromptBundleResolver, PromptCache};
use crate::models::{Language, ModelResponse, ResultMetadata, Section7Result};
use crate::services::{
    detect_language, name_preservation, CompletionModel, CompletionRequest, GuardPipeline,
    LlmService,
};
use crate::utils::logging::{next_correlation_id, truncate_text};
use crate::workflow::{qa_gate, user_message, PromptBuilder};

const FALLBACK_MODEL: &str = "fallback";
const FALLBACK_SUGGESTION: &str = "AI processing failed - using rules-only fallback mode";

/// 第 7 节格式化器
///
/// 持有模型、工件解析器与提示词缓存；不同请求之间除缓存外没有共享的可变状态。
pub struct Section7Formatter<M, R = FileBundleResolver> {
    model: M,
    resolver: R,
    cache: PromptCache,
    pipeline: GuardPipeline,
    builder: PromptBuilder,
    temperature: f32,
    max_tokens: u32,
    template_version: Option<String>,
    default_language: Option<Language>,
}

impl Section7Formatter<LlmService, FileBundleResolver> {
    /// 按配置创建：OpenAI 兼容模型 + 文件系统工件
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            LlmService::new(config),
            FileBundleResolver::new(&config.prompts_dir),
            config,
        )
    }
}

impl<M, R> Section7Formatter<M, R>
where
    M: CompletionModel,
    R: PromptBundleResolver,
{
    pub fn new(model: M, resolver: R, config: &Config) -> Self {
        Self {
            model,
            resolver,
            cache: PromptCache::new(),
            pipeline: GuardPipeline::standard(),
            builder: PromptBuilder::new(config.golden_example_max_lines),
            temperature: config.llm_temperature,
            max_tokens: config.llm_max_tokens,
            template_version: config.template_version.clone(),
            default_language: config.default_language,
        }
    }

    pub fn cache(&self) -> &PromptCache {
        &self.cache
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    /// 格式化一段口述病史
    ///
    /// 模型失败不会返回 `Err`，而是返回兜底结果；`Err` 只表示提示词工件不可用。
    pub async fn format(
        &self,
        content: &str,
        language: Option<Language>,
    ) -> AppResult<Section7Result> {
        let correlation_id = next_correlation_id();
        let span = info_span!("section7", correlation_id = %correlation_id);
        self.format_inner(content, language, correlation_id)
            .instrument(span)
            .await
    }

    async fn format_inner(
        &self,
        content: &str,
        hint: Option<Language>,
        correlation_id: String,
    ) -> AppResult<Section7Result> {
        let started = Instant::now();
        info!(
            input_length = content.len(),
            "🎯 开始格式化: {}",
            truncate_text(content.trim(), 40)
        );

        let language = detect_language(content, hint.or(self.default_language));
        info!("🌐 语言: {}", language);

        let bundle = self
            .cache
            .get_or_load(language, self.template_version.as_deref(), &self.resolver)?;
        let prompt = self.builder.build(&bundle, language)?;
        info!(prompt_length = prompt.prompt_length, "🔧 系统提示词已组装");

        let request = CompletionRequest {
            system_prompt: prompt.system_prompt,
            user_message: user_message(content, language),
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };

        let completion = match self.model.complete(request).await {
            Ok(completion) => completion,
            Err(e) => return Ok(self.fallback(content, language, correlation_id, started, &e)),
        };
        info!("🤖 模型已返回 {} 字符", completion.content.len());

        let response = ModelResponse::parse(&completion.content);
        if !response.violations.is_empty() {
            debug!("模型报告违规: {:?}", response.violations);
        }

        let guarded = self.pipeline.run(&response.rendered_text, language);
        info!(
            guards = ?guarded.guards_applied,
            violations = guarded.violations.len(),
            "✅ 守卫流水线完成"
        );

        let mut violations = response.violations.clone();
        violations.extend(guarded.violations);

        // 姓名保全：发现截断或缺失时尝试还原，剩余问题记为提示性违规
        let mut formatted = guarded.text;
        let mut names_restored = 0;
        let mut names = name_preservation::validate(content, &formatted, language);
        if !names.success {
            let restored = name_preservation::restore(content, &formatted, language);
            if restored.names_restored > 0 {
                info!("🩺 还原了 {} 个医生姓名", restored.names_restored);
                names_restored = restored.names_restored;
                formatted = restored.restored_content;
                names = name_preservation::validate(content, &formatted, language);
            }
        }
        if !names.truncated_names.is_empty() {
            warn!("⚠️ 仍有 {} 个医生姓名被截断", names.truncated_names.len());
            violations.push(name_preservation::NAME_TRUNCATED.to_string());
        }
        violations.extend(names.violations);

        let verdict = qa_gate::evaluate(response.ok, &violations);
        let mut suggestions: Vec<String> = verdict.suggestion().into_iter().collect();
        suggestions.extend(names.suggestions);

        let processing_time_ms = started.elapsed().as_millis() as u64;
        info!(
            ok = verdict.ok,
            violations = violations.len(),
            critical = verdict.critical.len(),
            processing_time_ms,
            "🎉 格式化完成"
        );

        Ok(Section7Result {
            formatted,
            ok: verdict.ok,
            violations,
            doctor_names_seen: response.doctor_names_seen,
            started_with_worker: response.started_with_worker,
            chronology_ok: response.chronology_ok,
            suggestions,
            names_restored,
            metadata: ResultMetadata {
                language,
                files_loaded: prompt.files_loaded,
                prompt_length: prompt.prompt_length,
                processing_time_ms,
                model: self.model.model_name().to_string(),
                guards_applied: guarded.guards_applied,
                guard_metadata: guarded.metadata.into_iter().collect(),
                fallback: None,
                correlation_id,
                template_version: Some(prompt.version_used),
                token_usage: completion.usage,
            },
        })
    }

    /// 兜底模式：只跑守卫
    fn fallback(
        &self,
        content: &str,
        language: Language,
        correlation_id: String,
        started: Instant,
        cause: &LlmError,
    ) -> Section7Result {
        warn!("🔄 模型调用失败，进入兜底模式: {}", cause);

        let guarded = self.pipeline.run(content, language);
        let mut violations = vec!["openai_failed".to_string()];
        violations.extend(guarded.violations);

        Section7Result {
            formatted: guarded.text,
            ok: false,
            violations,
            doctor_names_seen: Vec::new(),
            started_with_worker: false,
            chronology_ok: false,
            suggestions: vec![FALLBACK_SUGGESTION.to_string()],
            names_restored: 0,
            metadata: ResultMetadata {
                language,
                files_loaded: Vec::new(),
                prompt_length: 0,
                processing_time_ms: started.elapsed().as_millis() as u64,
                model: FALLBACK_MODEL.to_string(),
                guards_applied: guarded.guards_applied,
                guard_metadata: guarded.metadata.into_iter().collect(),
                fallback: Some(true),
                correlation_id,
                template_version: None,
                token_usage: None,
            },
        }
    }
}

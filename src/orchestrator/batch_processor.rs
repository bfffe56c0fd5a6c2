//! 批量格式化处理器 - 编排层
//!
//! ## 职责
//!
//! 1. **应用初始化**：检查输入目录与提示词工件
//! 2. **批量加载**：扫描输入目录中的 `.txt` / `.md` 口述文件
//! 3. **并发控制**：`buffer_unordered` 限制同时处理的文件数
//! 4. **结果落盘**：每个文件写出 `<名称>.section7.txt` 与 `<名称>.json`
//! 5. **全局统计**：通过 / 需复核 / 失败
//!
//! 单个文件失败只记录并计数，不影响其他文件。

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use futures::stream::{self, StreamExt};
use tracing::{error, info, warn};

use crate::config::Config;
use crate::error::{AppError, AppResult, FileError};
use crate::models::{Language, Section7Result};
use crate::orchestrator::Section7Formatter;
use crate::services::{CompletionModel, LlmService};
use crate::utils::logging::{
    log_batch_complete, log_batch_start, log_file_complete, log_startup, print_final_stats,
};

/// 单个文件的处理结果
#[derive(Debug)]
enum FileOutcome {
    /// 通过 QA
    Passed,
    /// 有关键违规或走了兜底模式
    Flagged,
    Failed,
}

/// 处理统计
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ProcessingStats {
    pub passed: usize,
    pub flagged: usize,
    pub failed: usize,
}

impl ProcessingStats {
    pub fn total(&self) -> usize {
        self.passed + self.flagged + self.failed
    }
}

/// 应用主结构
pub struct App<M = LlmService> {
    config: Config,
    formatter: Section7Formatter<M>,
}

impl App<LlmService> {
    /// 初始化应用
    pub async fn initialize(config: Config) -> Result<Self> {
        let formatter = Section7Formatter::from_config(&config);
        Self::with_formatter(config, formatter).await
    }
}

impl<M: CompletionModel> App<M> {
    /// 使用自定义的格式化器（测试中注入脚本化模型）
    pub async fn with_formatter(config: Config, formatter: Section7Formatter<M>) -> Result<Self> {
        log_startup(config.max_concurrent_files, formatter.model().model_name());

        if !config.input_folder.is_dir() {
            return Err(AppError::File(FileError::DirectoryNotFound {
                path: config.input_folder.display().to_string(),
            })
            .into());
        }

        tokio::fs::create_dir_all(&config.output_folder)
            .await
            .with_context(|| format!("无法创建输出目录: {}", config.output_folder.display()))?;

        Ok(Self { config, formatter })
    }

    /// 运行应用主逻辑
    pub async fn run(&self) -> Result<ProcessingStats> {
        let files = self.load_dictations().await?;

        if files.is_empty() {
            warn!("⚠️ 没有找到待处理的口述文件，程序结束");
            return Ok(ProcessingStats::default());
        }

        let max_concurrent = self.config.max_concurrent_files.max(1);
        log_batch_start(files.len(), max_concurrent);

        let outcomes: Vec<FileOutcome> = stream::iter(files.iter())
            .map(|path| self.process_file(path))
            .buffer_unordered(max_concurrent)
            .collect()
            .await;

        let mut stats = ProcessingStats::default();
        for outcome in outcomes {
            match outcome {
                FileOutcome::Passed => stats.passed += 1,
                FileOutcome::Flagged => stats.flagged += 1,
                FileOutcome::Failed => stats.failed += 1,
            }
        }

        log_batch_complete(stats.passed, stats.total());
        print_final_stats(
            stats.passed,
            stats.flagged,
            stats.failed,
            &self.config.output_folder.display().to_string(),
        );

        Ok(stats)
    }

    /// 扫描输入目录
    async fn load_dictations(&self) -> Result<Vec<PathBuf>> {
        info!("\n📁 正在扫描待处理的口述文件...");

        let mut entries = tokio::fs::read_dir(&self.config.input_folder)
            .await
            .with_context(|| format!("无法读取输入目录: {}", self.config.input_folder.display()))?;

        let mut files = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            let is_dictation = path
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| e.eq_ignore_ascii_case("txt") || e.eq_ignore_ascii_case("md"));
            if path.is_file() && is_dictation && !is_output_file(&path) {
                files.push(path);
            }
        }

        files.sort();
        Ok(files)
    }

    async fn process_file(&self, path: &Path) -> FileOutcome {
        let name = path.display().to_string();
        match self.format_file(path).await {
            Ok(result) => {
                log_file_complete(&name, result.ok, result.violations.len(), result.is_fallback());
                if result.ok && !result.is_fallback() {
                    FileOutcome::Passed
                } else {
                    FileOutcome::Flagged
                }
            }
            Err(e) => {
                error!("❌ {} 处理失败: {}", name, e);
                FileOutcome::Failed
            }
        }
    }

    async fn format_file(&self, path: &Path) -> AppResult<Section7Result> {
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| AppError::file_read_failed(path.display().to_string(), e))?;

        let result = self.formatter.format(&content, None).await?;
        self.write_outputs(path, &result).await?;
        Ok(result)
    }

    async fn write_outputs(&self, source: &Path, result: &Section7Result) -> AppResult<()> {
        let stem = source
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("dictation");

        let text_path = self.config.output_folder.join(format!("{}.section7.txt", stem));
        tokio::fs::write(&text_path, &result.formatted)
            .await
            .map_err(|e| AppError::file_write_failed(text_path.display().to_string(), e))?;

        let json_path = self.config.output_folder.join(format!("{}.json", stem));
        let json = serde_json::to_string_pretty(result)?;
        tokio::fs::write(&json_path, json)
            .await
            .map_err(|e| AppError::file_write_failed(json_path.display().to_string(), e))?;

        Ok(())
    }
}

/// 输出目录与输入目录相同时，跳过已经生成的结果文件
fn is_output_file(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.ends_with(".section7.txt"))
}

/// 格式化单个文件并打印 JSON 结果（命令行单文件模式）
pub async fn format_single_file(
    config: &Config,
    path: &Path,
    language: Option<Language>,
) -> Result<String> {
    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("无法读取文件: {}", path.display()))?;

    let formatter = Section7Formatter::from_config(config);
    let result = formatter.format(&content, language).await?;
    Ok(serde_json::to_string_pretty(&result)?)
}

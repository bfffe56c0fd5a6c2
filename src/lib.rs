//! # Section 7 Formatter
//!
//! 把口述的病史整理成 CNESST 工伤报告第 7 节（"Historique de faits et évolution"）
//!
//! ## 架构设计
//!
//! 本系统采用四层架构：
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - 持有提示词目录与缓存，只暴露能力
//! - `FileBundleResolver` - 按语言、版本取回三个提示词工件
//! - `PromptCache` - 按 (语言, 工件种类) 缓存，只填充一次
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"，都是无状态的纯函数或单一能力
//! - `language_router` - 法语 / 英语判定
//! - `name_extractor` / `name_preservation` - 医生姓名识别、截断校验与还原
//! - `guards` - 六个确定性文本守卫
//! - `LlmService` - 生成模型调用能力
//!
//! ### ③ 流程层（Workflow）
//! - `PromptBuilder` - 系统提示词组装
//! - `qa_gate` - 关键违规判定
//!
//! ### ④ 编排层（Orchestration）
//! - `Section7Formatter` - 单次格式化流程与兜底模式
//! - `App` - 批量处理目录中的口述文件
//!
//! ## 模块结构

pub mod config;
pub mod error;
pub mod infrastructure;

pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use config::Config;
pub use error::{AppError, AppResult};
pub use infrastructure::{FileBundleResolver, PromptBundleResolver, PromptCache};
pub use models::{Language, Section7Result};
pub use orchestrator::{App, Section7Formatter};
pub use services::{CompletionModel, GuardPipeline, LlmService};

/// 日志工具模块
///
/// 提供日志初始化、格式化和输出的辅助函数
use std::sync::atomic::{AtomicU64, Ordering};

use tracing::info;
use tracing_subscriber::EnvFilter;

static CORRELATION_SEQ: AtomicU64 = AtomicU64::new(0);

/// 初始化 tracing 订阅器
///
/// 优先使用 `RUST_LOG`，否则 `verbose` 时为 debug，默认 info。
/// 重复调用是安全的（测试中常见）。
pub fn init(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

/// 生成一次格式化请求的关联 ID：`s7-<毫秒时间戳>-<序号>`
pub fn next_correlation_id() -> String {
    let seq = CORRELATION_SEQ.fetch_add(1, Ordering::Relaxed);
    format!("s7-{}-{}", chrono::Utc::now().timestamp_millis(), seq)
}

/// 记录程序启动信息
///
/// # 参数
/// - `max_concurrent`: 最大并发数
/// - `model`: 使用的模型
pub fn log_startup(max_concurrent: usize, model: &str) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - 第 7 节批量格式化模式");
    info!("🤖 模型: {}", model);
    info!("📊 最大并发数: {}", max_concurrent);
    info!("{}", "=".repeat(60));
}

/// 记录批次开始信息
///
/// # 参数
/// - `total`: 待处理文件数
/// - `max_concurrent`: 最大并发数
pub fn log_batch_start(total: usize, max_concurrent: usize) {
    info!("✓ 找到 {} 个待处理的口述文件", total);
    info!("📋 同时处理 {} 个文件", max_concurrent);
}

/// 记录单个文件完成信息
pub fn log_file_complete(file: &str, ok: bool, violations: usize, fallback: bool) {
    let mark = if ok { "✅" } else { "⚠️" };
    if fallback {
        info!("{} {} - 兜底模式, 违规 {}", mark, file, violations);
    } else {
        info!("{} {} - 违规 {}", mark, file, violations);
    }
}

/// 记录批次完成信息
///
/// # 参数
/// - `success`: 通过 QA 的数量
/// - `total`: 批次总数
pub fn log_batch_complete(success: usize, total: usize) {
    info!("\n{}", "─".repeat(60));
    info!("✓ 批次完成: 通过 {}/{}", success, total);
    info!("{}", "─".repeat(60));
}

/// 打印最终统计信息
///
/// # 参数
/// - `passed`: 通过 QA 的数量
/// - `flagged`: 有关键违规或兜底的数量
/// - `failed`: 处理失败的数量
/// - `output_folder`: 输出目录
pub fn print_final_stats(passed: usize, flagged: usize, failed: usize, output_folder: &str) {
    let total = passed + flagged + failed;
    info!("\n{}", "=".repeat(60));
    info!("📊 全部处理完成统计");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    info!("✅ 通过: {}/{}", passed, total);
    info!("⚠️ 需复核: {}", flagged);
    info!("❌ 失败: {}", failed);
    info!("{}", "=".repeat(60));
    info!("\n结果已保存至: {}", output_folder);
}

/// 截断长文本用于日志显示
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最大长度
///
/// # 返回
/// 返回截断后的文本
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_counts_chars_not_bytes() {
        assert_eq!(truncate_text("évolution", 3), "évo...");
        assert_eq!(truncate_text("court", 10), "court");
    }

    #[test]
    fn test_correlation_ids_are_unique() {
        let a = next_correlation_id();
        let b = next_correlation_id();
        assert!(a.starts_with("s7-"));
        assert_ne!(a, b);
    }

    #[test]
    fn test_init_is_idempotent() {
        init(false);
        init(true);
    }
}

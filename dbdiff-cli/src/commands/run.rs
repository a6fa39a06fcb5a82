use crate::app::CliApp;
use crate::sink::{ConsoleNotifier, JsonFileSink};
use compare_core::error::Result;
use compare_core::{CompareError, ComparisonTask, RunStatus};
use std::path::PathBuf;
use tracing::info;
use uuid::Uuid;

/// 执行一次完整的结构比对
pub async fn run_compare(app: &CliApp, output: Option<PathBuf>, diff_only: bool) -> Result<()> {
    info!("🔍 开始数据库结构比对");
    info!("======================");

    let output_path = output.unwrap_or_else(|| PathBuf::from(&app.config.options.output));
    let task = ComparisonTask::from_config(&app.config);
    let sink = JsonFileSink::new(&output_path);
    let run_id = Uuid::new_v4();

    let outcome = task.execute(run_id, &sink, &ConsoleNotifier).await?;

    // 逐对象打印比对结论
    for record in &outcome.records {
        if record.has_differences {
            info!("  ✗ [{}] {}", record.kind.label(), record.object_name);
        } else if !diff_only {
            info!("  ✓ [{}] {}", record.kind.label(), record.object_name);
        }
    }

    info!("📄 比对结果已写入: {}", output_path.display());

    // 失败的运行让进程以非零码退出，便于脚本编排
    if outcome.status == RunStatus::Failed {
        return Err(CompareError::custom(
            outcome
                .error_message
                .unwrap_or_else(|| "比对任务失败".to_string()),
        ));
    }

    Ok(())
}

use chrono::{DateTime, Utc};
use compare_core::error::Result;
use compare_core::{DifferenceRecord, Notifier, ResultSink, RunOutcome, RunStatus};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{error, info};
use uuid::Uuid;

/// 把运行状态与差异记录落盘为JSON报告文件
///
/// 每次状态流转或记录写入都会重写整个报告文件，
/// 运行中途失败时文件里保留失败前已产出的记录。
pub struct JsonFileSink {
    path: PathBuf,
    state: Mutex<ReportState>,
}

#[derive(Serialize)]
struct ReportState {
    run_id: Option<Uuid>,
    status: RunStatus,
    error_message: Option<String>,
    updated_at: DateTime<Utc>,
    records: Vec<DifferenceRecord>,
}

impl JsonFileSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            state: Mutex::new(ReportState {
                run_id: None,
                status: RunStatus::Pending,
                error_message: None,
                updated_at: Utc::now(),
                records: Vec::new(),
            }),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write_report(&self, state: &ReportState) -> Result<()> {
        let content = serde_json::to_string_pretty(state)?;
        std::fs::write(&self.path, content)?;
        Ok(())
    }
}

impl ResultSink for JsonFileSink {
    async fn record_status(
        &self,
        run_id: Uuid,
        status: RunStatus,
        error_message: Option<&str>,
    ) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.run_id = Some(run_id);
        state.status = status;
        state.error_message = error_message.map(|s| s.to_string());
        state.updated_at = Utc::now();
        self.write_report(&state)
    }

    async fn save_records(&self, _run_id: Uuid, records: &[DifferenceRecord]) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.records.extend_from_slice(records);
        state.updated_at = Utc::now();
        self.write_report(&state)
    }
}

/// 终端通知：打印终态与差异统计
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    async fn notify(&self, outcome: &RunOutcome) -> Result<()> {
        match outcome.status {
            RunStatus::Completed => info!("✅ 数据库比对任务完成"),
            RunStatus::Failed => error!(
                "❌ 数据库比对任务失败: {}",
                outcome.error_message.as_deref().unwrap_or("未知错误")
            ),
            _ => {}
        }

        info!("总对象数: {}", outcome.summary.total);
        info!("有差异: {}", outcome.summary.with_differences);
        info!("无差异: {}", outcome.summary.without_differences);
        info!(
            "开始时间: {} / 结束时间: {}",
            outcome.started_at.format("%Y-%m-%d %H:%M:%S UTC"),
            outcome.finished_at.format("%Y-%m-%d %H:%M:%S UTC")
        );

        Ok(())
    }
}

use crate::compare::{
    DiffSummary, DifferenceRecord, ObjectKind, classify_table_presence, diff_config_variables,
    diff_table_structures, diff_text_catalogs, table_record,
};
use crate::config::{CompareConfig, ConnectionConfig, IgnoreConfig, IgnoreRules};
use crate::connection::{close_quietly, connect};
use crate::error::Result;
use crate::introspect;
use chrono::{DateTime, Utc};
use mysql_async::Conn;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use tracing::{error, info, warn};
use uuid::Uuid;

/// 一次比对运行的状态机
///
/// 状态单向流转：Pending -> Running -> Completed | Failed。
/// Failed 必须携带非空错误信息，两个终态都不再流转。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Pending,
    Running,
    Completed,
    Failed,
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RunStatus::Pending => "pending",
            RunStatus::Running => "running",
            RunStatus::Completed => "completed",
            RunStatus::Failed => "failed",
        };
        write!(f, "{name}")
    }
}

/// 一次运行的最终产出：终态、差异记录与统计
#[derive(Debug, Clone, Serialize)]
pub struct RunOutcome {
    pub run_id: Uuid,
    pub status: RunStatus,
    pub error_message: Option<String>,
    pub summary: DiffSummary,
    pub records: Vec<DifferenceRecord>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

/// 结果持久化协作方：记录状态流转并保存差异记录
#[allow(async_fn_in_trait)]
pub trait ResultSink {
    async fn record_status(
        &self,
        run_id: Uuid,
        status: RunStatus,
        error_message: Option<&str>,
    ) -> Result<()>;

    async fn save_records(&self, run_id: Uuid, records: &[DifferenceRecord]) -> Result<()>;
}

/// 通知协作方：接收终态与差异统计
#[allow(async_fn_in_trait)]
pub trait Notifier {
    async fn notify(&self, outcome: &RunOutcome) -> Result<()>;
}

/// 一次完整的数据库结构比对任务
///
/// 六类对象按固定顺序串行比较；任何一类出错即中止后续比较，
/// 运行转入 Failed 并记录错误文本，此前已保存的记录保留用于诊断。
#[derive(Debug, Clone)]
pub struct ComparisonTask {
    source: ConnectionConfig,
    target: ConnectionConfig,
    ignore: IgnoreConfig,
    connect_timeout: Duration,
}

impl ComparisonTask {
    pub fn new(
        source: ConnectionConfig,
        target: ConnectionConfig,
        ignore: IgnoreConfig,
        connect_timeout: Duration,
    ) -> Self {
        Self {
            source,
            target,
            ignore,
            connect_timeout,
        }
    }

    pub fn from_config(config: &CompareConfig) -> Self {
        Self::new(
            config.source.clone(),
            config.target.clone(),
            config.ignore.clone(),
            config.options.connect_timeout(),
        )
    }

    pub fn source(&self) -> &ConnectionConfig {
        &self.source
    }

    pub fn target(&self) -> &ConnectionConfig {
        &self.target
    }

    /// 执行完整比对流程
    ///
    /// 比较器内部的错误转化为 Failed 终态而不是 Err；
    /// 只有持久化协作方本身出错才向上传播。
    pub async fn execute<S: ResultSink, N: Notifier>(
        &self,
        run_id: Uuid,
        sink: &S,
        notifier: &N,
    ) -> Result<RunOutcome> {
        let started_at = Utc::now();
        info!("====[开始执行比对任务 {}]====", run_id);
        info!("源数据库: {}", self.source.display_addr());
        info!("目标数据库: {}", self.target.display_addr());

        sink.record_status(run_id, RunStatus::Pending, None).await?;
        sink.record_status(run_id, RunStatus::Running, None).await?;

        let mut records: Vec<DifferenceRecord> = Vec::new();
        let mut failure: Option<String> = None;

        for kind in ObjectKind::ALL {
            info!("开始执行{}比对...", kind.label());
            match self.compare_kind(kind).await {
                Ok(kind_records) => {
                    info!(
                        "{}比对完成，共 {} 个对象",
                        kind.label(),
                        kind_records.len()
                    );
                    sink.save_records(run_id, &kind_records).await?;
                    records.extend(kind_records);
                }
                Err(e) => {
                    error!("{}比对失败: {}", kind.label(), e);
                    failure = Some(e.to_string());
                    break;
                }
            }
        }

        let (status, error_message) = match failure {
            Some(message) => (RunStatus::Failed, Some(message)),
            None => (RunStatus::Completed, None),
        };
        sink.record_status(run_id, status, error_message.as_deref())
            .await?;

        let summary = DiffSummary::from_records(&records);
        let outcome = RunOutcome {
            run_id,
            status,
            error_message,
            summary,
            records,
            started_at,
            finished_at: Utc::now(),
        };

        match outcome.status {
            RunStatus::Completed => info!(
                "所有比对完成: 共 {} 个对象，{} 个有差异",
                outcome.summary.total, outcome.summary.with_differences
            ),
            RunStatus::Failed => error!(
                "比对任务失败: {}",
                outcome.error_message.as_deref().unwrap_or("未知错误")
            ),
            _ => {}
        }

        // 通知尽力而为，失败不影响运行终态
        if let Err(e) = notifier.notify(&outcome).await {
            warn!("发送比对结果通知失败: {}", e);
        }

        info!("====[比对任务执行结束 {}]====", run_id);
        Ok(outcome)
    }

    /// 比较单类对象；两侧连接成对打开，所有退出路径上成对关闭
    async fn compare_kind(&self, kind: ObjectKind) -> Result<Vec<DifferenceRecord>> {
        let mut source_conn = connect(&self.source, self.connect_timeout).await?;
        let mut target_conn = match connect(&self.target, self.connect_timeout).await {
            Ok(conn) => conn,
            Err(e) => {
                close_quietly(source_conn).await;
                return Err(e);
            }
        };

        let result = self
            .dispatch_kind(kind, &mut source_conn, &mut target_conn)
            .await;

        close_quietly(source_conn).await;
        close_quietly(target_conn).await;
        result
    }

    async fn dispatch_kind(
        &self,
        kind: ObjectKind,
        source_conn: &mut Conn,
        target_conn: &mut Conn,
    ) -> Result<Vec<DifferenceRecord>> {
        let no_rules = IgnoreRules::default();
        let rules = self.ignore.rules_for(kind).unwrap_or(&no_rules);

        match kind {
            ObjectKind::Config => {
                let source = introspect::config::fetch_config_variables(source_conn).await?;
                let target = introspect::config::fetch_config_variables(target_conn).await?;
                Ok(vec![diff_config_variables(&source, &target)?])
            }
            ObjectKind::Table => {
                self.compare_tables(source_conn, target_conn, rules).await
            }
            ObjectKind::View => {
                let source = introspect::view::fetch_views(source_conn).await?;
                let target = introspect::view::fetch_views(target_conn).await?;
                diff_text_catalogs(kind, &source, &target, rules)
            }
            ObjectKind::Procedure => {
                let source = introspect::routine::fetch_procedures(source_conn).await?;
                let target = introspect::routine::fetch_procedures(target_conn).await?;
                diff_text_catalogs(kind, &source, &target, rules)
            }
            ObjectKind::Function => {
                let source = introspect::routine::fetch_functions(source_conn).await?;
                let target = introspect::routine::fetch_functions(target_conn).await?;
                diff_text_catalogs(kind, &source, &target, rules)
            }
            ObjectKind::Trigger => {
                let source = introspect::trigger::fetch_triggers(source_conn).await?;
                let target = introspect::trigger::fetch_triggers(target_conn).await?;
                diff_text_catalogs(kind, &source, &target, rules)
            }
        }
    }

    /// 表比对：先按建表语句快照分类存在性，再对两侧都有的表
    /// 逐表采集列/索引/约束做结构化比较
    async fn compare_tables(
        &self,
        source_conn: &mut Conn,
        target_conn: &mut Conn,
        rules: &IgnoreRules,
    ) -> Result<Vec<DifferenceRecord>> {
        let source_tables = introspect::table::fetch_tables(source_conn).await?;
        let target_tables = introspect::table::fetch_tables(target_conn).await?;

        let presence = classify_table_presence(&source_tables, &target_tables, rules);
        let mut records = presence.records;

        for name in &presence.in_both {
            let source = introspect::table::fetch_table_structure(source_conn, name).await?;
            let target = introspect::table::fetch_table_structure(target_conn, name).await?;
            let diff = diff_table_structures(&source, &target);
            records.push(table_record(
                name,
                &source_tables[name],
                &target_tables[name],
                &diff,
            ));
        }

        Ok(records)
    }
}

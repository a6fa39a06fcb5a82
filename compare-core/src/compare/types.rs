use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;

/// 一类数据库对象的目录快照：对象名 -> 规范化定义文本
pub type CatalogSnapshot = HashMap<String, String>;

/// 参与比对的对象类型，顺序即一次运行中比较器的执行顺序
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectKind {
    Config,
    Table,
    View,
    Procedure,
    Function,
    Trigger,
}

impl ObjectKind {
    /// 固定执行顺序：配置与表结构最先，便于尽早暴露连接问题
    pub const ALL: [ObjectKind; 6] = [
        ObjectKind::Config,
        ObjectKind::Table,
        ObjectKind::View,
        ObjectKind::Procedure,
        ObjectKind::Function,
        ObjectKind::Trigger,
    ];

    /// 中文标签，用于日志与差异说明
    pub fn label(&self) -> &'static str {
        match self {
            ObjectKind::Config => "数据库配置",
            ObjectKind::Table => "表",
            ObjectKind::View => "视图",
            ObjectKind::Procedure => "存储过程",
            ObjectKind::Function => "函数",
            ObjectKind::Trigger => "触发器",
        }
    }

    /// DROP 语句使用的SQL关键字；配置类对象没有对应语句
    pub fn drop_keyword(&self) -> Option<&'static str> {
        match self {
            ObjectKind::Config => None,
            ObjectKind::Table => Some("TABLE"),
            ObjectKind::View => Some("VIEW"),
            ObjectKind::Procedure => Some("PROCEDURE"),
            ObjectKind::Function => Some("FUNCTION"),
            ObjectKind::Trigger => Some("TRIGGER"),
        }
    }
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ObjectKind::Config => "config",
            ObjectKind::Table => "table",
            ObjectKind::View => "view",
            ObjectKind::Procedure => "procedure",
            ObjectKind::Function => "function",
            ObjectKind::Trigger => "trigger",
        };
        write!(f, "{name}")
    }
}

/// 单个对象的比对结果
///
/// 约束：`has_differences` 为 false 时 `details` 必须为空对象、
/// `change_sql` 必须为 None。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DifferenceRecord {
    #[serde(rename = "type")]
    pub kind: ObjectKind,
    pub object_name: String,
    pub has_differences: bool,
    pub source_definition: Option<String>,
    pub target_definition: Option<String>,
    pub details: Value,
    pub change_sql: Option<String>,
}

impl DifferenceRecord {
    /// 无差异记录：保留两侧定义供审计
    pub fn unchanged(
        kind: ObjectKind,
        object_name: impl Into<String>,
        source_definition: Option<String>,
        target_definition: Option<String>,
    ) -> Self {
        Self {
            kind,
            object_name: object_name.into(),
            has_differences: false,
            source_definition,
            target_definition,
            details: Value::Object(serde_json::Map::new()),
            change_sql: None,
        }
    }

    /// 有差异记录
    pub fn changed(
        kind: ObjectKind,
        object_name: impl Into<String>,
        source_definition: Option<String>,
        target_definition: Option<String>,
        details: Value,
        change_sql: Option<String>,
    ) -> Self {
        Self {
            kind,
            object_name: object_name.into(),
            has_differences: true,
            source_definition,
            target_definition,
            details,
            change_sql,
        }
    }
}

/// 表的列定义，来源于 SHOW COLUMNS
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSpec {
    #[serde(rename = "type")]
    pub column_type: String,
    pub nullable: bool,
    pub default: Option<String>,
    pub extra: String,
}

/// 表的索引定义，来源于 SHOW INDEX
///
/// "PRIMARY" 是保留索引名，生成SQL时走 ADD/DROP PRIMARY KEY。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexSpec {
    pub unique: bool,
    pub columns: Vec<String>,
}

/// 约束种类
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConstraintKind {
    #[serde(rename = "FOREIGN KEY")]
    ForeignKey,
    #[serde(rename = "UNIQUE")]
    Unique,
}

impl fmt::Display for ConstraintKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConstraintKind::ForeignKey => write!(f, "FOREIGN KEY"),
            ConstraintKind::Unique => write!(f, "UNIQUE"),
        }
    }
}

/// 表的约束定义，来源于 INFORMATION_SCHEMA.KEY_COLUMN_USAGE
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstraintSpec {
    pub kind: ConstraintKind,
    pub columns: Vec<String>,
    pub referenced_table: Option<String>,
    pub referenced_columns: Vec<String>,
}

/// 单张表的完整结构描述
#[derive(Debug, Clone, Default)]
pub struct TableStructure {
    pub columns: HashMap<String, ColumnSpec>,
    pub indexes: HashMap<String, IndexSpec>,
    pub constraints: HashMap<String, ConstraintSpec>,
}

/// 一次运行的差异统计，供通知方使用
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct DiffSummary {
    pub total: usize,
    pub with_differences: usize,
    pub without_differences: usize,
}

impl DiffSummary {
    pub fn from_records(records: &[DifferenceRecord]) -> Self {
        let total = records.len();
        let with_differences = records.iter().filter(|r| r.has_differences).count();
        Self {
            total,
            with_differences,
            without_differences: total - with_differences,
        }
    }
}

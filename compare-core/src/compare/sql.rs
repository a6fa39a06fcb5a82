use super::table::{SideDiff, TableDiff};
use super::types::{ColumnSpec, ConstraintKind, ConstraintSpec, IndexSpec};
use crate::error::CompareError;
use tracing::warn;

/// 由表的结构化差异合成变更SQL
///
/// 逐条目生成 ALTER TABLE 语句，顺序固定为列、索引、约束，
/// 每行一条、以分号结尾。缺少必要字段的约束条目跳过生成但保留差异
/// 记录，单个畸形对象不阻断整张表的脚本。
pub(crate) fn table_change_sql(table_name: &str, diff: &TableDiff) -> Option<String> {
    let mut statements = Vec::new();

    for (name, column_diff) in &diff.columns {
        match column_diff {
            SideDiff::MissingInTarget { source } => {
                statements.push(format!(
                    "ALTER TABLE `{table_name}` ADD COLUMN {};",
                    column_definition(name, source)
                ));
            }
            SideDiff::MissingInSource => {
                statements.push(format!(
                    "ALTER TABLE `{table_name}` DROP COLUMN `{name}`;"
                ));
            }
            // 重申完整的源侧列定义而不是只改差异字段，保证重复执行也收敛
            SideDiff::Changed { source, .. } => {
                statements.push(format!(
                    "ALTER TABLE `{table_name}` MODIFY COLUMN {};",
                    column_definition(name, source)
                ));
            }
        }
    }

    for (name, index_diff) in &diff.indexes {
        match index_diff {
            SideDiff::MissingInTarget { source } => {
                statements.push(add_index_sql(table_name, name, source));
            }
            SideDiff::MissingInSource => {
                if name == "PRIMARY" {
                    statements.push(format!("ALTER TABLE `{table_name}` DROP PRIMARY KEY;"));
                } else {
                    statements.push(format!("ALTER TABLE `{table_name}` DROP INDEX `{name}`;"));
                }
            }
            // 索引定义不同只记录差异，不自动生成重建语句
            SideDiff::Changed { .. } => {}
        }
    }

    for (name, constraint_diff) in &diff.constraints {
        match constraint_diff {
            SideDiff::MissingInTarget { source } => {
                if let Some(sql) = add_constraint_sql(table_name, name, source) {
                    statements.push(sql);
                }
            }
            SideDiff::MissingInSource => {
                statements.push(format!(
                    "ALTER TABLE `{table_name}` DROP CONSTRAINT `{name}`;"
                ));
            }
            SideDiff::Changed { .. } => {}
        }
    }

    if statements.is_empty() {
        None
    } else {
        Some(statements.join("\n"))
    }
}

/// 列定义片段：`名字` 类型 [NOT NULL] [DEFAULT x] [extra]
fn column_definition(name: &str, spec: &ColumnSpec) -> String {
    let mut sql = format!("`{name}` {}", spec.column_type);

    if !spec.nullable {
        sql.push_str(" NOT NULL");
    }
    if let Some(default) = &spec.default {
        sql.push_str(&format!(" DEFAULT {default}"));
    }
    if !spec.extra.is_empty() {
        sql.push_str(&format!(" {}", spec.extra));
    }

    sql
}

/// "PRIMARY" 是保留索引名：主键没有具名索引，走 ADD PRIMARY KEY
fn add_index_sql(table_name: &str, name: &str, spec: &IndexSpec) -> String {
    if name == "PRIMARY" {
        format!(
            "ALTER TABLE `{table_name}` ADD PRIMARY KEY ({});",
            quoted_list(&spec.columns)
        )
    } else if spec.unique {
        format!(
            "ALTER TABLE `{table_name}` ADD UNIQUE INDEX `{name}` ({});",
            quoted_list(&spec.columns)
        )
    } else {
        format!(
            "ALTER TABLE `{table_name}` ADD INDEX `{name}` ({});",
            quoted_list(&spec.columns)
        )
    }
}

/// 约束重建语句；采集不全时跳过该条语句（软失败），差异记录仍保留
fn add_constraint_sql(table_name: &str, name: &str, spec: &ConstraintSpec) -> Option<String> {
    match spec.kind {
        ConstraintKind::ForeignKey => {
            let referenced_table = match &spec.referenced_table {
                Some(t) if !spec.columns.is_empty() && !spec.referenced_columns.is_empty() => t,
                _ => {
                    warn!(
                        "{}",
                        CompareError::synthesis(format!(
                            "外键约束 {name} 缺少列或引用信息，跳过生成"
                        ))
                    );
                    return None;
                }
            };
            Some(format!(
                "ALTER TABLE `{table_name}` ADD CONSTRAINT `{name}` FOREIGN KEY ({}) REFERENCES `{referenced_table}` ({});",
                quoted_list(&spec.columns),
                quoted_list(&spec.referenced_columns)
            ))
        }
        ConstraintKind::Unique => {
            if spec.columns.is_empty() {
                warn!(
                    "{}",
                    CompareError::synthesis(format!("唯一约束 {name} 缺少列信息，跳过生成"))
                );
                return None;
            }
            Some(format!(
                "ALTER TABLE `{table_name}` ADD CONSTRAINT `{name}` UNIQUE ({});",
                quoted_list(&spec.columns)
            ))
        }
    }
}

fn quoted_list(columns: &[String]) -> String {
    columns
        .iter()
        .map(|c| format!("`{c}`"))
        .collect::<Vec<_>>()
        .join(", ")
}

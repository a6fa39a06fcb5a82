use super::sql::table_change_sql;
use super::types::{
    CatalogSnapshot, ColumnSpec, ConstraintKind, ConstraintSpec, DifferenceRecord, IndexSpec,
    ObjectKind, TableStructure,
};
use crate::config::IgnoreRules;
use serde_json::{Map, Value, json};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use tracing::debug;

/// 表内单个条目（列/索引/约束）的差异分类
#[derive(Debug, Clone)]
pub(crate) enum SideDiff<T> {
    /// 仅目标库存在
    MissingInSource,
    /// 仅源库存在，携带源侧定义用于生成变更SQL
    MissingInTarget { source: T },
    /// 两侧都存在但定义不同；fields 为逐字段的 {source, target} 对照
    Changed { source: T, fields: Value },
}

/// 单张表的结构化差异，按列、索引、约束三个维度归类
///
/// 表不做整条 CREATE 语句的文本比对：引擎会重排列顺序、
/// 自动命名约束，文本比对会产生大量假阳性。
#[derive(Debug, Default)]
pub struct TableDiff {
    pub(crate) columns: BTreeMap<String, SideDiff<ColumnSpec>>,
    pub(crate) indexes: BTreeMap<String, SideDiff<IndexSpec>>,
    pub(crate) constraints: BTreeMap<String, SideDiff<ConstraintSpec>>,
}

impl TableDiff {
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty() && self.indexes.is_empty() && self.constraints.is_empty()
    }

    /// 生成差异详情JSON：{"columns": {...}, "indexes": {...}, "constraints": {...}}
    pub fn to_details(&self) -> Value {
        let mut details = Map::new();

        if !self.columns.is_empty() {
            let entries: Map<String, Value> = self
                .columns
                .iter()
                .map(|(name, diff)| (name.clone(), entry_details("列", name, diff)))
                .collect();
            details.insert("columns".to_string(), Value::Object(entries));
        }
        if !self.indexes.is_empty() {
            let entries: Map<String, Value> = self
                .indexes
                .iter()
                .map(|(name, diff)| (name.clone(), entry_details("索引", name, diff)))
                .collect();
            details.insert("indexes".to_string(), Value::Object(entries));
        }
        if !self.constraints.is_empty() {
            let entries: Map<String, Value> = self
                .constraints
                .iter()
                .map(|(name, diff)| (name.clone(), entry_details("约束", name, diff)))
                .collect();
            details.insert("constraints".to_string(), Value::Object(entries));
        }

        Value::Object(details)
    }
}

fn entry_details<T: serde::Serialize>(label: &str, name: &str, diff: &SideDiff<T>) -> Value {
    match diff {
        SideDiff::MissingInSource => json!({
            "type": "missing_in_source",
            "message": format!("{label} {name} 在源表中不存在"),
        }),
        SideDiff::MissingInTarget { source } => json!({
            "type": "missing_in_target",
            "message": format!("{label} {name} 在目标表中不存在"),
            "source": source,
        }),
        SideDiff::Changed { fields, .. } => fields.clone(),
    }
}

/// 对比两侧表结构，产出列/索引/约束三个维度的差异
pub fn diff_table_structures(source: &TableStructure, target: &TableStructure) -> TableDiff {
    TableDiff {
        columns: diff_columns(&source.columns, &target.columns),
        indexes: diff_indexes(&source.indexes, &target.indexes),
        constraints: diff_constraints(&source.constraints, &target.constraints),
    }
}

fn union_names<'a, A, B>(
    source: &'a HashMap<String, A>,
    target: &'a HashMap<String, B>,
) -> BTreeSet<&'a str> {
    source
        .keys()
        .chain(target.keys())
        .map(|s| s.as_str())
        .collect()
}

/// 列按 type/nullable/default/extra 逐字段对比
fn diff_columns(
    source: &HashMap<String, ColumnSpec>,
    target: &HashMap<String, ColumnSpec>,
) -> BTreeMap<String, SideDiff<ColumnSpec>> {
    let mut diffs = BTreeMap::new();

    for name in union_names(source, target) {
        match (source.get(name), target.get(name)) {
            (None, Some(_)) => {
                diffs.insert(name.to_string(), SideDiff::MissingInSource);
            }
            (Some(spec), None) => {
                diffs.insert(
                    name.to_string(),
                    SideDiff::MissingInTarget {
                        source: spec.clone(),
                    },
                );
            }
            (Some(src), Some(tgt)) => {
                let mut fields = Map::new();
                if src.column_type != tgt.column_type {
                    fields.insert(
                        "type".to_string(),
                        json!({"source": src.column_type, "target": tgt.column_type}),
                    );
                }
                if src.nullable != tgt.nullable {
                    fields.insert(
                        "nullable".to_string(),
                        json!({"source": src.nullable, "target": tgt.nullable}),
                    );
                }
                if src.default != tgt.default {
                    fields.insert(
                        "default".to_string(),
                        json!({"source": src.default, "target": tgt.default}),
                    );
                }
                if src.extra != tgt.extra {
                    fields.insert(
                        "extra".to_string(),
                        json!({"source": src.extra, "target": tgt.extra}),
                    );
                }
                if !fields.is_empty() {
                    diffs.insert(
                        name.to_string(),
                        SideDiff::Changed {
                            source: src.clone(),
                            fields: Value::Object(fields),
                        },
                    );
                }
            }
            (None, None) => unreachable!("并集中的列至少存在于一侧"),
        }
    }

    diffs
}

/// 索引比较 unique 标志与列集合；列的出现顺序不参与比较，
/// 不同目录呈现顺序不稳定，集合成员才是结构意义上的差异
fn diff_indexes(
    source: &HashMap<String, IndexSpec>,
    target: &HashMap<String, IndexSpec>,
) -> BTreeMap<String, SideDiff<IndexSpec>> {
    let mut diffs = BTreeMap::new();

    for name in union_names(source, target) {
        match (source.get(name), target.get(name)) {
            (None, Some(_)) => {
                diffs.insert(name.to_string(), SideDiff::MissingInSource);
            }
            (Some(spec), None) => {
                diffs.insert(
                    name.to_string(),
                    SideDiff::MissingInTarget {
                        source: spec.clone(),
                    },
                );
            }
            (Some(src), Some(tgt)) => {
                let mut fields = Map::new();
                if src.unique != tgt.unique {
                    fields.insert(
                        "unique".to_string(),
                        json!({"source": src.unique, "target": tgt.unique}),
                    );
                }
                if as_set(&src.columns) != as_set(&tgt.columns) {
                    fields.insert(
                        "columns".to_string(),
                        json!({"source": src.columns, "target": tgt.columns}),
                    );
                }
                if !fields.is_empty() {
                    diffs.insert(
                        name.to_string(),
                        SideDiff::Changed {
                            source: src.clone(),
                            fields: Value::Object(fields),
                        },
                    );
                }
            }
            (None, None) => unreachable!("并集中的索引至少存在于一侧"),
        }
    }

    diffs
}

/// 约束比较种类与列集合；引用信息只在两侧都是外键时参与比较
fn diff_constraints(
    source: &HashMap<String, ConstraintSpec>,
    target: &HashMap<String, ConstraintSpec>,
) -> BTreeMap<String, SideDiff<ConstraintSpec>> {
    let mut diffs = BTreeMap::new();

    for name in union_names(source, target) {
        match (source.get(name), target.get(name)) {
            (None, Some(_)) => {
                diffs.insert(name.to_string(), SideDiff::MissingInSource);
            }
            (Some(spec), None) => {
                diffs.insert(
                    name.to_string(),
                    SideDiff::MissingInTarget {
                        source: spec.clone(),
                    },
                );
            }
            (Some(src), Some(tgt)) => {
                let mut fields = Map::new();
                if src.kind != tgt.kind {
                    fields.insert(
                        "type".to_string(),
                        json!({"source": src.kind, "target": tgt.kind}),
                    );
                }
                if as_set(&src.columns) != as_set(&tgt.columns) {
                    fields.insert(
                        "columns".to_string(),
                        json!({"source": src.columns, "target": tgt.columns}),
                    );
                }
                if src.kind == ConstraintKind::ForeignKey && tgt.kind == ConstraintKind::ForeignKey
                {
                    if src.referenced_table != tgt.referenced_table {
                        fields.insert(
                            "referenced_table".to_string(),
                            json!({"source": src.referenced_table, "target": tgt.referenced_table}),
                        );
                    }
                    if as_set(&src.referenced_columns) != as_set(&tgt.referenced_columns) {
                        fields.insert(
                            "referenced_columns".to_string(),
                            json!({
                                "source": src.referenced_columns,
                                "target": tgt.referenced_columns,
                            }),
                        );
                    }
                }
                if !fields.is_empty() {
                    diffs.insert(
                        name.to_string(),
                        SideDiff::Changed {
                            source: src.clone(),
                            fields: Value::Object(fields),
                        },
                    );
                }
            }
            (None, None) => unreachable!("并集中的约束至少存在于一侧"),
        }
    }

    diffs
}

fn as_set(columns: &[String]) -> BTreeSet<&str> {
    columns.iter().map(|s| s.as_str()).collect()
}

/// 表存在性分类的产出：单侧缺失的差异记录，
/// 以及需要继续做结构化比较的两侧共有表
#[derive(Debug, Default)]
pub struct TablePresence {
    pub records: Vec<DifferenceRecord>,
    pub in_both: Vec<String>,
}

/// 按建表语句快照对两侧的表做存在性分类
///
/// 取两侧表名并集、剔除忽略规则命中的表：单侧缺失直接产出差异记录，
/// 两侧都有的表留给逐表的结构化比较。
pub fn classify_table_presence(
    source: &CatalogSnapshot,
    target: &CatalogSnapshot,
    ignore: &IgnoreRules,
) -> TablePresence {
    let all_names: BTreeSet<&str> = source
        .keys()
        .chain(target.keys())
        .map(|s| s.as_str())
        .collect();

    let mut presence = TablePresence::default();
    for name in all_names {
        if ignore.is_ignored(name) {
            debug!("按忽略规则跳过表: {}", name);
            continue;
        }

        match (source.get(name), target.get(name)) {
            (None, Some(target_def)) => {
                presence.records.push(table_missing_in_source(name, target_def));
            }
            (Some(source_def), None) => {
                presence.records.push(table_missing_in_target(name, source_def));
            }
            (Some(_), Some(_)) => presence.in_both.push(name.to_string()),
            (None, None) => unreachable!("并集中的表至少存在于一侧"),
        }
    }

    presence
}

/// 表在源库缺失：记录差异并生成幂等 DROP
pub fn table_missing_in_source(name: &str, target_def: &str) -> DifferenceRecord {
    DifferenceRecord::changed(
        ObjectKind::Table,
        name,
        None,
        Some(target_def.to_string()),
        json!({
            "type": "missing_in_source",
            "message": format!("表 {name} 在源数据库中不存在"),
        }),
        Some(format!("DROP TABLE IF EXISTS `{name}`;")),
    )
}

/// 表在目标库缺失：以源库的完整建表语句重建
pub fn table_missing_in_target(name: &str, source_def: &str) -> DifferenceRecord {
    DifferenceRecord::changed(
        ObjectKind::Table,
        name,
        Some(source_def.to_string()),
        None,
        json!({
            "type": "missing_in_target",
            "message": format!("表 {name} 在目标数据库中不存在"),
        }),
        Some(source_def.to_string()),
    )
}

/// 两侧都存在的表：由结构化差异生成记录
pub fn table_record(
    name: &str,
    source_def: &str,
    target_def: &str,
    diff: &TableDiff,
) -> DifferenceRecord {
    if diff.is_empty() {
        DifferenceRecord::unchanged(
            ObjectKind::Table,
            name,
            Some(source_def.to_string()),
            Some(target_def.to_string()),
        )
    } else {
        DifferenceRecord::changed(
            ObjectKind::Table,
            name,
            Some(source_def.to_string()),
            Some(target_def.to_string()),
            diff.to_details(),
            table_change_sql(name, diff),
        )
    }
}

use super::types::{DifferenceRecord, ObjectKind};
use crate::error::Result;
use serde_json::{Map, Value, json};
use std::collections::BTreeMap;

/// 数据库配置比对结果固定挂在这个合成对象名下
pub const CONFIG_OBJECT_NAME: &str = "database_config";

/// 比较两侧的字符集/排序规则变量，产出单条差异记录
pub fn diff_config_variables(
    source: &BTreeMap<String, String>,
    target: &BTreeMap<String, String>,
) -> Result<DifferenceRecord> {
    let mut details = Map::new();

    for (key, source_value) in source {
        match target.get(key) {
            None => {
                details.insert(
                    key.clone(),
                    json!({
                        "type": "missing_in_target",
                        "source_value": source_value,
                    }),
                );
            }
            Some(target_value) if target_value != source_value => {
                details.insert(
                    key.clone(),
                    json!({
                        "type": "value_mismatch",
                        "source_value": source_value,
                        "target_value": target_value,
                    }),
                );
            }
            Some(_) => {}
        }
    }

    for (key, target_value) in target {
        if !source.contains_key(key) {
            details.insert(
                key.clone(),
                json!({
                    "type": "missing_in_source",
                    "target_value": target_value,
                }),
            );
        }
    }

    let source_definition = Some(serde_json::to_string(source)?);
    let target_definition = Some(serde_json::to_string(target)?);

    if details.is_empty() {
        return Ok(DifferenceRecord::unchanged(
            ObjectKind::Config,
            CONFIG_OBJECT_NAME,
            source_definition,
            target_definition,
        ));
    }

    let change_sql = config_change_sql(&details);
    Ok(DifferenceRecord::changed(
        ObjectKind::Config,
        CONFIG_OBJECT_NAME,
        source_definition,
        target_definition,
        Value::Object(details),
        change_sql,
    ))
}

/// 只有取值不一致的变量能生成对齐语句；单侧缺失的变量
/// 通常是版本差异，没有可执行的修正SQL
fn config_change_sql(details: &Map<String, Value>) -> Option<String> {
    let mut statements = Vec::new();

    for (key, diff) in details {
        if diff.get("type").and_then(Value::as_str) != Some("value_mismatch") {
            continue;
        }
        let Some(source_value) = diff.get("source_value").and_then(Value::as_str) else {
            continue;
        };
        if key.contains("character_set") {
            statements.push(format!("ALTER DATABASE CHARACTER SET = {source_value};"));
        } else if key.contains("collation") {
            statements.push(format!("ALTER DATABASE COLLATE = {source_value};"));
        }
    }

    if statements.is_empty() {
        None
    } else {
        Some(statements.join("\n"))
    }
}

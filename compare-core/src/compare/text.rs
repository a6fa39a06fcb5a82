use super::normalize::definitions_equivalent;
use super::types::{CatalogSnapshot, DifferenceRecord, ObjectKind};
use crate::config::IgnoreRules;
use crate::error::Result;
use serde_json::json;
use std::collections::BTreeSet;
use tracing::debug;

/// 基于定义文本的通用比较器，覆盖视图/存储过程/函数/触发器
///
/// 流程：取两侧对象名的并集，剔除忽略规则命中的对象，逐个分类：
/// 仅目标库存在 -> 生成 DROP 语句；仅源库存在 -> 以源库定义重建；
/// 两侧都存在 -> 比较规范化后的定义文本。
pub fn diff_text_catalogs(
    kind: ObjectKind,
    source: &CatalogSnapshot,
    target: &CatalogSnapshot,
    ignore: &IgnoreRules,
) -> Result<Vec<DifferenceRecord>> {
    let mut results = Vec::new();

    // 排序后的并集，保证输出顺序稳定
    let all_names: BTreeSet<&str> = source
        .keys()
        .chain(target.keys())
        .map(|s| s.as_str())
        .collect();

    for name in all_names {
        if ignore.is_ignored(name) {
            debug!("按忽略规则跳过{}: {}", kind.label(), name);
            continue;
        }

        let record = match (source.get(name), target.get(name)) {
            (None, Some(target_def)) => missing_in_source(kind, name, target_def),
            (Some(source_def), None) => missing_in_target(kind, name, source_def),
            (Some(source_def), Some(target_def)) => {
                if definitions_equivalent(source_def, target_def)? {
                    DifferenceRecord::unchanged(
                        kind,
                        name,
                        Some(source_def.clone()),
                        Some(target_def.clone()),
                    )
                } else {
                    definition_mismatch(kind, name, source_def, target_def)
                }
            }
            (None, None) => unreachable!("并集中的对象至少存在于一侧"),
        };
        results.push(record);
    }

    Ok(results)
}

/// 对象在源库缺失：目标库多出的对象，变更SQL为幂等 DROP
fn missing_in_source(kind: ObjectKind, name: &str, target_def: &str) -> DifferenceRecord {
    DifferenceRecord::changed(
        kind,
        name,
        None,
        Some(target_def.to_string()),
        json!({
            "type": "missing_in_source",
            "message": format!("{} {} 在源数据库中不存在", kind.label(), name),
        }),
        Some(drop_statement(kind, name)),
    )
}

/// 对象在目标库缺失：变更SQL为源库的完整创建语句
fn missing_in_target(kind: ObjectKind, name: &str, source_def: &str) -> DifferenceRecord {
    DifferenceRecord::changed(
        kind,
        name,
        Some(source_def.to_string()),
        None,
        json!({
            "type": "missing_in_target",
            "message": format!("{} {} 在目标数据库中不存在", kind.label(), name),
        }),
        Some(source_def.to_string()),
    )
}

/// 定义不一致：先删后建
fn definition_mismatch(
    kind: ObjectKind,
    name: &str,
    source_def: &str,
    target_def: &str,
) -> DifferenceRecord {
    let change_sql = format!("{}\n{}", drop_statement(kind, name), source_def);
    DifferenceRecord::changed(
        kind,
        name,
        Some(source_def.to_string()),
        Some(target_def.to_string()),
        json!({
            "type": "definition_mismatch",
            "message": format!("{} {} 的定义不同", kind.label(), name),
        }),
        Some(change_sql),
    )
}

fn drop_statement(kind: ObjectKind, name: &str) -> String {
    let Some(keyword) = kind.drop_keyword() else {
        unreachable!("配置类对象不会进入文本比较器")
    };
    format!("DROP {keyword} IF EXISTS `{name}`;")
}

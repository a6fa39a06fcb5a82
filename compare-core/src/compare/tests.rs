use super::*;
use crate::config::IgnoreRules;
use std::collections::HashMap;

fn snapshot(entries: &[(&str, &str)]) -> CatalogSnapshot {
    entries
        .iter()
        .map(|(name, def)| (name.to_string(), def.to_string()))
        .collect()
}

fn column(column_type: &str, nullable: bool, default: Option<&str>, extra: &str) -> ColumnSpec {
    ColumnSpec {
        column_type: column_type.to_string(),
        nullable,
        default: default.map(|s| s.to_string()),
        extra: extra.to_string(),
    }
}

fn index(unique: bool, columns: &[&str]) -> IndexSpec {
    IndexSpec {
        unique,
        columns: columns.iter().map(|s| s.to_string()).collect(),
    }
}

fn foreign_key(columns: &[&str], referenced_table: &str, referenced_columns: &[&str]) -> ConstraintSpec {
    ConstraintSpec {
        kind: ConstraintKind::ForeignKey,
        columns: columns.iter().map(|s| s.to_string()).collect(),
        referenced_table: Some(referenced_table.to_string()),
        referenced_columns: referenced_columns.iter().map(|s| s.to_string()).collect(),
    }
}

fn structure(
    columns: &[(&str, ColumnSpec)],
    indexes: &[(&str, IndexSpec)],
    constraints: &[(&str, ConstraintSpec)],
) -> TableStructure {
    TableStructure {
        columns: columns
            .iter()
            .map(|(n, c)| (n.to_string(), c.clone()))
            .collect(),
        indexes: indexes
            .iter()
            .map(|(n, i)| (n.to_string(), i.clone()))
            .collect(),
        constraints: constraints
            .iter()
            .map(|(n, c)| (n.to_string(), c.clone()))
            .collect(),
    }
}

#[test]
fn test_normalize_strips_comments_and_whitespace() {
    let raw = r#"CREATE VIEW `v1` AS
        /* 汇总视图
           多行注释 */
        SELECT  id,   name
        FROM users -- 行尾注释
        # 整行注释
        WHERE id > 0"#;

    let normalized = normalize_definition(raw).unwrap();
    assert_eq!(
        normalized,
        "CREATE VIEW `v1` AS SELECT id, name FROM users WHERE id > 0"
    );

    // 规范化是幂等的
    assert_eq!(normalize_definition(&normalized).unwrap(), normalized);
}

#[test]
fn test_cosmetic_differences_are_equivalent() {
    let source = "CREATE VIEW `v1` AS SELECT id FROM t /* note */";
    let target = "CREATE VIEW `v1`   AS\n  SELECT id\n  FROM t";
    assert!(definitions_equivalent(source, target).unwrap());

    let changed = "CREATE VIEW `v1` AS SELECT id, name FROM t";
    assert!(!definitions_equivalent(source, changed).unwrap());
}

#[test]
fn test_text_diff_union_completeness() {
    let source = snapshot(&[("a", "CREATE VIEW a"), ("b", "CREATE VIEW b")]);
    let target = snapshot(&[("b", "CREATE VIEW b"), ("c", "CREATE VIEW c")]);

    let records =
        diff_text_catalogs(ObjectKind::View, &source, &target, &IgnoreRules::default()).unwrap();

    let names: Vec<&str> = records.iter().map(|r| r.object_name.as_str()).collect();
    // 两侧并集，无重复，按名称排序
    assert_eq!(names, vec!["a", "b", "c"]);
}

#[test]
fn test_text_diff_missing_classification() {
    let source = snapshot(&[("only_in_source", "CREATE VIEW `only_in_source` AS SELECT 1")]);
    let target = snapshot(&[("only_in_target", "CREATE VIEW `only_in_target` AS SELECT 2")]);

    let records =
        diff_text_catalogs(ObjectKind::View, &source, &target, &IgnoreRules::default()).unwrap();
    assert_eq!(records.len(), 2);

    let missing_in_target = records
        .iter()
        .find(|r| r.object_name == "only_in_source")
        .unwrap();
    assert!(missing_in_target.has_differences);
    assert_eq!(missing_in_target.details["type"], "missing_in_target");
    // 目标库缺失：变更SQL就是源库的完整创建语句
    assert_eq!(
        missing_in_target.change_sql.as_deref(),
        Some("CREATE VIEW `only_in_source` AS SELECT 1")
    );

    let missing_in_source = records
        .iter()
        .find(|r| r.object_name == "only_in_target")
        .unwrap();
    assert_eq!(missing_in_source.details["type"], "missing_in_source");
    assert_eq!(
        missing_in_source.change_sql.as_deref(),
        Some("DROP VIEW IF EXISTS `only_in_target`;")
    );
}

#[test]
fn test_text_diff_definition_mismatch_drops_then_recreates() {
    let source = snapshot(&[("p1", "CREATE PROCEDURE `p1`() BEGIN SELECT 1; END")]);
    let target = snapshot(&[("p1", "CREATE PROCEDURE `p1`() BEGIN SELECT 2; END")]);

    let records = diff_text_catalogs(
        ObjectKind::Procedure,
        &source,
        &target,
        &IgnoreRules::default(),
    )
    .unwrap();
    assert_eq!(records.len(), 1);

    let record = &records[0];
    assert!(record.has_differences);
    assert_eq!(record.details["type"], "definition_mismatch");
    let sql = record.change_sql.as_deref().unwrap();
    assert!(sql.starts_with("DROP PROCEDURE IF EXISTS `p1`;"));
    assert!(sql.contains("CREATE PROCEDURE `p1`() BEGIN SELECT 1; END"));
}

#[test]
fn test_text_diff_equivalent_definitions_produce_clean_record() {
    let source = snapshot(&[("f1", "CREATE FUNCTION `f1`() RETURNS INT RETURN 1 -- 注释")]);
    let target = snapshot(&[("f1", "CREATE FUNCTION `f1`()\n  RETURNS INT\n  RETURN 1")]);

    let records = diff_text_catalogs(
        ObjectKind::Function,
        &source,
        &target,
        &IgnoreRules::default(),
    )
    .unwrap();
    assert_eq!(records.len(), 1);

    let record = &records[0];
    assert!(!record.has_differences);
    // 无差异记录仍保留两侧定义供审计
    assert!(record.source_definition.is_some());
    assert!(record.target_definition.is_some());
}

#[test]
fn test_ignore_policy_excludes_exact_and_prefix() {
    let source = snapshot(&[
        ("tmp_staging", "CREATE VIEW tmp_staging"),
        ("v_debug", "CREATE VIEW v_debug"),
        ("orders", "CREATE VIEW orders"),
    ]);
    let target = snapshot(&[("orders", "CREATE VIEW orders")]);

    let ignore = IgnoreRules {
        exact: vec!["v_debug".to_string()],
        prefixes: vec!["tmp_".to_string()],
    };

    let records = diff_text_catalogs(ObjectKind::View, &source, &target, &ignore).unwrap();
    let names: Vec<&str> = records.iter().map(|r| r.object_name.as_str()).collect();
    // 被忽略的对象完全不出现在结果中，即使它确有差异
    assert_eq!(names, vec!["orders"]);
}

#[test]
fn test_difference_free_invariant() {
    let source = snapshot(&[("v1", "CREATE VIEW v1 AS SELECT 1")]);
    let target = snapshot(&[("v1", "CREATE VIEW v1 AS SELECT 1")]);

    let records =
        diff_text_catalogs(ObjectKind::View, &source, &target, &IgnoreRules::default()).unwrap();

    for record in &records {
        if !record.has_differences {
            assert_eq!(record.details, serde_json::json!({}));
            assert!(record.change_sql.is_none());
        }
    }
}

#[test]
fn test_column_drift_scenario() {
    // 源表: a INT NOT NULL；目标表: a INT NULL DEFAULT 0
    let source = structure(
        &[("a", column("int", false, None, ""))],
        &[],
        &[],
    );
    let target = structure(
        &[("a", column("int", true, Some("0"), ""))],
        &[],
        &[],
    );

    let diff = diff_table_structures(&source, &target);
    assert!(!diff.is_empty());

    let record = table_record("t1", "CREATE TABLE t1 (...)", "CREATE TABLE t1 (...)", &diff);
    assert!(record.has_differences);

    let column_diff = &record.details["columns"]["a"];
    assert!(column_diff.get("nullable").is_some());
    assert!(column_diff.get("default").is_some());
    assert!(column_diff.get("type").is_none());

    let sql = record.change_sql.as_deref().unwrap();
    assert_eq!(sql, "ALTER TABLE `t1` MODIFY COLUMN `a` int NOT NULL;");
}

#[test]
fn test_index_column_order_is_ignored() {
    let source = structure(
        &[],
        &[("idx_ab", index(false, &["a", "b"]))],
        &[],
    );
    let reordered = structure(
        &[],
        &[("idx_ab", index(false, &["b", "a"]))],
        &[],
    );
    // 列顺序不同、集合相同：无差异
    assert!(diff_table_structures(&source, &reordered).is_empty());

    let different = structure(
        &[],
        &[("idx_ab", index(false, &["a", "c"]))],
        &[],
    );
    // 集合不同：有差异
    let diff = diff_table_structures(&source, &different);
    assert!(!diff.is_empty());
    let details = diff.to_details();
    assert!(details["indexes"]["idx_ab"].get("columns").is_some());
}

#[test]
fn test_missing_column_and_index_sql_synthesis() {
    let source = structure(
        &[
            ("id", column("int", false, None, "auto_increment")),
            ("email", column("varchar(255)", true, Some("'unknown'"), "")),
        ],
        &[
            ("PRIMARY", index(true, &["id"])),
            ("idx_email", index(true, &["email"])),
        ],
        &[],
    );
    let target = structure(
        &[("id", column("int", false, None, "auto_increment"))],
        &[("PRIMARY", index(true, &["id"]))],
        &[],
    );

    let diff = diff_table_structures(&source, &target);
    let sql = table_change_sql_for_test("users", &diff);

    assert!(sql.contains("ALTER TABLE `users` ADD COLUMN `email` varchar(255) DEFAULT 'unknown';"));
    assert!(sql.contains("ALTER TABLE `users` ADD UNIQUE INDEX `idx_email` (`email`);"));
}

#[test]
fn test_primary_key_uses_reserved_syntax() {
    let with_pk = structure(&[], &[("PRIMARY", index(true, &["id"]))], &[]);
    let without_pk = structure(&[], &[], &[]);

    // 目标缺主键 -> ADD PRIMARY KEY，不带索引名
    let diff = diff_table_structures(&with_pk, &without_pk);
    let sql = table_change_sql_for_test("t", &diff);
    assert_eq!(sql, "ALTER TABLE `t` ADD PRIMARY KEY (`id`);");

    // 源缺主键 -> DROP PRIMARY KEY
    let diff = diff_table_structures(&without_pk, &with_pk);
    let sql = table_change_sql_for_test("t", &diff);
    assert_eq!(sql, "ALTER TABLE `t` DROP PRIMARY KEY;");
}

#[test]
fn test_statement_order_is_columns_indexes_constraints() {
    let source = structure(
        &[("new_col", column("int", true, None, ""))],
        &[("idx_new", index(false, &["new_col"]))],
        &[("fk_new", foreign_key(&["new_col"], "other", &["id"]))],
    );
    let target = structure(&[], &[], &[]);

    let diff = diff_table_structures(&source, &target);
    let sql = table_change_sql_for_test("t", &diff);
    let lines: Vec<&str> = sql.lines().collect();

    assert_eq!(lines.len(), 3);
    assert!(lines[0].contains("ADD COLUMN"));
    assert!(lines[1].contains("ADD INDEX"));
    assert!(lines[2].contains("ADD CONSTRAINT"));
    // 每条语句以分号结尾
    assert!(lines.iter().all(|l| l.ends_with(';')));
}

#[test]
fn test_foreign_key_synthesis() {
    let source = structure(
        &[],
        &[],
        &[("fk_user", foreign_key(&["user_id"], "users", &["id"]))],
    );
    let target = structure(&[], &[], &[]);

    let diff = diff_table_structures(&source, &target);
    let sql = table_change_sql_for_test("orders", &diff);
    assert_eq!(
        sql,
        "ALTER TABLE `orders` ADD CONSTRAINT `fk_user` FOREIGN KEY (`user_id`) REFERENCES `users` (`id`);"
    );

    // 反向：源库缺约束 -> DROP CONSTRAINT
    let diff = diff_table_structures(&target, &source);
    let sql = table_change_sql_for_test("orders", &diff);
    assert_eq!(sql, "ALTER TABLE `orders` DROP CONSTRAINT `fk_user`;");
}

#[test]
fn test_malformed_constraint_skips_statement_but_keeps_record() {
    let broken = ConstraintSpec {
        kind: ConstraintKind::ForeignKey,
        columns: vec!["user_id".to_string()],
        referenced_table: None,
        referenced_columns: vec![],
    };
    let source = structure(
        &[("new_col", column("int", true, None, ""))],
        &[],
        &[("fk_broken", broken)],
    );
    let target = structure(&[], &[], &[]);

    let diff = diff_table_structures(&source, &target);
    // 差异仍然记录
    assert!(diff.to_details()["constraints"]["fk_broken"].is_object());

    // 但畸形约束不产生语句，其余语句照常生成
    let record = table_record("t", "CREATE TABLE t (...)", "CREATE TABLE t (...)", &diff);
    let sql = record.change_sql.as_deref().unwrap();
    assert!(sql.contains("ADD COLUMN `new_col`"));
    assert!(!sql.contains("fk_broken"));
}

#[test]
fn test_constraint_references_only_compared_between_foreign_keys() {
    let unique_a = ConstraintSpec {
        kind: ConstraintKind::Unique,
        columns: vec!["a".to_string()],
        referenced_table: None,
        referenced_columns: vec![],
    };
    let unique_b = ConstraintSpec {
        kind: ConstraintKind::Unique,
        columns: vec!["a".to_string()],
        referenced_table: Some("ghost".to_string()),
        referenced_columns: vec!["x".to_string()],
    };

    // 两侧都是唯一约束：引用信息差异不参与比较
    let source = structure(&[], &[], &[("uq_a", unique_a)]);
    let target = structure(&[], &[], &[("uq_a", unique_b)]);
    assert!(diff_table_structures(&source, &target).is_empty());
}

#[test]
fn test_table_ignore_prefix_scenario() {
    // 源库有 tmp_staging，目标库没有；前缀忽略规则生效后不产生任何记录
    let source = snapshot(&[
        ("tmp_staging", "CREATE TABLE `tmp_staging` (`id` int)"),
        ("orders", "CREATE TABLE `orders` (`id` int)"),
    ]);
    let target = snapshot(&[("orders", "CREATE TABLE `orders` (`id` int)")]);

    let ignore = IgnoreRules {
        exact: vec![],
        prefixes: vec!["tmp_".to_string()],
    };

    let presence = classify_table_presence(&source, &target, &ignore);
    assert!(presence.records.is_empty());
    assert_eq!(presence.in_both, vec!["orders".to_string()]);
}

#[test]
fn test_table_presence_classification() {
    let source = snapshot(&[
        ("both", "CREATE TABLE `both` (`id` int)"),
        ("only_source", "CREATE TABLE `only_source` (`id` int)"),
    ]);
    let target = snapshot(&[
        ("both", "CREATE TABLE `both` (`id` int)"),
        ("only_target", "CREATE TABLE `only_target` (`id` int)"),
    ]);

    let presence = classify_table_presence(&source, &target, &IgnoreRules::default());
    assert_eq!(presence.in_both, vec!["both".to_string()]);
    assert_eq!(presence.records.len(), 2);

    let missing_in_target = presence
        .records
        .iter()
        .find(|r| r.object_name == "only_source")
        .unwrap();
    assert_eq!(missing_in_target.details["type"], "missing_in_target");
    assert_eq!(
        missing_in_target.change_sql.as_deref(),
        Some("CREATE TABLE `only_source` (`id` int)")
    );

    let missing_in_source = presence
        .records
        .iter()
        .find(|r| r.object_name == "only_target")
        .unwrap();
    assert_eq!(missing_in_source.details["type"], "missing_in_source");
    assert_eq!(
        missing_in_source.change_sql.as_deref(),
        Some("DROP TABLE IF EXISTS `only_target`;")
    );
}

#[test]
fn test_table_missing_records() {
    let record = table_missing_in_target("users", "CREATE TABLE `users` (`id` int)");
    assert!(record.has_differences);
    assert_eq!(record.details["type"], "missing_in_target");
    assert_eq!(
        record.change_sql.as_deref(),
        Some("CREATE TABLE `users` (`id` int)")
    );

    let record = table_missing_in_source("legacy", "CREATE TABLE `legacy` (`id` int)");
    assert_eq!(record.details["type"], "missing_in_source");
    assert_eq!(
        record.change_sql.as_deref(),
        Some("DROP TABLE IF EXISTS `legacy`;")
    );
}

#[test]
fn test_identical_tables_produce_clean_record() {
    let spec = structure(
        &[("id", column("int", false, None, "auto_increment"))],
        &[("PRIMARY", index(true, &["id"]))],
        &[],
    );
    let diff = diff_table_structures(&spec, &spec);
    assert!(diff.is_empty());

    let record = table_record("t", "CREATE TABLE t (...)", "CREATE TABLE t (...)", &diff);
    assert!(!record.has_differences);
    assert_eq!(record.details, serde_json::json!({}));
    assert!(record.change_sql.is_none());
}

#[test]
fn test_config_diff_value_mismatch_generates_alter_database() {
    let source: std::collections::BTreeMap<String, String> = [
        ("character_set_server", "utf8mb4"),
        ("collation_server", "utf8mb4_general_ci"),
        ("character_set_database", "utf8mb4"),
    ]
    .iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect();

    let mut target = source.clone();
    target.insert("character_set_server".to_string(), "latin1".to_string());
    target.insert("collation_server".to_string(), "latin1_swedish_ci".to_string());

    let record = diff_config_variables(&source, &target).unwrap();
    assert!(record.has_differences);
    assert_eq!(record.object_name, CONFIG_OBJECT_NAME);
    assert_eq!(
        record.details["character_set_server"]["type"],
        "value_mismatch"
    );

    let sql = record.change_sql.as_deref().unwrap();
    assert!(sql.contains("ALTER DATABASE CHARACTER SET = utf8mb4;"));
    assert!(sql.contains("ALTER DATABASE COLLATE = utf8mb4_general_ci;"));
}

#[test]
fn test_config_diff_missing_keys_have_no_change_sql() {
    let mut source = std::collections::BTreeMap::new();
    source.insert("character_set_server".to_string(), "utf8mb4".to_string());
    let target = std::collections::BTreeMap::new();

    let record = diff_config_variables(&source, &target).unwrap();
    assert!(record.has_differences);
    assert_eq!(
        record.details["character_set_server"]["type"],
        "missing_in_target"
    );
    // 单侧缺失的变量没有可执行的修正SQL
    assert!(record.change_sql.is_none());
}

#[test]
fn test_config_diff_identical_is_clean() {
    let mut vars = std::collections::BTreeMap::new();
    vars.insert("character_set_server".to_string(), "utf8mb4".to_string());

    let record = diff_config_variables(&vars, &vars).unwrap();
    assert!(!record.has_differences);
    assert!(record.change_sql.is_none());
}

#[test]
fn test_records_serialize_with_snake_case_kind() {
    let record = DifferenceRecord::unchanged(ObjectKind::Procedure, "p1", None, None);
    let json = serde_json::to_value(&record).unwrap();
    assert_eq!(json["type"], "procedure");
    assert_eq!(json["has_differences"], false);
}

// 表SQL生成入口是 crate 内部接口，测试经由 table_record 间接触达
fn table_change_sql_for_test(table: &str, diff: &TableDiff) -> String {
    table_record(table, "CREATE TABLE ...", "CREATE TABLE ...", diff)
        .change_sql
        .unwrap_or_default()
}

#[test]
fn test_union_completeness_across_structures() {
    // 任意两侧列集合的并集减忽略集，等于输出键集合
    let source = structure(
        &[
            ("a", column("int", true, None, "")),
            ("b", column("int", true, None, "")),
        ],
        &[],
        &[],
    );
    let target = structure(
        &[
            ("b", column("bigint", true, None, "")),
            ("c", column("int", true, None, "")),
        ],
        &[],
        &[],
    );

    let diff = diff_table_structures(&source, &target);
    let details = diff.to_details();
    let columns = details["columns"].as_object().unwrap();
    let mut keys: Vec<&str> = columns.keys().map(|s| s.as_str()).collect();
    keys.sort();
    // a 仅在源侧，b 类型不同，c 仅在目标侧
    assert_eq!(keys, vec!["a", "b", "c"]);
}

#[test]
fn test_snapshot_type_alias_is_plain_map() {
    let mut snapshot: CatalogSnapshot = HashMap::new();
    snapshot.insert("t".to_string(), "CREATE TABLE t".to_string());
    assert_eq!(snapshot.get("t").map(|s| s.as_str()), Some("CREATE TABLE t"));
}

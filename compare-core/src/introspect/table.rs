use crate::compare::{CatalogSnapshot, ColumnSpec, ConstraintKind, ConstraintSpec, IndexSpec, ObjectKind, TableStructure};
use crate::error::{CompareError, Result};
use mysql_async::prelude::Queryable;
use mysql_async::{Conn, Row};
use std::collections::HashMap;

/// 列出当前库的所有基表及其建表语句
pub async fn fetch_tables(conn: &mut Conn) -> Result<CatalogSnapshot> {
    let names: Vec<String> = conn
        .query(
            r"SELECT TABLE_NAME
              FROM INFORMATION_SCHEMA.TABLES
              WHERE TABLE_SCHEMA = DATABASE()
              AND TABLE_TYPE = 'BASE TABLE'",
        )
        .await?;

    let mut tables = CatalogSnapshot::new();
    for name in names {
        let row: Option<(String, String)> = conn
            .query_first(format!("SHOW CREATE TABLE `{name}`"))
            .await
            .map_err(|e| CompareError::introspection(ObjectKind::Table, &name, e.to_string()))?;
        let (_, create_stmt) = row.ok_or_else(|| {
            CompareError::introspection(ObjectKind::Table, &name, "无法获取建表语句")
        })?;
        tables.insert(name, create_stmt);
    }

    Ok(tables)
}

/// 采集单张表的列、索引、约束定义
pub async fn fetch_table_structure(conn: &mut Conn, table: &str) -> Result<TableStructure> {
    Ok(TableStructure {
        columns: fetch_columns(conn, table).await?,
        indexes: fetch_indexes(conn, table).await?,
        constraints: fetch_constraints(conn, table).await?,
    })
}

async fn fetch_columns(
    conn: &mut Conn,
    table: &str,
) -> Result<HashMap<String, ColumnSpec>> {
    let rows: Vec<(String, String, String, String, Option<String>, String)> = conn
        .query(format!("SHOW COLUMNS FROM `{table}`"))
        .await
        .map_err(|e| CompareError::introspection(ObjectKind::Table, table, e.to_string()))?;

    let mut columns = HashMap::new();
    for (field, column_type, nullable, _key, default, extra) in rows {
        columns.insert(
            field,
            ColumnSpec {
                column_type,
                nullable: nullable == "YES",
                default,
                extra,
            },
        );
    }

    Ok(columns)
}

async fn fetch_indexes(
    conn: &mut Conn,
    table: &str,
) -> Result<HashMap<String, IndexSpec>> {
    let rows: Vec<Row> = conn
        .query(format!("SHOW INDEX FROM `{table}`"))
        .await
        .map_err(|e| CompareError::introspection(ObjectKind::Table, table, e.to_string()))?;

    let mut indexes = HashMap::new();
    for row in rows {
        let non_unique: i64 = row.get(1).ok_or_else(|| {
            CompareError::introspection(ObjectKind::Table, table, "索引行缺少 Non_unique 列")
        })?;
        let key_name: String = row.get(2).ok_or_else(|| {
            CompareError::introspection(ObjectKind::Table, table, "索引行缺少 Key_name 列")
        })?;
        // 函数索引等场景下 Column_name 为 NULL，跳过该成员
        let column: Option<String> = row.get::<Option<String>, _>(4).flatten();

        let entry = indexes.entry(key_name).or_insert_with(|| IndexSpec {
            unique: non_unique == 0,
            columns: Vec::new(),
        });
        if let Some(column) = column {
            entry.columns.push(column);
        }
    }

    Ok(indexes)
}

async fn fetch_constraints(
    conn: &mut Conn,
    table: &str,
) -> Result<HashMap<String, ConstraintSpec>> {
    let mut constraints = HashMap::new();

    // 外键约束
    let rows: Vec<(String, String, Option<String>, Option<String>)> = conn
        .exec(
            r"SELECT
                  CONSTRAINT_NAME,
                  COLUMN_NAME,
                  REFERENCED_TABLE_NAME,
                  REFERENCED_COLUMN_NAME
              FROM INFORMATION_SCHEMA.KEY_COLUMN_USAGE
              WHERE TABLE_SCHEMA = DATABASE()
              AND TABLE_NAME = ?
              AND REFERENCED_TABLE_NAME IS NOT NULL
              AND CONSTRAINT_NAME != 'PRIMARY'",
            (table,),
        )
        .await
        .map_err(|e| CompareError::introspection(ObjectKind::Table, table, e.to_string()))?;

    for (name, column, referenced_table, referenced_column) in rows {
        let entry = constraints
            .entry(name)
            .or_insert_with(|| ConstraintSpec {
                kind: ConstraintKind::ForeignKey,
                columns: Vec::new(),
                referenced_table,
                referenced_columns: Vec::new(),
            });
        entry.columns.push(column);
        if let Some(referenced_column) = referenced_column {
            entry.referenced_columns.push(referenced_column);
        }
    }

    // 唯一约束：排除主键和上面已经收集的外键
    let rows: Vec<(String, String)> = conn
        .exec(
            r"SELECT
                  CONSTRAINT_NAME,
                  COLUMN_NAME
              FROM INFORMATION_SCHEMA.KEY_COLUMN_USAGE
              WHERE TABLE_SCHEMA = DATABASE()
              AND TABLE_NAME = ?
              AND CONSTRAINT_NAME != 'PRIMARY'
              AND CONSTRAINT_NAME NOT IN (
                  SELECT CONSTRAINT_NAME
                  FROM INFORMATION_SCHEMA.KEY_COLUMN_USAGE
                  WHERE TABLE_SCHEMA = DATABASE()
                  AND TABLE_NAME = ?
                  AND REFERENCED_TABLE_NAME IS NOT NULL
              )",
            (table, table),
        )
        .await
        .map_err(|e| CompareError::introspection(ObjectKind::Table, table, e.to_string()))?;

    for (name, column) in rows {
        let entry = constraints.entry(name).or_insert_with(|| ConstraintSpec {
            kind: ConstraintKind::Unique,
            columns: Vec::new(),
            referenced_table: None,
            referenced_columns: Vec::new(),
        });
        entry.columns.push(column);
    }

    Ok(constraints)
}

use crate::compare::{CatalogSnapshot, ObjectKind};
use crate::error::{CompareError, Result};
use mysql_async::prelude::Queryable;
use mysql_async::{Conn, Row};

/// 列出当前库的所有存储过程及其创建语句
pub async fn fetch_procedures(conn: &mut Conn) -> Result<CatalogSnapshot> {
    fetch_routines(conn, ObjectKind::Procedure).await
}

/// 列出当前库的所有自定义函数及其创建语句
pub async fn fetch_functions(conn: &mut Conn) -> Result<CatalogSnapshot> {
    fetch_routines(conn, ObjectKind::Function).await
}

async fn fetch_routines(conn: &mut Conn, kind: ObjectKind) -> Result<CatalogSnapshot> {
    let keyword = match kind {
        ObjectKind::Procedure => "PROCEDURE",
        ObjectKind::Function => "FUNCTION",
        _ => unreachable!("只有例程类对象会走例程采集"),
    };

    let names: Vec<String> = conn
        .exec(
            r"SELECT ROUTINE_NAME
              FROM INFORMATION_SCHEMA.ROUTINES
              WHERE ROUTINE_TYPE = ?
              AND ROUTINE_SCHEMA = DATABASE()",
            (keyword,),
        )
        .await?;

    let mut routines = CatalogSnapshot::new();
    for name in names {
        let row: Option<Row> = conn
            .query_first(format!("SHOW CREATE {keyword} `{name}`"))
            .await
            .map_err(|e| CompareError::introspection(kind, &name, e.to_string()))?;
        // 第3列是创建语句；定义者权限不足时该列为 NULL
        let create_stmt = row
            .and_then(|r| r.get::<Option<String>, _>(2).flatten())
            .ok_or_else(|| {
                CompareError::introspection(
                    kind,
                    &name,
                    "无法获取创建语句（可能缺少查看权限）",
                )
            })?;
        routines.insert(name, create_stmt);
    }

    Ok(routines)
}

use crate::compare::{CatalogSnapshot, ObjectKind};
use crate::error::{CompareError, Result};
use mysql_async::prelude::Queryable;
use mysql_async::{Conn, Row};

/// 列出当前库的所有触发器及其创建语句
pub async fn fetch_triggers(conn: &mut Conn) -> Result<CatalogSnapshot> {
    let names: Vec<String> = conn
        .query(
            r"SELECT TRIGGER_NAME
              FROM INFORMATION_SCHEMA.TRIGGERS
              WHERE TRIGGER_SCHEMA = DATABASE()",
        )
        .await?;

    let mut triggers = CatalogSnapshot::new();
    for name in names {
        let row: Option<Row> = conn
            .query_first(format!("SHOW CREATE TRIGGER `{name}`"))
            .await
            .map_err(|e| CompareError::introspection(ObjectKind::Trigger, &name, e.to_string()))?;
        // 第3列是触发器的原始SQL语句
        let create_stmt = row
            .and_then(|r| r.get::<Option<String>, _>(2).flatten())
            .ok_or_else(|| {
                CompareError::introspection(ObjectKind::Trigger, &name, "无法获取触发器创建语句")
            })?;
        triggers.insert(name, create_stmt);
    }

    Ok(triggers)
}

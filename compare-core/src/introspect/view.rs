use crate::compare::{CatalogSnapshot, ObjectKind};
use crate::error::{CompareError, Result};
use mysql_async::prelude::Queryable;
use mysql_async::{Conn, Row};

/// 列出当前库的所有视图及其创建语句
pub async fn fetch_views(conn: &mut Conn) -> Result<CatalogSnapshot> {
    let names: Vec<String> = conn
        .query(
            r"SELECT TABLE_NAME
              FROM INFORMATION_SCHEMA.VIEWS
              WHERE TABLE_SCHEMA = DATABASE()",
        )
        .await?;

    let mut views = CatalogSnapshot::new();
    for name in names {
        let row: Option<Row> = conn
            .query_first(format!("SHOW CREATE VIEW `{name}`"))
            .await
            .map_err(|e| CompareError::introspection(ObjectKind::View, &name, e.to_string()))?;
        // SHOW CREATE VIEW 的第2列是创建语句
        let create_stmt = row
            .and_then(|r| r.get::<Option<String>, _>(1).flatten())
            .ok_or_else(|| {
                CompareError::introspection(ObjectKind::View, &name, "无法获取视图创建语句")
            })?;
        views.insert(name, create_stmt);
    }

    Ok(views)
}

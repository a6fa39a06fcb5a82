use crate::error::Result;
use mysql_async::Conn;
use mysql_async::prelude::Queryable;
use std::collections::BTreeMap;

/// 采集当前库的字符集与排序规则变量
pub async fn fetch_config_variables(conn: &mut Conn) -> Result<BTreeMap<String, String>> {
    let mut variables = BTreeMap::new();

    let rows: Vec<(String, String)> = conn.query("SHOW VARIABLES LIKE 'character_set_%'").await?;
    for (name, value) in rows {
        variables.insert(name, value);
    }

    let rows: Vec<(String, String)> = conn.query("SHOW VARIABLES LIKE 'collation_%'").await?;
    for (name, value) in rows {
        variables.insert(name, value);
    }

    Ok(variables)
}

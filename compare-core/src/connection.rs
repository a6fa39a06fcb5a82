use crate::config::ConnectionConfig;
use crate::error::{CompareError, Result};
use mysql_async::{Conn, Opts, OptsBuilder};
use std::time::Duration;
use tracing::{debug, warn};

/// 打开到指定数据库的连接
///
/// 连接不做池化复用：每次比对调用自行打开连接，并保证成对关闭。
/// 建连过程由 `timeout` 限定，超时按连接错误处理。
pub async fn connect(config: &ConnectionConfig, timeout: Duration) -> Result<Conn> {
    let opts: Opts = OptsBuilder::default()
        .ip_or_hostname(config.host.clone())
        .tcp_port(config.port)
        .user(Some(config.user.clone()))
        .pass(Some(config.password.clone()))
        .db_name(Some(config.database.clone()))
        .into();

    debug!("建立数据库连接: {}", config.display_addr());

    match tokio::time::timeout(timeout, Conn::new(opts)).await {
        Ok(Ok(conn)) => Ok(conn),
        Ok(Err(e)) => Err(CompareError::connection(format!(
            "无法连接 {}: {}",
            config.display_addr(),
            e
        ))),
        Err(_) => Err(CompareError::connection(format!(
            "连接 {} 超时 ({}秒)",
            config.display_addr(),
            timeout.as_secs()
        ))),
    }
}

/// 尽力关闭连接；关闭失败只记日志，不覆盖主流程错误
pub async fn close_quietly(conn: Conn) {
    if let Err(e) = conn.disconnect().await {
        warn!("关闭数据库连接失败（已忽略）: {}", e);
    }
}

use crate::app::CliApp;
use compare_core::connection::{close_quietly, connect};
use compare_core::error::Result;
use tracing::{error, info};

/// 检查源和目标数据库的连通性
pub async fn run_check(app: &CliApp) -> Result<()> {
    info!("🔍 检查数据库连通性");
    info!("====================");

    let timeout = app.config.options.connect_timeout();
    let checks = [
        ("源数据库", &app.config.source),
        ("目标数据库", &app.config.target),
    ];

    for (label, config) in checks {
        match connect(config, timeout).await {
            Ok(conn) => {
                info!("✅ {} {} 连接正常", label, config.display_addr());
                close_quietly(conn).await;
            }
            Err(e) => {
                error!("❌ {} {} 连接失败", label, config.display_addr());
                return Err(e);
            }
        }
    }

    Ok(())
}

use compare_core::config::CompareConfig;
use compare_core::error::Result;
use std::path::Path;
use tracing::{info, warn};

/// 运行独立的初始化流程
pub fn run_init(force: bool) -> Result<()> {
    info!("🔍 dbdiff 初始化");
    info!("================");

    // 检查是否已经初始化过
    if !force && Path::new("dbdiff.toml").exists() {
        warn!("⚠️  检测到已存在的配置文件 dbdiff.toml");
        info!("如果您要重新初始化，请使用 --force 参数");
        info!("示例: dbdiff init --force");
        return Ok(());
    }

    // 创建默认配置
    let config = CompareConfig::default();
    config.save_to_file("dbdiff.toml")?;
    info!("✅ 创建配置文件: dbdiff.toml");
    info!("👉 请编辑其中的 source/target 连接信息，然后执行 'dbdiff run'");

    Ok(())
}

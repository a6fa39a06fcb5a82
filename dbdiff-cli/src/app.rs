use crate::cli::Commands;
use crate::commands;
use compare_core::config::CompareConfig;
use compare_core::error::Result;
use std::path::Path;

pub struct CliApp {
    pub config: CompareConfig,
}

impl CliApp {
    /// 初始化CLI应用：优先使用命令行指定的配置文件，
    /// 不存在时按默认路径智能查找
    pub fn new(config_path: &Path) -> Result<Self> {
        let config = if config_path.exists() {
            tracing::info!("找到配置文件: {}", config_path.display());
            CompareConfig::load_from_file(config_path)?
        } else {
            CompareConfig::find_and_load_config()?
        };

        Ok(Self { config })
    }

    /// 运行应用命令
    pub async fn run_command(&self, command: Commands) -> Result<()> {
        match command {
            Commands::Init { .. } => unreachable!(), // 已经在 main.rs 中处理
            Commands::Check => commands::run_check(self).await,
            Commands::Run { output, diff_only } => {
                commands::run_compare(self, output, diff_only).await
            }
        }
    }
}

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "dbdiff", version, about = "MySQL 数据库结构比对工具")]
pub struct Cli {
    /// 配置文件路径
    #[arg(short, long, default_value = "dbdiff.toml")]
    pub config: PathBuf,

    /// 输出调试日志
    #[arg(short, long)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// 生成默认配置文件
    Init {
        /// 覆盖已存在的配置文件
        #[arg(long)]
        force: bool,
    },
    /// 检查源和目标数据库的连通性
    Check,
    /// 执行一次完整的结构比对
    Run {
        /// 结果输出文件（JSON），优先于配置中的 output
        #[arg(long)]
        output: Option<PathBuf>,
        /// 终端只列出有差异的对象
        #[arg(long)]
        diff_only: bool,
    },
}

use crate::compare::ObjectKind;
use crate::error::{CompareError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;
use toml;

/// 比对任务配置结构
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CompareConfig {
    pub source: ConnectionConfig,
    pub target: ConnectionConfig,
    #[serde(default)]
    pub ignore: IgnoreConfig,
    #[serde(default)]
    pub options: CompareOptions,
}

/// 数据库连接描述
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ConnectionConfig {
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    pub user: String,
    pub password: String,
    pub database: String,
}

impl ConnectionConfig {
    /// 不含凭据的可打印地址，用于日志输出
    pub fn display_addr(&self) -> String {
        format!("{}:{}/{}", self.host, self.port, self.database)
    }
}

/// 单一对象类型的忽略规则
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct IgnoreRules {
    /// 精确匹配的对象名
    #[serde(default)]
    pub exact: Vec<String>,
    /// 按前缀匹配的对象名
    #[serde(default)]
    pub prefixes: Vec<String>,
}

impl IgnoreRules {
    pub fn is_ignored(&self, name: &str) -> bool {
        if self.exact.iter().any(|n| n == name) {
            return true;
        }
        self.prefixes.iter().any(|p| !p.is_empty() && name.starts_with(p.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.exact.is_empty() && self.prefixes.is_empty()
    }
}

/// 按对象类型划分的忽略配置
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct IgnoreConfig {
    #[serde(default)]
    pub tables: IgnoreRules,
    #[serde(default)]
    pub views: IgnoreRules,
    #[serde(default)]
    pub procedures: IgnoreRules,
    #[serde(default)]
    pub functions: IgnoreRules,
    #[serde(default)]
    pub triggers: IgnoreRules,
}

impl IgnoreConfig {
    /// 数据库配置比对是单一合成对象，不参与按名忽略
    pub fn rules_for(&self, kind: ObjectKind) -> Option<&IgnoreRules> {
        match kind {
            ObjectKind::Config => None,
            ObjectKind::Table => Some(&self.tables),
            ObjectKind::View => Some(&self.views),
            ObjectKind::Procedure => Some(&self.procedures),
            ObjectKind::Function => Some(&self.functions),
            ObjectKind::Trigger => Some(&self.triggers),
        }
    }
}

/// 比对运行选项
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CompareOptions {
    /// 建立数据库连接的超时时间（秒）
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
    /// 比对结果输出文件（JSON）
    #[serde(default = "default_output")]
    pub output: String,
}

impl Default for CompareOptions {
    fn default() -> Self {
        Self {
            connect_timeout_secs: default_connect_timeout(),
            output: default_output(),
        }
    }
}

impl CompareOptions {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

fn default_port() -> u16 {
    3306
}

fn default_connect_timeout() -> u64 {
    10
}

fn default_output() -> String {
    "dbdiff-result.json".to_string()
}

impl Default for CompareConfig {
    fn default() -> Self {
        Self {
            source: ConnectionConfig {
                host: "127.0.0.1".to_string(),
                port: 3306,
                user: "root".to_string(),
                password: "".to_string(),
                database: "source_db".to_string(),
            },
            target: ConnectionConfig {
                host: "127.0.0.1".to_string(),
                port: 3306,
                user: "root".to_string(),
                password: "".to_string(),
                database: "target_db".to_string(),
            },
            ignore: IgnoreConfig::default(),
            options: CompareOptions::default(),
        }
    }
}

impl CompareConfig {
    /// 智能查找并加载配置文件
    /// 按优先级查找：dbdiff.toml -> .dbdiff.toml -> config.toml
    pub fn find_and_load_config() -> Result<Self> {
        let config_files = ["dbdiff.toml", ".dbdiff.toml", "config.toml"];

        for config_file in &config_files {
            if Path::new(config_file).exists() {
                tracing::info!("找到配置文件: {}", config_file);
                return Self::load_from_file(config_file);
            }
        }

        Err(CompareError::ConfigNotFound)
    }

    /// 从指定文件加载配置
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path)?;
        let config: CompareConfig = toml::from_str(&content)?;

        Ok(config)
    }

    /// 保存配置到文件
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = self.to_toml_with_comments();
        fs::write(&path, content)?;
        Ok(())
    }

    /// 生成带注释的TOML配置
    fn to_toml_with_comments(&self) -> String {
        const TEMPLATE: &str = include_str!("../templates/dbdiff.toml.template");

        TEMPLATE
            .replace("{source_host}", &self.source.host)
            .replace("{source_port}", &self.source.port.to_string())
            .replace("{source_user}", &self.source.user)
            .replace("{source_password}", &self.source.password)
            .replace("{source_database}", &self.source.database)
            .replace("{target_host}", &self.target.host)
            .replace("{target_port}", &self.target.port.to_string())
            .replace("{target_user}", &self.target.user)
            .replace("{target_password}", &self.target.password)
            .replace("{target_database}", &self.target.database)
            .replace("{connect_timeout_secs}", &self.options.connect_timeout_secs.to_string())
            .replace("{output}", &self.options.output)
    }
}

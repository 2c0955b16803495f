//! CLI 配置
//!
//! 可选的 TOML 文件（`--config` 或 `~/.config/sanbot/config.toml`）：
//!
//! ```toml
//! [usb]
//! vendor_id = 0x0483
//! head_product_id = 0x5741
//! bottom_product_id = 0x5740
//! reconnect_threshold = 10
//! transfer_timeout_ms = 0
//!
//! [safety]
//! wheel_speed_max = 200
//!
//! [log]
//! file = "/var/log/sanbot/commands.log"
//! ```

use anyhow::{Context, Result};
use clap::Subcommand;
use sanbot_sdk::ManagerConfig;
use sanbot_sdk::tools::SafetyLimits;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// 默认配置文件路径
pub fn default_config_file() -> Result<PathBuf> {
    let mut path = dirs::config_dir().ok_or_else(|| anyhow::anyhow!("无法确定配置目录"))?;
    path.push("sanbot");
    path.push("config.toml");
    Ok(path)
}

/// USB 传输配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UsbSection {
    pub vendor_id: u16,
    pub head_product_id: u16,
    pub bottom_product_id: u16,
    pub reconnect_threshold: u32,
    /// 0 表示无限等待
    pub transfer_timeout_ms: u64,
}

impl Default for UsbSection {
    fn default() -> Self {
        let config = ManagerConfig::default();
        Self {
            vendor_id: config.vendor_id,
            head_product_id: config.head_product_id,
            bottom_product_id: config.bottom_product_id,
            reconnect_threshold: config.reconnect_threshold,
            transfer_timeout_ms: config.transfer_timeout.as_millis() as u64,
        }
    }
}

impl UsbSection {
    pub fn to_manager_config(&self) -> ManagerConfig {
        ManagerConfig {
            vendor_id: self.vendor_id,
            head_product_id: self.head_product_id,
            bottom_product_id: self.bottom_product_id,
            reconnect_threshold: self.reconnect_threshold,
            transfer_timeout: Duration::from_millis(self.transfer_timeout_ms),
        }
    }
}

/// 命令日志配置
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogSection {
    /// 追加式命令日志文件，未设置时不记录
    pub file: Option<PathBuf>,
}

/// CLI 配置
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    pub usb: UsbSection,
    pub safety: SafetyLimits,
    pub log: LogSection,
}

impl CliConfig {
    /// 加载配置
    ///
    /// 显式指定的文件必须存在；默认路径下的文件不存在时使用默认配置。
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => match default_config_file() {
                Ok(path) if path.exists() => path,
                _ => return Ok(Self::default()),
            },
        };

        let content = fs::read_to_string(&path)
            .with_context(|| format!("读取配置文件失败: {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("解析配置文件失败: {}", path.display()))
    }

    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}

/// 配置命令
#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// 显示生效的配置
    Show,

    /// 显示默认配置文件路径
    Path,
}

impl ConfigCommand {
    pub fn execute(&self, config: &CliConfig) -> Result<()> {
        match self {
            ConfigCommand::Show => {
                print!("{}", config.to_toml()?);
            },
            ConfigCommand::Path => {
                println!("{}", default_config_file()?.display());
            },
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_partial_config() {
        let config = CliConfig::parse(
            r#"
[usb]
reconnect_threshold = 3
transfer_timeout_ms = 500

[safety]
wheel_speed_max = 100

[log]
file = "/tmp/sanbot.log"
"#,
        )
        .unwrap();

        assert_eq!(config.usb.vendor_id, 0x0483);
        assert_eq!(config.usb.reconnect_threshold, 3);
        assert_eq!(config.safety.wheel_speed_max, 100);
        assert_eq!(config.safety.arm_deg_max, 90);
        assert_eq!(config.log.file, Some(PathBuf::from("/tmp/sanbot.log")));

        let manager = config.usb.to_manager_config();
        assert_eq!(manager.transfer_timeout, Duration::from_millis(500));
        assert_eq!(manager.head_product_id, 0x5741);
    }

    #[test]
    fn test_empty_config_is_default() {
        assert_eq!(CliConfig::parse("").unwrap(), CliConfig::default());
    }

    #[test]
    fn test_toml_roundtrip_of_defaults() {
        let config = CliConfig::default();
        assert_eq!(CliConfig::parse(&config.to_toml().unwrap()).unwrap(), config);
    }
}

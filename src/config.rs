use crate::package_manager::{BridgeCommand, PackageFilter, ShellRunner};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 设备桥可执行文件
    pub bridge: String,
    /// 指定设备序列号（多设备时使用）
    pub serial: Option<String>,
    /// POSIX 登录 shell，默认 /bin/bash
    pub shell: Option<String>,
    pub report_dir: PathBuf,
    pub prefs_path: PathBuf,
    pub filter: PackageFilter,
}

fn home_dir() -> PathBuf {
    let home = std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .unwrap_or_else(|_| ".".to_string());
    PathBuf::from(home)
}

impl Default for Config {
    fn default() -> Self {
        let home = home_dir();
        Self {
            bridge: "adb".to_string(),
            serial: None,
            shell: None,
            report_dir: home.join(".droidperm/reports"),
            prefs_path: home.join(".config/droidperm/prefs.toml"),
            filter: PackageFilter::default(),
        }
    }
}

impl Config {
    pub fn default_path() -> PathBuf {
        home_dir().join(".config/droidperm/config.toml")
    }

    pub fn load_or_default() -> Result<Self> {
        Self::load_from(&Self::default_path())
    }

    pub fn load_from(config_path: &Path) -> Result<Self> {
        if config_path.exists() {
            let content = fs::read_to_string(config_path)?;
            let config: Config = toml::from_str(&content)?;
            log::debug!("已加载配置: {}", config_path.display());
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    pub fn bridge_command(&self) -> BridgeCommand {
        BridgeCommand::new(&self.bridge, self.serial.as_deref())
    }

    pub fn shell_runner(&self) -> ShellRunner {
        ShellRunner::new(self.shell.clone())
    }
}

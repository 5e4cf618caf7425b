//! 跨进程保存的偏好设置（目前只有上次使用的包名）

use crate::error::{Error, Result};
use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

pub const LAST_PACKAGE_NAME_KEY: &str = "last_package_name";

/// 偏好设置的存储后端
pub trait PreferenceBackend {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
}

/// 以 TOML 文件保存的后端，首次读写时才访问磁盘
#[derive(Debug, Clone)]
pub struct FileBackend {
    path: PathBuf,
}

impl FileBackend {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn load(&self) -> Result<BTreeMap<String, String>> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let content = fs::read_to_string(&self.path).map_err(|source| self.io_error(source))?;
        toml::from_str(&content).map_err(|e| Error::PreferencesFormat(e.to_string()))
    }

    fn io_error(&self, source: std::io::Error) -> Error {
        Error::Preferences {
            path: self.path.clone(),
            source,
        }
    }
}

impl PreferenceBackend for FileBackend {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.load()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut values = self.load()?;
        values.insert(key.to_string(), value.to_string());

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|source| self.io_error(source))?;
        }
        let content =
            toml::to_string(&values).map_err(|e| Error::PreferencesFormat(e.to_string()))?;
        fs::write(&self.path, content).map_err(|source| self.io_error(source))
    }
}

/// 偏好设置句柄，后写覆盖先写，不做并发控制
#[derive(Debug)]
pub struct Preferences<B> {
    backend: B,
}

impl<B: PreferenceBackend> Preferences<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    /// 未设置过时返回空字符串
    pub fn get_last_package_name(&self) -> Result<String> {
        Ok(self
            .backend
            .get(LAST_PACKAGE_NAME_KEY)?
            .unwrap_or_default())
    }

    pub fn set_last_package_name(&self, name: &str) -> Result<()> {
        log::debug!("{} = {:?}", LAST_PACKAGE_NAME_KEY, name);
        self.backend.set(LAST_PACKAGE_NAME_KEY, name)
    }
}

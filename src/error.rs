use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// shell 本身无法启动（可执行文件缺失、无权限）
    #[error("无法启动命令 `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },
    #[error("读取命令 `{command}` 输出失败: {source}")]
    Read {
        command: String,
        #[source]
        source: std::io::Error,
    },
    #[error("偏好设置文件 {path} 读写失败: {source}")]
    Preferences {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("偏好设置格式错误: {0}")]
    PreferencesFormat(String),
}

pub type Result<T> = std::result::Result<T, Error>;

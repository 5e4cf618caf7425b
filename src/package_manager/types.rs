//! PackageManager 相关数据类型定义

use std::fmt;

/// 权限名的命名空间前缀，展示时去掉，下发命令时补回
pub const PERMISSION_PREFIX: &str = "android.permission.";

/// 命令输出结果（stderr 已合并进 stdout）
///
/// 每一行都以 `\n` 结尾；没有任何输出时为空字符串。
/// 子进程退出码不会被记录。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub text: String,
}

/// 设备上的包名，如 `com.example.app`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Package(String);

impl Package {
    /// 非空且不含空白字符才是合法包名
    pub fn new(name: &str) -> Option<Self> {
        if name.is_empty() || name.chars().any(char::is_whitespace) {
            return None;
        }
        Some(Self(name.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Package {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// 去掉 `android.permission.` 前缀后的权限名，如 `CAMERA`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PermissionName(String);

impl PermissionName {
    /// 直接使用短名
    pub fn new(short: impl Into<String>) -> Self {
        Self(short.into())
    }

    /// 从完整权限名构造；不在该命名空间下的返回 None
    pub fn from_qualified(qualified: &str) -> Option<Self> {
        qualified
            .strip_prefix(PERMISSION_PREFIX)
            .map(|short| Self(short.to_string()))
    }

    /// 用户输入既可以是短名也可以是完整名
    pub fn parse(input: &str) -> Self {
        let input = input.trim();
        Self::from_qualified(input).unwrap_or_else(|| Self::new(input))
    }

    pub fn short(&self) -> &str {
        &self.0
    }

    pub fn qualified(&self) -> String {
        format!("{}{}", PERMISSION_PREFIX, self.0)
    }
}

impl fmt::Display for PermissionName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.short())
    }
}

/// 一次 dumpsys 解析的结果，每次检查都重新生成
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PermissionReport {
    /// 给人看的日志文本（分段标题 + 捕获的原始行）
    pub log: String,
    /// 捕获区内出现的所有权限，按出现顺序，不去重
    pub requested: Vec<PermissionName>,
    /// 标记为 granted=true 的权限
    pub granted: Vec<PermissionName>,
    /// 没有 granted=true 标记的权限（包括 granted=false 和无标记）
    pub not_granted: Vec<PermissionName>,
}

impl PermissionReport {
    pub fn is_granted(&self, name: &PermissionName) -> bool {
        self.granted.contains(name)
    }

    pub fn is_not_granted(&self, name: &PermissionName) -> bool {
        self.not_granted.contains(name)
    }
}

/// 运行时（dangerous）权限，`pm grant` / `pm revoke` 只对这些生效
pub const RUNTIME_PERMISSIONS: &[&str] = &[
    "ACCEPT_HANDOVER",
    "ACCESS_BACKGROUND_LOCATION",
    "ACCESS_COARSE_LOCATION",
    "ACCESS_FINE_LOCATION",
    "ACCESS_MEDIA_LOCATION",
    "ACTIVITY_RECOGNITION",
    "ADD_VOICEMAIL",
    "ANSWER_PHONE_CALLS",
    "BLUETOOTH_ADVERTISE",
    "BLUETOOTH_CONNECT",
    "BLUETOOTH_SCAN",
    "BODY_SENSORS",
    "BODY_SENSORS_BACKGROUND",
    "CALL_PHONE",
    "CAMERA",
    "GET_ACCOUNTS",
    "NEARBY_WIFI_DEVICES",
    "POST_NOTIFICATIONS",
    "PROCESS_OUTGOING_CALLS",
    "READ_CALENDAR",
    "READ_CALL_LOG",
    "READ_CONTACTS",
    "READ_EXTERNAL_STORAGE",
    "READ_MEDIA_AUDIO",
    "READ_MEDIA_IMAGES",
    "READ_MEDIA_VIDEO",
    "READ_MEDIA_VISUAL_USER_SELECTED",
    "READ_PHONE_NUMBERS",
    "READ_PHONE_STATE",
    "READ_SMS",
    "RECEIVE_MMS",
    "RECEIVE_SMS",
    "RECEIVE_WAP_PUSH",
    "RECORD_AUDIO",
    "SEND_SMS",
    "USE_SIP",
    "UWB_RANGING",
    "WRITE_CALENDAR",
    "WRITE_CALL_LOG",
    "WRITE_CONTACTS",
    "WRITE_EXTERNAL_STORAGE",
];

/// 已知运行时权限（短名），下发命令时用 `qualified()` 补全
pub fn runtime_permissions() -> Vec<PermissionName> {
    RUNTIME_PERMISSIONS
        .iter()
        .map(|short| PermissionName::new(*short))
        .collect()
}

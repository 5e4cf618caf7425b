//! 输出解析函数

use super::types::{Package, PermissionName, PermissionReport, PERMISSION_PREFIX};
use serde::{Deserialize, Serialize};

/// `pm list packages` 每一行的前缀
const PACKAGE_LINE_PREFIX: &str = "package:";

/// dumpsys 中开始捕获的标记
const REQUESTED_MARKER: &str = "requested permissions:";
/// 安装权限段落标记，只追加段落标题，不改变捕获状态
const INSTALL_MARKER: &str = "install permissions:";
/// 结束捕获的标记，无论当前状态如何
const SKIPPING_MARKER: &str = "mSkippingApks:";

const GRANTED_MARKER: &str = "granted=true";

pub const REQUESTED_HEADER: &str = "【请求的权限】";
pub const INSTALL_HEADER: &str = "【安装权限】";

/// 包列表中需要过滤掉的噪声条目
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PackageFilter {
    /// 系统自身的包名
    pub platform_package: String,
    /// 占位包
    pub placeholder_package: String,
    /// 系统包命名空间
    pub system_prefixes: Vec<String>,
}

impl Default for PackageFilter {
    fn default() -> Self {
        Self {
            platform_package: "android".to_string(),
            placeholder_package: "android.ext.shared".to_string(),
            system_prefixes: vec!["com.android.".to_string()],
        }
    }
}

impl PackageFilter {
    pub fn accepts(&self, name: &str) -> bool {
        !name.is_empty()
            && name != self.platform_package
            && name != self.placeholder_package
            && !self
                .system_prefixes
                .iter()
                .any(|prefix| name.starts_with(prefix.as_str()))
    }
}

/// 解析 `pm list packages` 的输出
///
/// 不去重，保持设备输出顺序。没有 `package:` 前缀的行（比如 adb 的报错）直接丢弃。
pub fn parse_package_list(output: &str, filter: &PackageFilter) -> Vec<Package> {
    output
        .lines()
        .filter_map(|line| {
            let entry = line.trim().strip_prefix(PACKAGE_LINE_PREFIX)?.trim();
            if !filter.accepts(entry) {
                return None;
            }
            let package = Package::new(entry);
            if package.is_none() {
                log::debug!("忽略非法包名: {:?}", entry);
            }
            package
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanState {
    Idle,
    Capturing,
}

/// 解析 `dumpsys package <pkg>` 的输出
///
/// 单次前向扫描，状态只有 Idle / Capturing 两种：
///   - 含 `requested permissions:` 且当前为 Idle → Capturing，写入段落标题
///   - 含 `install permissions:` 且正在捕获 → 写入第二个段落标题
///   - 含 `mSkippingApks:` → Idle（无条件）
///
/// 捕获期间含权限前缀的行去掉所有空白后按 `名字[:granted=...]` 解析，
/// 没有 `granted=true` 的一律算作未授予。从未进入捕获时返回空报告。
pub fn parse_permission_report(output: &str) -> PermissionReport {
    let mut report = PermissionReport::default();
    let mut state = ScanState::Idle;

    for raw in output.lines() {
        let line = raw.trim_end_matches('\r');
        let mut is_marker = false;

        if line.contains(REQUESTED_MARKER) && state == ScanState::Idle {
            state = ScanState::Capturing;
            report.log.push_str(REQUESTED_HEADER);
            report.log.push('\n');
            is_marker = true;
        }
        if line.contains(INSTALL_MARKER) && state == ScanState::Capturing {
            report.log.push_str(INSTALL_HEADER);
            report.log.push('\n');
            is_marker = true;
        }
        if line.contains(SKIPPING_MARKER) {
            state = ScanState::Idle;
            continue;
        }

        if state != ScanState::Capturing || is_marker {
            continue;
        }
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        report.log.push_str("  ");
        report.log.push_str(trimmed);
        report.log.push('\n');

        if !line.contains(PERMISSION_PREFIX) {
            continue;
        }
        match parse_permission_line(line) {
            Some((name, true)) => {
                report.requested.push(name.clone());
                report.granted.push(name);
            }
            Some((name, false)) => {
                report.requested.push(name.clone());
                report.not_granted.push(name);
            }
            None => log::trace!("跳过非 {} 开头的行: {}", PERMISSION_PREFIX, trimmed),
        }
    }

    report
}

/// 解析单行权限，返回 (权限名, 是否已授予)
///
/// 例：`android.permission.CAMERA: granted=true, flags=[ USER_SET ]`
fn parse_permission_line(line: &str) -> Option<(PermissionName, bool)> {
    let compact: String = line.chars().filter(|c| !c.is_whitespace()).collect();
    let rest = compact.strip_prefix(PERMISSION_PREFIX)?;
    let (name, marker) = match rest.find(':') {
        Some(pos) => (&rest[..pos], &rest[pos + 1..]),
        None => (rest, ""),
    };
    if name.is_empty() {
        return None;
    }
    Some((PermissionName::new(name), marker.contains(GRANTED_MARKER)))
}

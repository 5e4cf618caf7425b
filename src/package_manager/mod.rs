//! 包管理器模块 — 对 `adb shell pm` / `dumpsys package` 的封装

pub mod parser;
pub mod runner;
pub mod types;

// 重新导出常用类型和函数
pub use parser::PackageFilter;
pub use runner::{CommandRunner, ShellRunner};
pub use types::{runtime_permissions, Package, PermissionName, PermissionReport};

use crate::error::Result;
use parser::{parse_package_list, parse_permission_report};

/// 拼接设备桥命令行，如 `adb -s <serial> shell pm list packages`
///
/// 参数按原样拼接，不做转义。
#[derive(Debug, Clone)]
pub struct BridgeCommand {
    prefix: String,
}

impl BridgeCommand {
    pub fn new(bridge: &str, serial: Option<&str>) -> Self {
        let prefix = match serial {
            Some(serial) if !serial.is_empty() => format!("{} -s {}", bridge, serial),
            _ => bridge.to_string(),
        };
        Self { prefix }
    }

    pub fn list_packages(&self) -> String {
        format!("{} shell pm list packages", self.prefix)
    }

    pub fn dump_package(&self, package: &Package) -> String {
        format!("{} shell dumpsys package {}", self.prefix, package)
    }

    pub fn grant(&self, package: &Package, permission: &PermissionName) -> String {
        format!(
            "{} shell pm grant {} {}",
            self.prefix,
            package,
            permission.qualified()
        )
    }

    pub fn revoke(&self, package: &Package, permission: &PermissionName) -> String {
        format!(
            "{} shell pm revoke {} {}",
            self.prefix,
            package,
            permission.qualified()
        )
    }

    /// `-k` 保留数据和缓存
    pub fn uninstall_keep_data(&self, package: &Package) -> String {
        format!("{} shell pm uninstall -k {}", self.prefix, package)
    }
}

impl Default for BridgeCommand {
    fn default() -> Self {
        Self::new("adb", None)
    }
}

#[derive(Debug, Clone)]
pub struct PackageManager<R> {
    runner: R,
    commands: BridgeCommand,
    filter: PackageFilter,
}

impl<R: CommandRunner> PackageManager<R> {
    pub fn new(runner: R, commands: BridgeCommand, filter: PackageFilter) -> Self {
        Self {
            runner,
            commands,
            filter,
        }
    }

    #[cfg(test)]
    pub fn runner(&self) -> &R {
        &self.runner
    }

    // ===== 查询 =====

    /// 列出已安装的包（已过滤系统包，不去重）
    pub fn list_packages(&self) -> Result<Vec<Package>> {
        let output = self.runner.run(&self.commands.list_packages())?;
        let packages = parse_package_list(&output.text, &self.filter);
        log::debug!("list_packages: {} 个包", packages.len());
        Ok(packages)
    }

    /// 读取并解析某个包的权限情况
    ///
    /// 每次都重新执行 dumpsys，结果不缓存。找不到权限段时返回空报告。
    pub fn inspect(&self, package: &Package) -> Result<PermissionReport> {
        let output = self.runner.run(&self.commands.dump_package(package))?;
        let report = parse_permission_report(&output.text);
        if report.log.is_empty() {
            log::info!("{}: 输出中没有 requested permissions 段", package);
        }
        Ok(report)
    }

    // ===== 修改 =====
    //
    // 命令自身的输出不做解析，是否真正生效要靠随后的 inspect 判断。

    pub fn grant(&self, package: &Package, permission: &PermissionName) -> Result<()> {
        let output = self.runner.run(&self.commands.grant(package, permission))?;
        log::info!("grant {} {}: {}", package, permission, output.text.trim());
        Ok(())
    }

    pub fn revoke(&self, package: &Package, permission: &PermissionName) -> Result<()> {
        let output = self.runner.run(&self.commands.revoke(package, permission))?;
        log::info!("revoke {} {}: {}", package, permission, output.text.trim());
        Ok(())
    }

    /// 卸载但保留数据（`pm uninstall -k`）
    pub fn uninstall(&self, package: &Package) -> Result<()> {
        let output = self
            .runner
            .run(&self.commands.uninstall_keep_data(package))?;
        log::info!("uninstall {}: {}", package, output.text.trim());
        Ok(())
    }
}

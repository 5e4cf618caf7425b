//! 调用方的操作流程：选择包 → 检查 → 修改 → 重新检查
//!
//! 每次修改之后都显式再跑一次 inspect，让结果与设备的真实状态一致。

use crate::error::Result;
use crate::package_manager::{
    CommandRunner, Package, PackageManager, PermissionName, PermissionReport,
};
use crate::prefs::{PreferenceBackend, Preferences};

pub struct Session<R, B> {
    manager: PackageManager<R>,
    prefs: Preferences<B>,
}

impl<R: CommandRunner, B: PreferenceBackend> Session<R, B> {
    pub fn new(manager: PackageManager<R>, prefs: Preferences<B>) -> Self {
        Self { manager, prefs }
    }

    #[cfg(test)]
    pub fn manager(&self) -> &PackageManager<R> {
        &self.manager
    }

    pub fn prefs(&self) -> &Preferences<B> {
        &self.prefs
    }

    /// 上次使用的包；未设置或已清除时为 None
    pub fn remembered_package(&self) -> Result<Option<Package>> {
        Ok(Package::new(&self.prefs.get_last_package_name()?))
    }

    /// 记住本次选择。写入失败只记日志，不影响后续操作
    pub fn select(&self, package: &Package) {
        if let Err(e) = self.prefs.set_last_package_name(package.as_str()) {
            log::warn!("保存上次使用的包名失败: {}", e);
        }
    }

    /// 显式指定的包优先（并记住），否则回退到上次使用的包
    pub fn resolve(&self, explicit: Option<Package>) -> Result<Option<Package>> {
        match explicit {
            Some(package) => {
                self.select(&package);
                Ok(Some(package))
            }
            None => self.remembered_package(),
        }
    }

    pub fn forget(&self) -> Result<()> {
        self.prefs.set_last_package_name("")
    }

    pub fn list_packages(&self) -> Result<Vec<Package>> {
        self.manager.list_packages()
    }

    pub fn inspect(&self, package: &Package) -> Result<PermissionReport> {
        self.select(package);
        self.manager.inspect(package)
    }

    /// 授予后立即重新检查，返回最新报告
    pub fn grant(&self, package: &Package, permission: &PermissionName) -> Result<PermissionReport> {
        self.manager.grant(package, permission)?;
        self.inspect(package)
    }

    pub fn revoke(&self, package: &Package, permission: &PermissionName) -> Result<PermissionReport> {
        self.manager.revoke(package, permission)?;
        self.inspect(package)
    }

    /// 卸载后若记住的正是该包则清除
    ///
    /// 卸载命令已经执行过，偏好设置读写失败只记日志。
    pub fn uninstall(&self, package: &Package) -> Result<()> {
        self.manager.uninstall(package)?;
        let cleared = match self.remembered_package() {
            Ok(Some(remembered)) if &remembered == package => self.forget(),
            Ok(_) => Ok(()),
            Err(e) => Err(e),
        };
        if let Err(e) = cleared {
            log::warn!("卸载 {} 后清除上次使用的包名失败: {}", package, e);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::package_manager::runner::fake::ScriptedRunner;
    use crate::package_manager::{BridgeCommand, PackageFilter};
    use crate::prefs::memory::MemoryBackend;
    use crate::prefs::FileBackend;

    const DUMP: &str = "adb shell dumpsys package com.example.app";
    const LIST: &str = "adb shell pm list packages";

    fn app() -> Package {
        Package::new("com.example.app").unwrap()
    }

    fn session(runner: ScriptedRunner) -> Session<ScriptedRunner, MemoryBackend> {
        Session::new(
            PackageManager::new(runner, BridgeCommand::default(), PackageFilter::default()),
            Preferences::in_memory(),
        )
    }

    #[test]
    fn test_grant_then_inspect() {
        let runner = ScriptedRunner::new();
        runner.respond(
            DUMP,
            "requested permissions:\n    android.permission.SEND_SMS: granted=false\nmSkippingApks:\n",
        );
        runner.respond(
            DUMP,
            "requested permissions:\n    android.permission.SEND_SMS: granted=true\nmSkippingApks:\n",
        );
        let session = session(runner);
        let send_sms = PermissionName::new("SEND_SMS");

        let before = session.inspect(&app()).unwrap();
        assert!(before.is_not_granted(&send_sms));

        let after = session.grant(&app(), &send_sms).unwrap();
        assert!(!after.is_not_granted(&send_sms));
        assert!(after.is_granted(&send_sms));

        assert_eq!(
            session.manager().runner().issued(),
            vec![
                DUMP.to_string(),
                "adb shell pm grant com.example.app android.permission.SEND_SMS".to_string(),
                DUMP.to_string(),
            ]
        );
    }

    #[test]
    fn test_silent_device_failure_stays_visible_after_refresh() {
        let runner = ScriptedRunner::new();
        runner.respond(
            "adb shell pm grant com.example.app android.permission.SEND_SMS",
            "Security exception: not a changeable permission type\n",
        );
        runner.respond(
            DUMP,
            "requested permissions:\n    android.permission.SEND_SMS: granted=false\n",
        );
        let session = session(runner);
        let send_sms = PermissionName::new("SEND_SMS");

        let report = session.grant(&app(), &send_sms).unwrap();
        assert!(report.is_not_granted(&send_sms));
    }

    #[test]
    fn test_revoke_then_inspect() {
        let runner = ScriptedRunner::new();
        runner.respond(
            DUMP,
            "requested permissions:\n    android.permission.CAMERA: granted=false\n",
        );
        let session = session(runner);
        let camera = PermissionName::new("CAMERA");

        let report = session.revoke(&app(), &camera).unwrap();
        assert!(report.is_not_granted(&camera));
        assert_eq!(
            session.manager().runner().issued()[0],
            "adb shell pm revoke com.example.app android.permission.CAMERA"
        );
    }

    #[test]
    fn test_uninstall_clears_selection() {
        let runner = ScriptedRunner::new();
        runner.respond(LIST, "package:com.example.app\npackage:org.other\n");
        runner.respond(LIST, "package:org.other\n");
        let session = session(runner);

        assert!(session.list_packages().unwrap().contains(&app()));
        session.inspect(&app()).unwrap();
        assert_eq!(session.prefs().get_last_package_name().unwrap(), "com.example.app");

        session.uninstall(&app()).unwrap();
        assert_eq!(session.prefs().get_last_package_name().unwrap(), "");
        assert!(!session.list_packages().unwrap().contains(&app()));
        assert!(session
            .manager()
            .runner()
            .issued()
            .contains(&"adb shell pm uninstall -k com.example.app".to_string()));
    }

    #[test]
    fn test_uninstall_other_package_keeps_selection() {
        let session = session(ScriptedRunner::new());
        session.select(&app());
        session
            .uninstall(&Package::new("org.other").unwrap())
            .unwrap();
        assert_eq!(session.remembered_package().unwrap(), Some(app()));
    }

    #[test]
    fn test_uninstall_succeeds_when_prefs_unreadable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prefs.toml");
        std::fs::write(&path, "last_package_name = = broken").unwrap();

        let session = Session::new(
            PackageManager::new(
                ScriptedRunner::new(),
                BridgeCommand::default(),
                PackageFilter::default(),
            ),
            Preferences::new(FileBackend::new(&path)),
        );
        assert!(session.uninstall(&app()).is_ok());
        assert_eq!(
            session.manager().runner().issued(),
            vec!["adb shell pm uninstall -k com.example.app"]
        );
    }

    #[test]
    fn test_resolve_prefers_explicit_and_remembers() {
        let session = session(ScriptedRunner::new());
        assert_eq!(session.resolve(None).unwrap(), None);
        assert_eq!(session.resolve(Some(app())).unwrap(), Some(app()));
        assert_eq!(session.resolve(None).unwrap(), Some(app()));

        session.forget().unwrap();
        assert_eq!(session.resolve(None).unwrap(), None);
    }

    #[test]
    fn test_spawn_failure_surfaces_and_keeps_selection() {
        let session = session(ScriptedRunner::failing());
        session.select(&app());
        assert!(matches!(session.uninstall(&app()), Err(Error::Spawn { .. })));
        assert_eq!(session.remembered_package().unwrap(), Some(app()));
    }
}

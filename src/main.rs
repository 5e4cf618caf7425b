mod config;
mod error;
mod package_manager;
mod prefs;
mod report;
mod session;

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use package_manager::{runtime_permissions, Package, PackageManager, PermissionName, PermissionReport};
use prefs::{FileBackend, Preferences};
use session::Session;

#[derive(Parser, Debug)]
#[command(name = "droidperm", version, about = "查看并管理 Android 应用权限（通过 adb）")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// 列出已安装的应用（已过滤系统包）
    List,
    /// 查看应用请求的权限及授予状态
    Inspect {
        /// 包名，省略时使用上次的包
        package: Option<String>,
        /// 同时把报告保存到 report_dir
        #[arg(long)]
        save: bool,
    },
    /// 授予权限
    Grant {
        /// 权限名，如 CAMERA 或 android.permission.CAMERA
        permission: String,
        #[arg(short, long)]
        package: Option<String>,
    },
    /// 撤销权限
    Revoke {
        permission: String,
        #[arg(short, long)]
        package: Option<String>,
    },
    /// 卸载应用（保留数据和缓存）
    Uninstall { package: Option<String> },
    /// 显示上次使用的包名
    Last,
    /// 清除上次使用的包名
    Forget,
    /// 列出已知的运行时权限
    Permissions,
}

fn parse_package(name: &str) -> Result<Package> {
    Package::new(name.trim()).ok_or_else(|| anyhow!("非法包名: {:?}", name))
}

fn render_report(package: &Package, report: &PermissionReport) -> String {
    if report.log.is_empty() {
        return format!("{}: 未找到权限信息\n", package);
    }
    let mut out = report.log.clone();
    out.push('\n');
    if !report.granted.is_empty() {
        out.push_str(&format!("已授予 ({}):\n", report.granted.len()));
        for name in &report.granted {
            out.push_str(&format!("  {}\n", name));
        }
    }
    if report.not_granted.is_empty() {
        out.push_str("所有请求的权限均已授予\n");
    } else {
        out.push_str(&format!("未授予 ({}):\n", report.not_granted.len()));
        for name in &report.not_granted {
            out.push_str(&format!("  {}\n", name));
        }
    }
    out
}

/// 命令不校验结果，这里按刷新后的报告提示是否生效
fn unchanged_notice(
    report: &PermissionReport,
    permission: &PermissionName,
    want_granted: bool,
) -> Option<String> {
    let applied = if want_granted {
        report.is_granted(permission)
    } else {
        report.is_not_granted(permission)
    };
    (!applied).then(|| format!("注意: 设备上的 {} 状态尚未改变", permission.qualified()))
}

fn main() -> Result<()> {
    env_logger::init();

    let args = Args::parse();
    let config = config::Config::load_or_default()?;

    let manager = PackageManager::new(
        config.shell_runner(),
        config.bridge_command(),
        config.filter.clone(),
    );
    let prefs = Preferences::new(FileBackend::new(config.prefs_path.clone()));
    let session = Session::new(manager, prefs);

    // 显式给出的包名优先，否则用上次的
    let target = |explicit: Option<String>| -> Result<Package> {
        let explicit = explicit.as_deref().map(parse_package).transpose()?;
        session
            .resolve(explicit)?
            .ok_or_else(|| anyhow!("未指定包名，且没有上次使用的包"))
    };

    match args.command {
        Command::List => {
            for package in session.list_packages()? {
                println!("{}", package);
            }
        }
        Command::Inspect { package, save } => {
            let package = target(package)?;
            let report = session.inspect(&package)?;
            print!("{}", render_report(&package, &report));
            if save {
                let saver = report::ReportSaver::new(config.report_dir.clone());
                match saver.save(&report, &package) {
                    Ok(path) => println!("报告已保存: {}", path.display()),
                    Err(e) => log::error!("保存报告失败: {}", e),
                }
            }
        }
        Command::Grant {
            permission,
            package,
        } => {
            let package = target(package)?;
            let permission = PermissionName::parse(&permission);
            let report = session.grant(&package, &permission)?;
            print!("{}", render_report(&package, &report));
            if let Some(notice) = unchanged_notice(&report, &permission, true) {
                println!("{}", notice);
            }
        }
        Command::Revoke {
            permission,
            package,
        } => {
            let package = target(package)?;
            let permission = PermissionName::parse(&permission);
            let report = session.revoke(&package, &permission)?;
            print!("{}", render_report(&package, &report));
            if let Some(notice) = unchanged_notice(&report, &permission, false) {
                println!("{}", notice);
            }
        }
        Command::Uninstall { package } => {
            let package = target(package)?;
            session.uninstall(&package)?;
            println!("已卸载 {}（保留数据）", package);
        }
        Command::Last => {
            let last = session.prefs().get_last_package_name()?;
            println!("{}", last);
        }
        Command::Forget => session.forget()?,
        Command::Permissions => {
            for name in runtime_permissions() {
                println!("{}", name.qualified());
            }
        }
    }

    Ok(())
}

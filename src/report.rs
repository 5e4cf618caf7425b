use crate::package_manager::{Package, PermissionReport};
use anyhow::Result;
use chrono::{DateTime, Local};
use std::fs;
use std::path::PathBuf;

pub struct ReportSaver {
    base_dir: PathBuf,
}

impl ReportSaver {
    pub fn new(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    pub fn save(&self, report: &PermissionReport, package: &Package) -> Result<PathBuf> {
        self.save_at(report, package, Local::now())
    }

    fn save_at(
        &self,
        report: &PermissionReport,
        package: &Package,
        now: DateTime<Local>,
    ) -> Result<PathBuf> {
        // 目录结构: YYYY/MM/DD/
        let dir = self
            .base_dir
            .join(now.format("%Y").to_string())
            .join(now.format("%m").to_string())
            .join(now.format("%d").to_string());
        fs::create_dir_all(&dir)?;

        // 文件名: HH-MM-<包名>.txt
        let filename = format!("{}-{}.txt", now.format("%H-%M"), package);
        let filepath = dir.join(filename);

        let mut full_content = format!(
            "{} 权限报告\n生成时间: {}\n未授予: {}\n\n",
            package,
            now.format("%Y-%m-%d %H:%M:%S"),
            report.not_granted.len()
        );
        full_content.push_str(&report.log);

        fs::write(&filepath, full_content)?;

        Ok(filepath)
    }
}

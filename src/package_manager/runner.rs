//! 通过宿主 shell 同步执行命令

use super::types::CommandOutput;
use crate::error::{Error, Result};
use std::io::{BufRead, BufReader};

/// POSIX 下默认使用的登录 shell
pub const DEFAULT_POSIX_SHELL: &str = "/bin/bash";

/// 执行一条完整的命令行并返回合并后的输出
///
/// 阻塞直到子进程输出结束。只在 shell 无法启动或输出读取失败时返回错误，
/// 子进程的退出码不做任何判断。
pub trait CommandRunner {
    fn run(&self, command: &str) -> Result<CommandOutput>;
}

/// 真实的 shell 执行器
///
/// Windows 下为 `cmd.exe /c <command>`，其余平台为 `<shell> -l -c <command>`。
/// 命令原样交给 shell，不做任何转义。
#[derive(Debug, Clone)]
pub struct ShellRunner {
    shell: String,
}

impl Default for ShellRunner {
    fn default() -> Self {
        Self {
            shell: DEFAULT_POSIX_SHELL.to_string(),
        }
    }
}

impl ShellRunner {
    /// `shell` 为 None 时使用 /bin/bash；Windows 下忽略
    pub fn new(shell: Option<String>) -> Self {
        match shell {
            Some(shell) if !shell.trim().is_empty() => Self { shell },
            _ => Self::default(),
        }
    }

    fn expression(&self, command: &str) -> duct::Expression {
        let expr = if cfg!(windows) {
            duct::cmd("cmd.exe", ["/c", command])
        } else {
            duct::cmd(&self.shell, ["-l", "-c", command])
        };
        expr.stderr_to_stdout().unchecked()
    }
}

impl CommandRunner for ShellRunner {
    fn run(&self, command: &str) -> Result<CommandOutput> {
        log::info!("command to run: {}", command);

        let reader = self
            .expression(command)
            .reader()
            .map_err(|source| Error::Spawn {
                command: command.to_string(),
                source,
            })?;
        collect_lines(command, BufReader::new(reader))
    }
}

/// 逐行读取直到 EOF，每行去掉行尾换行后统一补 `\n`
fn collect_lines<B: BufRead>(command: &str, mut reader: B) -> Result<CommandOutput> {
    let mut text = String::new();
    let mut buf = Vec::new();
    loop {
        buf.clear();
        let n = reader
            .read_until(b'\n', &mut buf)
            .map_err(|source| Error::Read {
                command: command.to_string(),
                source,
            })?;
        if n == 0 {
            break;
        }
        let line = String::from_utf8_lossy(&buf);
        let line = line.trim_end_matches('\n').trim_end_matches('\r');
        log::debug!("{}", line);
        text.push_str(line);
        text.push('\n');
    }

    Ok(CommandOutput { text })
}

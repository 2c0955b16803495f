//! 追加式命令日志
//!
//! 每条命令一行：`<unix_ms> <command> [args...] | <hex>`。文件只追加，
//! 从不重写或截断。

use sanbot_protocol::to_hex;
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

/// 一条日志记录
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub timestamp_ms: u128,
    pub command: String,
    pub args: Vec<String>,
    /// 带路由标签的线缆字节
    pub routed: Vec<u8>,
}

impl LogEntry {
    /// 以当前时间创建记录
    pub fn now(command: impl Into<String>, args: Vec<String>, routed: &[u8]) -> Self {
        let timestamp_ms = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis())
            .unwrap_or(0);
        Self {
            timestamp_ms,
            command: command.into(),
            args,
            routed: routed.to_vec(),
        }
    }

    pub fn to_line(&self) -> String {
        let mut line = format!("{} {}", self.timestamp_ms, self.command);
        for arg in &self.args {
            line.push(' ');
            line.push_str(arg);
        }
        line.push_str(" | ");
        line.push_str(&to_hex(&self.routed));
        line
    }
}

/// 追加式命令日志文件
#[derive(Debug)]
pub struct CommandLog {
    path: PathBuf,
    file: File,
}

impl CommandLog {
    /// 打开（必要时创建）日志文件，父目录不存在时一并创建
    pub fn open(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        Ok(Self { path, file })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn append(&mut self, entry: &LogEntry) -> io::Result<()> {
        writeln!(self.file, "{}", entry.to_line())?;
        self.file.flush()
    }
}

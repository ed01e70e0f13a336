use chrono::{DateTime, Local, Utc};
use std::fmt;

/// 单次快照中的进程信息，只在当前轮次内有效
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessRecord {
    /// 进程 ID
    pub pid: u32,
    /// 可执行文件名
    pub name: String,
    /// 命令行参数
    pub command_line: Vec<String>,
    /// 创建时间
    pub created_at: DateTime<Utc>,
    /// 快照时已是僵尸进程
    pub is_zombie: bool,
}

impl ProcessRecord {
    #[cfg(test)]
    pub fn new(pid: u32, name: impl Into<String>, command_line: Vec<String>) -> Self {
        Self {
            pid,
            name: name.into(),
            command_line,
            created_at: Utc::now(),
            is_zombie: false,
        }
    }

    /// 进程已运行的秒数
    pub fn age_secs(&self) -> f64 {
        let age = Utc::now().signed_duration_since(self.created_at);
        age.num_milliseconds().max(0) as f64 / 1000.0
    }
}

impl fmt::Display for ProcessRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (PID: {})", self.name, self.pid)
    }
}

/// 终止方式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminationMethod {
    Graceful,
    Forced,
}

impl fmt::Display for TerminationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TerminationMethod::Graceful => f.write_str("graceful"),
            TerminationMethod::Forced => f.write_str("forced"),
        }
    }
}

/// 一次成功终止的结果
#[derive(Debug, Clone, PartialEq)]
pub struct TerminationOutcome {
    pub process_name: String,
    pub pid: u32,
    pub method: TerminationMethod,
    pub timestamp: DateTime<Local>,
}

impl fmt::Display for TerminationOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (PID: {})", self.process_name, self.pid)
    }
}

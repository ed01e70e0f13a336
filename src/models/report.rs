use chrono::{DateTime, Local};
use std::fmt;
use std::path::PathBuf;

use crate::error::ProcessError;
use crate::models::{InstalledApp, TerminationOutcome};

/// 跳过某个进程的原因
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// 进程已退出
    Vanished,
    AccessDenied,
    Zombie,
    /// 只报告不处理
    DryRun,
}

impl SkipReason {
    /// 瞬时错误转成跳过原因，其他错误返回 None
    pub fn from_error(err: &ProcessError) -> Option<Self> {
        match err {
            ProcessError::NoSuchProcess(_) => Some(SkipReason::Vanished),
            ProcessError::AccessDenied(_) => Some(SkipReason::AccessDenied),
            ProcessError::Zombie(_) => Some(SkipReason::Zombie),
            ProcessError::Other { .. } => None,
        }
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SkipReason::Vanished => "process vanished",
            SkipReason::AccessDenied => "access denied",
            SkipReason::Zombie => "zombie process",
            SkipReason::DryRun => "dry run",
        };
        f.write_str(s)
    }
}

/// 单个匹配进程的处理结果
#[derive(Debug, Clone, PartialEq)]
pub enum ProcessResult {
    Terminated(TerminationOutcome),
    Skipped {
        name: String,
        pid: u32,
        reason: SkipReason,
    },
    Failed {
        name: String,
        pid: u32,
        message: String,
    },
}

/// 启动项清理动作
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SweepAction {
    /// 已卸载并删除
    Removed,
    /// 已尝试卸载，但没有权限删除文件
    DeletionSkipped,
    RemoveFailed(String),
}

/// 与某个进程名关联的启动项，发现后在同一次清理中处理掉
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AutostartEntry {
    pub path: PathBuf,
    pub process_name: String,
    pub action: SweepAction,
}

/// 一轮扫描的汇总
#[derive(Debug, Clone)]
pub struct CycleReport {
    pub started_at: DateTime<Local>,
    pub results: Vec<ProcessResult>,
    pub swept: Vec<AutostartEntry>,
}

impl CycleReport {
    pub fn new() -> Self {
        Self {
            started_at: Local::now(),
            results: Vec::new(),
            swept: Vec::new(),
        }
    }

    pub fn terminated(&self) -> impl Iterator<Item = &TerminationOutcome> {
        self.results.iter().filter_map(|r| match r {
            ProcessResult::Terminated(outcome) => Some(outcome),
            _ => None,
        })
    }
}

impl Default for CycleReport {
    fn default() -> Self {
        Self::new()
    }
}

/// 启动阶段的检查结果
#[derive(Debug, Clone, Default)]
pub struct StartupReport {
    pub elevated: bool,
    pub installed_apps: Vec<InstalledApp>,
}

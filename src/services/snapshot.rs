use chrono::{DateTime, Utc};
use sysinfo::{Process, ProcessRefreshKind, ProcessStatus, ProcessesToUpdate, System, UpdateKind};

use crate::models::ProcessRecord;

/// 进程表快照的来源
pub trait ProcessSnapshot {
    /// 枚举当前所有进程；只有整体枚举失败才返回错误
    fn snapshot(&mut self) -> anyhow::Result<Vec<ProcessRecord>>;
}

/// 基于 sysinfo 的进程快照
pub struct SysinfoSnapshot {
    system: System,
}

impl SysinfoSnapshot {
    pub fn new() -> Self {
        Self {
            system: System::new(),
        }
    }
}

impl Default for SysinfoSnapshot {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessSnapshot for SysinfoSnapshot {
    fn snapshot(&mut self) -> anyhow::Result<Vec<ProcessRecord>> {
        let refreshed = self.system.refresh_processes_specifics(
            ProcessesToUpdate::All,
            true,
            ProcessRefreshKind::nothing()
                .with_cmd(UpdateKind::Always)
                .without_tasks(),
        );
        log::debug!("Refreshed {} processes", refreshed);

        // Linux 上线程也会出现在进程表里，只保留真正的进程
        let records = self
            .system
            .processes()
            .values()
            .filter(|process| process.thread_kind().is_none())
            .map(to_record)
            .collect();

        Ok(records)
    }
}

pub(crate) fn to_record(process: &Process) -> ProcessRecord {
    let command_line = process
        .cmd()
        .iter()
        .map(|s| s.to_string_lossy().into_owned())
        .collect();

    ProcessRecord {
        pid: process.pid().as_u32(),
        name: process.name().to_string_lossy().into_owned(),
        command_line,
        created_at: DateTime::<Utc>::from_timestamp(process.start_time() as i64, 0)
            .unwrap_or_else(Utc::now),
        is_zombie: matches!(process.status(), ProcessStatus::Zombie),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::process;

    #[test]
    fn test_snapshot_contains_current_process() {
        let mut snapshot = SysinfoSnapshot::new();
        let records = snapshot.snapshot().unwrap();
        let me = process::id();

        let current = records.iter().find(|r| r.pid == me);
        assert!(current.is_some(), "current process {} not in snapshot", me);
        assert!(!current.unwrap().name.is_empty());
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_snapshot_excludes_threads() {
        use std::collections::HashSet;
        use std::fs;
        use std::sync::{Arc, Barrier};
        use std::thread;

        let barrier = Arc::new(Barrier::new(5));
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let barrier = barrier.clone();
                thread::spawn(move || {
                    barrier.wait();
                    barrier.wait();
                })
            })
            .collect();
        barrier.wait();

        let me = process::id();
        let tids: HashSet<u32> = fs::read_dir("/proc/self/task")
            .unwrap()
            .filter_map(|e| e.ok()?.file_name().to_str()?.parse().ok())
            .filter(|tid| *tid != me)
            .collect();

        let mut snapshot = SysinfoSnapshot::new();
        let records = snapshot.snapshot().unwrap();

        barrier.wait();
        for handle in handles {
            handle.join().unwrap();
        }

        assert!(tids.len() >= 4);
        assert!(records.iter().any(|r| r.pid == me));
        let leaked: Vec<u32> = records.iter().map(|r| r.pid).filter(|pid| tids.contains(pid)).collect();
        assert!(leaked.is_empty(), "thread ids in snapshot: {:?}", leaked);
    }

    #[test]
    fn test_snapshot_is_fresh_each_call() {
        let mut snapshot = SysinfoSnapshot::new();
        let first = snapshot.snapshot().unwrap();
        let second = snapshot.snapshot().unwrap();
        assert!(!first.is_empty());
        assert!(!second.is_empty());
    }
}

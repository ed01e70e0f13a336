use std::sync::Mutex;
use sysinfo::{Pid, ProcessRefreshKind, ProcessStatus, ProcessesToUpdate, System};

use crate::error::ProcessError;

/// 针对单个 PID 的进程生命周期操作
pub trait ProcessControl {
    /// 请求进程正常退出（Unix 上是 SIGTERM）
    fn request_stop(&self, pid: u32) -> Result<(), ProcessError>;

    /// 进程是否已退出（僵尸进程也算已退出）
    fn has_exited(&self, pid: u32) -> Result<bool, ProcessError>;

    /// 强制结束进程
    fn force_kill(&self, pid: u32) -> Result<(), ProcessError>;
}

/// 使用系统原生接口的实现
pub struct NativeControl {
    system: Mutex<System>,
}

impl NativeControl {
    pub fn new() -> Self {
        Self {
            system: Mutex::new(System::new()),
        }
    }

    /// 刷新单个进程，返回 (是否存在, 是否僵尸)
    fn probe(&self, pid: u32) -> Result<(bool, bool), ProcessError> {
        let mut sys = self.system.lock().map_err(|e| ProcessError::Other {
            pid,
            message: format!("process table lock poisoned: {}", e),
        })?;

        let sysinfo_pid = Pid::from_u32(pid);
        sys.refresh_processes_specifics(
            ProcessesToUpdate::Some(&[sysinfo_pid]),
            true,
            ProcessRefreshKind::nothing(),
        );

        Ok(match sys.process(sysinfo_pid) {
            Some(process) => (true, matches!(process.status(), ProcessStatus::Zombie)),
            None => (false, false),
        })
    }

    #[cfg(unix)]
    fn send(&self, pid: u32, signal: nix::sys::signal::Signal) -> Result<(), ProcessError> {
        use nix::sys::signal::kill;
        use nix::unistd::Pid as NixPid;

        let raw_pid = i32::try_from(pid).map_err(|_| ProcessError::Other {
            pid,
            message: "PID exceeds i32 range".to_string(),
        })?;

        kill(NixPid::from_raw(raw_pid), signal).map_err(|errno| ProcessError::from_errno(pid, errno))
    }

    #[cfg(not(unix))]
    fn terminate_native(&self, pid: u32) -> Result<(), ProcessError> {
        let mut sys = self.system.lock().map_err(|e| ProcessError::Other {
            pid,
            message: format!("process table lock poisoned: {}", e),
        })?;

        let sysinfo_pid = Pid::from_u32(pid);
        sys.refresh_processes_specifics(
            ProcessesToUpdate::Some(&[sysinfo_pid]),
            true,
            ProcessRefreshKind::nothing(),
        );

        let process = sys.process(sysinfo_pid).ok_or(ProcessError::NoSuchProcess(pid))?;
        // Windows 上没有可用的“正常退出”信号，两步都走 TerminateProcess
        if process.kill() {
            Ok(())
        } else {
            Err(ProcessError::AccessDenied(pid))
        }
    }
}

impl Default for NativeControl {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessControl for NativeControl {
    fn request_stop(&self, pid: u32) -> Result<(), ProcessError> {
        let (exists, zombie) = self.probe(pid)?;
        if !exists {
            return Err(ProcessError::NoSuchProcess(pid));
        }
        if zombie {
            return Err(ProcessError::Zombie(pid));
        }

        #[cfg(unix)]
        {
            self.send(pid, nix::sys::signal::Signal::SIGTERM)
        }

        #[cfg(not(unix))]
        {
            self.terminate_native(pid)
        }
    }

    fn has_exited(&self, pid: u32) -> Result<bool, ProcessError> {
        let (exists, zombie) = self.probe(pid)?;
        Ok(!exists || zombie)
    }

    fn force_kill(&self, pid: u32) -> Result<(), ProcessError> {
        #[cfg(unix)]
        {
            self.send(pid, nix::sys::signal::Signal::SIGKILL)
        }

        #[cfg(not(unix))]
        {
            self.terminate_native(pid)
        }
    }
}

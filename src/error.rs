use thiserror::Error;

/// 针对单个进程操作的错误
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProcessError {
    #[error("no such process (pid={0})")]
    NoSuchProcess(u32),

    #[error("access denied (pid={0})")]
    AccessDenied(u32),

    #[error("process is a zombie (pid={0})")]
    Zombie(u32),

    #[error("failed to control process (pid={pid}): {message}")]
    Other { pid: u32, message: String },
}

impl ProcessError {
    #[cfg(unix)]
    pub fn from_errno(pid: u32, errno: nix::errno::Errno) -> Self {
        use nix::errno::Errno;

        match errno {
            Errno::ESRCH => ProcessError::NoSuchProcess(pid),
            Errno::EPERM => ProcessError::AccessDenied(pid),
            other => ProcessError::Other {
                pid,
                message: other.desc().to_string(),
            },
        }
    }
}

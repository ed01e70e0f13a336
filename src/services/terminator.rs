use chrono::Local;
use std::time::Duration;
use tokio::time::{sleep, Instant};

use crate::error::ProcessError;
use crate::models::{ProcessRecord, TerminationMethod, TerminationOutcome};
use crate::services::control::ProcessControl;

/// 检查进程是否退出的间隔
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// 两阶段终止：先请求正常退出，超时后强制结束
pub struct Terminator<'a> {
    control: &'a dyn ProcessControl,
    grace_timeout: Duration,
}

impl<'a> Terminator<'a> {
    pub fn new(control: &'a dyn ProcessControl, grace_timeout: Duration) -> Self {
        Self {
            control,
            grace_timeout,
        }
    }

    pub async fn terminate(&self, record: &ProcessRecord) -> Result<TerminationOutcome, ProcessError> {
        if record.is_zombie {
            return Err(ProcessError::Zombie(record.pid));
        }

        self.control.request_stop(record.pid)?;

        let method = if self.wait_for_exit(record.pid).await? {
            TerminationMethod::Graceful
        } else {
            log::debug!(
                "{} did not exit within {:?}, sending forced kill",
                record,
                self.grace_timeout
            );
            match self.control.force_kill(record.pid) {
                Ok(()) => TerminationMethod::Forced,
                // 超时之后刚好自己退出了
                Err(ProcessError::NoSuchProcess(_)) => TerminationMethod::Graceful,
                Err(e) => return Err(e),
            }
        };

        Ok(TerminationOutcome {
            process_name: record.name.clone(),
            pid: record.pid,
            method,
            timestamp: Local::now(),
        })
    }

    /// 在超时内轮询，进程退出返回 true
    async fn wait_for_exit(&self, pid: u32) -> Result<bool, ProcessError> {
        let deadline = Instant::now() + self.grace_timeout;
        let step = POLL_INTERVAL.min(self.grace_timeout);

        loop {
            if self.control.has_exited(pid)? {
                return Ok(true);
            }
            if Instant::now() >= deadline {
                return Ok(false);
            }
            sleep(step).await;
        }
    }
}

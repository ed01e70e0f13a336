use std::fmt;

/// 监控循环的状态：Starting → Running → Stopping
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorPhase {
    Starting,
    Running,
    Stopping,
}

impl MonitorPhase {
    /// 切换状态，非法的切换返回错误
    pub fn advance(&mut self, next: MonitorPhase) -> anyhow::Result<()> {
        let allowed = matches!(
            (*self, next),
            (MonitorPhase::Starting, MonitorPhase::Running)
                | (MonitorPhase::Starting, MonitorPhase::Stopping)
                | (MonitorPhase::Running, MonitorPhase::Stopping)
        );

        if !allowed {
            anyhow::bail!("invalid monitor transition: {} -> {}", self, next);
        }

        log::debug!("Monitor phase: {} -> {}", self, next);
        *self = next;
        Ok(())
    }
}

impl fmt::Display for MonitorPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            MonitorPhase::Starting => "starting",
            MonitorPhase::Running => "running",
            MonitorPhase::Stopping => "stopping",
        };
        f.write_str(s)
    }
}

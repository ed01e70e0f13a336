use crate::models::ProcessRecord;
#[cfg(target_os = "macos")]
use crate::services::Launchctl;
use crate::services::{
    has_elevated_privileges, ApplicationLocator, AutostartSweeper, NativeControl, ProcessControl,
    ProcessSnapshot, SysinfoSnapshot,
};

/// 平台能力集合：权限检查、进程快照、终止原语，以及可选的应用扫描和启动项清理
pub trait Platform {
    fn name(&self) -> &'static str;

    fn has_elevated_privileges(&self) -> bool;

    fn snapshot(&mut self) -> anyhow::Result<Vec<ProcessRecord>>;

    fn control(&self) -> &dyn ProcessControl;

    fn locator(&self) -> Option<&ApplicationLocator> {
        None
    }

    fn sweeper(&self) -> Option<&AutostartSweeper> {
        None
    }
}

/// 当前操作系统的实现
pub struct NativePlatform {
    snapshot: SysinfoSnapshot,
    control: NativeControl,
    locator: Option<ApplicationLocator>,
    sweeper: Option<AutostartSweeper>,
}

impl NativePlatform {
    #[cfg(target_os = "macos")]
    pub fn detect() -> anyhow::Result<Self> {
        Ok(Self {
            snapshot: SysinfoSnapshot::new(),
            control: NativeControl::new(),
            locator: Some(ApplicationLocator::new(ApplicationLocator::default_roots())?),
            sweeper: Some(AutostartSweeper::new(
                AutostartSweeper::default_dirs(),
                Box::new(Launchctl),
            )),
        })
    }

    #[cfg(not(target_os = "macos"))]
    pub fn detect() -> anyhow::Result<Self> {
        Ok(Self {
            snapshot: SysinfoSnapshot::new(),
            control: NativeControl::new(),
            locator: None,
            sweeper: None,
        })
    }
}

impl Platform for NativePlatform {
    fn name(&self) -> &'static str {
        if cfg!(target_os = "macos") {
            "macOS"
        } else if cfg!(target_os = "windows") {
            "Windows"
        } else if cfg!(target_os = "linux") {
            "Linux"
        } else {
            std::env::consts::OS
        }
    }

    fn has_elevated_privileges(&self) -> bool {
        has_elevated_privileges()
    }

    fn snapshot(&mut self) -> anyhow::Result<Vec<ProcessRecord>> {
        self.snapshot.snapshot()
    }

    fn control(&self) -> &dyn ProcessControl {
        &self.control
    }

    fn locator(&self) -> Option<&ApplicationLocator> {
        self.locator.as_ref()
    }

    fn sweeper(&self) -> Option<&AutostartSweeper> {
        self.sweeper.as_ref()
    }
}

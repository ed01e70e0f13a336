use std::path::PathBuf;

/// 目标家族的标记子串，用于应用扫描和启动项清理
pub const FAMILY_MARKER: &str = "360";

/// 已安装应用的唯一标识（macOS 上是 Bundle ID）
pub type ApplicationIdentifier = String;

#[cfg(target_os = "windows")]
const PLATFORM_TARGETS: &[&str] = &[
    "360safe.exe",
    "360tray.exe",
    "360sd.exe",
    "360rp.exe",
    "360protection.exe",
    "360se.exe",
    "360chrome.exe",
    "360wallpaper.exe",
];

#[cfg(target_os = "macos")]
const PLATFORM_TARGETS: &[&str] = &[
    "360safe",
    "360tray",
    "360sd",
    "360protection",
    "360se",
    "SafeDaemon",
    "360SafeManager",
    "360Browser",
    "360Chrome",
];

#[cfg(not(any(target_os = "windows", target_os = "macos")))]
const PLATFORM_TARGETS: &[&str] = &[
    "360safe",
    "360tray",
    "360sd",
    "360protection",
    "360Login",
    "360NetRepair",
    "360se",
    "360Chrome",
];

/// 目标进程的子串集合，启动时构建一次，之后只读
///
/// 所有子串在构建时统一转成小写，匹配时不区分大小写。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetSpec {
    substrings: Vec<String>,
}

impl TargetSpec {
    pub fn new<I, S>(substrings: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut unique: Vec<String> = Vec::new();
        for s in substrings {
            let s = s.as_ref().trim().to_lowercase();
            if !s.is_empty() && !unique.contains(&s) {
                unique.push(s);
            }
        }

        Self { substrings: unique }
    }

    /// 当前平台内置的目标列表
    pub fn for_current_platform() -> Self {
        Self::new(PLATFORM_TARGETS.iter().copied())
    }

    pub fn substrings(&self) -> &[String] {
        &self.substrings
    }
}

/// 扫描到的已安装应用
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstalledApp {
    /// 应用包路径
    pub path: PathBuf,
    /// 从 Info.plist 读到的标识，读取失败时为 None
    pub identifier: Option<ApplicationIdentifier>,
}

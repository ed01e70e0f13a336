use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use crate::models::{AutostartEntry, SweepAction, FAMILY_MARKER};

/// 系统服务管理工具，用于卸载启动项
pub trait ServiceManager {
    fn unload(&self, descriptor: &Path) -> anyhow::Result<()>;
}

/// macOS launchctl
#[cfg_attr(not(target_os = "macos"), allow(dead_code))]
pub struct Launchctl;

impl ServiceManager for Launchctl {
    fn unload(&self, descriptor: &Path) -> anyhow::Result<()> {
        let status = Command::new("launchctl")
            .arg("unload")
            .arg(descriptor)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()?;

        if !status.success() {
            anyhow::bail!("launchctl unload exited with {}", status);
        }
        Ok(())
    }
}

/// 清理与目标进程相关的启动项（LaunchAgents / LaunchDaemons）
pub struct AutostartSweeper {
    dirs: Vec<PathBuf>,
    marker: String,
    service_manager: Box<dyn ServiceManager>,
}

#[cfg_attr(not(target_os = "macos"), allow(dead_code))]
impl AutostartSweeper {
    pub fn new(dirs: Vec<PathBuf>, service_manager: Box<dyn ServiceManager>) -> Self {
        Self {
            dirs,
            marker: FAMILY_MARKER.to_lowercase(),
            service_manager,
        }
    }

    /// macOS 默认的启动项目录
    pub fn default_dirs() -> Vec<PathBuf> {
        let mut paths = vec![
            PathBuf::from("/Library/LaunchAgents"),
            PathBuf::from("/Library/LaunchDaemons"),
        ];
        if let Some(home) = dirs::home_dir() {
            paths.push(home.join("Library").join("LaunchAgents"));
        }
        paths
    }

    /// 清理与 `process_name` 相关的启动项
    ///
    /// 卸载总是尝试，失败忽略；删除文件需要 `elevated`。
    /// 单个条目出错只记录日志，不影响其余条目。
    pub fn sweep(&self, process_name: &str, elevated: bool) -> Vec<AutostartEntry> {
        let process_name = process_name.to_lowercase();
        let mut swept = Vec::new();

        for dir in &self.dirs {
            if !dir.exists() {
                continue;
            }

            let entries = match fs::read_dir(dir) {
                Ok(entries) => entries,
                Err(e) => {
                    log::warn!("Failed to read autostart directory {}: {}", dir.display(), e);
                    continue;
                }
            };

            for entry in entries {
                let entry = match entry {
                    Ok(entry) => entry,
                    Err(e) => {
                        log::warn!("Failed to read entry in {}: {}", dir.display(), e);
                        continue;
                    }
                };

                let filename = entry.file_name().to_string_lossy().to_lowercase();
                let related = filename.contains(self.marker.as_str())
                    || (!process_name.is_empty() && filename.contains(process_name.as_str()));
                if !related {
                    continue;
                }

                let path = entry.path();
                log::info!("Found autostart entry: {}", path.display());
                let action = self.remove(&path, elevated);

                swept.push(AutostartEntry {
                    path,
                    process_name: process_name.clone(),
                    action,
                });
            }
        }

        swept
    }

    fn remove(&self, path: &Path, elevated: bool) -> SweepAction {
        if let Err(e) = self.service_manager.unload(path) {
            log::debug!("Unload of {} failed (ignored): {}", path.display(), e);
        }

        if !elevated {
            log::warn!("Root privileges required to delete autostart entry: {}", path.display());
            return SweepAction::DeletionSkipped;
        }

        match fs::remove_file(path) {
            Ok(()) => {
                log::info!("Deleted autostart entry: {}", path.display());
                SweepAction::Removed
            }
            Err(e) => {
                log::warn!("Failed to delete autostart entry {}: {}", path.display(), e);
                SweepAction::RemoveFailed(e.to_string())
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};
    use tempfile::TempDir;

    /// 记录被卸载的启动项
    #[derive(Clone, Default)]
    pub struct RecordingServiceManager {
        pub unloaded: Arc<Mutex<Vec<PathBuf>>>,
    }

    impl ServiceManager for RecordingServiceManager {
        fn unload(&self, descriptor: &Path) -> anyhow::Result<()> {
            self.unloaded.lock().unwrap().push(descriptor.to_path_buf());
            Ok(())
        }
    }

    struct FailingServiceManager;

    impl ServiceManager for FailingServiceManager {
        fn unload(&self, _descriptor: &Path) -> anyhow::Result<()> {
            anyhow::bail!("launchctl not available")
        }
    }

    fn fixture() -> (TempDir, PathBuf, PathBuf) {
        let dir = TempDir::new().unwrap();
        let matching = dir.path().join("com.qihoo.360safe.plist");
        let other = dir.path().join("com.apple.unrelated.plist");
        fs::write(&matching, "<plist/>").unwrap();
        fs::write(&other, "<plist/>").unwrap();
        (dir, matching, other)
    }

    #[test]
    fn test_elevated_sweep_removes_only_matching() {
        let (dir, matching, other) = fixture();
        let manager = RecordingServiceManager::default();
        let sweeper = AutostartSweeper::new(vec![dir.path().to_path_buf()], Box::new(manager.clone()));

        let swept = sweeper.sweep("notrelated", true);
        assert_eq!(swept.len(), 1);
        assert_eq!(swept[0].path, matching);
        assert_eq!(swept[0].action, SweepAction::Removed);
        assert!(!matching.exists());
        assert!(other.exists());
        assert_eq!(*manager.unloaded.lock().unwrap(), vec![matching]);
    }

    #[test]
    fn test_unprivileged_sweep_unloads_but_keeps_file() {
        let (dir, matching, other) = fixture();
        let manager = RecordingServiceManager::default();
        let sweeper = AutostartSweeper::new(vec![dir.path().to_path_buf()], Box::new(manager.clone()));

        let swept = sweeper.sweep("notrelated", false);
        assert_eq!(swept.len(), 1);
        assert_eq!(swept[0].action, SweepAction::DeletionSkipped);
        assert!(matching.exists());
        assert!(other.exists());
        assert_eq!(manager.unloaded.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_matches_by_process_name_case_insensitive() {
        let dir = TempDir::new().unwrap();
        let agent = dir.path().join("com.vendor.SafeDaemon.plist");
        fs::write(&agent, "<plist/>").unwrap();

        let sweeper = AutostartSweeper::new(
            vec![dir.path().to_path_buf()],
            Box::new(RecordingServiceManager::default()),
        );
        let swept = sweeper.sweep("safedaemon", true);
        assert_eq!(swept.len(), 1);
        assert_eq!(swept[0].process_name, "safedaemon");
        assert!(!agent.exists());
    }

    #[test]
    fn test_unload_failure_does_not_stop_sweep() {
        let (dir, matching, _other) = fixture();
        let second = dir.path().join("360tray.agent.plist");
        fs::write(&second, "<plist/>").unwrap();

        let sweeper = AutostartSweeper::new(vec![dir.path().to_path_buf()], Box::new(FailingServiceManager));
        let swept = sweeper.sweep("360tray", true);
        assert_eq!(swept.len(), 2);
        assert!(swept.iter().all(|e| e.action == SweepAction::Removed));
        assert!(!matching.exists());
        assert!(!second.exists());
    }

    #[test]
    fn test_missing_directory_is_skipped() {
        let dir = TempDir::new().unwrap();
        let sweeper = AutostartSweeper::new(
            vec![dir.path().join("LaunchAgents")],
            Box::new(RecordingServiceManager::default()),
        );
        assert!(sweeper.sweep("360se", true).is_empty());
    }

    #[test]
    fn test_failed_delete_is_a_warning() {
        crate::logging::capture::start();
        let dir = TempDir::new().unwrap();
        // 目录无法用 remove_file 删除
        let stuck = dir.path().join("com.qihoo.360safe.plist");
        fs::create_dir(&stuck).unwrap();

        let sweeper = AutostartSweeper::new(
            vec![dir.path().to_path_buf()],
            Box::new(RecordingServiceManager::default()),
        );
        let swept = sweeper.sweep("360safe", true);
        assert_eq!(swept.len(), 1);
        assert!(matches!(swept[0].action, SweepAction::RemoveFailed(_)));
        assert!(stuck.exists());

        let records = crate::logging::capture::records();
        assert!(records
            .iter()
            .any(|(level, msg)| *level == log::Level::Warn && msg.starts_with("Failed to delete autostart entry")));
        assert!(records.iter().all(|(level, _)| *level != log::Level::Error));
    }
}

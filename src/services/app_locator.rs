use regex::Regex;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use crate::models::{ApplicationIdentifier, InstalledApp, FAMILY_MARKER};

const BUNDLE_SUFFIX: &str = ".app";
const MANIFEST_PATH: &str = "Contents/Info.plist";

/// 在常见安装目录下查找目标家族的应用包，并读取其 Bundle ID
pub struct ApplicationLocator {
    roots: Vec<PathBuf>,
    marker: String,
    identifier_re: Regex,
}

#[cfg_attr(not(target_os = "macos"), allow(dead_code))]
impl ApplicationLocator {
    pub fn new(roots: Vec<PathBuf>) -> anyhow::Result<Self> {
        let identifier_re =
            Regex::new(r"<key>\s*CFBundleIdentifier\s*</key>\s*<string>\s*([^<\s]+)\s*</string>")?;

        Ok(Self {
            roots,
            marker: FAMILY_MARKER.to_string(),
            identifier_re,
        })
    }

    /// macOS 默认的搜索根目录：系统应用、用户应用、Application Support
    pub fn default_roots() -> Vec<PathBuf> {
        let mut roots = vec![PathBuf::from("/Applications")];
        if let Some(home) = dirs::home_dir() {
            roots.push(home.join("Applications"));
        }
        roots.push(PathBuf::from("/Library/Application Support"));
        roots
    }

    /// 所有已安装的目标应用，包括读不到标识的
    pub fn find_installed_apps(&self) -> Vec<InstalledApp> {
        let mut bundles = Vec::new();
        for root in &self.roots {
            self.walk(root, &mut bundles);
        }

        bundles
            .into_iter()
            .map(|path| {
                let identifier = self.read_identifier(&path);
                InstalledApp { path, identifier }
            })
            .collect()
    }

    /// 去重后的应用标识，每轮扫描重新计算
    pub fn find_installed_targets(&self) -> Vec<ApplicationIdentifier> {
        let mut seen = HashSet::new();
        let mut identifiers = Vec::new();

        for app in self.find_installed_apps() {
            if let Some(id) = app.identifier {
                if seen.insert(id.clone()) {
                    log::info!("Found bundle identifier {} ({})", id, app.path.display());
                    identifiers.push(id);
                }
            }
        }

        identifiers
    }

    fn walk(&self, dir: &Path, found: &mut Vec<PathBuf>) {
        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) => {
                log::warn!("Failed to read directory {}: {}", dir.display(), e);
                return;
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

            let path = entry.path();
            let name = entry.file_name().to_string_lossy().into_owned();

            if name.contains(self.marker.as_str()) && name.ends_with(BUNDLE_SUFFIX) {
                log::info!("Found installed application: {}", path.display());
                found.push(path);
                // 不进入应用包内部
                continue;
            }

            // 不跟随符号链接
            match entry.file_type() {
                Ok(ft) if ft.is_dir() => self.walk(&path, found),
                Ok(_) => {}
                Err(e) => log::warn!("Failed to stat {}: {}", path.display(), e),
            }
        }
    }

    fn read_identifier(&self, bundle: &Path) -> Option<ApplicationIdentifier> {
        let manifest = bundle.join(MANIFEST_PATH);
        let data = match fs::read(&manifest) {
            Ok(data) => data,
            Err(e) => {
                log::warn!("Failed to read manifest {}: {}", manifest.display(), e);
                return None;
            }
        };

        if data.starts_with(b"bplist") {
            log::warn!("Binary plist not supported: {}", manifest.display());
            return None;
        }

        let text = String::from_utf8_lossy(&data);
        let id = self
            .identifier_re
            .captures(&text)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string());

        if id.is_none() {
            log::warn!("No CFBundleIdentifier in {}", manifest.display());
        }
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_bundle(root: &Path, name: &str, identifier: Option<&str>) -> PathBuf {
        let bundle = root.join(name);
        fs::create_dir_all(bundle.join("Contents")).unwrap();
        if let Some(id) = identifier {
            let plist = format!(
                r#"<?xml version="1.0" encoding="UTF-8"?>
<plist version="1.0">
<dict>
    <key>CFBundleName</key>
    <string>Demo</string>
    <key>CFBundleIdentifier</key>
    <string>{}</string>
</dict>
</plist>
"#,
                id
            );
            fs::write(bundle.join(MANIFEST_PATH), plist).unwrap();
        }
        bundle
    }

    #[test]
    fn test_finds_bundles_and_identifiers() {
        let root = TempDir::new().unwrap();
        write_bundle(root.path(), "360Safe.app", Some("com.qihoo.360safe"));
        write_bundle(root.path(), "Safari.app", Some("com.apple.Safari"));
        fs::create_dir_all(root.path().join("360docs")).unwrap();

        let locator = ApplicationLocator::new(vec![root.path().to_path_buf()]).unwrap();
        let apps = locator.find_installed_apps();
        assert_eq!(apps.len(), 1);
        assert!(apps[0].path.ends_with("360Safe.app"));
        assert_eq!(apps[0].identifier.as_deref(), Some("com.qihoo.360safe"));
    }

    #[test]
    fn test_walks_nested_directories() {
        let root = TempDir::new().unwrap();
        let nested = root.path().join("Vendor").join("Tools");
        fs::create_dir_all(&nested).unwrap();
        write_bundle(&nested, "360Browser.app", Some("com.360.browser"));

        let locator = ApplicationLocator::new(vec![root.path().to_path_buf()]).unwrap();
        assert_eq!(locator.find_installed_targets(), vec!["com.360.browser".to_string()]);
    }

    #[test]
    fn test_missing_manifest_and_root_are_skipped() {
        let root = TempDir::new().unwrap();
        write_bundle(root.path(), "360Broken.app", None);

        let locator = ApplicationLocator::new(vec![
            root.path().join("does-not-exist"),
            root.path().to_path_buf(),
        ])
        .unwrap();

        let apps = locator.find_installed_apps();
        assert_eq!(apps.len(), 1);
        assert_eq!(apps[0].identifier, None);
        assert!(locator.find_installed_targets().is_empty());
    }

    #[test]
    fn test_identifiers_are_deduplicated_across_roots() {
        let a = TempDir::new().unwrap();
        let b = TempDir::new().unwrap();
        write_bundle(a.path(), "360Safe.app", Some("com.qihoo.360safe"));
        write_bundle(b.path(), "360Safe Copy.app", Some("com.qihoo.360safe"));

        let locator =
            ApplicationLocator::new(vec![a.path().to_path_buf(), b.path().to_path_buf()]).unwrap();
        assert_eq!(locator.find_installed_apps().len(), 2);
        assert_eq!(locator.find_installed_targets(), vec!["com.qihoo.360safe".to_string()]);
    }

    #[test]
    fn test_binary_plist_is_skipped() {
        let root = TempDir::new().unwrap();
        let bundle = write_bundle(root.path(), "360Bin.app", None);
        fs::write(bundle.join(MANIFEST_PATH), b"bplist00\x00\x01").unwrap();

        let locator = ApplicationLocator::new(vec![root.path().to_path_buf()]).unwrap();
        assert_eq!(locator.find_installed_apps()[0].identifier, None);
    }
}

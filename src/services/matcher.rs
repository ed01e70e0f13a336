use std::collections::HashSet;

use crate::models::{ProcessRecord, TargetSpec};

/// 根据进程名和命令行判断是否为目标进程
///
/// 子串匹配、不区分大小写。命令行里只要出现目标字符串就会命中，
/// 包括文件路径参数，这类误报是可以接受的。
#[derive(Debug, Clone)]
pub struct Matcher {
    spec: TargetSpec,
}

impl Matcher {
    pub fn new(spec: TargetSpec) -> Self {
        Self { spec }
    }

    pub fn spec(&self) -> &TargetSpec {
        &self.spec
    }

    pub fn is_target(&self, record: &ProcessRecord, extra_identifiers: &HashSet<String>) -> bool {
        let name = record.name.to_lowercase();
        // 没有命令行时当作空字符串
        let cmdline = record.command_line.join(" ").to_lowercase();

        let by_spec = self
            .spec
            .substrings()
            .iter()
            .any(|target| name.contains(target.as_str()) || cmdline.contains(target.as_str()));

        by_spec
            || extra_identifiers
                .iter()
                .filter(|id| !id.is_empty())
                .any(|id| cmdline.contains(&id.to_lowercase()))
    }
}

use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

use crate::monitor::MonitorConfig;

/// Process Watchdog - 定期扫描并终止 360 系列进程
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    /// 日志文件路径
    #[arg(short, long, env = "WATCHDOG_LOG_FILE", default_value = "360_monitor.log")]
    pub log_file: PathBuf,

    /// 扫描间隔（秒）
    #[arg(short, long, env = "WATCHDOG_INTERVAL", default_value_t = 5)]
    pub interval: u64,

    /// 正常退出的等待时间（秒）
    #[arg(short, long, env = "WATCHDOG_GRACE_TIMEOUT", default_value_t = 3)]
    pub grace_timeout: u64,

    /// 日志级别
    #[arg(long, env = "WATCHDOG_LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// 只报告匹配的进程，不终止
    #[arg(long, env = "WATCHDOG_DRY_RUN")]
    pub dry_run: bool,
}

impl From<&CommandArgs> for MonitorConfig {
    fn from(args: &CommandArgs) -> Self {
        Self {
            interval: Duration::from_secs(args.interval),
            grace_timeout: Duration::from_secs(args.grace_timeout),
            dry_run: args.dry_run,
        }
    }
}

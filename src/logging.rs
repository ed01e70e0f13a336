use anyhow::Context;
use chrono::Local;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

/// 日志文件句柄，启动时初始化一次，退出前 flush
pub struct LogSink {
    path: PathBuf,
}

impl LogSink {
    /// 以追加方式打开日志文件并安装 env_logger
    ///
    /// `RUST_LOG` 优先于 `level`。
    pub fn init(path: &Path, level: &str) -> anyhow::Result<Self> {
        let file = open_append(path)?;

        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
            .target(env_logger::Target::Pipe(Box::new(file)))
            .format(|buf, record| {
                writeln!(
                    buf,
                    "{} - {} - {}",
                    Local::now().format("%Y-%m-%d %H:%M:%S"),
                    record.level(),
                    record.args()
                )
            })
            .try_init()
            .context("logger already initialized")?;

        let path = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn flush(&self) {
        log::logger().flush();
    }
}

fn open_append(path: &Path) -> anyhow::Result<File> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("failed to open log file {}", path.display()))
}

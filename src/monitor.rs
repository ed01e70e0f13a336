use anyhow::Context;
use std::collections::HashSet;
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;

use crate::error::ProcessError;
use crate::models::{CycleReport, ProcessRecord, ProcessResult, SkipReason, StartupReport};
use crate::platform::Platform;
use crate::services::{Matcher, Terminator};
use crate::state::MonitorPhase;

/// 监控循环参数
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonitorConfig {
    /// 两轮扫描之间的间隔
    pub interval: Duration,
    /// 正常退出的等待时间，超时后强制结束
    pub grace_timeout: Duration,
    /// 只报告，不终止进程也不清理启动项
    pub dry_run: bool,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(5),
            grace_timeout: Duration::from_secs(3),
            dry_run: false,
        }
    }
}

/// 扫描 → 匹配 → 终止 → 清理启动项 → 休眠，直到收到停止信号
///
/// 整个循环在同一个任务里顺序执行，每轮都从头构建匹配结果，
/// 不在轮次之间记住任何进程。
pub struct Monitor<P: Platform> {
    platform: P,
    matcher: Matcher,
    config: MonitorConfig,
    phase: MonitorPhase,
    cycles: u64,
}

impl<P: Platform> Monitor<P> {
    pub fn new(platform: P, matcher: Matcher, config: MonitorConfig) -> Self {
        Self {
            platform,
            matcher,
            config,
            phase: MonitorPhase::Starting,
            cycles: 0,
        }
    }

    #[cfg(test)]
    pub fn phase(&self) -> MonitorPhase {
        self.phase
    }

    pub fn platform(&self) -> &P {
        &self.platform
    }

    /// 一次性的启动检查：权限、已安装应用
    pub fn start(&mut self) -> anyhow::Result<StartupReport> {
        log::info!(
            "Monitor starting on {} with {} target patterns",
            self.platform.name(),
            self.matcher.spec().substrings().len()
        );

        let elevated = self.platform.has_elevated_privileges();
        if !elevated {
            log::warn!("Not running with elevated privileges; some target processes may not be terminated");
        }

        let installed_apps = match self.platform.locator() {
            Some(locator) => {
                let apps = locator.find_installed_apps();
                log::info!("Found {} installed target applications", apps.len());
                apps
            }
            None => Vec::new(),
        };

        self.phase.advance(MonitorPhase::Running)?;

        Ok(StartupReport {
            elevated,
            installed_apps,
        })
    }

    /// 执行一轮完整扫描
    ///
    /// 单个进程的失败都记录在报告里，只有整体枚举失败才返回错误。
    pub async fn run_cycle(&mut self) -> anyhow::Result<CycleReport> {
        let extra_identifiers: HashSet<String> = self
            .platform
            .locator()
            .map(|locator| locator.find_installed_targets().into_iter().collect())
            .unwrap_or_default();

        let records = self
            .platform
            .snapshot()
            .context("failed to enumerate processes")?;

        let elevated = self.platform.sweeper().is_some() && self.platform.has_elevated_privileges();
        let terminator = Terminator::new(self.platform.control(), self.config.grace_timeout);
        let mut report = CycleReport::new();

        for record in records
            .iter()
            .filter(|r| self.matcher.is_target(r, &extra_identifiers))
        {
            log::info!(
                "Found target process: {} (PID: {}, running for {:.2}s)",
                record.name,
                record.pid,
                record.age_secs()
            );

            if self.config.dry_run {
                log::info!("Dry run, leaving {} untouched", record);
                report.results.push(skipped(record, SkipReason::DryRun));
                continue;
            }

            let result = match terminator.terminate(record).await {
                Ok(outcome) => {
                    log::info!("Terminated process: {} [{}]", outcome, outcome.method);
                    ProcessResult::Terminated(outcome)
                }
                Err(e) => classify(record, e),
            };
            report.results.push(result);

            if let Some(sweeper) = self.platform.sweeper() {
                report.swept.extend(sweeper.sweep(&record.name, elevated));
            }
        }

        self.cycles += 1;
        log::debug!(
            "Cycle {} finished: {} processes scanned, {} matched",
            self.cycles,
            records.len(),
            report.results.len()
        );

        Ok(report)
    }

    /// 循环运行，直到 `shutdown` 完成
    ///
    /// 扫描和休眠都会与 `shutdown` 竞争，信号到达时当前轮次可能做到一半。
    /// 返回完成的轮数。
    pub async fn run<F>(&mut self, shutdown: F) -> anyhow::Result<u64>
    where
        F: Future<Output = ()>,
    {
        if self.phase == MonitorPhase::Starting {
            self.start()?;
        }
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                biased;
                _ = &mut shutdown => break,
                report = self.run_cycle() => print_cycle(&report?),
            }

            tokio::select! {
                biased;
                _ = &mut shutdown => break,
                _ = sleep(self.config.interval) => {}
            }
        }

        self.phase.advance(MonitorPhase::Stopping)?;
        log::info!("Received termination signal, monitor is stopping after {} cycles", self.cycles);
        Ok(self.cycles)
    }
}

fn skipped(record: &ProcessRecord, reason: SkipReason) -> ProcessResult {
    ProcessResult::Skipped {
        name: record.name.clone(),
        pid: record.pid,
        reason,
    }
}

fn classify(record: &ProcessRecord, err: ProcessError) -> ProcessResult {
    match SkipReason::from_error(&err) {
        Some(reason) => {
            log::warn!("Skipping {}: {}", record, err);
            skipped(record, reason)
        }
        None => {
            log::error!(
                "Unexpected error while terminating {} (cmdline: {:?}): {}",
                record,
                record.command_line,
                err
            );
            ProcessResult::Failed {
                name: record.name.clone(),
                pid: record.pid,
                message: err.to_string(),
            }
        }
    }
}

/// 控制台输出本轮终止的进程
pub fn print_cycle(report: &CycleReport) {
    let terminated: Vec<_> = report.terminated().collect();
    if terminated.is_empty() {
        return;
    }

    println!();
    println!("Time: {}", report.started_at.format("%Y-%m-%d %H:%M:%S"));
    println!("Terminated processes:");
    for outcome in terminated {
        println!("- {}", outcome);
    }
}

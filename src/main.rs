use clap::Parser;

mod cli;
mod error;
mod logging;
mod models;
mod monitor;
mod platform;
mod services;
mod signal;
mod state;

use cli::CommandArgs;
use logging::LogSink;
use models::{StartupReport, TargetSpec};
use monitor::{Monitor, MonitorConfig};
use platform::{NativePlatform, Platform};
use services::Matcher;
use signal::ShutdownSignal;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let args = CommandArgs::parse();
    let sink = LogSink::init(&args.log_file, &args.log_level)?;

    let platform = NativePlatform::detect()?;
    let matcher = Matcher::new(TargetSpec::for_current_platform());
    let config = MonitorConfig::from(&args);

    print_banner(&args, &sink, platform.name());
    log::info!("Monitor started (log file: {})", sink.path().display());

    let mut shutdown = ShutdownSignal::register()?;
    let mut monitor = Monitor::new(platform, matcher, config);

    let startup = monitor.start()?;
    print_startup(&startup, monitor.platform().locator().is_some());

    let result = monitor
        .run(async {
            let name = shutdown.recv().await;
            log::info!("Received {}", name);
        })
        .await;

    match result {
        Ok(cycles) => {
            println!();
            println!("🛑 Monitor is stopping ({} cycles completed)...", cycles);
            sink.flush();
            Ok(())
        }
        Err(e) => {
            log::error!("❌ Monitor failed: {}", e);
            log::error!("   Full error chain:");
            let mut current_error: Option<&dyn std::error::Error> = Some(e.as_ref());
            while let Some(err) = current_error {
                log::error!("     - {}", err);
                current_error = err.source();
            }
            println!();
            println!("❌ Monitor failed: {:#}", e);
            sink.flush();
            Err(e)
        }
    }
}

fn print_banner(args: &CommandArgs, sink: &LogSink, platform: &str) {
    println!("╔═══════════════════════════════════════════════════════════╗");
    println!("║      Process Watchdog v{:<35}║", env!("CARGO_PKG_VERSION"));
    println!("║      360 family process monitor                           ║");
    println!("╚═══════════════════════════════════════════════════════════╝");
    println!();
    println!("🚀 Monitor started on {}", platform);
    println!("📄 Log file: {}", sink.path().display());
    println!("⏱  Scan interval: {}s, grace timeout: {}s", args.interval, args.grace_timeout);
    if args.dry_run {
        println!("🔍 Dry run: matching processes will only be reported");
    }
    println!("═══════════════════════════════════════════════════════════");
}

fn print_startup(startup: &StartupReport, has_locator: bool) {
    if !startup.elevated {
        println!("⚠️  Warning: run with administrator/root privileges to make sure every target process can be terminated");
    }

    if !has_locator {
        return;
    }

    println!();
    println!("Scanning for installed applications...");
    if startup.installed_apps.is_empty() {
        println!("No installed target applications found");
    } else {
        println!("Found the following applications:");
        for app in &startup.installed_apps {
            match &app.identifier {
                Some(id) => println!("- {} ({})", app.path.display(), id),
                None => println!("- {}", app.path.display()),
            }
        }
    }
}

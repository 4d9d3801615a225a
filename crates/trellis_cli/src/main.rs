//! CLI probe.
//!
//! # Responsibility
//! - Verify `trellis_core` linkage by printing its version.
//! - Given an application name and one search path, run plugin discovery and
//!   print what was found and what failed.

use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use trellis_core::{
    core_version, default_log_level, discover, init_logging, DiscoveryReport, LogTarget,
    SearchPath,
};

#[derive(Debug, Parser)]
#[command(name = "trellis", about = "Inspect plugin descriptors")]
struct Args {
    /// Application name used in the `[<App> Plugin]` section header.
    app_name: Option<String>,
    /// Directory holding plugin modules and their descriptors.
    module_dir: Option<PathBuf>,
    /// Directory holding plugin data files.
    data_dir: Option<PathBuf>,
    /// Log level (trace, debug, info, warn, error).
    #[arg(long)]
    log_level: Option<String>,
    /// Write rotating log files into this absolute directory instead of stderr.
    #[arg(long)]
    log_dir: Option<PathBuf>,
}

fn main() -> ExitCode {
    let args = Args::parse();
    println!("trellis_core version={}", core_version());

    let level = args.log_level.as_deref().unwrap_or(default_log_level());
    let target = args.log_dir.map_or(LogTarget::Stderr, LogTarget::Directory);
    if let Err(err) = init_logging(level, target) {
        eprintln!("logging disabled: {err}");
    }

    let (Some(app_name), Some(module_dir)) = (args.app_name, args.module_dir) else {
        return ExitCode::SUCCESS;
    };
    let data_dir = args.data_dir.unwrap_or_else(|| module_dir.clone());
    let report = discover(
        &[SearchPath::new(module_dir, data_dir)],
        &app_name,
        &trellis_core::config::environment_locales(),
    );
    print_report(&report);

    if report.failures.is_empty() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

fn print_report(report: &DiscoveryReport) {
    for info in &report.plugins {
        println!(
            "plugin module={} name={:?} loader={} iage={} icon={} depends={}",
            info.module_name(),
            info.name(),
            info.loader(),
            info.interface_age(),
            info.icon_name(),
            info.dependencies().join(",")
        );
    }
    for (path, err) in &report.failures {
        println!("failed file={} reason={}", path.display(), err);
    }
}

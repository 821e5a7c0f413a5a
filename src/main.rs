use std::path::PathBuf;
use std::time::SystemTime;

use anyhow::{ensure, Context, Result};
use chrono::{DateTime, Local};
use clap::Parser;

use backdate::record::FileTimestamps;
use backdate::shift::Shift;
use backdate::store::{self, WriteOutcome};

/// Shift a file's timestamps backward by a fixed duration.
#[derive(Parser)]
struct Args {
    /// File whose timestamps to rewrite
    file: PathBuf,
    /// Days to go back
    #[arg(long, default_value_t = 0)]
    days: u64,
    /// Hours to go back
    #[arg(long, default_value_t = 0)]
    hours: u64,
    /// Minutes to go back
    #[arg(long, default_value_t = 0)]
    minutes: u64,
    /// Seconds to go back
    #[arg(long, default_value_t = 0)]
    seconds: u64,
    /// Print the target timestamps without writing them
    #[arg(long)]
    dry_run: bool,
}

fn main() -> Result<()> {
    env_logger::init();

    let args = Args::parse();
    ensure!(
        args.file.exists(),
        "file not found: {}",
        args.file.display()
    );

    let store = store::detect(&args.file);

    let times = store
        .read(&args.file)
        .with_context(|| format!("unable to read timestamps of {}", args.file.display()))?;
    print_timestamps("Current timestamps", &times);

    let shift = Shift {
        days: args.days,
        hours: args.hours,
        minutes: args.minutes,
        seconds: args.seconds,
    };
    let target = shift.apply(&times)?;

    if args.dry_run {
        print_timestamps("Target timestamps (not written)", &target);
        return Ok(());
    }

    let outcome = store
        .write(&args.file, &target)
        .with_context(|| format!("unable to write timestamps of {}", args.file.display()))?;
    if outcome == WriteOutcome::CreationUnchanged {
        println!("note: creation time was left unchanged");
    }

    let rewritten = store
        .read(&args.file)
        .context("unable to read back the rewritten timestamps")?;
    print_timestamps("New timestamps", &rewritten);

    Ok(())
}

fn print_timestamps(heading: &str, times: &FileTimestamps) {
    println!("{heading}:");
    if let Some(created) = times.created {
        println!("  created:  {}", format_local(created));
    }
    println!("  modified: {}", format_local(times.modified));
    println!("  accessed: {}", format_local(times.accessed));
    if let Some(changed) = times.changed {
        println!("  changed:  {} (metadata change)", format_local(changed));
    }
}

fn format_local(time: SystemTime) -> String {
    DateTime::<Local>::from(time)
        .format("%Y-%m-%d %H:%M:%S")
        .to_string()
}

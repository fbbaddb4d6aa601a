mod cli;
mod config;
mod error;
mod fs_util;
mod path;
mod sync;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Command, MergeArgs};
use colored::Colorize;
use config::Config;
use error::format_bytes;
use sync::output::{JsonReporter, LogReporter};
use sync::{MergeEngine, MergeStats};
use tracing_subscriber::{fmt, EnvFilter};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(cli.log_level().as_str()));

    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .init();

    let config = Config::load(cli.config.as_deref())?;

    match &cli.command {
        Command::Profiles => {
            let profiles = config.list_profiles();
            if profiles.is_empty() {
                println!("No profiles configured");
                println!("\nCreate profiles in: {}", Config::config_path()?.display());
            } else {
                println!("Available profiles:");
                for name in profiles {
                    println!("  {}", name);
                }
            }
            Ok(())
        }
        Command::Merge(args) => run_merge(&cli, args, &config),
    }
}

fn run_merge(cli: &Cli, args: &MergeArgs, config: &Config) -> Result<()> {
    let settings = args.resolve(config)?;
    let human = !cli.quiet && !cli.json;

    if human {
        println!("Syncing {} <-> {}", settings.a.display(), settings.b.display());
        if settings.dry_run {
            println!("Mode: Dry-run (no changes will be made)\n");
        }
    }

    let engine = MergeEngine::new(settings.dry_run, settings.marker_suffix);
    let stats = if cli.json {
        engine.merge(&settings.a, &settings.b, &mut JsonReporter)?
    } else {
        engine.merge(&settings.a, &settings.b, &mut LogReporter)?
    };

    if human {
        print_summary(&stats, settings.dry_run);
        println!("Done");
    }

    Ok(())
}

fn print_summary(stats: &MergeStats, dry_run: bool) {
    if dry_run {
        println!("\n{}\n", "✓ Dry-run complete (no changes made)".green().bold());
    } else {
        println!("\n{}\n", "✓ Merge complete".green().bold());
    }

    println!(
        "  Scanned:           {} in a, {} in b",
        stats.scanned_a.to_string().blue(),
        stats.scanned_b.to_string().blue()
    );

    let copied = |n: usize| {
        if n > 0 {
            n.to_string().green()
        } else {
            n.to_string().bright_black()
        }
    };
    let verb = if dry_run { "Would copy" } else { "Copied" };
    println!("  {} a → b:   {}", verb, copied(stats.copied_a_to_b));
    println!("  {} b → a:   {}", verb, copied(stats.copied_b_to_a));
    println!("  Already in sync:   {}", stats.in_sync.to_string().bright_black());
    println!("  Conflicts won:     {}", stats.resolved.to_string().yellow());

    if stats.deleted > 0 {
        println!("  Deleted:           {}", stats.deleted.to_string().red());
    }
    if stats.ambiguous > 0 {
        println!(
            "  {}         {} (same mtime, different content)",
            "Unresolved:".red().bold(),
            stats.ambiguous.to_string().red()
        );
    }
    if stats.type_mismatches > 0 {
        println!(
            "  {}     {} (file on one side, directory on the other)",
            "Type mismatch:".red(),
            stats.type_mismatches.to_string().red()
        );
    }
    if stats.timestamp_errors > 0 {
        println!(
            "  Timestamp errors:  {}",
            stats.timestamp_errors.to_string().yellow()
        );
    }

    println!();
    println!("  Bytes copied:      {}", format_bytes(stats.bytes_copied).cyan());
    println!("  Duration:          {}", format_duration(stats.duration).cyan());
    println!();
}

fn format_duration(duration: std::time::Duration) -> String {
    let secs = duration.as_secs();
    let millis = duration.subsec_millis();

    if secs >= 60 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else if secs > 0 {
        format!("{}.{:03}s", secs, millis)
    } else {
        format!("{}ms", millis)
    }
}

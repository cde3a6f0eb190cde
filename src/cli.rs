use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::commands::{self, CommandReport};
use crate::logging;

#[derive(Debug, Parser)]
#[command(name = "dayone-vault")]
#[command(about = "Convert a Day One JSON export into per-day Markdown notes", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Print the command report as JSON instead of plain lines
    #[arg(long, global = true)]
    json: bool,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Convert the export into the journal folder
    Convert(ConvertArgs),
    /// Show resolved configuration and check the artifact store
    Status(ConfigArgs),
}

#[derive(Debug, Args)]
struct ConfigArgs {
    /// Path to a TOML config file
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Debug, Args)]
struct ConvertArgs {
    #[command(flatten)]
    config: ConfigArgs,

    /// Do not delete the journal folder before converting
    #[arg(long)]
    keep_existing: bool,
}

fn print_report(report: &CommandReport, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
        return Ok(());
    }

    println!("{}: {}", report.command, if report.ok { "ok" } else { "failed" });
    for line in &report.details {
        println!("  {line}");
    }
    for line in &report.issues {
        println!("  issue: {line}");
    }
    Ok(())
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let report = match cli.command {
        Command::Convert(args) => commands::convert::run(&commands::convert::ConvertOptions {
            config_path: args.config.config,
            keep_existing: args.keep_existing,
        })?,
        Command::Status(args) => commands::status::run(args.config.as_deref())?,
    };

    print_report(&report, cli.json)?;
    if !report.ok {
        anyhow::bail!("{} reported {} issue(s)", report.command, report.issues.len());
    }
    Ok(())
}

//! Connection Checker - Main CLI Application
//!
//! Runs every reachability probe against one target and prints the report.

use clap::Parser;
use connection_checker::{
    cli::Cli,
    config::{display_config_summary, load_config, EnvManager},
    error::{AppError, Result},
    output::OutputFormatterFactory,
    ConnectionChecker, PKG_NAME, VERSION,
};
use std::process;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let use_color = !cli.no_color;

    if let Err(e) = run_application(cli).await {
        eprintln!("{}", e.format_for_console(use_color));
        if let Some(suggestion) = e.suggestion() {
            eprintln!();
            eprintln!("{}", suggestion);
        }
        process::exit(e.exit_code());
    }
}

/// Main application logic
async fn run_application(cli: Cli) -> Result<()> {
    if cli.env_help {
        println!("{}", EnvManager::display_env_help());
        return Ok(());
    }

    if cli.debug {
        eprintln!("{} v{}", PKG_NAME, VERSION);
        eprintln!("{}", cli.get_config_summary());
    }

    let target = cli.require_target()?.to_string();

    let config = load_config(cli)?;
    if config.debug {
        eprintln!("Configuration loaded successfully:");
        for line in display_config_summary(&config).lines() {
            eprintln!("  {}", line);
        }
        eprintln!();
    }

    let formatter = OutputFormatterFactory::create(&config);
    let checker = ConnectionChecker::new(config)?;
    let report = checker.check(&target).await?;

    println!("{}", formatter.format_report(&report)?);

    if report.passed_count() == 0 {
        return Err(AppError::network(format!(
            "No probe passed against {}; the target looks unreachable from here",
            report.target
        )));
    }

    Ok(())
}

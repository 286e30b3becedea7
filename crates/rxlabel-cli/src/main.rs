//! rxlabel CLI.

use std::io::{self, IsTerminal};

use anyhow::Result;
use clap::{ColorChoice, Parser};
use tracing::level_filters::LevelFilter;

use rxlabel_cli::cli::{Cli, Command, LogFormatArg, LogLevelArg};
use rxlabel_cli::commands::{run_doctor, run_list, run_match, run_resolve, run_search};
use rxlabel_cli::logging::{LogConfig, LogFormat, init_logging};
use rxlabel_cli::summary::{
    print_candidates, print_doctor, print_json, print_labels, print_matches, print_resolved,
};
use rxlabel_model::ResolveError;

/// Exit code when a query resolves to nothing.
const EXIT_NOT_FOUND: i32 = 2;

fn main() {
    let cli = Cli::parse();
    cli.color.write_global();
    let log_config = log_config_from_cli(&cli);
    if let Err(error) = init_logging(&log_config) {
        eprintln!("error: failed to initialize logging: {error}");
        std::process::exit(1);
    }
    let exit_code = match run(&cli) {
        Ok(()) => 0,
        Err(error) => {
            eprintln!("error: {error:#}");
            let not_found = error
                .downcast_ref::<ResolveError>()
                .is_some_and(ResolveError::is_not_found);
            if not_found { EXIT_NOT_FOUND } else { 1 }
        }
    };
    std::process::exit(exit_code);
}

fn run(cli: &Cli) -> Result<()> {
    let config = cli.config.as_deref();
    match &cli.command {
        Command::Resolve(args) => {
            let resolved = run_resolve(config, &args.drug)?;
            if cli.json {
                print_json(&resolved)?;
            } else {
                print_resolved(&resolved);
            }
        }
        Command::Search(args) => {
            let candidates = run_search(config, &args.query, args.top)?;
            if cli.json {
                print_json(&candidates)?;
            } else {
                print_candidates(&candidates);
            }
        }
        Command::List => {
            let records = run_list(config)?;
            if cli.json {
                print_json(&records)?;
            } else {
                print_labels(&records);
            }
        }
        Command::Match(args) => {
            let matches = run_match(config, &args.text)?;
            if cli.json {
                print_json(&matches)?;
            } else {
                print_matches(&matches);
            }
        }
        Command::Doctor => {
            let report = run_doctor(config)?;
            if cli.json {
                print_json(&report)?;
            } else {
                print_doctor(&report);
            }
        }
    }
    Ok(())
}

/// Build logging configuration from CLI flags with consistent precedence.
fn log_config_from_cli(cli: &Cli) -> LogConfig {
    let mut config = LogConfig {
        level_filter: cli.verbosity.tracing_level_filter(),
        ..LogConfig::default()
    };
    config.use_env_filter = !(cli.verbosity.is_present() || cli.log_level.is_some());
    if let Some(level) = cli.log_level {
        config.level_filter = match level {
            LogLevelArg::Error => LevelFilter::ERROR,
            LogLevelArg::Warn => LevelFilter::WARN,
            LogLevelArg::Info => LevelFilter::INFO,
            LogLevelArg::Debug => LevelFilter::DEBUG,
            LogLevelArg::Trace => LevelFilter::TRACE,
        };
    }
    config.format = match cli.log_format {
        LogFormatArg::Pretty => LogFormat::Pretty,
        LogFormatArg::Compact => LogFormat::Compact,
        LogFormatArg::Json => LogFormat::Json,
    };
    config.log_file = cli.log_file.clone();
    config.with_ansi = match cli.color.color {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => cli.log_file.is_none() && io::stderr().is_terminal(),
    };
    config
}

use clap::{CommandFactory, Parser};

use rxlabel_cli::cli::{Cli, Command, LogFormatArg};

#[test]
fn command_definition_is_consistent() {
    Cli::command().debug_assert();
}

#[test]
fn resolve_takes_the_drug_name() {
    let cli = Cli::try_parse_from(["rxlabel", "resolve", "carvedilol phosphate"]).unwrap();
    let Command::Resolve(args) = cli.command else {
        panic!("expected resolve");
    };
    assert_eq!(args.drug, "carvedilol phosphate");
    assert!(!cli.json);
    assert!(cli.config.is_none());
}

#[test]
fn global_flags_follow_the_subcommand() {
    let cli = Cli::try_parse_from([
        "rxlabel",
        "search",
        "metoprolol",
        "--top",
        "3",
        "--json",
        "--config",
        "data/rxlabel.toml",
        "--log-format",
        "json",
    ])
    .unwrap();
    let Command::Search(args) = &cli.command else {
        panic!("expected search");
    };
    assert_eq!(args.query, "metoprolol");
    assert_eq!(args.top, Some(3));
    assert!(cli.json);
    assert_eq!(
        cli.config.as_deref(),
        Some(std::path::Path::new("data/rxlabel.toml"))
    );
    assert!(matches!(cli.log_format, LogFormatArg::Json));
}

#[test]
fn verbosity_defaults_to_warn() {
    let cli = Cli::try_parse_from(["rxlabel", "list"]).unwrap();
    assert!(!cli.verbosity.is_present());
    assert_eq!(
        cli.verbosity.tracing_level_filter(),
        tracing::level_filters::LevelFilter::WARN
    );

    let cli = Cli::try_parse_from(["rxlabel", "-vv", "doctor"]).unwrap();
    assert_eq!(
        cli.verbosity.tracing_level_filter(),
        tracing::level_filters::LevelFilter::DEBUG
    );
}

#[test]
fn missing_arguments_are_rejected() {
    assert!(Cli::try_parse_from(["rxlabel", "resolve"]).is_err());
    assert!(Cli::try_parse_from(["rxlabel", "match"]).is_err());
    assert!(Cli::try_parse_from(["rxlabel", "search", "x", "--top", "many"]).is_err());
}

use clap::{Parser, Subcommand};
use oplogcheck::cli::{self as prog_cli, QuerySource};
use oplogcheck::{AppConfig, DriverKind, OplogChecker};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "oplogcheck", version, about = "Explain why a query is not tailing the oplog", long_about = None)]
struct Cli {
    #[arg(long, help = "Path to a config file (TOML). If omitted, the default locations are searched.")]
    config: Option<PathBuf>,
    #[arg(long, help = "Oplog connection string; takes precedence over MONGO_OPLOG_URL and config files")]
    oplog_url: Option<String>,
    #[arg(long, help = "Release identifier of the running app; omit for a source checkout")]
    release: Option<String>,
    #[arg(long, default_value = "human", value_parser = ["human", "plain", "json"], help = "Output format: human|plain|json")]
    format: String,
    #[arg(long, help = "Write logs to this directory (app.log, verdicts.log)")]
    log_dir: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(about = "Check one query. Exits 0 when tailing is possible, 2 when disqualified")]
    Check {
        #[arg(help = "Query JSON: {\"selector\": {..}, \"options\": {..}} or a bare selector", required_unless_present = "file")]
        query: Option<String>,
        #[arg(long, conflicts_with = "query", help = "Read the query JSON from a file")]
        file: Option<PathBuf>,
        #[arg(long, help = "Driver the subscription is using: oplog|polling")]
        driver: Option<DriverKind>,
        #[arg(long, help = "Skip selector validation, as when no matching engine is available")]
        no_matcher: bool,
    },
    #[command(about = "List diagnostic codes")]
    Codes,
    #[command(about = "List the rules in evaluation order")]
    Rules,
    #[command(about = "Show version, compiled features and the resolved environment")]
    Info,
}

fn main() {
    let cli = Cli::parse();
    let no_matcher = matches!(cli.command, Commands::Check { no_matcher: true, .. });
    let overrides = AppConfig {
        oplog_url: cli.oplog_url.clone(),
        release: cli.release.clone(),
        matcher: no_matcher.then_some(false),
        log_dir: cli.log_dir.clone(),
        log_level: None,
    };
    let cfg = match AppConfig::load(overrides, cli.config.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(1);
        }
    };
    if let Some(dir) = &cfg.log_dir
        && let Err(e) = oplogcheck::logger::configure_logging(Some(dir), cfg.log_level.as_deref(), None, false)
    {
        eprintln!("warning: logging disabled: {e}");
    }

    let checker = OplogChecker::new(cfg.into_check_config());
    let cmd = match cli.command {
        Commands::Check { query, file, driver, .. } => {
            let query = match (query, file) {
                (_, Some(path)) => QuerySource::File(path),
                (Some(json), None) => QuerySource::Inline(json),
                (None, None) => {
                    eprintln!("error: provide a query or --file");
                    std::process::exit(1);
                }
            };
            prog_cli::Command::Check { query, driver }
        }
        Commands::Codes => prog_cli::Command::Codes,
        Commands::Rules => prog_cli::Command::Rules,
        Commands::Info => prog_cli::Command::Info,
    };
    let mode = match prog_cli::parse_output_mode(Some(&cli.format)) {
        Ok(m) => m,
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(1);
        }
    };
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    match prog_cli::run_with_format(&checker, cmd, mode, &mut out) {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(1);
        }
    }
}

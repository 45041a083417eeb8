//! Command-line entry point: resolves a JSON payload read from a file or stdin.

use std::io::{
    self,
    Read,
    Write,
};
use std::path::{
    Path,
    PathBuf,
};
use std::process::ExitCode;

use clap::{
    Arg,
    ArgAction,
    ArgMatches,
    Command,
    value_parser,
};
use l10n_resolver::{
    ConfigError,
    ConfigManager,
    Node,
    NodeError,
};
use serde_json::Value;
use thiserror::Error;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

/// Failures that end the run with a non-zero exit code.
#[derive(Error, Debug)]
enum CliError {
    /// Configuration could not be loaded or is invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Payload input or output failed.
    #[error("Failed to read or write payload: {0}")]
    Io(#[from] io::Error),

    /// Payload is not valid JSON.
    #[error("Invalid JSON payload: {0}")]
    Json(#[from] serde_json::Error),

    /// Resolved tree cannot be written as JSON.
    #[error(transparent)]
    Node(#[from] NodeError),
}

/// Command-line definition.
fn command() -> Command {
    Command::new("l10n-resolver")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Resolve translation collections in a JSON payload to a single locale")
        .arg(
            Arg::new("input")
                .help("JSON payload file (default: stdin)")
                .value_parser(value_parser!(PathBuf))
                .index(1),
        )
        .arg(
            Arg::new("locale")
                .long("locale")
                .short('l')
                .help("Requested locale (e.g., fr-FR). Without it the payload is echoed unchanged"),
        )
        .arg(
            Arg::new("fallback-locale")
                .long("fallback-locale")
                .short('f')
                .help("Locale used when no variant matches the requested one"),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .value_parser(value_parser!(PathBuf))
                .help("Configuration file (default: .l10n-resolver.json in the current directory)"),
        )
        .arg(
            Arg::new("pretty")
                .long("pretty")
                .short('p')
                .help("Pretty-print the resolved payload")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("log-file")
                .long("log-file")
                .value_parser(value_parser!(PathBuf))
                .help("Write logs to this file instead of stderr"),
        )
}

/// Runs the command and maps failures to the exit code.
fn main() -> ExitCode {
    let matches = command().get_matches();
    let _guard = init_logging(matches.get_one::<PathBuf>("log-file").map(PathBuf::as_path));

    match run(&matches) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e}");
            ExitCode::FAILURE
        }
    }
}

/// Logs go to stderr or a file; stdout carries the payload only.
fn init_logging(log_file: Option<&Path>) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    let Some(path) = log_file else {
        tracing_subscriber::fmt().with_env_filter(filter).with_writer(io::stderr).init();
        return None;
    };

    let dir = path.parent().filter(|dir| !dir.as_os_str().is_empty()).unwrap_or(Path::new("."));
    let file_name = path.file_name().map_or_else(|| "l10n-resolver.log".into(), ToOwned::to_owned);
    let (writer, guard) = tracing_appender::non_blocking(tracing_appender::rolling::never(dir, file_name));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(writer).with_ansi(false).init();

    Some(guard)
}

/// Loads the configuration, then resolves or echoes the payload.
///
/// An absent or empty `--locale` leaves the payload unchanged. An empty
/// `--fallback-locale` disables the fallback.
fn run(matches: &ArgMatches) -> Result<(), CliError> {
    let mut manager = ConfigManager::new();
    match matches.get_one::<PathBuf>("config") {
        Some(path) => manager.load_file(path)?,
        None => manager.load_settings(std::env::current_dir().ok().as_deref())?,
    }

    let payload = read_payload(matches.get_one::<PathBuf>("input").map(PathBuf::as_path))?;

    let locale = matches.get_one::<String>("locale").filter(|locale| !locale.is_empty());
    let resolved = match locale {
        Some(locale) => {
            let mut settings = manager.get_settings().clone().with_locale(locale);
            settings = match matches.get_one::<String>("fallback-locale").map(String::as_str) {
                Some("") => settings.without_fallback_locale(),
                Some(fallback) => settings.with_fallback_locale(fallback),
                None => settings,
            };
            manager.update_settings(settings)?;

            let root = Node::from(payload);
            let (resolved, stats) = manager.resolver().process_with_stats(&root);
            tracing::info!("Resolved {} records ({:?})", stats.records, stats);
            resolved.to_json()?
        }
        None => {
            tracing::info!("No locale requested, payload left unchanged");
            payload
        }
    };

    write_payload(&resolved, matches.get_flag("pretty"))
}

/// Reads the payload from `input`, or from stdin when absent.
fn read_payload(input: Option<&Path>) -> Result<Value, CliError> {
    let content = match input {
        Some(path) => {
            tracing::debug!("Reading payload from: {:?}", path);
            std::fs::read_to_string(path)?
        }
        None => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer)?;
            buffer
        }
    };

    Ok(serde_json::from_str(&content)?)
}

/// Writes the payload to stdout, followed by a newline.
fn write_payload(payload: &Value, pretty: bool) -> Result<(), CliError> {
    let mut stdout = io::stdout().lock();
    if pretty {
        serde_json::to_writer_pretty(&mut stdout, payload)?;
    } else {
        serde_json::to_writer(&mut stdout, payload)?;
    }
    writeln!(stdout)?;
    stdout.flush()?;

    Ok(())
}

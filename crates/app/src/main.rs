use std::fmt;
use std::sync::Arc;

use headcheck_core::model::{HeadingLine, ScopeSettings};
use services::HeadingCheckService;
use storage::repository::Storage;
use tracing::debug;
use tracing_subscriber::EnvFilter;

const DEFAULT_STORE: &str = "data.json";

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    MissingArgument { command: &'static str, what: &'static str },
    UnknownArg(String),
    UnknownCommand(String),
    InvalidLine { raw: String },
    InvalidStore { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::MissingArgument { command, what } => {
                write!(f, "{command} requires <{what}>")
            }
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::UnknownCommand(cmd) => write!(f, "unknown command: {cmd}"),
            ArgsError::InvalidLine { raw } => {
                write!(f, "invalid line (expected a non-negative integer): {raw}")
            }
            ArgsError::InvalidStore { raw } => write!(f, "invalid --store value: {raw}"),
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  headcheck [--store <location>] enabled <path>");
    eprintln!("  headcheck [--store <location>] done <path> <line>");
    eprintln!("  headcheck [--store <location>] toggle <path> <line>");
    eprintln!("  headcheck [--store <location>] mark <path> <line>   # toggle only if in scope");
    eprintln!("  headcheck [--store <location>] list [<path>]");
    eprintln!("  headcheck [--store <location>] settings");
    eprintln!("  headcheck [--store <location>] settings set [--include <root>]... [--exclude <root>]...");
    eprintln!("  headcheck [--store <location>] settings import [--include-file <file>] [--exclude-file <file>]");
    eprintln!();
    eprintln!("Store locations:");
    eprintln!("  <file>.json           JSON document (default: {DEFAULT_STORE})");
    eprintln!("  sqlite:<file>         SQLite database");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  HEADCHECK_STORE, RUST_LOG");
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    Enabled { path: String },
    Done { path: String, line: u32 },
    Toggle { path: String, line: u32 },
    Mark { path: String, line: u32 },
    List { path: Option<String> },
    ShowSettings,
    SetSettings {
        include_roots: Vec<String>,
        exclude_roots: Vec<String>,
    },
    ImportSettings {
        include_file: Option<String>,
        exclude_file: Option<String>,
    },
    Help,
}

#[derive(Debug)]
struct Args {
    store: String,
    command: Command,
}

impl Args {
    fn parse(
        args: &mut impl Iterator<Item = String>,
        env_store: Option<String>,
    ) -> Result<Self, ArgsError> {
        let mut store = env_store
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_STORE.to_string());

        let name = loop {
            match args.next() {
                None => {
                    return Ok(Self {
                        store,
                        command: Command::Help,
                    });
                }
                Some(arg) => match arg.as_str() {
                    "--store" => {
                        let value = require_value(args, "--store")?;
                        if value.trim().is_empty() {
                            return Err(ArgsError::InvalidStore { raw: value });
                        }
                        store = value;
                    }
                    "--help" | "-h" => {
                        return Ok(Self {
                            store,
                            command: Command::Help,
                        });
                    }
                    _ if arg.starts_with("--") => return Err(ArgsError::UnknownArg(arg)),
                    _ => break arg,
                },
            }
        };

        let command = match name.as_str() {
            "enabled" => Command::Enabled {
                path: require_arg(args, "enabled", "path")?,
            },
            "done" => {
                let (path, line) = parse_heading(args, "done")?;
                Command::Done { path, line }
            }
            "toggle" => {
                let (path, line) = parse_heading(args, "toggle")?;
                Command::Toggle { path, line }
            }
            "mark" => {
                let (path, line) = parse_heading(args, "mark")?;
                Command::Mark { path, line }
            }
            "list" => Command::List { path: args.next() },
            "settings" => match args.next().as_deref() {
                None => Command::ShowSettings,
                Some("set") => parse_set_settings(args)?,
                Some("import") => parse_import_settings(args)?,
                Some(other) => return Err(ArgsError::UnknownArg(other.to_string())),
            },
            _ => return Err(ArgsError::UnknownCommand(name)),
        };

        if let Some(extra) = args.next() {
            return Err(ArgsError::UnknownArg(extra));
        }

        Ok(Self { store, command })
    }
}

fn require_arg(
    args: &mut impl Iterator<Item = String>,
    command: &'static str,
    what: &'static str,
) -> Result<String, ArgsError> {
    args.next()
        .ok_or(ArgsError::MissingArgument { command, what })
}

fn parse_heading(
    args: &mut impl Iterator<Item = String>,
    command: &'static str,
) -> Result<(String, u32), ArgsError> {
    let path = require_arg(args, command, "path")?;
    let raw = require_arg(args, command, "line")?;
    let line = raw
        .parse::<HeadingLine>()
        .map_err(|_| ArgsError::InvalidLine { raw: raw.clone() })?;
    Ok((path, line.value()))
}

fn parse_set_settings(args: &mut impl Iterator<Item = String>) -> Result<Command, ArgsError> {
    let mut include_roots = Vec::new();
    let mut exclude_roots = Vec::new();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--include" => include_roots.push(require_value(args, "--include")?),
            "--exclude" => exclude_roots.push(require_value(args, "--exclude")?),
            _ => return Err(ArgsError::UnknownArg(arg)),
        }
    }
    Ok(Command::SetSettings {
        include_roots,
        exclude_roots,
    })
}

fn parse_import_settings(args: &mut impl Iterator<Item = String>) -> Result<Command, ArgsError> {
    let mut include_file = None;
    let mut exclude_file = None;
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--include-file" => include_file = Some(require_value(args, "--include-file")?),
            "--exclude-file" => exclude_file = Some(require_value(args, "--exclude-file")?),
            _ => return Err(ArgsError::UnknownArg(arg)),
        }
    }
    Ok(Command::ImportSettings {
        include_file,
        exclude_file,
    })
}

/// Read a one-root-per-line file; no file means no roots.
async fn read_roots_file(path: Option<&str>) -> std::io::Result<String> {
    match path {
        Some(path) => tokio::fs::read_to_string(path).await,
        None => Ok(String::new()),
    }
}

fn normalize_sqlite_url(raw: &str) -> String {
    if raw == "sqlite::memory:" || raw.starts_with("sqlite://") {
        return raw.to_string();
    }

    let trimmed = raw.trim();
    let path_str = trimmed.strip_prefix("sqlite:").unwrap_or(trimmed);
    let path = std::path::Path::new(path_str);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| std::path::PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}", absolute.display())
}

fn prepare_sqlite_file(db_url: &str) -> Result<(), Box<dyn std::error::Error>> {
    if db_url == "sqlite::memory:" {
        return Ok(());
    }

    let path = db_url
        .strip_prefix("sqlite://")
        .ok_or_else(|| ArgsError::InvalidStore {
            raw: db_url.to_string(),
        })?;
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() {
        return Err(ArgsError::InvalidStore {
            raw: db_url.to_string(),
        }
        .into());
    }

    let path = std::path::Path::new(path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    if !path.exists() {
        std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path)?;
    }

    Ok(())
}

async fn open_storage(location: &str) -> Result<Storage, Box<dyn std::error::Error>> {
    if location.starts_with("sqlite:") {
        let url = normalize_sqlite_url(location);
        prepare_sqlite_file(&url)?;
        debug!(%url, "opening sqlite store");
        Ok(Storage::open(&url).await?)
    } else {
        debug!(path = location, "opening json store");
        Ok(Storage::open(location).await?)
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut argv = std::env::args().skip(1);
    let parsed = Args::parse(&mut argv, std::env::var("HEADCHECK_STORE").ok()).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    if parsed.command == Command::Help {
        print_usage();
        return Ok(());
    }

    // Open storage here in the binary glue so core/services stay storage-agnostic.
    let storage = open_storage(&parsed.store).await?;
    let checks = HeadingCheckService::load(Arc::clone(&storage.state)).await;

    match parsed.command {
        Command::Enabled { path } => {
            println!("{}", checks.is_path_enabled(&path).await);
        }
        Command::Done { path, line } => {
            println!("{}", checks.is_heading_done(&path, line).await);
        }
        Command::Toggle { path, line } => {
            println!("{}", checks.toggle_heading(&path, line).await?);
        }
        Command::Mark { path, line } => match checks.toggle_heading_if_enabled(&path, line).await? {
            Some(done) => println!("{done}"),
            None => println!("skipped"),
        },
        Command::List { path } => {
            for (path, line) in checks.done_headings(path.as_deref()).await {
                println!("{path}:{line}");
            }
        }
        Command::ShowSettings => {
            let settings = checks.settings().await;
            for root in settings.include_roots() {
                println!("include\t{root}");
            }
            for root in settings.exclude_roots() {
                println!("exclude\t{root}");
            }
        }
        Command::SetSettings {
            include_roots,
            exclude_roots,
        } => {
            checks.update_settings(include_roots, exclude_roots).await?;
        }
        Command::ImportSettings {
            include_file,
            exclude_file,
        } => {
            let include_text = read_roots_file(include_file.as_deref()).await?;
            let exclude_text = read_roots_file(exclude_file.as_deref()).await?;
            checks
                .replace_settings(ScopeSettings::from_lines(&include_text, &exclude_text))
                .await?;
        }
        Command::Help => {}
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(err) = run().await {
        // At this layer (binary glue), printing once is fine.
        eprintln!("{err}");
        std::process::exit(2);
    }
}

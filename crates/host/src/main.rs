use std::path::PathBuf;

use anyhow::{bail, Context};
use crossword_web_host::config::Config;
use crossword_web_host::{Board, Relay, BUNDLED_PUZZLE};
use tokio::signal;
use tracing_subscriber::EnvFilter;

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Command line overrides layered on top of the config file
#[derive(Debug, Default, PartialEq, Eq)]
struct Overrides {
    puzzle: Option<PathBuf>,
    port: Option<u16>,
    bind: Option<String>,
}

#[derive(Debug, PartialEq, Eq)]
enum Command {
    Serve(Overrides),
    Help,
    Version,
}

fn parse_args(args: &[String]) -> anyhow::Result<Command> {
    let mut overrides = Overrides::default();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--version" | "-v" => return Ok(Command::Version),
            "--help" | "-h" => return Ok(Command::Help),
            "--port" | "-p" => {
                let value = args.get(i + 1).context("--port needs a value")?;
                let port = value
                    .parse()
                    .with_context(|| format!("bad port {value:?}"))?;
                overrides.port = Some(port);
                i += 2;
            }
            "--bind" | "-b" => {
                let value = args.get(i + 1).context("--bind needs a value")?;
                overrides.bind = Some(value.clone());
                i += 2;
            }
            flag if flag.starts_with('-') => bail!("unknown option {flag}"),
            path => {
                if overrides.puzzle.is_some() {
                    bail!("only one puzzle file can be served");
                }
                overrides.puzzle = Some(PathBuf::from(path));
                i += 1;
            }
        }
    }
    Ok(Command::Serve(overrides))
}

fn print_help() {
    println!("crossword-web-host - shared crossword relay");
    println!();
    println!("USAGE:");
    println!("    crossword-web-host [PUZZLE.json] [OPTIONS]");
    println!();
    println!("OPTIONS:");
    println!("    -p, --port PORT   Port to listen on (default 5000)");
    println!("    -b, --bind ADDR   Address to bind (default 127.0.0.1)");
    println!("    -h, --help        Print help information");
    println!("    -v, --version     Print version");
    println!();
    println!("CONFIG:");
    println!("    ~/.config/crossword-web/config.toml");
    println!();
    println!("ENDPOINTS:");
    println!("    GET /crossword    Puzzle document with the live fill");
    println!("    GET /health       Status and session count");
    println!("    GET /socket       WebSocket relay");
}

async fn shutdown_signal() {
    // Wait for Ctrl+C or SIGTERM
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    eprintln!();
    eprintln!("  \x1b[1;33m[peace]\x1b[0m  Graceful shutdown initiated...");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize structured logging (tracing)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .with_level(true)
        .init();

    let args: Vec<String> = std::env::args().collect();
    let overrides = match parse_args(&args)? {
        Command::Version => {
            println!("crossword-web-host {VERSION}");
            return Ok(());
        }
        Command::Help => {
            print_help();
            return Ok(());
        }
        Command::Serve(overrides) => overrides,
    };

    // === LOAD CONFIGURATION ===
    Config::create_default_if_missing();
    let mut config = Config::load();
    eprintln!(
        "  \x1b[1;32m[config]\x1b[0m Loaded from {}",
        Config::default_config_path().display()
    );
    if let Some(port) = overrides.port {
        config.server.port = port;
    }
    if let Some(bind) = overrides.bind {
        config.server.bind = bind;
    }
    if let Some(path) = overrides.puzzle {
        config.puzzle.path = Some(path);
    }

    // === LOAD PUZZLE ===
    let board = match &config.puzzle.path {
        Some(path) => Board::load(path)?,
        None => Board::from_source_json(BUNDLED_PUZZLE)?,
    };
    eprintln!(
        "  \x1b[1;32m[puzzle]\x1b[0m {} ({}x{})",
        board.title(),
        board.document().size.cols,
        board.document().size.rows
    );
    let relay = Relay::shared(board);

    // === START SERVER ===
    let addr = config.server.addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    eprintln!("  \x1b[1;32m[http]\x1b[0m   Relay listening on \x1b[1;96mhttp://{addr}\x1b[0m");
    eprintln!("  \x1b[2mPress Ctrl+C to stop\x1b[0m");
    tracing::info!(addr = %addr, "Relay listening");

    crossword_web_host::serve(listener, relay, shutdown_signal()).await?;

    eprintln!("  \x1b[1;32m[done]\x1b[0m   Relay stopped.");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        std::iter::once("crossword-web-host")
            .chain(list.iter().copied())
            .map(String::from)
            .collect()
    }

    #[test]
    fn test_parse_serve_defaults() {
        assert_eq!(
            parse_args(&args(&[])).unwrap(),
            Command::Serve(Overrides::default())
        );
    }

    #[test]
    fn test_parse_overrides() {
        let command = parse_args(&args(&["p.json", "--port", "8000", "-b", "0.0.0.0"])).unwrap();
        assert_eq!(
            command,
            Command::Serve(Overrides {
                puzzle: Some(PathBuf::from("p.json")),
                port: Some(8000),
                bind: Some("0.0.0.0".to_string()),
            })
        );
    }

    #[test]
    fn test_parse_help_and_errors() {
        assert_eq!(parse_args(&args(&["--help"])).unwrap(), Command::Help);
        assert_eq!(parse_args(&args(&["-v"])).unwrap(), Command::Version);
        assert!(parse_args(&args(&["--port"])).is_err());
        assert!(parse_args(&args(&["--port", "big"])).is_err());
        assert!(parse_args(&args(&["--verbose"])).is_err());
        assert!(parse_args(&args(&["a.json", "b.json"])).is_err());
    }
}

// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//!
//! PPL shell: an interactive front end for the PPL autocomplete engine.
//!
//! Provides a readline-based shell with:
//! - Tab completion from live cluster metadata
//! - PPL syntax highlighting
//! - Enter prints the suggestion list for the current line
//! - Multiple output formats (table, JSON, CSV)
//! - Meta-commands for inspecting and resetting the completion session
//! - Persistent command history

mod completer;
mod formatter;
mod highlighter;

use std::process::ExitCode;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use clap::Parser;
use colored::Colorize;
use rustyline::config::Configurer;
use rustyline::error::ReadlineError;
use rustyline::hint::HistoryHinter;
use rustyline::history::DefaultHistory;
use rustyline_derive::{Completer, Helper, Highlighter, Hinter, Validator};
use tokio::runtime::Runtime;
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

use completer::{PplCompleter, SharedEngine};
use formatter::OutputFormat;
use ppl_autocomplete::{AutocompleteEngine, MetadataGateway, MetadataRequest};
use ppl_metadata_client::{Auth, ClientConfig, ClientError, MetadataClient};

const VERSION: &str = env!("CARGO_PKG_VERSION");

// ---------------------------------------------------------------------------
// CLI argument parsing
// ---------------------------------------------------------------------------

/// ppl: interactive PPL completion shell.
#[derive(Parser, Debug)]
#[command(name = "ppl", version = VERSION, about = "Interactive PPL autocomplete shell")]
struct Cli {
    /// Cluster host name, optionally with an `http://` or `https://` scheme.
    #[arg(long, default_value = "localhost")]
    host: String,

    /// Cluster REST port.
    #[arg(long, default_value_t = 9200)]
    port: u16,

    /// Default output format (table, json, csv).
    #[arg(long, default_value = "table")]
    format: String,

    /// Username for HTTP Basic authentication.
    #[arg(long)]
    user: Option<String>,

    /// Password for HTTP Basic authentication.
    #[arg(long, requires = "user")]
    password: Option<String>,
}

impl Cli {
    fn client_config(&self) -> ClientConfig {
        let auth = match &self.user {
            Some(username) => Auth::Basic {
                username: username.clone(),
                password: self.password.clone().unwrap_or_default(),
            },
            None => Auth::None,
        };
        ClientConfig::new(base_url(&format!("{}:{}", self.host, self.port))).with_auth(auth)
    }
}

/// `host:port` → `http://host:port`; URLs with a scheme pass through.
fn base_url(addr: &str) -> String {
    if addr.starts_with("http://") || addr.starts_with("https://") {
        addr.to_string()
    } else {
        format!("http://{addr}")
    }
}

// ---------------------------------------------------------------------------
// Rustyline helper
// ---------------------------------------------------------------------------

#[derive(Helper, Highlighter, Completer, Hinter, Validator)]
struct PplHelper {
    #[rustyline(Highlighter)]
    highlighter: highlighter::PplHighlighter,
    #[rustyline(Completer)]
    completer: PplCompleter,
    #[rustyline(Hinter)]
    hinter: HistoryHinter,
}

// ---------------------------------------------------------------------------
// REPL session state
// ---------------------------------------------------------------------------

struct Session {
    runtime: Arc<Runtime>,
    config: ClientConfig,
    client: Arc<MetadataClient>,
    /// Shared with the completer; replaced on `\connect`.
    engine: SharedEngine,
    format: OutputFormat,
    show_timing: bool,
}

impl Session {
    fn connect(
        runtime: Arc<Runtime>,
        config: ClientConfig,
        format: OutputFormat,
    ) -> Result<Self, ClientError> {
        let client = Arc::new(MetadataClient::from_config(&config)?);
        let engine = Arc::new(Mutex::new(new_engine(&client)));
        Ok(Self {
            runtime,
            config,
            client,
            engine,
            format,
            show_timing: false,
        })
    }

    /// A handle to the current engine.
    fn engine(&self) -> AutocompleteEngine<dyn MetadataGateway> {
        self.engine
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Point the session at another cluster, keeping credentials. The old
    /// engine is closed so late fetch results are dropped.
    fn reconnect(&mut self, addr: &str) -> Result<(), ClientError> {
        let config = ClientConfig {
            base_url: base_url(addr),
            ..self.config.clone()
        };
        let client = Arc::new(MetadataClient::from_config(&config)?);

        let mut slot = self.engine.lock().unwrap_or_else(PoisonError::into_inner);
        slot.close();
        *slot = new_engine(&client);
        drop(slot);

        self.config = config;
        self.client = client;
        println!("Connected to {}", self.client.base_url());
        Ok(())
    }

    fn report_timing(&self, elapsed: Duration) {
        if self.show_timing {
            println!(
                "{}",
                format!("Time: {:.3}ms", elapsed.as_secs_f64() * 1000.0).dimmed()
            );
        }
    }
}

fn new_engine(client: &Arc<MetadataClient>) -> AutocompleteEngine<dyn MetadataGateway> {
    let gateway: Arc<dyn MetadataGateway> = client.clone();
    AutocompleteEngine::new(gateway)
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

fn main() -> ExitCode {
    // Logs go to stderr and default to warnings so they stay off the prompt.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let format: OutputFormat = cli.format.parse().unwrap_or_else(|e| {
        eprintln!("Warning: {e}. Defaulting to table format.");
        OutputFormat::Table
    });

    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => Arc::new(runtime),
        Err(e) => {
            eprintln!("{} failed to start async runtime: {e}", "Error:".red().bold());
            return ExitCode::FAILURE;
        }
    };

    let mut session = match Session::connect(runtime, cli.client_config(), format) {
        Ok(session) => session,
        Err(e) => {
            eprintln!("{} {e}", "Error:".red().bold());
            return ExitCode::FAILURE;
        }
    };

    print_banner(&session);

    let helper = PplHelper {
        highlighter: highlighter::PplHighlighter,
        completer: PplCompleter::new(Arc::clone(&session.engine), Arc::clone(&session.runtime)),
        hinter: HistoryHinter::new(),
    };

    let mut editor = match rustyline::Editor::<PplHelper, DefaultHistory>::new() {
        Ok(editor) => editor,
        Err(e) => {
            eprintln!("{} failed to create line editor: {e}", "Error:".red().bold());
            return ExitCode::FAILURE;
        }
    };
    editor.set_helper(Some(helper));
    editor.set_auto_add_history(true);

    // Missing on first run.
    let history_path = history_file_path();
    let _ = editor.load_history(&history_path);

    load_pplrc(&mut session);

    let prompt = format!("{} ", "ppl>".bright_green().bold());
    loop {
        match editor.readline(&prompt) {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                if trimmed.starts_with('\\') {
                    if handle_meta_command(&mut session, trimmed) {
                        break;
                    }
                    continue;
                }
                // Trailing spaces select the next grammar position, so the
                // raw line is used.
                show_suggestions(&session, &line);
            }
            Err(ReadlineError::Interrupted) => {
                println!("Use \\quit or Ctrl-D to exit.");
            }
            Err(ReadlineError::Eof) => {
                println!("Goodbye.");
                break;
            }
            Err(err) => {
                eprintln!("Readline error: {err}");
                break;
            }
        }
    }

    if let Err(e) = editor.save_history(&history_path) {
        warn!(error = %e, "could not save history");
    }
    session.engine().close();
    ExitCode::SUCCESS
}

// ---------------------------------------------------------------------------
// Suggestions
// ---------------------------------------------------------------------------

/// Compute and print the suggestions for `line`.
fn show_suggestions(session: &Session, line: &str) {
    let engine = session.engine();
    let start = Instant::now();
    let batch = session.runtime.block_on(engine.get_items(line));
    let elapsed = start.elapsed();

    if batch.items.is_empty() {
        println!(
            "{}",
            format!("No suggestions at {:?}.", batch.position).dimmed()
        );
    } else {
        println!("{}", formatter::suggestions(&batch).render(session.format));
    }
    session.report_timing(elapsed);
}

// ---------------------------------------------------------------------------
// Meta-command handling
// ---------------------------------------------------------------------------

/// Handle a meta-command (line starting with '\').
///
/// Returns `true` if the REPL should exit.
fn handle_meta_command(session: &mut Session, line: &str) -> bool {
    let (cmd, arg) = match line.split_once(char::is_whitespace) {
        Some((cmd, arg)) => (cmd, arg.trim()),
        None => (line, ""),
    };

    match cmd {
        "\\quit" | "\\q" => {
            println!("Goodbye.");
            return true;
        }
        "\\help" | "\\h" | "\\?" => print_help(),
        "\\connect" => {
            if arg.is_empty() {
                println!(
                    "Current connection: {}",
                    session.client.base_url().as_str().bright_cyan()
                );
                println!("Usage: \\connect <host:port>");
            } else if let Err(e) = session.reconnect(arg) {
                eprintln!("{} {e}", "Error:".red().bold());
            }
        }
        "\\indices" => show_indices(session),
        "\\fields" => show_fields(session, arg),
        "\\session" => {
            let state = session.engine().session();
            println!("{}", formatter::session(&state).render(session.format));
        }
        "\\refresh" => {
            session.engine().reset();
            println!("Session reset. Metadata will be fetched again.");
        }
        "\\timing" => {
            session.show_timing = !session.show_timing;
            println!(
                "Timing display: {}",
                if session.show_timing { "on" } else { "off" }
            );
        }
        "\\format" => {
            if arg.is_empty() {
                println!("Current format: {}", session.format);
                println!("Usage: \\format <table|json|csv>");
            } else {
                match arg.parse::<OutputFormat>() {
                    Ok(fmt) => {
                        session.format = fmt;
                        println!("Output format: {}", session.format);
                    }
                    Err(e) => eprintln!("{} {e}", "Error:".red().bold()),
                }
            }
        }
        "\\status" => check_status(session),
        _ => {
            eprintln!(
                "{} Unknown command: {}. Type \\help for available commands.",
                "Error:".red().bold(),
                cmd
            );
        }
    }

    false
}

/// List cached indices, fetching them first if the session has none.
fn show_indices(session: &Session) {
    let engine = session.engine();
    if engine.cached_indices().is_empty() {
        session
            .runtime
            .block_on(engine.resolve(vec![MetadataRequest::Indices]));
    }
    let names = engine.cached_indices();
    if names.is_empty() {
        eprintln!(
            "{} no indices available from {}",
            "Error:".red().bold(),
            session.client.base_url()
        );
        return;
    }
    println!("{}", formatter::indices(&names).render(session.format));
}

/// Show the field list of `index`, or of the active index when omitted.
fn show_fields(session: &Session, index: &str) {
    let engine = session.engine();
    let index = if index.is_empty() {
        match engine.active_index() {
            Some(active) => active,
            None => {
                println!("No active index. Usage: \\fields <index>");
                return;
            }
        }
    } else {
        index.to_string()
    };

    let resident = engine
        .cached_fields()
        .is_some_and(|fields| fields.index == index);
    if !resident {
        debug!(index = %index, "loading fields for inspection");
        session
            .runtime
            .block_on(engine.resolve(vec![MetadataRequest::Fields {
                index: index.clone(),
            }]));
    }

    match engine.cached_fields().filter(|fields| fields.index == index) {
        Some(fields) => println!("{}", formatter::fields(&fields).render(session.format)),
        None => eprintln!("{} could not load fields for {index}", "Error:".red().bold()),
    }
}

/// Check cluster reachability and display its identity.
fn check_status(session: &Session) {
    match session.runtime.block_on(session.client.info()) {
        Ok(info) => println!("{}", formatter::cluster(&info).render(session.format)),
        Err(e) => {
            eprintln!(
                "{} Cluster at {} is unreachable: {e}",
                "Error:".red().bold(),
                session.client.base_url()
            );
        }
    }
}

// ---------------------------------------------------------------------------
// .pplrc loading
// ---------------------------------------------------------------------------

/// Run `~/.pplrc` if it exists.
///
/// Meta-command lines are executed; any other non-comment line is completed
/// silently, which warms the metadata cache.
fn load_pplrc(session: &mut Session) {
    let Some(home) = dirs::home_dir() else {
        return;
    };
    let rc_path = home.join(".pplrc");
    let Ok(contents) = std::fs::read_to_string(&rc_path) else {
        return;
    };

    for line in contents.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        if trimmed.starts_with('\\') {
            handle_meta_command(session, trimmed);
        } else {
            let engine = session.engine();
            session.runtime.block_on(engine.get_items(line));
        }
    }
}

// ---------------------------------------------------------------------------
// History file path
// ---------------------------------------------------------------------------

fn history_file_path() -> std::path::PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| std::path::PathBuf::from("."))
        .join(".ppl_history")
}

// ---------------------------------------------------------------------------
// Help and banner
// ---------------------------------------------------------------------------

fn print_banner(session: &Session) {
    println!();
    println!("{}", "  PPL Autocomplete Shell".bright_cyan().bold());
    println!("  {} {}", "Version:".dimmed(), VERSION);
    println!("  {} {}", "Cluster:".dimmed(), session.client.base_url());
    println!("  {} {}", "Format: ".dimmed(), session.format);
    println!();
    println!(
        "  Press {} to complete, {} to list suggestions, {} for help.",
        "Tab".bright_yellow(),
        "Enter".bright_yellow(),
        "\\help".bright_yellow()
    );
    println!();
}

fn print_help() {
    const COMMANDS: &[(&str, &str)] = &[
        ("\\connect <host:port>", "Change cluster connection"),
        ("\\indices            ", "List indices offered for completion"),
        ("\\fields [index]     ", "List fields of an index (default: active)"),
        ("\\session            ", "Show the completion session state"),
        ("\\refresh            ", "Start a fresh session and refetch metadata"),
        ("\\format <fmt>       ", "Set output format (table|json|csv)"),
        ("\\timing             ", "Toggle completion timing display"),
        ("\\status             ", "Show cluster identity"),
        ("\\help               ", "Show this help message"),
        ("\\quit / \\q          ", "Exit the shell"),
    ];

    println!();
    println!("{}", "  Meta-Commands".bright_cyan().bold());
    println!();
    for (command, description) in COMMANDS {
        println!("  {}  {}", command.bright_yellow(), description);
    }
    println!();
    println!("{}", "  Query Input".bright_cyan().bold());
    println!();
    println!("  Type a PPL query. Tab completes the token under the cursor;");
    println!("  Enter lists every suggestion for the line as typed, including");
    println!("  trailing spaces.");
    println!();
}

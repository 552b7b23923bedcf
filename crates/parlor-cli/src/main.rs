//! `parlor` – console companion with layered conversation memory.
//!
//! 1. Loads `.env` if present, then `~/.parlor/config.toml`, writing a
//!    default file on first run.
//! 2. Builds the reply generator selected by the config (or `--mock`) and,
//!    for the remote backend, probes the model server.
//! 3. Runs one of three modes:
//!    - `chat` (default) – interactive companion backed by a `ChatSession`
//!    - `docs` – keyword-overlap Q&A over a folder of `.txt`/`.pdf` files
//!    - `demo` – scripted walkthrough of the memory layers
//! 4. Intercepts **Ctrl-C** to leave the active loop cleanly.

mod config;
mod demo;
mod probe;
mod repl;

use clap::{Parser, Subcommand};
use colored::Colorize;
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{info, warn};

use parlor_runtime::{
    ChatSession, Corpus, MockReplyGenerator, Persona, ReplyBackend, ReplyGenerator,
    build_generator,
};

#[derive(Parser)]
#[command(name = "parlor")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Console companion with layered conversation memory", long_about = None)]
struct Cli {
    /// Force the offline mock reply generator
    #[arg(long, global = true)]
    mock: bool,

    /// Persona JSON file (overrides the config)
    #[arg(long, global = true, env = "PARLOR_PERSONA")]
    persona: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Chat with the companion (default)
    Chat,

    /// Ask questions against a folder of .txt and .pdf documents
    Docs {
        /// Folder with documents (defaults to `docs_dir` from the config)
        #[arg(short, long)]
        dir: Option<PathBuf>,

        /// Number of passages shown per answer
        #[arg(short = 'k', long, default_value_t = 2)]
        top_k: usize,
    },

    /// Print a scripted walkthrough of the memory layers
    Demo,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let _telemetry = parlor_runtime::init_tracing("parlor");

    let shutdown = Arc::new(AtomicBool::new(false));
    let shutdown_clone = shutdown.clone();
    if let Err(e) = ctrlc::set_handler(move || {
        println!();
        println!("{}", "⚠  Ctrl-C received – leaving …".yellow().bold());
        shutdown_clone.store(true, Ordering::SeqCst);
    }) {
        warn!(error = %e, "Failed to install Ctrl-C handler");
    }

    if let Some(path) = config::load_dotenv() {
        info!(path = %path.display(), "loaded .env");
    }
    let cfg = load_or_init_config();

    match cli.command.unwrap_or(Commands::Chat) {
        Commands::Demo => {
            if let Err(e) = demo::run(std::io::stdout()) {
                eprintln!("{}: {}", "I/O error".red(), e);
                return ExitCode::FAILURE;
            }
        }
        Commands::Docs { dir, top_k } => {
            let dir = dir.unwrap_or_else(|| cfg.docs_dir.clone());
            let corpus = match Corpus::load_dir(&dir) {
                Ok(c) => c,
                Err(e) => {
                    eprintln!("{}: {}", "Error".red(), e);
                    return ExitCode::FAILURE;
                }
            };
            if corpus.is_empty() {
                println!(
                    "No documents found in {}. Put some .txt or .pdf files there and try again.",
                    dir.display().to_string().bold()
                );
                return ExitCode::SUCCESS;
            }
            repl::run_docs(&corpus, top_k, shutdown);
        }
        Commands::Chat => {
            let persona = load_persona(cli.persona.or_else(|| cfg.persona_path.clone()));
            let backend = if cli.mock { ReplyBackend::Mock } else { cfg.reply_backend };
            let generator = select_generator(backend, &persona, &cfg);
            let mut session =
                ChatSession::with_short_term(persona, generator, cfg.memory.short_term());
            info!(session = %session.id(), backend = %backend, "session started");
            print_banner();
            repl::run_chat(&mut session, shutdown);
        }
    }
    ExitCode::SUCCESS
}

// ─────────────────────────────────────────────────────────────────────────────
// Setup helpers
// ─────────────────────────────────────────────────────────────────────────────

fn load_or_init_config() -> config::Config {
    match config::load() {
        Ok(Some(cfg)) => cfg,
        Ok(None) => {
            let mut cfg = config::Config::default();
            config::apply_env_overrides(&mut cfg);
            match config::save(&config::Config::default()) {
                Ok(()) => println!(
                    "  {} Wrote default config to {}",
                    "✓".green().bold(),
                    config::config_path().display().to_string().bold()
                ),
                Err(e) => warn!(error = %e, "could not write default config"),
            }
            cfg
        }
        Err(e) => {
            println!("{}: {}", "Config error".red(), e);
            println!("  Using default configuration.");
            let mut cfg = config::Config::default();
            config::apply_env_overrides(&mut cfg);
            cfg
        }
    }
}

fn load_persona(path: Option<PathBuf>) -> Persona {
    let Some(path) = path else {
        return Persona::default();
    };
    match Persona::load(&path) {
        Ok(p) => {
            info!(persona = %p.name, path = %path.display(), "persona loaded");
            p
        }
        Err(e) => {
            warn!(error = %e, "falling back to built-in persona");
            Persona::default()
        }
    }
}

/// Build the configured generator.  A misconfigured or unreachable remote
/// backend degrades to the mock generator with a warning.
fn select_generator(
    backend: ReplyBackend,
    persona: &Persona,
    cfg: &config::Config,
) -> Box<dyn ReplyGenerator> {
    let generator = match build_generator(backend, persona, &cfg.remote_settings()) {
        Ok(g) => g,
        Err(e) => {
            warn!(error = %e, "falling back to mock replies");
            return Box::new(MockReplyGenerator::for_persona(persona));
        }
    };

    if backend == ReplyBackend::Remote {
        print!("\n  Probing model server at {} … ", cfg.llm_base_url.dimmed());
        std::io::stdout().flush().ok();
        match probe::fetch_models(&cfg.llm_base_url, &cfg.api_key) {
            Ok(models) => {
                println!("{} ({} model(s) available)", "online".green(), models.len());
                if !models.iter().any(|m| m.id == cfg.model) {
                    println!(
                        "  {} model '{}' is not listed; replies may fall back to mock.",
                        "Warning:".yellow(),
                        cfg.model.bold()
                    );
                }
            }
            Err(e) => {
                println!("{}", "offline".yellow());
                println!("  {}", e.dimmed());
                println!("  Turns will use mock replies until the server is reachable.");
            }
        }
    }
    generator
}

fn print_banner() {
    println!();
    println!("{}", "  ┌─┐┌─┐┬─┐┬  ┌─┐┬─┐".bold().magenta());
    println!("{}", "  ├─┘├─┤├┬┘│  │ │├┬┘".bold().magenta());
    println!("{}", "  ┴  ┴ ┴┴└─┴─┘└─┘┴└─".bold().magenta());
    println!();
    println!(
        "  {} {}",
        "Parlor".bold(),
        format!("v{}", env!("CARGO_PKG_VERSION")).dimmed()
    );
    println!("  Companion chat with short, mid and long-term memory");
    println!();
}

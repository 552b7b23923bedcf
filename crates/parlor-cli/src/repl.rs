//! REPL – the interactive chat and document Q&A loops.
//!
//! Chat slash-commands:
//!   /help         – show this list
//!   /context      – print the short-term context window
//!   /topics       – print the mid-term topic snapshot
//!   /facts        – print the long-term fact summary
//!   /persona      – print the active persona and system prompt
//!   /quit | /exit – leave the session (plain `exit` / `quit` also work)
//!
//! Any other line is a chat turn.

use colored::Colorize;
use std::io::{self, BufRead, Write};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use parlor_runtime::{ChatSession, Corpus, ReplySource};

/// Whether the loop should keep reading input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

fn is_exit_word(line: &str) -> bool {
    matches!(line.to_lowercase().as_str(), "exit" | "quit" | "/exit" | "/quit")
}

/// Print `prompt`, then read one trimmed line.  `None` on EOF.
fn read_prompted<R: BufRead, W: Write>(
    input: &mut R,
    out: &mut W,
    prompt: &str,
) -> io::Result<Option<String>> {
    write!(out, "{} ", prompt)?;
    out.flush()?;
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}

// ─────────────────────────────────────────────────────────────────────────────
// Chat
// ─────────────────────────────────────────────────────────────────────────────

/// Entry point for the interactive chat REPL on stdin/stdout.
///
/// `shutdown` is polled each iteration; when set the REPL exits cleanly.
pub fn run_chat(session: &mut ChatSession, shutdown: Arc<AtomicBool>) {
    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("{}: {}", "Failed to start async runtime".red(), e);
            return;
        }
    };
    let stdin = io::stdin();
    if let Err(e) = chat_loop(session, &runtime, stdin.lock(), io::stdout(), &shutdown) {
        eprintln!("{}: {}", "I/O error".red(), e);
    }
}

fn chat_loop<R: BufRead, W: Write>(
    session: &mut ChatSession,
    runtime: &tokio::runtime::Runtime,
    mut input: R,
    mut out: W,
    shutdown: &AtomicBool,
) -> io::Result<()> {
    writeln!(
        out,
        "  Chatting with {} ({} replies). Type {} for commands, {} to quit.\n",
        session.persona().name.bold().magenta(),
        session.generator_name(),
        "/help".bold().cyan(),
        "exit".bold()
    )?;

    loop {
        if shutdown.load(Ordering::SeqCst) {
            break;
        }
        let Some(line) = read_prompted(&mut input, &mut out, &"You:".bold().cyan().to_string())?
        else {
            break;
        };
        if line.is_empty() {
            continue;
        }
        if is_exit_word(&line) {
            writeln!(out, "{}", "Goodbye.".green())?;
            break;
        }
        if line.starts_with('/') {
            if chat_command(session, &line, &mut out)? == Flow::Quit {
                break;
            }
            continue;
        }

        let turn = runtime.block_on(session.respond(&line));
        writeln!(
            out,
            "{} {}: {}",
            session.persona().name.bold().magenta(),
            session.affection().tag().dimmed(),
            turn.reply
        )?;
        if turn.source == ReplySource::Fallback {
            writeln!(out, "  {}", "(remote backend unavailable; mock reply)".dimmed())?;
        }
        writeln!(out)?;
    }
    Ok(())
}

fn chat_command<W: Write>(session: &ChatSession, cmd: &str, out: &mut W) -> io::Result<Flow> {
    let engine = session.engine();
    match cmd {
        "/help" => {
            writeln!(out)?;
            writeln!(out, "{}", "Parlor Commands".bold().underline())?;
            writeln!(out, "  {}   – short-term context window", "/context".bold().cyan())?;
            writeln!(out, "  {}    – mid-term topic snapshot", "/topics".bold().cyan())?;
            writeln!(out, "  {}     – long-term fact summary", "/facts".bold().cyan())?;
            writeln!(out, "  {}   – active persona and prompt", "/persona".bold().cyan())?;
            writeln!(out, "  {} – leave the session", "/quit  /exit".bold().cyan())?;
            writeln!(out)?;
        }
        "/context" => {
            writeln!(out, "{}", "--- Context ---".dimmed())?;
            writeln!(out, "{}", engine.context_window())?;
            writeln!(out, "{}", "---------------".dimmed())?;
        }
        "/topics" => {
            let topics = engine.topics().snapshot();
            if topics.is_empty() {
                writeln!(out, "  No topics yet.")?;
            } else {
                writeln!(out, "  Topics: {}", topics.join(", "))?;
            }
        }
        "/facts" => writeln!(out, "{}", engine.facts().summary())?,
        "/persona" => {
            let persona = session.persona();
            writeln!(
                out,
                "  {} – {} {}",
                persona.name.bold().magenta(),
                persona.style,
                session.affection().tag().dimmed()
            )?;
            writeln!(out, "{}", persona.system_prompt().dimmed())?;
        }
        "/quit" | "/exit" => {
            writeln!(out, "{}", "Goodbye.".green())?;
            return Ok(Flow::Quit);
        }
        other => {
            writeln!(
                out,
                "{} '{}'. Type {} for available commands.",
                "Unknown command:".red(),
                other.yellow(),
                "/help".bold()
            )?;
        }
    }
    Ok(Flow::Continue)
}

// ─────────────────────────────────────────────────────────────────────────────
// Document Q&A
// ─────────────────────────────────────────────────────────────────────────────

/// Entry point for the document Q&A REPL on stdin/stdout.
pub fn run_docs(corpus: &Corpus, top_k: usize, shutdown: Arc<AtomicBool>) {
    let stdin = io::stdin();
    if let Err(e) = docs_loop(corpus, top_k, stdin.lock(), io::stdout(), &shutdown) {
        eprintln!("{}: {}", "I/O error".red(), e);
    }
}

fn docs_loop<R: BufRead, W: Write>(
    corpus: &Corpus,
    top_k: usize,
    mut input: R,
    mut out: W,
    shutdown: &AtomicBool,
) -> io::Result<()> {
    writeln!(out, "{}", "=== Document Q&A (mock) ===".bold().cyan())?;
    writeln!(out, "Ask a question (type 'exit' to quit).")?;
    loop {
        if shutdown.load(Ordering::SeqCst) {
            break;
        }
        let Some(question) = read_prompted(&mut input, &mut out, &"Q:".bold().to_string())? else {
            break;
        };
        if is_exit_word(&question) {
            break;
        }
        if question.is_empty() {
            continue;
        }
        writeln!(out, "{}\n", corpus.answer(&question, top_k))?;
    }
    Ok(())
}

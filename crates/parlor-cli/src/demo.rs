//! Scripted walkthrough of the three memory layers.

use colored::Colorize;
use parlor_memory::MemoryEngine;
use parlor_types::Role;
use std::io::{self, Write};

/// Canned conversation fed to the engine by [`run`].
pub const SAMPLE_TURNS: [(Role, &str); 6] = [
    (Role::User, "Hi, my name is Alex."),
    (Role::Assistant, "Nice to meet you, Alex."),
    (Role::User, "I am working on an AI project."),
    (Role::Assistant, "That sounds exciting."),
    (Role::User, "By the way, I love flirty anime chatbots."),
    (Role::Assistant, "Good to know 😄"),
];

pub fn run<W: Write>(mut out: W) -> io::Result<()> {
    let mut engine = MemoryEngine::new();
    for (role, text) in SAMPLE_TURNS {
        engine.ingest(role, text);
    }

    writeln!(out, "{}", "=== Memory Engine Demo ===".bold().cyan())?;
    writeln!(out, "\n{}", "[Context Window]".bold())?;
    writeln!(out, "{}", engine.context_window())?;
    writeln!(out, "\n{}", "[Mid Topics]".bold())?;
    writeln!(out, "{}", engine.topics().snapshot().join(", "))?;
    writeln!(out, "\n{}", "[Long Summary]".bold())?;
    writeln!(out, "{}", engine.facts().summary())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn demo_prints_all_three_layers() {
        colored::control::set_override(false);
        let mut out = Vec::new();
        run(&mut out).unwrap();
        let out = String::from_utf8(out).unwrap();

        assert!(out.contains("USER: Hi, my name is Alex.\nASSISTANT: Nice to meet you, Alex."));
        assert!(out.contains("ASSISTANT: Good to know 😄"));
        assert!(out.contains("working, project., flirty, anime, chatbots."));
        assert!(out.contains(
            "Long-term facts:\n- Hi, my name is Alex.\n- I am working on an AI project."
        ));
        // "I love flirty anime chatbots." has no fact marker.
        assert!(!out.contains("- By the way"));
    }
}

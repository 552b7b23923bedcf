//! Persona definitions and the affection meter.
//!
//! A [`Persona`] is loaded from a small JSON file:
//!
//! ```json
//! {
//!   "name": "Raven",
//!   "style": "playful",
//!   "rules": ["Stay in character.", "Be kind."],
//!   "keywords_positive": ["cute", "thanks"],
//!   "keywords_negative": ["boring"]
//! }
//! ```
//!
//! [`AffectionSystem`] nudges a 1–5 level up or down by at most one step per
//! user turn depending on which keywords the turn contains.

use parlor_types::ParlorError;
use serde::{Deserialize, Serialize};
use std::path::Path;

// ─────────────────────────────────────────────────────────────────────────────
// Persona
// ─────────────────────────────────────────────────────────────────────────────

/// Character sheet used to build the system prompt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Persona {
    pub name: String,
    pub style: String,
    #[serde(default)]
    pub rules: Vec<String>,
    #[serde(default)]
    pub keywords_positive: Vec<String>,
    #[serde(default)]
    pub keywords_negative: Vec<String>,
}

impl Default for Persona {
    fn default() -> Self {
        Self {
            name: "Raven".to_string(),
            style: "playful".to_string(),
            rules: vec![
                "Stay in character.".to_string(),
                "Keep things light and friendly.".to_string(),
                "Ask a follow-up question when the user shares something.".to_string(),
            ],
            keywords_positive: vec![
                "cute".to_string(),
                "thanks".to_string(),
                "love".to_string(),
            ],
            keywords_negative: vec!["boring".to_string(), "annoying".to_string()],
        }
    }
}

impl Persona {
    /// Parse a persona from its JSON representation.
    pub fn from_json(raw: &str) -> Result<Self, ParlorError> {
        serde_json::from_str(raw).map_err(|e| ParlorError::Persona(e.to_string()))
    }

    /// Read and parse a persona file.
    pub fn load(path: &Path) -> Result<Self, ParlorError> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            ParlorError::Persona(format!("failed to read {}: {}", path.display(), e))
        })?;
        Self::from_json(&raw)
    }

    /// Render the system prompt handed to the reply generator.
    pub fn system_prompt(&self) -> String {
        let rules = self
            .rules
            .iter()
            .map(|r| format!("- {r}"))
            .collect::<Vec<_>>()
            .join("\n");
        format!(
            "You are {}, a {} companion.\nFollow these rules:\n{}\nRespond in 1-3 sentences.\n",
            self.name, self.style, rules
        )
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// AffectionSystem
// ─────────────────────────────────────────────────────────────────────────────

pub const MIN_AFFECTION: u8 = 1;
pub const MAX_AFFECTION: u8 = 5;
pub const DEFAULT_AFFECTION: u8 = 2;

/// Keyword-driven mood meter clamped to `[MIN_AFFECTION, MAX_AFFECTION]`.
#[derive(Debug, Clone)]
pub struct AffectionSystem {
    level: u8,
    positive: Vec<String>,
    negative: Vec<String>,
}

impl AffectionSystem {
    pub fn new(positive: Vec<String>, negative: Vec<String>) -> Self {
        Self {
            level: DEFAULT_AFFECTION,
            positive,
            negative,
        }
    }

    pub fn for_persona(persona: &Persona) -> Self {
        Self::new(
            persona.keywords_positive.clone(),
            persona.keywords_negative.clone(),
        )
    }

    /// Adjust the level from one user utterance; returns the new level.
    ///
    /// Apologies count as one positive hit.  The level moves by the sign of
    /// the net score, never by more than one step.
    pub fn update(&mut self, user_text: &str) -> u8 {
        let text = user_text.to_lowercase();
        let hits = |keywords: &[String]| {
            keywords
                .iter()
                .filter(|kw| text.contains(kw.to_lowercase().as_str()))
                .count() as i32
        };
        let mut delta = hits(self.positive.as_slice()) - hits(self.negative.as_slice());
        if text.contains("sorry") || text.contains("apologize") {
            delta += 1;
        }
        let stepped = i32::from(self.level) + delta.signum();
        self.level = stepped.clamp(i32::from(MIN_AFFECTION), i32::from(MAX_AFFECTION)) as u8;
        self.level
    }

    pub fn level(&self) -> u8 {
        self.level
    }

    /// Display tag, e.g. `"[affection:3]"`.
    pub fn tag(&self) -> String {
        format!("[affection:{}]", self.level)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meter() -> AffectionSystem {
        AffectionSystem::new(
            vec!["cute".into(), "thanks".into()],
            vec!["boring".into()],
        )
    }

    #[test]
    fn system_prompt_lists_rules() {
        let persona = Persona {
            name: "Raven".into(),
            style: "flirty".into(),
            rules: vec!["Be nice.".into(), "No spoilers.".into()],
            keywords_positive: vec![],
            keywords_negative: vec![],
        };
        assert_eq!(
            persona.system_prompt(),
            "You are Raven, a flirty companion.\nFollow these rules:\n- Be nice.\n- No spoilers.\nRespond in 1-3 sentences.\n"
        );
    }

    #[test]
    fn persona_json_defaults_optional_lists() {
        let p = Persona::from_json(r#"{"name":"Mika","style":"calm"}"#).unwrap();
        assert_eq!(p.name, "Mika");
        assert!(p.rules.is_empty());
        assert!(p.keywords_positive.is_empty());
    }

    #[test]
    fn persona_json_missing_name_is_error() {
        let err = Persona::from_json(r#"{"style":"calm"}"#).unwrap_err();
        assert!(matches!(err, ParlorError::Persona(_)));
    }

    #[test]
    fn persona_load_from_file() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let path = dir.path().join("personality.json");
        std::fs::write(&path, r#"{"name":"Iris","style":"witty","rules":["Be brief."]}"#)
            .unwrap();
        let p = Persona::load(&path).unwrap();
        assert_eq!(p.style, "witty");
        assert_eq!(p.rules, vec!["Be brief.".to_string()]);
    }

    #[test]
    fn persona_load_missing_file_is_error() {
        let err = Persona::load(Path::new("/definitely/not/here.json")).unwrap_err();
        assert!(err.to_string().contains("failed to read"));
    }

    #[test]
    fn affection_starts_at_default() {
        let m = meter();
        assert_eq!(m.level(), 2);
        assert_eq!(m.tag(), "[affection:2]");
    }

    #[test]
    fn affection_moves_one_step_per_turn() {
        let mut m = meter();
        assert_eq!(m.update("you are cute, thanks!"), 3);
        assert_eq!(m.update("boring"), 2);
        assert_eq!(m.update("the sky is blue"), 2);
    }

    #[test]
    fn apology_counts_as_positive() {
        let mut m = meter();
        assert_eq!(m.update("Sorry about that"), 3);
    }

    #[test]
    fn affection_is_clamped() {
        let mut m = meter();
        for _ in 0..10 {
            m.update("cute");
        }
        assert_eq!(m.level(), MAX_AFFECTION);
        for _ in 0..10 {
            m.update("boring");
        }
        assert_eq!(m.level(), MIN_AFFECTION);
    }

    #[test]
    fn mixed_keywords_cancel_out() {
        let mut m = meter();
        assert_eq!(m.update("cute but boring"), 2);
    }
}

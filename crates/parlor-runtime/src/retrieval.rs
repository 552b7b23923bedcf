//! Keyword-overlap document retrieval.
//!
//! A [`Corpus`] is a list of text documents (plain `.txt` files or text
//! extracted from PDFs) ranked against a query by
//! the Jaccard index of their whitespace-tokenised, lower-cased term sets.
//! Ranking is stable, so equally scored documents keep corpus order.
//!
//! # Example
//!
//! ```rust
//! use parlor_runtime::retrieval::{Corpus, Document};
//!
//! let corpus = Corpus::from_documents(vec![
//!     Document::new("rust.txt", "rust is a systems language"),
//!     Document::new("tea.txt", "green tea and black tea"),
//! ]);
//! let hits = corpus.retrieve("which systems language", 1);
//! assert_eq!(hits[0].document_id, "rust.txt");
//! ```

use parlor_types::ParlorError;
use std::collections::HashSet;
use std::path::Path;
use tracing::{info, warn};

/// Characters of a document included in a [`Hit`] snippet.
pub const SNIPPET_CHARS: usize = 800;

/// Whitespace split, lower-cased.
pub fn tokenize(text: &str) -> Vec<String> {
    text.split_whitespace().map(str::to_lowercase).collect()
}

/// Jaccard index of the two token sets; `0.0` if either is empty.
pub fn jaccard(a: &[String], b: &[String]) -> f64 {
    let sa: HashSet<&str> = a.iter().map(String::as_str).collect();
    let sb: HashSet<&str> = b.iter().map(String::as_str).collect();
    if sa.is_empty() || sb.is_empty() {
        return 0.0;
    }
    let inter = sa.intersection(&sb).count();
    let union = sa.union(&sb).count();
    inter as f64 / union as f64
}

// ─────────────────────────────────────────────────────────────────────────────
// Document / Hit
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct Document {
    pub id: String,
    pub text: String,
    tokens: Vec<String>,
}

impl Document {
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            id: id.into(),
            tokens: tokenize(&text),
            text,
        }
    }

    pub fn snippet(&self) -> String {
        self.text.chars().take(SNIPPET_CHARS).collect()
    }
}

/// One ranked retrieval result.
#[derive(Debug, Clone, PartialEq)]
pub struct Hit {
    pub document_id: String,
    pub snippet: String,
    pub score: f64,
}

/// Text of every page of a PDF, in page order.
fn extract_pdf_text(path: &Path) -> Result<String, String> {
    let bytes = std::fs::read(path).map_err(|e| e.to_string())?;
    // pdf-extract panics on some malformed files.
    std::panic::catch_unwind(|| pdf_extract::extract_text_from_mem(&bytes))
        .map_err(|_| "PDF parser panicked".to_string())?
        .map_err(|e| e.to_string())
}

// ─────────────────────────────────────────────────────────────────────────────
// Corpus
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default)]
pub struct Corpus {
    documents: Vec<Document>,
}

impl Corpus {
    pub fn from_documents(documents: Vec<Document>) -> Self {
        Self { documents }
    }

    /// Load every `.txt` and `.pdf` file directly inside `dir`, in file-name
    /// order.
    ///
    /// Unreadable files and PDFs whose text cannot be extracted are skipped
    /// with a warning; blank documents are dropped.
    ///
    /// # Errors
    ///
    /// Returns [`ParlorError::Corpus`] only when `dir` itself cannot be listed.
    pub fn load_dir(dir: &Path) -> Result<Self, ParlorError> {
        let entries = std::fs::read_dir(dir)
            .map_err(|e| ParlorError::Corpus(format!("cannot list {}: {}", dir.display(), e)))?;

        let mut paths: Vec<_> = entries
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| p.is_file())
            .collect();
        paths.sort();

        let mut documents = Vec::new();
        for path in paths {
            let Some(name) = path.file_name().map(|n| n.to_string_lossy().into_owned()) else {
                continue;
            };
            let lower = name.to_lowercase();
            let text = if lower.ends_with(".pdf") {
                match extract_pdf_text(&path) {
                    Ok(text) => text,
                    Err(e) => {
                        warn!(file = %name, error = %e, "could not extract PDF text; skipping");
                        continue;
                    }
                }
            } else if lower.ends_with(".txt") {
                match std::fs::read_to_string(&path) {
                    Ok(text) => text,
                    Err(e) => {
                        warn!(file = %name, error = %e, "could not read file; skipping");
                        continue;
                    }
                }
            } else {
                continue;
            };
            if text.trim().is_empty() {
                continue;
            }
            documents.push(Document::new(name, text));
        }

        info!(count = documents.len(), dir = %dir.display(), "loaded documents");
        Ok(Self { documents })
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// The `top_k` best matches for `query`, highest score first.
    pub fn retrieve(&self, query: &str, top_k: usize) -> Vec<Hit> {
        let q = tokenize(query);
        let mut scored: Vec<(&Document, f64)> = self
            .documents
            .iter()
            .map(|d| (d, jaccard(&d.tokens, &q)))
            .collect();
        // sort_by is stable: ties keep corpus order.
        scored.sort_by(|a, b| b.1.total_cmp(&a.1));
        scored
            .into_iter()
            .take(top_k)
            .map(|(d, score)| Hit {
                document_id: d.id.clone(),
                snippet: d.snippet(),
                score,
            })
            .collect()
    }

    /// Render the top matches followed by a canned answer line.
    pub fn answer(&self, query: &str, top_k: usize) -> String {
        let context = self
            .retrieve(query, top_k)
            .iter()
            .map(|h| format!("[{}]\n{}", h.document_id, h.snippet))
            .collect::<Vec<_>>()
            .join("\n---\n");
        format!(
            "Top matches:\n{context}\n\nAnswer (mock): Based on the most relevant passages above."
        )
    }
}

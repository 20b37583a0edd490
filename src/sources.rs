//! Candidate-producing strategies.
//!
//! The calling layer owns recognition. It hands the pipeline an ordered list
//! of primary strategies and an ordered list of fallback strategies; every
//! primary strategy contributes into one pool, and fallbacks are consulted
//! only when that pool stays empty.

use fxhash::FxHashSet;
use serde::{Deserialize, Serialize};

use crate::core::{clean_recognizer_output, Candidate};
use crate::utils::error::SourceError;

/// One recognition pass over the input image.
pub trait CandidateSource {
    /// Tag attached to every candidate this source produces.
    fn tag(&self) -> &str;

    /// Raw recognized texts, best guess first.
    fn recognize(&self) -> Result<Vec<String>, SourceError>;
}

/// Texts that were recognized elsewhere and are replayed as a source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaticSource {
    pub tag: String,
    pub texts: Vec<String>,
}

impl StaticSource {
    pub fn new(tag: impl Into<String>, texts: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            tag: tag.into(),
            texts: texts.into_iter().map(Into::into).collect(),
        }
    }
}

impl CandidateSource for StaticSource {
    fn tag(&self) -> &str {
        &self.tag
    }

    fn recognize(&self) -> Result<Vec<String>, SourceError> {
        Ok(self.texts.clone())
    }
}

/// Everything the recognition layer produced for one request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidatePool {
    pub primary: Vec<Candidate>,
    /// Fallback recognizer text, present only when `primary` is empty.
    #[serde(default)]
    pub fallback: Option<String>,
}

impl CandidatePool {
    pub fn is_empty(&self) -> bool {
        self.primary.is_empty() && self.fallback.is_none()
    }
}

/// Run the strategies and pool their output.
///
/// Each raw text is pooled together with its recognizer cleanup; empty and
/// repeated texts are skipped. A failing source is logged and contributes
/// nothing.
pub fn gather(
    primary: &[&dyn CandidateSource],
    fallback: &[&dyn CandidateSource],
) -> CandidatePool {
    let mut pool = CandidatePool::default();
    let mut seen: FxHashSet<String> = FxHashSet::default();

    for source in primary {
        for raw in run_source(*source) {
            let cleaned = clean_recognizer_output(&raw);
            push_unique(&mut pool.primary, &mut seen, raw, source.tag().to_string());
            push_unique(
                &mut pool.primary,
                &mut seen,
                cleaned,
                format!("{}:cleaned", source.tag()),
            );
        }
    }

    if pool.primary.is_empty() {
        pool.fallback = fallback.iter().find_map(|source| {
            let texts = run_source(*source);
            (!texts.is_empty()).then(|| texts.join(" "))
        });
    }

    tracing::debug!(
        candidates = pool.primary.len(),
        fallback = pool.fallback.is_some(),
        "candidates gathered"
    );
    if pool.is_empty() {
        tracing::warn!("no source produced any text");
    }
    pool
}

fn run_source(source: &dyn CandidateSource) -> Vec<String> {
    match source.recognize() {
        Ok(texts) => texts
            .into_iter()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .collect(),
        Err(err) => {
            tracing::warn!(source = source.tag(), error = %err, "candidate source failed");
            Vec::new()
        }
    }
}

fn push_unique(
    out: &mut Vec<Candidate>,
    seen: &mut FxHashSet<String>,
    text: String,
    tag: String,
) {
    if text.is_empty() || !seen.insert(text.clone()) {
        return;
    }
    out.push(Candidate::new(text, tag));
}

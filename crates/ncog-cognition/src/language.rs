//! Text generation capability and a deterministic n-gram reference model
//!
//! `TextGeneration` is the boundary a pretrained-model-backed service would
//! implement. `NgramModel` is the in-repo reference: a bigram table trained
//! on whitespace-tokenized, lowercased text, generating by always taking the
//! most frequent successor (ties broken lexicographically) so output is
//! fully deterministic. Nothing here touches the simulation core.

use std::collections::BTreeMap;

use crate::error::*;

/// Capability set of a text generation/understanding service
pub trait TextGeneration {
    /// Learn from a body of text; empty or whitespace-only input is an error
    fn train_on_text(&mut self, text: &str) -> Result<()>;

    /// Continue a prompt for at most `max_words` additional words
    fn generate(&self, prompt: &str, max_words: usize) -> Result<String>;

    /// Score how well a text matches the learned statistics, in [0, 1]
    fn score_fluency(&self, text: &str) -> Result<f64>;
}

fn tokenize(text: &str) -> Result<Vec<String>> {
    if text.trim().is_empty() {
        return Err(CognitionError::invalid_input(
            "text must contain at least one word",
        ));
    }
    Ok(text
        .split_whitespace()
        .map(|word| word.to_lowercase())
        .collect())
}

/// Bigram language model with deterministic generation
#[derive(Debug, Clone, Default)]
pub struct NgramModel {
    bigrams: BTreeMap<String, BTreeMap<String, u32>>,
}

impl NgramModel {
    /// Create an untrained model
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of distinct context words seen in training
    pub fn context_count(&self) -> usize {
        self.bigrams.len()
    }

    fn best_successor(&self, word: &str) -> Option<&str> {
        let successors = self.bigrams.get(word)?;
        // BTreeMap iteration order makes the tie-break lexicographic.
        successors
            .iter()
            .max_by(|(wa, ca), (wb, cb)| ca.cmp(cb).then(wb.cmp(wa)))
            .map(|(word, _)| word.as_str())
    }
}

impl TextGeneration for NgramModel {
    fn train_on_text(&mut self, text: &str) -> Result<()> {
        let words = tokenize(text)?;
        for pair in words.windows(2) {
            *self
                .bigrams
                .entry(pair[0].clone())
                .or_default()
                .entry(pair[1].clone())
                .or_insert(0) += 1;
        }
        log::debug!(
            "trained on {} words, {} contexts known",
            words.len(),
            self.bigrams.len()
        );
        Ok(())
    }

    fn generate(&self, prompt: &str, max_words: usize) -> Result<String> {
        let words = tokenize(prompt)?;
        let mut output = words.clone();
        let mut current = words.last().cloned().unwrap_or_default();
        for _ in 0..max_words {
            match self.best_successor(&current) {
                Some(next) => {
                    output.push(next.to_string());
                    current = next.to_string();
                }
                None => break,
            }
        }
        Ok(output.join(" "))
    }

    fn score_fluency(&self, text: &str) -> Result<f64> {
        let words = tokenize(text)?;
        if words.len() < 2 {
            return Ok(0.0);
        }
        let known = words
            .windows(2)
            .filter(|pair| {
                self.bigrams
                    .get(&pair[0])
                    .is_some_and(|successors| successors.contains_key(&pair[1]))
            })
            .count();
        Ok(known as f64 / (words.len() - 1) as f64)
    }
}

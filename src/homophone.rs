/*!
 * Dictionary-driven homophone replacement for speech synthesis input.
 *
 * Each rule names a character, the character to speak instead, and the
 * words in which the swap applies. Words may carry `^` segmentation marks;
 * those marks are removed from the final text.
 */

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use log::{debug, info};
use serde::{Deserialize, Serialize};

/// Segmentation marker removed after replacement
pub const SEGMENT_MARKER: char = '^';

/// Line written when no replacement happened
pub const NO_REPLACEMENTS_PLACEHOLDER: &str = "No homophone replacements were made.";

/// One replacement rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HomophoneRule {
    /// Rule number, informational
    #[serde(default)]
    pub no: u32,
    /// Character as written
    pub original: String,
    /// Character to use instead
    pub modified: String,
    /// Words in which the replacement applies
    #[serde(default)]
    pub usecase: Vec<String>,
}

/// One replaced word and how many times it occurred
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Replacement {
    pub original: String,
    pub modified: String,
    pub word: String,
    pub instances: usize,
}

/// Immutable rule set, loaded once
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HomophoneDictionary {
    rules: Vec<HomophoneRule>,
}

impl Default for HomophoneDictionary {
    fn default() -> Self {
        Self::built_in()
    }
}

impl HomophoneDictionary {
    pub fn new(rules: Vec<HomophoneRule>) -> Self {
        Self { rules }
    }

    /// Small built-in rule set
    pub fn built_in() -> Self {
        let words = |list: &[&str]| list.iter().map(|w| w.to_string()).collect();
        Self::new(vec![
            HomophoneRule {
                no: 1,
                original: "行".to_string(),
                modified: "航".to_string(),
                usecase: words(&[
                    "行業", "行列", "銀行", "貨行", "行規", "行商", "各行各業", "一行", "兩行", "三行", "每行",
                ]),
            },
            HomophoneRule {
                no: 2,
                original: "會".to_string(),
                modified: "塊".to_string(),
                usecase: words(&["會計", "會計師"]),
            },
        ])
    }

    /// Parse a JSON array of rules
    pub fn from_json(json: &str) -> Result<Self> {
        let rules: Vec<HomophoneRule> =
            serde_json::from_str(json).context("Invalid homophone dictionary JSON")?;
        Ok(Self::new(rules))
    }

    /// Load a JSON dictionary file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read homophone dictionary: {}", path.display()))?;
        let dictionary = Self::from_json(&content)
            .with_context(|| format!("Failed to load homophone dictionary: {}", path.display()))?;
        info!("Loaded {} homophone rules from {}", dictionary.rules.len(), path.display());
        Ok(dictionary)
    }

    pub fn rules(&self) -> &[HomophoneRule] {
        &self.rules
    }

    /// Apply every rule in order and strip segmentation markers.
    ///
    /// Returns the new text and one record per replaced word.
    pub fn replace(&self, text: &str) -> (String, Vec<Replacement>) {
        let mut replaced = text.to_string();
        let mut records = Vec::new();

        for rule in &self.rules {
            for word in rule.usecase.iter().filter(|word| !word.is_empty()) {
                let instances = replaced.matches(word.as_str()).count();
                if instances == 0 {
                    continue;
                }
                let swapped = word.replace(&rule.original, &rule.modified);
                replaced = replaced.replace(word.as_str(), &swapped);
                debug!("Replaced '{}' -> '{}' ({} times)", word, swapped, instances);
                records.push(Replacement {
                    original: rule.original.clone(),
                    modified: rule.modified.clone(),
                    word: word.clone(),
                    instances,
                });
            }
        }

        let cleaned = replaced.chars().filter(|c| *c != SEGMENT_MARKER).collect();
        (cleaned, records)
    }
}

/// Markdown summary of replacements grouped by original character
pub fn render_report(records: &[Replacement]) -> String {
    if records.is_empty() {
        return NO_REPLACEMENTS_PLACEHOLDER.to_string();
    }

    // Groups keep first-seen order
    let mut order: Vec<&str> = Vec::new();
    let mut groups: BTreeMap<&str, Vec<&Replacement>> = BTreeMap::new();
    for record in records {
        if !groups.contains_key(record.original.as_str()) {
            order.push(&record.original);
        }
        groups.entry(&record.original).or_default().push(record);
    }

    let total: usize = records.iter().map(|r| r.instances).sum();
    let mut lines = vec![format!("## Homophone replacements ({} total)", total), String::new()];

    for original in order {
        let items = &groups[original];
        let group_total: usize = items.iter().map(|r| r.instances).sum();
        let words: Vec<String> = items
            .iter()
            .map(|r| format!("{} ({}x)", r.word, r.instances))
            .collect();

        lines.push(format!(
            "### \"{}\" -> \"{}\" ({} total)",
            original, items[0].modified, group_total
        ));
        lines.push(format!("Words: {}", words.join(", ")));
        lines.push(String::new());
    }

    lines.join("\n")
}

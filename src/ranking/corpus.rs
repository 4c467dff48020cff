//! Line-oriented candidate corpus
//!
//! Each line reads `<group> <tag> <fileId> <tokens...>`; `tag` is `layout`
//! (or `main`) for a full layout and `item` (or `list_item`) for a list-item
//! template belonging to the layout with the same group and file id.

use std::collections::HashMap;
use std::fmt;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use log::{debug, warn};
use serde::{Serialize, Deserialize};

use crate::{LayoutMatchError, Result};

/// Whether a corpus line holds a full layout or a list-item template
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntryKind {
    /// Full screen layout
    Layout,
    /// Template of one repeated list item
    Item,
}

impl EntryKind {
    fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "layout" | "main" => Some(EntryKind::Layout),
            "item" | "list_item" => Some(EntryKind::Item),
            _ => None,
        }
    }
}

/// Identity of a candidate layout
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CandidateId {
    /// Package or group name
    pub group: String,
    /// File within the group
    pub file_id: String,
}

impl fmt::Display for CandidateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.group, self.file_id)
    }
}

/// One parsed corpus line
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CorpusEntry {
    /// One-based line number
    pub line: usize,
    /// Owning candidate
    pub id: CandidateId,
    /// Layout or item template
    pub kind: EntryKind,
    /// Token sequence (may be empty)
    pub sequence: String,
}

impl CorpusEntry {
    /// Parse a single non-blank line
    pub fn parse_line(line: usize, text: &str) -> Result<Self> {
        let mut fields = text.split_whitespace();
        let (group, tag, file_id) = match (fields.next(), fields.next(), fields.next()) {
            (Some(group), Some(tag), Some(file_id)) => (group, tag, file_id),
            _ => {
                return Err(LayoutMatchError::MalformedCorpusLine {
                    line,
                    reason: "expected '<group> <tag> <fileId> <tokens...>'".to_string(),
                })
            }
        };
        let kind = EntryKind::from_tag(tag).ok_or_else(|| LayoutMatchError::MalformedCorpusLine {
            line,
            reason: format!("unknown layout type tag '{}'", tag),
        })?;

        Ok(CorpusEntry {
            line,
            id: CandidateId {
                group: group.to_string(),
                file_id: file_id.to_string(),
            },
            kind,
            sequence: fields.collect::<Vec<_>>().join(" "),
        })
    }
}

/// A layout and its optional item template, gathered from corpus lines
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Candidate {
    /// Position in order of first appearance
    pub index: usize,
    /// Identity
    pub id: CandidateId,
    /// Full layout sequence, if the corpus has one
    pub layout: Option<String>,
    /// First list-item template sequence, if any
    pub item: Option<String>,
}

/// Candidates read from a corpus, plus the lines that were rejected
#[derive(Debug, Default)]
pub struct Corpus {
    candidates: Vec<Candidate>,
    rejected: Vec<LayoutMatchError>,
}

impl Corpus {
    /// Empty corpus
    pub fn new() -> Self {
        Self::default()
    }

    /// Read a corpus file
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file))
    }

    /// Read a corpus from any buffered reader
    ///
    /// Malformed lines are logged and kept in [`Corpus::rejected`]; only IO
    /// errors abort.
    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self> {
        let mut corpus = Corpus::new();
        let mut by_id: HashMap<CandidateId, usize> = HashMap::new();

        for (i, line) in reader.lines().enumerate() {
            let line = line?;
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            match CorpusEntry::parse_line(i + 1, trimmed) {
                Ok(entry) => corpus.insert(&mut by_id, entry),
                Err(e) => {
                    warn!("skipping corpus line: {}", e);
                    corpus.rejected.push(e);
                }
            }
        }

        debug!(
            "corpus loaded: {} candidates, {} rejected lines",
            corpus.candidates.len(),
            corpus.rejected.len()
        );
        Ok(corpus)
    }

    /// Parse a corpus held in memory
    pub fn parse(text: &str) -> Result<Self> {
        Self::from_reader(text.as_bytes())
    }

    /// Add a full layout for `id`
    pub fn push_layout(&mut self, id: CandidateId, sequence: &str) {
        let index = self.candidates.len();
        self.candidates.push(Candidate {
            index,
            id,
            layout: Some(sequence.to_string()),
            item: None,
        });
    }

    fn insert(&mut self, by_id: &mut HashMap<CandidateId, usize>, entry: CorpusEntry) {
        let next = self.candidates.len();
        let index = *by_id.entry(entry.id.clone()).or_insert(next);
        if index == next {
            self.candidates.push(Candidate {
                index,
                id: entry.id.clone(),
                layout: None,
                item: None,
            });
        }

        let candidate = &mut self.candidates[index];
        let slot = match entry.kind {
            EntryKind::Layout => &mut candidate.layout,
            EntryKind::Item => &mut candidate.item,
        };
        if slot.is_some() {
            debug!("line {}: duplicate {:?} entry for {} ignored", entry.line, entry.kind, entry.id);
        } else {
            *slot = Some(entry.sequence);
        }
    }

    /// Candidates in order of first appearance
    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }

    /// Errors for lines that could not be parsed
    pub fn rejected(&self) -> &[LayoutMatchError] {
        &self.rejected
    }

    /// Number of candidates
    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    /// Check if the corpus has no candidates
    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
com.example layout main_activity Layout { Button TextView }
com.example item main_activity Layout { ImageView TextView }
# comment

com.other main settings Layout { Switch Switch }
com.other item
com.example layout detail Layout { EditText Button }
com.example bogus x Button
";

    #[test]
    fn test_parse_corpus() {
        let corpus = Corpus::parse(SAMPLE).unwrap();
        assert_eq!(corpus.len(), 3);

        let first = &corpus.candidates()[0];
        assert_eq!(first.index, 0);
        assert_eq!(first.id.to_string(), "com.example/main_activity");
        assert_eq!(first.layout.as_deref(), Some("Layout { Button TextView }"));
        assert_eq!(first.item.as_deref(), Some("Layout { ImageView TextView }"));

        let second = &corpus.candidates()[1];
        assert_eq!(second.id.group, "com.other");
        assert!(second.item.is_none());

        assert_eq!(corpus.candidates()[2].index, 2);
    }

    #[test]
    fn test_rejected_lines_are_recorded() {
        let corpus = Corpus::parse(SAMPLE).unwrap();
        assert_eq!(corpus.rejected().len(), 2);
        assert!(matches!(
            corpus.rejected()[0],
            LayoutMatchError::MalformedCorpusLine { line: 6, .. }
        ));
        assert!(matches!(
            corpus.rejected()[1],
            LayoutMatchError::MalformedCorpusLine { line: 8, .. }
        ));
    }

    #[test]
    fn test_entry_with_empty_sequence() {
        let entry = CorpusEntry::parse_line(1, "g layout f").unwrap();
        assert_eq!(entry.kind, EntryKind::Layout);
        assert_eq!(entry.sequence, "");
    }

    #[test]
    fn test_item_before_layout() {
        let corpus = Corpus::parse("g list_item f Button\ng layout f Layout { Button Button }\n").unwrap();
        assert_eq!(corpus.len(), 1);
        let candidate = &corpus.candidates()[0];
        assert_eq!(candidate.item.as_deref(), Some("Button"));
        assert_eq!(candidate.layout.as_deref(), Some("Layout { Button Button }"));
    }
}

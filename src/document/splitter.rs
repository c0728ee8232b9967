//! Recursive character splitting.
//!
//! Text is split on the coarsest separator present (paragraphs, then lines,
//! then words, then characters) and the pieces are greedily merged back
//! into chunks of at most `chunk_size` characters, with consecutive chunks
//! sharing up to `chunk_overlap` characters.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use super::extract::Fragment;
use crate::core::config::RagSettings;

const DEFAULT_SEPARATORS: [&str; 4] = ["\n\n", "\n", " ", ""];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SplitterConfig {
    /// Maximum chunk size in characters
    pub chunk_size: usize,
    /// Characters shared between consecutive chunks
    pub chunk_overlap: usize,
}

impl Default for SplitterConfig {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            chunk_overlap: 100,
        }
    }
}

impl From<&RagSettings> for SplitterConfig {
    fn from(settings: &RagSettings) -> Self {
        Self {
            chunk_size: settings.chunk_size,
            chunk_overlap: settings.chunk_overlap,
        }
    }
}

pub struct TextSplitter {
    chunk_size: usize,
    chunk_overlap: usize,
}

impl TextSplitter {
    pub fn new(config: SplitterConfig) -> Self {
        let chunk_size = config.chunk_size.max(1);
        Self {
            chunk_size,
            chunk_overlap: config.chunk_overlap.min(chunk_size - 1),
        }
    }

    pub fn split_text(&self, text: &str) -> Vec<String> {
        self.split_recursive(text, &DEFAULT_SEPARATORS)
    }

    /// Splits every fragment, keeping each chunk's page and renumbering indices.
    pub fn split_fragments(&self, fragments: &[Fragment]) -> Vec<Fragment> {
        let mut chunks = Vec::new();
        for fragment in fragments {
            for text in self.split_text(&fragment.text) {
                chunks.push(Fragment {
                    text,
                    page: fragment.page,
                    index: chunks.len(),
                });
            }
        }
        chunks
    }

    fn split_recursive(&self, text: &str, separators: &[&str]) -> Vec<String> {
        let mut separator = separators.last().copied().unwrap_or("");
        let mut finer: &[&str] = &[];
        for (i, candidate) in separators.iter().enumerate() {
            if candidate.is_empty() {
                separator = "";
                break;
            }
            if text.contains(candidate) {
                separator = candidate;
                finer = &separators[i + 1..];
                break;
            }
        }

        let splits: Vec<String> = if separator.is_empty() {
            text.chars().map(String::from).collect()
        } else {
            text.split(separator)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect()
        };

        let mut chunks = Vec::new();
        let mut pending: Vec<String> = Vec::new();
        for split in splits {
            if char_len(&split) < self.chunk_size {
                pending.push(split);
                continue;
            }

            if !pending.is_empty() {
                chunks.extend(self.merge_splits(&pending, separator));
                pending.clear();
            }
            if finer.is_empty() {
                chunks.push(split);
            } else {
                chunks.extend(self.split_recursive(&split, finer));
            }
        }

        if !pending.is_empty() {
            chunks.extend(self.merge_splits(&pending, separator));
        }

        chunks
    }

    fn merge_splits(&self, splits: &[String], separator: &str) -> Vec<String> {
        let separator_len = char_len(separator);
        let mut docs = Vec::new();
        let mut current: VecDeque<&str> = VecDeque::new();
        let mut total = 0usize;

        for split in splits {
            let len = char_len(split);
            let join_cost = if current.is_empty() { 0 } else { separator_len };

            if total + len + join_cost > self.chunk_size && !current.is_empty() {
                push_joined(&mut docs, &current, separator);

                while total > self.chunk_overlap
                    || (total > 0
                        && total + len + if current.is_empty() { 0 } else { separator_len }
                            > self.chunk_size)
                {
                    let Some(first) = current.pop_front() else {
                        break;
                    };
                    let cost = if current.is_empty() { 0 } else { separator_len };
                    total = total.saturating_sub(char_len(first) + cost);
                }
            }

            current.push_back(split);
            total += len + if current.len() > 1 { separator_len } else { 0 };
        }

        push_joined(&mut docs, &current, separator);
        docs
    }
}

impl Default for TextSplitter {
    fn default() -> Self {
        Self::new(SplitterConfig::default())
    }
}

fn push_joined(docs: &mut Vec<String>, parts: &VecDeque<&str>, separator: &str) {
    let joined = parts.iter().copied().collect::<Vec<_>>().join(separator);
    let trimmed = joined.trim();
    if !trimmed.is_empty() {
        docs.push(trimmed.to_string());
    }
}

fn char_len(text: &str) -> usize {
    text.chars().count()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn splitter(chunk_size: usize, chunk_overlap: usize) -> TextSplitter {
        TextSplitter::new(SplitterConfig {
            chunk_size,
            chunk_overlap,
        })
    }

    #[test]
    fn short_text_is_a_single_chunk() {
        let chunks = TextSplitter::default().split_text("Adding fractions with like denominators.");
        assert_eq!(chunks, vec!["Adding fractions with like denominators."]);
    }

    #[test]
    fn paragraphs_are_preferred_boundaries() {
        let chunks = splitter(12, 0).split_text("para one.\n\npara two.");
        assert_eq!(chunks, vec!["para one.", "para two."]);
    }

    #[test]
    fn chunks_respect_size_and_share_overlap() {
        let text = (0..60)
            .map(|i| format!("w{:03}", i))
            .collect::<Vec<_>>()
            .join(" ");

        let chunks = splitter(50, 20).split_text(&text);

        assert!(chunks.len() > 1);
        for chunk in &chunks {
            assert!(chunk.chars().count() <= 50, "chunk too long: {chunk}");
        }
        for pair in chunks.windows(2) {
            let first_word = pair[1].split(' ').next().unwrap();
            let previous_words: Vec<&str> = pair[0].split(' ').collect();
            assert!(
                previous_words.contains(&first_word),
                "expected {first_word} to overlap with {:?}",
                pair[0]
            );
        }
    }

    #[test]
    fn unbroken_text_falls_back_to_characters() {
        let text = "a".repeat(25);

        let chunks = splitter(10, 0).split_text(&text);

        let lengths: Vec<usize> = chunks.iter().map(|c| c.len()).collect();
        assert_eq!(lengths, vec![10, 10, 5]);
    }

    #[test]
    fn empty_text_yields_no_chunks() {
        assert!(TextSplitter::default().split_text("   ").is_empty());
        assert!(TextSplitter::default().split_text("").is_empty());
    }

    #[test]
    fn split_fragments_keeps_pages() {
        let fragments = vec![
            Fragment { text: "alpha beta gamma delta".to_string(), page: 1, index: 0 },
            Fragment { text: "epsilon".to_string(), page: 2, index: 1 },
        ];

        let chunks = splitter(12, 0).split_fragments(&fragments);

        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].text, "alpha beta");
        assert_eq!(chunks[1].text, "gamma delta");
        assert_eq!(chunks[2].page, 2);
        assert_eq!(
            chunks.iter().map(|c| c.index).collect::<Vec<_>>(),
            vec![0, 1, 2]
        );
    }
}

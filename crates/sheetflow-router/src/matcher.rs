// SPDX-FileCopyrightText: 2026 Sheetflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Tiered keyword matching of a user message against the flow table.
//!
//! Flows are tried in table order, keywords in cell order, and for each
//! keyword the tiers are tried exact, then whole-word, then substring. The
//! first success wins, so earlier flows always beat later, more specific
//! ones.

use sheetflow_core::FlowRecord;
use tracing::debug;

use crate::normalize::normalize;

/// The comparison strategy that produced a match, most precise first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum MatchTier {
    /// Normalized message equals the normalized keyword.
    Exact,
    /// Keyword occurs bounded by word boundaries.
    WholeWord,
    /// Keyword occurs anywhere, possibly inside a larger word.
    Substring,
}

impl std::fmt::Display for MatchTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MatchTier::Exact => write!(f, "exact"),
            MatchTier::WholeWord => write!(f, "whole-word"),
            MatchTier::Substring => write!(f, "substring"),
        }
    }
}

/// The winning flow and why it won.
#[derive(Debug, Clone, PartialEq)]
pub struct FlowMatch<'a> {
    pub flow: &'a FlowRecord,
    /// Position of the flow in the table.
    pub index: usize,
    /// The normalized keyword that matched.
    pub keyword: String,
    pub tier: MatchTier,
}

/// Resolve a user message to at most one flow.
///
/// Returns `None` when no keyword of any flow matches under any tier; that
/// is the signal to fall through to the completion path, not an error.
pub fn match_flow<'a>(message: &str, flows: &'a [FlowRecord]) -> Option<FlowMatch<'a>> {
    let message = normalize(message);
    if message.is_empty() {
        return None;
    }

    for (index, flow) in flows.iter().enumerate() {
        for raw in flow.raw_keywords() {
            let keyword = normalize(raw);
            if keyword.is_empty() {
                continue;
            }
            if let Some(tier) = tier_for(&message, &keyword) {
                debug!(index, keyword = keyword.as_str(), %tier, "flow matched");
                return Some(FlowMatch {
                    flow,
                    index,
                    keyword,
                    tier,
                });
            }
        }
    }

    None
}

/// Apply the three tiers to one already-normalized keyword.
fn tier_for(message: &str, keyword: &str) -> Option<MatchTier> {
    if message == keyword {
        Some(MatchTier::Exact)
    } else if contains_whole_word(message, keyword) {
        Some(MatchTier::WholeWord)
    } else if message.contains(keyword) {
        Some(MatchTier::Substring)
    } else {
        None
    }
}

/// Whether `keyword` occurs in `message` with a word boundary on each side.
///
/// Normalized text is `[a-z0-9 ]` only, so a boundary is the start, the
/// end, or a space.
fn contains_whole_word(message: &str, keyword: &str) -> bool {
    let bytes = message.as_bytes();
    let mut from = 0;
    // Advance one byte at a time so overlapping candidates are not skipped.
    while let Some(offset) = message[from..].find(keyword) {
        let start = from + offset;
        let end = start + keyword.len();
        let left = start == 0 || bytes[start - 1] == b' ';
        let right = end == bytes.len() || bytes[end] == b' ';
        if left && right {
            return true;
        }
        from = start + 1;
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flow(keywords: &str, answer: &str) -> FlowRecord {
        FlowRecord {
            keywords: keywords.to_string(),
            answer: Some(answer.to_string()),
            media: None,
        }
    }

    #[test]
    fn earlier_flow_wins_over_more_specific_later_flow() {
        let flows = vec![flow("hola", "first"), flow("hola buenos dias", "second")];
        let m = match_flow("hola buenos dias", &flows).expect("should match");
        assert_eq!(m.index, 0);
        assert_eq!(m.flow.answer.as_deref(), Some("first"));
        assert_eq!(m.tier, MatchTier::WholeWord);
    }

    #[test]
    fn exact_match_is_reported_as_exact() {
        let flows = vec![flow("Precio, costo", "precios")];
        let m = match_flow("¡PRECIO!", &flows).unwrap();
        assert_eq!(m.tier, MatchTier::Exact);
        assert_eq!(m.keyword, "precio");
    }

    #[test]
    fn whole_word_rejects_partial_word_but_substring_accepts() {
        assert_eq!(tier_for("holas amigo", "hola"), Some(MatchTier::Substring));
        assert!(!contains_whole_word("holas amigo", "hola"));
        assert!(contains_whole_word("dije hola amigo", "hola"));
    }

    #[test]
    fn substring_tier_used_only_when_no_keyword_matches_better() {
        let flows = vec![flow("hola", "greeting")];
        let m = match_flow("holas", &flows).expect("substring should match");
        assert_eq!(m.tier, MatchTier::Substring);
    }

    #[test]
    fn tiers_are_ordered_per_keyword_not_across_keywords() {
        // First keyword only matches as a substring; it still wins over a
        // later keyword that would match exactly.
        let flows = vec![flow("info, informacion", "info")];
        let m = match_flow("informacion", &flows).unwrap();
        assert_eq!(m.keyword, "info");
        assert_eq!(m.tier, MatchTier::Substring);
    }

    #[test]
    fn multi_word_keyword_matches_on_boundaries() {
        let flows = vec![flow("buenos dias", "morning")];
        let m = match_flow("Hola, buenos días!", &flows).unwrap();
        assert_eq!(m.tier, MatchTier::WholeWord);
    }

    #[test]
    fn empty_keywords_are_skipped() {
        let flows = vec![flow(" , ,", "never"), flow("horario", "hours")];
        let m = match_flow("horario", &flows).unwrap();
        assert_eq!(m.index, 1);
    }

    #[test]
    fn no_match_returns_none() {
        let flows = vec![flow("precio", "p"), flow("horario", "h")];
        assert!(match_flow("quiero hablar con alguien", &flows).is_none());
        assert!(match_flow("", &flows).is_none());
        assert!(match_flow("hola", &[]).is_none());
    }

    #[test]
    fn later_occurrence_can_satisfy_whole_word() {
        assert!(contains_whole_word("holas y hola", "hola"));
        assert!(contains_whole_word("ba a a", "a a"));
    }
}

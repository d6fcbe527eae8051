use crate::models::{Context, SearchResult};

pub const DEFAULT_MAX_CONTEXT_CHARS: usize = 4_000;

const SEPARATOR: &str = "\n";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContextAssembler {
    pub max_chars: usize,
}

impl Default for ContextAssembler {
    fn default() -> Self {
        Self {
            max_chars: DEFAULT_MAX_CONTEXT_CHARS,
        }
    }
}

impl ContextAssembler {
    pub fn new(max_chars: usize) -> Self {
        Self { max_chars }
    }

    /// Joins results in rank order, keeping the longest prefix that fits.
    ///
    /// Once a result does not fit, it and every lower-ranked result are
    /// dropped. If not even the top result fits, it is cut at the limit so
    /// the context still carries the most relevant text.
    pub fn assemble(&self, results: &[SearchResult]) -> Context {
        let mut text = String::new();
        let mut used = 0usize;
        let mut included = 0usize;

        for result in results {
            let entry = format_result(result);
            let entry_len = entry.chars().count();
            let separator_len = if included == 0 { 0 } else { SEPARATOR.len() };

            if used + separator_len + entry_len > self.max_chars {
                break;
            }

            if included > 0 {
                text.push_str(SEPARATOR);
            }
            text.push_str(&entry);
            used += separator_len + entry_len;
            included += 1;
        }

        if included == 0 && self.max_chars > 0 {
            if let Some(first) = results.first() {
                text = truncate_chars(&format_result(first), self.max_chars).to_string();
                included = 1;
            }
        }

        Context {
            text,
            included,
            dropped: results.len() - included,
        }
    }
}

fn format_result(result: &SearchResult) -> String {
    format!("**{}**\n{}\n{}\n", result.title, result.snippet, result.link)
}

fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_index, _)) => &text[..byte_index],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(rank: usize) -> SearchResult {
        SearchResult {
            title: format!("Result {rank}"),
            snippet: format!("snippet number {rank}"),
            link: format!("https://example.com/{rank}"),
        }
    }

    #[test]
    fn layout_keeps_rank_order() {
        let context = ContextAssembler::default().assemble(&[result(1), result(2)]);
        assert_eq!(
            context.text,
            "**Result 1**\nsnippet number 1\nhttps://example.com/1\n\n\
             **Result 2**\nsnippet number 2\nhttps://example.com/2\n"
        );
        assert_eq!(context.included, 2);
        assert_eq!(context.dropped, 0);
    }

    #[test]
    fn lowest_ranked_results_are_dropped_first() {
        let results: Vec<_> = (1..=6).map(result).collect();
        let one_entry = format_result(&results[0]).chars().count();
        let assembler = ContextAssembler::new(one_entry * 3 + 2);

        let context = assembler.assemble(&results);
        assert_eq!(context.included, 3);
        assert_eq!(context.dropped, 3);
        assert!(context.text.starts_with("**Result 1**"));
        assert!(context.text.contains("**Result 3**"));
        assert!(!context.text.contains("**Result 4**"));
        assert!(context.char_len() <= assembler.max_chars);
    }

    #[test]
    fn assembly_is_deterministic_and_bounded() {
        let results: Vec<_> = (1..=10).map(result).collect();
        for max_chars in [0, 7, 40, 120, 500, 10_000] {
            let assembler = ContextAssembler::new(max_chars);
            let first = assembler.assemble(&results);
            let second = assembler.assemble(&results);
            assert_eq!(first, second);
            assert!(first.char_len() <= max_chars);
        }
    }

    #[test]
    fn oversized_top_result_is_cut_at_a_char_boundary() {
        let wide = SearchResult {
            title: "Café Ünïcode".to_string(),
            snippet: "ééééééééééééééééééééé".to_string(),
            link: "https://example.com".to_string(),
        };
        let context = ContextAssembler::new(10).assemble(&[wide, result(2)]);
        assert_eq!(context.char_len(), 10);
        assert_eq!(context.included, 1);
        assert_eq!(context.dropped, 1);
    }

    #[test]
    fn no_results_yield_an_empty_context() {
        let context = ContextAssembler::default().assemble(&[]);
        assert!(context.is_empty());
        assert_eq!(context.included, 0);
    }
}

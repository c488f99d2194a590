//! Reading-time estimate for post bodies.
//!
//! CJK ideographs and alphanumeric words are counted separately because they
//! are read at very different rates.

use std::sync::LazyLock;

use regex::Regex;

use crate::config::ContentOptions;

static WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[A-Za-z0-9_]+").expect("valid regex"));

fn is_cjk(c: char) -> bool {
    ('\u{4E00}'..='\u{9FA5}').contains(&c)
}

/// Counts feeding the estimate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TextStats {
    pub cjk_chars: usize,
    pub words: usize,
}

impl TextStats {
    pub fn of(text: &str) -> Self {
        let cjk_chars = text.chars().filter(|&c| is_cjk(c)).count();
        let rest: String = text.chars().filter(|&c| !is_cjk(c)).collect();
        Self {
            cjk_chars,
            words: WORD.find_iter(&rest).count(),
        }
    }
}

/// Estimated reading time in whole minutes, with the default rates.
pub fn estimate(text: &str) -> u32 {
    estimate_with(text, &ContentOptions::default())
}

/// Estimated reading time in whole minutes; never less than one.
pub fn estimate_with(text: &str, options: &ContentOptions) -> u32 {
    let stats = TextStats::of(text);
    let minutes = stats.cjk_chars as f64 / f64::from(options.cjk_chars_per_minute.max(1))
        + stats.words as f64 / f64::from(options.words_per_minute.max(1));
    (minutes.ceil() as u32).max(1)
}

use crate::types::{Annotations, Link, RichText, TextRun};

/// Maximum length of one text run's content, in Unicode code points.
pub const TEXT_RUN_LIMIT: usize = 2000;

pub(crate) struct RunOptions<'a> {
    pub annotations: &'a Annotations,
    pub link: Option<&'a Link>,
    pub preserve_whitespace: bool,
}

/// Turns plain text plus accumulated style facts into zero or more bounded
/// text runs. Empty content produces no runs at all, which is what lets the
/// converter's trimming drop whitespace-only segments cleanly.
pub(crate) fn build_rich_text(text: &str, options: RunOptions<'_>) -> Vec<RichText> {
    if text.is_empty() {
        return Vec::new();
    }
    let content = if options.preserve_whitespace {
        text.to_string()
    } else {
        if text.trim().is_empty() {
            return Vec::new();
        }
        collapse_whitespace(text)
    };
    let annotations = (!options.annotations.is_empty()).then(|| *options.annotations);
    chunk_by_code_points(&content, TEXT_RUN_LIMIT)
        .into_iter()
        .map(|content| {
            RichText::Text(TextRun {
                content,
                link: options.link.cloned(),
                annotations,
            })
        })
        .collect()
}

/// Collapses every whitespace run, embedded newlines included, to one space.
fn collapse_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut last_space = false;
    for ch in text.chars() {
        if ch.is_whitespace() {
            if !last_space {
                out.push(' ');
            }
            last_space = true;
        } else {
            out.push(ch);
            last_space = false;
        }
    }
    out
}

/// Splits at `char` boundaries, so a multi-code-unit character never straddles
/// two chunks.
fn chunk_by_code_points(text: &str, limit: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut count = 0;
    for ch in text.chars() {
        if count == limit {
            chunks.push(std::mem::take(&mut current));
            count = 0;
        }
        current.push(ch);
        count += 1;
    }
    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

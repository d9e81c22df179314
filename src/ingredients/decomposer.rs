use std::sync::LazyLock;

use log::debug;
use regex::Regex;

use crate::model::{ParsedIngredientComponent, ParsedIngredientResult};

static LABEL_PREFIX_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*ingredients?\s*:\s*").expect("Invalid label prefix regex")
});

static PERCENT_ANNOTATION_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)[(\[]\s*(?:[<>≤≥]|less than|under)?\s*\d+(?:\.\d+)?\s*%(?:\s+or\s+less)?\s*[)\]]")
        .expect("Invalid percentage annotation regex")
});

static LESS_THAN_PHRASE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(?:\bcontains\s+)?(?:[<≤]\s*)?\d+(?:\.\d+)?\s*%\s+or\s+less\s+of\s*:?|\bless\s+than\s+\d+(?:\.\d+)?\s*%\s+of\s*:?",
    )
    .expect("Invalid less-than phrase regex")
});

static CONJUNCTION_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:and/or|and|or)\s+|\s+(?:and/or|or)$")
        .expect("Invalid conjunction regex")
});

static WHITESPACE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("Invalid whitespace regex"));

const FOOTNOTE_MARKERS: &[char] = &['*', '†', '‡'];

/// Splits on commas outside any parentheses or brackets.
///
/// Tokens are returned untrimmed and empty tokens are kept, so joining the
/// result with `","` gives back the input.
pub fn split_top_level(text: &str) -> Vec<&str> {
    let mut tokens = Vec::new();
    let mut depth: usize = 0;
    let mut start = 0;

    for (idx, c) in text.char_indices() {
        match c {
            '(' | '[' => depth += 1,
            ')' | ']' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                tokens.push(&text[start..idx]);
                start = idx + 1;
            }
            _ => {}
        }
    }
    tokens.push(&text[start..]);
    tokens
}

/// Strips label noise from a component name.
pub fn clean_name(name: &str) -> String {
    let cleaned = PERCENT_ANNOTATION_REGEX.replace_all(name, " ");
    let cleaned = LESS_THAN_PHRASE_REGEX.replace_all(&cleaned, " ");
    let cleaned = cleaned.replace(FOOTNOTE_MARKERS, "");
    let mut cleaned = WHITESPACE_REGEX
        .replace_all(cleaned.trim(), " ")
        .into_owned();

    // "and/or" can be left dangling on either side once a list is split
    loop {
        let next = CONJUNCTION_REGEX.replace_all(&cleaned, "").trim().to_string();
        let next = next
            .trim_end_matches(['.', ':', ';'])
            .trim()
            .to_string();
        if next == cleaned {
            break;
        }
        cleaned = next;
    }
    cleaned
}

/// Byte index of the `)` or `]` closing the bracket opened at `open`.
fn matching_close(text: &str, open: usize) -> Option<usize> {
    let mut depth: usize = 0;
    for (idx, c) in text[open..].char_indices() {
        match c {
            '(' | '[' => depth += 1,
            ')' | ']' => {
                depth -= 1;
                if depth == 0 {
                    return Some(open + idx);
                }
            }
            _ => {}
        }
    }
    None
}

/// Splits `name (sublist)` into its two parts. Anything else is a leaf.
fn split_sublist(token: &str) -> Option<(&str, &str)> {
    let open = token.find(['(', '['])?;
    let close = matching_close(token, open)?;
    let trailing = token[close + 1..]
        .trim_matches(|c: char| c.is_whitespace() || c == '.' || FOOTNOTE_MARKERS.contains(&c));
    if !trailing.is_empty() {
        return None;
    }
    let name = token[..open].trim();
    let inner = token[open + 1..close].trim();
    if name.is_empty() || inner.is_empty() {
        return None;
    }
    Some((name, inner))
}

fn decompose_list(text: &str, is_parenthetical: bool) -> Vec<ParsedIngredientComponent> {
    let mut components = Vec::new();

    for token in split_top_level(text) {
        // percentage annotations look like a sublist, drop them first
        let token = PERCENT_ANNOTATION_REGEX.replace_all(token, " ");
        let token = token.trim();
        if token.is_empty() {
            continue;
        }

        let (name, sub_components) = match split_sublist(token) {
            Some((name, inner)) => {
                let children = decompose_list(inner, true);
                (clean_name(name), (!children.is_empty()).then_some(children))
            }
            None => (clean_name(token), None),
        };
        if name.is_empty() {
            // "Contains 2% or less of: (Salt, Yeast)" style wrappers
            if let Some(children) = sub_components {
                for mut child in children {
                    child.order_index = components.len() as i32;
                    child.is_parenthetical = is_parenthetical;
                    components.push(child);
                }
            }
            continue;
        }

        components.push(ParsedIngredientComponent {
            name,
            order_index: components.len() as i32,
            is_parenthetical,
            sub_components,
            ..Default::default()
        });
    }
    components
}

/// Decomposes an ingredient label into an ordered component tree.
///
/// Nothing is resolved yet; see
/// [`EntityResolver::decompose`](super::EntityResolver::decompose).
pub fn decompose(label: &str) -> ParsedIngredientResult {
    let body = LABEL_PREFIX_REGEX.replace(label.trim(), "");
    let body = body.trim().trim_end_matches('.');
    let components = decompose_list(body, false);
    debug!(
        "Decomposed label into {} top-level components",
        components.len()
    );

    ParsedIngredientResult {
        original_string: label.to_string(),
        components,
    }
}

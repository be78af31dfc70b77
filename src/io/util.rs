use crate::model::types::Element;
use std::ops::Range;

/// Resolves an element symbol as written in a structure file.
///
/// Symbols are matched case-insensitively; the hydrogen isotopes `D` and `T`
/// resolve to hydrogen. Query atoms (`A`, `Q`, `*`, `R#`, ...) yield `None`.
pub fn element_from_symbol(token: &str) -> Option<Element> {
    let token = token.trim();
    match token {
        "D" | "T" => return Some(Element::H),
        "" => return None,
        _ => {}
    }

    let mut chars = token.chars();
    let first = chars.next()?.to_ascii_uppercase();
    let normalized: String = std::iter::once(first)
        .chain(chars.map(|c| c.to_ascii_lowercase()))
        .collect();
    normalized.parse().ok()
}

/// Returns the trimmed contents of a fixed-width column, or `None` when the
/// line is too short or the column is blank.
pub fn column(line: &str, range: Range<usize>) -> Option<&str> {
    if range.start >= line.len() {
        return None;
    }
    let end = range.end.min(line.len());
    let field = line.get(range.start..end)?.trim();
    (!field.is_empty()).then_some(field)
}

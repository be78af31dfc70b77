pub fn wrap(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        if current.is_empty() {
            current = word.to_string();
        } else if current.chars().count() + 1 + word.chars().count() <= width {
            current.push(' ');
            current.push_str(word);
        } else {
            lines.push(current);
            current = word.to_string();
        }
    }

    if !current.is_empty() {
        lines.push(current);
    }

    if lines.is_empty() {
        lines.push(String::new());
    }

    lines
}

pub fn truncate(s: &str, max_len: usize) -> String {
    match max_len {
        0 => return String::new(),
        1 => return "…".to_string(),
        _ => {}
    }

    if s.char_indices().nth(max_len).is_none() {
        return s.to_string();
    }

    let cut = s
        .char_indices()
        .nth(max_len - 1)
        .map(|(idx, _)| idx)
        .unwrap_or(0);
    format!("{}…", &s[..cut])
}

/// Renders a target row as `[a, b, …]`, eliding entries past `max_items`.
pub fn format_values(values: &[f32], max_items: usize) -> String {
    let shown: Vec<String> = values
        .iter()
        .take(max_items)
        .map(|v| format!("{v:.3}"))
        .collect();
    let more = if values.len() > max_items { ", …" } else { "" };
    format!("[{}{more}]", shown.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrap_short_text() {
        assert_eq!(wrap("Eye disorders", 20), vec!["Eye disorders"]);
    }

    #[test]
    fn wrap_long_label() {
        let result = wrap("Neoplasms benign, malignant and unspecified", 20);
        assert_eq!(result, vec!["Neoplasms benign,", "malignant and", "unspecified"]);
    }

    #[test]
    fn truncate_keeps_short_strings() {
        assert_eq!(truncate("CCO", 10), "CCO");
        assert_eq!(truncate("CCO", 3), "CCO");
    }

    #[test]
    fn truncate_long_smiles() {
        assert_eq!(truncate("c1ccccc1CCO", 8), "c1ccccc…");
    }

    #[test]
    fn truncate_unicode() {
        assert_eq!(truncate("αβγδεζ", 4), "αβγ…");
    }

    #[test]
    fn values_are_elided() {
        assert_eq!(format_values(&[1.0, 0.5], 4), "[1.000, 0.500]");
        assert_eq!(format_values(&[1.0, 0.0, 1.0], 2), "[1.000, 0.000, …]");
        assert_eq!(format_values(&[], 2), "[]");
    }
}

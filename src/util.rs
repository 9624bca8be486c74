//! Shared utility functions

/// Shorten a label to at most `max_chars` characters, ending in "..." when cut.
pub fn truncate_str(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        return s.to_string();
    }
    let suffix = "...";
    let keep = max_chars.saturating_sub(suffix.len());
    let mut out: String = s.chars().take(keep).collect();
    out.push_str(suffix);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_labels_are_unchanged() {
        assert_eq!(truncate_str("Engineer", 8), "Engineer");
        assert_eq!(truncate_str("", 3), "");
    }

    #[test]
    fn long_labels_are_cut_on_char_boundaries() {
        assert_eq!(truncate_str("Data Engineer", 7), "Data...");
        assert_eq!(truncate_str("Ingénieur logiciel", 6), "Ing...");
    }

    #[test]
    fn tiny_limits_keep_only_suffix() {
        assert_eq!(truncate_str("Manager", 3), "...");
    }
}

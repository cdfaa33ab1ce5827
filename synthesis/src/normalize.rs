//! Turns a raw oracle listing into clean topic or concept names.

/// Splits `raw` into lines, trims them, strips list decoration and drops
/// what is left empty. Applying it to its own joined output is a no-op.
pub fn split_names(raw: &str) -> Vec<String> {
    raw.lines()
        .map(clean_line)
        .filter(|name| !name.is_empty())
        .collect()
}

fn clean_line(line: &str) -> String {
    let mut current = line.trim();
    loop {
        let next = strip_once(current).trim();
        if next == current {
            return current.to_string();
        }
        current = next;
    }
}

fn strip_once(s: &str) -> &str {
    if let Some(inner) = s.strip_prefix("**").and_then(|r| r.strip_suffix("**")) {
        return inner;
    }
    strip_bullet(s).or_else(|| strip_ordinal(s)).unwrap_or(s)
}

fn strip_bullet(s: &str) -> Option<&str> {
    ['-', '*', '•']
        .into_iter()
        .find_map(|marker| s.strip_prefix(marker))
        .filter(|rest| ends_marker(rest))
}

// "1." or "12)" followed by whitespace; "3.5 billion" is left alone.
fn strip_ordinal(s: &str) -> Option<&str> {
    let digits = s.len() - s.trim_start_matches(|c: char| c.is_ascii_digit()).len();
    if digits == 0 {
        return None;
    }
    let rest = &s[digits..];
    rest.strip_prefix('.')
        .or_else(|| rest.strip_prefix(')'))
        .filter(|rest| ends_marker(rest))
}

fn ends_marker(rest: &str) -> bool {
    rest.is_empty() || rest.starts_with(char::is_whitespace)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_split_trims_and_drops_blank_lines() {
        let raw = "  Photosynthesis  \n\n\t\nCellular Respiration\r\n   ";
        assert_eq!(
            split_names(raw),
            vec!["Photosynthesis".to_string(), "Cellular Respiration".to_string()]
        );
    }

    #[test]
    fn test_split_strips_list_markers() {
        let raw = "1. Light Reactions\n2) Calvin Cycle\n- Chlorophyll\n* Stomata\n• Glucose\n**Water**";
        assert_eq!(
            split_names(raw),
            vec![
                "Light Reactions",
                "Calvin Cycle",
                "Chlorophyll",
                "Stomata",
                "Glucose",
                "Water"
            ]
        );
    }

    #[test]
    fn test_split_keeps_meaningful_leading_tokens() {
        let raw = "3.5 billion years of evolution\n-based reasoning\n2024 results";
        assert_eq!(
            split_names(raw),
            vec!["3.5 billion years of evolution", "-based reasoning", "2024 results"]
        );
    }

    #[test]
    fn test_marker_only_lines_are_dropped() {
        assert!(split_names("-\n* \n1.\n  •  ").is_empty());
        assert!(split_names("").is_empty());
    }

    proptest! {
        #[test]
        fn test_split_is_idempotent(raw in "[ \\t\\-*•0-9.)a-zA-Z\\n]{0,120}") {
            let once = split_names(&raw);
            let twice = split_names(&once.join("\n"));
            prop_assert_eq!(&once, &twice);
            prop_assert_eq!(once, split_names(&raw));
        }

        #[test]
        fn test_split_never_yields_blank_names(raw in "\\PC*") {
            for name in split_names(&raw) {
                prop_assert!(!name.trim().is_empty());
                prop_assert_eq!(name.trim(), name.as_str());
            }
        }
    }
}

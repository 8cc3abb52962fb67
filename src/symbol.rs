//! Ticker symbol normalization shared by the hydrator and the API client.

/// Uppercase the symbol and strip anything that is not ASCII alphanumeric,
/// `.` or `-`, so `brk.b` and ` BRK.B ` both map to `BRK.B`.
pub fn normalize_symbol(raw: &str) -> String {
    raw.chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-'))
        .map(|c| c.to_ascii_uppercase())
        .collect()
}

/// Normalize a requested symbol list, drop empties, de-duplicate while
/// preserving first-seen order, and truncate to `cap` entries.
pub fn prepare_batch<S: AsRef<str>>(requested: &[S], cap: usize) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    let mut batch = Vec::new();

    for raw in requested {
        let symbol = normalize_symbol(raw.as_ref());
        if symbol.is_empty() {
            continue;
        }
        if seen.insert(symbol.clone()) {
            batch.push(symbol);
        }
        if batch.len() == cap {
            break;
        }
    }

    batch
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_case_and_whitespace() {
        assert_eq!(normalize_symbol(" spy "), "SPY");
        assert_eq!(normalize_symbol("brk.b"), "BRK.B");
        assert_eq!(normalize_symbol("qq q!!"), "QQQ");
    }

    #[test]
    fn dedupes_case_variants() {
        let batch = prepare_batch(&["spy", "SPY", " Spy "], 10);
        assert_eq!(batch, vec!["SPY".to_string()]);
    }

    #[test]
    fn skips_entries_that_normalize_to_empty() {
        let batch = prepare_batch(&["  ", "!!", "tsla"], 10);
        assert_eq!(batch, vec!["TSLA".to_string()]);
    }

    #[test]
    fn truncates_to_cap() {
        let requested: Vec<String> = (0..25).map(|i| format!("SYM{i}")).collect();
        let batch = prepare_batch(&requested, 10);
        assert_eq!(batch.len(), 10);
        assert_eq!(batch[0], "SYM0");
        assert_eq!(batch[9], "SYM9");
    }
}

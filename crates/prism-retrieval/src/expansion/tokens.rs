//! Query tokenization for ontology lookups.

/// Words too common to be worth a catalog search.
const STOPWORDS: &[&str] = &[
    "about", "after", "all", "and", "any", "are", "before", "between", "but", "can", "does",
    "during", "for", "from", "has", "have", "how", "into", "its", "not", "off", "once", "only",
    "other", "over", "should", "than", "that", "the", "their", "them", "then", "there", "these",
    "they", "this", "those", "through", "under", "use", "used", "versus", "vs", "was", "were",
    "what", "when", "where", "which", "while", "who", "why", "will", "with", "within", "without",
];

const MIN_CONTENT_TOKEN_CHARS: usize = 3;

/// How a query token is looked up in the concept catalog.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TokenLookup {
    /// Structured identifier (trial registry ID), upper-cased.
    Identifier(String),
    /// Free-text content word, lower-cased.
    Content(String),
}

/// Split on whitespace and punctuation, keeping inner hyphens.
pub fn tokenize(query: &str) -> Vec<String> {
    query
        .split(|c: char| !(c.is_alphanumeric() || c == '-'))
        .map(|t| t.trim_matches('-'))
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

/// Distinct catalog lookups for `query`, in first-seen order.
pub fn lookups(query: &str) -> Vec<TokenLookup> {
    let mut out: Vec<TokenLookup> = Vec::new();
    for token in tokenize(query) {
        if let Some(lookup) = classify(&token) {
            if !out.contains(&lookup) {
                out.push(lookup);
            }
        }
    }
    out
}

pub fn classify(token: &str) -> Option<TokenLookup> {
    let upper = token.to_ascii_uppercase();
    if is_identifier(&upper) {
        return Some(TokenLookup::Identifier(upper));
    }
    let lower = token.to_lowercase();
    if lower.chars().count() < MIN_CONTENT_TOKEN_CHARS
        || lower.chars().all(|c| c.is_ascii_digit() || c == '-')
        || STOPWORDS.contains(&lower.as_str())
    {
        return None;
    }
    Some(TokenLookup::Content(lower))
}

/// `NCT########`, `ISRCTN########`, or EudraCT `YYYY-NNNNNN-NN`.
pub fn is_identifier(token: &str) -> bool {
    if let Some(rest) = token.strip_prefix("NCT") {
        return is_digits(rest, 8);
    }
    if let Some(rest) = token.strip_prefix("ISRCTN") {
        return is_digits(rest, 8);
    }
    let parts: Vec<&str> = token.split('-').collect();
    matches!(parts.as_slice(), [year, serial, check]
        if is_digits(year, 4) && is_digits(serial, 6) && is_digits(check, 2))
}

fn is_digits(s: &str, len: usize) -> bool {
    s.len() == len && s.bytes().all(|b| b.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokenize_keeps_hyphens_and_drops_punctuation() {
        assert_eq!(
            tokenize("PD-1 blockade, (NCT01234567)?"),
            vec!["PD-1", "blockade", "NCT01234567"]
        );
        assert_eq!(tokenize("  --  "), Vec::<String>::new());
    }

    #[test]
    fn identifiers_are_recognized() {
        assert!(is_identifier("NCT01234567"));
        assert!(is_identifier("ISRCTN12345678"));
        assert!(is_identifier("2015-001234-56"));
        assert!(!is_identifier("NCT0123"));
        assert!(!is_identifier("2015-1234-56"));
    }

    #[test]
    fn lookups_classify_and_dedupe() {
        let got = lookups("nct01234567 and Pembrolizumab pembrolizumab of 2020");
        assert_eq!(
            got,
            vec![
                TokenLookup::Identifier("NCT01234567".into()),
                TokenLookup::Content("pembrolizumab".into()),
            ]
        );
    }
}

/// Returns true when `value` can be used as a graph tag, relation kind or
/// index name: non-empty, alphanumeric or underscore only, and not starting
/// with a digit.
pub fn is_valid_identifier(value: &str) -> bool {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) if first.is_alphabetic() || first == '_' => {
            chars.all(|c| c.is_alphanumeric() || c == '_')
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_plain_identifiers() {
        assert!(is_valid_identifier("Chunk"));
        assert!(is_valid_identifier("Dbo_Organisation"));
        assert!(is_valid_identifier("_private"));
        assert!(is_valid_identifier("chunk_embedding_index"));
    }

    #[test]
    fn rejects_injection_and_empty() {
        assert!(!is_valid_identifier(""));
        assert!(!is_valid_identifier("1abc"));
        assert!(!is_valid_identifier("Person`) DETACH DELETE n //"));
        assert!(!is_valid_identifier("with space"));
        assert!(!is_valid_identifier("semi;colon"));
    }
}

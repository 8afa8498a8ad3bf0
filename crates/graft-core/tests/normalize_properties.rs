//! Property tests for identifier normalization

use graft_config::is_valid_identifier;
use graft_core::{normalize_id, Label, LabelOverrides, RelationKind};
use proptest::prelude::*;

proptest! {
    #[test]
    fn normalize_id_is_idempotent(raw in "[ -~À-ÿ\\t]{0,40}") {
        let once = normalize_id(&raw);
        prop_assert_eq!(normalize_id(&once), once.clone());
    }

    #[test]
    fn normalize_id_ignores_spacing_and_case(words in prop::collection::vec("[a-zA-Z0-9]{1,8}", 1..5)) {
        let spaced = words.join("  ");
        let snake = words.join("_").to_lowercase();
        prop_assert_eq!(normalize_id(&spaced), snake.clone());
        prop_assert_eq!(normalize_id(&format!(" {} ", spaced.to_uppercase())), snake);
    }

    #[test]
    fn normalized_ids_have_no_whitespace(raw in "[ -~À-ÿ\\t]{0,40}") {
        prop_assert!(!normalize_id(&raw).chars().any(char::is_whitespace));
    }

    #[test]
    fn labels_are_always_identifiers(raw in "[ -~À-ÿ]{0,30}") {
        let label = Label::from_raw(&raw, &LabelOverrides::default());
        prop_assert!(is_valid_identifier(label.as_str()), "{:?} -> {:?}", raw, label);
    }

    #[test]
    fn relation_kinds_are_upper_identifiers(raw in "[ -~]{0,30}") {
        let kind = RelationKind::from_raw(&raw);
        prop_assert!(is_valid_identifier(kind.as_str()));
        prop_assert_eq!(kind.as_str().to_uppercase(), kind.as_str());
    }
}

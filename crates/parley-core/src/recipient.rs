//! Recipient resolution: free-form recipient strings to `RecipientRef`s.
//!
//! Unknown names resolve fine. Whether anyone is listening on them is a
//! fan-out concern, not a parsing one.

use parley_types::message::RecipientRef;

/// Parse a comma-separated recipient list.
///
/// Tokens are trimmed and blanks dropped. Order and duplicates are preserved.
/// `None` or an empty string yields an empty list.
pub fn resolve(raw: Option<&str>) -> Vec<RecipientRef> {
    let Some(raw) = raw else {
        return Vec::new();
    };

    raw.split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(RecipientRef::from_token)
        .collect()
}

/// Join recipients back into a comma-separated string.
///
/// Lossy with respect to the original input: whitespace and blank tokens are
/// not restored.
pub fn format(recipients: &[RecipientRef]) -> String {
    recipients
        .iter()
        .map(|r| r.name().trim())
        .collect::<Vec<_>>()
        .join(",")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(refs: &[RecipientRef]) -> Vec<&str> {
        refs.iter().map(RecipientRef::name).collect()
    }

    #[test]
    fn empty_and_missing_input_yield_nothing() {
        assert!(resolve(Some("")).is_empty());
        assert!(resolve(None).is_empty());
        assert!(resolve(Some(" , ,\t,")).is_empty());
    }

    #[test]
    fn trims_and_drops_blank_tokens() {
        let refs = resolve(Some(" general , ,robot,  "));
        assert_eq!(names(&refs), vec!["general", "robot"]);
    }

    #[test]
    fn preserves_order_and_duplicates() {
        let refs = resolve(Some("robot,general,robot"));
        assert_eq!(names(&refs), vec!["robot", "general", "robot"]);
    }

    #[test]
    fn count_matches_non_blank_tokens() {
        let inputs = ["a,b,c", ",,a", "a, ,b,", " ", "@x,y,,@z", "solo"];
        for input in inputs {
            let expected = input.split(',').filter(|t| !t.trim().is_empty()).count();
            let refs = resolve(Some(input));
            assert_eq!(refs.len(), expected, "input {input:?}");
            assert!(refs.iter().all(|r| !r.name().is_empty()));
        }
    }

    #[test]
    fn classifies_users_and_channels() {
        let refs = resolve(Some("general,@bob"));
        assert!(refs[0].is_channel());
        assert!(matches!(&refs[1], RecipientRef::User { handle } if handle == "@bob"));
    }

    #[test]
    fn unknown_names_are_still_recipients() {
        let refs = resolve(Some("no-such-channel"));
        assert_eq!(names(&refs), vec!["no-such-channel"]);
    }

    #[test]
    fn format_joins_normalized_names() {
        let refs = resolve(Some("  general ,, @bob "));
        assert_eq!(format(&refs), "general,@bob");
        assert_eq!(format(&[]), "");
    }
}

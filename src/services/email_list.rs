//! Permissive parsing of the textual email-list field.
//!
//! The form submits one text field expected to hold a literal list such as
//! `["a@x.com", "b@y.com"]`. Anything that does not parse as a list silently
//! becomes the empty list; this is an internal textual convention, not an
//! email-format check.

use serde_json::Value;

/// Parse a literal-list-like string into trimmed element strings.
/// Non-list or unparsable input yields `[]`.
pub fn parse_email_list(input: &str) -> Vec<String> {
    match parse_literal_list(input) {
        Some(items) => items,
        None => Vec::new(),
    }
}

fn parse_literal_list(input: &str) -> Option<Vec<String>> {
    let parsed = serde_json::from_str::<Value>(input)
        .ok()
        // The original UI wrote lists with single quotes; retry with them
        // normalized, but only when the input carries no double quotes of
        // its own.
        .or_else(|| {
            if input.contains('"') {
                None
            } else {
                serde_json::from_str::<Value>(&input.replace('\'', "\"")).ok()
            }
        })?;

    let items = match parsed {
        Value::Array(items) => items,
        _ => return None,
    };

    Some(items.iter().map(stringify_element).collect())
}

fn stringify_element(value: &Value) -> String {
    match value {
        Value::String(s) => s.trim().to_string(),
        other => other.to_string().trim().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_double_quoted_list() {
        assert_eq!(
            parse_email_list(r#"["a@x.com", "b@y.com"]"#),
            vec!["a@x.com", "b@y.com"]
        );
    }

    #[test]
    fn parses_single_quoted_list() {
        assert_eq!(
            parse_email_list("['a@x.com', 'b@y.com']"),
            vec!["a@x.com", "b@y.com"]
        );
    }

    #[test]
    fn non_list_input_yields_empty() {
        assert_eq!(parse_email_list("not a list"), Vec::<String>::new());
    }

    #[test]
    fn empty_input_yields_empty() {
        assert_eq!(parse_email_list(""), Vec::<String>::new());
    }

    #[test]
    fn scalar_json_yields_empty() {
        assert_eq!(parse_email_list("\"a@x.com\""), Vec::<String>::new());
        assert_eq!(parse_email_list("42"), Vec::<String>::new());
    }

    #[test]
    fn elements_are_trimmed() {
        assert_eq!(
            parse_email_list(r#"["  a@x.com  ", "b@y.com "]"#),
            vec!["a@x.com", "b@y.com"]
        );
    }

    #[test]
    fn non_string_elements_are_stringified() {
        assert_eq!(parse_email_list("[1, 2]"), vec!["1", "2"]);
    }

    #[test]
    fn no_email_syntax_validation_happens() {
        assert_eq!(
            parse_email_list(r#"["definitely not an email"]"#),
            vec!["definitely not an email"]
        );
    }
}

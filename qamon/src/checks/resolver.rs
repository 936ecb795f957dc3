//! Endpoint placeholder substitution.

use std::collections::HashMap;

/// Replace `{name}` placeholders in `template` with values from `placeholders`.
///
/// Placeholders missing from the mapping are copied through unchanged. The
/// scan is single-pass, so substituted values are never expanded again.
pub fn fill_placeholders(template: &str, placeholders: &HashMap<String, String>) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after_open = &rest[open + 1..];

        let Some(close) = after_open.find('}') else {
            out.push_str(&rest[open..]);
            return out;
        };

        let name = &after_open[..close];
        if name.contains('{') {
            // `{a{b}`: only the inner brace can start a placeholder
            out.push('{');
            rest = after_open;
            continue;
        }

        match placeholders.get(name) {
            Some(value) => out.push_str(value),
            None => {
                out.push('{');
                out.push_str(name);
                out.push('}');
            }
        }
        rest = &after_open[close + 1..];
    }

    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn map(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_fill_single_placeholder() {
        let placeholders = map(&[("user_id", "123")]);
        assert_eq!(
            fill_placeholders("/users/{user_id}", &placeholders),
            "/users/123"
        );
    }

    #[test]
    fn test_missing_placeholder_passes_through() {
        assert_eq!(
            fill_placeholders("/x/{missing}", &HashMap::new()),
            "/x/{missing}"
        );
    }

    #[test]
    fn test_multiple_and_repeated_placeholders() {
        let placeholders = map(&[("user_id", "1"), ("image_id", "9")]);
        assert_eq!(
            fill_placeholders("/u/{user_id}/img/{image_id}/{user_id}", &placeholders),
            "/u/1/img/9/1"
        );
    }

    #[test]
    fn test_values_are_not_expanded_again() {
        let placeholders = map(&[("a", "{b}"), ("b", "nope")]);
        assert_eq!(fill_placeholders("/{a}", &placeholders), "/{b}");
    }

    #[test]
    fn test_unbalanced_braces() {
        let placeholders = map(&[("b", "2")]);
        assert_eq!(fill_placeholders("/x/{open", &placeholders), "/x/{open");
        assert_eq!(fill_placeholders("/x/{a{b}", &placeholders), "/x/{a2");
        assert_eq!(fill_placeholders("/x/}{b}", &placeholders), "/x/}2");
    }

    #[test]
    fn test_no_placeholders() {
        assert_eq!(fill_placeholders("/health", &HashMap::new()), "/health");
        assert_eq!(fill_placeholders("", &HashMap::new()), "");
    }

    proptest! {
        #[test]
        fn prop_brace_free_template_unchanged(template in "[a-z0-9/_.-]{0,40}") {
            let placeholders = map(&[("user_id", "123")]);
            prop_assert_eq!(fill_placeholders(&template, &placeholders), template);
        }

        #[test]
        fn prop_empty_mapping_is_identity(template in "[a-z/{}_]{0,40}") {
            prop_assert_eq!(fill_placeholders(&template, &HashMap::new()), template);
        }
    }
}

//! Qualified tool names
//!
//! Tools from different providers may share a local name, so the catalog
//! presented to the completion service uses `provider + SEPARATOR + tool`.
//! Provider names may not contain the separator, which makes splitting at
//! the first occurrence unambiguous. Tool names may contain it freely:
//! `github_create_issue` splits into `("github", "create_issue")`.

/// Reserved separator between provider name and local tool name
pub const SEPARATOR: char = '_';

/// Whether `name` can be used as a provider name
pub fn is_valid_provider_name(name: &str) -> bool {
    !name.is_empty() && !name.contains(SEPARATOR)
}

/// Build the qualified name for a provider's tool
pub fn join(provider: &str, tool: &str) -> String {
    format!("{}{}{}", provider, SEPARATOR, tool)
}

/// Split a qualified name into `(provider, tool)` at the first separator.
///
/// Returns `None` when the separator is absent.
pub fn split(qualified: &str) -> Option<(&str, &str)> {
    qualified.split_once(SEPARATOR)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_split_round_trip() {
        for (provider, tool) in [
            ("slack", "send_message"),
            ("a", "x"),
            ("github", "create_issue"),
            ("builtin", "get_current_time"),
        ] {
            let qualified = join(provider, tool);
            assert_eq!(split(&qualified), Some((provider, tool)));
        }
    }

    #[test]
    fn test_split_without_separator() {
        assert_eq!(split("calculate"), None);
    }

    #[test]
    fn test_split_edge_positions() {
        assert_eq!(split("_tool"), Some(("", "tool")));
        assert_eq!(split("provider_"), Some(("provider", "")));
    }

    #[test]
    fn test_provider_name_validity() {
        assert!(is_valid_provider_name("slack"));
        assert!(!is_valid_provider_name("google_maps"));
        assert!(!is_valid_provider_name(""));
    }
}

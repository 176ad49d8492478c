//! Committer → destination identity mapping.
//!
//! The mapping table is the ordered `svn.usermap` list from the config, one
//! `"name = email"` string per entry. Lookup is first-match-wins on a name
//! prefix; entries need not be unique.

use crate::types::Identity;

/// Split a `"name = email"` entry on its first `=`, trimming both halves.
///
/// Returns `None` for entries without `=` or with an empty name, which can
/// never match a committer.
pub fn parse_entry(entry: &str) -> Option<(&str, &str)> {
    let (name, email) = entry.split_once('=')?;
    let name = name.trim();
    if name.is_empty() {
        return None;
    }
    Some((name, email.trim()))
}

/// Resolve the destination identity for `committer`.
///
/// The first entry whose name is a prefix of `committer` supplies the email.
/// No match falls back to the committer name with an empty email.
pub fn resolve<S: AsRef<str>>(committer: &str, mapping: &[S]) -> Identity {
    let email = mapping
        .iter()
        .filter_map(|entry| parse_entry(entry.as_ref()))
        .find(|(name, _)| committer.starts_with(*name))
        .map(|(_, email)| email.to_string());

    match email {
        Some(email) => Identity {
            name: committer.to_string(),
            email,
        },
        None => {
            tracing::debug!(committer, "no usermap entry; using empty email");
            Identity {
                name: committer.to_string(),
                email: String::new(),
            }
        }
    }
}

/// Entries that [`parse_entry`] rejects; reported as warnings at config load.
pub fn malformed_entries<S: AsRef<str>>(mapping: &[S]) -> Vec<&str> {
    mapping
        .iter()
        .map(|e| e.as_ref())
        .filter(|e| parse_entry(e).is_none())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> Vec<String> {
        vec!["alice = alice@x.com".to_string(), "bob = bob@y.com".to_string()]
    }

    #[test]
    fn mapped_committer_gets_email() {
        let id = resolve("alice", &table());
        assert_eq!(
            id,
            Identity {
                name: "alice".to_string(),
                email: "alice@x.com".to_string()
            }
        );
    }

    #[test]
    fn unmapped_committer_falls_back_to_empty_email() {
        let id = resolve("carol", &table());
        assert_eq!(id.name, "carol");
        assert_eq!(id.email, "");
    }

    #[test]
    fn first_match_wins_on_duplicates() {
        let mapping = ["bob = first@y.com", "bob = second@y.com"];
        assert_eq!(resolve("bob", &mapping).email, "first@y.com");
    }

    #[test]
    fn entry_name_matches_as_prefix() {
        let mapping = ["ali = prefix@x.com", "alice = exact@x.com"];
        assert_eq!(resolve("alice", &mapping).email, "prefix@x.com");
    }

    #[test]
    fn splits_on_first_equals_only() {
        assert_eq!(parse_entry(" dave =  d=ave@z.org "), Some(("dave", "d=ave@z.org")));
    }

    #[test]
    fn malformed_entries_never_match() {
        let mapping = ["no-separator", " = orphan@x.com", "erin = erin@x.com"];
        assert_eq!(resolve("erin", &mapping).email, "erin@x.com");
        assert_eq!(malformed_entries(&mapping), vec!["no-separator", " = orphan@x.com"]);
    }

    #[test]
    fn empty_table_falls_back() {
        let mapping: [&str; 0] = [];
        assert_eq!(resolve("frank", &mapping).email, "");
    }
}

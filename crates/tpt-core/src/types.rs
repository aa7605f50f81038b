//! Core type definitions shared by the normalizers and the matcher.

use std::fmt;

// =============================================================================
// List Constants
// =============================================================================

/// Legacy catch-all category that is redistributed when remapping.
pub const DISCONNECT_CATEGORY: &str = "Disconnect";

/// Categories the catch-all category may be remapped into.
pub const REMAP_TARGETS: [&str; 3] = ["Social", "Analytics", "Advertising"];

/// Resource-map key whose value (`eff`, `w3c`) becomes the tag name.
pub const DNT_TAG: &str = "dnt";

// =============================================================================
// List Kinds
// =============================================================================

/// The three list resources a parser is built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListKind {
    Blocklist,
    Entitylist,
    RemapTable,
}

impl fmt::Display for ListKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Blocklist => "blocklist",
            Self::Entitylist => "entitylist",
            Self::RemapTable => "disconnect mapping",
        };
        f.write_str(name)
    }
}

// =============================================================================
// Sub-category Tags
// =============================================================================

bitflags::bitflags! {
    /// Boolean sub-category tags an organization can carry.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct SubCategory: u8 {
        const FINGERPRINTING = 1 << 0;
        const CRYPTOMINER = 1 << 1;
        const SESSION_REPLAY = 1 << 2;
        const PERFORMANCE = 1 << 3;
    }
}

const SUB_CATEGORY_NAMES: [(SubCategory, &str); 4] = [
    (SubCategory::FINGERPRINTING, "fingerprinting"),
    (SubCategory::CRYPTOMINER, "cryptominer"),
    (SubCategory::SESSION_REPLAY, "session-replay"),
    (SubCategory::PERFORMANCE, "performance"),
];

impl SubCategory {
    /// Parse a resource-map key into its tag flag.
    pub fn from_key(key: &str) -> Option<Self> {
        SUB_CATEGORY_NAMES
            .iter()
            .find(|(_, name)| *name == key)
            .map(|(flag, _)| *flag)
    }

    /// List tag names, in declaration order.
    pub fn tag_names(self) -> impl Iterator<Item = &'static str> {
        SUB_CATEGORY_NAMES
            .into_iter()
            .filter(move |(flag, _)| self.contains(*flag))
            .map(|(_, name)| name)
    }
}

// =============================================================================
// Match Result
// =============================================================================

/// Outcome of classifying a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MatchDecision {
    /// A blocklist entry matched the request host.
    Blacklisted,
    /// An entitylist exception applies on the top-level page.
    Whitelisted,
    /// Nothing matched.
    NotListed,
}

impl MatchDecision {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Blacklisted => "blacklisted",
            Self::Whitelisted => "whitelisted",
            Self::NotListed => "none",
        }
    }
}

impl fmt::Display for MatchDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of matching a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchResult<'a> {
    pub decision: MatchDecision,
    /// Blocklist entry that matched (only set for `Blacklisted`)
    pub matched: Option<&'a str>,
}

impl<'a> MatchResult<'a> {
    pub fn blacklisted(domain: &'a str) -> Self {
        Self {
            decision: MatchDecision::Blacklisted,
            matched: Some(domain),
        }
    }

    pub fn whitelisted() -> Self {
        Self {
            decision: MatchDecision::Whitelisted,
            matched: None,
        }
    }

    pub fn is_blocked(&self) -> bool {
        self.decision == MatchDecision::Blacklisted
    }
}

impl Default for MatchResult<'_> {
    fn default() -> Self {
        Self {
            decision: MatchDecision::NotListed,
            matched: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sub_category_from_key() {
        assert_eq!(SubCategory::from_key("session-replay"), Some(SubCategory::SESSION_REPLAY));
        assert_eq!(SubCategory::from_key("cryptominer"), Some(SubCategory::CRYPTOMINER));
        assert_eq!(SubCategory::from_key("dnt"), None);
        assert_eq!(SubCategory::from_key("Fingerprinting"), None);
    }

    #[test]
    fn test_sub_category_tag_names() {
        let tags = SubCategory::PERFORMANCE | SubCategory::FINGERPRINTING;
        let names: Vec<_> = tags.tag_names().collect();
        assert_eq!(names, vec!["fingerprinting", "performance"]);
        assert_eq!(SubCategory::empty().tag_names().count(), 0);
    }

    #[test]
    fn test_decision_strings() {
        assert_eq!(MatchDecision::Blacklisted.to_string(), "blacklisted");
        assert_eq!(MatchResult::default().decision.as_str(), "none");
        assert!(MatchResult::blacklisted("example.com").is_blocked());
        assert!(!MatchResult::whitelisted().is_blocked());
    }
}

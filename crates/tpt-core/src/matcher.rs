//! Core Matching Engine
//!
//! Classifies request URLs against the flattened blocklist the way Firefox's
//! URL classifier does, following the Safe Browsing suffix expression rules:
//! https://developers.google.com/safe-browsing/v4/urls-hashing#suffixprefix-expressions
//!
//! Request hosts are lowercased; list entries are compared as written.

use std::collections::{BTreeSet, HashMap, HashSet};

use crate::error::{Error, Result};
use crate::parser::DisconnectParser;
use crate::psl::get_parent_domain;
use crate::types::{MatchResult, DISCONNECT_CATEGORY};
use crate::url::hostname;

/// Suffix lookups allowed after the exact host lookup.
const MAX_SUFFIX_TESTS: usize = 4;

/// Labels kept from the right of the host before suffix lookups start.
const MAX_SUFFIX_LABELS: usize = 5;

// =============================================================================
// Request Classification
// =============================================================================

impl DisconnectParser {
    /// Check if `url` is allowed on `top_url` by the entitylist.
    ///
    /// The entitylist is looked up by the top-level host first, then by its
    /// registrable domain. Always false without an entitylist.
    pub fn should_whitelist(&self, url: &str, top_url: &str) -> bool {
        let Some(entitylist) = &self.entitylist else {
            return false;
        };
        let Some(top_host) = hostname(top_url) else {
            return false;
        };

        let resources = match entitylist.resources_for(&top_host) {
            Some(resources) => resources,
            None => {
                let top_ps1 = self.oracle.ps_plus_1(&top_host);
                match entitylist.resources_for(&top_ps1) {
                    Some(resources) => resources,
                    None => return false,
                }
            }
        };

        let Some(url_host) = hostname(url) else {
            return false;
        };
        resources.contains(&url_host) || resources.contains(&self.oracle.ps_plus_1(&url_host))
    }

    /// Check if Firefox's Tracking Protection would block this request.
    ///
    /// `url` may be a full URL or a bare hostname. When `top_url` is given,
    /// entitylist exceptions take precedence over blocklist hits. The
    /// returned match is the blocklist entry that was hit.
    pub fn should_block_with_match(&self, url: &str, top_url: Option<&str>) -> MatchResult<'_> {
        if let Some(top_url) = top_url {
            if self.should_whitelist(url, top_url) {
                return MatchResult::whitelisted();
            }
        }

        let Some(host) = hostname(url) else {
            return MatchResult::default();
        };

        if let Some(hit) = self.lookup(&host) {
            return MatchResult::blacklisted(hit);
        }

        if self.oracle.is_ip_address(&host) {
            return MatchResult::default();
        }

        // The bare TLD is tested like any other suffix when reached; Firefox
        // does not skip it yet (bug 1203635).
        let mut candidate = first_suffix(&host);
        for _ in 0..MAX_SUFFIX_TESTS {
            let Some(suffix) = candidate else {
                break;
            };
            if let Some(hit) = self.lookup(suffix) {
                return MatchResult::blacklisted(hit);
            }
            candidate = get_parent_domain(suffix);
        }

        MatchResult::default()
    }

    /// True iff the request would be blacklisted.
    pub fn should_block(&self, url: &str, top_url: Option<&str>) -> bool {
        self.should_block_with_match(url, top_url).is_blocked()
    }

    /// Check if the flattened blocklist holds exactly `hostname`.
    pub fn contains_domain(&self, hostname: &str) -> bool {
        self.blocklist.flattened().contains(hostname)
    }

    /// Check if the flattened blocklist holds the registrable domain of
    /// `hostname` (a hostname or a URL).
    pub fn contains_ps1(&self, hostname_or_url: &str) -> bool {
        match hostname(hostname_or_url) {
            Some(host) => self.contains_domain(&self.oracle.ps_plus_1(&host)),
            None => false,
        }
    }

    /// Blocklist entries that end with `hostname`.
    ///
    /// This is a plain string suffix test, so `notexample.com` is returned
    /// for `example.com` as well.
    pub fn get_matching_domains(&self, hostname: &str) -> HashSet<&str> {
        self.blocklist
            .flattened()
            .iter()
            .filter(|domain| domain.ends_with(hostname))
            .map(String::as_str)
            .collect()
    }

    fn lookup(&self, domain: &str) -> Option<&str> {
        self.blocklist.flattened().get(domain).map(String::as_str)
    }
}

/// First suffix to test after the exact host.
///
/// Hosts longer than five labels start from their last five labels; shorter
/// ones start by dropping the leading label.
fn first_suffix(host: &str) -> Option<&str> {
    match host.rmatch_indices('.').nth(MAX_SUFFIX_LABELS - 1) {
        Some((dot, _)) => Some(&host[dot + 1..]),
        None => get_parent_domain(host),
    }
}

// =============================================================================
// List Queries
// =============================================================================

impl DisconnectParser {
    /// All domains of one or more categories.
    ///
    /// With remapping enabled, `Disconnect` contributes nothing since its
    /// domains were moved to their target categories.
    pub fn get_domains_with_category<I, S>(&self, categories: I) -> Result<HashSet<&str>>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut out = HashSet::new();
        for category in categories {
            let category = category.as_ref();
            if self.blocklist.is_remapped() && category == DISCONNECT_CATEGORY {
                continue;
            }
            let domains = self
                .blocklist
                .category(category)
                .ok_or_else(|| Error::UnknownCategory(category.to_string()))?;
            out.extend(domains.iter().map(String::as_str));
        }
        Ok(out)
    }

    /// All domains carrying one or more tags.
    ///
    /// Use `eff` or `w3c` for DNT entries. Unknown tags yield nothing.
    pub fn get_domains_with_tag<I, S>(&self, tags: I) -> HashSet<&str>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut out = HashSet::new();
        for tag in tags {
            if let Some(domains) = self.blocklist.tagged(tag.as_ref()) {
                out.extend(domains.iter().map(String::as_str));
            }
        }
        out
    }

    /// Every category of the list, `Disconnect` included even when remapped.
    pub fn all_list_categories(&self) -> BTreeSet<&str> {
        self.blocklist.categories().collect()
    }

    /// Organization that owns `domain`.
    pub fn company_for(&self, domain: &str) -> Option<&str> {
        self.blocklist.company_for(domain)
    }

    pub fn company_classifier(&self) -> &HashMap<String, String> {
        self.blocklist.companies()
    }

    /// Number of domains used for matching.
    pub fn blocklist_len(&self) -> usize {
        self.blocklist.flattened().len()
    }

    /// Number of entitylist properties (0 without an entitylist).
    pub fn entitylist_len(&self) -> usize {
        self.entitylist.as_ref().map_or(0, |list| list.len())
    }
}

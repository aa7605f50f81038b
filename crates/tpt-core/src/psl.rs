//! Public suffix utilities for registrable-domain ("ps+1") extraction
//!
//! The parser consumes these through the [`PublicSuffixOracle`] trait so the
//! suffix data can be swapped out. Three implementations are provided:
//!
//! - [`BundledOracle`]: the default; Mozilla's Public Suffix List compiled
//!   in by the `psl` crate.
//! - [`PslOracle`]: backed by a Public Suffix List file, via `publicsuffix`.
//! - [`HeuristicOracle`]: no data; last two labels, or three for common
//!   two-part suffixes. Only used when asked for.
//!
//! # Examples
//!
//! ```
//! use tpt_core::psl::{BundledOracle, PublicSuffixOracle};
//!
//! let oracle = BundledOracle;
//! assert_eq!(oracle.ps_plus_1("sub.example.com"), "example.com");
//! assert_eq!(oracle.ps_plus_1("www.site.com.ar"), "site.com.ar");
//! ```

use std::fs;
use std::net::IpAddr;
use std::path::Path;

use publicsuffix::{List, Psl};

use crate::error::{Error, Result};

// =============================================================================
// Oracle Trait
// =============================================================================

/// Registrable-domain and IP-literal lookups used during matching.
pub trait PublicSuffixOracle: Send + Sync {
    /// Return the registrable domain of `host`.
    ///
    /// Hosts that have no registrable part (IP literals, single labels,
    /// bare suffixes) are returned unchanged.
    fn ps_plus_1(&self, host: &str) -> String;

    /// Check if `host` is a literal IPv4 or IPv6 address.
    fn is_ip_address(&self, host: &str) -> bool {
        host.trim_start_matches('[')
            .trim_end_matches(']')
            .parse::<IpAddr>()
            .is_ok()
    }
}

// =============================================================================
// Bundled Oracle
// =============================================================================

/// Oracle backed by the Public Suffix List snapshot built into `psl`.
///
/// Unknown TLDs count as public suffixes, so `tracker.example` is its own
/// registrable domain.
#[derive(Debug, Clone, Copy, Default)]
pub struct BundledOracle;

impl PublicSuffixOracle for BundledOracle {
    fn ps_plus_1(&self, host: &str) -> String {
        if self.is_ip_address(host) {
            return host.to_string();
        }
        psl::domain_str(host).unwrap_or(host).to_string()
    }
}

// =============================================================================
// Heuristic Oracle
// =============================================================================

/// Common two-part TLDs for fallback.
const COMMON_TWO_PART_TLDS: &[&str] = &[
    "co.uk", "co.jp", "co.nz", "co.za", "co.in", "co.kr",
    "com.au", "com.br", "com.cn", "com.mx", "com.tw", "com.hk",
    "net.au", "net.nz",
    "org.uk", "org.au",
    "gov.uk", "gov.au",
    "ac.uk", "ac.jp",
    "ne.jp", "or.jp",
];

/// Oracle that needs no suffix data.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicOracle;

impl PublicSuffixOracle for HeuristicOracle {
    fn ps_plus_1(&self, host: &str) -> String {
        if self.is_ip_address(host) {
            return host.to_string();
        }
        let labels: Vec<&str> = host.split('.').collect();
        fallback_etld1(&labels)
    }
}

/// Fallback eTLD+1 heuristic.
fn fallback_etld1(labels: &[&str]) -> String {
    let n = labels.len();
    if n <= 2 {
        return labels.join(".");
    }

    let last_two = format!("{}.{}", labels[n - 2], labels[n - 1]);
    if COMMON_TWO_PART_TLDS.contains(&last_two.as_str()) {
        return labels[n - 3..].join(".");
    }

    labels[n - 2..].join(".")
}

// =============================================================================
// Public Suffix List Oracle
// =============================================================================

/// Oracle backed by a parsed Public Suffix List.
pub struct PslOracle {
    list: List,
}

impl PslOracle {
    /// Parse a list in the `public_suffix_list.dat` format.
    pub fn from_psl_str(data: &str) -> Result<Self> {
        let list = List::from_bytes(data.as_bytes())
            .map_err(|e| Error::PublicSuffix(e.to_string()))?;
        Ok(Self { list })
    }

    /// Read and parse a list file.
    pub fn from_path(path: &Path) -> Result<Self> {
        let data = fs::read_to_string(path)
            .map_err(|e| Error::PublicSuffix(format!("{}: {}", path.display(), e)))?;
        Self::from_psl_str(&data)
    }
}

impl PublicSuffixOracle for PslOracle {
    fn ps_plus_1(&self, host: &str) -> String {
        if self.is_ip_address(host) {
            return host.to_string();
        }
        self.list
            .domain(host.as_bytes())
            .and_then(|domain| std::str::from_utf8(domain.as_bytes()).ok().map(str::to_string))
            .unwrap_or_else(|| host.to_string())
    }
}

// =============================================================================
// Host Walking
// =============================================================================

/// Get the parent domain (strip leftmost label).
pub fn get_parent_domain(host: &str) -> Option<&str> {
    match host.find('.') {
        Some(idx) if idx < host.len() - 1 => Some(&host[idx + 1..]),
        _ => None,
    }
}

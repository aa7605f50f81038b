//! Remapping of the legacy `Disconnect` category
//!
//! Firefox no longer ships the catch-all category as such; its entries are
//! redistributed into `Social`, `Analytics` and `Advertising` according to a
//! separate domain → category table.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::error::{Error, Result};
use crate::list::raw::RawRemapTable;
use crate::types::{DISCONNECT_CATEGORY, REMAP_TARGETS};

/// Validate a remap table and index it by target category.
///
/// Fails on domains shorter than two characters (a sign the mapping file
/// changed shape) and on targets other than the three remap categories.
pub fn build_remap(table: &RawRemapTable) -> Result<BTreeMap<String, BTreeSet<String>>> {
    let mut by_category: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();

    for (domain, category) in table {
        if domain.len() < 2 {
            return Err(Error::ListFormat(format!(
                "unexpected domain {domain:?} in disconnect mapping; \
                 the mapping format likely changed"
            )));
        }
        if !REMAP_TARGETS.contains(&category.as_str()) {
            return Err(Error::ListFormat(format!(
                "disconnect mapping remaps {domain} to unexpected category {category:?}; \
                 supported categories: {}",
                REMAP_TARGETS.join(", ")
            )));
        }
        by_category
            .entry(category.clone())
            .or_default()
            .insert(domain.clone());
    }

    Ok(by_category)
}

/// Validated remap table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RemapTable {
    targets: HashMap<String, String>,
}

impl RemapTable {
    pub fn new(table: &RawRemapTable) -> Result<Self> {
        for (category, domains) in build_remap(table)? {
            log::debug!("Disconnect mapping sends {} domains to {}", domains.len(), category);
        }

        let remap = Self {
            targets: table
                .iter()
                .map(|(domain, category)| (domain.clone(), category.clone()))
                .collect(),
        };
        if remap.is_empty() {
            log::warn!("Disconnect mapping is empty; every catch-all domain will fail to remap");
        }
        Ok(remap)
    }

    /// Target category for a catch-all domain.
    pub fn target_for(&self, domain: &str) -> Result<&str> {
        self.targets.get(domain).map(String::as_str).ok_or_else(|| {
            Error::RemapConsistency(format!(
                "blocklist contains {domain} under the {DISCONNECT_CATEGORY} category, \
                 but it is not found in the disconnect mapping"
            ))
        })
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}

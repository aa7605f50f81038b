//! Blocklist normalization
//!
//! Walks the nested category → organization → resource structure and
//! produces flat lookup tables:
//!
//! - category → member domains
//! - tag → tagged domains (`dnt` entries are keyed by their value)
//! - domain → organization name
//! - the flattened set used for matching
//!
//! Tags are assumed to apply to every resource of an organization, so each
//! organization is classified in full before its domains are registered.

use std::collections::{BTreeMap, HashMap, HashSet};

use crate::error::{Error, Result};
use crate::list::raw::{RawBlocklist, RawResources, ResourceEntry};
use crate::list::remap::RemapTable;
use crate::types::{SubCategory, DISCONNECT_CATEGORY};

/// Normalized blocklist.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Blocklist {
    categories: BTreeMap<String, HashSet<String>>,
    tagged: HashMap<String, HashSet<String>>,
    companies: HashMap<String, String>,
    flattened: HashSet<String>,
    remapped: bool,
}

/// An organization's entries after classification.
struct Organization<'a> {
    tags: Vec<&'a str>,
    domain_lists: Vec<&'a [String]>,
}

impl<'a> Organization<'a> {
    fn classify(name: &str, resources: &'a RawResources) -> Result<Self> {
        let mut flags = SubCategory::empty();
        let mut tags = Vec::new();
        let mut domain_lists = Vec::new();

        for (key, value) in resources {
            match ResourceEntry::classify(name, key, value)? {
                ResourceEntry::Flag(tag, true) => flags |= tag,
                ResourceEntry::Flag(_, false) => {}
                ResourceEntry::Dnt(value) => tags.push(value),
                ResourceEntry::Domains(domains) => domain_lists.push(domains),
            }
        }
        for tag in flags.tag_names() {
            tags.push(tag);
        }

        Ok(Self { tags, domain_lists })
    }
}

impl Blocklist {
    /// Normalize a raw blocklist.
    ///
    /// With a remap table, domains of the `Disconnect` category are added to
    /// their target category and the `Disconnect` category is left out of the
    /// flattened set. Categories in `exclude` (compared case-insensitively)
    /// are left out of the flattened set but stay queryable.
    pub fn normalize(raw: &RawBlocklist, remap: Option<&RemapTable>, exclude: &[String]) -> Result<Self> {
        log::debug!("Parsing raw list into categorized list...");

        let mut categories: BTreeMap<String, HashSet<String>> = raw
            .categories
            .keys()
            .map(|name| (name.clone(), HashSet::new()))
            .collect();
        let mut tagged: HashMap<String, HashSet<String>> = HashMap::new();
        let mut companies: HashMap<String, String> = HashMap::new();
        let mut remap_counts: BTreeMap<String, usize> = BTreeMap::new();

        for (category, records) in &raw.categories {
            let remap_here = match remap {
                Some(table) if category == DISCONNECT_CATEGORY => Some(table),
                _ => None,
            };

            for record in records {
                for (name, resources) in record {
                    let org = Organization::classify(name, resources)?;

                    for domains in &org.domain_lists {
                        for domain in domains.iter() {
                            if domain.len() < 2 {
                                return Err(Error::ListFormat(format!(
                                    "unexpected domain {domain:?} in resource list under \
                                     organization {name:?}; the list format likely changed"
                                )));
                            }

                            for tag in &org.tags {
                                tagged.entry(tag.to_string()).or_default().insert(domain.clone());
                            }

                            // First writer wins: one domain belongs to one organization
                            // in a well-formed list.
                            companies
                                .entry(domain.clone())
                                .or_insert_with(|| name.clone());

                            if let Some(table) = remap_here {
                                let target = table.target_for(domain)?;
                                let members = categories.get_mut(target).ok_or_else(|| {
                                    Error::RemapConsistency(format!(
                                        "{domain} is remapped to {target}, which is not a \
                                         category of the blocklist"
                                    ))
                                })?;
                                members.insert(domain.clone());
                                *remap_counts.entry(target.to_string()).or_default() += 1;
                            }

                            if let Some(members) = categories.get_mut(category) {
                                members.insert(domain.clone());
                            }
                        }
                    }
                }
            }
        }

        for (category, count) in &remap_counts {
            log::info!("Remapped {} domains from {} to {}", count, DISCONNECT_CATEGORY, category);
        }

        let remapped = remap.is_some();
        let flattened = flatten(&categories, remapped, exclude);

        Ok(Self {
            categories,
            tagged,
            companies,
            flattened,
            remapped,
        })
    }

    /// Set of domains used for matching.
    pub fn flattened(&self) -> &HashSet<String> {
        &self.flattened
    }

    /// Domains of one category, including remapped entries.
    pub fn category(&self, name: &str) -> Option<&HashSet<String>> {
        self.categories.get(name)
    }

    /// Every category present in the list, including `Disconnect`.
    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.categories.keys().map(String::as_str)
    }

    /// Domains carrying `tag`.
    pub fn tagged(&self, tag: &str) -> Option<&HashSet<String>> {
        self.tagged.get(tag)
    }

    /// Owning organization of `domain`.
    pub fn company_for(&self, domain: &str) -> Option<&str> {
        self.companies.get(domain).map(String::as_str)
    }

    pub fn companies(&self) -> &HashMap<String, String> {
        &self.companies
    }

    /// Whether the `Disconnect` category was redistributed.
    pub fn is_remapped(&self) -> bool {
        self.remapped
    }
}

/// Union of all category sets that take part in matching.
fn flatten(categories: &BTreeMap<String, HashSet<String>>, remapped: bool, exclude: &[String]) -> HashSet<String> {
    log::debug!("Parsing categorized list into single blocklist...");

    let mut out = HashSet::new();
    for (category, domains) in categories {
        if exclude.iter().any(|e| e.eq_ignore_ascii_case(category)) {
            log::info!("Skipping {}", category);
            continue;
        }
        if remapped && category == DISCONNECT_CATEGORY {
            log::info!("Skipping {} as it is remapped", category);
            continue;
        }
        log::debug!("Added {} domains for category {}", domains.len(), category);
        out.extend(domains.iter().cloned());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::list::raw::RawRemapTable;
    use serde_json::json;

    fn raw(value: serde_json::Value) -> RawBlocklist {
        serde_json::from_value(value).unwrap()
    }

    fn sample() -> RawBlocklist {
        raw(json!({
            "categories": {
                "Advertising": [
                    { "Ad Co": {
                        "http://adco.example/": ["adco.example", "cdn.adco.example"],
                        "fingerprinting": "true",
                        "session-replay": "false",
                        "dnt": "w3c"
                    } }
                ],
                "Content": [
                    { "Video Co": { "http://video.example/": ["video.example"] } }
                ],
                "Disconnect": [
                    { "Misc Co": { "http://misc.example/": ["misc.example"], "performance": "true" } }
                ],
                "Social": []
            }
        }))
    }

    fn remap_table() -> RemapTable {
        let mut table = RawRemapTable::new();
        table.insert("misc.example".to_string(), "Social".to_string());
        RemapTable::new(&table).unwrap()
    }

    #[test]
    fn test_normalize_without_remap() {
        let list = Blocklist::normalize(&sample(), None, &[]).unwrap();
        assert_eq!(list.category("Advertising").unwrap().len(), 2);
        assert!(list.category("Disconnect").unwrap().contains("misc.example"));
        assert!(list.flattened().contains("misc.example"));
        assert_eq!(list.flattened().len(), 4);
        assert!(!list.is_remapped());
    }

    #[test]
    fn test_tags() {
        let list = Blocklist::normalize(&sample(), None, &[]).unwrap();
        assert_eq!(list.tagged("fingerprinting").unwrap().len(), 2);
        assert!(list.tagged("w3c").unwrap().contains("cdn.adco.example"));
        assert!(list.tagged("dnt").is_none());
        assert!(list.tagged("session-replay").is_none());
        assert!(list.tagged("performance").unwrap().contains("misc.example"));
    }

    #[test]
    fn test_remap_moves_catch_all_domains() {
        let table = remap_table();
        let list = Blocklist::normalize(&sample(), Some(&table), &[]).unwrap();
        assert!(list.category("Social").unwrap().contains("misc.example"));
        assert!(list.flattened().contains("misc.example"));
        assert!(list.categories().any(|c| c == "Disconnect"));
        assert!(list.is_remapped());
        assert_eq!(list.company_for("misc.example"), Some("Misc Co"));
    }

    #[test]
    fn test_unmapped_catch_all_domain_is_rejected() {
        let table = remap_table();
        let mut input = sample();
        input.categories.get_mut("Disconnect").unwrap().push(
            serde_json::from_value(json!({ "Other Co": { "http://other.example/": ["other.example"] } }))
                .unwrap(),
        );
        let err = Blocklist::normalize(&input, Some(&table), &[]).unwrap_err();
        assert!(matches!(err, Error::RemapConsistency(_)));
    }

    #[test]
    fn test_remap_target_missing_from_list() {
        let table = remap_table();
        let mut input = sample();
        input.categories.remove("Social");
        let err = Blocklist::normalize(&input, Some(&table), &[]).unwrap_err();
        assert!(matches!(err, Error::RemapConsistency(_)));
    }

    #[test]
    fn test_excluded_category_is_case_insensitive() {
        let list = Blocklist::normalize(&sample(), None, &["content".to_string()]).unwrap();
        assert!(!list.flattened().contains("video.example"));
        assert!(list.category("Content").unwrap().contains("video.example"));
    }

    #[test]
    fn test_company_first_writer_wins() {
        let input = raw(json!({
            "categories": {
                "Advertising": [
                    { "First Co": { "http://first.example/": ["shared.example"] } },
                    { "Second Co": { "http://second.example/": ["shared.example"] } }
                ]
            }
        }));
        let list = Blocklist::normalize(&input, None, &[]).unwrap();
        assert_eq!(list.company_for("shared.example"), Some("First Co"));
        assert_eq!(list.companies().len(), 1);
    }

    #[test]
    fn test_short_domain_is_rejected() {
        let input = raw(json!({
            "categories": {
                "Advertising": [ { "Bad Co": { "http://bad.example/": ["bad.example", "b"] } } ]
            }
        }));
        let err = Blocklist::normalize(&input, None, &[]).unwrap_err();
        assert!(matches!(err, Error::ListFormat(_)));
    }

    #[test]
    fn test_unsupported_field_is_rejected() {
        let input = raw(json!({
            "categories": {
                "Advertising": [ { "Bad Co": { "http://bad.example/": "bad.example" } } ]
            }
        }));
        let err = Blocklist::normalize(&input, None, &[]).unwrap_err();
        assert!(matches!(err, Error::ListFormat(_)));
    }
}

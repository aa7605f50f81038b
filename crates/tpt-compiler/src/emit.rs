//! Disconnect-format list emission
//!
//! Blocking rules become one single-domain organization per domain under a
//! category named after the filter list; exception rules become entitylist
//! owners whose only property and resource is the domain itself.

use std::collections::{BTreeMap, BTreeSet};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use tpt_core::list::{RawBlocklist, RawEntity, RawEntitylist, RawOrganization, RawResources, RawValue};

use crate::error::{CompileError, Result};
use crate::parser::{parse_filter_list, AbpRule, RULES_TO_SKIP, TYPE_OPTIONS};

/// License recorded in converted blocklists.
pub const EASYLIST_LICENSE: &str = "https://easylist.to/pages/licence.html";

/// Rule filtering applied during conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConvertOptions {
    /// Drop rules with a path instead of emitting `domain/path` entries
    pub skip_paths: bool,
    /// Drop rules restricted to request types
    pub skip_types: bool,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            skip_paths: false,
            skip_types: true,
        }
    }
}

/// A converted filter list.
#[derive(Debug, Clone, PartialEq)]
pub struct Conversion {
    pub blocklist: RawBlocklist,
    pub entitylist: RawEntitylist,
}

/// Conversion statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConvertStats {
    pub rules_in: usize,
    pub domains_out: usize,
    pub exceptions_out: usize,
}

// =============================================================================
// Rule Selection
// =============================================================================

/// Domain of a rule that passes the option filters.
fn accepted_domain(rule: &AbpRule, options: ConvertOptions) -> Option<String> {
    if rule.has_any_option(&RULES_TO_SKIP) {
        return None;
    }

    let Some(domain) = rule.normalized_domain() else {
        log::debug!("Skipping wildcard rule {}", rule.as_str());
        return None;
    };
    if domain.len() < 2 {
        log::debug!("Skipping rule without a domain: {}", rule.as_str());
        return None;
    }

    if options.skip_paths && rule.has_path() {
        return None;
    }
    if options.skip_types && rule.has_any_option(&TYPE_OPTIONS) {
        return None;
    }

    Some(domain)
}

/// Map each blocked domain to its `domain` or `domain/path` entries.
///
/// Rules limited to some first-party sites (`domain=`) are dropped.
pub fn domain_rules(rules: &[AbpRule], options: ConvertOptions) -> BTreeMap<String, BTreeSet<String>> {
    let mut domains: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();

    for rule in rules {
        let Some(domain) = accepted_domain(rule, options) else {
            continue;
        };

        let entry = match rule.path() {
            Some(path) if !path.contains('*') && path != "|" => format!("{domain}/{path}"),
            _ => domain.clone(),
        };

        if rule.domain_option(true).is_none() {
            domains.entry(domain).or_default().insert(entry);
        }
    }

    domains
}

/// Map each excepted domain to itself.
pub fn exception_rules(rules: &[AbpRule], options: ConvertOptions) -> BTreeMap<String, BTreeSet<String>> {
    let mut domains: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();

    for rule in rules {
        if let Some(domain) = accepted_domain(rule, options) {
            domains.entry(domain.clone()).or_default().insert(domain);
        }
    }

    domains
}

// =============================================================================
// List Building
// =============================================================================

pub fn to_blocklist(list_name: &str, domains: &BTreeMap<String, BTreeSet<String>>) -> RawBlocklist {
    let records = domains
        .iter()
        .map(|(domain, entries)| {
            let mut resources = RawResources::new();
            resources.insert(domain.clone(), RawValue::Domains(entries.iter().cloned().collect()));
            let mut organization = RawOrganization::new();
            organization.insert(domain.clone(), resources);
            organization
        })
        .collect();

    RawBlocklist {
        license: Some(EASYLIST_LICENSE.to_string()),
        categories: BTreeMap::from([(list_name.to_string(), records)]),
    }
}

pub fn to_entitylist(exceptions: &BTreeMap<String, BTreeSet<String>>) -> RawEntitylist {
    exceptions
        .iter()
        .map(|(domain, entries)| {
            let entries: Vec<String> = entries.iter().cloned().collect();
            let entity = RawEntity {
                properties: entries.clone(),
                resources: entries,
            };
            (domain.clone(), entity)
        })
        .collect()
}

/// Convert the text of a filter list.
pub fn convert(list_name: &str, text: &str, options: ConvertOptions) -> (Conversion, ConvertStats) {
    let rules = parse_filter_list(text);
    let domains = domain_rules(&rules.blocking, options);
    let exceptions = exception_rules(&rules.exceptions, options);

    let stats = ConvertStats {
        rules_in: rules.blocking.len() + rules.exceptions.len(),
        domains_out: domains.len(),
        exceptions_out: exceptions.len(),
    };
    log::info!(
        "Converted {}: {} rules -> {} domains, {} exceptions",
        list_name,
        stats.rules_in,
        stats.domains_out,
        stats.exceptions_out
    );

    let conversion = Conversion {
        blocklist: to_blocklist(list_name, &domains),
        entitylist: to_entitylist(&exceptions),
    };
    (conversion, stats)
}

// =============================================================================
// Output
// =============================================================================

/// Write `<name>-blacklist.json` and `<name>-entitylist.json` into `out_dir`.
pub fn write_lists(conversion: &Conversion, list_name: &str, out_dir: &Path) -> Result<(PathBuf, PathBuf)> {
    let blocklist_path = out_dir.join(format!("{list_name}-blacklist.json"));
    let entitylist_path = out_dir.join(format!("{list_name}-entitylist.json"));

    write_json(&blocklist_path, &conversion.blocklist)?;
    write_json(&entitylist_path, &conversion.entitylist)?;

    Ok((blocklist_path, entitylist_path))
}

fn write_json<T: serde::Serialize>(path: &Path, value: &T) -> Result<()> {
    let io_error = |source| CompileError::Io {
        path: path.to_path_buf(),
        source,
    };

    let file = File::create(path).map_err(io_error)?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, value).map_err(|source| CompileError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    writer.write_all(b"\n").map_err(io_error)?;
    writer.flush().map_err(io_error)
}

//! As-loaded list formats
//!
//! These mirror the JSON resources one to one. Maps are `BTreeMap`s so every
//! walk over them is in a stable order.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};
use crate::types::{SubCategory, DNT_TAG};

// =============================================================================
// Blocklist
// =============================================================================

/// `{ "categories": { <category>: [ { <org>: { <key>: <value> } } ] } }`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawBlocklist {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license: Option<String>,
    pub categories: BTreeMap<String, Vec<RawOrganization>>,
}

/// One organization record: organization name to its resource map.
pub type RawOrganization = BTreeMap<String, RawResources>;

/// Resource map of an organization: tag keys and domain-list keys.
pub type RawResources = BTreeMap<String, RawValue>;

/// A resource-map value before classification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    Text(String),
    Domains(Vec<String>),
    Other(Value),
}

/// A classified resource-map entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceEntry<'a> {
    /// Boolean sub-category tag and whether it is set to `"true"`.
    Flag(SubCategory, bool),
    /// DNT compliance marker; the value is the tag name.
    Dnt(&'a str),
    /// Domains belonging to the organization.
    Domains(&'a [String]),
}

impl<'a> ResourceEntry<'a> {
    /// Classify one resource-map entry of organization `org`.
    ///
    /// Tag keys need a string value; every other key must hold a list of
    /// domains. Anything else means the list format changed.
    pub fn classify(org: &str, key: &'a str, value: &'a RawValue) -> Result<Self> {
        if let Some(tag) = SubCategory::from_key(key) {
            return match value {
                RawValue::Text(text) => Ok(Self::Flag(tag, text == "true")),
                _ => Err(unsupported(org, key)),
            };
        }

        if key == DNT_TAG {
            return match value {
                RawValue::Text(text) => Ok(Self::Dnt(text)),
                _ => Err(unsupported(org, key)),
            };
        }

        match value {
            RawValue::Domains(domains) => Ok(Self::Domains(domains)),
            _ => Err(unsupported(org, key)),
        }
    }
}

fn unsupported(org: &str, key: &str) -> Error {
    Error::ListFormat(format!(
        "unsupported record type {key:?} in organization {org:?}; \
         the list format likely changed"
    ))
}

// =============================================================================
// Entitylist
// =============================================================================

/// `{ <owner>: { "properties": [..], "resources": [..] } }`
pub type RawEntitylist = BTreeMap<String, RawEntity>;

/// One owner of the entitylist.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawEntity {
    #[serde(default)]
    pub properties: Vec<String>,
    #[serde(default)]
    pub resources: Vec<String>,
}

// =============================================================================
// Remap Table
// =============================================================================

/// `{ <domain>: <category> }`
pub type RawRemapTable = BTreeMap<String, String>;

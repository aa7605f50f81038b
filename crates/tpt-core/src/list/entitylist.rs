//! Entitylist normalization
//!
//! The entitylist lets an organization's own sites load its tracking
//! resources without being blocked.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::list::raw::RawEntitylist;

/// Property domain → resource domains it may load.
///
/// All properties of one owner point at the same shared set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Entitylist {
    resources: HashMap<String, Arc<HashSet<String>>>,
}

impl Entitylist {
    /// Flatten the raw owner records.
    ///
    /// A property claimed by several owners keeps the last owner's resources
    /// (owners are walked in name order).
    pub fn normalize(raw: &RawEntitylist) -> Self {
        let mut resources = HashMap::new();

        for (owner, entity) in raw {
            let shared: Arc<HashSet<String>> = Arc::new(entity.resources.iter().cloned().collect());
            for property in &entity.properties {
                if let Some(previous) = resources.insert(property.clone(), Arc::clone(&shared)) {
                    log::debug!(
                        "entitylist property {} of {} overrides {} earlier resources",
                        property,
                        owner,
                        previous.len()
                    );
                }
            }
        }

        let list = Self { resources };
        if list.is_empty() {
            log::warn!("Entitylist has no properties; nothing will be whitelisted");
        } else {
            log::debug!("Parsed entitylist with {} properties", list.len());
        }
        list
    }

    /// Resources allowed on `property`, if it is listed.
    pub fn resources_for(&self, property: &str) -> Option<&HashSet<String>> {
        self.resources.get(property).map(Arc::as_ref)
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }
}

//! Disconnect list parser
//!
//! Builds the normalized lists once; the result is read-only and can be
//! shared between threads. See [`crate::matcher`] for the query side.

use std::path::PathBuf;
use std::sync::Arc;

use crate::error::Result;
use crate::list::{
    Blocklist, Entitylist, RawBlocklist, RawEntitylist, RawRemapTable, RemapTable,
};
use crate::psl::{BundledOracle, PublicSuffixOracle};
use crate::source::SourceSpec;
use crate::types::ListKind;

/// A parser for the Disconnect list.
///
/// This uses the list the way Firefox's URL classifier does, which does not
/// necessarily match Disconnect's own extension or other consumers.
pub struct DisconnectParser {
    pub(crate) blocklist: Blocklist,
    pub(crate) entitylist: Option<Entitylist>,
    pub(crate) remap: Option<RemapTable>,
    pub(crate) oracle: Arc<dyn PublicSuffixOracle>,
}

impl DisconnectParser {
    pub fn builder() -> DisconnectParserBuilder {
        DisconnectParserBuilder::default()
    }

    /// Build from in-memory lists with the default oracle.
    pub fn from_lists(
        blocklist: RawBlocklist,
        entitylist: Option<RawEntitylist>,
        remap: Option<RawRemapTable>,
    ) -> Result<Self> {
        let mut builder = Self::builder().blocklist(blocklist);
        if let Some(entitylist) = entitylist {
            builder = builder.entitylist(entitylist);
        }
        if let Some(remap) = remap {
            builder = builder.remap_table(remap);
        }
        builder.build()
    }

    /// Normalized blocklist tables.
    pub fn blocklist(&self) -> &Blocklist {
        &self.blocklist
    }

    pub fn entitylist(&self) -> Option<&Entitylist> {
        self.entitylist.as_ref()
    }

    pub fn remap_table(&self) -> Option<&RemapTable> {
        self.remap.as_ref()
    }
}

/// Collects list sources and options for a [`DisconnectParser`].
///
/// Each list accepts exactly one of an inline list, a path or a URL. The
/// blocklist is required; the entitylist and the remap table are optional.
/// Conflicts are reported by [`build`](Self::build).
pub struct DisconnectParserBuilder {
    blocklist: SourceSpec<RawBlocklist>,
    entitylist: SourceSpec<RawEntitylist>,
    remap: SourceSpec<RawRemapTable>,
    exclude: Vec<String>,
    oracle: Arc<dyn PublicSuffixOracle>,
}

impl Default for DisconnectParserBuilder {
    fn default() -> Self {
        Self {
            blocklist: SourceSpec::default(),
            entitylist: SourceSpec::default(),
            remap: SourceSpec::default(),
            exclude: Vec::new(),
            oracle: Arc::new(BundledOracle),
        }
    }
}

impl DisconnectParserBuilder {
    pub fn blocklist(mut self, list: RawBlocklist) -> Self {
        self.blocklist.inline = Some(list);
        self
    }

    pub fn blocklist_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.blocklist.path = Some(path.into());
        self
    }

    pub fn blocklist_url(mut self, url: impl Into<String>) -> Self {
        self.blocklist.url = Some(url.into());
        self
    }

    pub fn entitylist(mut self, list: RawEntitylist) -> Self {
        self.entitylist.inline = Some(list);
        self
    }

    pub fn entitylist_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.entitylist.path = Some(path.into());
        self
    }

    pub fn entitylist_url(mut self, url: impl Into<String>) -> Self {
        self.entitylist.url = Some(url.into());
        self
    }

    /// Enable remapping of the `Disconnect` category with this table.
    pub fn remap_table(mut self, table: RawRemapTable) -> Self {
        self.remap.inline = Some(table);
        self
    }

    pub fn remap_table_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.remap.path = Some(path.into());
        self
    }

    pub fn remap_table_url(mut self, url: impl Into<String>) -> Self {
        self.remap.url = Some(url.into());
        self
    }

    /// Leave a category out of matching. Firefox excludes `Content` by default.
    pub fn exclude_category(mut self, category: impl Into<String>) -> Self {
        self.exclude.push(category.into());
        self
    }

    pub fn exclude_categories<I, S>(mut self, categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude.extend(categories.into_iter().map(Into::into));
        self
    }

    /// Replace the default [`BundledOracle`], e.g. with a
    /// [`HeuristicOracle`](crate::psl::HeuristicOracle) or a [`PslOracle`](crate::psl::PslOracle).
    pub fn oracle(mut self, oracle: Arc<dyn PublicSuffixOracle>) -> Self {
        self.oracle = oracle;
        self
    }

    /// Load every list and normalize it.
    pub fn build(self) -> Result<DisconnectParser> {
        // Resolve every source first so conflicts surface before any I/O
        let remap_source = self.remap.resolve(ListKind::RemapTable)?;
        let blocklist_source = self.blocklist.resolve_required(ListKind::Blocklist)?;
        let entitylist_source = self.entitylist.resolve(ListKind::Entitylist)?;

        let remap = match remap_source {
            Some(source) => Some(RemapTable::new(&source.load(ListKind::RemapTable)?)?),
            None => None,
        };

        let raw_blocklist = blocklist_source.load(ListKind::Blocklist)?;
        let blocklist = Blocklist::normalize(&raw_blocklist, remap.as_ref(), &self.exclude)?;
        log::info!(
            "Loaded blocklist: {} categories, {} domains used for matching",
            blocklist.categories().count(),
            blocklist.flattened().len()
        );

        let entitylist = match entitylist_source {
            Some(source) => Some(Entitylist::normalize(&source.load(ListKind::Entitylist)?)),
            None => None,
        };

        Ok(DisconnectParser {
            blocklist,
            entitylist,
            remap,
            oracle: self.oracle,
        })
    }
}

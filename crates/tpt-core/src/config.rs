//! Parser configuration
//!
//! The construction parameters of a [`DisconnectParser`] as a TOML document:
//!
//! ```toml
//! blocklist = "~/lists/services.json"
//! entitylist_url = "https://lists.example/entitylist.json"
//! disconnect_mapping = "~/lists/disconnect-mapping.json"
//! categories_to_exclude = ["Content"]
//! public_suffix_list = "/usr/share/publicsuffix/public_suffix_list.dat"
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::parser::{DisconnectParser, DisconnectParserBuilder};
use crate::psl::PslOracle;
use crate::source::expand_home;

/// List locations and options; see the module docs for the file format.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ParserConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blocklist: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blocklist_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entitylist: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entitylist_url: Option<String>,
    /// Remap table for the `Disconnect` category
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disconnect_mapping: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disconnect_mapping_url: Option<String>,
    pub categories_to_exclude: Vec<String>,
    /// Public Suffix List file; the list bundled with the crate is used without one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public_suffix_list: Option<PathBuf>,
}

impl ParserConfig {
    /// Load configuration from a TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = expand_home(path.as_ref());
        let content = std::fs::read_to_string(&path)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_toml(&content)
    }

    /// Parse configuration from TOML string
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(e.to_string()))
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string(self).map_err(|e| Error::Config(e.to_string()))
    }

    /// Fill unset fields from `other`; excluded categories are merged.
    ///
    /// Each list's path and URL go together: when `self` names a list in
    /// either form, both of `other`'s forms for that list are dropped.
    pub fn or(mut self, other: ParserConfig) -> Self {
        (self.blocklist, self.blocklist_url) = or_location(
            (self.blocklist, self.blocklist_url),
            (other.blocklist, other.blocklist_url),
        );
        (self.entitylist, self.entitylist_url) = or_location(
            (self.entitylist, self.entitylist_url),
            (other.entitylist, other.entitylist_url),
        );
        (self.disconnect_mapping, self.disconnect_mapping_url) = or_location(
            (self.disconnect_mapping, self.disconnect_mapping_url),
            (other.disconnect_mapping, other.disconnect_mapping_url),
        );
        for category in other.categories_to_exclude {
            if !self.categories_to_exclude.contains(&category) {
                self.categories_to_exclude.push(category);
            }
        }
        self.public_suffix_list = self.public_suffix_list.or(other.public_suffix_list);
        self
    }

    /// Turn the configuration into a parser builder.
    ///
    /// Source conflicts are left for [`DisconnectParserBuilder::build`] to
    /// report. Fails only when the Public Suffix List cannot be read.
    pub fn builder(&self) -> Result<DisconnectParserBuilder> {
        let mut builder = DisconnectParser::builder()
            .exclude_categories(self.categories_to_exclude.iter().cloned());

        if let Some(path) = &self.blocklist {
            builder = builder.blocklist_path(expand_home(path));
        }
        if let Some(url) = &self.blocklist_url {
            builder = builder.blocklist_url(url.clone());
        }
        if let Some(path) = &self.entitylist {
            builder = builder.entitylist_path(expand_home(path));
        }
        if let Some(url) = &self.entitylist_url {
            builder = builder.entitylist_url(url.clone());
        }
        if let Some(path) = &self.disconnect_mapping {
            builder = builder.remap_table_path(expand_home(path));
        }
        if let Some(url) = &self.disconnect_mapping_url {
            builder = builder.remap_table_url(url.clone());
        }
        if let Some(path) = &self.public_suffix_list {
            let oracle = PslOracle::from_path(&expand_home(path))?;
            builder = builder.oracle(Arc::new(oracle));
        }

        Ok(builder)
    }

    pub fn build(&self) -> Result<DisconnectParser> {
        self.builder()?.build()
    }
}

type Location = (Option<PathBuf>, Option<String>);

fn or_location(preferred: Location, fallback: Location) -> Location {
    match preferred {
        (None, None) => fallback,
        set => set,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::tests::testdata;
    use crate::types::ListKind;
    use std::io::Write;

    #[test]
    fn test_from_toml() {
        let config = ParserConfig::from_toml(
            r#"
            blocklist = "lists/services.json"
            disconnect_mapping_url = "https://lists.example/mapping.json"
            categories_to_exclude = ["Content"]
            "#,
        )
        .unwrap();
        assert_eq!(config.blocklist, Some(PathBuf::from("lists/services.json")));
        assert_eq!(config.disconnect_mapping_url.as_deref(), Some("https://lists.example/mapping.json"));
        assert_eq!(config.categories_to_exclude, vec!["Content"]);
        assert!(config.entitylist.is_none());
    }

    #[test]
    fn test_unknown_field_is_rejected() {
        let err = ParserConfig::from_toml("blocklst = \"a.json\"").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_toml_round_trip() {
        let config = ParserConfig {
            blocklist: Some(PathBuf::from("/lists/services.json")),
            categories_to_exclude: vec!["Content".to_string()],
            ..Default::default()
        };
        let text = config.to_toml().unwrap();
        assert!(!text.contains("entitylist"));
        assert_eq!(ParserConfig::from_toml(&text).unwrap(), config);
    }

    #[test]
    fn test_or_prefers_self() {
        let cli = ParserConfig {
            blocklist: Some(PathBuf::from("cli.json")),
            categories_to_exclude: vec!["Content".to_string()],
            ..Default::default()
        };
        let file = ParserConfig {
            blocklist: Some(PathBuf::from("file.json")),
            entitylist: Some(PathBuf::from("entitylist.json")),
            categories_to_exclude: vec!["Content".to_string(), "Social".to_string()],
            ..Default::default()
        };
        let merged = cli.or(file);
        assert_eq!(merged.blocklist, Some(PathBuf::from("cli.json")));
        assert_eq!(merged.entitylist, Some(PathBuf::from("entitylist.json")));
        assert_eq!(merged.categories_to_exclude, vec!["Content", "Social"]);
    }

    #[test]
    fn test_or_overrides_list_location_as_a_whole() {
        let cli = ParserConfig {
            blocklist_url: Some("http://127.0.0.1:9/services.json".to_string()),
            entitylist: Some(PathBuf::from("cli-entitylist.json")),
            ..Default::default()
        };
        let file = ParserConfig {
            blocklist: Some(PathBuf::from("file.json")),
            entitylist_url: Some("https://lists.example/entitylist.json".to_string()),
            disconnect_mapping_url: Some("https://lists.example/mapping.json".to_string()),
            ..Default::default()
        };
        let merged = cli.or(file);
        assert_eq!(merged.blocklist, None);
        assert_eq!(merged.blocklist_url.as_deref(), Some("http://127.0.0.1:9/services.json"));
        assert_eq!(merged.entitylist, Some(PathBuf::from("cli-entitylist.json")));
        assert_eq!(merged.entitylist_url, None);
        assert_eq!(merged.disconnect_mapping, None);
        assert_eq!(merged.disconnect_mapping_url.as_deref(), Some("https://lists.example/mapping.json"));
    }

    #[test]
    fn test_command_line_path_replaces_file_url() {
        let cli = ParserConfig {
            blocklist: Some(testdata("test-blocklist.json")),
            disconnect_mapping: Some(testdata("test-mapping.json")),
            ..Default::default()
        };
        let file = ParserConfig {
            blocklist_url: Some("http://127.0.0.1:9/test-blocklist.json".to_string()),
            disconnect_mapping_url: Some("http://127.0.0.1:9/test-mapping.json".to_string()),
            ..Default::default()
        };
        let parser = cli.or(file).build().unwrap();
        assert!(parser.blocklist().is_remapped());
    }

    #[test]
    fn test_load_and_build() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "blocklist = {:?}", testdata("test-blocklist.json").display().to_string()).unwrap();
        writeln!(file, "disconnect_mapping = {:?}", testdata("test-mapping.json").display().to_string()).unwrap();
        writeln!(file, "categories_to_exclude = [\"Content\"]").unwrap();

        let parser = ParserConfig::load(file.path()).unwrap().build().unwrap();
        assert!(parser.blocklist().is_remapped());
        assert!(!parser.should_block("content-trackera.example", None));
        assert!(parser.should_block("a.should-be-ad-tracker.example", None));
    }

    #[test]
    fn test_conflicting_sources() {
        let config = ParserConfig {
            blocklist: Some(testdata("test-blocklist.json")),
            blocklist_url: Some("http://localhost:8000/test-blocklist.json".to_string()),
            ..Default::default()
        };
        let err = config.build().err().unwrap();
        assert!(matches!(err, Error::SourceConflict { list: ListKind::Blocklist, .. }));
    }

    #[test]
    fn test_missing_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = ParserConfig::load(dir.path().join("tpt.toml")).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_missing_public_suffix_list() {
        let config = ParserConfig {
            blocklist: Some(testdata("test-blocklist.json")),
            public_suffix_list: Some(PathBuf::from("/nonexistent/public_suffix_list.dat")),
            ..Default::default()
        };
        let err = config.build().err().unwrap();
        assert!(matches!(err, Error::PublicSuffix(_)));
    }
}

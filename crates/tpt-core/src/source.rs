//! List source resolution and loading
//!
//! A list can be given inline, as a local path, or as a remote address.
//! Loading is blocking and one-shot; failures are returned as-is and never
//! retried here.

use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;

use crate::error::{Error, Result};
use crate::types::ListKind;

// =============================================================================
// Sources
// =============================================================================

/// Where a list comes from.
#[derive(Debug, Clone, PartialEq)]
pub enum ListSource<T> {
    Inline(T),
    Path(PathBuf),
    Url(String),
}

impl<T: DeserializeOwned> ListSource<T> {
    /// Load and decode the list.
    pub fn load(self, kind: ListKind) -> Result<T> {
        match self {
            Self::Inline(list) => Ok(list),
            Self::Path(path) => load_path(kind, &path),
            Self::Url(url) => load_url(kind, &url),
        }
    }
}

/// Source forms collected for one list before validation.
#[derive(Debug, Clone)]
pub struct SourceSpec<T> {
    pub inline: Option<T>,
    pub path: Option<PathBuf>,
    pub url: Option<String>,
}

impl<T> Default for SourceSpec<T> {
    fn default() -> Self {
        Self {
            inline: None,
            path: None,
            url: None,
        }
    }
}

impl<T> SourceSpec<T> {
    /// Check that at most one form was supplied.
    ///
    /// Returns `None` when nothing was given.
    pub fn resolve(self, kind: ListKind) -> Result<Option<ListSource<T>>> {
        let given = [self.inline.is_some(), self.path.is_some(), self.url.is_some()]
            .iter()
            .filter(|set| **set)
            .count();
        if given > 1 {
            return Err(Error::SourceConflict {
                list: kind,
                reason: format!(
                    "choose one of an inline list, a local path ({}) or a network location ({})",
                    self.path.as_deref().map(|p| p.display().to_string()).unwrap_or_default(),
                    self.url.as_deref().unwrap_or_default()
                ),
            });
        }

        Ok(if let Some(list) = self.inline {
            Some(ListSource::Inline(list))
        } else if let Some(path) = self.path {
            Some(ListSource::Path(path))
        } else {
            self.url.map(ListSource::Url)
        })
    }

    /// Like [`resolve`](Self::resolve), but a missing source is an error.
    pub fn resolve_required(self, kind: ListKind) -> Result<ListSource<T>> {
        self.resolve(kind)?.ok_or_else(|| Error::SourceConflict {
            list: kind,
            reason: "no location given; specify an inline list, a path or a URL".to_string(),
        })
    }
}

// =============================================================================
// Loading
// =============================================================================

/// Expand a leading `~` to the home directory.
pub fn expand_home(path: &Path) -> PathBuf {
    if let Ok(rest) = path.strip_prefix("~") {
        if let Some(home) = std::env::var_os("HOME") {
            return PathBuf::from(home).join(rest);
        }
    }
    path.to_path_buf()
}

fn load_path<T: DeserializeOwned>(kind: ListKind, path: &Path) -> Result<T> {
    let path = expand_home(path);
    let location = path.display().to_string();
    log::debug!("Loading {} from {}", kind, location);

    let content = fs::read_to_string(&path).map_err(|e| Error::SourceLoad {
        list: kind,
        location: location.clone(),
        reason: e.to_string(),
    })?;
    decode(kind, &location, &content)
}

fn load_url<T: DeserializeOwned>(kind: ListKind, url: &str) -> Result<T> {
    log::debug!("Fetching {} from {}", kind, url);

    let load_error = |reason: String| Error::SourceLoad {
        list: kind,
        location: url.to_string(),
        reason,
    };

    let resp = reqwest::blocking::get(url).map_err(|e| load_error(e.to_string()))?;
    let status = resp.status();
    if !status.is_success() {
        return Err(load_error(format!("bad status code {}", status.as_u16())));
    }
    let body = resp.text().map_err(|e| load_error(e.to_string()))?;
    decode(kind, url, &body)
}

fn decode<T: DeserializeOwned>(kind: ListKind, location: &str, content: &str) -> Result<T> {
    serde_json::from_str(content).map_err(|e| Error::SourceLoad {
        list: kind,
        location: location.to_string(),
        reason: format!("invalid JSON: {e}"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::list::{RawBlocklist, RawRemapTable};
    use crate::parser::tests::{serve_testdata, testdata};
    use std::io::Write;

    #[test]
    fn test_resolve_single_form() {
        let spec = SourceSpec::<RawRemapTable> {
            url: Some("https://lists.example/mapping.json".to_string()),
            ..Default::default()
        };
        let source = spec.resolve(ListKind::RemapTable).unwrap();
        assert_eq!(source, Some(ListSource::Url("https://lists.example/mapping.json".to_string())));

        let empty = SourceSpec::<RawRemapTable>::default();
        assert_eq!(empty.resolve(ListKind::RemapTable).unwrap(), None);
    }

    #[test]
    fn test_resolve_conflict() {
        let spec = SourceSpec::<RawBlocklist> {
            path: Some(PathBuf::from("blocklist.json")),
            url: Some("https://lists.example/blocklist.json".to_string()),
            ..Default::default()
        };
        let err = spec.resolve(ListKind::Blocklist).unwrap_err();
        assert!(matches!(err, Error::SourceConflict { list: ListKind::Blocklist, .. }));
    }

    #[test]
    fn test_resolve_required_missing() {
        let err = SourceSpec::<RawBlocklist>::default()
            .resolve_required(ListKind::Blocklist)
            .unwrap_err();
        assert!(matches!(err, Error::SourceConflict { .. }));
    }

    #[test]
    fn test_load_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"a.example": "Social"}}"#).unwrap();
        let table: RawRemapTable = ListSource::Path(file.path().to_path_buf())
            .load(ListKind::RemapTable)
            .unwrap();
        assert_eq!(table["a.example"], "Social");
    }

    #[test]
    fn test_load_missing_path() {
        let dir = tempfile::tempdir().unwrap();
        let err = ListSource::<RawRemapTable>::Path(dir.path().join("missing.json"))
            .load(ListKind::RemapTable)
            .unwrap_err();
        assert!(matches!(err, Error::SourceLoad { .. }));
    }

    #[test]
    fn test_load_invalid_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        let err = ListSource::<RawBlocklist>::Path(file.path().to_path_buf())
            .load(ListKind::Blocklist)
            .unwrap_err();
        assert!(matches!(err, Error::SourceLoad { .. }));
    }

    #[test]
    fn test_load_unreachable_url() {
        let err = ListSource::<RawBlocklist>::Url("http://127.0.0.1:9/blocklist.json".to_string())
            .load(ListKind::Blocklist)
            .unwrap_err();
        assert!(matches!(err, Error::SourceLoad { .. }));
    }

    #[test]
    fn test_load_url() {
        let base = serve_testdata(1);
        let remote: RawRemapTable = ListSource::Url(format!("{base}/test-mapping.json"))
            .load(ListKind::RemapTable)
            .unwrap();
        let local: RawRemapTable = ListSource::Path(testdata("test-mapping.json"))
            .load(ListKind::RemapTable)
            .unwrap();
        assert_eq!(remote, local);
    }

    #[test]
    fn test_load_url_bad_status() {
        let base = serve_testdata(1);
        let err = ListSource::<RawRemapTable>::Url(format!("{base}/missing-mapping.json"))
            .load(ListKind::RemapTable)
            .unwrap_err();
        assert!(err.to_string().contains("bad status code 404"), "{err}");
        assert!(matches!(err, Error::SourceLoad { list: ListKind::RemapTable, .. }));
    }

    #[test]
    fn test_expand_home() {
        assert_eq!(expand_home(Path::new("/tmp/list.json")), PathBuf::from("/tmp/list.json"));
        if let Some(home) = std::env::var_os("HOME") {
            assert_eq!(
                expand_home(Path::new("~/list.json")),
                PathBuf::from(home).join("list.json")
            );
        }
    }
}

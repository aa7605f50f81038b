//! Tracking Protection Core Library
//!
//! This crate parses the Disconnect tracking-protection list and classifies
//! request URLs against it the way Firefox's URL classifier does.
//!
//! # Architecture
//!
//! Lists are loaded once (inline, from a file, or over HTTP), normalized into
//! flat lookup tables, and then only read. A [`DisconnectParser`] is `Send +
//! Sync` and can be shared between threads behind an `Arc`.
//!
//! # Modules
//!
//! - `config`: TOML parser configuration
//! - `list`: as-loaded list formats and their normalization
//! - `matcher`: request classification and list queries
//! - `parser`: parser construction
//! - `psl`: registrable-domain lookups
//! - `source`: list source resolution and loading
//! - `types`: shared type definitions
//! - `url`: scheme and host extraction
//!
//! # Example
//!
//! ```
//! use tpt_core::{DisconnectParser, MatchDecision, RawBlocklist};
//!
//! let list: RawBlocklist = serde_json::from_str(r#"{
//!     "categories": {
//!         "Advertising": [
//!             { "Tracker": { "http://tracker.example/": ["tracker.example"] } }
//!         ]
//!     }
//! }"#).unwrap();
//!
//! let parser = DisconnectParser::builder().blocklist(list).build().unwrap();
//! let result = parser.should_block_with_match("https://cdn.tracker.example/t.js", None);
//! assert_eq!(result.decision, MatchDecision::Blacklisted);
//! assert_eq!(result.matched, Some("tracker.example"));
//! ```

pub mod config;
pub mod error;
pub mod list;
pub mod matcher;
pub mod parser;
pub mod psl;
pub mod source;
pub mod types;
pub mod url;

// Re-export commonly used types
pub use config::ParserConfig;
pub use error::{Error, Result};
pub use list::{RawBlocklist, RawEntity, RawEntitylist, RawOrganization, RawRemapTable};
pub use parser::{DisconnectParser, DisconnectParserBuilder};
pub use psl::{BundledOracle, HeuristicOracle, PslOracle, PublicSuffixOracle};
pub use source::ListSource;
pub use types::{ListKind, MatchDecision, MatchResult, SubCategory};

//! Tracking Protection Filter List Converter
//!
//! This crate converts ABP/uBO filter lists (EasyList, EasyPrivacy, ...) into
//! Disconnect-format blocklists and entitylists that `tpt-core` can load.

pub mod emit;
pub mod error;
pub mod parser;

pub use emit::{convert, write_lists, Conversion, ConvertOptions, ConvertStats};
pub use error::CompileError;
pub use parser::{parse_filter_list, AbpRule, FilterRules};

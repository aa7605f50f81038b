//! List formats and normalization
//!
//! This module turns the as-loaded JSON resources into the lookup tables the
//! matcher works on.

mod blocklist;
mod entitylist;
mod raw;
mod remap;

pub use blocklist::Blocklist;
pub use entitylist::Entitylist;
pub use raw::*;
pub use remap::{build_remap, RemapTable};

//! Output generation for the contest list.
//!
//! # Submodules
//!
//! - [`json`]: Filters, orders and serializes contests as indented JSON, to
//!   standard output or to a file

pub mod json;

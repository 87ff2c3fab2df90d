//! backdrop - native tooling for the decorative canvas backdrop.
//!
//! The effects themselves live in `backdrop-fx`; this crate loads their
//! configuration from disk, renders them headless to SVG and generates the
//! page that hosts them in a browser.

pub mod config;
pub mod page;
pub mod snapshot;

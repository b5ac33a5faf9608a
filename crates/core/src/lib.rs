//! Core library: configuration, scan import, tag parsing, preview and the
//! command dispatch used by every front end.

pub mod config;
pub mod error;
pub mod importer;
pub mod organizer;
pub mod preview;
pub mod tags;

pub use error::ImportError;
pub use importer::{FileFilter, ImportSummary};
pub use organizer::Organizer;

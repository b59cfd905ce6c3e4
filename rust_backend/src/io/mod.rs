//! Snapshot loading utilities.
//!
//! Loaders turn an exported JSON dump of the record store into [`Snapshot`]
//! rows, with error context attached for the caller.
//!
//! # Example
//!
//! ```no_run
//! use dealer_ops::core::DateField;
//! use dealer_ops::io::loaders::SnapshotLoader;
//! use std::path::Path;
//!
//! let snapshot = SnapshotLoader::load_from_file(Path::new("snapshot.json"))
//!     .expect("Failed to load");
//! let arrivals = snapshot.records(&DateField::RECEIVED_AT.into(), Some("type"));
//! println!("Loaded {} rows", arrivals.len());
//! ```

pub mod loaders;


pub use loaders::{Snapshot, SnapshotLayout, SnapshotLoader, SnapshotRow};

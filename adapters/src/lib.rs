pub mod file;

pub use file::{FileVenue, SnapshotDocument, SnapshotError};

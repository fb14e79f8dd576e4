//! Akira VMD - Motion file codec
//!
//! Recorded clips are resampled, deduplicated and written as VMD
//! (Vocaloid Motion Data 0002) files. The reader parses the same layout
//! back, which is what the `inspect` command and the round-trip tests use.

pub mod config;
pub mod exporter;
pub mod layout;
pub mod reader;

pub use config::*;
pub use exporter::*;
pub use layout::*;
pub use reader::*;

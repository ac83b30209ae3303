//! Single-header builder for the Lithium C++ libraries.
//!
//! Inlines each library's local includes into one self-contained header,
//! hoists and deduplicates system includes, and only rewrites outputs whose
//! content changed.

pub mod classify;
pub mod config;
pub mod emit;
pub mod error;
pub mod generate;
pub mod inline;
pub mod install;
pub mod preflight;
pub mod process;
pub mod timing;
pub mod writer;

pub use config::{Config, LibrarySpec, RewriteRule};
pub use error::{Error, Result};
pub use generate::{generate_all, Mode};
pub use inline::{Inliner, OutputBuffer};
pub use writer::WriteOutcome;

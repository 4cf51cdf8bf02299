//! Ebook format conversion
//!
//! This module wraps the external document converter behind a trait so the
//! pipeline can be exercised without the real tool installed.
//!
//! ## Architecture
//!
//! The core abstraction is the [`FormatConverter`] trait:
//!
//! - [`CliConverter`]: runs Calibre's `ebook-convert <input> <output>`, which
//!   infers the target format from the output path's extension
//!
//! ## Usage
//!
//! ```no_run
//! use kindle_digest::converter::{CliConverter, FormatConverter};
//! use std::path::Path;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let converter = CliConverter::from_path()
//!         .expect("ebook-convert not found")
//!         .with_timeout(Duration::from_secs(120));
//!
//!     converter
//!         .convert(Path::new("digest.html"), Path::new("digest.epub"))
//!         .await?;
//!     Ok(())
//! }
//! ```

mod cli;
mod traits;

pub use cli::{CliConverter, DEFAULT_BINARY};
pub use traits::FormatConverter;

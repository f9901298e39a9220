//! Sublearn Core - subtitle alignment and merge engine
//!
//! Turns an original-language track, a dubbed-language track and an
//! optional translation of the dub into one multi-layer ASS document
//! where every line appears when its dub counterpart is spoken.
//!
//! This crate has no UI, network or file-tree dependencies. Callers hand
//! it subtitle text and get a document plus a diagnostics report back.
//!
//! ```no_run
//! use sublearn_core::align::Provenance;
//! use sublearn_core::config::Settings;
//! use sublearn_core::pipeline::{self, PipelineInput, TrackSource};
//!
//! let input = PipelineInput {
//!     original: TrackSource::read("movie.en.srt", "en", Provenance::TitleSearched).unwrap(),
//!     dub: TrackSource::read("movie.hu.srt", "hu", Provenance::HashMatched).unwrap(),
//!     native: None,
//! };
//! let output = pipeline::run_to_file(&input, &Settings::default(), "movie.sublearn.ass").unwrap();
//! for diagnostic in output.diagnostics.iter() {
//!     println!("{}", diagnostic);
//! }
//! ```

pub mod align;
pub mod batch;
pub mod config;
pub mod diagnostics;
pub mod logging;
pub mod merge;
pub mod pipeline;
pub mod subtitles;
pub mod track;

pub use diagnostics::{Diagnostic, DiagnosticKind, Diagnostics};
pub use pipeline::{PipelineError, PipelineInput, PipelineOutput};
pub use track::{Role, Track};

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

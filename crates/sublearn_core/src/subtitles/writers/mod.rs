//! Document writers.
//!
//! Each writer is a pure function that takes a document and returns a formatted string.

mod ass;

pub(crate) use ass::BACKSLASH_GUARD;
pub use ass::{format_ass_text, format_ass_time, write_ass};

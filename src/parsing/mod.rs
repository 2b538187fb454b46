//! RAR header parsing modules.

pub mod marker_header;
pub mod rar5;

pub use marker_header::{MarkerHeaderParser, RarVersion};

//! Population-level statistics for font corpora.
//!
//! The centre of the crate is the coverage matrix: given the code points
//! each font of a corpus supports, [`build`] produces a dense
//! fonts × code points [`SupportMatrix`], and [`reduce`] crops and sorts it
//! by support density into a [`ReducedMatrix`] ready to be drawn one point
//! per supported cell.
//!
//! ```
//! use font_census::{build, reduce, CodePointSet, ReductionPolicy};
//!
//! let fonts = [
//!     CodePointSet::from([0x41, 0x42]),
//!     CodePointSet::from([0x41]),
//!     CodePointSet::new(),
//! ];
//! let (matrix, index) = build(&fonts).unwrap();
//! let square = reduce(&matrix, &index, ReductionPolicy::SquareCrop);
//! assert_eq!(square.font_rows(), &[0, 1]);
//! assert_eq!(square.codepoints(), &[0x41, 0x42]);
//! ```
//!
//! The remaining modules gather the inputs: [`corpus`] finds font files and
//! runs extractions over them in parallel, [`FontFile`] reads code points,
//! metrics and outlines with [skrifa], and [`stats`] summarizes the
//! per-font values.
//!
//! [skrifa]: https://docs.rs/skrifa

mod codepoints;
pub mod corpus;
mod error;
mod font;
mod matrix;
pub mod pen;
mod reduce;
pub mod stats;

pub use codepoints::{CodePointSet, MAX_CODEPOINT};
pub use corpus::{discover, extract, CorpusConfig, Extraction};
pub use error::{BuildError, CorpusError, ExtractError};
pub use font::{FontFile, DEFAULT_UNITS_PER_EM, DEFAULT_WEIGHT_CLASS};
pub use matrix::{build, CodePointIndex, SupportMatrix};
pub use reduce::{density_order, reduce, ReducedMatrix, ReductionPolicy};

//! Error types.

use std::path::PathBuf;

use skrifa::outline::DrawError;
use skrifa::raw::ReadError;
use thiserror::Error;

/// An error produced while extracting data from a single font file.
///
/// Every variant carries the path of the offending font so that a corpus
/// run can report it and carry on with the remaining fonts.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("failed to read font {}: {}", .0.display(), .1)]
    Io(PathBuf, #[source] std::io::Error),
    #[error("failed to parse font {}: {}", .0.display(), .1)]
    Read(PathBuf, ReadError),
    #[error("failed to extract outlines from {}: {}", .0.display(), .1)]
    Draw(PathBuf, DrawError),
}

impl ExtractError {
    /// The path of the font that failed.
    pub fn path(&self) -> &std::path::Path {
        match self {
            ExtractError::Io(path, _) | ExtractError::Read(path, _) | ExtractError::Draw(path, _) => {
                path
            }
        }
    }
}

/// An error produced when building a coverage matrix from malformed input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    #[error("font {font} has code point {codepoint:#X}, which is outside the Unicode range")]
    InvalidInput { font: usize, codepoint: u32 },
}

/// An error that stops a corpus run as a whole.
#[derive(Debug, Error)]
pub enum CorpusError {
    #[error("input {} does not exist", .0.display())]
    MissingInput(PathBuf),
    #[error("failed to read directory {}: {}", .0.display(), .1)]
    Io(PathBuf, #[source] std::io::Error),
    #[error("failed to start the worker pool: {0}")]
    Pool(#[from] rayon::ThreadPoolBuildError),
}

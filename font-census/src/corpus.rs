//! Finding the fonts of a corpus and extracting data from them in parallel.

use std::path::{Path, PathBuf};

use rayon::prelude::*;

use crate::error::{CorpusError, ExtractError};
use crate::font::FontFile;

/// Which files make up a corpus and how to process them.
#[derive(Clone, Debug)]
pub struct CorpusConfig {
    /// Font files, or directories searched recursively.
    pub inputs: Vec<PathBuf>,
    /// File extensions (case insensitive, without the dot) collected from
    /// directories.
    pub extensions: Vec<String>,
    /// Paths containing any of these substrings are skipped.
    pub exclude: Vec<String>,
    /// Number of worker threads; `None` uses one per available core.
    pub jobs: Option<usize>,
}

impl Default for CorpusConfig {
    fn default() -> Self {
        Self {
            inputs: Vec::new(),
            extensions: vec!["ttf".into(), "otf".into()],
            exclude: vec!["adobeblank".into()],
            jobs: None,
        }
    }
}

impl CorpusConfig {
    pub fn new(inputs: impl IntoIterator<Item = impl Into<PathBuf>>) -> Self {
        Self {
            inputs: inputs.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }

    fn has_font_extension(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| {
                self.extensions
                    .iter()
                    .any(|wanted| wanted.eq_ignore_ascii_case(ext))
            })
    }

    fn is_excluded(&self, path: &Path) -> bool {
        let path = path.to_string_lossy();
        self.exclude.iter().any(|keyword| path.contains(keyword.as_str()))
    }
}

/// Lists the font files of the corpus, sorted and without duplicates.
///
/// Files named directly in the inputs are kept whatever their extension.
/// Unreadable entries below an input directory are logged and skipped.
/// Symlinks found while walking a directory are not followed.
pub fn discover(config: &CorpusConfig) -> Result<Vec<PathBuf>, CorpusError> {
    let mut found = Vec::new();
    for input in &config.inputs {
        if input.is_dir() {
            walk(config, input, &mut found)?;
        } else if input.is_file() {
            found.push(input.clone());
        } else {
            return Err(CorpusError::MissingInput(input.clone()));
        }
    }
    found.retain(|path| !config.is_excluded(path));
    found.sort();
    found.dedup();
    log::info!("found {} font files", found.len());
    Ok(found)
}

fn walk(config: &CorpusConfig, dir: &Path, found: &mut Vec<PathBuf>) -> Result<(), CorpusError> {
    let entries = std::fs::read_dir(dir).map_err(|err| CorpusError::Io(dir.to_owned(), err))?;
    for entry in entries {
        // file_type does not follow symlinks
        let (path, file_type) =
            match entry.and_then(|entry| Ok((entry.path(), entry.file_type()?))) {
                Ok(entry) => entry,
                Err(err) => {
                    log::warn!("skipping entry of {}: {err}", dir.display());
                    continue;
                }
            };
        if file_type.is_dir() {
            if let Err(err) = walk(config, &path, found) {
                log::warn!("{err}");
            }
        } else if file_type.is_symlink() {
            log::debug!("not following symlink {}", path.display());
        } else if config.has_font_extension(&path) {
            found.push(path);
        }
    }
    Ok(())
}

/// The outcome of running an extraction over a corpus.
#[derive(Debug)]
pub struct Extraction<T> {
    /// Fonts that were processed successfully, in input order.
    pub fonts: Vec<PathBuf>,
    /// One value per entry of `fonts`.
    pub values: Vec<T>,
    /// Fonts that could not be processed, in input order.
    pub failures: Vec<ExtractError>,
}

impl<T> Extraction<T> {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Runs `op` on every font of `paths` using a pool of `jobs` threads.
///
/// Results are collected by input position, so `values[i]` always belongs
/// to `fonts[i]` regardless of the order in which workers finish. A font
/// that fails to open or to process is logged, recorded in `failures` and
/// left out; it is not retried.
pub fn extract<T, F>(
    paths: &[PathBuf],
    jobs: Option<usize>,
    op: F,
) -> Result<Extraction<T>, CorpusError>
where
    T: Send,
    F: Fn(&FontFile) -> Result<T, ExtractError> + Sync,
{
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(jobs.unwrap_or(0))
        .build()?;
    log::info!(
        "extracting from {} fonts on {} threads",
        paths.len(),
        pool.current_num_threads()
    );
    let results: Vec<_> = pool.install(|| {
        paths
            .par_iter()
            .map(|path| FontFile::open(path).and_then(|font| op(&font)))
            .collect()
    });

    let mut extraction = Extraction {
        fonts: Vec::with_capacity(paths.len()),
        values: Vec::with_capacity(paths.len()),
        failures: Vec::new(),
    };
    for (path, result) in paths.iter().zip(results) {
        match result {
            Ok(value) => {
                extraction.fonts.push(path.clone());
                extraction.values.push(value);
            }
            Err(err) => {
                log::warn!("excluding font: {err}");
                extraction.failures.push(err);
            }
        }
    }
    if !extraction.failures.is_empty() {
        log::info!(
            "{} of {} fonts could not be processed",
            extraction.failures.len(),
            paths.len()
        );
    }
    Ok(extraction)
}

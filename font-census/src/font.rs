//! Loading a font file and extracting the raw data for the statistics.

use std::path::{Path, PathBuf};

use skrifa::instance::{LocationRef, Size};
use skrifa::outline::{DrawError, DrawSettings, OutlineGlyph};
use skrifa::raw::TableProvider;
use skrifa::{FontRef, MetadataProvider};

use crate::codepoints::CodePointSet;
use crate::error::ExtractError;
use crate::pen::{CommandCountPen, PointCollector};
use crate::stats::CommandBreakdown;

/// Units per em assumed when a font has no usable `head` table.
pub const DEFAULT_UNITS_PER_EM: u16 = 1000;

/// Weight class assumed when a font has no `OS/2` table.
pub const DEFAULT_WEIGHT_CLASS: u16 = 400;

enum FontData {
    Mapped(memmap2::Mmap),
    Owned(Vec<u8>),
}

impl AsRef<[u8]> for FontData {
    fn as_ref(&self) -> &[u8] {
        match self {
            FontData::Mapped(map) => map.as_ref(),
            FontData::Owned(data) => data.as_slice(),
        }
    }
}

/// A single font, either memory mapped from disk or held in memory.
///
/// For collections, `index` selects the member font.
pub struct FontFile {
    path: PathBuf,
    data: FontData,
    index: u32,
}

impl FontFile {
    /// Maps the first font of the file at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, ExtractError> {
        Self::open_index(path, 0)
    }

    /// Maps the font at `index` of the file (or collection) at `path`.
    pub fn open_index(path: impl AsRef<Path>, index: u32) -> Result<Self, ExtractError> {
        let path = path.as_ref().to_owned();
        let file = std::fs::File::open(&path).map_err(|err| ExtractError::Io(path.clone(), err))?;
        // SAFETY: the map is read only and font files are not expected to
        // change while a census runs.
        let map = unsafe { memmap2::Mmap::map(&file) }
            .map_err(|err| ExtractError::Io(path.clone(), err))?;
        Self::new(path, FontData::Mapped(map), index)
    }

    /// Wraps font data that is already in memory. `path` is only used to
    /// label errors.
    pub fn from_data(path: impl Into<PathBuf>, data: Vec<u8>) -> Result<Self, ExtractError> {
        Self::new(path.into(), FontData::Owned(data), 0)
    }

    fn new(path: PathBuf, data: FontData, index: u32) -> Result<Self, ExtractError> {
        let font = Self { path, data, index };
        font.font()?;
        Ok(font)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn font(&self) -> Result<FontRef<'_>, ExtractError> {
        FontRef::from_index(self.data.as_ref(), self.index)
            .map_err(|err| ExtractError::Read(self.path.clone(), err))
    }

    /// The code points mapped by the font's preferred Unicode character map.
    ///
    /// With a `limit`, only code points strictly below it are returned
    /// (`0x10000` restricts to the Basic Multilingual Plane). A font without
    /// a usable character map yields an empty set.
    pub fn code_points(&self, limit: Option<u32>) -> Result<CodePointSet, ExtractError> {
        let font = self.font()?;
        let limit = limit.unwrap_or(u32::MAX);
        Ok(font
            .charmap()
            .mappings()
            .filter_map(|(cp, _)| (cp < limit).then_some(cp))
            .collect())
    }

    pub fn units_per_em(&self) -> Result<u16, ExtractError> {
        let font = self.font()?;
        Ok(font
            .head()
            .ok()
            .map(|head| head.units_per_em())
            .unwrap_or(DEFAULT_UNITS_PER_EM))
    }

    /// The `OS/2` `usWeightClass` of the font.
    pub fn weight_class(&self) -> Result<u16, ExtractError> {
        let font = self.font()?;
        Ok(font
            .os2()
            .ok()
            .map(|os2| os2.us_weight_class())
            .unwrap_or(DEFAULT_WEIGHT_CLASS))
    }

    /// Per glyph, the number of outline commands it is drawn with.
    pub fn glyph_command_counts(&self) -> Result<Vec<u32>, ExtractError> {
        let mut counts = Vec::new();
        self.for_each_outline(|glyph| {
            let mut pen = CommandCountPen::default();
            glyph.draw(unhinted(), &mut pen)?;
            counts.push(pen.into_count());
            Ok(())
        })?;
        Ok(counts)
    }

    /// Outline commands of all glyphs, totalled by kind.
    pub fn command_breakdown(&self) -> Result<CommandBreakdown, ExtractError> {
        let mut breakdown = CommandBreakdown::default();
        self.for_each_outline(|glyph| {
            let mut pen = CommandCountPen::default();
            glyph.draw(unhinted(), &mut pen)?;
            breakdown.add_glyph(pen.counts());
            Ok(())
        })?;
        Ok(breakdown)
    }

    /// Every outline point of every glyph, in em units.
    pub fn outline_coordinates(&self) -> Result<Vec<[f32; 2]>, ExtractError> {
        let upem = match self.units_per_em()? {
            0 => DEFAULT_UNITS_PER_EM,
            upem => upem,
        };
        let mut collector = PointCollector::new(1.0 / upem as f32);
        self.for_each_outline(|glyph| glyph.draw(unhinted(), &mut collector).map(|_| ()))?;
        Ok(collector.into_points())
    }

    fn for_each_outline(
        &self,
        mut f: impl FnMut(&OutlineGlyph<'_>) -> Result<(), DrawError>,
    ) -> Result<(), ExtractError> {
        let font = self.font()?;
        for (_, glyph) in font.outline_glyphs().iter() {
            f(&glyph).map_err(|err| ExtractError::Draw(self.path.clone(), err))?;
        }
        Ok(())
    }
}

/// Unhinted drawing at the default location, in font units.
fn unhinted() -> DrawSettings<'static> {
    DrawSettings::unhinted(Size::unscaled(), LocationRef::default())
}

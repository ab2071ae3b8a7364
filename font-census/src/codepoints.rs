//! The set of code points supported by a single font.

use serde::Serialize;

/// The largest value a Unicode code point can take.
pub const MAX_CODEPOINT: u32 = 0x10FFFF;

/// The code points a single font supports.
///
/// Stored sorted and deduplicated. An empty set is a valid, distinct state:
/// it describes a font without a usable character map, which still takes a
/// row in the coverage matrix.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct CodePointSet(Vec<u32>);

impl CodePointSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, codepoint: u32) -> bool {
        self.0.binary_search(&codepoint).is_ok()
    }

    /// Code points in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = u32> + '_ {
        self.0.iter().copied()
    }

    pub fn as_slice(&self) -> &[u32] {
        &self.0
    }

    /// The largest code point in the set, if any.
    pub fn max(&self) -> Option<u32> {
        self.0.last().copied()
    }
}

impl FromIterator<u32> for CodePointSet {
    fn from_iter<I: IntoIterator<Item = u32>>(iter: I) -> Self {
        let mut codepoints: Vec<_> = iter.into_iter().collect();
        codepoints.sort_unstable();
        codepoints.dedup();
        Self(codepoints)
    }
}

impl From<Vec<u32>> for CodePointSet {
    fn from(value: Vec<u32>) -> Self {
        value.into_iter().collect()
    }
}

impl<const N: usize> From<[u32; N]> for CodePointSet {
    fn from(value: [u32; N]) -> Self {
        value.into_iter().collect()
    }
}

impl<'a> IntoIterator for &'a CodePointSet {
    type Item = u32;
    type IntoIter = std::iter::Copied<std::slice::Iter<'a, u32>>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sorted_and_deduplicated() {
        let set: CodePointSet = [0x42, 0x41, 0x42, 0x20].into();
        assert_eq!(set.as_slice(), &[0x20, 0x41, 0x42]);
        assert_eq!(set.len(), 3);
        assert_eq!(set.max(), Some(0x42));
    }

    #[test]
    fn membership() {
        let set: CodePointSet = vec![0x1F600, 0x61].into();
        assert!(set.contains(0x61));
        assert!(set.contains(0x1F600));
        assert!(!set.contains(0x62));
    }

    #[test]
    fn empty_set_is_valid() {
        let set = CodePointSet::new();
        assert!(set.is_empty());
        assert_eq!(set.max(), None);
        assert_eq!(set.iter().count(), 0);
    }
}

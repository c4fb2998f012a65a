//! Sampling without replacement over a data region.

use std::fmt;

use rand::Rng;

use crate::region::DataRegion;

/// 1-based row number of the first sampled row in the output table; row 1
/// holds the header
pub const FIRST_OUTPUT_ROW: u32 = 2;

/// How many rows to take
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize),
    serde(tag = "mode", content = "value", rename_all = "lowercase")
)]
pub enum SampleSpec {
    /// Share of the data rows, in `[0, 100]`
    Percentage(f64),
    /// Absolute number of rows
    Count(u32),
}

impl SampleSpec {
    /// Number of rows to take from a region of `row_count` rows, clamped to
    /// `row_count`.
    ///
    /// A percentage takes `floor(percentage / 100 * row_count)` rows; a NaN
    /// or negative percentage takes none.
    pub fn target_count(&self, row_count: u32) -> u32 {
        match *self {
            SampleSpec::Percentage(p) => {
                let target = (p / 100.0 * row_count as f64).floor();
                if target.is_nan() || target <= 0.0 {
                    0
                } else if target >= row_count as f64 {
                    row_count
                } else {
                    target as u32
                }
            }
            SampleSpec::Count(n) => n.min(row_count),
        }
    }
}

impl fmt::Display for SampleSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SampleSpec::Percentage(p) => write!(f, "{p}%"),
            SampleSpec::Count(n) => write!(f, "{n} rows"),
        }
    }
}

/// One sampled row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct SampleEntry {
    /// 0-based row index in the source worksheet
    pub original: u32,
    /// 1-based row number in the output table
    pub new: u32,
}

/// Sampled rows in draw order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SampleResult {
    entries: Vec<SampleEntry>,
}

impl SampleResult {
    pub fn entries(&self) -> &[SampleEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Source row indices in draw order
    pub fn original_indices(&self) -> impl Iterator<Item = u32> + '_ {
        self.entries.iter().map(|e| e.original)
    }

    pub fn into_entries(self) -> Vec<SampleEntry> {
        self.entries
    }
}

/// Draw `target` distinct rows of `region` uniformly at random.
///
/// `target` is clamped to the region size. Entries keep the draw order and
/// are numbered from [`FIRST_OUTPUT_ROW`].
pub fn sample<R: Rng + ?Sized>(region: &DataRegion, target: u32, rng: &mut R) -> SampleResult {
    let amount = target.min(region.row_count);
    let picks = rand::seq::index::sample(rng, region.row_count as usize, amount as usize);

    let entries = picks
        .into_iter()
        .zip(FIRST_OUTPUT_ROW..)
        .map(|(offset, new)| SampleEntry {
            original: region.first + offset as u32,
            new,
        })
        .collect();

    SampleResult { entries }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    #[test]
    fn test_target_count() {
        assert_eq!(SampleSpec::Percentage(50.0).target_count(10), 5);
        // 29 / 100 * 100 is 28.999999999999996 in f64
        assert_eq!(SampleSpec::Percentage(29.0).target_count(100), 28);
        assert_eq!(SampleSpec::Percentage(57.0).target_count(100), 56);
        assert_eq!(SampleSpec::Percentage(58.0).target_count(50), 28);
        assert_eq!(SampleSpec::Percentage(70.0).target_count(90), 62);
        assert_eq!(SampleSpec::Percentage(33.0).target_count(10), 3);
        assert_eq!(SampleSpec::Percentage(0.0).target_count(10), 0);
        assert_eq!(SampleSpec::Percentage(100.0).target_count(7), 7);
        assert_eq!(SampleSpec::Percentage(250.0).target_count(7), 7);
        assert_eq!(SampleSpec::Percentage(f64::NAN).target_count(7), 0);
        assert_eq!(SampleSpec::Count(3).target_count(10), 3);
        assert_eq!(SampleSpec::Count(30).target_count(10), 10);
    }

    #[test]
    fn test_sample_entries() {
        let region = DataRegion {
            first: 4,
            row_count: 20,
        };
        let mut rng = StdRng::seed_from_u64(7);
        let result = sample(&region, 6, &mut rng);

        assert_eq!(result.len(), 6);
        let news: Vec<u32> = result.entries().iter().map(|e| e.new).collect();
        assert_eq!(news, vec![2, 3, 4, 5, 6, 7]);

        let originals: HashSet<u32> = result.original_indices().collect();
        assert_eq!(originals.len(), 6);
        assert!(originals.iter().all(|&i| region.contains(i)));
    }

    #[test]
    fn test_sample_clamps_and_handles_zero() {
        let region = DataRegion {
            first: 1,
            row_count: 3,
        };
        let mut rng = StdRng::seed_from_u64(1);
        let mut all: Vec<u32> = sample(&region, 10, &mut rng).original_indices().collect();
        all.sort_unstable();
        assert_eq!(all, vec![1, 2, 3]);

        assert!(sample(&region, 0, &mut rng).is_empty());
        assert!(sample(&DataRegion::empty(1), 5, &mut rng).is_empty());
    }

    #[test]
    fn test_same_seed_same_draw() {
        let region = DataRegion {
            first: 1,
            row_count: 50,
        };
        let a = sample(&region, 10, &mut StdRng::seed_from_u64(42));
        let b = sample(&region, 10, &mut StdRng::seed_from_u64(42));
        assert_eq!(a, b);
    }
}

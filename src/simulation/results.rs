// src/simulation/results.rs
use std::collections::BTreeMap;
use std::fmt;

/// Histogram of observed bit-strings from a sampling run.
///
/// Bit-strings list the highest measured qubit first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleCounts {
    shots: u64,
    counts: BTreeMap<String, u64>,
}

impl SampleCounts {
    /// Creates an empty histogram for `shots` executions. (Internal visibility)
    pub(crate) fn new(shots: u64) -> Self {
        Self {
            shots,
            counts: BTreeMap::new(),
        }
    }

    /// Records one observation of `bitstring`. (Internal visibility)
    pub(crate) fn record(&mut self, bitstring: String) {
        *self.counts.entry(bitstring).or_insert(0) += 1;
    }

    /// Number of shots the histogram was built from.
    pub fn shots(&self) -> u64 {
        self.shots
    }

    /// Count for `bitstring`, zero if it was never observed.
    pub fn get(&self, bitstring: &str) -> u64 {
        self.counts.get(bitstring).copied().unwrap_or(0)
    }

    /// All observed bit-strings and their counts.
    pub fn counts(&self) -> &BTreeMap<String, u64> {
        &self.counts
    }

    /// The most frequently observed bit-string. Ties resolve to the
    /// lexicographically smallest.
    pub fn most_frequent(&self) -> Option<&str> {
        self.counts
            .iter()
            .fold(None, |best: Option<(&String, u64)>, (k, v)| match best {
                Some((_, bv)) if bv >= *v => best,
                _ => Some((k, *v)),
            })
            .map(|(k, _)| k.as_str())
    }

    /// Observed frequency of `bitstring`.
    pub fn probability(&self, bitstring: &str) -> f64 {
        if self.shots == 0 {
            return 0.0;
        }
        self.get(bitstring) as f64 / self.shots as f64
    }
}

impl fmt::Display for SampleCounts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Sample Counts ({} shots):", self.shots)?;
        if self.counts.is_empty() {
            writeln!(f, "  No outcomes were recorded.")?;
        } else {
            for (bits, count) in &self.counts {
                writeln!(f, "    {}: {}", bits, count)?;
            }
        }
        Ok(())
    }
}

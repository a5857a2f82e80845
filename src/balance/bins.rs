use crate::Result;
use ohno::bail;

/// Star-count strata defined by ascending breakpoints.
///
/// Breakpoints `[b1, ..., bn]` define `n + 1` right-closed bins:
/// `[0, b1], (b1, b2], ..., (bn, inf)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StarBins {
    breakpoints: Vec<u64>,
}

impl StarBins {
    pub fn new(breakpoints: &[u64]) -> Result<Self> {
        if let Some(pair) = breakpoints.windows(2).find(|pair| pair[0] >= pair[1]) {
            bail!("star_bins must be strictly ascending, but {} is followed by {}", pair[0], pair[1]);
        }

        Ok(Self {
            breakpoints: breakpoints.to_vec(),
        })
    }

    /// Number of bins, including the open-ended top bin
    #[must_use]
    pub fn count(&self) -> usize {
        self.breakpoints.len() + 1
    }

    /// Index of the bin holding `stars`; a value equal to a breakpoint belongs to the lower bin
    #[must_use]
    pub fn bin_of(&self, stars: u64) -> usize {
        self.breakpoints.partition_point(|&b| b < stars)
    }

    /// Human-readable label of a bin, such as `0-10`, `11-100` or `101+`
    #[must_use]
    pub fn label(&self, index: usize) -> String {
        let lower = match index {
            0 => 0,
            i => self.breakpoints.get(i - 1).map_or(0, |b| b + 1),
        };

        self.breakpoints
            .get(index)
            .map_or_else(|| format!("{lower}+"), |upper| format!("{lower}-{upper}"))
    }

    /// Labels of all bins, lowest first
    #[must_use]
    pub fn labels(&self) -> Vec<String> {
        (0..self.count()).map(|i| self.label(i)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bin_assignment_is_right_closed() {
        let bins = StarBins::new(&[10, 100]).unwrap();
        assert_eq!(bins.bin_of(0), 0);
        assert_eq!(bins.bin_of(10), 0);
        assert_eq!(bins.bin_of(11), 1);
        assert_eq!(bins.bin_of(99), 1);
        assert_eq!(bins.bin_of(100), 1);
        assert_eq!(bins.bin_of(101), 2);
        assert_eq!(bins.bin_of(5000), 2);
    }

    #[test]
    fn test_labels() {
        let bins = StarBins::new(&[10, 100]).unwrap();
        assert_eq!(bins.label(bins.bin_of(10)), "0-10");
        assert_eq!(bins.label(bins.bin_of(99)), "11-100");
        assert_eq!(bins.label(bins.bin_of(5000)), "101+");
        assert_eq!(bins.labels(), vec!["0-10", "11-100", "101+"]);
    }

    #[test]
    fn test_no_breakpoints_is_single_bin() {
        let bins = StarBins::new(&[]).unwrap();
        assert_eq!(bins.count(), 1);
        assert_eq!(bins.bin_of(123_456), 0);
        assert_eq!(bins.label(0), "0+");
    }

    #[test]
    fn test_default_breakpoints() {
        let bins = StarBins::new(&[10, 100, 500, 5000]).unwrap();
        assert_eq!(bins.count(), 5);
        assert_eq!(bins.labels(), vec!["0-10", "11-100", "101-500", "501-5000", "5001+"]);
    }

    #[test]
    fn test_unsorted_breakpoints_rejected() {
        assert!(StarBins::new(&[100, 10]).is_err());
        assert!(StarBins::new(&[10, 10]).is_err());
    }
}

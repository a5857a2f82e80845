use super::StarBins;
use crate::dataset::{BalancedRecord, RawRepoRecord};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::index;
use std::collections::HashSet;

const LOG_TARGET: &str = "     sampler";

/// Outcome of sampling a single bin
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinSummary {
    pub label: String,
    pub population: usize,
    pub sampled: usize,
}

/// A balanced dataset along with how it was assembled
#[derive(Debug, Clone)]
pub struct BalancedSample {
    pub rows: Vec<BalancedRecord>,
    pub quota: usize,
    pub bins: Vec<BinSummary>,
    pub top_up: usize,
    /// Rows missing from the target because the dataset ran out of unsampled records
    pub shortfall: usize,
}

/// Draws a fixed-size, star-count stratified sample.
#[derive(Debug, Clone)]
pub struct StratifiedSampler {
    bins: StarBins,
    target_rows: usize,
    sample_seed: u64,
    top_up_seed: u64,
}

impl StratifiedSampler {
    #[must_use]
    pub const fn new(bins: StarBins, target_rows: usize, sample_seed: u64, top_up_seed: u64) -> Self {
        Self {
            bins,
            target_rows,
            sample_seed,
            top_up_seed,
        }
    }

    /// Sample `target_rows` records spread evenly over the non-empty bins.
    ///
    /// Each non-empty bin contributes up to `max(1, target_rows / non_empty_bins)` records. If small
    /// bins leave the sample short, the difference is drawn from the records not yet selected, as
    /// far as they go. Records repeating an earlier `repo_id` are ignored.
    #[must_use]
    pub fn sample(&self, records: &[RawRepoRecord]) -> BalancedSample {
        let mut seen = HashSet::new();
        let unique: Vec<&RawRepoRecord> = records.iter().filter(|r| seen.insert(r.repo_id)).collect();
        if unique.len() < records.len() {
            log::warn!(target: LOG_TARGET, "Ignoring {} rows with duplicate repo_id", records.len() - unique.len());
        }

        let mut members: Vec<Vec<usize>> = vec![Vec::new(); self.bins.count()];
        for (idx, record) in unique.iter().enumerate() {
            members[self.bins.bin_of(record.stars())].push(idx);
        }

        let non_empty = members.iter().filter(|m| !m.is_empty()).count();
        if non_empty == 0 || self.target_rows == 0 {
            return BalancedSample {
                rows: Vec::new(),
                quota: 0,
                bins: Vec::new(),
                top_up: 0,
                shortfall: self.target_rows.min(unique.len()),
            };
        }

        let quota = (self.target_rows / non_empty).max(1);
        log::info!(target: LOG_TARGET, "Sampling up to {quota} records from each of {non_empty} non-empty bins");

        let mut selected = vec![false; unique.len()];
        let mut picks: Vec<(usize, usize)> = Vec::new();
        let mut bins = Vec::with_capacity(non_empty);
        let mut bin_ids = Vec::with_capacity(non_empty);

        for (bin, population) in members.iter().enumerate().filter(|(_, m)| !m.is_empty()) {
            let mut chosen: Vec<usize> = if population.len() <= quota {
                population.clone()
            } else {
                let mut rng = StdRng::seed_from_u64(self.sample_seed);
                index::sample(&mut rng, population.len(), quota).into_iter().map(|i| population[i]).collect()
            };
            chosen.sort_unstable();

            bins.push(BinSummary {
                label: self.bins.label(bin),
                population: population.len(),
                sampled: chosen.len(),
            });
            bin_ids.push(bin);

            for idx in chosen {
                selected[idx] = true;
                picks.push((idx, bin));
            }
        }

        // Equal quotas can overshoot when there are more non-empty bins than target rows
        if picks.len() > self.target_rows {
            log::debug!(target: LOG_TARGET, "Trimming {} rows beyond the target", picks.len() - self.target_rows);
            for &(idx, _) in &picks[self.target_rows..] {
                selected[idx] = false;
            }
            picks.truncate(self.target_rows);

            for (summary, &bin) in bins.iter_mut().zip(&bin_ids) {
                summary.sampled = picks.iter().filter(|&&(_, b)| b == bin).count();
            }
        }

        let wanted = self.target_rows - picks.len();
        let remaining: Vec<usize> = (0..unique.len()).filter(|&idx| !selected[idx]).collect();
        let top_up = wanted.min(remaining.len());
        if top_up < wanted {
            log::warn!(
                target: LOG_TARGET,
                "Only {} unsampled records remain to top up {wanted} missing rows",
                remaining.len()
            );
        }

        if top_up > 0 {
            let mut rng = StdRng::seed_from_u64(self.top_up_seed);
            for i in index::sample(&mut rng, remaining.len(), top_up) {
                let idx = remaining[i];
                picks.push((idx, self.bins.bin_of(unique[idx].stars())));
            }
        }

        let rows = picks
            .into_iter()
            .map(|(idx, bin)| BalancedRecord {
                record: unique[idx].clone(),
                star_bin: self.bins.label(bin),
            })
            .collect();

        BalancedSample {
            rows,
            quota,
            bins,
            top_up,
            shortfall: wanted - top_up,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(repo_id: u64, stars: Option<u64>) -> RawRepoRecord {
        RawRepoRecord {
            repo_id,
            full_name: None,
            name: None,
            owner: None,
            language: None,
            created_at: None,
            updated_at: None,
            size_kb: None,
            stargazers_count: stars,
            forks_count: None,
            open_issues_count: None,
            watchers_count: None,
            license: None,
            topics: None,
        }
    }

    /// Builds `counts[i]` records per bin for breakpoints `[10, 100]`
    fn dataset(counts: [usize; 3]) -> Vec<RawRepoRecord> {
        let stars = [5, 50, 5000];
        let mut next_id = 0;
        let mut records = Vec::new();
        for (bin, &count) in counts.iter().enumerate() {
            for _ in 0..count {
                next_id += 1;
                records.push(record(next_id, Some(stars[bin])));
            }
        }
        records
    }

    fn sampler(target_rows: usize) -> StratifiedSampler {
        StratifiedSampler::new(StarBins::new(&[10, 100]).unwrap(), target_rows, 42, 1)
    }

    fn assert_unique(sample: &BalancedSample) {
        let ids: HashSet<_> = sample.rows.iter().map(|r| r.record.repo_id).collect();
        assert_eq!(ids.len(), sample.rows.len());
    }

    #[test]
    fn test_small_bin_is_topped_up() {
        let sample = sampler(300).sample(&dataset([5, 5000, 5000]));

        assert_eq!(sample.quota, 100);
        let sampled: Vec<_> = sample.bins.iter().map(|b| b.sampled).collect();
        assert_eq!(sampled, vec![5, 100, 100]);
        assert_eq!(sample.top_up, 95);
        assert_eq!(sample.shortfall, 0);
        assert_eq!(sample.rows.len(), 300);
        assert_unique(&sample);
    }

    #[test]
    fn test_rows_are_in_bin_order_then_top_up() {
        let sample = sampler(300).sample(&dataset([5, 5000, 5000]));

        let labels: Vec<_> = sample.rows.iter().map(|r| r.star_bin.as_str()).collect();
        assert!(labels[..5].iter().all(|l| *l == "0-10"));
        assert!(labels[5..105].iter().all(|l| *l == "11-100"));
        assert!(labels[105..205].iter().all(|l| *l == "101+"));
        assert!(labels[205..].iter().all(|l| *l != "0-10"));
    }

    #[test]
    fn test_top_up_capped_at_availability() {
        let sample = sampler(300).sample(&dataset([5, 20, 30]));

        assert_eq!(sample.rows.len(), 55);
        assert_eq!(sample.top_up, 0);
        assert_eq!(sample.shortfall, 245);
        assert_unique(&sample);
    }

    #[test]
    fn test_partial_top_up() {
        let sample = sampler(300).sample(&dataset([5, 150, 100]));

        // 5 + 100 + 100 from quotas, leaving 50 unsampled of the 95 needed
        assert_eq!(sample.top_up, 50);
        assert_eq!(sample.shortfall, 45);
        assert_eq!(sample.rows.len(), 255);
        assert_unique(&sample);
    }

    #[test]
    fn test_sampling_is_reproducible() {
        let records = dataset([5, 5000, 5000]);
        let first = sampler(300).sample(&records);
        let second = sampler(300).sample(&records);
        assert_eq!(first.rows, second.rows);
    }

    #[test]
    fn test_different_seed_changes_sample() {
        let records = dataset([0, 5000, 0]);
        let a = StratifiedSampler::new(StarBins::new(&[10, 100]).unwrap(), 50, 42, 1).sample(&records);
        let b = StratifiedSampler::new(StarBins::new(&[10, 100]).unwrap(), 50, 7, 1).sample(&records);
        assert_ne!(a.rows, b.rows);
    }

    #[test]
    fn test_quota_uses_only_non_empty_bins() {
        let sample = sampler(100).sample(&dataset([0, 500, 500]));
        assert_eq!(sample.quota, 50);
        assert_eq!(sample.bins.len(), 2);
        assert_eq!(sample.rows.len(), 100);
    }

    #[test]
    fn test_missing_stars_fall_in_lowest_bin() {
        let records = vec![record(1, None), record(2, Some(10)), record(3, Some(11))];
        let sample = sampler(4).sample(&records);

        // quota 2 per bin takes every record without a top-up
        assert_eq!(sample.quota, 2);
        assert_eq!(sample.top_up, 0);
        let bins: Vec<_> = sample.rows.iter().map(|r| (r.record.repo_id, r.star_bin.as_str())).collect();
        assert_eq!(bins, vec![(1, "0-10"), (2, "0-10"), (3, "11-100")]);
    }

    #[test]
    fn test_top_up_rows_follow_bin_samples() {
        let records = vec![record(1, None), record(2, Some(10)), record(3, Some(11))];
        let sample = sampler(3).sample(&records);

        assert_eq!(sample.quota, 1);
        assert_eq!(sample.top_up, 1);
        let bins: HashSet<_> = sample.rows.iter().map(|r| (r.record.repo_id, r.star_bin.as_str())).collect();
        assert_eq!(bins, HashSet::from([(1, "0-10"), (2, "0-10"), (3, "11-100")]));
        assert_eq!(sample.rows[1].star_bin, "11-100");
    }

    #[test]
    fn test_never_exceeds_target() {
        let sample = sampler(2).sample(&dataset([3, 3, 3]));
        assert_eq!(sample.rows.len(), 2);
        assert_unique(&sample);
    }

    #[test]
    fn test_trimmed_bins_report_kept_rows() {
        let sample = sampler(2).sample(&dataset([3, 3, 3]));

        let sampled: Vec<_> = sample.bins.iter().map(|b| b.sampled).collect();
        assert_eq!(sampled, vec![1, 1, 0]);
        assert_eq!(sampled.iter().sum::<usize>(), sample.rows.len());
        assert!(sample.bins.iter().all(|b| b.population == 3));
    }

    #[test]
    fn test_duplicate_ids_sampled_once() {
        let records = vec![record(1, Some(1)), record(1, Some(1)), record(2, Some(1))];
        let sample = sampler(10).sample(&records);
        assert_eq!(sample.rows.len(), 2);
        assert_unique(&sample);
    }

    #[test]
    fn test_empty_dataset() {
        let sample = sampler(10).sample(&[]);
        assert!(sample.rows.is_empty());
        assert_eq!(sample.shortfall, 0);
    }

    #[test]
    fn test_zero_target() {
        let sample = sampler(0).sample(&dataset([1, 1, 1]));
        assert!(sample.rows.is_empty());
    }
}

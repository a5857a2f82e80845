use crate::Result;
use chrono::{Days, Months, NaiveDate};
use core::fmt::{Display, Formatter};
use ohno::bail;
use rand::Rng;

/// An inclusive range of creation dates used to filter one search query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DateWindow {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateWindow {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if start > end {
            bail!("date window start {start} is after its end {end}");
        }

        Ok(Self { start, end })
    }

    #[must_use]
    pub const fn start(&self) -> NaiveDate {
        self.start
    }

    #[must_use]
    pub const fn end(&self) -> NaiveDate {
        self.end
    }

    /// Number of days covered, counting both ends
    #[must_use]
    pub fn days(&self) -> u64 {
        (self.end - self.start).num_days().unsigned_abs() + 1
    }

    #[must_use]
    pub fn is_single_day(&self) -> bool {
        self.start == self.end
    }

    /// Bisect into `(start, mid)` and `(mid + 1, end)`, with the first half taking any odd day.
    ///
    /// Returns `None` for a single-day window.
    #[must_use]
    pub fn split(&self) -> Option<(Self, Self)> {
        if self.is_single_day() {
            return None;
        }

        let mid = self.start + Days::new((self.days() - 1) / 2);
        let second_start = mid.succ_opt()?;

        Some((
            Self { start: self.start, end: mid },
            Self {
                start: second_start,
                end: self.end,
            },
        ))
    }
}

impl Display for DateWindow {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

/// Partition `[start, end]` into consecutive one-month windows.
///
/// Each window runs from its start day to the day before the same day of the next month
/// (clamped to shorter months). The last window is truncated to `end`.
#[must_use]
pub fn month_windows(start: NaiveDate, end: NaiveDate) -> Vec<DateWindow> {
    let mut windows = Vec::new();
    let mut cur = start;

    while cur <= end {
        let next = cur.checked_add_months(Months::new(1));
        let window_end = next.and_then(|d| d.pred_opt()).map_or(end, |d| d.min(end));
        windows.push(DateWindow { start: cur, end: window_end });

        match next {
            Some(next) => cur = next,
            None => break,
        }
    }

    windows
}

/// Draw `count` windows of `window_days` days at uniformly random offsets within `[start, end]`.
///
/// Windows are clipped so they never extend past `end`, and are returned in ascending order.
#[must_use]
pub fn random_windows<R: Rng>(start: NaiveDate, end: NaiveDate, count: usize, window_days: u32, rng: &mut R) -> Vec<DateWindow> {
    if start > end {
        return Vec::new();
    }

    let total_days = (end - start).num_days().unsigned_abs();
    let span = u64::from(window_days.max(1)) - 1;

    let mut windows: Vec<DateWindow> = (0..count)
        .map(|_| {
            let window_start = start + Days::new(rng.gen_range(0..=total_days));
            let window_end = window_start.checked_add_days(Days::new(span)).map_or(end, |d| d.min(end));
            DateWindow {
                start: window_start,
                end: window_end,
            }
        })
        .collect();

    windows.sort_unstable();
    windows
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn window(start: NaiveDate, end: NaiveDate) -> DateWindow {
        DateWindow::new(start, end).unwrap()
    }

    fn assert_contiguous_cover(windows: &[DateWindow], start: NaiveDate, end: NaiveDate) {
        assert_eq!(windows.first().unwrap().start(), start);
        assert_eq!(windows.last().unwrap().end(), end);
        for pair in windows.windows(2) {
            assert_eq!(pair[0].end().succ_opt().unwrap(), pair[1].start());
        }
        for w in windows {
            assert!(w.start() <= w.end());
        }
    }

    #[test]
    fn test_new_rejects_inverted_window() {
        assert!(DateWindow::new(date(2020, 1, 2), date(2020, 1, 1)).is_err());
        assert!(DateWindow::new(date(2020, 1, 1), date(2020, 1, 1)).is_ok());
    }

    #[test]
    fn test_days() {
        assert_eq!(window(date(2020, 1, 1), date(2020, 1, 1)).days(), 1);
        assert_eq!(window(date(2020, 1, 1), date(2020, 1, 10)).days(), 10);
        assert_eq!(window(date(2020, 2, 1), date(2020, 3, 1)).days(), 30);
    }

    #[test]
    fn test_split_even_window() {
        let (first, second) = window(date(2020, 1, 1), date(2020, 1, 10)).split().unwrap();
        assert_eq!(first, window(date(2020, 1, 1), date(2020, 1, 5)));
        assert_eq!(second, window(date(2020, 1, 6), date(2020, 1, 10)));
        assert_eq!(first.days(), 5);
        assert_eq!(second.days(), 5);
    }

    #[test]
    fn test_split_odd_window_gives_first_half_extra_day() {
        let (first, second) = window(date(2020, 1, 1), date(2020, 1, 11)).split().unwrap();
        assert_eq!(first.days(), 6);
        assert_eq!(second.days(), 5);
        assert_eq!(first.end().succ_opt().unwrap(), second.start());
    }

    #[test]
    fn test_split_two_day_window() {
        let (first, second) = window(date(2020, 1, 1), date(2020, 1, 2)).split().unwrap();
        assert!(first.is_single_day());
        assert!(second.is_single_day());
        assert_eq!(first.start(), date(2020, 1, 1));
        assert_eq!(second.start(), date(2020, 1, 2));
    }

    #[test]
    fn test_split_halves_cover_window() {
        let start = date(2019, 12, 20);
        for len in 2..60 {
            let end = start + Days::new(len - 1);
            let w = window(start, end);
            let (first, second) = w.split().unwrap();
            assert_contiguous_cover(&[first, second], start, end);
            assert_eq!(first.days() + second.days(), w.days());
            assert!(first.days() >= second.days());
        }
    }

    #[test]
    fn test_single_day_never_splits() {
        assert!(window(date(2020, 5, 5), date(2020, 5, 5)).split().is_none());
    }

    #[test]
    fn test_month_windows_calendar_year() {
        let windows = month_windows(date(2020, 1, 1), date(2020, 12, 31));
        assert_eq!(windows.len(), 12);
        assert_eq!(windows[0], window(date(2020, 1, 1), date(2020, 1, 31)));
        assert_eq!(windows[1], window(date(2020, 2, 1), date(2020, 2, 29)));
        assert_eq!(windows[11], window(date(2020, 12, 1), date(2020, 12, 31)));
        assert_contiguous_cover(&windows, date(2020, 1, 1), date(2020, 12, 31));
    }

    #[test]
    fn test_month_windows_truncates_last_window() {
        let windows = month_windows(date(2020, 1, 1), date(2020, 3, 15));
        assert_eq!(windows.len(), 3);
        assert_eq!(windows[2], window(date(2020, 3, 1), date(2020, 3, 15)));
    }

    #[test]
    fn test_month_windows_mid_month_start() {
        let windows = month_windows(date(2021, 1, 31), date(2021, 5, 1));
        assert_contiguous_cover(&windows, date(2021, 1, 31), date(2021, 5, 1));
        assert_eq!(windows[0], window(date(2021, 1, 31), date(2021, 2, 27)));
    }

    #[test]
    fn test_month_windows_single_day_range() {
        let windows = month_windows(date(2020, 6, 6), date(2020, 6, 6));
        assert_eq!(windows, vec![window(date(2020, 6, 6), date(2020, 6, 6))]);
    }

    #[test]
    fn test_month_windows_empty_for_inverted_range() {
        assert!(month_windows(date(2020, 6, 6), date(2020, 6, 5)).is_empty());
    }

    #[test]
    fn test_month_windows_cover_long_range() {
        let windows = month_windows(date(2015, 1, 1), date(2024, 2, 29));
        assert_eq!(windows.len(), 110);
        assert_contiguous_cover(&windows, date(2015, 1, 1), date(2024, 2, 29));
    }

    #[test]
    fn test_random_windows_within_range_and_sorted() {
        let start = date(2020, 1, 1);
        let end = date(2020, 3, 31);
        let mut rng = StdRng::seed_from_u64(7);
        let windows = random_windows(start, end, 200, 5, &mut rng);

        assert_eq!(windows.len(), 200);
        for w in &windows {
            assert!(w.start() >= start);
            assert!(w.end() <= end);
            assert!(w.days() <= 5);
        }
        assert!(windows.windows(2).all(|pair| pair[0] <= pair[1]));
        assert!(windows.iter().any(|w| w.days() == 5));
    }

    #[test]
    fn test_random_windows_clipped_at_end() {
        let day = date(2020, 1, 1);
        let mut rng = StdRng::seed_from_u64(1);
        let windows = random_windows(day, day, 3, 10, &mut rng);
        assert_eq!(windows, vec![window(day, day); 3]);
    }

    #[test]
    fn test_random_windows_reproducible() {
        let start = date(2018, 1, 1);
        let end = date(2022, 1, 1);
        let a = random_windows(start, end, 20, 1, &mut StdRng::seed_from_u64(99));
        let b = random_windows(start, end, 20, 1, &mut StdRng::seed_from_u64(99));
        assert_eq!(a, b);
    }

    #[test]
    fn test_display() {
        assert_eq!(window(date(2020, 1, 1), date(2020, 1, 31)).to_string(), "2020-01-01..2020-01-31");
    }
}

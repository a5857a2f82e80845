use super::DateWindow;
use core::fmt::{Display, Formatter};

/// A repository search query restricted to one creation-date window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    window: DateWindow,
    exclude_forks: bool,
}

impl SearchQuery {
    #[must_use]
    pub const fn new(window: DateWindow, exclude_forks: bool) -> Self {
        Self { window, exclude_forks }
    }

    #[must_use]
    pub const fn window(&self) -> DateWindow {
        self.window
    }
}

impl Display for SearchQuery {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        write!(f, "created:{}..{}", self.window.start(), self.window.end())?;
        if self.exclude_forks {
            write!(f, " fork:false")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn window() -> DateWindow {
        DateWindow::new(NaiveDate::from_ymd_opt(2016, 3, 1).unwrap(), NaiveDate::from_ymd_opt(2016, 3, 31).unwrap()).unwrap()
    }

    #[test]
    fn test_query_excluding_forks() {
        assert_eq!(SearchQuery::new(window(), true).to_string(), "created:2016-03-01..2016-03-31 fork:false");
    }

    #[test]
    fn test_query_including_forks() {
        assert_eq!(SearchQuery::new(window(), false).to_string(), "created:2016-03-01..2016-03-31");
    }
}

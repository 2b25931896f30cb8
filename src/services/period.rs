use chrono::{Datelike, Days, Months, NaiveDate};

use crate::{
    error::{AppError, AppResult},
    schemas::ViewMode,
};

/// Days before the end date that a default or daily window starts.
const TRAILING_WINDOW_DAYS: u64 = 6;

/// Inclusive calendar window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Period {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl Period {
    pub fn new(start: NaiveDate, end: NaiveDate) -> AppResult<Self> {
        if start > end {
            return Err(AppError::BadRequest(
                "startDate must be on or before endDate.".to_string(),
            ));
        }
        Ok(Self { start, end })
    }

    pub fn length_days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }

    pub fn contains(&self, day: NaiveDate) -> bool {
        day >= self.start && day <= self.end
    }

    /// Inclusive overlap: any interval touching the window counts.
    pub fn overlaps(&self, start: NaiveDate, end: NaiveDate) -> bool {
        start <= self.end && end >= self.start
    }

    /// Window of identical length ending the day before this one starts.
    pub fn previous(&self) -> AppResult<Self> {
        let length = u64::try_from(self.length_days()).unwrap_or(1);
        let prev_end = shift_back(self.start, 1)?;
        let prev_start = shift_back(prev_end, length - 1)?;
        Ok(Self {
            start: prev_start,
            end: prev_end,
        })
    }
}

/// The requested window and the one it is compared against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ComparisonPair {
    pub current: Period,
    pub previous: Period,
    pub view_mode: ViewMode,
}

impl ComparisonPair {
    /// Smallest window covering both periods; used to load rows once.
    pub fn span(&self) -> Period {
        Period {
            start: self.previous.start,
            end: self.current.end,
        }
    }
}

/// One point of the dashboard time series.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bucket {
    pub label: String,
    pub period: Period,
}

pub struct WindowRequest<'a> {
    pub start_date: Option<&'a str>,
    pub end_date: Option<&'a str>,
    pub view_mode: ViewMode,
    pub today: NaiveDate,
    pub daily_respects_dates: bool,
}

/// Parses, validates and aligns the requested window, then derives the
/// comparison window.
pub fn resolve_window(request: &WindowRequest<'_>) -> AppResult<ComparisonPair> {
    let end = match non_blank(request.end_date) {
        Some(raw) => parse_date(raw)?,
        None => request.today,
    };
    let start = match non_blank(request.start_date) {
        Some(raw) => parse_date(raw)?,
        None => shift_back(end, TRAILING_WINDOW_DAYS)?,
    };
    let requested = Period::new(start, end)?;

    let current = match request.view_mode {
        ViewMode::Monthly => Period::new(month_start(requested.start), month_end(requested.end))?,
        ViewMode::Daily if request.daily_respects_dates => requested,
        ViewMode::Daily => trailing_week(request.today)?,
    };

    Ok(ComparisonPair {
        current,
        previous: current.previous()?,
        view_mode: request.view_mode,
    })
}

pub fn trailing_week(today: NaiveDate) -> AppResult<Period> {
    Period::new(shift_back(today, TRAILING_WINDOW_DAYS)?, today)
}

/// Daily buckets, or calendar-month buckets clipped to the window.
pub fn buckets(period: &Period, view_mode: ViewMode) -> Vec<Bucket> {
    let mut series = Vec::new();
    let mut cursor = period.start;
    while cursor <= period.end {
        let (bucket_end, label) = match view_mode {
            ViewMode::Daily => (cursor, cursor.format("%Y-%m-%d").to_string()),
            ViewMode::Monthly => (
                std::cmp::min(month_end(cursor), period.end),
                cursor.format("%Y-%m").to_string(),
            ),
        };
        series.push(Bucket {
            label,
            period: Period {
                start: cursor,
                end: bucket_end,
            },
        });

        let next = match view_mode {
            ViewMode::Daily => cursor.succ_opt(),
            ViewMode::Monthly => month_start(cursor).checked_add_months(Months::new(1)),
        };
        match next {
            Some(next) => cursor = next,
            None => break,
        }
    }
    series
}

pub fn parse_date(value: &str) -> AppResult<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|_| {
        AppError::BadRequest(format!(
            "Invalid date '{}'. Use the YYYY-MM-DD format.",
            value.trim()
        ))
    })
}

pub fn month_start(day: NaiveDate) -> NaiveDate {
    day - Days::new(u64::from(day.day0()))
}

pub fn month_end(day: NaiveDate) -> NaiveDate {
    month_start(day)
        .checked_add_months(Months::new(1))
        .and_then(|next| next.pred_opt())
        .unwrap_or(NaiveDate::MAX)
}

fn shift_back(day: NaiveDate, days: u64) -> AppResult<NaiveDate> {
    day.checked_sub_days(Days::new(days))
        .ok_or_else(|| AppError::BadRequest("Date is out of range.".to_string()))
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|item| !item.is_empty())
}

#[cfg(test)]
mod tests {
    use super::{buckets, month_end, resolve_window, Period, WindowRequest};
    use crate::schemas::ViewMode;
    use chrono::NaiveDate;

    fn date(raw: &str) -> NaiveDate {
        NaiveDate::parse_from_str(raw, "%Y-%m-%d").unwrap()
    }

    fn request<'a>(
        start: Option<&'a str>,
        end: Option<&'a str>,
        view_mode: ViewMode,
        today: &str,
    ) -> WindowRequest<'a> {
        WindowRequest {
            start_date: start,
            end_date: end,
            view_mode,
            today: date(today),
            daily_respects_dates: false,
        }
    }

    #[test]
    fn previous_period_has_equal_length_and_abuts() {
        let cases = [
            ("2024-03-01", "2024-03-01"),
            ("2024-03-01", "2024-03-31"),
            ("2023-12-25", "2024-01-07"),
            ("2024-02-01", "2024-02-29"),
        ];
        for (start, end) in cases {
            let current = Period::new(date(start), date(end)).unwrap();
            let previous = current.previous().unwrap();
            assert_eq!(previous.length_days(), current.length_days());
            assert_eq!(previous.end, current.start.pred_opt().unwrap());
            assert!(previous.end < current.start);
        }
    }

    #[test]
    fn monthly_alignment_handles_leap_february() {
        let pair = resolve_window(&request(
            Some("2024-02-15"),
            Some("2024-02-20"),
            ViewMode::Monthly,
            "2024-06-10",
        ))
        .unwrap();
        assert_eq!(pair.current.start, date("2024-02-01"));
        assert_eq!(pair.current.end, date("2024-02-29"));
        assert_eq!(pair.previous.end, date("2024-01-31"));
        assert_eq!(pair.previous.start, date("2024-01-03"));
    }

    #[test]
    fn daily_without_dates_is_trailing_week() {
        let pair = resolve_window(&request(None, None, ViewMode::Daily, "2024-06-10")).unwrap();
        assert_eq!(pair.current.start, date("2024-06-04"));
        assert_eq!(pair.current.end, date("2024-06-10"));
        assert_eq!(pair.current.length_days(), 7);
        assert_eq!(pair.previous.start, date("2024-05-28"));
        assert_eq!(pair.previous.end, date("2024-06-03"));
    }

    #[test]
    fn daily_overrides_explicit_dates_unless_configured() {
        let mut req = request(
            Some("2024-01-01"),
            Some("2024-01-31"),
            ViewMode::Daily,
            "2024-06-10",
        );
        let forced = resolve_window(&req).unwrap();
        assert_eq!(forced.current.start, date("2024-06-04"));

        req.daily_respects_dates = true;
        let kept = resolve_window(&req).unwrap();
        assert_eq!(kept.current.start, date("2024-01-01"));
        assert_eq!(kept.current.end, date("2024-01-31"));
    }

    #[test]
    fn missing_start_defaults_to_six_days_before_end() {
        let mut req = request(None, Some("2024-03-10"), ViewMode::Daily, "2024-06-10");
        req.daily_respects_dates = true;
        let pair = resolve_window(&req).unwrap();
        assert_eq!(pair.current.start, date("2024-03-04"));
    }

    #[test]
    fn rejects_malformed_and_inverted_input() {
        let malformed = resolve_window(&request(
            Some("not-a-date"),
            None,
            ViewMode::Daily,
            "2024-06-10",
        ));
        assert!(malformed.is_err());

        let inverted = resolve_window(&request(
            Some("2024-02-10"),
            Some("2024-02-01"),
            ViewMode::Monthly,
            "2024-06-10",
        ));
        assert!(inverted.is_err());
    }

    #[test]
    fn blank_values_are_treated_as_absent() {
        let pair = resolve_window(&request(Some(" "), Some(""), ViewMode::Daily, "2024-06-10"))
            .unwrap();
        assert_eq!(pair.current.end, date("2024-06-10"));
    }

    #[test]
    fn month_end_tracks_month_length() {
        assert_eq!(month_end(date("2023-02-11")), date("2023-02-28"));
        assert_eq!(month_end(date("2024-02-11")), date("2024-02-29"));
        assert_eq!(month_end(date("2024-04-30")), date("2024-04-30"));
        assert_eq!(month_end(date("2024-12-01")), date("2024-12-31"));
    }

    #[test]
    fn monthly_buckets_step_by_calendar_month() {
        let period = Period::new(date("2023-11-01"), date("2024-02-29")).unwrap();
        let series = buckets(&period, ViewMode::Monthly);
        let labels = series
            .iter()
            .map(|bucket| bucket.label.as_str())
            .collect::<Vec<_>>();
        assert_eq!(labels, vec!["2023-11", "2023-12", "2024-01", "2024-02"]);
        assert_eq!(series[1].period.end, date("2023-12-31"));
        assert_eq!(series[3].period.end, date("2024-02-29"));
    }

    #[test]
    fn daily_buckets_cover_each_day() {
        let period = Period::new(date("2024-02-27"), date("2024-03-02")).unwrap();
        let series = buckets(&period, ViewMode::Daily);
        assert_eq!(series.len(), 5);
        assert_eq!(series[2].label, "2024-02-29");
        assert!(series
            .iter()
            .all(|bucket| bucket.period.start == bucket.period.end));
    }
}

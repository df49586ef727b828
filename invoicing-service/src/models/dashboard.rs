use std::fmt;

use chrono::{DateTime, Datelike, Duration, TimeZone, Utc};
use rust_decimal::Decimal;

use super::invoice::InvoiceStatus;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EntityCounts {
    pub customers: u64,
    pub products: u64,
    pub invoices: u64,
    pub quotes: u64,
    pub open_quotes: u64,
}

/// The slice of an invoice the dashboard aggregates over.
#[derive(Debug, Clone, PartialEq)]
pub struct InvoiceRollup {
    pub customer_id: String,
    pub status: InvoiceStatus,
    pub issue_date: DateTime<Utc>,
    pub due_date: Option<DateTime<Utc>>,
    pub gross: Decimal,
}

/// Window the revenue chart covers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ChartPeriod {
    /// The last 7 days, one point per day.
    Week,
    /// The last 30 days, one point per day.
    #[default]
    Month,
    /// The current calendar year, one point per month.
    Year,
}

impl ChartPeriod {
    /// Unknown or missing values fall back to `Month`.
    pub fn from_param(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some(v) if v.eq_ignore_ascii_case("week") => ChartPeriod::Week,
            Some(v) if v.eq_ignore_ascii_case("year") => ChartPeriod::Year,
            _ => ChartPeriod::Month,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ChartPeriod::Week => "week",
            ChartPeriod::Month => "month",
            ChartPeriod::Year => "year",
        }
    }

    /// First instant inside the window ending at `now`.
    pub fn start(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        match self {
            ChartPeriod::Week => now - Duration::days(7),
            ChartPeriod::Month => now - Duration::days(30),
            ChartPeriod::Year => Utc
                .with_ymd_and_hms(now.year(), 1, 1, 0, 0, 0)
                .single()
                .unwrap_or(now),
        }
    }

    /// Label of the chart point `at` falls into: `YYYY-MM-DD` per day, or
    /// `YYYY-MM` for the yearly chart.
    pub fn bucket_label(&self, at: DateTime<Utc>) -> String {
        match self {
            ChartPeriod::Week | ChartPeriod::Month => at.format("%Y-%m-%d").to_string(),
            ChartPeriod::Year => at.format("%Y-%m").to_string(),
        }
    }
}

impl fmt::Display for ChartPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_period_falls_back_to_month() {
        assert_eq!(ChartPeriod::from_param(None), ChartPeriod::Month);
        assert_eq!(ChartPeriod::from_param(Some("decade")), ChartPeriod::Month);
        assert_eq!(ChartPeriod::from_param(Some("Week")), ChartPeriod::Week);
        assert_eq!(ChartPeriod::from_param(Some("year")), ChartPeriod::Year);
    }

    #[test]
    fn year_starts_on_january_first() {
        let now = Utc.with_ymd_and_hms(2025, 6, 15, 12, 0, 0).unwrap();
        assert_eq!(
            ChartPeriod::Year.start(now),
            Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap()
        );
        assert_eq!(ChartPeriod::Week.start(now), now - Duration::days(7));
        assert_eq!(ChartPeriod::Year.bucket_label(now), "2025-06");
        assert_eq!(ChartPeriod::Month.bucket_label(now), "2025-06-15");
    }
}

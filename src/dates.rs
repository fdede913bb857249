//! Date Filters
//!
//! Turns the "all / today / week / month / custom" selector into the
//! `startDate`/`endDate` query pair, and builds production batch labels.

use chrono::{
    DateTime, Days, FixedOffset, Local, Months, NaiveDate, NaiveTime, SecondsFormat, TimeZone, Utc,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DateFilter {
    #[default]
    All,
    Today,
    Week,
    Month,
    Custom,
}

impl DateFilter {
    pub const ALL: &'static [DateFilter] = &[
        DateFilter::All,
        DateFilter::Today,
        DateFilter::Week,
        DateFilter::Month,
        DateFilter::Custom,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DateFilter::All => "all",
            DateFilter::Today => "today",
            DateFilter::Week => "week",
            DateFilter::Month => "month",
            DateFilter::Custom => "custom",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            DateFilter::All => "Todo o período",
            DateFilter::Today => "Hoje",
            DateFilter::Week => "Últimos 7 dias",
            DateFilter::Month => "Último mês",
            DateFilter::Custom => "Personalizado",
        }
    }

    pub fn parse(value: &str) -> Self {
        Self::ALL
            .iter()
            .copied()
            .find(|f| f.as_str() == value)
            .unwrap_or_default()
    }
}

/// Inclusive range from local start of day to local end of day
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl DateRange {
    /// Full UTC timestamps (`2026-10-15T03:00:00.000Z`), as the dashboard sends them
    pub fn timestamp_params(&self) -> [(&'static str, String); 2] {
        [
            ("startDate", self.start.to_rfc3339_opts(SecondsFormat::Millis, true)),
            ("endDate", self.end.to_rfc3339_opts(SecondsFormat::Millis, true)),
        ]
    }

    /// UTC calendar dates (`2026-10-15`), as the sales list sends them
    pub fn date_params(&self) -> [(&'static str, String); 2] {
        [
            ("startDate", self.start.format("%Y-%m-%d").to_string()),
            ("endDate", self.end.format("%Y-%m-%d").to_string()),
        ]
    }
}

pub fn local_now() -> DateTime<FixedOffset> {
    Local::now().fixed_offset()
}

/// Range selected by `filter` as of `now`; `None` means "no date constraint"
///
/// Custom ranges are read as local calendar dates (`yyyy-mm-dd`) and need both ends.
pub fn date_range(
    filter: DateFilter,
    custom_start: &str,
    custom_end: &str,
    now: DateTime<FixedOffset>,
) -> Option<DateRange> {
    let offset = *now.offset();
    let today = now.date_naive();
    let (first, last) = match filter {
        DateFilter::All => return None,
        DateFilter::Today => (today, today),
        DateFilter::Week => (today.checked_sub_days(Days::new(7))?, today),
        DateFilter::Month => (today.checked_sub_months(Months::new(1))?, today),
        DateFilter::Custom => (parse_input_date(custom_start)?, parse_input_date(custom_end)?),
    };
    Some(DateRange {
        start: start_of_day(first, offset)?,
        end: end_of_day(last, offset)?,
    })
}

/// Value of an `<input type="date">`
pub fn parse_input_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").ok()
}

fn start_of_day(date: NaiveDate, offset: FixedOffset) -> Option<DateTime<Utc>> {
    offset
        .from_local_datetime(&date.and_time(NaiveTime::MIN))
        .single()
        .map(|dt| dt.with_timezone(&Utc))
}

fn end_of_day(date: NaiveDate, offset: FixedOffset) -> Option<DateTime<Utc>> {
    let time = NaiveTime::from_hms_milli_opt(23, 59, 59, 999)?;
    offset
        .from_local_datetime(&date.and_time(time))
        .single()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Batch name used to group a day's withdrawals and products
pub fn production_label(date: NaiveDate) -> String {
    format!("Produção {}", date.format("%d/%m/%Y"))
}

pub fn today_production_label() -> String {
    production_label(local_now().date_naive())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn brt_now() -> DateTime<FixedOffset> {
        let brt = FixedOffset::west_opt(3 * 3600).unwrap();
        brt.with_ymd_and_hms(2026, 10, 15, 14, 30, 0).unwrap()
    }

    #[test]
    fn test_all_has_no_range() {
        assert_eq!(date_range(DateFilter::All, "", "", brt_now()), None);
    }

    #[test]
    fn test_today_spans_local_day() {
        let range = date_range(DateFilter::Today, "", "", brt_now()).unwrap();
        let [(start_key, start), (end_key, end)] = range.timestamp_params();
        assert_eq!(start_key, "startDate");
        assert_eq!(start, "2026-10-15T03:00:00.000Z");
        assert_eq!(end_key, "endDate");
        assert_eq!(end, "2026-10-16T02:59:59.999Z");
    }

    #[test]
    fn test_week_and_month_go_back_from_today() {
        let week = date_range(DateFilter::Week, "", "", brt_now()).unwrap();
        assert_eq!(week.date_params()[0].1, "2026-10-08");

        let month = date_range(DateFilter::Month, "", "", brt_now()).unwrap();
        assert_eq!(month.timestamp_params()[0].1, "2026-09-15T03:00:00.000Z");
    }

    #[test]
    fn test_custom_needs_both_dates() {
        assert_eq!(date_range(DateFilter::Custom, "2026-10-01", "", brt_now()), None);
        let range = date_range(DateFilter::Custom, "2026-10-01", "2026-10-05", brt_now()).unwrap();
        assert_eq!(range.date_params()[0].1, "2026-10-01");
        // 23:59 local on the 5th is already the 6th in UTC
        assert_eq!(range.date_params()[1].1, "2026-10-06");
    }

    #[test]
    fn test_production_label() {
        let date = NaiveDate::from_ymd_opt(2026, 3, 7).unwrap();
        assert_eq!(production_label(date), "Produção 07/03/2026");
        assert_eq!(DateFilter::parse("week"), DateFilter::Week);
        assert_eq!(DateFilter::parse("bogus"), DateFilter::All);
    }
}

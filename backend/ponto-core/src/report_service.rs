// src/report_service.rs
use serde::Serialize;
use std::sync::Arc;
use tracing::info;

use crate::error::AppError;
use crate::record_store::{DayRecord, RecordStore};
use crate::time_utils::{
    hour_string_to_seconds, seconds_to_iso8601_duration, validate_month, SECONDS_PER_HOUR,
};

pub const WORKDAY_SECONDS: i64 = 8 * SECONDS_PER_HOUR;
// Missing afternoon punches count as midnight.
const MISSING_PUNCH: &str = "00:00:00";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorkdayEntry {
    #[serde(rename = "dia")]
    pub day: String,
    #[serde(rename = "pontos")]
    pub punches: Vec<String>,
}

impl From<DayRecord> for WorkdayEntry {
    fn from(record: DayRecord) -> Self {
        Self {
            day: record.day,
            punches: record.punches,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthlyReport {
    #[serde(rename = "mes")]
    pub month: String,
    #[serde(rename = "horasDevidas")]
    pub owed: String,
    #[serde(rename = "horasTrabalhadas")]
    pub worked: String,
    #[serde(rename = "horasExcedentes")]
    pub exceeded: String,
    #[serde(rename = "expedientes")]
    pub workdays: Vec<WorkdayEntry>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MonthTotals {
    pub days: usize,
    pub worked_seconds: i64,
}

impl MonthTotals {
    pub fn expected_seconds(&self) -> i64 {
        self.days as i64 * WORKDAY_SECONDS
    }

    fn difference(&self) -> i64 {
        self.worked_seconds - self.expected_seconds()
    }

    pub fn exceeded_seconds(&self) -> i64 {
        self.difference().max(0)
    }

    pub fn owed_seconds(&self) -> i64 {
        (-self.difference()).max(0)
    }
}

/// Morning session plus afternoon session. Days with fewer than 4 punches are
/// padded with `00:00:00`, so an incomplete day can come out negative.
pub fn day_worked_seconds(punches: &[String]) -> Result<i64, AppError> {
    let mut slots = [0i64; 4];
    for (i, slot) in slots.iter_mut().enumerate() {
        let punch = punches.get(i).map(String::as_str).unwrap_or(MISSING_PUNCH);
        *slot = hour_string_to_seconds(punch)?;
    }
    let [e0, e1, e2, e3] = slots;
    Ok((e1 - e0) + (e3 - e2))
}

pub fn summarize_month(records: &[DayRecord]) -> Result<MonthTotals, AppError> {
    records
        .iter()
        .try_fold(MonthTotals::default(), |totals, record| {
            let worked = day_worked_seconds(&record.punches)?;
            Ok(MonthTotals {
                days: totals.days + 1,
                worked_seconds: totals.worked_seconds + worked,
            })
        })
}

pub struct ReportService {
    store: Arc<dyn RecordStore>,
}

impl ReportService {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    pub async fn build_report(&self, month: &str) -> Result<MonthlyReport, AppError> {
        validate_month(month)?;

        let mut records = self.store.find_by_month(month).await?;
        records.sort_by(|a, b| a.day.cmp(&b.day));

        let totals = summarize_month(&records)?;
        info!(
            "Built report for {}: {} days, {}s worked, {}s expected",
            month,
            totals.days,
            totals.worked_seconds,
            totals.expected_seconds()
        );

        Ok(MonthlyReport {
            month: month.to_string(),
            owed: seconds_to_iso8601_duration(totals.owed_seconds()),
            worked: seconds_to_iso8601_duration(totals.worked_seconds),
            exceeded: seconds_to_iso8601_duration(totals.exceeded_seconds()),
            workdays: records.into_iter().map(WorkdayEntry::from).collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record_store::MemoryRecordStore;
    use chrono::{Datelike, NaiveDate, Weekday};

    const STANDARD_DAY: [&str; 4] = ["08:00:00", "12:00:00", "13:00:00", "17:00:00"];

    fn record(day: &str, punches: &[&str]) -> DayRecord {
        DayRecord {
            day: day.to_string(),
            month_string: day[..7].to_string(),
            punches: punches.iter().map(|p| p.to_string()).collect(),
        }
    }

    // Every Monday-Friday of the month with a standard 8h day.
    fn standard_month(year: i32, month: u32) -> Vec<DayRecord> {
        let mut day = NaiveDate::from_ymd_opt(year, month, 1).unwrap();
        let mut out = Vec::new();
        while day.month() == month {
            if !matches!(day.weekday(), Weekday::Sat | Weekday::Sun) {
                out.push(record(&day.format("%Y-%m-%d").to_string(), &STANDARD_DAY));
            }
            day = day.succ_opt().unwrap();
        }
        out
    }

    async fn seeded_service(records: &[DayRecord]) -> ReportService {
        let store = Arc::new(MemoryRecordStore::new());
        for r in records {
            store.insert(r.clone()).await.unwrap();
        }
        ReportService::new(store)
    }

    #[test]
    fn standard_day_is_eight_hours() {
        let punches: Vec<String> = STANDARD_DAY.iter().map(|p| p.to_string()).collect();
        assert_eq!(day_worked_seconds(&punches).unwrap(), WORKDAY_SECONDS);
    }

    #[test]
    fn incomplete_days_are_padded_with_midnight() {
        // [08:00, 12:00] -> morning only
        let two = vec!["08:00:00".to_string(), "12:00:00".to_string()];
        assert_eq!(day_worked_seconds(&two).unwrap(), 4 * SECONDS_PER_HOUR);

        // single punch: (0 - 8h) + (0 - 0)
        let one = vec!["08:00:00".to_string()];
        assert_eq!(day_worked_seconds(&one).unwrap(), -8 * SECONDS_PER_HOUR);

        // three punches: 4h + (0 - 13h)
        let three = vec![
            "08:00:00".to_string(),
            "12:00:00".to_string(),
            "13:00:00".to_string(),
        ];
        assert_eq!(day_worked_seconds(&three).unwrap(), -9 * SECONDS_PER_HOUR);
    }

    #[test]
    fn totals_split_into_owed_and_exceeded() {
        let over = MonthTotals {
            days: 2,
            worked_seconds: 2 * WORKDAY_SECONDS + 90,
        };
        assert_eq!(over.exceeded_seconds(), 90);
        assert_eq!(over.owed_seconds(), 0);

        let under = MonthTotals {
            days: 2,
            worked_seconds: 2 * WORKDAY_SECONDS - 90,
        };
        assert_eq!(under.exceeded_seconds(), 0);
        assert_eq!(under.owed_seconds(), 90);
    }

    #[tokio::test]
    async fn full_standard_month_has_no_balance() {
        let records = standard_month(2023, 11);
        let service = seeded_service(&records).await;

        let report = service.build_report("2023-11").await.unwrap();

        assert_eq!(report.month, "2023-11");
        assert_eq!(report.worked, format!("PT{}H0S", records.len() * 8));
        assert_eq!(report.owed, "PT0S");
        assert_eq!(report.exceeded, "PT0S");
        assert_eq!(report.workdays.len(), records.len());
        assert_eq!(report.workdays[0].day, "2023-11-01");
    }

    #[tokio::test]
    async fn reports_exceeded_hours() {
        let mut records = standard_month(2023, 12);
        // 1h25 over the month
        records[2].punches[0] = "07:45:00".to_string();
        records[2].punches[3] = "17:15:00".to_string();
        records[7].punches[3] = "17:15:00".to_string();
        records[9].punches[3] = "17:15:00".to_string();
        records[14].punches[3] = "17:25:00".to_string();
        let service = seeded_service(&records).await;

        let report = service.build_report("2023-12").await.unwrap();

        let exceeded = 3600 + 25 * 60;
        let worked = records.len() as i64 * WORKDAY_SECONDS + exceeded;
        assert_eq!(report.exceeded, seconds_to_iso8601_duration(exceeded));
        assert_eq!(report.exceeded, "PT1H25M0S");
        assert_eq!(report.worked, seconds_to_iso8601_duration(worked));
        assert_eq!(report.owed, "PT0S");
    }

    #[tokio::test]
    async fn reports_owed_hours() {
        let mut records = standard_month(2023, 12);
        // 2h45 short over the month
        records[2].punches[0] = "08:30:00".to_string();
        records[2].punches[2] = "13:30:00".to_string();
        records[7].punches[3] = "16:30:00".to_string();
        records[9].punches[0] = "09:00:00".to_string();
        records[14].punches[3] = "16:45:00".to_string();
        let service = seeded_service(&records).await;

        let report = service.build_report("2023-12").await.unwrap();

        let owed = 7200 + 45 * 60;
        assert_eq!(report.owed, "PT2H45M0S");
        assert_eq!(
            report.worked,
            seconds_to_iso8601_duration(records.len() as i64 * WORKDAY_SECONDS - owed)
        );
        assert_eq!(report.exceeded, "PT0S");
    }

    #[tokio::test]
    async fn empty_month_reports_zero_everywhere() {
        let service = seeded_service(&standard_month(2023, 11)).await;

        let report = service.build_report("2024-02").await.unwrap();

        assert!(report.workdays.is_empty());
        assert_eq!(report.worked, "PT0S");
        assert_eq!(report.owed, "PT0S");
        assert_eq!(report.exceeded, "PT0S");
    }

    #[tokio::test]
    async fn only_requested_month_is_included_in_day_order() {
        let records = vec![
            record("2023-11-30", &STANDARD_DAY),
            record("2023-12-01", &STANDARD_DAY),
            record("2023-11-06", &STANDARD_DAY),
        ];
        let service = seeded_service(&records).await;

        let report = service.build_report("2023-11").await.unwrap();

        let days: Vec<&str> = report.workdays.iter().map(|w| w.day.as_str()).collect();
        assert_eq!(days, vec!["2023-11-06", "2023-11-30"]);
        assert_eq!(report.worked, "PT16H0S");
    }

    #[tokio::test]
    async fn invalid_month_is_rejected_before_reading_the_store() {
        let store = Arc::new(MemoryRecordStore::new());
        store.disconnect().await.unwrap();
        let service = ReportService::new(store);

        let result = service.build_report("22312").await;

        assert!(matches!(result, Err(AppError::InvalidMonthFormat)));
    }

    #[tokio::test]
    async fn corrupt_punch_fails_the_report() {
        let service = seeded_service(&[record("2023-11-06", &["08:00", "12:00:00"])]).await;

        let result = service.build_report("2023-11").await;

        assert!(matches!(result, Err(AppError::CorruptRecord(_))));
    }
}

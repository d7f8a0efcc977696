// src/punch_service.rs
use std::sync::Arc;
use tracing::{debug, info};

use crate::error::AppError;
use crate::record_store::{DayRecord, RecordStore, StoreError};
use crate::time_utils::{self, hour_string_to_seconds, SECONDS_PER_HOUR};

pub const MAX_PUNCHES_PER_DAY: usize = 4;
pub const MIN_LUNCH_SECONDS: i64 = SECONDS_PER_HOUR;

/// Decides whether `hour` may follow the punches already stored for a day.
///
/// Checks run in a fixed order: day full, exact duplicate, not later than the
/// latest punch, and (when it would be the 3rd punch) a lunch break of at
/// least one hour after punch #2.
pub fn check_next_punch(existing: &[String], hour: &str) -> Result<(), AppError> {
    if existing.len() >= MAX_PUNCHES_PER_DAY {
        return Err(AppError::MaxPunchesReached);
    }

    let new_seconds = hour_string_to_seconds(hour)?;
    let existing_seconds = existing
        .iter()
        .map(|punch| hour_string_to_seconds(punch))
        .collect::<Result<Vec<_>, _>>()?;

    if existing_seconds.contains(&new_seconds) {
        return Err(AppError::DuplicatePunch);
    }

    if let Some(latest) = existing_seconds.iter().max() {
        if new_seconds <= *latest {
            return Err(AppError::OutOfOrderPunch);
        }
    }

    if existing_seconds.len() == 2 && new_seconds - existing_seconds[1] < MIN_LUNCH_SECONDS {
        return Err(AppError::LunchTooShort);
    }

    Ok(())
}

// A racing writer got to the day first; the caller may resubmit.
fn conflict_on_race(err: StoreError) -> AppError {
    match err {
        StoreError::AlreadyExists(_) | StoreError::StaleRecord { .. } => {
            AppError::ConcurrentModification
        }
        other => AppError::Store(other),
    }
}

pub struct PunchService {
    store: Arc<dyn RecordStore>,
}

impl PunchService {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    /// Parses a raw `momento`, rejects weekends, then records the punch.
    pub async fn record_moment(&self, raw: &str) -> Result<DayRecord, AppError> {
        let moment = time_utils::parse_moment(raw)?;
        time_utils::ensure_weekday(moment.day)?;
        self.record_punch(&moment.day_string(), &moment.hour_string())
            .await
    }

    /// Creates the day record on its first punch, otherwise validates and
    /// appends. A rejected punch leaves the stored record untouched.
    pub async fn record_punch(&self, day: &str, hour: &str) -> Result<DayRecord, AppError> {
        match self.store.find_by_day(day).await? {
            None => {
                let record = DayRecord::new(day, hour);
                self.store
                    .insert(record.clone())
                    .await
                    .map_err(conflict_on_race)?;
                info!("Created day record {} with first punch {}", day, hour);
                Ok(record)
            }
            Some(existing) => {
                debug!("Day {} currently has punches {:?}", day, existing.punches);
                check_next_punch(&existing.punches, hour)?;
                let updated = self
                    .store
                    .append_punch(day, existing.punches.len(), hour)
                    .await
                    .map_err(conflict_on_race)?;
                info!(
                    "Recorded punch #{} for {}: {}",
                    updated.punches.len(),
                    day,
                    hour
                );
                Ok(updated)
            }
        }
    }
}

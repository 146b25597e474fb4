//! Daily schedule for the long-running mode.

use std::future::Future;

use chrono::{DateTime, Duration, NaiveTime, Utc};
use tracing::{error, info};

use crate::error::{WorkerError, WorkerResult};
use crate::pipeline::Pipeline;

/// Time of day (UTC) of the daily run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduleConfig {
    pub hour: u32,
    pub minute: u32,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            hour: Self::DEFAULT_HOUR,
            minute: Self::DEFAULT_MINUTE,
        }
    }
}

impl ScheduleConfig {
    pub const DEFAULT_HOUR: u32 = 13;
    pub const DEFAULT_MINUTE: u32 = 0;

    pub fn new(hour: u32, minute: u32) -> WorkerResult<Self> {
        if hour > 23 || minute > 59 {
            return Err(WorkerError::config_error(format!(
                "Invalid schedule time {:02}:{:02} UTC",
                hour, minute
            )));
        }
        Ok(Self { hour, minute })
    }

    fn time_of_day(&self) -> NaiveTime {
        NaiveTime::from_hms_opt(self.hour, self.minute, 0).unwrap_or(NaiveTime::MIN)
    }

    /// First scheduled instant strictly after `now`.
    pub fn next_run_after(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        let today = now.date_naive().and_time(self.time_of_day()).and_utc();
        if today > now {
            today
        } else {
            today + Duration::days(1)
        }
    }
}

/// Run the pipeline once now, then daily, until `shutdown` resolves.
///
/// Runs are awaited one after another so they never overlap.
pub async fn run_scheduled<S>(pipeline: &mut Pipeline, schedule: ScheduleConfig, shutdown: S)
where
    S: Future<Output = ()>,
{
    tokio::pin!(shutdown);

    let report = pipeline.run_once().await;
    info!("Initial run finished: {}", report);

    loop {
        let now = Utc::now();
        let next = schedule.next_run_after(now);
        let wait = match (next - now).to_std() {
            Ok(wait) => wait,
            Err(e) => {
                error!("Could not compute wait until next run: {}", e);
                std::time::Duration::from_secs(60)
            }
        };
        info!(next_run = %next, "Waiting for next scheduled run");

        tokio::select! {
            _ = &mut shutdown => {
                info!("Received shutdown signal");
                return;
            }
            _ = tokio::time::sleep(wait) => {}
        }

        let report = pipeline.run_once().await;
        info!("Scheduled run finished: {}", report);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
    }

    #[test]
    fn test_next_run_later_today() {
        let schedule = ScheduleConfig::default();
        assert_eq!(
            schedule.next_run_after(at("2024-03-10T08:15:00Z")),
            at("2024-03-10T13:00:00Z")
        );
    }

    #[test]
    fn test_next_run_tomorrow_when_passed_or_exact() {
        let schedule = ScheduleConfig::default();
        assert_eq!(
            schedule.next_run_after(at("2024-03-10T13:00:00Z")),
            at("2024-03-11T13:00:00Z")
        );
        assert_eq!(
            schedule.next_run_after(at("2024-12-31T23:59:59Z")),
            at("2025-01-01T13:00:00Z")
        );
    }

    #[test]
    fn test_custom_time() {
        let schedule = ScheduleConfig::new(6, 30).unwrap();
        assert_eq!(
            schedule.next_run_after(at("2024-03-10T06:29:59Z")),
            at("2024-03-10T06:30:00Z")
        );
    }

    #[test]
    fn test_rejects_out_of_range() {
        assert!(ScheduleConfig::new(24, 0).is_err());
        assert!(ScheduleConfig::new(0, 60).is_err());
        assert!(ScheduleConfig::new(23, 59).is_ok());
    }
}

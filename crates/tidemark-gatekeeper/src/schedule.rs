//! Cron schedule parsing

use chrono::{DateTime, Utc};
use cron::Schedule;
use std::str::FromStr;

/// Parses and evaluates cron expressions
///
/// The validator only needs [`is_valid`](Self::is_valid); the background
/// worker also asks for the next fire time.
pub trait ScheduleParser: Send + Sync {
    /// Whether `expr` is a usable cron expression
    fn is_valid(&self, expr: &str) -> bool;

    /// First instant strictly after `after` that matches `expr`
    ///
    /// `None` for invalid expressions or schedules that never fire again.
    fn next_fire(&self, expr: &str, after: DateTime<Utc>) -> Option<DateTime<Utc>>;
}

/// [`ScheduleParser`] backed by the `cron` crate
///
/// Expressions have six or seven fields with seconds first
/// (`sec min hour day-of-month month day-of-week [year]`), and `?` is
/// accepted in the day fields, e.g. `0 0 3 * * ?` fires daily at 03:00 UTC.
#[derive(Debug, Clone, Copy, Default)]
pub struct CronScheduleParser;

impl CronScheduleParser {
    /// Parse `expr` into a schedule
    pub fn parse(&self, expr: &str) -> Option<Schedule> {
        let expr = expr.trim();
        if expr.is_empty() {
            return None;
        }
        Schedule::from_str(expr).ok()
    }
}

impl ScheduleParser for CronScheduleParser {
    fn is_valid(&self, expr: &str) -> bool {
        self.parse(expr).is_some()
    }

    fn next_fire(&self, expr: &str, after: DateTime<Utc>) -> Option<DateTime<Utc>> {
        self.parse(expr)?.after(&after).next()
    }
}

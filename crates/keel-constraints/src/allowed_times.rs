use std::sync::Arc;

use jiff::Zoned;
use jiff::tz::TimeZone;
use keel_core::Clock;
use keel_core::models::delivery_config::{
    Constraint, DeliveryArtifact, DeliveryConfig, Environment, TimeWindow,
};
use keel_storage::BoxFuture;
use tracing::debug;

use crate::error::ConstraintError;
use crate::evaluator::{ConstraintEvaluator, constraint_for};

const DAYS: [&str; 7] = [
    "monday",
    "tuesday",
    "wednesday",
    "thursday",
    "friday",
    "saturday",
    "sunday",
];

/// Passes while the current time falls inside one of the configured windows.
pub struct AllowedTimesEvaluator {
    clock: Arc<dyn Clock>,
}

impl AllowedTimesEvaluator {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }
}

impl ConstraintEvaluator for AllowedTimesEvaluator {
    fn constraint_type(&self) -> &'static str {
        Constraint::ALLOWED_TIMES
    }

    fn can_promote<'a>(
        &'a self,
        _artifact: &'a DeliveryArtifact,
        version: &'a str,
        _delivery_config: &'a DeliveryConfig,
        target_environment: &'a Environment,
    ) -> BoxFuture<'a, Result<bool, ConstraintError>> {
        Box::pin(async move {
            let Constraint::AllowedTimes { windows, tz } =
                constraint_for(Constraint::ALLOWED_TIMES, target_environment)?
            else {
                return Err(ConstraintError::MissingConstraint {
                    constraint_type: Constraint::ALLOWED_TIMES.to_string(),
                    environment: target_environment.name.clone(),
                });
            };

            let now = self.clock.now().to_zoned(time_zone(tz.as_deref())?);
            let allowed = in_any_window(windows, &now)?;
            debug!(
                environment = %target_environment.name,
                version,
                %now,
                allowed,
                "allowed times checked"
            );
            Ok(allowed)
        })
    }
}

fn time_zone(name: Option<&str>) -> Result<TimeZone, ConstraintError> {
    match name {
        None => Ok(TimeZone::UTC),
        Some(name) if name.eq_ignore_ascii_case("utc") => Ok(TimeZone::UTC),
        Some(name) => TimeZone::get(name).map_err(|_| ConstraintError::UnknownTimeZone(name.to_string())),
    }
}

/// Every window is validated, even after one matches.
pub fn in_any_window(windows: &[TimeWindow], at: &Zoned) -> Result<bool, ConstraintError> {
    if windows.is_empty() {
        return Err(ConstraintError::InvalidTimeWindow {
            value: String::new(),
            reason: "no windows configured".into(),
        });
    }
    let mut allowed = false;
    for window in windows {
        allowed |= window_contains(window, at)?;
    }
    Ok(allowed)
}

pub fn window_contains(window: &TimeWindow, at: &Zoned) -> Result<bool, ConstraintError> {
    let day = at.weekday().to_monday_one_offset() as u8;
    let hour = at.hour() as u8;

    let day_ok = match &window.days {
        Some(days) => parse_ranges(days, 1, 7, parse_day)?.contains(&day),
        None => true,
    };
    let hour_ok = match &window.hours {
        Some(hours) => parse_ranges(hours, 0, 23, parse_hour)?.contains(&hour),
        None => true,
    };
    Ok(day_ok && hour_ok)
}

/// Monday is 1.
fn parse_day(value: &str) -> Option<u8> {
    let value = value.to_ascii_lowercase();
    DAYS.iter()
        .position(|day| *day == value || (value.len() == 3 && day.starts_with(&value)))
        .map(|i| i as u8 + 1)
}

fn parse_hour(value: &str) -> Option<u8> {
    value.parse::<u8>().ok().filter(|h| *h <= 23)
}

/// Comma-separated values and inclusive `a-b` ranges. A range whose end is
/// before its start wraps around (`fri-mon`, `22-2`).
fn parse_ranges(
    value: &str,
    min: u8,
    max: u8,
    parse_one: fn(&str) -> Option<u8>,
) -> Result<Vec<u8>, ConstraintError> {
    let invalid = |reason: &str| ConstraintError::InvalidTimeWindow {
        value: value.to_string(),
        reason: reason.to_string(),
    };

    let mut included = Vec::new();
    for part in value.split(',').map(str::trim) {
        if part.is_empty() {
            return Err(invalid("empty entry"));
        }
        let (start, end) = match part.split_once('-') {
            Some((start, end)) => (start.trim(), end.trim()),
            None => (part, part),
        };
        let start = parse_one(start).ok_or_else(|| invalid("unrecognised value"))?;
        let end = parse_one(end).ok_or_else(|| invalid("unrecognised value"))?;

        let mut current = start;
        loop {
            included.push(current);
            if current == end {
                break;
            }
            current = if current == max { min } else { current + 1 };
        }
    }
    Ok(included)
}

// src/schedule.rs

//! Cron-style schedule expressions.
//!
//! A [`ScheduleExpr`] is parsed once when a definition head is loaded and is
//! immutable afterwards. Entry production only ever asks it one question:
//! "what is the next occurrence strictly after this instant?".
//!
//! Standard 5-field Unix cron expressions (minute, hour, day-of-month, month,
//! day-of-week) are accepted and normalized to the 6-field format the `cron`
//! crate expects; 6- and 7-field expressions are used as-is.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use cron::Schedule;

use crate::errors::{DagschedError, Result};

/// A parsed cron-style schedule expression.
#[derive(Debug, Clone)]
pub struct ScheduleExpr {
    source: String,
    schedule: Schedule,
}

impl ScheduleExpr {
    /// Parse a cron expression.
    ///
    /// Returns [`DagschedError::InvalidSchedule`] for expressions the `cron`
    /// crate cannot parse, carrying the original expression text.
    pub fn parse(expr: &str) -> Result<Self> {
        let normalized = normalize(expr);
        let schedule =
            Schedule::from_str(&normalized).map_err(|source| DagschedError::InvalidSchedule {
                expr: expr.to_string(),
                source,
            })?;
        Ok(Self {
            source: expr.to_string(),
            schedule,
        })
    }

    /// Next occurrence strictly after `now`, or `None` when the expression
    /// has no future occurrence (e.g. a year-pinned expression whose last
    /// match is in the past).
    pub fn next_after(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        self.schedule.after(&now).next()
    }

    /// The expression text as it appeared in the definition file.
    pub fn source(&self) -> &str {
        &self.source
    }
}

impl fmt::Display for ScheduleExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.source)
    }
}

/// Prepend a seconds field to 5-field Unix expressions; everything else is
/// passed through untouched.
fn normalize(expr: &str) -> String {
    let fields = expr.split_whitespace().count();
    if fields == 5 {
        format!("0 {}", expr.trim())
    } else {
        expr.trim().to_string()
    }
}

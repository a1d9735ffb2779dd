//! Headline retrieval for a single news day.
//!
//! A [`HeadlineSource`] returns the titles published on one calendar day,
//! in the order the upstream API ranks them. The concrete implementation
//! lives in [`newsapi`]; tests substitute canned sources.
//!
//! # Day Window
//!
//! A day `D` is queried as the half-open window `[D 00:00 UTC, D+1 00:00 UTC)`.
//! An article stamped exactly at the end of the window belongs to the next
//! day and is excluded.

pub mod newsapi;

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};

use crate::errors::QuizResult;
use crate::models::Headline;

/// Capability to retrieve headlines for a calendar day.
pub trait HeadlineSource {
    /// Fetch at most `max_count` non-empty headlines published on `day`.
    ///
    /// Single attempt; no retries.
    async fn fetch_headlines(&self, day: NaiveDate, max_count: usize) -> QuizResult<Vec<Headline>>;
}

/// Half-open UTC window covering one calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayWindow {
    pub day: NaiveDate,
}

impl DayWindow {
    pub fn new(day: NaiveDate) -> Self {
        Self { day }
    }

    /// Inclusive lower bound.
    pub fn start(&self) -> DateTime<Utc> {
        self.day.and_time(NaiveTime::MIN).and_utc()
    }

    /// Exclusive upper bound.
    pub fn end(&self) -> DateTime<Utc> {
        self.start() + Duration::days(1)
    }

    pub fn contains(&self, t: DateTime<Utc>) -> bool {
        self.start() <= t && t < self.end()
    }

    /// `from` query value, `YYYY-MM-DD`.
    pub fn from_param(&self) -> String {
        self.start().format("%Y-%m-%d").to_string()
    }

    /// `to` query value, `YYYY-MM-DD` of the following day.
    pub fn to_param(&self) -> String {
        self.end().format("%Y-%m-%d").to_string()
    }
}

use std::collections::BTreeSet;

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime, SubsecRound};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::domain::order::{OrderId, StatusCode};

static ALL_DIGITS: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9]+$").expect("valid regex"));

/// What the user entered in the search bar. Rebuilt for every filter run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterCriteria {
    #[serde(default)]
    pub order_id_text: String,
    #[serde(default)]
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub status_codes: BTreeSet<String>,
}

impl FilterCriteria {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_order_id_text(mut self, text: impl Into<String>) -> Self {
        self.order_id_text = text.into();
        self
    }

    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }

    pub fn with_status(mut self, status: impl Into<StatusCode>) -> Self {
        self.status_codes.insert(status.into().as_code().to_string());
        self
    }

    /// True when no category is active
    pub fn is_empty(&self) -> bool {
        self.order_id_text.is_empty() && self.date.is_none() && self.status_codes.is_empty()
    }

    pub fn order_id_query(&self) -> OrderIdQuery {
        OrderIdQuery::parse(&self.order_id_text)
    }

    pub fn day_range(&self) -> Option<DayRange> {
        self.date.map(DayRange::for_day)
    }
}

/// Parsed order-id criterion
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderIdQuery {
    Any,
    /// All-digit input compares numerically
    Exact(OrderId),
    /// Any other input is a substring of the id's decimal form
    Contains(String),
    /// All-digit input too large for an order id
    Never,
}

impl OrderIdQuery {
    pub fn parse(text: &str) -> Self {
        if text.is_empty() {
            OrderIdQuery::Any
        } else if ALL_DIGITS.is_match(text) {
            match text.parse::<OrderId>() {
                Ok(id) => OrderIdQuery::Exact(id),
                Err(_) => OrderIdQuery::Never,
            }
        } else {
            OrderIdQuery::Contains(text.to_string())
        }
    }

    pub fn matches(&self, order_id: OrderId) -> bool {
        match self {
            OrderIdQuery::Any => true,
            OrderIdQuery::Exact(id) => *id == order_id,
            OrderIdQuery::Contains(text) => order_id.to_string().contains(text.as_str()),
            OrderIdQuery::Never => false,
        }
    }
}

/// Inclusive `[00:00:00.000, 23:59:59.999]` bounds of one local calendar day
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayRange {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl DayRange {
    pub fn for_day(date: NaiveDate) -> Self {
        let start = date.and_time(NaiveTime::MIN);
        Self {
            start,
            end: start + Duration::milliseconds(MILLIS_PER_DAY - 1),
        }
    }

    /// Times are compared at millisecond precision
    pub fn contains(&self, at: NaiveDateTime) -> bool {
        let at = at.trunc_subsecs(3);
        self.start <= at && at <= self.end
    }
}

const MILLIS_PER_DAY: i64 = 24 * 60 * 60 * 1000;

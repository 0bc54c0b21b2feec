//! Comic metadata as served by the xkcd JSON API

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One comic's metadata (`/info.0.json`)
///
/// Only `num` is mandatory; every other field defaults to an empty string
/// because older comics omit some of them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comic {
    pub num: u32,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub safe_title: String,
    #[serde(default)]
    pub alt: String,
    #[serde(default)]
    pub img: String,
    #[serde(default)]
    pub transcript: String,
    #[serde(default)]
    pub link: String,
    #[serde(default)]
    pub news: String,
    #[serde(default)]
    pub year: String,
    #[serde(default)]
    pub month: String,
    #[serde(default)]
    pub day: String,
}

impl Comic {
    /// Canonical page URL on xkcd.com
    #[must_use]
    pub fn page_url(&self) -> String {
        format!("https://xkcd.com/{}", self.num)
    }

    /// Publication date, when the API reported a valid one
    #[must_use]
    pub fn published(&self) -> Option<NaiveDate> {
        let year = self.year.trim().parse().ok()?;
        let month = self.month.trim().parse().ok()?;
        let day = self.day.trim().parse().ok()?;
        NaiveDate::from_ymd_opt(year, month, day)
    }
}

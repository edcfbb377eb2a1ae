//! Core record types for prodlog.
//!
//! This module defines the production record captured for every form
//! submission, along with the category groups and the down time bucket
//! that make it up.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Serialize, Serializer};

use crate::error::{Error, Result};

/// A production-stage label carrying planned, rework and lost counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Category {
    /// `T&H`
    #[serde(rename = "T&H")]
    TAndH,
    /// `M&M`
    #[serde(rename = "M&M")]
    MAndM,
    /// `PNC`
    #[serde(rename = "PNC")]
    Pnc,
    /// `CS`
    #[serde(rename = "CS")]
    Cs,
    /// `WSP`
    #[serde(rename = "WSP")]
    Wsp,
    /// `WSPRINT`
    #[serde(rename = "WSPRINT")]
    WsPrint,
    /// `DFM`
    #[serde(rename = "DFM")]
    Dfm,
    /// `Other`
    Other,
}

impl Category {
    /// Every category, in storage column order.
    pub const ALL: [Self; 8] = [
        Self::TAndH,
        Self::MAndM,
        Self::Pnc,
        Self::Cs,
        Self::Wsp,
        Self::WsPrint,
        Self::Dfm,
        Self::Other,
    ];

    /// The label used in column headers and on the command line.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::TAndH => "T&H",
            Self::MAndM => "M&M",
            Self::Pnc => "PNC",
            Self::Cs => "CS",
            Self::Wsp => "WSP",
            Self::WsPrint => "WSPRINT",
            Self::Dfm => "DFM",
            Self::Other => "Other",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Category {
    type Err = Error;

    /// Parses a label case-insensitively. `TH` and `MM` are accepted for the
    /// two labels containing an ampersand.
    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|category| {
                let label = category.label();
                label.eq_ignore_ascii_case(wanted)
                    || label.replace('&', "").eq_ignore_ascii_case(wanted)
            })
            .ok_or_else(|| Error::invalid_field("category", format!("unknown category '{wanted}'")))
    }
}

/// Planned, rework and lost counts for one category.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub struct CategoryCounts {
    /// Planned (`_P`).
    pub planned: u32,
    /// Rework (`_R`).
    pub rework: u32,
    /// Lost (`_L`).
    pub lost: u32,
}

impl CategoryCounts {
    /// Create a set of counts.
    #[must_use]
    pub fn new(planned: u32, rework: u32, lost: u32) -> Self {
        Self {
            planned,
            rework,
            lost,
        }
    }
}

impl FromStr for CategoryCounts {
    type Err = Error;

    /// Parses `P,R,L`, e.g. `10,2,0`.
    fn from_str(s: &str) -> Result<Self> {
        let parts: Vec<&str> = s.split(',').map(str::trim).collect();
        let [planned, rework, lost] = parts.as_slice() else {
            return Err(Error::invalid_field(
                "category",
                format!("expected three comma-separated counts, got '{s}'"),
            ));
        };
        Ok(Self::new(
            parse_count("category", planned)?,
            parse_count("category", rework)?,
            parse_count("category", lost)?,
        ))
    }
}

/// Counts for all eight categories.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Categories([CategoryCounts; 8]);

impl Categories {
    /// Counts recorded for a category.
    #[must_use]
    pub fn get(&self, category: Category) -> CategoryCounts {
        self.0[category.index()]
    }

    /// Replace the counts for a category.
    pub fn set(&mut self, category: Category, counts: CategoryCounts) {
        self.0[category.index()] = counts;
    }

    /// Iterate over every category with its counts, in column order.
    pub fn iter(&self) -> impl Iterator<Item = (Category, CategoryCounts)> + '_ {
        Category::ALL.into_iter().map(|category| (category, self.get(category)))
    }
}

impl Serialize for Categories {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_map(self.iter().map(|(category, counts)| (category.label(), counts)))
    }
}

/// Idle time recorded for an entry, in minutes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct DownTime(u32);

impl DownTime {
    /// Create a down time of the given minutes.
    #[must_use]
    pub fn from_minutes(minutes: u32) -> Self {
        Self(minutes)
    }

    /// Number of minutes.
    #[must_use]
    pub fn minutes(self) -> u32 {
        self.0
    }
}

impl fmt::Display for DownTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} minutes", self.0)
    }
}

impl FromStr for DownTime {
    type Err = Error;

    /// Accepts `"45 minutes"`, `"45 min"` or a bare `"45"`.
    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        let number = trimmed
            .strip_suffix("minutes")
            .or_else(|| trimmed.strip_suffix("min"))
            .unwrap_or(trimmed)
            .trim();
        parse_count("down time", number).map(Self)
    }
}

/// Percentage of reworked units.
///
/// Returns `reworks / quantity * 100`, or `0.0` when nothing was produced.
#[must_use]
pub fn reworks_percent(quantity: u32, reworks: u32) -> f64 {
    if quantity == 0 {
        0.0
    } else {
        f64::from(reworks) / f64::from(quantity) * 100.0
    }
}

/// The user-supplied part of a production record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewRecord {
    /// Production date.
    pub date: NaiveDate,
    /// Shift label.
    pub shift: String,
    /// Time slot label, e.g. `9 AM`.
    pub time: String,
    /// Model label.
    pub model: String,
    /// Material label.
    pub material: String,
    /// Size label.
    pub size: String,
    /// Units produced.
    pub quantity: u32,
    /// Units sent to rework.
    pub reworks: u32,
    /// Down time bucket.
    pub down_time: DownTime,
    /// Per-category counts.
    pub categories: Categories,
}

impl NewRecord {
    /// Rework percentage for this entry.
    #[must_use]
    pub fn reworks_percent(&self) -> f64 {
        reworks_percent(self.quantity, self.reworks)
    }
}

/// A stored production record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductionRecord {
    /// Stable identifier assigned by the record store.
    pub id: u64,
    /// The recorded values.
    #[serde(flatten)]
    pub entry: NewRecord,
}

impl ProductionRecord {
    /// Attach an id to an entry.
    #[must_use]
    pub fn new(id: u64, entry: NewRecord) -> Self {
        Self { id, entry }
    }

    /// Rework percentage for this record.
    #[must_use]
    pub fn reworks_percent(&self) -> f64 {
        self.entry.reworks_percent()
    }
}

pub(crate) fn parse_count(field: &'static str, value: &str) -> Result<u32> {
    value
        .trim()
        .parse::<u32>()
        .map_err(|e| Error::invalid_field(field, format!("'{value}' is not a non-negative count: {e}")))
}

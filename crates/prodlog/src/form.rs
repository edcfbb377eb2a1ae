//! Form collection for new production entries.
//!
//! An [`EntryForm`] is a draft where every field is optional. Building it
//! against a set of [`FormOptions`] fills in defaults and checks the choice
//! fields. The [`Prompter`] fills a draft interactively from any reader and
//! writer pair, which is how `prodlog add --interactive` talks to a terminal.

use std::io::{BufRead, Write};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};
use crate::record::{parse_count, Categories, Category, CategoryCounts, DownTime, NewRecord};

/// Date format accepted on input and written to storage.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// The option lists offered for each choice field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormOptions {
    /// Shift labels.
    pub shifts: Vec<String>,
    /// Material labels.
    pub materials: Vec<String>,
    /// Size labels.
    pub sizes: Vec<String>,
    /// Time slot labels.
    pub times: Vec<String>,
    /// Model labels.
    pub models: Vec<String>,
    /// Down time buckets in minutes.
    pub down_time_minutes: Vec<u32>,
}

impl Default for FormOptions {
    fn default() -> Self {
        Self {
            shifts: strings(&["non shift (komsah)", "shift a (desi & komsah)"]),
            materials: strings(&["Softmax", "hyclons"]),
            sizes: strings(&["4", "5", "6", "7", "7T", "8", "9", "10", "11", "12"]),
            times: (7..12)
                .map(|h| format!("{h} AM"))
                .chain((1..5).map(|h| format!("{h} PM")))
                .collect(),
            models: strings(&["NSM", "Shox", "Ride"]),
            down_time_minutes: (15..=120).step_by(15).collect(),
        }
    }
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(ToString::to_string).collect()
}

impl FormOptions {
    /// Check that every option list is usable.
    ///
    /// # Errors
    ///
    /// Returns a validation error naming the first offending list.
    pub fn validate(&self) -> Result<()> {
        let lists: [(&str, &[String]); 5] = [
            ("shifts", &self.shifts),
            ("materials", &self.materials),
            ("sizes", &self.sizes),
            ("times", &self.times),
            ("models", &self.models),
        ];
        for (name, list) in lists {
            if list.is_empty() {
                return Err(validation(format!("form.{name} must not be empty")));
            }
            if list.iter().any(|label| label.trim().is_empty()) {
                return Err(validation(format!("form.{name} contains a blank label")));
            }
            if let Some(dup) = first_duplicate(list) {
                return Err(validation(format!("form.{name} lists '{dup}' twice")));
            }
        }

        if self.down_time_minutes.is_empty() {
            return Err(validation("form.down_time_minutes must not be empty"));
        }
        if self.down_time_minutes.contains(&0) {
            return Err(validation("form.down_time_minutes must be greater than 0"));
        }
        if let Some(dup) = first_duplicate(&self.down_time_minutes) {
            return Err(validation(format!(
                "form.down_time_minutes lists {dup} twice"
            )));
        }
        Ok(())
    }

    /// Down time buckets as [`DownTime`] values.
    #[must_use]
    pub fn down_times(&self) -> Vec<DownTime> {
        self.down_time_minutes
            .iter()
            .copied()
            .map(DownTime::from_minutes)
            .collect()
    }
}

fn validation(message: impl Into<String>) -> Error {
    Error::ConfigValidation {
        message: message.into(),
    }
}

fn first_duplicate<T: PartialEq>(list: &[T]) -> Option<&T> {
    list.iter()
        .enumerate()
        .find(|(i, item)| list[..*i].contains(*item))
        .map(|(_, item)| item)
}

/// A draft entry. Unset fields take their defaults when built.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryForm {
    /// Production date; defaults to today.
    pub date: Option<NaiveDate>,
    /// Shift label; defaults to the first option.
    pub shift: Option<String>,
    /// Time slot label; defaults to the first option.
    pub time: Option<String>,
    /// Model label; defaults to the first option.
    pub model: Option<String>,
    /// Material label; defaults to the first option.
    pub material: Option<String>,
    /// Size label; defaults to the first option.
    pub size: Option<String>,
    /// Units produced; defaults to 0.
    pub quantity: Option<u32>,
    /// Units sent to rework; defaults to 0.
    pub reworks: Option<u32>,
    /// Down time; defaults to the first bucket.
    pub down_time: Option<DownTime>,
    /// Category counts; unset categories are zero.
    pub categories: Categories,
}

impl EntryForm {
    /// Fill defaults and validate the draft.
    ///
    /// # Errors
    ///
    /// Returns an error if a choice field holds a label that is not in its
    /// option list, or the down time is not one of the configured buckets.
    pub fn build(self, options: &FormOptions, today: NaiveDate) -> Result<NewRecord> {
        let down_times = options.down_times();
        let down_time = match self.down_time {
            Some(value) if down_times.contains(&value) => value,
            Some(value) => {
                return Err(Error::invalid_field(
                    "down time",
                    format!("'{value}' is not one of {}", join(&down_times)),
                ))
            }
            None => first(&down_times, "down time")?,
        };

        Ok(NewRecord {
            date: self.date.unwrap_or(today),
            shift: choose("shift", self.shift, &options.shifts)?,
            time: choose("time", self.time, &options.times)?,
            model: choose("model", self.model, &options.models)?,
            material: choose("material", self.material, &options.materials)?,
            size: choose("size", self.size, &options.sizes)?,
            quantity: self.quantity.unwrap_or(0),
            reworks: self.reworks.unwrap_or(0),
            down_time,
            categories: self.categories,
        })
    }
}

fn choose(field: &'static str, value: Option<String>, options: &[String]) -> Result<String> {
    match value {
        Some(value) => match_option(field, &value, options),
        None => first(options, field),
    }
}

fn first<T: Clone>(options: &[T], field: &'static str) -> Result<T> {
    options
        .first()
        .cloned()
        .ok_or_else(|| Error::invalid_field(field, "no options are configured"))
}

/// Resolve an input against an option list.
///
/// Exact matches win, then case-insensitive ones. The stored value is always
/// the configured label.
fn match_option(field: &'static str, input: &str, options: &[String]) -> Result<String> {
    let input = input.trim();
    options
        .iter()
        .find(|option| option.as_str() == input)
        .or_else(|| {
            options
                .iter()
                .find(|option| option.eq_ignore_ascii_case(input))
        })
        .cloned()
        .ok_or_else(|| {
            Error::invalid_field(
                field,
                format!("'{input}' is not one of {}", join(options)),
            )
        })
}

fn join<T: std::fmt::Display>(items: &[T]) -> String {
    items
        .iter()
        .map(|item| format!("'{item}'"))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Interactive form collector.
///
/// Prompts are written to `output`; answers are read line by line from
/// `input`. A blank answer keeps the value shown in brackets. Invalid answers
/// print the problem and ask again.
#[derive(Debug)]
pub struct Prompter<'a, R, W> {
    input: R,
    output: W,
    options: &'a FormOptions,
}

impl<'a, R: BufRead, W: Write> Prompter<'a, R, W> {
    /// Create a prompter over the given streams.
    pub fn new(input: R, output: W, options: &'a FormOptions) -> Self {
        Self {
            input,
            output,
            options,
        }
    }

    /// Collect a complete entry, starting from the values in `draft`.
    ///
    /// The draft is checked before the first prompt, so a value that is not
    /// in its option list fails without asking anything.
    ///
    /// # Errors
    ///
    /// Returns an error if the draft is invalid, [`Error::InputAborted`] if
    /// the input ends early, or an I/O error if the streams fail.
    pub fn collect(&mut self, draft: EntryForm, today: NaiveDate) -> Result<NewRecord> {
        let options = self.options;
        let defaults = draft.build(options, today)?;

        let date = self.ask("Date (YYYY-MM-DD)", defaults.date, |s| {
            NaiveDate::parse_from_str(s, DATE_FORMAT)
                .map_err(|e| Error::invalid_field("date", format!("'{s}': {e}")))
        })?;
        let shift = self.choose("Shift", defaults.shift, &options.shifts)?;
        let material = self.choose("Material", defaults.material, &options.materials)?;
        let size = self.choose("Size", defaults.size, &options.sizes)?;
        let time = self.choose("Time", defaults.time, &options.times)?;
        let model = self.choose("Model", defaults.model, &options.models)?;
        let quantity = self.ask("Quantity", defaults.quantity, |s| {
            parse_count("quantity", s)
        })?;
        let reworks = self.ask("Reworks quantity", defaults.reworks, |s| {
            parse_count("reworks", s)
        })?;
        let down_times = options.down_times();
        let down_time = self.choose("Down time", defaults.down_time, &down_times)?;

        writeln!(self.output, "Production details (planned, rework, lost)")?;
        let mut categories = defaults.categories;
        for category in Category::ALL {
            let current = categories.get(category);
            let counts = self.ask_counts(category, current)?;
            categories.set(category, counts);
        }

        let form = EntryForm {
            date: Some(date),
            shift: Some(shift),
            time: Some(time),
            model: Some(model),
            material: Some(material),
            size: Some(size),
            quantity: Some(quantity),
            reworks: Some(reworks),
            down_time: Some(down_time),
            categories,
        };
        form.build(options, today)
    }

    fn ask_counts(&mut self, category: Category, current: CategoryCounts) -> Result<CategoryCounts> {
        let planned = self.ask(&format!("  {category}_P"), current.planned, |s| {
            parse_count("category", s)
        })?;
        let rework = self.ask(&format!("  {category}_R"), current.rework, |s| {
            parse_count("category", s)
        })?;
        let lost = self.ask(&format!("  {category}_L"), current.lost, |s| {
            parse_count("category", s)
        })?;
        Ok(CategoryCounts::new(planned, rework, lost))
    }

    /// Offer a numbered list; accept the label, the value, or its number.
    ///
    /// Labels and values win over numbers so that a size of `7` is not read
    /// as the seventh option, and a down time of `30` means 30 minutes.
    fn choose<T>(&mut self, label: &str, default: T, options: &[T]) -> Result<T>
    where
        T: Clone + PartialEq + std::fmt::Display + std::str::FromStr,
    {
        for (i, option) in options.iter().enumerate() {
            writeln!(self.output, "  {}) {option}", i + 1)?;
        }
        self.ask(label, default, |s| {
            let by_label = options
                .iter()
                .find(|option| option.to_string().eq_ignore_ascii_case(s));
            let by_value = || {
                s.parse::<T>()
                    .ok()
                    .and_then(|value| options.iter().find(|option| **option == value))
            };
            let by_number = || {
                s.parse::<usize>()
                    .ok()
                    .and_then(|n| n.checked_sub(1))
                    .and_then(|i| options.get(i))
            };
            by_label
                .or_else(by_value)
                .or_else(by_number)
                .cloned()
                .ok_or_else(|| Error::invalid_field("choice", format!("'{s}' is not listed")))
        })
    }

    fn ask<T, F>(&mut self, label: &str, default: T, parse: F) -> Result<T>
    where
        T: std::fmt::Display,
        F: Fn(&str) -> Result<T>,
    {
        loop {
            write!(self.output, "{label} [{default}]: ")?;
            self.output.flush()?;

            let mut line = String::new();
            if self.input.read_line(&mut line)? == 0 {
                return Err(Error::InputAborted);
            }
            let answer = line.trim();
            if answer.is_empty() {
                return Ok(default);
            }
            match parse(answer) {
                Ok(value) => return Ok(value),
                Err(e) => {
                    debug!("Rejected answer for {}: {}", label.trim(), e);
                    writeln!(self.output, "  {e}")?;
                }
            }
        }
    }
}

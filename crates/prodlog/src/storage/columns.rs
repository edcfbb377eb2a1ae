//! Column layout of the production data file.
//!
//! Rows are encoded in header order. Decoding looks columns up by name so
//! files with reordered columns, or without an `Id` column, still load.

use chrono::NaiveDate;
use csv::StringRecord;

use crate::error::{Error, Result};
use crate::form::DATE_FORMAT;
use crate::record::{Categories, Category, CategoryCounts, DownTime, NewRecord, ProductionRecord};

/// Stable record identifier.
pub const ID: &str = "Id";
/// Production date.
pub const DATE: &str = "Date";
/// Shift label.
pub const SHIFT: &str = "Shift";
/// Time slot.
pub const TIME: &str = "Time";
/// Model label.
pub const MODEL: &str = "Model";
/// Material label.
pub const MATERIAL: &str = "Material";
/// Size label.
pub const SIZE: &str = "Size";
/// Units produced.
pub const QUANTITY: &str = "Quantity";
/// Units sent to rework.
pub const REWORKS: &str = "Reworks Quantity";
/// Derived rework percentage. Written, never read back.
pub const REWORKS_PERCENT: &str = "Reworks %";
/// Down time bucket.
pub const DOWN_TIME: &str = "Down Time";

/// Sub-field suffixes of a category group, in column order.
pub const CATEGORY_SUFFIXES: [char; 3] = ['P', 'R', 'L'];

const LEADING: [&str; 11] = [
    ID,
    DATE,
    SHIFT,
    TIME,
    MODEL,
    MATERIAL,
    SIZE,
    QUANTITY,
    REWORKS,
    REWORKS_PERCENT,
    DOWN_TIME,
];

/// Column name for one sub-field of a category, e.g. `T&H_P`.
#[must_use]
pub fn category_column(category: Category, suffix: char) -> String {
    format!("{}_{suffix}", category.label())
}

/// The full header row.
#[must_use]
pub fn header() -> Vec<String> {
    LEADING
        .iter()
        .map(ToString::to_string)
        .chain(Category::ALL.into_iter().flat_map(|category| {
            CATEGORY_SUFFIXES
                .into_iter()
                .map(move |suffix| category_column(category, suffix))
        }))
        .collect()
}

/// Encode a record as one row, in [`header`] order.
#[must_use]
pub fn encode(record: &ProductionRecord) -> Vec<String> {
    let entry = &record.entry;
    let mut row = vec![
        record.id.to_string(),
        entry.date.format(DATE_FORMAT).to_string(),
        entry.shift.clone(),
        entry.time.clone(),
        entry.model.clone(),
        entry.material.clone(),
        entry.size.clone(),
        entry.quantity.to_string(),
        entry.reworks.to_string(),
        // Debug keeps the trailing `.0` on whole percentages.
        format!("{:?}", entry.reworks_percent()),
        entry.down_time.to_string(),
    ];
    for (_, counts) in entry.categories.iter() {
        row.push(counts.planned.to_string());
        row.push(counts.rework.to_string());
        row.push(counts.lost.to_string());
    }
    row
}

/// Positions of every known column within a file's header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnIndex {
    id: Option<usize>,
    date: usize,
    shift: usize,
    time: usize,
    model: usize,
    material: usize,
    size: usize,
    quantity: usize,
    reworks: usize,
    down_time: usize,
    categories: [[usize; 3]; 8],
}

impl ColumnIndex {
    /// Locate the columns in a header row.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingColumn`] for the first required column that
    /// is absent. `Id` and `Reworks %` are optional.
    pub fn from_header(header: &StringRecord) -> Result<Self> {
        let find = |name: &str| header.iter().position(|column| column.trim() == name);
        let require = |name: &str| {
            find(name).ok_or_else(|| Error::MissingColumn {
                column: name.to_string(),
            })
        };

        let mut categories = [[0; 3]; 8];
        for (slot, category) in categories.iter_mut().zip(Category::ALL) {
            for (position, suffix) in slot.iter_mut().zip(CATEGORY_SUFFIXES) {
                *position = require(&category_column(category, suffix))?;
            }
        }

        Ok(Self {
            id: find(ID),
            date: require(DATE)?,
            shift: require(SHIFT)?,
            time: require(TIME)?,
            model: require(MODEL)?,
            material: require(MATERIAL)?,
            size: require(SIZE)?,
            quantity: require(QUANTITY)?,
            reworks: require(REWORKS)?,
            down_time: require(DOWN_TIME)?,
            categories,
        })
    }

    /// Whether the file carries stable ids.
    #[must_use]
    pub fn has_id(&self) -> bool {
        self.id.is_some()
    }

    /// Decode one row. The id is `None` when the file has no `Id` column or
    /// the cell is blank.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedRow`] naming the line and column of the
    /// first value that cannot be decoded.
    pub fn decode(&self, row: &StringRecord) -> Result<(Option<u64>, NewRecord)> {
        let line = row.position().map_or(0, csv::Position::line);
        let cell = |index: usize, column: &str| {
            row.get(index)
                .map(str::trim)
                .ok_or_else(|| Error::malformed_row(line, column, "row is too short"))
        };
        let count = |index: usize, column: &str| {
            cell(index, column).and_then(|value| {
                parse_count(value).ok_or_else(|| {
                    Error::malformed_row(
                        line,
                        column,
                        format!("'{value}' is not a non-negative count"),
                    )
                })
            })
        };

        let id = match self.id {
            Some(index) => match cell(index, ID)? {
                "" => None,
                value => Some(value.parse::<u64>().map_err(|e| {
                    Error::malformed_row(line, ID, format!("'{value}': {e}"))
                })?),
            },
            None => None,
        };

        let date_value = cell(self.date, DATE)?;
        let date = NaiveDate::parse_from_str(date_value, DATE_FORMAT)
            .map_err(|e| Error::malformed_row(line, DATE, format!("'{date_value}': {e}")))?;

        let down_value = cell(self.down_time, DOWN_TIME)?;
        let down_time = down_value
            .parse::<DownTime>()
            .map_err(|e| Error::malformed_row(line, DOWN_TIME, e.to_string()))?;

        let mut categories = Categories::default();
        for (positions, category) in self.categories.iter().zip(Category::ALL) {
            let [p, r, l] = *positions;
            let counts = CategoryCounts::new(
                count(p, &category_column(category, 'P'))?,
                count(r, &category_column(category, 'R'))?,
                count(l, &category_column(category, 'L'))?,
            );
            categories.set(category, counts);
        }

        let entry = NewRecord {
            date,
            shift: cell(self.shift, SHIFT)?.to_string(),
            time: cell(self.time, TIME)?.to_string(),
            model: cell(self.model, MODEL)?.to_string(),
            material: cell(self.material, MATERIAL)?.to_string(),
            size: cell(self.size, SIZE)?.to_string(),
            quantity: count(self.quantity, QUANTITY)?,
            reworks: count(self.reworks, REWORKS)?,
            down_time,
            categories,
        };
        Ok((id, entry))
    }
}

/// Parse a count, accepting whole floats such as `12.0`.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn parse_count(value: &str) -> Option<u32> {
    if let Ok(count) = value.parse::<u32>() {
        return Some(count);
    }
    let float = value.parse::<f64>().ok()?;
    (float.fract() == 0.0 && (0.0..=f64::from(u32::MAX)).contains(&float)).then(|| float as u32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::tests::sample_entry;

    fn string_record(fields: &[String]) -> StringRecord {
        StringRecord::from(fields.to_vec())
    }

    #[test]
    fn test_header_layout() {
        let header = header();

        assert_eq!(header.len(), 11 + 8 * 3);
        assert_eq!(header[0], "Id");
        assert_eq!(header[8], "Reworks Quantity");
        assert_eq!(header[9], "Reworks %");
        assert_eq!(header[11], "T&H_P");
        assert_eq!(header[12], "T&H_R");
        assert_eq!(header[13], "T&H_L");
        assert_eq!(header[header.len() - 1], "Other_L");
    }

    #[test]
    fn test_encode_matches_header_width() {
        let record = ProductionRecord::new(9, sample_entry());
        let row = encode(&record);

        assert_eq!(row.len(), header().len());
        assert_eq!(row[0], "9");
        assert_eq!(row[1], "2025-03-14");
        assert_eq!(row[9], "10.0");
        assert_eq!(row[10], "30 minutes");
        assert_eq!(&row[11..14], ["5", "1", "0"]);
    }

    #[test]
    fn test_decode_encoded_row() {
        let record = ProductionRecord::new(9, sample_entry());
        let index = ColumnIndex::from_header(&string_record(&header())).unwrap();

        let (id, entry) = index.decode(&string_record(&encode(&record))).unwrap();

        assert_eq!(id, Some(9));
        assert_eq!(entry, record.entry);
    }

    #[test]
    fn test_header_without_id() {
        let legacy: Vec<String> = header().into_iter().skip(1).collect();
        let index = ColumnIndex::from_header(&string_record(&legacy)).unwrap();
        assert!(!index.has_id());

        let row: Vec<String> = encode(&ProductionRecord::new(1, sample_entry()))
            .into_iter()
            .skip(1)
            .collect();
        let (id, entry) = index.decode(&string_record(&row)).unwrap();

        assert_eq!(id, None);
        assert_eq!(entry, sample_entry());
    }

    #[test]
    fn test_missing_required_column() {
        let partial: Vec<String> = header()
            .into_iter()
            .filter(|column| column != "DFM_R")
            .collect();
        let err = ColumnIndex::from_header(&string_record(&partial)).unwrap_err();

        assert!(matches!(err, Error::MissingColumn { ref column } if column == "DFM_R"));
    }

    #[test]
    fn test_decode_reports_bad_count() {
        let index = ColumnIndex::from_header(&string_record(&header())).unwrap();
        let mut row = encode(&ProductionRecord::new(1, sample_entry()));
        row[7] = "-4".to_string();

        let err = index.decode(&string_record(&row)).unwrap_err();
        assert!(matches!(err, Error::MalformedRow { ref column, .. } if column == QUANTITY));
    }

    #[test]
    fn test_decode_reports_bad_date() {
        let index = ColumnIndex::from_header(&string_record(&header())).unwrap();
        let mut row = encode(&ProductionRecord::new(1, sample_entry()));
        row[1] = "14/03/2025".to_string();

        let err = index.decode(&string_record(&row)).unwrap_err();
        assert!(matches!(err, Error::MalformedRow { ref column, .. } if column == DATE));
    }

    #[test]
    fn test_decode_blank_id() {
        let index = ColumnIndex::from_header(&string_record(&header())).unwrap();
        let mut row = encode(&ProductionRecord::new(1, sample_entry()));
        row[0] = String::new();

        let (id, _) = index.decode(&string_record(&row)).unwrap();
        assert_eq!(id, None);
    }

    #[test]
    fn test_parse_count_accepts_whole_floats() {
        assert_eq!(parse_count("12"), Some(12));
        assert_eq!(parse_count("12.0"), Some(12));
        assert_eq!(parse_count("12.5"), None);
        assert_eq!(parse_count("-1"), None);
        assert_eq!(parse_count("NaN"), None);
        assert_eq!(parse_count(""), None);
    }
}

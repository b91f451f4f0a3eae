use chrono::{Duration, Months, NaiveDateTime};

use crate::models::{split_tag_key, MetadataModel, ShiftDelta, TagKey};

/// Layout of ExifTool date/time values, e.g. `2024:03:09 17:45:00`.
pub const EXIF_DATETIME_FORMAT: &str = "%Y:%m:%d %H:%M:%S";

const EXIF_DATETIME_LEN: usize = 19;

/// Tags covered by ExifTool's `AllDates` shortcut.
pub const ALL_DATES_TAGS: &[&str] = &["DateTimeOriginal", "CreateDate", "ModifyDate"];

/// Builds the `-AllDates+=` argument for a signed offset.
///
/// Clauses appear in a fixed order (years, months, days, then hours and
/// minutes together) and only for non-zero parts. Every number carries an
/// explicit sign; minutes are padded to two digits. All zeros yields `""`.
pub fn build_shift_expression(
    years: i32,
    months: i32,
    days: i32,
    hours: i32,
    minutes: i32,
) -> String {
    let mut clauses = Vec::new();

    if years != 0 {
        clauses.push(format!("{years:+}:0:0"));
    }
    if months != 0 {
        clauses.push(format!("0:{months:+}:0"));
    }
    if days != 0 {
        clauses.push(format!("0:0:{days:+}"));
    }
    if hours != 0 || minutes != 0 {
        clauses.push(format!("{hours:+}:{minutes:+03}:0"));
    }

    clauses.join(" ")
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ShiftPreview {
    pub key: TagKey,
    pub before: String,
    pub after: String,
}

impl ShiftDelta {
    pub fn expression(&self) -> String {
        build_shift_expression(self.years, self.months, self.days, self.hours, self.minutes)
    }

    /// Calendar part first (day clamped to the month end), then the clock part.
    pub fn apply(&self, value: NaiveDateTime) -> Option<NaiveDateTime> {
        let total_months = i64::from(self.years) * 12 + i64::from(self.months);
        let month_count = Months::new(u32::try_from(total_months.unsigned_abs()).ok()?);

        let shifted = if total_months >= 0 {
            value.checked_add_months(month_count)?
        } else {
            value.checked_sub_months(month_count)?
        };

        let clock = Duration::days(i64::from(self.days))
            + Duration::hours(i64::from(self.hours))
            + Duration::minutes(i64::from(self.minutes));

        shifted.checked_add_signed(clock)
    }

    /// Shifts an ExifTool-formatted value, keeping any sub-second or zone suffix.
    pub fn apply_to_text(&self, value: &str) -> Option<String> {
        let (timestamp, suffix) = split_exif_datetime(value)?;
        let shifted = self.apply(timestamp)?;
        Some(format!("{}{suffix}", shifted.format(EXIF_DATETIME_FORMAT)))
    }
}

pub fn parse_exif_datetime(value: &str) -> Option<NaiveDateTime> {
    split_exif_datetime(value).map(|(timestamp, _)| timestamp)
}

fn split_exif_datetime(value: &str) -> Option<(NaiveDateTime, &str)> {
    let value = value.trim();
    if !value.is_char_boundary(EXIF_DATETIME_LEN) {
        return None;
    }

    let (head, suffix) = value.split_at(EXIF_DATETIME_LEN);
    let timestamp = NaiveDateTime::parse_from_str(head, EXIF_DATETIME_FORMAT).ok()?;
    Some((timestamp, suffix))
}

/// Before/after pairs for every `AllDates` tag the shift would touch.
pub fn preview_shift(model: &MetadataModel, delta: &ShiftDelta) -> Vec<ShiftPreview> {
    model
        .record()
        .iter()
        .filter(|(key, _)| ALL_DATES_TAGS.contains(&split_tag_key(key).1))
        .filter_map(|(key, value)| {
            let text = value.as_text()?;
            let after = delta.apply_to_text(text)?;
            Some(ShiftPreview {
                key: key.clone(),
                before: text.to_string(),
                after,
            })
        })
        .collect()
}

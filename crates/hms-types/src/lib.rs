//! Small validated value types shared by the hospital services.

use chrono::{DateTime, Duration, Utc};

/// Errors that can occur when creating validated text types.
#[derive(Debug, thiserror::Error)]
pub enum TextError {
    /// The input text was empty or contained only whitespace
    #[error("Text cannot be empty")]
    Empty,
}

/// A string type that guarantees non-empty content.
///
/// This type wraps a `String` and ensures it contains at least one non-whitespace character.
/// The input is automatically trimmed of leading and trailing whitespace during construction.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NonEmptyText(String);

impl NonEmptyText {
    /// Creates a new `NonEmptyText` from the given input.
    ///
    /// The input is trimmed of leading and trailing whitespace. If the trimmed
    /// result is empty, an error is returned.
    pub fn new(input: impl AsRef<str>) -> Result<Self, TextError> {
        let trimmed = input.as_ref().trim();
        if trimmed.is_empty() {
            return Err(TextError::Empty);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the inner string as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl std::fmt::Display for NonEmptyText {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for NonEmptyText {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl serde::Serialize for NonEmptyText {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> serde::Deserialize<'de> for NonEmptyText {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        NonEmptyText::new(&s).map_err(serde::de::Error::custom)
    }
}

/// Errors raised when building a [`TimeRange`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RangeError {
    #[error("end time {end} is before start time {start}")]
    EndBeforeStart {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },
    #[error("time range falls outside the supported calendar")]
    OutOfBounds,
}

/// A closed window of time in UTC.
///
/// Ranges where `start == end` are allowed; they describe an instant and overlap nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeRange {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl TimeRange {
    /// Builds a range, rejecting an end that precedes the start.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self, RangeError> {
        if end < start {
            return Err(RangeError::EndBeforeStart { start, end });
        }
        Ok(Self { start, end })
    }

    /// Builds the range `[start, start + duration)`.
    pub fn starting_at(start: DateTime<Utc>, duration: Duration) -> Result<Self, RangeError> {
        let end = start
            .checked_add_signed(duration)
            .ok_or(RangeError::OutOfBounds)?;
        Self::new(start, end)
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Half-open overlap test: touching ranges do not overlap, and an empty range overlaps
    /// nothing.
    pub fn overlaps(&self, other: &TimeRange) -> bool {
        !self.is_empty()
            && !other.is_empty()
            && self.start < other.end
            && other.start < self.end
    }

    /// Returns true when `other` lies entirely inside this range (bounds inclusive).
    pub fn contains(&self, other: &TimeRange) -> bool {
        self.start <= other.start && other.end <= self.end
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2030, 1, 15, hour, minute, 0)
            .single()
            .expect("valid test timestamp")
    }

    fn range(from: (u32, u32), to: (u32, u32)) -> TimeRange {
        TimeRange::new(at(from.0, from.1), at(to.0, to.1)).expect("valid test range")
    }

    #[test]
    fn non_empty_text_trims_input() {
        let text = NonEmptyText::new("  Cardiology ").expect("should accept padded text");
        assert_eq!(text.as_str(), "Cardiology");
    }

    #[test]
    fn non_empty_text_rejects_whitespace() {
        assert!(matches!(NonEmptyText::new("   "), Err(TextError::Empty)));
    }

    #[test]
    fn non_empty_text_deserialize_rejects_empty() {
        let result: Result<NonEmptyText, _> = serde_json::from_str("\"\"");
        assert!(result.is_err());
    }

    #[test]
    fn time_range_rejects_end_before_start() {
        let err = TimeRange::new(at(10, 0), at(9, 0)).expect_err("end before start should fail");
        assert!(matches!(err, RangeError::EndBeforeStart { .. }));
    }

    #[test]
    fn time_range_allows_zero_length() {
        let r = TimeRange::new(at(10, 0), at(10, 0)).expect("zero length range is valid");
        assert_eq!(r.duration(), Duration::zero());
    }

    #[test]
    fn touching_ranges_do_not_overlap() {
        assert!(!range((9, 0), (10, 0)).overlaps(&range((10, 0), (11, 0))));
        assert!(range((9, 0), (10, 1)).overlaps(&range((10, 0), (11, 0))));
    }

    #[test]
    fn contains_is_inclusive_at_both_ends() {
        let window = range((9, 0), (12, 0));
        assert!(window.contains(&range((9, 0), (12, 0))));
        assert!(window.contains(&range((10, 0), (11, 0))));
        assert!(!window.contains(&range((8, 59), (10, 0))));
    }

    #[test]
    fn starting_at_adds_duration() {
        let r = TimeRange::starting_at(at(9, 0), Duration::minutes(30)).expect("valid range");
        assert_eq!(r.end(), at(9, 30));
    }

    #[test]
    fn zero_length_range_overlaps_nothing() {
        let instant = range((10, 0), (10, 0));
        let window = range((9, 0), (11, 0));
        assert!(instant.is_empty());
        assert!(!window.overlaps(&instant));
        assert!(!instant.overlaps(&window));
        assert!(!instant.overlaps(&instant));
        assert!(window.contains(&instant));
    }
}

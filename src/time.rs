use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

/// Convert a `NaiveDateTime` to a fraction of hours since midnight of `day`
///
/// Times on later days yield values above 24, earlier days negative values.
#[must_use]
pub fn time_to_fraction(time: NaiveDateTime, day: NaiveDate) -> f64 {
    let base_datetime = day.and_time(NaiveTime::MIN);
    let duration_since_base = time.signed_duration_since(base_datetime);

    // Break down into hours, minutes, seconds to avoid precision loss
    let total_seconds = duration_since_base.num_seconds();
    let hours = total_seconds / 3600;
    let remaining_seconds = total_seconds % 3600;
    let minutes = remaining_seconds / 60;
    let seconds = remaining_seconds % 60;

    let total_ms = duration_since_base.num_milliseconds();
    let milliseconds = total_ms % 1000;

    // These casts truncate for very large values, but are correct for schedule ranges
    #[allow(clippy::cast_possible_truncation)]
    let hours_f64 = f64::from(hours as i32);
    #[allow(clippy::cast_possible_truncation)]
    let minutes_f64 = f64::from(minutes as i32);
    #[allow(clippy::cast_possible_truncation)]
    let seconds_f64 = f64::from(seconds as i32);
    #[allow(clippy::cast_possible_truncation)]
    let millis_f64 = f64::from(milliseconds as i32);

    hours_f64 + minutes_f64 / 60.0 + seconds_f64 / 3600.0 + millis_f64 / 3_600_000.0
}

/// Serialize a `chrono::Duration` as whole seconds
pub mod duration_serde {
    use chrono::Duration;
    use serde::{Deserialize, Deserializer, Serializer};

    /// # Errors
    ///
    /// Returns an error if the serializer rejects an `i64`.
    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_i64(duration.num_seconds())
    }

    /// # Errors
    ///
    /// Returns an error if the input is not an `i64`.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let seconds = i64::deserialize(deserializer)?;
        Ok(Duration::seconds(seconds))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 18).expect("valid date")
    }

    #[test]
    fn test_time_to_fraction_midnight() {
        let midnight = day().and_hms_opt(0, 0, 0).expect("valid time");
        assert_eq!(time_to_fraction(midnight, day()), 0.0);
    }

    #[test]
    fn test_time_to_fraction_with_minutes() {
        let time = day().and_hms_opt(8, 30, 0).expect("valid time");
        assert_eq!(time_to_fraction(time, day()), 8.5);
    }

    #[test]
    fn test_time_to_fraction_next_day() {
        let next = day().succ_opt().expect("valid date");
        let time = next.and_hms_opt(1, 15, 0).expect("valid time");
        assert_eq!(time_to_fraction(time, day()), 25.25);
    }

    #[test]
    fn test_time_to_fraction_with_seconds() {
        let time = day().and_hms_opt(1, 0, 30).expect("valid time");
        assert_eq!(time_to_fraction(time, day()), 1.0 + 30.0 / 3600.0);
    }
}

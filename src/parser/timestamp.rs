use std::sync::LazyLock;

use chrono::{Duration, LocalResult, NaiveDateTime, Offset, TimeZone};
use chrono_tz::Tz;
use regex::Regex;

/// Zone the page states its update time in.
pub const SOURCE_TZ: Tz = chrono_tz::America::New_York;
/// Zone the update time is shown in.
pub const DISPLAY_TZ: Tz = chrono_tz::Europe::Berlin;

// "Updated: 30-Aug-24 14:12 ET"
static LABEL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:Updated:\s*)?(\d{1,2}-[A-Za-z]{3}-\d{2} \d{1,2}:\d{2}) ET$").unwrap()
});

/// Turn the page's update label into a display-zone timestamp string.
/// `None` means the label didn't have the expected shape.
pub fn normalize_label(label: &str) -> Option<String> {
    let caps = LABEL_RE.captures(label.trim())?;
    let naive = NaiveDateTime::parse_from_str(&caps[1], "%d-%b-%y %H:%M").ok()?;
    convert(naive, SOURCE_TZ, DISPLAY_TZ)
}

/// Read `naive` as wall-clock time in `source` and format it in `display`.
///
/// A fall-back repeat resolves to standard time. A time skipped by the
/// spring-forward gap is read at the offset in force just before the gap.
pub fn convert(naive: NaiveDateTime, source: Tz, display: Tz) -> Option<String> {
    let local = match source.from_local_datetime(&naive) {
        LocalResult::Single(dt) => dt,
        LocalResult::Ambiguous(_, standard) => standard,
        LocalResult::None => {
            let before = source.offset_from_utc_datetime(&(naive - Duration::days(1))).fix();
            let utc = naive - Duration::seconds(i64::from(before.local_minus_utc()));
            source.from_utc_datetime(&utc)
        }
    };
    Some(
        local
            .with_timezone(&display)
            .format("%Y-%m-%d %H:%M:%S %Z")
            .to_string(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn summer_shift() {
        assert_eq!(
            normalize_label("Updated: 30-Aug-24 14:12 ET").as_deref(),
            Some("2024-08-30 20:12:00 CEST")
        );
    }

    #[test]
    fn winter_shift() {
        assert_eq!(
            normalize_label("Updated: 15-Jan-24 09:30 ET").as_deref(),
            Some("2024-01-15 15:30:00 CET")
        );
    }

    #[test]
    fn us_dst_before_eu_dst() {
        // US clocks move on 10 Mar 2024, European clocks on 31 Mar.
        assert_eq!(
            normalize_label("Updated: 15-Mar-24 10:00 ET").as_deref(),
            Some("2024-03-15 15:00:00 CET")
        );
    }

    #[test]
    fn crosses_midnight() {
        assert_eq!(
            normalize_label("Updated: 31-Dec-24 20:05 ET").as_deref(),
            Some("2025-01-01 02:05:00 CET")
        );
    }

    #[test]
    fn label_without_prefix() {
        assert_eq!(
            normalize_label("  30-Aug-24 14:12 ET ").as_deref(),
            Some("2024-08-30 20:12:00 CEST")
        );
    }

    #[test]
    fn malformed_labels_are_absent() {
        assert_eq!(normalize_label("Updated: 30-Aug-24 14:12"), None);
        assert_eq!(normalize_label("Updated: 30-Aug-24 14:12 PT"), None);
        assert_eq!(normalize_label("Updated: 31-Feb-24 14:12 ET"), None);
        assert_eq!(normalize_label("Updated: 30-Foo-24 14:12 ET"), None);
        assert_eq!(normalize_label("Updated: 30-Aug-24 25:12 ET"), None);
        assert_eq!(normalize_label(""), None);
    }

    #[test]
    fn ambiguous_hour_is_standard_time() {
        // 01:30 happens twice on 3 Nov 2024; the EST one is 06:30 UTC.
        let naive = NaiveDate::from_ymd_opt(2024, 11, 3)
            .unwrap()
            .and_hms_opt(1, 30, 0)
            .unwrap();
        assert_eq!(
            convert(naive, SOURCE_TZ, DISPLAY_TZ).as_deref(),
            Some("2024-11-03 07:30:00 CET")
        );
    }

    #[test]
    fn skipped_hour_uses_standard_offset() {
        // 02:30 never shows on New York clocks on 10 Mar 2024; read it as EST.
        let naive = NaiveDate::from_ymd_opt(2024, 3, 10)
            .unwrap()
            .and_hms_opt(2, 30, 0)
            .unwrap();
        assert_eq!(
            convert(naive, SOURCE_TZ, DISPLAY_TZ).as_deref(),
            Some("2024-03-10 08:30:00 CET")
        );
        assert_eq!(
            normalize_label("Updated: 10-Mar-24 02:30 ET").as_deref(),
            Some("2024-03-10 08:30:00 CET")
        );
    }

    #[test]
    fn zone_pair_is_a_parameter() {
        let naive = NaiveDate::from_ymd_opt(2024, 8, 30)
            .unwrap()
            .and_hms_opt(14, 12, 0)
            .unwrap();
        assert_eq!(
            convert(naive, chrono_tz::UTC, chrono_tz::Asia::Tokyo).as_deref(),
            Some("2024-08-30 23:12:00 JST")
        );
    }
}

//! Zoned timestamps and the letter-based date patterns (`yyyy/MM/dd HH:mm`)
//! used to format and parse them.

use std::{fmt, str::FromStr};

use chrono::{
    DateTime, Days, LocalResult, Months, NaiveDate, NaiveDateTime, Offset, TimeDelta, TimeZone,
    Utc,
};
use chrono_tz::Tz;
use strum::EnumString;
use thiserror::Error;

const MILLIS_PER_DAY: i64 = 24 * 60 * 60 * 1000;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum TimeError {
    #[error("Unknown time zone {0}")]
    UnknownTimeZone(String),
    #[error("Invalid time unit {0}")]
    UnknownTimeUnit(String),
    #[error("Unsupported pattern letter '{letter}' in {pattern}")]
    Pattern { letter: char, pattern: String },
    #[error("Cannot parse time string {text} with pattern {pattern}")]
    Parse { text: String, pattern: String },
    #[error("Time out of range")]
    OutOfRange,
}

pub type TimeResult<T> = Result<T, TimeError>;

/// Calendar unit accepted by `timeAdd`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, strum::Display)]
pub enum TimeUnit {
    #[strum(serialize = "y")]
    Year,
    #[strum(serialize = "M")]
    Month,
    #[strum(serialize = "D")]
    Day,
    #[strum(serialize = "h")]
    Hour,
    #[strum(serialize = "m")]
    Minute,
    #[strum(serialize = "s")]
    Second,
    #[strum(serialize = "S")]
    Millisecond,
}

impl TimeUnit {
    pub fn parse(symbol: &str) -> TimeResult<Self> {
        TimeUnit::from_str(symbol).map_err(|_| TimeError::UnknownTimeUnit(symbol.to_string()))
    }
}

pub fn parse_time_zone(name: &str) -> TimeResult<Tz> {
    name.parse::<Tz>()
        .map_err(|_| TimeError::UnknownTimeZone(name.to_string()))
}

/// An instant together with the zone it is presented in.
///
/// The formatted form (`yyyy/MM/dd HH:mm:ss.SSS z`) is computed once.
#[derive(Debug, Clone)]
pub struct TimeValue {
    millis: i64,
    zone: Tz,
    formatted: String,
}

impl TimeValue {
    pub const DISPLAY_PATTERN: &'static str = "%Y/%m/%d %H:%M:%S%.3f %Z";

    pub fn new(zone: Tz, millis: i64) -> Self {
        let formatted = to_date_time(zone, millis)
            .format(Self::DISPLAY_PATTERN)
            .to_string();
        Self {
            millis,
            zone,
            formatted,
        }
    }

    /// Epoch milliseconds.
    pub fn millis(&self) -> i64 {
        self.millis
    }

    pub fn zone(&self) -> Tz {
        self.zone
    }

    pub fn zone_id(&self) -> &'static str {
        self.zone.name()
    }

    pub fn date_time(&self) -> DateTime<Tz> {
        to_date_time(self.zone, self.millis)
    }

    /// Midnight of the same local day.
    pub fn start_of_day(&self) -> TimeResult<Self> {
        let local = self.date_time().date_naive();
        from_local(self.zone, local.and_time(chrono::NaiveTime::MIN))
    }

    /// Calendar arithmetic in the value's own zone.
    pub fn add(&self, amount: i64, unit: TimeUnit) -> TimeResult<Self> {
        let current = self.date_time();
        let shifted = match unit {
            TimeUnit::Year => shift_months(current, amount.checked_mul(12))?,
            TimeUnit::Month => shift_months(current, Some(amount))?,
            TimeUnit::Day => {
                let days = Days::new(amount.unsigned_abs());
                let local = current.naive_local();
                let shifted = if amount >= 0 {
                    local.checked_add_days(days)
                } else {
                    local.checked_sub_days(days)
                }
                .ok_or(TimeError::OutOfRange)?;
                return from_local(self.zone, shifted);
            }
            TimeUnit::Hour => shift_by(current, TimeDelta::try_hours(amount))?,
            TimeUnit::Minute => shift_by(current, TimeDelta::try_minutes(amount))?,
            TimeUnit::Second => shift_by(current, TimeDelta::try_seconds(amount))?,
            TimeUnit::Millisecond => shift_by(current, TimeDelta::try_milliseconds(amount))?,
        };
        Ok(TimeValue::new(self.zone, shifted.timestamp_millis()))
    }

    /// Days since the epoch as seen from the value's zone.
    pub fn unix_day(&self) -> i64 {
        let offset = self.date_time().offset().fix().local_minus_utc() as i64 * 1000;
        (self.millis + offset).div_euclid(MILLIS_PER_DAY)
    }

    /// Local midnight of the given epoch day.
    pub fn from_unix_day(day: i64, zone: Tz) -> TimeResult<Self> {
        let epoch = NaiveDate::from_ymd_opt(1970, 1, 1).ok_or(TimeError::OutOfRange)?;
        let days = Days::new(day.unsigned_abs());
        let date = if day >= 0 {
            epoch.checked_add_days(days)
        } else {
            epoch.checked_sub_days(days)
        }
        .ok_or(TimeError::OutOfRange)?;
        from_local(zone, date.and_time(chrono::NaiveTime::MIN))
    }

    pub fn format(&self, pattern: &str) -> TimeResult<String> {
        let format = translate_pattern(pattern)?;
        Ok(self.date_time().format(&format).to_string())
    }

    /// Parses `text`; wall-clock values are interpreted in `zone` unless
    /// the pattern carries an offset.
    pub fn parse(text: &str, pattern: &str, zone: Tz) -> TimeResult<Self> {
        let format = translate_pattern(pattern)?;
        let error = || TimeError::Parse {
            text: text.to_string(),
            pattern: pattern.to_string(),
        };

        if let Ok(with_offset) = DateTime::parse_from_str(text, &format) {
            return Ok(TimeValue::new(zone, with_offset.timestamp_millis()));
        }
        let local = NaiveDateTime::parse_from_str(text, &format)
            .or_else(|_| {
                NaiveDate::parse_from_str(text, &format)
                    .map(|date| date.and_time(chrono::NaiveTime::MIN))
            })
            .map_err(|_| error())?;
        from_local(zone, local)
    }
}

impl PartialEq for TimeValue {
    fn eq(&self, other: &Self) -> bool {
        self.millis == other.millis && self.zone == other.zone
    }
}

impl fmt::Display for TimeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.formatted)
    }
}

fn to_date_time(zone: Tz, millis: i64) -> DateTime<Tz> {
    let utc = DateTime::<Utc>::from_timestamp_millis(millis).unwrap_or(if millis < 0 {
        DateTime::<Utc>::MIN_UTC
    } else {
        DateTime::<Utc>::MAX_UTC
    });
    utc.with_timezone(&zone)
}

/// Resolves a wall-clock time, taking the earlier instant on overlaps and
/// skipping forward over gaps.
fn from_local(zone: Tz, local: NaiveDateTime) -> TimeResult<TimeValue> {
    let resolved = match zone.from_local_datetime(&local) {
        LocalResult::Single(dt) | LocalResult::Ambiguous(dt, _) => dt,
        LocalResult::None => {
            let later = local + TimeDelta::hours(1);
            zone.from_local_datetime(&later)
                .earliest()
                .ok_or(TimeError::OutOfRange)?
        }
    };
    Ok(TimeValue::new(zone, resolved.timestamp_millis()))
}

fn shift_months(current: DateTime<Tz>, months: Option<i64>) -> TimeResult<DateTime<Tz>> {
    let months = months.ok_or(TimeError::OutOfRange)?;
    let count = u32::try_from(months.unsigned_abs()).map_err(|_| TimeError::OutOfRange)?;
    if months >= 0 {
        current.checked_add_months(Months::new(count))
    } else {
        current.checked_sub_months(Months::new(count))
    }
    .ok_or(TimeError::OutOfRange)
}

fn shift_by(current: DateTime<Tz>, delta: Option<TimeDelta>) -> TimeResult<DateTime<Tz>> {
    delta
        .and_then(|delta| current.checked_add_signed(delta))
        .ok_or(TimeError::OutOfRange)
}

/// Translates a `SimpleDateFormat` style pattern into a chrono format
/// string.
///
/// ```
/// use pathmetrics::eval::time::translate_pattern;
///
/// assert_eq!(translate_pattern("yyyy/MM/dd").unwrap(), "%Y/%m/%d");
/// assert_eq!(translate_pattern("HH'h'mm").unwrap(), "%Hh%M");
/// ```
pub fn translate_pattern(pattern: &str) -> TimeResult<String> {
    let chars: Vec<char> = pattern.chars().collect();
    let mut format = String::with_capacity(pattern.len() * 2);
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        if c == '\'' {
            // '' is a literal quote, otherwise quote until the next '
            if chars.get(i + 1) == Some(&'\'') {
                format.push('\'');
                i += 2;
                continue;
            }
            i += 1;
            while i < chars.len() && chars[i] != '\'' {
                push_literal(&mut format, chars[i]);
                i += 1;
            }
            i += 1;
            continue;
        }
        if !c.is_ascii_alphabetic() {
            push_literal(&mut format, c);
            i += 1;
            continue;
        }

        let run = chars[i..].iter().take_while(|&&next| next == c).count();
        let specifier = match (c, run) {
            ('y', 2) => "%y",
            ('y', _) => "%Y",
            ('M', 1) => "%-m",
            ('M', 2) => "%m",
            ('M', 3) => "%b",
            ('M', _) => "%B",
            ('d', 1) => "%-d",
            ('d', _) => "%d",
            ('D', _) => "%j",
            ('E', 1..=3) => "%a",
            ('E', _) => "%A",
            ('a', _) => "%p",
            ('H', 1) => "%-H",
            ('H', _) => "%H",
            ('h', 1) => "%-I",
            ('h', _) => "%I",
            ('m', 1) => "%-M",
            ('m', _) => "%M",
            ('s', 1) => "%-S",
            ('s', _) => "%S",
            ('S', _) => "%3f",
            ('z', _) => "%Z",
            ('Z', _) => "%z",
            ('X', _) => "%:z",
            _ => {
                return Err(TimeError::Pattern {
                    letter: c,
                    pattern: pattern.to_string(),
                })
            }
        };
        format.push_str(specifier);
        i += run;
    }
    Ok(format)
}

fn push_literal(format: &mut String, c: char) {
    if c == '%' {
        format.push_str("%%");
    } else {
        format.push(c);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono_tz::{America::Los_Angeles, GMT, UTC};
    use pretty_assertions::assert_eq;

    // 2014/08/20 03:12:15.384 GMT
    const SAMPLE: i64 = 1_408_504_335_384;

    #[test]
    fn test_display() {
        assert_eq!(
            TimeValue::new(GMT, SAMPLE).to_string(),
            "2014/08/20 03:12:15.384 GMT"
        );
        assert_eq!(
            TimeValue::new(Los_Angeles, SAMPLE).to_string(),
            "2014/08/19 20:12:15.384 PDT"
        );
    }

    #[test]
    fn test_unix_day() {
        assert_eq!(TimeValue::new(GMT, SAMPLE).unix_day(), 16302);
        // still the 19th in Los Angeles
        assert_eq!(TimeValue::new(Los_Angeles, SAMPLE).unix_day(), 16301);
        assert_eq!(TimeValue::new(UTC, -1).unix_day(), -1);
    }

    #[test]
    fn test_from_unix_day() {
        let time = TimeValue::from_unix_day(16303, GMT).unwrap();
        assert_eq!(time.to_string(), "2014/08/21 00:00:00.000 GMT");
        assert_eq!(time.unix_day(), 16303);

        let pacific = TimeValue::from_unix_day(16303, Los_Angeles).unwrap();
        assert_eq!(pacific.to_string(), "2014/08/21 00:00:00.000 PDT");
    }

    #[test]
    fn test_start_of_day() {
        let time = TimeValue::new(GMT, SAMPLE).start_of_day().unwrap();
        assert_eq!(time.to_string(), "2014/08/20 00:00:00.000 GMT");
    }

    #[test]
    fn test_add() {
        let time = TimeValue::new(GMT, SAMPLE);
        let cases = [
            (1, TimeUnit::Year, "2015/08/20 03:12:15.384 GMT"),
            (-9, TimeUnit::Month, "2013/11/20 03:12:15.384 GMT"),
            (12, TimeUnit::Day, "2014/09/01 03:12:15.384 GMT"),
            (-4, TimeUnit::Hour, "2014/08/19 23:12:15.384 GMT"),
            (50, TimeUnit::Minute, "2014/08/20 04:02:15.384 GMT"),
            (-16, TimeUnit::Second, "2014/08/20 03:11:59.384 GMT"),
            (616, TimeUnit::Millisecond, "2014/08/20 03:12:16.000 GMT"),
        ];
        for (amount, unit, expected) in cases {
            assert_eq!(time.add(amount, unit).unwrap().to_string(), expected);
        }
    }

    #[test]
    fn test_add_day_across_dst() {
        // 2014/11/02 is 25 hours long in Los Angeles
        let time = TimeValue::parse("2014/11/01 12:00", "yyyy/MM/dd HH:mm", Los_Angeles).unwrap();
        let next = time.add(1, TimeUnit::Day).unwrap();
        assert_eq!(next.to_string(), "2014/11/02 12:00:00.000 PST");
        assert_eq!(next.millis() - time.millis(), 25 * 60 * 60 * 1000);
    }

    #[test]
    fn test_time_unit() {
        assert_eq!(TimeUnit::parse("M").unwrap(), TimeUnit::Month);
        assert_eq!(TimeUnit::parse("m").unwrap(), TimeUnit::Minute);
        assert_eq!(
            TimeUnit::parse("w"),
            Err(TimeError::UnknownTimeUnit("w".to_string()))
        );
    }

    #[test]
    fn test_format_and_parse() {
        let time = TimeValue::new(GMT, SAMPLE);
        assert_eq!(time.format("yyyy-MM-dd'T'HH:mm:ss.SSS").unwrap(), "2014-08-20T03:12:15.384");
        assert_eq!(time.format("yyyyMMdd").unwrap(), "20140820");

        let parsed = TimeValue::parse("2014/08/20 03:12:15.384", "yyyy/MM/dd HH:mm:ss.SSS", GMT).unwrap();
        assert_eq!(parsed, time);

        let day = TimeValue::parse("2014/08/20", "yyyy/MM/dd", GMT).unwrap();
        assert_eq!(day.to_string(), "2014/08/20 00:00:00.000 GMT");

        let offset = TimeValue::parse("2014/08/20 05:12 +0200", "yyyy/MM/dd HH:mm Z", GMT).unwrap();
        assert_eq!(offset.to_string(), "2014/08/20 03:12:00.000 GMT");
    }

    #[test]
    fn test_parse_failure() {
        assert!(matches!(
            TimeValue::parse("yesterday", "yyyy/MM/dd", UTC),
            Err(TimeError::Parse { .. })
        ));
        assert!(matches!(
            translate_pattern("yyyy/QQ"),
            Err(TimeError::Pattern { letter: 'Q', .. })
        ));
    }

    #[test]
    fn test_time_zone() {
        assert_eq!(parse_time_zone("GMT").unwrap(), GMT);
        assert!(parse_time_zone("Mars/Olympus").is_err());
    }
}

//! core::dates
//!
//! Date pattern and time zone handling for `authorDate`, `commitDate` and
//! `buildDate`.
//!
//! Patterns are accepted in the `yyyy-MM-dd HH:mm:ss` letter style that build
//! tool users already write, and are translated once into a chrono strftime
//! string.
//!
//! | letters | meaning            | strftime |
//! |---------|--------------------|----------|
//! | `yyyy`  | year               | `%Y`     |
//! | `yy`    | two-digit year     | `%y`     |
//! | `MM`    | month              | `%m`     |
//! | `MMM`   | month name, short  | `%b`     |
//! | `dd`    | day of month       | `%d`     |
//! | `HH`    | hour (0-23)        | `%H`     |
//! | `hh`    | hour (1-12)        | `%I`     |
//! | `mm`    | minute             | `%M`     |
//! | `ss`    | second             | `%S`     |
//! | `SSS`   | millisecond        | `%3f`    |
//! | `a`     | AM/PM              | `%p`     |
//! | `EEE`   | weekday, short     | `%a`     |
//! | `z`/`Z`/`X` | zone           | `%Z`/`%z`/`%:z` |
//!
//! Text in single quotes is copied literally; `''` is a quote. A `%` outside
//! quotes switches to strftime.

use std::str::FromStr;

use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, FixedOffset, Local, Offset, Utc};
use chrono_tz::Tz;
use thiserror::Error;

/// Errors from date pattern or zone parsing.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DateError {
    #[error("unsupported pattern letter '{letter}' in date format '{pattern}'")]
    UnsupportedLetter { letter: char, pattern: String },

    #[error("unterminated quote in date format '{0}'")]
    UnterminatedQuote(String),

    #[error("invalid strftime pattern '{0}'")]
    InvalidStrftime(String),

    #[error("unknown time zone '{0}'")]
    UnknownTimeZone(String),
}

/// A validated date pattern, stored as a strftime string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatePattern {
    source: String,
    strftime: String,
}

impl DatePattern {
    /// Parse a letter-style or strftime pattern.
    pub fn parse(pattern: &str) -> Result<Self, DateError> {
        let strftime = if has_unquoted_percent(pattern) {
            pattern.to_string()
        } else {
            translate(pattern)?
        };

        if StrftimeItems::new(&strftime).any(|item| matches!(item, Item::Error)) {
            return Err(DateError::InvalidStrftime(strftime));
        }

        Ok(Self {
            source: pattern.to_string(),
            strftime,
        })
    }

    /// The pattern as written by the user.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// The equivalent strftime string.
    pub fn strftime(&self) -> &str {
        &self.strftime
    }

    /// Format `instant` in `zone`.
    pub fn format(&self, instant: DateTime<Utc>, zone: &Zone) -> String {
        match zone {
            Zone::Local => instant
                .with_timezone(&Local)
                .format(&self.strftime)
                .to_string(),
            Zone::Fixed(offset) => instant
                .with_timezone(offset)
                .format(&self.strftime)
                .to_string(),
            Zone::Named(tz) => instant.with_timezone(tz).format(&self.strftime).to_string(),
        }
    }
}

/// Time zone applied to every formatted date.
#[derive(Debug, Clone, PartialEq)]
pub enum Zone {
    Local,
    Fixed(FixedOffset),
    Named(Tz),
}

impl Zone {
    /// Parse a zone id: `UTC`, `GMT`, `GMT+2`, `UTC-05:30`, `+0100`, or an
    /// IANA name such as `Europe/Berlin`. `None` means the local zone.
    pub fn parse(id: Option<&str>) -> Result<Self, DateError> {
        let Some(id) = id.map(str::trim).filter(|s| !s.is_empty()) else {
            return Ok(Zone::Local);
        };

        let upper = id.to_ascii_uppercase();
        for prefix in ["UTC", "GMT"] {
            if let Some(rest) = upper.strip_prefix(prefix) {
                if rest.is_empty() || rest == "0" {
                    return Ok(Zone::Fixed(utc_offset()));
                }
                if let Some(offset) = parse_offset(rest) {
                    return Ok(Zone::Fixed(offset));
                }
            }
        }

        if let Some(offset) = parse_offset(id) {
            return Ok(Zone::Fixed(offset));
        }

        Tz::from_str(id)
            .map(Zone::Named)
            .map_err(|_| DateError::UnknownTimeZone(id.to_string()))
    }
}

fn utc_offset() -> FixedOffset {
    Utc.fix()
}

/// `%` outside single quotes marks a strftime pattern.
fn has_unquoted_percent(pattern: &str) -> bool {
    let mut quoted = false;
    for c in pattern.chars() {
        match c {
            '\'' => quoted = !quoted,
            '%' if !quoted => return true,
            _ => {}
        }
    }
    false
}

/// Parse `+H`, `+HH`, `+HHMM` or `+HH:MM` (sign required).
fn parse_offset(s: &str) -> Option<FixedOffset> {
    let (sign, digits) = match s.as_bytes().first()? {
        b'+' => (1, &s[1..]),
        b'-' => (-1, &s[1..]),
        _ => return None,
    };
    if !digits.is_ascii() {
        return None;
    }

    let (hours, minutes) = match digits.split_once(':') {
        Some((h, m)) => (h, m),
        None if digits.len() > 2 => digits.split_at(digits.len() - 2),
        None => (digits, "0"),
    };

    if hours.is_empty() || !hours.chars().chain(minutes.chars()).all(|c| c.is_ascii_digit()) {
        return None;
    }

    let hours: i32 = hours.parse().ok()?;
    let minutes: i32 = minutes.parse().ok()?;
    if hours > 23 || minutes > 59 {
        return None;
    }

    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}

/// Translate a letter-style pattern into strftime.
fn translate(pattern: &str) -> Result<String, DateError> {
    let chars: Vec<char> = pattern.chars().collect();
    let mut out = String::with_capacity(pattern.len() * 2);
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];

        if c == '\'' {
            // '' outside a quoted run is a literal quote
            if chars.get(i + 1) == Some(&'\'') {
                out.push('\'');
                i += 2;
                continue;
            }
            i += 1;
            loop {
                match chars.get(i) {
                    None => return Err(DateError::UnterminatedQuote(pattern.to_string())),
                    Some('\'') if chars.get(i + 1) == Some(&'\'') => {
                        out.push('\'');
                        i += 2;
                    }
                    Some('\'') => {
                        i += 1;
                        break;
                    }
                    Some(&literal) => {
                        push_literal(&mut out, literal);
                        i += 1;
                    }
                }
            }
            continue;
        }

        if !c.is_ascii_alphabetic() {
            push_literal(&mut out, c);
            i += 1;
            continue;
        }

        let run = chars[i..].iter().take_while(|&&next| next == c).count();
        let spec = match (c, run) {
            ('y', 2) => "%y",
            ('y', _) => "%Y",
            ('M', 1) => "%-m",
            ('M', 2) => "%m",
            ('M', 3) => "%b",
            ('M', _) => "%B",
            ('d', 1) => "%-d",
            ('d', _) => "%d",
            ('D', 1) => "%-j",
            ('D', _) => "%j",
            ('H', 1) => "%-H",
            ('H', _) => "%H",
            ('h', 1) => "%-I",
            ('h', _) => "%I",
            ('m', 1) => "%-M",
            ('m', _) => "%M",
            ('s', 1) => "%-S",
            ('s', _) => "%S",
            ('S', _) => "%3f",
            ('a', _) => "%p",
            ('E', 1..=3) => "%a",
            ('E', _) => "%A",
            ('u', _) => "%u",
            ('w', _) => "%V",
            ('z', _) => "%Z",
            ('Z', _) => "%z",
            ('X', 1 | 2) => "%z",
            ('X', _) => "%:z",
            _ => {
                return Err(DateError::UnsupportedLetter {
                    letter: c,
                    pattern: pattern.to_string(),
                })
            }
        };
        out.push_str(spec);
        i += run;
    }

    Ok(out)
}

fn push_literal(out: &mut String, c: char) {
    if c == '%' {
        out.push_str("%%");
    } else {
        out.push(c);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn instant() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2019, 2, 20, 13, 5, 9).unwrap()
    }

    mod translate {
        use super::*;

        #[test]
        fn default_patterns() {
            assert_eq!(DatePattern::parse("yyyy-MM-dd").unwrap().strftime(), "%Y-%m-%d");
            assert_eq!(
                DatePattern::parse("yyyy-MM-dd HH:mm:ss").unwrap().strftime(),
                "%Y-%m-%d %H:%M:%S"
            );
        }

        #[test]
        fn quoted_literals() {
            let p = DatePattern::parse("yyyy'T'HH 'o''clock'").unwrap();
            assert_eq!(p.strftime(), "%YT%H o'clock");
        }

        #[test]
        fn doubled_quote_outside_literal() {
            assert_eq!(DatePattern::parse("HH''mm").unwrap().strftime(), "%H'%M");
        }

        #[test]
        fn strftime_passthrough() {
            let p = DatePattern::parse("%Y/%m/%d").unwrap();
            assert_eq!(p.strftime(), "%Y/%m/%d");
            assert_eq!(p.source(), "%Y/%m/%d");
        }

        #[test]
        fn unsupported_letter_rejected() {
            let err = DatePattern::parse("yyyy-QQ").unwrap_err();
            assert!(matches!(err, DateError::UnsupportedLetter { letter: 'Q', .. }));
        }

        #[test]
        fn unterminated_quote_rejected() {
            assert!(matches!(
                DatePattern::parse("yyyy 'oops"),
                Err(DateError::UnterminatedQuote(_))
            ));
        }

        #[test]
        fn invalid_strftime_rejected() {
            assert!(matches!(
                DatePattern::parse("%Y %"),
                Err(DateError::InvalidStrftime(_))
            ));
        }
    }

    mod format {
        use super::*;

        #[test]
        fn utc_formatting() {
            let zone = Zone::parse(Some("UTC")).unwrap();
            let p = DatePattern::parse("yyyy-MM-dd HH:mm:ss").unwrap();
            assert_eq!(p.format(instant(), &zone), "2019-02-20 13:05:09");
        }

        #[test]
        fn fixed_offset_shifts_time() {
            let zone = Zone::parse(Some("GMT+2")).unwrap();
            let p = DatePattern::parse("HH:mm").unwrap();
            assert_eq!(p.format(instant(), &zone), "15:05");
        }

        #[test]
        fn named_zone() {
            let zone = Zone::parse(Some("America/New_York")).unwrap();
            let p = DatePattern::parse("yyyy-MM-dd HH").unwrap();
            assert_eq!(p.format(instant(), &zone), "2019-02-20 08");
        }

        #[test]
        fn unpadded_and_names() {
            let zone = Zone::parse(Some("UTC")).unwrap();
            let p = DatePattern::parse("d.M.yy EEE MMM").unwrap();
            assert_eq!(p.format(instant(), &zone), "20.2.19 Wed Feb");
        }

        #[test]
        fn percent_literal_is_escaped() {
            let zone = Zone::parse(Some("UTC")).unwrap();
            let p = DatePattern::parse("yyyy '%'").unwrap();
            assert_eq!(p.format(instant(), &zone), "2019 %");
        }
    }

    mod zone {
        use super::*;

        #[test]
        fn none_is_local() {
            assert_eq!(Zone::parse(None).unwrap(), Zone::Local);
            assert_eq!(Zone::parse(Some("  ")).unwrap(), Zone::Local);
        }

        #[test]
        fn utc_aliases() {
            let utc = Zone::Fixed(FixedOffset::east_opt(0).unwrap());
            assert_eq!(Zone::parse(Some("UTC")).unwrap(), utc);
            assert_eq!(Zone::parse(Some("gmt")).unwrap(), utc);
        }

        #[test]
        fn offsets() {
            let plus_530 = Zone::Fixed(FixedOffset::east_opt(5 * 3600 + 30 * 60).unwrap());
            assert_eq!(Zone::parse(Some("+05:30")).unwrap(), plus_530);
            assert_eq!(Zone::parse(Some("+0530")).unwrap(), plus_530);
            assert_eq!(Zone::parse(Some("UTC+05:30")).unwrap(), plus_530);
            assert_eq!(
                Zone::parse(Some("GMT-3")).unwrap(),
                Zone::Fixed(FixedOffset::west_opt(3 * 3600).unwrap())
            );
        }

        #[test]
        fn unknown_zone_rejected() {
            assert!(matches!(
                Zone::parse(Some("Mars/Olympus")),
                Err(DateError::UnknownTimeZone(_))
            ));
            assert!(Zone::parse(Some("+25")).is_err());
        }

        #[test]
        fn non_ascii_offset_rejected() {
            for id in ["+é1", "GMT+é1", "-1é", "UTC+1é30"] {
                assert!(
                    matches!(Zone::parse(Some(id)), Err(DateError::UnknownTimeZone(_))),
                    "{} should be rejected",
                    id
                );
            }
        }
    }
}

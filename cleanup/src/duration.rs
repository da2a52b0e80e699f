use snafu::{ensure, OptionExt, ResultExt, Snafu};
use std::collections::VecDeque;
use std::num::ParseIntError;
use std::time::Duration;

const UNITS: [(char, u64); 3] = [('d', 86400), ('h', 3600), ('m', 60)];

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum DurationError {
    #[snafu(display("Unable to parse duration '{}'", input))]
    Malformed { input: String },

    #[snafu(display("Unable to parse duration '{}': {}", input, source))]
    Number {
        input: String,
        source: ParseIntError,
    },

    #[snafu(display("Duration '{}' is too large", input))]
    Overflow { input: String },
}

/// Parse a duration string such as `1d2h3m4s`, `24h` or `3600` into a `Duration`. Units must
/// appear in descending order and each at most once.
pub fn parse_duration(input: &str) -> Result<Duration, DurationError> {
    ensure!(!input.trim().is_empty(), MalformedSnafu { input });
    let mut secs: u64 = 0;
    let mut duration_string = input.trim();
    for unit in UNITS {
        let mut vec: VecDeque<&str> = duration_string.split(unit.0).collect();
        if vec.len() > 2 {
            return MalformedSnafu { input }.fail();
        }
        if vec.len() > 1 {
            let value = vec
                .pop_front()
                .context(MalformedSnafu { input })?
                .parse::<u64>()
                .context(NumberSnafu { input })?;
            secs = value
                .checked_mul(unit.1)
                .and_then(|value| secs.checked_add(value))
                .context(OverflowSnafu { input })?;
        }
        duration_string = vec.pop_front().context(MalformedSnafu { input })?;
    }
    let mut vec: VecDeque<&str> = duration_string.split('s').collect();
    let seconds = vec.pop_front().context(MalformedSnafu { input })?;
    ensure!(
        vec.iter().all(|rest| rest.is_empty()) && vec.len() <= 1,
        MalformedSnafu { input }
    );
    if !seconds.is_empty() {
        let value = seconds.parse::<u64>().context(NumberSnafu { input })?;
        secs = secs
            .checked_add(value)
            .context(OverflowSnafu { input })?;
    }
    Ok(Duration::from_secs(secs))
}

/// Deserialize either a duration string or an integer number of seconds.
pub(crate) mod serde_duration {
    use super::parse_duration;
    use serde::de::{self, Visitor};
    use serde::Deserializer;
    use std::fmt;
    use std::time::Duration;

    struct DurationVisitor;

    impl<'de> Visitor<'de> for DurationVisitor {
        type Value = Duration;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a duration like '24h' or a number of seconds")
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<Duration, E> {
            Ok(Duration::from_secs(v))
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<Duration, E> {
            u64::try_from(v)
                .map(Duration::from_secs)
                .map_err(|_| E::custom(format!("negative duration '{}'", v)))
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<Duration, E> {
            parse_duration(v).map_err(E::custom)
        }
    }

    pub(crate) fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(DurationVisitor)
    }
}

#[test]
fn all_units() {
    let input = "1d2h3m4s";
    assert_eq!(parse_duration(input).unwrap(), Duration::from_secs(93784))
}

#[test]
fn some_units() {
    let input = "1d3m4s";
    assert_eq!(parse_duration(input).unwrap(), Duration::from_secs(86584))
}

#[test]
fn hours_only() {
    assert_eq!(parse_duration("24h").unwrap(), Duration::from_secs(86400))
}

#[test]
fn no_seconds() {
    let input = "1h5m";
    assert_eq!(parse_duration(input).unwrap(), Duration::from_secs(3900))
}

#[test]
fn no_units() {
    let input = "5123";
    assert_eq!(parse_duration(input).unwrap(), Duration::from_secs(5123))
}

#[test]
fn wrong_order() {
    let input = "10d5m3h2s";
    assert!(parse_duration(input).is_err())
}

#[test]
fn invalid_unit() {
    let input = "5y40s";
    assert!(parse_duration(input).is_err())
}

#[test]
fn missing_value() {
    let input = "5hm4s";
    assert!(parse_duration(input).is_err())
}

#[test]
fn empty() {
    assert!(parse_duration("").is_err())
}

#[test]
fn too_large() {
    assert!(matches!(
        parse_duration("213503982334602d"),
        Err(DurationError::Overflow { .. })
    ));
    assert!(matches!(
        parse_duration("213503982334601d18446744073709551615s"),
        Err(DurationError::Overflow { .. })
    ));
    assert_eq!(
        parse_duration("18446744073709551615").unwrap(),
        Duration::from_secs(u64::MAX)
    )
}

//! Shape of the diagnostics `looper` writes to stderr.
//!
//! Operators running `looper start` from a terminal read compact lines;
//! a session manager capturing the background instance's stderr can ask for
//! one JSON object per event with `--log-format json`.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Rendering of log events on stderr.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum LogFormat {
    /// One JSON object per event with its fields flattened to the top level.
    Json,
    /// Terse single-line text with the event target and fields.
    #[default]
    Compact,
}

/// Raised when `--log-format` or `LOOPER_LOG_FORMAT` names no known format.
pub type LogFormatParseError = strum::ParseError;

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::json("json", LogFormat::Json)]
    #[case::compact("compact", LogFormat::Compact)]
    #[case::mixed_case("JSON", LogFormat::Json)]
    fn parses_known_formats(#[case] text: &str, #[case] expected: LogFormat) {
        let parsed: LogFormat = text.parse().expect("format should parse");
        assert_eq!(parsed, expected);
    }

    #[test]
    fn rejects_unknown_format() {
        assert!("pretty".parse::<LogFormat>().is_err());
    }

    #[test]
    fn terminal_output_is_the_default() {
        assert_eq!(LogFormat::default(), LogFormat::Compact);
        assert_eq!(LogFormat::default().to_string(), "compact");
    }
}

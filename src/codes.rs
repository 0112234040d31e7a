//! Operating-mode and run-state code tables.
//!
//! The controller reports both fields as small integers. Values outside the
//! tables decode to [`UNAVAILABLE`] instead of failing. Mode code 2 has no
//! label.

use std::fmt;

use serde::{Deserialize, Serialize};

pub const UNAVAILABLE: &str = "UNAVAILABLE";

pub const MODE_MDI: i16 = 0;
pub const MODE_MEM: i16 = 1;
pub const MODE_EDIT: i16 = 3;
pub const MODE_HND: i16 = 4;
pub const MODE_JOG: i16 = 5;
pub const MODE_TEACH_JOG: i16 = 6;
pub const MODE_TEACH_HND: i16 = 7;
pub const MODE_INC: i16 = 8;
pub const MODE_REF: i16 = 9;
pub const MODE_RMT: i16 = 10;

pub const RUN_RESET: i16 = 0;
pub const RUN_STOP: i16 = 1;
pub const RUN_HOLD: i16 = 2;
pub const RUN_STRT: i16 = 3;
pub const RUN_MSTR: i16 = 4;

/// Label for an operating-mode code.
#[must_use]
pub const fn mode_label(code: i16) -> &'static str {
    match code {
        MODE_MDI => "MDI",
        MODE_MEM => "MEM",
        MODE_EDIT => "EDIT",
        MODE_HND => "HND",
        MODE_JOG => "JOG",
        MODE_TEACH_JOG => "Teach in JOG",
        MODE_TEACH_HND => "Teach in HND",
        MODE_INC => "INC",
        MODE_REF => "REF",
        MODE_RMT => "RMT",
        _ => UNAVAILABLE,
    }
}

/// Label for a run-state code.
#[must_use]
pub const fn run_label(code: i16) -> &'static str {
    match code {
        RUN_RESET => "****",
        RUN_STOP => "STOP",
        RUN_HOLD => "HOLD",
        RUN_STRT => "STRT",
        RUN_MSTR => "MSTR",
        _ => UNAVAILABLE,
    }
}

/// How the run-state field is rendered.
///
/// `Raw` prints the integer as received and is the default; `Decoded` runs it
/// through [`run_label`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusDisplay {
    #[default]
    Raw,
    Decoded,
}

impl std::str::FromStr for StatusDisplay {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "raw" => Ok(Self::Raw),
            "decoded" => Ok(Self::Decoded),
            other => Err(format!("unknown status display '{other}' (expected raw|decoded)")),
        }
    }
}

/// Rendered run state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StatusLabel {
    Raw(i16),
    Decoded(&'static str),
}

impl StatusLabel {
    #[must_use]
    pub const fn new(run_code: i16, display: StatusDisplay) -> Self {
        match display {
            StatusDisplay::Raw => Self::Raw(run_code),
            StatusDisplay::Decoded => Self::Decoded(run_label(run_code)),
        }
    }
}

impl fmt::Display for StatusLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Raw(code) => write!(f, "{code}"),
            Self::Decoded(label) => f.write_str(label),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mode_table() {
        let expected = [
            (0, "MDI"),
            (1, "MEM"),
            (3, "EDIT"),
            (4, "HND"),
            (5, "JOG"),
            (6, "Teach in JOG"),
            (7, "Teach in HND"),
            (8, "INC"),
            (9, "REF"),
            (10, "RMT"),
        ];
        for (code, label) in expected {
            assert_eq!(mode_label(code), label, "mode code {code}");
        }
    }

    #[test]
    fn unmapped_modes_are_unavailable() {
        assert_eq!(mode_label(2), UNAVAILABLE);
        for code in [-1, 11, 12, 100, i16::MIN, i16::MAX] {
            assert_eq!(mode_label(code), UNAVAILABLE, "mode code {code}");
        }
    }

    #[test]
    fn run_table() {
        assert_eq!(run_label(0), "****");
        assert_eq!(run_label(1), "STOP");
        assert_eq!(run_label(2), "HOLD");
        assert_eq!(run_label(3), "STRT");
        assert_eq!(run_label(4), "MSTR");
        assert_eq!(run_label(5), UNAVAILABLE);
        assert_eq!(run_label(-1), UNAVAILABLE);
    }

    #[test]
    fn status_label_display() {
        assert_eq!(StatusLabel::new(3, StatusDisplay::Raw).to_string(), "3");
        assert_eq!(StatusLabel::new(3, StatusDisplay::Decoded).to_string(), "STRT");
        assert_eq!(StatusLabel::new(9, StatusDisplay::Decoded).to_string(), UNAVAILABLE);
    }

    #[test]
    fn status_display_parse() {
        assert_eq!("raw".parse::<StatusDisplay>(), Ok(StatusDisplay::Raw));
        assert_eq!("Decoded".parse::<StatusDisplay>(), Ok(StatusDisplay::Decoded));
        assert!("pretty".parse::<StatusDisplay>().is_err());
        assert!("label".parse::<StatusDisplay>().is_err());
        assert_eq!(StatusDisplay::default(), StatusDisplay::Raw);
    }
}

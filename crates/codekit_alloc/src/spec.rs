//! Digit-width model and error types.

use std::fmt;
use std::str::FromStr;

use crate::conf::N_LEN_CODE_PREFIX;

////////////////////////////////////////////////////////////////////////////////
// #region DigitWidth

/// Width of the numeric suffix for one allocation session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum EnumDigitWidth {
    /// Three digits, e.g. `ABC001`.
    Three,
    /// Four digits, e.g. `ABC0001` (default).
    #[default]
    Four,
}

impl EnumDigitWidth {
    /// Number of suffix digits.
    pub fn n_digits(self) -> usize {
        match self {
            Self::Three => 3,
            Self::Four => 4,
        }
    }

    /// Full code length (prefix plus suffix), in characters.
    pub fn n_len_code(self) -> usize {
        N_LEN_CODE_PREFIX + self.n_digits()
    }

    /// Smallest number whose decimal form no longer fits in the suffix.
    pub fn n_number_overflow(self) -> u64 {
        10u64.pow(self.n_digits() as u32)
    }
}

impl TryFrom<usize> for EnumDigitWidth {
    type Error = DigitWidthError;

    fn try_from(value: usize) -> Result<Self, Self::Error> {
        match value {
            3 => Ok(Self::Three),
            4 => Ok(Self::Four),
            _ => Err(DigitWidthError {
                value: value.to_string(),
            }),
        }
    }
}

impl FromStr for EnumDigitWidth {
    type Err = DigitWidthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let c_value = s.trim();
        c_value
            .parse::<usize>()
            .ok()
            .and_then(|n| Self::try_from(n).ok())
            .ok_or_else(|| DigitWidthError {
                value: c_value.to_string(),
            })
    }
}

impl fmt::Display for EnumDigitWidth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.n_digits())
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Errors

/// A digit width other than 3 or 4 was supplied.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("digit width must be 3 or 4, got {value:?}")]
pub struct DigitWidthError {
    /// Raw rejected input.
    pub value: String,
}

// #endregion
////////////////////////////////////////////////////////////////////////////////

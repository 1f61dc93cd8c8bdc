//! Code-shape constants.

/// Length of the alphabetic prefix, in characters.
pub const N_LEN_CODE_PREFIX: usize = 3;
/// Supported numeric suffix widths.
pub const TUP_DIGIT_WIDTHS: [usize; 2] = [3, 4];
/// First number handed out under a prefix with no used numbers.
pub const N_CODE_NUMBER_FIRST: u64 = 1;

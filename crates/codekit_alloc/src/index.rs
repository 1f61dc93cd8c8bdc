//! Per-prefix used-number index for one allocation session.

use std::collections::{BTreeMap, BTreeSet};

use crate::conf::N_CODE_NUMBER_FIRST;
use crate::spec::EnumDigitWidth;
use crate::util::{derive_request_prefix, format_code, split_code};

////////////////////////////////////////////////////////////////////////////////
// #region PrefixEntry

/// Used numbers under one prefix plus a cached lower bound of the next free one.
///
/// Invariant: `n_next_hint` is never greater than the smallest positive
/// number missing from `used`, so scanning forward from it is always safe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecPrefixEntry {
    /// Numbers already taken under this prefix.
    pub used: BTreeSet<u64>,
    /// Lower bound of the smallest free positive number.
    pub n_next_hint: u64,
}

impl Default for SpecPrefixEntry {
    fn default() -> Self {
        Self {
            used: BTreeSet::new(),
            n_next_hint: N_CODE_NUMBER_FIRST,
        }
    }
}

impl SpecPrefixEntry {
    /// Smallest free positive number, without reserving it.
    pub fn peek_next(&self) -> u64 {
        self.scan_free_from(self.n_next_hint)
    }

    /// Reserve and return the smallest free positive number.
    pub fn reserve_next(&mut self) -> u64 {
        let n_number = self.peek_next();
        self.used.insert(n_number);
        self.n_next_hint = self.scan_free_from(n_number + 1);
        n_number
    }

    /// Mark `number` as used. Returns `false` if it was already taken.
    pub fn insert(&mut self, number: u64) -> bool {
        self.used.insert(number)
    }

    /// Recompute the hint with a full scan from the first number.
    pub fn refresh_hint(&mut self) {
        self.n_next_hint = self.scan_free_from(N_CODE_NUMBER_FIRST);
    }

    fn scan_free_from(&self, n_start: u64) -> u64 {
        let mut n_number = n_start;
        while self.used.contains(&n_number) {
            n_number += 1;
        }
        n_number
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region PrefixIndex

/// Prefix → [`SpecPrefixEntry`] map, fixed to one digit width.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrefixIndex {
    digit_width: EnumDigitWidth,
    dict_entries: BTreeMap<String, SpecPrefixEntry>,
}

impl PrefixIndex {
    /// Create an empty index.
    pub fn new(digit_width: EnumDigitWidth) -> Self {
        Self {
            digit_width,
            dict_entries: BTreeMap::new(),
        }
    }

    /// Build an index from candidate codes.
    ///
    /// Entries that are absent, malformed, or of another digit width are skipped.
    pub fn from_known_codes<'a, I>(known_codes: I, digit_width: EnumDigitWidth) -> Self
    where
        I: IntoIterator<Item = Option<&'a str>>,
    {
        let mut index = Self::new(digit_width);
        for c_code in known_codes.into_iter().flatten() {
            if let Some((c_prefix, n_number)) = split_code(c_code, digit_width) {
                index
                    .dict_entries
                    .entry(c_prefix.to_string())
                    .or_default()
                    .insert(n_number);
            }
        }
        for entry in index.dict_entries.values_mut() {
            entry.refresh_hint();
        }
        index
    }

    /// Digit width this index was built for.
    pub fn digit_width(&self) -> EnumDigitWidth {
        self.digit_width
    }

    /// Number of prefixes with an entry.
    pub fn len(&self) -> usize {
        self.dict_entries.len()
    }

    /// `true` when no prefix has an entry.
    pub fn is_empty(&self) -> bool {
        self.dict_entries.is_empty()
    }

    /// Entry for `prefix`, if one exists.
    pub fn entry(&self, prefix: &str) -> Option<&SpecPrefixEntry> {
        self.dict_entries.get(prefix)
    }

    /// Used-set for `prefix`, if one exists.
    pub fn used(&self, prefix: &str) -> Option<&BTreeSet<u64>> {
        self.dict_entries.get(prefix).map(|entry| &entry.used)
    }

    /// Next number `prefix` would receive, without reserving it.
    pub fn peek_next(&self, prefix: &str) -> u64 {
        self.dict_entries
            .get(prefix)
            .map_or(N_CODE_NUMBER_FIRST, SpecPrefixEntry::peek_next)
    }

    /// Register an externally issued code. Returns `true` if it was new.
    pub fn insert_code(&mut self, code: &str) -> bool {
        let Some((c_prefix, n_number)) = split_code(code, self.digit_width) else {
            return false;
        };
        self.dict_entries
            .entry(c_prefix.to_string())
            .or_default()
            .insert(n_number)
    }

    /// Reserve the next number for `tag`; returns `(prefix, number)`.
    ///
    /// `None` (index untouched) when the tag is absent, blank or shorter
    /// than the prefix.
    pub fn reserve_next<'t>(&mut self, tag: Option<&'t str>) -> Option<(&'t str, u64)> {
        let c_prefix = derive_request_prefix(tag)?;
        let n_number = self
            .dict_entries
            .entry(c_prefix.to_string())
            .or_default()
            .reserve_next();
        Some((c_prefix, n_number))
    }

    /// Reserve and format the next code for `tag`.
    pub fn allocate_next(&mut self, tag: Option<&str>) -> Option<String> {
        let digit_width = self.digit_width;
        self.reserve_next(tag)
            .map(|(c_prefix, n_number)| format_code(c_prefix, n_number, digit_width))
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////

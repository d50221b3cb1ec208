// Chord vocabulary: harmonic functions and Roman-numeral chord symbols.
//
// A `ChordSymbol` is an opaque Roman-numeral token ("I", "ii°", "vii°").
// Its meaning (the three scale degrees it contains, and the harmonic function
// it serves) comes entirely from the `TheoryTables` in use, looked up per
// mode. Symbols are never parsed into intervals: the vocabulary is exactly
// what the tables list, so "iii" exists in major and not in minor.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TheoryError;
use crate::key::Mode;
use crate::tables::TheoryTables;

/// Role of a chord in a progression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum HarmonicFunction {
    Tonic,
    Predominant,
    Dominant,
}

impl HarmonicFunction {
    pub const ALL: [HarmonicFunction; 3] = [
        HarmonicFunction::Tonic,
        HarmonicFunction::Predominant,
        HarmonicFunction::Dominant,
    ];

    /// Short label used in progression printouts.
    pub fn abbreviation(self) -> &'static str {
        match self {
            HarmonicFunction::Tonic => "T",
            HarmonicFunction::Predominant => "PD",
            HarmonicFunction::Dominant => "D",
        }
    }
}

/// A Roman-numeral chord token.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChordSymbol(String);

impl ChordSymbol {
    pub fn new(symbol: impl Into<String>) -> Self {
        ChordSymbol(symbol.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ChordSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ChordSymbol {
    fn from(s: &str) -> Self {
        ChordSymbol(s.to_string())
    }
}

impl PartialEq<&str> for ChordSymbol {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// Scale degrees (root, third, fifth) of `symbol` in `mode`.
pub fn chord_tones(
    tables: &TheoryTables,
    mode: Mode,
    symbol: &ChordSymbol,
) -> Result<[u8; 3], TheoryError> {
    tables.chord_tones(mode, symbol)
}

/// Harmonic function `symbol` serves in `mode`, if the generator vocabulary
/// lists it under one. Chords outside that vocabulary (e.g. "vi") have none.
pub fn function_of(
    tables: &TheoryTables,
    mode: Mode,
    symbol: &ChordSymbol,
) -> Option<HarmonicFunction> {
    tables.function_of(mode, symbol)
}

// Keys, scales, and the degree <-> pitch-name mapping.
//
// A `Key` is a tonic plus a `Mode` (major or natural minor). Its scale is
// built by walking the mode's semitone pattern around the 12-tone chromatic
// circle, reading names from one of two fixed chromatic tables: sharp-named
// or flat-named. Which table a key uses is a fixed partition of the tonics,
// not something computed from intervals, because correct enharmonic spelling
// follows key-signature convention (an F scale must read Bb, never A#).
//
// Everything above this module works in scale degrees 1..7; pitch names
// only appear at the boundary with the rendering shell, through
// `degree_to_pitch` and `pitch_to_degree`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TheoryError;

const SHARP_NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];
const FLAT_NAMES: [&str; 12] = [
    "C", "Db", "D", "Eb", "E", "F", "Gb", "G", "Ab", "A", "Bb", "B",
];

/// Major or natural minor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Mode {
    Major,
    Minor,
}

impl Mode {
    pub const ALL: [Mode; 2] = [Mode::Major, Mode::Minor];

    /// Semitone steps between consecutive degrees, 1 -> 2 through 7 -> 8.
    pub fn step_pattern(self) -> [u8; 7] {
        match self {
            Mode::Major => [2, 2, 1, 2, 2, 2, 1],
            Mode::Minor => [2, 1, 2, 2, 1, 2, 2],
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Major => write!(f, "Major"),
            Mode::Minor => write!(f, "Minor"),
        }
    }
}

impl FromStr for Mode {
    type Err = TheoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "major" => Ok(Mode::Major),
            "minor" => Ok(Mode::Minor),
            _ => Err(TheoryError::UnknownMode(s.to_string())),
        }
    }
}

/// Which chromatic table a key reads its note names from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Spelling {
    Sharps,
    Flats,
}

/// The twelve tonics a session can be in, one per pitch class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Tonic {
    C,
    #[serde(rename = "C#")]
    CSharp,
    D,
    #[serde(rename = "Eb")]
    EFlat,
    E,
    F,
    #[serde(rename = "F#")]
    FSharp,
    G,
    #[serde(rename = "Ab")]
    AFlat,
    A,
    #[serde(rename = "Bb")]
    BFlat,
    B,
}

impl Tonic {
    /// In pitch-class order, which is also the order the generator draws from.
    pub const ALL: [Tonic; 12] = [
        Tonic::C,
        Tonic::CSharp,
        Tonic::D,
        Tonic::EFlat,
        Tonic::E,
        Tonic::F,
        Tonic::FSharp,
        Tonic::G,
        Tonic::AFlat,
        Tonic::A,
        Tonic::BFlat,
        Tonic::B,
    ];

    /// Pitch class, 0 = C.
    pub fn pitch_class(self) -> u8 {
        self as u8
    }

    pub fn name(self) -> &'static str {
        match self {
            Tonic::C => "C",
            Tonic::CSharp => "C#",
            Tonic::D => "D",
            Tonic::EFlat => "Eb",
            Tonic::E => "E",
            Tonic::F => "F",
            Tonic::FSharp => "F#",
            Tonic::G => "G",
            Tonic::AFlat => "Ab",
            Tonic::A => "A",
            Tonic::BFlat => "Bb",
            Tonic::B => "B",
        }
    }

    /// Flat keys are F, Bb, Eb and Ab; every other tonic spells with sharps.
    /// The partition ignores mode.
    pub fn spelling(self) -> Spelling {
        match self {
            Tonic::F | Tonic::BFlat | Tonic::EFlat | Tonic::AFlat => Spelling::Flats,
            _ => Spelling::Sharps,
        }
    }
}

impl fmt::Display for Tonic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Tonic {
    type Err = TheoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        let normalized: String = match chars.next() {
            Some(letter) => letter.to_ascii_uppercase().to_string() + chars.as_str(),
            None => String::new(),
        };
        Tonic::ALL
            .into_iter()
            .find(|t| t.name() == normalized)
            .ok_or_else(|| TheoryError::UnknownTonic(s.to_string()))
    }
}

/// A tonic and mode. Fixed for the lifetime of a practice session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Key {
    pub tonic: Tonic,
    pub mode: Mode,
}

impl Key {
    pub fn new(tonic: Tonic, mode: Mode) -> Self {
        Key { tonic, mode }
    }

    /// Key-signature name as staff renderers expect it: `"F"`, `"Ebm"`.
    pub fn signature(&self) -> String {
        match self.mode {
            Mode::Major => self.tonic.name().to_string(),
            Mode::Minor => format!("{}m", self.tonic.name()),
        }
    }

    pub fn scale(&self) -> Scale {
        scale_of(*self)
    }

    pub fn degree_to_pitch(&self, degree: u8) -> Result<&'static str, TheoryError> {
        self.scale().pitch(degree)
    }

    pub fn pitch_to_degree(&self, pitch: &str) -> Result<u8, TheoryError> {
        self.scale().degree_of(pitch).ok_or_else(|| TheoryError::UnknownPitch {
            pitch: pitch.to_string(),
            key: self.to_string(),
        })
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.tonic, self.mode)
    }
}

/// The eight note names of a key: degrees 1..7 and the octave repeat of 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Scale {
    notes: [&'static str; 8],
}

impl Scale {
    pub fn notes(&self) -> &[&'static str; 8] {
        &self.notes
    }

    /// Name of scale degree `degree` (1..7).
    pub fn pitch(&self, degree: u8) -> Result<&'static str, TheoryError> {
        if !(1..=7).contains(&degree) {
            return Err(TheoryError::InvalidDegree(degree));
        }
        Ok(self.notes[(degree - 1) as usize])
    }

    /// Degree (1..7) of a note name, matched by exact spelling. A trailing
    /// staff octave (`"Bb/4"`) is ignored.
    pub fn degree_of(&self, pitch: &str) -> Option<u8> {
        let name = pitch.split('/').next().unwrap_or(pitch).trim();
        self.notes[..7]
            .iter()
            .position(|&n| n == name)
            .map(|i| i as u8 + 1)
    }
}

/// Build the scale of `key` from its step pattern and spelling table.
pub fn scale_of(key: Key) -> Scale {
    let names = match key.tonic.spelling() {
        Spelling::Sharps => &SHARP_NAMES,
        Spelling::Flats => &FLAT_NAMES,
    };
    let mut notes = [""; 8];
    let mut pc = key.tonic.pitch_class() as usize;
    notes[0] = names[pc];
    for (i, step) in key.mode.step_pattern().iter().enumerate() {
        pc = (pc + *step as usize) % 12;
        notes[i + 1] = names[pc];
    }
    Scale { notes }
}

/// Name of `degree` in `key`. Fails with `InvalidDegree` outside 1..7.
pub fn degree_to_pitch(key: Key, degree: u8) -> Result<&'static str, TheoryError> {
    key.degree_to_pitch(degree)
}

/// Degree of `pitch` in `key`. Fails with `UnknownPitch` for non-members.
pub fn pitch_to_degree(key: Key, pitch: &str) -> Result<u8, TheoryError> {
    key.pitch_to_degree(pitch)
}

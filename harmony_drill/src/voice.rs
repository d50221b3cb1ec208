// The four-voice answer a user builds up, one note per chord per voice.
//
// Rows are voice parts (SATB), columns are progression positions. Each cell
// is a `Note`: a scale degree plus an octave number, so voices can sit more
// than a seventh apart the way they do on a grand staff. Notes are plain
// numbers in the key's degree space; pitch names only exist in `key.rs`.
//
// A `VoiceSet` is filled incrementally by the shell as the user places
// notes, so rows may be ragged. The validator checks lengths before it runs
// any rule.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Voice part in SATB order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoicePart {
    Soprano = 0,
    Alto = 1,
    Tenor = 2,
    Bass = 3,
}

impl VoicePart {
    pub const ALL: [VoicePart; 4] = [
        VoicePart::Soprano,
        VoicePart::Alto,
        VoicePart::Tenor,
        VoicePart::Bass,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            VoicePart::Soprano => "soprano",
            VoicePart::Alto => "alto",
            VoicePart::Tenor => "tenor",
            VoicePart::Bass => "bass",
        }
    }

    /// Every unordered pair of distinct voices, in (upper, lower) order.
    pub fn pairs() -> impl Iterator<Item = (VoicePart, VoicePart)> {
        VoicePart::ALL.into_iter().enumerate().flat_map(|(i, upper)| {
            VoicePart::ALL
                .into_iter()
                .skip(i + 1)
                .map(move |lower| (upper, lower))
        })
    }
}

impl fmt::Display for VoicePart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A placed note: scale degree (1..7 when well-formed) and octave.
///
/// Octave 0 is the reference octave; the numbering is otherwise relative and
/// only differences matter to the validator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Note {
    pub degree: u8,
    #[serde(default)]
    pub octave: i8,
}

impl Note {
    pub fn new(degree: u8, octave: i8) -> Self {
        Note { degree, octave }
    }

    pub fn is_valid(&self) -> bool {
        (1..=7).contains(&self.degree)
    }

    /// Octave-extended degree number: `octave * 7 + degree`.
    pub fn step(&self) -> i32 {
        self.octave as i32 * 7 + self.degree as i32
    }
}

impl From<u8> for Note {
    fn from(degree: u8) -> Self {
        Note::new(degree, 0)
    }
}

/// The four notes sounding at one progression position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoicedChord {
    pub soprano: Note,
    pub alto: Note,
    pub tenor: Note,
    pub bass: Note,
}

impl VoicedChord {
    pub fn note(&self, voice: VoicePart) -> Note {
        match voice {
            VoicePart::Soprano => self.soprano,
            VoicePart::Alto => self.alto,
            VoicePart::Tenor => self.tenor,
            VoicePart::Bass => self.bass,
        }
    }

    pub fn notes(&self) -> [Note; 4] {
        VoicePart::ALL.map(|v| self.note(v))
    }
}

/// One note sequence per voice part, indexed by progression position.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoiceSet {
    #[serde(default)]
    pub soprano: Vec<Note>,
    #[serde(default)]
    pub alto: Vec<Note>,
    #[serde(default)]
    pub tenor: Vec<Note>,
    #[serde(default)]
    pub bass: Vec<Note>,
}

impl VoiceSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from whole chords, one per position.
    pub fn from_chords(chords: &[VoicedChord]) -> Self {
        let mut set = VoiceSet::new();
        for chord in chords {
            for voice in VoicePart::ALL {
                set.part_mut(voice).push(chord.note(voice));
            }
        }
        set
    }

    /// Build from bare degrees in the reference octave, rows in SATB order.
    pub fn from_degrees(rows: [&[u8]; 4]) -> Self {
        let [soprano, alto, tenor, bass] =
            rows.map(|row| row.iter().map(|&d| Note::from(d)).collect::<Vec<_>>());
        VoiceSet {
            soprano,
            alto,
            tenor,
            bass,
        }
    }

    pub fn part(&self, voice: VoicePart) -> &[Note] {
        match voice {
            VoicePart::Soprano => &self.soprano,
            VoicePart::Alto => &self.alto,
            VoicePart::Tenor => &self.tenor,
            VoicePart::Bass => &self.bass,
        }
    }

    pub fn part_mut(&mut self, voice: VoicePart) -> &mut Vec<Note> {
        match voice {
            VoicePart::Soprano => &mut self.soprano,
            VoicePart::Alto => &mut self.alto,
            VoicePart::Tenor => &mut self.tenor,
            VoicePart::Bass => &mut self.bass,
        }
    }

    pub fn note(&self, voice: VoicePart, index: usize) -> Option<Note> {
        self.part(voice).get(index).copied()
    }

    /// All four notes at `index`, if every part reaches that far.
    pub fn chord_at(&self, index: usize) -> Option<VoicedChord> {
        Some(VoicedChord {
            soprano: self.note(VoicePart::Soprano, index)?,
            alto: self.note(VoicePart::Alto, index)?,
            tenor: self.note(VoicePart::Tenor, index)?,
            bass: self.note(VoicePart::Bass, index)?,
        })
    }

    /// Number of complete chords (the shortest part's length).
    pub fn complete_len(&self) -> usize {
        VoicePart::ALL
            .iter()
            .map(|&v| self.part(v).len())
            .min()
            .unwrap_or(0)
    }

    pub fn clear(&mut self) {
        for voice in VoicePart::ALL {
            self.part_mut(voice).clear();
        }
    }

    /// Compact text dump, one row per voice, degrees with octave marks
    /// (`'` up, `,` down).
    pub fn summary(&self) -> String {
        let mut out = String::new();
        for voice in VoicePart::ALL {
            out.push_str(&format!("{:>8}: ", voice.name()));
            let cells: Vec<String> = self.part(voice).iter().map(note_label).collect();
            out.push_str(&cells.join(" "));
            out.push('\n');
        }
        out
    }
}

fn note_label(note: &Note) -> String {
    let marks = if note.octave >= 0 {
        "'".repeat(note.octave as usize)
    } else {
        ",".repeat(note.octave.unsigned_abs() as usize)
    };
    format!("{}{marks}", note.degree)
}

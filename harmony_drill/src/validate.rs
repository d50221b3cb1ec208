// Voice-leading validation: check a user's four-voice realization of a
// progression and report every rule violation with its location.
//
// Structural preconditions run first and short-circuit: a voice part that is
// shorter than the progression, a note whose degree is outside 1..7, or a
// chord the key's mode does not define. None of the rule checks run on such
// input.
//
// Rule checks, each an independent pure function, merged in this order:
// 1. Chord tones: every note belongs to its chord; every chord tone is sung.
// 2. Seventh resolution: degree 7 in any voice moves to degree 1 next.
// 3. Parallel fifths: two voices 7 steps apart at consecutive positions.
// 4. Parallel octaves: the same, 12 steps apart.
//
// Intervals in 3 and 4 are measured in octave-extended scale steps
// (`Note::step`, seven steps per octave), not semitones. So the "fifth"
// rule actually fires on two voices a diatonic octave apart (7 steps), and
// the "octave" rule on voices a thirteenth apart (12 steps). True parallel
// fifths (4 steps) and octaves (7 steps) are not reported under their own
// names. The rule names and distances are kept as shells expect them; do
// not read them as interval names.
//
// Within a category, errors are ordered by position, then SATB voice order.
// Violations are ordinary return data; nothing here fails.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::key::Key;
use crate::progression::Progression;
use crate::tables::TheoryTables;
use crate::voice::{VoicePart, VoiceSet};

/// Step distance the parallel-fifth rule looks for.
pub const FIFTH_STEPS: i32 = 7;
/// Step distance the parallel-octave rule looks for.
pub const OCTAVE_STEPS: i32 = 12;

/// What a `ValidationError` reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationKind {
    IncompleteVoicePart,
    InvalidDegree,
    UnknownChord,
    IncorrectNote,
    MissingChordTone,
    UnresolvedSeventh,
    ParallelFifth,
    ParallelOctave,
}

impl ViolationKind {
    pub fn description(self) -> &'static str {
        match self {
            ViolationKind::IncompleteVoicePart => "Incomplete voice part",
            ViolationKind::InvalidDegree => "Invalid scale degree",
            ViolationKind::UnknownChord => "Unknown chord symbol",
            ViolationKind::IncorrectNote => "Incorrect note",
            ViolationKind::MissingChordTone => "Missing note from chord",
            ViolationKind::UnresolvedSeventh => "Seventh should resolve to tonic",
            ViolationKind::ParallelFifth => "Parallel fifth",
            ViolationKind::ParallelOctave => "Parallel octave",
        }
    }

    /// Structural errors mean the input could not be checked at all.
    pub fn is_structural(self) -> bool {
        matches!(
            self,
            ViolationKind::IncompleteVoicePart
                | ViolationKind::InvalidDegree
                | ViolationKind::UnknownChord
        )
    }
}

/// A progression position, optionally narrowed to one voice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteLocation {
    pub voice: Option<VoicePart>,
    pub index: usize,
}

impl NoteLocation {
    pub fn at(voice: VoicePart, index: usize) -> Self {
        NoteLocation {
            voice: Some(voice),
            index,
        }
    }

    pub fn chord(index: usize) -> Self {
        NoteLocation { voice: None, index }
    }
}

/// One reported problem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationError {
    pub kind: ViolationKind,
    pub description: String,
    pub locations: Vec<NoteLocation>,
}

impl ValidationError {
    pub fn new(kind: ViolationKind, locations: Vec<NoteLocation>) -> Self {
        ValidationError {
            kind,
            description: kind.description().to_string(),
            locations,
        }
    }

    fn with_detail(kind: ViolationKind, detail: &str, locations: Vec<NoteLocation>) -> Self {
        ValidationError {
            kind,
            description: format!("{}: {}", kind.description(), detail),
            locations,
        }
    }
}

/// Check `voices` against `progression` in `key`.
///
/// Returns structural errors alone when the input is malformed, otherwise
/// the merged output of all four rule checks. An empty result means the
/// realization is correct.
pub fn validate(
    tables: &TheoryTables,
    key: Key,
    voices: &VoiceSet,
    progression: &Progression,
) -> Vec<ValidationError> {
    let structural = check_structure(tables, key, voices, progression);
    if !structural.is_empty() {
        debug!(%key, errors = structural.len(), "voice set failed structural checks");
        return structural;
    }

    let len = progression.len();
    let mut errors = check_chord_tones(tables, key, voices, progression);
    errors.extend(check_seventh_resolution(voices, len));
    errors.extend(check_parallel_fifths(voices, len));
    errors.extend(check_parallel_octaves(voices, len));

    debug!(%key, chords = len, errors = errors.len(), "validated voice set");
    errors
}

/// Preconditions. A short voice part yields exactly one error naming every
/// short part, and nothing else is examined.
pub fn check_structure(
    tables: &TheoryTables,
    key: Key,
    voices: &VoiceSet,
    progression: &Progression,
) -> Vec<ValidationError> {
    let len = progression.len();

    let short: Vec<VoicePart> = VoicePart::ALL
        .into_iter()
        .filter(|&v| voices.part(v).len() < len)
        .collect();
    if !short.is_empty() {
        let names: Vec<&str> = short.iter().map(|v| v.name()).collect();
        let locations = short
            .iter()
            .map(|&v| NoteLocation::at(v, voices.part(v).len()))
            .collect();
        return vec![ValidationError::with_detail(
            ViolationKind::IncompleteVoicePart,
            &names.join(", "),
            locations,
        )];
    }

    let mut errors = Vec::new();
    for index in 0..len {
        for voice in VoicePart::ALL {
            let note = voices.part(voice)[index];
            if !note.is_valid() {
                errors.push(ValidationError::new(
                    ViolationKind::InvalidDegree,
                    vec![NoteLocation::at(voice, index)],
                ));
            }
        }
    }
    for (index, symbol) in progression.chords().iter().enumerate() {
        if tables.chord_tones(key.mode, symbol).is_err() {
            errors.push(ValidationError::with_detail(
                ViolationKind::UnknownChord,
                symbol.as_str(),
                vec![NoteLocation::chord(index)],
            ));
        }
    }
    errors
}

/// Every note must be a tone of its chord, and every chord tone must be
/// present in at least one voice. Octaves are ignored; only degrees count.
pub fn check_chord_tones(
    tables: &TheoryTables,
    key: Key,
    voices: &VoiceSet,
    progression: &Progression,
) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    for (index, symbol) in progression.chords().iter().enumerate() {
        let Ok(expected) = tables.chord_tones(key.mode, symbol) else {
            continue;
        };
        let Some(chord) = voices.chord_at(index) else {
            continue;
        };

        for voice in VoicePart::ALL {
            if !expected.contains(&chord.note(voice).degree) {
                errors.push(ValidationError::new(
                    ViolationKind::IncorrectNote,
                    vec![NoteLocation::at(voice, index)],
                ));
            }
        }

        let sung = chord.notes().map(|n| n.degree);
        let mut reported: Vec<u8> = Vec::with_capacity(3);
        for degree in expected {
            if !sung.contains(&degree) && !reported.contains(&degree) {
                reported.push(degree);
                errors.push(ValidationError::new(
                    ViolationKind::MissingChordTone,
                    vec![NoteLocation::chord(index)],
                ));
            }
        }
    }

    errors
}

/// Degree 7 at position i-1 must be followed by degree 1 at i in the same
/// voice. The error points at the unresolved seventh. Applies to every
/// voice regardless of the chord's function.
pub fn check_seventh_resolution(voices: &VoiceSet, len: usize) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    for index in 1..len {
        for voice in VoicePart::ALL {
            let (Some(prev), Some(curr)) = (voices.note(voice, index - 1), voices.note(voice, index))
            else {
                continue;
            };
            if prev.degree == 7 && curr.degree != 1 {
                errors.push(ValidationError::new(
                    ViolationKind::UnresolvedSeventh,
                    vec![NoteLocation::at(voice, index - 1)],
                ));
            }
        }
    }
    errors
}

pub fn check_parallel_fifths(voices: &VoiceSet, len: usize) -> Vec<ValidationError> {
    check_parallel_interval(voices, len, FIFTH_STEPS, ViolationKind::ParallelFifth)
}

pub fn check_parallel_octaves(voices: &VoiceSet, len: usize) -> Vec<ValidationError> {
    check_parallel_interval(voices, len, OCTAVE_STEPS, ViolationKind::ParallelOctave)
}

/// Report each voice pair that is exactly `distance` steps apart at two
/// consecutive positions. Locations list both voices at both positions.
pub fn check_parallel_interval(
    voices: &VoiceSet,
    len: usize,
    distance: i32,
    kind: ViolationKind,
) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    for index in 0..len.saturating_sub(1) {
        for (upper, lower) in VoicePart::pairs() {
            let gap_at = |i: usize| -> Option<i32> {
                let a = voices.note(upper, i)?;
                let b = voices.note(lower, i)?;
                Some((a.step() - b.step()).abs())
            };
            if gap_at(index) == Some(distance) && gap_at(index + 1) == Some(distance) {
                errors.push(ValidationError::new(
                    kind,
                    vec![
                        NoteLocation::at(upper, index),
                        NoteLocation::at(lower, index),
                        NoteLocation::at(upper, index + 1),
                        NoteLocation::at(lower, index + 1),
                    ],
                ));
            }
        }
    }
    errors
}

/// Distinct error descriptions in first-seen order, for display panels that
/// list each kind of mistake once.
pub fn unique_descriptions(errors: &[ValidationError]) -> Vec<&str> {
    let mut seen: Vec<&str> = Vec::new();
    for error in errors {
        if !seen.contains(&error.description.as_str()) {
            seen.push(&error.description);
        }
    }
    seen
}

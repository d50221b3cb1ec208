// One practice round: a generated key and progression plus the user's
// partially filled voice set.
//
// The shell drives a session by placing notes voice by voice, undoing
// mistakes, and asking for a check once every voice is filled. Checking is
// read-only; the user fixes notes and checks again. `restart` draws a new
// key and progression and clears all voices.
//
// A session serializes as `{key, progression, voices}`, the same document the
// `drill check` command reads.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::key::Key;
use crate::progression::{ChoiceSource, Progression, generate_progression};
use crate::tables::TheoryTables;
use crate::validate::{ValidationError, validate};
use crate::voice::{Note, VoicePart, VoiceSet};

pub use crate::validate::unique_descriptions;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PracticeSession {
    key: Key,
    progression: Progression,
    #[serde(default)]
    voices: VoiceSet,
}

impl PracticeSession {
    /// Draw a fresh key and progression with empty voices.
    pub fn start(tables: &TheoryTables, source: &mut impl ChoiceSource) -> Self {
        let (key, progression) = generate_progression(tables, source);
        info!(%key, chords = progression.len(), "practice session started");
        PracticeSession {
            key,
            progression,
            voices: VoiceSet::new(),
        }
    }

    /// Resume a session from saved state.
    pub fn from_parts(key: Key, progression: Progression, voices: VoiceSet) -> Self {
        PracticeSession {
            key,
            progression,
            voices,
        }
    }

    pub fn restart(&mut self, tables: &TheoryTables, source: &mut impl ChoiceSource) {
        let (key, progression) = generate_progression(tables, source);
        info!(%key, chords = progression.len(), "practice session restarted");
        self.key = key;
        self.progression = progression;
        self.voices.clear();
    }

    pub fn key(&self) -> Key {
        self.key
    }

    pub fn progression(&self) -> &Progression {
        &self.progression
    }

    pub fn voices(&self) -> &VoiceSet {
        &self.voices
    }

    /// Append `note` to `voice`. Returns false, changing nothing, when that
    /// voice already has a note for every chord.
    pub fn place_note(&mut self, voice: VoicePart, note: Note) -> bool {
        let limit = self.progression.len();
        let part = self.voices.part_mut(voice);
        if part.len() >= limit {
            return false;
        }
        part.push(note);
        true
    }

    /// Remove and return the last note placed in `voice`.
    pub fn undo_note(&mut self, voice: VoicePart) -> Option<Note> {
        self.voices.part_mut(voice).pop()
    }

    /// Next position `voice` will fill, or `None` when the voice is full.
    pub fn cursor(&self, voice: VoicePart) -> Option<usize> {
        let filled = self.voices.part(voice).len();
        (filled < self.progression.len()).then_some(filled)
    }

    pub fn is_complete(&self) -> bool {
        self.voices.complete_len() >= self.progression.len()
    }

    pub fn check(&self, tables: &TheoryTables) -> Vec<ValidationError> {
        validate(tables, self.key, &self.voices, &self.progression)
    }
}

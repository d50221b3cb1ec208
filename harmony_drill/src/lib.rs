// Harmony Drill
//
// The theory core of a four-part harmony practice tool. It generates a
// random key and a functional-harmony chord progression, maps scale degrees
// to spelled pitch names, and checks a user's soprano/alto/tenor/bass
// realization against the classic part-writing rules. Rendering and input
// belong to whatever shell sits on top; this crate only deals in plain data.
//
// Architecture:
// - key.rs: Tonic, mode, key, and the scale/pitch-name mapping
// - chord.rs: Harmonic functions and Roman-numeral chord symbols
// - tables.rs: Loadable chord vocabulary, transition table, length range
// - progression.rs: Random-walk progression generator over functions
// - voice.rs: SATB voice parts and the placed-note grid
// - validate.rs: Voice-leading rule checks (chord tones, sevenths, parallels)
// - session.rs: One practice round (generate, place notes, check)
// - error.rs: Contract and configuration error types
//
// Generation is deterministic given the choice source, so a seeded
// `DrillRng` reproduces a drill exactly.

pub mod chord;
pub mod error;
pub mod key;
pub mod progression;
pub mod session;
pub mod tables;
pub mod validate;
pub mod voice;

pub use chord::{ChordSymbol, HarmonicFunction};
pub use error::{ConfigError, TheoryError};
pub use key::{Key, Mode, Tonic, degree_to_pitch, pitch_to_degree};
pub use progression::{ChoiceSource, Progression, generate_progression};
pub use session::PracticeSession;
pub use tables::{TableConfig, TheoryTables};
pub use validate::{ValidationError, ViolationKind, validate};
pub use voice::{Note, VoicePart, VoiceSet};

// Theory tables: the static configuration the generator and validator read.
//
// Everything musical that is convention rather than computation lives here:
// which Roman numerals exist per mode and which degrees they contain, which
// chords serve each harmonic function, the function transition table, and
// the range of interior progression lengths.
//
// Two layers. `TableConfig` is the raw, editable shape (public fields, same
// JSON as `serde_json::to_string(&TableConfig::builtin())`). `TheoryTables`
// wraps a config that has passed `TableConfig::validate`; its only
// constructors run that check, and deserializing one runs it too. The
// generator and validator take `&TheoryTables`, so they never see a table
// with a missing entry.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::chord::{ChordSymbol, HarmonicFunction};
use crate::error::{ConfigError, TheoryError};
use crate::key::Mode;

/// Inclusive range for the number of generated interior steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LengthRange {
    pub min: usize,
    pub max: usize,
}

/// Chord vocabulary for one mode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModeTables {
    /// Opening and closing chord ("I" / "i").
    pub tonic_chord: ChordSymbol,
    /// Penultimate chord of every progression.
    pub cadence_chord: ChordSymbol,
    /// Roman numeral -> (root, third, fifth) scale degrees.
    pub chord_tones: BTreeMap<ChordSymbol, [u8; 3]>,
    /// Candidate chords per harmonic function, in draw order.
    pub chords_by_function: BTreeMap<HarmonicFunction, Vec<ChordSymbol>>,
}

/// Unchecked configuration for progression generation and validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableConfig {
    /// Allowed next functions for each function, in draw order.
    pub transitions: BTreeMap<HarmonicFunction, Vec<HarmonicFunction>>,
    pub major: ModeTables,
    pub minor: ModeTables,
    pub interior_length: LengthRange,
}

impl TableConfig {
    /// The built-in tables: the seven diatonic triads per mode (plus the
    /// raised-leading-tone V and vii° in minor), T/PD/D chord sets, and
    /// 6..=10 interior steps.
    pub fn builtin() -> Self {
        use HarmonicFunction::{Dominant, Predominant, Tonic};

        let mut transitions = BTreeMap::new();
        transitions.insert(Tonic, vec![Predominant, Dominant]);
        transitions.insert(Predominant, vec![Dominant]);
        transitions.insert(Dominant, vec![Tonic, Dominant]);

        let major = mode_tables(
            "I",
            "V",
            &[
                ("I", [1, 3, 5]),
                ("ii", [2, 4, 6]),
                ("iii", [3, 5, 7]),
                ("IV", [4, 6, 1]),
                ("V", [5, 7, 2]),
                ("vi", [6, 1, 3]),
                ("vii°", [7, 2, 4]),
            ],
            [&["I", "iii"], &["ii", "IV"], &["V", "vii°"]],
        );

        let minor = mode_tables(
            "i",
            "V",
            &[
                ("i", [1, 3, 5]),
                ("ii°", [2, 4, 6]),
                ("III", [3, 5, 7]),
                ("iv", [4, 6, 1]),
                ("v", [5, 7, 2]),
                ("VI", [6, 1, 3]),
                ("VII", [7, 2, 4]),
                // Harmonic-minor dominants; same degrees, raised leading tone.
                ("V", [5, 7, 2]),
                ("vii°", [7, 2, 4]),
            ],
            [&["i", "III"], &["ii°", "iv"], &["V", "vii°"]],
        );

        TableConfig {
            transitions,
            major,
            minor,
            interior_length: LengthRange { min: 6, max: 10 },
        }
    }

    /// Check that the tables can drive generation and validation end to end.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let LengthRange { min, max } = self.interior_length;
        if min == 0 || min > max {
            return Err(ConfigError::InteriorLength { min, max });
        }

        for function in HarmonicFunction::ALL {
            let targets = self.transitions_from(function);
            if targets.is_empty() {
                return Err(ConfigError::MissingTransitions(function));
            }
            // Whatever function the interior ends on, the cadence chord follows.
            if !targets.contains(&HarmonicFunction::Dominant) {
                return Err(ConfigError::CadenceTransition {
                    from: function,
                    to: HarmonicFunction::Dominant,
                });
            }
        }
        if !self.is_legal_transition(HarmonicFunction::Dominant, HarmonicFunction::Tonic) {
            return Err(ConfigError::CadenceTransition {
                from: HarmonicFunction::Dominant,
                to: HarmonicFunction::Tonic,
            });
        }

        for mode in Mode::ALL {
            let tables = self.mode(mode);

            for (symbol, tones) in &tables.chord_tones {
                if let Some(&degree) = tones.iter().find(|d| !(1..=7).contains(*d)) {
                    return Err(ConfigError::DegreeOutOfRange {
                        mode,
                        symbol: symbol.to_string(),
                        degree,
                    });
                }
            }

            let mut seen: Vec<&ChordSymbol> = Vec::new();
            for function in HarmonicFunction::ALL {
                let candidates = self.candidates(mode, function);
                if candidates.is_empty() {
                    return Err(ConfigError::NoCandidates { mode, function });
                }
                for symbol in candidates {
                    if !tables.chord_tones.contains_key(symbol) {
                        return Err(ConfigError::CandidateWithoutTones {
                            mode,
                            function,
                            symbol: symbol.to_string(),
                        });
                    }
                    if seen.contains(&symbol) {
                        return Err(ConfigError::AmbiguousFunction {
                            mode,
                            symbol: symbol.to_string(),
                        });
                    }
                    seen.push(symbol);
                }
            }

            for (role, symbol, expected) in [
                ("tonic", &tables.tonic_chord, HarmonicFunction::Tonic),
                ("cadence", &tables.cadence_chord, HarmonicFunction::Dominant),
            ] {
                if self.function_of(mode, symbol) != Some(expected) {
                    return Err(ConfigError::CadenceChord {
                        mode,
                        role,
                        symbol: symbol.to_string(),
                        expected,
                    });
                }
            }
        }

        Ok(())
    }

    fn mode(&self, mode: Mode) -> &ModeTables {
        match mode {
            Mode::Major => &self.major,
            Mode::Minor => &self.minor,
        }
    }

    fn transitions_from(&self, function: HarmonicFunction) -> &[HarmonicFunction] {
        self.transitions
            .get(&function)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    fn candidates(&self, mode: Mode, function: HarmonicFunction) -> &[ChordSymbol] {
        self.mode(mode)
            .chords_by_function
            .get(&function)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    fn function_of(&self, mode: Mode, symbol: &ChordSymbol) -> Option<HarmonicFunction> {
        self.mode(mode)
            .chords_by_function
            .iter()
            .find(|(_, chords)| chords.contains(symbol))
            .map(|(&function, _)| function)
    }

    fn is_legal_transition(&self, from: HarmonicFunction, to: HarmonicFunction) -> bool {
        self.transitions_from(from).contains(&to)
    }
}

/// A `TableConfig` that has passed validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(into = "TableConfig", try_from = "TableConfig")]
pub struct TheoryTables {
    config: TableConfig,
}

impl TheoryTables {
    /// Validate `config` and wrap it.
    pub fn new(config: TableConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(TheoryTables { config })
    }

    /// The built-in tables, checked like any other.
    pub fn builtin() -> Result<Self, ConfigError> {
        Self::new(TableConfig::builtin())
    }

    /// Parse tables from JSON and validate them.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: TableConfig = serde_json::from_str(json)?;
        Self::new(config)
    }

    /// Load tables from a JSON file and validate them.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let data = std::fs::read_to_string(path)?;
        Self::from_json(&data)
    }

    pub fn config(&self) -> &TableConfig {
        &self.config
    }

    pub fn interior_length(&self) -> LengthRange {
        self.config.interior_length
    }

    pub fn mode(&self, mode: Mode) -> &ModeTables {
        self.config.mode(mode)
    }

    pub fn tonic_chord(&self, mode: Mode) -> &ChordSymbol {
        &self.mode(mode).tonic_chord
    }

    pub fn cadence_chord(&self, mode: Mode) -> &ChordSymbol {
        &self.mode(mode).cadence_chord
    }

    /// Degrees of `symbol` in `mode`, or `UnknownChordSymbol`.
    pub fn chord_tones(&self, mode: Mode, symbol: &ChordSymbol) -> Result<[u8; 3], TheoryError> {
        self.mode(mode)
            .chord_tones
            .get(symbol)
            .copied()
            .ok_or_else(|| TheoryError::UnknownChordSymbol {
                mode,
                symbol: symbol.to_string(),
            })
    }

    pub fn function_of(&self, mode: Mode, symbol: &ChordSymbol) -> Option<HarmonicFunction> {
        self.config.function_of(mode, symbol)
    }

    pub fn transitions_from(&self, function: HarmonicFunction) -> &[HarmonicFunction] {
        self.config.transitions_from(function)
    }

    pub fn candidates(&self, mode: Mode, function: HarmonicFunction) -> &[ChordSymbol] {
        self.config.candidates(mode, function)
    }

    pub fn is_legal_transition(&self, from: HarmonicFunction, to: HarmonicFunction) -> bool {
        self.config.is_legal_transition(from, to)
    }
}

impl TryFrom<TableConfig> for TheoryTables {
    type Error = ConfigError;

    fn try_from(config: TableConfig) -> Result<Self, Self::Error> {
        Self::new(config)
    }
}

impl From<TheoryTables> for TableConfig {
    fn from(tables: TheoryTables) -> Self {
        tables.config
    }
}

fn mode_tables(
    tonic: &str,
    cadence: &str,
    tones: &[(&str, [u8; 3])],
    by_function: [&[&str]; 3],
) -> ModeTables {
    let chord_tones: BTreeMap<ChordSymbol, [u8; 3]> = tones
        .iter()
        .map(|&(symbol, degrees)| (ChordSymbol::from(symbol), degrees))
        .collect();
    let chords_by_function: BTreeMap<HarmonicFunction, Vec<ChordSymbol>> = HarmonicFunction::ALL
        .into_iter()
        .zip(by_function)
        .map(|(function, chords)| {
            (
                function,
                chords.iter().map(|&c| ChordSymbol::from(c)).collect::<Vec<_>>(),
            )
        })
        .collect();
    ModeTables {
        tonic_chord: tonic.into(),
        cadence_chord: cadence.into(),
        chord_tones,
        chords_by_function,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_tables_validate() {
        TableConfig::builtin().validate().unwrap();
        TheoryTables::builtin().unwrap();
    }

    #[test]
    fn test_builtin_vocabulary_sizes() {
        let tables = TheoryTables::builtin().unwrap();
        assert_eq!(tables.mode(Mode::Major).chord_tones.len(), 7);
        assert_eq!(tables.mode(Mode::Minor).chord_tones.len(), 9);
        assert_eq!(tables.tonic_chord(Mode::Major), &"I");
        assert_eq!(tables.tonic_chord(Mode::Minor), &"i");
        assert_eq!(tables.cadence_chord(Mode::Minor), &"V");
    }

    #[test]
    fn test_transition_table() {
        use HarmonicFunction::*;
        let tables = TheoryTables::builtin().unwrap();
        assert!(tables.is_legal_transition(Tonic, Predominant));
        assert!(tables.is_legal_transition(Tonic, Dominant));
        assert!(tables.is_legal_transition(Predominant, Dominant));
        assert!(tables.is_legal_transition(Dominant, Tonic));
        assert!(tables.is_legal_transition(Dominant, Dominant));
        assert!(!tables.is_legal_transition(Predominant, Predominant));
        assert!(!tables.is_legal_transition(Predominant, Tonic));
        assert!(!tables.is_legal_transition(Tonic, Tonic));
        assert!(!tables.is_legal_transition(Dominant, Predominant));
    }

    #[test]
    fn test_json_roundtrip_keeps_draw_order() {
        let tables = TheoryTables::builtin().unwrap();
        let json = serde_json::to_string(&tables).unwrap();
        let restored = TheoryTables::from_json(&json).unwrap();
        assert_eq!(restored, tables);
        assert_eq!(
            restored.candidates(Mode::Major, HarmonicFunction::Predominant),
            &[ChordSymbol::from("ii"), ChordSymbol::from("IV")]
        );
    }

    #[test]
    fn test_rejects_empty_candidates() {
        let mut config = TableConfig::builtin();
        config
            .minor
            .chords_by_function
            .insert(HarmonicFunction::Predominant, Vec::new());
        assert!(matches!(
            TheoryTables::new(config),
            Err(ConfigError::NoCandidates {
                mode: Mode::Minor,
                function: HarmonicFunction::Predominant,
            })
        ));
    }

    #[test]
    fn test_rejects_candidate_without_tones() {
        let mut config = TableConfig::builtin();
        config.minor.chord_tones.remove(&ChordSymbol::from("V"));
        assert!(matches!(
            TheoryTables::new(config),
            Err(ConfigError::CandidateWithoutTones { mode: Mode::Minor, .. })
        ));
    }

    #[test]
    fn test_rejects_missing_transitions() {
        let mut config = TableConfig::builtin();
        config.transitions.remove(&HarmonicFunction::Predominant);
        assert!(matches!(
            TheoryTables::new(config),
            Err(ConfigError::MissingTransitions(HarmonicFunction::Predominant))
        ));
    }

    #[test]
    fn test_rejects_cadence_that_breaks_transitions() {
        let mut config = TableConfig::builtin();
        config
            .transitions
            .insert(HarmonicFunction::Dominant, vec![HarmonicFunction::Dominant]);
        assert!(matches!(
            TheoryTables::new(config),
            Err(ConfigError::CadenceTransition { .. })
        ));
    }

    #[test]
    fn test_rejects_out_of_range_degree() {
        let mut config = TableConfig::builtin();
        config.major.chord_tones.insert("I".into(), [1, 3, 8]);
        assert!(matches!(
            TheoryTables::new(config),
            Err(ConfigError::DegreeOutOfRange { degree: 8, .. })
        ));
    }

    #[test]
    fn test_rejects_bad_length_range() {
        let mut config = TableConfig::builtin();
        config.interior_length = LengthRange { min: 5, max: 4 };
        assert!(matches!(
            TheoryTables::new(config),
            Err(ConfigError::InteriorLength { min: 5, max: 4 })
        ));
    }

    #[test]
    fn test_from_json_rejects_malformed() {
        assert!(matches!(
            TheoryTables::from_json("{\"transitions\": 3}"),
            Err(ConfigError::Json(_))
        ));
    }

    #[test]
    fn test_deserializing_tables_validates() {
        let mut config = TableConfig::builtin();
        config.transitions.remove(&HarmonicFunction::Tonic);
        let json = serde_json::to_string(&config).unwrap();
        assert!(serde_json::from_str::<TheoryTables>(&json).is_err());
        assert!(matches!(
            TheoryTables::from_json(&json),
            Err(ConfigError::MissingTransitions(HarmonicFunction::Tonic))
        ));
    }
}

// Progression generation: a random walk over harmonic functions.
//
// A progression opens on the tonic chord, wanders through a Markov chain of
// harmonic functions (Tonic -> Predominant/Dominant, Predominant -> Dominant,
// Dominant -> Tonic/Dominant), picking one chord of each visited function,
// and closes with the fixed cadence: the mode's cadence chord ("V") and the
// tonic again. The chain, chord sets, and length range all come from
// `TheoryTables`.
//
// Randomness is injected through `ChoiceSource`. Draws happen in a fixed
// order (mode, tonic, interior length, then a function and a chord per
// step), so a seeded `DrillRng`, or a scripted source in tests, reproduces
// a progression exactly.

use std::fmt;

use harmony_drill_prng::DrillRng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::chord::{ChordSymbol, HarmonicFunction};
use crate::key::{Key, Mode, Tonic};
use crate::tables::TheoryTables;

/// Uniform choice among `len` options.
pub trait ChoiceSource {
    /// Return an index in `0..len`. `len` is always at least 1.
    fn choose_index(&mut self, len: usize) -> usize;
}

impl ChoiceSource for DrillRng {
    fn choose_index(&mut self, len: usize) -> usize {
        self.range_usize(0, len)
    }
}

/// Adapter turning any `FnMut(len) -> index` into a `ChoiceSource`.
pub struct FnChoice<F>(pub F);

impl<F: FnMut(usize) -> usize> ChoiceSource for FnChoice<F> {
    fn choose_index(&mut self, len: usize) -> usize {
        (self.0)(len)
    }
}

/// An ordered chord sequence for one practice session.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Progression {
    chords: Vec<ChordSymbol>,
}

impl Progression {
    pub fn new(chords: Vec<ChordSymbol>) -> Self {
        Progression { chords }
    }

    pub fn chords(&self) -> &[ChordSymbol] {
        &self.chords
    }

    pub fn len(&self) -> usize {
        self.chords.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chords.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&ChordSymbol> {
        self.chords.get(index)
    }

    /// Chords grouped two per measure (2/4, one chord per beat). The last
    /// measure holds a single chord when the length is odd.
    pub fn measures(&self) -> impl Iterator<Item = &[ChordSymbol]> {
        self.chords.chunks(2)
    }

    /// Harmonic function of each chord, `None` where the vocabulary has none.
    pub fn functions(&self, tables: &TheoryTables, mode: Mode) -> Vec<Option<HarmonicFunction>> {
        self.chords
            .iter()
            .map(|c| tables.function_of(mode, c))
            .collect()
    }

    /// Whether this progression has the shape the generator guarantees:
    /// tonic at both ends, cadence chord second to last, a length within the
    /// configured range, and only legal function transitions.
    pub fn is_well_formed(&self, tables: &TheoryTables, mode: Mode) -> bool {
        let n = self.chords.len();
        let range = tables.interior_length();
        if n < range.min + 2 || n > range.max + 2 {
            return false;
        }
        let tonic = tables.tonic_chord(mode);
        if &self.chords[0] != tonic
            || &self.chords[n - 1] != tonic
            || &self.chords[n - 2] != tables.cadence_chord(mode)
        {
            return false;
        }
        let functions = self.functions(tables, mode);
        functions.windows(2).all(|pair| match (pair[0], pair[1]) {
            (Some(from), Some(to)) => tables.is_legal_transition(from, to),
            _ => false,
        })
    }
}

impl fmt::Display for Progression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.chords.iter().map(ChordSymbol::as_str).collect();
        f.write_str(&names.join(" "))
    }
}

/// Pick a random key and generate a progression in it.
///
/// `TheoryTables` only exists validated, so every choice set drawn from is
/// non-empty.
pub fn generate_progression(
    tables: &TheoryTables,
    source: &mut impl ChoiceSource,
) -> (Key, Progression) {
    let mode = *pick(source, &Mode::ALL);
    let tonic = *pick(source, &Tonic::ALL);
    let key = Key::new(tonic, mode);
    let progression = generate_progression_in(tables, key, source);
    (key, progression)
}

/// Generate a progression in a caller-chosen key.
///
/// Interior length `L` is drawn from the tables' range; the result has
/// `L + 2` chords: the opening tonic, `L - 1` walked chords, the cadence
/// chord, and the closing tonic.
pub fn generate_progression_in(
    tables: &TheoryTables,
    key: Key,
    source: &mut impl ChoiceSource,
) -> Progression {
    let range = tables.interior_length();
    let spread = range.max - range.min;
    let interior = range.min + draw(source, spread + 1);

    let tonic_chord = tables.tonic_chord(key.mode);
    let mut chords = Vec::with_capacity(interior + 2);
    chords.push(tonic_chord.clone());

    let mut current = HarmonicFunction::Tonic;
    for _ in 1..interior {
        let next = *pick(source, tables.transitions_from(current));
        let chord = pick(source, tables.candidates(key.mode, next));
        chords.push(chord.clone());
        current = next;
    }

    chords.push(tables.cadence_chord(key.mode).clone());
    chords.push(tonic_chord.clone());

    let progression = Progression::new(chords);
    debug!(%key, interior, chords = %progression, "generated progression");
    progression
}

fn pick<'a, T>(source: &mut impl ChoiceSource, items: &'a [T]) -> &'a T {
    &items[draw(source, items.len())]
}

/// One draw from `source`. A source returning an index outside `0..len`
/// breaks the `ChoiceSource` contract; debug builds assert on it, release
/// builds fall back to the last option.
fn draw(source: &mut impl ChoiceSource, len: usize) -> usize {
    let idx = source.choose_index(len);
    debug_assert!(idx < len, "choice source returned {idx}, outside 0..{len}");
    idx.min(len - 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    /// Replays a fixed list of indices, then falls back to 0.
    fn scripted(indices: Vec<usize>) -> FnChoice<impl FnMut(usize) -> usize> {
        let mut iter = indices.into_iter();
        FnChoice(move |_len| iter.next().unwrap_or(0))
    }

    fn symbols(names: &[&str]) -> Vec<ChordSymbol> {
        names.iter().map(|&n| ChordSymbol::from(n)).collect()
    }

    #[test]
    fn test_scripted_major_walk() {
        let tables = TheoryTables::builtin().unwrap();
        // mode=Major, tonic=F, L=6 (index 0), then five (function, chord) draws.
        let mut source = scripted(vec![
            0, 5, 0, // Major, F, L = 6
            0, 1, // T -> PD: IV
            0, 0, // PD -> D: V
            0, 1, // D -> T: iii
            1, 1, // T -> D: vii°
            1, 0, // D -> D: V
        ]);
        let (key, progression) = generate_progression(&tables, &mut source);
        assert_eq!(key, Key::new(Tonic::F, Mode::Major));
        assert_eq!(
            progression.chords(),
            symbols(&["I", "IV", "V", "iii", "vii°", "V", "V", "I"]).as_slice()
        );
        assert!(progression.is_well_formed(&tables, key.mode));
    }

    #[test]
    fn test_scripted_minor_longest() {
        let tables = TheoryTables::builtin().unwrap();
        let key = Key::new(Tonic::A, Mode::Minor);
        // L = 10 (index 4); then always the first option.
        let mut source = scripted(vec![4]);
        let progression = generate_progression_in(&tables, key, &mut source);
        assert_eq!(progression.len(), 12);
        assert_eq!(progression.get(0), Some(&ChordSymbol::from("i")));
        assert_eq!(progression.get(1), Some(&ChordSymbol::from("ii°")));
        assert_eq!(progression.get(10), Some(&ChordSymbol::from("V")));
        assert_eq!(progression.get(11), Some(&ChordSymbol::from("i")));
        assert!(progression.is_well_formed(&tables, key.mode));
    }

    #[test]
    fn test_same_seed_same_progression() {
        let tables = TheoryTables::builtin().unwrap();
        let a = generate_progression(&tables, &mut DrillRng::new(2024));
        let b = generate_progression(&tables, &mut DrillRng::new(2024));
        assert_eq!(a, b);
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "outside 0..2")]
    fn test_out_of_range_choice_is_reported() {
        let tables = TheoryTables::builtin().unwrap();
        let mut source = FnChoice(|len: usize| len + 3);
        generate_progression(&tables, &mut source);
    }

    #[test]
    fn test_last_option_choices() {
        let tables = TheoryTables::builtin().unwrap();
        let mut source = FnChoice(|len: usize| len - 1);
        let (key, progression) = generate_progression(&tables, &mut source);
        assert_eq!(key, Key::new(Tonic::B, Mode::Minor));
        assert_eq!(progression.len(), 12);
        assert!(progression.is_well_formed(&tables, key.mode));
    }

    #[test]
    fn test_measures() {
        let progression = Progression::new(symbols(&["I", "ii", "V", "V", "I"]));
        let measures: Vec<&[ChordSymbol]> = progression.measures().collect();
        assert_eq!(measures.len(), 3);
        assert_eq!(measures[2], symbols(&["I"]).as_slice());
    }

    #[test]
    fn test_malformed_progressions_detected() {
        let tables = TheoryTables::builtin().unwrap();
        let wrong_start = Progression::new(symbols(&["V", "I", "ii", "V", "I", "iii", "V", "I"]));
        assert!(!wrong_start.is_well_formed(&tables, Mode::Major));

        let pd_to_t = Progression::new(symbols(&["I", "ii", "I", "IV", "V", "I", "V", "I"]));
        assert!(!pd_to_t.is_well_formed(&tables, Mode::Major));

        let too_short = Progression::new(symbols(&["I", "V", "I"]));
        assert!(!too_short.is_well_formed(&tables, Mode::Major));
    }

    #[test]
    fn test_display_and_serde() {
        let progression = Progression::new(symbols(&["i", "iv", "V", "i"]));
        assert_eq!(progression.to_string(), "i iv V i");
        assert_eq!(
            serde_json::to_string(&progression).unwrap(),
            r#"["i","iv","V","i"]"#
        );
    }
}

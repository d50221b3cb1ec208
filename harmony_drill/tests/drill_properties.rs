// Integration tests for the public drill API.
//
// Runs the generator over many seeds and every key to check the shape of
// each progression, round-trips every degree through its pitch name, and
// walks the four canonical validator scenarios end to end through
// `validate` and `PracticeSession`.

use harmony_drill::progression::generate_progression_in;
use harmony_drill::tables::TableConfig;
use harmony_drill::validate::NoteLocation;
use harmony_drill::{
    ChordSymbol, ConfigError, HarmonicFunction, Key, Mode, Note, PracticeSession, Progression,
    TheoryTables, Tonic, ViolationKind, VoicePart, VoiceSet, degree_to_pitch,
    generate_progression, pitch_to_degree, validate,
};
use harmony_drill_prng::DrillRng;

fn progression(names: &[&str]) -> Progression {
    Progression::new(names.iter().map(|&n| ChordSymbol::from(n)).collect())
}

/// Shape every generated progression must have.
fn assert_generated_shape(tables: &TheoryTables, key: Key, progression: &Progression) {
    let chords = progression.chords();
    let n = chords.len();
    assert!((8..=12).contains(&n), "{key}: length {n}: {progression}");
    assert_eq!(&chords[0], tables.tonic_chord(key.mode), "{key}: {progression}");
    assert_eq!(&chords[n - 1], tables.tonic_chord(key.mode), "{key}: {progression}");
    assert_eq!(chords[n - 2], "V", "{key}: {progression}");

    let functions = progression.functions(tables, key.mode);
    assert_eq!(functions[0], Some(HarmonicFunction::Tonic));
    for pair in functions.windows(2) {
        let (Some(from), Some(to)) = (pair[0], pair[1]) else {
            panic!("{key}: chord without a function in {progression}");
        };
        assert!(
            tables.is_legal_transition(from, to),
            "{key}: illegal {from:?} -> {to:?} in {progression}"
        );
    }
    assert!(progression.is_well_formed(tables, key.mode));
}

#[test]
fn generated_progressions_are_well_formed_across_seeds() {
    let tables = TheoryTables::builtin().unwrap();
    let mut modes_seen = Vec::new();
    let mut lengths_seen = Vec::new();
    for seed in 0..500 {
        let mut rng = DrillRng::new(seed);
        let (key, progression) = generate_progression(&tables, &mut rng);
        assert_generated_shape(&tables, key, &progression);
        if !modes_seen.contains(&key.mode) {
            modes_seen.push(key.mode);
        }
        if !lengths_seen.contains(&progression.len()) {
            lengths_seen.push(progression.len());
        }
    }
    assert_eq!(modes_seen.len(), 2);
    lengths_seen.sort();
    assert_eq!(lengths_seen, vec![8, 9, 10, 11, 12]);
}

#[test]
fn generated_progressions_are_well_formed_in_every_key() {
    let tables = TheoryTables::builtin().unwrap();
    let mut rng = DrillRng::new(77);
    for mode in Mode::ALL {
        for tonic in Tonic::ALL {
            let key = Key::new(tonic, mode);
            for _ in 0..20 {
                let progression = generate_progression_in(&tables, key, &mut rng);
                assert_generated_shape(&tables, key, &progression);
            }
        }
    }
}

#[test]
fn degree_pitch_round_trip_for_every_key() {
    for mode in Mode::ALL {
        for tonic in Tonic::ALL {
            let key = Key::new(tonic, mode);
            for degree in 1..=7 {
                let pitch = degree_to_pitch(key, degree).unwrap();
                assert_eq!(pitch_to_degree(key, pitch), Ok(degree), "{key} degree {degree}");
            }
        }
    }
}

#[test]
fn flat_keys_never_spell_sharps() {
    for tonic in [Tonic::F, Tonic::BFlat, Tonic::EFlat, Tonic::AFlat] {
        for mode in Mode::ALL {
            let scale = Key::new(tonic, mode).scale();
            assert!(
                scale.notes().iter().all(|n| !n.contains('#')),
                "{tonic} {mode}: {:?}",
                scale.notes()
            );
        }
    }
}

#[test]
fn scenario_correct_voicing_in_c_major() {
    let tables = TheoryTables::builtin().unwrap();
    let key = Key::new(Tonic::C, Mode::Major);
    let voices = VoiceSet::from_degrees([&[5, 5, 5], &[3, 2, 3], &[1, 7, 1], &[1, 5, 1]]);
    assert!(validate(&tables, key, &voices, &progression(&["I", "V", "I"])).is_empty());
}

#[test]
fn scenario_parallel_fifth_between_soprano_and_alto() {
    let tables = TheoryTables::builtin().unwrap();
    let key = Key::new(Tonic::C, Mode::Major);
    let mut voices = VoiceSet::new();
    // Soprano and alto move 1 -> 5 an octave apart, which is 7 steps in
    // octave-extended degrees: 8 vs 1, then 12 vs 5.
    voices.soprano = vec![Note::new(1, 1), Note::new(5, 1)];
    voices.alto = vec![Note::new(1, 0), Note::new(5, 0)];
    voices.tenor = vec![Note::new(3, 0), Note::new(2, 0)];
    voices.bass = vec![Note::new(5, -1), Note::new(7, -1)];

    let errors = validate(&tables, key, &voices, &progression(&["I", "V"]));
    let fifths: Vec<_> = errors
        .iter()
        .filter(|e| e.description == "Parallel fifth")
        .collect();
    assert_eq!(fifths.len(), 1, "{errors:?}");
    assert_eq!(
        fifths[0].locations,
        vec![
            NoteLocation::at(VoicePart::Soprano, 0),
            NoteLocation::at(VoicePart::Alto, 0),
            NoteLocation::at(VoicePart::Soprano, 1),
            NoteLocation::at(VoicePart::Alto, 1),
        ]
    );
}

#[test]
fn scenario_unresolved_seventh() {
    let tables = TheoryTables::builtin().unwrap();
    let key = Key::new(Tonic::D, Mode::Major);
    let voices = VoiceSet::from_degrees([&[7, 3], &[5, 5], &[2, 1], &[5, 1]]);
    let errors = validate(&tables, key, &voices, &progression(&["V", "I"]));
    assert_eq!(errors.len(), 1, "{errors:?}");
    assert_eq!(errors[0].kind, ViolationKind::UnresolvedSeventh);
    assert_eq!(errors[0].locations, vec![NoteLocation::at(VoicePart::Soprano, 0)]);
}

#[test]
fn scenario_short_voice_part() {
    let tables = TheoryTables::builtin().unwrap();
    let key = Key::new(Tonic::A, Mode::Minor);
    let voices = VoiceSet::from_degrees([&[5, 5, 5, 3], &[3, 2], &[1, 7, 1, 1], &[1, 5, 5, 1]]);
    let errors = validate(&tables, key, &voices, &progression(&["i", "V", "V", "i"]));
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].kind, ViolationKind::IncompleteVoicePart);
    assert_eq!(errors[0].locations, vec![NoteLocation::at(VoicePart::Alto, 2)]);
}

#[test]
fn session_round_through_json() {
    let tables = TheoryTables::builtin().unwrap();
    let mut session = PracticeSession::start(&tables, &mut DrillRng::new(9));
    let len = session.progression().len();
    for voice in VoicePart::ALL {
        for _ in 0..len {
            assert!(session.place_note(voice, Note::from(1)));
        }
    }
    assert!(session.is_complete());

    let json = serde_json::to_string(&session).unwrap();
    let restored: PracticeSession = serde_json::from_str(&json).unwrap();
    assert_eq!(restored, session);

    // All-tonic voicing: the opening tonic chord lacks its third and fifth.
    let errors = restored.check(&tables);
    assert!(errors.iter().all(|e| !e.kind.is_structural()));
    assert_eq!(errors[0].kind, ViolationKind::MissingChordTone);
    assert_eq!(errors[0].locations, vec![NoteLocation::chord(0)]);
}

#[test]
fn incomplete_tables_are_refused_at_load() {
    let mut config = TableConfig::builtin();
    config
        .minor
        .chords_by_function
        .insert(HarmonicFunction::Predominant, Vec::new());
    let json = serde_json::to_string(&config).unwrap();
    assert!(matches!(
        TheoryTables::from_json(&json),
        Err(ConfigError::NoCandidates {
            mode: Mode::Minor,
            function: HarmonicFunction::Predominant,
        })
    ));
}

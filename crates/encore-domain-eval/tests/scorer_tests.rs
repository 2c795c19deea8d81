use encore_domain_chart::{MedleyWindow, Note, NoteType, Sentence, Voice};
use encore_domain_eval::{
    best_matching_note, pitch_matches, NoteSegmenter, PerformanceScorer, RecordedNote,
    ScorerConfig, SentenceRating,
};
use encore_ports::types::Difficulty;

fn note(kind: NoteType, start: i32, length: i32, midi: i32) -> Note {
    Note::new(kind, start, length, midi, "ah")
}

fn sung(midi: i32, start: f64, end: f64) -> RecordedNote {
    RecordedNote {
        midi_note: midi,
        start_beat: start,
        end_beat: end,
        start_millis: start * 500.0,
        end_millis: end * 500.0,
    }
}

fn scorer(sentences: Vec<Sentence>) -> PerformanceScorer {
    PerformanceScorer::new(&Voice::new("P1", sentences), ScorerConfig::default(), None)
}

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-6
}

#[test]
fn fully_sung_sentence_is_perfect() {
    let sentence = Sentence::new(1, vec![note(NoteType::Normal, 0, 4, 60)]);
    let mut scorer = scorer(vec![sentence.clone()]);
    let recorded = sung(60, 0.0, 4.0);

    let score = scorer
        .on_sentence_finished(&sentence, &[&recorded])
        .expect("scored");

    assert!(approx(score.percentage, 1.0));
    assert_eq!(score.rating, SentenceRating::Perfect);
    assert!(score.perfect);
    let snapshot = scorer.snapshot();
    assert!(approx(snapshot.normal_notes, 9000.0));
    assert!(approx(snapshot.perfect_sentence_bonus, 1000.0));
    assert!(approx(snapshot.total, 10_000.0));
    assert_eq!(scorer.current_rating(), Some(SentenceRating::Perfect));
}

#[test]
fn octave_does_not_matter() {
    let sentence = Sentence::new(1, vec![note(NoteType::Normal, 0, 4, 60)]);
    let mut scorer = scorer(vec![sentence.clone()]);
    let recorded = sung(48, 0.0, 2.0);

    let score = scorer
        .on_sentence_finished(&sentence, &[&recorded])
        .expect("scored");

    assert!(approx(score.percentage, 0.5));
    assert_eq!(score.rating, SentenceRating::Good);
    assert!(!score.perfect);
    assert!(approx(scorer.total_score(), 4500.0));
}

#[test]
fn golden_notes_weigh_double() {
    let sentence = Sentence::new(
        1,
        vec![note(NoteType::Normal, 0, 2, 60), note(NoteType::Golden, 2, 2, 62)],
    );
    let mut scorer = scorer(vec![sentence.clone()]);
    let recorded = sung(62, 2.0, 4.0);

    let score = scorer
        .on_sentence_finished(&sentence, &[&recorded])
        .expect("scored");

    assert!(approx(score.percentage, 4.0 / 6.0));
    assert_eq!(score.rating, SentenceRating::Great);
    assert!(approx(score.golden_notes, 6000.0));
    assert!(approx(score.normal_notes, 0.0));
    assert!(approx(scorer.snapshot().golden_notes, 6000.0));
}

#[test]
fn freestyle_and_rap_are_never_scored() {
    let free = Sentence::new(
        1,
        vec![note(NoteType::Freestyle, 0, 4, 60), note(NoteType::Rap, 4, 4, 60)],
    );
    let mixed = Sentence::new(
        2,
        vec![note(NoteType::Freestyle, 10, 4, 60), note(NoteType::Normal, 14, 2, 64)],
    );
    let mut scorer = scorer(vec![free.clone(), mixed.clone()]);

    assert!(scorer.on_sentence_finished(&free, &[]).is_none());

    let recorded = sung(64, 14.0, 16.0);
    let score = scorer
        .on_sentence_finished(&mixed, &[&recorded])
        .expect("scored");
    assert!(score.perfect);
    assert!(approx(scorer.total_score(), 10_000.0));
}

#[test]
fn unmatched_notes_score_zero() {
    let sentence = Sentence::new(1, vec![note(NoteType::Normal, 0, 4, 60)]);
    let mut scorer = scorer(vec![sentence.clone()]);
    let off_key = sung(61, 0.0, 4.0);

    let score = scorer
        .on_sentence_finished(&sentence, &[&off_key])
        .expect("scored");

    assert_eq!(score.rating, SentenceRating::Awful);
    assert_eq!(scorer.total_score(), 0.0);
}

#[test]
fn easier_difficulty_widens_pitch_window() {
    assert!(!pitch_matches(62, 60, Difficulty::Hard.pitch_tolerance()));
    assert!(!pitch_matches(62, 60, Difficulty::Medium.pitch_tolerance()));
    assert!(pitch_matches(62, 60, Difficulty::Easy.pitch_tolerance()));
    // B below C is one semitone away across the octave boundary.
    assert!(pitch_matches(59, 72, Difficulty::Medium.pitch_tolerance()));
}

#[test]
fn equal_overlap_prefers_earlier_note() {
    let authored = note(NoteType::Normal, 4, 4, 60);
    let late = sung(60, 6.0, 9.0);
    let early = sung(60, 3.0, 6.0);

    let best = best_matching_note(&authored, &[&late, &early], 0);

    assert_eq!(best, Some((1, 2.0)));
}

#[test]
fn larger_overlap_wins() {
    let authored = note(NoteType::Normal, 0, 8, 60);
    let short = sung(60, 0.0, 2.0);
    let long = sung(60, 3.0, 8.0);

    assert_eq!(best_matching_note(&authored, &[&short, &long], 0), Some((1, 5.0)));
}

#[test]
fn finished_sentence_is_not_scored_twice() {
    let sentence = Sentence::new(1, vec![note(NoteType::Normal, 0, 4, 60)]);
    let mut scorer = scorer(vec![sentence.clone()]);
    let recorded = sung(60, 0.0, 4.0);

    scorer.on_sentence_finished(&sentence, &[&recorded]);
    let total = scorer.total_score();

    assert!(scorer.on_sentence_finished(&sentence, &[&recorded]).is_none());
    assert_eq!(scorer.total_score(), total);
    assert_eq!(scorer.next_beat_to_score(), 4.0);
}

#[test]
fn forward_seek_skips_and_backward_seek_does_not_rescore() {
    let first = Sentence::new(1, vec![note(NoteType::Normal, 0, 4, 60)]);
    let second = Sentence::new(
        2,
        vec![note(NoteType::Normal, 8, 2, 60), note(NoteType::Normal, 12, 2, 60)],
    );
    let mut scorer = scorer(vec![first.clone(), second.clone()]);

    scorer.on_seek(11.0);
    let recorded = sung(60, 12.0, 14.0);
    let score = scorer
        .on_sentence_finished(&second, &[&recorded])
        .expect("scored");
    // Only the note after the seek target counts.
    assert!(score.perfect);

    scorer.on_seek(0.0);
    assert_eq!(scorer.next_beat_to_score(), 14.0);
    assert!(scorer.on_sentence_finished(&first, &[]).is_none());
}

#[test]
fn advance_to_scores_sentences_as_playback_passes_them() {
    let voice = Voice::new(
        "P1",
        vec![
            Sentence::new(1, vec![note(NoteType::Normal, 0, 4, 60)]),
            Sentence::new(2, vec![note(NoteType::Normal, 6, 4, 67)]),
        ],
    );
    let mut segmenter = NoteSegmenter::new(&voice, None);
    let mut scorer = PerformanceScorer::new(&voice, ScorerConfig::default(), None);

    let mut frame = 0;
    let mut beat = 0.0;
    let mut rated = Vec::new();
    while beat <= 11.0 {
        let midi = if beat <= 4.0 { 60 } else { 0 };
        segmenter.on_pitch_sample(midi, beat, beat * 500.0, frame);
        rated.extend(scorer.advance_to(beat, &segmenter));
        frame += 1;
        beat += 0.25;
    }

    let ratings: Vec<(u32, SentenceRating)> = rated.iter().map(|s| (s.sentence_id, s.rating)).collect();
    assert_eq!(
        ratings,
        vec![(1, SentenceRating::Perfect), (2, SentenceRating::Awful)]
    );
    assert!(approx(rated[0].percentage, 1.0));
    assert!(approx(scorer.snapshot().perfect_sentence_bonus, 500.0));
}

#[test]
fn medley_limits_the_score_budget() {
    let voice = Voice::new(
        "P1",
        vec![
            Sentence::new(1, vec![note(NoteType::Normal, 0, 4, 60)]),
            Sentence::new(2, vec![note(NoteType::Normal, 10, 4, 60)]),
        ],
    );
    let medley = MedleyWindow {
        start_beat: 10,
        end_beat: 14,
        start_millis: 5000.0,
        start_with_countdown_millis: 2000.0,
        end_millis: 7000.0,
    };
    let mut scorer = PerformanceScorer::new(&voice, ScorerConfig::default(), Some(medley));

    assert!(scorer.on_sentence_finished(&voice.sentences[0], &[]).is_none());
    let recorded = sung(60, 10.0, 14.0);
    scorer.on_sentence_finished(&voice.sentences[1], &[&recorded]);

    assert!(approx(scorer.total_score(), 10_000.0));
}

#[test]
fn rating_never_drops_as_percentage_rises() {
    let mut previous = SentenceRating::from_percentage(0.0);
    assert_eq!(previous, SentenceRating::Awful);
    for step in 1..=1000 {
        let rating = SentenceRating::from_percentage(step as f64 / 1000.0);
        assert!(rating >= previous);
        previous = rating;
    }
    assert_eq!(previous, SentenceRating::Perfect);
    assert_eq!(SentenceRating::from_percentage(0.8), SentenceRating::Cool);
    assert_eq!(SentenceRating::from_percentage(0.7999), SentenceRating::Great);
}

#[test]
fn finish_rates_the_sentence_playback_stopped_on() {
    let voice = Voice::new("P1", vec![Sentence::new(1, vec![note(NoteType::Normal, 0, 4, 60)])]);
    let mut segmenter = NoteSegmenter::new(&voice, None);
    let mut scorer = PerformanceScorer::new(&voice, ScorerConfig::default(), None);

    for (frame, beat) in [0.0, 1.0, 2.0, 3.0, 4.0].into_iter().enumerate() {
        segmenter.on_pitch_sample(60, beat, beat * 500.0, frame as i64);
    }
    // Playback ends exactly on the sentence end, so no beat ever passes it.
    assert!(scorer.advance_to(4.0, &segmenter).is_empty());

    let rated = scorer.finish(&segmenter);

    assert_eq!(rated.len(), 1);
    assert_eq!(rated[0].rating, SentenceRating::Perfect);
    assert!(scorer.finish(&segmenter).is_empty());
}

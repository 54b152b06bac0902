//! End-to-end judgement scenarios against small hand-written charts.

use std::sync::Arc;

use rand::{rngs::StdRng, Rng, SeedableRng};
use rhythm_chart::analysis::onset::Peak;
use rhythm_chart::chart::{ChartGenerator, NoteChart};
use rhythm_chart::config::{ChartConfig, DifficultyProfile, JudgementConfig};
use rhythm_chart::judgement::{Grade, JudgementEngine, MissCause, NoteState, PressOutcome};

fn engine_for(json: &str) -> JudgementEngine {
    let chart = NoteChart::from_json(json).expect("valid chart");
    JudgementEngine::new(Arc::new(chart), JudgementConfig::default())
}

#[test]
fn scenario_a_exact_press_scores_perfect() {
    let mut engine =
        engine_for(r#"{"laneCount":4,"notes":[{"id":0,"time":1.0,"lane":0,"kind":"normal"}]}"#);
    match engine.on_press(0, 1.000) {
        PressOutcome::Hit(outcome) => {
            assert_eq!(outcome.grade, Grade::Perfect);
            assert_eq!(outcome.score_delta, 100);
            assert_eq!(outcome.combo, 1);
        }
        other => panic!("expected a hit, got {:?}", other),
    }
    assert_eq!(engine.stats().score, 100);
}

#[test]
fn scenario_b_late_press_scores_good() {
    let mut engine =
        engine_for(r#"{"laneCount":4,"notes":[{"id":0,"time":1.0,"lane":0,"kind":"normal"}]}"#);
    match engine.on_press(0, 1.09) {
        PressOutcome::Hit(outcome) => {
            assert_eq!(outcome.grade, Grade::Good);
            assert_eq!(outcome.score_delta, 40);
        }
        other => panic!("expected a hit, got {:?}", other),
    }
}

#[test]
fn scenario_c_hold_completed_on_release() {
    let mut engine = engine_for(
        r#"{"laneCount":4,"notes":[{"id":0,"time":2.0,"lane":0,"kind":"hold","duration":1.0}]}"#,
    );
    assert!(matches!(engine.on_press(0, 2.02), PressOutcome::HoldStarted(_)));
    assert!(matches!(engine.note_state(0), Some(NoteState::Holding)));

    let outcomes = engine.on_release(0, 3.01);
    assert_eq!(outcomes.len(), 1);
    assert_eq!(outcomes[0].grade, Grade::Perfect);
}

#[test]
fn scenario_d_early_release_breaks_combo() {
    let mut engine = engine_for(
        r#"{"laneCount":4,"notes":[
            {"id":0,"time":1.0,"lane":1,"kind":"normal"},
            {"id":1,"time":2.0,"lane":0,"kind":"hold","duration":1.0}]}"#,
    );
    assert!(matches!(engine.on_press(1, 1.0), PressOutcome::Hit(_)));
    assert_eq!(engine.stats().combo, 1);

    engine.on_press(0, 2.0);
    let outcomes = engine.on_release(0, 2.5);
    assert_eq!(outcomes.len(), 1);
    assert_eq!(outcomes[0].grade, Grade::Miss);
    assert_eq!(outcomes[0].cause, Some(MissCause::EarlyRelease));
    assert_eq!(engine.stats().combo, 0);
}

#[test]
fn scenario_e_untouched_note_expires() {
    let mut engine =
        engine_for(r#"{"laneCount":4,"notes":[{"id":0,"time":5.0,"lane":3,"kind":"normal"}]}"#);
    let outcomes = engine.tick(5.25);
    assert_eq!(outcomes.len(), 1);
    assert_eq!(outcomes[0].grade, Grade::Miss);
    assert_eq!(engine.stats().counts.miss, 1);
    assert!(engine.tick(5.25).is_empty());
}

#[test]
fn scenario_f_close_peaks_get_distinct_lanes_or_drop() {
    let config = ChartConfig::default();
    let peaks = [
        Peak {
            time: 3.0,
            energy: 0.2,
            zcr: 0.1,
            intensity: 2.0,
        },
        Peak {
            time: 3.05,
            energy: 0.2,
            zcr: 0.1,
            intensity: 2.0,
        },
    ];
    for seed in 0..100 {
        let mut generator = ChartGenerator::new(
            DifficultyProfile::HARD,
            &config,
            StdRng::seed_from_u64(seed),
        );
        let (chart, _) = generator.generate(&peaks, 1.0);
        if let [a, b] = chart.notes() {
            assert_ne!(
                a.lane, b.lane,
                "seed {} placed both peaks in one lane",
                seed
            );
        }
    }
}

#[test]
fn random_input_keeps_score_monotonic_and_resolves_once() {
    let chart = {
        let config = ChartConfig::default();
        let peaks: Vec<Peak> = (0..120)
            .map(|i| Peak {
                time: 1.0 + i as f64 * 0.15,
                energy: 1.0,
                zcr: 0.2,
                intensity: 3.0,
            })
            .collect();
        let mut generator =
            ChartGenerator::new(DifficultyProfile::HARD, &config, StdRng::seed_from_u64(8));
        Arc::new(generator.generate(&peaks, 0.2).0)
    };

    let mut engine = JudgementEngine::new(chart.clone(), JudgementConfig::default());
    let mut rng = StdRng::seed_from_u64(77);
    let mut last_score = 0;
    let mut resolved_ids = std::collections::HashSet::new();
    let mut now = 0.0;

    while now < chart.last_time() + 1.0 {
        now += 1.0 / 60.0;
        let mut outcomes = Vec::new();
        if rng.gen_bool(0.4) {
            let lane = rng.gen_range(0..chart.lane_count());
            if let PressOutcome::Hit(outcome) = engine.on_press(lane, now) {
                outcomes.push(outcome);
            }
        }
        if rng.gen_bool(0.2) {
            outcomes.extend(engine.on_release(rng.gen_range(0..chart.lane_count()), now));
        }
        outcomes.extend(engine.tick(now));

        for outcome in outcomes {
            assert!(
                resolved_ids.insert(outcome.note_id),
                "note {} resolved twice",
                outcome.note_id
            );
            if outcome.grade == Grade::Miss {
                assert_eq!(outcome.combo, 0, "miss must reset combo");
            }
        }
        let stats = engine.stats();
        assert!(stats.score >= last_score, "score decreased");
        assert!(stats.max_combo >= stats.combo);
        last_score = stats.score;
    }

    let stats = engine.stats();
    assert!(stats.is_complete(), "{:?}", stats);
    assert_eq!(resolved_ids.len(), chart.len());
}

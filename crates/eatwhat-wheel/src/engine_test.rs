use eatwhat_core::{Candidate, GeoPoint};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rust_decimal::Decimal;

use super::*;

fn candidate(id: i64, name: &str) -> Candidate {
    Candidate {
        id,
        name: name.to_string(),
        address: format!("{name} Rd"),
        category_id: 1,
        rating: Decimal::new(45, 1),
        price_label: "￥40".to_string(),
        tags: Vec::new(),
        image_url: None,
        description: "restaurant".to_string(),
        location: GeoPoint::new(31.23, 121.47),
        distance_meters: None,
    }
}

fn pool(names: &[&str]) -> Vec<Candidate> {
    names
        .iter()
        .zip(1_i64..)
        .map(|(name, id)| candidate(id, name))
        .collect()
}

fn spin_and_land(engine: &mut SelectionEngine, rng: &mut StdRng) -> Candidate {
    engine.spin(rng).expect("spin should start");
    engine.complete_spin().cloned().expect("spin should land")
}

#[test]
fn spin_lands_on_the_drawn_index() {
    let mut engine = SelectionEngine::new(pool(&["A", "B", "C", "D"]));
    let mut rng = StdRng::seed_from_u64(11);

    let request = engine.spin(&mut rng).unwrap();
    assert_eq!(request.pool_size, 4);
    assert!(matches!(engine.state(), EngineState::Spinning { .. }));

    let chosen = engine.complete_spin().cloned().unwrap();
    assert_eq!(chosen, engine.eligible()[request.target_index].clone());
    assert!(matches!(engine.state(), EngineState::AwaitingDecision { .. }));
}

#[test]
fn requests_out_of_state_are_no_ops() {
    let mut engine = SelectionEngine::new(pool(&["A", "B", "C"]));
    let mut rng = StdRng::seed_from_u64(1);

    assert!(engine.complete_spin().is_none());
    assert!(engine.confirm().is_none());
    assert_eq!(engine.reject(&mut rng), RejectOutcome::Ignored);
    assert_eq!(engine.state(), &EngineState::Idle);

    engine.spin(&mut rng).unwrap();
    let spinning = engine.state().clone();
    assert!(engine.spin(&mut rng).is_none());
    assert!(engine.confirm().is_none());
    assert_eq!(engine.reject(&mut rng), RejectOutcome::Ignored);
    assert!(!engine.restore());
    assert!(!engine.replace_pool(pool(&["X"])));
    assert_eq!(engine.state(), &spinning);
    assert!(engine.session().excluded_ids.is_empty());
}

#[test]
fn empty_pool_never_spins() {
    let mut engine = SelectionEngine::new(Vec::new());
    let mut rng = StdRng::seed_from_u64(2);
    assert!(engine.spin(&mut rng).is_none());
    assert_eq!(engine.state(), &EngineState::Idle);
    assert!(!engine.low_pool());
}

#[test]
fn confirm_emits_result_and_starts_a_new_session() {
    let mut engine = SelectionEngine::new(pool(&["A", "B", "C", "D"]));
    let mut rng = StdRng::seed_from_u64(3);
    let first_session = engine.session().id;

    let first = spin_and_land(&mut engine, &mut rng);
    let RejectOutcome::Respin(_) = engine.reject(&mut rng) else {
        panic!("expected a respin");
    };
    let second = engine.complete_spin().cloned().unwrap();
    assert_ne!(first.id, second.id);

    let confirmation = engine.confirm().unwrap();
    assert_eq!(confirmation.candidate, second);
    assert_eq!(confirmation.session_id, first_session);
    assert_eq!(confirmation.rejected, 1);

    assert_eq!(engine.state(), &EngineState::Idle);
    assert_ne!(engine.session().id, first_session);
    assert!(engine.session().excluded_ids.is_empty());
    assert_eq!(engine.remaining(), 4);
}

#[test]
fn rejected_candidates_never_come_back_before_restoration() {
    let mut engine = SelectionEngine::new(pool(&["A", "B", "C", "D", "E", "F"]));
    let mut rng = StdRng::seed_from_u64(4);
    let mut seen = Vec::new();

    let mut chosen = spin_and_land(&mut engine, &mut rng);
    loop {
        assert!(!seen.contains(&chosen.id), "{} repeated", chosen.name);
        seen.push(chosen.id);
        match engine.reject(&mut rng) {
            RejectOutcome::Respin(request) => {
                assert_eq!(request.pool_size, 6 - seen.len());
                chosen = engine.complete_spin().cloned().unwrap();
            }
            RejectOutcome::Restored { pool_size } => {
                assert_eq!(pool_size, 6);
                break;
            }
            RejectOutcome::Ignored => panic!("reject ignored while awaiting decision"),
        }
    }
    // five rejections leave one candidate, which triggers the restore
    assert_eq!(seen.len(), 5);
}

#[test]
fn rejecting_down_to_one_restores_the_full_pool_without_spinning() {
    let mut engine = SelectionEngine::new(pool(&["A", "B", "C"]));
    let mut rng = StdRng::seed_from_u64(5);

    spin_and_land(&mut engine, &mut rng);
    let RejectOutcome::Respin(request) = engine.reject(&mut rng) else {
        panic!("expected a respin with two left");
    };
    assert_eq!(request.pool_size, 2);
    engine.complete_spin().unwrap();

    assert_eq!(
        engine.reject(&mut rng),
        RejectOutcome::Restored { pool_size: 3 }
    );
    assert_eq!(engine.state(), &EngineState::Idle);
    assert!(engine.session().excluded_ids.is_empty());
    assert_eq!(engine.eligible().len(), 3);
}

#[test]
fn two_candidate_pool_restores_on_first_reject() {
    let mut engine = SelectionEngine::new(pool(&["A", "B"]));
    let mut rng = StdRng::seed_from_u64(6);
    spin_and_land(&mut engine, &mut rng);
    assert_eq!(
        engine.reject(&mut rng),
        RejectOutcome::Restored { pool_size: 2 }
    );
}

#[test]
fn low_pool_and_manual_restore() {
    let mut engine = SelectionEngine::new(pool(&["A", "B", "C"]));
    engine.session.excluded_ids.extend([1, 2]);
    assert!(engine.low_pool());
    assert_eq!(engine.eligible().len(), 1);

    assert!(engine.restore());
    assert!(!engine.low_pool());
    assert_eq!(engine.remaining(), 3);
}

#[test]
fn eligible_preserves_original_order() {
    let mut engine = SelectionEngine::new(pool(&["A", "B", "C", "D"]));
    engine.session.excluded_ids.insert(2);
    let names: Vec<&str> = engine.eligible().iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, ["A", "C", "D"]);
}

#[test]
fn replace_pool_discards_a_pending_result() {
    let mut engine = SelectionEngine::new(pool(&["A", "B", "C"]));
    let mut rng = StdRng::seed_from_u64(7);
    spin_and_land(&mut engine, &mut rng);

    assert!(engine.replace_pool(pool(&["X", "Y"])));
    assert_eq!(engine.state(), &EngineState::Idle);
    assert_eq!(engine.remaining(), 2);
}

#[test]
fn duplicate_ids_are_dropped() {
    let engine = SelectionEngine::new(vec![candidate(1, "A"), candidate(1, "A2"), candidate(2, "B")]);
    let names: Vec<&str> = engine.eligible().iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, ["A", "B"]);
}

#[test]
fn cancel_spin_returns_to_idle_without_a_result() {
    let mut engine = SelectionEngine::new(pool(&["A", "B"]));
    let mut rng = StdRng::seed_from_u64(8);
    engine.spin(&mut rng).unwrap();
    assert!(engine.cancel_spin());
    assert!(!engine.cancel_spin());
    assert!(engine.complete_spin().is_none());
    assert_eq!(engine.state(), &EngineState::Idle);
}

#[test]
fn selection_frequency_converges_to_uniform() {
    const SPINS: u32 = 60_000;
    let mut engine = SelectionEngine::new(pool(&["A", "B", "C", "D", "E"]));
    let mut rng = StdRng::seed_from_u64(2024);
    let mut counts = [0u32; 5];

    for _ in 0..SPINS {
        let chosen = spin_and_land(&mut engine, &mut rng);
        counts[usize::try_from(chosen.id - 1).unwrap()] += 1;
        engine.confirm().unwrap();
    }

    for (i, count) in counts.iter().enumerate() {
        let freq = f64::from(*count) / f64::from(SPINS);
        assert!((freq - 0.2).abs() < 0.01, "candidate {i}: frequency {freq}");
    }
}

#[test]
fn respins_sample_the_reduced_pool_uniformly() {
    const ROUNDS: u32 = 30_000;
    let mut rng = StdRng::seed_from_u64(77);
    let mut counts = [0u32; 4];

    for _ in 0..ROUNDS {
        let mut engine = SelectionEngine::new(pool(&["A", "B", "C", "D"]));
        engine.session.excluded_ids.insert(1);
        let chosen = spin_and_land(&mut engine, &mut rng);
        counts[usize::try_from(chosen.id - 1).unwrap()] += 1;
    }

    assert_eq!(counts[0], 0);
    for count in &counts[1..] {
        let freq = f64::from(*count) / f64::from(ROUNDS);
        assert!((freq - 1.0 / 3.0).abs() < 0.015, "frequency {freq}");
    }
}

use irc_engine::prelude::*;
use irc_engine::simulation::{RiskLevel, STAGES};
use irc_engine::types::StageStatus;
use irc_test_utils::{builtin_catalog, test_config, SIMULATION_MS};
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use std::time::Duration;

fn recommendations(id: &str) -> Vec<String> {
    builtin_catalog().get(id).unwrap().recommendations().to_vec()
}

fn engine() -> SimulationEngine {
    SimulationEngine::new(builtin_catalog(), &test_config())
}

#[tokio::test(start_paused = true)]
async fn test_first_two_failover_strategies_are_low_risk() {
    let recs = recommendations("INC-2024-001");
    assert_eq!(recs.len(), 5);

    let result = engine().simulate(recs[..2].to_vec()).await.unwrap();
    assert!((result.success_probability - 92.95).abs() < 1e-9);
    assert_eq!(result.risk_level, RiskLevel::Low);
    assert_eq!(result.strategies.len(), 2);
    assert_eq!(result.strategies[0].title, "Immediate Failover Strategy");
    assert_eq!(result.strategies[0].confidence, 94.7);
    assert_eq!(result.strategies[1].confidence, 91.2);
}

#[tokio::test(start_paused = true)]
async fn test_run_takes_the_sum_of_stage_durations() {
    let engine = engine();
    let start = tokio::time::Instant::now();
    engine
        .simulate(recommendations("INC-2024-003")[..1].to_vec())
        .await
        .unwrap();
    let elapsed = start.elapsed();
    assert!(elapsed >= Duration::from_millis(SIMULATION_MS));
    assert!(elapsed < Duration::from_millis(SIMULATION_MS + 50));

    let snapshot = engine.snapshot();
    assert!(!snapshot.is_running);
    assert!(snapshot
        .steps
        .iter()
        .all(|s| s.status == StageStatus::Completed));
    assert!(snapshot.result.is_some());
}

#[tokio::test(start_paused = true)]
async fn test_stages_run_one_at_a_time_in_order() {
    let engine = engine();
    let handle = {
        let engine = engine.clone();
        let selected = recommendations("INC-2024-002")[..3].to_vec();
        tokio::spawn(async move { engine.simulate(selected).await })
    };

    let mut seen = Vec::new();
    for _ in 0..(SIMULATION_MS / 100) {
        tokio::time::sleep(Duration::from_millis(100)).await;
        let snapshot = engine.snapshot();
        if !snapshot.is_running {
            break;
        }
        let running: Vec<_> = snapshot
            .steps
            .iter()
            .filter(|s| s.status == StageStatus::Running)
            .collect();
        assert!(running.len() <= 1);
        if let Some(step) = snapshot.running_step() {
            // Everything before the running stage is done, nothing after started
            for other in &snapshot.steps {
                let expected = match other.id.cmp(&step.id) {
                    std::cmp::Ordering::Less => StageStatus::Completed,
                    std::cmp::Ordering::Equal => StageStatus::Running,
                    std::cmp::Ordering::Greater => StageStatus::Pending,
                };
                assert_eq!(other.status, expected);
            }
            if seen.last() != Some(&step.id) {
                seen.push(step.id);
            }
        }
    }
    assert_eq!(seen, (1..=STAGES.len()).collect::<Vec<_>>());
    handle.await.unwrap().unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_second_run_is_rejected_while_running() {
    let engine = engine();
    let selected = recommendations("INC-2024-001")[..1].to_vec();
    let first = {
        let engine = engine.clone();
        let selected = selected.clone();
        tokio::spawn(async move { engine.simulate(selected).await })
    };
    tokio::time::sleep(Duration::from_millis(10)).await;
    assert!(engine.is_running());

    let err = engine.simulate(selected).await.unwrap_err();
    assert!(matches!(
        err,
        EngineError::Validation(ValidationError::SimulationRunning)
    ));
    assert!(first.await.unwrap().is_ok());
}

#[tokio::test(start_paused = true)]
async fn test_new_run_clears_previous_result() {
    let engine = engine();
    engine
        .simulate(recommendations("INC-2024-004")[..1].to_vec())
        .await
        .unwrap();
    assert!(engine.result().is_some());

    let rerun = {
        let engine = engine.clone();
        let selected = recommendations("INC-2024-004")[1..3].to_vec();
        tokio::spawn(async move { engine.simulate(selected).await })
    };
    tokio::time::sleep(Duration::from_millis(10)).await;
    assert!(engine.result().is_none());
    let result = rerun.await.unwrap().unwrap();
    assert_eq!(engine.result(), Some(result));
}

#[tokio::test(start_paused = true)]
async fn test_reset_cancels_a_running_simulation() {
    let engine = engine();
    let handle = {
        let engine = engine.clone();
        let selected = recommendations("INC-2024-001")[..2].to_vec();
        tokio::spawn(async move { engine.simulate(selected).await })
    };
    tokio::time::sleep(Duration::from_millis(1_500)).await;
    engine.reset();

    let err = handle.await.unwrap().unwrap_err();
    assert!(err.is_stale());

    let snapshot = engine.snapshot();
    assert!(!snapshot.is_running);
    assert!(snapshot.steps.is_empty());
    assert!(snapshot.result.is_none());

    // Late timers must not resurrect any stage
    tokio::time::sleep(Duration::from_millis(SIMULATION_MS)).await;
    assert_eq!(engine.snapshot(), snapshot);
}

#[tokio::test(start_paused = true)]
async fn test_simulate_dropped_by_timeout_releases_the_engine() {
    let engine = engine();
    let selected = recommendations("INC-2024-001")[..2].to_vec();
    let timed_out =
        tokio::time::timeout(Duration::from_millis(500), engine.simulate(selected.clone())).await;
    assert!(timed_out.is_err());

    let snapshot = engine.snapshot();
    assert!(!snapshot.is_running);
    assert!(snapshot.steps.is_empty());
    assert!(engine.simulate(selected).await.is_ok());
}

proptest! {
    #[test]
    fn prop_success_probability_is_mean_confidence(
        picks in prop::sample::subsequence((0..5usize).collect::<Vec<_>>(), 1..=5)
    ) {
        let catalog = builtin_catalog();
        let recs = catalog.get("INC-2024-001").unwrap().recommendations().to_vec();
        let selected: Vec<String> = picks.iter().map(|&i| recs[i].clone()).collect();

        let result = SimulationResult::compute(&catalog, &selected);
        let confidences: Vec<f64> = selected
            .iter()
            .map(|t| catalog.strategy_details(t).confidence)
            .collect();
        let mean = confidences.iter().sum::<f64>() / confidences.len() as f64;

        prop_assert!((result.success_probability - mean).abs() < 1e-9);
        prop_assert_eq!(result.risk_level, RiskLevel::from_confidence(mean));
        prop_assert!(confidences.iter().cloned().fold(f64::INFINITY, f64::min) <= mean + 1e-9);
        prop_assert_eq!(result.strategies.len(), selected.len());
    }
}

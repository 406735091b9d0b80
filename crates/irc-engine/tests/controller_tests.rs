//! Detail-view flows across all three engines

use irc_engine::prelude::*;
use irc_engine::types::NoticeLevel;
use irc_test_utils::{
    builtin_catalog, catalog_of, controller_for, controller_with, AlertBuilder, ASSEMBLY_MS,
};
use pretty_assertions::assert_eq;
use std::time::Duration;

async fn assembled(alert_id: &str) -> IncidentDetailController {
    let ctrl = controller_for(alert_id);
    ctrl.initiate_war_room().unwrap();
    ctrl.assemble_bridge().unwrap();
    ctrl.war_room().wait_for_phase(WarRoomPhase::Active).await;
    ctrl
}

fn select_first(ctrl: &IncidentDetailController, n: usize) {
    for text in ctrl.war_room_candidates().iter().take(n) {
        assert!(ctrl.toggle_strategy(text).unwrap());
    }
}

#[tokio::test(start_paused = true)]
async fn test_full_drill() {
    let ctrl = assembled("INC-2024-001").await;
    select_first(&ctrl, 2);

    let result = ctrl.simulate().await.unwrap().unwrap();
    assert!((result.success_probability - 92.95).abs() < 1e-9);

    ctrl.end_war_room().unwrap();
    let view = ctrl.view_state();
    assert_eq!(view.tab, Tab::Decision);
    assert_eq!(view.war_room_results, Some(result));
    assert_eq!(view.war_room.phase, WarRoomPhase::Idle);
    assert!(view.can_execute());

    let metrics = ctrl.execute_strategies().await.unwrap().unwrap();
    assert_eq!(metrics.service_restoration, 97.3);
    assert_eq!(ctrl.tab(), Tab::Execution);

    let messages: Vec<String> = ctrl.take_notices().iter().map(|n| n.message.clone()).collect();
    assert_eq!(
        messages,
        [
            "Starting strategy simulation...",
            "Simulation complete!",
            "War Room session has ended. View your simulation results in the Decision tab.",
            "Execution complete! View Impact tab for results.",
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn test_ending_without_a_simulation_keeps_no_results() {
    let ctrl = assembled("INC-2024-002").await;
    ctrl.end_war_room().unwrap();

    let view = ctrl.view_state();
    assert_eq!(view.tab, Tab::Decision);
    assert!(view.war_room_results.is_none());
    assert!(!view.can_execute());

    let err = ctrl.execute_strategies().await.unwrap_err();
    assert!(matches!(
        err,
        EngineError::Validation(ValidationError::NoWarRoomResults)
    ));
    assert!(!ctrl.execution().is_running());
}

#[tokio::test(start_paused = true)]
async fn test_execute_switches_tab_before_the_run_finishes() {
    let ctrl = assembled("INC-2024-004").await;
    select_first(&ctrl, 1);
    ctrl.simulate().await.unwrap();
    ctrl.end_war_room().unwrap();

    let run = {
        let ctrl = ctrl.clone();
        tokio::spawn(async move { ctrl.execute_strategies().await })
    };
    tokio::time::sleep(Duration::from_millis(10)).await;
    assert_eq!(ctrl.tab(), Tab::Execution);
    assert!(ctrl.view_state().execution.is_running);
    assert!(!ctrl.view_state().can_execute());

    assert!(run.await.unwrap().unwrap().is_some());
}

#[tokio::test(start_paused = true)]
async fn test_reset_simulation_is_idempotent() {
    let ctrl = assembled("INC-2024-003").await;
    select_first(&ctrl, 2);
    ctrl.simulate().await.unwrap();
    ctrl.end_war_room().unwrap();

    ctrl.reset_simulation();
    let once = ctrl.view_state();
    ctrl.reset_simulation();
    let twice = ctrl.view_state();

    assert_eq!(once, twice);
    assert!(twice.selected_strategies.is_empty());
    assert!(twice.war_room_results.is_none());
    assert!(twice.simulation.result.is_none());
}

#[tokio::test(start_paused = true)]
async fn test_simulate_with_nothing_selected_notifies() {
    let ctrl = controller_for("INC-2024-001");
    let err = ctrl.simulate().await.unwrap_err();
    assert!(matches!(
        err,
        EngineError::Validation(ValidationError::NoStrategiesSelected)
    ));
    let notices = ctrl.take_notices();
    assert_eq!(
        notices,
        [Notice::error("Please select at least one strategy to simulate")]
    );
    assert_eq!(notices[0].level, NoticeLevel::Error);
}

#[tokio::test(start_paused = true)]
async fn test_minimized_war_room_keeps_running() {
    let ctrl = controller_for("INC-2024-001");
    ctrl.initiate_war_room().unwrap();
    ctrl.assemble_bridge().unwrap();
    ctrl.minimize_war_room().unwrap();

    // Still assembling: nothing to show in the indicator yet
    assert_eq!(ctrl.view_state().minimized_indicator(), None);
    assert!(ctrl.restore_war_room());
    assert!(ctrl.view_state().war_room_open);
    assert!(!ctrl.restore_war_room());
    ctrl.minimize_war_room().unwrap();

    tokio::time::sleep(Duration::from_millis(ASSEMBLY_MS + 4_500)).await;
    let view = ctrl.view_state();
    assert!(!view.war_room_open);
    assert_eq!(view.minimized_indicator(), Some(4));

    assert!(ctrl.restore_war_room());
    let view = ctrl.view_state();
    assert!(view.war_room_open);
    assert_eq!(view.minimized_indicator(), None);
}

#[tokio::test(start_paused = true)]
async fn test_initiate_is_rejected_while_assembling() {
    let ctrl = controller_for("INC-2024-001");
    ctrl.initiate_war_room().unwrap();
    ctrl.assemble_bridge().unwrap();
    assert!(matches!(
        ctrl.initiate_war_room(),
        Err(EngineError::Validation(ValidationError::WarRoomInProgress))
    ));
    assert!(ctrl.assemble_bridge().is_err());
    assert_eq!(ctrl.take_notices().len(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_selecting_another_alert_discards_everything() {
    let ctrl = assembled("INC-2024-001").await;
    select_first(&ctrl, 2);
    let sim = {
        let ctrl = ctrl.clone();
        tokio::spawn(async move { ctrl.simulate().await })
    };
    tokio::time::sleep(Duration::from_millis(500)).await;
    ctrl.take_action("Approve Failover");

    ctrl.select_alert("INC-2024-003").unwrap();
    assert_eq!(sim.await.unwrap().unwrap(), None);

    let view = ctrl.view_state();
    assert_eq!(view.alert_id.as_str(), "INC-2024-003");
    assert_eq!(view.tab, Tab::default());
    assert_eq!(view.war_room.phase, WarRoomPhase::Idle);
    assert!(view.war_room.log.is_empty());
    assert!(view.selected_strategies.is_empty());
    assert!(view.actions_taken.is_empty());
    assert!(!view.simulation.is_running);
    assert!(view.simulation.steps.is_empty());

    tokio::time::sleep(Duration::from_millis(ASSEMBLY_MS)).await;
    assert_eq!(ctrl.view_state(), view);
}

#[tokio::test(start_paused = true)]
async fn test_reselecting_the_same_alert_is_a_noop() {
    let ctrl = controller_for("INC-2024-002");
    ctrl.set_tab(Tab::Ai);
    select_first(&ctrl, 1);
    ctrl.select_alert("INC-2024-002").unwrap();
    assert_eq!(ctrl.tab(), Tab::Ai);
    assert_eq!(ctrl.selected_strategies().len(), 1);
}

#[test]
fn test_unknown_strategy_falls_back_to_defaults() {
    let ctrl = controller_for("INC-2024-001");
    let details = ctrl.open_deep_dive("Unknown untested strategy text");
    assert_eq!(details.confidence, 90.0);
    assert_eq!(details.resolution_path.len(), 4);
    assert_eq!(builtin_catalog().strategy_details("Unknown untested strategy text").confidence, 90.0);
}

#[tokio::test(start_paused = true)]
async fn test_hand_built_alert_simulates_on_defaults() {
    let catalog = catalog_of(vec![AlertBuilder::new("INC-2099-001")
        .title("Synthetic outage")
        .recommendation("Restart the widget fleet")
        .recommendation("Drain the east queue")
        .build()]);
    let ctrl = controller_with(catalog, "INC-2099-001");
    assert_eq!(ctrl.war_room_candidates().len(), 2);

    ctrl.toggle_strategy("Drain the east queue").unwrap();
    let result = ctrl.simulate().await.unwrap().unwrap();
    assert_eq!(result.success_probability, 90.0);
    assert_eq!(result.strategies[0].title, "Drain the east queue...");
}

#[tokio::test(start_paused = true)]
async fn test_restore_is_refused_once_the_war_room_ended() {
    let ctrl = assembled("INC-2024-002").await;
    ctrl.minimize_war_room().unwrap();
    ctrl.end_war_room().unwrap();
    assert!(!ctrl.restore_war_room());
    assert!(!ctrl.view_state().war_room_open);
}

#[tokio::test(start_paused = true)]
async fn test_abandoned_simulation_does_not_block_the_next_one() {
    let ctrl = controller_for("INC-2024-001");
    select_first(&ctrl, 2);

    let timed_out = tokio::time::timeout(Duration::from_millis(500), ctrl.simulate()).await;
    assert!(timed_out.is_err());
    tokio::time::sleep(Duration::from_secs(60)).await;

    let view = ctrl.view_state();
    assert!(!view.simulation.is_running);
    assert!(view.simulation.running_step().is_none());
    let result = ctrl.simulate().await.unwrap().unwrap();
    assert!((result.success_probability - 92.95).abs() < 1e-9);
}

#[tokio::test(start_paused = true)]
async fn test_abandoned_execution_does_not_block_the_next_one() {
    let ctrl = assembled("INC-2024-004").await;
    select_first(&ctrl, 1);
    ctrl.simulate().await.unwrap();
    ctrl.end_war_room().unwrap();

    let timed_out =
        tokio::time::timeout(Duration::from_millis(500), ctrl.execute_strategies()).await;
    assert!(timed_out.is_err());
    tokio::time::sleep(Duration::from_secs(60)).await;

    let view = ctrl.view_state();
    assert!(!view.execution.is_running);
    assert!(view.can_execute());
    let metrics = ctrl.execute_strategies().await.unwrap().unwrap();
    assert_eq!(metrics.service_restoration, 97.3);
}

#[tokio::test(start_paused = true)]
async fn test_rejected_simulation_posts_no_start_notice() {
    let ctrl = controller_for("INC-2024-001");
    select_first(&ctrl, 1);
    let _busy = ctrl.simulation().start(ctrl.selected_strategies()).unwrap();

    let err = ctrl.simulate().await.unwrap_err();
    assert!(matches!(
        err,
        EngineError::Validation(ValidationError::SimulationRunning)
    ));
    assert_eq!(
        ctrl.take_notices(),
        [Notice::error("A simulation is already running")]
    );
}

#[tokio::test(start_paused = true)]
async fn test_rejected_execution_keeps_the_current_tab() {
    let ctrl = assembled("INC-2024-003").await;
    select_first(&ctrl, 1);
    ctrl.simulate().await.unwrap();
    ctrl.end_war_room().unwrap();
    ctrl.take_notices();
    let _busy = ctrl.execution().start().unwrap();

    let err = ctrl.execute_strategies().await.unwrap_err();
    assert!(matches!(
        err,
        EngineError::Validation(ValidationError::ExecutionRunning)
    ));
    assert_eq!(ctrl.tab(), Tab::Decision);
    assert_eq!(ctrl.take_notices().len(), 1);
}

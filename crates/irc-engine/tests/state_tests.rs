use irc_engine::state_machine::{is_terminal, validate_transition, Lifecycle};
use irc_engine::types::{AgentStatus, ParticipantStatus, StageStatus, WarRoomPhase};
use proptest::prelude::*;

fn rank<S: Lifecycle>(state: S) -> usize {
    S::ALL.iter().position(|s| *s == state).unwrap()
}

fn check_table<S: Lifecycle>(from: S, to: S) {
    let res = validate_transition(from, to);
    let allowed = from.allowed_transitions();
    if res.is_ok() {
        assert!(allowed.contains(&to));
    } else {
        assert!(!allowed.contains(&to));
    }
}

#[test]
fn test_war_room_forward_path() {
    assert!(validate_transition(WarRoomPhase::Idle, WarRoomPhase::Open).is_ok());
    assert!(validate_transition(WarRoomPhase::Open, WarRoomPhase::Assembling).is_ok());
    assert!(validate_transition(WarRoomPhase::Assembling, WarRoomPhase::Active).is_ok());

    // No skipping the calling sequence
    assert!(validate_transition(WarRoomPhase::Idle, WarRoomPhase::Assembling).is_err());
    assert!(validate_transition(WarRoomPhase::Open, WarRoomPhase::Active).is_err());
}

#[test]
fn test_every_war_room_phase_can_return_to_idle_except_idle() {
    for phase in WarRoomPhase::ALL {
        let ok = validate_transition(*phase, WarRoomPhase::Idle).is_ok();
        assert_eq!(ok, *phase != WarRoomPhase::Idle, "{phase:?}");
    }
}

#[test]
fn test_terminal_states() {
    assert!(is_terminal(ParticipantStatus::Joined));
    assert!(is_terminal(StageStatus::Completed));
    assert!(!is_terminal(AgentStatus::Completed));
    assert!(!is_terminal(WarRoomPhase::Active));
}

proptest! {
    #[test]
    fn prop_participant_table_matches_validation(
        from in prop::sample::select(ParticipantStatus::ALL),
        to in prop::sample::select(ParticipantStatus::ALL),
    ) {
        check_table(from, to);
    }

    #[test]
    fn prop_participant_status_only_moves_forward(
        from in prop::sample::select(ParticipantStatus::ALL),
        to in prop::sample::select(ParticipantStatus::ALL),
    ) {
        if validate_transition(from, to).is_ok() {
            prop_assert_eq!(rank(to), rank(from) + 1);
        }
    }

    #[test]
    fn prop_stage_status_only_moves_forward(
        from in prop::sample::select(StageStatus::ALL),
        to in prop::sample::select(StageStatus::ALL),
    ) {
        check_table(from, to);
        if validate_transition(from, to).is_ok() {
            prop_assert_eq!(rank(to), rank(from) + 1);
        }
    }

    #[test]
    fn prop_no_self_transitions(
        phase in prop::sample::select(WarRoomPhase::ALL),
        agent in prop::sample::select(AgentStatus::ALL),
    ) {
        prop_assert!(validate_transition(phase, phase).is_err());
        prop_assert!(validate_transition(agent, agent).is_err());
        check_table(agent, AgentStatus::Active);
    }
}

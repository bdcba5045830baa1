use super::*;

#[test]
fn terminal_statuses_reject_further_transitions() {
    for terminal in [TaskStatus::Success, TaskStatus::Failed, TaskStatus::Cancelled] {
        let err = transition(terminal, 100, TaskStatus::Running, 100).unwrap_err();
        assert_eq!(
            err,
            TransitionError::AlreadyTerminal { current: terminal, attempted: TaskStatus::Running }
        );
    }
}

#[test]
fn repeated_write_of_same_terminal_state_is_allowed() {
    // Idempotent finish() calls must not be rejected.
    assert!(transition(TaskStatus::Success, 100, TaskStatus::Success, 100).is_ok());
}

#[test]
fn percentage_must_not_decrease() {
    let err = transition(TaskStatus::Running, 40, TaskStatus::Running, 30).unwrap_err();
    assert_eq!(err, TransitionError::PercentageDecreased { current: 40, attempted: 30 });
}

#[test]
fn normal_progress_is_accepted() {
    assert!(transition(TaskStatus::Running, 10, TaskStatus::Running, 20).is_ok());
    assert!(transition(TaskStatus::Queued, 0, TaskStatus::Running, 0).is_ok());
}

#[test]
fn display_matches_wire_vocabulary() {
    assert_eq!(TaskStatus::CancelRequested.to_string(), "CANCEL_REQUESTED");
    assert_eq!(ResourceType::Gpu.to_string(), "GPU");
}

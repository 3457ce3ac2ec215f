use ai_agent::{AiState, Guard, TransitionSpec, TransitionTable};
use ai_core::keys::{AI_STATE_SINCE, PLAYER_LAST_SEEN_AT, PLAYER_NOTICED, SELF_HEALTH};
use ai_core::{Blackboard, Timestamp};

fn flag(key: &str) -> Guard {
    Guard::Flag {
        key: key.to_owned(),
        value: true,
    }
}

#[test]
fn rules_are_checked_in_declaration_order() {
    let table = TransitionTable::new()
        .on(AiState::Patrol, AiState::Chase, "first", |_| true)
        .on(AiState::Patrol, AiState::Attack, "second", |_| true);
    let bb = Blackboard::new();
    let rule = table.evaluate(AiState::Patrol, &bb).unwrap();
    assert_eq!(rule.name, "first");
    assert_eq!(rule.to, AiState::Chase);
}

#[test]
fn rules_never_target_the_current_state() {
    let table = TransitionTable::new()
        .from_any(AiState::Chase, "always-chase", |_| true)
        .from_any(AiState::Search, "fallback", |_| true);
    let bb = Blackboard::new();
    assert_eq!(
        table.evaluate(AiState::Chase, &bb).map(|r| r.to),
        Some(AiState::Search)
    );
    assert_eq!(
        table.evaluate(AiState::Idle, &bb).map(|r| r.to),
        Some(AiState::Chase)
    );
}

#[test]
fn rules_only_fire_from_their_source_state() {
    let table = TransitionTable::new().on(AiState::Idle, AiState::Chase, "spot", |_| true);
    assert!(table.evaluate(AiState::Patrol, &Blackboard::new()).is_none());
}

#[test]
fn guards_read_typed_values() {
    let mut bb = Blackboard::new();
    bb.set(PLAYER_NOTICED, true);
    bb.set(SELF_HEALTH, 0.4);

    assert!(flag("player.noticed").check(&bb));
    assert!(!Guard::Flag {
        key: "player.noticed".into(),
        value: false
    }
    .check(&bb));
    assert!(Guard::Below {
        key: "self.health".into(),
        threshold: 0.5
    }
    .check(&bb));
    assert!(!Guard::Above {
        key: "self.health".into(),
        threshold: 0.5
    }
    .check(&bb));
    // Wrong type and missing keys are simply false.
    assert!(!flag("self.health").check(&bb));
    assert!(!flag("player.heard").check(&bb));
    assert!(Guard::Absent {
        key: "player.heard".into()
    }
    .check(&bb));
}

#[test]
fn time_guards_use_the_blackboard_clock() {
    let mut bb = Blackboard::new();
    bb.set(AI_STATE_SINCE, Timestamp(5));
    bb.set(PLAYER_LAST_SEEN_AT, Timestamp(2));
    bb.begin_tick(8);

    assert!(Guard::InStateFor { ticks: 3 }.check(&bb));
    assert!(!Guard::InStateFor { ticks: 4 }.check(&bb));
    assert!(Guard::OlderThan {
        key: "player.last_seen_at".into(),
        ticks: 6
    }
    .check(&bb));
    assert!(Guard::OlderThan {
        key: "player.never".into(),
        ticks: 1
    }
    .check(&bb));
}

#[test]
fn specs_compile_into_an_ordered_table() {
    let specs = [
        TransitionSpec {
            from: Some(AiState::Patrol),
            to: AiState::Chase,
            name: None,
            when: vec![flag("player.noticed")],
        },
        TransitionSpec {
            from: None,
            to: AiState::Retreat,
            name: Some("low".into()),
            when: vec![Guard::Below {
                key: "self.health".into(),
                threshold: 0.25,
            }],
        },
    ];
    let table = TransitionTable::from_specs(&specs);
    assert_eq!(table.len(), 2);
    assert_eq!(table.rules()[0].name, "patrol->chase");
    assert_eq!(table.rules()[1].name, "low");

    let mut bb = Blackboard::new();
    bb.set(PLAYER_NOTICED, true);
    bb.set(SELF_HEALTH, 0.1);
    assert_eq!(
        table.evaluate(AiState::Patrol, &bb).map(|r| r.to),
        Some(AiState::Chase)
    );
    assert_eq!(
        table.evaluate(AiState::Chase, &bb).map(|r| r.to),
        Some(AiState::Retreat)
    );
}

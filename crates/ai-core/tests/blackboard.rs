use ai_core::{BbKey, BbKind, BbValue, Blackboard, BlackboardError, Handle, SlotKey, Timestamp, Vec2};

const HEALTH: BbKey<f32> = BbKey::new("self.health");
const ALERT: BbKey<bool> = BbKey::new("alert");
const TARGET: BbKey<Handle> = BbKey::new("target");
const GOAL: BbKey<Vec2> = BbKey::new("goal");
const HEALTH_AS_FLAG: BbKey<bool> = BbKey::new("self.health");

#[test]
fn blackboard_set_get_remove_roundtrip() {
    let mut bb = Blackboard::new();
    assert!(!bb.contains(HEALTH.name()));

    bb.set(HEALTH, 0.5);
    bb.set(ALERT, true);
    bb.set(TARGET, Handle(7));
    bb.set(GOAL, Vec2::new(1.0, 2.0));

    assert_eq!(bb.get(HEALTH), Some(0.5));
    assert_eq!(bb.get(ALERT), Some(true));
    assert_eq!(bb.get(TARGET), Some(Handle(7)));
    assert_eq!(bb.get(GOAL), Some(Vec2::new(1.0, 2.0)));

    assert_eq!(bb.remove(HEALTH), Some(0.5));
    assert_eq!(bb.get(HEALTH), None);
    assert_eq!(bb.len(), 3);
}

#[test]
fn require_reports_missing_and_mismatched_keys() {
    let mut bb = Blackboard::new();
    let err = bb.require(HEALTH).unwrap_err();
    assert!(matches!(err, BlackboardError::Missing { .. }));
    assert_eq!(err.key(), "self.health");

    bb.set(HEALTH, 1.0);
    let err = bb.require(HEALTH_AS_FLAG).unwrap_err();
    assert_eq!(
        err,
        BlackboardError::TypeMismatch {
            key: "self.health".into(),
            expected: BbKind::Bool,
            found: BbKind::Number,
        }
    );
    // Typed `get` never panics on a mismatch.
    assert_eq!(bb.get(HEALTH_AS_FLAG), None);
}

#[test]
fn writes_are_stamped_with_the_blackboard_clock() {
    let mut bb = Blackboard::new();
    bb.begin_tick(10);
    bb.set(ALERT, true);
    assert_eq!(bb.written_at("alert"), Some(10));

    bb.begin_tick(11);
    assert_eq!(bb.require_fresh(ALERT, 1), Ok(true));

    bb.begin_tick(13);
    assert!(matches!(
        bb.require_fresh(ALERT, 1),
        Err(BlackboardError::Stale {
            written_at: 10,
            now: 13,
            ..
        })
    ));
}

#[test]
fn dynamic_keys_share_the_value_store() {
    let mut bb = Blackboard::new();
    bb.set_value(String::from("custom.flag"), BbValue::Bool(true));
    bb.set_value("custom.stamp", BbValue::Timestamp(Timestamp(4)));
    assert_eq!(bb.get(BbKey::<bool>::new("custom.flag")), Some(true));
    let names: Vec<&str> = bb.iter().map(|(k, _)| k).collect();
    assert_eq!(names, vec!["custom.flag", "custom.stamp"]);

    let owned = String::from("custom.flag");
    assert_eq!(bb.require_named::<bool>(&owned), Ok(true));
    let err = bb.require_named::<f32>("custom.flag").unwrap_err();
    assert!(matches!(err, BlackboardError::TypeMismatch { found: BbKind::Bool, .. }));
    assert_eq!(bb.require_named::<f32>("custom.none").unwrap_err().key(), "custom.none");
}

#[test]
fn scoped_writer_rejects_keys_outside_its_grant() {
    const GRANTED: &[&str] = &["alert"];
    let mut bb = Blackboard::new();
    {
        let mut writer = bb.grant("perception", GRANTED);
        assert!(writer.set(ALERT, true).is_ok());
        let err = writer.set(HEALTH, 0.1).unwrap_err();
        assert_eq!(
            err,
            BlackboardError::NotGranted {
                writer: "perception",
                key: "self.health".into(),
            }
        );
    }
    assert_eq!(bb.get(ALERT), Some(true));
    assert!(!bb.contains("self.health"));
}

#[test]
fn attachments_are_separate_from_values() {
    const COUNTER: SlotKey<Vec<u32>> = SlotKey::new(1);
    let mut bb = Blackboard::new();
    bb.attach(COUNTER, vec![1]);
    bb.attachment_mut(COUNTER).unwrap().push(2);
    assert_eq!(bb.attachment(COUNTER).map(|v| v.len()), Some(2));
    bb.clear();
    assert!(bb.has_attachment(COUNTER));
    assert_eq!(bb.detach(COUNTER), Some(vec![1, 2]));
}

#[test]
#[should_panic(expected = "attachment type mismatch")]
fn attachment_type_mismatch_panics() {
    let mut bb = Blackboard::new();
    bb.attach(SlotKey::<u32>::new(1), 1u32);
    let _ = bb.attachment(SlotKey::<i32>::new(1));
}

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use vouch::prelude::*;

fn page(fields: &[&str]) -> Document {
    let form = fields.iter().fold(Element::form("signup").id("signup"), |form, name| {
        form.child(
            Element::div()
                .child(Element::input(*name).id(*name))
                .child(Element::text("").id(format!("{name}-status"))),
        )
    });
    Document::new(Element::div().id("page").child(form))
}

/// Validator that passes when the value is at least `min` characters long.
fn min_length(min: usize) -> Lifecycle {
    Lifecycle::new().validate(move |value, done| {
        if value.chars().count() >= min {
            done.pass("ok");
        } else {
            done.fail("too short");
        }
    })
}

type Pending = Arc<Mutex<Vec<(String, Completion)>>>;

/// Validator that parks its completion for the test to finish later.
fn deferred(pending: &Pending) -> Lifecycle {
    let pending = pending.clone();
    Lifecycle::new().validate(move |value, done| pending.lock().unwrap().push((value, done)))
}

fn take(pending: &Pending, index: usize) -> (String, Completion) {
    pending.lock().unwrap().remove(index)
}

// ============================================================================
// Single-Field Validation
// ============================================================================

#[test]
fn test_state_matches_completion() {
    for mode in [TriggerMode::PerField, TriggerMode::Delegated] {
        let doc = page(&["name"]);
        let engine = Engine::new(&doc, Options::new("signup").trigger(mode)).unwrap();
        engine.delegate([("name", min_length(3))]).unwrap();

        doc.input("name", "ab");
        assert_eq!(engine.state().get("name"), Some(false), "{mode:?}");

        doc.input("name", "abc");
        assert!(engine.state()["name"], "{mode:?}");
        assert!(engine.is_valid());

        doc.input("name", "");
        assert!(!engine.state()["name"], "{mode:?}");
    }
}

#[test]
fn test_trigger_modes_render_identically() {
    let run = |mode: TriggerMode| {
        let doc = page(&["a", "b"]);
        let engine = Engine::new(&doc, Options::new("signup").trigger(mode)).unwrap();
        engine
            .delegate([("a", min_length(2)), ("b", min_length(4))])
            .unwrap();

        doc.input("a", "xy");
        doc.input("b", "xy");
        (engine.state(), doc.markup("signup").unwrap())
    };

    let (per_field_state, per_field_markup) = run(TriggerMode::PerField);
    let (delegated_state, delegated_markup) = run(TriggerMode::Delegated);

    assert_eq!(per_field_state, delegated_state);
    assert_eq!(per_field_markup, delegated_markup);
}

#[test]
fn test_delegated_mode_attaches_one_listener_per_event_kind() {
    let doc = page(&["a", "b", "c"]);
    let engine = Engine::new(&doc, Options::new("signup").delegated()).unwrap();
    engine
        .delegate([
            ("a", min_length(1)),
            ("b", min_length(1)),
            ("c", min_length(1).on(EventKind::Change)),
        ])
        .unwrap();

    // One form listener for `input`, one for `change`.
    assert_eq!(doc.listener_count(), 2);
}

#[test]
fn test_unrelated_form_events_are_ignored() {
    let doc = Document::new(
        Element::form("signup")
            .id("signup")
            .child(Element::input("a").id("a"))
            .child(Element::input("notes").id("notes")),
    );
    let engine = Engine::new(&doc, Options::new("signup").delegated()).unwrap();

    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();
    engine
        .delegate([(
            "a",
            Lifecycle::new().validate(move |_, done| {
                counter.fetch_add(1, Ordering::SeqCst);
                done.silent(true);
            }),
        )])
        .unwrap();

    doc.input("notes", "hello");
    assert_eq!(calls.load(Ordering::SeqCst), 0);

    doc.input("a", "x");
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_trigger_override() {
    let doc = page(&["a"]);
    let engine = Engine::new(&doc, Options::new("signup")).unwrap();
    engine
        .delegate([("a", min_length(1).on(EventKind::Change))])
        .unwrap();

    doc.input("a", "x");
    assert!(!engine.state()["a"]);

    doc.change("a");
    assert!(engine.state()["a"]);
}

#[test]
fn test_default_event_from_options() {
    let doc = page(&["a"]);
    let engine = Engine::new(&doc, Options::new("signup").event(EventKind::Blur)).unwrap();
    engine.delegate([("a", min_length(1))]).unwrap();

    doc.input("a", "x");
    assert!(!engine.state()["a"]);

    doc.focus("a");
    doc.focus("signup");
    assert!(engine.state()["a"]);
}

#[test]
fn test_run_validation_unknown_field() {
    let doc = page(&["a"]);
    let engine = Engine::new(&doc, Options::new("signup")).unwrap();

    assert_eq!(
        engine.run_validation("a"),
        Err(Error::UnknownField("a".to_string()))
    );
}

// ============================================================================
// Transform
// ============================================================================

#[test]
fn test_transform_runs_before_validation() {
    for mode in [TriggerMode::PerField, TriggerMode::Delegated] {
        let doc = page(&["name"]);
        let engine = Engine::new(&doc, Options::new("signup").trigger(mode)).unwrap();

        let validated = Arc::new(Mutex::new(Vec::new()));
        let seen = validated.clone();
        engine
            .delegate([(
                "name",
                Lifecycle::new()
                    .transform(|value| value.to_uppercase())
                    .validate(move |value, done| {
                        seen.lock().unwrap().push(value);
                        done.silent(true);
                    }),
            )])
            .unwrap();

        doc.input("name", "ada");

        assert_eq!(doc.value("name").as_deref(), Some("ADA"));
        assert_eq!(*validated.lock().unwrap(), vec!["ADA".to_string()], "{mode:?}");
    }
}

#[test]
fn test_transform_runs_on_input_even_with_other_trigger() {
    let doc = page(&["name"]);
    let engine = Engine::new(&doc, Options::new("signup").event(EventKind::Change)).unwrap();
    engine
        .delegate([(
            "name",
            min_length(1).transform(|value| value.trim().to_string()),
        )])
        .unwrap();

    doc.input("name", "  ada ");
    assert_eq!(doc.value("name").as_deref(), Some("ada"));
    assert!(!engine.state()["name"]);
}

// ============================================================================
// Hooks & Notifications
// ============================================================================

#[test]
fn test_outcome_hooks_receive_value() {
    let doc = page(&["a"]);
    let engine = Engine::new(&doc, Options::new("signup")).unwrap();

    let log = Arc::new(Mutex::new(Vec::new()));
    let (valid_log, invalid_log) = (log.clone(), log.clone());
    engine
        .delegate([(
            "a",
            min_length(2)
                .when_valid(move |v| valid_log.lock().unwrap().push(format!("valid:{v}")))
                .when_invalid(move |v| invalid_log.lock().unwrap().push(format!("invalid:{v}"))),
        )])
        .unwrap();

    doc.input("a", "x");
    doc.input("a", "xy");

    assert_eq!(
        *log.lock().unwrap(),
        vec!["invalid:x".to_string(), "valid:xy".to_string()]
    );
}

#[test]
fn test_subscribers_get_snapshot_per_completion() {
    let doc = page(&["a", "b"]);
    let engine = Engine::new(&doc, Options::new("signup")).unwrap();
    engine
        .delegate([("a", min_length(1)), ("b", min_length(1))])
        .unwrap();

    let snapshots = Arc::new(Mutex::new(Vec::new()));
    let seen = snapshots.clone();
    engine.on_state_change(move |state| seen.lock().unwrap().push(state.clone()));

    doc.input("a", "x");
    doc.input("b", "");

    let snapshots = snapshots.lock().unwrap();
    assert_eq!(snapshots.len(), 2);
    assert_eq!(snapshots[0].get("a"), Some(true));
    assert_eq!(snapshots[0].get("b"), Some(false));
    assert!(!snapshots[1].is_valid());
}

#[test]
fn test_reentrant_hook_may_validate_other_fields() {
    let doc = page(&["password", "confirm"]);
    let engine = Engine::new(&doc, Options::new("signup")).unwrap();

    let handle = engine.clone();
    engine
        .delegate([
            (
                "password",
                min_length(4).when_valid(move |value| {
                    handle.set_values([("confirm", value)], true);
                }),
            ),
            ("confirm", min_length(4)),
        ])
        .unwrap();

    doc.input("password", "hunter2");

    assert_eq!(doc.value("confirm").as_deref(), Some("hunter2"));
    assert!(engine.is_valid());
}

// ============================================================================
// Deferred Completion
// ============================================================================

#[test]
fn test_state_unchanged_until_completion() {
    let doc = page(&["a"]);
    let engine = Engine::new(&doc, Options::new("signup")).unwrap();
    let pending = Pending::default();
    engine.delegate([("a", deferred(&pending))]).unwrap();

    let notified = Arc::new(AtomicUsize::new(0));
    let counter = notified.clone();
    engine.on_state_change(move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
    });

    doc.input("a", "x");
    assert!(!engine.state()["a"]);
    assert_eq!(notified.load(Ordering::SeqCst), 0);

    let (value, done) = take(&pending, 0);
    assert_eq!(value, "x");
    done.pass("ok");

    assert!(engine.state()["a"]);
    assert_eq!(notified.load(Ordering::SeqCst), 1);
    assert_eq!(doc.text("a-status").as_deref(), Some("ok"));
}

#[test]
fn test_abandoned_completion_leaves_state_stale() {
    let doc = page(&["a"]);
    let engine = Engine::new(&doc, Options::new("signup")).unwrap();
    engine
        .delegate([("a", Lifecycle::new().validate(|_, done| drop(done)))])
        .unwrap();

    doc.input("a", "x");
    assert!(!engine.state()["a"]);
}

#[test]
fn test_last_completion_wins_by_default() {
    let doc = page(&["a"]);
    let engine = Engine::new(&doc, Options::new("signup")).unwrap();
    let pending = Pending::default();
    engine.delegate([("a", deferred(&pending))]).unwrap();

    doc.input("a", "old");
    doc.input("a", "new");

    let (_, new) = take(&pending, 1);
    let (_, old) = take(&pending, 0);
    new.pass("new ok");
    old.fail("old bad");

    // The stale completion overwrote the newer one.
    assert!(!engine.state()["a"]);
    assert_eq!(doc.text("a-status").as_deref(), Some("old bad"));
}

#[test]
fn test_superseded_completions_can_be_discarded() {
    let doc = page(&["a"]);
    let engine = Engine::new(
        &doc,
        Options::new("signup").stale(StalePolicy::DiscardSuperseded),
    )
    .unwrap();
    let pending = Pending::default();
    engine.delegate([("a", deferred(&pending))]).unwrap();

    let notified = Arc::new(AtomicUsize::new(0));
    let counter = notified.clone();
    engine.on_state_change(move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
    });

    doc.input("a", "old");
    doc.input("a", "new");

    let (_, new) = take(&pending, 1);
    let (_, old) = take(&pending, 0);
    new.pass("new ok");
    old.fail("old bad");

    assert!(engine.state()["a"]);
    assert_eq!(doc.text("a-status").as_deref(), Some("new ok"));
    assert_eq!(notified.load(Ordering::SeqCst), 1);
}

// ============================================================================
// Async Validators
// ============================================================================

#[tokio::test]
async fn test_async_validator_completes_later() {
    let doc = page(&["username"]);
    let engine = Engine::new(&doc, Options::new("signup")).unwrap();
    engine
        .delegate([(
            "username",
            Lifecycle::new().validate_async(|name| async move {
                tokio::time::sleep(std::time::Duration::from_millis(10)).await;
                if name == "taken" {
                    Verdict::fail("Username taken.")
                } else {
                    Verdict::pass("Username available.")
                }
            }),
        )])
        .unwrap();

    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
    engine.on_state_change(move |state| {
        let _ = tx.send(state.clone());
    });

    doc.input("username", "taken");
    assert!(!engine.state()["username"]);
    let state = rx.recv().await.unwrap();
    assert_eq!(state.get("username"), Some(false));
    assert_eq!(doc.text("username-status").as_deref(), Some("Username taken."));

    doc.input("username", "ada");
    let state = rx.recv().await.unwrap();
    assert_eq!(state.get("username"), Some(true));
    assert!(doc.has_class(&engine.input_id("username").unwrap(), "success"));
}

#[test]
fn test_async_validator_without_runtime_runs_in_place() {
    let doc = page(&["a"]);
    let engine = Engine::new(&doc, Options::new("signup")).unwrap();
    engine
        .delegate([(
            "a",
            Lifecycle::new().validate_async(|value| async move { Verdict::silent(!value.is_empty()) }),
        )])
        .unwrap();

    doc.input("a", "x");
    assert!(engine.state()["a"]);
}

// ============================================================================
// Concurrent Completions
// ============================================================================

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_completions_keep_state_and_markers_in_step() {
    for _ in 0..100 {
        let doc = page(&["a"]);
        let engine = Engine::new(&doc, Options::new("signup")).unwrap();
        let pending = Pending::default();
        engine.delegate([("a", deferred(&pending))]).unwrap();

        engine.run_validation("a").unwrap();
        engine.run_validation("a").unwrap();
        let (_, second) = take(&pending, 1);
        let (_, first) = take(&pending, 0);

        let passing = tokio::spawn(async move { first.pass("ok") });
        let failing = tokio::spawn(async move { second.fail("bad") });
        passing.await.unwrap();
        failing.await.unwrap();

        let valid = engine.state()["a"];
        assert_eq!(doc.has_class("a", "success"), valid);
        assert_eq!(doc.has_class("a", "error"), !valid);
        let expected = if valid { "ok" } else { "bad" };
        assert_eq!(doc.text("a-status").as_deref(), Some(expected));
    }
}

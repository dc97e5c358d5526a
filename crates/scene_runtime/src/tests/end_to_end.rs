use std::collections::BTreeSet;
use std::io::Write;
use std::sync::{Arc, Mutex};

use serde_json::{json, Value};

use crate::ai::{callback, AIStateMachine, AiError};
use crate::config::EngineConfig;
use crate::scene::SceneError;
use crate::scheduler::{task, SchedulerError};
use crate::{Engine, EngineError};

fn guard(name: &str) -> Value {
    json!({
        "name": name,
        "rigidbody": { "mass": 75.0 },
        "ai": { "name": "Guard", "states": ["idle", "alert"], "initial state": "idle" }
    })
}

fn engine() -> Engine {
    Engine::new(EngineConfig::new().with_loading_threads(4)).unwrap()
}

#[test]
fn test_guards_share_one_template() {
    let mut engine = engine();
    let scene = engine
        .load_scene(&json!({ "name": "courtyard", "entities": [guard("guard 1"), guard("guard 2")] }))
        .unwrap();

    assert_eq!(scene.ai_count(), 2);
    let first = Arc::clone(scene.find_entity("guard 1").unwrap());
    let second = Arc::clone(scene.find_entity("guard 2").unwrap());
    assert_eq!(first.current_ai_state().as_deref(), Some("idle"));
    assert_eq!(second.current_ai_state().as_deref(), Some("idle"));

    assert_eq!(engine.ai_cache().names(), vec!["Guard"]);

    // Instances are independent of each other and of the template
    assert!(first.set_ai_state("alert"));
    assert_eq!(second.current_ai_state().as_deref(), Some("idle"));
    assert_eq!(engine.ai_cache().get("Guard").unwrap().current_state(), "idle");
}

#[test]
fn test_many_guards_built_concurrently() {
    let mut engine = engine();
    let entities: Vec<Value> = (0..64).map(|i| guard(&format!("guard {i}"))).collect();
    let scene = engine
        .load_scene(&json!({ "name": "barracks", "entities": entities }))
        .unwrap();

    assert_eq!(scene.entity_count(), 64);
    assert_eq!(scene.actor_count(), 64);
    assert_eq!(scene.ai_count(), 64);
    assert_eq!(engine.ai_cache().len(), 1);
}

#[test]
fn test_game_loop_runs_tasks_once_in_order() {
    let mut engine = engine();
    let calls = Arc::new(Mutex::new(Vec::new()));
    for name in ["Input", "Render"] {
        let calls = Arc::clone(&calls);
        engine.register_task(
            name,
            task(move |_: &Engine| {
                calls.lock().unwrap().push(name);
                Ok(())
            }),
        );
    }

    engine
        .build_task_graph(&json!({
            "name": "Scheduler",
            "thread count": 1,
            "blocks": [
                { "name": "Game loop", "description": "Single threaded solution", "tasks": ["Input", "Render"] }
            ]
        }))
        .unwrap();

    assert_eq!(engine.run_thread("Game loop").unwrap(), 2);
    assert_eq!(*calls.lock().unwrap(), vec!["Input", "Render"]);
}

#[test]
fn test_unknown_task_fails_to_load() {
    let mut engine = engine();
    let result = engine.build_task_graph(&json!({
        "name": "Scheduler",
        "blocks": [{ "name": "Game loop", "tasks": ["Input", "Physics"] }]
    }));
    assert!(matches!(
        result,
        Err(EngineError::Scheduler(SchedulerError::UnknownTask { ref task, .. })) if task == "Physics"
    ));
    assert!(engine.task_graph().is_none());
}

#[test]
fn test_failed_load_keeps_previous_scene() {
    let mut engine = engine();
    engine
        .load_scene(&json!({ "name": "first", "entities": [guard("guard")] }))
        .unwrap();

    let result = engine.load_scene(&json!({
        "name": "second",
        "entities": [
            guard("ok"),
            { "name": "broken", "collider": { "type": "box", "min": [1, 1, 1], "max": [0, 0, 0] } }
        ]
    }));

    let Err(EngineError::Scene(SceneError::PartialBuild { scene, failures, .. })) = result else {
        panic!("expected a partial build");
    };
    assert_eq!(scene.name(), "second");
    assert!(scene.find_entity("ok").is_some());
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].name.as_deref(), Some("broken"));

    assert_eq!(engine.scene().map(|scene| scene.name()), Some("first"));
}

#[test]
fn test_ai_round_spreads_over_frames() {
    let mut engine = engine();
    let pre_updates = Arc::new(Mutex::new(0_usize));

    // Callbacks bound on the cached template reach every clone
    let counter = Arc::clone(&pre_updates);
    engine
        .ai_cache()
        .find_or_insert("Guard", || {
            let mut ai = AIStateMachine::new("Guard", ["idle", "alert"], "idle")?;
            ai.add_state_callback(
                "idle",
                callback(|entity| {
                    entity.set_ai_state("alert");
                    Ok(())
                }),
            );
            ai.set_pre_update_callback(callback(move |_| {
                *counter.lock().unwrap() += 1;
                Ok(())
            }));
            Ok::<_, AiError>(ai)
        })
        .unwrap();

    engine
        .load_scene(&json!({
            "name": "patrol",
            "entities": [guard("a"), guard("b"), guard("c"), { "name": "rock" }]
        }))
        .unwrap();
    engine
        .build_task_graph(&json!({
            "name": "Scheduler",
            "blocks": [{ "name": "Main", "tasks": ["Input", "Pre AI", "AI", "Render"] }]
        }))
        .unwrap();

    let alert_count = |engine: &Engine| {
        engine
            .scene()
            .unwrap()
            .ais()
            .filter(|entity| entity.current_ai_state().as_deref() == Some("alert"))
            .count()
    };

    assert_eq!(engine.run_frame().unwrap(), 2);
    assert_eq!(alert_count(&engine), 1);
    assert_eq!(engine.ai_queues().pending(), (2, 2));

    engine.run_frame().unwrap();
    engine.run_frame().unwrap();
    assert_eq!(alert_count(&engine), 3);
    assert_eq!(*pre_updates.lock().unwrap(), 3);
    assert_eq!(engine.ai_queues().pending(), (0, 0));

    // The next frame starts a new round; "alert" has no callback
    assert_eq!(engine.run_frame().unwrap(), 2);
    assert_eq!(engine.ai_queues().pending(), (2, 2));
}

#[test]
fn test_uneven_phase_rates_reach_every_entity() {
    let mut engine = engine();
    let pre_updated = Arc::new(Mutex::new(BTreeSet::new()));

    let seen = Arc::clone(&pre_updated);
    engine
        .ai_cache()
        .find_or_insert("Guard", || {
            let mut ai = AIStateMachine::new("Guard", ["idle", "alert"], "idle")?;
            ai.set_pre_update_callback(callback(move |entity| {
                seen.lock().unwrap().insert(entity.name().to_string());
                Ok(())
            }));
            Ok::<_, AiError>(ai)
        })
        .unwrap();

    engine
        .load_scene(&json!({
            "name": "watch",
            "entities": [guard("a"), guard("b"), guard("c"), guard("d")]
        }))
        .unwrap();
    // "AI" drains twice as fast as "Pre AI"
    engine
        .build_task_graph(&json!({
            "name": "Scheduler",
            "blocks": [{ "name": "Main", "tasks": ["Pre AI", "AI", "AI"] }]
        }))
        .unwrap();

    for _ in 0..4 {
        engine.run_frame().unwrap();
    }
    assert_eq!(
        *pre_updated.lock().unwrap(),
        ["a", "b", "c", "d"].into_iter().map(String::from).collect::<BTreeSet<_>>()
    );
    assert_eq!(engine.ai_queues().pending(), (0, 0));

    engine.run_frame().unwrap();
    engine.run_frame().unwrap();
    assert_eq!(engine.ai_queues().pending(), (2, 0));
}

#[test]
fn test_ai_callback_failure_surfaces_as_task_failure() {
    let mut engine = engine();
    engine
        .load_scene(&json!({ "name": "broken", "entities": [guard("guard")] }))
        .unwrap();
    let guard = Arc::clone(engine.scene().unwrap().find_entity("guard").unwrap());
    guard.map_ai(|ai| ai.add_state_callback("idle", callback(|_| Err("lost target".into()))));

    engine
        .build_task_graph(&json!({ "name": "Scheduler", "blocks": [{ "name": "Main", "tasks": ["AI"] }] }))
        .unwrap();

    let err = engine.run_frame().unwrap_err();
    assert!(matches!(
        err,
        EngineError::Scheduler(SchedulerError::TaskFailed { ref task, .. }) if task == "AI"
    ));
}

#[test]
fn test_active_camera_through_engine() {
    let mut engine = engine();
    engine
        .load_scene(&json!({
            "name": "studio",
            "cameras": [
                { "name": "main", "location": [0.0, 2.0, 5.0] },
                { "name": "overhead", "location": [0.0, 20.0, 0.1] }
            ]
        }))
        .unwrap();

    engine.set_active_camera("overhead").unwrap();
    let active = engine.scene().and_then(|scene| scene.active_camera()).unwrap();
    assert_eq!(active.name, "overhead");

    assert!(matches!(
        engine.set_active_camera("missing"),
        Err(EngineError::Scene(SceneError::CameraNotFound(_)))
    ));
}

#[test]
fn test_files_on_disk() {
    let dir = tempfile::tempdir().unwrap();

    let ai_path = dir.path().join("guard_ai.json");
    std::fs::File::create(&ai_path)
        .unwrap()
        .write_all(br#"{ "name": "Guard", "states": ["idle", "alert"], "initial state": "alert" }"#)
        .unwrap();

    let scene_path = dir.path().join("scene.json");
    let scene = json!({
        "name": "from disk",
        "entities": [{ "name": "guard", "ai": ai_path.to_string_lossy() }]
    });
    std::fs::write(&scene_path, scene.to_string()).unwrap();

    let scheduler_path = dir.path().join("scheduler.json");
    std::fs::write(
        &scheduler_path,
        r#"{ "name": "Scheduler", "blocks": [{ "name": "Main", "tasks": ["AI"] }] }"#,
    )
    .unwrap();

    let mut engine = engine();
    engine.load_task_graph(&scheduler_path).unwrap();
    let scene = engine.load_scene_from_path(&scene_path).unwrap();
    let guard = scene.find_entity("guard").unwrap();
    assert_eq!(guard.current_ai_state().as_deref(), Some("alert"));
    assert_eq!(engine.run_frame().unwrap(), 1);
}

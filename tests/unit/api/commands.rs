use super::*;
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};

#[test]
fn registered_command_receives_args() {
    let commands = Commands::new();
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    commands.register_command("demo.run", move |args| {
        sink.lock().unwrap().push(args);
    });

    assert!(commands.contains("demo.run"));
    assert!(commands.on_command("demo.run", json!({ "path": "/tmp/a" })));
    assert_eq!(*seen.lock().unwrap(), vec![json!({ "path": "/tmp/a" })]);
}

#[test]
fn unknown_command_is_ignored() {
    let commands = Commands::new();
    assert!(!commands.on_command("demo.missing", Value::Null));
}

#[test]
fn later_registration_replaces_earlier_one() {
    let commands = Commands::new();
    let first = Arc::new(AtomicUsize::new(0));
    let second = Arc::new(AtomicUsize::new(0));
    let a = first.clone();
    let b = second.clone();
    commands.register_command("demo.run", move |_| {
        a.fetch_add(1, Ordering::SeqCst);
    });
    commands.register_command("demo.run", move |_| {
        b.fetch_add(1, Ordering::SeqCst);
    });

    commands.on_command("demo.run", Value::Null);
    assert_eq!(first.load(Ordering::SeqCst), 0);
    assert_eq!(second.load(Ordering::SeqCst), 1);
}

#[test]
fn unregister_removes_the_command() {
    let commands = Commands::new();
    commands.register_command("demo.run", |_| {});

    assert!(commands.unregister_command("demo.run"));
    assert!(!commands.unregister_command("demo.run"));
    assert!(!commands.on_command("demo.run", Value::Null));
}

#[test]
fn callback_may_register_another_command() {
    let commands = Commands::new();
    let registry = commands.clone();
    commands.register_command("demo.install", move |_| {
        registry.register_command("demo.installed", |_| {});
    });

    assert!(commands.on_command("demo.install", Value::Null));
    assert!(commands.contains("demo.installed"));
}

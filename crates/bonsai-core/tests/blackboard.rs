use std::sync::Arc;
use std::thread;

use bonsai_core::{BbKey, Blackboard};

const TARGET: BbKey<(i32, i32)> = BbKey::new("target");

#[test]
fn blackboard_set_get_roundtrip_for_common_kinds() {
    let bb = Blackboard::new();
    bb.set("int", 42i32);
    bb.set("float", 1.5f32);
    bb.set("flag", true);
    bb.set("name", "scout".to_string());
    bb.set("path", vec![1u32, 2, 3]);

    assert_eq!(bb.get::<i32>("int"), Some(42));
    assert_eq!(bb.get::<f32>("float"), Some(1.5));
    assert_eq!(bb.get::<bool>("flag"), Some(true));
    assert_eq!(bb.get::<String>("name").as_deref(), Some("scout"));
    assert_eq!(bb.get::<Vec<u32>>("path"), Some(vec![1, 2, 3]));
    assert_eq!(bb.len(), 5);
}

#[test]
fn blackboard_type_mismatch_reads_as_absent() {
    let bb = Blackboard::new();
    bb.set("hp", 10i32);

    assert_eq!(bb.get::<i64>("hp"), None);
    assert_eq!(bb.get::<String>("hp"), None);
    assert_eq!(bb.get::<i32>("missing"), None);
    // The entry itself is still there.
    assert!(bb.has("hp"));
    assert_eq!(bb.get::<i32>("hp"), Some(10));
}

#[test]
fn blackboard_set_overwrites_value_and_type() {
    let bb = Blackboard::new();
    bb.set("slot", 1u8);
    bb.set("slot", "now a string".to_string());

    assert_eq!(bb.get::<u8>("slot"), None);
    assert_eq!(
        bb.get::<String>("slot").as_deref(),
        Some("now a string")
    );
    assert_eq!(bb.len(), 1);
}

#[test]
fn blackboard_has_remove_clear() {
    let bb = Blackboard::new();
    assert!(bb.is_empty());
    assert!(!bb.has("a"));

    bb.set("a", 1i32);
    bb.set("b", 2i32);
    assert!(bb.has("a"));

    assert!(bb.remove("a"));
    assert!(!bb.remove("a"));
    assert!(!bb.has("a"));
    assert!(bb.has("b"));

    bb.clear();
    assert!(bb.is_empty());
    assert_eq!(bb.get::<i32>("b"), None);
}

#[test]
fn blackboard_with_reads_without_cloning() {
    struct NotClone(u32);

    let bb = Blackboard::new();
    bb.set("opaque", NotClone(7));

    assert_eq!(bb.with("opaque", |v: &NotClone| v.0 * 2), Some(14));
    assert_eq!(bb.with("opaque", |v: &u32| *v), None);
    assert_eq!(bb.with("missing", |v: &NotClone| v.0), None);
}

#[test]
fn typed_keys_share_storage_with_string_keys() {
    let bb = Blackboard::new();
    assert!(!bb.has_key(TARGET));

    bb.set_key(TARGET, (3, 4));
    assert_eq!(bb.get_key(TARGET), Some((3, 4)));
    assert_eq!(bb.get::<(i32, i32)>("target"), Some((3, 4)));
    assert!(bb.has_key(TARGET));

    bb.set("target", 0u64);
    assert!(!bb.has_key(TARGET));
    assert!(bb.has("target"));

    assert!(bb.remove_key(TARGET));
    assert!(!bb.has("target"));
}

#[test]
fn blackboard_concurrent_writers_lose_nothing() {
    const THREADS: usize = 8;
    const KEYS_PER_THREAD: usize = 250;

    let bb = Arc::new(Blackboard::new());
    let handles: Vec<_> = (0..THREADS)
        .map(|t| {
            let bb = Arc::clone(&bb);
            thread::spawn(move || {
                for k in 0..KEYS_PER_THREAD {
                    bb.set(format!("t{t}-k{k}"), t * 10_000 + k);
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(bb.len(), THREADS * KEYS_PER_THREAD);
    for t in 0..THREADS {
        for k in 0..KEYS_PER_THREAD {
            assert_eq!(bb.get::<usize>(&format!("t{t}-k{k}")), Some(t * 10_000 + k));
        }
    }
}

#[test]
fn blackboard_concurrent_readers_and_writers_on_shared_key() {
    let bb = Blackboard::new();
    bb.set("counter", 0u64);

    thread::scope(|s| {
        for _ in 0..4 {
            s.spawn(|| {
                for i in 0..500u64 {
                    bb.set("counter", i);
                    // Any value seen must be one some writer stored.
                    let seen = bb.get::<u64>("counter").unwrap();
                    assert!(seen < 500);
                }
            });
        }
    });

    assert!(bb.get::<u64>("counter").is_some());
}

//! Unit tests for environment helpers.

use super::*;
use std::sync::{Arc, Barrier};
use std::thread;

fn env_value(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

fn seed(key: &str, value: &str) {
    let _lock = lock();
    // SAFETY: `ENV_MUTEX` is held through `_lock`.
    unsafe { env_set_var(key, OsStr::new(value)) };
}

fn unseed(key: &str) {
    let _lock = lock();
    // SAFETY: `ENV_MUTEX` is held through `_lock`.
    unsafe { env_remove_var(key) };
}

#[test]
fn set_var_restores_original() {
    let key = "TEST_HELPERS_SET_VAR";
    seed(key, "orig");
    {
        let _guard = set_var(key, "temp");
        assert_eq!(env_value(key).as_deref(), Some("temp"));
    }
    assert_eq!(env_value(key).as_deref(), Some("orig"));
    unseed(key);
}

#[test]
fn remove_var_restores_value() {
    let key = "TEST_HELPERS_REMOVE_VAR";
    seed(key, "kept");
    {
        let guard = remove_var(key);
        assert_eq!(guard.key(), key);
        assert_eq!(env_value(key), None);
    }
    assert_eq!(env_value(key).as_deref(), Some("kept"));
    unseed(key);
}

#[test]
fn set_var_unsets_when_absent() {
    let key = "TEST_HELPERS_UNSET";
    unseed(key);
    {
        let _guard = set_var(key, "tmp");
        assert_eq!(env_value(key).as_deref(), Some("tmp"));
    }
    assert_eq!(env_value(key), None);
}

#[test]
fn stacking_restores_in_lifo() {
    let key = "TEST_HELPERS_STACKING";
    unseed(key);
    let outer = set_var(key, "v1");
    let inner = set_var(key, "v2");
    assert_eq!(env_value(key).as_deref(), Some("v2"));
    drop(inner);
    assert_eq!(env_value(key).as_deref(), Some("v1"));
    drop(outer);
    assert_eq!(env_value(key), None);
}

#[test]
fn clear_prefixed_hides_and_restores_matching_keys() {
    seed("TEST_HELPERS_PFX_A", "a");
    seed("TEST_HELPERS_PFX_B", "b");
    seed("TEST_HELPERS_OTHER", "c");
    {
        let scope = clear_prefixed("TEST_HELPERS_PFX_");
        assert_eq!(env_value("TEST_HELPERS_PFX_A"), None);
        assert_eq!(env_value("TEST_HELPERS_PFX_B"), None);
        assert_eq!(env_value("TEST_HELPERS_OTHER").as_deref(), Some("c"));
        drop(scope);
    }
    assert_eq!(env_value("TEST_HELPERS_PFX_A").as_deref(), Some("a"));
    assert_eq!(env_value("TEST_HELPERS_PFX_B").as_deref(), Some("b"));
    for key in ["TEST_HELPERS_PFX_A", "TEST_HELPERS_PFX_B", "TEST_HELPERS_OTHER"] {
        unseed(key);
    }
}

#[test]
fn scope_keeps_pushed_guards_until_drop() {
    let key = "TEST_HELPERS_SCOPE_PUSH";
    unseed(key);
    let mut scope = scope_with(|_| Vec::new());
    scope.push(set_var(key, "scoped"));
    assert_eq!(env_value(key).as_deref(), Some("scoped"));
    drop(scope);
    assert_eq!(env_value(key), None);
}

#[test]
fn concurrent_mutations_restore_values() {
    const THREADS: usize = 4;
    const ITERATIONS: usize = 8;
    let keys: Vec<_> = (0..THREADS)
        .map(|i| format!("TEST_HELPERS_CONCURRENT_{i}"))
        .collect();
    for key in &keys {
        seed(key, "original");
    }
    let barrier = Arc::new(Barrier::new(THREADS));
    let handles: Vec<_> = keys
        .iter()
        .cloned()
        .map(|key| {
            let barrier_wait = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier_wait.wait();
                for iter in 0..ITERATIONS {
                    let value = format!("value-{key}-{iter}");
                    let guard = set_var(key.as_str(), &value);
                    assert_eq!(env_value(&key), Some(value));
                    drop(guard);
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().expect("worker thread panicked");
    }
    for key in keys {
        assert_eq!(env_value(&key).as_deref(), Some("original"));
        unseed(&key);
    }
}

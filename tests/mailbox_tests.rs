// Host-side tests for the latest-value mailbox.
// The main crate is wasm-only, so we include the pure-Rust modules directly.

#![allow(dead_code)]
mod mailbox {
    include!("../src/core/mailbox.rs");
}

use mailbox::Latest;

#[test]
fn starts_with_the_initial_value() {
    let slot = Latest::new(7u32);
    assert_eq!(slot.get(), 7);
}

#[test]
fn publish_overwrites_unread_values() {
    let slot = Latest::new(0u32);
    slot.publish(1);
    slot.publish(2);
    slot.publish(3);
    assert_eq!(slot.get(), 3, "only the most recent publish survives");
}

#[test]
fn reading_does_not_consume() {
    let slot = Latest::new(String::from("fist"));
    slot.publish(String::from("open"));
    assert_eq!(slot.get(), "open");
    assert_eq!(slot.get(), "open");
}

#[test]
fn interleaved_publish_and_get() {
    let slot = Latest::new(0i32);
    for i in 1..=10 {
        slot.publish(i);
        assert_eq!(slot.get(), i);
    }
}

use reactive_streams::{observer::Observer, prelude::*, state::State};
use std::sync::{Arc, RwLock};

#[test]
fn replays_the_current_value_on_subscribe() {
    let count = State::new(1);
    let seen = Arc::new(RwLock::new(Vec::new()));

    count.subscribe({
        let seen = Arc::clone(&seen);
        move |value: i32| seen.write().unwrap().push(value)
    });
    assert_eq!(seen.read().unwrap().as_slice(), [1]);

    count.next(2);
    count.next(3);
    assert_eq!(seen.read().unwrap().as_slice(), [1, 2, 3]);
}

#[test]
fn late_subscribers_see_only_the_latest_value() {
    let count = State::new(1);
    count.next(2);
    count.next(3);

    let seen = Arc::new(RwLock::new(Vec::new()));
    count.subscribe({
        let seen = Arc::clone(&seen);
        move |value: i32| seen.write().unwrap().push(value)
    });
    assert_eq!(seen.read().unwrap().as_slice(), [3]);
}

#[test]
fn value_is_readable_without_any_subscribers() {
    let name = State::new(String::from("ada"));
    assert_eq!(name.get(), "ada");
    name.next(String::from("grace"));
    assert_eq!(name.get(), "grace");
    assert_eq!(name.observer_count(), 0);
}

#[test]
fn update_applies_a_function_to_the_current_value() {
    let count = State::new(10);
    let seen = Arc::new(RwLock::new(Vec::new()));
    count.subscribe({
        let seen = Arc::clone(&seen);
        move |value: i32| seen.write().unwrap().push(value)
    });

    count.update(|n| n + 5);
    count.update(|n| n * 2);
    assert_eq!(count.get(), 30);
    assert_eq!(seen.read().unwrap().as_slice(), [10, 15, 30]);
}

#[test]
fn completion_is_terminal_and_freezes_the_value() {
    let count = State::new(1);
    let completions = Arc::new(RwLock::new(0));
    count.subscribe_observer(Observer::new(|_: i32| {}).on_complete({
        let completions = Arc::clone(&completions);
        move || *completions.write().unwrap() += 1
    }));

    count.complete();
    count.next(9);
    count.update(|n| n + 1);

    assert!(count.is_stopped());
    assert_eq!(count.get(), 1);
    assert_eq!(*completions.read().unwrap(), 1);
    assert!(count.subscribe(|_: i32| {}).is_closed());
}

#[test]
fn to_stream_subscriptions_replay_and_track() {
    let count = State::new(4);
    let stream = count.to_stream();

    let seen = Arc::new(RwLock::new(Vec::new()));
    let subscription = stream.subscribe({
        let seen = Arc::clone(&seen);
        move |value: i32| seen.write().unwrap().push(value)
    });
    count.next(5);
    assert_eq!(seen.read().unwrap().as_slice(), [4, 5]);

    subscription.unsubscribe();
    count.next(6);
    assert_eq!(seen.read().unwrap().as_slice(), [4, 5]);
}

#[test]
fn acts_as_an_observer_for_upstream_streams() {
    let total = State::new(0);
    let doubled = Arc::new(RwLock::new(Vec::new()));
    total.subscribe({
        let doubled = Arc::clone(&doubled);
        move |value: i32| doubled.write().unwrap().push(value * 2)
    });

    reactive_streams::stream::Stream::new(move |observer: Observer<i32>| {
        observer.next(3);
        observer.next(4);
        None
    })
    .subscribe(total.clone());

    assert_eq!(total.get(), 4);
    assert_eq!(doubled.read().unwrap().as_slice(), [0, 6, 8]);
}

use reactive_streams::{observer::Observer, prelude::*, subject::Subject};
use std::sync::{Arc, RwLock};

#[test]
fn fans_a_value_out_to_every_observer() {
    let subject = Subject::new();
    let seen = Arc::new(RwLock::new(Vec::new()));

    for tag in ["a", "b"] {
        subject.subscribe({
            let seen = Arc::clone(&seen);
            move |value: i32| seen.write().unwrap().push((tag, value))
        });
    }

    subject.next(7);
    assert_eq!(seen.read().unwrap().as_slice(), [("a", 7), ("b", 7)]);
}

#[test]
fn shares_one_upstream_subscription() {
    // Piping a unicast stream through a subject runs the stream's setup once
    // no matter how many observers sit downstream.
    let setups = Arc::new(RwLock::new(0));
    let stream = reactive_streams::stream::Stream::new({
        let setups = Arc::clone(&setups);
        move |observer: Observer<i32>| {
            *setups.write().unwrap() += 1;
            observer.next(1);
            None
        }
    });

    let subject = Subject::new();
    let first = Arc::new(RwLock::new(Vec::new()));
    let second = Arc::new(RwLock::new(Vec::new()));
    subject.subscribe({
        let first = Arc::clone(&first);
        move |value: i32| first.write().unwrap().push(value)
    });
    subject.subscribe({
        let second = Arc::clone(&second);
        move |value: i32| second.write().unwrap().push(value)
    });

    stream.subscribe(subject.clone());
    assert_eq!(*setups.read().unwrap(), 1);
    assert_eq!(first.read().unwrap().as_slice(), [1]);
    assert_eq!(second.read().unwrap().as_slice(), [1]);

    // a subscriber added after the upstream hookup still shares it
    let third = Arc::new(RwLock::new(Vec::new()));
    subject.subscribe({
        let third = Arc::clone(&third);
        move |value: i32| third.write().unwrap().push(value)
    });
    subject.next(2);
    assert_eq!(*setups.read().unwrap(), 1);
    assert_eq!(first.read().unwrap().as_slice(), [1, 2]);
    assert_eq!(third.read().unwrap().as_slice(), [2]);
}

#[test]
fn delivers_in_subscription_order() {
    let subject = Subject::new();
    let order = Arc::new(RwLock::new(Vec::new()));

    for index in 0..4 {
        subject.subscribe({
            let order = Arc::clone(&order);
            move |_: i32| order.write().unwrap().push(index)
        });
    }

    subject.next(0);
    assert_eq!(order.read().unwrap().as_slice(), [0, 1, 2, 3]);
}

#[test]
fn unsubscribed_observers_stop_receiving() {
    let subject = Subject::new();
    let seen = Arc::new(RwLock::new(Vec::new()));

    let subscription = subject.subscribe({
        let seen = Arc::clone(&seen);
        move |value: i32| seen.write().unwrap().push(value)
    });
    assert_eq!(subject.observer_count(), 1);

    subject.next(1);
    subscription.unsubscribe();
    assert_eq!(subject.observer_count(), 0);

    subject.next(2);
    assert_eq!(seen.read().unwrap().as_slice(), [1]);
}

#[test]
fn unsubscribing_during_fan_out_is_safe() {
    let subject = Subject::new();
    let held = Arc::new(RwLock::new(None));
    let seen = Arc::new(RwLock::new(Vec::new()));

    let subscription = subject.subscribe({
        let held = Arc::clone(&held);
        let seen = Arc::clone(&seen);
        move |value: i32| {
            seen.write().unwrap().push(value);
            // drop ourselves from inside the delivery
            let taken: Option<reactive_streams::subscription::Subscription> =
                held.write().unwrap().take();
            if let Some(subscription) = taken {
                subscription.unsubscribe();
            }
        }
    });
    *held.write().unwrap() = Some(subscription);

    subject.next(1);
    subject.next(2);
    assert_eq!(seen.read().unwrap().as_slice(), [1]);
}

#[test]
fn completion_is_terminal() {
    let subject = Subject::new();
    let values = Arc::new(RwLock::new(Vec::new()));
    let completions = Arc::new(RwLock::new(0));

    subject.subscribe_observer(
        Observer::new({
            let values = Arc::clone(&values);
            move |value: i32| values.write().unwrap().push(value)
        })
        .on_complete({
            let completions = Arc::clone(&completions);
            move || *completions.write().unwrap() += 1
        }),
    );

    subject.next(1);
    subject.complete();
    subject.complete();
    subject.next(2);

    assert!(subject.is_stopped());
    assert_eq!(values.read().unwrap().as_slice(), [1]);
    assert_eq!(*completions.read().unwrap(), 1);
    assert_eq!(subject.observer_count(), 0);
}

#[test]
fn subscribing_after_stop_yields_a_closed_subscription() {
    let subject = Subject::new();
    subject.complete();

    let subscription = subject.subscribe(|_: i32| {});
    assert!(subscription.is_closed());
    assert_eq!(subject.observer_count(), 0);
}

#[test]
fn errors_stop_the_subject_and_reach_observers() {
    let subject: Subject<i32> = Subject::new();
    let failures = Arc::new(RwLock::new(Vec::new()));

    subject.subscribe_observer(Observer::empty().on_error({
        let failures = Arc::clone(&failures);
        move |error| failures.write().unwrap().push(error.to_string())
    }));

    subject.error(Arc::new(std::io::Error::other("device gone")));
    assert!(subject.is_stopped());
    assert_eq!(failures.read().unwrap().as_slice(), ["device gone"]);
}

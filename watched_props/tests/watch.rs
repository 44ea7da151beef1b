use serial_test::serial;
use std::sync::{Arc, RwLock};
use watched_props::{
    add_changed_listener, debug, remove_changed_listener, set_debug,
    ChangeListener, Descriptor, Getter, PropertyError, PropertyObject, Setter,
};

fn recording_listener(
    log: &Arc<RwLock<Vec<i32>>>,
) -> ChangeListener<i32> {
    let log = Arc::clone(log);
    Arc::new(move |value: &i32| log.write().unwrap().push(*value))
}

#[test]
fn data_properties_read_and_write_transparently() {
    let object = PropertyObject::new();
    object.define("count", 1);

    let log = Arc::new(RwLock::new(Vec::new()));
    let listener = recording_listener(&log);
    add_changed_listener(&object, "count", listener).unwrap();

    assert_eq!(object.get("count").unwrap(), 1);
    object.set("count", 2).unwrap();
    assert_eq!(object.get("count").unwrap(), 2);
    assert_eq!(log.read().unwrap().as_slice(), [2]);
}

#[test]
fn duplicate_registration_fires_once_per_write() {
    let object = PropertyObject::new();
    object.define("count", 0);

    let log = Arc::new(RwLock::new(Vec::new()));
    let listener = recording_listener(&log);
    add_changed_listener(&object, "count", Arc::clone(&listener)).unwrap();
    add_changed_listener(&object, "count", listener).unwrap();

    object.set("count", 5).unwrap();
    assert_eq!(log.read().unwrap().as_slice(), [5]);
}

#[test]
fn listeners_fire_in_registration_order() {
    let object = PropertyObject::new();
    object.define("count", 0);

    let order = Arc::new(RwLock::new(Vec::new()));
    let listeners: Vec<ChangeListener<i32>> = (0..3)
        .map(|index| {
            let order = Arc::clone(&order);
            let listener: ChangeListener<i32> =
                Arc::new(move |_: &i32| order.write().unwrap().push(index));
            listener
        })
        .collect();
    for listener in &listeners {
        add_changed_listener(&object, "count", Arc::clone(listener)).unwrap();
    }

    object.set("count", 1).unwrap();
    assert_eq!(order.read().unwrap().as_slice(), [0, 1, 2]);
}

#[test]
fn original_setter_runs_before_listeners() {
    let object = PropertyObject::new();
    let trace = Arc::new(RwLock::new(Vec::new()));
    let cell = Arc::new(RwLock::new(0));

    object.define_accessor(
        "count",
        {
            let cell = Arc::clone(&cell);
            move || *cell.read().unwrap()
        },
        {
            let cell = Arc::clone(&cell);
            let trace = Arc::clone(&trace);
            move |value: i32| {
                *cell.write().unwrap() = value;
                trace.write().unwrap().push("setter");
            }
        },
    );

    let listener: ChangeListener<i32> = Arc::new({
        let trace = Arc::clone(&trace);
        move |_: &i32| trace.write().unwrap().push("listener")
    });
    add_changed_listener(&object, "count", listener).unwrap();

    object.set("count", 7).unwrap();
    assert_eq!(object.get("count").unwrap(), 7);
    assert_eq!(trace.read().unwrap().as_slice(), ["setter", "listener"]);
}

#[test]
fn accessor_descriptors_are_restored_pointer_identical() {
    let object = PropertyObject::new();
    let cell = Arc::new(RwLock::new(0));
    object.define_accessor(
        "count",
        {
            let cell = Arc::clone(&cell);
            move || *cell.read().unwrap()
        },
        {
            let cell = Arc::clone(&cell);
            move |value: i32| *cell.write().unwrap() = value
        },
    );

    let (original_get, original_set): (Getter<i32>, Setter<i32>) =
        match object.descriptor("count").unwrap() {
            Descriptor::Accessor { get, set } => (get, set),
            Descriptor::Data(_) => panic!("expected an accessor"),
        };

    let listener: ChangeListener<i32> = Arc::new(|_: &i32| {});
    add_changed_listener(&object, "count", Arc::clone(&listener)).unwrap();

    // watched: the reported descriptor is the interception pair
    match object.descriptor("count").unwrap() {
        Descriptor::Accessor { get, set } => {
            assert!(!Arc::ptr_eq(&get, &original_get));
            assert!(!Arc::ptr_eq(&set, &original_set));
        }
        Descriptor::Data(_) => panic!("expected an accessor"),
    }

    remove_changed_listener(&object, "count", &listener);

    // unwatched: the exact original accessors are back
    match object.descriptor("count").unwrap() {
        Descriptor::Accessor { get, set } => {
            assert!(Arc::ptr_eq(&get, &original_get));
            assert!(Arc::ptr_eq(&set, &original_set));
        }
        Descriptor::Data(_) => panic!("expected an accessor"),
    }
}

#[test]
fn data_properties_restore_with_their_current_value() {
    let object = PropertyObject::new();
    object.define("count", 1);

    let listener: ChangeListener<i32> = Arc::new(|_: &i32| {});
    add_changed_listener(&object, "count", Arc::clone(&listener)).unwrap();
    object.set("count", 9).unwrap();
    remove_changed_listener(&object, "count", &listener);

    match object.descriptor("count").unwrap() {
        Descriptor::Data(value) => assert_eq!(value, 9),
        Descriptor::Accessor { .. } => panic!("expected a data slot"),
    }
    assert_eq!(object.get("count").unwrap(), 9);

    // fully restored: further writes notify nobody
    let log = Arc::new(RwLock::new(Vec::new()));
    let second = recording_listener(&log);
    object.set("count", 10).unwrap();
    add_changed_listener(&object, "count", Arc::clone(&second)).unwrap();
    object.set("count", 11).unwrap();
    assert_eq!(log.read().unwrap().as_slice(), [11]);
}

#[test]
fn earlier_listeners_survive_removal_of_later_ones() {
    let object = PropertyObject::new();
    object.define("count", 0);

    let log = Arc::new(RwLock::new(Vec::new()));
    let first = recording_listener(&log);
    let second: ChangeListener<i32> = Arc::new(|_: &i32| {});
    add_changed_listener(&object, "count", Arc::clone(&first)).unwrap();
    add_changed_listener(&object, "count", Arc::clone(&second)).unwrap();

    remove_changed_listener(&object, "count", &second);
    // still watched: the remaining listener keeps firing
    object.set("count", 3).unwrap();
    assert_eq!(log.read().unwrap().as_slice(), [3]);
    match object.descriptor("count").unwrap() {
        Descriptor::Accessor { .. } => {}
        Descriptor::Data(_) => panic!("still watched, expected an accessor"),
    }
}

#[test]
fn misuse_is_ignored() {
    let object = PropertyObject::new();
    object.define("count", 0);

    let never_added: ChangeListener<i32> = Arc::new(|_: &i32| {});
    // not watched at all
    remove_changed_listener(&object, "count", &never_added);
    // undefined property
    remove_changed_listener(&object, "missing", &never_added);

    let listener = recording_listener(&Arc::new(RwLock::new(Vec::new())));
    add_changed_listener(&object, "count", Arc::clone(&listener)).unwrap();
    // watched, but this listener was never registered
    remove_changed_listener(&object, "count", &never_added);
    object.set("count", 1).unwrap();
    assert_eq!(object.get("count").unwrap(), 1);
}

#[test]
#[serial]
fn debug_flag_round_trips() {
    assert!(!debug());
    set_debug(true);
    assert!(debug());
    set_debug(false);
    assert!(!debug());
}

#[test]
#[serial]
fn misuse_stays_a_no_op_with_debug_enabled() {
    set_debug(true);

    let object = PropertyObject::new();
    object.define("count", 0);
    let never_added: ChangeListener<i32> = Arc::new(|_: &i32| {});
    // warned about, but still ignored
    remove_changed_listener(&object, "count", &never_added);
    remove_changed_listener(&object, "missing", &never_added);

    object.set("count", 1).unwrap();
    assert_eq!(object.get("count").unwrap(), 1);
    set_debug(false);
}

#[test]
fn undefined_properties_error() {
    let object: PropertyObject<i32> = PropertyObject::new();

    assert!(matches!(
        object.get("missing"),
        Err(PropertyError::Undefined(name)) if name == "missing"
    ));
    assert!(matches!(
        object.set("missing", 1),
        Err(PropertyError::Undefined(_))
    ));
    let listener: ChangeListener<i32> = Arc::new(|_: &i32| {});
    assert!(matches!(
        add_changed_listener(&object, "missing", listener),
        Err(PropertyError::Undefined(_))
    ));
}

#[test]
fn names_keep_definition_order_across_watching() {
    let object = PropertyObject::new();
    object.define("first", 1);
    object.define("second", 2);
    object.define("third", 3);

    let listener: ChangeListener<i32> = Arc::new(|_: &i32| {});
    add_changed_listener(&object, "second", Arc::clone(&listener)).unwrap();
    remove_changed_listener(&object, "second", &listener);

    assert_eq!(object.names(), ["first", "second", "third"]);
}

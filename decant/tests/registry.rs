use std::sync::Mutex;
use std::sync::mpsc::Sender;

use decant::{DecodeErrorKind, Engine, FieldOverride, JsonIter, PtrMut, Reflect};
use decant_testhelpers::test;

/// Serializes the tests that touch the global engine.
static GLOBAL_REGISTRY: Mutex<()> = Mutex::new(());

#[derive(Reflect, Debug, PartialEq)]
struct Point {
    x: i32,
    y: i32,
}

#[derive(Reflect)]
struct Job {
    name: String,
    done: Sender<i32>,
}

fn write<T>(ptr: PtrMut, value: T) {
    unsafe { *ptr.as_mut::<T>() = value };
}

fn string_length(ptr: PtrMut, iter: &mut JsonIter<'_>) {
    let s = iter.read_string();
    write(ptr, s.len() as u32);
}

#[test]
fn type_decoder_replaces_builtin() {
    let engine = Engine::new();
    engine.registry().register_type("u32", string_length);

    let lengths: Vec<u32> = engine.from_str(r#"["ab", "cde", ""]"#).unwrap();
    assert_eq!(lengths, [2, 3, 0]);
}

#[test]
fn type_decoder_for_generic_type_name() {
    let engine = Engine::new();
    engine
        .registry()
        .register_type("Vec<u8>", |ptr: PtrMut, iter: &mut JsonIter<'_>| {
            let s = iter.read_string();
            write(ptr, s.into_bytes());
        });

    let value: Option<Vec<u8>> = engine.from_str(r#""hi""#).unwrap();
    assert_eq!(value.as_deref(), Some(&b"hi"[..]));
}

#[test]
fn type_decoder_makes_unsupported_type_decodable() {
    let engine = Engine::new();
    assert!(engine.from_str::<Job>(r#"{"name": "j"}"#).is_err());

    engine
        .registry()
        .register_type("Sender<i32>", |_: PtrMut, iter: &mut JsonIter<'_>| iter.skip());
    let job: Job = engine.from_str(r#"{"name": "j", "done": [1, 2]}"#).unwrap();
    assert_eq!(job.name, "j");
    job.done.send(1).ok();
}

#[test]
fn field_decoder_targets_one_field() {
    let engine = Engine::new();
    engine
        .registry()
        .register_field("Point", "x", |ptr: PtrMut, iter: &mut JsonIter<'_>| {
            let v = iter.read_i32();
            write(ptr, v * 10);
        });

    let p: Point = engine.from_str(r#"{"x": 2, "y": 3}"#).unwrap();
    assert_eq!(p, Point { x: 20, y: 3 });
}

#[test]
fn extension_renames_field() {
    let engine = Engine::new();
    engine.registry().register_extension(|owner, field| {
        (owner.type_identifier == "Point" && field.name == "y").then(|| FieldOverride {
            names: vec!["Y".to_owned(), "why".to_owned()],
            decoder: None,
        })
    });

    assert_eq!(
        engine.from_str::<Point>(r#"{"x": 1, "Y": 2}"#).unwrap(),
        Point { x: 1, y: 2 }
    );
    assert_eq!(
        engine.from_str::<Point>(r#"{"why": 5}"#).unwrap(),
        Point { x: 0, y: 5 }
    );
    assert_eq!(
        engine.from_str::<Point>(r#"{"y": 5}"#).unwrap(),
        Point { x: 0, y: 0 }
    );
}

#[test]
fn extension_with_empty_names_keeps_the_key() {
    let engine = Engine::new();
    engine.registry().register_extension(|_, field| {
        (field.name == "x").then(|| FieldOverride {
            names: Vec::new(),
            decoder: Some(std::sync::Arc::new(|ptr: PtrMut, iter: &mut JsonIter<'_>| {
                let v = iter.read_i32();
                write(ptr, -v);
            })),
        })
    });

    let p: Point = engine.from_str(r#"{"x": 4, "y": 4}"#).unwrap();
    assert_eq!(p, Point { x: -4, y: 4 });
}

#[test]
fn first_extension_wins() {
    let engine = Engine::new();
    engine.registry().register_extension(|_, field| {
        (field.name == "x").then(|| FieldOverride {
            names: vec!["first".to_owned()],
            decoder: None,
        })
    });
    engine.registry().register_extension(|_, field| {
        (field.name == "x").then(|| FieldOverride {
            names: vec!["second".to_owned()],
            decoder: None,
        })
    });

    let p: Point = engine.from_str(r#"{"first": 1, "second": 2}"#).unwrap();
    assert_eq!(p.x, 1);
}

#[test]
fn field_registration_beats_extension_decoder() {
    let engine = Engine::new();
    engine
        .registry()
        .register_field("Point", "x", |ptr: PtrMut, iter: &mut JsonIter<'_>| {
            iter.skip();
            write(ptr, 100i32);
        });
    engine.registry().register_extension(|_, field| {
        (field.name == "x").then(|| FieldOverride {
            names: vec!["ex".to_owned()],
            decoder: Some(std::sync::Arc::new(|ptr: PtrMut, iter: &mut JsonIter<'_>| {
                iter.skip();
                write(ptr, 200i32);
            })),
        })
    });

    // the extension still renames the field
    let p: Point = engine.from_str(r#"{"ex": 0}"#).unwrap();
    assert_eq!(p.x, 100);
}

#[test]
fn registered_decoder_reports_custom_error() {
    let engine = Engine::new();
    engine
        .registry()
        .register_type("bool", |_: PtrMut, iter: &mut JsonIter<'_>| {
            iter.report_custom("no booleans here")
        });

    let err = engine.from_str::<Vec<bool>>("[true]").unwrap_err();
    match err.kind {
        DecodeErrorKind::Custom(msg) => assert_eq!(msg, "no booleans here"),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn registration_applies_to_types_compiled_later() {
    let engine = Engine::new();
    assert_eq!(engine.from_str::<Vec<u32>>("[7]").unwrap(), [7]);

    engine.registry().register_type("u32", string_length);
    // still the cached decoder
    assert_eq!(engine.from_str::<Vec<u32>>("[7]").unwrap(), [7]);

    engine.cache().clear();
    assert_eq!(engine.from_str::<Vec<u32>>(r#"["seven"]"#).unwrap(), [5]);
}

#[test]
fn reset_forgets_type_and_field_decoders() {
    let engine = Engine::new();
    engine.registry().register_type("u32", string_length);
    engine.registry().reset();
    assert_eq!(engine.from_str::<Vec<u32>>("[1]").unwrap(), [1]);
}

#[test]
fn global_registration_round_trip() {
    let _guard = GLOBAL_REGISTRY.lock().unwrap_or_else(|e| e.into_inner());

    decant::register_type_decoder("u16", |ptr: PtrMut, iter: &mut JsonIter<'_>| {
        let s = iter.read_string();
        write(ptr, s.len() as u16);
    });
    decant::clear_cache();
    assert_eq!(decant::from_str::<Vec<u16>>(r#"["abcd"]"#).unwrap(), [4]);

    decant::clean_decoders();
    decant::clear_cache();
    assert_eq!(decant::from_str::<Vec<u16>>("[4]").unwrap(), [4]);
}

#[test]
fn global_field_decoder_and_extension() {
    let _guard = GLOBAL_REGISTRY.lock().unwrap_or_else(|e| e.into_inner());

    #[derive(Reflect, Debug, PartialEq)]
    struct Tagged {
        id: u64,
        label: String,
    }

    decant::register_field_decoder("Tagged", "id", |ptr: PtrMut, iter: &mut JsonIter<'_>| {
        let v = iter.read_u64();
        write(ptr, v + 1);
    });
    decant::register_extension(|owner, field| {
        (owner.type_identifier == "Tagged" && field.name == "label").then(|| FieldOverride {
            names: vec!["name".to_owned()],
            decoder: None,
        })
    });
    decant::clear_cache();

    let tagged: Tagged = decant::from_str(r#"{"id": 1, "name": "n"}"#).unwrap();
    assert_eq!(
        tagged,
        Tagged {
            id: 2,
            label: "n".to_owned(),
        }
    );

    decant::clean_decoders();
    decant::clear_cache();
}

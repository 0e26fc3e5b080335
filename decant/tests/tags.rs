use decant::{DecodeErrorKind, Reflect, from_str};
use decant_testhelpers::test;

#[derive(Reflect, Debug, PartialEq)]
struct Renamed {
    #[json = "field-1"]
    field1: String,
    #[json = "field-2"]
    field2: String,
    #[json = "-"]
    ignored: String,
}

#[test]
fn renamed_and_skipped_fields() {
    let value: Renamed = from_str(
        r#"{"field-1": "a", "field-2": "b", "field1": "nope", "ignored": "nope", "-": "nope"}"#,
    )
    .unwrap();
    assert_eq!(
        value,
        Renamed {
            field1: "a".to_owned(),
            field2: "b".to_owned(),
            ignored: String::new(),
        }
    );
}

#[derive(Reflect, Debug, PartialEq)]
struct Dash {
    #[json = "-,"]
    dash: u8,
}

#[test]
fn dash_comma_is_a_literal_key() {
    assert_eq!(from_str::<Dash>(r#"{"-": 4}"#).unwrap(), Dash { dash: 4 });
}

#[derive(Reflect, Debug, PartialEq)]
struct Quoted {
    #[json = ",string"]
    count: u32,
    #[json = "ratio,string"]
    ratio: f64,
    #[json = ",string"]
    flag: bool,
    #[json = ",string"]
    label: String,
    #[json = "plain,unknown-option"]
    plain: i8,
}

#[test]
fn string_option_unwraps_scalars() {
    let value: Quoted = from_str(
        r#"{"count": "100", "ratio": "0.5", "flag": "true", "label": "as is", "plain": -1}"#,
    )
    .unwrap();
    assert_eq!(
        value,
        Quoted {
            count: 100,
            ratio: 0.5,
            flag: true,
            label: "as is".to_owned(),
            plain: -1,
        }
    );
}

#[test]
fn string_option_requires_quotes() {
    let err = from_str::<Quoted>(r#"{"count": 100}"#).unwrap_err();
    assert!(matches!(
        err.kind,
        DecodeErrorKind::Syntax {
            expected: "'\"'",
            found: '1'
        }
    ));
}

#[test]
fn string_option_rejects_trailing_content() {
    let err = from_str::<Quoted>(r#"{"count": "100x"}"#).unwrap_err();
    assert!(matches!(
        err.kind,
        DecodeErrorKind::Syntax {
            expected: "'\"'",
            found: 'x'
        }
    ));
}

#[test]
fn string_option_rejects_padding_inside_the_quotes() {
    for input in [r#"{"count": " 100"}"#, "{\"count\": \"\n100\"}", r#"{"count": ""}"#] {
        let err = from_str::<Quoted>(input).unwrap_err();
        assert!(
            matches!(
                err.kind,
                DecodeErrorKind::Syntax {
                    expected: "a value right after '\"'",
                    ..
                }
            ),
            "{input}: {err}"
        );
    }
}

#[derive(Reflect, Debug, PartialEq)]
struct RawIdent {
    r#type: String,
}

#[test]
fn raw_identifiers_use_their_plain_name() {
    let value: RawIdent = from_str(r#"{"type": "t"}"#).unwrap();
    assert_eq!(value.r#type, "t");
}

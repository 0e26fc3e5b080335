use std::collections::{BTreeMap, HashMap};

use decant::{DecodeErrorKind, Reflect, from_str, unmarshal_str};
use decant_testhelpers::test;

#[test]
fn vec_of_scalars() {
    assert_eq!(from_str::<Vec<i32>>("[1, -2, 3]").unwrap(), [1, -2, 3]);
    assert!(from_str::<Vec<i32>>("[]").unwrap().is_empty());
    assert!(from_str::<Vec<i32>>("null").unwrap().is_empty());
}

#[test]
fn vec_is_replaced_not_appended() {
    let mut value = vec![9u8, 9, 9];
    unmarshal_str("[1]", &mut value).unwrap();
    assert_eq!(value, [1]);
}

#[test]
fn nested_vecs() {
    let value: Vec<Vec<String>> = from_str(r#"[["a"], [], ["b", "c"]]"#).unwrap();
    assert_eq!(value, [vec!["a"], vec![], vec!["b", "c"]]);
}

#[test]
fn partial_vec_on_error() {
    let mut value = Vec::<u8>::new();
    let err = unmarshal_str("[1, 2, 300, 4]", &mut value).unwrap_err();
    assert!(matches!(err.kind, DecodeErrorKind::MalformedNumber { .. }));
    // the failing element was pushed as zero before decoding
    assert_eq!(value, [1, 2, 0]);
}

#[test]
fn unterminated_array() {
    let err = from_str::<Vec<u8>>("[1, 2").unwrap_err();
    assert!(matches!(err.kind, DecodeErrorKind::UnexpectedEof { .. }));
}

#[test]
fn hash_map_of_structs() {
    #[derive(Reflect, Debug, PartialEq)]
    struct Score {
        points: u32,
    }

    let value: HashMap<String, Score> =
        from_str(r#"{"amy": {"points": 3}, "bo": {"points": 5}}"#).unwrap();
    assert_eq!(value.len(), 2);
    assert_eq!(value["amy"], Score { points: 3 });
    assert_eq!(value["bo"], Score { points: 5 });
}

#[test]
fn map_merges_into_existing_entries() {
    let mut value = BTreeMap::from([("keep".to_owned(), 1u8), ("swap".to_owned(), 2)]);
    unmarshal_str(r#"{"swap": 20, "new": 30, "new": 31}"#, &mut value).unwrap();
    assert_eq!(
        value.into_iter().collect::<Vec<_>>(),
        [
            ("keep".to_owned(), 1),
            ("new".to_owned(), 31),
            ("swap".to_owned(), 20),
        ]
    );
}

#[test]
fn map_with_empty_key() {
    let value: HashMap<String, bool> = from_str(r#"{"": true}"#).unwrap();
    assert_eq!(value.get(""), Some(&true));
}

#[test]
fn map_stops_at_first_bad_value() {
    let mut value = HashMap::<String, u8>::new();
    assert!(unmarshal_str(r#"{"a": 1, "b": -1, "c": 3}"#, &mut value).is_err());
    assert_eq!(value.len(), 1);
    assert_eq!(value["a"], 1);
}

#[test]
fn map_of_vecs_of_options() {
    let value: HashMap<String, Vec<Option<u16>>> =
        from_str(r#"{"xs": [1, null, 3]}"#).unwrap();
    assert_eq!(value["xs"], [Some(1), None, Some(3)]);
}

#[derive(Reflect, Debug, PartialEq)]
struct Node {
    label: String,
    children: Vec<Node>,
}

#[test]
fn recursive_struct() {
    let tree: Node = from_str(
        r#"{"label": "root", "children": [
            {"label": "a", "children": []},
            {"label": "b", "children": [{"label": "b1", "children": []}]}
        ]}"#,
    )
    .unwrap();
    assert_eq!(tree.label, "root");
    assert_eq!(tree.children.len(), 2);
    assert_eq!(tree.children[1].children[0].label, "b1");
}

#[test]
fn recursive_struct_through_vec_root() {
    let forest: Vec<Node> = from_str(r#"[{"label": "x", "children": [{"label": "y"}]}]"#).unwrap();
    assert_eq!(forest[0].children[0].label, "y");
    assert!(forest[0].children[0].children.is_empty());
}

#[test]
fn arrays_must_open_with_a_bracket() {
    for input in ["]", ",1]", "[,1]"] {
        let err = from_str::<Vec<u32>>(input).unwrap_err();
        assert!(
            matches!(err.kind, DecodeErrorKind::Syntax { .. }),
            "{input}: {err}"
        );
    }
}

#[test]
fn elements_need_separators() {
    let err = from_str::<Vec<u32>>("[1 2]").unwrap_err();
    assert!(matches!(
        err.kind,
        DecodeErrorKind::Syntax {
            expected: "',' or ']'",
            found: '2'
        }
    ));

    let err = from_str::<Vec<u32>>("[1,]").unwrap_err();
    assert!(matches!(err.kind, DecodeErrorKind::Syntax { .. }));
}

#[test]
fn maps_reject_stray_separators() {
    for input in [r#"{,"a": 1}"#, r#"{"a": 1,}"#, r#"{"a": 1 "b": 2}"#, "}"] {
        let err = from_str::<HashMap<String, u8>>(input).unwrap_err();
        assert!(
            matches!(err.kind, DecodeErrorKind::Syntax { .. }),
            "{input}: {err}"
        );
    }
}

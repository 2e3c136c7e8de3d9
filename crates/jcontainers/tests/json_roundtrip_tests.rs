//! Round-trip tests: live graph -> JSON -> live graph

use std::collections::{HashMap, VecDeque};

use jcontainers::*;
use pretty_assertions::assert_eq;
use serde_json::json;

fn ctx() -> JsonContext {
    JsonContext::with_plugins(PluginTable::new(["Skyrim.esm", "Update.esm"]))
}

fn entries(obj: &Object) -> Vec<(Key, Item)> {
    let guard = obj.lock();
    match &*guard {
        Storage::Array(items) => items
            .iter()
            .enumerate()
            .map(|(i, item)| (Key::Index(i), item.clone()))
            .collect(),
        Storage::Map(map) => {
            let mut out: Vec<_> = map
                .iter()
                .map(|(k, item)| (Key::Str(k.clone()), item.clone()))
                .collect();
            out.sort_by(|a, b| format!("{:?}", a.0).cmp(&format!("{:?}", b.0)));
            out
        }
        Storage::FormMap(map) => map
            .iter()
            .map(|(f, item)| (Key::Form(*f), item.clone()))
            .collect(),
    }
}

/// Walk both graphs in lockstep, checking kinds, keys, primitive values and
/// that node identity maps one-to-one.
fn assert_isomorphic(a: &Object, b: &Object) {
    let mut forward: HashMap<usize, usize> = HashMap::new();
    let mut backward: HashMap<usize, usize> = HashMap::new();
    let mut queue = VecDeque::from([(a.clone(), b.clone())]);
    forward.insert(a.id(), b.id());
    backward.insert(b.id(), a.id());

    while let Some((x, y)) = queue.pop_front() {
        assert_eq!(x.kind(), y.kind());
        let xs = entries(&x);
        let ys = entries(&y);
        assert_eq!(xs.len(), ys.len(), "entry count differs in {:?}", x);

        for ((kx, ix), (ky, iy)) in xs.iter().zip(ys.iter()) {
            assert_eq!(kx, ky);
            match (ix, iy) {
                (Item::Object(cx), Item::Object(cy)) => match forward.get(&cx.id()) {
                    Some(mapped) => assert_eq!(*mapped, cy.id(), "sharing differs at {:?}", kx),
                    None => {
                        assert!(!backward.contains_key(&cy.id()), "extra sharing at {:?}", kx);
                        forward.insert(cx.id(), cy.id());
                        backward.insert(cy.id(), cx.id());
                        queue.push_back((cx.clone(), cy.clone()));
                    }
                },
                _ => assert_eq!(ix, iy, "value differs at {:?}", kx),
            }
        }
    }
}

fn reload(root: &Object) -> Object {
    let text = json::to_string(&ctx(), root).unwrap();
    json::from_str(&ctx(), &text).unwrap()
}

// ═══════════════════════════════════════════════════════════════════════
// Acyclic graphs
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn test_round_trip_acyclic_with_sharing() {
    let root = Object::map();
    let shared = Object::map();
    shared.set_value_for_key("name", "Lydia");

    let list = Object::array_with([
        Item::Int(1),
        Item::Real(2.5),
        Item::string("s"),
        Item::Bool(true),
        Item::None,
        Item::Form(FormId(0x0100_0d62)),
    ]);
    list.push(&shared);
    list.push(&shared);

    let deep = Object::map();
    deep.set_value_for_key("x", 1);
    let nested = Object::map();
    nested.set_value_for_key("deep", &deep);

    let forms = Object::form_map();
    forms.set_value_for_form(FormId(0x14), &shared);
    forms.set_value_for_form(FormId(0x15), -7);

    root.set_value_for_key("list", &list);
    root.set_value_for_key("nested", &nested);
    root.set_value_for_key("forms", &forms);
    root.set_value_for_key("shared", &shared);

    let loaded = reload(&root);
    assert_isomorphic(&root, &loaded);

    let a = path::resolve(&ctx(), &loaded, ".list[6]").unwrap();
    let b = path::resolve(&ctx(), &loaded, ".shared").unwrap();
    let c = path::resolve(&ctx(), &loaded, ".forms[__formData|Skyrim.esm|0x14]").unwrap();
    assert_eq!(a, b);
    assert_eq!(b, c);
}

#[test]
fn test_shared_node_appears_once() {
    let root = Object::map();
    let x = Object::map();
    let y = Object::map();
    let z = Object::array_with([1, 2]);
    x.set_value_for_key("z", &z);
    y.set_value_for_key("z", &z);
    root.set_value_for_key("x", &x);
    root.set_value_for_key("y", &y);

    let value = json::to_value(&ctx(), &root);
    assert_eq!(
        value,
        json!({"x": {"z": [1, 2]}, "y": {"z": "__reference|.x.z"}})
    );

    let loaded = json::from_value(&ctx(), &value).unwrap();
    assert_isomorphic(&root, &loaded);
}

#[test]
fn test_reserialize_is_stable() {
    let ctx = ctx();
    let text = r#"{
  "a": {
    "k": "__reference|.b"
  },
  "b": [
    1,
    "__reference|.b",
    "__formData|Update.esm|0xd62"
  ]
}"#;
    let loaded = json::from_str(&ctx, text).unwrap();
    // `.b` is now met before `.a.k` is filled, so nothing moves
    assert_eq!(json::to_string(&ctx, &loaded).unwrap(), text);
    loaded.clear();
}

#[test]
fn test_deep_chain_round_trip() {
    const DEPTH: usize = 1_000;

    let root = Object::map();
    let leaf = Object::array_with([7]);
    let mut node = root.clone();
    for _ in 0..DEPTH {
        let next = Object::map();
        node.set_value_for_key("n", &next);
        node = next;
    }
    node.set_value_for_key("leaf", &leaf);
    root.set_value_for_key("shortcut", &leaf);

    let text = json::to_string(&ctx(), &root).unwrap();
    let loaded = json::from_str(&ctx(), &text).unwrap();
    assert_isomorphic(&root, &loaded);

    let deep_leaf = format!("{}.leaf", ".n".repeat(DEPTH));
    let a = path::resolve(&ctx(), &loaded, &deep_leaf).unwrap();
    let b = path::resolve(&ctx(), &loaded, ".shortcut").unwrap();
    assert_eq!(a, b);
}

#[test]
fn test_sharing_through_empty_key() {
    let root = Object::map();
    let shared = Object::array_with([1]);
    root.set_value_for_key("", &shared);
    root.set_value_for_key("b", &shared);

    let value = json::to_value(&ctx(), &root);
    assert_eq!(value, json!({"": [1], "b": "__reference|."}));

    let loaded = json::from_value(&ctx(), &value).unwrap();
    assert_isomorphic(&root, &loaded);
    let b = loaded.value_for_key("b").and_then(Item::into_object).unwrap();
    let empty = loaded.value_for_key("").and_then(Item::into_object).unwrap();
    assert!(b.ptr_eq(&empty));
}

// ═══════════════════════════════════════════════════════════════════════
// Cycles and references
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn test_self_reference_round_trip() {
    let root = Object::map();
    root.set_value_for_key("k", &root);

    assert_eq!(json::to_value(&ctx(), &root), json!({"k": "__reference|"}));

    let loaded = reload(&root);
    let k = loaded.value_for_key("k").and_then(Item::into_object).unwrap();
    assert!(k.ptr_eq(&loaded));
    assert_isomorphic(&root, &loaded);

    root.clear();
    loaded.clear();
}

#[test]
fn test_cycle_through_three_nodes() {
    let a = Object::map();
    let b = Object::array();
    let c = Object::form_map();
    a.set_value_for_key("b", &b);
    b.push(&c);
    c.set_value_for_form(FormId(0x14), &a);

    let loaded = reload(&a);
    assert_isomorphic(&a, &loaded);

    let back = path::resolve(&ctx(), &loaded, ".b[0][__formData|Skyrim.esm|0x14]").unwrap();
    assert_eq!(back, Item::from(&loaded));

    a.clear();
    loaded.clear();
}

#[test]
fn test_forward_reference() {
    let ctx = ctx();
    let root = json::from_str(&ctx, r#"{"a": {"k": "__reference|.b"}, "b": {"v": 1}}"#).unwrap();

    let target = path::resolve(&ctx, &root, ".a.k").and_then(Item::into_object).unwrap();
    let b = root.value_for_key("b").and_then(Item::into_object).unwrap();
    assert!(target.ptr_eq(&b));
    assert_eq!(path::resolve(&ctx, &root, ".a.k.v"), Some(Item::Int(1)));
}

#[test]
fn test_reference_to_later_array_element() {
    let ctx = ctx();
    let root = json::from_str(&ctx, r#"[["__reference|[1]"], {"x": 2}]"#).unwrap();
    assert_eq!(path::resolve(&ctx, &root, "[0][0].x"), Some(Item::Int(2)));
}

#[test]
fn test_dangling_reference_is_dropped() {
    let ctx = ctx();
    let root = json::from_str(
        &ctx,
        r#"{"gone": "__reference|.nowhere.at.all", "bad": "__reference|[[", "kept": 5}"#,
    )
    .unwrap();

    assert_eq!(root.value_for_key("gone"), Some(Item::None));
    assert_eq!(root.value_for_key("bad"), Some(Item::None));
    assert_eq!(root.value_for_key("kept"), Some(Item::Int(5)));
}

#[test]
fn test_marker_strings_survive() {
    let ctx = ctx();
    let root = Object::array_with(["__init", "_x", "__referenceless", "__formData"]);
    let loaded = reload(&root);
    assert_isomorphic(&root, &loaded);
    assert!(json::to_string(&ctx, &loaded).is_ok());
}

// ═══════════════════════════════════════════════════════════════════════
// Form maps
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn test_form_map_and_map_are_distinguished() {
    let ctx = ctx();
    let map = Object::map();
    map.set_value_for_key("__formData|Skyrim.esm|0x14", 1);
    let forms = Object::form_map();
    forms.set_value_for_form(FormId(0x14), 1);

    let map_json = json::to_value(&ctx, &map);
    let forms_json = json::to_value(&ctx, &forms);
    assert_eq!(map_json, json!({"__formData|Skyrim.esm|0x14": 1}));
    assert_eq!(
        forms_json,
        json!({"__formData": null, "__formData|Skyrim.esm|0x14": 1})
    );

    let map_back = json::from_value(&ctx, &map_json).unwrap();
    let forms_back = json::from_value(&ctx, &forms_json).unwrap();
    assert!(map_back.is_map());
    assert!(forms_back.is_form_map());
    assert_isomorphic(&map, &map_back);
    assert_isomorphic(&forms, &forms_back);
}

#[test]
fn test_form_values_without_text_become_null() {
    let ctx = ctx();
    let root = Object::array_with([FormId(0x0700_0001), FormId::ZERO]);
    assert_eq!(json::to_value(&ctx, &root), json!([null, null]));
}

// ═══════════════════════════════════════════════════════════════════════
// Files
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn test_file_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("doc.json");

    let root = Object::map();
    let shared = Object::array_with([1, 2, 3]);
    root.set_value_for_key("a", &shared);
    root.set_value_for_key("b", &shared);

    json::to_file(&ctx(), &root, &file).unwrap();
    let loaded = json::from_file(&ctx(), &file).unwrap();
    assert_isomorphic(&root, &loaded);
}

#[test]
fn test_missing_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let result = json::from_file(&ctx(), dir.path().join("absent.json"));
    assert!(matches!(result, Err(JcError::Io { .. })));
}

#[test]
fn test_malformed_text_yields_no_graph() {
    assert!(matches!(
        json::from_str(&ctx(), r#"{"a": [1, 2"#),
        Err(JcError::Json(_))
    ));
    assert!(matches!(
        json::from_str(&ctx(), r#""just a string""#),
        Err(JcError::NotAContainer("string"))
    ));
}

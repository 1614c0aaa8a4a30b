//! Tests for XmpIterator

#[path = "fixtures/mod.rs"]
mod fixtures;

use fixtures::{context, NS1, NS2};
use libxmp::{
    ErrorCode, IterClass, IterFlags, IterState, PropFlags, SkipFlags, XmpIterator, XmpMeta, XmpProperty,
};
use pretty_assertions::assert_eq;

fn populated(ctx: &libxmp::Context) -> XmpMeta<'_> {
    let mut m = XmpMeta::new(ctx).unwrap();
    m.set_struct_field(NS1, "Struct", NS2, "Field", "f", PropFlags::empty())
        .unwrap();
    m.set_property(NS1, "Simple", "s", PropFlags::empty()).unwrap();
    m.set_property(NS2, "Other", "o", PropFlags::empty()).unwrap();
    m
}

fn paths(properties: &[XmpProperty]) -> Vec<(&str, &str)> {
    properties
        .iter()
        .map(|p| (p.schema.as_str(), p.path.as_str()))
        .collect()
}

#[test]
fn full_walk_is_depth_first() {
    let (ctx, _) = context();
    let m = populated(&ctx);
    let all: Vec<_> = m.iter().unwrap().collect::<Result<_, _>>().unwrap();
    assert_eq!(
        paths(&all),
        vec![
            (NS1, ""),
            (NS1, "ns1:Struct"),
            (NS1, "ns1:Struct/ns2:Field"),
            (NS1, "ns1:Simple"),
            (NS2, ""),
            (NS2, "ns2:Other"),
        ]
    );
    assert!(all[0].is_schema());
    assert!(all[1].is_struct());
    assert_eq!(all[3].value, "s");
}

#[test]
fn state_transitions() {
    let (ctx, engine) = context();
    let m = populated(&ctx);
    let mut iter = m.iter().unwrap();
    assert_eq!(iter.state(), IterState::Created);
    assert!(iter.next_property().unwrap().is_some());
    assert_eq!(iter.state(), IterState::Iterating);
    while iter.next_property().unwrap().is_some() {}
    assert_eq!(iter.state(), IterState::Exhausted);
    assert_eq!(iter.next_property().unwrap(), None);
    iter.free().unwrap();
    assert_eq!(engine.live_iterators(), 0);
    assert_eq!(engine.live_strings(), 0);
}

#[test]
fn each_iter_starts_fresh() {
    let (ctx, _) = context();
    let m = populated(&ctx);
    let mut first = m.iter().unwrap();
    first.next_property().unwrap();
    first.next_property().unwrap();
    let second: Vec<_> = m.iter().unwrap().collect::<Result<_, _>>().unwrap();
    assert_eq!(second.len(), 6);
}

#[test]
fn skip_subtree_at_first_schema() {
    let (ctx, _) = context();
    let m = populated(&ctx);
    let mut iter = m.iter().unwrap();
    let first = iter.next_property().unwrap().unwrap();
    assert_eq!(first.schema, NS1);
    XmpIterator::skip(&mut iter, SkipFlags::SKIP_SUBTREE).unwrap();
    assert_eq!(iter.state(), IterState::Iterating);

    let rest: Vec<_> = iter.collect::<Result<_, _>>().unwrap();
    assert!(rest.iter().all(|p| p.schema == NS2));
    assert_eq!(paths(&rest), vec![(NS2, ""), (NS2, "ns2:Other")]);
}

#[test]
fn skip_siblings() {
    let (ctx, _) = context();
    let m = populated(&ctx);
    let mut iter = m.iter().unwrap();
    iter.next_property().unwrap();
    let structure = iter.next_property().unwrap().unwrap();
    assert_eq!(structure.path, "ns1:Struct");
    XmpIterator::skip(&mut iter, SkipFlags::SKIP_SIBLINGS).unwrap();
    let next = iter.next_property().unwrap().unwrap();
    assert_eq!((next.schema.as_str(), next.path.as_str()), (NS2, ""));
}

#[test]
fn skip_rejects_combined_flags() {
    let (ctx, _) = context();
    let m = populated(&ctx);
    let mut iter = m.iter().unwrap();
    iter.next_property().unwrap();
    let err = XmpIterator::skip(&mut iter, SkipFlags::SKIP_SUBTREE | SkipFlags::SKIP_SIBLINGS)
        .unwrap_err();
    assert_eq!(err.code(), Some(ErrorCode::BadOptions));
}

#[test]
fn scoped_to_schema() {
    let (ctx, _) = context();
    let m = populated(&ctx);
    let scoped: Vec<_> = m
        .iter_with(Some(NS2), None, IterFlags::empty())
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap();
    assert!(scoped.iter().all(|p| p.schema == NS2));
    assert!(scoped.iter().any(|p| p.path == "ns2:Other"));
}

#[test]
fn leaf_nodes_only() {
    let (ctx, _) = context();
    let m = populated(&ctx);
    let leaves: Vec<_> = m
        .iter_with(None, None, IterFlags::JUST_LEAF_NODES)
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap();
    assert_eq!(
        paths(&leaves),
        vec![
            (NS1, "ns1:Struct/ns2:Field"),
            (NS1, "ns1:Simple"),
            (NS2, "ns2:Other"),
        ]
    );
}

#[test]
fn namespaces_class_is_unimplemented() {
    let (ctx, engine) = context();
    let m = populated(&ctx);
    let err = m
        .iter_class(IterClass::Namespaces, None, None, IterFlags::empty())
        .unwrap_err();
    assert_eq!(err.code(), Some(ErrorCode::Unimplemented));
    assert_eq!(engine.live_iterators(), 0);
}

#[test]
fn drop_frees_iterator() {
    let (ctx, engine) = context();
    let m = populated(&ctx);
    {
        let mut iter = m.iter().unwrap();
        iter.next_property().unwrap();
        assert_eq!(engine.live_iterators(), 1);
    }
    assert_eq!(engine.live_iterators(), 0);
}

//! Tests for XmpMeta API
//!
//! These run against the memory engine, which shares the native engine's
//! calling conventions but not its RDF parser or serializer.

#[path = "fixtures/mod.rs"]
mod fixtures;

use fixtures::{context, NS1, NS2};
use libxmp::{ErrorCode, PropFlags, XmpError, XmpMeta};

#[test]
fn new_empty() {
    let (ctx, _) = context();
    let m = XmpMeta::new(&ctx).unwrap();
    assert!(!m.does_property_exist(NS1, "SimpleProp1").unwrap());
    assert_eq!(m.get_property(NS1, "SimpleProp1").unwrap(), None);
}

#[test]
fn drop_releases_packets() {
    let (ctx, engine) = context();
    {
        let m = XmpMeta::new(&ctx).unwrap();
        let _copy = m.try_clone().unwrap();
        assert_eq!(engine.live_packets(), 2);
    }
    assert_eq!(engine.live_packets(), 0);
    assert_eq!(engine.live_strings(), 0);
}

mod property_operations {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn set_and_get_property() {
        let (ctx, _) = context();
        let mut m = XmpMeta::new(&ctx).unwrap();
        m.set_property(NS1, "SimpleProp1", "Simple1 value", PropFlags::empty())
            .unwrap();
        assert_eq!(
            m.get_property(NS1, "SimpleProp1").unwrap().as_deref(),
            Some("Simple1 value")
        );
        assert!(m.does_property_exist(NS1, "ns1:SimpleProp1").unwrap());
    }

    #[test]
    fn set_property_with_options() {
        let (ctx, _) = context();
        let mut m = XmpMeta::new(&ctx).unwrap();
        m.set_property(NS1, "Link", "http://example.com/", PropFlags::VALUE_IS_URI)
            .unwrap();
        let (value, options) = m.get_property_with_options(NS1, "Link").unwrap().unwrap();
        assert_eq!(value, "http://example.com/");
        assert!(options.contains(PropFlags::VALUE_IS_URI));
    }

    #[test]
    fn delete_property() {
        let (ctx, _) = context();
        let mut m = XmpMeta::new(&ctx).unwrap();
        m.set_property(NS1, "Gone", "soon", PropFlags::empty()).unwrap();
        m.delete_property(NS1, "Gone").unwrap();
        assert!(!m.does_property_exist(NS1, "Gone").unwrap());
        m.delete_property(NS1, "Gone").unwrap();
    }

    #[test]
    fn unregistered_schema() {
        let (ctx, _) = context();
        let m = XmpMeta::new(&ctx).unwrap();
        let err = m.get_property("ns:unknown/", "Prop").unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::BadSchema));
        let err = m.does_property_exist("ns:unknown/", "Prop").unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::BadSchema));
    }

    #[test]
    fn interior_nul_is_rejected() {
        let (ctx, _) = context();
        let mut m = XmpMeta::new(&ctx).unwrap();
        let err = m
            .set_property(NS1, "Prop", "a\0b", PropFlags::empty())
            .unwrap_err();
        assert!(matches!(err, XmpError::BadParam(_)));
    }

    #[test]
    fn try_clone_is_independent() {
        let (ctx, _) = context();
        let mut m = XmpMeta::new(&ctx).unwrap();
        m.set_property(NS1, "Prop", "original", PropFlags::empty()).unwrap();
        let mut copy = m.try_clone().unwrap();
        copy.set_property(NS1, "Prop", "changed", PropFlags::empty()).unwrap();
        assert_eq!(m.get_property(NS1, "Prop").unwrap().as_deref(), Some("original"));
        assert_eq!(copy.get_property(NS1, "Prop").unwrap().as_deref(), Some("changed"));
    }
}

mod typed_properties {
    use super::*;
    use libxmp::{TzSign, XmpDateTime};

    #[test]
    fn missing_property_soft_vs_hard() {
        let (ctx, _) = context();
        let m = XmpMeta::new(&ctx).unwrap();
        assert_eq!(m.get_property(NS1, "Missing").unwrap(), None);
        for err in [
            m.get_property_bool(NS1, "Missing").map(|_| ()).unwrap_err(),
            m.get_property_i32(NS1, "Missing").map(|_| ()).unwrap_err(),
            m.get_property_datetime(NS1, "Missing").map(|_| ()).unwrap_err(),
        ] {
            assert!(matches!(err, XmpError::PropertyNotFound { .. }));
        }
    }

    #[test]
    fn bool_round_trip() {
        let (ctx, _) = context();
        let mut m = XmpMeta::new(&ctx).unwrap();
        m.set_property_bool(NS1, "Flag", true, PropFlags::empty()).unwrap();
        assert!(m.get_property_bool(NS1, "Flag").unwrap());
        assert_eq!(m.get_property(NS1, "Flag").unwrap().as_deref(), Some("True"));
    }

    #[test]
    fn integers() {
        let (ctx, _) = context();
        let mut m = XmpMeta::new(&ctx).unwrap();
        m.set_property_i32(NS1, "Small", -42, PropFlags::empty()).unwrap();
        assert_eq!(m.get_property_i32(NS1, "Small").unwrap(), -42);

        m.set_property_i64(NS1, "Big", 1 << 40, PropFlags::empty()).unwrap();
        assert_eq!(m.get_property_i64(NS1, "Big").unwrap(), 1 << 40);
        let err = m.get_property_i32(NS1, "Big").unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::BadValue));
    }

    #[test]
    fn float_round_trip() {
        let (ctx, _) = context();
        let mut m = XmpMeta::new(&ctx).unwrap();
        m.set_property_f64(NS1, "Ratio", 1.5, PropFlags::empty()).unwrap();
        assert_eq!(m.get_property_f64(NS1, "Ratio").unwrap(), 1.5);
    }

    #[test]
    fn malformed_value() {
        let (ctx, _) = context();
        let mut m = XmpMeta::new(&ctx).unwrap();
        m.set_property(NS1, "Text", "not a number", PropFlags::empty()).unwrap();
        let err = m.get_property_i64(NS1, "Text").unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::BadValue));
    }

    #[test]
    fn date_is_normalized_to_utc() {
        let (ctx, _) = context();
        let mut m = XmpMeta::new(&ctx).unwrap();
        let east = XmpDateTime::utc(2024, 1, 2, 3, 4, 5).with_offset(TzSign::East, 2, 0);
        let utc = XmpDateTime::utc(2024, 1, 2, 1, 4, 5);
        m.set_property_datetime(NS1, "East", &east, PropFlags::empty()).unwrap();
        m.set_property_datetime(NS1, "Utc", &utc, PropFlags::empty()).unwrap();

        let fields = m.get_property_date_fields(NS1, "East").unwrap();
        assert_eq!(fields.tz_sign, TzSign::East);
        assert_eq!(fields.hour, 3);
        assert_eq!(
            m.get_property_datetime(NS1, "East").unwrap(),
            m.get_property_datetime(NS1, "Utc").unwrap()
        );
        assert_eq!(
            m.get_property_datetime(NS1, "East").unwrap(),
            east.to_utc().unwrap()
        );
    }
}

mod arrays {
    use super::*;
    use pretty_assertions::assert_eq;

    fn with_array(ctx: &libxmp::Context) -> XmpMeta<'_> {
        let mut m = XmpMeta::new(ctx).unwrap();
        for value in ["A", "B"] {
            m.append_array_item(
                NS1,
                "Bag",
                PropFlags::ARRAY_IS_ORDERED,
                value,
                PropFlags::empty(),
            )
            .unwrap();
        }
        m
    }

    #[test]
    fn items_are_one_based() {
        let (ctx, _) = context();
        let m = with_array(&ctx);
        assert_eq!(m.get_array_item(NS1, "Bag", 1).unwrap().as_deref(), Some("A"));
        assert_eq!(m.get_array_item(NS1, "Bag", 2).unwrap().as_deref(), Some("B"));
        assert_eq!(m.get_array_item(NS1, "Bag", 3).unwrap(), None);
        let err = m.get_array_item(NS1, "Bag", 0).unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::BadIndex));
    }

    #[test]
    fn count_and_exist() {
        let (ctx, _) = context();
        let m = with_array(&ctx);
        assert_eq!(m.count_array_items(NS1, "Bag").unwrap(), 2);
        assert_eq!(m.count_array_items(NS1, "NoSuchArray").unwrap(), 0);
        assert!(m.does_array_item_exist(NS1, "Bag", "B").unwrap());
        assert!(!m.does_array_item_exist(NS1, "Bag", "C").unwrap());
    }

    #[test]
    fn set_and_delete_items() {
        let (ctx, _) = context();
        let mut m = with_array(&ctx);
        m.set_array_item(NS1, "Bag", 1, "A2", PropFlags::empty()).unwrap();
        m.set_array_item(NS1, "Bag", 3, "C", PropFlags::empty()).unwrap();
        m.set_array_item(NS1, "Bag", 1, "Z", PropFlags::INSERT_BEFORE_ITEM)
            .unwrap();
        let items: Vec<_> = (1..=4)
            .map(|i| m.get_array_item(NS1, "Bag", i).unwrap().unwrap())
            .collect();
        assert_eq!(items, vec!["Z", "A2", "B", "C"]);

        m.delete_array_item(NS1, "Bag", 1).unwrap();
        assert_eq!(m.count_array_items(NS1, "Bag").unwrap(), 3);
        assert_eq!(m.get_array_item(NS1, "Bag", 1).unwrap().as_deref(), Some("A2"));
    }

    #[test]
    fn append_needs_array_form() {
        let (ctx, _) = context();
        let mut m = XmpMeta::new(&ctx).unwrap();
        let err = m
            .append_array_item(NS1, "Bag", PropFlags::empty(), "A", PropFlags::empty())
            .unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::BadOptions));

        let mut m = with_array(&ctx);
        let err = m
            .append_array_item(NS1, "Bag", PropFlags::ARRAY_IS_ALT, "C", PropFlags::empty())
            .unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::BadOptions));
        m.append_array_item(NS1, "Bag", PropFlags::empty(), "C", PropFlags::empty())
            .unwrap();
        assert_eq!(m.count_array_items(NS1, "Bag").unwrap(), 3);
    }
}

mod localized_text {
    use super::*;

    #[test]
    fn fallback_order() {
        let (ctx, _) = context();
        let mut m = XmpMeta::new(&ctx).unwrap();
        m.set_localized_text(NS1, "Title", Some("en"), "en-US", "Hello", PropFlags::empty())
            .unwrap();

        let exact = m.get_localized_text(NS1, "Title", None, "en-US").unwrap().unwrap();
        assert_eq!(exact.actual_lang, "en-US");
        assert_eq!(exact.value, "Hello");

        let generic = m
            .get_localized_text(NS1, "Title", Some("en"), "en-GB")
            .unwrap()
            .unwrap();
        assert_eq!(generic.actual_lang, "en-US");

        let default = m.get_localized_text(NS1, "Title", None, "fr-FR").unwrap().unwrap();
        assert_eq!(default.actual_lang, "x-default");
        assert_eq!(default.value, "Hello");
    }

    #[test]
    fn missing_array() {
        let (ctx, _) = context();
        let m = XmpMeta::new(&ctx).unwrap();
        assert_eq!(m.get_localized_text(NS1, "Title", None, "en").unwrap(), None);
    }

    #[test]
    fn delete_item() {
        let (ctx, _) = context();
        let mut m = XmpMeta::new(&ctx).unwrap();
        m.set_localized_text(NS1, "Title", None, "de-DE", "Hallo", PropFlags::empty())
            .unwrap();
        m.set_localized_text(NS1, "Title", None, "fr-FR", "Salut", PropFlags::empty())
            .unwrap();
        m.delete_localized_text(NS1, "Title", None, "fr-FR").unwrap();
        let chosen = m.get_localized_text(NS1, "Title", None, "fr-FR").unwrap().unwrap();
        assert_ne!(chosen.actual_lang, "fr-FR");
    }
}

mod structs_and_qualifiers {
    use super::*;

    #[test]
    fn struct_field() {
        let (ctx, _) = context();
        let mut m = XmpMeta::new(&ctx).unwrap();
        m.set_struct_field(NS1, "Struct", NS2, "Field", "f", PropFlags::empty())
            .unwrap();
        assert_eq!(
            m.get_struct_field(NS1, "Struct", NS2, "Field").unwrap().as_deref(),
            Some("f")
        );
        assert_eq!(
            m.get_property(NS1, "Struct/ns2:Field").unwrap().as_deref(),
            Some("f")
        );
        assert!(m.does_struct_field_exist(NS1, "Struct", NS2, "Field").unwrap());
        m.delete_struct_field(NS1, "Struct", NS2, "Field").unwrap();
        assert!(!m.does_struct_field_exist(NS1, "Struct", NS2, "Field").unwrap());
    }

    #[test]
    fn qualifier() {
        let (ctx, _) = context();
        let mut m = XmpMeta::new(&ctx).unwrap();
        m.set_property(NS1, "Prop", "value", PropFlags::empty()).unwrap();
        m.set_qualifier(NS1, "Prop", NS2, "Qual", "q", PropFlags::empty())
            .unwrap();
        assert_eq!(
            m.get_qualifier(NS1, "Prop", NS2, "Qual").unwrap().as_deref(),
            Some("q")
        );
        assert!(m.does_qualifier_exist(NS1, "Prop", NS2, "Qual").unwrap());
        m.delete_qualifier(NS1, "Prop", NS2, "Qual").unwrap();
        assert!(!m.does_qualifier_exist(NS1, "Prop", NS2, "Qual").unwrap());
        assert_eq!(m.get_property(NS1, "Prop").unwrap().as_deref(), Some("value"));
    }
}

mod serialize {
    use super::*;
    use libxmp::SerialFlags;

    #[test]
    fn exclusive_options_rejected() {
        let (ctx, _) = context();
        let mut m = XmpMeta::new(&ctx).unwrap();
        m.set_property(NS1, "Prop", "value", PropFlags::empty()).unwrap();
        let err = m
            .serialize_to_str(
                SerialFlags::OMIT_PACKET_WRAPPER | SerialFlags::READ_ONLY_PACKET,
                0,
            )
            .unwrap_err();
        assert!(err.is_engine_error());
        assert_eq!(err.code(), Some(ErrorCode::BadOptions));
    }

    #[test]
    fn memory_engine_has_no_serializer() {
        let (ctx, engine) = context();
        let m = XmpMeta::new(&ctx).unwrap();
        let err = m.serialize_to_str(SerialFlags::empty(), 0).unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::Unimplemented));
        assert_eq!(engine.live_strings(), 0);
    }

    #[test]
    fn memory_engine_has_no_parser() {
        let (ctx, engine) = context();
        let err = XmpMeta::parse(&ctx, "<x:xmpmeta xmlns:x='adobe:ns:meta/'/>").unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::Unimplemented));
        assert_eq!(engine.live_packets(), 0);
    }
}

// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

#![allow(clippy::float_cmp)] // Test assertions with constants
#![allow(clippy::too_many_lines)] // Test code

//! End-to-end build and decode scenarios.
//!
//! Covers the shape hierarchy (abstract root, two concrete subtypes), name
//! collisions across namespaces, unknown discriminators, intermediate roots,
//! aliases and the unknown-field modes.

use polycodec::{
    BuildError, BuildErrorKind, CodecConfig, CodecError, ConfiguredCodec, Discriminator, Object,
    PolicyKind, Shape, TypeShape, TypeShapeBuilder, UnknownFields, Value,
};

fn shapes() -> Vec<TypeShape> {
    vec![
        TypeShapeBuilder::new("geo::Shape").abstract_type().build(),
        TypeShapeBuilder::new("geo::Circle")
            .extends("geo::Shape")
            .field("radius", Shape::F64)
            .build(),
        TypeShapeBuilder::new("geo::Square")
            .extends("geo::Shape")
            .field("side", Shape::F64)
            .build(),
    ]
}

fn build(universe: Vec<TypeShape>) -> ConfiguredCodec {
    ConfiguredCodec::build(universe, &CodecConfig::default()).expect("build codec")
}

#[test]
fn test_shape_hierarchy_table_and_decode() {
    let codec = build(shapes());

    let table = codec
        .discriminator_table("geo::Shape")
        .expect("Shape is a polymorphic root");
    let entries: Vec<(String, String)> = table
        .entries()
        .map(|(d, id)| (d.to_string(), id.to_string()))
        .collect();
    assert_eq!(
        entries,
        vec![
            ("Circle".to_string(), "geo::Circle".to_string()),
            ("Square".to_string(), "geo::Square".to_string()),
        ]
    );
    assert_eq!(table.field(), "type");

    let value = codec
        .decode(br#"{"type":"Circle","radius":2.0}"#, "geo::Shape")
        .expect("decode circle");
    let circle = value.as_object().expect("object");
    assert_eq!(circle.type_id().as_str(), "geo::Circle");
    assert_eq!(circle.get("radius").and_then(Value::as_f64), Some(2.0));
}

#[test]
fn test_same_simple_name_collides() {
    let mut universe = shapes();
    universe.push(
        TypeShapeBuilder::new("legacy::Circle")
            .extends("geo::Shape")
            .field("r", Shape::F32)
            .build(),
    );

    let err = ConfiguredCodec::build(universe.clone(), &CodecConfig::default())
        .expect_err("two Circles under one root");
    match err {
        BuildError::DiscriminatorCollision {
            root,
            discriminator,
            first,
            second,
        } => {
            assert_eq!(root.as_str(), "geo::Shape");
            assert_eq!(discriminator, Discriminator::from("Circle"));
            let mut pair = [first.to_string(), second.to_string()];
            pair.sort();
            assert_eq!(pair, ["geo::Circle", "legacy::Circle"]);
        }
        other => panic!("expected DiscriminatorCollision, got {other:?}"),
    }

    // Qualified names keep the two apart.
    let config = CodecConfig::default().with_policy(PolicyKind::QualifiedName);
    let codec = ConfiguredCodec::build(universe, &config).expect("qualified names");
    let value = codec
        .decode(br#"{"type":"legacy::Circle","r":1.5}"#, "geo::Shape")
        .expect("decode legacy circle");
    assert_eq!(
        value.as_object().map(|o| o.type_id().as_str()),
        Some("legacy::Circle")
    );
}

#[test]
fn test_unknown_discriminator() {
    let codec = build(shapes());
    let err = codec
        .decode(br#"{"type":"Triangle","sides":3}"#, "geo::Shape")
        .expect_err("Triangle is not registered");
    match err {
        CodecError::UnknownDiscriminator {
            discriminator,
            root,
        } => {
            assert_eq!(discriminator, "\"Triangle\"");
            assert_eq!(root.as_str(), "geo::Shape");
        }
        other => panic!("expected UnknownDiscriminator, got {other:?}"),
    }
}

#[test]
fn test_missing_discriminator() {
    let codec = build(shapes());
    assert!(matches!(
        codec.decode(br#"{"radius":2.0}"#, "geo::Shape"),
        Err(CodecError::MissingDiscriminator { .. })
    ));
}

#[test]
fn test_encode_writes_discriminator_first() {
    let codec = build(shapes());
    let square = Object::new("geo::Square").with("side", 3.0);
    let bytes = codec.encode(&Value::Object(square)).expect("encode");
    assert_eq!(bytes, br#"{"type":"Square","side":3.0}"#);
}

#[test]
fn test_abstract_type_not_instantiable() {
    let codec = build(shapes());
    assert!(matches!(
        codec.encode(&Value::Object(Object::new("geo::Shape"))),
        Err(CodecError::NotInstantiable { .. })
    ));
    assert!(matches!(
        codec.encode(&Value::Object(Object::new("geo::Hexagon"))),
        Err(CodecError::UnknownType { .. })
    ));
}

#[test]
fn test_intermediate_root_and_inherited_fields() {
    let mut universe = shapes();
    universe.extend([
        TypeShapeBuilder::new("geo::Polygon")
            .extends("geo::Shape")
            .abstract_type()
            .field("sides", Shape::U8)
            .build(),
        TypeShapeBuilder::new("geo::Triangle")
            .extends("geo::Polygon")
            .field("base", Shape::F64)
            .build(),
        TypeShapeBuilder::new("geo::Pentagon")
            .extends("geo::Polygon")
            .build(),
    ]);
    let codec = build(universe);

    assert_eq!(
        codec.field_order("geo::Triangle"),
        Some(vec!["sides", "base"])
    );

    // Reachable from the top root and from the intermediate one.
    let json = br#"{"type":"Triangle","sides":3,"base":4.0}"#;
    let from_top = codec.decode(json, "geo::Shape").expect("via Shape");
    let from_polygon = codec.decode(json, "geo::Polygon").expect("via Polygon");
    assert_eq!(from_top, from_polygon);

    // Circle is not a Polygon.
    let err = codec
        .decode(br#"{"type":"Circle","radius":1.0}"#, "geo::Polygon")
        .expect_err("Circle outside Polygon");
    assert!(matches!(err, CodecError::UnknownDiscriminator { .. }));

    // Both tables share the hierarchy's field.
    assert_eq!(codec.discriminator_field("geo::Polygon"), Some("type"));
    assert_eq!(
        codec
            .discriminator_table("geo::Polygon")
            .map(|t| t.len()),
        Some(2)
    );
}

#[test]
fn test_concrete_member_decoded_directly() {
    let codec = build(shapes());

    let value = codec
        .decode(br#"{"type":"Circle","radius":1.0}"#, "geo::Circle")
        .expect("own tag");
    assert_eq!(
        value.as_object().map(|o| o.type_id().as_str()),
        Some("geo::Circle")
    );

    let err = codec
        .decode(br#"{"type":"Square","side":1.0}"#, "geo::Circle")
        .expect_err("sibling tag");
    assert!(matches!(err, CodecError::NotAssignable { .. }));
}

#[test]
fn test_alias_accepted_on_decode_only() {
    let universe = vec![
        TypeShapeBuilder::new("geo::Shape").abstract_type().build(),
        TypeShapeBuilder::new("geo::Circle")
            .extends("geo::Shape")
            .alias("Round")
            .field("radius", Shape::F64)
            .build(),
    ];
    let codec = build(universe);

    let value = codec
        .decode(br#"{"type":"Round","radius":1.0}"#, "geo::Shape")
        .expect("alias");
    let bytes = codec.encode(&value).expect("encode");
    assert_eq!(bytes, br#"{"type":"Circle","radius":1.0}"#);
}

#[test]
fn test_alias_collision_is_rejected() {
    let mut universe = shapes();
    universe[2] = TypeShapeBuilder::new("geo::Square")
        .extends("geo::Shape")
        .alias("Circle")
        .field("side", Shape::F64)
        .build();
    let err = ConfiguredCodec::build(universe, &CodecConfig::default())
        .expect_err("alias shadows Circle");
    assert_eq!(err.kind(), BuildErrorKind::DiscriminatorCollision);
}

#[test]
fn test_explicit_codes() {
    let universe = vec![
        TypeShapeBuilder::new("ev::Event")
            .abstract_type()
            .discriminator_field("kind")
            .build(),
        TypeShapeBuilder::new("ev::Created")
            .extends("ev::Event")
            .discriminator(1)
            .field("id", Shape::U64)
            .build(),
        TypeShapeBuilder::new("ev::Deleted")
            .extends("ev::Event")
            .discriminator(2)
            .field("id", Shape::U64)
            .build(),
    ];
    let config = CodecConfig::default().with_policy(PolicyKind::Explicit);
    let codec = ConfiguredCodec::build(universe, &config).expect("build");

    let deleted = Object::new("ev::Deleted").with("id", 9u64);
    let bytes = codec.encode(&Value::Object(deleted.clone())).expect("encode");
    assert_eq!(bytes, br#"{"kind":2,"id":9}"#);
    assert_eq!(
        codec.decode(&bytes, "ev::Event").expect("decode"),
        Value::Object(deleted)
    );
}

#[test]
fn test_discriminator_field_clash() {
    let mut universe = shapes();
    universe[1] = TypeShapeBuilder::new("geo::Circle")
        .extends("geo::Shape")
        .field("type", Shape::String)
        .build();
    let err = ConfiguredCodec::build(universe, &CodecConfig::default())
        .expect_err("Circle declares 'type'");
    assert_eq!(err.kind(), BuildErrorKind::DiscriminatorFieldClash);
}

#[test]
fn test_absent_and_null_are_distinct() {
    let universe = vec![TypeShapeBuilder::new("shop::Order")
        .field("id", Shape::U64)
        .absent_field("coupon", Shape::String)
        .build()];
    let codec = build(universe);

    let unset = Object::new("shop::Order").with("id", 1u64);
    let null = unset.clone().with("coupon", Value::Null);

    let unset_bytes = codec.encode(&Value::Object(unset.clone())).expect("unset");
    let null_bytes = codec.encode(&Value::Object(null.clone())).expect("null");
    assert_eq!(unset_bytes, br#"{"id":1}"#);
    assert_eq!(null_bytes, br#"{"id":1,"coupon":null}"#);
    assert_ne!(unset_bytes, null_bytes);

    assert_eq!(
        codec.decode(&unset_bytes, "shop::Order").expect("decode unset"),
        Value::Object(unset)
    );
    assert_eq!(
        codec.decode(&null_bytes, "shop::Order").expect("decode null"),
        Value::Object(null)
    );
}

#[test]
fn test_missing_fields() {
    let universe = vec![TypeShapeBuilder::new("shop::Line")
        .field("sku", Shape::String)
        .optional_field("note", Shape::String)
        .field_with_default("qty", Shape::U32, serde_json::json!(1))
        .build()];
    let codec = build(universe);

    let value = codec
        .decode(br#"{"sku":"A-1"}"#, "shop::Line")
        .expect("defaults applied");
    let line = value.as_object().expect("object");
    assert_eq!(line.get("note"), Some(&Value::Null));
    assert_eq!(line.get("qty"), Some(&Value::UInt(1)));

    let err = codec
        .decode(br#"{"qty":2}"#, "shop::Line")
        .expect_err("sku is required");
    match err {
        CodecError::MissingField { identity, field } => {
            assert_eq!(identity.as_str(), "shop::Line");
            assert_eq!(field, "sku");
        }
        other => panic!("expected MissingField, got {other:?}"),
    }

    let unset = Object::new("shop::Line").with("note", "gift");
    assert!(matches!(
        codec.encode(&Value::Object(unset)),
        Err(CodecError::MissingField { .. })
    ));
}

#[test]
fn test_unknown_fields_modes() {
    let universe = || vec![TypeShapeBuilder::new("inv::Item").field("sku", Shape::String).build()];
    let json = br#"{"sku":"X","colour":"red"}"#;

    let lenient = build(universe());
    let value = lenient.decode(json, "inv::Item").expect("ignored");
    assert_eq!(value.as_object().map(Object::len), Some(1));

    let config = CodecConfig::default().with_unknown_fields(UnknownFields::Reject);
    let strict = ConfiguredCodec::build(universe(), &config).expect("build");
    match strict.decode(json, "inv::Item") {
        Err(CodecError::UnknownField { field, .. }) => assert_eq!(field, "colour"),
        other => panic!("expected UnknownField, got {other:?}"),
    }

    // The discriminator is never an unknown field.
    let strict_shapes = ConfiguredCodec::build(shapes(), &config).expect("build");
    strict_shapes
        .decode(br#"{"type":"Square","side":2.0}"#, "geo::Shape")
        .expect("tag accepted");
}

#[test]
fn test_nested_references_and_paths() {
    let universe = vec![
        TypeShapeBuilder::new("shop::Order")
            .list_field("lines", Shape::named("shop::Line"))
            .reference_field("shape", "geo::Shape")
            .build(),
        TypeShapeBuilder::new("shop::Line")
            .field("qty", Shape::U16)
            .build(),
    ]
    .into_iter()
    .chain(shapes())
    .collect::<Vec<_>>();
    let codec = build(universe);

    let order = codec
        .decode(
            br#"{"lines":[{"qty":1},{"qty":2}],"shape":{"type":"Circle","radius":1.0}}"#,
            "shop::Order",
        )
        .expect("decode order");
    let order = order.as_object().expect("object");
    assert_eq!(order.get("lines").and_then(Value::as_list).map(<[_]>::len), Some(2));
    assert_eq!(
        order
            .get("shape")
            .and_then(Value::as_object)
            .map(|o| o.type_id().as_str()),
        Some("geo::Circle")
    );

    let err = codec
        .decode(
            br#"{"lines":[{"qty":1},{"qty":70000}],"shape":{"type":"Circle","radius":1.0}}"#,
            "shop::Order",
        )
        .expect_err("u16 overflow");
    match err {
        CodecError::OutOfRange { path, .. } => assert_eq!(path, "/lines/1/qty"),
        other => panic!("expected OutOfRange, got {other:?}"),
    }

    // A Line where a Shape is declared.
    let wrong = Object::new("shop::Order")
        .with("lines", Vec::<Value>::new())
        .with("shape", Object::new("shop::Line").with("qty", 1u16));
    assert!(matches!(
        codec.encode(&Value::Object(wrong)),
        Err(CodecError::NotAssignable { .. })
    ));
}

#[test]
fn test_unresolved_reference() {
    let universe = vec![TypeShapeBuilder::new("shop::Order")
        .reference_field("customer", "crm::Customer")
        .build()];
    let err = ConfiguredCodec::build(universe, &CodecConfig::default())
        .expect_err("customer type missing");
    match err {
        BuildError::UnresolvedReference {
            identity,
            field,
            target,
        } => {
            assert_eq!(identity.as_str(), "shop::Order");
            assert_eq!(field, "customer");
            assert_eq!(target.as_str(), "crm::Customer");
        }
        other => panic!("expected UnresolvedReference, got {other:?}"),
    }
}

#[test]
fn test_build_errors_locate_types() {
    let cyclic = vec![
        TypeShapeBuilder::new("a::A").extends("a::B").build(),
        TypeShapeBuilder::new("a::B").extends("a::A").build(),
    ];
    let err = ConfiguredCodec::build(cyclic, &CodecConfig::default()).expect_err("cycle");
    assert_eq!(err.kind(), BuildErrorKind::CyclicHierarchy);

    let duplicate = vec![
        TypeShapeBuilder::new("a::A").field("x", Shape::I32).build(),
        TypeShapeBuilder::new("a::A").field("x", Shape::I64).build(),
    ];
    let err = ConfiguredCodec::build(duplicate, &CodecConfig::default()).expect_err("dup");
    assert_eq!(err.kind(), BuildErrorKind::DuplicateTypeIdentity);

    let function = vec![TypeShapeBuilder::new("a::A")
        .field("callback", Shape::Function("fn(u32) -> bool".into()))
        .build()];
    let err = ConfiguredCodec::build(function, &CodecConfig::default()).expect_err("fn");
    match err {
        BuildError::UnsupportedTypeShape {
            identity, field, ..
        } => {
            assert_eq!(identity.as_str(), "a::A");
            assert_eq!(field.as_deref(), Some("callback"));
        }
        other => panic!("expected UnsupportedTypeShape, got {other:?}"),
    }
}

#[test]
fn test_codec_shared_across_threads() {
    let codec = build(shapes());
    let handles: Vec<_> = (0..4)
        .map(|i| {
            let codec = codec.clone();
            std::thread::spawn(move || {
                let circle = Object::new("geo::Circle").with("radius", f64::from(i));
                let bytes = codec.encode(&Value::Object(circle.clone())).expect("encode");
                let back = codec.decode(&bytes, "geo::Shape").expect("decode");
                assert_eq!(back, Value::Object(circle));
            })
        })
        .collect();
    for handle in handles {
        handle.join().expect("thread");
    }
}

#[test]
fn test_encoder_only_accepts_values_decode_reproduces() {
    let codec = build(vec![TypeShapeBuilder::new("box::Holder")
        .generic("T")
        .field("count", Shape::U32)
        .field("delta", Shape::I32)
        .field("ratio", Shape::F64)
        .generic_field("item", "T")
        .build()]);
    let holder = Object::new("box::Holder")
        .with("count", 3u32)
        .with("delta", -3i32)
        .with("ratio", 3.0)
        .with("item", serde_json::json!({"any": [1, "two"]}));

    for (field, wrong) in [
        ("count", Value::Int(3)),
        ("delta", Value::UInt(3)),
        ("ratio", Value::Int(3)),
        ("ratio", Value::UInt(3)),
        ("item", Value::Int(3)),
        ("item", Value::from("text")),
        (
            "item",
            Value::from(chrono::NaiveDate::from_ymd_opt(2024, 5, 1).expect("date")),
        ),
    ] {
        let mut obj = holder.clone();
        obj.set(field, wrong);
        match codec.encode(&Value::Object(obj)) {
            Err(CodecError::TypeMismatch { path, .. }) => assert_eq!(path, format!("/{field}")),
            other => panic!("{field}: expected TypeMismatch, got {other:?}"),
        }
    }

    for item in [serde_json::json!({"any": [1, "two"]}), serde_json::json!(7)] {
        let value = Value::Object(holder.clone().with("item", item));
        let bytes = codec.encode(&value).expect("encode");
        assert_eq!(codec.decode(&bytes, "box::Holder").expect("decode"), value);
    }

    let value = Value::Object(holder.with("item", Value::Null));
    let bytes = codec.encode(&value).expect("encode null item");
    assert_eq!(codec.decode(&bytes, "box::Holder").expect("decode"), value);
}

// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! `#[derive(Describe)]` produces the same shapes as the builder.

use chrono::{DateTime, NaiveDate, Utc};
use polycodec::{
    extract, CodecConfig, ConfiguredCodec, Describe, Discriminator, GraphBuilder, Object,
    PolicyKind, Shape, TypeShape, TypeShapeBuilder, Value,
};
use std::sync::Arc;

#[derive(Describe)]
#[polycodec(namespace = "shop", abstract, discriminator_field = "event")]
#[allow(dead_code)]
struct Event;

#[derive(Describe)]
#[polycodec(namespace = "shop", extends = "Event", alias = "Placed")]
#[allow(dead_code)]
struct OrderPlaced {
    order_id: u64,
    placed_at: DateTime<Utc>,
    lines: Vec<Line>,
    #[polycodec(absent)]
    coupon: Option<String>,
    #[polycodec(rename = "deliverOn")]
    deliver_on: Option<NaiveDate>,
    #[polycodec(skip)]
    cache: Arc<String>,
}

#[derive(Describe)]
#[polycodec(identity = "shop::OrderLine")]
#[allow(dead_code)]
struct Line {
    sku: String,
    qty: u16,
    unit: Box<char>,
}

#[derive(Describe)]
#[polycodec(namespace = "shop", extends = "Event", discriminator = 7)]
#[allow(dead_code)]
struct OrderCancelled {
    order_id: u64,
    #[polycodec(nullable)]
    reason: String,
}

#[derive(Describe)]
#[polycodec(namespace = "page")]
#[allow(dead_code)]
struct Page<T> {
    items: Vec<T>,
    total: usize,
}

#[derive(Describe)]
#[allow(dead_code)]
struct Unsupported {
    callback: fn(u32) -> bool,
}

fn builder_universe() -> Vec<TypeShape> {
    vec![
        TypeShapeBuilder::new("shop::Event")
            .abstract_type()
            .discriminator_field("event")
            .build(),
        TypeShapeBuilder::new("shop::OrderPlaced")
            .extends("shop::Event")
            .alias("Placed")
            .field("order_id", Shape::U64)
            .field("placed_at", Shape::Instant)
            .list_field("lines", Shape::named("shop::OrderLine"))
            .absent_field("coupon", Shape::String)
            .optional_field("deliverOn", Shape::Date)
            .build(),
        TypeShapeBuilder::new("shop::OrderLine")
            .field("sku", Shape::String)
            .field("qty", Shape::U16)
            .field("unit", Shape::Char)
            .build(),
        TypeShapeBuilder::new("shop::OrderCancelled")
            .extends("shop::Event")
            .discriminator(7)
            .field("order_id", Shape::U64)
            .nullable_field("reason", Shape::String)
            .build(),
    ]
}

fn derived_universe() -> Vec<TypeShape> {
    vec![
        Event::type_shape(),
        OrderPlaced::type_shape(),
        Line::type_shape(),
        OrderCancelled::type_shape(),
    ]
}

#[test]
fn test_derived_shapes_match_builder() {
    assert_eq!(derived_universe(), builder_universe());
}

#[test]
fn test_derived_and_built_graphs_are_equal() {
    let derived = GraphBuilder::new().build(derived_universe()).expect("derived");
    let built = GraphBuilder::new().build(builder_universe()).expect("built");
    assert_eq!(derived, built);
}

#[test]
fn test_identities() {
    assert_eq!(OrderPlaced::type_identity(), "shop::OrderPlaced");
    assert_eq!(Line::type_identity(), "shop::OrderLine");
    assert_eq!(
        Unsupported::type_identity(),
        concat!(module_path!(), "::Unsupported")
    );
    assert_eq!(
        OrderCancelled::type_shape().discriminator,
        Some(Discriminator::Code(7))
    );
}

#[test]
fn test_generic_struct() {
    let shape = Page::<u8>::type_shape();
    assert_eq!(shape.identity, "page::Page");
    assert_eq!(shape.generics, vec!["T".to_string()]);
    assert_eq!(shape.fields[0].shape, Shape::seq(Shape::Generic("T".into())));
    assert_eq!(shape.fields[1].shape, Shape::U64);
    extract(&shape).expect("generic placeholder is declared");
}

#[test]
fn test_function_field_rejected_at_build() {
    let shape = Unsupported::type_shape();
    assert!(matches!(shape.fields[0].shape, Shape::Function(_)));
    assert!(ConfiguredCodec::build(vec![shape], &CodecConfig::default()).is_err());
}

#[test]
fn test_derived_codec_round_trip() {
    // Explicit codes where declared, simple names elsewhere.
    let config = CodecConfig::default().with_policy(PolicyKind::Explicit);
    let codec = ConfiguredCodec::build(derived_universe(), &config).expect("build");

    let bytes = br#"{
        "event": "Placed",
        "order_id": 42,
        "placed_at": "2024-05-01T06:00:00Z",
        "lines": [{"sku": "A-1", "qty": 2, "unit": "p"}],
        "deliverOn": null
    }"#;
    let value = codec.decode(bytes, "shop::Event").expect("decode via alias");
    let placed = value.as_object().expect("object");
    assert_eq!(placed.type_id().as_str(), "shop::OrderPlaced");
    assert!(!placed.is_set("coupon"));

    let encoded = codec.encode(&value).expect("encode");
    let json: serde_json::Value = serde_json::from_slice(&encoded).expect("json");
    assert_eq!(json["event"], "OrderPlaced");
    assert!(json.get("coupon").is_none());

    let cancelled = Object::new("shop::OrderCancelled")
        .with("order_id", 42u64)
        .with("reason", Value::Null);
    let bytes = codec
        .encode(&Value::Object(cancelled.clone()))
        .expect("encode cancelled");
    assert_eq!(bytes, br#"{"event":7,"order_id":42,"reason":null}"#);
    assert_eq!(
        codec.decode(&bytes, "shop::Event").expect("decode cancelled"),
        Value::Object(cancelled)
    );
}

// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

#![allow(clippy::cast_possible_truncation)] // Seed-driven shuffling

//! Property tests over generated universes and values.
//!
//! - acyclicity: a built graph never lists a type among its own ancestors,
//!   and every cyclic universe is rejected
//! - idempotence: input order does not change the configured codec
//! - injectivity: each concrete hierarchy member owns exactly one entry
//! - round-trip: `decode(encode(v)) == v`

use chrono::{NaiveDate, TimeDelta, TimeZone, Utc};
use polycodec::{
    BuildError, CodecConfig, ConfiguredCodec, GraphBuilder, Object, Shape, TypeShape,
    TypeShapeBuilder, Value,
};
use proptest::prelude::*;
use std::collections::BTreeSet;

const MAX_TYPES: usize = 12;

fn identity(i: usize) -> String {
    format!("gen::T{}", i)
}

/// `parents[i]` is the supertype index of type `i`, if any.
fn universe(parents: &[Option<usize>], abstract_mask: &[bool]) -> Vec<TypeShape> {
    parents
        .iter()
        .enumerate()
        .map(|(i, parent)| {
            let mut builder =
                TypeShapeBuilder::new(identity(i)).field(format!("f{}", i), Shape::I32);
            if let Some(p) = parent {
                builder = builder.extends(identity(*p));
            }
            if abstract_mask.get(i).copied().unwrap_or(false) {
                builder = builder.abstract_type();
            }
            builder.build()
        })
        .collect()
}

fn has_cycle(parents: &[Option<usize>]) -> bool {
    (0..parents.len()).any(|start| {
        let mut current = parents[start];
        for _ in 0..parents.len() {
            match current {
                Some(p) if p == start => return true,
                Some(p) => current = parents[p],
                None => return false,
            }
        }
        false
    })
}

/// Arbitrary parent links (cycles allowed, self-links excluded).
fn any_parents() -> impl Strategy<Value = Vec<Option<usize>>> {
    (1..MAX_TYPES).prop_flat_map(|n| {
        proptest::collection::vec(proptest::option::of(0..n), n).prop_map(|raw| {
            raw.into_iter()
                .enumerate()
                .map(|(i, p)| p.filter(|p| *p != i))
                .collect()
        })
    })
}

/// Parent links that always form a forest.
fn forest() -> impl Strategy<Value = (Vec<Option<usize>>, Vec<bool>)> {
    (1..MAX_TYPES).prop_flat_map(|n| {
        let parents = (0..n)
            .map(|i| {
                if i == 0 {
                    Just(None).boxed()
                } else {
                    proptest::option::of(0..i).boxed()
                }
            })
            .collect::<Vec<_>>();
        (parents, proptest::collection::vec(any::<bool>(), n))
    })
}

proptest! {
    #[test]
    fn prop_built_graphs_are_acyclic(parents in any_parents()) {
        let result = GraphBuilder::new().build(universe(&parents, &[]));
        if has_cycle(&parents) {
            match result {
                Err(BuildError::CyclicHierarchy { cycle, .. }) => {
                    prop_assert!(cycle.len() >= 2);
                    prop_assert_eq!(cycle.first(), cycle.last());
                }
                other => prop_assert!(false, "expected CyclicHierarchy, got {:?}", other),
            }
        } else {
            let graph = result.expect("forest builds");
            for id in graph.identities() {
                prop_assert!(!graph.ancestors(id.as_str()).contains(&id));
            }
        }
    }

    #[test]
    fn prop_build_ignores_input_order(
        ((parents, abstract_mask), seed) in (forest(), any::<u64>())
    ) {
        let ordered = universe(&parents, &abstract_mask);
        let mut shuffled = ordered.clone();
        // Deterministic rotation + reversal driven by the seed.
        let len = shuffled.len();
        shuffled.rotate_left((seed as usize) % len);
        if seed % 2 == 0 {
            shuffled.reverse();
        }

        let config = CodecConfig::default();
        let first = ConfiguredCodec::build(ordered.clone(), &config);
        let again = ConfiguredCodec::build(ordered, &config);
        let other = ConfiguredCodec::build(shuffled, &config);
        match (first, again, other) {
            (Ok(a), Ok(b), Ok(c)) => {
                prop_assert_eq!(&a, &b);
                prop_assert_eq!(&a, &c);
            }
            (Err(a), Err(b), Err(c)) => {
                prop_assert_eq!(a.kind(), b.kind());
                prop_assert_eq!(a.kind(), c.kind());
            }
            (a, b, c) => prop_assert!(
                false,
                "builds disagree: {:?} / {:?} / {:?}",
                a.is_ok(),
                b.is_ok(),
                c.is_ok()
            ),
        }
    }

    #[test]
    fn prop_discriminators_are_injective((parents, abstract_mask) in forest()) {
        let shapes = universe(&parents, &abstract_mask);
        let codec = ConfiguredCodec::build(shapes, &CodecConfig::default()).expect("forest builds");
        let graph = GraphBuilder::new()
            .build(universe(&parents, &abstract_mask))
            .expect("graph");

        for table in codec.discriminator_tables() {
            let targets: Vec<_> = table.entries().map(|(_, id)| id.clone()).collect();
            let unique: BTreeSet<_> = targets.iter().cloned().collect();
            prop_assert_eq!(targets.len(), unique.len());

            let root = table.root().as_str();
            let expected: BTreeSet<_> = std::iter::once(table.root())
                .chain(graph.descendants(root))
                .filter(|id| graph.get(id.as_str()).is_some_and(|d| d.is_concrete()))
                .cloned()
                .collect();
            prop_assert_eq!(unique, expected);
        }
    }
}

/// Values of the `gen::Record` type below.
#[derive(Debug, Clone)]
struct Record {
    count: i32,
    small: u16,
    ratio: f64,
    flag: bool,
    name: String,
    initial: char,
    note: Option<Option<String>>,
    samples: Vec<i64>,
    day_offset: i32,
    stamp_millis: i64,
    wait_millis: i64,
}

fn record() -> impl Strategy<Value = Record> {
    (
        (
            any::<i32>(),
            any::<u16>(),
            -4_000_000..4_000_000i32,
            any::<bool>(),
            ".{0,16}",
            any::<char>(),
        ),
        (
            proptest::option::of(proptest::option::of("[a-z ]{0,12}")),
            proptest::collection::vec(any::<i64>(), 0..6),
            0..2_900_000i32,
            -8_000_000_000_000_000..8_000_000_000_000_000i64,
            -1_000_000_000..1_000_000_000i64,
        ),
    )
        .prop_map(
            |((count, small, quarter, flag, name, initial), (note, samples, day, stamp, wait))| {
                Record {
                    count,
                    small,
                    ratio: f64::from(quarter) / 4.0,
                    flag,
                    name,
                    initial,
                    note,
                    samples,
                    day_offset: day,
                    stamp_millis: stamp,
                    wait_millis: wait,
                }
            },
        )
}

fn record_codec() -> ConfiguredCodec {
    let universe = vec![TypeShapeBuilder::new("gen::Record")
        .field("count", Shape::I32)
        .field("small", Shape::U16)
        .field("ratio", Shape::F64)
        .field("flag", Shape::Bool)
        .field("name", Shape::String)
        .field("initial", Shape::Char)
        .absent_field("note", Shape::String)
        .list_field("samples", Shape::I64)
        .field("day", Shape::Date)
        .field("stamp", Shape::Instant)
        .field("wait", Shape::Duration)
        .build()];
    ConfiguredCodec::build(universe, &CodecConfig::default()).expect("record codec")
}

fn to_value(record: &Record) -> Value {
    let mut obj = Object::new("gen::Record")
        .with("count", record.count)
        .with("small", record.small)
        .with("ratio", record.ratio)
        .with("flag", record.flag)
        .with("name", record.name.clone())
        .with("initial", record.initial)
        .with("samples", record.samples.clone())
        .with(
            "day",
            NaiveDate::from_num_days_from_ce_opt(1 + record.day_offset).expect("date"),
        )
        .with(
            "stamp",
            Utc.timestamp_millis_opt(record.stamp_millis)
                .single()
                .expect("instant"),
        )
        .with("wait", TimeDelta::milliseconds(record.wait_millis));
    match &record.note {
        None => {}
        Some(note) => {
            obj.set("note", note.clone());
        }
    }
    Value::Object(obj)
}

proptest! {
    #[test]
    fn prop_round_trip(record in record()) {
        let codec = record_codec();
        let value = to_value(&record);
        let bytes = codec.encode(&value).expect("encode");
        let decoded = codec.decode(&bytes, "gen::Record").expect("decode");
        prop_assert_eq!(decoded, value);
    }
}

// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! JSON encode/decode walkers.

use super::strategy::{DecodeStrategy, EncodeStrategy, FieldCodec, FieldPlan, ObjectPlan};
use super::CodecInner;
use crate::config::UnknownFields;
use crate::descriptor::{Discriminator, PrimitiveKind, TypeIdentity};
use crate::error::{BuildError, CodecError};
use crate::value::{Object, Value};
use serde_json::{Map, Number, Value as Json};
use std::fmt;

/// Location inside the document being processed, rendered like `/lines/0/sku`.
#[derive(Clone, Copy)]
enum Path<'a> {
    Root,
    Field(&'a Path<'a>, &'a str),
    Index(&'a Path<'a>, usize),
}

impl<'a> Path<'a> {
    fn field(&'a self, name: &'a str) -> Path<'a> {
        Path::Field(self, name)
    }

    fn index(&'a self, index: usize) -> Path<'a> {
        Path::Index(self, index)
    }
}

impl fmt::Display for Path<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Path::Root => f.write_str("/"),
            Path::Field(Path::Root, name) => write!(f, "/{}", name),
            Path::Index(Path::Root, index) => write!(f, "/{}", index),
            Path::Field(parent, name) => write!(f, "{}/{}", parent, name),
            Path::Index(parent, index) => write!(f, "{}/{}", parent, index),
        }
    }
}

fn mismatch(path: &Path<'_>, expected: impl fmt::Display, found: &str) -> CodecError {
    CodecError::TypeMismatch {
        path: path.to_string(),
        expected: expected.to_string(),
        found: found.to_string(),
    }
}

fn out_of_range(path: &Path<'_>, kind: PrimitiveKind, value: impl fmt::Display) -> CodecError {
    CodecError::OutOfRange {
        path: path.to_string(),
        kind,
        value: value.to_string(),
    }
}

fn json_type(json: &Json) -> &'static str {
    match json {
        Json::Null => "null",
        Json::Bool(_) => "bool",
        Json::Number(_) => "number",
        Json::String(_) => "string",
        Json::Array(_) => "array",
        Json::Object(_) => "object",
    }
}

fn float_json(path: &Path<'_>, kind: PrimitiveKind, value: f64) -> Result<Json, CodecError> {
    if kind == PrimitiveKind::F32 && value.is_finite() && value.abs() > f64::from(f32::MAX) {
        return Err(out_of_range(path, kind, value));
    }
    Number::from_f64(value)
        .map(Json::Number)
        .ok_or_else(|| out_of_range(path, kind, value))
}

// ---------------------------------------------------------------------------
// Encode
// ---------------------------------------------------------------------------

impl CodecInner {
    pub(crate) fn encode_root(&self, value: &Value) -> Result<Json, CodecError> {
        match value {
            Value::Object(obj) => self.encode_object(obj, None, &Path::Root),
            other => Err(mismatch(&Path::Root, "object", other.type_name())),
        }
    }

    fn encode_object(
        &self,
        obj: &Object,
        expected: Option<&TypeIdentity>,
        path: &Path<'_>,
    ) -> Result<Json, CodecError> {
        let plan = match self.encoders.get(obj.type_id()) {
            Some(EncodeStrategy::Object(plan)) => plan,
            Some(EncodeStrategy::NotInstantiable { identity }) => {
                return Err(CodecError::NotInstantiable {
                    identity: identity.clone(),
                })
            }
            None => {
                return Err(CodecError::UnknownType {
                    identity: obj.type_id().clone(),
                })
            }
        };

        if let Some(expected) = expected {
            if !plan.is_assignable_to(expected) {
                return Err(CodecError::NotAssignable {
                    expected: expected.clone(),
                    found: plan.identity.clone(),
                    path: path.to_string(),
                });
            }
        }

        if let Some((name, _)) = obj.fields().find(|(name, _)| plan.field(name).is_none()) {
            return Err(CodecError::UnknownField {
                identity: plan.identity.clone(),
                field: name.to_string(),
            });
        }

        let mut map = Map::with_capacity(plan.fields.len() + 1);
        if let Some(tag) = &plan.tag {
            map.insert(tag.field.clone(), tag.value.to_json());
        }
        for field in &plan.fields {
            match obj.get(&field.name) {
                Some(value) => {
                    let json = self.encode_field(field, value, &path.field(&field.name))?;
                    map.insert(field.name.clone(), json);
                }
                None if field.absent_by_default => {}
                None => {
                    return Err(CodecError::MissingField {
                        identity: plan.identity.clone(),
                        field: field.name.clone(),
                    })
                }
            }
        }
        Ok(Json::Object(map))
    }

    fn encode_field(
        &self,
        field: &FieldPlan,
        value: &Value,
        path: &Path<'_>,
    ) -> Result<Json, CodecError> {
        if value.is_null() {
            if field.nullable || field.codec.accepts_null() {
                return Ok(Json::Null);
            }
            return Err(mismatch(path, &field.codec, "null"));
        }
        self.encode_with(&field.codec, value, path)
    }

    fn encode_with(
        &self,
        codec: &FieldCodec,
        value: &Value,
        path: &Path<'_>,
    ) -> Result<Json, CodecError> {
        match codec {
            FieldCodec::Optional(inner) => match value {
                Value::Null => Ok(Json::Null),
                _ => self.encode_with(inner, value, path),
            },
            FieldCodec::Primitive(kind) => encode_primitive(*kind, value, path),
            FieldCodec::Temporal(adapter) => value
                .as_temporal()
                .and_then(|t| adapter.format(t))
                .map(Json::String)
                .ok_or_else(|| mismatch(path, codec, value.type_name())),
            FieldCodec::Object(declared) => match value {
                Value::Object(obj) => self.encode_object(obj, Some(declared), path),
                other => Err(mismatch(path, declared, other.type_name())),
            },
            FieldCodec::List(inner) => match value {
                Value::List(items) => items
                    .iter()
                    .enumerate()
                    .map(|(i, item)| self.encode_with(inner, item, &path.index(i)))
                    .collect::<Result<Vec<_>, _>>()
                    .map(Json::Array),
                other => Err(mismatch(path, codec, other.type_name())),
            },
            // Only untyped JSON, so decode hands back the same value.
            FieldCodec::Any => match value {
                Value::Null => Ok(Json::Null),
                Value::Any(Json::Null) => Err(mismatch(path, codec, "null json")),
                Value::Any(json) => Ok(json.clone()),
                other => Err(mismatch(path, codec, other.type_name())),
            },
        }
    }
}

fn encode_primitive(
    kind: PrimitiveKind,
    value: &Value,
    path: &Path<'_>,
) -> Result<Json, CodecError> {
    let wrong = || mismatch(path, kind.name(), value.type_name());
    match kind {
        PrimitiveKind::Bool => value.as_bool().map(Json::Bool).ok_or_else(wrong),
        PrimitiveKind::I8 | PrimitiveKind::I16 | PrimitiveKind::I32 | PrimitiveKind::I64 => {
            let (min, max) = kind.signed_range().ok_or_else(wrong)?;
            match value {
                Value::Int(i) if (min..=max).contains(i) => Ok(Json::from(*i)),
                Value::Int(i) => Err(out_of_range(path, kind, i)),
                _ => Err(wrong()),
            }
        }
        PrimitiveKind::U8 | PrimitiveKind::U16 | PrimitiveKind::U32 | PrimitiveKind::U64 => {
            let max = kind.unsigned_max().ok_or_else(wrong)?;
            match value {
                Value::UInt(u) if *u <= max => Ok(Json::from(*u)),
                Value::UInt(u) => Err(out_of_range(path, kind, u)),
                _ => Err(wrong()),
            }
        }
        PrimitiveKind::F32 | PrimitiveKind::F64 => match value {
            Value::Float(f) => float_json(path, kind, *f),
            _ => Err(wrong()),
        },
        PrimitiveKind::Char => value
            .as_char()
            .map(|c| Json::String(c.to_string()))
            .ok_or_else(wrong),
        PrimitiveKind::String => value
            .as_str()
            .map(|s| Json::String(s.to_string()))
            .ok_or_else(wrong),
    }
}

// ---------------------------------------------------------------------------
// Decode
// ---------------------------------------------------------------------------

impl CodecInner {
    pub(crate) fn decode_root(&self, json: &Json, root: &str) -> Result<Value, CodecError> {
        self.decode_object(json, root, &Path::Root)
    }

    /// Every declared default must decode through its own field codec.
    pub(crate) fn check_defaults(&self) -> Result<(), BuildError> {
        let root = Path::Root;
        for plan in self.encoders.values().filter_map(|s| match s {
            EncodeStrategy::Object(plan) => Some(plan),
            EncodeStrategy::NotInstantiable { .. } => None,
        }) {
            for field in &plan.fields {
                let Some(default) = &field.default else {
                    continue;
                };
                self.decode_field(field, default, &root.field(&field.name))
                    .map_err(|err| BuildError::InvalidDefault {
                        identity: plan.identity.clone(),
                        field: field.name.clone(),
                        reason: err.to_string(),
                    })?;
            }
        }
        Ok(())
    }

    fn decode_object(
        &self,
        json: &Json,
        identity: &str,
        path: &Path<'_>,
    ) -> Result<Value, CodecError> {
        let Json::Object(map) = json else {
            return Err(mismatch(path, identity, json_type(json)));
        };

        match self.decoders.get(identity) {
            None => Err(CodecError::UnknownType {
                identity: TypeIdentity::new(identity),
            }),
            Some(DecodeStrategy::NotInstantiable { identity }) => {
                Err(CodecError::NotInstantiable {
                    identity: identity.clone(),
                })
            }
            Some(DecodeStrategy::Concrete(plan)) => {
                self.check_tag(plan, map, path)?;
                self.decode_fields(plan, map, path)
            }
            Some(DecodeStrategy::Polymorphic { table }) => {
                let raw = map
                    .get(table.field())
                    .ok_or_else(|| CodecError::MissingDiscriminator {
                        root: table.root().clone(),
                        field: table.field().to_string(),
                    })?;
                let unknown = || CodecError::UnknownDiscriminator {
                    discriminator: raw.to_string(),
                    root: table.root().clone(),
                };
                let value = Discriminator::from_json(raw).ok_or_else(unknown)?;
                let target = table.get(&value).ok_or_else(unknown)?;
                let plan = self
                    .plan(target.as_str())
                    .ok_or_else(|| CodecError::UnknownType {
                        identity: target.clone(),
                    })?;
                self.decode_fields(plan, map, path)
            }
        }
    }

    /// A hierarchy member decoded directly must carry its own discriminator.
    fn check_tag(
        &self,
        plan: &ObjectPlan,
        map: &Map<String, Json>,
        path: &Path<'_>,
    ) -> Result<(), CodecError> {
        let Some(tag) = &plan.tag else {
            return Ok(());
        };
        let raw = map.get(&tag.field).ok_or_else(|| CodecError::MissingDiscriminator {
            root: plan.identity.clone(),
            field: tag.field.clone(),
        })?;
        let value = Discriminator::from_json(raw);
        if value.as_ref().is_some_and(|v| tag.matches(v)) {
            return Ok(());
        }

        let other = value.as_ref().and_then(|v| match self.decoders.get(&tag.root) {
            Some(DecodeStrategy::Polymorphic { table }) => table.get(v),
            _ => None,
        });
        Err(match other {
            Some(found) => CodecError::NotAssignable {
                expected: plan.identity.clone(),
                found: found.clone(),
                path: path.to_string(),
            },
            None => CodecError::UnknownDiscriminator {
                discriminator: raw.to_string(),
                root: tag.root.clone(),
            },
        })
    }

    fn decode_fields(
        &self,
        plan: &ObjectPlan,
        map: &Map<String, Json>,
        path: &Path<'_>,
    ) -> Result<Value, CodecError> {
        if self.unknown_fields == UnknownFields::Reject {
            let tag_field = plan.tag.as_ref().map(|t| t.field.as_str());
            if let Some(key) = map
                .keys()
                .find(|k| plan.field(k).is_none() && Some(k.as_str()) != tag_field)
            {
                return Err(CodecError::UnknownField {
                    identity: plan.identity.clone(),
                    field: key.clone(),
                });
            }
        }

        let mut obj = Object::new(plan.identity.clone());
        for field in &plan.fields {
            let field_path = path.field(&field.name);
            match map.get(&field.name) {
                Some(json) => {
                    obj.set(field.name.clone(), self.decode_field(field, json, &field_path)?);
                }
                None if field.absent_by_default => {}
                None => {
                    if let Some(default) = &field.default {
                        let value = self.decode_field(field, default, &field_path)?;
                        obj.set(field.name.clone(), value);
                    } else if field.nullable {
                        obj.set(field.name.clone(), Value::Null);
                    } else {
                        return Err(CodecError::MissingField {
                            identity: plan.identity.clone(),
                            field: field.name.clone(),
                        });
                    }
                }
            }
        }
        Ok(Value::Object(obj))
    }

    fn decode_field(
        &self,
        field: &FieldPlan,
        json: &Json,
        path: &Path<'_>,
    ) -> Result<Value, CodecError> {
        if json.is_null() {
            if field.nullable || field.codec.accepts_null() {
                return Ok(Value::Null);
            }
            return Err(mismatch(path, &field.codec, "null"));
        }
        self.decode_with(&field.codec, json, path)
    }

    fn decode_with(
        &self,
        codec: &FieldCodec,
        json: &Json,
        path: &Path<'_>,
    ) -> Result<Value, CodecError> {
        match codec {
            FieldCodec::Optional(inner) => match json {
                Json::Null => Ok(Value::Null),
                _ => self.decode_with(inner, json, path),
            },
            FieldCodec::Primitive(kind) => decode_primitive(*kind, json, path),
            FieldCodec::Temporal(adapter) => {
                let text = json
                    .as_str()
                    .ok_or_else(|| mismatch(path, codec, json_type(json)))?;
                adapter
                    .parse(text)
                    .map(Value::Temporal)
                    .ok_or_else(|| CodecError::MalformedTemporalValue {
                        kind: adapter.kind(),
                        value: text.to_string(),
                        path: path.to_string(),
                    })
            }
            FieldCodec::Object(declared) => self.decode_object(json, declared.as_str(), path),
            FieldCodec::List(inner) => {
                let items = json
                    .as_array()
                    .ok_or_else(|| mismatch(path, codec, json_type(json)))?;
                items
                    .iter()
                    .enumerate()
                    .map(|(i, item)| self.decode_with(inner, item, &path.index(i)))
                    .collect::<Result<Vec<_>, _>>()
                    .map(Value::List)
            }
            FieldCodec::Any => Ok(match json {
                Json::Null => Value::Null,
                other => Value::Any(other.clone()),
            }),
        }
    }
}

fn decode_primitive(
    kind: PrimitiveKind,
    json: &Json,
    path: &Path<'_>,
) -> Result<Value, CodecError> {
    let wrong = || mismatch(path, kind.name(), json_type(json));
    match kind {
        PrimitiveKind::Bool => json.as_bool().map(Value::Bool).ok_or_else(wrong),
        PrimitiveKind::I8 | PrimitiveKind::I16 | PrimitiveKind::I32 | PrimitiveKind::I64 => {
            let Json::Number(n) = json else {
                return Err(wrong());
            };
            let (min, max) = kind.signed_range().ok_or_else(wrong)?;
            match n.as_i64() {
                Some(i) if (min..=max).contains(&i) => Ok(Value::Int(i)),
                Some(_) => Err(out_of_range(path, kind, n)),
                None if n.is_u64() => Err(out_of_range(path, kind, n)),
                None => Err(wrong()),
            }
        }
        PrimitiveKind::U8 | PrimitiveKind::U16 | PrimitiveKind::U32 | PrimitiveKind::U64 => {
            let Json::Number(n) = json else {
                return Err(wrong());
            };
            let max = kind.unsigned_max().ok_or_else(wrong)?;
            match n.as_u64() {
                Some(u) if u <= max => Ok(Value::UInt(u)),
                Some(_) => Err(out_of_range(path, kind, n)),
                None if n.is_i64() => Err(out_of_range(path, kind, n)),
                None => Err(wrong()),
            }
        }
        PrimitiveKind::F32 | PrimitiveKind::F64 => {
            let f = json.as_f64().ok_or_else(wrong)?;
            if kind == PrimitiveKind::F32 && f.abs() > f64::from(f32::MAX) {
                return Err(out_of_range(path, kind, f));
            }
            Ok(Value::Float(f))
        }
        PrimitiveKind::Char => {
            let text = json.as_str().ok_or_else(wrong)?;
            let mut chars = text.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Ok(Value::Char(c)),
                _ => Err(mismatch(path, "char", "string")),
            }
        }
        PrimitiveKind::String => json
            .as_str()
            .map(|s| Value::String(s.to_string()))
            .ok_or_else(wrong),
    }
}

// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Fluent builder API for TypeShape.

use crate::descriptor::Discriminator;
use crate::universe::{FieldShape, Shape, TypeShape};

/// Builder for creating TypeShape handles by hand.
#[derive(Debug)]
pub struct TypeShapeBuilder {
    shape: TypeShape,
}

impl TypeShapeBuilder {
    /// Create a new builder for a concrete type.
    pub fn new(identity: impl Into<String>) -> Self {
        Self {
            shape: TypeShape::new(identity),
        }
    }

    /// Declare the supertype.
    pub fn extends(mut self, supertype: impl Into<String>) -> Self {
        self.shape.supertype = Some(supertype.into());
        self
    }

    /// Mark as abstract.
    pub fn abstract_type(mut self) -> Self {
        self.shape.is_abstract = true;
        self
    }

    /// Declare a generic placeholder.
    pub fn generic(mut self, placeholder: impl Into<String>) -> Self {
        self.shape.generics.push(placeholder.into());
        self
    }

    /// Set an explicit discriminator.
    pub fn discriminator(mut self, value: impl Into<Discriminator>) -> Self {
        self.shape.discriminator = Some(value.into());
        self
    }

    /// Accept a former discriminator on decode.
    pub fn alias(mut self, value: impl Into<Discriminator>) -> Self {
        self.shape.aliases.push(value.into());
        self
    }

    /// Override the discriminator field (hierarchy roots only).
    pub fn discriminator_field(mut self, name: impl Into<String>) -> Self {
        self.shape.discriminator_field = Some(name.into());
        self
    }

    /// Add a field.
    pub fn field(mut self, name: impl Into<String>, shape: Shape) -> Self {
        self.shape.fields.push(FieldShape::new(name, shape));
        self
    }

    /// Add a fully specified field.
    pub fn field_shape(mut self, field: FieldShape) -> Self {
        self.shape.fields.push(field);
        self
    }

    /// Add an `Option<shape>` field.
    pub fn optional_field(self, name: impl Into<String>, shape: Shape) -> Self {
        self.field(name, Shape::option(shape))
    }

    /// Add an `Option<shape>` field omitted from output when unset.
    pub fn absent_field(self, name: impl Into<String>, shape: Shape) -> Self {
        let mut field = FieldShape::new(name, Shape::option(shape));
        field.absent_by_default = true;
        self.field_shape(field)
    }

    /// Add a field that accepts `null` without being optional.
    pub fn nullable_field(self, name: impl Into<String>, shape: Shape) -> Self {
        let mut field = FieldShape::new(name, shape);
        field.nullable = true;
        self.field_shape(field)
    }

    /// Add a field with a default used when input omits it.
    pub fn field_with_default(
        self,
        name: impl Into<String>,
        shape: Shape,
        default: serde_json::Value,
    ) -> Self {
        let mut field = FieldShape::new(name, shape);
        field.default = Some(default);
        self.field_shape(field)
    }

    /// Add a list field.
    pub fn list_field(self, name: impl Into<String>, element: Shape) -> Self {
        self.field(name, Shape::seq(element))
    }

    /// Add a field referencing another type.
    pub fn reference_field(self, name: impl Into<String>, identity: impl Into<String>) -> Self {
        self.field(name, Shape::named(identity))
    }

    /// Add a field typed by a generic placeholder.
    pub fn generic_field(self, name: impl Into<String>, placeholder: impl Into<String>) -> Self {
        self.field(name, Shape::Generic(placeholder.into()))
    }

    /// Build the type shape.
    pub fn build(self) -> TypeShape {
        self.shape
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::universe::TypeHandle;

    #[test]
    fn test_shape_builder() {
        let shape = TypeShapeBuilder::new("geo::Circle")
            .extends("geo::Shape")
            .field("radius", Shape::F64)
            .absent_field("label", Shape::String)
            .list_field("tags", Shape::String)
            .alias("Round")
            .build();

        assert_eq!(shape.identity(), "geo::Circle");
        assert_eq!(shape.supertype(), Some("geo::Shape"));
        assert_eq!(shape.fields().len(), 3);
        assert!(shape.fields()[1].absent_by_default);
        assert_eq!(shape.fields()[1].shape, Shape::option(Shape::String));
        assert_eq!(shape.fields()[2].shape, Shape::seq(Shape::String));
        assert_eq!(shape.aliases(), &[Discriminator::from("Round")]);
    }

    #[test]
    fn test_abstract_root_builder() {
        let shape = TypeShapeBuilder::new("geo::Shape")
            .abstract_type()
            .discriminator_field("kind")
            .build();
        assert!(shape.is_abstract());
        assert_eq!(shape.discriminator_field(), Some("kind"));
        assert!(shape.fields().is_empty());
    }

    #[test]
    fn test_generic_builder() {
        let shape = TypeShapeBuilder::new("util::Page")
            .generic("T")
            .list_field("items", Shape::Generic("T".into()))
            .field_with_default("size", Shape::U32, serde_json::json!(20))
            .build();
        assert_eq!(shape.generics(), &["T".to_string()]);
        assert_eq!(shape.fields()[1].default, Some(serde_json::json!(20)));
    }
}

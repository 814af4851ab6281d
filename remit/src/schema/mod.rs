//! Declarative, inheritable parameter schema.
//!
//! A *shape* is a named, ordered list of field declarations. A shape may derive
//! from a parent shape, in which case its effective field list is the parent's
//! effective list followed by its own fields.
//!
//! Shapes are declared on a [`SchemaBuilder`] at start-up. [`SchemaBuilder::build`]
//! validates the whole registry and computes every effective field list once,
//! producing an immutable [`Schema`] that can be shared between threads and
//! read without locking.
//!
//! # Examples
//!
//! ```
//! use remit::schema::{Coercion, SchemaBuilder};
//!
//! # fn example() -> remit::Result<()> {
//! let mut builder = SchemaBuilder::new();
//! builder.declare("Pipeline", None)?;
//! builder.add_fields("Pipeline", &["pipeline_name", "return_URL", "caller_key"])?;
//! builder.declare("RecurringUsePipeline", Some("Pipeline"))?;
//! builder.add_field("RecurringUsePipeline", "validity_start", Coercion::Timestamp)?;
//! builder.add_field("RecurringUsePipeline", "recurring_period", Coercion::PassThrough)?;
//!
//! let schema = builder.build()?;
//! let names: Vec<_> = schema
//!     .effective_fields("RecurringUsePipeline")?
//!     .iter()
//!     .map(|f| f.name())
//!     .collect();
//! assert_eq!(
//!     names,
//!     ["pipeline_name", "return_URL", "caller_key", "validity_start", "recurring_period"]
//! );
//! # Ok(())
//! # }
//! ```

mod wire_key;

use std::{collections::HashMap, sync::Arc};

pub use wire_key::wire_key;

use crate::error::{RemitError, Result};

/// How a field's value is converted to and from its wire form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Coercion {
    /// String representation, unchanged.
    #[default]
    PassThrough,
    /// Base-10 whole number.
    Integer,
    /// Whole seconds since the Unix epoch.
    Timestamp,
    /// Ordered sequence of records of the named shape, flattened under
    /// 1-based index-qualified keys.
    Collection(String),
}

/// A field of a shape, with its precomputed wire key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDecl {
    name: String,
    wire_key: String,
    coercion: Coercion,
}

impl FieldDecl {
    /// Declared field name (e.g. `return_URL`).
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Wire key derived from the name (e.g. `returnURL`).
    #[must_use]
    pub fn wire_key(&self) -> &str {
        &self.wire_key
    }

    /// Coercion kind.
    #[must_use]
    pub const fn coercion(&self) -> &Coercion {
        &self.coercion
    }
}

/// A fully resolved shape: its name, parent and effective field list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShapeDef {
    name: String,
    parent: Option<String>,
    fields: Vec<FieldDecl>,
}

impl ShapeDef {
    /// Shape name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Name of the parent shape, if any.
    #[must_use]
    pub fn parent(&self) -> Option<&str> {
        self.parent.as_deref()
    }

    /// Effective field list, ancestors first.
    #[must_use]
    pub fn fields(&self) -> &[FieldDecl] {
        &self.fields
    }

    /// Looks up a field of the effective list by declared name.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&FieldDecl> {
        self.fields.iter().find(|f| f.name == name)
    }
}

#[derive(Debug)]
struct PendingShape {
    name: String,
    parent: Option<String>,
    own: Vec<(String, Coercion)>,
}

/// Collects shape declarations before they are frozen into a [`Schema`].
#[derive(Debug, Default)]
pub struct SchemaBuilder {
    shapes: Vec<PendingShape>,
    index: HashMap<String, usize>,
}

impl SchemaBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a new shape, optionally deriving from an already declared parent.
    ///
    /// # Errors
    ///
    /// - [`RemitError::SchemaConflict`] if the shape is already declared.
    /// - [`RemitError::UnknownShape`] if `parent` has not been declared yet.
    pub fn declare(&mut self, shape: &str, parent: Option<&str>) -> Result<&mut Self> {
        if self.index.contains_key(shape) {
            return Err(RemitError::conflict(shape, "shape already declared"));
        }
        if let Some(parent) = parent
            && !self.index.contains_key(parent)
        {
            return Err(RemitError::UnknownShape(parent.to_owned()));
        }

        self.index.insert(shape.to_owned(), self.shapes.len());
        self.shapes.push(PendingShape {
            name: shape.to_owned(),
            parent: parent.map(str::to_owned),
            own: Vec::new(),
        });
        Ok(self)
    }

    /// Appends a field to the shape's own field list.
    ///
    /// # Errors
    ///
    /// - [`RemitError::UnknownShape`] if the shape has not been declared.
    /// - [`RemitError::SchemaConflict`] if the name is empty or already in the
    ///   shape's own list.
    pub fn add_field(&mut self, shape: &str, field: &str, coercion: Coercion) -> Result<&mut Self> {
        let idx = *self.index.get(shape).ok_or_else(|| RemitError::UnknownShape(shape.to_owned()))?;
        let pending = &mut self.shapes[idx];

        if field.is_empty() {
            return Err(RemitError::conflict(shape, "field name is empty"));
        }
        if pending.own.iter().any(|(name, _)| name == field) {
            return Err(RemitError::conflict(shape, format!("field '{field}' already declared")));
        }

        pending.own.push((field.to_owned(), coercion));
        Ok(self)
    }

    /// Appends several pass-through fields, in order.
    ///
    /// # Errors
    ///
    /// Same as [`add_field`](Self::add_field).
    pub fn add_fields(&mut self, shape: &str, fields: &[&str]) -> Result<&mut Self> {
        for field in fields {
            self.add_field(shape, field, Coercion::PassThrough)?;
        }
        Ok(self)
    }

    /// Resolves inheritance and freezes the registry.
    ///
    /// # Errors
    ///
    /// - [`RemitError::UnknownShape`] if a collection field names an undeclared shape.
    /// - [`RemitError::SchemaConflict`] if two effective fields of one shape map to
    ///   the same wire key.
    pub fn build(self) -> Result<Schema> {
        let mut shapes: HashMap<String, Arc<ShapeDef>> = HashMap::with_capacity(self.shapes.len());

        // Parents are always declared before their children.
        for pending in self.shapes {
            let mut fields = match &pending.parent {
                Some(parent) => shapes
                    .get(parent)
                    .map(|p| p.fields.clone())
                    .ok_or_else(|| RemitError::UnknownShape(parent.clone()))?,
                None => Vec::new(),
            };

            for (name, coercion) in pending.own {
                if let Coercion::Collection(target) = &coercion
                    && !self.index.contains_key(target)
                {
                    return Err(RemitError::UnknownShape(target.clone()));
                }
                // An inherited declaration keeps its place.
                if fields.iter().any(|f| f.name == name) {
                    continue;
                }
                let key = wire_key(&name);
                if let Some(clash) = fields.iter().find(|f| f.wire_key == key) {
                    return Err(RemitError::conflict(
                        &pending.name,
                        format!("fields '{}' and '{name}' share wire key '{key}'", clash.name),
                    ));
                }
                fields.push(FieldDecl { name, wire_key: key, coercion });
            }

            shapes.insert(
                pending.name.clone(),
                Arc::new(ShapeDef { name: pending.name, parent: pending.parent, fields }),
            );
        }

        Ok(Schema { shapes })
    }
}

/// Immutable shape registry.
///
/// Safe for unsynchronized concurrent reads once built.
#[derive(Debug, Clone)]
pub struct Schema {
    shapes: HashMap<String, Arc<ShapeDef>>,
}

impl Schema {
    /// Returns the resolved definition of a shape.
    ///
    /// # Errors
    ///
    /// Returns [`RemitError::UnknownShape`] if the shape was never declared.
    pub fn shape(&self, name: &str) -> Result<&Arc<ShapeDef>> {
        self.shapes.get(name).ok_or_else(|| RemitError::UnknownShape(name.to_owned()))
    }

    /// Returns the effective field list of a shape, ancestors first.
    ///
    /// # Errors
    ///
    /// Returns [`RemitError::UnknownShape`] if the shape was never declared.
    pub fn effective_fields(&self, name: &str) -> Result<&[FieldDecl]> {
        self.shape(name).map(|s| s.fields())
    }
}

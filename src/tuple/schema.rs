//! Row schemas (ordered column name/type lists).

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::types::{Field, Type};

/// Shared handle to an immutable schema.
pub type SchemaRef = Arc<Schema>;

/// Result type for schema and row operations.
pub type SchemaResult<T> = Result<T, SchemaError>;

/// A single column: name plus type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDesc {
    /// Column name. Empty for anonymous columns.
    pub name: String,
    /// Column type.
    pub field_type: Type,
}

impl ColumnDesc {
    /// Create a new column descriptor.
    pub fn new(name: impl Into<String>, field_type: Type) -> Self {
        Self {
            name: name.into(),
            field_type,
        }
    }
}

impl fmt::Display for ColumnDesc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.field_type, self.name)
    }
}

/// Ordered sequence of columns describing a row.
///
/// The column list is fixed once built. Equality only looks at the type
/// sequence; names are informational.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Schema {
    columns: Vec<ColumnDesc>,
}

impl Schema {
    /// Create a schema from parallel type and name lists.
    pub fn new<S: Into<String>>(
        types: Vec<Type>,
        names: Vec<S>,
    ) -> SchemaResult<Self> {
        if types.len() != names.len() {
            return Err(SchemaError::LengthMismatch {
                types: types.len(),
                names: names.len(),
            });
        }
        let columns = types
            .into_iter()
            .zip(names)
            .map(|(t, n)| ColumnDesc::new(n, t))
            .collect();
        Ok(Self { columns })
    }

    /// Create a schema with anonymous columns.
    pub fn from_types(types: Vec<Type>) -> Self {
        Self {
            columns: types.into_iter().map(|t| ColumnDesc::new("", t)).collect(),
        }
    }

    /// Create a schema from column descriptors.
    pub fn from_columns(columns: Vec<ColumnDesc>) -> Self {
        Self { columns }
    }

    /// Concatenate two schemas, `a`'s columns first.
    pub fn merge(a: &Schema, b: &Schema) -> Schema {
        let mut columns = Vec::with_capacity(a.num_fields() + b.num_fields());
        columns.extend(a.columns.iter().cloned());
        columns.extend(b.columns.iter().cloned());
        Schema { columns }
    }

    /// Number of columns.
    pub fn num_fields(&self) -> usize {
        self.columns.len()
    }

    /// Column descriptor at `index`.
    pub fn column(&self, index: usize) -> SchemaResult<&ColumnDesc> {
        self.columns
            .get(index)
            .ok_or(SchemaError::FieldIndexOutOfRange {
                index,
                len: self.columns.len(),
            })
    }

    /// Name of the column at `index`.
    pub fn field_name(&self, index: usize) -> SchemaResult<&str> {
        self.column(index).map(|c| c.name.as_str())
    }

    /// Type of the column at `index`.
    pub fn field_type(&self, index: usize) -> SchemaResult<Type> {
        self.column(index).map(|c| c.field_type)
    }

    /// Index of the first column called `name`.
    pub fn index_of(&self, name: &str) -> SchemaResult<usize> {
        self.columns
            .iter()
            .position(|c| c.name == name)
            .ok_or_else(|| SchemaError::UnknownField(name.to_string()))
    }

    /// Encoded size of a row with this schema, in bytes.
    pub fn byte_size(&self) -> usize {
        self.columns.iter().map(|c| c.field_type.encoded_len()).sum()
    }

    /// Iterate over columns in order.
    pub fn iter(&self) -> impl Iterator<Item = &ColumnDesc> {
        self.columns.iter()
    }

    /// Column types in order.
    pub fn types(&self) -> impl Iterator<Item = Type> + '_ {
        self.columns.iter().map(|c| c.field_type)
    }

    /// Check that `field` may be stored in column `index`.
    pub fn check_field(&self, index: usize, field: &Field) -> SchemaResult<()> {
        let expected = self.field_type(index)?;
        let actual = field.field_type();
        if expected != actual {
            return Err(SchemaError::TypeMismatch {
                index,
                expected,
                actual,
            });
        }
        Ok(())
    }

    /// Wrap in a shared handle.
    pub fn into_ref(self) -> SchemaRef {
        Arc::new(self)
    }
}

impl PartialEq for Schema {
    fn eq(&self, other: &Self) -> bool {
        self.num_fields() == other.num_fields() && self.types().eq(other.types())
    }
}

impl Eq for Schema {}

impl fmt::Display for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, col) in self.columns.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", col)?;
        }
        Ok(())
    }
}

/// Schema and row errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchemaError {
    #[error("field index {index} out of range for schema with {len} fields")]
    FieldIndexOutOfRange { index: usize, len: usize },

    #[error("unknown field: {0}")]
    UnknownField(String),

    #[error("field {index} expects type {expected}, got {actual}")]
    TypeMismatch {
        index: usize,
        expected: Type,
        actual: Type,
    },

    #[error("field {0} has not been set")]
    UnsetField(usize),

    #[error("schema needs one name per type: {types} types, {names} names")]
    LengthMismatch { types: usize, names: usize },

    #[error("row has {actual} fields, schema expects {expected}")]
    ArityMismatch { expected: usize, actual: usize },

    #[error("incompatible schemas: expected [{expected}], got [{actual}]")]
    Incompatible { expected: String, actual: String },
}

/// Builder for creating schemas.
#[derive(Debug, Default)]
pub struct SchemaBuilder {
    columns: Vec<ColumnDesc>,
}

impl SchemaBuilder {
    /// Start building a new schema.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a column.
    pub fn column(mut self, name: impl Into<String>, field_type: Type) -> Self {
        self.columns.push(ColumnDesc::new(name, field_type));
        self
    }

    /// Add an integer column.
    pub fn int(self, name: impl Into<String>) -> Self {
        self.column(name, Type::Int)
    }

    /// Add a text column.
    pub fn text(self, name: impl Into<String>) -> Self {
        self.column(name, Type::Text)
    }

    /// Build the schema.
    pub fn build(self) -> Schema {
        Schema::from_columns(self.columns)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn people() -> Schema {
        SchemaBuilder::new().int("id").text("name").int("age").build()
    }

    #[test]
    fn test_lookup() {
        let schema = people();
        assert_eq!(schema.num_fields(), 3);
        assert_eq!(schema.field_name(1).unwrap(), "name");
        assert_eq!(schema.field_type(2).unwrap(), Type::Int);
        assert_eq!(schema.index_of("age").unwrap(), 2);
        assert!(matches!(
            schema.index_of("email"),
            Err(SchemaError::UnknownField(_))
        ));
        assert!(matches!(
            schema.field_type(3),
            Err(SchemaError::FieldIndexOutOfRange { index: 3, len: 3 })
        ));
    }

    #[test]
    fn test_byte_size() {
        assert_eq!(people().byte_size(), 4 + 132 + 4);
        assert_eq!(Schema::from_types(vec![]).byte_size(), 0);
    }

    #[test]
    fn test_merge_preserves_order() {
        let a = SchemaBuilder::new().int("a1").text("a2").build();
        let b = SchemaBuilder::new().int("b1").build();
        let merged = Schema::merge(&a, &b);

        assert_eq!(merged.num_fields(), a.num_fields() + b.num_fields());
        let names: Vec<_> = merged.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["a1", "a2", "b1"]);
        let types: Vec<_> = merged.types().collect();
        assert_eq!(types, [Type::Int, Type::Text, Type::Int]);
    }

    #[test]
    fn test_equality_ignores_names() {
        let named = Schema::new(vec![Type::Int, Type::Text], vec!["x", "y"]).unwrap();
        let anon = Schema::from_types(vec![Type::Int, Type::Text]);
        let other = Schema::from_types(vec![Type::Text, Type::Int]);

        assert_eq!(named, anon);
        assert_ne!(named, other);
        assert_ne!(anon, Schema::from_types(vec![Type::Int]));
    }

    #[test]
    fn test_length_mismatch() {
        let result = Schema::new(vec![Type::Int, Type::Int], vec!["only"]);
        assert!(matches!(
            result,
            Err(SchemaError::LengthMismatch { types: 2, names: 1 })
        ));
    }

    #[test]
    fn test_display() {
        assert_eq!(people().to_string(), "INT(id), TEXT(name), INT(age)");
    }
}

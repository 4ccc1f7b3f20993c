//! Rows bound to a schema.

use std::fmt;

use super::record_id::RecordId;
use super::schema::{SchemaError, SchemaRef, SchemaResult};
use super::types::Field;

/// An ordered array of field slots bound to exactly one schema.
///
/// Slots start unset and are filled with [`Row::set_field`]. A row read from
/// storage carries the [`RecordId`] it was stored under.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    schema: SchemaRef,
    fields: Vec<Option<Field>>,
    record_id: Option<RecordId>,
}

impl Row {
    /// Create a row with every slot unset.
    pub fn new(schema: SchemaRef) -> Self {
        let fields = vec![None; schema.num_fields()];
        Self {
            schema,
            fields,
            record_id: None,
        }
    }

    /// Create a fully populated row, validating arity and types.
    pub fn from_fields(schema: SchemaRef, fields: Vec<Field>) -> SchemaResult<Self> {
        if fields.len() != schema.num_fields() {
            return Err(SchemaError::ArityMismatch {
                expected: schema.num_fields(),
                actual: fields.len(),
            });
        }
        for (i, field) in fields.iter().enumerate() {
            schema.check_field(i, field)?;
        }
        Ok(Self {
            schema,
            fields: fields.into_iter().map(Some).collect(),
            record_id: None,
        })
    }

    /// Concatenate two rows under `schema`, which must be their merged schema.
    pub fn concat(schema: SchemaRef, left: &Row, right: &Row) -> Self {
        let mut fields = Vec::with_capacity(left.fields.len() + right.fields.len());
        fields.extend(left.fields.iter().cloned());
        fields.extend(right.fields.iter().cloned());
        Self {
            schema,
            fields,
            record_id: None,
        }
    }

    /// The schema this row is bound to.
    pub fn schema(&self) -> &SchemaRef {
        &self.schema
    }

    /// Number of slots.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Check if the row has no slots.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Field at `index`, or `None` when out of range or unset.
    pub fn field(&self, index: usize) -> Option<&Field> {
        self.fields.get(index).and_then(Option::as_ref)
    }

    /// Field at `index`, failing when out of range or unset.
    pub fn get(&self, index: usize) -> SchemaResult<&Field> {
        match self.fields.get(index) {
            Some(Some(field)) => Ok(field),
            Some(None) => Err(SchemaError::UnsetField(index)),
            None => Err(SchemaError::FieldIndexOutOfRange {
                index,
                len: self.fields.len(),
            }),
        }
    }

    /// Assign the slot at `index`.
    pub fn set_field(&mut self, index: usize, field: Field) -> SchemaResult<()> {
        self.schema.check_field(index, &field)?;
        self.fields[index] = Some(field);
        Ok(())
    }

    /// Iterate over slots in order.
    pub fn fields(&self) -> impl Iterator<Item = Option<&Field>> {
        self.fields.iter().map(Option::as_ref)
    }

    /// Re-bind to `schema`, clearing every slot.
    pub fn reset_schema(&mut self, schema: SchemaRef) {
        self.fields = vec![None; schema.num_fields()];
        self.schema = schema;
    }

    /// Re-bind to a type-identical schema, keeping the values.
    ///
    /// Used to attach renamed (aliased) schemas to stored rows.
    pub fn rebind(&mut self, schema: SchemaRef) -> SchemaResult<()> {
        if *schema != *self.schema {
            return Err(SchemaError::Incompatible {
                expected: schema.to_string(),
                actual: self.schema.to_string(),
            });
        }
        self.schema = schema;
        Ok(())
    }

    /// Locator of this row, if it has been persisted.
    pub fn record_id(&self) -> Option<RecordId> {
        self.record_id
    }

    /// Attach or clear the locator.
    pub fn set_record_id(&mut self, record_id: Option<RecordId>) {
        self.record_id = record_id;
    }
}

impl fmt::Display for Row {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, field) in self.fields.iter().enumerate() {
            if i > 0 {
                write!(f, "\t")?;
            }
            match field {
                Some(v) => write!(f, "{}", v)?,
                None => write!(f, "null")?,
            }
        }
        Ok(())
    }
}

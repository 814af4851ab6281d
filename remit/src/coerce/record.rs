//! Shape instances.

use std::{
    collections::{BTreeMap, HashMap},
    sync::Arc,
};

use super::{Payload, Value, WireValue, from_wire, to_wire};
use crate::{
    error::{RemitError, Result},
    params::Parameters,
    schema::{Coercion, Schema, ShapeDef},
};

/// Values for the fields of one shape.
///
/// Field names are checked against the shape's effective field list when they
/// are set, so a misspelt field fails immediately with
/// [`RemitError::UnknownField`].
///
/// # Examples
///
/// ```
/// use remit::{coerce::Record, shapes};
///
/// # fn example() -> remit::Result<()> {
/// let record = Record::new(shapes::standard(), "GetResultsRequest")?
///     .with("operation", "Pay")?
///     .with("max_results_count", 25_i64)?;
///
/// let params = record.to_parameters()?;
/// assert_eq!(params.get("operation"), Some("Pay"));
/// assert_eq!(params.get("maxResultsCount"), Some("25"));
///
/// assert!(Record::new(shapes::standard(), "GetResultsRequest")?.with("max_results", 5_i64).is_err());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    shape: Arc<ShapeDef>,
    values: HashMap<String, Value>,
}

impl Record {
    /// Creates an empty record of the named shape.
    ///
    /// # Errors
    ///
    /// Returns [`RemitError::UnknownShape`] if the shape is not in the schema.
    pub fn new(schema: &Schema, shape: &str) -> Result<Self> {
        Ok(Self::of(schema.shape(shape)?))
    }

    fn of(shape: &Arc<ShapeDef>) -> Self {
        Self { shape: Arc::clone(shape), values: HashMap::new() }
    }

    /// The record's shape.
    #[must_use]
    pub fn shape(&self) -> &ShapeDef {
        &self.shape
    }

    /// Sets a field. Setting [`Value::Unset`] clears it.
    ///
    /// # Errors
    ///
    /// Returns [`RemitError::UnknownField`] if the shape does not declare the field.
    pub fn set(&mut self, field: &str, value: impl Into<Value>) -> Result<&mut Self> {
        if self.shape.field(field).is_none() {
            return Err(RemitError::UnknownField {
                shape: self.shape.name().to_owned(),
                field: field.to_owned(),
            });
        }
        match value.into() {
            Value::Unset => {
                self.values.remove(field);
            }
            value => {
                self.values.insert(field.to_owned(), value);
            }
        }
        Ok(self)
    }

    /// Builder-style [`set`](Self::set).
    ///
    /// # Errors
    ///
    /// Returns [`RemitError::UnknownField`] if the shape does not declare the field.
    pub fn with(mut self, field: &str, value: impl Into<Value>) -> Result<Self> {
        self.set(field, value)?;
        Ok(self)
    }

    /// Returns the value of a set field.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.values.get(field)
    }

    /// Returns true if the field holds a value.
    #[must_use]
    pub fn is_set(&self, field: &str) -> bool {
        self.values.contains_key(field)
    }

    /// Encodes the record into wire parameters, in effective field order.
    ///
    /// Unset fields are skipped. Collection elements are flattened under
    /// `<key>.<n>.<element key>` with `n` counting from 1.
    ///
    /// # Errors
    ///
    /// Returns [`RemitError::TypeMismatch`] if a value does not fit its field.
    pub fn to_parameters(&self) -> Result<Parameters> {
        let mut params = Parameters::new();
        for field in self.shape.fields() {
            let Some(value) = self.values.get(field.name()) else {
                continue;
            };
            match to_wire(field, value)? {
                WireValue::Omit => {}
                WireValue::Scalar(wire) => params.insert(field.wire_key(), wire),
                WireValue::Indexed(groups) => {
                    for (n, group) in (1..).zip(groups) {
                        for (key, wire) in group.iter() {
                            params.insert(format!("{}.{n}.{key}", field.wire_key()), wire);
                        }
                    }
                }
            }
        }
        Ok(params)
    }

    /// Decodes a payload into a record of the named shape.
    ///
    /// Payload entries that the shape does not declare are ignored. Either the
    /// whole record decodes or an error is returned.
    ///
    /// When the payload carries the length of a collection's array (as
    /// [`Payload::from_json`] does), the collection has exactly that many
    /// records and elements without entries decode as empty records.
    /// Otherwise the elements are the indices present in the payload.
    ///
    /// # Errors
    ///
    /// - [`RemitError::UnknownShape`] if the shape is not in the schema.
    /// - [`RemitError::TypeMismatch`] if a scalar does not parse, or appears more than once.
    /// - [`RemitError::MalformedCollection`] if collection indices have a gap, a
    ///   duplicate, are not 1-based integers, or run past the array length.
    pub fn decode(schema: &Schema, shape: &str, payload: &Payload) -> Result<Self> {
        let mut record = Self::of(schema.shape(shape)?);

        for field in record.shape.fields() {
            let value = match field.coercion() {
                Coercion::Collection(item_shape) => {
                    match decode_collection(schema, field.wire_key(), item_shape, payload)? {
                        Some(records) => Value::Records(records),
                        None => continue,
                    }
                }
                _ => {
                    let mut found = payload.values(field.wire_key());
                    match (found.next(), found.next()) {
                        (None, _) => continue,
                        (Some(wire), None) => from_wire(field, wire)?,
                        (Some(_), Some(_)) => {
                            return Err(RemitError::mismatch(field.name(), "more than one value"));
                        }
                    }
                }
            };
            record.values.insert(field.name().to_owned(), value);
        }

        Ok(record)
    }

    /// Text of a field, if set to text.
    pub(crate) fn text(&self, field: &str) -> Option<String> {
        match self.values.get(field) {
            Some(Value::Text(s)) => Some(s.clone()),
            _ => None,
        }
    }

    /// Integer of a field, if set to an integer.
    pub(crate) fn integer(&self, field: &str) -> Option<i64> {
        match self.values.get(field) {
            Some(Value::Integer(i)) => Some(*i),
            _ => None,
        }
    }
}

fn decode_collection(
    schema: &Schema,
    key: &str,
    item_shape: &str,
    payload: &Payload,
) -> Result<Option<Vec<Record>>> {
    let prefix = format!("{key}.");
    let sent_len = payload.array_len(key);
    let mut groups: BTreeMap<usize, Payload> = BTreeMap::new();

    for (entry_key, wire) in payload.entries() {
        if entry_key == key {
            return Err(RemitError::malformed(key, "expected index-qualified entries"));
        }
        let Some(rest) = entry_key.strip_prefix(&prefix) else {
            continue;
        };
        let (index, sub_key) = rest
            .split_once('.')
            .ok_or_else(|| RemitError::malformed(key, format!("entry '{entry_key}' has no field")))?;
        let index = parse_index(key, index)?;
        if sent_len.is_some_and(|len| index > len) {
            return Err(RemitError::malformed(key, format!("index {index} is past the end of the array")));
        }

        let group = groups.entry(index).or_default();
        if group.values(sub_key).next().is_some() {
            return Err(RemitError::malformed(
                key,
                format!("duplicate entry '{sub_key}' at index {index}"),
            ));
        }
        group.push(sub_key, wire.as_str());
    }

    // Nested arrays travel with their element.
    for (rest, len) in payload.arrays_under(&prefix) {
        if let Some((index, sub_key)) = rest.split_once('.') {
            groups.entry(parse_index(key, index)?).or_default().mark_array(sub_key, len);
        }
    }

    match sent_len {
        // Elements without any non-null member decode as empty records.
        Some(len) => {
            for index in 1..=len {
                groups.entry(index).or_default();
            }
        }
        None if groups.is_empty() => return Ok(None),
        None => {}
    }

    let mut records = Vec::with_capacity(groups.len());
    for (expected, (index, group)) in (1_usize..).zip(groups) {
        if index != expected {
            return Err(RemitError::malformed(key, format!("index {expected} is missing")));
        }
        records.push(Record::decode(schema, item_shape, &group)?);
    }
    Ok(Some(records))
}

fn parse_index(key: &str, index: &str) -> Result<usize> {
    index
        .parse::<usize>()
        .ok()
        .filter(|n| *n > 0)
        .ok_or_else(|| RemitError::malformed(key, format!("'{index}' is not a 1-based index")))
}

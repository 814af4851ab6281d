//! Value coercion between typed values and their wire form.
//!
//! The coercion applied to a value is the one declared for its field in the
//! schema ([`Coercion`]); it is never inferred from the value itself.
//!
//! | Coercion       | Encodes                                   | Decodes to              |
//! |----------------|-------------------------------------------|-------------------------|
//! | `PassThrough`  | text, integer or decimal as its string    | [`Value::Text`]         |
//! | `Integer`      | base-10 whole number                      | [`Value::Integer`]      |
//! | `Timestamp`    | whole seconds since the Unix epoch        | [`Value::Timestamp`]    |
//! | `Collection`   | `<key>.<n>.<field>` entries, `n` from 1   | [`Value::Records`]      |
//!
//! Unset values are omitted from the wire form entirely.

mod payload;
mod record;

use chrono::{DateTime, Utc};
pub use payload::Payload;
pub use record::Record;
use rust_decimal::Decimal;

use crate::{
    error::{RemitError, Result},
    params::Parameters,
    schema::{Coercion, FieldDecl},
};

/// A typed field value.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Value {
    /// Explicitly unset; never sent.
    #[default]
    Unset,
    /// Free-form text.
    Text(String),
    /// Whole number.
    Integer(i64),
    /// Decimal amount, sent as its canonical string.
    Decimal(Decimal),
    /// Point in time, sent as whole epoch seconds.
    Timestamp(DateTime<Utc>),
    /// Elements of a collection field.
    Records(Vec<Record>),
}

impl Value {
    /// Returns true for [`Value::Unset`].
    #[must_use]
    pub const fn is_unset(&self) -> bool {
        matches!(self, Self::Unset)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<Decimal> for Value {
    fn from(value: Decimal) -> Self {
        Self::Decimal(value)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(value: DateTime<Utc>) -> Self {
        Self::Timestamp(value)
    }
}

impl From<Vec<Record>> for Value {
    fn from(value: Vec<Record>) -> Self {
        Self::Records(value)
    }
}

impl<T: Into<Self>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Unset, Into::into)
    }
}

/// Wire form of one field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WireValue {
    /// The field must not appear in the parameter set.
    Omit,
    /// A single `key=value` entry.
    Scalar(String),
    /// One parameter group per collection element, keys relative to the element.
    Indexed(Vec<Parameters>),
}

/// Converts a value to its wire form under the field's declared coercion.
///
/// An empty collection encodes to an empty [`WireValue::Indexed`], which puts
/// no entries on the wire; it cannot be told apart from an unset collection
/// once encoded. Typed responses such as
/// [`GetResultsResponse`](crate::shapes::GetResultsResponse) read both as an
/// empty list.
///
/// # Errors
///
/// Returns [`RemitError::TypeMismatch`] if the value cannot be represented by the
/// field's coercion kind, e.g. a timestamp on a pass-through field or records of the
/// wrong shape in a collection.
///
/// # Examples
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use remit::{
///     coerce::{Value, WireValue, to_wire},
///     shapes,
/// };
///
/// # fn example() -> remit::Result<()> {
/// let shape = shapes::standard().shape("RecurringUsePipeline")?;
/// let field = shape.field("validity_start").expect("declared");
///
/// let start = Utc.with_ymd_and_hms(2021, 1, 1, 0, 0, 30).unwrap();
/// assert_eq!(
///     to_wire(field, &Value::Timestamp(start))?,
///     WireValue::Scalar("1609459230".to_owned())
/// );
/// assert_eq!(to_wire(field, &Value::Unset)?, WireValue::Omit);
/// # Ok(())
/// # }
/// ```
pub fn to_wire(field: &FieldDecl, value: &Value) -> Result<WireValue> {
    let name = field.name();
    let scalar = match (field.coercion(), value) {
        (_, Value::Unset) => return Ok(WireValue::Omit),
        (Coercion::Collection(shape), Value::Records(records)) => {
            let mut groups = Vec::with_capacity(records.len());
            for record in records {
                if record.shape().name() != shape {
                    return Err(RemitError::mismatch(
                        name,
                        format!("expected '{shape}' records, got '{}'", record.shape().name()),
                    ));
                }
                groups.push(record.to_parameters()?);
            }
            return Ok(WireValue::Indexed(groups));
        }
        (Coercion::Collection(shape), _) => {
            return Err(RemitError::mismatch(name, format!("expected a collection of '{shape}'")));
        }
        (_, Value::Records(_)) => {
            return Err(RemitError::mismatch(name, "records given for a scalar field"));
        }
        // Seconds are floored, never rounded.
        (Coercion::Timestamp, Value::Timestamp(t)) => t.timestamp().to_string(),
        (Coercion::Timestamp | Coercion::Integer, Value::Integer(i)) => i.to_string(),
        (Coercion::Timestamp | Coercion::Integer, Value::Text(s)) => parse_integer(name, s)?.to_string(),
        (Coercion::Timestamp | Coercion::Integer, Value::Decimal(d)) => {
            return Err(RemitError::mismatch(name, format!("decimal {d} is not a whole number field")));
        }
        (Coercion::Integer, Value::Timestamp(_)) => {
            return Err(RemitError::mismatch(name, "timestamp given for an integer field"));
        }
        (Coercion::PassThrough, Value::Text(s)) => s.clone(),
        (Coercion::PassThrough, Value::Integer(i)) => i.to_string(),
        (Coercion::PassThrough, Value::Decimal(d)) => d.to_string(),
        (Coercion::PassThrough, Value::Timestamp(_)) => {
            return Err(RemitError::mismatch(name, "timestamps need a timestamp field"));
        }
    };
    Ok(WireValue::Scalar(scalar))
}

/// Converts a scalar wire string back to a typed value.
///
/// Collection fields are decoded from index-qualified entries by
/// [`Record::decode`], not through this function.
///
/// # Errors
///
/// Returns [`RemitError::TypeMismatch`] if an integer or timestamp field does not
/// hold a base-10 integer, or if the field is a collection.
pub fn from_wire(field: &FieldDecl, wire: &str) -> Result<Value> {
    let name = field.name();
    match field.coercion() {
        Coercion::PassThrough => Ok(Value::Text(wire.to_owned())),
        Coercion::Integer => parse_integer(name, wire).map(Value::Integer),
        Coercion::Timestamp => {
            let secs = parse_integer(name, wire)?;
            DateTime::from_timestamp(secs, 0)
                .map(Value::Timestamp)
                .ok_or_else(|| RemitError::mismatch(name, format!("{secs} is out of timestamp range")))
        }
        Coercion::Collection(_) => {
            Err(RemitError::mismatch(name, "collection fields are decoded from indexed entries"))
        }
    }
}

fn parse_integer(field: &str, wire: &str) -> Result<i64> {
    wire.parse::<i64>()
        .map_err(|_| RemitError::mismatch(field, format!("'{wire}' is not a base-10 integer")))
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use chrono::TimeZone;

    use super::*;
    use crate::schema::{Schema, SchemaBuilder};

    fn schema() -> Schema {
        let mut builder = SchemaBuilder::new();
        builder.declare("Item", None).unwrap();
        builder.add_fields("Item", &["item_id"]).unwrap();
        builder.declare("Form", None).unwrap();
        builder.add_field("Form", "reason", Coercion::PassThrough).unwrap();
        builder.add_field("Form", "count", Coercion::Integer).unwrap();
        builder.add_field("Form", "starts_at", Coercion::Timestamp).unwrap();
        builder.add_field("Form", "items", Coercion::Collection("Item".to_owned())).unwrap();
        builder.build().unwrap()
    }

    fn field<'a>(schema: &'a Schema, name: &str) -> &'a FieldDecl {
        schema.shape("Form").unwrap().field(name).unwrap()
    }

    #[test]
    fn test_timestamp_to_epoch_seconds() {
        let schema = schema();
        let t = Utc.with_ymd_and_hms(2021, 1, 1, 0, 0, 30).unwrap();
        assert_eq!(
            to_wire(field(&schema, "starts_at"), &Value::Timestamp(t)).unwrap(),
            WireValue::Scalar("1609459230".to_owned())
        );
    }

    #[test]
    fn test_timestamp_truncates_subseconds() {
        let schema = schema();
        let t = Utc.with_ymd_and_hms(2021, 1, 1, 0, 0, 30).unwrap()
            + chrono::Duration::milliseconds(999);
        assert_eq!(
            to_wire(field(&schema, "starts_at"), &Value::Timestamp(t)).unwrap(),
            WireValue::Scalar("1609459230".to_owned())
        );
    }

    #[test]
    fn test_timestamp_accepts_epoch_seconds() {
        let schema = schema();
        assert_eq!(
            to_wire(field(&schema, "starts_at"), &Value::Integer(1_609_459_230)).unwrap(),
            WireValue::Scalar("1609459230".to_owned())
        );
    }

    #[test]
    fn test_unset_is_omitted() {
        let schema = schema();
        for name in ["reason", "count", "starts_at", "items"] {
            assert_eq!(to_wire(field(&schema, name), &Value::Unset).unwrap(), WireValue::Omit);
        }
    }

    #[test]
    fn test_pass_through_representations() {
        let schema = schema();
        let reason = field(&schema, "reason");
        assert_eq!(
            to_wire(reason, &Value::from("Monthly dues")).unwrap(),
            WireValue::Scalar("Monthly dues".to_owned())
        );
        assert_eq!(to_wire(reason, &Value::Integer(-4)).unwrap(), WireValue::Scalar("-4".to_owned()));
        assert_eq!(
            to_wire(reason, &Value::Decimal(Decimal::from_str("10.50").unwrap())).unwrap(),
            WireValue::Scalar("10.50".to_owned())
        );
    }

    #[test]
    fn test_integer_field_rejects_garbage_text() {
        let schema = schema();
        let err = to_wire(field(&schema, "count"), &Value::from("ten")).unwrap_err();
        assert!(matches!(err, RemitError::TypeMismatch { field, .. } if field == "count"));
    }

    #[test]
    fn test_records_on_scalar_field_mismatch() {
        let schema = schema();
        let err = to_wire(field(&schema, "reason"), &Value::Records(vec![])).unwrap_err();
        assert!(matches!(err, RemitError::TypeMismatch { .. }));
    }

    #[test]
    fn test_collection_of_wrong_shape_mismatch() {
        let schema = schema();
        let form = Record::new(&schema, "Form").unwrap();
        let err = to_wire(field(&schema, "items"), &Value::Records(vec![form])).unwrap_err();
        assert!(err.to_string().contains("expected 'Item' records"));
    }

    #[test]
    fn test_collection_groups() {
        let schema = schema();
        let a = Record::new(&schema, "Item").unwrap().with("item_id", "a").unwrap();
        let b = Record::new(&schema, "Item").unwrap().with("item_id", "b").unwrap();
        let WireValue::Indexed(groups) =
            to_wire(field(&schema, "items"), &Value::Records(vec![a, b])).unwrap()
        else {
            panic!("expected indexed wire value");
        };
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[1].get("itemId"), Some("b"));
    }

    #[test]
    fn test_empty_collection_puts_nothing_on_the_wire() {
        let schema = schema();
        assert_eq!(
            to_wire(field(&schema, "items"), &Value::Records(vec![])).unwrap(),
            WireValue::Indexed(vec![])
        );

        let form = Record::new(&schema, "Form").unwrap().with("items", Vec::<Record>::new()).unwrap();
        assert!(form.to_parameters().unwrap().is_empty());
    }

    #[test]
    fn test_from_wire_integer() {
        let schema = schema();
        assert_eq!(from_wire(field(&schema, "count"), "42").unwrap(), Value::Integer(42));
        assert!(matches!(
            from_wire(field(&schema, "count"), "4.2"),
            Err(RemitError::TypeMismatch { .. })
        ));
        assert!(from_wire(field(&schema, "count"), "").is_err());
    }

    #[test]
    fn test_from_wire_timestamp() {
        let schema = schema();
        let expected = Utc.with_ymd_and_hms(2021, 1, 1, 0, 0, 30).unwrap();
        assert_eq!(
            from_wire(field(&schema, "starts_at"), "1609459230").unwrap(),
            Value::Timestamp(expected)
        );
    }

    #[test]
    fn test_from_wire_pass_through() {
        let schema = schema();
        assert_eq!(from_wire(field(&schema, "reason"), "007").unwrap(), Value::from("007"));
    }

    #[test]
    fn test_from_wire_collection_is_rejected() {
        let schema = schema();
        assert!(from_wire(field(&schema, "items"), "x").is_err());
    }

    #[test]
    fn test_option_into_value() {
        assert_eq!(Value::from(None::<String>), Value::Unset);
        assert_eq!(Value::from(Some(5_i64)), Value::Integer(5));
        assert!(Value::default().is_unset());
    }
}

//! Wire schema for the concept session protocol.
//!
//! Every type in this module is a protobuf message (or enumeration) derived with
//! [`prost`]. Field numbers are the wire identity of each field and match the
//! protocol spoken by existing servers; names are free to follow Rust conventions.
//!
//! # Overview
//!
//! - [`Concept`]: opaque, transaction-scoped handle to a server-side graph element.
//! - [`ValueObject`]: typed literal used for attribute values.
//! - [`method`]: the `Method` envelope multiplexing every concept operation.
//! - [`transaction`]: the transaction-level envelope that carries `Method` requests,
//!   iterator pulls and the transaction-wide operations.
//!
//! Many operations share a payload shape (e.g. "a single concept at field 1").
//! Those shapes are defined once here and reused by every slot that carries them;
//! on the wire they are indistinguishable from per-operation messages.
//!
//! Enumerations are stored as raw `i32` inside messages, so values unknown to this
//! build survive decoding untouched. Use the typed accessors (`kind()`, `data_type()`)
//! to interpret them.
use chrono::{DateTime, Utc};

pub mod method;
pub mod transaction;

/// Kind of graph element a [`Concept`] refers to.
///
/// Value `2` is not assigned and must stay unassigned.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum BaseType {
    MetaType = 0,
    EntityType = 1,
    RelationshipType = 3,
    AttributeType = 4,
    Entity = 5,
    Relationship = 6,
    Attribute = 7,
    Role = 8,
    Rule = 9,
}

impl BaseType {
    /// Part of the type system (types, roles and rules) rather than data.
    pub fn is_schema(self) -> bool {
        !self.is_thing()
    }

    /// A data instance: entity, relationship or attribute.
    pub fn is_thing(self) -> bool {
        matches!(
            self,
            BaseType::Entity | BaseType::Relationship | BaseType::Attribute
        )
    }
}

/// Value type declared by an attribute type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum DataType {
    String = 0,
    Boolean = 1,
    Integer = 2,
    Long = 3,
    Float = 4,
    Double = 5,
    Date = 6,
}

/// Reference to a server-side graph element.
///
/// The id is only meaningful inside the transaction that produced it.
#[derive(Clone, PartialEq, Eq, Hash, ::prost::Message)]
pub struct Concept {
    #[prost(string, tag = "1")]
    pub id: String,
    #[prost(enumeration = "BaseType", tag = "2")]
    pub base_type: i32,
}

impl Concept {
    pub fn new(id: impl Into<String>, base_type: BaseType) -> Self {
        Self {
            id: id.into(),
            base_type: base_type.into(),
        }
    }

    /// Typed base type, or `None` when the server sent a value this build does not know.
    pub fn kind(&self) -> Option<BaseType> {
        BaseType::try_from(self.base_type).ok()
    }
}

/// Explicit "no value" marker, distinct from an absent field.
#[derive(Clone, Copy, PartialEq, Eq, ::prost::Message)]
pub struct Null {}

/// Typed literal: exactly one of the seven value kinds.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ValueObject {
    #[prost(oneof = "value_object::Value", tags = "1, 2, 3, 4, 5, 6, 7")]
    pub value: Option<value_object::Value>,
}

pub mod value_object {
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum Value {
        #[prost(string, tag = "1")]
        String(String),
        #[prost(bool, tag = "2")]
        Boolean(bool),
        #[prost(int32, tag = "3")]
        Integer(i32),
        #[prost(int64, tag = "4")]
        Long(i64),
        #[prost(float, tag = "5")]
        Float(f32),
        #[prost(double, tag = "6")]
        Double(f64),
        /// Milliseconds since the Unix epoch, UTC.
        #[prost(int64, tag = "7")]
        Date(i64),
    }
}

use value_object::Value;

impl ValueObject {
    pub fn long(value: i64) -> Self {
        Self {
            value: Some(Value::Long(value)),
        }
    }

    pub fn date(value: DateTime<Utc>) -> Self {
        Self {
            value: Some(Value::Date(value.timestamp_millis())),
        }
    }

    /// Data type matching the populated variant.
    pub fn data_type(&self) -> Option<DataType> {
        Some(match self.value.as_ref()? {
            Value::String(_) => DataType::String,
            Value::Boolean(_) => DataType::Boolean,
            Value::Integer(_) => DataType::Integer,
            Value::Long(_) => DataType::Long,
            Value::Float(_) => DataType::Float,
            Value::Double(_) => DataType::Double,
            Value::Date(_) => DataType::Date,
        })
    }

    pub fn as_datetime(&self) -> Option<DateTime<Utc>> {
        match self.value {
            Some(Value::Date(ms)) => DateTime::from_timestamp_millis(ms),
            _ => None,
        }
    }
}

impl From<Value> for ValueObject {
    fn from(value: Value) -> Self {
        Self { value: Some(value) }
    }
}

impl From<String> for ValueObject {
    fn from(value: String) -> Self {
        Value::String(value).into()
    }
}

impl From<&str> for ValueObject {
    fn from(value: &str) -> Self {
        Value::String(value.to_string()).into()
    }
}

impl From<bool> for ValueObject {
    fn from(value: bool) -> Self {
        Value::Boolean(value).into()
    }
}

impl From<i32> for ValueObject {
    fn from(value: i32) -> Self {
        Value::Integer(value).into()
    }
}

impl From<f32> for ValueObject {
    fn from(value: f32) -> Self {
        Value::Float(value).into()
    }
}

impl From<f64> for ValueObject {
    fn from(value: f64) -> Self {
        Value::Double(value).into()
    }
}

impl From<DateTime<Utc>> for ValueObject {
    fn from(value: DateTime<Utc>) -> Self {
        Self::date(value)
    }
}

// Shared payload shapes.

/// Request or response without fields.
#[derive(Clone, Copy, PartialEq, Eq, ::prost::Message)]
pub struct Empty {}

#[derive(Clone, PartialEq, Eq, ::prost::Message)]
pub struct Label {
    #[prost(string, tag = "1")]
    pub label: String,
}

/// Single boolean: implicit, abstract, inferred.
#[derive(Clone, Copy, PartialEq, Eq, ::prost::Message)]
pub struct Flag {
    #[prost(bool, tag = "1")]
    pub value: bool,
}

/// A single concept at field 1.
#[derive(Clone, PartialEq, Eq, ::prost::Message)]
pub struct OneConcept {
    #[prost(message, optional, tag = "1")]
    pub concept: Option<Concept>,
}

impl From<Concept> for OneConcept {
    fn from(concept: Concept) -> Self {
        Self {
            concept: Some(concept),
        }
    }
}

/// Filter list of concepts (attribute types or roles).
#[derive(Clone, PartialEq, Eq, ::prost::Message)]
pub struct ConceptList {
    #[prost(message, repeated, tag = "1")]
    pub concepts: Vec<Concept>,
}

#[derive(Clone, PartialEq, Eq, ::prost::Message)]
pub struct OptionalConcept {
    #[prost(oneof = "optional_concept::Res", tags = "1, 2")]
    pub res: Option<optional_concept::Res>,
}

pub mod optional_concept {
    #[derive(Clone, PartialEq, Eq, ::prost::Oneof)]
    pub enum Res {
        #[prost(message, tag = "1")]
        Concept(super::Concept),
        #[prost(message, tag = "2")]
        Null(super::Null),
    }
}

impl OptionalConcept {
    pub fn has_concept(&self) -> bool {
        matches!(self.res, Some(optional_concept::Res::Concept(_)))
    }

    pub fn has_null(&self) -> bool {
        matches!(self.res, Some(optional_concept::Res::Null(_)))
    }

    /// `None` for both the null marker and an unset slot.
    pub fn into_option(self) -> Option<Concept> {
        match self.res {
            Some(optional_concept::Res::Concept(concept)) => Some(concept),
            _ => None,
        }
    }
}

impl From<Option<Concept>> for OptionalConcept {
    fn from(value: Option<Concept>) -> Self {
        let res = match value {
            Some(concept) => optional_concept::Res::Concept(concept),
            None => optional_concept::Res::Null(Null {}),
        };
        Self { res: Some(res) }
    }
}

/// Rule body: a pattern string or the null marker.
#[derive(Clone, PartialEq, Eq, ::prost::Message)]
pub struct OptionalPattern {
    #[prost(oneof = "optional_pattern::Res", tags = "1, 2")]
    pub res: Option<optional_pattern::Res>,
}

pub mod optional_pattern {
    #[derive(Clone, PartialEq, Eq, ::prost::Oneof)]
    pub enum Res {
        #[prost(string, tag = "1")]
        Pattern(String),
        #[prost(message, tag = "2")]
        Null(super::Null),
    }
}

impl OptionalPattern {
    pub fn into_option(self) -> Option<String> {
        match self.res {
            Some(optional_pattern::Res::Pattern(pattern)) => Some(pattern),
            _ => None,
        }
    }
}

impl From<Option<String>> for OptionalPattern {
    fn from(value: Option<String>) -> Self {
        let res = match value {
            Some(pattern) => optional_pattern::Res::Pattern(pattern),
            None => optional_pattern::Res::Null(Null {}),
        };
        Self { res: Some(res) }
    }
}

#[derive(Clone, PartialEq, Eq, ::prost::Message)]
pub struct OptionalDataType {
    #[prost(oneof = "optional_data_type::Res", tags = "1, 2")]
    pub res: Option<optional_data_type::Res>,
}

pub mod optional_data_type {
    #[derive(Clone, PartialEq, Eq, ::prost::Oneof)]
    pub enum Res {
        #[prost(enumeration = "super::DataType", tag = "1")]
        DataType(i32),
        #[prost(message, tag = "2")]
        Null(super::Null),
    }
}

impl OptionalDataType {
    /// `None` for the null marker; an out-of-range value is returned as `Err(raw)`.
    pub fn into_option(self) -> Result<Option<DataType>, i32> {
        match self.res {
            Some(optional_data_type::Res::DataType(raw)) => {
                DataType::try_from(raw).map(Some).map_err(|_| raw)
            }
            _ => Ok(None),
        }
    }
}

impl From<Option<DataType>> for OptionalDataType {
    fn from(value: Option<DataType>) -> Self {
        let res = match value {
            Some(data_type) => optional_data_type::Res::DataType(data_type.into()),
            None => optional_data_type::Res::Null(Null {}),
        };
        Self { res: Some(res) }
    }
}

#[derive(Clone, PartialEq, Eq, ::prost::Message)]
pub struct Regex {
    #[prost(string, tag = "1")]
    pub regex: String,
}

/// A [`ValueObject`] at field 1.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct AttributeValue {
    #[prost(message, optional, tag = "1")]
    pub value: Option<ValueObject>,
}

impl From<ValueObject> for AttributeValue {
    fn from(value: ValueObject) -> Self {
        Self { value: Some(value) }
    }
}

/// A role together with the thing playing it.
#[derive(Clone, PartialEq, Eq, ::prost::Message)]
pub struct RolePlayer {
    #[prost(message, optional, tag = "1")]
    pub role: Option<Concept>,
    #[prost(message, optional, tag = "2")]
    pub player: Option<Concept>,
}

/// Server-allocated iterator handle.
#[derive(Clone, Copy, PartialEq, Eq, ::prost::Message)]
pub struct IterId {
    #[prost(int32, tag = "1")]
    pub id: i32,
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn base_type_keeps_gap_at_two() {
        assert_eq!(i32::from(BaseType::EntityType), 1);
        assert_eq!(i32::from(BaseType::RelationshipType), 3);
        assert!(BaseType::try_from(2).is_err());
        assert_eq!(BaseType::try_from(9).ok(), Some(BaseType::Rule));
    }

    #[test]
    fn base_type_partitions_schema_and_things() {
        assert!(BaseType::Role.is_schema());
        assert!(BaseType::MetaType.is_schema());
        assert!(BaseType::Attribute.is_thing());
        assert!(!BaseType::AttributeType.is_thing());
    }

    #[test]
    fn unknown_base_type_is_kept_raw() {
        let concept = Concept {
            id: "V123".into(),
            base_type: 42,
        };
        assert_eq!(concept.kind(), None);
        assert_eq!(concept.base_type, 42);
    }

    #[test]
    fn value_object_setting_replaces_previous_variant() {
        let mut value = ValueObject::from(42);
        assert_eq!(value.data_type(), Some(DataType::Integer));

        value.value = Some(Value::Boolean(true));
        assert!(!matches!(value.value, Some(Value::Integer(_))));
        assert!(matches!(value.value, Some(Value::Boolean(true))));
        assert_eq!(value.data_type(), Some(DataType::Boolean));
    }

    #[test]
    fn value_object_date_is_epoch_millis() {
        let when = Utc.with_ymd_and_hms(2018, 6, 1, 12, 0, 0).unwrap();
        let value = ValueObject::from(when);

        assert_eq!(value.value, Some(Value::Date(when.timestamp_millis())));
        assert_eq!(value.as_datetime(), Some(when));
        assert_eq!(ValueObject::long(7).as_datetime(), None);
    }

    #[test]
    fn optional_concept_from_none_is_null_marker() {
        let absent = OptionalConcept::from(None);
        assert!(absent.has_null());
        assert!(!absent.has_concept());
        assert_eq!(absent.into_option(), None);

        let present = OptionalConcept::from(Some(Concept::new("V1", BaseType::EntityType)));
        assert!(present.has_concept());
    }
}

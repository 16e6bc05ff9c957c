//! Closed type algebra describing what a record field holds, plus the
//! mandatory/optional field classifier.
//!
//! Descriptors are built once at startup and never mutated afterwards.

use std::collections::HashSet;

use serde::Serialize;
use thiserror::Error;

/// Scalar value kinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Primitive {
  String,
  Integer,
  Number,
  Boolean,
}

impl Primitive {
  /// JSON-Schema `type` keyword for this kind.
  pub fn schema_type(self) -> &'static str {
    match self {
      Primitive::String => "string",
      Primitive::Integer => "integer",
      Primitive::Number => "number",
      Primitive::Boolean => "boolean",
    }
  }
}

/// A single enumeration member.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Literal {
  Str(String),
  Int(i64),
}

impl Literal {
  fn is_int(&self) -> bool { matches!(self, Literal::Int(_)) }
}

impl From<&str> for Literal {
  fn from(s: &str) -> Self { Literal::Str(s.to_string()) }
}
impl From<String> for Literal {
  fn from(s: String) -> Self { Literal::Str(s) }
}
impl From<i64> for Literal {
  fn from(n: i64) -> Self { Literal::Int(n) }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DescriptorError {
  #[error("enum `{0}` has no members")]
  EmptyEnum(String),
  #[error("enum `{0}` mixes string and integer members")]
  MixedEnum(String),
}

/// Closed set of literals. Members are non-empty and of one kind; both are
/// checked by [`EnumDescriptor::new`] and the fields stay private after that.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EnumDescriptor {
  name: String,
  members: Vec<Literal>,
}

impl EnumDescriptor {
  pub fn new<I, L>(name: impl Into<String>, members: I) -> Result<Self, DescriptorError>
  where
    I: IntoIterator<Item = L>,
    L: Into<Literal>,
  {
    let name = name.into();
    let members: Vec<Literal> = members.into_iter().map(Into::into).collect();
    let Some(first) = members.first() else {
      return Err(DescriptorError::EmptyEnum(name));
    };
    if members.iter().any(|m| m.is_int() != first.is_int()) {
      return Err(DescriptorError::MixedEnum(name));
    }
    Ok(Self { name, members })
  }

  pub fn name(&self) -> &str { &self.name }

  pub fn members(&self) -> &[Literal] { &self.members }

  /// Member kind, inferred from the first member.
  pub fn member_kind(&self) -> Primitive {
    match self.members.first() {
      Some(Literal::Int(_)) => Primitive::Integer,
      _ => Primitive::String,
    }
  }

  pub fn contains_str(&self, value: &str) -> bool {
    self.members.iter().any(|m| matches!(m, Literal::Str(s) if s == value))
  }
}

/// What kind of value a field holds.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TypeDescriptor {
  Primitive(Primitive),
  Enum(EnumDescriptor),
  /// Not required at the record level; the value shape is `inner`'s.
  Optional(Box<TypeDescriptor>),
  ListOf(Box<TypeDescriptor>),
  /// String keys, values of the boxed type.
  MapOf(Box<TypeDescriptor>),
  Record(RecordDescriptor),
}

impl TypeDescriptor {
  pub fn string() -> Self { TypeDescriptor::Primitive(Primitive::String) }
  pub fn integer() -> Self { TypeDescriptor::Primitive(Primitive::Integer) }
  #[allow(dead_code)]
  pub fn number() -> Self { TypeDescriptor::Primitive(Primitive::Number) }
  pub fn boolean() -> Self { TypeDescriptor::Primitive(Primitive::Boolean) }

  /// Wraps `inner` as optional. Already-optional types are returned as is so
  /// the builder never produces two `Optional` layers.
  pub fn optional(inner: TypeDescriptor) -> Self {
    match inner {
      TypeDescriptor::Optional(_) => inner,
      other => TypeDescriptor::Optional(Box::new(other)),
    }
  }

  pub fn list_of(element: TypeDescriptor) -> Self { TypeDescriptor::ListOf(Box::new(element)) }

  #[allow(dead_code)]
  pub fn map_of(value: TypeDescriptor) -> Self { TypeDescriptor::MapOf(Box::new(value)) }

  pub fn is_optional(&self) -> bool { matches!(self, TypeDescriptor::Optional(_)) }
}

impl From<EnumDescriptor> for TypeDescriptor {
  fn from(e: EnumDescriptor) -> Self { TypeDescriptor::Enum(e) }
}

impl From<RecordDescriptor> for TypeDescriptor {
  fn from(r: RecordDescriptor) -> Self { TypeDescriptor::Record(r) }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Field {
  pub name: String,
  pub ty: TypeDescriptor,
}

impl Field {
  pub fn new(name: impl Into<String>, ty: impl Into<TypeDescriptor>) -> Self {
    Self { name: name.into(), ty: ty.into() }
  }
}

/// Named record with ordered fields.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecordDescriptor {
  pub name: String,
  pub fields: Vec<Field>,
}

impl RecordDescriptor {
  pub fn new(name: impl Into<String>, fields: Vec<Field>) -> Self {
    Self { name: name.into(), fields }
  }
}

/// Field names of a record split by requiredness, in declaration order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct FieldPartition {
  pub mandatory: Vec<String>,
  pub optional: Vec<String>,
}

/// A field is optional iff its declared type is `Optional(..)`. A repeated
/// name is classified by its first declaration only.
pub fn classify(record: &RecordDescriptor) -> FieldPartition {
  let mut out = FieldPartition::default();
  let mut seen = HashSet::new();
  for f in &record.fields {
    if !seen.insert(f.name.as_str()) {
      continue;
    }
    if f.ty.is_optional() {
      out.optional.push(f.name.clone());
    } else {
      out.mandatory.push(f.name.clone());
    }
  }
  out
}

#[cfg(test)]
mod tests {
  use super::*;

  fn sample_record() -> RecordDescriptor {
    let level = EnumDescriptor::new("Level", ["low", "high"]).unwrap();
    RecordDescriptor::new("Sample", vec![
      Field::new("name", TypeDescriptor::string()),
      Field::new("nickname", TypeDescriptor::optional(TypeDescriptor::string())),
      Field::new("level", level),
      Field::new("nested", RecordDescriptor::new("Inner", vec![])),
      Field::new("tags", TypeDescriptor::optional(TypeDescriptor::list_of(TypeDescriptor::string()))),
      Field::new("scores", TypeDescriptor::map_of(TypeDescriptor::number())),
    ])
  }

  #[test]
  fn classify_splits_on_optional_only() {
    let parts = classify(&sample_record());
    assert_eq!(parts.mandatory, vec!["name", "level", "nested", "scores"]);
    assert_eq!(parts.optional, vec!["nickname", "tags"]);
  }

  #[test]
  fn classify_partitions_are_disjoint_and_complete() {
    let rec = sample_record();
    let parts = classify(&rec);
    let mandatory: HashSet<_> = parts.mandatory.iter().collect();
    let optional: HashSet<_> = parts.optional.iter().collect();
    assert!(mandatory.is_disjoint(&optional));
    let all: HashSet<_> = rec.fields.iter().map(|f| &f.name).collect();
    let union: HashSet<_> = mandatory.union(&optional).copied().collect();
    assert_eq!(union, all);
  }

  #[test]
  fn classify_empty_record() {
    let parts = classify(&RecordDescriptor::new("Empty", vec![]));
    assert!(parts.mandatory.is_empty());
    assert!(parts.optional.is_empty());
  }

  #[test]
  fn classify_keeps_first_of_repeated_names() {
    let rec = RecordDescriptor::new("Dup", vec![
      Field::new("a", TypeDescriptor::string()),
      Field::new("b", TypeDescriptor::optional(TypeDescriptor::string())),
      Field::new("a", TypeDescriptor::optional(TypeDescriptor::string())),
      Field::new("b", TypeDescriptor::integer()),
    ]);
    let parts = classify(&rec);
    assert_eq!(parts.mandatory, vec!["a"]);
    assert_eq!(parts.optional, vec!["b"]);
  }

  #[test]
  fn optional_builder_never_double_wraps() {
    let once = TypeDescriptor::optional(TypeDescriptor::integer());
    let twice = TypeDescriptor::optional(once.clone());
    assert_eq!(once, twice);
  }

  #[test]
  fn enum_construction_rejects_empty_and_mixed() {
    let empty: Vec<&str> = vec![];
    assert_eq!(EnumDescriptor::new("E", empty), Err(DescriptorError::EmptyEnum("E".into())));
    let mixed = EnumDescriptor::new("M", [Literal::from("a"), Literal::Int(1)]);
    assert_eq!(mixed, Err(DescriptorError::MixedEnum("M".into())));
  }

  #[test]
  fn enum_kind_follows_first_member() {
    let ints = EnumDescriptor::new("Ints", [1i64, 2, 3]).unwrap();
    assert_eq!(ints.member_kind(), Primitive::Integer);
    let strs = EnumDescriptor::new("Strs", ["a"]).unwrap();
    assert_eq!(strs.member_kind(), Primitive::String);
    assert!(strs.contains_str("a"));
    assert!(!strs.contains_str("b"));
  }
}

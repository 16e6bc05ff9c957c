//! Variant registry: one record shape per question type, assembled from
//! reusable field-set fragments plus pinned fields applied last.
//!
//! Composition order: base fragment, then trait fragments in the order given,
//! then pins. A later fragment redeclaring a field replaces it in place. A pin
//! fixes the field's value: it beats every default and every supplied value.

use std::collections::HashMap;

use rand::seq::SliceRandom;
use rand::Rng;
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{debug, info, instrument};

use crate::descriptor::{DescriptorError, EnumDescriptor, Field, RecordDescriptor, TypeDescriptor};
use crate::question::{Analytics, Difficulty, QuestionType, ScoringRules};
use crate::schema::{record_to_schema, SchemaError};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
  #[error("unknown question type `{0}`")]
  NotFound(String),
  #[error("variant `{variant}` pins undeclared field `{field}`")]
  PinOnUndeclaredField { variant: QuestionType, field: String },
  #[error(transparent)]
  Descriptor(#[from] DescriptorError),
  #[error("default for `{field}` cannot be encoded: {reason}")]
  DefaultValue { field: &'static str, reason: String },
}

/// Reusable set of fields with their defaults.
#[derive(Clone, Debug)]
pub struct FieldSet {
  pub name: &'static str,
  fields: Vec<Field>,
  defaults: Vec<(String, Value)>,
  shuffled: Vec<String>,
}

impl FieldSet {
  pub fn new(name: &'static str) -> Self {
    Self { name, fields: Vec::new(), defaults: Vec::new(), shuffled: Vec::new() }
  }

  pub fn field(mut self, name: &str, ty: impl Into<TypeDescriptor>) -> Self {
    self.fields.push(Field::new(name, ty));
    self
  }

  pub fn field_with_default(mut self, name: &str, ty: impl Into<TypeDescriptor>, default: Value) -> Self {
    self.fields.push(Field::new(name, ty));
    self.defaults.push((name.to_string(), default));
    self
  }

  /// Mark a list field whose items are shuffled on instantiation.
  pub fn shuffle(mut self, name: &str) -> Self {
    self.shuffled.push(name.to_string());
    self
  }
}

/// Assembles a [`VariantShape`] from fragments and pins.
pub struct ShapeBuilder {
  tag: QuestionType,
  fragments: Vec<FieldSet>,
  pins: Vec<(String, Value)>,
}

impl ShapeBuilder {
  pub fn new(tag: QuestionType) -> Self {
    Self { tag, fragments: Vec::new(), pins: Vec::new() }
  }

  pub fn compose(mut self, fragment: FieldSet) -> Self {
    self.fragments.push(fragment);
    self
  }

  pub fn pin(mut self, field: &str, value: Value) -> Self {
    self.pins.push((field.to_string(), value));
    self
  }

  pub fn build(self) -> Result<VariantShape, RegistryError> {
    let mut fields: Vec<Field> = Vec::new();
    let mut defaults = Map::new();
    let mut shuffled: Vec<String> = Vec::new();

    for fragment in self.fragments {
      debug!(target: "question", tag = %self.tag, fragment = fragment.name, "Composing field set");
      for field in fragment.fields {
        match fields.iter_mut().find(|f| f.name == field.name) {
          Some(existing) => {
            // A redeclaration drops the earlier default with the earlier type.
            defaults.remove(&field.name);
            *existing = field;
          }
          None => fields.push(field),
        }
      }
      for (name, value) in fragment.defaults {
        defaults.insert(name, value);
      }
      for name in fragment.shuffled {
        if !shuffled.contains(&name) {
          shuffled.push(name);
        }
      }
    }

    let mut pinned = Map::new();
    for (name, value) in self.pins {
      if !fields.iter().any(|f| f.name == name) {
        return Err(RegistryError::PinOnUndeclaredField { variant: self.tag, field: name });
      }
      defaults.insert(name.clone(), value.clone());
      pinned.insert(name, value);
    }

    shuffled.retain(|name| fields.iter().any(|f| &f.name == name));

    Ok(VariantShape {
      tag: self.tag,
      record: RecordDescriptor::new(self.tag.as_str(), fields),
      defaults,
      pinned,
      shuffled,
    })
  }
}

/// Final, immutable record shape of one question variant.
#[derive(Clone, Debug)]
pub struct VariantShape {
  pub tag: QuestionType,
  pub record: RecordDescriptor,
  defaults: Map<String, Value>,
  pinned: Map<String, Value>,
  shuffled: Vec<String>,
}

impl VariantShape {
  pub fn schema(&self) -> Result<Value, SchemaError> {
    record_to_schema(&self.record)
  }

  /// Materialise a record value from a raw bag.
  ///
  /// Declared fields only, in declaration order. Nested record objects are
  /// merged over their defaults; missing fields without a default are left
  /// out. Pins are applied after the bag, shuffling happens last.
  pub fn instantiate<R: Rng + ?Sized>(&self, raw: &Map<String, Value>, rng: &mut R) -> Map<String, Value> {
    let mut out = Map::new();
    for field in &self.record.fields {
      let name = field.name.as_str();
      let value = match (self.defaults.get(name), raw.get(name)) {
        (Some(Value::Object(base)), Some(Value::Object(over))) => {
          let mut merged = base.clone();
          for (k, v) in over {
            merged.insert(k.clone(), v.clone());
          }
          Some(Value::Object(merged))
        }
        (_, Some(v)) => Some(v.clone()),
        (Some(d), None) => Some(d.clone()),
        (None, None) => None,
      };
      if let Some(v) = value {
        out.insert(name.to_string(), v);
      }
    }

    for (name, value) in &self.pinned {
      out.insert(name.clone(), value.clone());
    }

    for name in &self.shuffled {
      if let Some(Value::Array(items)) = out.get_mut(name) {
        items.shuffle(rng);
      }
    }
    out
  }
}

/// Closed mapping from question type to shape. Built once, read-only after.
#[derive(Debug)]
pub struct VariantRegistry {
  shapes: HashMap<QuestionType, VariantShape>,
  question_types: EnumDescriptor,
  difficulties: EnumDescriptor,
}

impl VariantRegistry {
  #[instrument(level = "info")]
  pub fn new() -> Result<Self, RegistryError> {
    let question_types = QuestionType::descriptor()?;
    let difficulties = Difficulty::descriptor()?;
    let base = base_fields(&question_types, &difficulties)?;

    let mut shapes = HashMap::new();
    let all = [
      ShapeBuilder::new(QuestionType::Mcq)
        .compose(base.clone())
        .compose(choice_trait())
        .pin("category", Value::from(QuestionType::Mcq.as_str()))
        .pin("num_selectable", Value::from(1)),
      ShapeBuilder::new(QuestionType::Fill)
        .compose(base.clone())
        .compose(FieldSet::new("fill").field("solution", TypeDescriptor::string()))
        .pin("category", Value::from(QuestionType::Fill.as_str())),
      ShapeBuilder::new(QuestionType::MultiSelect)
        .compose(base)
        .compose(choice_trait())
        .pin("category", Value::from(QuestionType::MultiSelect.as_str())),
    ];
    for builder in all {
      let shape = builder.build()?;
      debug!(target: "question", tag = %shape.tag, fields = shape.record.fields.len(), "Registered variant");
      shapes.insert(shape.tag, shape);
    }
    info!(
      target: "question",
      variants = shapes.len(),
      tags = question_types.name(),
      difficulties = difficulties.name(),
      "Variant registry ready"
    );

    Ok(Self { shapes, question_types, difficulties })
  }

  pub fn resolve(&self, tag: &str) -> Result<&VariantShape, RegistryError> {
    QuestionType::parse(tag)
      .and_then(|q| self.shapes.get(&q))
      .ok_or_else(|| RegistryError::NotFound(tag.to_string()))
  }

  pub fn question_types(&self) -> &EnumDescriptor { &self.question_types }

  pub fn difficulties(&self) -> &EnumDescriptor { &self.difficulties }
}

fn base_fields(question_types: &EnumDescriptor, difficulties: &EnumDescriptor) -> Result<FieldSet, RegistryError> {
  Ok(FieldSet::new("question")
    .field("category", question_types.clone())
    .field("difficulty", difficulties.clone())
    .field("topic", TypeDescriptor::string())
    .field("statement", TypeDescriptor::string())
    .field_with_default("scoring_rules", ScoringRules::descriptor(), default_value("scoring_rules", ScoringRules::default())?)
    .field_with_default("analytics", Analytics::descriptor(), default_value("analytics", Analytics::default())?))
}

fn default_value<T: serde::Serialize>(field: &'static str, value: T) -> Result<Value, RegistryError> {
  serde_json::to_value(value).map_err(|e| RegistryError::DefaultValue { field, reason: e.to_string() })
}

/// Fields shared by questions with selectable choices.
fn choice_trait() -> FieldSet {
  FieldSet::new("choice")
    .field_with_default("solution", TypeDescriptor::list_of(TypeDescriptor::string()), Value::Array(vec![]))
    .field_with_default("choices", TypeDescriptor::list_of(TypeDescriptor::string()), Value::Array(vec![]))
    .field_with_default("num_selectable", TypeDescriptor::optional(TypeDescriptor::integer()), Value::from(1))
    .shuffle("choices")
}

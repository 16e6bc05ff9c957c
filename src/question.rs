//! Question domain: the closed enumerations and the nested records every
//! question variant shares.

use serde::{Deserialize, Serialize};

use crate::descriptor::{DescriptorError, EnumDescriptor, Field, RecordDescriptor, TypeDescriptor};

/// Discriminant of a question variant.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum QuestionType {
  /// Multiple choice, exactly one selectable answer.
  Mcq,
  /// Fill in the blanks, a single string answer.
  Fill,
  /// Multiple choice, several selectable answers.
  MultiSelect,
}

impl QuestionType {
  pub const ALL: [QuestionType; 3] = [QuestionType::Mcq, QuestionType::Fill, QuestionType::MultiSelect];

  pub fn as_str(self) -> &'static str {
    match self {
      QuestionType::Mcq => "mcq",
      QuestionType::Fill => "fill",
      QuestionType::MultiSelect => "multi_select",
    }
  }

  pub fn parse(tag: &str) -> Option<Self> {
    Self::ALL.into_iter().find(|q| q.as_str() == tag)
  }

  pub fn descriptor() -> Result<EnumDescriptor, DescriptorError> {
    EnumDescriptor::new("QuestionTypes", Self::ALL.map(QuestionType::as_str))
  }
}

impl std::fmt::Display for QuestionType {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result { f.write_str(self.as_str()) }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
  Easy,
  Medium,
  Hard,
}

impl Difficulty {
  pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];

  pub fn as_str(self) -> &'static str {
    match self {
      Difficulty::Easy => "easy",
      Difficulty::Medium => "medium",
      Difficulty::Hard => "hard",
    }
  }

  pub fn parse(s: &str) -> Option<Self> {
    Self::ALL.into_iter().find(|d| d.as_str() == s)
  }

  pub fn descriptor() -> Result<EnumDescriptor, DescriptorError> {
    EnumDescriptor::new("Difficulty", Self::ALL.map(Difficulty::as_str))
  }
}

/// Scoring tunables attached to every question.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ScoringRules {
  /// Awarded for a correct answer.
  pub points: i64,
  /// Deducted for a wrong answer.
  pub negative_points: i64,
  pub allowed_duration_secs: i64,
  pub skippable: bool,
  /// End the quiz on a wrong answer.
  pub instant_fail: bool,
  /// Accept approximately correct answers.
  pub allow_approximate: bool,
}

impl Default for ScoringRules {
  fn default() -> Self {
    Self {
      points: 0,
      negative_points: 0,
      allowed_duration_secs: 60,
      skippable: false,
      instant_fail: false,
      allow_approximate: false,
    }
  }
}

impl ScoringRules {
  pub fn descriptor() -> RecordDescriptor {
    let opt = TypeDescriptor::optional;
    RecordDescriptor::new("ScoringRules", vec![
      Field::new("points", opt(TypeDescriptor::integer())),
      Field::new("negative_points", opt(TypeDescriptor::integer())),
      Field::new("allowed_duration_secs", opt(TypeDescriptor::integer())),
      Field::new("skippable", opt(TypeDescriptor::boolean())),
      Field::new("instant_fail", opt(TypeDescriptor::boolean())),
      Field::new("allow_approximate", opt(TypeDescriptor::boolean())),
    ])
  }

}

/// Answer counters; all start at zero.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Analytics {
  pub num_correct: u32,
  pub num_incorrect: u32,
  pub num_skipped: u32,
}

impl Analytics {
  pub fn descriptor() -> RecordDescriptor {
    let opt = TypeDescriptor::optional;
    RecordDescriptor::new("Analytics", vec![
      Field::new("num_correct", opt(TypeDescriptor::integer())),
      Field::new("num_incorrect", opt(TypeDescriptor::integer())),
      Field::new("num_skipped", opt(TypeDescriptor::integer())),
    ])
  }

}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn tags_round_trip_through_parse() {
    for q in QuestionType::ALL {
      assert_eq!(QuestionType::parse(q.as_str()), Some(q));
      assert_eq!(serde_json::to_value(q).unwrap(), q.as_str());
    }
    assert_eq!(QuestionType::parse("essay"), None);
    assert_eq!(Difficulty::parse("impossible"), None);
    assert_eq!(Difficulty::parse("hard"), Some(Difficulty::Hard));
  }

  #[test]
  fn scoring_defaults() {
    let rules: ScoringRules = serde_json::from_str("{\"points\": 5}").unwrap();
    assert_eq!(rules.points, 5);
    assert_eq!(rules.negative_points, 0);
    assert_eq!(rules.allowed_duration_secs, 60);
    assert!(!rules.skippable && !rules.instant_fail && !rules.allow_approximate);
    assert_eq!(Analytics::default(), Analytics { num_correct: 0, num_incorrect: 0, num_skipped: 0 });
    let back: ScoringRules = serde_json::from_value(serde_json::to_value(ScoringRules::default()).unwrap()).unwrap();
    assert_eq!(back, ScoringRules::default());
  }

  #[test]
  fn nested_record_fields_are_all_optional() {
    assert!(ScoringRules::descriptor().fields.iter().all(|f| f.ty.is_optional()));
    assert!(Analytics::descriptor().fields.iter().all(|f| f.ty.is_optional()));
  }
}

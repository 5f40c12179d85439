//! Rubric types: reusable scoring templates owned by an organization.
//!
//! A rubric is an ordered list of criteria; each criterion carries an ordered
//! list of qualitative levels. Criteria and levels are embedded values and
//! have no identity of their own.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result};

/// Suffix appended to the name of a duplicated rubric.
pub const COPY_SUFFIX: &str = " (cópia)";

/// Largest `max_points` a single criterion may carry.
pub const MAX_CRITERION_POINTS: f64 = 1_000_000.0;

// ─── Embedded structure ──────────────────────────────────────────────────────

/// One selectable tier within a criterion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Level {
  pub label:       String,
  /// Percentage (0–100) of the owning criterion's `max_points`.
  pub points:      f64,
  #[serde(default)]
  pub description: String,
}

/// One graded dimension of a rubric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Criterion {
  pub name:        String,
  #[serde(default)]
  pub description: String,
  pub max_points:  f64,
  pub levels:      Vec<Level>,
}

impl Criterion {
  /// Look up a level by its label.
  pub fn level(&self, label: &str) -> Option<&Level> {
    self.levels.iter().find(|l| l.label == label)
  }

  fn validate(&self, index: usize) -> Result<()> {
    if !(self.max_points > 0.0 && self.max_points <= MAX_CRITERION_POINTS) {
      return Err(Error::validation(format!(
        "criterion {index} ({:?}): max_points must be greater than zero and at \
         most {MAX_CRITERION_POINTS}",
        self.name
      )));
    }
    if self.levels.is_empty() {
      return Err(Error::validation(format!(
        "criterion {index} ({:?}): at least one level is required",
        self.name
      )));
    }
    for level in &self.levels {
      if !(0.0..=100.0).contains(&level.points) {
        return Err(Error::validation(format!(
          "criterion {index} ({:?}): level {:?} points must be between 0 and 100",
          self.name, level.label
        )));
      }
    }
    Ok(())
  }
}

/// Check every criterion of a rubric body.
///
/// An empty list passes: rubrics may exist without criteria while they are
/// being authored. They cannot be graded against until they have points.
pub fn validate_criteria(criteria: &[Criterion]) -> Result<()> {
  criteria
    .iter()
    .enumerate()
    .try_for_each(|(i, c)| c.validate(i))
}

fn validate_name(name: &str) -> Result<()> {
  if name.trim().is_empty() {
    return Err(Error::validation("rubric name must not be blank"));
  }
  Ok(())
}

// ─── Rubric ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rubric {
  pub rubric_id:       Uuid,
  pub organization_id: Uuid,
  pub name:            String,
  pub description:     String,
  pub is_default:      bool,
  pub criteria:        Vec<Criterion>,
  pub created_by:      Uuid,
  pub created_at:      DateTime<Utc>,
  pub updated_at:      DateTime<Utc>,
}

impl Rubric {
  /// Sum of every criterion's `max_points`.
  pub fn total_points(&self) -> f64 {
    self.criteria.iter().map(|c| c.max_points).sum()
  }

  /// Deep copy under a fresh id, never default, owned by `actor_id`.
  pub fn duplicate(&self, actor_id: Uuid, now: DateTime<Utc>) -> Rubric {
    Rubric {
      rubric_id:       Uuid::new_v4(),
      organization_id: self.organization_id,
      name:            format!("{}{COPY_SUFFIX}", self.name),
      description:     self.description.clone(),
      is_default:      false,
      criteria:        self.criteria.clone(),
      created_by:      actor_id,
      created_at:      now,
      updated_at:      now,
    }
  }

  /// Apply a partial update in memory. Nothing changes unless the whole patch
  /// is valid.
  pub fn apply(&mut self, patch: RubricPatch, now: DateTime<Utc>) -> Result<()> {
    if let Some(name) = &patch.name {
      validate_name(name)?;
    }
    if let Some(criteria) = &patch.criteria {
      validate_criteria(criteria)?;
    }

    if let Some(name) = patch.name {
      self.name = name;
    }
    if let Some(description) = patch.description {
      self.description = description;
    }
    if let Some(criteria) = patch.criteria {
      self.criteria = criteria;
    }
    if let Some(is_default) = patch.is_default {
      self.is_default = is_default;
    }
    self.updated_at = now;
    Ok(())
  }
}

// ─── Inputs ──────────────────────────────────────────────────────────────────

/// Input to [`crate::store::GradingStore::create_rubric`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewRubric {
  pub organization_id: Uuid,
  pub name:            String,
  #[serde(default)]
  pub description:     String,
  #[serde(default)]
  pub is_default:      bool,
  #[serde(default)]
  pub criteria:        Vec<Criterion>,
}

impl NewRubric {
  pub fn validate(&self) -> Result<()> {
    validate_name(&self.name)?;
    validate_criteria(&self.criteria)
  }

  /// Build the stored rubric. Caller is responsible for validation.
  pub fn into_rubric(self, actor_id: Uuid, now: DateTime<Utc>) -> Rubric {
    Rubric {
      rubric_id:       Uuid::new_v4(),
      organization_id: self.organization_id,
      name:            self.name,
      description:     self.description,
      is_default:      self.is_default,
      criteria:        self.criteria,
      created_by:      actor_id,
      created_at:      now,
      updated_at:      now,
    }
  }
}

/// Partial update; `None` leaves the field untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RubricPatch {
  pub name:        Option<String>,
  pub description: Option<String>,
  pub is_default:  Option<bool>,
  pub criteria:    Option<Vec<Criterion>>,
}

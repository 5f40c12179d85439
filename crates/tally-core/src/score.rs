//! The score calculator: a rubric plus level selections in, points out.
//!
//! Pure and deterministic. Nothing here touches storage, so identical inputs
//! always reproduce the same breakdown when a grade is audited.
//!
//! # Rounding
//!
//! Awarded points are `level_points * max_points / 100` rounded to the nearest
//! whole point, with exact halves rounding up (`2.5 → 3`). The multiplication
//! happens before the division so that exact percentages such as 75 % of 40
//! do not pick up binary floating-point error.

use serde::{Deserialize, Serialize};

use crate::{
  Error, Result,
  rubric::{Criterion, Rubric},
};

/// The level chosen for one criterion, expressed as a percentage.
///
/// `level_points` is normally a level's own `points`, but any value in
/// `[0, 100]` is accepted as a raw override.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CriterionSelection {
  pub criterion_index: usize,
  pub level_points:    f64,
}

/// Result of [`score_rubric`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
  /// Awarded points per criterion, in rubric order. Unselected criteria
  /// award `0`.
  pub per_criterion: Vec<f64>,
  pub total:         f64,
  pub max_possible:  f64,
  pub percentage:    f64,
}

/// Round to the nearest integer, halves upward.
///
/// Inputs are never negative here, so `f64::round` (half away from zero)
/// already behaves as half-up.
pub fn round_half_up(value: f64) -> f64 { value.round() }

fn check_percentage(level_points: f64) -> Result<()> {
  if !(0.0..=100.0).contains(&level_points) {
    return Err(Error::validation(format!(
      "level points must be between 0 and 100, got {level_points}"
    )));
  }
  Ok(())
}

/// Points awarded on `criterion` for a level worth `level_points` percent.
pub fn score_criterion(criterion: &Criterion, level_points: f64) -> Result<f64> {
  check_percentage(level_points)?;
  Ok(round_half_up(level_points * criterion.max_points / 100.0))
}

/// Score a whole rubric.
///
/// Every selection must name an existing criterion, and no criterion may be
/// selected twice. A rubric whose criteria add up to zero points cannot be
/// graded against.
pub fn score_rubric(
  rubric: &Rubric,
  selections: &[CriterionSelection],
) -> Result<ScoreBreakdown> {
  let max_possible = rubric.total_points();
  if max_possible <= 0.0 {
    return Err(Error::validation(format!(
      "rubric {} has no points to grade against",
      rubric.rubric_id
    )));
  }

  let mut per_criterion: Vec<Option<f64>> = vec![None; rubric.criteria.len()];
  for sel in selections {
    let criterion = rubric.criteria.get(sel.criterion_index).ok_or_else(|| {
      Error::validation(format!(
        "criterion index {} out of range (rubric has {} criteria)",
        sel.criterion_index,
        rubric.criteria.len()
      ))
    })?;
    let slot = &mut per_criterion[sel.criterion_index];
    if slot.is_some() {
      return Err(Error::validation(format!(
        "criterion {} selected more than once",
        sel.criterion_index
      )));
    }
    *slot = Some(score_criterion(criterion, sel.level_points)?);
  }

  let per_criterion: Vec<f64> =
    per_criterion.into_iter().map(|p| p.unwrap_or(0.0)).collect();
  let total: f64 = per_criterion.iter().sum();
  let percentage = total * 100.0 / max_possible;

  // Stored rubrics are bounded by validation; this catches ones built
  // in memory around it.
  if !(max_possible.is_finite() && total.is_finite() && percentage.is_finite()) {
    return Err(Error::validation(format!(
      "rubric {} produces a score outside the representable range",
      rubric.rubric_id
    )));
  }

  Ok(ScoreBreakdown { per_criterion, total, max_possible, percentage })
}

/// [`score_rubric`] for finalizing a grade: every criterion must carry a
/// selection.
pub fn score_complete(
  rubric: &Rubric,
  selections: &[CriterionSelection],
) -> Result<ScoreBreakdown> {
  let breakdown = score_rubric(rubric, selections)?;
  // In-range, duplicate-free selections cover every criterion iff the counts
  // match.
  if selections.len() != rubric.criteria.len() {
    return Err(Error::validation(format!(
      "expected a selection for each of the {} criteria, got {}",
      rubric.criteria.len(),
      selections.len()
    )));
  }
  Ok(breakdown)
}

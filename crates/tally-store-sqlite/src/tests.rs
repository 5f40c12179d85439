//! Integration tests for `SqliteStore` against an in-memory database.

use tally_core::{
  ErrorKind,
  actor::{Actor, Role},
  rubric::{Criterion, Level, NewRubric, RubricPatch},
  score::CriterionSelection,
  stats::GradingScope,
  store::GradingStore,
  submission::NewSubmission,
  workflow::GradingStatus,
};
use uuid::Uuid;

use crate::{Error, SqliteStore};

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn instructor(organization_id: Uuid) -> Actor {
  Actor { id: Uuid::new_v4(), organization_id, role: Role::Instructor }
}

fn kind(err: &Error) -> ErrorKind {
  match err {
    Error::Core(e) => e.kind(),
    other => panic!("expected a domain error, got {other:?}"),
  }
}

fn criterion(name: &str, max_points: f64) -> Criterion {
  Criterion {
    name: name.into(),
    description: String::new(),
    max_points,
    levels: vec![
      Level { label: "Full".into(), points: 100.0, description: String::new() },
      Level { label: "Half".into(), points: 50.0, description: String::new() },
    ],
  }
}

fn new_rubric(organization_id: Uuid, name: &str, is_default: bool) -> NewRubric {
  NewRubric {
    organization_id,
    name: name.into(),
    description: String::new(),
    is_default,
    criteria: vec![criterion("Content", 60.0), criterion("Style", 40.0)],
  }
}

fn new_submission(actor: &Actor) -> NewSubmission {
  NewSubmission {
    organization_id:         actor.organization_id,
    instructor_id:           actor.id,
    automatic_score:         None,
    requires_manual_grading: true,
    completed_at:            None,
  }
}

async fn default_count(s: &SqliteStore, organization_id: Uuid) -> usize {
  s.list_rubrics(organization_id)
    .await
    .unwrap()
    .iter()
    .filter(|r| r.is_default)
    .count()
}

// ─── Rubrics ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn create_and_get_rubric() {
  let s = store().await;
  let org = Uuid::new_v4();
  let actor = instructor(org);

  let rubric = s
    .create_rubric(new_rubric(org, "Essay", false), actor)
    .await
    .unwrap();
  assert_eq!(rubric.created_by, actor.id);

  let fetched = s.get_rubric(rubric.rubric_id).await.unwrap().unwrap();
  assert_eq!(fetched.name, "Essay");
  assert_eq!(fetched.criteria, rubric.criteria);
  assert!(!fetched.is_default);
}

#[tokio::test]
async fn get_rubric_missing_returns_none() {
  let s = store().await;
  assert!(s.get_rubric(Uuid::new_v4()).await.unwrap().is_none());
}

#[tokio::test]
async fn create_rejects_invalid_criteria() {
  let s = store().await;
  let org = Uuid::new_v4();
  let mut input = new_rubric(org, "Broken", false);
  input.criteria[1].max_points = 0.0;

  let err = s.create_rubric(input, instructor(org)).await.unwrap_err();
  assert_eq!(kind(&err), ErrorKind::Validation);
  assert!(s.list_rubrics(org).await.unwrap().is_empty());
}

#[tokio::test]
async fn oversized_criterion_cannot_reach_a_grade() {
  let s = store().await;
  let org = Uuid::new_v4();
  let actor = instructor(org);

  let mut input = new_rubric(org, "Huge", false);
  input.criteria = vec![criterion("Everything", 1e307)];
  let err = s.create_rubric(input, actor).await.unwrap_err();
  assert_eq!(kind(&err), ErrorKind::Validation);

  let rubric = s.create_rubric(new_rubric(org, "Essay", false), actor).await.unwrap();
  let err = s
    .update_rubric(
      rubric.rubric_id,
      RubricPatch {
        criteria: Some(vec![criterion("Everything", 1e307)]),
        ..Default::default()
      },
      actor,
    )
    .await
    .unwrap_err();
  assert_eq!(kind(&err), ErrorKind::Validation);

  let sub = s.record_submission(new_submission(&actor)).await.unwrap();
  let selections = vec![
    CriterionSelection { criterion_index: 0, level_points: 100.0 },
    CriterionSelection { criterion_index: 1, level_points: 100.0 },
  ];
  let graded = s
    .grade_with_rubric(sub.submission_id, rubric.rubric_id, selections, actor)
    .await
    .unwrap();
  assert_eq!(graded.manual_score, Some(100.0));

  let stats = s.grading_stats(GradingScope::Organization(org)).await.unwrap();
  assert_eq!(stats.avg_score, 100);
}

#[tokio::test]
async fn create_requires_staff_of_the_organization() {
  let s = store().await;
  let org = Uuid::new_v4();

  let outsider = instructor(Uuid::new_v4());
  let err = s
    .create_rubric(new_rubric(org, "Essay", false), outsider)
    .await
    .unwrap_err();
  assert_eq!(kind(&err), ErrorKind::Authorization);

  let student = Actor { role: Role::Student, ..instructor(org) };
  let err = s
    .create_rubric(new_rubric(org, "Essay", false), student)
    .await
    .unwrap_err();
  assert_eq!(kind(&err), ErrorKind::Authorization);
}

#[tokio::test]
async fn creating_a_default_clears_the_previous_one() {
  let s = store().await;
  let org = Uuid::new_v4();
  let actor = instructor(org);

  let first = s.create_rubric(new_rubric(org, "A", true), actor).await.unwrap();
  let second = s.create_rubric(new_rubric(org, "B", true), actor).await.unwrap();

  assert_eq!(default_count(&s, org).await, 1);
  let default = s.get_default_rubric(org).await.unwrap().unwrap();
  assert_eq!(default.rubric_id, second.rubric_id);
  assert!(!s.get_rubric(first.rubric_id).await.unwrap().unwrap().is_default);
}

#[tokio::test]
async fn defaults_are_scoped_per_organization() {
  let s = store().await;
  let org_a = Uuid::new_v4();
  let org_b = Uuid::new_v4();

  s.create_rubric(new_rubric(org_a, "A", true), instructor(org_a))
    .await
    .unwrap();
  s.create_rubric(new_rubric(org_b, "B", true), instructor(org_b))
    .await
    .unwrap();

  assert_eq!(default_count(&s, org_a).await, 1);
  assert_eq!(default_count(&s, org_b).await, 1);
}

#[tokio::test]
async fn update_is_partial() {
  let s = store().await;
  let org = Uuid::new_v4();
  let actor = instructor(org);
  let rubric = s.create_rubric(new_rubric(org, "Essay", false), actor).await.unwrap();

  let updated = s
    .update_rubric(
      rubric.rubric_id,
      RubricPatch { name: Some("Essay v2".into()), ..Default::default() },
      actor,
    )
    .await
    .unwrap();
  assert_eq!(updated.name, "Essay v2");
  assert_eq!(updated.criteria, rubric.criteria);
  assert!(updated.updated_at >= rubric.updated_at);

  let fetched = s.get_rubric(rubric.rubric_id).await.unwrap().unwrap();
  assert_eq!(fetched.name, "Essay v2");
  assert_eq!(fetched.description, rubric.description);
}

#[tokio::test]
async fn update_to_default_is_exclusive() {
  let s = store().await;
  let org = Uuid::new_v4();
  let actor = instructor(org);
  let first = s.create_rubric(new_rubric(org, "A", true), actor).await.unwrap();
  let second = s.create_rubric(new_rubric(org, "B", false), actor).await.unwrap();

  s.update_rubric(
    second.rubric_id,
    RubricPatch { is_default: Some(true), ..Default::default() },
    actor,
  )
  .await
  .unwrap();

  assert_eq!(default_count(&s, org).await, 1);
  assert!(!s.get_rubric(first.rubric_id).await.unwrap().unwrap().is_default);
  assert!(s.get_rubric(second.rubric_id).await.unwrap().unwrap().is_default);
}

#[tokio::test]
async fn update_with_invalid_criteria_leaves_rubric_untouched() {
  let s = store().await;
  let org = Uuid::new_v4();
  let actor = instructor(org);
  let rubric = s.create_rubric(new_rubric(org, "Essay", false), actor).await.unwrap();

  let err = s
    .update_rubric(
      rubric.rubric_id,
      RubricPatch {
        name:     Some("Renamed".into()),
        criteria: Some(vec![criterion("Bad", -1.0)]),
        ..Default::default()
      },
      actor,
    )
    .await
    .unwrap_err();
  assert_eq!(kind(&err), ErrorKind::Validation);

  let fetched = s.get_rubric(rubric.rubric_id).await.unwrap().unwrap();
  assert_eq!(fetched.name, "Essay");
}

#[tokio::test]
async fn update_missing_rubric_is_not_found() {
  let s = store().await;
  let org = Uuid::new_v4();
  let err = s
    .update_rubric(Uuid::new_v4(), RubricPatch::default(), instructor(org))
    .await
    .unwrap_err();
  assert_eq!(kind(&err), ErrorKind::NotFound);
}

#[tokio::test]
async fn removing_the_default_is_an_invariant_violation() {
  let s = store().await;
  let org = Uuid::new_v4();
  let actor = instructor(org);
  let default = s.create_rubric(new_rubric(org, "A", true), actor).await.unwrap();

  let err = s.remove_rubric(default.rubric_id, actor).await.unwrap_err();
  assert_eq!(kind(&err), ErrorKind::InvariantViolation);
  assert!(s.get_rubric(default.rubric_id).await.unwrap().is_some());

  // Promote another rubric, then removal succeeds.
  let other = s.create_rubric(new_rubric(org, "B", false), actor).await.unwrap();
  s.set_default_rubric(other.rubric_id, actor).await.unwrap();
  s.remove_rubric(default.rubric_id, actor).await.unwrap();
  assert!(s.get_rubric(default.rubric_id).await.unwrap().is_none());
}

#[tokio::test]
async fn remove_missing_rubric_is_not_found() {
  let s = store().await;
  let org = Uuid::new_v4();
  let err = s
    .remove_rubric(Uuid::new_v4(), instructor(org))
    .await
    .unwrap_err();
  assert_eq!(kind(&err), ErrorKind::NotFound);
}

#[tokio::test]
async fn set_default_is_idempotent() {
  let s = store().await;
  let org = Uuid::new_v4();
  let actor = instructor(org);
  let a = s.create_rubric(new_rubric(org, "A", true), actor).await.unwrap();
  let b = s.create_rubric(new_rubric(org, "B", false), actor).await.unwrap();
  let c = s.create_rubric(new_rubric(org, "C", false), actor).await.unwrap();

  s.set_default_rubric(b.rubric_id, actor).await.unwrap();
  s.set_default_rubric(b.rubric_id, actor).await.unwrap();

  let rubrics = s.list_rubrics(org).await.unwrap();
  let defaults: Vec<_> = rubrics.iter().filter(|r| r.is_default).collect();
  assert_eq!(defaults.len(), 1);
  assert_eq!(defaults[0].rubric_id, b.rubric_id);
  for id in [a.rubric_id, c.rubric_id] {
    assert!(!s.get_rubric(id).await.unwrap().unwrap().is_default);
  }
}

#[tokio::test]
async fn set_default_missing_rubric_is_not_found() {
  let s = store().await;
  let org = Uuid::new_v4();
  let err = s
    .set_default_rubric(Uuid::new_v4(), instructor(org))
    .await
    .unwrap_err();
  assert_eq!(kind(&err), ErrorKind::NotFound);
}

#[tokio::test]
async fn concurrent_default_designations_leave_one_default() {
  let s = store().await;
  let org = Uuid::new_v4();
  let actor = instructor(org);

  let mut ids = Vec::new();
  for name in ["A", "B", "C", "D"] {
    let r = s.create_rubric(new_rubric(org, name, false), actor).await.unwrap();
    ids.push(r.rubric_id);
  }

  let mut handles = Vec::new();
  for _ in 0..5 {
    for &id in &ids {
      let store = s.clone();
      handles.push(tokio::spawn(async move {
        store.set_default_rubric(id, actor).await
      }));
    }
  }
  for h in handles {
    h.await.unwrap().unwrap();
  }

  assert_eq!(default_count(&s, org).await, 1);
}

#[tokio::test]
async fn list_puts_default_first_then_newest() {
  let s = store().await;
  let org = Uuid::new_v4();
  let actor = instructor(org);

  let oldest = s.create_rubric(new_rubric(org, "Oldest", true), actor).await.unwrap();
  let middle = s.create_rubric(new_rubric(org, "Middle", false), actor).await.unwrap();
  let newest = s.create_rubric(new_rubric(org, "Newest", false), actor).await.unwrap();
  // A rubric of another organization never shows up.
  let other = Uuid::new_v4();
  s.create_rubric(new_rubric(other, "Other", false), instructor(other))
    .await
    .unwrap();

  let ids: Vec<_> = s
    .list_rubrics(org)
    .await
    .unwrap()
    .into_iter()
    .map(|r| r.rubric_id)
    .collect();
  assert_eq!(ids, vec![oldest.rubric_id, newest.rubric_id, middle.rubric_id]);
}

#[tokio::test]
async fn get_default_returns_none_without_default() {
  let s = store().await;
  let org = Uuid::new_v4();
  s.create_rubric(new_rubric(org, "A", false), instructor(org))
    .await
    .unwrap();
  assert!(s.get_default_rubric(org).await.unwrap().is_none());
}

#[tokio::test]
async fn duplicate_creates_independent_non_default_copy() {
  let s = store().await;
  let org = Uuid::new_v4();
  let author = instructor(org);
  let copier = instructor(org);
  let original = s.create_rubric(new_rubric(org, "Essay", true), author).await.unwrap();

  let copy = s.duplicate_rubric(original.rubric_id, copier).await.unwrap();
  assert_ne!(copy.rubric_id, original.rubric_id);
  assert_eq!(copy.organization_id, org);
  assert_eq!(copy.criteria, original.criteria);
  assert_eq!(copy.name, "Essay (cópia)");
  assert_eq!(copy.created_by, copier.id);
  assert!(!copy.is_default);

  // Each call creates a new rubric.
  let again = s.duplicate_rubric(original.rubric_id, copier).await.unwrap();
  assert_ne!(again.rubric_id, copy.rubric_id);
  assert_eq!(s.list_rubrics(org).await.unwrap().len(), 3);
  assert_eq!(default_count(&s, org).await, 1);

  // Editing the copy leaves the original alone.
  s.update_rubric(
    copy.rubric_id,
    RubricPatch { criteria: Some(vec![criterion("Only", 10.0)]), ..Default::default() },
    copier,
  )
  .await
  .unwrap();
  let original_now = s.get_rubric(original.rubric_id).await.unwrap().unwrap();
  assert_eq!(original_now.criteria.len(), 2);
}

#[tokio::test]
async fn default_rubric_seed_becomes_the_default() {
  let s = store().await;
  let org = Uuid::new_v4();
  let actor = instructor(org);
  let existing = s.create_rubric(new_rubric(org, "Mine", true), actor).await.unwrap();

  let seeded = s.create_default_rubric(org, actor).await.unwrap();
  assert!(seeded.is_default);
  assert_eq!(seeded.total_points(), 100.0);
  assert_eq!(seeded.criteria.len(), 4);

  assert_eq!(default_count(&s, org).await, 1);
  assert!(!s.get_rubric(existing.rubric_id).await.unwrap().unwrap().is_default);
}

// ─── Grading workflow ────────────────────────────────────────────────────────

#[tokio::test]
async fn submission_lifecycle_pending_grading_graded() {
  let s = store().await;
  let org = Uuid::new_v4();
  let actor = instructor(org);

  let sub = s.record_submission(new_submission(&actor)).await.unwrap();
  assert_eq!(sub.grading_status, GradingStatus::Pending);

  let opened = s.begin_grading(sub.submission_id, actor).await.unwrap();
  assert_eq!(opened.grading_status, GradingStatus::Grading);

  let graded = s.grade_manually(sub.submission_id, 88.0, actor).await.unwrap();
  assert_eq!(graded.grading_status, GradingStatus::Graded);
  assert_eq!(graded.manual_score, Some(88.0));
  assert!(graded.graded_at.is_some());

  let fetched = s.get_submission(sub.submission_id).await.unwrap().unwrap();
  assert_eq!(fetched, graded);
}

#[tokio::test]
async fn begin_grading_twice_is_a_state_error() {
  let s = store().await;
  let org = Uuid::new_v4();
  let actor = instructor(org);
  let sub = s.record_submission(new_submission(&actor)).await.unwrap();

  s.begin_grading(sub.submission_id, actor).await.unwrap();
  let err = s.begin_grading(sub.submission_id, actor).await.unwrap_err();
  assert_eq!(kind(&err), ErrorKind::State);
}

#[tokio::test]
async fn grading_manually_twice_is_a_state_error() {
  let s = store().await;
  let org = Uuid::new_v4();
  let actor = instructor(org);
  let sub = s.record_submission(new_submission(&actor)).await.unwrap();

  s.grade_manually(sub.submission_id, 70.0, actor).await.unwrap();
  let err = s.grade_manually(sub.submission_id, 95.0, actor).await.unwrap_err();
  assert_eq!(kind(&err), ErrorKind::State);

  let fetched = s.get_submission(sub.submission_id).await.unwrap().unwrap();
  assert_eq!(fetched.manual_score, Some(70.0));
}

#[tokio::test]
async fn concurrent_finalizes_only_one_succeeds() {
  let s = store().await;
  let org = Uuid::new_v4();
  let actor = instructor(org);
  let sub = s.record_submission(new_submission(&actor)).await.unwrap();

  let mut handles = Vec::new();
  for score in [10.0, 20.0, 30.0, 40.0] {
    let store = s.clone();
    let id = sub.submission_id;
    handles.push(tokio::spawn(async move {
      store.grade_manually(id, score, actor).await
    }));
  }

  let mut ok = 0;
  for h in handles {
    match h.await.unwrap() {
      Ok(_) => ok += 1,
      Err(e) => assert_eq!(kind(&e), ErrorKind::State),
    }
  }
  assert_eq!(ok, 1);
}

#[tokio::test]
async fn auto_graded_submissions_are_terminal() {
  let s = store().await;
  let org = Uuid::new_v4();
  let actor = instructor(org);

  let mut input = new_submission(&actor);
  input.automatic_score = Some(100.0);
  input.requires_manual_grading = false;
  let sub = s.record_submission(input).await.unwrap();
  assert_eq!(sub.grading_status, GradingStatus::AutoGraded);

  let err = s.grade_manually(sub.submission_id, 50.0, actor).await.unwrap_err();
  assert_eq!(kind(&err), ErrorKind::State);
  let err = s.begin_grading(sub.submission_id, actor).await.unwrap_err();
  assert_eq!(kind(&err), ErrorKind::State);
}

#[tokio::test]
async fn manual_score_out_of_range_is_rejected() {
  let s = store().await;
  let org = Uuid::new_v4();
  let actor = instructor(org);
  let sub = s.record_submission(new_submission(&actor)).await.unwrap();

  for bad in [-1.0, 100.1] {
    let err = s.grade_manually(sub.submission_id, bad, actor).await.unwrap_err();
    assert_eq!(kind(&err), ErrorKind::Validation);
  }
  let fetched = s.get_submission(sub.submission_id).await.unwrap().unwrap();
  assert_eq!(fetched.grading_status, GradingStatus::Pending);
}

#[tokio::test]
async fn grading_unknown_submission_is_not_found() {
  let s = store().await;
  let org = Uuid::new_v4();
  let err = s
    .grade_manually(Uuid::new_v4(), 50.0, instructor(org))
    .await
    .unwrap_err();
  assert_eq!(kind(&err), ErrorKind::NotFound);
}

#[tokio::test]
async fn only_the_assigned_instructor_or_an_admin_may_grade() {
  let s = store().await;
  let org = Uuid::new_v4();
  let owner = instructor(org);
  let sub = s.record_submission(new_submission(&owner)).await.unwrap();

  let colleague = instructor(org);
  let err = s
    .grade_manually(sub.submission_id, 50.0, colleague)
    .await
    .unwrap_err();
  assert_eq!(kind(&err), ErrorKind::Authorization);

  let admin = Actor { role: Role::Admin, ..instructor(org) };
  let graded = s.grade_manually(sub.submission_id, 50.0, admin).await.unwrap();
  assert_eq!(graded.grading_status, GradingStatus::Graded);
}

#[tokio::test]
async fn grade_with_seeded_rubric() {
  let s = store().await;
  let org = Uuid::new_v4();
  let actor = instructor(org);
  let rubric = s.create_default_rubric(org, actor).await.unwrap();
  let sub = s.record_submission(new_submission(&actor)).await.unwrap();
  s.begin_grading(sub.submission_id, actor).await.unwrap();

  let points = |i: usize, label: &str| rubric.criteria[i].level(label).unwrap().points;
  let selections = vec![
    CriterionSelection { criterion_index: 0, level_points: 30.0 },
    CriterionSelection { criterion_index: 1, level_points: points(1, "Excelente") },
    CriterionSelection { criterion_index: 2, level_points: points(2, "Regular") },
    CriterionSelection { criterion_index: 3, level_points: points(3, "Completa") },
  ];

  let graded = s
    .grade_with_rubric(sub.submission_id, rubric.rubric_id, selections, actor)
    .await
    .unwrap();
  assert_eq!(graded.grading_status, GradingStatus::Graded);
  assert_eq!(graded.rubric_id, Some(rubric.rubric_id));
  assert_eq!(graded.manual_score, Some(62.0));
  let awarded: Vec<f64> = graded
    .criterion_scores
    .as_ref()
    .unwrap()
    .iter()
    .map(|c| c.awarded_points)
    .collect();
  assert_eq!(awarded, vec![12.0, 30.0, 10.0, 10.0]);

  let fetched = s.get_submission(sub.submission_id).await.unwrap().unwrap();
  assert_eq!(fetched.criterion_scores, graded.criterion_scores);
}

#[tokio::test]
async fn grade_with_rubric_requires_every_criterion() {
  let s = store().await;
  let org = Uuid::new_v4();
  let actor = instructor(org);
  let rubric = s.create_default_rubric(org, actor).await.unwrap();
  let sub = s.record_submission(new_submission(&actor)).await.unwrap();

  let partial = vec![CriterionSelection { criterion_index: 0, level_points: 100.0 }];
  let err = s
    .grade_with_rubric(sub.submission_id, rubric.rubric_id, partial, actor)
    .await
    .unwrap_err();
  assert_eq!(kind(&err), ErrorKind::Validation);

  let fetched = s.get_submission(sub.submission_id).await.unwrap().unwrap();
  assert_eq!(fetched.grading_status, GradingStatus::Pending);
  assert!(fetched.criterion_scores.is_none());
}

#[tokio::test]
async fn grade_with_unknown_rubric_is_not_found() {
  let s = store().await;
  let org = Uuid::new_v4();
  let actor = instructor(org);
  let sub = s.record_submission(new_submission(&actor)).await.unwrap();

  let err = s
    .grade_with_rubric(sub.submission_id, Uuid::new_v4(), vec![], actor)
    .await
    .unwrap_err();
  assert_eq!(kind(&err), ErrorKind::NotFound);
}

#[tokio::test]
async fn grade_with_rubric_of_another_organization_is_rejected() {
  let s = store().await;
  let org = Uuid::new_v4();
  let other = Uuid::new_v4();
  let actor = instructor(org);
  let foreign = s
    .create_default_rubric(other, instructor(other))
    .await
    .unwrap();
  let sub = s.record_submission(new_submission(&actor)).await.unwrap();

  let selections = (0..4)
    .map(|i| CriterionSelection { criterion_index: i, level_points: 100.0 })
    .collect();
  let err = s
    .grade_with_rubric(sub.submission_id, foreign.rubric_id, selections, actor)
    .await
    .unwrap_err();
  assert_eq!(kind(&err), ErrorKind::Validation);
}

#[tokio::test]
async fn grading_with_a_rubric_without_points_is_rejected() {
  let s = store().await;
  let org = Uuid::new_v4();
  let actor = instructor(org);
  let mut input = new_rubric(org, "Draft", false);
  input.criteria.clear();
  let draft = s.create_rubric(input, actor).await.unwrap();
  let sub = s.record_submission(new_submission(&actor)).await.unwrap();

  let err = s
    .grade_with_rubric(sub.submission_id, draft.rubric_id, vec![], actor)
    .await
    .unwrap_err();
  assert_eq!(kind(&err), ErrorKind::Validation);
}

#[tokio::test]
async fn pending_grading_lists_open_submissions_oldest_first() {
  let s = store().await;
  let org = Uuid::new_v4();
  let actor = instructor(org);
  let someone_else = instructor(org);

  let first = s.record_submission(new_submission(&actor)).await.unwrap();
  let second = s.record_submission(new_submission(&actor)).await.unwrap();
  let done = s.record_submission(new_submission(&actor)).await.unwrap();
  s.record_submission(new_submission(&someone_else)).await.unwrap();

  s.begin_grading(second.submission_id, actor).await.unwrap();
  s.grade_manually(done.submission_id, 50.0, actor).await.unwrap();

  let pending = s.pending_grading(actor.id).await.unwrap();
  let ids: Vec<_> = pending.iter().map(|p| p.submission_id).collect();
  assert_eq!(ids, vec![first.submission_id, second.submission_id]);
  assert_eq!(pending[1].grading_status, GradingStatus::Grading);
}

// ─── Aggregates ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn grading_stats_for_an_organization() {
  let s = store().await;
  let org = Uuid::new_v4();
  let actor = instructor(org);

  for score in [80.0, 90.0, 70.0] {
    let sub = s.record_submission(new_submission(&actor)).await.unwrap();
    s.grade_manually(sub.submission_id, score, actor).await.unwrap();
  }
  s.record_submission(new_submission(&actor)).await.unwrap();
  let mut auto = new_submission(&actor);
  auto.automatic_score = Some(100.0);
  auto.requires_manual_grading = false;
  s.record_submission(auto).await.unwrap();

  // Noise in another organization.
  let other = instructor(Uuid::new_v4());
  s.record_submission(new_submission(&other)).await.unwrap();

  let stats = s.grading_stats(GradingScope::Organization(org)).await.unwrap();
  assert_eq!(stats.total_attempts, 5);
  assert_eq!(stats.pending_grading, 1);
  assert_eq!(stats.graded, 4);
  assert_eq!(stats.avg_score, 85);
}

#[tokio::test]
async fn manual_score_overrides_automatic_in_average() {
  let s = store().await;
  let org = Uuid::new_v4();
  let actor = instructor(org);

  let mut input = new_submission(&actor);
  input.automatic_score = Some(20.0);
  let sub = s.record_submission(input).await.unwrap();
  s.grade_manually(sub.submission_id, 90.0, actor).await.unwrap();

  let stats = s.grading_stats(GradingScope::Organization(org)).await.unwrap();
  assert_eq!(stats.avg_score, 90);
}

#[tokio::test]
async fn grading_stats_scoped_to_an_instructor() {
  let s = store().await;
  let org = Uuid::new_v4();
  let alice = instructor(org);
  let bob = instructor(org);

  let sub = s.record_submission(new_submission(&alice)).await.unwrap();
  s.grade_manually(sub.submission_id, 60.0, alice).await.unwrap();
  s.record_submission(new_submission(&alice)).await.unwrap();
  s.record_submission(new_submission(&bob)).await.unwrap();

  let stats = s.grading_stats(GradingScope::Instructor(alice.id)).await.unwrap();
  assert_eq!(stats.total_attempts, 2);
  assert_eq!(stats.pending_grading, 1);
  assert_eq!(stats.graded, 1);
  assert_eq!(stats.avg_score, 60);
}

#[tokio::test]
async fn grading_stats_empty_scope() {
  let s = store().await;
  let stats = s
    .grading_stats(GradingScope::Organization(Uuid::new_v4()))
    .await
    .unwrap();
  assert_eq!(stats.total_attempts, 0);
  assert_eq!(stats.pending_grading, 0);
  assert_eq!(stats.graded, 0);
  assert_eq!(stats.avg_score, 0);
}

//! The acting user, as handed to us by the identity collaborator.
//!
//! Tally does not manage users. It receives an [`Actor`] with every mutating
//! call and applies a small organization-scoped access policy; anything richer
//! belongs to the identity service in front of it.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
  Admin,
  Instructor,
  Student,
}

impl Role {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Admin => "admin",
      Self::Instructor => "instructor",
      Self::Student => "student",
    }
  }

  pub fn parse(s: &str) -> Option<Self> {
    match s {
      "admin" => Some(Self::Admin),
      "instructor" => Some(Self::Instructor),
      "student" => Some(Self::Student),
      _ => None,
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
  pub id:              Uuid,
  pub organization_id: Uuid,
  pub role:            Role,
}

impl Actor {
  /// Rubric authoring: staff of the owning organization.
  pub fn authorize_rubric_write(&self, organization_id: Uuid) -> Result<()> {
    if self.organization_id != organization_id {
      return Err(Error::Authorization(format!(
        "actor {} does not belong to organization {organization_id}",
        self.id
      )));
    }
    if self.role == Role::Student {
      return Err(Error::Authorization(
        "students cannot manage rubrics".to_owned(),
      ));
    }
    Ok(())
  }

  /// Grading: an admin of the organization, or the assigned instructor.
  pub fn authorize_grading(
    &self,
    organization_id: Uuid,
    instructor_id: Uuid,
  ) -> Result<()> {
    if self.organization_id != organization_id {
      return Err(Error::Authorization(format!(
        "actor {} does not belong to organization {organization_id}",
        self.id
      )));
    }
    match self.role {
      Role::Admin => Ok(()),
      Role::Instructor if self.id == instructor_id => Ok(()),
      Role::Instructor => Err(Error::Authorization(format!(
        "submission is assigned to instructor {instructor_id}"
      ))),
      Role::Student => {
        Err(Error::Authorization("students cannot grade".to_owned()))
      }
    }
  }
}

//! Caller-supplied payloads for inserts and partial updates.
//!
//! Each input validates its own text fields; existence checks against other
//! records happen in [`crate::Store`], which can see them.

use crate::{
    GroupId, Position, RequestPriority, RequestStatus, StoreError, UserId, Validator,
};
use chrono::{DateTime, Utc};

#[derive(Clone, Debug, Default)]
pub struct NewWorkspace {
    pub name: String,
    pub description: Option<String>,
    pub color: Option<String>,
}

impl NewWorkspace {
    pub fn validate(&self) -> Result<(), StoreError> {
        let mut v = Validator::new();
        v.required_text("name", &self.name);
        if let Some(color) = &self.color {
            v.color("color", color);
        }
        v.finish()
    }
}

#[derive(Clone, Debug, Default)]
pub struct NewBoard {
    pub name: String,
    pub description: Option<String>,
}

impl NewBoard {
    pub fn validate(&self) -> Result<(), StoreError> {
        let mut v = Validator::new();
        v.required_text("name", &self.name);
        v.finish()
    }
}

#[derive(Clone, Debug, Default)]
pub struct NewGroup {
    pub name: String,
    pub color: Option<String>,
    pub collapsed: bool,
}

impl NewGroup {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), StoreError> {
        let mut v = Validator::new();
        v.required_text("name", &self.name);
        if let Some(color) = &self.color {
            v.color("color", color);
        }
        v.finish()
    }
}

#[derive(Clone, Debug, Default)]
pub struct NewRequest {
    pub name: String,
    pub creative_brief: Option<String>,
    pub status: RequestStatus,
    pub priority: RequestPriority,
    pub kind: Option<String>,
    pub due_date: Option<DateTime<Utc>>,
    pub owner_id: Option<UserId>,
    pub assignee_id: Option<UserId>,
    pub prediction: Option<String>,
}

impl NewRequest {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), StoreError> {
        let mut v = Validator::new();
        v.required_text("name", &self.name);
        v.finish()
    }
}

#[derive(Clone, Debug, Default)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub avatar: Option<String>,
    pub initials: String,
    pub color: Option<String>,
}

impl NewUser {
    pub fn validate(&self) -> Result<(), StoreError> {
        let mut v = Validator::new();
        v.required_text("name", &self.name);
        v.email("email", &self.email);
        v.required_text("initials", &self.initials);
        if let Some(color) = &self.color {
            v.color("color", color);
        }
        v.finish()
    }
}

/// Partial update of a group. `None` leaves the field untouched.
#[derive(Clone, Debug, Default)]
pub struct GroupUpdate {
    pub name: Option<String>,
    pub color: Option<String>,
    pub position: Option<Position>,
    pub collapsed: Option<bool>,
}

impl GroupUpdate {
    pub fn validate(&self) -> Result<(), StoreError> {
        let mut v = Validator::new();
        if let Some(name) = &self.name {
            v.required_text("name", name);
        }
        if let Some(color) = &self.color {
            v.color("color", color);
        }
        v.finish()
    }
}

/// Partial update of a request.
///
/// Nullable fields are `Option<Option<_>>`: the outer `None` leaves the field
/// untouched, `Some(None)` clears it.
#[derive(Clone, Debug, Default)]
pub struct RequestUpdate {
    pub group_id: Option<GroupId>,
    pub name: Option<String>,
    pub creative_brief: Option<Option<String>>,
    pub status: Option<RequestStatus>,
    pub priority: Option<RequestPriority>,
    pub kind: Option<Option<String>>,
    pub due_date: Option<Option<DateTime<Utc>>>,
    pub owner_id: Option<Option<UserId>>,
    pub assignee_id: Option<Option<UserId>>,
    pub prediction: Option<Option<String>>,
    pub position: Option<Position>,
}

impl RequestUpdate {
    pub fn validate(&self) -> Result<(), StoreError> {
        let mut v = Validator::new();
        if let Some(name) = &self.name {
            v.required_text("name", name);
        }
        v.finish()
    }

    pub(crate) fn referenced_users(&self) -> impl Iterator<Item = (&'static str, UserId)> + '_ {
        [("ownerId", self.owner_id), ("assigneeId", self.assignee_id)]
            .into_iter()
            .filter_map(|(field, value)| value.flatten().map(|id| (field, id)))
    }
}

use crate::{BoardId, GroupId, Position, RequestId, UserId, WorkspaceId};
use chrono::{DateTime, Utc};
use std::fmt;

pub const DEFAULT_COLOR: &str = "#635BFF";

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Workspace {
    pub id: WorkspaceId,
    pub name: String,
    pub description: Option<String>,
    pub color: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Board {
    pub id: BoardId,
    pub workspace_id: WorkspaceId,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Group {
    pub id: GroupId,
    pub board_id: BoardId,
    pub name: String,
    pub color: String,
    pub position: Position,
    pub collapsed: bool,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Request {
    pub id: RequestId,
    pub group_id: GroupId,
    pub name: String,
    pub creative_brief: Option<String>,
    pub status: RequestStatus,
    pub priority: RequestPriority,
    pub kind: Option<String>,
    pub due_date: Option<DateTime<Utc>>,
    pub owner_id: Option<UserId>,
    pub assignee_id: Option<UserId>,
    pub prediction: Option<String>,
    pub position: Position,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub avatar: Option<String>,
    pub initials: String,
    pub color: String,
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
pub enum RequestStatus {
    #[default]
    Working,
    Progress,
    Completed,
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
pub enum RequestPriority {
    Low,
    #[default]
    Medium,
    High,
}

/// The string booleans stored on groups.
pub fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" => Some(true),
        "false" => Some(false),
        _ => None,
    }
}

pub fn flag_str(value: bool) -> &'static str {
    if value { "true" } else { "false" }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum EntityKind {
    Workspace,
    Board,
    Group,
    Request,
    User,
}

impl EntityKind {
    pub fn as_str(self) -> &'static str {
        match self {
            EntityKind::Workspace => "Workspace",
            EntityKind::Board => "Board",
            EntityKind::Group => "Group",
            EntityKind::Request => "Request",
            EntityKind::User => "User",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

//! Conversions between wire payloads and domain records.

use vibe_api::{
    BoardSnapshot, CreateBoard, CreateGroup, CreateRequest, CreateUser, CreateWorkspace,
    FlagValue, GroupPatch, GroupSnapshot, RankValue, RequestPatch, RequestSnapshot,
    UserSnapshot, WorkspaceSnapshot,
};
use vibe_domain::{
    Board, FieldError, Group, GroupId, GroupUpdate, NewBoard, NewGroup, NewRequest, NewUser,
    NewWorkspace, Position, Request, RequestPriority, RequestStatus, RequestUpdate, User,
    UserId, Validator, Workspace, flag_str, parse_flag, parse_position,
};

pub(crate) fn workspace_snapshot(workspace: Workspace) -> WorkspaceSnapshot {
    WorkspaceSnapshot {
        id: vibe_api::WorkspaceId(workspace.id.to_string()),
        name: workspace.name,
        description: workspace.description,
        color: workspace.color,
        created_at: workspace.created_at,
    }
}

pub(crate) fn board_snapshot(board: Board) -> BoardSnapshot {
    BoardSnapshot {
        id: vibe_api::BoardId(board.id.to_string()),
        workspace_id: vibe_api::WorkspaceId(board.workspace_id.to_string()),
        name: board.name,
        description: board.description,
        created_at: board.created_at,
    }
}

pub(crate) fn group_snapshot(group: Group) -> GroupSnapshot {
    GroupSnapshot {
        id: vibe_api::GroupId(group.id.to_string()),
        board_id: vibe_api::BoardId(group.board_id.to_string()),
        name: group.name,
        color: group.color,
        position: group.position.to_string(),
        collapsed: flag_str(group.collapsed).to_owned(),
    }
}

pub(crate) fn request_snapshot(request: Request) -> RequestSnapshot {
    RequestSnapshot {
        id: vibe_api::RequestId(request.id.to_string()),
        group_id: vibe_api::GroupId(request.group_id.to_string()),
        name: request.name,
        creative_brief: request.creative_brief,
        status: map_status(request.status),
        priority: map_priority(request.priority),
        kind: request.kind,
        due_date: request.due_date,
        owner_id: request.owner_id.map(|id| vibe_api::UserId(id.to_string())),
        assignee_id: request.assignee_id.map(|id| vibe_api::UserId(id.to_string())),
        prediction: request.prediction,
        position: request.position.to_string(),
        created_at: request.created_at,
    }
}

pub(crate) fn user_snapshot(user: User) -> UserSnapshot {
    UserSnapshot {
        id: vibe_api::UserId(user.id.to_string()),
        name: user.name,
        email: user.email,
        avatar: user.avatar,
        initials: user.initials,
        color: user.color,
    }
}

fn map_status(status: RequestStatus) -> vibe_api::RequestStatus {
    match status {
        RequestStatus::Working => vibe_api::RequestStatus::Working,
        RequestStatus::Progress => vibe_api::RequestStatus::Progress,
        RequestStatus::Completed => vibe_api::RequestStatus::Completed,
    }
}

fn parse_status(status: vibe_api::RequestStatus) -> RequestStatus {
    match status {
        vibe_api::RequestStatus::Working => RequestStatus::Working,
        vibe_api::RequestStatus::Progress => RequestStatus::Progress,
        vibe_api::RequestStatus::Completed => RequestStatus::Completed,
    }
}

fn map_priority(priority: RequestPriority) -> vibe_api::RequestPriority {
    match priority {
        RequestPriority::Low => vibe_api::RequestPriority::Low,
        RequestPriority::Medium => vibe_api::RequestPriority::Medium,
        RequestPriority::High => vibe_api::RequestPriority::High,
    }
}

fn parse_priority(priority: vibe_api::RequestPriority) -> RequestPriority {
    match priority {
        vibe_api::RequestPriority::Low => RequestPriority::Low,
        vibe_api::RequestPriority::Medium => RequestPriority::Medium,
        vibe_api::RequestPriority::High => RequestPriority::High,
    }
}

fn rank(v: &mut Validator, value: RankValue) -> Option<Position> {
    let parsed = match &value {
        RankValue::Number(n) => Some(Position::new(*n)),
        RankValue::Text(text) => parse_position(text),
    };
    if parsed.is_none() {
        v.push(FieldError::new(
            "position",
            "must be a non-negative integer rank",
        ));
    }
    parsed
}

fn flag(v: &mut Validator, field: &str, value: FlagValue) -> Option<bool> {
    let parsed = match &value {
        FlagValue::Bool(b) => Some(*b),
        FlagValue::Text(text) => parse_flag(text),
    };
    if parsed.is_none() {
        v.push(FieldError::new(field, "must be \"true\" or \"false\""));
    }
    parsed
}

fn user_ref(v: &mut Validator, field: &str, value: &str) -> Option<UserId> {
    let parsed = UserId::parse(value);
    if parsed.is_none() {
        v.push(FieldError::new(field, "must be a user id"));
    }
    parsed
}

fn finish<T>(v: Validator, value: T) -> Result<T, Vec<FieldError>> {
    let errors = v.into_errors();
    if errors.is_empty() {
        Ok(value)
    } else {
        Err(errors)
    }
}

pub(crate) fn new_workspace(body: CreateWorkspace) -> NewWorkspace {
    NewWorkspace {
        name: body.name,
        description: body.description,
        color: body.color,
    }
}

pub(crate) fn new_board(body: CreateBoard) -> NewBoard {
    NewBoard {
        name: body.name,
        description: body.description,
    }
}

pub(crate) fn new_group(body: CreateGroup) -> Result<NewGroup, Vec<FieldError>> {
    let mut v = Validator::new();
    let collapsed = body
        .collapsed
        .and_then(|value| flag(&mut v, "collapsed", value))
        .unwrap_or(false);
    finish(
        v,
        NewGroup {
            name: body.name,
            color: body.color,
            collapsed,
        },
    )
}

pub(crate) fn new_request(body: CreateRequest) -> Result<NewRequest, Vec<FieldError>> {
    let mut v = Validator::new();
    let owner_id = body
        .owner_id
        .as_deref()
        .and_then(|id| user_ref(&mut v, "ownerId", id));
    let assignee_id = body
        .assignee_id
        .as_deref()
        .and_then(|id| user_ref(&mut v, "assigneeId", id));
    finish(
        v,
        NewRequest {
            name: body.name,
            creative_brief: body.creative_brief,
            status: body.status.map(parse_status).unwrap_or_default(),
            priority: body.priority.map(parse_priority).unwrap_or_default(),
            kind: body.kind,
            due_date: body.due_date,
            owner_id,
            assignee_id,
            prediction: body.prediction,
        },
    )
}

pub(crate) fn new_user(body: CreateUser) -> NewUser {
    NewUser {
        name: body.name,
        email: body.email,
        avatar: body.avatar,
        initials: body.initials,
        color: body.color,
    }
}

pub(crate) fn group_update(patch: GroupPatch) -> Result<GroupUpdate, Vec<FieldError>> {
    let mut v = Validator::new();
    let position = patch.position.and_then(|value| rank(&mut v, value));
    let collapsed = patch
        .collapsed
        .and_then(|value| flag(&mut v, "collapsed", value));
    finish(
        v,
        GroupUpdate {
            name: patch.name,
            color: patch.color,
            position,
            collapsed,
        },
    )
}

pub(crate) fn request_update(patch: RequestPatch) -> Result<RequestUpdate, Vec<FieldError>> {
    let mut v = Validator::new();
    let group_id = patch.group_id.as_deref().and_then(|id| {
        let parsed = GroupId::parse(id);
        if parsed.is_none() {
            v.push(FieldError::new("groupId", "must be a group id"));
        }
        parsed
    });
    let owner_id = patch
        .owner_id
        .map(|id| id.and_then(|id| user_ref(&mut v, "ownerId", &id)));
    let assignee_id = patch
        .assignee_id
        .map(|id| id.and_then(|id| user_ref(&mut v, "assigneeId", &id)));
    let position = patch.position.and_then(|value| rank(&mut v, value));
    finish(
        v,
        RequestUpdate {
            group_id,
            name: patch.name,
            creative_brief: patch.creative_brief,
            status: patch.status.map(parse_status),
            priority: patch.priority.map(parse_priority),
            kind: patch.kind,
            due_date: patch.due_date,
            owner_id,
            assignee_id,
            prediction: patch.prediction,
            position,
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn group_patch_accepts_string_and_numeric_forms() {
        let update = group_update(GroupPatch {
            position: Some(RankValue::Text("3".to_owned())),
            collapsed: Some(FlagValue::Text("true".to_owned())),
            ..GroupPatch::default()
        })
        .expect("valid patch");
        assert_eq!(update.position, Some(Position::new(3)));
        assert_eq!(update.collapsed, Some(true));

        let update = group_update(GroupPatch {
            position: Some(RankValue::Number(4)),
            collapsed: Some(FlagValue::Bool(false)),
            ..GroupPatch::default()
        })
        .expect("valid patch");
        assert_eq!(update.position, Some(Position::new(4)));
        assert_eq!(update.collapsed, Some(false));
    }

    #[test]
    fn group_patch_reports_every_bad_field() {
        let errors = group_update(GroupPatch {
            position: Some(RankValue::Text("top".to_owned())),
            collapsed: Some(FlagValue::Text("maybe".to_owned())),
            ..GroupPatch::default()
        })
        .expect_err("invalid patch");
        let paths: Vec<String> = errors.iter().map(|e| e.path.join(".")).collect();
        assert_eq!(paths, vec!["position", "collapsed"]);
    }

    #[test]
    fn request_patch_keeps_null_as_clear() {
        let update = request_update(RequestPatch {
            owner_id: Some(None),
            ..RequestPatch::default()
        })
        .expect("valid patch");
        assert_eq!(update.owner_id, Some(None));
        assert_eq!(update.assignee_id, None);
    }

    #[test]
    fn request_refs_must_be_ids() {
        let errors = new_request(CreateRequest {
            name: "Creative".to_owned(),
            owner_id: Some("john".to_owned()),
            ..CreateRequest::default()
        })
        .expect_err("bad owner id");
        assert_eq!(errors[0].path, vec!["ownerId".to_owned()]);
    }

    #[test]
    fn new_request_fills_defaults() {
        let input = new_request(CreateRequest {
            name: "Creative".to_owned(),
            ..CreateRequest::default()
        })
        .expect("valid");
        assert_eq!(input.status, RequestStatus::Working);
        assert_eq!(input.priority, RequestPriority::Medium);
    }
}

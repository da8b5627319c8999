use crate::{
    Board, BoardId, DEFAULT_COLOR, EntityKind, Group, GroupId, GroupUpdate, NewBoard, NewGroup,
    NewRequest, NewUser, NewWorkspace, Position, RankSequence, Request, RequestId, RequestUpdate,
    StoreError, User, UserId, Workspace, WorkspaceId,
};
use chrono::Utc;
use std::collections::HashMap;

#[derive(Clone, Debug)]
struct Slot<T> {
    seq: u64,
    record: T,
}

/// In-memory board state: every record keyed by id, plus the per-parent rank
/// sequences used when appending groups and requests.
///
/// Listings are ordered by `(position, insertion order)`; records without a
/// position (workspaces, boards, users) list in insertion order.
#[derive(Clone, Debug, Default)]
pub struct Store {
    next_seq: u64,
    workspaces: HashMap<WorkspaceId, Slot<Workspace>>,
    boards: HashMap<BoardId, Slot<Board>>,
    groups: HashMap<GroupId, Slot<Group>>,
    requests: HashMap<RequestId, Slot<Request>>,
    users: HashMap<UserId, Slot<User>>,
    group_ranks: RankSequence<BoardId>,
    request_ranks: RankSequence<GroupId>,
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store pre-filled with the demo board.
    pub fn seeded() -> Result<Self, StoreError> {
        let mut store = Self::new();
        crate::seed::seed_demo(&mut store)?;
        Ok(store)
    }

    fn bump_seq(&mut self) -> u64 {
        self.next_seq = self.next_seq.saturating_add(1);
        self.next_seq
    }

    // Workspaces

    pub fn workspaces(&self) -> Vec<Workspace> {
        in_insertion_order(self.workspaces.values())
    }

    pub fn workspace(&self, id: WorkspaceId) -> Result<Workspace, StoreError> {
        self.workspaces
            .get(&id)
            .map(|slot| slot.record.clone())
            .ok_or_else(|| StoreError::not_found(EntityKind::Workspace, id))
    }

    pub fn create_workspace(&mut self, input: NewWorkspace) -> Result<Workspace, StoreError> {
        input.validate()?;
        let workspace = Workspace {
            id: WorkspaceId::random(),
            name: input.name,
            description: input.description,
            color: input.color.unwrap_or_else(|| DEFAULT_COLOR.to_owned()),
            created_at: Utc::now(),
        };
        let seq = self.bump_seq();
        self.workspaces.insert(
            workspace.id,
            Slot {
                seq,
                record: workspace.clone(),
            },
        );
        Ok(workspace)
    }

    // Boards

    pub fn boards_in_workspace(&self, workspace_id: WorkspaceId) -> Vec<Board> {
        in_insertion_order(
            self.boards
                .values()
                .filter(|slot| slot.record.workspace_id == workspace_id),
        )
    }

    pub fn board(&self, id: BoardId) -> Result<Board, StoreError> {
        self.boards
            .get(&id)
            .map(|slot| slot.record.clone())
            .ok_or_else(|| StoreError::not_found(EntityKind::Board, id))
    }

    pub fn create_board(
        &mut self,
        workspace_id: WorkspaceId,
        input: NewBoard,
    ) -> Result<Board, StoreError> {
        if !self.workspaces.contains_key(&workspace_id) {
            return Err(StoreError::missing_parent(
                EntityKind::Workspace,
                workspace_id,
            ));
        }
        input.validate()?;
        let board = Board {
            id: BoardId::random(),
            workspace_id,
            name: input.name,
            description: input.description,
            created_at: Utc::now(),
        };
        let seq = self.bump_seq();
        self.boards.insert(
            board.id,
            Slot {
                seq,
                record: board.clone(),
            },
        );
        Ok(board)
    }

    // Groups

    pub fn groups_in_board(&self, board_id: BoardId) -> Vec<Group> {
        let mut slots: Vec<&Slot<Group>> = self
            .groups
            .values()
            .filter(|slot| slot.record.board_id == board_id)
            .collect();
        slots.sort_by_key(|slot| (slot.record.position, slot.seq));
        slots.into_iter().map(|slot| slot.record.clone()).collect()
    }

    pub fn group(&self, id: GroupId) -> Result<Group, StoreError> {
        self.groups
            .get(&id)
            .map(|slot| slot.record.clone())
            .ok_or_else(|| StoreError::not_found(EntityKind::Group, id))
    }

    pub fn create_group(&mut self, board_id: BoardId, input: NewGroup) -> Result<Group, StoreError> {
        if !self.boards.contains_key(&board_id) {
            return Err(StoreError::missing_parent(EntityKind::Board, board_id));
        }
        input.validate()?;

        let sibling_max = self
            .groups
            .values()
            .filter(|slot| slot.record.board_id == board_id)
            .map(|slot| slot.record.position)
            .max();
        let position = self
            .group_ranks
            .next(board_id, sibling_max)
            .ok_or_else(|| StoreError::ranks_exhausted(EntityKind::Board, board_id))?;

        let group = Group {
            id: GroupId::random(),
            board_id,
            name: input.name,
            color: input.color.unwrap_or_else(|| DEFAULT_COLOR.to_owned()),
            position,
            collapsed: input.collapsed,
        };
        let seq = self.bump_seq();
        self.groups.insert(
            group.id,
            Slot {
                seq,
                record: group.clone(),
            },
        );
        Ok(group)
    }

    pub fn update_group(&mut self, id: GroupId, update: GroupUpdate) -> Result<Group, StoreError> {
        if !self.groups.contains_key(&id) {
            return Err(StoreError::not_found(EntityKind::Group, id));
        }
        update.validate()?;

        let slot = self
            .groups
            .get_mut(&id)
            .ok_or_else(|| StoreError::not_found(EntityKind::Group, id))?;
        let group = &mut slot.record;
        if let Some(name) = update.name {
            group.name = name;
        }
        if let Some(color) = update.color {
            group.color = color;
        }
        if let Some(position) = update.position {
            group.position = position;
        }
        if let Some(collapsed) = update.collapsed {
            group.collapsed = collapsed;
        }
        Ok(group.clone())
    }

    // Requests

    pub fn requests_in_group(&self, group_id: GroupId) -> Vec<Request> {
        let mut slots: Vec<&Slot<Request>> = self
            .requests
            .values()
            .filter(|slot| slot.record.group_id == group_id)
            .collect();
        slots.sort_by_key(|slot| (slot.record.position, slot.seq));
        slots.into_iter().map(|slot| slot.record.clone()).collect()
    }

    /// Every request in any group of the board, ordered by request position,
    /// ties broken by insertion.
    pub fn requests_in_board(&self, board_id: BoardId) -> Vec<Request> {
        let mut slots: Vec<&Slot<Request>> = self
            .requests
            .values()
            .filter(|slot| {
                self.groups
                    .get(&slot.record.group_id)
                    .is_some_and(|group| group.record.board_id == board_id)
            })
            .collect();
        slots.sort_by_key(|slot| (slot.record.position, slot.seq));
        slots.into_iter().map(|slot| slot.record.clone()).collect()
    }

    pub fn request(&self, id: RequestId) -> Result<Request, StoreError> {
        self.requests
            .get(&id)
            .map(|slot| slot.record.clone())
            .ok_or_else(|| StoreError::not_found(EntityKind::Request, id))
    }

    pub fn create_request(
        &mut self,
        group_id: GroupId,
        input: NewRequest,
    ) -> Result<Request, StoreError> {
        if !self.groups.contains_key(&group_id) {
            return Err(StoreError::missing_parent(EntityKind::Group, group_id));
        }
        input.validate()?;
        for (field, user_id) in [("ownerId", input.owner_id), ("assigneeId", input.assignee_id)] {
            if let Some(user_id) = user_id {
                self.ensure_user(field, user_id)?;
            }
        }

        let position = self.next_request_rank(group_id)?;
        let request = Request {
            id: RequestId::random(),
            group_id,
            name: input.name,
            creative_brief: input.creative_brief,
            status: input.status,
            priority: input.priority,
            kind: input.kind,
            due_date: input.due_date,
            owner_id: input.owner_id,
            assignee_id: input.assignee_id,
            prediction: input.prediction,
            position,
            created_at: Utc::now(),
        };
        let seq = self.bump_seq();
        self.requests.insert(
            request.id,
            Slot {
                seq,
                record: request.clone(),
            },
        );
        Ok(request)
    }

    /// Applies a partial update. Moving a request to another group without an
    /// explicit position appends it to the target group.
    pub fn update_request(
        &mut self,
        id: RequestId,
        update: RequestUpdate,
    ) -> Result<Request, StoreError> {
        let current_group = self
            .requests
            .get(&id)
            .map(|slot| slot.record.group_id)
            .ok_or_else(|| StoreError::not_found(EntityKind::Request, id))?;
        update.validate()?;

        if let Some(group_id) = update.group_id
            && !self.groups.contains_key(&group_id)
        {
            return Err(StoreError::DanglingReference {
                field: "groupId",
                entity: EntityKind::Group,
                id: group_id.to_string(),
            });
        }
        for (field, user_id) in update.referenced_users() {
            self.ensure_user(field, user_id)?;
        }

        let moved_to = update.group_id.filter(|group_id| *group_id != current_group);
        let appended_position = match (moved_to, update.position) {
            (Some(target), None) => Some(self.next_request_rank(target)?),
            _ => None,
        };

        let slot = self
            .requests
            .get_mut(&id)
            .ok_or_else(|| StoreError::not_found(EntityKind::Request, id))?;
        let request = &mut slot.record;
        if let Some(group_id) = update.group_id {
            request.group_id = group_id;
        }
        if let Some(name) = update.name {
            request.name = name;
        }
        if let Some(creative_brief) = update.creative_brief {
            request.creative_brief = creative_brief;
        }
        if let Some(status) = update.status {
            request.status = status;
        }
        if let Some(priority) = update.priority {
            request.priority = priority;
        }
        if let Some(kind) = update.kind {
            request.kind = kind;
        }
        if let Some(due_date) = update.due_date {
            request.due_date = due_date;
        }
        if let Some(owner_id) = update.owner_id {
            request.owner_id = owner_id;
        }
        if let Some(assignee_id) = update.assignee_id {
            request.assignee_id = assignee_id;
        }
        if let Some(prediction) = update.prediction {
            request.prediction = prediction;
        }
        if let Some(position) = update.position.or(appended_position) {
            request.position = position;
        }
        Ok(request.clone())
    }

    /// Hard delete. Returns whether a request was removed.
    pub fn delete_request(&mut self, id: RequestId) -> bool {
        self.requests.remove(&id).is_some()
    }

    fn next_request_rank(&mut self, group_id: GroupId) -> Result<Position, StoreError> {
        let sibling_max = self
            .requests
            .values()
            .filter(|slot| slot.record.group_id == group_id)
            .map(|slot| slot.record.position)
            .max();
        self.request_ranks
            .next(group_id, sibling_max)
            .ok_or_else(|| StoreError::ranks_exhausted(EntityKind::Group, group_id))
    }

    // Users

    pub fn users(&self) -> Vec<User> {
        in_insertion_order(self.users.values())
    }

    pub fn user(&self, id: UserId) -> Result<User, StoreError> {
        self.users
            .get(&id)
            .map(|slot| slot.record.clone())
            .ok_or_else(|| StoreError::not_found(EntityKind::User, id))
    }

    pub fn create_user(&mut self, input: NewUser) -> Result<User, StoreError> {
        input.validate()?;
        let email = input.email.trim().to_owned();
        let taken = self
            .users
            .values()
            .any(|slot| slot.record.email.eq_ignore_ascii_case(&email));
        if taken {
            return Err(StoreError::DuplicateEmail(email));
        }

        let user = User {
            id: UserId::random(),
            name: input.name,
            email,
            avatar: input.avatar,
            initials: input.initials,
            color: input.color.unwrap_or_else(|| DEFAULT_COLOR.to_owned()),
        };
        let seq = self.bump_seq();
        self.users.insert(
            user.id,
            Slot {
                seq,
                record: user.clone(),
            },
        );
        Ok(user)
    }

    fn ensure_user(&self, field: &'static str, id: UserId) -> Result<(), StoreError> {
        if self.users.contains_key(&id) {
            Ok(())
        } else {
            Err(StoreError::DanglingReference {
                field,
                entity: EntityKind::User,
                id: id.to_string(),
            })
        }
    }
}

fn in_insertion_order<'a, T: Clone + 'a>(slots: impl Iterator<Item = &'a Slot<T>>) -> Vec<T> {
    let mut slots: Vec<&Slot<T>> = slots.collect();
    slots.sort_by_key(|slot| slot.seq);
    slots.into_iter().map(|slot| slot.record.clone()).collect()
}

use tokio::sync::{mpsc, oneshot};
use vibe_domain::{
    Board, BoardId, Group, GroupId, GroupUpdate, NewBoard, NewGroup, NewRequest, NewUser,
    NewWorkspace, Request, RequestId, RequestUpdate, Store, StoreError, User, UserId, Workspace,
    WorkspaceId,
};

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("engine unavailable")]
    Unavailable,
    #[error("engine stopped")]
    Stopped,
    #[error(transparent)]
    Store(#[from] StoreError),
}

type Reply<T> = oneshot::Sender<T>;
type Fallible<T> = Reply<Result<T, StoreError>>;

/// Cloneable front door to the engine task. Every call is queued and runs to
/// completion before the next one starts.
#[derive(Clone)]
pub struct EngineHandle {
    tx: mpsc::Sender<EngineCommand>,
}

impl EngineHandle {
    async fn call<T>(
        &self,
        command: impl FnOnce(Reply<T>) -> EngineCommand,
    ) -> Result<T, EngineError> {
        let (tx, rx) = oneshot::channel();
        self.tx
            .send(command(tx))
            .await
            .map_err(|_| EngineError::Unavailable)?;
        rx.await.map_err(|_| EngineError::Stopped)
    }

    async fn try_call<T>(
        &self,
        command: impl FnOnce(Fallible<T>) -> EngineCommand,
    ) -> Result<T, EngineError> {
        Ok(self.call(command).await??)
    }

    pub async fn workspaces(&self) -> Result<Vec<Workspace>, EngineError> {
        self.call(|reply| EngineCommand::ListWorkspaces { reply })
            .await
    }

    pub async fn workspace(&self, id: WorkspaceId) -> Result<Workspace, EngineError> {
        self.try_call(|reply| EngineCommand::GetWorkspace { id, reply })
            .await
    }

    pub async fn create_workspace(&self, input: NewWorkspace) -> Result<Workspace, EngineError> {
        self.try_call(|reply| EngineCommand::CreateWorkspace { input, reply })
            .await
    }

    pub async fn boards_in_workspace(
        &self,
        workspace_id: WorkspaceId,
    ) -> Result<Vec<Board>, EngineError> {
        self.call(|reply| EngineCommand::ListBoards {
            workspace_id,
            reply,
        })
        .await
    }

    pub async fn board(&self, id: BoardId) -> Result<Board, EngineError> {
        self.try_call(|reply| EngineCommand::GetBoard { id, reply })
            .await
    }

    pub async fn create_board(
        &self,
        workspace_id: WorkspaceId,
        input: NewBoard,
    ) -> Result<Board, EngineError> {
        self.try_call(|reply| EngineCommand::CreateBoard {
            workspace_id,
            input,
            reply,
        })
        .await
    }

    pub async fn groups_in_board(&self, board_id: BoardId) -> Result<Vec<Group>, EngineError> {
        self.call(|reply| EngineCommand::ListGroups { board_id, reply })
            .await
    }

    pub async fn group(&self, id: GroupId) -> Result<Group, EngineError> {
        self.try_call(|reply| EngineCommand::GetGroup { id, reply })
            .await
    }

    pub async fn create_group(
        &self,
        board_id: BoardId,
        input: NewGroup,
    ) -> Result<Group, EngineError> {
        self.try_call(|reply| EngineCommand::CreateGroup {
            board_id,
            input,
            reply,
        })
        .await
    }

    pub async fn update_group(
        &self,
        id: GroupId,
        update: GroupUpdate,
    ) -> Result<Group, EngineError> {
        self.try_call(|reply| EngineCommand::UpdateGroup { id, update, reply })
            .await
    }

    pub async fn requests_in_group(
        &self,
        group_id: GroupId,
    ) -> Result<Vec<Request>, EngineError> {
        self.call(|reply| EngineCommand::ListGroupRequests { group_id, reply })
            .await
    }

    pub async fn requests_in_board(
        &self,
        board_id: BoardId,
    ) -> Result<Vec<Request>, EngineError> {
        self.call(|reply| EngineCommand::ListBoardRequests { board_id, reply })
            .await
    }

    pub async fn request(&self, id: RequestId) -> Result<Request, EngineError> {
        self.try_call(|reply| EngineCommand::GetRequest { id, reply })
            .await
    }

    pub async fn create_request(
        &self,
        group_id: GroupId,
        input: NewRequest,
    ) -> Result<Request, EngineError> {
        self.try_call(|reply| EngineCommand::CreateRequest {
            group_id,
            input,
            reply,
        })
        .await
    }

    pub async fn update_request(
        &self,
        id: RequestId,
        update: RequestUpdate,
    ) -> Result<Request, EngineError> {
        self.try_call(|reply| EngineCommand::UpdateRequest { id, update, reply })
            .await
    }

    pub async fn delete_request(&self, id: RequestId) -> Result<bool, EngineError> {
        self.call(|reply| EngineCommand::DeleteRequest { id, reply })
            .await
    }

    pub async fn users(&self) -> Result<Vec<User>, EngineError> {
        self.call(|reply| EngineCommand::ListUsers { reply }).await
    }

    pub async fn user(&self, id: UserId) -> Result<User, EngineError> {
        self.try_call(|reply| EngineCommand::GetUser { id, reply })
            .await
    }

    pub async fn create_user(&self, input: NewUser) -> Result<User, EngineError> {
        self.try_call(|reply| EngineCommand::CreateUser { input, reply })
            .await
    }
}

pub enum EngineCommand {
    ListWorkspaces {
        reply: Reply<Vec<Workspace>>,
    },
    GetWorkspace {
        id: WorkspaceId,
        reply: Fallible<Workspace>,
    },
    CreateWorkspace {
        input: NewWorkspace,
        reply: Fallible<Workspace>,
    },
    ListBoards {
        workspace_id: WorkspaceId,
        reply: Reply<Vec<Board>>,
    },
    GetBoard {
        id: BoardId,
        reply: Fallible<Board>,
    },
    CreateBoard {
        workspace_id: WorkspaceId,
        input: NewBoard,
        reply: Fallible<Board>,
    },
    ListGroups {
        board_id: BoardId,
        reply: Reply<Vec<Group>>,
    },
    GetGroup {
        id: GroupId,
        reply: Fallible<Group>,
    },
    CreateGroup {
        board_id: BoardId,
        input: NewGroup,
        reply: Fallible<Group>,
    },
    UpdateGroup {
        id: GroupId,
        update: GroupUpdate,
        reply: Fallible<Group>,
    },
    ListGroupRequests {
        group_id: GroupId,
        reply: Reply<Vec<Request>>,
    },
    ListBoardRequests {
        board_id: BoardId,
        reply: Reply<Vec<Request>>,
    },
    GetRequest {
        id: RequestId,
        reply: Fallible<Request>,
    },
    CreateRequest {
        group_id: GroupId,
        input: NewRequest,
        reply: Fallible<Request>,
    },
    UpdateRequest {
        id: RequestId,
        update: RequestUpdate,
        reply: Fallible<Request>,
    },
    DeleteRequest {
        id: RequestId,
        reply: Reply<bool>,
    },
    ListUsers {
        reply: Reply<Vec<User>>,
    },
    GetUser {
        id: UserId,
        reply: Fallible<User>,
    },
    CreateUser {
        input: NewUser,
        reply: Fallible<User>,
    },
}

/// Sole owner of the [`Store`]. Commands are handled one at a time, so a
/// create reads sibling ranks and inserts without anything interleaving.
pub struct Engine {
    store: Store,
}

impl Engine {
    pub fn start(store: Store) -> EngineHandle {
        let (tx, mut rx) = mpsc::channel::<EngineCommand>(256);
        let mut engine = Self { store };

        tokio::spawn(async move {
            while let Some(cmd) = rx.recv().await {
                engine.handle(cmd);
            }
            tracing::debug!("engine stopped");
        });

        EngineHandle { tx }
    }

    fn handle(&mut self, cmd: EngineCommand) {
        match cmd {
            EngineCommand::ListWorkspaces { reply } => {
                let _ = reply.send(self.store.workspaces());
            }
            EngineCommand::GetWorkspace { id, reply } => {
                let _ = reply.send(self.store.workspace(id));
            }
            EngineCommand::CreateWorkspace { input, reply } => {
                let result = self.store.create_workspace(input);
                if let Ok(workspace) = &result {
                    tracing::info!(workspace_id = %workspace.id, "workspace created");
                }
                let _ = reply.send(result);
            }
            EngineCommand::ListBoards {
                workspace_id,
                reply,
            } => {
                let _ = reply.send(self.store.boards_in_workspace(workspace_id));
            }
            EngineCommand::GetBoard { id, reply } => {
                let _ = reply.send(self.store.board(id));
            }
            EngineCommand::CreateBoard {
                workspace_id,
                input,
                reply,
            } => {
                let result = self.store.create_board(workspace_id, input);
                if let Ok(board) = &result {
                    tracing::info!(%workspace_id, board_id = %board.id, "board created");
                }
                let _ = reply.send(result);
            }
            EngineCommand::ListGroups { board_id, reply } => {
                let _ = reply.send(self.store.groups_in_board(board_id));
            }
            EngineCommand::GetGroup { id, reply } => {
                let _ = reply.send(self.store.group(id));
            }
            EngineCommand::CreateGroup {
                board_id,
                input,
                reply,
            } => {
                let result = self.store.create_group(board_id, input);
                if let Ok(group) = &result {
                    tracing::info!(
                        %board_id,
                        group_id = %group.id,
                        position = %group.position,
                        "group created"
                    );
                }
                let _ = reply.send(result);
            }
            EngineCommand::UpdateGroup { id, update, reply } => {
                let result = self.store.update_group(id, update);
                let _ = reply.send(result);
            }
            EngineCommand::ListGroupRequests { group_id, reply } => {
                let _ = reply.send(self.store.requests_in_group(group_id));
            }
            EngineCommand::ListBoardRequests { board_id, reply } => {
                let _ = reply.send(self.store.requests_in_board(board_id));
            }
            EngineCommand::GetRequest { id, reply } => {
                let _ = reply.send(self.store.request(id));
            }
            EngineCommand::CreateRequest {
                group_id,
                input,
                reply,
            } => {
                let result = self.store.create_request(group_id, input);
                if let Ok(request) = &result {
                    tracing::info!(
                        %group_id,
                        request_id = %request.id,
                        position = %request.position,
                        "request created"
                    );
                }
                let _ = reply.send(result);
            }
            EngineCommand::UpdateRequest { id, update, reply } => {
                let result = self.store.update_request(id, update);
                let _ = reply.send(result);
            }
            EngineCommand::DeleteRequest { id, reply } => {
                let removed = self.store.delete_request(id);
                if removed {
                    tracing::info!(request_id = %id, "request deleted");
                }
                let _ = reply.send(removed);
            }
            EngineCommand::ListUsers { reply } => {
                let _ = reply.send(self.store.users());
            }
            EngineCommand::GetUser { id, reply } => {
                let _ = reply.send(self.store.user(id));
            }
            EngineCommand::CreateUser { input, reply } => {
                let result = self.store.create_user(input);
                let _ = reply.send(result);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn engine_with_board() -> (EngineHandle, BoardId) {
        let engine = Engine::start(Store::new());
        let workspace = engine
            .create_workspace(NewWorkspace {
                name: "Studio".to_owned(),
                ..NewWorkspace::default()
            })
            .await
            .expect("create workspace");
        let board = engine
            .create_board(
                workspace.id,
                NewBoard {
                    name: "Launch".to_owned(),
                    description: None,
                },
            )
            .await
            .expect("create board");
        (engine, board.id)
    }

    #[tokio::test]
    async fn concurrent_creates_get_distinct_positions() {
        let (engine, board) = engine_with_board().await;
        let group = engine
            .create_group(board, NewGroup::named("Incoming"))
            .await
            .expect("create group");

        let mut tasks = Vec::new();
        for i in 0..32 {
            let engine = engine.clone();
            tasks.push(tokio::spawn(async move {
                engine
                    .create_request(group.id, NewRequest::named(format!("Creative {i}")))
                    .await
                    .expect("create request")
                    .position
                    .rank()
            }));
        }

        let mut ranks = Vec::new();
        for task in tasks {
            ranks.push(task.await.expect("join"));
        }
        ranks.sort_unstable();
        assert_eq!(ranks, (1..=32).collect::<Vec<u64>>());
    }

    #[tokio::test]
    async fn failed_writes_leave_no_trace() {
        let (engine, board) = engine_with_board().await;

        let err = engine
            .create_group(board, NewGroup::named(" "))
            .await
            .expect_err("blank name");
        assert!(matches!(err, EngineError::Store(StoreError::Invalid(_))));
        assert!(engine.groups_in_board(board).await.expect("list").is_empty());

        let backlog = engine
            .create_group(board, NewGroup::named("Backlog"))
            .await
            .expect("create group");
        assert_eq!(backlog.position.to_string(), "1");

        assert!(
            !engine
                .delete_request(RequestId::random())
                .await
                .expect("delete")
        );
    }

    #[tokio::test]
    async fn store_errors_pass_through() {
        let engine = Engine::start(Store::new());
        let err = engine
            .board(BoardId::random())
            .await
            .expect_err("missing board");
        assert!(matches!(
            err,
            EngineError::Store(StoreError::NotFound { .. })
        ));
    }
}

use crate::{ClientError, QueryCache, QueryKey, QueryState};
use reqwest::Method;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::broadcast;
use tokio::task::JoinSet;
use vibe_api::{
    BoardId, BoardSnapshot, CreateBoard, CreateGroup, CreateRequest, CreateUser, CreateWorkspace,
    GroupId, GroupPatch, GroupSnapshot, RequestId, RequestPatch, RequestSnapshot, UserSnapshot,
    WorkspaceId, WorkspaceSnapshot,
};

const EVENT_CAPACITY: usize = 64;

/// Notifications for whoever renders the board.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ClientEvent {
    Toast { message: String, destructive: bool },
}

/// Toast titles for one mutation.
struct Notice {
    success: &'static str,
    failure: &'static str,
}

/// Cloneable handle to the board API with a shared query cache.
#[derive(Clone)]
pub struct BoardClient {
    inner: Arc<Inner>,
}

struct Inner {
    http: reqwest::Client,
    base_url: String,
    cache: QueryCache,
    events: broadcast::Sender<ClientEvent>,
}

impl BoardClient {
    /// `base_url` is the server origin, e.g. `http://127.0.0.1:5000`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_http(reqwest::Client::new(), base_url)
    }

    pub fn with_http(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            inner: Arc::new(Inner {
                http,
                base_url: base_url.into().trim_end_matches('/').to_owned(),
                cache: QueryCache::new(),
                events,
            }),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ClientEvent> {
        self.inner.events.subscribe()
    }

    pub fn cache(&self) -> &QueryCache {
        &self.inner.cache
    }

    pub fn state(&self, key: &QueryKey) -> Option<QueryState> {
        self.inner.cache.state(key)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.inner.base_url)
    }

    async fn send(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<reqwest::Response, ClientError> {
        let res = request.send().await?;
        let status = res.status();
        if status.is_success() {
            return Ok(res);
        }
        let body = res.text().await?;
        Err(ClientError::status(status.as_u16(), &body))
    }

    async fn decode<T: DeserializeOwned>(res: reqwest::Response) -> Result<T, ClientError> {
        let bytes = res.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    // Queries

    /// Returns cached data when fresh, otherwise fetches it.
    pub async fn query<T: DeserializeOwned>(&self, key: &QueryKey) -> Result<T, ClientError> {
        if let Some(value) = self.inner.cache.fresh(key) {
            return Ok(serde_json::from_value(value)?);
        }
        self.fetch(key).await
    }

    /// Fetches `key` from the server and records the outcome in the cache.
    pub async fn fetch<T: DeserializeOwned>(&self, key: &QueryKey) -> Result<T, ClientError> {
        let value = self.fetch_value(key).await?;
        Ok(serde_json::from_value(value)?)
    }

    async fn fetch_value(&self, key: &QueryKey) -> Result<Value, ClientError> {
        self.inner.cache.begin(key);
        let outcome = match self.send(self.inner.http.get(self.url(&key.path()))).await {
            Ok(res) => Self::decode::<Value>(res).await,
            Err(err) => Err(err),
        };
        match &outcome {
            Ok(value) => self.inner.cache.resolve(key, Ok(value.clone())),
            Err(err) => {
                tracing::warn!(key = %key, error = %err, "query failed");
                self.inner.cache.resolve(key, Err(err.to_string()));
            }
        }
        outcome
    }

    /// Marks everything under `prefixes` stale and refetches it concurrently.
    pub async fn invalidate(&self, prefixes: &[QueryKey]) {
        let mut keys: Vec<QueryKey> = Vec::new();
        for prefix in prefixes {
            for key in self.inner.cache.invalidate(prefix) {
                if !keys.contains(&key) {
                    keys.push(key);
                }
            }
        }

        let mut refetches = JoinSet::new();
        for key in keys {
            let client = self.clone();
            refetches.spawn(async move {
                // Failures are already recorded on the entry.
                let _ = client.fetch_value(&key).await;
            });
        }
        while let Some(joined) = refetches.join_next().await {
            if let Err(err) = joined {
                tracing::warn!(error = %err, "refetch task failed");
            }
        }
    }

    pub async fn workspaces(&self) -> Result<Vec<WorkspaceSnapshot>, ClientError> {
        self.query(&QueryKey::workspaces()).await
    }

    pub async fn boards(
        &self,
        workspace_id: &WorkspaceId,
    ) -> Result<Vec<BoardSnapshot>, ClientError> {
        self.query(&QueryKey::boards_in_workspace(&workspace_id.0)).await
    }

    pub async fn board(&self, board_id: &BoardId) -> Result<BoardSnapshot, ClientError> {
        self.query(&QueryKey::board(&board_id.0)).await
    }

    pub async fn groups(&self, board_id: &BoardId) -> Result<Vec<GroupSnapshot>, ClientError> {
        self.query(&QueryKey::groups_in_board(&board_id.0)).await
    }

    pub async fn board_requests(
        &self,
        board_id: &BoardId,
    ) -> Result<Vec<RequestSnapshot>, ClientError> {
        self.query(&QueryKey::requests_in_board(&board_id.0)).await
    }

    pub async fn group_requests(
        &self,
        group_id: &GroupId,
    ) -> Result<Vec<RequestSnapshot>, ClientError> {
        self.query(&QueryKey::requests_in_group(&group_id.0)).await
    }

    pub async fn users(&self) -> Result<Vec<UserSnapshot>, ClientError> {
        self.query(&QueryKey::users()).await
    }

    // Mutations

    fn toast(&self, message: &str, destructive: bool) {
        // No subscribers is fine.
        let _ = self.inner.events.send(ClientEvent::Toast {
            message: message.to_owned(),
            destructive,
        });
    }

    async fn write<B, T>(&self, method: Method, path: &str, body: &B) -> Result<T, ClientError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let res = self
            .send(self.inner.http.request(method, self.url(path)).json(body))
            .await?;
        Self::decode(res).await
    }

    /// Invalidates and toasts on success, toasts destructively on failure.
    async fn settle<T>(
        &self,
        notice: Notice,
        result: Result<T, ClientError>,
        affected: impl FnOnce(&T) -> Vec<QueryKey>,
    ) -> Result<T, ClientError> {
        match result {
            Ok(value) => {
                self.invalidate(&affected(&value)).await;
                self.toast(notice.success, false);
                Ok(value)
            }
            Err(err) => {
                tracing::warn!(error = %err, "{}", notice.failure);
                self.toast(notice.failure, true);
                Err(err)
            }
        }
    }

    pub async fn create_workspace(
        &self,
        body: &CreateWorkspace,
    ) -> Result<WorkspaceSnapshot, ClientError> {
        let result = self.write(Method::POST, "/api/workspaces", body).await;
        self.settle(
            Notice {
                success: "Workspace created",
                failure: "Failed to create workspace",
            },
            result,
            |_| vec![QueryKey::workspaces()],
        )
        .await
    }

    pub async fn create_board(
        &self,
        workspace_id: &WorkspaceId,
        body: &CreateBoard,
    ) -> Result<BoardSnapshot, ClientError> {
        let path = QueryKey::boards_in_workspace(&workspace_id.0).path();
        let result = self.write(Method::POST, &path, body).await;
        self.settle(
            Notice {
                success: "Board created",
                failure: "Failed to create board",
            },
            result,
            |_| vec![QueryKey::workspaces()],
        )
        .await
    }

    pub async fn create_group(
        &self,
        board_id: &BoardId,
        body: &CreateGroup,
    ) -> Result<GroupSnapshot, ClientError> {
        let path = QueryKey::groups_in_board(&board_id.0).path();
        let result = self.write(Method::POST, &path, body).await;
        self.settle(
            Notice {
                success: "Group created",
                failure: "Failed to create group",
            },
            result,
            |_| vec![QueryKey::boards()],
        )
        .await
    }

    pub async fn update_group(
        &self,
        group_id: &GroupId,
        patch: &GroupPatch,
    ) -> Result<GroupSnapshot, ClientError> {
        let path = QueryKey::group(&group_id.0).path();
        let result = self.write(Method::PATCH, &path, patch).await;
        self.settle(
            Notice {
                success: "Group updated",
                failure: "Failed to update group",
            },
            result,
            |group: &GroupSnapshot| vec![QueryKey::boards(), QueryKey::group(&group.id.0)],
        )
        .await
    }

    pub async fn create_request(
        &self,
        group_id: &GroupId,
        body: &CreateRequest,
    ) -> Result<RequestSnapshot, ClientError> {
        let path = QueryKey::requests_in_group(&group_id.0).path();
        let result = self.write(Method::POST, &path, body).await;
        self.settle(
            Notice {
                success: "Request created successfully!",
                failure: "Failed to create request",
            },
            result,
            |request: &RequestSnapshot| vec![QueryKey::boards(), QueryKey::group(&request.group_id.0)],
        )
        .await
    }

    pub async fn update_request(
        &self,
        request_id: &RequestId,
        patch: &RequestPatch,
    ) -> Result<RequestSnapshot, ClientError> {
        let path = format!("/api/requests/{}", request_id.0);
        let result = self.write(Method::PATCH, &path, patch).await;
        // A move also changes the source group, which the response does not name.
        let moved = patch.group_id.is_some();
        self.settle(
            Notice {
                success: "Request updated successfully",
                failure: "Failed to update request",
            },
            result,
            |request: &RequestSnapshot| {
                let group = if moved {
                    QueryKey::groups()
                } else {
                    QueryKey::group(&request.group_id.0)
                };
                vec![QueryKey::boards(), group]
            },
        )
        .await
    }

    pub async fn delete_request(&self, request_id: &RequestId) -> Result<(), ClientError> {
        let path = format!("/api/requests/{}", request_id.0);
        let result = self
            .send(self.inner.http.delete(self.url(&path)))
            .await
            .map(drop);
        self.settle(
            Notice {
                success: "Request deleted",
                failure: "Failed to delete request",
            },
            result,
            |_| vec![QueryKey::boards(), QueryKey::groups()],
        )
        .await
    }

    pub async fn create_user(&self, body: &CreateUser) -> Result<UserSnapshot, ClientError> {
        let result = self.write(Method::POST, "/api/users", body).await;
        self.settle(
            Notice {
                success: "User created",
                failure: "Failed to create user",
            },
            result,
            |_| vec![QueryKey::users()],
        )
        .await
    }
}

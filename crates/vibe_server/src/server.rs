use crate::ServerConfig;
use crate::engine::{Engine, EngineHandle};
use crate::error::{ApiError, Endpoint};
use crate::mapping;
use anyhow::Context as _;
use axum::{
    Json, Router,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;
use vibe_api::{
    BoardSnapshot, CreateBoard, CreateGroup, CreateRequest, CreateUser, CreateWorkspace,
    GroupPatch, GroupSnapshot, RequestPatch, RequestSnapshot, UserSnapshot, WorkspaceSnapshot,
};
use vibe_domain::{BoardId, EntityKind, GroupId, RequestId, Store, UserId, WorkspaceId};

pub async fn router(config: ServerConfig) -> anyhow::Result<Router> {
    let store = if config.seed_demo {
        Store::seeded().context("failed to seed demo data")?
    } else {
        Store::new()
    };
    let engine = Engine::start(store);

    let state = AppStateHolder { engine };

    let api = Router::new()
        .route("/health", get(health))
        .route("/workspaces", get(list_workspaces).post(create_workspace))
        .route("/workspaces/{workspace_id}", get(get_workspace))
        .route(
            "/workspaces/{workspace_id}/boards",
            get(list_boards).post(create_board),
        )
        .route("/boards/{board_id}", get(get_board))
        .route(
            "/boards/{board_id}/groups",
            get(list_groups).post(create_group),
        )
        .route("/boards/{board_id}/requests", get(list_board_requests))
        .route("/groups/{group_id}", get(get_group).patch(update_group))
        .route(
            "/groups/{group_id}/requests",
            get(list_group_requests).post(create_request),
        )
        .route(
            "/requests/{request_id}",
            get(get_request)
                .patch(update_request)
                .delete(delete_request),
        )
        .route("/users", get(list_users).post(create_user))
        .route("/users/{user_id}", get(get_user))
        .with_state(state);

    let web_index = config.web_dist_dir.join("index.html");
    let web = ServeDir::new(&config.web_dist_dir).not_found_service(ServeFile::new(web_index));

    Ok(Router::new()
        .nest("/api", api)
        .fallback_service(web)
        .layer(TraceLayer::new_for_http()))
}

async fn health() -> &'static str {
    "ok"
}

#[derive(Clone)]
struct AppStateHolder {
    engine: EngineHandle,
}

type ApiResult<T> = Result<T, ApiError>;

// Workspaces

async fn list_workspaces(
    State(state): State<AppStateHolder>,
) -> ApiResult<Json<Vec<WorkspaceSnapshot>>> {
    const ENDPOINT: Endpoint = Endpoint::read("Failed to fetch workspaces");
    let workspaces = state
        .engine
        .workspaces()
        .await
        .map_err(|err| ENDPOINT.reject(err))?;
    Ok(Json(
        workspaces
            .into_iter()
            .map(mapping::workspace_snapshot)
            .collect(),
    ))
}

async fn get_workspace(
    State(state): State<AppStateHolder>,
    Path(workspace_id): Path<String>,
) -> ApiResult<Json<WorkspaceSnapshot>> {
    const ENDPOINT: Endpoint = Endpoint::read("Failed to fetch workspace");
    let id = WorkspaceId::parse(&workspace_id).ok_or(ApiError::NotFound(EntityKind::Workspace))?;
    let workspace = state
        .engine
        .workspace(id)
        .await
        .map_err(|err| ENDPOINT.reject(err))?;
    Ok(Json(mapping::workspace_snapshot(workspace)))
}

async fn create_workspace(
    State(state): State<AppStateHolder>,
    payload: Result<Json<CreateWorkspace>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    const ENDPOINT: Endpoint =
        Endpoint::write("Failed to create workspace", "Invalid workspace data");
    let Json(body) = payload.map_err(|rejection| ENDPOINT.malformed(rejection))?;
    let workspace = state
        .engine
        .create_workspace(mapping::new_workspace(body))
        .await
        .map_err(|err| ENDPOINT.reject(err))?;
    Ok((
        StatusCode::CREATED,
        Json(mapping::workspace_snapshot(workspace)),
    ))
}

// Boards

async fn list_boards(
    State(state): State<AppStateHolder>,
    Path(workspace_id): Path<String>,
) -> ApiResult<Json<Vec<BoardSnapshot>>> {
    const ENDPOINT: Endpoint = Endpoint::read("Failed to fetch boards");
    let Some(id) = WorkspaceId::parse(&workspace_id) else {
        return Ok(Json(Vec::new()));
    };
    let boards = state
        .engine
        .boards_in_workspace(id)
        .await
        .map_err(|err| ENDPOINT.reject(err))?;
    Ok(Json(boards.into_iter().map(mapping::board_snapshot).collect()))
}

async fn get_board(
    State(state): State<AppStateHolder>,
    Path(board_id): Path<String>,
) -> ApiResult<Json<BoardSnapshot>> {
    const ENDPOINT: Endpoint = Endpoint::read("Failed to fetch board");
    let id = BoardId::parse(&board_id).ok_or(ApiError::NotFound(EntityKind::Board))?;
    let board = state
        .engine
        .board(id)
        .await
        .map_err(|err| ENDPOINT.reject(err))?;
    Ok(Json(mapping::board_snapshot(board)))
}

async fn create_board(
    State(state): State<AppStateHolder>,
    Path(workspace_id): Path<String>,
    payload: Result<Json<CreateBoard>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    const ENDPOINT: Endpoint = Endpoint::write("Failed to create board", "Invalid board data");
    let Json(body) = payload.map_err(|rejection| ENDPOINT.malformed(rejection))?;
    let id = WorkspaceId::parse(&workspace_id).ok_or(ApiError::NotFound(EntityKind::Workspace))?;
    let board = state
        .engine
        .create_board(id, mapping::new_board(body))
        .await
        .map_err(|err| ENDPOINT.reject(err))?;
    Ok((StatusCode::CREATED, Json(mapping::board_snapshot(board))))
}

// Groups

async fn list_groups(
    State(state): State<AppStateHolder>,
    Path(board_id): Path<String>,
) -> ApiResult<Json<Vec<GroupSnapshot>>> {
    const ENDPOINT: Endpoint = Endpoint::read("Failed to fetch groups");
    let Some(id) = BoardId::parse(&board_id) else {
        return Ok(Json(Vec::new()));
    };
    let groups = state
        .engine
        .groups_in_board(id)
        .await
        .map_err(|err| ENDPOINT.reject(err))?;
    Ok(Json(groups.into_iter().map(mapping::group_snapshot).collect()))
}

async fn get_group(
    State(state): State<AppStateHolder>,
    Path(group_id): Path<String>,
) -> ApiResult<Json<GroupSnapshot>> {
    const ENDPOINT: Endpoint = Endpoint::read("Failed to fetch group");
    let id = GroupId::parse(&group_id).ok_or(ApiError::NotFound(EntityKind::Group))?;
    let group = state
        .engine
        .group(id)
        .await
        .map_err(|err| ENDPOINT.reject(err))?;
    Ok(Json(mapping::group_snapshot(group)))
}

async fn create_group(
    State(state): State<AppStateHolder>,
    Path(board_id): Path<String>,
    payload: Result<Json<CreateGroup>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    const ENDPOINT: Endpoint = Endpoint::write("Failed to create group", "Invalid group data");
    let Json(body) = payload.map_err(|rejection| ENDPOINT.malformed(rejection))?;
    let input = mapping::new_group(body).map_err(|errors| ENDPOINT.invalid(errors))?;
    let id = BoardId::parse(&board_id).ok_or(ApiError::NotFound(EntityKind::Board))?;
    let group = state
        .engine
        .create_group(id, input)
        .await
        .map_err(|err| ENDPOINT.reject(err))?;
    Ok((StatusCode::CREATED, Json(mapping::group_snapshot(group))))
}

async fn update_group(
    State(state): State<AppStateHolder>,
    Path(group_id): Path<String>,
    payload: Result<Json<GroupPatch>, JsonRejection>,
) -> ApiResult<Json<GroupSnapshot>> {
    const ENDPOINT: Endpoint = Endpoint::write("Failed to update group", "Invalid group data");
    let Json(patch) = payload.map_err(|rejection| ENDPOINT.malformed(rejection))?;
    let update = mapping::group_update(patch).map_err(|errors| ENDPOINT.invalid(errors))?;
    let id = GroupId::parse(&group_id).ok_or(ApiError::NotFound(EntityKind::Group))?;
    let group = state
        .engine
        .update_group(id, update)
        .await
        .map_err(|err| ENDPOINT.reject(err))?;
    Ok(Json(mapping::group_snapshot(group)))
}

// Requests

async fn list_group_requests(
    State(state): State<AppStateHolder>,
    Path(group_id): Path<String>,
) -> ApiResult<Json<Vec<RequestSnapshot>>> {
    const ENDPOINT: Endpoint = Endpoint::read("Failed to fetch requests");
    let Some(id) = GroupId::parse(&group_id) else {
        return Ok(Json(Vec::new()));
    };
    let requests = state
        .engine
        .requests_in_group(id)
        .await
        .map_err(|err| ENDPOINT.reject(err))?;
    Ok(Json(
        requests.into_iter().map(mapping::request_snapshot).collect(),
    ))
}

async fn list_board_requests(
    State(state): State<AppStateHolder>,
    Path(board_id): Path<String>,
) -> ApiResult<Json<Vec<RequestSnapshot>>> {
    const ENDPOINT: Endpoint = Endpoint::read("Failed to fetch requests");
    let Some(id) = BoardId::parse(&board_id) else {
        return Ok(Json(Vec::new()));
    };
    let requests = state
        .engine
        .requests_in_board(id)
        .await
        .map_err(|err| ENDPOINT.reject(err))?;
    Ok(Json(
        requests.into_iter().map(mapping::request_snapshot).collect(),
    ))
}

async fn get_request(
    State(state): State<AppStateHolder>,
    Path(request_id): Path<String>,
) -> ApiResult<Json<RequestSnapshot>> {
    const ENDPOINT: Endpoint = Endpoint::read("Failed to fetch request");
    let id = RequestId::parse(&request_id).ok_or(ApiError::NotFound(EntityKind::Request))?;
    let request = state
        .engine
        .request(id)
        .await
        .map_err(|err| ENDPOINT.reject(err))?;
    Ok(Json(mapping::request_snapshot(request)))
}

async fn create_request(
    State(state): State<AppStateHolder>,
    Path(group_id): Path<String>,
    payload: Result<Json<CreateRequest>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    const ENDPOINT: Endpoint =
        Endpoint::write("Failed to create request", "Invalid request data");
    let Json(body) = payload.map_err(|rejection| ENDPOINT.malformed(rejection))?;
    let input = mapping::new_request(body).map_err(|errors| ENDPOINT.invalid(errors))?;
    let id = GroupId::parse(&group_id).ok_or(ApiError::NotFound(EntityKind::Group))?;
    let request = state
        .engine
        .create_request(id, input)
        .await
        .map_err(|err| ENDPOINT.reject(err))?;
    Ok((StatusCode::CREATED, Json(mapping::request_snapshot(request))))
}

async fn update_request(
    State(state): State<AppStateHolder>,
    Path(request_id): Path<String>,
    payload: Result<Json<RequestPatch>, JsonRejection>,
) -> ApiResult<Json<RequestSnapshot>> {
    const ENDPOINT: Endpoint =
        Endpoint::write("Failed to update request", "Invalid request data");
    let Json(patch) = payload.map_err(|rejection| ENDPOINT.malformed(rejection))?;
    let update = mapping::request_update(patch).map_err(|errors| ENDPOINT.invalid(errors))?;
    let id = RequestId::parse(&request_id).ok_or(ApiError::NotFound(EntityKind::Request))?;
    let request = state
        .engine
        .update_request(id, update)
        .await
        .map_err(|err| ENDPOINT.reject(err))?;
    Ok(Json(mapping::request_snapshot(request)))
}

async fn delete_request(
    State(state): State<AppStateHolder>,
    Path(request_id): Path<String>,
) -> ApiResult<StatusCode> {
    const ENDPOINT: Endpoint = Endpoint::read("Failed to delete request");
    let id = RequestId::parse(&request_id).ok_or(ApiError::NotFound(EntityKind::Request))?;
    let removed = state
        .engine
        .delete_request(id)
        .await
        .map_err(|err| ENDPOINT.reject(err))?;
    if !removed {
        return Err(ApiError::NotFound(EntityKind::Request));
    }
    Ok(StatusCode::NO_CONTENT)
}

// Users

async fn list_users(State(state): State<AppStateHolder>) -> ApiResult<Json<Vec<UserSnapshot>>> {
    const ENDPOINT: Endpoint = Endpoint::read("Failed to fetch users");
    let users = state
        .engine
        .users()
        .await
        .map_err(|err| ENDPOINT.reject(err))?;
    Ok(Json(users.into_iter().map(mapping::user_snapshot).collect()))
}

async fn get_user(
    State(state): State<AppStateHolder>,
    Path(user_id): Path<String>,
) -> ApiResult<Json<UserSnapshot>> {
    const ENDPOINT: Endpoint = Endpoint::read("Failed to fetch user");
    let id = UserId::parse(&user_id).ok_or(ApiError::NotFound(EntityKind::User))?;
    let user = state
        .engine
        .user(id)
        .await
        .map_err(|err| ENDPOINT.reject(err))?;
    Ok(Json(mapping::user_snapshot(user)))
}

async fn create_user(
    State(state): State<AppStateHolder>,
    payload: Result<Json<CreateUser>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    const ENDPOINT: Endpoint = Endpoint::write("Failed to create user", "Invalid user data");
    let Json(body) = payload.map_err(|rejection| ENDPOINT.malformed(rejection))?;
    let user = state
        .engine
        .create_user(mapping::new_user(body))
        .await
        .map_err(|err| ENDPOINT.reject(err))?;
    Ok((StatusCode::CREATED, Json(mapping::user_snapshot(user))))
}

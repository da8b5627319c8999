use serde_json::json;
use std::net::SocketAddr;
use std::time::Duration;
use vibe_api::{
    BoardSnapshot, ErrorBody, GroupSnapshot, RequestSnapshot, UserSnapshot, WorkspaceSnapshot,
};
use vibe_server::{ServerConfig, StartedServer};

struct Harness {
    server: StartedServer,
    client: reqwest::Client,
}

impl Harness {
    async fn start(config: ServerConfig) -> Self {
        let addr: SocketAddr = "127.0.0.1:0".parse().unwrap();
        let server = vibe_server::start_server(ServerConfig { addr, ..config })
            .await
            .expect("start server");
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .expect("reqwest client");
        Self { server, client }
    }

    fn url(&self, path: &str) -> String {
        format!("http://{}{path}", self.server.addr)
    }

    async fn get(&self, path: &str) -> reqwest::Response {
        self.client
            .get(self.url(path))
            .send()
            .await
            .unwrap_or_else(|err| panic!("GET {path}: {err}"))
    }

    async fn post(&self, path: &str, body: serde_json::Value) -> reqwest::Response {
        self.client
            .post(self.url(path))
            .json(&body)
            .send()
            .await
            .unwrap_or_else(|err| panic!("POST {path}: {err}"))
    }

    async fn patch(&self, path: &str, body: serde_json::Value) -> reqwest::Response {
        self.client
            .patch(self.url(path))
            .json(&body)
            .send()
            .await
            .unwrap_or_else(|err| panic!("PATCH {path}: {err}"))
    }

    async fn delete(&self, path: &str) -> reqwest::Response {
        self.client
            .delete(self.url(path))
            .send()
            .await
            .unwrap_or_else(|err| panic!("DELETE {path}: {err}"))
    }

    async fn board(&self) -> BoardSnapshot {
        let res = self.post("/api/workspaces", json!({ "name": "Studio" })).await;
        assert_eq!(res.status(), reqwest::StatusCode::CREATED);
        let workspace: WorkspaceSnapshot = res.json().await.expect("workspace json");

        let res = self
            .post(
                &format!("/api/workspaces/{}/boards", workspace.id.0),
                json!({ "name": "Launch" }),
            )
            .await;
        assert_eq!(res.status(), reqwest::StatusCode::CREATED);
        res.json().await.expect("board json")
    }

    async fn group(&self, board: &BoardSnapshot, name: &str) -> GroupSnapshot {
        let res = self
            .post(
                &format!("/api/boards/{}/groups", board.id.0),
                json!({ "name": name }),
            )
            .await;
        assert_eq!(res.status(), reqwest::StatusCode::CREATED);
        res.json().await.expect("group json")
    }

    async fn request(&self, group: &GroupSnapshot, name: &str) -> RequestSnapshot {
        let res = self
            .post(
                &format!("/api/groups/{}/requests", group.id.0),
                json!({ "name": name }),
            )
            .await;
        assert_eq!(res.status(), reqwest::StatusCode::CREATED);
        res.json().await.expect("request json")
    }
}

async fn expect_error(res: reqwest::Response, status: reqwest::StatusCode) -> ErrorBody {
    assert_eq!(res.status(), status);
    res.json().await.expect("error body json")
}

#[tokio::test]
async fn health_reports_ok() {
    let h = Harness::start(ServerConfig::empty()).await;
    let res = h.get("/api/health").await;
    assert!(res.status().is_success());
    assert_eq!(res.text().await.expect("health body"), "ok");
}

#[tokio::test]
async fn shutdown_closes_the_listener() {
    let h = Harness::start(ServerConfig::empty()).await;
    let addr = h.server.addr;
    assert!(h.get("/api/health").await.status().is_success());

    let Harness { server, client } = h;
    drop(client);
    server.shutdown().await.expect("clean shutdown");

    let err = reqwest::get(format!("http://{addr}/api/health"))
        .await
        .expect_err("listener is closed");
    assert!(err.is_connect(), "{err}");
}

#[tokio::test]
async fn seeded_board_is_served() {
    let h = Harness::start(ServerConfig::default()).await;

    let workspaces: Vec<WorkspaceSnapshot> = h.get("/api/workspaces").await.json().await.unwrap();
    assert_eq!(workspaces.len(), 1);
    assert_eq!(workspaces[0].name, "Creative MY OWN Channel");

    let boards: Vec<BoardSnapshot> = h
        .get(&format!("/api/workspaces/{}/boards", workspaces[0].id.0))
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(boards.len(), 1);

    let groups: Vec<GroupSnapshot> = h
        .get(&format!("/api/boards/{}/groups", boards[0].id.0))
        .await
        .json()
        .await
        .unwrap();
    let names: Vec<&str> = groups.iter().map(|g| g.name.as_str()).collect();
    assert_eq!(names, vec!["Incoming Requests", "In progress", "Completed"]);
    let positions: Vec<&str> = groups.iter().map(|g| g.position.as_str()).collect();
    assert_eq!(positions, vec!["1", "2", "3"]);

    let requests: Vec<RequestSnapshot> = h
        .get(&format!("/api/boards/{}/requests", boards[0].id.0))
        .await
        .json()
        .await
        .unwrap();
    let names: Vec<&str> = requests.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["Creative 1", "Creative 3", "Creative 2"]);

    let users: Vec<UserSnapshot> = h.get("/api/users").await.json().await.unwrap();
    assert_eq!(users.len(), 4);
    let owner = requests[0].owner_id.as_ref().expect("seeded owner");
    assert!(users.iter().any(|u| &u.id == owner && u.name == "John Doe"));
}

#[tokio::test]
async fn groups_are_ranked_in_creation_order() {
    let h = Harness::start(ServerConfig::empty()).await;
    let board = h.board().await;

    let backlog = h.group(&board, "Backlog").await;
    assert_eq!(backlog.position, "1");
    assert_eq!(backlog.collapsed, "false");
    assert_eq!(backlog.color, "#635BFF");

    let res = h
        .post(
            &format!("/api/boards/{}/groups", board.id.0),
            json!({ "name": "Done", "position": "1", "collapsed": "true" }),
        )
        .await;
    assert_eq!(res.status(), reqwest::StatusCode::CREATED);
    let done: GroupSnapshot = res.json().await.unwrap();
    assert_eq!(done.position, "2");
    assert_eq!(done.collapsed, "true");
    assert_eq!(done.board_id, board.id);

    let groups: Vec<GroupSnapshot> = h
        .get(&format!("/api/boards/{}/groups", board.id.0))
        .await
        .json()
        .await
        .unwrap();
    let names: Vec<&str> = groups.iter().map(|g| g.name.as_str()).collect();
    assert_eq!(names, vec!["Backlog", "Done"]);
}

#[tokio::test]
async fn group_patch_updates_and_reorders() {
    let h = Harness::start(ServerConfig::empty()).await;
    let board = h.board().await;
    let backlog = h.group(&board, "Backlog").await;
    let _done = h.group(&board, "Done").await;

    let res = h
        .patch(
            &format!("/api/groups/{}", backlog.id.0),
            json!({ "position": 5, "collapsed": true, "name": "Later" }),
        )
        .await;
    assert_eq!(res.status(), reqwest::StatusCode::OK);
    let patched: GroupSnapshot = res.json().await.unwrap();
    assert_eq!(patched.position, "5");
    assert_eq!(patched.collapsed, "true");
    assert_eq!(patched.name, "Later");

    let groups: Vec<GroupSnapshot> = h
        .get(&format!("/api/boards/{}/groups", board.id.0))
        .await
        .json()
        .await
        .unwrap();
    let names: Vec<&str> = groups.iter().map(|g| g.name.as_str()).collect();
    assert_eq!(names, vec!["Done", "Later"]);

    let fetched: GroupSnapshot = h
        .get(&format!("/api/groups/{}", backlog.id.0))
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(fetched, patched);
}

#[tokio::test]
async fn group_patch_rejects_unknown_fields() {
    let h = Harness::start(ServerConfig::empty()).await;
    let board = h.board().await;
    let group = h.group(&board, "Backlog").await;

    let res = h
        .patch(
            &format!("/api/groups/{}", group.id.0),
            json!({ "boardId": board.id.0 }),
        )
        .await;
    let body = expect_error(res, reqwest::StatusCode::BAD_REQUEST).await;
    assert_eq!(body.message, "Invalid group data");
    assert!(!body.errors.is_empty());

    let res = h
        .patch(
            &format!("/api/groups/{}", group.id.0),
            json!({ "position": "top" }),
        )
        .await;
    let body = expect_error(res, reqwest::StatusCode::BAD_REQUEST).await;
    assert_eq!(body.errors[0].path, vec!["position".to_owned()]);

    let unchanged: GroupSnapshot = h
        .get(&format!("/api/groups/{}", group.id.0))
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(unchanged, group);
}

#[tokio::test]
async fn request_positions_follow_group_size() {
    let h = Harness::start(ServerConfig::empty()).await;
    let board = h.board().await;
    let group = h.group(&board, "Backlog").await;

    for expected in 1..=3u64 {
        let created = h.request(&group, &format!("Creative {expected}")).await;
        assert_eq!(created.position, expected.to_string());
        assert_eq!(created.group_id, group.id);
        assert_eq!(created.status, vibe_api::RequestStatus::Working);
        assert_eq!(created.priority, vibe_api::RequestPriority::Medium);
    }

    let listed: Vec<RequestSnapshot> = h
        .get(&format!("/api/groups/{}/requests", group.id.0))
        .await
        .json()
        .await
        .unwrap();
    let names: Vec<&str> = listed.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["Creative 1", "Creative 2", "Creative 3"]);
}

#[tokio::test]
async fn request_patch_moves_and_clears_fields() {
    let h = Harness::start(ServerConfig::empty()).await;
    let board = h.board().await;
    let backlog = h.group(&board, "Backlog").await;
    let done = h.group(&board, "Done").await;
    let _existing = h.request(&done, "Shipped").await;

    let res = h
        .post("/api/users", json!({ "name": "Lisa Chen", "email": "lisa@example.com", "initials": "LC" }))
        .await;
    assert_eq!(res.status(), reqwest::StatusCode::CREATED);
    let lisa: UserSnapshot = res.json().await.unwrap();

    let res = h
        .post(
            &format!("/api/groups/{}/requests", backlog.id.0),
            json!({ "name": "Flyer", "type": "Print", "ownerId": lisa.id.0 }),
        )
        .await;
    assert_eq!(res.status(), reqwest::StatusCode::CREATED);
    let flyer: RequestSnapshot = res.json().await.unwrap();
    assert_eq!(flyer.kind.as_deref(), Some("Print"));
    assert_eq!(flyer.owner_id.as_ref(), Some(&lisa.id));

    let res = h
        .patch(
            &format!("/api/requests/{}", flyer.id.0),
            json!({ "groupId": done.id.0, "ownerId": null, "status": "completed" }),
        )
        .await;
    assert_eq!(res.status(), reqwest::StatusCode::OK);
    let moved: RequestSnapshot = res.json().await.unwrap();
    assert_eq!(moved.group_id, done.id);
    assert_eq!(moved.position, "2");
    assert_eq!(moved.owner_id, None);
    assert_eq!(moved.kind.as_deref(), Some("Print"));
    assert_eq!(moved.status, vibe_api::RequestStatus::Completed);

    let backlog_requests: Vec<RequestSnapshot> = h
        .get(&format!("/api/groups/{}/requests", backlog.id.0))
        .await
        .json()
        .await
        .unwrap();
    assert!(backlog_requests.is_empty());
}

#[tokio::test]
async fn request_writes_check_references() {
    let h = Harness::start(ServerConfig::empty()).await;
    let board = h.board().await;
    let group = h.group(&board, "Backlog").await;
    let created = h.request(&group, "Creative").await;

    let ghost = "00000000-0000-4000-8000-000000000000";
    let res = h
        .post(
            &format!("/api/groups/{}/requests", group.id.0),
            json!({ "name": "Orphan", "assigneeId": ghost }),
        )
        .await;
    let body = expect_error(res, reqwest::StatusCode::BAD_REQUEST).await;
    assert_eq!(body.message, "Invalid request data");

    let res = h
        .patch(
            &format!("/api/requests/{}", created.id.0),
            json!({ "groupId": ghost }),
        )
        .await;
    expect_error(res, reqwest::StatusCode::BAD_REQUEST).await;

    let res = h
        .patch(
            &format!("/api/requests/{}", created.id.0),
            json!({ "title": "Renamed" }),
        )
        .await;
    expect_error(res, reqwest::StatusCode::BAD_REQUEST).await;

    let res = h
        .post(&format!("/api/groups/{ghost}/requests"), json!({ "name": "Lost" }))
        .await;
    let body = expect_error(res, reqwest::StatusCode::NOT_FOUND).await;
    assert_eq!(body.message, "Group not found");
}

#[tokio::test]
async fn deleted_requests_disappear() {
    let h = Harness::start(ServerConfig::empty()).await;
    let board = h.board().await;
    let group = h.group(&board, "Backlog").await;
    let keep = h.request(&group, "Keep").await;
    let dropped = h.request(&group, "Drop").await;

    let res = h.delete(&format!("/api/requests/{}", dropped.id.0)).await;
    assert_eq!(res.status(), reqwest::StatusCode::NO_CONTENT);

    let res = h.delete(&format!("/api/requests/{}", dropped.id.0)).await;
    let body = expect_error(res, reqwest::StatusCode::NOT_FOUND).await;
    assert_eq!(body.message, "Request not found");

    let res = h.get(&format!("/api/requests/{}", dropped.id.0)).await;
    expect_error(res, reqwest::StatusCode::NOT_FOUND).await;

    let listed: Vec<RequestSnapshot> = h
        .get(&format!("/api/boards/{}/requests", board.id.0))
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(listed, vec![keep]);

    let next = h.request(&group, "Next").await;
    assert_eq!(next.position, "3");
}

#[tokio::test]
async fn unknown_ids_are_not_found() {
    let h = Harness::start(ServerConfig::empty()).await;

    for path in [
        "/api/boards/nope",
        "/api/groups/00000000-0000-4000-8000-000000000000",
        "/api/requests/nope",
        "/api/workspaces/nope",
        "/api/users/nope",
    ] {
        let res = h.get(path).await;
        assert_eq!(res.status(), reqwest::StatusCode::NOT_FOUND, "{path}");
    }

    let groups: Vec<GroupSnapshot> = h.get("/api/boards/nope/groups").await.json().await.unwrap();
    assert!(groups.is_empty());

    let res = h
        .patch("/api/requests/nope", json!({ "name": "Renamed" }))
        .await;
    expect_error(res, reqwest::StatusCode::NOT_FOUND).await;

    let res = h
        .post("/api/boards/nope/groups", json!({ "name": "Backlog" }))
        .await;
    let body = expect_error(res, reqwest::StatusCode::NOT_FOUND).await;
    assert_eq!(body.message, "Board not found");
}

#[tokio::test]
async fn users_reject_duplicate_email() {
    let h = Harness::start(ServerConfig::empty()).await;

    let res = h
        .post(
            "/api/users",
            json!({ "name": "Alice Miller", "email": "alice@example.com", "initials": "AM" }),
        )
        .await;
    assert_eq!(res.status(), reqwest::StatusCode::CREATED);
    let alice: UserSnapshot = res.json().await.unwrap();

    let fetched: UserSnapshot = h
        .get(&format!("/api/users/{}", alice.id.0))
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(fetched, alice);

    let res = h
        .post(
            "/api/users",
            json!({ "name": "Other Alice", "email": "Alice@Example.com", "initials": "OA" }),
        )
        .await;
    expect_error(res, reqwest::StatusCode::CONFLICT).await;

    let res = h
        .post("/api/users", json!({ "name": "No Email", "initials": "NE" }))
        .await;
    expect_error(res, reqwest::StatusCode::BAD_REQUEST).await;
}

#[tokio::test]
async fn malformed_json_is_a_bad_request() {
    let h = Harness::start(ServerConfig::empty()).await;
    let board = h.board().await;

    let res = h
        .client
        .post(h.url(&format!("/api/boards/{}/groups", board.id.0)))
        .header(reqwest::header::CONTENT_TYPE, "application/json")
        .body("{not json")
        .send()
        .await
        .expect("POST malformed group");
    let body = expect_error(res, reqwest::StatusCode::BAD_REQUEST).await;
    assert_eq!(body.message, "Invalid group data");
}

#[tokio::test]
async fn null_on_required_patch_fields_is_rejected() {
    let h = Harness::start(ServerConfig::empty()).await;
    let board = h.board().await;
    let group = h.group(&board, "Backlog").await;
    let created = h.request(&group, "Creative").await;

    for body in [
        json!({ "name": null }),
        json!({ "status": null }),
        json!({ "groupId": null }),
        json!({ "position": null }),
    ] {
        let res = h
            .patch(&format!("/api/requests/{}", created.id.0), body.clone())
            .await;
        let error = expect_error(res, reqwest::StatusCode::BAD_REQUEST).await;
        assert_eq!(error.message, "Invalid request data", "{body}");
    }

    let res = h
        .patch(&format!("/api/groups/{}", group.id.0), json!({ "collapsed": null }))
        .await;
    expect_error(res, reqwest::StatusCode::BAD_REQUEST).await;

    let unchanged: RequestSnapshot = h
        .get(&format!("/api/requests/{}", created.id.0))
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(unchanged, created);
}

#[tokio::test]
async fn appends_past_the_top_rank_conflict() {
    let h = Harness::start(ServerConfig::empty()).await;
    let board = h.board().await;
    let group = h.group(&board, "Backlog").await;
    let created = h.request(&group, "Creative").await;

    let top = u64::MAX.to_string();
    let res = h
        .patch(
            &format!("/api/requests/{}", created.id.0),
            json!({ "position": top }),
        )
        .await;
    assert_eq!(res.status(), reqwest::StatusCode::OK);

    let res = h
        .post(
            &format!("/api/groups/{}/requests", group.id.0),
            json!({ "name": "One more" }),
        )
        .await;
    expect_error(res, reqwest::StatusCode::CONFLICT).await;

    let listed: Vec<RequestSnapshot> = h
        .get(&format!("/api/groups/{}/requests", group.id.0))
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].position, top);
}

use crate::{
    NewBoard, NewGroup, NewRequest, NewUser, NewWorkspace, RequestPriority, RequestStatus, Store,
    StoreError,
};

const DEMO_USERS: [(&str, &str, &str, &str); 4] = [
    ("John Doe", "john@example.com", "JD", "#635BFF"),
    ("Alice Miller", "alice@example.com", "AM", "#00CA72"),
    ("Design Studio", "design@example.com", "DS", "#E2445C"),
    ("Lisa Chen", "lisa@example.com", "LC", "#FF5A91"),
];

const DEMO_GROUPS: [(&str, &str); 3] = [
    ("Incoming Requests", "#3498db"),
    ("In progress", "#9b59b6"),
    ("Completed", "#27ae60"),
];

/// Fills an empty store with one workspace, one board, three groups, three
/// requests and four users.
pub fn seed_demo(store: &mut Store) -> Result<(), StoreError> {
    let mut users = Vec::with_capacity(DEMO_USERS.len());
    for (name, email, initials, color) in DEMO_USERS {
        users.push(store.create_user(NewUser {
            name: name.to_owned(),
            email: email.to_owned(),
            avatar: None,
            initials: initials.to_owned(),
            color: Some(color.to_owned()),
        })?);
    }

    let workspace = store.create_workspace(NewWorkspace {
        name: "Creative MY OWN Channel".to_owned(),
        description: Some("Main workspace for creative projects".to_owned()),
        color: None,
    })?;
    let board = store.create_board(
        workspace.id,
        NewBoard {
            name: "Creative MY OWN Channel".to_owned(),
            description: Some("Main board for managing creative requests".to_owned()),
        },
    )?;

    let mut groups = Vec::with_capacity(DEMO_GROUPS.len());
    for (name, color) in DEMO_GROUPS {
        groups.push(store.create_group(
            board.id,
            NewGroup {
                name: name.to_owned(),
                color: Some(color.to_owned()),
                collapsed: false,
            },
        )?);
    }

    let (john, alice, studio, lisa) = (users[0].id, users[1].id, users[2].id, users[3].id);
    let (incoming, completed) = (groups[0].id, groups[2].id);

    store.create_request(
        incoming,
        NewRequest {
            name: "Creative 1".to_owned(),
            creative_brief: Some("Landing page about working with us".to_owned()),
            status: RequestStatus::Working,
            priority: RequestPriority::Medium,
            kind: Some("Social Media".to_owned()),
            owner_id: Some(john),
            prediction: Some(
                "Low likelihood of success because: The concept needs more...".to_owned(),
            ),
            ..NewRequest::default()
        },
    )?;
    store.create_request(
        completed,
        NewRequest {
            name: "Creative 3".to_owned(),
            creative_brief: Some("I need a flyer to send to our customers".to_owned()),
            status: RequestStatus::Completed,
            priority: RequestPriority::Low,
            kind: Some("Document".to_owned()),
            owner_id: Some(alice),
            assignee_id: Some(studio),
            prediction: Some("High likelihood of success".to_owned()),
            ..NewRequest::default()
        },
    )?;
    store.create_request(
        completed,
        NewRequest {
            name: "Creative 2".to_owned(),
            creative_brief: Some(
                "The campaign is going to be an email marketing...".to_owned(),
            ),
            status: RequestStatus::Completed,
            priority: RequestPriority::Medium,
            kind: Some("Landing Page".to_owned()),
            owner_id: Some(john),
            assignee_id: Some(lisa),
            prediction: Some("High likelihood of success".to_owned()),
            ..NewRequest::default()
        },
    )?;

    Ok(())
}

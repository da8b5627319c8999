mod entities;
pub use entities::{
    Board, DEFAULT_COLOR, EntityKind, Group, Request, RequestPriority, RequestStatus, User,
    Workspace, flag_str, parse_flag,
};

mod error;
pub use error::{FieldError, StoreError, Validator};

mod ids;
pub use ids::{BoardId, GroupId, RequestId, UserId, WorkspaceId};

mod inputs;
pub use inputs::{
    GroupUpdate, NewBoard, NewGroup, NewRequest, NewUser, NewWorkspace, RequestUpdate,
};

mod position;
pub use position::{Position, RankSequence, parse_position};

mod seed;
pub use seed::seed_demo;

mod store;
pub use store::Store;

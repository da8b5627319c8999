use std::fmt;

/// Cache key: the path segments of the resource it stands for.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct QueryKey(Vec<String>);

impl QueryKey {
    pub fn new<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(segments.into_iter().map(Into::into).collect())
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }

    /// The request path, segments joined with `/`.
    pub fn path(&self) -> String {
        self.0.join("/")
    }

    pub fn starts_with(&self, prefix: &QueryKey) -> bool {
        self.0.starts_with(&prefix.0)
    }

    pub fn workspaces() -> Self {
        Self::new(["/api/workspaces"])
    }

    pub fn boards_in_workspace(workspace_id: &str) -> Self {
        Self::new(["/api/workspaces", workspace_id, "boards"])
    }

    /// Prefix of every board-scoped query.
    pub fn boards() -> Self {
        Self::new(["/api/boards"])
    }

    pub fn board(board_id: &str) -> Self {
        Self::new(["/api/boards", board_id])
    }

    pub fn groups_in_board(board_id: &str) -> Self {
        Self::new(["/api/boards", board_id, "groups"])
    }

    pub fn requests_in_board(board_id: &str) -> Self {
        Self::new(["/api/boards", board_id, "requests"])
    }

    /// Prefix of every group-scoped query.
    pub fn groups() -> Self {
        Self::new(["/api/groups"])
    }

    pub fn group(group_id: &str) -> Self {
        Self::new(["/api/groups", group_id])
    }

    pub fn requests_in_group(group_id: &str) -> Self {
        Self::new(["/api/groups", group_id, "requests"])
    }

    pub fn users() -> Self {
        Self::new(["/api/users"])
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_joins_segments() {
        assert_eq!(QueryKey::groups_in_board("b1").path(), "/api/boards/b1/groups");
        assert_eq!(QueryKey::users().path(), "/api/users");
    }

    #[test]
    fn prefixes_match_whole_segments() {
        let requests = QueryKey::requests_in_group("g1");
        assert!(requests.starts_with(&QueryKey::groups()));
        assert!(requests.starts_with(&QueryKey::group("g1")));
        assert!(!requests.starts_with(&QueryKey::group("g")));
        assert!(!QueryKey::users().starts_with(&QueryKey::boards()));
        assert!(!QueryKey::group("g1").starts_with(&requests));
    }
}

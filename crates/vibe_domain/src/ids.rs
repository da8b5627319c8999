use std::fmt;
use uuid::Uuid;

macro_rules! entity_id {
    ($name:ident) => {
        #[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
        pub struct $name(Uuid);

        impl $name {
            pub fn random() -> Self {
                Self(Uuid::new_v4())
            }

            /// Returns `None` for anything that is not a UUID; callers treat that
            /// the same as an id that was never issued.
            pub fn parse(value: &str) -> Option<Self> {
                Uuid::parse_str(value.trim()).ok().map(Self)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Display::fmt(&self.0, f)
            }
        }
    };
}

entity_id!(WorkspaceId);
entity_id!(BoardId);
entity_id!(GroupId);
entity_id!(RequestId);
entity_id!(UserId);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_accepts_uuid_and_trims() {
        let id = GroupId::random();
        let text = format!("  {id} ");
        assert_eq!(GroupId::parse(&text), Some(id));
    }

    #[test]
    fn parse_rejects_non_uuid() {
        assert_eq!(BoardId::parse("board-1"), None);
        assert_eq!(BoardId::parse(""), None);
    }
}

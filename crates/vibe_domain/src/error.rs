use crate::EntityKind;
use std::fmt;

/// One rejected input field. `path` names the field the way clients spell it
/// (`["name"]`, `["ownerId"]`), empty when the whole payload is at fault.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FieldError {
    pub path: Vec<String>,
    pub message: String,
}

impl FieldError {
    pub fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            path: vec![field.to_owned()],
            message: message.into(),
        }
    }

    pub fn payload(message: impl Into<String>) -> Self {
        Self {
            path: Vec::new(),
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            f.write_str(&self.message)
        } else {
            write!(f, "{}: {}", self.path.join("."), self.message)
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum StoreError {
    #[error("{entity} not found")]
    NotFound { entity: EntityKind, id: String },
    /// The parent named by the caller's scope (usually a path segment) is absent.
    #[error("{entity} not found")]
    MissingParent { entity: EntityKind, id: String },
    /// A reference carried inside the payload points at nothing.
    #[error("{field} references unknown {entity} {id}")]
    DanglingReference {
        field: &'static str,
        entity: EntityKind,
        id: String,
    },
    #[error("email {0} is already registered")]
    DuplicateEmail(String),
    /// The parent already holds the largest rank, so nothing can be appended.
    #[error("no positions left in {entity} {id}")]
    RanksExhausted { entity: EntityKind, id: String },
    #[error("invalid input: {}", join_errors(.0))]
    Invalid(Vec<FieldError>),
}

impl StoreError {
    pub fn not_found(entity: EntityKind, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    pub fn missing_parent(entity: EntityKind, id: impl ToString) -> Self {
        Self::MissingParent {
            entity,
            id: id.to_string(),
        }
    }

    pub fn ranks_exhausted(entity: EntityKind, id: impl ToString) -> Self {
        Self::RanksExhausted {
            entity,
            id: id.to_string(),
        }
    }

    pub fn field_errors(&self) -> Vec<FieldError> {
        match self {
            StoreError::Invalid(errors) => errors.clone(),
            StoreError::DanglingReference { field, .. } => {
                vec![FieldError::new(field, self.to_string())]
            }
            StoreError::DuplicateEmail(_) => vec![FieldError::new("email", self.to_string())],
            StoreError::RanksExhausted { .. } => {
                vec![FieldError::new("position", self.to_string())]
            }
            StoreError::NotFound { .. } | StoreError::MissingParent { .. } => Vec::new(),
        }
    }
}

fn join_errors(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Collects field errors so a payload reports every problem at once.
#[derive(Debug, Default)]
pub struct Validator {
    errors: Vec<FieldError>,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, error: FieldError) {
        self.errors.push(error);
    }

    pub fn required_text(&mut self, field: &str, value: &str) {
        if value.trim().is_empty() {
            self.push(FieldError::new(field, "must not be empty"));
        }
    }

    pub fn color(&mut self, field: &str, value: &str) {
        let hex = value.strip_prefix('#').unwrap_or("");
        let valid_len = matches!(hex.len(), 3 | 6 | 8);
        if !valid_len || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            self.push(FieldError::new(field, "must be a hex color like #635BFF"));
        }
    }

    pub fn email(&mut self, field: &str, value: &str) {
        let trimmed = value.trim();
        let valid = trimmed
            .split_once('@')
            .is_some_and(|(local, domain)| !local.is_empty() && domain.contains('.'));
        if !valid {
            self.push(FieldError::new(field, "must be an email address"));
        }
    }

    pub fn finish(self) -> Result<(), StoreError> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(StoreError::Invalid(self.errors))
        }
    }

    pub fn into_errors(self) -> Vec<FieldError> {
        self.errors
    }
}

/// Authenticated user context
use super::ids::UserId;
use serde::{Deserialize, Serialize};

/// Who is using the session
///
/// Owner checks and save relations key off this value.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", content = "user_id", rename_all = "lowercase")]
pub enum UserContext {
    /// Nobody is signed in
    #[default]
    Anonymous,
    /// Signed in as the given user
    Authenticated(UserId),
}

impl UserContext {
    pub fn authenticated(user_id: UserId) -> Self {
        Self::Authenticated(user_id)
    }

    /// Current user id, if signed in
    pub fn user_id(&self) -> Option<&UserId> {
        match self {
            Self::Anonymous => None,
            Self::Authenticated(id) => Some(id),
        }
    }
}

impl From<Option<UserId>> for UserContext {
    fn from(user_id: Option<UserId>) -> Self {
        user_id.map_or(Self::Anonymous, Self::Authenticated)
    }
}

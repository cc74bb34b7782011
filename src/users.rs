use std::collections::HashMap;

use tracing::info;

use crate::Result;
use crate::slack::{ChatApi, SlackUser};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: String,
    pub handle: String,
    pub real_name: Option<String>,
    pub is_bot: bool,
}

impl From<SlackUser> for User {
    fn from(user: SlackUser) -> Self {
        Self {
            id: user.id,
            handle: user.name,
            real_name: user.profile.real_name_normalized,
            is_bot: user.is_bot,
        }
    }
}

/// Snapshot of the workspace members, keyed by user id
#[derive(Debug, Clone, Default)]
pub struct Directory {
    users: HashMap<String, User>,
}

impl Directory {
    pub fn new(users: impl IntoIterator<Item = User>) -> Self {
        Self {
            users: users.into_iter().map(|u| (u.id.clone(), u)).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&User> {
        self.users.get(id)
    }

    /// Real name for a user id. Unknown and missing ids resolve to `None`.
    pub fn real_name(&self, id: Option<&str>) -> Option<String> {
        id.and_then(|id| self.get(id))
            .and_then(|user| user.real_name.clone())
    }
}

pub fn fetch_directory(api: &dyn ChatApi) -> Result<Directory> {
    let directory = Directory::new(api.list_users()?.into_iter().map(User::from));
    info!(users = directory.len(), "fetched user directory");
    Ok(directory)
}

//! Site users and role-derived capabilities.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub type UserId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Administrator,
    Editor,
    Author,
    Contributor,
    Subscriber,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Administrator => "administrator",
            Role::Editor => "editor",
            Role::Author => "author",
            Role::Contributor => "contributor",
            Role::Subscriber => "subscriber",
        }
    }

    pub fn capabilities(&self) -> &'static [&'static str] {
        match self {
            Role::Administrator => &[
                "read",
                "edit_posts",
                "edit_pages",
                "publish_posts",
                "upload_files",
                "list_users",
                "manage_options",
            ],
            Role::Editor => &["read", "edit_posts", "edit_pages", "publish_posts", "upload_files"],
            Role::Author => &["read", "edit_posts", "publish_posts", "upload_files"],
            Role::Contributor => &["read", "edit_posts"],
            Role::Subscriber => &["read"],
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "administrator" => Ok(Role::Administrator),
            "editor" => Ok(Role::Editor),
            "author" => Ok(Role::Author),
            "contributor" => Ok(Role::Contributor),
            "subscriber" => Ok(Role::Subscriber),
            other => Err(format!(
                "invalid role '{}', must be one of: administrator, editor, author, contributor, subscriber",
                other
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub login: String,
    pub role: Role,
}

impl User {
    pub fn can(&self, capability: &str) -> bool {
        self.role.capabilities().contains(&capability)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(role: Role) -> User {
        User {
            id: 1,
            login: "alice".into(),
            role,
        }
    }

    #[test]
    fn test_only_administrators_manage_options() {
        assert!(user(Role::Administrator).can("manage_options"));
        assert!(!user(Role::Editor).can("manage_options"));
        assert!(!user(Role::Subscriber).can("manage_options"));
    }

    #[test]
    fn test_contributor_cannot_upload() {
        assert!(user(Role::Contributor).can("edit_posts"));
        assert!(!user(Role::Contributor).can("upload_files"));
    }

    #[test]
    fn test_role_parse() {
        assert_eq!("editor".parse::<Role>().unwrap(), Role::Editor);
        assert!("root".parse::<Role>().is_err());
    }
}

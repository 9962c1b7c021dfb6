use std::collections::HashSet;
use std::fmt;

use serde::Serialize;

use super::Claims;

/// Named capability guarding one mutating operation on one resource type.
/// List operations need no capability, only an identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Permission {
    CityAdd,
    CityUpdate,
    CityDelete,
    PlaceAdd,
    PlaceUpdate,
    PlaceDelete,
    CommentAdd,
    CommentDelete,
}

impl Permission {
    pub const ALL: [Permission; 8] = [
        Permission::CityAdd,
        Permission::CityUpdate,
        Permission::CityDelete,
        Permission::PlaceAdd,
        Permission::PlaceUpdate,
        Permission::PlaceDelete,
        Permission::CommentAdd,
        Permission::CommentDelete,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Permission::CityAdd => "city.add",
            Permission::CityUpdate => "city.update",
            Permission::CityDelete => "city.delete",
            Permission::PlaceAdd => "place.add",
            Permission::PlaceUpdate => "place.update",
            Permission::PlaceDelete => "place.delete",
            Permission::CommentAdd => "comment.add",
            Permission::CommentDelete => "comment.delete",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.as_str() == s)
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Requesting user resolved from a bearer token, with its capability set
#[derive(Debug, Clone, Serialize)]
pub struct Identity {
    pub user_id: String,
    pub username: String,
    pub permissions: HashSet<String>,
}

impl Identity {
    pub fn new(user_id: impl Into<String>, username: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            username: username.into(),
            permissions: HashSet::new(),
        }
    }

    pub fn with_permissions<I, S>(mut self, permissions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.permissions.extend(permissions.into_iter().map(Into::into));
        self
    }

    /// Query the capability set by string key
    pub fn has_permission(&self, key: &str) -> bool {
        self.permissions.contains(key)
    }

    pub fn can(&self, permission: Permission) -> bool {
        self.has_permission(permission.as_str())
    }
}

impl From<Claims> for Identity {
    fn from(claims: Claims) -> Self {
        Identity::new(claims.sub, claims.username).with_permissions(claims.permissions)
    }
}

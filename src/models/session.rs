use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;

/// The role an admin signs in with.
///
/// Serialized with the short wire values (`admin`, `volunteer`, `police`)
/// that the storage record carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Control-room administrator.
    Admin,
    /// Ground volunteer.
    Volunteer,
    /// Police officer.
    Police,
}

impl Role {
    /// All selectable roles, in display order.
    pub const ALL: [Role; 3] = [Role::Admin, Role::Volunteer, Role::Police];

    /// The wire value stored in the session record.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Volunteer => "volunteer",
            Role::Police => "police",
        }
    }

    /// The human-readable label shown in the role picker.
    pub fn label(&self) -> &'static str {
        match self {
            Role::Admin => "Administrator",
            Role::Volunteer => "Volunteer",
            Role::Police => "Police Officer",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Role::ALL
            .into_iter()
            .find(|role| role.as_str() == value)
            .ok_or_else(|| ValidationError::UnknownRole(value.to_string()))
    }
}

/// Represents an admin session.
///
/// Stored as JSON under the `adminAuth` key of the client's storage. A
/// record that exists is always authenticated; there is no expiry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    /// The name the admin signed in with.
    pub username: String,
    /// The selected role.
    pub role: Role,
    /// Milliseconds since the Unix epoch at sign-in.
    pub login_time: i64,
    /// Always `true` for a persisted record.
    pub is_authenticated: bool,
}

impl Session {
    /// Creates an authenticated session stamped with `login_time`.
    pub fn new(username: impl Into<String>, role: Role, login_time: i64) -> Self {
        Self {
            username: username.into(),
            role,
            login_time,
            is_authenticated: true,
        }
    }
}

//! Users as reference data.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::fields::{Role, UserId};

/// A dashboard user. Immutable once created.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub name: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

/// Resolve a user identifier (ID, exact name or email) to a user ID.
pub fn resolve_user(identifier: &str, users: &[User]) -> Result<UserId, String> {
    let identifier = identifier.trim();
    if let Ok(id) = identifier.parse::<UserId>() {
        return if users.iter().any(|u| u.id == id) {
            Ok(id)
        } else {
            Err(format!("User with ID {} not found", id))
        };
    }
    let needle = identifier.to_lowercase();
    users
        .iter()
        .find(|u| u.name.to_lowercase() == needle || u.email.to_lowercase() == needle)
        .map(|u| u.id)
        .ok_or_else(|| format!("No user found with name or email '{}'", identifier))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed;

    #[test]
    fn test_resolve_user() {
        let users = seed::users();
        assert_eq!(resolve_user("3", &users), Ok(3));
        assert_eq!(resolve_user("jane smith", &users), Ok(4));
        assert_eq!(resolve_user("admin@company.com", &users), Ok(1));
        assert!(resolve_user("nobody", &users).is_err());
    }
}

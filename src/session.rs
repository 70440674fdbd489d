//! Current-user session with the demo role switcher.

use tracing::debug;

use crate::fields::{Role, UserId};
use crate::user::User;

/// Holds the user the dashboard is acting as.
#[derive(Debug, Clone)]
pub struct Session {
    users: Vec<User>,
    current: usize,
}

impl Session {
    /// Start as the first manager, or the first user if there is none.
    /// Returns `None` for an empty user list.
    pub fn new(users: Vec<User>) -> Option<Self> {
        if users.is_empty() {
            return None;
        }
        let current = users
            .iter()
            .position(|u| u.role == Role::Manager)
            .unwrap_or(0);
        Some(Session { users, current })
    }

    pub fn current_user(&self) -> &User {
        &self.users[self.current]
    }

    /// Act as the first user holding `role`. Unknown roles leave the session
    /// as it is and return `false`.
    pub fn switch_role(&mut self, role: Role) -> bool {
        match self.users.iter().position(|u| u.role == role) {
            Some(idx) => {
                self.current = idx;
                debug!("Switched to {} ({:?})", self.users[idx].name, role);
                true
            }
            None => {
                debug!("No user with role {:?}; keeping {}", role, self.current_user().name);
                false
            }
        }
    }

    pub fn set_current_user(&mut self, id: UserId) -> bool {
        match self.users.iter().position(|u| u.id == id) {
            Some(idx) => {
                self.current = idx;
                true
            }
            None => false,
        }
    }
}

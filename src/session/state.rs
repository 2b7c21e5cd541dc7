//! Module `session`
//!
//! Defines the `Session` struct holding the per-filesystem-instance state:
//! the user the instance acts as, its store identity, and the working
//! directory relative paths are resolved against.

use crate::navigate::{join_child, normalize};
use crate::storage::Identity;

/// State of one filesystem instance.
///
/// Created once at initialization. Only the working directory changes
/// afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    user_name: String,
    identity: Identity,
    home_directory: String,
    working_directory: String,
}

impl Session {
    /// Starts a session in the user's home directory, `<home_prefix>/<user_name>`.
    pub fn new(user_name: &str, identity: Identity, home_prefix: &str) -> Self {
        let home_directory = normalize(&join_child(&normalize(&format!("/{}", home_prefix)), user_name));
        Self {
            user_name: user_name.to_string(),
            identity,
            working_directory: home_directory.clone(),
            home_directory,
        }
    }

    // --------------------
    // Getter methods
    // --------------------

    /// Returns the process user the session acts as.
    pub fn user_name(&self) -> &str {
        &self.user_name
    }

    /// Returns the uid/gid new entries are created with.
    pub fn identity(&self) -> Identity {
        self.identity
    }

    pub fn home_directory(&self) -> &str {
        &self.home_directory
    }

    /// Returns the resolved working directory.
    pub fn working_directory(&self) -> &str {
        &self.working_directory
    }

    // --------------------
    // Setter methods
    // --------------------

    /// Sets the working directory. The caller passes an already resolved path.
    pub fn set_working_directory(&mut self, path: String) {
        self.working_directory = path;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ID: Identity = Identity { uid: 1, gid: 2 };

    #[test]
    fn test_starts_in_home() {
        let session = Session::new("alice", ID, "/user");
        assert_eq!(session.home_directory(), "/user/alice");
        assert_eq!(session.working_directory(), "/user/alice");
    }

    #[test]
    fn test_home_prefix_is_normalized() {
        assert_eq!(Session::new("bob", ID, "/home/").home_directory(), "/home/bob");
        assert_eq!(Session::new("bob", ID, "home").home_directory(), "/home/bob");
        assert_eq!(Session::new("bob", ID, "/").home_directory(), "/bob");
    }
}

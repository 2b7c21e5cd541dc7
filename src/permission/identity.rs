//! User identity resolution

use log::{debug, error};

use crate::error::FsError;
use crate::storage::{FileStorage, Identity};

/// Looks up the store-side uid and primary gid of `user_name`.
pub fn resolve_identity(storage: &dyn FileStorage, user_name: &str) -> Result<Identity, FsError> {
    let lookup = || -> Result<Identity, FsError> {
        let uid = storage.uid_of(user_name)?;
        let gid = storage.gid_of_user(user_name)?;
        Ok(Identity { uid, gid })
    };
    match lookup() {
        Ok(identity) => {
            debug!(
                "Resolved user {} to uid {} gid {}",
                user_name, identity.uid, identity.gid
            );
            Ok(identity)
        }
        Err(e) => {
            error!("Failed to resolve identity of {}: {}", user_name, e);
            Err(e)
        }
    }
}

/// Display names for a numeric owner pair.
pub fn owner_names(storage: &dyn FileStorage, uid: u32, gid: u32) -> Result<(String, String), FsError> {
    Ok((storage.user_name(uid)?, storage.group_name(gid)?))
}

//! Filesystem instance
//!
//! Owns the validated configuration, the mounted store, the session and the
//! shared statistics. The VFS verbs live in `operations`.

use log::{error, info};
use std::env;
use std::sync::Arc;

use crate::config::{CONF_DIR_ENV, DEFAULT_PORT, SCHEME, SiteConfig};
use crate::error::FsError;
use crate::filesystem::streams::Statistics;
use crate::navigate::{self, FsUri};
use crate::permission::resolve_identity;
use crate::session::Session;
use crate::status::ServerDefaults;
use crate::storage::{FileStorage, StorageConnector};

/// A `cfs://` filesystem bound to one volume and one user session.
pub struct CfsFileSystem {
    pub(crate) uri: FsUri,
    pub(crate) config: SiteConfig,
    pub(crate) storage: Arc<dyn FileStorage>,
    pub(crate) session: Session,
    pub(crate) statistics: Arc<Statistics>,
    server_defaults: ServerDefaults,
    verify_checksum: bool,
}

impl CfsFileSystem {
    /// Initializes from the process environment.
    ///
    /// Reads `$HADOOP_CONF_DIR/cfs-site.xml`, mounts the volume through
    /// `connector` and resolves the process user's identity. Every failure is
    /// fatal.
    pub fn initialize(uri: &str, connector: &dyn StorageConnector) -> Result<Self, FsError> {
        info!("==> Initialize CfsFileSystem {}", uri);
        let result = (|| -> Result<Self, FsError> {
            let fs_uri = FsUri::parse(uri)?;
            let user_name = process_user()?;
            let config = SiteConfig::from_env(&user_name)?.ok_or_else(|| {
                FsError::Environment(format!("{} env is not set", CONF_DIR_ENV))
            })?;

            let storage = connector.connect(&config.storage_config())?;
            Self::from_parts(fs_uri, config, storage, &user_name)
        })();

        if let Err(e) = &result {
            error!("Failed to initialize CfsFileSystem: {}", e);
        }
        result
    }

    /// Builds an instance from already loaded parts, without reading the
    /// environment. Fails if `user_name` has no identity in the store.
    pub fn from_parts(
        uri: FsUri,
        mut config: SiteConfig,
        storage: Arc<dyn FileStorage>,
        user_name: &str,
    ) -> Result<Self, FsError> {
        let identity = resolve_identity(storage.as_ref(), user_name)?;
        let session = Session::new(user_name, identity, config.user_home_prefix());
        if config.current_user().is_none() {
            config.set_current_user(user_name);
        }
        info!(
            "Mounted {} (volume {}) as {} uid {} gid {}, working dir {}",
            uri,
            config.volume_name(),
            user_name,
            identity.uid,
            identity.gid,
            session.working_directory()
        );
        Ok(Self {
            uri,
            config,
            storage,
            session,
            statistics: Arc::new(Statistics::default()),
            server_defaults: ServerDefaults::default(),
            verify_checksum: false,
        })
    }

    pub(crate) fn resolve(&self, path: &str) -> Result<String, FsError> {
        navigate::resolve(path, self.session.working_directory(), SCHEME)
    }

    pub(crate) fn uri_prefix(&self) -> String {
        self.uri.to_string()
    }

    pub fn uri(&self) -> &FsUri {
        &self.uri
    }

    pub fn scheme(&self) -> &'static str {
        SCHEME
    }

    pub fn default_port(&self) -> u16 {
        DEFAULT_PORT
    }

    pub fn config(&self) -> &SiteConfig {
        &self.config
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn statistics(&self) -> &Arc<Statistics> {
        &self.statistics
    }

    pub fn server_defaults(&self) -> ServerDefaults {
        self.server_defaults
    }

    pub fn default_replication(&self) -> u32 {
        self.storage.replica_number()
    }

    /// Replication is owned by the store.
    pub fn set_replication(&self, _path: &str, _replication: u16) -> Result<bool, FsError> {
        Ok(false)
    }

    pub fn set_verify_checksum(&mut self, verify: bool) {
        self.verify_checksum = verify;
    }

    pub fn verify_checksum(&self) -> bool {
        self.verify_checksum
    }

    pub fn home_directory(&self) -> &str {
        self.session.home_directory()
    }

    pub fn working_directory(&self) -> &str {
        self.session.working_directory()
    }

    /// Changes the directory relative paths resolve against.
    pub fn set_working_directory(&mut self, path: &str) -> Result<(), FsError> {
        let resolved = self.resolve(path)?;
        info!("Working directory: {} -> {}", self.session.working_directory(), resolved);
        self.session.set_working_directory(resolved);
        Ok(())
    }

    /// Resolves `path` and prefixes it with this filesystem's URI.
    pub fn make_qualified(&self, path: &str) -> Result<String, FsError> {
        let resolved = self.resolve(path)?;
        Ok(navigate::qualify(Some(&self.uri_prefix()), &resolved))
    }

    pub fn exists(&self, path: &str) -> Result<bool, FsError> {
        let resolved = self.resolve(path)?;
        Ok(self.storage.stat(&resolved)?.is_some())
    }

    pub fn close(self) {
        info!("Close CfsFileSystem {}", self.uri);
    }
}

fn process_user() -> Result<String, FsError> {
    env::var("USER")
        .or_else(|_| env::var("USERNAME"))
        .ok()
        .filter(|name| !name.is_empty())
        .ok_or_else(|| FsError::Environment("process user name is not available".into()))
}

//! cfs-shell - Entry Point
//!
//! Interactive shell over a `cfs://` filesystem backed by the in-process
//! store. With `HADOOP_CONF_DIR` set the site file there is used, otherwise a
//! built-in local configuration. The shell user comes from `USER` or
//! `USERNAME` and falls back to `root`.

use std::env;
use std::io::{self, IsTerminal};
use std::process;

use log::info;

use cfs_vfs::config::SiteConfig;
use cfs_vfs::error::handlers::{error_to_exit_code, handle_error};
use cfs_vfs::error::{FsError, StoreError};
use cfs_vfs::navigate::FsUri;
use cfs_vfs::shell;
use cfs_vfs::storage::{MemoryConnector, MemoryStorage, StorageConnector};
use cfs_vfs::utils::init_logging;
use cfs_vfs::CfsFileSystem;

const DEFAULT_URI: &str = "cfs://local";
const LOCAL_UID: u32 = 1000;
const LOCAL_GID: u32 = 1000;

const LOCAL_SITE: &str = r#"<?xml version="1.0"?>
<configuration>
  <property><name>cfs.master.addr</name><value>127.0.0.1:17010</value></property>
  <property><name>cfs.volume.name</name><value>local</value></property>
  <property><name>cfs.volume.owner</name><value>local</value></property>
</configuration>
"#;

fn main() {
    let uri = env::args().nth(1).unwrap_or_else(|| DEFAULT_URI.to_string());
    let code = match run(&uri) {
        Ok(code) => code,
        Err(e) => {
            handle_error(&e);
            eprintln!("cfs-shell: {}", e);
            error_to_exit_code(&e)
        }
    };
    process::exit(code);
}

fn run(uri: &str) -> Result<i32, FsError> {
    let uri = FsUri::parse(uri)?;
    let user = env::var("USER")
        .or_else(|_| env::var("USERNAME"))
        .unwrap_or_else(|_| "root".to_string());

    let config = match SiteConfig::from_env(&user)? {
        Some(config) => config,
        None => SiteConfig::from_xml("built-in", LOCAL_SITE)?,
    };
    init_logging(config.log_level());

    let storage = MemoryStorage::new();
    if !storage.has_user(&user) {
        storage.add_user(&user, LOCAL_UID, &user, LOCAL_GID);
    }
    let storage = MemoryConnector::new(storage).connect(&config.storage_config())?;
    let mut fs = CfsFileSystem::from_parts(uri, config, storage, &user)?;
    fs.mkdirs_default(fs.home_directory())?;
    info!("Launching cfs-shell on {} as {}", fs.uri(), fs.session().user_name());

    let stdin = io::stdin();
    let interactive = stdin.is_terminal();
    let code = shell::run(&mut fs, stdin.lock(), io::stdout().lock(), interactive)
        .map_err(|e| FsError::StoreFailure(StoreError::Io(e)))?;
    fs.close();
    Ok(code)
}

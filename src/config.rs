//! Configuration management for the CFS adapter
//!
//! Reads the `cfs-site.xml` property list, layers `CFS_*` environment
//! overrides on top of it, and validates the keys the store needs to mount a
//! volume. Everything except `current_user` is immutable after load.

use config::{Config, ConfigError, Environment, Map, Source, Value, ValueKind};
use log::{debug, warn};
use serde::Deserialize;
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::Path;
use xmlparser::{ElementEnd, Token, Tokenizer};

use crate::error::FsError;
use crate::storage::StorageConfig;

pub const SCHEME: &str = "cfs";
pub const DEFAULT_PORT: u16 = 8888;
pub const SITE_CONFIG_FILE: &str = "cfs-site.xml";
pub const CONF_DIR_ENV: &str = "HADOOP_CONF_DIR";
pub const FRAMEWORK_USER_ENV: &str = "HADOOP_USER_NAME";

pub const MASTER_ADDR_KEY: &str = "cfs.master.addr";
pub const VOLUME_NAME_KEY: &str = "cfs.volume.name";
pub const VOLUME_OWNER_KEY: &str = "cfs.volume.owner";
pub const LOG_DIR_KEY: &str = "cfs.log.dir";
pub const LOG_LEVEL_KEY: &str = "cfs.log.level";
pub const FOLLOWER_READ_KEY: &str = "cfs.follower.read";
pub const LIBSDK_PATH_KEY: &str = "cfs.libsdk.path";
pub const USER_HOME_PREFIX_KEY: &str = "dfs.user.home.dir.prefix";

const USER_HOME_PREFIX_DEFAULT: &str = "/user";
const ENV_PREFIX: &str = "CFS";

/// Property names that feed the typed view, with the key each one takes in
/// the merged settings. The `CFS_*` environment source produces the same keys.
const TYPED_KEYS: [(&str, &str); 8] = [
    (MASTER_ADDR_KEY, "master_addr"),
    (VOLUME_NAME_KEY, "volume_name"),
    (VOLUME_OWNER_KEY, "volume_owner"),
    (LOG_DIR_KEY, "log_dir"),
    (LOG_LEVEL_KEY, "log_level"),
    (FOLLOWER_READ_KEY, "follower_read"),
    (LIBSDK_PATH_KEY, "libsdk_path"),
    (USER_HOME_PREFIX_KEY, "dfs_user_home_dir_prefix"),
];

const DEFAULT_UMASK: u16 = 0o022;
const DEFAULT_FILE_PERMISSION: u16 = 0o644;
const DEFAULT_DIR_PERMISSION: u16 = 0o755;
const LIST_CACHE_SIZE: usize = 100;

/// Typed view of the merged property set.
#[derive(Debug, Deserialize)]
struct SiteProperties {
    master_addr: Option<String>,
    volume_name: Option<String>,
    volume_owner: Option<String>,
    log_dir: Option<String>,
    log_level: Option<String>,
    follower_read: Option<String>,
    libsdk_path: Option<String>,
    #[serde(rename = "dfs_user_home_dir_prefix")]
    user_home_prefix: Option<String>,
}

/// Validated site configuration.
#[derive(Debug, Clone)]
pub struct SiteConfig {
    source: String,
    properties: HashMap<String, String>,
    master_addr: String,
    volume_name: String,
    volume_owner: String,
    log_dir: Option<String>,
    log_level: Option<String>,
    follower_read: bool,
    libsdk_path: Option<String>,
    user_home_prefix: String,
    current_user: Option<String>,
}

impl SiteConfig {
    /// Load `path`, then apply `CFS_*` environment overrides.
    pub fn load(path: &Path) -> Result<Self, FsError> {
        let origin = path.display().to_string();
        let text = fs::read_to_string(path)
            .map_err(|e| FsError::Config(format!("Failed to read {}: {}", origin, e)))?;
        let source = PropertySource::parse(&origin, &text)?;
        Self::build(source, true)
    }

    /// Loads `$HADOOP_CONF_DIR/cfs-site.xml` and records the framework user:
    /// `HADOOP_USER_NAME` when set, otherwise `process_user`. Returns `None`
    /// when `HADOOP_CONF_DIR` is not set.
    pub fn from_env(process_user: &str) -> Result<Option<Self>, FsError> {
        let Ok(dir) = env::var(CONF_DIR_ENV) else {
            return Ok(None);
        };
        let mut config = Self::load(&Path::new(&dir).join(SITE_CONFIG_FILE))?;
        let framework_user =
            env::var(FRAMEWORK_USER_ENV).unwrap_or_else(|_| process_user.to_string());
        config.set_current_user(&framework_user);
        Ok(Some(config))
    }

    /// Parse an in-memory property list. No environment overrides apply.
    pub fn from_xml(origin: &str, text: &str) -> Result<Self, FsError> {
        Self::build(PropertySource::parse(origin, text)?, false)
    }

    fn build(source: PropertySource, with_env: bool) -> Result<Self, FsError> {
        let mut builder = Config::builder().add_source(source.clone());
        if with_env {
            builder = builder.add_source(Environment::with_prefix(ENV_PREFIX));
        }
        let settings = builder
            .build()
            .map_err(|e| FsError::Config(format!("{}: {}", source.origin, e)))?;
        let props: SiteProperties = settings
            .try_deserialize()
            .map_err(|e| FsError::Config(format!("{}: {}", source.origin, e)))?;

        let required = |value: Option<String>, key: &'static str| {
            value
                .filter(|v| !v.is_empty())
                .ok_or_else(|| FsError::ConfigIncomplete {
                    source: source.origin.clone(),
                    key,
                })
        };
        let master_addr = required(props.master_addr, MASTER_ADDR_KEY)?;
        let volume_name = required(props.volume_name, VOLUME_NAME_KEY)?;
        let volume_owner = required(props.volume_owner, VOLUME_OWNER_KEY)?;

        debug!(
            "Loaded {} ({} properties): volume {} at {}",
            source.origin,
            source.properties.len(),
            volume_name,
            master_addr
        );

        Ok(Self {
            master_addr,
            volume_name,
            volume_owner,
            log_dir: props.log_dir,
            log_level: props.log_level,
            follower_read: props.follower_read.as_deref() == Some("true"),
            libsdk_path: props.libsdk_path,
            user_home_prefix: props
                .user_home_prefix
                .unwrap_or_else(|| USER_HOME_PREFIX_DEFAULT.to_string()),
            current_user: None,
            source: source.origin,
            properties: source.properties,
        })
    }

    /// Raw property value as it appeared in the file, including unknown keys.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.properties.get(key).map(String::as_str)
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn master_addr(&self) -> &str {
        &self.master_addr
    }

    pub fn volume_name(&self) -> &str {
        &self.volume_name
    }

    pub fn volume_owner(&self) -> &str {
        &self.volume_owner
    }

    pub fn log_dir(&self) -> Option<&str> {
        self.log_dir.as_deref()
    }

    pub fn log_level(&self) -> Option<&str> {
        self.log_level.as_deref()
    }

    pub fn follower_read(&self) -> bool {
        self.follower_read
    }

    pub fn libsdk_path(&self) -> Option<&str> {
        self.libsdk_path.as_deref()
    }

    pub fn user_home_prefix(&self) -> &str {
        &self.user_home_prefix
    }

    pub fn scheme(&self) -> &'static str {
        SCHEME
    }

    pub fn umask(&self) -> u16 {
        DEFAULT_UMASK
    }

    pub fn file_default_permission(&self) -> u16 {
        DEFAULT_FILE_PERMISSION
    }

    pub fn dir_default_permission(&self) -> u16 {
        DEFAULT_DIR_PERMISSION
    }

    pub fn list_cache_size(&self) -> usize {
        LIST_CACHE_SIZE
    }

    pub fn current_user(&self) -> Option<&str> {
        self.current_user.as_deref()
    }

    /// Records the framework-level user. Only the first call takes effect.
    pub fn set_current_user(&mut self, user: &str) {
        if let Some(existing) = &self.current_user {
            warn!("Current user already set to {}, ignoring {}", existing, user);
            return;
        }
        self.current_user = Some(user.to_string());
    }

    /// Settings handed to the store connector.
    pub fn storage_config(&self) -> StorageConfig {
        StorageConfig {
            masters: self.master_addr.clone(),
            volume_name: self.volume_name.clone(),
            owner: self.volume_owner.clone(),
            log_dir: self.log_dir.clone(),
            log_level: self.log_level.clone(),
            follower_read: self.follower_read,
            libsdk_path: self.libsdk_path.clone(),
        }
    }
}

/// Parsed `<property>` list, exposed to the `config` crate as a source.
#[derive(Debug, Clone)]
struct PropertySource {
    origin: String,
    properties: HashMap<String, String>,
}

impl PropertySource {
    fn parse(origin: &str, text: &str) -> Result<Self, FsError> {
        let properties = parse_properties(text)
            .map_err(|e| FsError::Config(format!("Failed to parse the config, {}: {}", origin, e)))?;
        Ok(Self {
            origin: origin.to_string(),
            properties,
        })
    }
}

impl Source for PropertySource {
    fn clone_into_box(&self) -> Box<dyn Source + Send + Sync> {
        Box::new(self.clone())
    }

    fn collect(&self) -> Result<Map<String, Value>, ConfigError> {
        let mut map = Map::new();
        for (name, key) in TYPED_KEYS {
            if let Some(value) = self.properties.get(name) {
                map.insert(
                    key.to_string(),
                    Value::new(Some(&self.origin), ValueKind::String(value.clone())),
                );
            }
        }
        Ok(map)
    }
}

/// Collects `<property><name/><value/></property>` groups.
fn parse_properties(text: &str) -> Result<HashMap<String, String>, xmlparser::Error> {
    let mut map = HashMap::new();
    let mut name: Option<String> = None;
    let mut value = String::new();
    let mut open: Option<&str> = None;
    let mut buf = String::new();

    for token in Tokenizer::from(text) {
        match token? {
            Token::ElementStart { local, .. } => {
                let local = local.as_str();
                if local == "property" {
                    name = None;
                    value.clear();
                }
                open = Some(local);
                buf.clear();
            }
            Token::Text { text } if open.is_some() => buf.push_str(text.as_str()),
            Token::Cdata { text, .. } if open.is_some() => buf.push_str(text.as_str()),
            Token::ElementEnd { end, .. } => {
                let closed = match end {
                    ElementEnd::Open => continue,
                    ElementEnd::Empty => open.take(),
                    ElementEnd::Close(_, local) => Some(local.as_str()),
                };
                match closed {
                    Some("name") => name = Some(unescape(buf.trim())),
                    Some("value") => value = unescape(buf.trim()),
                    Some("property") => {
                        if let Some(key) = name.take() {
                            map.insert(key, std::mem::take(&mut value));
                        }
                    }
                    _ => {}
                }
                open = None;
                buf.clear();
            }
            _ => {}
        }
    }
    Ok(map)
}

fn unescape(text: &str) -> String {
    decode_char_refs(text)
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

/// Replaces `&#N;` and `&#xH;`. Malformed references are left as written.
fn decode_char_refs(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(start) = rest.find("&#") {
        out.push_str(&rest[..start]);
        let tail = &rest[start + 2..];
        let decoded = tail.find(';').and_then(|end| {
            let digits = &tail[..end];
            let code = match digits.strip_prefix(['x', 'X']) {
                Some(hex) => u32::from_str_radix(hex, 16).ok(),
                None => digits.parse::<u32>().ok(),
            };
            code.and_then(char::from_u32).map(|c| (c, end))
        });
        match decoded {
            // A decoded '&' must not combine with following text into a
            // named entity, so it is written as `&amp;` for the final pass.
            Some(('&', end)) => {
                out.push_str("&amp;");
                rest = &tail[end + 1..];
            }
            Some((c, end)) => {
                out.push(c);
                rest = &tail[end + 1..];
            }
            None => {
                out.push_str("&#");
                rest = tail;
            }
        }
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const SITE: &str = r#"<?xml version="1.0"?>
<configuration>
  <property>
    <name>cfs.master.addr</name>
    <value>10.0.0.1:17010,10.0.0.2:17010</value>
  </property>
  <property>
    <name>cfs.volume.name</name>
    <value>ltptest</value>
  </property>
  <property>
    <name>cfs.volume.owner</name>
    <value>ltptest</value>
  </property>
  <property>
    <name>cfs.follower.read</name>
    <value>true</value>
  </property>
  <property>
    <name>custom.key</name>
    <value>a &amp; b</value>
  </property>
</configuration>"#;

    #[test]
    fn test_load_required_and_defaults() {
        let cfg = SiteConfig::from_xml("cfs-site.xml", SITE).unwrap();
        assert_eq!(cfg.master_addr(), "10.0.0.1:17010,10.0.0.2:17010");
        assert_eq!(cfg.volume_name(), "ltptest");
        assert_eq!(cfg.volume_owner(), "ltptest");
        assert!(cfg.follower_read());
        assert_eq!(cfg.user_home_prefix(), "/user");
        assert_eq!(cfg.log_dir(), None);
        assert_eq!(cfg.umask(), 0o022);
        assert_eq!(cfg.file_default_permission(), 0o644);
    }

    #[test]
    fn test_unknown_keys_are_retained() {
        let cfg = SiteConfig::from_xml("cfs-site.xml", SITE).unwrap();
        assert_eq!(cfg.get("custom.key"), Some("a & b"));
    }

    #[test]
    fn test_missing_volume_owner_is_incomplete() {
        let xml = "<configuration>\
            <property><name>cfs.master.addr</name><value>m:1</value></property>\
            <property><name>cfs.volume.name</name><value>v</value></property>\
            </configuration>";
        match SiteConfig::from_xml("site.xml", xml) {
            Err(FsError::ConfigIncomplete { source, key }) => {
                assert_eq!(source, "site.xml");
                assert_eq!(key, VOLUME_OWNER_KEY);
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_follower_read_only_literal_true() {
        let xml = SITE.replace("<value>true</value>", "<value>yes</value>");
        let cfg = SiteConfig::from_xml("cfs-site.xml", &xml).unwrap();
        assert!(!cfg.follower_read());
    }

    #[test]
    fn test_property_without_name_is_ignored() {
        let xml = "<configuration><property><value>orphan</value></property></configuration>";
        assert!(parse_properties(xml).unwrap().is_empty());
    }

    #[test]
    fn test_empty_value_element() {
        let xml = "<configuration><property><name>k</name><value/></property></configuration>";
        assert_eq!(parse_properties(xml).unwrap().get("k").map(String::as_str), Some(""));
    }

    #[test]
    fn test_malformed_xml_fails() {
        let err = SiteConfig::from_xml("bad.xml", "<configuration <<").err();
        assert!(matches!(err, Some(FsError::Config(_))));
    }

    #[test]
    fn test_unprefixed_name_does_not_satisfy_required_key() {
        let xml = "<configuration>\
            <property><name>master.addr</name><value>m:1</value></property>\
            <property><name>cfs.volume.name</name><value>v</value></property>\
            <property><name>cfs.volume.owner</name><value>o</value></property>\
            </configuration>";
        match SiteConfig::from_xml("site.xml", xml) {
            Err(FsError::ConfigIncomplete { key, .. }) => assert_eq!(key, MASTER_ADDR_KEY),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_similar_names_do_not_collide() {
        let xml = "<configuration>\
            <property><name>cfs.master.addr</name><value>m:1</value></property>\
            <property><name>volume.name</name><value>other</value></property>\
            <property><name>cfs.volume.name</name><value>real</value></property>\
            <property><name>cfs.volume.owner</name><value>o</value></property>\
            <property><name>volume.owner</name><value>other</value></property>\
            </configuration>";
        for _ in 0..20 {
            let cfg = SiteConfig::from_xml("site.xml", xml).unwrap();
            assert_eq!(cfg.volume_name(), "real");
            assert_eq!(cfg.volume_owner(), "o");
            assert_eq!(cfg.get("volume.name"), Some("other"));
        }
    }

    #[test]
    fn test_numeric_character_references() {
        assert_eq!(unescape("a&#38;b"), "a&b");
        assert_eq!(unescape("a&#x26;b"), "a&b");
        assert_eq!(unescape("&#60;x&#X3E;"), "<x>");
        assert_eq!(unescape("&#38;lt;"), "&lt;");
        assert_eq!(unescape("&#zz; &#"), "&#zz; &#");

        let xml = SITE.replace("<value>ltptest</value>", "<value>a&#38;b</value>");
        let cfg = SiteConfig::from_xml("cfs-site.xml", &xml).unwrap();
        assert_eq!(cfg.volume_name(), "a&b");
    }

    #[test]
    fn test_current_user_set_once() {
        let mut cfg = SiteConfig::from_xml("cfs-site.xml", SITE).unwrap();
        cfg.set_current_user("alice");
        cfg.set_current_user("bob");
        assert_eq!(cfg.current_user(), Some("alice"));
    }

    #[test]
    fn test_from_env_loads_once_and_sets_framework_user() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(SITE_CONFIG_FILE), SITE).unwrap();
        unsafe {
            env::remove_var(CONF_DIR_ENV);
        }
        assert!(SiteConfig::from_env("alice").unwrap().is_none());

        unsafe {
            env::set_var(CONF_DIR_ENV, dir.path());
            env::set_var(FRAMEWORK_USER_ENV, "hdfs");
        }
        let cfg = SiteConfig::from_env("alice").unwrap().unwrap();
        assert_eq!(cfg.current_user(), Some("hdfs"));
        assert_eq!(cfg.volume_name(), "ltptest");

        unsafe {
            env::remove_var(FRAMEWORK_USER_ENV);
        }
        let cfg = SiteConfig::from_env("alice").unwrap().unwrap();
        assert_eq!(cfg.current_user(), Some("alice"));
        unsafe {
            env::remove_var(CONF_DIR_ENV);
        }
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(SITE_CONFIG_FILE);
        fs::write(&path, SITE).unwrap();
        let cfg = SiteConfig::load(&path).unwrap();
        assert_eq!(cfg.source(), path.display().to_string());
        assert_eq!(cfg.storage_config().volume_name, "ltptest");
    }
}

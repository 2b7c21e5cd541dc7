//! Filesystem URI

use std::fmt;
use url::Url;

use crate::config::SCHEME;
use crate::error::FsError;

/// The `cfs://authority` a filesystem instance is bound to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FsUri {
    authority: String,
}

impl FsUri {
    /// Accepts `cfs://<authority>[/...]`; any path component is dropped.
    pub fn parse(uri: &str) -> Result<Self, FsError> {
        let url = Url::parse(uri.trim()).map_err(|e| FsError::InvalidPath(format!("{}: {}", uri, e)))?;
        if !url.scheme().eq_ignore_ascii_case(SCHEME) {
            return Err(FsError::UnsupportedScheme(uri.to_string()));
        }
        let host = match url.host_str() {
            Some(host) if !host.is_empty() => host,
            _ => {
                return Err(FsError::InvalidPath(format!(
                    "Incomplete CFS URI, no host: {}",
                    uri
                )));
            }
        };
        let authority = match url.port() {
            Some(port) => format!("{}:{}", host, port),
            None => host.to_string(),
        };
        Ok(Self { authority })
    }

    pub fn authority(&self) -> &str {
        &self.authority
    }

    pub fn scheme(&self) -> &'static str {
        SCHEME
    }
}

impl fmt::Display for FsUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}://{}", SCHEME, self.authority)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_strips_path() {
        let uri = FsUri::parse("cfs://ltptest/some/dir").unwrap();
        assert_eq!(uri.to_string(), "cfs://ltptest");
    }

    #[test]
    fn test_parse_keeps_port() {
        let uri = FsUri::parse("cfs://vol:8888").unwrap();
        assert_eq!(uri.authority(), "vol:8888");
    }

    #[test]
    fn test_parse_rejects_other_scheme() {
        assert!(matches!(
            FsUri::parse("hdfs://nn"),
            Err(FsError::UnsupportedScheme(_))
        ));
    }

    #[test]
    fn test_parse_requires_host() {
        assert!(matches!(
            FsUri::parse("cfs:///path"),
            Err(FsError::InvalidPath(_))
        ));
    }
}

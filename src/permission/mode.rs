//! Permission bits

use std::fmt;
use std::str::FromStr;

use crate::config::SiteConfig;
use crate::error::FsError;

/// POSIX-style permission bits (`0o7777` space) as the framework sees them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FsPermission(u16);

impl FsPermission {
    pub const fn new(bits: u16) -> Self {
        Self(bits & 0o7777)
    }

    pub fn bits(&self) -> u16 {
        self.0
    }

    /// Mode word handed to the store.
    pub fn to_mode(&self) -> u32 {
        u32::from(self.0)
    }

    pub fn apply_umask(&self, umask: FsPermission) -> FsPermission {
        FsPermission(apply_umask(self.0, umask.0))
    }
}

impl From<u16> for FsPermission {
    fn from(bits: u16) -> Self {
        FsPermission::new(bits)
    }
}

/// Parses octal notation, with or without a leading zero.
impl FromStr for FsPermission {
    type Err = FsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s.trim();
        let digits = digits.strip_prefix("0o").unwrap_or(digits);
        match u16::from_str_radix(digits, 8) {
            Ok(bits) if !digits.is_empty() && bits <= 0o7777 => Ok(FsPermission(bits)),
            _ => Err(FsError::InvalidPermission(s.to_string())),
        }
    }
}

/// Symbolic form, e.g. `rwxr-xr-x`.
impl fmt::Display for FsPermission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let bits = self.0;
        let special = [(0o4000, 6), (0o2000, 3), (0o1000, 0)];
        let mut out = String::with_capacity(9);
        for shift in [6u16, 3, 0] {
            let triple = (bits >> shift) & 0o7;
            out.push(if triple & 0o4 != 0 { 'r' } else { '-' });
            out.push(if triple & 0o2 != 0 { 'w' } else { '-' });
            let exec = triple & 0o1 != 0;
            let setid = special
                .iter()
                .any(|(flag, at)| *at == shift && bits & flag != 0);
            out.push(match (setid, exec, shift) {
                (true, true, 0) => 't',
                (true, false, 0) => 'T',
                (true, true, _) => 's',
                (true, false, _) => 'S',
                (false, true, _) => 'x',
                (false, false, _) => '-',
            });
        }
        f.write_str(&out)
    }
}

/// Clears every bit of `requested` that is set in `umask`.
pub fn apply_umask(requested: u16, umask: u16) -> u16 {
    requested & !umask
}

pub fn umask(config: &SiteConfig) -> FsPermission {
    FsPermission::new(config.umask())
}

pub fn default_file_mode(config: &SiteConfig) -> FsPermission {
    FsPermission::new(config.file_default_permission())
}

pub fn default_dir_mode(config: &SiteConfig) -> FsPermission {
    FsPermission::new(config.dir_default_permission())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_umask() {
        assert_eq!(apply_umask(0o777, 0o022), 0o755);
        assert_eq!(apply_umask(0o666, 0o022), 0o644);
        assert_eq!(apply_umask(0o644, 0o000), 0o644);
    }

    #[test]
    fn test_apply_umask_clears_all_masked_bits() {
        for umask in [0o000u16, 0o002, 0o022, 0o027, 0o077, 0o777] {
            for mode in (0u16..=0o777).step_by(7) {
                assert_eq!(apply_umask(mode, umask) & umask, 0);
            }
        }
    }

    #[test]
    fn test_parse_octal() {
        assert_eq!("755".parse::<FsPermission>().unwrap().bits(), 0o755);
        assert_eq!("0644".parse::<FsPermission>().unwrap().bits(), 0o644);
        assert!(matches!(
            "rwx".parse::<FsPermission>(),
            Err(FsError::InvalidPermission(s)) if s == "rwx"
        ));
        assert!("".parse::<FsPermission>().is_err());
        assert!("17777".parse::<FsPermission>().is_err());
    }

    #[test]
    fn test_symbolic_display() {
        assert_eq!(FsPermission::new(0o755).to_string(), "rwxr-xr-x");
        assert_eq!(FsPermission::new(0o640).to_string(), "rw-r-----");
        assert_eq!(FsPermission::new(0o1777).to_string(), "rwxrwxrwt");
    }

    #[test]
    fn test_new_masks_type_bits() {
        assert_eq!(FsPermission::new(0o100644 as u16).bits(), 0o644);
    }
}

use bitflags::bitflags;

bitflags! {
    /// Create flags accepted by `create_non_recursive`.
    ///
    /// Only `CREATE` and `CREATE | OVERWRITE` are honored.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct CreateFlags: u32 {
        const CREATE = 1 << 0;
        const OVERWRITE = 1 << 1;
        const APPEND = 1 << 2;
        const SYNC_BLOCK = 1 << 3;
        const LAZY_PERSIST = 1 << 4;
        const NEW_BLOCK = 1 << 5;
        const NO_LOCAL_WRITE = 1 << 6;
    }
}

/// What `create_non_recursive` should do for a flag set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CreateMode {
    Create,
    CreateOrOverwrite,
}

impl CreateFlags {
    pub(crate) fn create_mode(self) -> Option<CreateMode> {
        if self == CreateFlags::CREATE {
            Some(CreateMode::Create)
        } else if self == CreateFlags::CREATE | CreateFlags::OVERWRITE {
            Some(CreateMode::CreateOrOverwrite)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepted_sets() {
        assert_eq!(CreateFlags::CREATE.create_mode(), Some(CreateMode::Create));
        assert_eq!(
            (CreateFlags::CREATE | CreateFlags::OVERWRITE).create_mode(),
            Some(CreateMode::CreateOrOverwrite)
        );
    }

    #[test]
    fn test_rejected_sets() {
        assert_eq!(CreateFlags::empty().create_mode(), None);
        assert_eq!(CreateFlags::OVERWRITE.create_mode(), None);
        assert_eq!((CreateFlags::CREATE | CreateFlags::APPEND).create_mode(), None);
        assert_eq!(
            (CreateFlags::CREATE | CreateFlags::OVERWRITE | CreateFlags::SYNC_BLOCK).create_mode(),
            None
        );
    }
}

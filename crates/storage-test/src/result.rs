use core::fmt;

/// Name reported for a raw result code that doesn't match any [`ResultCode`].
pub const UNKNOWN_RESULT_NAME: &str = "UNKNOWN ERROR CODE";

/// Outcome of a filesystem operation. Discriminants match the FatFs `FRESULT`
/// numbering so raw codes coming from a C driver convert without a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ResultCode {
    Ok = 0,
    /// A hard error occurred in the low level disk I/O layer.
    DiskError = 1,
    /// Assertion failed inside the filesystem driver.
    InternalError = 2,
    /// The physical drive cannot work.
    NotReady = 3,
    NoFile = 4,
    NoPath = 5,
    InvalidName = 6,
    /// Access denied due to prohibited access or directory full.
    Denied = 7,
    Exists = 8,
    /// The file or directory object is invalid.
    InvalidObject = 9,
    WriteProtected = 10,
    InvalidDrive = 11,
    /// The volume has no work area.
    NotEnabled = 12,
    /// There is no valid FAT volume.
    NoFilesystem = 13,
    MkfsAborted = 14,
    /// Could not get a grant to access the volume within the defined period.
    Timeout = 15,
    /// The operation is rejected according to the file sharing policy.
    Locked = 16,
    NotEnoughCore = 17,
    TooManyOpenFiles = 18,
    InvalidParameter = 19,
}

impl ResultCode {
    /// Every result code, in numeric order. This is the name table: each entry
    /// appears exactly once.
    pub const ALL: [Self; 20] = [
        Self::Ok,
        Self::DiskError,
        Self::InternalError,
        Self::NotReady,
        Self::NoFile,
        Self::NoPath,
        Self::InvalidName,
        Self::Denied,
        Self::Exists,
        Self::InvalidObject,
        Self::WriteProtected,
        Self::InvalidDrive,
        Self::NotEnabled,
        Self::NoFilesystem,
        Self::MkfsAborted,
        Self::Timeout,
        Self::Locked,
        Self::NotEnoughCore,
        Self::TooManyOpenFiles,
        Self::InvalidParameter,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            Self::Ok => "FR_OK",
            Self::DiskError => "FR_DISK_ERR",
            Self::InternalError => "FR_INT_ERR",
            Self::NotReady => "FR_NOT_READY",
            Self::NoFile => "FR_NO_FILE",
            Self::NoPath => "FR_NO_PATH",
            Self::InvalidName => "FR_INVALID_NAME",
            Self::Denied => "FR_DENIED",
            Self::Exists => "FR_EXIST",
            Self::InvalidObject => "FR_INVALID_OBJECT",
            Self::WriteProtected => "FR_WRITE_PROTECTED",
            Self::InvalidDrive => "FR_INVALID_DRIVE",
            Self::NotEnabled => "FR_NOT_ENABLED",
            Self::NoFilesystem => "FR_NO_FILESYSTEM",
            Self::MkfsAborted => "FR_MKFS_ABORTED",
            Self::Timeout => "FR_TIMEOUT",
            Self::Locked => "FR_LOCKED",
            Self::NotEnoughCore => "FR_NOT_ENOUGH_CORE",
            Self::TooManyOpenFiles => "FR_TOO_MANY_OPEN_FILES",
            Self::InvalidParameter => "FR_INVALID_PARAMETER",
        }
    }

    pub const fn as_raw(self) -> u8 {
        self as u8
    }

    pub fn from_raw(raw: u8) -> Option<Self> {
        Self::ALL.get(usize::from(raw)).copied()
    }

    pub const fn is_ok(self) -> bool {
        matches!(self, Self::Ok)
    }
}

impl fmt::Display for ResultCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl core::error::Error for ResultCode {}

/// Diagnostic name of a result code.
pub const fn name_of(code: ResultCode) -> &'static str {
    code.name()
}

/// Diagnostic name of a raw numeric result code. Codes outside the known set
/// map to [`UNKNOWN_RESULT_NAME`].
pub fn name_of_raw(raw: u8) -> &'static str {
    ResultCode::from_raw(raw).map_or(UNKNOWN_RESULT_NAME, ResultCode::name)
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::collections::HashSet;

    use proptest::prelude::*;

    #[test]
    fn every_code_has_its_registered_name() {
        let expected = [
            (ResultCode::Ok, "FR_OK"),
            (ResultCode::DiskError, "FR_DISK_ERR"),
            (ResultCode::InternalError, "FR_INT_ERR"),
            (ResultCode::NotReady, "FR_NOT_READY"),
            (ResultCode::NoFile, "FR_NO_FILE"),
            (ResultCode::NoPath, "FR_NO_PATH"),
            (ResultCode::InvalidName, "FR_INVALID_NAME"),
            (ResultCode::Denied, "FR_DENIED"),
            (ResultCode::Exists, "FR_EXIST"),
            (ResultCode::InvalidObject, "FR_INVALID_OBJECT"),
            (ResultCode::WriteProtected, "FR_WRITE_PROTECTED"),
            (ResultCode::InvalidDrive, "FR_INVALID_DRIVE"),
            (ResultCode::NotEnabled, "FR_NOT_ENABLED"),
            (ResultCode::NoFilesystem, "FR_NO_FILESYSTEM"),
            (ResultCode::MkfsAborted, "FR_MKFS_ABORTED"),
            (ResultCode::Timeout, "FR_TIMEOUT"),
            (ResultCode::Locked, "FR_LOCKED"),
            (ResultCode::NotEnoughCore, "FR_NOT_ENOUGH_CORE"),
            (ResultCode::TooManyOpenFiles, "FR_TOO_MANY_OPEN_FILES"),
            (ResultCode::InvalidParameter, "FR_INVALID_PARAMETER"),
        ];
        assert_eq!(expected.len(), ResultCode::ALL.len());

        for (code, name) in expected {
            assert_eq!(name_of(code), name);
            assert_eq!(name_of_raw(code.as_raw()), name);
            assert_eq!(code.to_string(), name);
        }
    }

    #[test]
    fn table_is_ordered_and_unique() {
        for (i, code) in ResultCode::ALL.iter().enumerate() {
            assert_eq!(usize::from(code.as_raw()), i);
        }

        let names: HashSet<&str> = ResultCode::ALL.iter().map(|c| c.name()).collect();
        assert_eq!(names.len(), ResultCode::ALL.len());
        assert!(!names.contains(UNKNOWN_RESULT_NAME));
    }

    #[test]
    fn unknown_raw_codes() {
        assert_eq!(ResultCode::from_raw(20), None);
        assert_eq!(name_of_raw(20), UNKNOWN_RESULT_NAME);
        assert_eq!(name_of_raw(0xff), UNKNOWN_RESULT_NAME);
    }

    #[test]
    fn only_ok_is_ok() {
        for code in ResultCode::ALL {
            assert_eq!(code.is_ok(), code == ResultCode::Ok);
        }
    }

    proptest! {
        #[test]
        fn name_of_raw_is_total(raw: u8) {
            let name = name_of_raw(raw);
            match ResultCode::from_raw(raw) {
                Some(code) => {
                    prop_assert_eq!(code.as_raw(), raw);
                    prop_assert_eq!(name, code.name());
                }
                None => {
                    prop_assert!(raw >= 20);
                    prop_assert_eq!(name, UNKNOWN_RESULT_NAME);
                }
            }
        }
    }
}

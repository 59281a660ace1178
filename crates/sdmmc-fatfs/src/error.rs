use core::fmt::Debug;

use embedded_sdmmc::Error;
use storage_test::ResultCode;

/// Translates an `embedded-sdmmc` error into the FatFs result code closest in
/// meaning. Errors from the block device itself are translated by the device's
/// own error type.
pub fn result_code<E>(err: Error<E>) -> ResultCode
where
    E: Debug + Into<ResultCode>,
{
    match err {
        Error::DeviceError(device_err) => device_err.into(),
        Error::FormatError(reason) => {
            log::debug!("sdmmc: not a FAT volume: {reason}");
            ResultCode::NoFilesystem
        }
        Error::NoSuchVolume => ResultCode::InvalidDrive,
        Error::FilenameError(_) => ResultCode::InvalidName,
        Error::TooManyOpenVolumes | Error::TooManyOpenDirs | Error::TooManyOpenFiles => {
            ResultCode::TooManyOpenFiles
        }
        Error::BadHandle => ResultCode::InvalidObject,
        Error::NotFound => ResultCode::NoFile,
        Error::FileAlreadyOpen | Error::DirAlreadyOpen => ResultCode::Locked,
        Error::FileAlreadyExists => ResultCode::Exists,
        Error::ReadOnly => ResultCode::Denied,
        other => {
            log::debug!("sdmmc: unexpected error: {other:?}");
            ResultCode::InternalError
        }
    }
}

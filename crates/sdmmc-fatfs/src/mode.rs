use embedded_sdmmc::Mode;
use storage_test::{OpenMode, ResultCode};

/// Picks the `embedded-sdmmc` mode for a set of FatFs-style open flags.
///
/// `embedded-sdmmc` can't open a file for writing at offset zero without
/// truncating it, so plain `WRITE` and `OPEN_ALWAYS` both open at the end of
/// the file. Creating a file without `WRITE` has no equivalent and is rejected
/// with `InvalidParameter`, as is asking for neither read nor write access.
pub fn sdmmc_mode(mode: OpenMode) -> Result<Mode, ResultCode> {
    if !mode.intersects(OpenMode::READ | OpenMode::WRITE) {
        return Err(ResultCode::InvalidParameter);
    }

    let creates = OpenMode::CREATE_NEW | OpenMode::CREATE_ALWAYS | OpenMode::OPEN_ALWAYS;
    if !mode.contains(OpenMode::WRITE) {
        if mode.intersects(creates) {
            return Err(ResultCode::InvalidParameter);
        }
        return Ok(Mode::ReadOnly);
    }

    // OPEN_APPEND includes the OPEN_ALWAYS bit, so check it first.
    let mode = if mode.contains(OpenMode::OPEN_APPEND) || mode.contains(OpenMode::OPEN_ALWAYS) {
        Mode::ReadWriteCreateOrAppend
    } else if mode.contains(OpenMode::CREATE_ALWAYS) {
        Mode::ReadWriteCreateOrTruncate
    } else if mode.contains(OpenMode::CREATE_NEW) {
        Mode::ReadWriteCreate
    } else {
        Mode::ReadWriteAppend
    };
    Ok(mode)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn storage_test_modes() {
        assert!(matches!(
            sdmmc_mode(OpenMode::WRITE | OpenMode::CREATE_ALWAYS),
            Ok(Mode::ReadWriteCreateOrTruncate)
        ));
        assert!(matches!(sdmmc_mode(OpenMode::READ), Ok(Mode::ReadOnly)));
    }

    #[test]
    fn other_dispositions() {
        assert!(matches!(
            sdmmc_mode(OpenMode::READ | OpenMode::WRITE | OpenMode::CREATE_NEW),
            Ok(Mode::ReadWriteCreate)
        ));
        assert!(matches!(
            sdmmc_mode(OpenMode::WRITE | OpenMode::OPEN_APPEND),
            Ok(Mode::ReadWriteCreateOrAppend)
        ));
        assert!(matches!(
            sdmmc_mode(OpenMode::WRITE | OpenMode::OPEN_ALWAYS),
            Ok(Mode::ReadWriteCreateOrAppend)
        ));
        assert!(matches!(sdmmc_mode(OpenMode::WRITE), Ok(Mode::ReadWriteAppend)));
    }

    #[test]
    fn unsupported_combinations() {
        assert_eq!(
            sdmmc_mode(OpenMode::empty()).err(),
            Some(ResultCode::InvalidParameter)
        );
        assert_eq!(
            sdmmc_mode(OpenMode::CREATE_ALWAYS).err(),
            Some(ResultCode::InvalidParameter)
        );
        assert_eq!(
            sdmmc_mode(OpenMode::READ | OpenMode::CREATE_NEW).err(),
            Some(ResultCode::InvalidParameter)
        );
    }
}

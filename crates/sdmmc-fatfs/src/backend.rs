use core::fmt::Debug;

use embedded_sdmmc::{BlockDevice, RawDirectory, RawFile, TimeSource, VolumeIdx, VolumeManager};
use storage_test::{FatFs, OpenMode, ResultCode, VolumeId};

use crate::{result_code, sdmmc_mode};

/// [`FatFs`] over an `embedded-sdmmc` volume manager.
///
/// Mounting opens the volume and its root directory and keeps both open for
/// the rest of the program. File paths are short (8.3) names in the root
/// directory.
pub struct SdmmcFatFs<D, T>
where
    D: BlockDevice,
    T: TimeSource,
{
    volume_mgr: VolumeManager<D, T>,
    root_dir: Option<RawDirectory>,
}

impl<D, T> SdmmcFatFs<D, T>
where
    D: BlockDevice,
    D::Error: Into<ResultCode>,
    T: TimeSource,
{
    pub fn new(block_device: D, time_source: T) -> Self {
        Self {
            volume_mgr: VolumeManager::new(block_device, time_source),
            root_dir: None,
        }
    }

    pub fn is_mounted(&self) -> bool {
        self.root_dir.is_some()
    }
}

impl<D, T> Debug for SdmmcFatFs<D, T>
where
    D: BlockDevice,
    T: TimeSource,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SdmmcFatFs")
            .field("mounted", &self.root_dir.is_some())
            .finish_non_exhaustive()
    }
}

impl<D, T> FatFs for SdmmcFatFs<D, T>
where
    D: BlockDevice,
    D::Error: Into<ResultCode>,
    T: TimeSource,
{
    type File = RawFile;

    fn mount(&mut self, volume: VolumeId) -> Result<(), ResultCode> {
        if self.root_dir.is_some() {
            return Ok(());
        }

        let raw_volume = self
            .volume_mgr
            .open_raw_volume(VolumeIdx(usize::from(volume.0)))
            .map_err(result_code)?;
        let root_dir = match self.volume_mgr.open_root_dir(raw_volume) {
            Ok(dir) => dir,
            Err(err) => {
                let _ = self.volume_mgr.close_volume(raw_volume);
                return Err(result_code(err));
            }
        };
        log::info!("sdmmc: mounted volume {}", volume.0);
        self.root_dir = Some(root_dir);
        Ok(())
    }

    fn open(&mut self, path: &str, mode: OpenMode) -> Result<RawFile, ResultCode> {
        // Same as FatFs: no registered volume, no file.
        let root_dir = self.root_dir.ok_or(ResultCode::NotEnabled)?;
        let mode = sdmmc_mode(mode)?;
        self.volume_mgr
            .open_file_in_dir(root_dir, path, mode)
            .map_err(result_code)
    }

    fn write(&mut self, file: &mut RawFile, data: &[u8]) -> Result<usize, ResultCode> {
        self.volume_mgr.write(*file, data).map_err(result_code)?;
        Ok(data.len())
    }

    fn read(&mut self, file: &mut RawFile, buf: &mut [u8]) -> Result<usize, ResultCode> {
        self.volume_mgr.read(*file, buf).map_err(result_code)
    }

    fn close(&mut self, file: RawFile) -> Result<(), ResultCode> {
        self.volume_mgr.close_file(file).map_err(result_code)
    }
}

//! In-memory stand-in for a FAT filesystem, with injectable failures and a log
//! of every call it receives.

use std::collections::HashMap;

use crate::{FatFs, OpenMode, ResultCode, VolumeId};

/// A call as the simulation saw it. Used both for the call log and as the key
/// for injected failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum Call {
    Mount,
    Open(OpenMode),
    Write,
    /// Carries the size of the buffer handed to `read`.
    Read(usize),
    Close,
}

#[derive(Debug)]
pub(crate) struct SimFile {
    name: String,
    position: usize,
}

#[derive(Debug, Default)]
pub(crate) struct SimFatFs {
    files: HashMap<String, Vec<u8>>,
    failures: HashMap<Call, ResultCode>,
    calls: Vec<Call>,
    write_limit: Option<usize>,
    read_count_override: Option<usize>,
}

impl SimFatFs {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn insert(&mut self, name: &str, contents: &[u8]) {
        self.files.insert(name.to_owned(), contents.to_vec());
    }

    pub(crate) fn contents(&self, name: &str) -> Option<&[u8]> {
        self.files.get(name).map(Vec::as_slice)
    }

    /// Makes every call matching `call` fail with `code`.
    pub(crate) fn fail(&mut self, call: Call, code: ResultCode) {
        self.failures.insert(call, code);
    }

    /// Accept at most `limit` bytes per write, like a nearly full volume.
    pub(crate) fn limit_writes(&mut self, limit: usize) {
        self.write_limit = Some(limit);
    }

    /// Report `count` from every successful read, whatever was copied.
    pub(crate) fn overstate_reads(&mut self, count: usize) {
        self.read_count_override = Some(count);
    }

    pub(crate) fn calls(&self) -> &[Call] {
        &self.calls
    }

    fn record(&mut self, call: Call) -> Result<(), ResultCode> {
        self.calls.push(call);
        self.failures.get(&call).map_or(Ok(()), |&code| Err(code))
    }
}

impl FatFs for SimFatFs {
    type File = SimFile;

    fn mount(&mut self, _volume: VolumeId) -> Result<(), ResultCode> {
        self.record(Call::Mount)
    }

    fn open(&mut self, path: &str, mode: OpenMode) -> Result<SimFile, ResultCode> {
        self.record(Call::Open(mode))?;

        if mode.contains(OpenMode::CREATE_ALWAYS) {
            self.files.insert(path.to_owned(), Vec::new());
        } else if !self.files.contains_key(path) {
            return Err(ResultCode::NoFile);
        }
        Ok(SimFile {
            name: path.to_owned(),
            position: 0,
        })
    }

    fn write(&mut self, file: &mut SimFile, data: &[u8]) -> Result<usize, ResultCode> {
        self.record(Call::Write)?;

        let len = self.write_limit.map_or(data.len(), |limit| data.len().min(limit));
        let contents = self.files.get_mut(&file.name).ok_or(ResultCode::InvalidObject)?;
        contents.truncate(file.position);
        contents.extend_from_slice(&data[..len]);
        file.position += len;
        Ok(len)
    }

    fn read(&mut self, file: &mut SimFile, buf: &mut [u8]) -> Result<usize, ResultCode> {
        self.record(Call::Read(buf.len()))?;

        let contents = self.files.get(&file.name).ok_or(ResultCode::InvalidObject)?;
        let remaining = &contents[file.position.min(contents.len())..];
        let len = remaining.len().min(buf.len());
        buf[..len].copy_from_slice(&remaining[..len]);
        file.position += len;
        Ok(self.read_count_override.unwrap_or(len))
    }

    fn close(&mut self, _file: SimFile) -> Result<(), ResultCode> {
        self.record(Call::Close)
    }
}

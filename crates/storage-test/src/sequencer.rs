//! The storage test itself: mount, write a file, read it back, and report each
//! step on the console.
//!
//! A failing step never stops the test. Every outcome gets its own console
//! line and the test moves on to the next step with whatever state it has.
//! The one thing it won't do is hand the filesystem a file handle that was
//! never opened: a write, read or close on a file whose open failed is
//! reported as `FR_INVALID_OBJECT` (what FatFs answers for an unopened file
//! object) without calling the backend.

use core::fmt::{self, Write};

use crate::{FatFs, OpenMode, ResultCode, ScratchBuffer, SequenceConfig, SCRATCH_CAPACITY};

/// Filesystem operations of the storage test, in the order they run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Mount,
    OpenForWrite,
    Write,
    CloseAfterWrite,
    OpenForRead,
    Read,
    CloseAfterRead,
}

impl Step {
    pub const COUNT: usize = 7;

    pub const ALL: [Self; Self::COUNT] = [
        Self::Mount,
        Self::OpenForWrite,
        Self::Write,
        Self::CloseAfterWrite,
        Self::OpenForRead,
        Self::Read,
        Self::CloseAfterRead,
    ];

    /// Name of the operation as printed in console error lines.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Mount => "f_mount",
            Self::OpenForWrite | Self::OpenForRead => "f_open",
            Self::Write => "f_write",
            Self::CloseAfterWrite | Self::CloseAfterRead => "f_close",
            Self::Read => "f_read",
        }
    }

    const fn index(self) -> usize {
        self as usize
    }
}

/// Where the storage test is. A failed step doesn't get its own state; the
/// failure is recorded in the [`SequenceReport`] and the test moves on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    Idle,
    Mounted,
    Creating,
    Writing,
    WriteClosed,
    Opening,
    Reading,
    ReadClosed,
    Done,
}

/// Result of one step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepOutcome {
    pub step: Step,
    pub code: ResultCode,
    /// `false` when the step was reported without calling the filesystem,
    /// because it needed a file that was never opened.
    pub issued: bool,
}

impl StepOutcome {
    const fn pending(step: Step) -> Self {
        Self {
            step,
            code: ResultCode::Ok,
            issued: false,
        }
    }
}

/// Everything the storage test observed, for callers that want more than the
/// console lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequenceReport {
    pub outcomes: [StepOutcome; Step::COUNT],
    pub bytes_written: usize,
    pub bytes_read: usize,
    pub state: State,
}

impl SequenceReport {
    pub fn outcome(&self, step: Step) -> StepOutcome {
        self.outcomes[step.index()]
    }

    pub fn failures(&self) -> usize {
        self.outcomes.iter().filter(|o| !o.code.is_ok()).count()
    }

    pub fn all_ok(&self) -> bool {
        self.failures() == 0
    }
}

/// Runs the storage test once against a filesystem, printing to a console.
///
/// `N` is the scratch buffer capacity; read-back fetches at most `N - 1`
/// bytes.
#[derive(Debug)]
pub struct Sequencer<F, const N: usize = SCRATCH_CAPACITY> {
    fs: F,
    config: SequenceConfig,
    scratch: ScratchBuffer<N>,
    state: State,
    outcomes: [StepOutcome; Step::COUNT],
}

impl<F: FatFs, const N: usize> Sequencer<F, N> {
    pub fn new(fs: F, config: SequenceConfig) -> Self {
        Self {
            fs,
            config,
            scratch: ScratchBuffer::new(),
            state: State::Idle,
            outcomes: Step::ALL.map(StepOutcome::pending),
        }
    }

    pub fn state(&self) -> State {
        self.state
    }

    /// The last read-back.
    pub fn scratch(&self) -> &ScratchBuffer<N> {
        &self.scratch
    }

    pub fn filesystem(&self) -> &F {
        &self.fs
    }

    pub fn into_filesystem(self) -> F {
        self.fs
    }

    /// Runs every step, top to bottom. Only a console write failure ends this
    /// early.
    pub fn run<W: Write>(&mut self, console: &mut W) -> Result<SequenceReport, fmt::Error> {
        let config = self.config;

        let result = self.fs.mount(config.volume);
        self.finish(Step::Mount, result.err(), true, console)?;
        self.transition(State::Mounted);

        self.transition(State::Creating);
        let file = self.open(Step::OpenForWrite, OpenMode::WRITE | OpenMode::CREATE_ALWAYS, console)?;

        self.transition(State::Writing);
        let (file, bytes_written) = self.write(file, config.payload, console)?;
        writeln!(console, "{bytes_written} characters written")?;
        self.close(Step::CloseAfterWrite, file, console)?;
        self.transition(State::WriteClosed);

        self.transition(State::Opening);
        let file = self.open(Step::OpenForRead, OpenMode::READ, console)?;

        self.transition(State::Reading);
        let (file, bytes_read) = self.read(file, console)?;
        writeln!(console, "{bytes_read} characters read")?;
        writeln!(console, "{}", self.scratch.as_text())?;
        self.close(Step::CloseAfterRead, file, console)?;
        self.transition(State::ReadClosed);

        self.transition(State::Done);
        let report = SequenceReport {
            outcomes: self.outcomes,
            bytes_written,
            bytes_read,
            state: self.state,
        };
        writeln!(
            console,
            "storage test done: {} of {} operations failed",
            report.failures(),
            Step::COUNT
        )?;
        Ok(report)
    }

    fn open<W: Write>(
        &mut self,
        step: Step,
        mode: OpenMode,
        console: &mut W,
    ) -> Result<Option<F::File>, fmt::Error> {
        match self.fs.open(self.config.file_name, mode) {
            Ok(file) => {
                self.finish(step, None, true, console)?;
                Ok(Some(file))
            }
            Err(code) => {
                self.finish(step, Some(code), true, console)?;
                Ok(None)
            }
        }
    }

    fn write<W: Write>(
        &mut self,
        file: Option<F::File>,
        payload: &[u8],
        console: &mut W,
    ) -> Result<(Option<F::File>, usize), fmt::Error> {
        let Some(mut file) = file else {
            self.finish(Step::Write, Some(ResultCode::InvalidObject), false, console)?;
            return Ok((None, 0));
        };

        let (written, err) = match self.fs.write(&mut file, payload) {
            Ok(written) => (written.min(payload.len()), None),
            Err(code) => (0, Some(code)),
        };
        self.finish(Step::Write, err, true, console)?;
        Ok((Some(file), written))
    }

    fn read<W: Write>(
        &mut self,
        file: Option<F::File>,
        console: &mut W,
    ) -> Result<(Option<F::File>, usize), fmt::Error> {
        let Some(mut file) = file else {
            self.scratch.clear();
            self.finish(Step::Read, Some(ResultCode::InvalidObject), false, console)?;
            return Ok((None, 0));
        };

        let (count, err) = match self.fs.read(&mut file, self.scratch.read_window()) {
            Ok(count) => (count, None),
            Err(code) => (0, Some(code)),
        };
        // The backend may claim more than the window it was given.
        let count = self.scratch.terminate(count);
        self.finish(Step::Read, err, true, console)?;
        Ok((Some(file), count))
    }

    fn close<W: Write>(
        &mut self,
        step: Step,
        file: Option<F::File>,
        console: &mut W,
    ) -> Result<(), fmt::Error> {
        match file {
            Some(file) => {
                let result = self.fs.close(file);
                self.finish(step, result.err(), true, console)
            }
            None => self.finish(step, Some(ResultCode::InvalidObject), false, console),
        }
    }

    /// Records a step's outcome and prints its error line if it failed.
    fn finish<W: Write>(
        &mut self,
        step: Step,
        err: Option<ResultCode>,
        issued: bool,
        console: &mut W,
    ) -> Result<(), fmt::Error> {
        let code = err.unwrap_or(ResultCode::Ok);
        self.outcomes[step.index()] = StepOutcome { step, code, issued };

        if code.is_ok() {
            return Ok(());
        }
        if issued {
            log::warn!("storage test: {step:?} failed with {code}");
        } else {
            log::warn!("storage test: {step:?} skipped, no open file");
        }
        writeln!(console, "{} error: {}", step.label(), code.name())
    }

    fn transition(&mut self, next: State) {
        log::debug!("storage test: {:?} -> {next:?}", self.state);
        self.state = next;
    }
}

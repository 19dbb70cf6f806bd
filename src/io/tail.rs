// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Poll a growing file and deliver newly appended bytes.
//!
//! [`TailSession`] remembers the file's identity and a read offset. Each
//! poll re-stats the path:
//! - a different identity, or a size below the offset, means the file was
//!   rotated or truncated: reopen and start again from offset 0
//! - a size above the offset means new bytes: read up to one chunk
//! - otherwise nothing happened
//!
//! [`TailSession::run`] sleeps between polls that delivered nothing and
//! polls again immediately after a successful read, so a backlog drains at
//! disk speed. Only successful reads count as activity for the optional
//! inactivity timeout.

use std::fs::{self, File};
use std::io::{Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::identity::FileIdentity;
use crate::{ReadoutError, Result};

/// Default maximum bytes per read.
pub const DEFAULT_READ_CHUNK_SIZE: usize = 1 << 20;

/// Default sleep between idle polls.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Where reading starts when the file is first opened.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StartPosition {
    /// Deliver the existing contents first.
    #[default]
    Beginning,
    /// Skip existing contents; deliver only what is appended later.
    End,
}

/// Tail reader configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TailOptions {
    /// Maximum bytes read per poll
    pub read_chunk_size: usize,
    /// Sleep between polls that found nothing to read
    pub poll_interval: Duration,
    /// Stop after this long without a successful read; `None` runs forever
    pub inactivity_timeout: Option<Duration>,
    /// Initial read offset
    pub start: StartPosition,
}

impl Default for TailOptions {
    fn default() -> Self {
        Self {
            read_chunk_size: DEFAULT_READ_CHUNK_SIZE,
            poll_interval: DEFAULT_POLL_INTERVAL,
            inactivity_timeout: None,
            start: StartPosition::Beginning,
        }
    }
}

impl TailOptions {
    pub fn with_read_chunk_size(mut self, bytes: usize) -> Self {
        self.read_chunk_size = bytes;
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// A zero duration disables the timeout.
    pub fn with_inactivity_timeout(mut self, timeout: Duration) -> Self {
        self.inactivity_timeout = Some(timeout);
        self
    }

    pub fn with_start(mut self, start: StartPosition) -> Self {
        self.start = start;
        self
    }

    /// Replace unusable values: zero chunk size and zero poll interval fall
    /// back to the defaults, a zero timeout means no timeout.
    pub fn normalized(mut self) -> Self {
        if self.read_chunk_size == 0 {
            self.read_chunk_size = DEFAULT_READ_CHUNK_SIZE;
        }
        if self.poll_interval.is_zero() {
            self.poll_interval = DEFAULT_POLL_INTERVAL;
        }
        if self.inactivity_timeout.is_some_and(|t| t.is_zero()) {
            self.inactivity_timeout = None;
        }
        self
    }
}

/// Where a [`TailSession`] is in its polling cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TailState {
    /// The file has not been opened yet
    Opening,
    /// Waiting for the file to grow
    Polling,
    /// Reading newly appended bytes
    Reading,
    /// The file was rotated or truncated and must be reopened
    Reopening,
    /// Terminal
    Stopped,
}

/// Outcome of one [`TailSession::poll_once`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TailEvent {
    /// The file was opened for the first time.
    Opened,
    /// Nothing to deliver; the caller should sleep before polling again.
    Idle,
    /// This many bytes were handed to the sink.
    Delivered(usize),
    /// The file was rotated or truncated and has been reopened at offset 0.
    Reopened,
    /// The session is stopped; further polls do nothing.
    Stopped,
}

/// Receives the bytes read by a [`TailSession`].
pub trait TailSink {
    /// Newly appended bytes, in file order.
    fn on_bytes(&mut self, bytes: &[u8]);

    /// The file was replaced or truncated; following bytes start a new file.
    fn on_rotate(&mut self) {}
}

impl<F> TailSink for F
where
    F: FnMut(&[u8]),
{
    fn on_bytes(&mut self, bytes: &[u8]) {
        self(bytes)
    }
}

/// Counters for one tail session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TailStats {
    /// Bytes handed to the sink
    pub bytes_delivered: u64,
    /// Successful non-empty reads
    pub reads: u64,
    /// Rotations and truncations handled
    pub reopens: u64,
    /// Poll iterations
    pub polls: u64,
}

/// Follows one path as it grows, across rotation and truncation.
#[derive(Debug)]
pub struct TailSession {
    path: PathBuf,
    options: TailOptions,
    state: TailState,
    file: Option<File>,
    identity: Option<FileIdentity>,
    offset: u64,
    last_activity: Instant,
    buf: Vec<u8>,
    stats: TailStats,
}

impl TailSession {
    /// Create a session in the `Opening` state without touching the file.
    ///
    /// Open failures are retried on every poll.
    pub fn new(path: impl Into<PathBuf>, options: TailOptions) -> Self {
        Self {
            path: path.into(),
            options: options.normalized(),
            state: TailState::Opening,
            file: None,
            identity: None,
            offset: 0,
            last_activity: Instant::now(),
            buf: Vec::new(),
            stats: TailStats::default(),
        }
    }

    /// Create a session and open the file immediately.
    ///
    /// # Errors
    ///
    /// Returns [`ReadoutError::OpenFailure`] if the path cannot be opened.
    pub fn open(path: impl Into<PathBuf>, options: TailOptions) -> Result<Self> {
        let mut session = Self::new(path, options);
        session.try_open()?;
        Ok(session)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn options(&self) -> &TailOptions {
        &self.options
    }

    pub fn state(&self) -> TailState {
        self.state
    }

    /// Offset of the next byte to read.
    pub fn offset(&self) -> u64 {
        self.offset
    }

    pub fn identity(&self) -> Option<FileIdentity> {
        self.identity
    }

    pub fn stats(&self) -> TailStats {
        self.stats
    }

    /// Time since the last successful read (or since the session started).
    pub fn idle_for(&self) -> Duration {
        self.last_activity.elapsed()
    }

    /// Move to `Stopped`. Further polls return [`TailEvent::Stopped`].
    pub fn stop(&mut self) {
        if self.state != TailState::Stopped {
            info!(path = %self.path.display(), offset = self.offset, "Tail session stopped");
            self.state = TailState::Stopped;
        }
    }

    fn try_open(&mut self) -> Result<()> {
        let file = File::open(&self.path)
            .map_err(|e| ReadoutError::open_failure(self.path.clone(), e))?;
        let meta = file.metadata()?;

        self.offset = match self.options.start {
            StartPosition::Beginning => 0,
            StartPosition::End => meta.len(),
        };
        self.identity = Some(FileIdentity::from_metadata(&meta));
        self.file = Some(file);
        self.state = TailState::Polling;

        info!(
            path = %self.path.display(),
            size = meta.len(),
            offset = self.offset,
            "Tailing file"
        );
        Ok(())
    }

    /// Run one iteration of the state machine.
    ///
    /// Never sleeps. I/O failures are logged and reported as
    /// [`TailEvent::Idle`] so the caller retries on its polling cadence.
    pub fn poll_once<S: TailSink + ?Sized>(&mut self, sink: &mut S) -> TailEvent {
        match self.state {
            TailState::Stopped => return TailEvent::Stopped,
            TailState::Opening => {
                self.stats.polls += 1;
                return match self.try_open() {
                    Ok(()) => TailEvent::Opened,
                    Err(e) => {
                        debug!(error = %e, "Open failed, will retry");
                        self.check_timeout(TailEvent::Idle)
                    }
                };
            }
            TailState::Polling | TailState::Reading | TailState::Reopening => {}
        }

        self.stats.polls += 1;

        let meta = match fs::metadata(&self.path) {
            Ok(meta) => meta,
            Err(e) => {
                debug!(path = %self.path.display(), error = %e, "Stat failed");
                return self.check_timeout(TailEvent::Idle);
            }
        };
        let identity = FileIdentity::from_metadata(&meta);
        let size = meta.len();

        if self.file.is_none() || self.identity != Some(identity) || size < self.offset {
            self.state = TailState::Reopening;
            return self.reopen(size, sink);
        }

        if size > self.offset {
            self.state = TailState::Reading;
            return self.read_available(size, sink);
        }

        self.state = TailState::Polling;
        self.check_timeout(TailEvent::Idle)
    }

    fn reopen<S: TailSink + ?Sized>(&mut self, size: u64, sink: &mut S) -> TailEvent {
        self.file = None;

        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(e) => {
                let err = ReadoutError::reopen_failure(self.path.clone(), e);
                warn!(error = %err, fields = ?err.log_fields(), "Reopen failed, will retry");
                return self.check_timeout(TailEvent::Idle);
            }
        };
        let identity = match file.metadata() {
            Ok(meta) => FileIdentity::from_metadata(&meta),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Stat after reopen failed, will retry");
                return self.check_timeout(TailEvent::Idle);
            }
        };

        warn!(
            path = %self.path.display(),
            old_offset = self.offset,
            new_size = size,
            "File rotated or truncated, reading from start"
        );

        self.file = Some(file);
        self.identity = Some(identity);
        self.offset = 0;
        self.stats.reopens += 1;
        self.state = TailState::Polling;
        sink.on_rotate();

        self.check_timeout(TailEvent::Reopened)
    }

    fn read_available<S: TailSink + ?Sized>(&mut self, size: u64, sink: &mut S) -> TailEvent {
        let available = size - self.offset;
        let to_read = available.min(self.options.read_chunk_size as u64) as usize;
        if self.buf.len() < to_read {
            self.buf.resize(to_read, 0);
        }

        let Some(file) = self.file.as_mut() else {
            self.state = TailState::Reopening;
            return TailEvent::Idle;
        };
        let offset = self.offset;
        let result = file
            .seek(SeekFrom::Start(offset))
            .and_then(|_| file.read(&mut self.buf[..to_read]));

        self.state = TailState::Polling;
        match result {
            Ok(0) => self.check_timeout(TailEvent::Idle),
            Ok(n) => {
                self.offset += n as u64;
                self.last_activity = Instant::now();
                self.stats.reads += 1;
                self.stats.bytes_delivered += n as u64;
                debug!(offset, bytes = n, "Read appended bytes");
                sink.on_bytes(&self.buf[..n]);
                TailEvent::Delivered(n)
            }
            Err(e) => {
                debug!(path = %self.path.display(), offset, error = %e, "Read failed");
                self.check_timeout(TailEvent::Idle)
            }
        }
    }

    fn check_timeout(&mut self, event: TailEvent) -> TailEvent {
        if let Some(timeout) = self.options.inactivity_timeout {
            if self.last_activity.elapsed() > timeout {
                info!(
                    path = %self.path.display(),
                    timeout_ms = timeout.as_millis() as u64,
                    "No new data within inactivity timeout"
                );
                self.stop();
                return TailEvent::Stopped;
            }
        }
        event
    }

    /// Poll until the inactivity timeout fires or `should_stop` returns true.
    ///
    /// `should_stop` is checked once per iteration. Blocks the calling thread
    /// for `poll_interval` after every iteration that delivered nothing.
    pub fn run<S: TailSink + ?Sized>(
        &mut self,
        sink: &mut S,
        mut should_stop: impl FnMut() -> bool,
    ) -> TailStats {
        loop {
            if should_stop() {
                self.stop();
                break;
            }
            match self.poll_once(sink) {
                TailEvent::Stopped => break,
                TailEvent::Idle => thread::sleep(self.options.poll_interval),
                TailEvent::Opened | TailEvent::Delivered(_) | TailEvent::Reopened => {}
            }
        }
        self.stats
    }
}

use super::BYTES_PER_SAMPLE;
use super::io_util::{self, Entry};
use crate::error::{Error, Result};
use crate::types::{Direction, FORMAT_CF32, StreamState};
use num_complex::Complex32;
use std::{fs::File, path::PathBuf};
use tracing::{debug, trace, warn};

pub(crate) fn validate_request(direction: Direction, format: &str, channels: &[usize]) -> Result<()> {
    if direction != Direction::Rx {
        return Err(Error::InvalidDirection(direction));
    }
    if channels.len() > 1 || channels.first().is_some_and(|&ch| ch != 0) {
        return Err(Error::InvalidChannelSelection(channels.to_vec()));
    }
    if format != FORMAT_CF32 {
        return Err(Error::UnsupportedFormat(format.to_string()));
    }
    debug!("Using format {FORMAT_CF32}");
    Ok(())
}

/// Receive stream bound to one named pipe. Owns at most one read descriptor.
#[derive(Debug)]
pub struct FifoStream {
    path: PathBuf,
    file: Option<File>,
    state: StreamState,
    buffer_length: usize,
}

impl FifoStream {
    /// Validates the request and makes sure a pipe exists at `path`.
    pub fn setup(
        path: impl Into<PathBuf>,
        direction: Direction,
        format: &str,
        channels: &[usize],
        buffer_length: usize,
    ) -> Result<Self> {
        validate_request(direction, format, channels)?;
        let path = path.into();
        let entry = io_util::probe_entry(&path).map_err(|source| Error::PipeCreateFailed {
            path: path.clone(),
            source,
        })?;
        match entry {
            Entry::Missing => {
                debug!("Creating fifo at {}", path.display());
                io_util::make_fifo(&path).map_err(|source| Error::PipeCreateFailed {
                    path: path.clone(),
                    source,
                })?;
            }
            Entry::Fifo => debug!("Fifo already exists at {}", path.display()),
            Entry::Other => return Err(Error::NotAPipe(path)),
        }
        Ok(Self {
            path,
            file: None,
            state: StreamState::Configured,
            buffer_length,
        })
    }

    pub fn state(&self) -> StreamState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.file.is_some()
    }

    pub fn mtu(&self) -> usize {
        self.buffer_length / BYTES_PER_SAMPLE
    }

    /// Opens the pipe for reading. Blocks until a writer attaches.
    pub fn activate(&mut self, flags: i32) -> Result<()> {
        if flags != 0 {
            return Err(Error::UnsupportedFlag(flags));
        }
        match self.state {
            StreamState::Activated => return Ok(()),
            StreamState::Configured => {}
            state => {
                return Err(Error::InvalidState {
                    op: "activate",
                    state,
                });
            }
        }
        debug!("Opening: {}", self.path.display());
        let file = io_util::open_reader(&self.path).map_err(|source| Error::OpenFailed {
            path: self.path.clone(),
            source,
        })?;
        self.file = Some(file);
        self.state = StreamState::Activated;
        Ok(())
    }

    /// One blocking read into `buffs[0]`. A trailing partial sample is
    /// dropped from the count.
    pub fn read(
        &mut self,
        buffs: &mut [&mut [Complex32]],
        num_elems: usize,
        timeout_us: i64,
    ) -> Result<usize> {
        let Some(file) = self.file.as_ref() else {
            return Err(Error::InvalidState {
                op: "read",
                state: self.state,
            });
        };
        let Some(buff0) = buffs.first_mut() else {
            return Err(Error::MissingBuffer);
        };
        trace!(num_elems, timeout_us, "read");
        let elems = num_elems.min(buff0.len());
        let dst = unsafe {
            std::slice::from_raw_parts_mut(
                buff0.as_mut_ptr() as *mut u8,
                elems * BYTES_PER_SAMPLE,
            )
        };
        let count = io_util::read_blocking(file, dst).map_err(|source| Error::ReadFailed {
            path: self.path.clone(),
            source,
        })?;
        Ok(count / BYTES_PER_SAMPLE)
    }

    pub fn deactivate(&mut self, flags: i32) -> Result<()> {
        if flags != 0 {
            return Err(Error::UnsupportedFlag(flags));
        }
        if self.state == StreamState::Closed {
            return Err(Error::InvalidState {
                op: "deactivate",
                state: self.state,
            });
        }
        self.release_descriptor();
        self.state = StreamState::Configured;
        Ok(())
    }

    /// Deactivates, then removes the pipe file. The stream ends up closed
    /// even when the unlink fails.
    pub fn close(&mut self) -> Result<()> {
        if self.state == StreamState::Closed {
            return Err(Error::InvalidState {
                op: "close",
                state: self.state,
            });
        }
        self.release_descriptor();
        self.state = StreamState::Closed;
        debug!("Deleting: {}", self.path.display());
        io_util::unlink(&self.path).map_err(|source| Error::UnlinkFailed {
            path: self.path.clone(),
            source,
        })
    }

    fn release_descriptor(&mut self) {
        if let Some(file) = self.file.take() {
            debug!("Closing: {}", self.path.display());
            if let Err(e) = io_util::release(file) {
                warn!("close(\"{}\") failed: {e}", self.path.display());
            }
        }
    }
}

impl Drop for FifoStream {
    fn drop(&mut self) {
        self.release_descriptor();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fifo::DEFAULT_BUFFER_LENGTH;
    use std::path::Path;

    fn scratch() -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fifo");
        (dir, path)
    }

    fn setup(path: &Path) -> FifoStream {
        FifoStream::setup(path, Direction::Rx, FORMAT_CF32, &[0], DEFAULT_BUFFER_LENGTH).unwrap()
    }

    #[test]
    fn rejects_transmit_direction() {
        let (_dir, path) = scratch();
        let err = FifoStream::setup(&path, Direction::Tx, FORMAT_CF32, &[0], 64).unwrap_err();
        assert!(matches!(err, Error::InvalidDirection(Direction::Tx)));
        assert!(!path.exists());
    }

    #[test]
    fn rejects_channels_other_than_zero() {
        let (_dir, path) = scratch();
        for channels in [vec![1], vec![0, 0], vec![0, 1], vec![3, 0]] {
            let err = FifoStream::setup(&path, Direction::Rx, FORMAT_CF32, &channels, 64)
                .unwrap_err();
            assert!(matches!(err, Error::InvalidChannelSelection(ref c) if *c == channels));
        }
        assert!(!path.exists());
    }

    #[test]
    fn rejects_other_formats() {
        let (_dir, path) = scratch();
        for format in ["CS16", "CF64", "cf32", ""] {
            let err = FifoStream::setup(&path, Direction::Rx, format, &[], 64).unwrap_err();
            assert!(matches!(err, Error::UnsupportedFormat(ref f) if f == format));
        }
        assert!(!path.exists());
    }

    #[test]
    fn empty_channel_list_is_channel_zero() {
        let (_dir, path) = scratch();
        let stream = FifoStream::setup(&path, Direction::Rx, FORMAT_CF32, &[], 64).unwrap();
        assert_eq!(stream.state(), StreamState::Configured);
    }

    #[test]
    fn setup_keeps_existing_fifo() {
        let (_dir, path) = scratch();
        io_util::make_fifo(&path).unwrap();
        let mut stream = setup(&path);
        assert_eq!(stream.state(), StreamState::Configured);
        stream.close().unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn setup_refuses_regular_file() {
        let (_dir, path) = scratch();
        std::fs::write(&path, b"not a pipe").unwrap();
        let err = FifoStream::setup(&path, Direction::Rx, FORMAT_CF32, &[0], 64).unwrap_err();
        assert!(matches!(err, Error::NotAPipe(ref p) if *p == path));
        assert!(path.exists());
    }

    #[test]
    fn setup_in_missing_directory_fails() {
        let (dir, _) = scratch();
        let path = dir.path().join("missing").join("fifo");
        let err = FifoStream::setup(&path, Direction::Rx, FORMAT_CF32, &[0], 64).unwrap_err();
        assert!(matches!(err, Error::PipeCreateFailed { .. }));
        assert_eq!(err.raw_os_error(), Some(nix::libc::ENOENT));
    }

    #[test]
    fn deactivate_is_idempotent() {
        let (_dir, path) = scratch();
        let mut stream = setup(&path);
        stream.deactivate(0).unwrap();
        stream.deactivate(0).unwrap();
        assert_eq!(stream.state(), StreamState::Configured);
        assert!(!stream.is_active());
    }

    #[test]
    fn nonzero_flags_are_rejected() {
        let (_dir, path) = scratch();
        let mut stream = setup(&path);
        assert!(matches!(stream.activate(1), Err(Error::UnsupportedFlag(1))));
        assert!(matches!(stream.deactivate(4), Err(Error::UnsupportedFlag(4))));
        assert_eq!(stream.state(), StreamState::Configured);
    }

    #[test]
    fn read_requires_activation() {
        let (_dir, path) = scratch();
        let mut stream = setup(&path);
        let mut buf = vec![Complex32::default(); 4];
        let err = stream.read(&mut [buf.as_mut_slice()], 4, 0).unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidState {
                op: "read",
                state: StreamState::Configured
            }
        ));
    }

    #[test]
    fn closed_stream_is_terminal() {
        let (_dir, path) = scratch();
        let mut stream = setup(&path);
        stream.close().unwrap();
        assert_eq!(stream.state(), StreamState::Closed);
        assert!(matches!(stream.activate(0), Err(Error::InvalidState { .. })));
        assert!(matches!(stream.deactivate(0), Err(Error::InvalidState { .. })));
        assert!(matches!(stream.close(), Err(Error::InvalidState { .. })));
    }

    #[test]
    fn close_reports_missing_pipe() {
        let (_dir, path) = scratch();
        let mut stream = setup(&path);
        std::fs::remove_file(&path).unwrap();
        let err = stream.close().unwrap_err();
        assert!(matches!(err, Error::UnlinkFailed { .. }));
        assert_eq!(err.raw_os_error(), Some(nix::libc::ENOENT));
        assert_eq!(stream.state(), StreamState::Closed);
    }

    #[test]
    fn mtu_is_fixed_in_every_state() {
        let (_dir, path) = scratch();
        let mut stream = setup(&path);
        assert_eq!(stream.mtu(), DEFAULT_BUFFER_LENGTH / 8);
        stream.close().unwrap();
        assert_eq!(stream.mtu(), DEFAULT_BUFFER_LENGTH / 8);
    }
}

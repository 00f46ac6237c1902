use crate::types::Direction;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("FileSDR is RX only, got {0} direction")]
    InvalidDirection(Direction),

    #[error("invalid channel selection {0:?}, only channel 0 exists")]
    InvalidChannelSelection(Vec<usize>),

    #[error("invalid format '{0}', only CF32 is supported")]
    UnsupportedFormat(String),

    #[error("unsupported stream flags {0:#x}")]
    UnsupportedFlag(i32),

    #[error("mkfifo(\"{}\") failed: {}", .path.display(), .source)]
    PipeCreateFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("'{}' exists and is not a named pipe", .0.display())]
    NotAPipe(PathBuf),

    #[error("open(\"{}\") failed: {}", .path.display(), .source)]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("read(\"{}\") failed: {}", .path.display(), .source)]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unlink(\"{}\") failed: {}", .path.display(), .source)]
    UnlinkFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("no buffer given for channel 0")]
    MissingBuffer,

    #[error("unknown setting '{0}'")]
    UnknownSetting(String),

    #[error("a stream is already set up on this device")]
    AlreadyConfigured,

    #[error("cannot {op} a stream in {state} state")]
    InvalidState {
        op: &'static str,
        state: crate::StreamState,
    },

    #[error("no driver registered for '{0}'")]
    UnknownDriver(String),
}

impl Error {
    /// OS error code carried by I/O failures, if any.
    pub fn raw_os_error(&self) -> Option<i32> {
        match self {
            Self::PipeCreateFailed { source, .. }
            | Self::OpenFailed { source, .. }
            | Self::ReadFailed { source, .. }
            | Self::UnlinkFailed { source, .. } => source.raw_os_error(),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

//! Receive-only software radio device that streams CF32 samples out of a
//! named pipe.
//!
//! Every stream call is a direct blocking OS call on the caller's thread.
//! `activate_stream` waits for a writer to open the pipe and `read_stream`
//! waits for data or end of stream; the timeout argument is not enforced.
//! Calls on one device must be serialized by the caller.

pub mod error;
#[cfg(unix)]
pub mod fifo;
pub mod kwargs;
pub mod registry;
pub mod traits;
pub mod types;

pub use error::{Error, Result};
#[cfg(unix)]
pub use fifo::{FifoStream, FileSdr};
pub use kwargs::Kwargs;
pub use num_complex::Complex32;
pub use registry::Registry;
pub use traits::Device;
pub use types::{ArgInfo, ArgType, Direction, FORMAT_CF32, Range, StreamHandle, StreamState};

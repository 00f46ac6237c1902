use serde::{Deserialize, Serialize};
use std::fmt;

/// Complex float32, interleaved I/Q.
pub const FORMAT_CF32: &str = "CF32";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Tx,
    Rx,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tx => write!(f, "TX"),
            Self::Rx => write!(f, "RX"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArgType {
    Bool,
    Int,
    Float,
    String,
}

/// Describes one key a device accepts through settings or stream args.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArgInfo {
    pub key: String,
    pub value: String,
    pub name: String,
    pub description: String,
    pub kind: ArgType,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Range {
    pub minimum: f64,
    pub maximum: f64,
    pub step: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StreamState {
    Unopened,
    Configured,
    Activated,
    Closed,
}

impl fmt::Display for StreamState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Unopened => "unopened",
            Self::Configured => "configured",
            Self::Activated => "activated",
            Self::Closed => "closed",
        };
        f.write_str(name)
    }
}

/// Token returned by `setup_stream`. Only the handle of the device's current
/// stream is accepted by the other stream calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StreamHandle(pub(crate) u64);

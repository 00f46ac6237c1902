mod device;
mod io_util;
mod stream;

pub use self::device::FileSdr;
pub use self::stream::FifoStream;

use crate::kwargs::Kwargs;
use crate::registry::Registry;
use crate::traits::Device;
use tracing::debug;

pub const DRIVER_KEY: &str = "filesdr";
pub const HARDWARE_KEY: &str = "fifo";
pub const ORIGIN: &str = "https://github.com/datashapesai/SoapyFileSDR";
pub const FIFO_SETTING: &str = "fifo";
pub const DEFAULT_FIFO_PATH: &str = "/tmp/file_sdr";
pub const DEFAULT_BUFFER_LENGTH: usize = 16 * 32 * 512;
pub const BYTES_PER_SAMPLE: usize = 8;
pub const FULL_SCALE: f64 = 2147483648.0;

pub fn find(args: &Kwargs) -> Vec<Kwargs> {
    debug!("FileSDR inspecting {args}");
    let mut info = Kwargs::new();
    info.insert("label", DRIVER_KEY);
    vec![info]
}

pub fn make(args: &Kwargs) -> crate::Result<Box<dyn Device>> {
    Ok(Box::new(FileSdr::new(args)))
}

pub fn register(registry: &mut Registry) {
    registry.register(DRIVER_KEY, find, make);
}

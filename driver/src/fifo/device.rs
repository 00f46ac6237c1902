use super::{
    BYTES_PER_SAMPLE, DEFAULT_BUFFER_LENGTH, DEFAULT_FIFO_PATH, DRIVER_KEY, FIFO_SETTING,
    FULL_SCALE, FifoStream, HARDWARE_KEY, ORIGIN,
};
use crate::error::{Error, Result};
use crate::kwargs::Kwargs;
use crate::traits::Device;
use crate::types::{ArgInfo, ArgType, Direction, FORMAT_CF32, Range, StreamHandle, StreamState};
use num_complex::Complex32;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

#[derive(Debug)]
pub struct FileSdr {
    fifo_path: PathBuf,
    sample_rate: f64,
    center_frequency: f64,
    buffer_length: usize,
    stream: Option<FifoStream>,
    last_stream_id: u64,
}

impl FileSdr {
    /// Only the `fifo` key is used; no filesystem access happens here.
    pub fn new(args: &Kwargs) -> Self {
        let mut sdr = Self {
            fifo_path: PathBuf::from(DEFAULT_FIFO_PATH),
            sample_rate: 0.0,
            center_frequency: 0.0,
            buffer_length: DEFAULT_BUFFER_LENGTH,
            stream: None,
            last_stream_id: 0,
        };
        if let Some(path) = args.get(FIFO_SETTING) {
            sdr.write_setting(FIFO_SETTING, path);
        }
        debug!("FileSDR using named pipe at {}", sdr.fifo_path.display());
        sdr
    }

    pub fn fifo_path(&self) -> &Path {
        &self.fifo_path
    }

    pub fn stream_state(&self) -> StreamState {
        self.stream
            .as_ref()
            .map_or(StreamState::Unopened, FifoStream::state)
    }

    pub fn apply_setting(&mut self, key: &str, value: &str) -> Result<()> {
        if key != FIFO_SETTING {
            return Err(Error::UnknownSetting(key.to_string()));
        }
        self.fifo_path = PathBuf::from(value);
        debug!("FileSDR input fifo path: {value}");
        Ok(())
    }

    fn stream_for(&mut self, handle: StreamHandle, op: &'static str) -> Result<&mut FifoStream> {
        let current = handle.0 == self.last_stream_id;
        let state = self.handle_state(handle);
        match self.stream.as_mut() {
            Some(stream) if current => Ok(stream),
            _ => Err(Error::InvalidState { op, state }),
        }
    }

    fn handle_state(&self, handle: StreamHandle) -> StreamState {
        if handle.0 == 0 || handle.0 > self.last_stream_id {
            StreamState::Unopened
        } else {
            StreamState::Closed
        }
    }

    fn is_frequency_name(name: &str) -> bool {
        name == "RF" || name.is_empty()
    }

    fn require_rx(direction: Direction) -> Result<()> {
        if direction != Direction::Rx {
            return Err(Error::InvalidDirection(direction));
        }
        Ok(())
    }
}

impl Default for FileSdr {
    fn default() -> Self {
        Self::new(&Kwargs::new())
    }
}

impl Device for FileSdr {
    fn driver_key(&self) -> String {
        DRIVER_KEY.to_string()
    }

    fn hardware_key(&self) -> String {
        HARDWARE_KEY.to_string()
    }

    fn hardware_info(&self) -> Kwargs {
        let mut info = Kwargs::new();
        info.insert("origin", ORIGIN);
        info.insert("fifo", self.fifo_path.to_string_lossy());
        info
    }

    fn num_channels(&self, direction: Direction) -> usize {
        usize::from(direction == Direction::Rx)
    }

    fn full_duplex(&self, _direction: Direction, _channel: usize) -> bool {
        false
    }

    fn set_frequency(
        &mut self,
        _direction: Direction,
        _channel: usize,
        name: &str,
        frequency: f64,
        _args: &Kwargs,
    ) {
        if Self::is_frequency_name(name) {
            debug!("Setting center freq: {frequency}");
            self.center_frequency = frequency;
        }
    }

    fn frequency(&self, _direction: Direction, _channel: usize, name: &str) -> f64 {
        if Self::is_frequency_name(name) {
            self.center_frequency
        } else {
            0.0
        }
    }

    fn list_frequencies(&self, _direction: Direction, _channel: usize) -> Vec<String> {
        vec!["RF".to_string()]
    }

    fn frequency_range(&self, _direction: Direction, _channel: usize, _name: &str) -> Vec<Range> {
        Vec::new()
    }

    fn frequency_args_info(&self, _direction: Direction, _channel: usize) -> Vec<ArgInfo> {
        Vec::new()
    }

    fn set_sample_rate(&mut self, _direction: Direction, _channel: usize, rate: f64) {
        self.sample_rate = rate;
        debug!("Setting sample rate: {rate}");
    }

    fn sample_rate(&self, _direction: Direction, _channel: usize) -> f64 {
        self.sample_rate
    }

    fn list_sample_rates(&self, _direction: Direction, _channel: usize) -> Vec<f64> {
        Vec::new()
    }

    fn sample_rate_range(&self, _direction: Direction, _channel: usize) -> Vec<Range> {
        Vec::new()
    }

    fn setting_info(&self) -> Vec<ArgInfo> {
        vec![ArgInfo {
            key: FIFO_SETTING.to_string(),
            value: DEFAULT_FIFO_PATH.to_string(),
            name: "Named pipe".to_string(),
            description: "Path of the named pipe accepting cf32_le bytes.".to_string(),
            kind: ArgType::String,
        }]
    }

    fn write_setting(&mut self, key: &str, value: &str) {
        if let Err(e) = self.apply_setting(key, value) {
            warn!("{e}");
        }
    }

    fn read_setting(&self, key: &str) -> String {
        if key == FIFO_SETTING {
            return self.fifo_path.to_string_lossy().into_owned();
        }
        warn!("{}", Error::UnknownSetting(key.to_string()));
        String::new()
    }

    fn stream_formats(&self, _direction: Direction, _channel: usize) -> Vec<String> {
        vec![FORMAT_CF32.to_string()]
    }

    fn native_stream_format(&self, direction: Direction, _channel: usize) -> Result<(String, f64)> {
        Self::require_rx(direction)?;
        Ok((FORMAT_CF32.to_string(), FULL_SCALE))
    }

    fn stream_args_info(&self, direction: Direction, _channel: usize) -> Result<Vec<ArgInfo>> {
        Self::require_rx(direction)?;
        Ok(Vec::new())
    }

    fn setup_stream(
        &mut self,
        direction: Direction,
        format: &str,
        channels: &[usize],
        _args: &Kwargs,
    ) -> Result<StreamHandle> {
        if self.stream.is_some() {
            return Err(Error::AlreadyConfigured);
        }
        let stream = FifoStream::setup(
            self.fifo_path.clone(),
            direction,
            format,
            channels,
            self.buffer_length,
        )?;
        self.stream = Some(stream);
        self.last_stream_id += 1;
        Ok(StreamHandle(self.last_stream_id))
    }

    fn close_stream(&mut self, stream: StreamHandle) -> Result<()> {
        self.stream_for(stream, "close")?;
        match self.stream.take() {
            Some(mut fifo) => fifo.close(),
            None => Ok(()),
        }
    }

    fn stream_mtu(&self, _stream: StreamHandle) -> usize {
        self.buffer_length / BYTES_PER_SAMPLE
    }

    fn activate_stream(
        &mut self,
        stream: StreamHandle,
        flags: i32,
        _time_ns: i64,
        _num_elems: usize,
    ) -> Result<()> {
        self.stream_for(stream, "activate")?.activate(flags)
    }

    fn deactivate_stream(&mut self, stream: StreamHandle, flags: i32, _time_ns: i64) -> Result<()> {
        self.stream_for(stream, "deactivate")?.deactivate(flags)
    }

    fn read_stream(
        &mut self,
        stream: StreamHandle,
        buffs: &mut [&mut [Complex32]],
        num_elems: usize,
        timeout_us: i64,
    ) -> Result<usize> {
        self.stream_for(stream, "read")?
            .read(buffs, num_elems, timeout_us)
    }
}

use crate::error::Result;
use crate::kwargs::Kwargs;
use crate::types::{ArgInfo, Direction, Range, StreamHandle};
use num_complex::Complex32;

pub trait Device {
    fn driver_key(&self) -> String;
    fn hardware_key(&self) -> String;
    fn hardware_info(&self) -> Kwargs;

    fn num_channels(&self, direction: Direction) -> usize;
    fn full_duplex(&self, direction: Direction, channel: usize) -> bool;

    fn set_frequency(
        &mut self,
        direction: Direction,
        channel: usize,
        name: &str,
        frequency: f64,
        args: &Kwargs,
    );
    fn frequency(&self, direction: Direction, channel: usize, name: &str) -> f64;
    fn list_frequencies(&self, direction: Direction, channel: usize) -> Vec<String>;
    fn frequency_range(&self, direction: Direction, channel: usize, name: &str) -> Vec<Range>;
    fn frequency_args_info(&self, direction: Direction, channel: usize) -> Vec<ArgInfo>;

    fn set_sample_rate(&mut self, direction: Direction, channel: usize, rate: f64);
    fn sample_rate(&self, direction: Direction, channel: usize) -> f64;
    fn list_sample_rates(&self, direction: Direction, channel: usize) -> Vec<f64>;
    fn sample_rate_range(&self, direction: Direction, channel: usize) -> Vec<Range>;

    fn setting_info(&self) -> Vec<ArgInfo>;
    fn write_setting(&mut self, key: &str, value: &str);
    fn read_setting(&self, key: &str) -> String;

    fn stream_formats(&self, direction: Direction, channel: usize) -> Vec<String>;
    /// Native wire format and its full-scale amplitude.
    fn native_stream_format(&self, direction: Direction, channel: usize) -> Result<(String, f64)>;
    fn stream_args_info(&self, direction: Direction, channel: usize) -> Result<Vec<ArgInfo>>;

    fn setup_stream(
        &mut self,
        direction: Direction,
        format: &str,
        channels: &[usize],
        args: &Kwargs,
    ) -> Result<StreamHandle>;
    fn close_stream(&mut self, stream: StreamHandle) -> Result<()>;
    fn stream_mtu(&self, stream: StreamHandle) -> usize;
    fn activate_stream(&mut self, stream: StreamHandle, flags: i32, time_ns: i64, num_elems: usize)
        -> Result<()>;
    fn deactivate_stream(&mut self, stream: StreamHandle, flags: i32, time_ns: i64) -> Result<()>;
    /// Reads up to `num_elems` samples into `buffs[0]`; returns whole samples
    /// read, 0 at end of stream.
    fn read_stream(
        &mut self,
        stream: StreamHandle,
        buffs: &mut [&mut [Complex32]],
        num_elems: usize,
        timeout_us: i64,
    ) -> Result<usize>;
}

use filesdr_driver::{ArgInfo, Complex32, Device, Direction, FORMAT_CF32, Kwargs};
use serde::Serialize;
use std::fmt::Write;
use tracing::{debug, error};

#[derive(Debug, Clone, Serialize)]
pub struct ProbeReport {
    pub driver: String,
    pub hardware: String,
    pub hardware_info: Kwargs,
    pub rx_channels: usize,
    pub tx_channels: usize,
    pub full_duplex: bool,
    pub formats: Vec<String>,
    pub native_format: String,
    pub full_scale: f64,
    pub frequencies: Vec<String>,
    pub frequency: f64,
    pub sample_rate: f64,
    pub stream_args: Vec<ArgInfo>,
    pub settings: Vec<ArgInfo>,
}

impl ProbeReport {
    pub fn collect(device: &dyn Device) -> Result<Self, String> {
        let (native_format, full_scale) = device
            .native_stream_format(Direction::Rx, 0)
            .map_err(|e| e.to_string())?;
        Ok(Self {
            driver: device.driver_key(),
            hardware: device.hardware_key(),
            hardware_info: device.hardware_info(),
            rx_channels: device.num_channels(Direction::Rx),
            tx_channels: device.num_channels(Direction::Tx),
            full_duplex: device.full_duplex(Direction::Rx, 0),
            formats: device.stream_formats(Direction::Rx, 0),
            native_format,
            full_scale,
            frequencies: device.list_frequencies(Direction::Rx, 0),
            frequency: device.frequency(Direction::Rx, 0, "RF"),
            sample_rate: device.sample_rate(Direction::Rx, 0),
            stream_args: device
                .stream_args_info(Direction::Rx, 0)
                .map_err(|e| e.to_string())?,
            settings: device.setting_info(),
        })
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "driver={}", self.driver);
        let _ = writeln!(out, "hardware={}", self.hardware);
        for (key, value) in self.hardware_info.iter() {
            let _ = writeln!(out, "  {key}={value}");
        }
        let _ = writeln!(
            out,
            "channels: {} rx, {} tx, full duplex: {}",
            self.rx_channels,
            self.tx_channels,
            if self.full_duplex { "yes" } else { "no" }
        );
        let _ = writeln!(out, "stream formats: {}", self.formats.join(", "));
        let _ = writeln!(
            out,
            "native format: {} [full-scale={}]",
            self.native_format, self.full_scale
        );
        let _ = writeln!(out, "frequencies: {}", self.frequencies.join(", "));
        let _ = writeln!(out, "center frequency: {} Hz", self.frequency);
        let _ = writeln!(out, "sample rate: {} S/s", self.sample_rate);
        if !self.settings.is_empty() {
            let _ = writeln!(out, "settings:");
            for info in &self.settings {
                let _ = writeln!(
                    out,
                    "  * {} ({}) [key={}, default={}]",
                    info.name, info.description, info.key, info.value
                );
            }
        }
        out
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CaptureStats {
    pub mtu: usize,
    pub reads: usize,
    pub samples: usize,
    pub mean_power: f64,
    pub peak: f32,
    pub end_of_stream: bool,
}

impl CaptureStats {
    fn accumulate(&mut self, chunk: &[Complex32]) {
        let before = self.samples as f64;
        let mut sum = 0.0_f64;
        for s in chunk {
            let power = s.norm_sqr();
            sum += power as f64;
            let mag = power.sqrt();
            if mag > self.peak {
                self.peak = mag;
            }
        }
        self.samples += chunk.len();
        if self.samples > 0 {
            self.mean_power = (self.mean_power * before + sum) / self.samples as f64;
        }
        self.reads += 1;
    }

    pub fn render(&self) -> String {
        format!(
            "read {} samples in {} reads (mtu {}), mean power {:.6}, peak {:.6}{}",
            self.samples,
            self.reads,
            self.mtu,
            self.mean_power,
            self.peak,
            if self.end_of_stream {
                ", writer closed"
            } else {
                ""
            }
        )
    }
}

/// Reads `count` samples, or until the writer closes. The stream is closed on
/// every path; the first error wins.
pub fn capture(device: &mut dyn Device, count: usize) -> Result<CaptureStats, String> {
    let stream = device
        .setup_stream(Direction::Rx, FORMAT_CF32, &[0], &Kwargs::new())
        .map_err(|e| e.to_string())?;
    let mtu = device.stream_mtu(stream);
    let mut stats = CaptureStats {
        mtu,
        ..Default::default()
    };

    let mut run = || -> Result<(), String> {
        debug!("waiting for a writer");
        device
            .activate_stream(stream, 0, 0, 0)
            .map_err(|e| e.to_string())?;
        let mut buf = vec![Complex32::default(); mtu];
        while stats.samples < count {
            let want = (count - stats.samples).min(mtu);
            let n = device
                .read_stream(stream, &mut [buf.as_mut_slice()], want, 0)
                .map_err(|e| e.to_string())?;
            if n == 0 {
                stats.end_of_stream = true;
                break;
            }
            stats.accumulate(&buf[..n]);
        }
        device
            .deactivate_stream(stream, 0, 0)
            .map_err(|e| e.to_string())
    };
    let result = run();

    let closed = device.close_stream(stream).map_err(|e| e.to_string());
    if let Err(e) = &closed {
        error!("{e}");
    }
    result.and(closed).map(|_| stats)
}

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::fmt::Write as _;

use crate::codec::{decode_sample, encode_frame, SAMPLE_MAX};
use crate::core::PacketGeometry;
use crate::error::CodecError;

/// Periodic event marker injected on one channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventInjection {
    pub channel: usize,
    pub code: u8,
    /// Emit on every `every`-th frame
    pub every: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulatedDeviceConfig {
    pub geometry: PacketGeometry,
    pub sample_rate: f64,
    /// Fraction of full scale for the sine component
    pub amplitude: f64,
    /// Peak-to-peak noise as a fraction of full scale
    pub noise: f64,
    pub event: Option<EventInjection>,
    /// Skip every `n`-th frame so the counter jumps
    pub drop_every: Option<u64>,
    pub seed: Option<u64>,
}

impl Default for SimulatedDeviceConfig {
    fn default() -> Self {
        Self {
            geometry: PacketGeometry::EIGHT_CHANNEL,
            sample_rate: 250.0,
            amplitude: 0.5,
            noise: 0.1,
            event: None,
            drop_every: None,
            seed: None,
        }
    }
}

/// Stand-in for the acquisition hardware.
///
/// Produces binary packets with a wrapping counter, or CSV text lines in
/// the shape the text client sends.
pub struct SimulatedDevice {
    config: SimulatedDeviceConfig,
    rng: StdRng,
    frames_generated: u64,
    line_time: f64,
}

impl SimulatedDevice {
    pub fn new(config: SimulatedDeviceConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            config,
            rng,
            frames_generated: 0,
            line_time: 0.0,
        }
    }

    pub fn geometry(&self) -> PacketGeometry {
        self.config.geometry
    }

    fn noise(&mut self) -> f64 {
        (self.rng.gen::<f64>() - 0.5) * self.config.noise
    }

    /// Next packet to put on the wire
    pub fn next_frame(&mut self) -> Result<Vec<u8>, CodecError> {
        if let Some(every) = self.config.drop_every.filter(|n| *n > 0) {
            if (self.frames_generated + 1) % every == 0 {
                self.frames_generated += 1;
            }
        }

        let frame_number = self.frames_generated;
        self.frames_generated += 1;

        let t = frame_number as f64 / self.config.sample_rate;
        let full_scale = f64::from(SAMPLE_MAX);
        let mut samples = Vec::with_capacity(self.config.geometry.channel_count);
        for channel in 0..self.config.geometry.channel_count {
            let base = (2.0 * PI * (channel as f64 + 1.0) * t).sin() * self.config.amplitude;
            let value = ((base + self.noise()) * full_scale).clamp(-full_scale, full_scale);
            samples.push(value as i32);
        }

        if let Some(event) = self.config.event {
            if event.every > 0 && frame_number % event.every == 0 && event.channel < samples.len() {
                samples[event.channel] = decode_sample([event.code, 0, 0]);
            }
        }

        encode_frame(self.config.geometry, frame_number as u8, &samples)
    }

    /// `count` packets back to back, as a capture file would hold them
    pub fn capture(&mut self, count: usize) -> Result<Vec<u8>, CodecError> {
        let mut bytes = Vec::with_capacity(count * self.config.geometry.packet_size());
        for _ in 0..count {
            bytes.extend_from_slice(&self.next_frame()?);
        }
        Ok(bytes)
    }

    /// One newline-terminated CSV line, `samples_per_channel` rounds of
    /// every channel
    pub fn next_line(&mut self, samples_per_channel: usize) -> String {
        let channels = self.config.geometry.channel_count;
        let mut line = String::with_capacity(samples_per_channel * channels * 8);

        for s in 0..samples_per_channel {
            for c in 0..channels {
                let base = (self.line_time * (c as f64 + 1.0) * 0.1 + s as f64 / 20.0).sin();
                let value = base + self.noise();
                if !line.is_empty() {
                    line.push(',');
                }
                let _ = write!(line, "{:.4}", value);
            }
        }
        line.push('\n');

        self.line_time += 0.1;
        line
    }
}

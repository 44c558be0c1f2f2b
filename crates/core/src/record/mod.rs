use std::{path::Path, time::Duration};

use serde::{Deserialize, Serialize};

use crate::{assets::LogoAsset, scene::OverlayScene, Phase, Result};

/// Highest sampling rate a recorder accepts. Faster rates would round the
/// frame interval down to nothing.
pub const MAX_FPS: u32 = 1_000;

/// Configuration options for the recording subsystem.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordingSettings {
    pub fps: u32,
}

impl Default for RecordingSettings {
    fn default() -> Self {
        Self { fps: 25 }
    }
}

/// The overlay as it looked at one sampled instant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameSample {
    pub at_ms: u64,
    pub phase: Phase,
    pub scene: OverlayScene,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FrameTrace {
    pub fps: u32,
    /// The logo the overlay was rendered with, when the host loaded one.
    #[serde(default)]
    pub logo: Option<LogoAsset>,
    pub frames: Vec<FrameSample>,
}

impl FrameTrace {
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}

/// Samples the scene at a fixed frame rate while a host drives the
/// sequencer, producing a [`FrameTrace`].
#[derive(Debug)]
pub struct Recorder {
    settings: RecordingSettings,
    trace: FrameTrace,
    is_recording: bool,
}

impl Default for Recorder {
    fn default() -> Self {
        Self::new(RecordingSettings::default())
    }
}

impl Recorder {
    pub fn new(settings: RecordingSettings) -> Self {
        let fps = settings.fps.clamp(1, MAX_FPS);
        Self {
            settings: RecordingSettings { fps },
            trace: FrameTrace {
                fps,
                logo: None,
                frames: Vec::new(),
            },
            is_recording: false,
        }
    }

    pub fn frame_interval(&self) -> Duration {
        Duration::from_secs(1) / self.settings.fps
    }

    pub fn set_logo(&mut self, logo: LogoAsset) {
        self.trace.logo = Some(logo);
    }

    pub fn start(&mut self) {
        self.is_recording = true;
    }

    pub fn stop(&mut self) {
        self.is_recording = false;
    }

    pub fn is_recording(&self) -> bool {
        self.is_recording
    }

    /// Stores a sample when recording; ignored otherwise.
    pub fn capture(&mut self, at: Duration, phase: Phase, scene: &OverlayScene) {
        if !self.is_recording {
            return;
        }
        self.trace.frames.push(FrameSample {
            at_ms: at.as_millis() as u64,
            phase,
            scene: scene.clone(),
        });
    }

    pub fn trace(&self) -> &FrameTrace {
        &self.trace
    }

    pub fn finish(mut self) -> FrameTrace {
        self.is_recording = false;
        self.trace
    }
}

//! Core library for the now-playing lower-third overlay.
//!
//! The [`PhaseSequencer`] choreographs one fixed graphic (logo, box and three
//! lines of text) through its entrance, reveal, hold and exit phases in
//! response to `play`, `update` and `stop`. It runs on a virtual clock so the
//! embedding host decides how time passes, and it measures text through the
//! [`TextMeasure`] trait so no rendering surface is needed.

pub mod assets;
pub mod command;
pub mod config;
pub mod error;
pub mod measure;
pub mod record;
pub mod render;
pub mod reveal;
pub mod scene;
pub mod sequencer;
pub mod sizing;
pub mod timeline;

pub use assets::{AssetStore, LogoAsset};
pub use command::{AnnouncementRequest, Command, CommandTarget};
pub use config::{LayoutConfig, OverlayConfig, StyleConfig, TextConfig, TimingConfig};
pub use error::{LowerThirdError, Result};
pub use measure::{CharWidthMeasure, TextMeasure};
pub use record::{FrameSample, FrameTrace, Recorder, RecordingSettings, MAX_FPS};
pub use render::{AppliedMutation, RenderGraph};
pub use reveal::{reveal_interval, reveal_units, RevealPlan, RevealState};
pub use scene::{OverlayScene, StagePosition, TextField, VisualMutation};
pub use sequencer::{AnimationCycle, Phase, PhaseSequencer};
pub use sizing::SizeCalculator;
pub use timeline::{PlaybackClock, ScheduledEvent, Scheduler, TimerHandle};

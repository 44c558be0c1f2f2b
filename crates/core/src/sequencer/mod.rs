//! The lower-third state machine.
//!
//! A cycle runs Resetting → Entering → Expanding → Revealing → Holding →
//! Exiting → Idle. Every step is a delayed action on the sequencer's own
//! [`Scheduler`], and every handle the current cycle schedules is kept in its
//! [`AnimationCycle`]. `play`, `update` and `stop` all cancel that whole
//! registry before scheduling anything, so a superseded cycle can never touch
//! the scene again.

use std::{collections::BTreeSet, time::Duration};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{
    assets::{AssetStore, LogoAsset},
    command::{AnnouncementRequest, CommandTarget},
    measure::{CharWidthMeasure, TextMeasure},
    render::RenderGraph,
    reveal::{RevealPlan, RevealState},
    scene::{OverlayScene, StagePosition, TextField, VisualMutation},
    sizing::SizeCalculator,
    timeline::{ScheduledEvent, Scheduler, TimerHandle},
    OverlayConfig,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    #[default]
    Idle,
    Resetting,
    Entering,
    Expanding,
    Revealing,
    Holding,
    Exiting,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CycleAction {
    Enter,
    Expand,
    BeginReveal,
    RevealChar { field: TextField, index: usize },
    FieldComplete(TextField),
    ShimmerOff,
    AutoHide,
    CollapseBox,
    ReverseFlourish,
    RetreatLogo,
    RetreatBox,
    ExitComplete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct CycleTimer {
    generation: u64,
    action: CycleAction,
}

/// The live cycle: its generation, phase, texts and every timer it owns.
#[derive(Debug, Clone, Default)]
pub struct AnimationCycle {
    generation: u64,
    phase: Phase,
    handles: BTreeSet<TimerHandle>,
    label: String,
    artist: String,
    song: String,
    reveal: Option<RevealState>,
    field_widths: [f32; 3],
}

impl AnimationCycle {
    fn new(generation: u64, phase: Phase) -> Self {
        Self {
            generation,
            phase,
            ..Default::default()
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn pending_handles(&self) -> impl Iterator<Item = TimerHandle> + '_ {
        self.handles.iter().copied()
    }

    /// The reveal pass in progress, if any.
    pub fn reveal(&self) -> Option<&RevealState> {
        self.reveal.as_ref()
    }

    /// Width of the widest field revealed so far in this cycle.
    pub fn content_width(&self) -> f32 {
        self.field_widths.iter().copied().fold(0.0, f32::max)
    }

    fn text(&self, field: TextField) -> &str {
        match field {
            TextField::Label => &self.label,
            TextField::Artist => &self.artist,
            TextField::Song => &self.song,
        }
    }
}

/// Owns the overlay scene, its timers and the current cycle.
pub struct PhaseSequencer<M = CharWidthMeasure> {
    config: OverlayConfig,
    sizes: SizeCalculator,
    measure: M,
    scheduler: Scheduler<CycleTimer>,
    render: RenderGraph,
    cycle: AnimationCycle,
    assets: AssetStore,
}

impl PhaseSequencer<CharWidthMeasure> {
    /// Sequencer measuring text with the configured fixed character advance.
    pub fn with_config(config: OverlayConfig) -> Self {
        let measure = CharWidthMeasure::from_layout(&config.layout);
        Self::new(config, measure)
    }
}

impl Default for PhaseSequencer<CharWidthMeasure> {
    fn default() -> Self {
        Self::with_config(OverlayConfig::default())
    }
}

impl<M: TextMeasure> PhaseSequencer<M> {
    pub fn new(config: OverlayConfig, measure: M) -> Self {
        Self {
            sizes: SizeCalculator::from_layout(&config.layout),
            config,
            measure,
            scheduler: Scheduler::new(),
            render: RenderGraph::new(),
            cycle: AnimationCycle::default(),
            assets: AssetStore::new(),
        }
    }

    /// Replaces the scene's mutation history buffer.
    pub fn with_render_graph(mut self, render: RenderGraph) -> Self {
        self.render = render;
        self
    }

    /// Loads the configured logo. Only the first call touches the disk; a
    /// missing file is logged and reported as unavailable.
    pub fn load_logo(&mut self) -> &LogoAsset {
        self.assets.load_logo(&self.config.style.logo_path)
    }

    pub fn logo(&self) -> Option<&LogoAsset> {
        self.assets.logo()
    }

    pub fn config(&self) -> &OverlayConfig {
        &self.config
    }

    pub fn phase(&self) -> Phase {
        self.cycle.phase
    }

    pub fn generation(&self) -> u64 {
        self.cycle.generation
    }

    pub fn cycle(&self) -> &AnimationCycle {
        &self.cycle
    }

    pub fn scene(&self) -> &OverlayScene {
        self.render.scene()
    }

    pub fn render(&self) -> &RenderGraph {
        &self.render
    }

    pub fn now(&self) -> Duration {
        self.scheduler.now()
    }

    /// Timers still queued on the scheduler.
    pub fn pending_timers(&self) -> usize {
        self.scheduler.pending()
    }

    pub fn next_due(&self) -> Option<Duration> {
        self.scheduler.next_due()
    }

    /// Idle with nothing left to fire.
    pub fn is_settled(&self) -> bool {
        self.cycle.phase == Phase::Idle && self.scheduler.pending() == 0
    }

    pub fn advance(&mut self, delta: Duration) {
        let target = self.now() + delta;
        self.advance_to(target);
    }

    /// Fires every action due up to `time`, in order, then moves the clock
    /// to `time`. Actions scheduled while firing run too if they fall due
    /// before `time`.
    pub fn advance_to(&mut self, time: Duration) {
        while let Some(event) = self.scheduler.pop_due(time) {
            self.fire(event);
        }
        self.scheduler.advance_clock_to(time);
    }

    /// Runs the clock forward until nothing is pending. Without further
    /// commands every cycle ends in Idle, so this always returns.
    pub fn run_until_settled(&mut self) {
        while let Some(due) = self.scheduler.next_due() {
            self.advance_to(due);
        }
    }

    fn fire(&mut self, event: ScheduledEvent<CycleTimer>) {
        self.cycle.handles.remove(&event.handle);

        let CycleTimer { generation, action } = event.action;
        if generation != self.cycle.generation {
            debug!(
                generation,
                current = self.cycle.generation,
                ?action,
                "dropping timer from superseded cycle"
            );
            return;
        }

        match action {
            CycleAction::Enter => self.enter(),
            CycleAction::Expand => self.expand(),
            CycleAction::BeginReveal => self.begin_reveal(),
            CycleAction::RevealChar { field, index } => self.reveal_char(field, index),
            CycleAction::FieldComplete(field) => self.field_complete(field),
            CycleAction::ShimmerOff => self.mutate(VisualMutation::LogoShimmer(false)),
            CycleAction::AutoHide => {
                debug!(generation, "hold elapsed, hiding");
                self.hide();
            }
            CycleAction::CollapseBox => self.mutate(VisualMutation::BoxWidth(0.0)),
            CycleAction::ReverseFlourish => self.mutate(VisualMutation::LogoFlourish(false)),
            CycleAction::RetreatLogo => {
                self.mutate(VisualMutation::LogoPosition(StagePosition::OffStage))
            }
            CycleAction::RetreatBox => {
                self.mutate(VisualMutation::BoxPosition(StagePosition::OffStage))
            }
            CycleAction::ExitComplete => self.exit_complete(),
        }
    }

    /// Cancels every timer of the current cycle and opens a new one.
    fn begin_cycle(&mut self, phase: Phase) {
        let handles = std::mem::take(&mut self.cycle.handles);
        let cancelled = handles
            .into_iter()
            .filter(|handle| self.scheduler.cancel(*handle))
            .count();

        let previous = self.cycle.generation;
        if cancelled > 0 {
            debug!(generation = previous, cancelled, "superseded cycle");
        }

        self.cycle = AnimationCycle::new(previous + 1, self.cycle.phase);
        self.set_phase(phase);
    }

    fn schedule(&mut self, delay: Duration, action: CycleAction) {
        let handle = self.scheduler.schedule(
            delay,
            CycleTimer {
                generation: self.cycle.generation,
                action,
            },
        );
        self.cycle.handles.insert(handle);
    }

    fn mutate(&mut self, mutation: VisualMutation) {
        let now = self.scheduler.now();
        self.render.apply(now, self.cycle.generation, mutation);
    }

    fn set_phase(&mut self, phase: Phase) {
        debug!(
            generation = self.cycle.generation,
            from = ?self.cycle.phase,
            to = ?phase,
            at_ms = self.scheduler.now().as_millis() as u64,
            "phase transition"
        );
        self.cycle.phase = phase;
    }

    fn announce(&mut self, request: AnnouncementRequest) {
        self.begin_cycle(Phase::Resetting);

        let text = &self.config.text;
        self.cycle.label = text.label.clone();
        self.cycle.artist = request.artist_or(&text.default_artist).to_string();
        self.cycle.song = request.song_or(&text.default_song).to_string();
        info!(
            generation = self.cycle.generation,
            artist = %self.cycle.artist,
            song = %self.cycle.song,
            "announcing"
        );

        self.mutate(VisualMutation::TextVisible(false));
        for field in TextField::ALL {
            self.mutate(VisualMutation::FieldText {
                field,
                text: String::new(),
            });
        }
        self.mutate(VisualMutation::BoxWidth(0.0));
        self.mutate(VisualMutation::BoxPosition(StagePosition::OffStage));
        self.mutate(VisualMutation::LogoPosition(StagePosition::OffStage));
        self.mutate(VisualMutation::LogoFlourish(false));
        self.mutate(VisualMutation::LogoShimmer(false));

        self.schedule(self.config.timings.entrance_delay(), CycleAction::Enter);
    }

    fn enter(&mut self) {
        self.set_phase(Phase::Entering);
        self.mutate(VisualMutation::BoxPosition(StagePosition::OnStage));
        self.mutate(VisualMutation::LogoPosition(StagePosition::OnStage));
        self.schedule(self.config.timings.expand_delay(), CycleAction::Expand);
    }

    fn expand(&mut self) {
        self.set_phase(Phase::Expanding);
        self.mutate(VisualMutation::BoxWidth(self.sizes.min_width));
        self.mutate(VisualMutation::LogoFlourish(true));
        self.schedule(self.config.timings.reveal_delay(), CycleAction::BeginReveal);
    }

    fn begin_reveal(&mut self) {
        self.set_phase(Phase::Revealing);
        self.mutate(VisualMutation::TextVisible(true));
        self.mutate(VisualMutation::LogoShimmer(true));
        self.schedule(self.config.timings.shimmer_duration(), CycleAction::ShimmerOff);
        self.start_field(TextField::Label);
    }

    fn start_field(&mut self, field: TextField) {
        let state = RevealState::new(field, self.cycle.text(field));
        let timings = &self.config.timings;
        let plan = RevealPlan::new(
            state.len(),
            timings.char_interval(),
            timings.long_text_threshold,
            timings.settle_delay(),
        );
        debug!(
            generation = self.cycle.generation,
            %field,
            chars = plan.units,
            interval_ms = plan.interval.as_millis() as u64,
            "revealing field"
        );

        for index in 0..plan.units {
            self.schedule(plan.char_offset(index), CycleAction::RevealChar { field, index });
        }
        self.schedule(plan.completion_offset(), CycleAction::FieldComplete(field));
        self.cycle.reveal = Some(state);
    }

    fn reveal_char(&mut self, field: TextField, index: usize) {
        let Some(state) = self.cycle.reveal.as_mut() else {
            return;
        };
        let from = state.visible();
        if state.field() != field || !state.reveal_through(index) {
            return;
        }

        for position in from..=index {
            let Some(ch) = self.cycle.reveal.as_ref().and_then(|state| state.unit(position)) else {
                break;
            };
            self.mutate(VisualMutation::AppendChar { field, ch });

            let slot = &mut self.cycle.field_widths[field.index()];
            *slot = self
                .measure
                .appended_width(field, self.render.scene().text(field), *slot, ch);
        }

        let measured = self.cycle.content_width();
        if let Some(width) = self.sizes.grow(self.render.scene().box_width, measured) {
            self.mutate(VisualMutation::BoxWidth(width));
        }
    }

    fn field_complete(&mut self, field: TextField) {
        if let Some(state) = self.cycle.reveal.take() {
            debug!(
                generation = self.cycle.generation,
                %field,
                text = state.visible_text(),
                "field revealed"
            );
        }
        match field.next() {
            Some(next) => self.start_field(next),
            None => {
                self.set_phase(Phase::Holding);
                self.schedule(self.config.timings.hold_duration(), CycleAction::AutoHide);
            }
        }
    }

    /// Shared by `stop` and the auto-hide timer.
    fn hide(&mut self) {
        if self.is_settled() {
            debug!("stop while idle, nothing to hide");
            return;
        }

        self.begin_cycle(Phase::Exiting);
        info!(generation = self.cycle.generation, "hiding");

        self.mutate(VisualMutation::TextVisible(false));
        self.mutate(VisualMutation::LogoShimmer(false));

        let timings = &self.config.timings;
        let steps = [
            (timings.exit_collapse_delay(), CycleAction::CollapseBox),
            (timings.exit_logo_flourish_delay(), CycleAction::ReverseFlourish),
            (timings.exit_logo_retreat_delay(), CycleAction::RetreatLogo),
            (timings.exit_box_retreat_delay(), CycleAction::RetreatBox),
        ];
        let last = steps
            .iter()
            .map(|(delay, _)| *delay)
            .max()
            .unwrap_or_default();

        for (delay, action) in steps {
            self.schedule(delay, action);
        }
        self.schedule(last, CycleAction::ExitComplete);
    }

    fn exit_complete(&mut self) {
        for field in TextField::ALL {
            if !self.render.scene().text(field).is_empty() {
                self.mutate(VisualMutation::FieldText {
                    field,
                    text: String::new(),
                });
            }
        }
        self.set_phase(Phase::Idle);
    }
}

impl<M: TextMeasure> CommandTarget for PhaseSequencer<M> {
    fn play(&mut self, request: AnnouncementRequest) {
        self.announce(request);
    }

    fn update(&mut self, request: AnnouncementRequest) {
        self.announce(request);
    }

    fn stop(&mut self) {
        self.hide();
    }
}

impl<M> std::fmt::Debug for PhaseSequencer<M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PhaseSequencer")
            .field("phase", &self.cycle.phase)
            .field("generation", &self.cycle.generation)
            .field("scheduler", &self.scheduler)
            .finish()
    }
}

#[cfg(test)]
mod tests;

//! Scenario tests for the phase sequencer.
//!
//! All timings below use `OverlayConfig::default()`:
//! entrance 100 ms, expand +700, reveal +700 (text starts at 1500 ms),
//! 45 ms per character, 150 ms settle, 10 s hold, exit over 1100 ms.

use std::time::Duration;

use super::{Phase, PhaseSequencer};
use crate::{
    command::{AnnouncementRequest, Command, CommandTarget},
    measure::TextMeasure,
    record::{Recorder, RecordingSettings},
    render::RenderGraph,
    scene::{StagePosition, TextField, VisualMutation},
    OverlayConfig,
};

const REVEAL_START: u64 = 1_500;
/// "NOW PLAYING:" (12) + "Metallica" (9) + "Enter Sandman" (13), each
/// followed by the settle delay.
const METALLICA_HOLD_AT: u64 = REVEAL_START + (12 * 45 + 150) + (9 * 45 + 150) + (13 * 45 + 150);
const HOLD: u64 = 10_000;
const EXIT: u64 = 1_100;

fn ms(value: u64) -> Duration {
    Duration::from_millis(value)
}

fn metallica() -> AnnouncementRequest {
    AnnouncementRequest::new("Metallica", "Enter Sandman")
}

fn run_to_phase<M: TextMeasure>(sequencer: &mut PhaseSequencer<M>, phase: Phase) {
    while sequencer.phase() != phase {
        let due = sequencer
            .next_due()
            .expect("sequencer stalled before reaching the phase");
        sequencer.advance_to(due);
    }
}

fn assert_registry_consistent<M: TextMeasure>(sequencer: &PhaseSequencer<M>) {
    assert_eq!(
        sequencer.cycle().pending_handles().count(),
        sequencer.pending_timers(),
        "scheduler holds timers the live cycle does not own"
    );
}

#[test]
fn starts_idle_and_at_rest() {
    let sequencer = PhaseSequencer::default();
    assert_eq!(sequencer.phase(), Phase::Idle);
    assert!(sequencer.scene().is_at_rest());
    assert!(sequencer.is_settled());
}

#[test]
fn phases_run_in_order() {
    let mut sequencer = PhaseSequencer::default();
    sequencer.play(metallica());
    assert_eq!(sequencer.phase(), Phase::Resetting);

    sequencer.advance_to(ms(99));
    assert_eq!(sequencer.phase(), Phase::Resetting);
    assert_eq!(sequencer.scene().box_position, StagePosition::OffStage);

    sequencer.advance_to(ms(100));
    assert_eq!(sequencer.phase(), Phase::Entering);
    assert_eq!(sequencer.scene().box_position, StagePosition::OnStage);
    assert_eq!(sequencer.scene().logo_position, StagePosition::OnStage);
    assert!(!sequencer.scene().text_visible);

    sequencer.advance_to(ms(800));
    assert_eq!(sequencer.phase(), Phase::Expanding);
    assert_eq!(sequencer.scene().box_width, 320.0);
    assert!(sequencer.scene().logo_flourish);

    sequencer.advance_to(ms(REVEAL_START));
    assert_eq!(sequencer.phase(), Phase::Revealing);
    assert!(sequencer.scene().text_visible);
    assert!(sequencer.scene().logo_shimmer);
    assert_eq!(sequencer.scene().label, "N");

    sequencer.advance_to(ms(REVEAL_START + 1_200));
    assert!(!sequencer.scene().logo_shimmer);

    sequencer.advance_to(ms(METALLICA_HOLD_AT));
    assert_eq!(sequencer.phase(), Phase::Holding);
    assert_registry_consistent(&sequencer);
}

#[test]
fn metallica_reveals_fully_then_hides_itself() {
    let mut sequencer = PhaseSequencer::default();
    sequencer.play(metallica());

    sequencer.advance_to(ms(METALLICA_HOLD_AT));
    let scene = sequencer.scene();
    assert_eq!(scene.label, "NOW PLAYING:");
    assert_eq!(scene.artist, "Metallica");
    assert_eq!(scene.song, "Enter Sandman");
    assert!(scene.shows_text());

    sequencer.advance_to(ms(METALLICA_HOLD_AT + HOLD - 1));
    assert_eq!(sequencer.phase(), Phase::Holding);
    assert!(sequencer.scene().shows_text());

    sequencer.advance_to(ms(METALLICA_HOLD_AT + HOLD));
    assert_eq!(sequencer.phase(), Phase::Exiting);
    assert!(!sequencer.scene().shows_text());

    sequencer.advance_to(ms(METALLICA_HOLD_AT + HOLD + EXIT));
    assert_eq!(sequencer.phase(), Phase::Idle);
    assert!(sequencer.scene().is_at_rest());
    assert!(sequencer.is_settled());
}

#[test]
fn fields_reveal_one_after_another() {
    let mut sequencer = PhaseSequencer::default();
    sequencer.play(metallica());

    sequencer.advance_to(ms(REVEAL_START + 45));
    assert_eq!(sequencer.scene().label, "NO");
    assert_eq!(sequencer.scene().artist, "");

    let artist_start = REVEAL_START + 12 * 45 + 150;
    sequencer.advance_to(ms(artist_start - 1));
    assert_eq!(sequencer.scene().label, "NOW PLAYING:");
    assert_eq!(sequencer.scene().artist, "");

    sequencer.advance_to(ms(artist_start));
    assert_eq!(sequencer.scene().artist, "M");
    assert_eq!(sequencer.scene().song, "");
    assert_eq!(
        sequencer.cycle().reveal().map(|state| state.field()),
        Some(TextField::Artist)
    );

    let song_start = artist_start + 9 * 45 + 150;
    sequencer.advance_to(ms(song_start - 1));
    assert_eq!(sequencer.scene().artist, "Metallica");
    assert_eq!(sequencer.scene().song, "");

    sequencer.advance_to(ms(song_start));
    assert_eq!(sequencer.scene().song, "E");
}

#[test]
fn missing_fields_use_placeholders() {
    let mut sequencer = PhaseSequencer::default();
    sequencer.play(AnnouncementRequest::default());
    run_to_phase(&mut sequencer, Phase::Holding);

    assert_eq!(sequencer.scene().artist, "Artist Name");
    assert_eq!(sequencer.scene().song, "Song Title");
}

#[test]
fn empty_strings_still_complete() {
    let mut sequencer = PhaseSequencer::default();
    sequencer.play(AnnouncementRequest::new("", ""));
    run_to_phase(&mut sequencer, Phase::Holding);

    assert_eq!(sequencer.now(), ms(REVEAL_START + (12 * 45 + 150) + 150 + 150));
    assert_eq!(sequencer.scene().artist, "");
    assert_eq!(sequencer.scene().song, "");
    assert_eq!(sequencer.scene().box_width, 320.0);
}

#[test]
fn whitespace_only_text_is_kept() {
    let mut sequencer = PhaseSequencer::default();
    sequencer.play(AnnouncementRequest::new("  ", "\t \t"));
    run_to_phase(&mut sequencer, Phase::Holding);

    assert_eq!(sequencer.scene().artist, "  ");
    assert_eq!(sequencer.scene().song, "\t \t");
}

#[test]
fn width_grows_monotonically_within_bounds() {
    let measure = |_: TextField, text: &str| text.chars().count() as f32 * 20.0;
    let mut sequencer = PhaseSequencer::new(OverlayConfig::default(), measure);
    sequencer.play(AnnouncementRequest::new(
        "Nick Cave and the Bad Seeds",
        "The Mercy Seat (Live at the Royal Albert Hall)",
    ));
    sequencer.advance_to(ms(REVEAL_START));

    let mut widths = vec![sequencer.scene().box_width];
    while sequencer.phase() == Phase::Revealing {
        sequencer.advance(ms(5));
        widths.push(sequencer.scene().box_width);
    }

    assert_eq!(sequencer.phase(), Phase::Holding);
    assert!(widths.windows(2).all(|pair| pair[0] <= pair[1]), "{widths:?}");
    assert!(widths.iter().all(|width| (320.0..=1_200.0).contains(width)));
    // The 46-character title is the widest field: 46 * 20 px plus 40 px padding.
    assert_eq!(widths.last().copied(), Some(960.0));
    assert_eq!(sequencer.cycle().content_width(), 920.0);
}

#[test]
fn long_text_is_clamped_and_revealed_twice_as_fast() {
    let song = "x".repeat(150);
    let mut sequencer = PhaseSequencer::default();
    sequencer.play(AnnouncementRequest::new("Metallica", song.clone()));
    run_to_phase(&mut sequencer, Phase::Holding);

    let song_start = REVEAL_START + (12 * 45 + 150) + (9 * 45 + 150);
    let expected = ms(song_start) + Duration::from_micros(150 * 22_500) + ms(150);
    assert_eq!(sequencer.now(), expected);
    assert_eq!(sequencer.scene().song, song);
    assert_eq!(sequencer.scene().box_width, 1_200.0);
}

#[test]
fn very_long_title_reveals_one_character_per_step() {
    let song = "x".repeat(20_000);
    let mut sequencer =
        PhaseSequencer::default().with_render_graph(RenderGraph::with_history_limit(100_000));
    sequencer.play(AnnouncementRequest::new("Metallica", song.clone()));
    run_to_phase(&mut sequencer, Phase::Holding);

    assert_eq!(sequencer.scene().song, song);
    assert_eq!(sequencer.scene().box_width, 1_200.0);
    assert_eq!(sequencer.cycle().content_width(), 20_000.0 * 14.0);

    let song_steps: Vec<_> = sequencer
        .render()
        .history()
        .filter_map(|entry| match &entry.mutation {
            VisualMutation::AppendChar { field: TextField::Song, ch } => Some(*ch),
            VisualMutation::FieldText { field: TextField::Song, text } if !text.is_empty() => {
                panic!("song rewritten wholesale with {} chars", text.len())
            }
            _ => None,
        })
        .collect();
    assert_eq!(song_steps.len(), 20_000);
    assert!(song_steps.iter().all(|ch| *ch == 'x'));
}

#[test]
fn missing_logo_still_runs_a_full_cycle() {
    let mut config = OverlayConfig::default();
    config.style.logo_path = "definitely/not/here.png".to_string();
    let mut sequencer = PhaseSequencer::with_config(config);
    assert!(!sequencer.load_logo().available);

    let mut recorder = Recorder::new(RecordingSettings { fps: 25 });
    if let Some(logo) = sequencer.logo() {
        recorder.set_logo(logo.clone());
    }
    recorder.start();

    sequencer.play(metallica());
    let frame = recorder.frame_interval();
    let mut at = Duration::ZERO;
    while !sequencer.is_settled() {
        sequencer.advance_to(at);
        recorder.capture(at, sequencer.phase(), sequencer.scene());
        at += frame;
    }

    let trace = recorder.finish();
    let logo = trace.logo.as_ref().expect("trace records the logo");
    assert!(!logo.available);
    assert_eq!(logo.path.to_str(), Some("definitely/not/here.png"));

    let holding = trace
        .frames
        .iter()
        .find(|sample| sample.phase == Phase::Holding)
        .expect("cycle reached holding");
    assert_eq!(holding.scene.artist, "Metallica");
    assert_eq!(holding.scene.song, "Enter Sandman");
    assert_eq!(holding.scene.logo_position, StagePosition::OnStage);
    assert!(trace.frames.last().is_some_and(|sample| sample.scene.is_at_rest()));
    assert!(at >= ms(METALLICA_HOLD_AT + HOLD + EXIT));
}

#[test]
fn play_resets_synchronously() {
    let mut sequencer = PhaseSequencer::default();
    sequencer.play(metallica());
    sequencer.advance_to(ms(3_000));
    assert!(sequencer.scene().shows_text());

    sequencer.play(AnnouncementRequest::new("Slayer", "Raining Blood"));

    let scene = sequencer.scene();
    assert_eq!(sequencer.phase(), Phase::Resetting);
    assert!(!scene.text_visible);
    assert_eq!(scene.box_width, 0.0);
    assert_eq!(scene.box_position, StagePosition::OffStage);
    assert_eq!(scene.logo_position, StagePosition::OffStage);
    assert!(TextField::ALL.iter().all(|field| scene.text(*field).is_empty()));
    assert_registry_consistent(&sequencer);
}

#[test]
fn immediate_second_play_wins() {
    let mut sequencer = PhaseSequencer::default();
    sequencer.play(AnnouncementRequest::new("A", "B"));
    let first = sequencer.generation();
    sequencer.play(AnnouncementRequest::new("C", "D"));

    run_to_phase(&mut sequencer, Phase::Holding);
    assert_eq!(sequencer.scene().artist, "C");
    assert_eq!(sequencer.scene().song, "D");

    let leaked = sequencer.render().history().any(|entry| {
        entry.generation == first
            && matches!(&entry.mutation, VisualMutation::AppendChar { .. })
    });
    assert!(!leaked, "first cycle revealed text");

    let shown_ab = sequencer.render().history().any(|entry| {
        matches!(
            entry.mutation,
            VisualMutation::AppendChar { field: TextField::Artist, ch: 'A' }
                | VisualMutation::AppendChar { field: TextField::Song, ch: 'B' }
        )
    });
    assert!(!shown_ab);
}

#[test]
fn play_mid_reveal_cancels_every_pending_timer() {
    let mut sequencer = PhaseSequencer::default();
    sequencer.play(AnnouncementRequest::new("Iron Maiden", "Fear of the Dark"));
    let superseded_at = ms(REVEAL_START + 12 * 45 + 150 + 100);
    sequencer.advance_to(superseded_at);
    assert_eq!(
        sequencer.cycle().reveal().map(|state| state.field()),
        Some(TextField::Artist)
    );
    let first = sequencer.generation();

    sequencer.play(AnnouncementRequest::new("C", "D"));
    assert_registry_consistent(&sequencer);

    sequencer.run_until_settled();

    let stale = sequencer
        .render()
        .history()
        .filter(|entry| entry.generation == first && entry.at > superseded_at)
        .count();
    assert_eq!(stale, 0);
    assert_eq!(sequencer.phase(), Phase::Idle);
    assert!(sequencer.scene().is_at_rest());
}

#[test]
fn stop_hides_from_any_phase() {
    let cases = [
        (50, Phase::Resetting),
        (400, Phase::Entering),
        (1_000, Phase::Expanding),
        (2_000, Phase::Revealing),
        (5_000, Phase::Holding),
    ];

    for (offset, expected) in cases {
        let mut sequencer = PhaseSequencer::default();
        sequencer.play(metallica());
        sequencer.advance_to(ms(offset));
        assert_eq!(sequencer.phase(), expected);

        sequencer.stop();
        assert_eq!(sequencer.phase(), Phase::Exiting, "stop during {expected:?}");
        assert!(!sequencer.scene().text_visible);
        assert!(!sequencer.scene().shows_text());
        assert_registry_consistent(&sequencer);

        sequencer.advance(ms(EXIT - 1));
        assert_eq!(sequencer.phase(), Phase::Exiting);

        sequencer.advance(ms(1));
        assert_eq!(sequencer.phase(), Phase::Idle, "stop during {expected:?}");
        assert!(sequencer.scene().is_at_rest(), "stop during {expected:?}");
        assert!(sequencer.is_settled());

        let applied = sequencer.render().history().count();
        sequencer.advance(ms(60_000));
        assert_eq!(sequencer.render().history().count(), applied);
    }
}

#[test]
fn exit_steps_are_staggered() {
    let mut sequencer = PhaseSequencer::default();
    sequencer.play(metallica());
    sequencer.advance_to(ms(5_000));
    sequencer.stop();

    sequencer.advance(ms(300));
    assert_eq!(sequencer.scene().box_width, 0.0);
    assert!(sequencer.scene().logo_flourish);

    sequencer.advance(ms(200));
    assert!(!sequencer.scene().logo_flourish);
    assert_eq!(sequencer.scene().logo_position, StagePosition::OnStage);

    sequencer.advance(ms(300));
    assert_eq!(sequencer.scene().logo_position, StagePosition::OffStage);
    assert_eq!(sequencer.scene().box_position, StagePosition::OnStage);

    sequencer.advance(ms(300));
    assert_eq!(sequencer.scene().box_position, StagePosition::OffStage);
    assert_eq!(sequencer.phase(), Phase::Idle);
}

#[test]
fn stop_while_idle_is_a_no_op() {
    let mut sequencer = PhaseSequencer::default();
    sequencer.stop();
    sequencer.stop();

    assert_eq!(sequencer.phase(), Phase::Idle);
    assert_eq!(sequencer.generation(), 0);
    assert_eq!(sequencer.render().history().count(), 0);

    sequencer.play(metallica());
    sequencer.run_until_settled();
    let generation = sequencer.generation();
    sequencer.stop();

    assert_eq!(sequencer.generation(), generation);
    assert_eq!(sequencer.scene().box_width, 0.0);
    assert!(sequencer.scene().is_at_rest());
}

#[test]
fn stop_during_exit_restarts_the_exit() {
    let mut sequencer = PhaseSequencer::default();
    sequencer.play(metallica());
    sequencer.advance_to(ms(5_000));
    sequencer.stop();
    sequencer.advance(ms(500));

    sequencer.stop();
    assert_eq!(sequencer.phase(), Phase::Exiting);
    sequencer.advance(ms(EXIT - 1));
    assert_eq!(sequencer.phase(), Phase::Exiting);
    sequencer.advance(ms(1));
    assert!(sequencer.is_settled());
}

#[test]
fn play_during_exit_brings_the_graphic_back() {
    let mut sequencer = PhaseSequencer::default();
    sequencer.play(metallica());
    sequencer.advance_to(ms(5_000));
    sequencer.stop();
    sequencer.advance(ms(900));

    sequencer.play(AnnouncementRequest::new("Ghost", "Mary on a Cross"));
    run_to_phase(&mut sequencer, Phase::Holding);

    assert_eq!(sequencer.scene().box_position, StagePosition::OnStage);
    assert_eq!(sequencer.scene().artist, "Ghost");
}

#[test]
fn update_is_a_full_restart() {
    let mut sequencer = PhaseSequencer::default();
    sequencer.play(metallica());
    sequencer.advance_to(ms(METALLICA_HOLD_AT));

    sequencer.update(AnnouncementRequest::new("Slayer", "Raining Blood"));
    assert_eq!(sequencer.phase(), Phase::Resetting);
    assert_eq!(sequencer.scene().box_position, StagePosition::OffStage);
    assert_eq!(sequencer.scene().artist, "");

    run_to_phase(&mut sequencer, Phase::Holding);
    assert_eq!(sequencer.scene().artist, "Slayer");
    assert_eq!(sequencer.scene().song, "Raining Blood");
}

#[test]
fn bridge_commands_drive_the_sequencer() {
    let mut sequencer = PhaseSequencer::default();
    Command::parse_line(r#"play {"artist": "Metallica", "song": "Enter Sandman"}"#)
        .unwrap()
        .dispatch(&mut sequencer);
    sequencer.advance_to(ms(METALLICA_HOLD_AT));
    assert_eq!(sequencer.scene().song, "Enter Sandman");

    Command::parse_line("stop").unwrap().dispatch(&mut sequencer);
    assert_eq!(sequencer.phase(), Phase::Exiting);
}

#[test]
fn rapid_retriggering_keeps_one_cycle() {
    let mut sequencer = PhaseSequencer::default();
    for round in 0..50u64 {
        sequencer.play(AnnouncementRequest::new(format!("Band {round}"), "Song"));
        sequencer.advance(ms(round * 37 % 1_900));
        if round % 7 == 0 {
            sequencer.stop();
        }
        assert_registry_consistent(&sequencer);
    }

    sequencer.play(AnnouncementRequest::new("Final", "Song"));
    run_to_phase(&mut sequencer, Phase::Holding);
    assert_eq!(sequencer.scene().artist, "Final");
}

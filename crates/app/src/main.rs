use std::{
    io::BufRead,
    path::{Path, PathBuf},
    sync::mpsc::{self, RecvTimeoutError},
    thread,
    time::{Duration, Instant},
};

use clap::{Parser, Subcommand};
use lower_third_core::{
    Command, CommandTarget, OverlayConfig, PhaseSequencer, Recorder, RecordingSettings,
    RenderGraph, MAX_FPS,
};
use tracing_subscriber::EnvFilter;

mod script;

const LIVE_TICK: Duration = Duration::from_millis(10);

fn main() -> lower_third_core::Result<()> {
    init_tracing();

    let cli = Cli::parse();

    match cli.command {
        Commands::Live { config } => run_live(load_config(config.as_deref())?),
        Commands::Simulate {
            script,
            config,
            fps,
            output,
        } => run_simulate(
            &script,
            load_config(config.as_deref())?,
            fps,
            output.as_deref(),
        ),
    }
}

fn load_config(path: Option<&Path>) -> lower_third_core::Result<OverlayConfig> {
    match path {
        Some(path) => {
            tracing::info!(?path, "loading overlay config");
            OverlayConfig::from_path(path)
        }
        None => Ok(OverlayConfig::default()),
    }
}

fn build_sequencer(config: OverlayConfig) -> PhaseSequencer {
    let mut sequencer = PhaseSequencer::with_config(config);
    let logo = sequencer.load_logo();
    tracing::info!(path = %logo.path.display(), available = logo.available, "logo asset");
    sequencer
}

fn run_live(config: OverlayConfig) -> lower_third_core::Result<()> {
    tracing::info!("starting live mode, reading commands from stdin");

    let mut sequencer = build_sequencer(config).with_render_graph(RenderGraph::with_history_limit(0));
    let (tx, rx) = mpsc::channel::<String>();

    thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            match line {
                Ok(line) => {
                    if tx.send(line).is_err() {
                        break;
                    }
                }
                Err(err) => {
                    tracing::warn!(%err, "stdin read failed");
                    break;
                }
            }
        }
    });

    let started = Instant::now();
    let mut input_open = true;
    let mut last_phase = sequencer.phase();

    loop {
        if input_open {
            match rx.recv_timeout(LIVE_TICK) {
                Ok(line) => {
                    sequencer.advance_to(started.elapsed());
                    apply_line(&mut sequencer, &line);
                }
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => {
                    tracing::info!("input closed, hiding overlay");
                    input_open = false;
                    sequencer.advance_to(started.elapsed());
                    sequencer.stop();
                }
            }
        } else {
            thread::sleep(LIVE_TICK);
        }

        sequencer.advance_to(started.elapsed());

        if sequencer.phase() != last_phase {
            last_phase = sequencer.phase();
            tracing::info!(phase = ?last_phase, generation = sequencer.generation(), "overlay phase");
        }

        if !input_open && sequencer.is_settled() {
            break;
        }
    }

    Ok(())
}

fn apply_line(sequencer: &mut PhaseSequencer, line: &str) {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return;
    }

    match Command::parse_line(line) {
        Ok(command) => command.dispatch(sequencer),
        Err(err) => tracing::warn!(%err, line, "ignoring bridge line"),
    }
}

fn run_simulate(
    script_path: &Path,
    config: OverlayConfig,
    fps: u32,
    output: Option<&Path>,
) -> lower_third_core::Result<()> {
    tracing::info!(?script_path, fps, "running simulation");

    let source = std::fs::read_to_string(script_path)?;
    let entries = script::parse_script(&source)?;

    let mut sequencer = build_sequencer(config);
    let mut recorder = Recorder::new(RecordingSettings { fps });
    if let Some(logo) = sequencer.logo() {
        recorder.set_logo(logo.clone());
    }
    let frame = recorder.frame_interval();
    recorder.start();

    let mut pending = entries.into_iter().peekable();
    let mut frame_time = Duration::ZERO;

    loop {
        while let Some(entry) = pending.next_if(|entry| entry.at <= frame_time) {
            sequencer.advance_to(entry.at);
            entry.command.dispatch(&mut sequencer);
        }

        sequencer.advance_to(frame_time);
        recorder.capture(frame_time, sequencer.phase(), sequencer.scene());

        if pending.peek().is_none() && sequencer.is_settled() {
            break;
        }
        frame_time += frame;
    }

    let trace = recorder.finish();
    tracing::info!(frames = trace.frames.len(), "simulation finished");

    match output {
        Some(path) => trace.write_json(path),
        None => {
            println!("{}", serde_json::to_string_pretty(&trace)?);
            Ok(())
        }
    }
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .try_init();
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Now-playing lower-third overlay", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Drive the overlay in real time from `play`/`update`/`stop` lines on stdin.
    Live {
        /// Optional JSON config file with timings, layout and text.
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Replay a timed command script on a virtual clock and dump the frames.
    Simulate {
        /// Script of `<ms> <command>` lines.
        script: PathBuf,
        /// Optional JSON config file with timings, layout and text.
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Frames sampled per second of simulated time.
        #[arg(long, default_value_t = 25, value_parser = clap::value_parser!(u32).range(1..=MAX_FPS as i64))]
        fps: u32,
        /// Where to write the frame trace. Defaults to stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

//! Hover League headless runner
//!
//! Plays one heat with a scripted pilot against a simulated wall clock and
//! prints the decision log and summary.

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use std::path::PathBuf;
    use std::time::Duration;

    use clap::Parser;

    use hover_league::driver::Session;
    use hover_league::pilot::{Pilot, PilotKind};
    use hover_league::sim::{Race, RacePhase};
    use hover_league::{GateTable, Settings};

    /// Upper bound on simulated seconds before giving up on a heat
    const MAX_SIM_SECONDS: f64 = 600.0;

    #[derive(Parser, Debug)]
    #[command(author, version, about)]
    struct Args {
        /// Gate table JSON (defaults to the built-in Race #1 table)
        #[arg(long)]
        gates: Option<PathBuf>,

        /// Settings JSON
        #[arg(long)]
        settings: Option<PathBuf>,

        /// Pilot: ideal, wrong, left, right or random
        #[arg(long, default_value = "ideal", value_parser = parse_pilot)]
        pilot: PilotKind,

        /// Seed for the random pilot
        #[arg(long, default_value_t = 1)]
        seed: u64,

        /// Simulated frame rate
        #[arg(long, default_value_t = 60)]
        fps: u32,

        /// Print the final run state as JSON
        #[arg(long, default_value_t = false)]
        json: bool,
    }

    fn parse_pilot(s: &str) -> Result<PilotKind, String> {
        PilotKind::from_str(s).ok_or_else(|| format!("unknown pilot {s:?}"))
    }

    pub fn run() -> Result<(), Box<dyn std::error::Error>> {
        let args = Args::parse();

        let settings = Settings::load_or_default(args.settings.as_deref())?;
        let gates = match args.gates.as_deref() {
            Some(path) => GateTable::load(path)?,
            None => GateTable::race_one(),
        };
        let race = Race::new(gates, settings.scoring)?;
        let mut session = Session::new(race, &settings);
        let mut pilot = Pilot::new(args.pilot, args.seed);

        let frame = 1.0 / f64::from(args.fps.max(1));
        let frame_duration = Duration::from_secs_f64(frame);
        let mut now = 0.0_f64;

        session.start();
        while session.race().phase() != RacePhase::Finished {
            if now > MAX_SIM_SECONDS {
                return Err("heat did not finish".into());
            }
            now += frame;
            // Both clocks read the same wall time but tick independently
            session.on_timer(frame_duration);
            let input = pilot.input(session.race());
            session.set_input(input);
            session.on_frame(now);
        }
        session.teardown();

        let state = session.snapshot();
        if args.json {
            println!("{}", serde_json::to_string_pretty(state)?);
            return Ok(());
        }

        println!(
            "Pilot: {} | scoring: {} | {} gates over {:.0} units",
            pilot.kind().as_str(),
            settings.scoring.as_str(),
            session.race().gates().len(),
            session.race().gates().finish_distance(),
        );
        for (i, entry) in state.decision_log.iter().enumerate() {
            println!(
                "{}. [{}] {} {} ({}) -> {:.0} km/h, {:.0}% quality, x{} combo",
                i + 1,
                entry.gate,
                entry.label,
                if entry.correct { "Clean" } else { "Glitch" },
                entry.lane.as_str(),
                entry.stats.speed,
                entry.stats.quality,
                entry.stats.combo.round().max(1.0),
            );
        }
        if let Some(summary) = &state.summary {
            println!();
            println!(
                "{} ({} data): {}",
                summary.rank.label(),
                if summary.is_clean() { "clean" } else { "noisy" },
                summary.takeaway
            );
            println!(
                "Speed {:.0} km/h | Quality {:.0}% | Combo x{} | Position #{} | {:.1}s",
                summary.final_speed,
                summary.final_quality,
                summary.final_combo.round().max(1.0),
                summary.display_position(),
                state.elapsed,
            );
        }
        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Hover League (headless) starting...");
    if let Err(err) = native::run() {
        log::error!("{err}");
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // Hosts embed the library directly; there is no wasm binary
}

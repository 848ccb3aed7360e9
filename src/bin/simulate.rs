use std::error::Error;
use std::io;
use std::path::{Path, PathBuf};

use chase_engine::config::GameConfig;
use chase_engine::controller::{ControllerRegistry, StrategyKind};
use chase_engine::engine::{Game, GameRuntime};
use chase_engine::map::Map;
use chase_engine::types::{PursuedView, PursuerView, RoundState, Snapshot};
use chrono::{SecondsFormat, Utc};
use clap::Parser;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    #[arg(long, default_value = "maps/classic.txt")]
    map: PathBuf,
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    seed: Option<u64>,
    #[arg(long)]
    pursuers: Option<usize>,
    #[arg(long)]
    level: Option<u8>,
    #[arg(long)]
    lives: Option<i32>,
    #[arg(long)]
    round_seconds: Option<i64>,
    /// Comma separated strategy names, e.g. `pathfinding,greedy,random`.
    #[arg(long, value_delimiter = ',')]
    roster: Vec<String>,
    #[arg(long, default_value_t = 20 * 60 * 15)]
    max_ticks: u64,
    /// Tick on the wall clock instead of a virtual one.
    #[arg(long)]
    realtime: bool,
    #[arg(long)]
    summary_out: Option<PathBuf>,
}

#[derive(Clone, Debug, Serialize)]
struct RunResultLine {
    map: String,
    seed: u32,
    state: RoundState,
    ticks: u64,
    #[serde(rename = "elapsedSeconds")]
    elapsed_seconds: i64,
    #[serde(rename = "remainingCollectibles")]
    remaining_collectibles: i32,
    pursued: Vec<PursuedView>,
    pursuers: Vec<PursuerView>,
}

#[derive(Clone, Debug, Serialize)]
struct RunSummary {
    #[serde(rename = "finishedAt")]
    finished_at: String,
    realtime: bool,
    config: GameConfig,
    result: RunResultLine,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    init_tracing();
    let cli = Cli::parse();

    let config = resolve_config(&cli)?;
    let seed = config.seed.unwrap_or_else(rand::random::<u32>);
    let map = Map::load(&cli.map)?;
    warn_unreachable(&map);

    let mut registry = ControllerRegistry::new(seed);

    let map_name = map.name().to_string();
    let game = Game::new(config.clone(), map, &mut registry)?;
    tracing::info!(map = %map_name, seed, realtime = cli.realtime, "simulation starting");

    let snapshot = if cli.realtime {
        run_realtime(game, cli.max_ticks).await?
    } else {
        run_virtual(game, cli.max_ticks)
    };

    let result = build_result_line(map_name, seed, snapshot);
    tracing::info!(state = ?result.state, ticks = result.ticks, "simulation finished");
    println!("{}", serde_json::to_string(&result)?);

    if let Some(path) = cli.summary_out.as_ref() {
        let summary = RunSummary {
            finished_at: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            realtime: cli.realtime,
            config,
            result,
        };
        write_summary(path, &summary)?;
        tracing::info!(path = %path.display(), "summary written");
    }
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

/// File values first, then flags. Headless runs always steer pursued actors
/// with the autopilot.
fn resolve_config(cli: &Cli) -> Result<GameConfig, Box<dyn Error>> {
    let mut config = match cli.config.as_ref() {
        Some(path) => GameConfig::load(path)?,
        None => GameConfig::default(),
    };
    if let Some(seed) = cli.seed {
        config.seed = Some(normalize_seed(seed));
    }
    if let Some(pursuers) = cli.pursuers {
        config.pursuer_count = pursuers;
    }
    if let Some(level) = cli.level {
        config.level = level;
    }
    if let Some(lives) = cli.lives {
        config.lives = lives;
    }
    if let Some(round_seconds) = cli.round_seconds {
        config.round_seconds = round_seconds;
    }
    if !cli.roster.is_empty() {
        config.roster = parse_roster(&cli.roster)?;
    }
    if config.input_pursuers > 0 {
        tracing::warn!(
            input_pursuers = config.input_pursuers,
            "input-bound pursuers are not supported headless, using AI"
        );
        config.input_pursuers = 0;
    }
    config.autopilot = true;
    config.validate()?;
    Ok(config)
}

fn parse_roster(names: &[String]) -> Result<Vec<StrategyKind>, Box<dyn Error>> {
    names
        .iter()
        .map(|name| {
            StrategyKind::parse(name).ok_or_else(|| format!("unknown strategy {name:?}").into())
        })
        .collect()
}

fn warn_unreachable(map: &Map) {
    for spawn in map.pursued_spawns() {
        let unreachable = map.unreachable_collectibles(*spawn);
        if !unreachable.is_empty() {
            tracing::warn!(
                ?spawn,
                count = unreachable.len(),
                "collectibles unreachable from pursued spawn, round cannot be won"
            );
        }
    }
}

fn run_virtual(mut game: Game, max_ticks: u64) -> Snapshot {
    let tick_ms = game.config().tick_ms;
    let mut now_ms = 0u64;
    game.start(now_ms);
    while !game.state().is_finished() {
        if game.tick_count() >= max_ticks {
            tracing::warn!(max_ticks, "tick limit reached");
            game.destroy();
            break;
        }
        now_ms += tick_ms;
        game.tick(now_ms);
    }
    game.snapshot()
}

async fn run_realtime(game: Game, max_ticks: u64) -> Result<Snapshot, Box<dyn Error>> {
    let runtime = GameRuntime::spawn(game);
    let mut snapshots = runtime.subscribe();
    loop {
        let (tick, state) = {
            let snapshot = snapshots.borrow_and_update();
            (snapshot.tick, snapshot.state)
        };
        if state.is_finished() {
            break;
        }
        if tick >= max_ticks {
            tracing::warn!(max_ticks, "tick limit reached");
            runtime.destroy().await;
            break;
        }
        if snapshots.changed().await.is_err() {
            break;
        }
    }
    runtime.join().await?;
    let snapshot = snapshots.borrow().clone();
    Ok(snapshot)
}

fn build_result_line(map: String, seed: u32, snapshot: Snapshot) -> RunResultLine {
    RunResultLine {
        map,
        seed,
        state: snapshot.state,
        ticks: snapshot.tick,
        elapsed_seconds: snapshot.elapsed_seconds,
        remaining_collectibles: snapshot.remaining_collectibles,
        pursued: snapshot.pursued,
        pursuers: snapshot.pursuers,
    }
}

fn normalize_seed(seed: u64) -> u32 {
    seed as u32
}

fn write_summary(path: &Path, summary: &RunSummary) -> io::Result<()> {
    let summary_text = serde_json::to_string_pretty(summary)?;
    std::fs::write(path, summary_text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn headless_game(text: &str) -> Game {
        let map = Map::parse("test", text).expect("map parses");
        let config = GameConfig {
            autopilot: true,
            pursuer_count: 1,
            seed: Some(9),
            ..GameConfig::default()
        };
        let mut registry = ControllerRegistry::new(9);
        Game::new(config, map, &mut registry).expect("round sets up")
    }

    #[test]
    fn virtual_run_finishes_on_an_empty_map() {
        let snapshot = run_virtual(headless_game("4 3\nHHHH\nHPGH\nHHHH\n"), 100);
        assert_eq!(snapshot.state, RoundState::Won);
        assert_eq!(snapshot.tick, 1);
    }

    #[test]
    fn virtual_run_respects_the_tick_limit() {
        let snapshot = run_virtual(headless_game("6 3\nHHHHHH\nHPHG.H\nHHHHHH\n"), 50);
        assert_eq!(snapshot.state, RoundState::Terminated);
        assert_eq!(snapshot.tick, 50);
    }

    #[test]
    fn roster_names_are_validated() {
        let roster = parse_roster(&["greedy".to_string(), "Random".to_string()])
            .expect("known strategies");
        assert_eq!(roster, vec![StrategyKind::Greedy, StrategyKind::Random]);
        assert!(parse_roster(&["chaser".to_string()]).is_err());
    }

    #[test]
    fn result_line_uses_camel_case_counters() {
        let snapshot = run_virtual(headless_game("4 3\nHHHH\nHPGH\nHHHH\n"), 100);
        let line = build_result_line("test".to_string(), 9, snapshot);
        let json = serde_json::to_value(&line).expect("result serializes");
        assert_eq!(json["state"], "won");
        assert_eq!(json["remainingCollectibles"], 0);
        assert_eq!(json["pursued"][0]["name"], "Autopilot #1");
    }

    #[test]
    fn normalize_seed_keeps_low_bits() {
        assert_eq!(normalize_seed(42), 42);
        assert_eq!(normalize_seed((1u64 << 32) + 7), 7);
    }

    #[test]
    fn write_summary_returns_error_when_parent_does_not_exist() {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis();
        let target = std::env::temp_dir()
            .join(format!("chase-engine-missing-{now}"))
            .join("summary.json");
        let snapshot = run_virtual(headless_game("4 3\nHHHH\nHPGH\nHHHH\n"), 100);
        let summary = RunSummary {
            finished_at: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            realtime: false,
            config: GameConfig::default(),
            result: build_result_line("test".to_string(), 9, snapshot),
        };
        assert!(write_summary(&target, &summary).is_err());
    }
}

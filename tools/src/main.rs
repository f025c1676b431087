//! garden-runner: headless driver for the garden core.
//!
//! Usage:
//!   garden-runner --seed 12345 --ticks 600 --db garden.db
//!   garden-runner --profile alice --db garden.db --ipc-mode

use anyhow::Result;
use chrono::{DateTime, Utc};
use garden_core::{
    bouquet::FlowerPick,
    clock::{ClockSpeed, GameClock},
    command::PlayerCommand,
    config::GameConfig,
    engine::GardenEngine,
    event::GardenEvent,
    settings::{AutoActions, SettingsPatch},
    snapshot::GameSnapshot,
    store::GardenStore,
    types::Timestamp,
};
use std::env;
use std::io::{self, BufRead, Write};

#[derive(serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum IpcCommand {
    GetState,
    Tick {
        count: u64,
    },
    Command {
        command: PlayerCommand,
    },
    Save,
    Quit,
}

#[derive(serde::Serialize)]
struct UiState<'a> {
    now:      Timestamp,
    paused:   bool,
    snapshot: GameSnapshot,
    events:   &'a [GardenEvent],
    #[serde(skip_serializing_if = "Option::is_none")]
    error:    Option<&'static str>,
}

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let seed = parse_arg(&args, "--seed", 42u64);
    let ticks = parse_arg(&args, "--ticks", 600u64);
    let tick_ms = parse_arg(&args, "--tick-ms", 1_000u64);
    let ipc_mode = args.iter().any(|a| a == "--ipc-mode");
    let fast = args.iter().any(|a| a == "--fast");
    let db = parse_str(&args, "--db", ":memory:");
    let data_dir = parse_str(&args, "--data-dir", "./data");
    let profile = parse_str(&args, "--profile", "default");

    if !ipc_mode {
        println!("Garden: garden-runner");
        println!("  seed:      {seed}");
        println!("  ticks:     {ticks}");
        println!("  db:        {db}");
        println!("  data_dir:  {data_dir}");
        println!("  profile:   {profile}");
        println!();
    }

    let config = GameConfig::load(data_dir).unwrap_or_else(|e| {
        log::warn!("{e:#}; falling back to the builtin catalog");
        GameConfig::builtin()
    });

    let store = GardenStore::open(db)?;
    store.migrate()?;
    let (mut engine, report) = GardenEngine::load(profile.to_string(), seed, config, store)?;
    if !report.is_clean() {
        log::warn!(
            "save for {profile} was repaired: fresh_start={} slots_reset={:?} level_corrected={}",
            report.fresh_start, report.slots_reset, report.level_corrected
        );
    }

    let mut clock = GameClock::new(wall_clock_ms(), tick_ms);
    if fast {
        clock.set_speed(ClockSpeed::Fast);
    }

    if ipc_mode {
        run_ipc_loop(&mut engine, &mut clock)?;
    } else {
        run_batch(&mut engine, &mut clock, ticks)?;
        print_summary(&engine, &clock, ticks)?;
    }

    Ok(())
}

/// Keep every slot busy: plant the dearest affordable seed into empty
/// slots, let the auto-action driver tend them, and bundle harvests into
/// bouquets as soon as there are enough flowers.
fn run_batch(engine: &mut GardenEngine, clock: &mut GameClock, ticks: u64) -> Result<()> {
    let patch = SettingsPatch {
        auto_actions: Some(AutoActions::all()),
        ..SettingsPatch::default()
    };
    engine.update_settings(&patch, clock.now)?;
    clock.resume();

    for _ in 0..ticks {
        let now = clock.advance();

        while let Some(slot) = engine.state().garden.first_empty() {
            let Some(seed) = engine.config().seeds.affordable(engine.coins()).pop() else {
                break;
            };
            engine.plant(slot, &seed.id, now)?;
        }

        engine.auto_tick(now)?;

        let picks: Vec<FlowerPick> = engine
            .state()
            .economy
            .inventory()
            .map(|e| FlowerPick { seed_id: e.seed_id.clone(), count: e.count })
            .collect();
        let flowers: u32 = picks.iter().map(|p| p.count).sum();
        if flowers >= 8 {
            let events = engine.create_bouquet(&picks, "basic", now)?;
            for event in events {
                if let GardenEvent::BouquetCreated { bouquet_id, .. } = event {
                    engine.sell_bouquet(&bouquet_id, now)?;
                }
            }
        }
    }
    engine.save(clock.now)?;
    Ok(())
}

fn run_ipc_loop(engine: &mut GardenEngine, clock: &mut GameClock) -> Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut handle = stdin.lock();
    let mut buffer = String::new();
    clock.resume();

    loop {
        buffer.clear();
        let bytes_read = handle.read_line(&mut buffer)?;
        if bytes_read == 0 {
            break; // EOF
        }

        let cmd: IpcCommand = match serde_json::from_str(&buffer) {
            Ok(c) => c,
            Err(e) => {
                let err_json = serde_json::json!({ "error": e.to_string() });
                writeln!(stdout, "{}", err_json)?;
                stdout.flush()?;
                continue;
            }
        };

        let (events, error) = match cmd {
            IpcCommand::Quit => break,
            IpcCommand::GetState => (Vec::new(), None),
            IpcCommand::Save => {
                engine.save(clock.now)?;
                (Vec::new(), None)
            }
            IpcCommand::Tick { count } => {
                let mut events = Vec::new();
                for _ in 0..count {
                    let now = clock.advance();
                    events.extend(engine.auto_tick(now)?);
                }
                (events, None)
            }
            IpcCommand::Command { command } => match engine.submit(command, clock.now) {
                Ok(events) => (events, None),
                Err(e) if e.is_rejection() => (Vec::new(), Some(e.user_message())),
                Err(e) => return Err(e.into()),
            },
        };

        let state = UiState {
            now: clock.now,
            paused: clock.paused,
            snapshot: engine.snapshot(),
            events: &events,
            error,
        };
        writeln!(stdout, "{}", serde_json::to_string(&state)?)?;
        stdout.flush()?;
    }
    engine.save(clock.now)?;
    Ok(())
}

fn print_summary(engine: &GardenEngine, clock: &GameClock, ticks: u64) -> Result<()> {
    let store = engine.store();
    let profile = engine.profile_id.as_str();
    let harvests = store.event_count(profile, Some("flower_harvested"))?;
    let bouquets = store.event_count(profile, Some("bouquet_sold"))?;
    let total_events = store.event_count(profile, None)?;

    println!("=== GARDEN SUMMARY ===");
    println!("  profile:        {profile}");
    println!("  ticks run:      {ticks}");
    println!("  game time:      {}", format_ms(clock.now));
    println!("  coins:          {}", engine.coins());
    println!("  experience:     {}", engine.experience());
    println!("  level:          {}", engine.level());
    println!("  planted slots:  {}", engine.state().garden.planted_count());
    println!("  harvests:       {harvests}");
    println!("  bouquets sold:  {bouquets}");
    println!("  events logged:  {total_events}");

    println!();
    println!("=== ACHIEVEMENTS ===");
    let achievements: Vec<_> = engine.state().economy.achievements().collect();
    if achievements.is_empty() {
        println!("  (none yet)");
    } else {
        for id in achievements {
            println!("  {id}");
        }
    }

    println!();
    println!("=== INVENTORY ===");
    for entry in engine.state().economy.inventory() {
        println!("  {:<10} x{:<3} @ {} coins", entry.name, entry.count, entry.unit_price);
    }
    Ok(())
}

fn parse_arg<T: std::str::FromStr + Copy>(args: &[String], flag: &str, default: T) -> T {
    args.windows(2)
        .find(|w| w[0] == flag)
        .and_then(|w| w[1].parse().ok())
        .unwrap_or(default)
}

fn parse_str<'a>(args: &'a [String], flag: &str, default: &'a str) -> &'a str {
    args.windows(2)
        .find(|w| w[0] == flag)
        .map(|w| w[1].as_str())
        .unwrap_or(default)
}

fn wall_clock_ms() -> Timestamp {
    Utc::now().timestamp_millis().max(0) as Timestamp
}

fn format_ms(ms: Timestamp) -> String {
    DateTime::<Utc>::from_timestamp_millis(ms as i64)
        .map(|t| t.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| format!("{ms} ms"))
}

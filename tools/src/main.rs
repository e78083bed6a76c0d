//! sink-runner: headless host for the Sink simulation.
//!
//! Usage:
//!   sink-runner --seed 12345 --difficulty hard
//!   sink-runner --seed 12345 --config scenario.json --turns 40
//!   sink-runner --ipc-mode

use anyhow::Result;
use sink_core::{
    Difficulty, GameSnapshot, GameStatus, GameStore, Outcome, ScenarioConfig, SeededRng,
};
use std::env;
use std::io::{self, BufRead, Write};

const CHANNEL: &str = "local";
const CAPTAIN: &str = "captain";
const LOG_TAIL: usize = 4;

#[derive(serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum IpcCommand {
    Start {
        channel: String,
        user: String,
        difficulty: Option<String>,
    },
    Join {
        channel: String,
        user: String,
    },
    Leave {
        channel: String,
        user: String,
    },
    End {
        channel: String,
        user: String,
    },
    Action {
        channel: String,
        user: String,
        action: String,
    },
    GetState {
        channel: String,
    },
    Quit,
}

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let seed = flag_value(&args, "--seed")
        .and_then(|v| v.parse().ok())
        .unwrap_or_else(|| SeededRng::from_entropy().next_seed());
    let run_id = format!("run-{seed}-{}", chrono::Utc::now().format("%Y%m%dT%H%M%S"));
    let turns = parse_arg(&args, "--turns", 60u32);
    let ipc_mode = args.iter().any(|a| a == "--ipc-mode");
    let difficulty = flag_value(&args, "--difficulty");
    let config = match flag_value(&args, "--config") {
        Some(path) => ScenarioConfig::load(path)?,
        None => ScenarioConfig::default(),
    };

    let mut store = GameStore::new(config, seed)?;
    log::info!("Starting {run_id}");

    if ipc_mode {
        return run_ipc_loop(&mut store);
    }

    println!("Sink — sink-runner");
    println!("  run:        {run_id}");
    println!("  seed:       {seed}");
    println!("  difficulty: {}", Difficulty::from_label(difficulty));
    println!("  max turns:  {turns}");
    println!();

    store.start(CHANNEL, CAPTAIN, difficulty)?;
    store.join(CHANNEL, "bosun")?;
    run_autopilot(&mut store, turns)?;
    print_summary(&store.snapshot(CHANNEL)?);
    Ok(())
}

/// A simple crew: seal leaks first, keep the water down, keep spirits up.
fn run_autopilot(store: &mut GameStore, turns: u32) -> Result<()> {
    let crew = [CAPTAIN, "bosun"];
    let mut i = 0usize;
    loop {
        let snap = store.snapshot(CHANNEL)?;
        if snap.status == GameStatus::Ended || snap.turn >= turns {
            break;
        }
        let action = choose_action(&snap);
        let user = crew[i % crew.len()];
        i += 1;

        let events = store.act(CHANNEL, action, user)?;
        log::debug!("turn {} {user} {action}: {} events", snap.turn + 1, events.len());
        for event in &events {
            println!("  [{:>2}] {}", snap.turn + 1, event.narrative());
        }
    }
    Ok(())
}

fn choose_action(snap: &GameSnapshot) -> &'static str {
    if snap.water >= 40 {
        "bail"
    } else if snap.morale <= 25 {
        "brace"
    } else if snap.active_leaks().next().is_some() {
        "patch"
    } else if snap.water > 10 {
        "bail"
    } else {
        "tick"
    }
}

fn run_ipc_loop(store: &mut GameStore) -> Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut handle = stdin.lock();
    let mut buffer = String::new();

    loop {
        buffer.clear();
        let bytes_read = handle.read_line(&mut buffer)?;
        if bytes_read == 0 {
            break; // EOF
        }
        if buffer.trim().is_empty() {
            continue;
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

        if matches!(cmd, IpcCommand::Quit) {
            break;
        }
        let reply = handle_command(store, cmd);
        writeln!(stdout, "{}", serde_json::to_string(&reply)?)?;
        stdout.flush()?;
    }
    Ok(())
}

/// Apply one IPC command and build the reply: the channel's snapshot plus
/// any events, or the user-facing error text.
fn handle_command(store: &mut GameStore, cmd: IpcCommand) -> serde_json::Value {
    let (channel, result) = match cmd {
        IpcCommand::Start { channel, user, difficulty } => {
            let r = store.start(&channel, &user, difficulty.as_deref()).map(|_| Vec::new());
            (channel, r)
        }
        IpcCommand::Join { channel, user } => {
            let r = store.join(&channel, &user).map(|e| vec![e]);
            (channel, r)
        }
        IpcCommand::Leave { channel, user } => {
            let r = store.leave(&channel, &user).map(|e| vec![e]);
            (channel, r)
        }
        IpcCommand::End { channel, user } => {
            let r = store.end(&channel, &user).map(|e| vec![e]);
            (channel, r)
        }
        IpcCommand::Action { channel, user, action } => {
            let r = store.act(&channel, &action, &user);
            (channel, r)
        }
        IpcCommand::GetState { channel } => (channel, Ok(Vec::new())),
        IpcCommand::Quit => return serde_json::Value::Null,
    };

    match result.and_then(|events| Ok((events, store.snapshot(&channel)?))) {
        Ok((events, state)) => serde_json::json!({ "events": events, "state": state }),
        Err(e) => {
            log::debug!("channel {channel}: {e}");
            serde_json::json!({ "error": e.to_string() })
        }
    }
}

fn print_summary(snap: &GameSnapshot) {
    let title = match snap.outcome {
        Some(Outcome::Lost) => "Ship Lost",
        Some(Outcome::Saved) => "Ship Saved",
        Some(Outcome::Abandoned) => "Ship Abandoned",
        Some(Outcome::EndedByCaptain) => "Scenario Ended",
        None => "Still Afloat",
    };

    println!();
    println!("=== {title} ===");
    println!("  difficulty: {}", snap.difficulty);
    println!("  turn:       {}", snap.turn);
    println!("  hull:       {}", bar(snap.hull));
    println!("  water:      {}", bar(snap.water));
    println!("  pumps:      {}", bar(snap.pumps));
    println!("  morale:     {}", bar(snap.morale));

    let active: Vec<String> = snap
        .active_leaks()
        .take(5)
        .map(|l| format!("#{} {} (+{}/turn)", l.id, l.location, l.rate))
        .collect();
    if active.is_empty() {
        println!("  leaks:      none");
    } else {
        println!("  leaks:      {}", active.join(", "));
    }
    println!("  crew:       {}", snap.crew.join(" "));

    println!();
    for line in snap.log_tail(LOG_TAIL) {
        println!("  {line}");
    }
}

fn bar(value: i32) -> String {
    let filled = ((value.clamp(0, 100) + 5) / 10) as usize;
    format!("[{}{}] {value}/100", "█".repeat(filled), "░".repeat(10 - filled))
}

fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2).find(|w| w[0] == flag).map(|w| w[1].as_str())
}

fn parse_arg<T: std::str::FromStr + Copy>(args: &[String], flag: &str, default: T) -> T {
    flag_value(args, flag)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

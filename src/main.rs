//! Cultivation - headless driver for the progression engine.
//!
//! Reads one command per line from stdin while the scheduler ticks in the
//! background. Progress is saved to the platform config directory.

use cultivation::achievements::{
    achievement_progress, get_achievement_def, leaderboard_score, rank_description,
};
use cultivation::core::{
    BreakthroughOutcome, ChoiceOutcome, EngineConfig, EngineEvent, EngineView, PrestigeOutcome,
    ProgressionEngine, ReplicationConfig,
};
use cultivation::events::{EffectOutcome, EventCatalog};
use cultivation::save_manager::SaveManager;
use cultivation::sync::{
    spawn_replicator, ChannelTransport, CompanionReceiver, ReplicationHandle, ReplicatorStats,
};
use cultivation::utils::build_info;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::io;
use std::path::PathBuf;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::task::JoinHandle;
use tracing::{info, warn};

struct RunOptions {
    config_path: Option<PathBuf>,
    events_path: Option<PathBuf>,
    companion: Option<String>,
    extended_cap: bool,
}

fn now() -> i64 {
    chrono::Utc::now().timestamp()
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> io::Result<()> {
    let args: Vec<String> = std::env::args().collect();

    match args.get(1).map(String::as_str) {
        Some("--version") | Some("-v") => {
            println!(
                "cultivation {} ({})",
                build_info::BUILD_DATE,
                build_info::BUILD_COMMIT
            );
            Ok(())
        }
        Some("--help") | Some("-h") => {
            print_help();
            Ok(())
        }
        None | Some("run") => {
            init_tracing();
            let options = parse_run_options(args.get(2..).unwrap_or_default());
            tokio::runtime::Runtime::new()?.block_on(run(options))
        }
        Some("status") => {
            init_tracing();
            status(args.iter().any(|a| a == "--extended"))
        }
        Some("reset") => {
            init_tracing();
            let mut engine = load_engine(EngineConfig::default(), EventCatalog::empty())?;
            engine.hard_reset(now());
            println!("Progress erased. A new cultivator begins.");
            Ok(())
        }
        Some("serve") => {
            init_tracing();
            let port = match args.get(2).map(|p| p.parse::<u16>()) {
                None => 3000,
                Some(Ok(port)) => port,
                Some(Err(_)) => {
                    eprintln!("serve requires a port number");
                    std::process::exit(1);
                }
            };
            serve(port)
        }
        Some(other) => {
            eprintln!("Unknown command: {}", other);
            eprintln!("Run 'cultivation --help' for usage.");
            std::process::exit(1);
        }
    }
}

fn print_help() {
    println!("Cultivation - idle progression engine\n");
    println!("Usage: cultivation [command]\n");
    println!("Commands:");
    println!("  run [--config FILE] [--events FILE] [--companion URL|local] [--extended]");
    println!("             Run the engine, reading commands from stdin (default)");
    println!("  status [--extended]");
    println!("             Show the saved realm, chronicle and achievements");
    println!("  reset      Erase all progress");
    println!("  serve PORT Run a companion server (requires the web feature)");
    println!("  --version  Show version information");
    println!("  --help     Show this help message");
}

fn parse_run_options(args: &[String]) -> RunOptions {
    let mut options = RunOptions {
        config_path: None,
        events_path: None,
        companion: None,
        extended_cap: false,
    };
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--config" => {
                i += 1;
                options.config_path = args.get(i).map(PathBuf::from);
            }
            "--events" => {
                i += 1;
                options.events_path = args.get(i).map(PathBuf::from);
            }
            "--companion" => {
                i += 1;
                options.companion = args.get(i).cloned();
            }
            "--extended" => options.extended_cap = true,
            other => {
                eprintln!("Unknown option: {}", other);
                std::process::exit(1);
            }
        }
        i += 1;
    }
    options
}

fn load_engine(config: EngineConfig, catalog: EventCatalog) -> io::Result<ProgressionEngine> {
    let store = SaveManager::new()?;
    Ok(ProgressionEngine::load(Box::new(store), catalog, config, now()))
}

fn status(has_entitlement: bool) -> io::Result<()> {
    let engine = load_engine(EngineConfig::default(), EventCatalog::empty())?;
    let at = now();
    print_view(&engine.view(at, has_entitlement));

    let state = engine.state();
    let record = &engine.chronicle().current;
    println!();
    println!("--- Chronicle ---");
    println!("Days cultivating: {}", record.total_days(at));
    println!(
        "Breakthroughs: {} attempted, {} succeeded, {} failed",
        record.break_attempts, record.break_successes, record.break_failures
    );
    println!(
        "Events: {} seen, {} accepted, {} declined",
        record.events_triggered, record.events_accepted, record.events_rejected
    );
    if let Some(realm) = &record.longest_stagnation_realm {
        println!(
            "Longest stagnation: {} days at {}",
            record.max_stagnation_days(),
            realm
        );
    }
    println!("Past lives: {}", engine.chronicle().lives_lived());

    println!();
    println!("--- Achievements ---");
    for progress in achievement_progress(state) {
        if let Some(def) = get_achievement_def(progress.id) {
            let mark = if progress.is_complete() { "✓" } else { " " };
            println!("  [{}] {:<12} {:>5.1}%", mark, def.name, progress.percent);
        }
    }

    let score = leaderboard_score(state.level, state.prestige_count);
    println!();
    println!("Leaderboard score: {} ({})", score, rank_description(score));
    Ok(())
}

async fn run(options: RunOptions) -> io::Result<()> {
    let config = options
        .config_path
        .as_deref()
        .map(EngineConfig::load_or_default)
        .unwrap_or_default();
    let tick = Duration::from_secs_f64(config.tick_seconds.max(0.1));

    let catalog = match options.events_path.as_deref() {
        Some(path) => EventCatalog::load(path),
        None => EventCatalog::builtin(),
    };
    let mut engine = load_engine(config, catalog)?;
    let mut replicator = None;
    if let Some(target) = options.companion.as_deref() {
        if let Some((handle, task)) = connect_companion(target) {
            engine = engine.with_replication(handle);
            replicator = Some(task);
        }
    }

    let report = engine.catch_up_offline(now(), options.extended_cap);
    if report.qi_gained > 0.0 {
        println!(
            "While you were away ({}s, {}s counted): +{:.0} qi",
            report.elapsed_seconds, report.effective_seconds, report.qi_gained
        );
    }
    engine.drain_events();
    print_view(&engine.view(now(), options.extended_cap));
    println!("Type 'help' for commands.");

    let mut rng = StdRng::from_entropy();
    let mut ticker = tokio::time::interval(tick);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                engine.tick(now(), &mut rng);
            }
            line = lines.next_line() => match line {
                Ok(Some(line)) => {
                    if !handle_command(&mut engine, line.trim(), options.extended_cap, &mut rng) {
                        break;
                    }
                }
                Ok(None) => break,
                Err(e) => {
                    warn!(error = %e, "stdin closed");
                    break;
                }
            },
            _ = tokio::signal::ctrl_c() => {
                info!("interrupted");
                break;
            }
        }
        for event in engine.drain_events() {
            print_event(&event);
        }
    }

    engine.set_foreground(false, now());
    drop(engine);

    if let Some(task) = replicator {
        match task.await {
            Ok(stats) => info!(
                sent = stats.sent,
                failed = stats.failed,
                force_pushes = stats.force_pushes,
                "replicator stopped"
            ),
            Err(e) => warn!(error = %e, "replicator task failed"),
        }
    }
    Ok(())
}

/// `local` replicates to an in-process companion; anything else is a
/// WebSocket URL.
fn connect_companion(target: &str) -> Option<(ReplicationHandle, JoinHandle<ReplicatorStats>)> {
    if target == "local" {
        let (transport, mut rx) = ChannelTransport::new();
        tokio::spawn(async move {
            let mut receiver = CompanionReceiver::new();
            while let Some(bytes) = rx.recv().await {
                match receiver.receive_bytes(&bytes) {
                    Ok(received) => info!(?received, "companion received"),
                    Err(e) => warn!(error = %e, "companion rejected message"),
                }
            }
        });
        return Some(spawn_replicator(transport, ReplicationConfig::default()));
    }

    #[cfg(feature = "web")]
    {
        let transport = cultivation::sync::WsTransport::new(target);
        Some(spawn_replicator(transport, ReplicationConfig::default()))
    }

    #[cfg(not(feature = "web"))]
    {
        warn!(url = target, "built without the web feature, companion disabled");
        None
    }
}

#[cfg(feature = "web")]
fn serve(port: u16) -> io::Result<()> {
    use std::sync::Arc;
    use tokio::sync::Mutex;

    let receiver = Arc::new(Mutex::new(CompanionReceiver::new()));
    tokio::runtime::Runtime::new()?
        .block_on(cultivation::sync::start_companion_server(port, receiver))
}

#[cfg(not(feature = "web"))]
fn serve(_port: u16) -> io::Result<()> {
    eprintln!("Built without the web feature. Rebuild with --features web.");
    std::process::exit(1);
}

/// Returns false when the loop should stop.
fn handle_command(
    engine: &mut ProgressionEngine,
    line: &str,
    has_entitlement: bool,
    rng: &mut StdRng,
) -> bool {
    let mut parts = line.split_whitespace();
    let at = now();
    match parts.next() {
        Some("t") | Some("tap") => {
            let count = parts.next().and_then(|n| n.parse().ok()).unwrap_or(1u32);
            let gained: f64 = (0..count).map(|_| engine.tap(at)).sum();
            println!("+{:.1} qi", gained);
        }
        Some("b") | Some("break") => {
            let outcomes = engine.attempt_breakthrough_chain(at, rng);
            if outcomes == [BreakthroughOutcome::NotEligible] {
                println!("Not enough qi to break through.");
            }
        }
        Some("c") | Some("choose") => match parts.next() {
            Some(choice_id) => match engine.select_event_choice(choice_id, at, rng) {
                ChoiceOutcome::NoEventOpen => println!("No event is open."),
                ChoiceOutcome::UnknownChoice => println!("No such choice: {}", choice_id),
                ChoiceOutcome::Resolved(_) => {}
            },
            None => println!("Usage: choose <choice id>"),
        },
        Some("p") | Some("prestige") => {
            if engine.prestige(at) == PrestigeOutcome::NotReady {
                println!("Only an ascended cultivator can be reborn.");
            }
        }
        Some("w") | Some("walk") => match parts.next().and_then(|n| n.parse::<u32>().ok()) {
            Some(steps) => {
                let report = engine.refine_steps(steps, at, has_entitlement);
                if report.steps_refined > 0 {
                    println!(
                        "Refined {} steps: +{:.0} qi",
                        report.steps_refined, report.qi_gained
                    );
                } else if report.limit_reached {
                    println!("The body has reached its limit. Walk again tomorrow.");
                } else {
                    println!("No new steps to refine.");
                }
            }
            None => println!("Usage: walk <steps walked today>"),
        },
        Some("auto") => {
            let mut settings = engine.state().settings;
            settings.auto_breakthrough_enabled = !settings.auto_breakthrough_enabled;
            engine.set_settings(settings, at);
            println!(
                "Auto breakthrough {}",
                if settings.auto_breakthrough_enabled { "on" } else { "off" }
            );
        }
        Some("bg") => engine.set_foreground(false, at),
        Some("fg") => engine.set_foreground(true, at),
        Some("s") | Some("status") => print_view(&engine.view(at, has_entitlement)),
        Some("q") | Some("quit") => return false,
        Some("help") => {
            println!("tap [n] | break | choose <id> | walk <steps> | prestige | auto | bg | fg | status | quit");
        }
        Some(other) => println!("Unknown command: {}", other),
        None => {}
    }
    true
}

fn print_view(view: &EngineView) {
    println!("{}  (rebirths: {})", view.realm, view.prestige_count);
    if view.is_ascended {
        println!("Qi: {:.0}  Ascended", view.qi);
    } else {
        println!(
            "Qi: {:.0} / {:.0} ({:.0}%)  Breakthrough odds: {:.1}%",
            view.qi,
            view.break_cost,
            view.progress_fraction * 100.0,
            view.success_probability * 100.0
        );
    }
    if view.needs_paywall {
        println!("The free path ends here. Unlock the full path to keep cultivating.");
    }
    if view.charms > 0 {
        println!("Protection charms: {}", view.charms);
    }
    for effect in &view.active_effects {
        println!(
            "  {:?} {:+.2} ({}s left)",
            effect.slot, effect.value, effect.remaining_seconds
        );
    }
    if let Some(event) = &view.pending_event {
        println!("Event: {} - {}", event.title, event.description);
        for choice in &event.choices {
            println!("  [{}] {}", choice.id, choice.text);
        }
    }
}

fn print_event(event: &EngineEvent) {
    match event {
        EngineEvent::Breakthrough(BreakthroughOutcome::Success { new_level, .. }) => {
            println!("Breakthrough! Now at level {}", new_level);
        }
        EngineEvent::Breakthrough(BreakthroughOutcome::FailureSaved { charms_left }) => {
            println!("Breakthrough failed. A charm shattered ({} left).", charms_left);
        }
        EngineEvent::Breakthrough(BreakthroughOutcome::FailurePenalized {
            qi_lost,
            debuff_applied,
        }) => {
            println!("Breakthrough failed. Lost {:.0} qi.", qi_lost);
            if *debuff_applied {
                println!("Your meridians are injured.");
            }
        }
        EngineEvent::Ascended => println!("You have ascended. Type 'prestige' to be reborn."),
        EngineEvent::EventOpened { .. } => println!("An encounter! Type 'status' to see it."),
        EngineEvent::EffectResolved(resolved) => match resolved.outcome {
            EffectOutcome::QiChanged { delta } => println!("{:+.0} qi", delta),
            EffectOutcome::TapBoost { ratio, duration_secs } => {
                println!("Tap gain {:+.0}% for {}s", ratio * 100.0, duration_secs)
            }
            EffectOutcome::AutoBoost { ratio, duration_secs } => {
                println!("Auto gain {:+.0}% for {}s", ratio * 100.0, duration_secs)
            }
            EffectOutcome::CharmGranted { charms } => println!("Charm obtained ({})", charms),
            EffectOutcome::Debuffed { multiplier, duration_secs } => {
                println!("Auto gain x{:.2} for {}s", multiplier, duration_secs)
            }
            EffectOutcome::Nothing => {}
        },
        EngineEvent::Reborn { prestige_count } => println!("Reborn (rebirth {}).", prestige_count),
        EngineEvent::EligibilityChanged { eligible: true } => {
            println!("Ready to break through. Type 'break'.")
        }
        _ => {}
    }
}

use pahviz::observer::SessionAdapter;
use pahviz::svg::{export_svg, render_svg};
use pahviz::{AdvanceOutcome, SceneHandler, Session, SessionConfig, TaskDataset};

const FRAME_MS: f64 = 16.0;
const SETTLE_MAX_MS: f64 = 5_000.0;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() >= 2 && (args[1] == "--help" || args[1] == "-h" || args[1] == "help") {
        print_help();
        return Ok(());
    }

    match args.get(1).map(String::as_str) {
        None | Some("demo") => run_demo(parse_seed(args.get(2))?),
        Some("svg") => {
            let Some(path) = args.get(2) else {
                eprintln!("svg: missing output path");
                print_help();
                std::process::exit(2);
            };
            run_svg(path, parse_seed(args.get(3))?)
        }
        Some("snapshot") => run_snapshot(parse_seed(args.get(2))?),
        Some(other) => {
            eprintln!("Unknown command: {other}");
            print_help();
            std::process::exit(2);
        }
    }
}

fn print_help() {
    println!("pahviz (prototype-augmented hypernetwork diagram)");
    println!("usage:");
    println!("  cargo run");
    println!("  cargo run -- demo [seed]");
    println!("  cargo run -- svg <path> [seed]");
    println!("  cargo run -- snapshot [seed]");
    println!("  cargo run -- --help");
}

fn parse_seed(arg: Option<&String>) -> Result<Option<u64>, std::num::ParseIntError> {
    arg.map(|s| s.parse::<u64>()).transpose()
}

fn session(seed: Option<u64>) -> pahviz::Result<Session> {
    let mut config = SessionConfig::default();
    config.seed = seed.or(Some(7));
    Session::new(config, TaskDataset::builtin_cifar())
}

/// Plays every task, settling the animation between steps.
fn run_all(session: &mut Session, verbose: bool) -> pahviz::Result<()> {
    loop {
        let outcome = session.on_advance()?;
        session.scene_mut().settle(FRAME_MS, SETTLE_MAX_MS);
        if verbose {
            println!("{}", session.status());
        }
        if outcome == AdvanceOutcome::Exhausted {
            return Ok(());
        }
    }
}

fn run_demo(seed: Option<u64>) -> Result<(), Box<dyn std::error::Error>> {
    let mut session = session(seed)?;
    println!("{}", session.status());
    run_all(&mut session, true)?;

    println!();
    println!("prototypes:");
    for p in session.store() {
        println!(
            "  {:<10} {:<12} ({:>6.1}, {:>6.1})  {}",
            p.id,
            p.label,
            p.position.x,
            p.position.y,
            p.filter_string()
        );
    }
    println!("edges: {}", session.scene().edges().live_len());

    println!();
    for id in ["hard-loss", "soft-loss-main", "soft-loss-prototype", "hypernetwork"] {
        println!("{}", session.on_entity_click(id)?);
    }
    Ok(())
}

fn run_svg(path: &str, seed: Option<u64>) -> Result<(), Box<dyn std::error::Error>> {
    let mut session = session(seed)?;
    run_all(&mut session, false)?;
    export_svg(session.scene(), path)?;
    println!("wrote {} ({} bytes)", path, render_svg(session.scene()).len());
    Ok(())
}

fn run_snapshot(seed: Option<u64>) -> Result<(), Box<dyn std::error::Error>> {
    let mut session = session(seed)?;
    run_all(&mut session, false)?;
    let snapshot = SessionAdapter::new(&session).snapshot();
    println!("{}", serde_json::to_string_pretty(&snapshot)?);
    Ok(())
}

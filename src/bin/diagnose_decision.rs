// Prints how the pipeline reached its move for one logged turn
//
// Usage:
//   cargo run --bin diagnose_decision -- <game.jsonl> <turn_number> [--config <path>]

use heuristic_snake::config::Config;
use heuristic_snake::engine::MoveEngine;
use heuristic_snake::observer::{DecisionEvent, RecordingObserver};
use heuristic_snake::replay::ReplayEngine;
use heuristic_snake::types::Direction;
use std::env;
use std::process;

fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 3 {
        eprintln!(
            "Usage: {} <game.jsonl> <turn_number> [--config <path>]",
            args[0]
        );
        process::exit(1);
    }

    let file_path = &args[1];
    let target_turn: i32 = args[2].parse().unwrap_or_else(|e| {
        eprintln!("Turn number must be a valid integer: {}", e);
        process::exit(1);
    });
    let config = match args.iter().position(|a| a == "--config") {
        Some(i) => {
            let path = args.get(i + 1).unwrap_or_else(|| {
                eprintln!("Error: --config requires an argument");
                process::exit(1);
            });
            Config::from_file(path).unwrap_or_else(|e| {
                eprintln!("Error: {}", e);
                process::exit(1);
            })
        }
        None => Config::load_or_default(),
    };

    let replay = ReplayEngine::new(config.clone(), false);
    let entries = replay.load_log_file(file_path).unwrap_or_else(|e| {
        eprintln!("Error loading log file: {}", e);
        process::exit(1);
    });
    let entry = entries
        .iter()
        .find(|e| e.turn == target_turn)
        .unwrap_or_else(|| {
            eprintln!("Turn {} not found in {}", target_turn, file_path);
            process::exit(1);
        });
    let you = entry.you().unwrap_or_else(|e| {
        eprintln!("{}", e);
        process::exit(1);
    });

    let board = &entry.board;
    let observer = RecordingObserver::new();
    let mut tie_breaker = config.selection.tie_breaker(entry.turn);
    let decision = MoveEngine::new(&config).decide(board, you, tie_breaker.as_mut(), &observer);

    println!("═══════════════════════════════════════════════════════════");
    println!("Decision Diagnosis for Turn {}", entry.turn);
    println!("═══════════════════════════════════════════════════════════");
    println!();
    println!("Snake State:");
    match (you.head(), you.tail()) {
        (Some(head), Some(tail)) => {
            println!("  Head: {}", head);
            println!("  Tail: {}", tail);
        }
        _ => println!("  Head: none (empty body)"),
    }
    println!("  Health: {}", you.health);
    println!("  Length: {}", you.len());
    println!();

    println!("Rivals:");
    for rival in board.rivals(&you.id) {
        if let (Some(rival_head), Some(head)) = (rival.head(), you.head()) {
            println!(
                "  {}: Head={}, Length={}, Health={}, Distance from us={}",
                rival.id,
                rival_head,
                rival.len(),
                rival.health,
                head.manhattan(rival_head)
            );
        }
    }
    println!();

    println!("═══════════════════════════════════════════════════════════");
    println!("Safety Map");
    println!("═══════════════════════════════════════════════════════════");
    for dir in Direction::all() {
        let status = match decision.safety.reason(dir) {
            None => "SAFE".to_string(),
            Some(reason) => format!("unsafe ({})", reason),
        };
        let area = match decision.space.get(dir) {
            Some(area) => format!("area {}", area),
            None => "not measured".to_string(),
        };
        println!("  {:<6} {:<24} {}", dir.as_str().to_uppercase(), status, area);
    }
    println!();

    println!("═══════════════════════════════════════════════════════════");
    println!("Food Arbitration");
    println!("═══════════════════════════════════════════════════════════");
    if board.food.is_empty() {
        println!("  No food on the board");
    }
    for event in observer.events() {
        match event {
            DecisionEvent::FoodSkipped { food, reason } => {
                println!("  {} skipped: {}", food, reason)
            }
            DecisionEvent::FoodTargeted {
                food,
                distance,
                direction,
            } => println!(
                "  {} targeted (distance {}) via {}",
                food, distance, direction
            ),
            _ => {}
        }
    }
    println!();

    println!(
        "Move Chosen: {} ({})",
        decision.direction, decision.rationale
    );
    println!("Move Logged: {}", entry.chosen_move);
}

use indicatif::{ProgressBar, ProgressStyle};
use outpost::board::Board;
use outpost::logger::init_logging;
use outpost::moves::execute::make_move;
use outpost::moves::magic::MagicTables;
use outpost::moves::magic::loader::load_magic_tables;
use outpost::moves::perft::{perft, perft_divide};
use outpost::moves::uci::parse_uci_move;
use std::io::{self, BufRead};
use std::str::FromStr;
use std::time::Instant;

/// Reference positions with known node counts, used by `bench`.
/// Depths are chosen to finish in seconds; the deep contracts live in the
/// test suite.
const BENCH_POSITIONS: &[(&str, &str, u32, u64)] = &[
    (
        "startpos",
        "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
        5,
        4_865_609,
    ),
    (
        "kiwipete",
        "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
        4,
        4_085_603,
    ),
    ("position 3", "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1", 5, 674_624),
    (
        "position 4",
        "r3k2r/Pppp1ppp/1b3nbN/nP6/BBP1P3/q4N2/Pp1P2PP/R2Q1RK1 w kq - 0 1",
        4,
        422_333,
    ),
    (
        "position 5",
        "rnbq1k1r/pp1Pbppp/2p5/8/2B5/8/PPP1NnPP/RNBQK2R w KQ - 1 8",
        4,
        2_103_487,
    ),
    (
        "position 6",
        "r4rk1/1pp1qppp/p1np1n2/2b1p1B1/2B1P1b1/P1NP1N2/1PP1QPPP/R4RK1 w - - 0 10",
        4,
        3_894_594,
    ),
];

fn main() {
    init_logging("logs/outpost.log", "info");

    // Build magic tables once at startup
    let magic_tables = load_magic_tables();

    let mut board = Board::new(); // Start position

    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = match line {
            Ok(l) => l.trim().to_string(),
            Err(_) => break,
        };

        if line.is_empty() {
            continue;
        }

        let parts: Vec<&str> = line.split_whitespace().collect();
        let command = parts[0];

        match command {
            "uci" => handle_uci(),
            "isready" => println!("readyok"),
            "ucinewgame" => {
                board = Board::new();
            }
            "position" => {
                if let Some(new_board) = handle_position(&parts, &magic_tables) {
                    board = new_board;
                }
            }
            "go" => handle_go(&parts, &mut board, &magic_tables),
            "perft" => {
                if let Some(depth) = parts.get(1).and_then(|s| s.parse().ok()) {
                    run_perft(&mut board, &magic_tables, depth);
                } else {
                    println!("usage: perft <depth>");
                }
            }
            "divide" => {
                if let Some(depth) = parts.get(1).and_then(|s| s.parse().ok()) {
                    perft_divide(&mut board, &magic_tables, depth);
                } else {
                    println!("usage: divide <depth>");
                }
            }
            "bench" => run_bench(&magic_tables),
            "fen" => {
                println!("{}", board.to_fen());
            }
            "d" | "display" => {
                println!("{}", board);
            }
            "quit" => break,
            _ => {}
        }
    }
}

fn handle_uci() {
    println!("id name Outpost 0.4");
    println!("id author Outpost developers");
    println!("uciok");
}

fn handle_position(parts: &[&str], tables: &MagicTables) -> Option<Board> {
    let mut board = if parts.len() > 1 && parts[1] == "startpos" {
        Board::new()
    } else if parts.len() > 1 && parts[1] == "fen" {
        let fen_start = 2;
        let mut fen_end = parts.len();
        for (i, &part) in parts.iter().enumerate().skip(fen_start) {
            if part == "moves" {
                fen_end = i;
                break;
            }
        }

        let fen_string = parts[fen_start..fen_end].join(" ");
        match Board::from_str(&fen_string) {
            Ok(b) => b,
            Err(e) => {
                println!("info string bad fen: {}", e);
                return None;
            }
        }
    } else {
        Board::new()
    };

    // Apply moves if any
    if let Some(moves_idx) = parts.iter().position(|&p| p == "moves") {
        for move_str in &parts[moves_idx + 1..] {
            match parse_uci_move(&board, move_str, tables) {
                Ok(mv) => {
                    make_move(&mut board, mv);
                }
                Err(e) => {
                    println!("info string {}", e);
                    return None;
                }
            }
        }
    }

    Some(board)
}

fn handle_go(parts: &[&str], board: &mut Board, tables: &MagicTables) {
    if parts.get(1) == Some(&"perft") {
        if let Some(depth) = parts.get(2).and_then(|s| s.parse().ok()) {
            run_perft(board, tables, depth);
        } else {
            println!("usage: go perft <depth>");
        }
        return;
    }

    // This build is the movegen/perft core; search lives elsewhere.
    println!("info string no search in this build, try: go perft <depth>");
    println!("bestmove 0000");
}

fn run_perft(board: &mut Board, tables: &MagicTables, depth: u32) {
    let start = Instant::now();
    let nodes = perft(board, tables, depth);
    let secs = start.elapsed().as_secs_f64().max(1e-9);
    let nps = (nodes as f64 / secs) as u64;
    println!("info depth {} nodes {} time {:.0} nps {}", depth, nodes, secs * 1000.0, nps);
    println!("nodes {}", nodes);
}

fn run_bench(tables: &MagicTables) {
    let bar = ProgressBar::new(BENCH_POSITIONS.len() as u64);
    bar.set_style(
        ProgressStyle::with_template("{bar:30} {pos}/{len} {msg}")
            .expect("valid progress template"),
    );

    let mut total_nodes = 0u64;
    let mut total_secs = 0f64;
    let mut failures = 0u32;

    for &(name, fen, depth, expected) in BENCH_POSITIONS {
        bar.set_message(name.to_string());

        let mut board = match Board::from_str(fen) {
            Ok(b) => b,
            Err(e) => {
                bar.println(format!("{name}: bad fen: {e}"));
                failures += 1;
                bar.inc(1);
                continue;
            }
        };

        let start = Instant::now();
        let nodes = perft(&mut board, tables, depth);
        let secs = start.elapsed().as_secs_f64().max(1e-9);

        total_nodes += nodes;
        total_secs += secs;

        if nodes == expected {
            bar.println(format!(
                "{name}: d{depth} nodes={nodes} time={secs:.3}s nps={}",
                (nodes as f64 / secs) as u64
            ));
        } else {
            bar.println(format!(
                "{name}: MISMATCH d{depth} got {nodes}, expected {expected}"
            ));
            failures += 1;
        }
        bar.inc(1);
    }

    bar.finish_and_clear();
    println!(
        "bench: {} nodes {:.3}s nps {} ({} failures)",
        total_nodes,
        total_secs,
        (total_nodes as f64 / total_secs.max(1e-9)) as u64,
        failures
    );
}

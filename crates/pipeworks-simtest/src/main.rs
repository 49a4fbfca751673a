//! Pipeworks Headless Puzzle Harness
//!
//! Sweeps seeds and authored presets through the puzzle engine and checks
//! the invariants the UI relies on. Runs entirely in-process with no
//! rendering or input.
//!
//! Usage:
//!   cargo run -p pipeworks-simtest
//!   cargo run -p pipeworks-simtest -- --verbose --seeds 500

use std::cell::RefCell;
use std::rc::Rc;

use pipeworks_logic::config::{validate_config, PuzzleConfig};
use pipeworks_logic::generation::{self, direct_path, find_path, GeneratedLevel};
use pipeworks_logic::grid::GridPos;
use pipeworks_logic::preset::parse_preset_list;
use pipeworks_logic::session::{format_time, CompletionReport, PuzzleSession, RotateRejection};
use pipeworks_logic::solver::{can_connect, solve};
use pipeworks_logic::tile::{Direction, PipeType};
use rand::rngs::StdRng;
use rand::SeedableRng;

// ── Authored levels (same JSON the tests use) ───────────────────────────
const LEVELS_JSON: &str = include_str!("../../../data/levels.json");

// ── Test harness ────────────────────────────────────────────────────────

struct TestResult {
    name: String,
    passed: bool,
    detail: String,
}

struct Options {
    verbose: bool,
    seeds: u64,
}

fn parse_args() -> Options {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let verbose = args.iter().any(|a| a == "--verbose");
    let seeds = args
        .iter()
        .position(|a| a == "--seeds")
        .and_then(|i| args.get(i + 1))
        .and_then(|v| v.parse().ok())
        .unwrap_or(200);
    Options { verbose, seeds }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let opts = parse_args();
    println!("=== Pipeworks Puzzle Harness ===\n");

    let mut results = Vec::new();

    // 1. Config validation
    results.extend(validate_configs(opts.verbose));

    // 2. Pathfinding primitives
    results.extend(validate_pathfinding(opts.verbose));

    // 3. Generation sweep
    results.extend(validate_generation(opts.seeds, opts.verbose));

    // 4. Session playthroughs
    results.extend(validate_sessions(opts.seeds, opts.verbose));

    // 5. Authored presets
    results.extend(validate_presets(opts.verbose));

    // ── Summary ──
    println!();
    let passed = results.iter().filter(|r| r.passed).count();
    let failed = results.iter().filter(|r| !r.passed).count();
    let total = results.len();

    for r in &results {
        let icon = if r.passed { "✓" } else { "✗" };
        if !r.passed || opts.verbose {
            println!("  {} {}: {}", icon, r.name, r.detail);
        }
    }

    println!(
        "\n=== RESULT: {}/{} passed, {} failed ===",
        passed, total, failed
    );

    if failed > 0 {
        std::process::exit(1);
    }
}

fn session_with_reports(seed: u64) -> (PuzzleSession<StdRng>, Rc<RefCell<Vec<CompletionReport>>>) {
    let reports = Rc::new(RefCell::new(Vec::new()));
    let sink = reports.clone();
    let config = PuzzleConfig {
        rotation_anim_secs: 0.0,
        ..PuzzleConfig::default()
    };
    let session = PuzzleSession::new(
        config,
        StdRng::seed_from_u64(seed),
        Box::new(move |r: &CompletionReport| sink.borrow_mut().push(r.clone())),
    );
    (session, reports)
}

fn play_solution(level: &GeneratedLevel) -> (PuzzleSession<StdRng>, usize) {
    let (mut session, reports) = session_with_reports(0);
    session.load_grid(level.grid.clone());
    for pt in &level.path_tiles {
        let Some(tile) = level.grid.tile(pt.position) else {
            continue;
        };
        for _ in 0..tile.rotation().turns_to(pt.correct_rotation) {
            if session.is_solved() {
                break;
            }
            session.rotate_tile(pt.position.x, pt.position.y);
        }
    }
    let fired = reports.borrow().len();
    (session, fired)
}

// ── 1. Config ───────────────────────────────────────────────────────────

fn validate_configs(_verbose: bool) -> Vec<TestResult> {
    println!("--- Config ---");
    let mut results = Vec::new();

    let default_errors = validate_config(&PuzzleConfig::default());
    results.push(TestResult {
        name: "config_default_valid".into(),
        passed: default_errors.is_empty(),
        detail: format!("{:?}", default_errors),
    });

    let narrow = validate_config(&PuzzleConfig::with_size(1, 0));
    results.push(TestResult {
        name: "config_rejects_degenerate".into(),
        passed: narrow.len() == 2,
        detail: format!("1x0 → {} errors", narrow.len()),
    });

    results
}

// ── 2. Pathfinding ──────────────────────────────────────────────────────

fn validate_pathfinding(_verbose: bool) -> Vec<TestResult> {
    println!("--- Pathfinding ---");
    let mut results = Vec::new();

    let open = find_path(7, 7, GridPos::new(1, 1), GridPos::new(5, 5), |_| true);
    results.push(TestResult {
        name: "astar_open_grid".into(),
        passed: open.as_ref().map_or(false, |p| p.len() == 9),
        detail: "(1,1)→(5,5) = 9 cells".into(),
    });

    let walled = find_path(5, 5, GridPos::new(0, 0), GridPos::new(4, 0), |p| {
        !(p.x == 2 && p.y < 4)
    });
    results.push(TestResult {
        name: "astar_around_wall".into(),
        passed: walled.as_ref().map_or(false, |p| p.contains(&GridPos::new(2, 4))),
        detail: "detours under the wall".into(),
    });

    let sealed = find_path(3, 3, GridPos::new(0, 0), GridPos::new(2, 2), |p| p.x != 1);
    results.push(TestResult {
        name: "astar_unreachable".into(),
        passed: sealed.is_none(),
        detail: "sealed column → None".into(),
    });

    let direct = direct_path(GridPos::new(1, 4), GridPos::new(5, 1));
    results.push(TestResult {
        name: "direct_path_l_shape".into(),
        passed: direct.len() == 8 && direct[4] == GridPos::new(5, 4),
        detail: format!("{} cells, corner at {}", direct.len(), direct[4]),
    });

    results
}

// ── 3. Generation ───────────────────────────────────────────────────────

fn validate_generation(seeds: u64, verbose: bool) -> Vec<TestResult> {
    println!("--- Generation ({} seeds) ---", seeds);
    let mut results = Vec::new();
    let sizes = [(7, 7), (2, 1), (3, 2), (12, 5), (5, 12)];

    let mut bad_endpoints = Vec::new();
    let mut bad_masks = Vec::new();
    let mut bad_scramble = Vec::new();
    let mut asymmetric = Vec::new();
    let mut unstable = Vec::new();

    for &(w, h) in &sizes {
        let config = PuzzleConfig::with_size(w, h);
        for seed in 0..seeds {
            let level = generation::generate(&config, &mut StdRng::seed_from_u64(seed));
            let grid = &level.grid;

            let starts = grid.iter().filter(|(_, t)| t.pipe_type() == PipeType::Start).count();
            let ends = grid.iter().filter(|(_, t)| t.pipe_type() == PipeType::End).count();
            if starts != 1 || ends != 1 || grid.start().x != 0 || grid.end().x != w - 1 {
                bad_endpoints.push(format!("{}x{}#{}", w, h, seed));
            }

            if grid.iter().any(|(_, t)| {
                t.connections().iter().filter(|&&c| c).count() != t.pipe_type().arm_count()
            }) {
                bad_masks.push(format!("{}x{}#{}", w, h, seed));
            }

            if level.path_tiles.iter().any(|pt| {
                grid.tile(pt.position)
                    .map_or(true, |t| t.rotation().turns_to(pt.correct_rotation) == 0)
            }) {
                bad_scramble.push(format!("{}x{}#{}", w, h, seed));
            }

            let symmetric = grid.iter().all(|(pos, _)| {
                Direction::ALL.into_iter().all(|d| match grid.neighbor(pos, d) {
                    Some(other) => can_connect(grid, pos, d) == can_connect(grid, other, d.opposite()),
                    None => true,
                })
            });
            if !symmetric {
                asymmetric.push(format!("{}x{}#{}", w, h, seed));
            }

            if solve(grid) != solve(grid) {
                unstable.push(format!("{}x{}#{}", w, h, seed));
            }

            if verbose && seed == 0 {
                println!("{}x{} seed 0:\n{}", w, h, grid);
            }
        }
    }

    let summarize = |bad: &[String], ok: &str| {
        if bad.is_empty() {
            ok.to_string()
        } else {
            format!("{} failures: {}", bad.len(), bad.iter().take(5).cloned().collect::<Vec<_>>().join(", "))
        }
    };

    results.push(TestResult {
        name: "gen_single_start_end".into(),
        passed: bad_endpoints.is_empty(),
        detail: summarize(&bad_endpoints, "one Start in column 0, one End in last column"),
    });
    results.push(TestResult {
        name: "gen_mask_arm_counts".into(),
        passed: bad_masks.is_empty(),
        detail: summarize(&bad_masks, "every mask matches its shape"),
    });
    results.push(TestResult {
        name: "gen_path_scrambled".into(),
        passed: bad_scramble.is_empty(),
        detail: summarize(&bad_scramble, "every path tile 1–3 turns off"),
    });
    results.push(TestResult {
        name: "solver_symmetric".into(),
        passed: asymmetric.is_empty(),
        detail: summarize(&asymmetric, "can_connect symmetric on every edge"),
    });
    results.push(TestResult {
        name: "solver_deterministic".into(),
        passed: unstable.is_empty(),
        detail: summarize(&unstable, "repeated solves agree"),
    });

    results
}

// ── 4. Sessions ─────────────────────────────────────────────────────────

fn validate_sessions(seeds: u64, _verbose: bool) -> Vec<TestResult> {
    println!("--- Sessions ---");
    let mut results = Vec::new();
    let config = PuzzleConfig::default();

    let mut unsolved = Vec::new();
    let mut wrong_reports = Vec::new();
    let mut total_moves = 0u64;
    for seed in 0..seeds {
        let level = generation::generate(&config, &mut StdRng::seed_from_u64(seed));
        let (session, fired) = play_solution(&level);
        if !session.is_solved() {
            unsolved.push(seed);
        }
        if fired != 1 {
            wrong_reports.push(seed);
        }
        total_moves += session.move_count() as u64;
    }
    results.push(TestResult {
        name: "session_always_solvable".into(),
        passed: unsolved.is_empty(),
        detail: if unsolved.is_empty() {
            format!(
                "{} levels solved, avg {:.1} moves",
                seeds,
                total_moves as f64 / seeds.max(1) as f64
            )
        } else {
            format!("unsolved seeds: {:?}", unsolved)
        },
    });
    results.push(TestResult {
        name: "session_reports_once".into(),
        passed: wrong_reports.is_empty(),
        detail: format!("{} sessions with wrong report count", wrong_reports.len()),
    });

    // Trivial board
    let (mut trivial, fired) = session_with_reports(0);
    let trivial_ok = trivial.generate_level(2, 1, 0).is_ok() && trivial.is_solved() && trivial.move_count() == 0;
    results.push(TestResult {
        name: "session_trivial_2x1".into(),
        passed: trivial_ok && fired.borrow().len() == 1,
        detail: "2x1 solved on load with 0 moves".into(),
    });

    // Reset keeps layout
    let (mut session, _) = session_with_reports(3);
    let layout_kept = match session.generate_level(7, 7, 3) {
        Ok(before) => {
            let after = session.reset_level();
            before
                .tiles
                .iter()
                .zip(&after.tiles)
                .all(|(a, b)| a.pipe_type == b.pipe_type)
        }
        Err(_) => false,
    };
    results.push(TestResult {
        name: "session_reset_layout".into(),
        passed: layout_kept && session.move_count() == 0,
        detail: "types unchanged, counters zeroed".into(),
    });

    // Rejections don't count
    let (mut session, _) = session_with_reports(4);
    match session.generate_level(7, 7, 4) {
        Ok(snap) => {
            let on_start = session.rotate_tile(snap.start.x, snap.start.y);
            let off_board = session.rotate_tile(99, 99);
            results.push(TestResult {
                name: "session_rejections".into(),
                passed: !on_start.accepted
                    && !off_board.accepted
                    && off_board.rejection != Some(RotateRejection::Animating)
                    && session.move_count() == 0,
                detail: format!("start → {:?}, off-board → {:?}", on_start.rejection, off_board.rejection),
            });
        }
        Err(e) => results.push(TestResult {
            name: "session_rejections".into(),
            passed: false,
            detail: format!("generate_level(7, 7, 4) failed: {}", e),
        }),
    }

    // Timer formatting
    results.push(TestResult {
        name: "session_time_format".into(),
        passed: format_time(125.7) == "02:05",
        detail: format!("125.7s → {}", format_time(125.7)),
    });

    results
}

// ── 5. Presets ──────────────────────────────────────────────────────────

fn validate_presets(verbose: bool) -> Vec<TestResult> {
    println!("--- Presets ---");
    let mut results = Vec::new();

    let presets = match parse_preset_list(LEVELS_JSON) {
        Ok(p) => p,
        Err(e) => {
            results.push(TestResult {
                name: "preset_parse".into(),
                passed: false,
                detail: format!("JSON parse error: {}", e),
            });
            return results;
        }
    };
    results.push(TestResult {
        name: "preset_parse".into(),
        passed: !presets.is_empty(),
        detail: format!("{} presets loaded", presets.len()),
    });

    for preset in &presets {
        let (mut session, _) = session_with_reports(preset.level_number as u64);
        let loaded = session.load_preset(preset);
        let name = format!("preset_level_{}", preset.level_number);
        match loaded {
            Ok(_) => {
                if verbose {
                    if let Some(grid) = session.grid() {
                        println!("level {}:\n{}", preset.level_number, grid);
                    }
                }
                results.push(TestResult {
                    name,
                    passed: session.is_playing(),
                    detail: format!(
                        "{}x{}, {} authored tiles, starts unsolved",
                        preset.width,
                        preset.height,
                        preset.tiles.len()
                    ),
                });
            }
            Err(e) => results.push(TestResult {
                name,
                passed: false,
                detail: e.to_string(),
            }),
        }
    }

    results
}

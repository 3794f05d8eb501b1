use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{anyhow, bail, Context};
use clap::{Parser, ValueEnum};
use parity::{parse_parity_game, timed_solve, Converted, Timing};
use solver::{
    LiftingPolicy, ParityGameSolver, Player, PriorityPromotion, SmallProgressMeasures, Solution,
    StrategyImprovement, Zielonka,
};

/// Solves a parity game given in the PGSolver format.
#[derive(Parser)]
struct Args {
    /// Path of the game file.
    path: PathBuf,

    #[arg(long, value_enum, default_value_t = Algorithm::Zielonka)]
    solver: Algorithm,

    /// Cancel each solver after this many seconds.
    #[arg(long)]
    timeout: Option<u64>,

    /// Strategy improvement iteration cap.
    #[arg(long)]
    max_iterations: Option<usize>,

    /// Also print the winning strategies.
    #[arg(long)]
    strategy: bool,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Algorithm {
    Zielonka,
    Promotion,
    Spm,
    SpmLinear,
    Improvement,
    /// Run every solver and check that they agree.
    All,
}

impl Algorithm {
    fn solvers(self, max_iterations: Option<usize>) -> Vec<Box<dyn ParityGameSolver + Send>> {
        match self {
            Algorithm::Zielonka => vec![Box::new(Zielonka)],
            Algorithm::Promotion => vec![Box::new(PriorityPromotion)],
            Algorithm::Spm => {
                vec![Box::new(SmallProgressMeasures::new(LiftingPolicy::Predecessor))]
            }
            Algorithm::SpmLinear => {
                vec![Box::new(SmallProgressMeasures::new(LiftingPolicy::Linear))]
            }
            Algorithm::Improvement => vec![Box::new(StrategyImprovement { max_iterations })],
            Algorithm::All => {
                let all = [
                    Algorithm::Zielonka,
                    Algorithm::Promotion,
                    Algorithm::Spm,
                    Algorithm::SpmLinear,
                    Algorithm::Improvement,
                ];
                all.into_iter().flat_map(|a| a.solvers(max_iterations)).collect()
            }
        }
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let now = Instant::now();

    let file = std::fs::read_to_string(&args.path)
        .with_context(|| format!("Failed to read {}", args.path.display()))?;
    let pg = parse_parity_game(&file)
        .map_err(|errs| anyhow!("Failed to parse parity game file: {errs:?}"))?;
    let converted = pg.to_game().context("Invalid parity game")?;

    println!("Preprocessing took {:?}", now.elapsed());

    let timeout = args.timeout.map(Duration::from_secs);

    let mut solved = Vec::new();
    for solver in args.solver.solvers(args.max_iterations) {
        if let Timing::Solved { solution, .. } = run(solver, &converted, timeout) {
            solution.validate(&converted.game)?;
            solved.push(solution);
        }
    }

    let Some((first, rest)) = solved.split_first() else {
        bail!("No solver produced a solution");
    };
    let disagrees = |s: &&Solution| Player::BOTH.iter().any(|&p| s.region(p) != first.region(p));
    if let Some(other) = rest.iter().find(disagrees) {
        let (ours, theirs) = (first.region(Player::P0), other.region(Player::P0));
        bail!("Solvers disagree on the region of player 0: {ours:?} vs {theirs:?}");
    }

    print_solution(first, &converted, args.strategy);
    Ok(())
}

fn run<S>(solver: S, converted: &Converted, timeout: Option<Duration>) -> Timing
where
    S: ParityGameSolver + Send + 'static,
{
    let name = solver.name();
    let timing = timed_solve(solver, converted.game.clone(), timeout);

    match &timing {
        Timing::Solved { elapsed, .. } => println!("{name}: solve took {elapsed:?}"),
        Timing::Failed(e) => println!("{name}: failed ({}): {e}", timing.code()),
        _ => println!("{name}: {timing:?} ({})", timing.code()),
    }

    timing
}

fn print_solution(solution: &Solution, converted: &Converted, strategy: bool) {
    if let Some(start) = converted.start {
        let winner = solution.winner(start).map_or(-1, |p| match p {
            Player::P0 => 0,
            Player::P1 => 1,
        });
        println!("Winner from {}: player {winner}", converted.id_of(start));
    }

    for player in Player::BOTH {
        let mut ids =
            solution.region(player).iter().map(|v| converted.id_of(v)).collect::<Vec<_>>();
        ids.sort_unstable();
        println!("Won by {player}: {ids:?}");

        if strategy {
            let mut moves = solution
                .strategy(player)
                .iter()
                .map(|(&v, &w)| (converted.id_of(v), converted.id_of(w)))
                .collect::<Vec<_>>();
            moves.sort_unstable();
            for (v, w) in moves {
                println!("  {v} -> {w}");
            }
        }
    }
}

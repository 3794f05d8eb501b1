use std::cell::RefCell;
use std::sync::Once;

use itertools::Itertools;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::spm::{LinearLifting, PredecessorLifting, ProgressMeasures};
use crate::*;

fn random_game(rng: &mut impl Rng, n: usize, max_priority: usize) -> Game {
    let mut builder = Game::builder();
    let vertices = (0..n)
        .map(|_| {
            let owner = if rng.gen_bool(0.5) { Player::P0 } else { Player::P1 };
            builder.add_vertex(owner, rng.gen_range(0..=max_priority))
        })
        .collect::<Vec<_>>();

    for &v in &vertices {
        for _ in 0..rng.gen_range(1..=3) {
            builder.add_edge(v, vertices[rng.gen_range(0..n)]);
        }
    }

    builder.build().unwrap()
}

fn solvers() -> Vec<Box<dyn ParityGameSolver>> {
    vec![
        Box::new(Zielonka),
        Box::new(PriorityPromotion),
        Box::new(SmallProgressMeasures::new(LiftingPolicy::Predecessor)),
        Box::new(SmallProgressMeasures::new(LiftingPolicy::Linear)),
        Box::new(StrategyImprovement { max_iterations: Some(10_000) }),
    ]
}

fn solve_all(game: &Game) -> Vec<(&'static str, Solution)> {
    solvers()
        .into_iter()
        .map(|solver| {
            let solution = solver.solve(game, &CancelToken::new()).unwrap();
            if let Err(e) = solution.validate(game) {
                panic!("{} produced an invalid solution: {e}\n{game:?}", solver.name());
            }
            (solver.name(), solution)
        })
        .collect()
}

fn assert_agreement(game: &Game, solutions: &[(&'static str, Solution)]) {
    for ((name1, s1), (name2, s2)) in solutions.iter().tuple_windows() {
        for player in Player::BOTH {
            assert_eq!(
                s1.region(player),
                s2.region(player),
                "{name1} and {name2} disagree on the region of {player}\n{game:?}"
            );
        }
    }
}

#[test]
fn solvers_agree_on_random_games() {
    let mut rng = StdRng::seed_from_u64(0x5eed);

    for _ in 0..300 {
        let n = rng.gen_range(1..=12);
        let max_priority = rng.gen_range(0..=5);
        let game = random_game(&mut rng, n, max_priority);

        assert_agreement(&game, &solve_all(&game));
    }
}

#[test]
fn solvers_agree_on_larger_games() {
    let mut rng = StdRng::seed_from_u64(42);

    for (n, max_priority) in [40, 80].into_iter().cartesian_product([2, 7, 20]) {
        let game = random_game(&mut rng, n, max_priority);
        assert_agreement(&game, &solve_all(&game));
    }
}

#[test]
fn solvers_agree_on_subgames() {
    let mut rng = StdRng::seed_from_u64(7);
    let game = random_game(&mut rng, 30, 6);

    // The region of a player is a trap for the opponent, so it is a total
    // subgame won entirely by that player.
    let solution = Zielonka.solve(&game, &CancelToken::new()).unwrap();
    for player in Player::BOTH {
        let sub = game.subgame(solution.region(player));
        assert!(sub.is_total());

        let solutions = solve_all(&sub);
        assert_agreement(&sub, &solutions);
        assert_eq!(solutions[0].1.region(player), sub.active());
    }
}

#[test]
fn small_scenarios_for_every_solver() {
    let mut builder = Game::builder();
    let v0 = builder.add_vertex(Player::P0, 2);
    let v1 = builder.add_vertex(Player::P1, 1);
    builder.add_edge(v0, v1).add_edge(v1, v0);
    let cycle = builder.build().unwrap();

    for (name, solution) in solve_all(&cycle) {
        assert_eq!(solution.region(Player::P0).len(), 2, "{name}");
        assert_eq!(solution.strategy(Player::P0).get(&v0), Some(&v1), "{name}");
        assert_eq!(solution.strategy(Player::P0).get(&v1), None, "{name}");
    }

    let mut builder = Game::builder();
    let v0 = builder.add_vertex(Player::P0, 1);
    builder.add_edge(v0, v0);
    let self_loop = builder.build().unwrap();

    for (name, solution) in solve_all(&self_loop) {
        assert!(solution.region(Player::P0).is_empty(), "{name}");
        assert_eq!(solution.winner(v0), Some(Player::P1), "{name}");
    }
}

#[test]
fn empty_game() {
    let game = Game::builder().build().unwrap();
    for (name, solution) in solve_all(&game) {
        assert!(solution.region(Player::P0).is_empty(), "{name}");
        assert!(solution.region(Player::P1).is_empty(), "{name}");
    }
}

#[test]
fn cancelled_solvers_return_no_solution() {
    let mut rng = StdRng::seed_from_u64(1);
    let game = random_game(&mut rng, 10, 4);

    let cancel = CancelToken::new();
    cancel.cancel();
    for solver in solvers() {
        assert_eq!(solver.solve(&game, &cancel), Err(SolveError::Cancelled), "{}", solver.name());
    }
}

#[test]
fn lifting_is_idempotent_on_random_games() {
    let mut rng = StdRng::seed_from_u64(0x11f7);
    let cancel = CancelToken::new();

    for _ in 0..100 {
        let n = rng.gen_range(1..=15);
        let max_priority = rng.gen_range(0..=5);
        let game = random_game(&mut rng, n, max_priority);

        for (player, policy) in Player::BOTH.into_iter().cartesian_product([
            LiftingPolicy::Linear,
            LiftingPolicy::Predecessor,
        ]) {
            let mut measures = ProgressMeasures::new(&game, player);
            let lifts = match policy {
                LiftingPolicy::Linear => measures.run(&mut LinearLifting::new(&game), &cancel),
                LiftingPolicy::Predecessor => {
                    measures.run(&mut PredecessorLifting::new(&game), &cancel)
                }
            };
            lifts.unwrap();

            for v in game.vertices() {
                let (lifted, _) = measures.lift(v);
                assert!(
                    lifted <= *measures.measure(v),
                    "{v} lifted again for {player} with {policy:?}\n{game:?}"
                );
            }
        }
    }
}

thread_local! {
    static CANCEL_ON_LOG: RefCell<Option<CancelToken>> = RefCell::new(None);
}

/// Raises the token registered by the current thread at the first record.
struct CancelOnLog;

impl log::Log for CancelOnLog {
    fn enabled(&self, _: &log::Metadata) -> bool {
        true
    }

    fn log(&self, _: &log::Record) {
        CANCEL_ON_LOG.with(|token| {
            if let Some(token) = &*token.borrow() {
                token.cancel();
            }
        });
    }

    fn flush(&self) {}
}

/// Cancels `cancel` as soon as the solver running on this thread logs its
/// first progress message.
fn cancel_on_first_log(cancel: Option<&CancelToken>) {
    static LOGGER: CancelOnLog = CancelOnLog;
    static INSTALL: Once = Once::new();

    INSTALL.call_once(|| {
        if log::set_logger(&LOGGER).is_ok() {
            log::set_max_level(log::LevelFilter::Trace);
        }
    });
    CANCEL_ON_LOG.with(|token| *token.borrow_mut() = cancel.cloned());
}

#[test]
fn solvers_stop_when_cancelled_mid_run() {
    // 0(P1, 1) -> 0; 1(P0, 2) -> 1; 2(P0, 0) -> 0, 1
    // Every solver has work left after its first progress message: a second
    // dominion, a second lifting pass or a second improvement round.
    let mut builder = Game::builder();
    let v0 = builder.add_vertex(Player::P1, 1);
    let v1 = builder.add_vertex(Player::P0, 2);
    let v2 = builder.add_vertex(Player::P0, 0);
    builder.add_edge(v0, v0).add_edge(v1, v1).add_edge(v2, v0).add_edge(v2, v1);
    let game = builder.build().unwrap();

    for solver in solvers() {
        let cancel = CancelToken::new();
        cancel_on_first_log(Some(&cancel));
        let result = solver.solve(&game, &cancel);
        cancel_on_first_log(None);

        assert!(cancel.is_cancelled(), "{} never logged", solver.name());
        assert_eq!(result, Err(SolveError::Cancelled), "{}", solver.name());
    }
}

//! Scenarios against the real sugar and minisat. They are ignored by default; to run them, point
//! `SUGARSAT_MINISAT` at a minisat binary and `SUGARSAT_SUGAR_JAR` at the sugar jar and pass
//! `--ignored` to the test harness.
use sugarsat::{Config, Outcome, Problem};
use tempfile::TempDir;

fn real_tools() -> (Config, TempDir) {
    let minisat = std::env::var("SUGARSAT_MINISAT").expect(
        "please set the `SUGARSAT_MINISAT` environment variable to run tests with the real tools",
    );
    let sugar_jar = std::env::var("SUGARSAT_SUGAR_JAR").expect(
        "please set the `SUGARSAT_SUGAR_JAR` environment variable to run tests with the real tools",
    );
    let scratch = tempfile::tempdir().expect("failed to create scratch directory");

    let config = Config::builder()
        .solver(minisat)
        .compiler(sugar_jar)
        .scratch_dir(scratch.path())
        .build()
        .expect("invalid tool configuration");

    (config, scratch)
}

macro_rules! scenario {
    ($name:ident, $domains:expr, $target:expr, $expected:expr) => {
        #[test]
        #[ignore = "needs minisat and sugar"]
        fn $name() {
            let (config, _scratch) = real_tools();

            let report = sugarsat::solve_weighted_sum(&config, $domains, $target)
                .expect("failed to run the tools");

            assert_eq!($expected, report.outcome);
        }
    };
}

scenario!(single_variable, [[1, 2]], 1, Outcome::Satisfiable(vec![1]));
scenario!(
    two_variables,
    [[1, 2], [1, 2]],
    4,
    Outcome::Satisfiable(vec![2, 2])
);
scenario!(
    target_out_of_reach,
    [[1, 2], [1, 2]],
    5,
    Outcome::UnsatisfiableAtEncoding
);

macro_rules! feasible {
    ($name:ident, $domains:expr, $target:expr) => {
        #[test]
        #[ignore = "needs minisat and sugar"]
        fn $name() {
            let (config, _scratch) = real_tools();
            let problem = Problem::weighted_sum($domains, $target).expect("valid problem");

            let report = sugarsat::solve(&config, &problem).expect("failed to run the tools");

            let solution = report.outcome.solution().expect("satisfiable");
            assert_eq!(problem.num_variables(), solution.len());
            assert!(problem.is_solution(solution));
        }
    };
}

feasible!(
    mixed_signs,
    vec![vec![-1, 0, 1], vec![-1, -2, -3], vec![-1, 0, 1], vec![-1, -2, -3]],
    0
);
feasible!(
    eight_actors,
    vec![
        vec![1, 2],
        vec![-1, -2, -3],
        vec![1, 2, 3],
        vec![-1, -2, -3],
        vec![1, 2, 3],
        vec![-1, -3, -2],
        vec![1, 2, 3],
        vec![-1, -2, -3],
    ],
    0
);
feasible!(
    forty_actors,
    std::iter::repeat(vec![1, 2])
        .take(20)
        .chain(std::iter::repeat(vec![-1, -2, -3]).take(20)),
    0
);

#[test]
#[ignore = "needs minisat and sugar"]
fn solver_is_deterministic() {
    let (config, _scratch) = real_tools();
    let problem = Problem::weighted_sum([[-1, 0, 1]; 4], 0).expect("valid problem");

    let first = sugarsat::solve(&config, &problem).expect("failed to run the tools");
    assert!(first.outcome.is_satisfiable());

    for _ in 1..20 {
        let report = sugarsat::solve(&config, &problem).expect("failed to run the tools");
        assert_eq!(first.outcome, report.outcome);
    }
}

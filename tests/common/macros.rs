/// Asserts that vehicle `$idx` was still alive when the generation ended.
#[macro_export]
macro_rules! assert_alive {
    ($report:expr, $idx:expr) => {
        let v = &$report.vehicles[$idx];
        assert!(
            v.alive,
            "Vehicle {} should be alive but was killed by {:?} at tick {:?}",
            $idx,
            v.killed_by,
            v.died_at_tick
        );
    };
}

/// Asserts that vehicle `$idx` died for the given reason.
#[macro_export]
macro_rules! assert_killed_by {
    ($report:expr, $idx:expr, $reason:expr) => {
        let v = &$report.vehicles[$idx];
        assert!(!v.alive, "Vehicle {} should be dead", $idx);
        assert_eq!(v.killed_by, Some($reason), "Vehicle {} kill reason", $idx);
    };
}

/// Asserts strictly decreasing fitness over the listed vehicle indices.
#[macro_export]
macro_rules! assert_fitness_order {
    ($report:expr, $($idx:expr),+ $(,)?) => {
        let order = [$($idx),+];
        for pair in order.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            assert!(
                $report.fitness[a] > $report.fitness[b],
                "Fitness of vehicle {} ({}) should exceed vehicle {} ({})",
                a,
                $report.fitness[a],
                b,
                $report.fitness[b]
            );
        }
    };
}

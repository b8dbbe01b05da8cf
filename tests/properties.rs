#[cfg(test)]
mod test {
    use pamedoids::{
        DissimilarityMatrix, Euclidean, PamClustering, PamState, Phase, Point2, SingleProcess,
        MAX_SWAP_ITERATIONS,
    };

    fn thirteen_points() -> Vec<Point2<f64>> {
        [
            (1., 1.),
            (2., 3.),
            (1., 2.),
            (2., 2.),
            (10., 4.),
            (11., 5.),
            (10., 6.),
            (12., 5.),
            (11., 6.),
            (5., 4.),
            (6., 3.),
            (6., 5.),
            (7., 4.),
        ]
        .iter()
        .map(|&(x, y)| Point2::new(x, y))
        .collect()
    }

    fn hundred_points() -> Vec<Point2<f64>> {
        let centers = [(0.0, 0.0), (40.0, 5.0), (10.0, 30.0), (35.0, 35.0)];
        (0..100)
            .map(|i: usize| {
                let (cx, cy) = centers[i % 4];
                let dx = ((i * 13) % 7) as f64 * 0.3;
                let dy = ((i * 29) % 11) as f64 * 0.2;
                Point2::new(cx + dx, cy + dy)
            })
            .collect()
    }

    // Sequential reference: the same greedy build and swap loop the driver
    // runs, recording the total cost after entering Swapping and after
    // every accepted swap.
    fn reference_fit(
        matrix: &DissimilarityMatrix<f64>,
        clusters: usize,
    ) -> (PamState<'_, f64>, Vec<f64>) {
        let mut state = PamState::new(matrix, clusters).unwrap();
        let n_objects = matrix.len();

        let mut central = 0;
        let mut central_distance = f64::INFINITY;
        for object in 0..n_objects {
            let distance = state.distance_to_all(object);
            if distance < central_distance {
                central_distance = distance;
                central = object;
            }
        }
        state.add_medoid(central);

        while state.phase() == Phase::Building {
            let mut best = 0;
            let mut best_distance = f64::INFINITY;
            for object in 0..n_objects {
                if state.is_medoid(object) {
                    continue;
                }
                let distance = -state.add_medoid_profit(object);
                if distance < best_distance {
                    best_distance = distance;
                    best = object;
                }
            }
            state.add_medoid(best);
        }

        let mut costs = vec![state.total_cost()];
        for _ in 0..MAX_SWAP_ITERATIONS {
            let mut best_change = 0.0;
            let mut best_pair = None;
            for object in 0..n_objects {
                if state.is_medoid(object) {
                    continue;
                }
                for &medoid in state.medoids() {
                    let change = state.swap_result(medoid, object);
                    if change < best_change {
                        best_change = change;
                        best_pair = Some((medoid, object));
                    }
                }
            }
            match best_pair {
                Some((medoid, object)) => {
                    state.swap(medoid, object);
                    costs.push(state.total_cost());
                }
                None => break,
            }
        }
        (state, costs)
    }

    #[test]
    fn total_cost_descends_monotonically() {
        let matrix = DissimilarityMatrix::from_points(&hundred_points(), &Euclidean);
        let (_, costs) = reference_fit(&matrix, 4);
        assert!(costs.len() <= MAX_SWAP_ITERATIONS + 1);
        for pair in costs.windows(2) {
            assert!(pair[1] < pair[0], "cost went from {} to {}", pair[0], pair[1]);
        }
    }

    #[test]
    fn termination_is_a_local_optimum() {
        let matrix = DissimilarityMatrix::from_points(&hundred_points(), &Euclidean);
        let (state, _) = reference_fit(&matrix, 4);
        for object in 0..matrix.len() {
            if state.is_medoid(object) {
                continue;
            }
            for &medoid in state.medoids() {
                assert!(
                    state.swap_result(medoid, object) >= -1e-9,
                    "swap {} -> {} would still improve",
                    medoid,
                    object
                );
            }
        }
    }

    #[test]
    fn accepted_swap_drops_cost_by_its_result() {
        let matrix = DissimilarityMatrix::from_points(&thirteen_points(), &Euclidean);
        let (state, _) = reference_fit(&matrix, 3);
        // replay every candidate swap against a recomputed total cost
        for object in 0..matrix.len() {
            if state.is_medoid(object) {
                continue;
            }
            for &medoid in state.medoids() {
                let predicted = state.swap_result(medoid, object);
                let mut swapped = state.clone();
                swapped.swap(medoid, object);
                let actual = swapped.total_cost() - state.total_cost();
                assert!(
                    (predicted - actual).abs() < 1e-9,
                    "swap {} -> {}: predicted {} actual {}",
                    medoid,
                    object,
                    predicted,
                    actual
                );
            }
        }
    }

    #[test]
    fn reference_and_parallel_driver_agree() {
        let matrix = DissimilarityMatrix::from_points(&hundred_points(), &Euclidean);
        let (state, _) = reference_fit(&matrix, 4);
        let fit = PamClustering::new(4, 4).fit(&matrix, &SingleProcess).unwrap();
        assert_eq!(state.object_medoids(), fit.object_medoids());
        assert_eq!(state.medoids(), fit.medoids());
    }

    #[test]
    fn build_profit_matches_brute_force() {
        let matrix = DissimilarityMatrix::from_points(&thirteen_points(), &Euclidean);
        let mut state = PamState::new(&matrix, 4).unwrap();
        state.add_medoid(12);
        state.add_medoid(0);
        assert_eq!(Phase::Building, state.phase());

        for candidate in 0..matrix.len() {
            if state.is_medoid(candidate) {
                continue;
            }
            let profit = state.add_medoid_profit(candidate);

            // promote the candidate and compare over the objects the profit
            // is defined on: non-medoids other than the candidate itself
            let mut promoted = state.clone();
            promoted.add_medoid(candidate);
            let others: Vec<usize> = (0..matrix.len())
                .filter(|&j| j != candidate && !state.is_medoid(j))
                .collect();
            let before: f64 = others
                .iter()
                .map(|&j| matrix.distance(j, state.object_medoids()[j]))
                .sum();
            let after: f64 = others
                .iter()
                .map(|&j| matrix.distance(j, promoted.object_medoids()[j]))
                .sum();
            assert!(
                (profit - (before - after)).abs() < 1e-9,
                "candidate {}: profit {} brute force {}",
                candidate,
                profit,
                before - after
            );
        }
    }
}

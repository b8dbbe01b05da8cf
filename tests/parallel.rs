#[cfg(test)]
mod test {
    use pamedoids::{
        DissimilarityMatrix, Euclidean, LocalCluster, PamClustering, Point2, SingleProcess,
    };

    // Four loose groups, generated deterministically so every configuration
    // sees bit-identical input.
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

    // Run one world of `ranks` processes, `threads` threads each, and
    // return the labels every rank computed.
    fn run_world(
        matrix: &DissimilarityMatrix<f64>,
        clusters: usize,
        ranks: usize,
        threads: usize,
    ) -> Vec<Vec<usize>> {
        let world = LocalCluster::world(ranks);
        std::thread::scope(|scope| {
            let handles: Vec<_> = world
                .iter()
                .map(|fabric| {
                    scope.spawn(move || {
                        PamClustering::new(clusters, threads)
                            .fit(matrix, fabric)
                            .unwrap()
                            .labels()
                            .to_vec()
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        })
    }

    #[test]
    fn every_rank_agrees_on_the_assignment() {
        let matrix = DissimilarityMatrix::from_points(&hundred_points(), &Euclidean);
        let labels = run_world(&matrix, 4, 4, 1);
        for rank_labels in &labels[1..] {
            assert_eq!(labels[0], *rank_labels);
        }
    }

    #[test]
    fn assignment_is_stable_across_configurations() {
        let matrix = DissimilarityMatrix::from_points(&hundred_points(), &Euclidean);
        let baseline = PamClustering::new(4, 1)
            .fit(&matrix, &SingleProcess)
            .unwrap()
            .labels()
            .to_vec();
        for (ranks, threads) in [(1, 2), (1, 4), (2, 1), (2, 2), (4, 1), (4, 4)] {
            let labels = run_world(&matrix, 4, ranks, threads);
            for rank_labels in &labels {
                assert_eq!(
                    baseline, *rank_labels,
                    "ranks={} threads={} diverged",
                    ranks, threads
                );
            }
        }
    }

    #[test]
    fn repeated_runs_are_identical() {
        let matrix = DissimilarityMatrix::from_points(&hundred_points(), &Euclidean);
        let first = PamClustering::new(4, 2).fit(&matrix, &SingleProcess).unwrap();
        let second = PamClustering::new(4, 2).fit(&matrix, &SingleProcess).unwrap();
        assert_eq!(first.labels(), second.labels());
        assert_eq!(first.medoids(), second.medoids());
        assert_eq!(first.total_cost(), second.total_cost());
    }
}

use std::fs::File;
use std::io::BufReader;
use std::panic;
use std::path::Path;
use std::process::exit;
use std::time::Instant;

use log::info;

use pamedoids::{
    DissimilarityMatrix, Error, Euclidean, Fabric, PamClustering, Result, SingleProcess,
};

use crate::ops::{print_clusters, read_points};

mod ops;

#[macro_use]
extern crate clap;

type Value = f32;

fn main() {
    env_logger::init();
    match panic::catch_unwind(run) {
        Ok(Ok(())) => {}
        Ok(Err(e)) => {
            eprintln!("Error: {}", e);
            exit(1);
        }
        Err(_) => {
            eprintln!("Unknown error!");
            exit(2);
        }
    }
}

fn run() -> Result<()> {
    let matches = clap_app!(pam =>
        (version: "0.1.0")
        (about: "Parallelized Partitioning Around Medoids clustering")
        (@arg CLUSTERS: +required "Number of clusters")
        (@arg INPUT: +required "Path to input file")
        (@arg THREADS: "Number of worker threads, default=1")
        (@arg MATRIX: -m --matrix "Treat input as a dissimilarity matrix instead of 2-D vectors")
    )
    .get_matches();

    let clusters = parse_argument::<usize>(matches.value_of("CLUSTERS").unwrap(), "cluster count")?;
    let threads = parse_argument::<usize>(matches.value_of("THREADS").unwrap_or("1"), "thread count")?;
    if threads < 1 {
        return Err(Error::InvalidArgument(
            "at least one worker thread is required".to_string(),
        ));
    }
    let input = Path::new(matches.value_of("INPUT").unwrap());
    if !input.exists() {
        return Err(Error::InvalidArgument(format!(
            "unable to locate input file {}",
            input.display()
        )));
    }

    let fabric = SingleProcess;

    let (matrix, read_time) = timed(&fabric, || {
        if matches.is_present("MATRIX") {
            DissimilarityMatrix::load(BufReader::new(File::open(input)?))
        } else {
            let points = read_points::<Value>(input)?;
            Ok(DissimilarityMatrix::from_points(
                &points,
                &Euclidean::default(),
            ))
        }
    })?;

    let (fit, pam_time) = timed(&fabric, || {
        PamClustering::new(clusters, threads).fit(&matrix, &fabric)
    })?;

    let rank = Fabric::<Value>::rank(&fabric);
    info!("{}\t{:.6}\t{:.6}", rank, read_time, pam_time);
    if rank == 0 {
        print_clusters(fit.labels());
    }
    Ok(())
}

fn parse_argument<T: std::str::FromStr>(value: &str, what: &str) -> Result<T> {
    value
        .parse()
        .map_err(|_| Error::InvalidArgument(format!("unreadable {} '{}'", what, value)))
}

// Ranks enter and leave together so the reported time covers the slowest one.
fn timed<T>(fabric: &impl Fabric<Value>, work: impl FnOnce() -> Result<T>) -> Result<(T, f64)> {
    fabric.barrier()?;
    let start = Instant::now();
    let value = work()?;
    fabric.barrier()?;
    Ok((value, start.elapsed().as_secs_f64()))
}

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use std::str::FromStr;

use num_traits::Float;

use pamedoids::{Error, Point2, Result};

/// Reads a vectors file formatted as (whitespace separated):
///     <ignored> N
///     <ignored> X Y
/// with one line per vector. The first field of every line is ignored
/// (typically an id). Content past the N-th vector is ignored.
pub(crate) fn read_points<F>(path: &Path) -> Result<Vec<Point2<F>>>
where
    F: Float + FromStr,
{
    let mut text = String::new();
    BufReader::new(File::open(path)?).read_to_string(&mut text)?;
    let mut tokens = text.split_whitespace();

    next_token(&mut tokens)?;
    let count: usize = next_token(&mut tokens)?
        .parse()
        .map_err(|_| Error::VectorsFormat("unreadable vector count".to_string()))?;

    let mut points = Vec::with_capacity(count);
    for _ in 0..count {
        next_token(&mut tokens)?;
        let x = next_value(&mut tokens)?;
        let y = next_value(&mut tokens)?;
        points.push(Point2::new(x, y));
    }
    Ok(points)
}

fn next_token<'a>(tokens: &mut impl Iterator<Item = &'a str>) -> Result<&'a str> {
    tokens
        .next()
        .ok_or_else(|| Error::VectorsFormat("truncated vectors stream".to_string()))
}

fn next_value<'a, F>(tokens: &mut impl Iterator<Item = &'a str>) -> Result<F>
where
    F: FromStr,
{
    let token = next_token(tokens)?;
    token
        .parse()
        .map_err(|_| Error::VectorsFormat(format!("unreadable coordinate '{}'", token)))
}

/// One `<object>\t<cluster_id>` line per object.
pub(crate) fn print_clusters(labels: &[usize]) {
    for (object, cluster) in labels.iter().enumerate() {
        println!("{}\t{}", object, cluster);
    }
}

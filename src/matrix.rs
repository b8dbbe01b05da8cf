use std::fmt::Display;
use std::io::{Read, Write};
use std::str::FromStr;

use ndarray::{Array2, Zip};
use num_traits::Float;

use crate::error::{Error, Result};

/// A point in the 2-D input space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point2<F> {
    pub x: F,
    pub y: F,
}

impl<F> Point2<F> {
    pub fn new(x: F, y: F) -> Self {
        Self { x, y }
    }
}

/// Pairwise dissimilarity between two points.
pub trait Dissimilarity<F>
where
    F: Float,
{
    /// Nonnegative dissimilarity between `a` and `b`.
    fn dissimilarity(&self, a: &Point2<F>, b: &Point2<F>) -> F;
}

/// Euclidean distance `sqrt((x_i - x_j)^2 + (y_i - y_j)^2)`.
///
///     use pamedoids::{Dissimilarity, Euclidean, Point2};
///
///     let a = Point2::new(0.0_f64, 0.0);
///     let b = Point2::new(3.0, 4.0);
///     let d = Euclidean::default().dissimilarity(&a, &b);
///     assert!((d - 5.0).abs() < 1e-12);
#[derive(Debug, Default, Clone)]
pub struct Euclidean;

impl<F> Dissimilarity<F> for Euclidean
where
    F: Float,
{
    fn dissimilarity(&self, a: &Point2<F>, b: &Point2<F>) -> F {
        let dx = a.x - b.x;
        let dy = a.y - b.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// Read-only N x N lookup of nonnegative distances.
///
/// Every participant of a run holds an identical, fully replicated copy.
/// The matrix never changes after construction.
#[derive(Debug, Clone, PartialEq)]
pub struct DissimilarityMatrix<F> {
    distances: Array2<F>,
}

impl<F> DissimilarityMatrix<F>
where
    F: Float,
{
    /// Number of objects N.
    pub fn len(&self) -> usize {
        self.distances.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Distance between objects `i` and `j`, both `< len()`.
    pub fn distance(&self, i: usize, j: usize) -> F {
        self.distances[[i, j]]
    }

    /// Build the full matrix from 2-D points. The diagonal is zero and the
    /// metric is not consulted for it.
    pub fn from_points<D>(points: &[Point2<F>], metric: &D) -> Self
    where
        F: Send + Sync,
        D: Dissimilarity<F> + Sync,
    {
        let n = points.len();
        let mut distances = Array2::<F>::zeros((n, n));
        Zip::indexed(&mut distances).par_for_each(|(i, j), d| {
            if i != j {
                *d = metric.dissimilarity(&points[i], &points[j]);
            }
        });
        Self { distances }
    }

    /// Parse a matrix from a text stream: a leading integer N followed by
    /// exactly N * N whitespace-separated distances in row-major order.
    pub fn load<R>(mut input: R) -> Result<Self>
    where
        R: Read,
        F: FromStr,
    {
        let mut text = String::new();
        input.read_to_string(&mut text)?;
        let mut tokens = text.split_whitespace();
        let size: usize = tokens
            .next()
            .ok_or_else(|| Error::MatrixFormat("missing size header".to_string()))?
            .parse()
            .map_err(|_| Error::MatrixFormat("unreadable size header".to_string()))?;

        let mut distances = Vec::with_capacity(size * size);
        for token in tokens {
            let distance = token
                .parse::<F>()
                .map_err(|_| Error::MatrixFormat(format!("unreadable distance '{}'", token)))?;
            distances.push(distance);
        }
        if distances.len() != size * size {
            return Err(Error::MatrixFormat(format!(
                "expected {} distances, found {}",
                size * size,
                distances.len()
            )));
        }
        let distances = Array2::from_shape_vec((size, size), distances)
            .map_err(|e| Error::MatrixFormat(e.to_string()))?;
        Ok(Self { distances })
    }

    /// Write the matrix in the format accepted by [`DissimilarityMatrix::load`].
    pub fn save<W>(&self, mut output: W) -> Result<()>
    where
        W: Write,
        F: Display,
    {
        write!(output, "{}", self.len())?;
        for distance in self.distances.iter() {
            write!(output, " {}", distance)?;
        }
        Ok(())
    }
}

//! Sub-pixel sample placement.

use rand::seq::SliceRandom;
use rand::RngCore;
use serde::{Deserialize, Serialize};

/// Square grid of sample flags with bounds-checked access.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleGrid {
    size: usize,
    cells: Vec<bool>,
}

impl SampleGrid {
    /// A `size` x `size` grid with no samples set.
    pub fn new(size: usize) -> Self {
        Self {
            size,
            cells: vec![false; size * size],
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// `None` when `(x, y)` is outside the grid.
    pub fn get(&self, x: usize, y: usize) -> Option<bool> {
        self.index(x, y).map(|i| self.cells[i])
    }

    /// Returns false and leaves the grid untouched when `(x, y)` is outside it.
    pub fn set(&mut self, x: usize, y: usize, value: bool) -> bool {
        match self.index(x, y) {
            Some(i) => {
                self.cells[i] = value;
                true
            }
            None => false,
        }
    }

    /// Number of cells flagged as samples.
    pub fn count(&self) -> usize {
        self.cells.iter().filter(|&&c| c).count()
    }

    /// Flagged cells in row-major order.
    pub fn samples(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        let size = self.size;
        self.cells
            .iter()
            .enumerate()
            .filter(|&(_, &c)| c)
            .map(move |(i, _)| (i / size, i % size))
    }

    fn index(&self, x: usize, y: usize) -> Option<usize> {
        (x < self.size && y < self.size).then(|| x * self.size + y)
    }
}

/// Multi-jittered sample mask over a `fine_grid` x `fine_grid` grid.
///
/// The grid is divided into `floor(sqrt(fine_grid))` coarse bands per axis
/// and one sample is placed in every coarse cell. Within each band the fine
/// rows (and columns) are handed out through a random permutation, so no
/// fine row or column ever holds more than one sample.
pub fn multi_jitter(fine_grid: usize, rng: &mut dyn RngCore) -> SampleGrid {
    let coarse = coarse_size(fine_grid);
    let mut grid = SampleGrid::new(fine_grid);

    let mut row_perms: Vec<Vec<usize>> = Vec::with_capacity(coarse);
    let mut col_perms: Vec<Vec<usize>> = Vec::with_capacity(coarse);
    for _ in 0..coarse {
        let mut perm: Vec<usize> = (0..coarse).collect();
        perm.shuffle(rng);
        row_perms.push(perm);

        let mut perm: Vec<usize> = (0..coarse).collect();
        perm.shuffle(rng);
        col_perms.push(perm);
    }

    for i in 0..coarse {
        for j in 0..coarse {
            let x = i * coarse + row_perms[i][j];
            let y = j * coarse + col_perms[j][i];
            grid.set(x, y, true);
        }
    }

    grid
}

/// Largest integer whose square does not exceed `n`.
fn coarse_size(n: usize) -> usize {
    let mut root = (n as f64).sqrt() as usize;
    while root * root > n {
        root -= 1;
    }
    while (root + 1) * (root + 1) <= n {
        root += 1;
    }
    root
}

/// How sample offsets are chosen inside each pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SamplePattern {
    /// One sample through the pixel center.
    Center,
    /// Multi-jittered samples over a fine grid of the given size.
    MultiJitter { fine_grid: usize },
}

impl Default for SamplePattern {
    fn default() -> Self {
        SamplePattern::MultiJitter { fine_grid: 128 }
    }
}

impl SamplePattern {
    /// Samples produced per pixel.
    pub fn samples_per_pixel(&self) -> usize {
        match *self {
            SamplePattern::Center => 1,
            SamplePattern::MultiJitter { fine_grid } => {
                let coarse = coarse_size(fine_grid);
                coarse * coarse
            }
        }
    }

    /// Fresh offsets for one pixel, each in `[0, 1)` on both axes.
    pub fn offsets(&self, rng: &mut dyn RngCore) -> SampleOffsets {
        match *self {
            SamplePattern::Center => SampleOffsets {
                source: Source::Center { done: false },
            },
            SamplePattern::MultiJitter { fine_grid } => SampleOffsets {
                source: Source::Grid {
                    grid: multi_jitter(fine_grid, rng),
                    next: 0,
                },
            },
        }
    }
}

/// Lazy sequence of `(dx, dy)` sub-pixel offsets for one pixel.
#[derive(Debug, Clone)]
pub struct SampleOffsets {
    source: Source,
}

#[derive(Debug, Clone)]
enum Source {
    Center { done: bool },
    Grid { grid: SampleGrid, next: usize },
}

impl Iterator for SampleOffsets {
    type Item = (f64, f64);

    fn next(&mut self) -> Option<Self::Item> {
        match &mut self.source {
            Source::Center { done } => {
                if *done {
                    return None;
                }
                *done = true;
                Some((0.5, 0.5))
            }
            Source::Grid { grid, next } => {
                let size = grid.size();
                while *next < size * size {
                    let (x, y) = (*next / size, *next % size);
                    *next += 1;
                    if grid.get(x, y) == Some(true) {
                        let fine = size as f64;
                        return Some(((x as f64 + 0.5) / fine, (y as f64 + 0.5) / fine));
                    }
                }
                None
            }
        }
    }
}

//! Exact-cover encoding of a hypothesis pool.
//!
//! Every tracklet owns two boundary slots: a tail (rows `0..N`) and a head
//! (rows `N..2N`). Each hypothesis becomes one column of a binary matrix
//! marking the slots it explains. A consistent explanation of the pool picks
//! columns that cover every slot exactly once.

use ndarray::{Array1, Array2};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::optimiser::errors::{OptimiserError, OptimiserResult};
use crate::optimiser::hypothesis::{Event, TrackHypothesis};

/// How track ids that no hypothesis names are handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum IdSpace {
    /// Ids must cover `1..=N` without gaps.
    #[default]
    Strict,
    /// Take `N = max(id)` and keep rows for unused ids. Any such row can
    /// never be covered, so the program is infeasible.
    Lenient,
}

/// Sparse 0/1 matrix in compressed-column form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SparseBinaryMatrix {
    nrows: usize,
    ncols: usize,
    col_ptr: Vec<usize>,
    row_idx: Vec<usize>,
}

impl SparseBinaryMatrix {
    /// Build from the row indices of the nonzero entries of each column.
    ///
    /// Indices are sorted and duplicates collapse into a single entry.
    pub(crate) fn from_columns(nrows: usize, columns: Vec<Vec<usize>>) -> Self {
        let ncols = columns.len();
        let mut col_ptr = Vec::with_capacity(ncols + 1);
        let mut row_idx = Vec::new();
        col_ptr.push(0);
        for mut rows in columns {
            rows.sort_unstable();
            rows.dedup();
            debug_assert!(rows.iter().all(|&r| r < nrows));
            row_idx.extend(rows);
            col_ptr.push(row_idx.len());
        }
        Self {
            nrows,
            ncols,
            col_ptr,
            row_idx,
        }
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.nrows, self.ncols)
    }

    pub fn nrows(&self) -> usize {
        self.nrows
    }

    pub fn ncols(&self) -> usize {
        self.ncols
    }

    /// Number of stored ones.
    pub fn nnz(&self) -> usize {
        self.row_idx.len()
    }

    /// Sorted row indices of the ones in column `j`.
    pub fn column(&self, j: usize) -> &[usize] {
        &self.row_idx[self.col_ptr[j]..self.col_ptr[j + 1]]
    }

    pub fn columns(&self) -> impl Iterator<Item = &[usize]> + '_ {
        (0..self.ncols).map(move |j| self.column(j))
    }

    pub fn get(&self, row: usize, col: usize) -> f64 {
        if self.column(col).binary_search(&row).is_ok() {
            1.0
        } else {
            0.0
        }
    }

    /// Whether some row holds no ones, without transposing.
    pub fn has_empty_rows(&self) -> bool {
        let mut covered = self.row_idx.clone();
        covered.sort_unstable();
        covered.dedup();
        covered.len() < self.nrows
    }

    /// Column indices of the ones in each row.
    pub fn rows(&self) -> Vec<Vec<usize>> {
        let mut rows = vec![Vec::new(); self.nrows];
        for (j, column) in self.columns().enumerate() {
            for &r in column {
                rows[r].push(j);
            }
        }
        rows
    }

    /// Matrix-vector product `A x`.
    pub fn mul_vec(&self, x: &[f64]) -> Array1<f64> {
        let mut out = Array1::zeros(self.nrows);
        for (j, column) in self.columns().enumerate() {
            let xj = x.get(j).copied().unwrap_or(0.0);
            for &r in column {
                out[r] += xj;
            }
        }
        out
    }

    /// Dense copy, for inspection only.
    pub fn to_dense(&self) -> Array2<f64> {
        let mut dense = Array2::zeros((self.nrows, self.ncols));
        for (j, column) in self.columns().enumerate() {
            for &r in column {
                dense[[r, j]] = 1.0;
            }
        }
        dense
    }
}

/// The binary program `min cost·x  s.t.  A x = 1,  x ∈ {0,1}^n`.
#[derive(Debug, Clone, PartialEq)]
pub struct ConstraintSystem {
    a: SparseBinaryMatrix,
    cost: Array1<f64>,
    num_tracklets: usize,
}

impl ConstraintSystem {
    /// Encode `hypotheses`, column `j` being hypothesis `j`.
    pub fn build(hypotheses: &[TrackHypothesis], id_space: IdSpace) -> OptimiserResult<Self> {
        let num_tracklets = hypotheses.iter().map(|h| h.id).max().unwrap_or(0) as usize;

        for (index, h) in hypotheses.iter().enumerate() {
            if h.id == 0 {
                return Err(OptimiserError::InvalidTrackId { index, id: h.id });
            }
            for id in h.event.references() {
                if id == 0 {
                    return Err(OptimiserError::InvalidTrackId { index, id });
                }
                if id as usize > num_tracklets {
                    return Err(OptimiserError::ReferenceOutOfRange {
                        index,
                        id,
                        num_tracklets,
                    });
                }
            }
        }

        if id_space == IdSpace::Strict {
            check_dense_ids(hypotheses, num_tracklets)?;
        }

        let n = num_tracklets;
        let tail = |id: u32| slot(id);
        let head = |id: u32| n + slot(id);

        let columns = hypotheses
            .iter()
            .map(|h| match h.event {
                Event::FalsePositive => vec![tail(h.id), head(h.id)],
                Event::Initialize => vec![head(h.id)],
                Event::Terminate | Event::Apoptosis => vec![tail(h.id)],
                Event::Link { link_id } => vec![tail(h.id), head(link_id)],
                Event::Divide {
                    child_one_id,
                    child_two_id,
                } => vec![tail(h.id), head(child_one_id), head(child_two_id)],
                Event::Merge {
                    parent_one_id,
                    parent_two_id,
                } => vec![head(h.id), tail(parent_one_id), tail(parent_two_id)],
            })
            .collect();

        Ok(Self {
            a: SparseBinaryMatrix::from_columns(2 * n, columns),
            cost: hypotheses.iter().map(TrackHypothesis::cost).collect(),
            num_tracklets,
        })
    }

    pub fn matrix(&self) -> &SparseBinaryMatrix {
        &self.a
    }

    /// Negated log-likelihoods, one per hypothesis.
    pub fn cost(&self) -> &Array1<f64> {
        &self.cost
    }

    /// `N`, the largest track id in the pool.
    pub fn num_tracklets(&self) -> usize {
        self.num_tracklets
    }

    pub fn num_hypotheses(&self) -> usize {
        self.a.ncols()
    }

    /// Right-hand side `b` of `A x = b`.
    pub fn rhs(&self) -> Array1<f64> {
        Array1::ones(self.a.nrows())
    }

    /// Row of the tail slot for 1-based track `id`.
    pub fn tail_row(&self, id: u32) -> usize {
        slot(id)
    }

    /// Row of the head slot for 1-based track `id`.
    pub fn head_row(&self, id: u32) -> usize {
        self.num_tracklets + slot(id)
    }

    /// Rows no hypothesis can cover.
    pub fn empty_rows(&self) -> Vec<usize> {
        self.a
            .rows()
            .iter()
            .enumerate()
            .filter_map(|(r, cols)| if cols.is_empty() { Some(r) } else { None })
            .collect()
    }

    pub fn objective(&self, x: &[f64]) -> f64 {
        self.cost.iter().zip(x).map(|(c, v)| c * v).sum()
    }

    /// Whether `x` covers every slot exactly once.
    pub fn is_satisfied_by(&self, x: &[f64]) -> bool {
        x.len() == self.num_hypotheses()
            && self
                .a
                .mul_vec(x)
                .iter()
                .all(|&covered| (covered - 1.0).abs() < 1e-6)
    }
}

/// Most missing ids listed in a `MalformedIdentifierSpace` error.
const MAX_REPORTED_GAPS: usize = 8;

/// Fail unless the subject ids cover `1..=num_tracklets`.
///
/// Works on the distinct ids only, so a single huge id costs nothing extra.
fn check_dense_ids(hypotheses: &[TrackHypothesis], num_tracklets: usize) -> OptimiserResult<()> {
    let mut ids: Vec<u32> = hypotheses.iter().map(|h| h.id).collect();
    ids.sort_unstable();
    ids.dedup();

    let missing_count = num_tracklets - ids.len();
    if missing_count == 0 {
        return Ok(());
    }

    let mut first_missing = Vec::new();
    let mut expected = 1u32;
    for &id in &ids {
        while expected < id && first_missing.len() < MAX_REPORTED_GAPS {
            first_missing.push(expected);
            expected += 1;
        }
        if first_missing.len() == MAX_REPORTED_GAPS {
            break;
        }
        expected = id.saturating_add(1);
    }

    Err(OptimiserError::MalformedIdentifierSpace {
        missing_count,
        first_missing,
    })
}

/// 1-based track id to 0-based slot index.
fn slot(id: u32) -> usize {
    id as usize - 1
}

//! Maximum-weight bipartite matching

use ndarray::ArrayView2;

/// Result of a bipartite matching
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Matching {
    /// Sum of the weights of the chosen edges
    pub total: f64,
    /// Chosen `(row, column)` pairs, ordered by column
    pub pairs: Vec<(usize, usize)>,
}

/// Maximum-weight matching between the rows and columns of `weights`
///
/// The matching does not have to be perfect: edges with weight `<= 0` are
/// never chosen. Solved with the Hungarian algorithm on the zero-padded
/// square matrix, O(n^3) for `n = max(rows, cols)`.
pub fn max_weight_matching(weights: ArrayView2<f64>) -> Matching {
    let (rows, cols) = weights.dim();
    if rows == 0 || cols == 0 {
        return Matching::default();
    }

    let n = rows.max(cols);
    // Minimization form; padding and non-positive edges cost nothing.
    let cost = |i: usize, j: usize| -> f64 {
        if i < rows && j < cols {
            -weights[[i, j]].max(0.0)
        } else {
            0.0
        }
    };

    // 1-based potentials; column 0 is a sentinel.
    let mut u = vec![0.0; n + 1];
    let mut v = vec![0.0; n + 1];
    // assigned[j] = row (1-based) matched to column j, 0 if free
    let mut assigned = vec![0usize; n + 1];
    let mut way = vec![0usize; n + 1];

    for i in 1..=n {
        assigned[0] = i;
        let mut j0 = 0;
        let mut min_v = vec![f64::INFINITY; n + 1];
        let mut used = vec![false; n + 1];

        loop {
            used[j0] = true;
            let i0 = assigned[j0];
            let mut delta = f64::INFINITY;
            let mut j1 = 0;
            for j in 1..=n {
                if used[j] {
                    continue;
                }
                let reduced = cost(i0 - 1, j - 1) - u[i0] - v[j];
                if reduced < min_v[j] {
                    min_v[j] = reduced;
                    way[j] = j0;
                }
                if min_v[j] < delta {
                    delta = min_v[j];
                    j1 = j;
                }
            }
            for j in 0..=n {
                if used[j] {
                    u[assigned[j]] += delta;
                    v[j] -= delta;
                } else {
                    min_v[j] -= delta;
                }
            }
            j0 = j1;
            if assigned[j0] == 0 {
                break;
            }
        }

        // Flip the augmenting path.
        loop {
            let j1 = way[j0];
            assigned[j0] = assigned[j1];
            j0 = j1;
            if j0 == 0 {
                break;
            }
        }
    }

    let mut matching = Matching::default();
    for (j, &i) in assigned.iter().enumerate().skip(1) {
        if i == 0 || i > rows || j > cols {
            continue;
        }
        let weight = weights[[i - 1, j - 1]];
        if weight > 0.0 {
            matching.total += weight;
            matching.pairs.push((i - 1, j - 1));
        }
    }
    matching
}

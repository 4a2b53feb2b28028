//! Pairwise-complete Pearson correlation across table columns.

use statrs::statistics::Statistics;

use crate::domain::TimeTable;

/// Symmetric label × label correlation matrix.
///
/// A cell is `None` when the pair has fewer than two overlapping defined rows
/// or either side is constant over the overlap.
#[derive(Debug, Clone, PartialEq)]
pub struct CorrelationMatrix {
    pub labels: Vec<String>,
    pub values: Vec<Vec<Option<f64>>>,
}

impl CorrelationMatrix {
    pub fn get(&self, a: &str, b: &str) -> Option<f64> {
        let i = self.labels.iter().position(|l| l == a)?;
        let j = self.labels.iter().position(|l| l == b)?;
        self.values[i][j]
    }
}

/// Pearson correlation over rows where both series are defined.
pub fn pearson_pairwise(a: &[Option<f64>], b: &[Option<f64>]) -> Option<f64> {
    let pairs: Vec<(f64, f64)> = a
        .iter()
        .zip(b)
        .filter_map(|(x, y)| Some(((*x)?, (*y)?)))
        .collect();
    if pairs.len() < 2 {
        return None;
    }

    let (x, y): (Vec<f64>, Vec<f64>) = pairs.into_iter().unzip();
    let sd_x = x.iter().std_dev();
    let sd_y = y.iter().std_dev();
    if !(sd_x > 0.0 && sd_y > 0.0) {
        return None;
    }
    let r = x.iter().covariance(y.iter()) / (sd_x * sd_y);
    r.is_finite().then(|| r.clamp(-1.0, 1.0))
}

/// Correlate every column pair of `table`.
pub fn correlation_matrix(table: &TimeTable) -> CorrelationMatrix {
    let cols = table.columns();
    let n = cols.len();
    let mut values = vec![vec![None; n]; n];

    for i in 0..n {
        // Self-correlation is exactly 1 whenever it is defined at all.
        values[i][i] = pearson_pairwise(&cols[i].values, &cols[i].values).map(|_| 1.0);
        for j in (i + 1)..n {
            let r = pearson_pairwise(&cols[i].values, &cols[j].values);
            values[i][j] = r;
            values[j][i] = r;
        }
    }

    CorrelationMatrix {
        labels: cols.iter().map(|c| c.label.clone()).collect(),
        values,
    }
}

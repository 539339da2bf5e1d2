use crate::aggregation::JoinedRow;
use serde::{Deserialize, Serialize};

pub const CORRELATION_FEATURES: [&str; 4] = [
    "track_popularity",
    "artist_popularity",
    "artist_followers",
    "track_duration_min",
];

/// Pearson correlations between the numeric features, `None` where undefined.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CorrelationMatrix {
    pub features: Vec<String>,
    pub values: Vec<Vec<Option<f64>>>,
}

impl CorrelationMatrix {
    pub fn get(&self, a: &str, b: &str) -> Option<f64> {
        let i = self.features.iter().position(|f| f == a)?;
        let j = self.features.iter().position(|f| f == b)?;
        self.values[i][j]
    }
}

fn pearson(x: &[f64], y: &[f64]) -> Option<f64> {
    let n = x.len();
    if n < 2 || n != y.len() {
        return None;
    }
    let mean_x = x.iter().sum::<f64>() / n as f64;
    let mean_y = y.iter().sum::<f64>() / n as f64;

    let (mut cov, mut var_x, mut var_y) = (0.0, 0.0, 0.0);
    for (a, b) in x.iter().zip(y) {
        let dx = a - mean_x;
        let dy = b - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }
    if var_x == 0.0 || var_y == 0.0 {
        return None;
    }
    Some((cov / (var_x.sqrt() * var_y.sqrt())).clamp(-1.0, 1.0))
}

pub fn correlation_matrix(rows: &[JoinedRow]) -> CorrelationMatrix {
    let columns: [Vec<f64>; 4] = [
        rows.iter().map(|r| r.track_popularity as f64).collect(),
        rows.iter().map(|r| r.artist_popularity as f64).collect(),
        rows.iter().map(|r| r.artist_followers as f64).collect(),
        rows.iter().map(|r| r.track_duration_min).collect(),
    ];

    let values = (0..columns.len())
        .map(|i| {
            (0..columns.len())
                .map(|j| {
                    let r = pearson(&columns[i], &columns[j]);
                    if i == j {
                        r.map(|_| 1.0)
                    } else {
                        r
                    }
                })
                .collect()
        })
        .collect();

    CorrelationMatrix {
        features: CORRELATION_FEATURES.iter().map(|f| f.to_string()).collect(),
        values,
    }
}

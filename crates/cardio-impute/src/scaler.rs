/// Zero-mean, unit-variance scaling that ignores missing cells.
///
/// Uses the population standard deviation. A constant or empty column keeps
/// a scale of 1 so it passes through centred but unscaled.
#[derive(Debug, Clone, PartialEq)]
pub struct StandardScaler {
    means: Vec<f64>,
    scales: Vec<f64>,
}

impl StandardScaler {
    /// Fits one mean/scale pair per column.
    pub fn fit(columns: &[Vec<Option<f64>>]) -> Self {
        let mut means = Vec::with_capacity(columns.len());
        let mut scales = Vec::with_capacity(columns.len());
        for column in columns {
            let present: Vec<f64> = column.iter().flatten().copied().collect();
            if present.is_empty() {
                means.push(0.0);
                scales.push(1.0);
                continue;
            }
            let n = present.len() as f64;
            let mean = present.iter().sum::<f64>() / n;
            let variance = present.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
            let std = variance.sqrt();
            means.push(mean);
            scales.push(if std > f64::EPSILON { std } else { 1.0 });
        }
        Self { means, scales }
    }

    pub fn transform(&self, columns: &mut [Vec<Option<f64>>]) {
        for ((column, mean), scale) in columns.iter_mut().zip(&self.means).zip(&self.scales) {
            for value in column.iter_mut().flatten() {
                *value = (*value - mean) / scale;
            }
        }
    }
}

//! Seeded tree-ensemble price regressor.
//!
//! A least-squares trend over the month counter carries the long-run drift, and a
//! bagged forest of regression trees fits what the trend leaves behind (seasonality,
//! rainfall and WPI effects).

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use super::model::{FeatureRow, ModelError, PriceModel};
use super::series::HistoricalSample;

pub const DEFAULT_FOREST_SEED: u64 = 42;

const MIN_FIT_SAMPLES: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForestSettings {
    pub trees: usize,
    pub max_depth: usize,
    pub min_samples_split: usize,
    /// Features considered at each split, drawn at random without replacement.
    pub max_features: usize,
    pub seed: u64,
}

impl Default for ForestSettings {
    fn default() -> Self {
        Self {
            trees: 100,
            max_depth: 8,
            min_samples_split: 2,
            max_features: FeatureRow::WIDTH,
            seed: DEFAULT_FOREST_SEED,
        }
    }
}

impl ForestSettings {
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct LinearTrend {
    intercept: f64,
    slope: f64,
}

impl LinearTrend {
    fn fit(periods: &[f64], prices: &[f64]) -> Result<Self, ModelError> {
        let n = periods.len() as f64;
        let mean_period = periods.iter().sum::<f64>() / n;
        let mean_price = prices.iter().sum::<f64>() / n;

        let (covariance, variance) = periods.iter().zip(prices).fold(
            (0.0, 0.0),
            |(covariance, variance), (period, price)| {
                let dt = period - mean_period;
                (covariance + dt * (price - mean_price), variance + dt * dt)
            },
        );

        if variance <= f64::EPSILON {
            return Err(ModelError::DegenerateSeries);
        }

        let slope = covariance / variance;
        Ok(Self {
            intercept: mean_price - slope * mean_period,
            slope,
        })
    }

    fn at(&self, period: f64) -> f64 {
        self.intercept + self.slope * period
    }
}

#[derive(Debug, Clone, Copy)]
enum Node {
    Leaf {
        value: f64,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
}

struct TrainingSet<'a> {
    features: &'a [[f64; FeatureRow::WIDTH]],
    targets: &'a [f64],
}

struct Split {
    feature: usize,
    threshold: f64,
}

#[derive(Debug, Clone)]
struct RegressionTree {
    nodes: Vec<Node>,
}

impl RegressionTree {
    fn fit(
        data: &TrainingSet<'_>,
        indices: Vec<usize>,
        settings: &ForestSettings,
        rng: &mut StdRng,
    ) -> Self {
        let mut tree = Self { nodes: Vec::new() };
        tree.grow(data, indices, 0, settings, rng);
        tree
    }

    fn grow(
        &mut self,
        data: &TrainingSet<'_>,
        indices: Vec<usize>,
        depth: usize,
        settings: &ForestSettings,
        rng: &mut StdRng,
    ) -> usize {
        let mean = indices.iter().map(|&i| data.targets[i]).sum::<f64>() / indices.len() as f64;
        let slot = self.nodes.len();
        self.nodes.push(Node::Leaf { value: mean });

        if depth >= settings.max_depth || indices.len() < settings.min_samples_split.max(2) {
            return slot;
        }

        let Some(split) = best_split(data, &indices, settings.max_features, rng) else {
            return slot;
        };

        let (left_indices, right_indices): (Vec<usize>, Vec<usize>) = indices
            .into_iter()
            .partition(|&i| data.features[i][split.feature] <= split.threshold);

        let left = self.grow(data, left_indices, depth + 1, settings, rng);
        let right = self.grow(data, right_indices, depth + 1, settings, rng);
        self.nodes[slot] = Node::Split {
            feature: split.feature,
            threshold: split.threshold,
            left,
            right,
        };
        slot
    }

    fn predict(&self, row: &[f64; FeatureRow::WIDTH]) -> f64 {
        let mut cursor = 0;
        loop {
            match self.nodes[cursor] {
                Node::Leaf { value } => return value,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => cursor = if row[feature] <= threshold { left } else { right },
            }
        }
    }
}

/// Variance-reduction split search over a random subset of features.
fn best_split(
    data: &TrainingSet<'_>,
    indices: &[usize],
    max_features: usize,
    rng: &mut StdRng,
) -> Option<Split> {
    let n = indices.len();
    if n < 2 {
        return None;
    }

    let mut candidates: Vec<usize> = (0..FeatureRow::WIDTH).collect();
    candidates.shuffle(rng);
    candidates.truncate(max_features.clamp(1, FeatureRow::WIDTH));

    let total: f64 = indices.iter().map(|&i| data.targets[i]).sum();
    // Maximising sum²/n over both children is equivalent to minimising their SSE.
    let parent_score = total * total / n as f64;
    let mut best: Option<(f64, Split)> = None;
    let mut order = indices.to_vec();

    for feature in candidates {
        order.sort_by(|&a, &b| data.features[a][feature].total_cmp(&data.features[b][feature]));

        let mut left_sum = 0.0;
        for pos in 0..n - 1 {
            let current = data.features[order[pos]][feature];
            let next = data.features[order[pos + 1]][feature];
            left_sum += data.targets[order[pos]];
            if next <= current {
                continue;
            }

            let left_n = (pos + 1) as f64;
            let right_n = (n - pos - 1) as f64;
            let right_sum = total - left_sum;
            let score = left_sum * left_sum / left_n + right_sum * right_sum / right_n;

            if best.as_ref().map_or(true, |(best_score, _)| score > *best_score) {
                best = Some((
                    score,
                    Split {
                        feature,
                        threshold: (current + next) / 2.0,
                    },
                ));
            }
        }
    }

    best.filter(|(score, _)| *score > parent_score)
        .map(|(_, split)| split)
}

/// Trend plus residual-forest regressor, deterministic for a given seed.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TrendForest {
    settings: ForestSettings,
}

impl TrendForest {
    pub fn new(settings: ForestSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &ForestSettings {
        &self.settings
    }

    pub fn fit(&self, samples: &[HistoricalSample]) -> Result<FittedTrendForest, ModelError> {
        if samples.len() < MIN_FIT_SAMPLES {
            return Err(ModelError::InsufficientSamples {
                found: samples.len(),
                required: MIN_FIT_SAMPLES,
            });
        }

        let rows: Vec<FeatureRow> = samples.iter().map(FeatureRow::from_sample).collect();
        let features: Vec<[f64; FeatureRow::WIDTH]> =
            rows.iter().map(FeatureRow::values).collect();
        let prices: Vec<f64> = samples.iter().map(|sample| sample.price).collect();

        let finite = features.iter().flatten().chain(&prices).all(|v| v.is_finite());
        if !finite {
            return Err(ModelError::NonFiniteInput);
        }

        let periods: Vec<f64> = rows.iter().map(FeatureRow::period).collect();
        let trend = LinearTrend::fit(&periods, &prices)?;
        let residuals: Vec<f64> = periods
            .iter()
            .zip(&prices)
            .map(|(period, price)| price - trend.at(*period))
            .collect();

        let data = TrainingSet {
            features: &features,
            targets: &residuals,
        };
        let mut rng = StdRng::seed_from_u64(self.settings.seed);
        let n = samples.len();
        let trees = (0..self.settings.trees)
            .map(|_| {
                let bootstrap: Vec<usize> = (0..n).map(|_| rng.gen_range(0..n)).collect();
                RegressionTree::fit(&data, bootstrap, &self.settings, &mut rng)
            })
            .collect();

        Ok(FittedTrendForest { trend, trees })
    }
}

impl PriceModel for TrendForest {
    fn predict_forward(
        &self,
        samples: &[HistoricalSample],
        future: &[FeatureRow],
    ) -> Result<Vec<f64>, ModelError> {
        let fitted = self.fit(samples)?;
        Ok(future.iter().map(|row| fitted.predict(row)).collect())
    }

    fn name(&self) -> &str {
        "trend-forest"
    }
}

#[derive(Debug, Clone)]
pub struct FittedTrendForest {
    trend: LinearTrend,
    trees: Vec<RegressionTree>,
}

impl FittedTrendForest {
    pub fn predict(&self, row: &FeatureRow) -> f64 {
        let base = self.trend.at(row.period());
        if self.trees.is_empty() {
            return base;
        }

        let values = row.values();
        let residual = self
            .trees
            .iter()
            .map(|tree| tree.predict(&values))
            .sum::<f64>()
            / self.trees.len() as f64;
        base + residual
    }

    pub fn tree_count(&self) -> usize {
        self.trees.len()
    }
}

// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Model output and timing types.

use ndarray::Array1;

/// Timing information for one classification (in milliseconds).
#[derive(Debug, Clone, Default)]
pub struct Speed {
    /// Time spent on preprocessing.
    pub preprocess: Option<f64>,
    /// Time spent on model inference.
    pub inference: Option<f64>,
    /// Time spent in the decision policy.
    pub decision: Option<f64>,
}

impl Speed {
    /// Create a new Speed instance with all timings.
    ///
    /// # Arguments
    ///
    /// * `preprocess` - Time in milliseconds.
    /// * `inference` - Time in milliseconds.
    /// * `decision` - Time in milliseconds.
    #[must_use]
    pub const fn new(preprocess: f64, inference: f64, decision: f64) -> Self {
        Self {
            preprocess: Some(preprocess),
            inference: Some(inference),
            decision: Some(decision),
        }
    }

    /// Sum of all recorded stages in milliseconds.
    #[must_use]
    pub fn total(&self) -> f64 {
        self.preprocess.unwrap_or(0.0) + self.inference.unwrap_or(0.0) + self.decision.unwrap_or(0.0)
    }
}

/// Raw model scores, one per class index.
///
/// Scores are used as produced by the model; they are not assumed to sum to 1.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputVector {
    /// Score data with shape (`num_classes`,).
    pub data: Array1<f32>,
}

impl OutputVector {
    /// Wrap a score array.
    #[must_use]
    pub const fn new(data: Array1<f32>) -> Self {
        Self { data }
    }

    /// Number of scores.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the vector holds no scores.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Index and value of the highest score.
    ///
    /// Ties resolve to the lowest index. NaN scores never win against a number.
    /// Returns `None` for an empty vector.
    #[must_use]
    pub fn argmax(&self) -> Option<(usize, f32)> {
        let mut best: Option<(usize, f32)> = None;
        for (i, &score) in self.data.iter().enumerate() {
            let replace = match best {
                None => true,
                Some((_, top)) => score > top || (top.is_nan() && !score.is_nan()),
            };
            if replace {
                best = Some((i, score));
            }
        }
        best
    }

    /// Highest score, or `None` for an empty vector.
    #[must_use]
    pub fn max_score(&self) -> Option<f32> {
        self.argmax().map(|(_, score)| score)
    }

    /// Indices of the `k` highest scores, best first.
    ///
    /// The sort is stable, so equal scores keep index order. NaN scores rank
    /// last, matching [`OutputVector::argmax`].
    #[must_use]
    pub fn top_k(&self, k: usize) -> Vec<usize> {
        let rank = |i: usize| {
            let score = self.data[i];
            if score.is_nan() { f32::NEG_INFINITY } else { score }
        };

        let mut indices: Vec<usize> = (0..self.data.len()).collect();
        indices.sort_by(|&a, &b| rank(b).total_cmp(&rank(a)));
        indices.truncate(k);
        indices
    }

    /// Indices of the five highest scores.
    #[must_use]
    pub fn top5(&self) -> Vec<usize> {
        self.top_k(5)
    }
}

impl From<Vec<f32>> for OutputVector {
    fn from(scores: Vec<f32>) -> Self {
        Self::new(Array1::from(scores))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_argmax() {
        let output = OutputVector::from(vec![0.1, 0.3, 0.6]);
        assert_eq!(output.argmax(), Some((2, 0.6)));
        assert_eq!(output.max_score(), Some(0.6));
    }

    #[test]
    fn test_argmax_tie_takes_first() {
        let output = OutputVector::from(vec![0.0, 0.7, 0.2, 0.7, 0.1]);
        assert_eq!(output.argmax(), Some((1, 0.7)));
    }

    #[test]
    fn test_argmax_skips_nan() {
        let output = OutputVector::from(vec![f32::NAN, 0.2, f32::NAN, 0.1]);
        assert_eq!(output.argmax(), Some((1, 0.2)));
    }

    #[test]
    fn test_argmax_empty() {
        let output = OutputVector::from(Vec::new());
        assert!(output.is_empty());
        assert_eq!(output.argmax(), None);
    }

    #[test]
    fn test_top_k() {
        let output = OutputVector::from(vec![0.2, 0.5, 0.1, 0.5, 0.05, 0.9]);
        assert_eq!(output.top5(), vec![5, 1, 3, 0, 2]);
        assert_eq!(output.top_k(2), vec![5, 1]);
        assert_eq!(output.top_k(10).len(), 6);
    }

    #[test]
    fn test_top_k_with_nan_scores() {
        // 164 classes with every third score NaN
        let scores: Vec<f32> = (0..164)
            .map(|i| if i % 3 == 0 { f32::NAN } else { (i % 50) as f32 / 100.0 })
            .collect();
        let output = OutputVector::from(scores);

        let top = output.top5();
        assert_eq!(top, vec![49, 149, 98, 148, 47]);
        assert!(top.iter().all(|&i| !output.data[i].is_nan()));
        assert_eq!(output.argmax().map(|(i, _)| i), Some(top[0]));

        let all = output.top_k(164);
        assert_eq!(all.len(), 164);
        assert!(all[..109].iter().all(|&i| !output.data[i].is_nan()));
        assert!(all[109..].iter().all(|&i| output.data[i].is_nan()));
    }

    #[test]
    fn test_top_k_all_nan() {
        let output = OutputVector::from(vec![f32::NAN; 4]);
        assert_eq!(output.top_k(4), vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_speed() {
        let speed = Speed::new(10.0, 20.0, 5.0);
        assert!((speed.total() - 35.0).abs() < 1e-6);
        assert!(Speed::default().total().abs() < f64::EPSILON);
    }
}

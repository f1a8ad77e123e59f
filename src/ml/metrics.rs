//! Train/test split and the held-out fit metric.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

/// Seeded shuffle-and-split. The test partition takes
/// `ceil(n * test_fraction)` rows; callers decide whether the remaining
/// training partition is large enough to bother evaluating.
pub fn train_test_split(
    x: &[Vec<f64>],
    y: &[f64],
    test_fraction: f64,
    seed: u64,
) -> (Vec<Vec<f64>>, Vec<f64>, Vec<Vec<f64>>, Vec<f64>) {
    let n = x.len();
    let mut indices: Vec<usize> = (0..n).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    indices.shuffle(&mut rng);

    let n_test = ((n as f64) * test_fraction).ceil() as usize;
    let (test_idx, train_idx) = indices.split_at(n_test.min(n));

    let take = |idx: &[usize]| -> (Vec<Vec<f64>>, Vec<f64>) {
        (
            idx.iter().map(|&i| x[i].clone()).collect(),
            idx.iter().map(|&i| y[i]).collect(),
        )
    };
    let (x_test, y_test) = take(test_idx);
    let (x_train, y_train) = take(train_idx);
    (x_train, y_train, x_test, y_test)
}

/// Coefficient of determination. A constant target yields 1.0 when predicted
/// perfectly and 0.0 otherwise, mirroring the convention of the reference
/// metric implementations.
pub fn r2_score(y_true: &[f64], y_pred: &[f64]) -> f64 {
    debug_assert_eq!(y_true.len(), y_pred.len());
    if y_true.is_empty() {
        return 0.0;
    }

    let mean = y_true.iter().sum::<f64>() / y_true.len() as f64;
    let ss_tot: f64 = y_true.iter().map(|t| (t - mean).powi(2)).sum();
    let ss_res: f64 = y_true
        .iter()
        .zip(y_pred)
        .map(|(t, p)| (t - p).powi(2))
        .sum();

    if ss_tot == 0.0 {
        return if ss_res == 0.0 { 1.0 } else { 0.0 };
    }
    1.0 - ss_res / ss_tot
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_sizes_add_up() {
        let x: Vec<Vec<f64>> = (0..10).map(|i| vec![i as f64]).collect();
        let y: Vec<f64> = (0..10).map(|i| i as f64).collect();

        let (x_train, y_train, x_test, y_test) = train_test_split(&x, &y, 0.2, 42);
        assert_eq!(x_test.len(), 2);
        assert_eq!(x_train.len(), 8);
        assert_eq!(y_train.len(), 8);
        assert_eq!(y_test.len(), 2);
    }

    #[test]
    fn split_is_deterministic_per_seed() {
        let x: Vec<Vec<f64>> = (0..25).map(|i| vec![i as f64]).collect();
        let y: Vec<f64> = (0..25).map(|i| i as f64).collect();

        let a = train_test_split(&x, &y, 0.2, 42);
        let b = train_test_split(&x, &y, 0.2, 42);
        assert_eq!(a.3, b.3);

        let c = train_test_split(&x, &y, 0.2, 7);
        assert!(a.3 != c.3 || a.1 != c.1);
    }

    #[test]
    fn split_rows_stay_paired() {
        let x: Vec<Vec<f64>> = (0..12).map(|i| vec![i as f64]).collect();
        let y: Vec<f64> = (0..12).map(|i| i as f64 * 3.0).collect();

        let (x_train, y_train, x_test, y_test) = train_test_split(&x, &y, 0.25, 1);
        for (row, target) in x_train.iter().zip(&y_train) {
            assert_eq!(row[0] * 3.0, *target);
        }
        for (row, target) in x_test.iter().zip(&y_test) {
            assert_eq!(row[0] * 3.0, *target);
        }
    }

    #[test]
    fn r2_of_perfect_fit_is_one() {
        let y = vec![1.0, 2.0, 3.0];
        assert!((r2_score(&y, &y) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn r2_of_mean_prediction_is_zero() {
        let y = vec![1.0, 2.0, 3.0];
        let pred = vec![2.0, 2.0, 2.0];
        assert!(r2_score(&y, &pred).abs() < 1e-12);
    }

    #[test]
    fn r2_can_go_negative() {
        let y = vec![1.0, 2.0, 3.0];
        let pred = vec![3.0, 3.0, -2.0];
        assert!(r2_score(&y, &pred) < 0.0);
    }
}

use ndarray::{Array2, ArrayView2};

/// Trait defining the interface for loss functions
pub trait Loss: Send + Sync {
    /// Compute the loss for a batch of predictions and targets
    fn compute_batch(&self, predictions: ArrayView2<f32>, targets: ArrayView2<f32>) -> f32;

    /// Compute the gradient of the loss with respect to the predictions
    fn gradient_batch(&self, predictions: ArrayView2<f32>, targets: ArrayView2<f32>) -> Array2<f32>;
}

/// Mean Squared Error loss, averaged over every element of the batch
pub struct MSE;

impl Loss for MSE {
    fn compute_batch(&self, predictions: ArrayView2<f32>, targets: ArrayView2<f32>) -> f32 {
        let diff = &predictions - &targets;
        (&diff * &diff).mean().unwrap_or(0.0)
    }

    fn gradient_batch(&self, predictions: ArrayView2<f32>, targets: ArrayView2<f32>) -> Array2<f32> {
        let count = predictions.len().max(1) as f32;
        (&predictions - &targets) * (2.0 / count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_mse_value_and_gradient() {
        let predictions = array![[1.0], [3.0]];
        let targets = array![[0.0], [1.0]];
        assert_eq!(MSE.compute_batch(predictions.view(), targets.view()), 2.5);
        assert_eq!(MSE.gradient_batch(predictions.view(), targets.view()), array![[1.0], [2.0]]);
    }
}

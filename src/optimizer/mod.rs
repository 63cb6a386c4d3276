use ndarray::{Array1, Array2};
use serde::{Serialize, Deserialize};

/// Gradient-descent update rule applied layer by layer.
///
/// `layer` identifies the parameter slot so stateful optimizers can keep
/// per-layer moments; [`Optimizer::advance`] is called once per training
/// step, before any layer is updated.
pub trait Optimizer {
    fn advance(&mut self) {}
    fn update_weights(&mut self, layer: usize, weights: &mut Array2<f32>, gradients: &Array2<f32>, learning_rate: f32);
    fn update_biases(&mut self, layer: usize, biases: &mut Array1<f32>, gradients: &Array1<f32>, learning_rate: f32);
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub enum OptimizerWrapper {
    SGD(SGD),
    Adam(Adam),
}

impl Optimizer for OptimizerWrapper {
    fn advance(&mut self) {
        match self {
            OptimizerWrapper::SGD(optimizer) => optimizer.advance(),
            OptimizerWrapper::Adam(optimizer) => optimizer.advance(),
        }
    }

    fn update_weights(&mut self, layer: usize, weights: &mut Array2<f32>, gradients: &Array2<f32>, learning_rate: f32) {
        match self {
            OptimizerWrapper::SGD(optimizer) => optimizer.update_weights(layer, weights, gradients, learning_rate),
            OptimizerWrapper::Adam(optimizer) => optimizer.update_weights(layer, weights, gradients, learning_rate),
        }
    }

    fn update_biases(&mut self, layer: usize, biases: &mut Array1<f32>, gradients: &Array1<f32>, learning_rate: f32) {
        match self {
            OptimizerWrapper::SGD(optimizer) => optimizer.update_biases(layer, biases, gradients, learning_rate),
            OptimizerWrapper::Adam(optimizer) => optimizer.update_biases(layer, biases, gradients, learning_rate),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct SGD;

impl SGD {
    pub fn new() -> SGD {
        SGD
    }
}

impl Default for SGD {
    fn default() -> Self {
        Self::new()
    }
}

impl Optimizer for SGD {
    fn update_weights(&mut self, _layer: usize, weights: &mut Array2<f32>, gradients: &Array2<f32>, learning_rate: f32) {
        weights.zip_mut_with(gradients, |w, &g| *w -= learning_rate * g);
    }

    fn update_biases(&mut self, _layer: usize, biases: &mut Array1<f32>, gradients: &Array1<f32>, learning_rate: f32) {
        biases.zip_mut_with(gradients, |b, &g| *b -= learning_rate * g);
    }
}

/// Adam optimizer with first and second moment estimates kept per layer.
/// Moment buffers are allocated on first use, so the optimizer can be built
/// before the network it drives.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct Adam {
    pub beta1: f32,
    pub beta2: f32,
    pub epsilon: f32,
    m_weights: Vec<Array2<f32>>,
    v_weights: Vec<Array2<f32>>,
    m_biases: Vec<Array1<f32>>,
    v_biases: Vec<Array1<f32>>,
    pub t: i32,
}

impl Adam {
    pub fn new(beta1: f32, beta2: f32, epsilon: f32) -> Self {
        Adam {
            beta1,
            beta2,
            epsilon,
            m_weights: Vec::new(),
            v_weights: Vec::new(),
            m_biases: Vec::new(),
            v_biases: Vec::new(),
            t: 0,
        }
    }

    fn bias_corrections(&self) -> (f32, f32) {
        let t = self.t.max(1);
        (1.0 - self.beta1.powi(t), 1.0 - self.beta2.powi(t))
    }
}

impl Default for Adam {
    fn default() -> Self {
        Self::new(0.9, 0.999, 1e-8)
    }
}

fn slot2(slots: &mut Vec<Array2<f32>>, layer: usize, dim: (usize, usize)) -> &mut Array2<f32> {
    while slots.len() <= layer {
        slots.push(Array2::zeros((0, 0)));
    }
    if slots[layer].dim() != dim {
        slots[layer] = Array2::zeros(dim);
    }
    &mut slots[layer]
}

fn slot1(slots: &mut Vec<Array1<f32>>, layer: usize, len: usize) -> &mut Array1<f32> {
    while slots.len() <= layer {
        slots.push(Array1::zeros(0));
    }
    if slots[layer].len() != len {
        slots[layer] = Array1::zeros(len);
    }
    &mut slots[layer]
}

impl Optimizer for Adam {
    fn advance(&mut self) {
        self.t += 1;
    }

    fn update_weights(&mut self, layer: usize, weights: &mut Array2<f32>, gradients: &Array2<f32>, learning_rate: f32) {
        let (beta1, beta2, epsilon) = (self.beta1, self.beta2, self.epsilon);
        let (c1, c2) = self.bias_corrections();

        let m = slot2(&mut self.m_weights, layer, weights.dim());
        m.zip_mut_with(gradients, |m, &g| *m = beta1 * *m + (1.0 - beta1) * g);
        let m = m.clone();

        let v = slot2(&mut self.v_weights, layer, weights.dim());
        v.zip_mut_with(gradients, |v, &g| *v = beta2 * *v + (1.0 - beta2) * g * g);

        ndarray::Zip::from(weights)
            .and(&m)
            .and(&*v)
            .for_each(|w, &m, &v| *w -= learning_rate * (m / c1) / ((v / c2).sqrt() + epsilon));
    }

    fn update_biases(&mut self, layer: usize, biases: &mut Array1<f32>, gradients: &Array1<f32>, learning_rate: f32) {
        let (beta1, beta2, epsilon) = (self.beta1, self.beta2, self.epsilon);
        let (c1, c2) = self.bias_corrections();

        let m = slot1(&mut self.m_biases, layer, biases.len());
        m.zip_mut_with(gradients, |m, &g| *m = beta1 * *m + (1.0 - beta1) * g);
        let m = m.clone();

        let v = slot1(&mut self.v_biases, layer, biases.len());
        v.zip_mut_with(gradients, |v, &g| *v = beta2 * *v + (1.0 - beta2) * g * g);

        ndarray::Zip::from(biases)
            .and(&m)
            .and(&*v)
            .for_each(|b, &m, &v| *b -= learning_rate * (m / c1) / ((v / c2).sqrt() + epsilon));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_sgd_step() {
        let mut sgd = SGD::new();
        let mut w = array![[1.0, 2.0]];
        sgd.update_weights(0, &mut w, &array![[1.0, -1.0]], 0.5);
        assert_eq!(w, array![[0.5, 2.5]]);
    }

    #[test]
    fn test_adam_first_step_moves_by_learning_rate() {
        // With bias correction the first Adam step is lr * sign(g)
        let mut adam = Adam::default();
        adam.advance();
        let mut b = array![0.0, 0.0];
        adam.update_biases(0, &mut b, &array![4.0, -0.5], 0.01);
        assert!((b[0] + 0.01).abs() < 1e-5);
        assert!((b[1] - 0.01).abs() < 1e-5);
    }

    #[test]
    fn test_adam_keeps_separate_layer_state() {
        let mut adam = Adam::default();
        adam.advance();
        let mut w0 = Array2::<f32>::zeros((2, 3));
        let mut w1 = Array2::<f32>::zeros((3, 1));
        adam.update_weights(0, &mut w0, &Array2::ones((2, 3)), 0.01);
        adam.update_weights(1, &mut w1, &Array2::ones((3, 1)), 0.01);
        assert_eq!(adam.m_weights.len(), 2);
        assert_eq!(adam.m_weights[1].dim(), (3, 1));
    }
}

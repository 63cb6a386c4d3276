//! # Activation Functions Module
//!
//! Element-wise non-linearities used by the actor and critic networks.
//!
//! ## Available Activations
//!
//! - **ReLU**: `max(0, x)` - hidden layers of both networks
//! - **Sigmoid**: `1 / (1 + e^(-x))` - bounded actor output, rescaled to the rotor range
//! - **Tanh**: Hyperbolic tangent - alternative bounded output in `[-1, 1]`
//! - **Linear**: Identity function - critic Q-value head
//!
//! ## Usage Example
//!
//! ```rust
//! use quadcopter_ddpg::activations::Activation;
//! use ndarray::array;
//!
//! let mut data = array![[1.0, -0.5, 0.0, 2.0]];
//! Activation::Relu.apply_batch(&mut data);
//! assert_eq!(data, array![[1.0, 0.0, 0.0, 2.0]]);
//! ```
//!
//! Bounded outputs matter for the actor: the affine rescale in
//! [`crate::algorithms::Actor`] assumes the final activation lies in `[0, 1]`
//! (Sigmoid) or `[-1, 1]` (Tanh).

pub mod functions;

pub use functions::Activation;

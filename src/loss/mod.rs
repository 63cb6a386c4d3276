//! Loss functions used to fit the critic.

pub mod functions;

pub use functions::{Loss, MSE};

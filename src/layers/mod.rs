//! Layer abstractions for neural networks
//!
//! This module provides the Layer trait and the dense layer the network's
//! parameter store is made of.

mod r#trait;
pub mod dense;

// Re-export the Layer trait for convenience
pub use r#trait::Layer;
pub use dense::DenseLayer;

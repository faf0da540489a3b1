//! Random-forest regression inference
//!
//! A [`Forest`] is a bag of [`Tree`]s grown on bootstrap samples. Its
//! prediction for a row is the arithmetic mean of the trees' leaf values.
//!
//! # Usage
//!
//! ```rust
//! use vgsales_core::forest::{Forest, Node, Tree};
//!
//! let tree = Tree::new(vec![
//!     Node::internal(0, 0, 50.0, 1, 2),
//!     Node::leaf(1, 100.0),
//!     Node::leaf(2, 200.0),
//! ]);
//! let forest = Forest::new(vec![tree], 1, vec![1.0]).unwrap();
//!
//! assert_eq!(forest.predict(&[30.0]), 100.0);
//! ```

pub mod model;
pub mod tree;

pub use model::{Forest, ForestError};
pub use tree::{Node, Tree};

//! Product catalog module.
//!
//! Contains the read-only product records the cart refers to.

mod product;

pub use product::{Catalog, Product};

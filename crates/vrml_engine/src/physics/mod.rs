//! Ray casting primitives used by picking

pub mod ray;

pub use ray::{Ray, BoundingSphere, Aabb};

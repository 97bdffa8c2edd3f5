//! Pointer input and picking

pub mod picking;

pub use picking::{pick, pick_ray, AnchorLink, MouseState, PickHit};

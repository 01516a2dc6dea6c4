//! Numerical routines that the model layer needs and nalgebra does not provide.

pub mod quadrature;

pub use quadrature::{integrate, Integral};

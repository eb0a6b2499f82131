//! Core compute primitives.
//!
//! Estimators and the scaler consume a row-major [`Matrix`] of `f32`
//! features; labels travel alongside as plain `&[usize]` slices.

mod matrix;

pub use matrix::Matrix;

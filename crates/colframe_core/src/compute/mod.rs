//! Kernels operating on whole arrays.

pub mod cmp;
pub mod hash;
pub mod selection;

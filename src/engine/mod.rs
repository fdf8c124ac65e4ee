//! Forward and backward passes over a compiled [`ExecutionModel`](crate::compile::ExecutionModel).

pub mod forward;
pub mod backward;

pub mod execution_model;
pub mod compiler;

pub use execution_model::ExecutionModel;
pub use compiler::compile;

pub mod interpreter;
pub mod fitness;

pub use fitness::Evaluator;
pub use interpreter::{compile, CompiledProgram, ExecContext, ExecLimits};

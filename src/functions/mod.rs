pub mod traits;
pub mod primitives;
pub mod defined;
pub mod registry;

pub use defined::DefinedFunction;
pub use registry::{ModuleRegistry, OperatorCatalog};
pub use traits::{FunctionDescriptor, Operator};

pub mod traits;
pub mod search;
pub mod function;
pub mod manager;

pub use manager::{AppConfig, ConfigManager};
pub use search::{SearchConfig, TournamentOrder};
pub use traits::ConfigSection;
pub use function::{FunctionRecord, FunctionSpec, Parameter};

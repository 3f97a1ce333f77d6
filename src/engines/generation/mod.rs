pub mod symbol_table;
pub mod generator;
pub mod gene_pool;
pub mod search_engine;
pub mod progress;

pub use symbol_table::{SortedTypeTable, SymbolTables, Typed, TypedTerminal};
pub use generator::ProgramGenerator;
pub use gene_pool::{GenePool, PoolManager, PoolRequirements, SubmitOutcome};
pub use search_engine::{ProgressCallback, SearchEngine, SearchStats};
pub use progress::{
    ChannelProgressCallback, ConsoleProgressCallback, ProgressMessage, SilentProgressCallback,
};

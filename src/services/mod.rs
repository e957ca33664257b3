pub mod assembly;
pub mod resolver;
pub mod runner;

pub use assembly::{AssemblyError, AssemblyJob, MediaAssembly, MkvmergeAssembler};
pub use resolver::AssetResolver;
pub use runner::{MuxRunner, RunMode, RunOptions};

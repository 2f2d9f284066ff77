pub mod parallel;
pub mod providers;
pub mod resolve;

pub use providers::ProvidersCommand;
pub use resolve::{DeclarationSource, ResolveCommand, ResolveOptions};

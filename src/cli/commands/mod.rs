//! CLI command implementations

pub mod cache;
pub mod completions;
pub mod config;
pub mod fetch;
pub mod install;
pub mod push;
pub mod status;
pub mod sync;

pub use cache::execute as cache;
pub use completions::execute as completions;
pub use config::execute as config;
pub use fetch::execute as fetch;
pub use install::execute as install;
pub use push::execute as push;
pub use status::execute as status;
pub use sync::execute as sync;

pub mod prompt_bundle;
pub mod prompt_cache;

pub use prompt_bundle::{BundleStatus, FileBundleResolver, PromptBundleResolver, NO_VERSION};
pub use prompt_cache::PromptCache;

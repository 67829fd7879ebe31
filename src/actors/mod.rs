//! Long-running services. Each owns its state and is reached only through
//! its channel.

pub mod composer;

pub use composer::ComposerService;

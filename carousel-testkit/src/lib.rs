//! Test support for carousel: worker pool fixtures, a scriptable mock ring,
//! a scripted status probe and a recording scan observer.

mod fixtures;
mod mock;
mod probe;

pub use fixtures::*;
pub use mock::*;
pub use probe::*;

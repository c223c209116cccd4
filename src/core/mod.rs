pub mod build;
pub mod lock;
pub mod sync;
pub mod vcs;
pub mod workdir;

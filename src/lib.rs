pub mod commands;
pub mod config;
pub mod env;
pub mod error;
pub mod exec;
pub mod paths;
pub mod profile;
mod scalar;
pub mod ui;

pub use config::{Config, resolve};
pub use env::{EnvBinding, EnvBindings};
pub use error::ProfileError;
pub use profile::{Parent, Profile, ProfileTree};

#[cfg(test)]
pub mod test_utils;

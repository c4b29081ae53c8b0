//! Test helpers shared across the workspace.
//!
//! Resolution reads process-wide state (the environment, the working
//! directory and `.env` files), so tests mutate it only through the guards
//! in this crate.

pub mod cwd;
pub mod dotenv;
pub mod env;

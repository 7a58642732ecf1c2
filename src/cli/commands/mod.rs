//! CLI command implementations

mod common;
pub mod check;
pub mod config;
pub mod init;
pub mod status;
pub mod stop;

pub use check::execute as check;
pub use config::execute as config;
pub use init::execute as init;
pub use status::execute as status;
pub use stop::execute as stop;

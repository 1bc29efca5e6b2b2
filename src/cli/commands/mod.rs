//! CLI command implementations.

mod add;
mod ask;
mod config;
mod doctor;
mod init;
mod list;
mod media;
mod search;
mod serve;

pub use add::run_add;
pub use ask::run_ask;
pub use config::run_config;
pub use doctor::run_doctor;
pub use init::run_init;
pub use list::run_list;
pub use media::{run_audio, run_video};
pub use search::run_search;
pub use serve::run_serve;

mod command_def;
mod features;
mod handler;
mod helpers;
mod router;

pub use command_def::DoctorCommands;
pub(crate) use helpers::as_html_block;
pub use handler::answer;

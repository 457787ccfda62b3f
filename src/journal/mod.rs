mod maintenance;
mod model;
mod paths;
mod read;
mod write;

pub use model::AlertRecord;
pub use paths::AlertJournal;

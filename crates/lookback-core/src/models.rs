mod history;
mod run;

pub use history::{RawRecord, ShowAggregate, ViewingEvent, WatchKind};
pub use run::ImportRun;

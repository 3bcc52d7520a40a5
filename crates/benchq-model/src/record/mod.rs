mod benchmarkable;
pub use benchmarkable::Benchmarkable;

mod run;
pub use run::{Run, RunStatus};

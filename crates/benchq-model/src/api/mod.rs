mod trigger;
pub use trigger::BenchmarkTrigger;

mod status;
pub use status::RunStatusUpdate;

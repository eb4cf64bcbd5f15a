pub(crate) mod accuracy;
mod fetch;
mod pipeline;
mod run;

pub use run::{EVALUATION_MANIFEST_PREFIX, run};

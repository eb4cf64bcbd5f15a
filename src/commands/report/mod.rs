mod run;
mod summary;
mod wordfreq;

pub use run::run;

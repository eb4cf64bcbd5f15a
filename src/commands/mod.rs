pub mod assets;
pub mod evaluate;
pub mod report;
pub mod status;

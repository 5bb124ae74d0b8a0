pub mod batch;
pub mod cli;
pub mod compare;
pub mod error;
pub mod model;
pub mod report;
pub mod scan;

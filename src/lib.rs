pub mod driver;
pub mod errors;
pub mod metrics;
pub mod model;
pub mod ops;
pub mod query;
pub mod timer;
pub mod types;
pub mod world;

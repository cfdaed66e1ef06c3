pub mod batches;
pub mod racing_store;

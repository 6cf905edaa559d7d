pub mod enrichment;
pub mod plan;
pub mod requests;
pub mod saved_plan;
pub mod weather;

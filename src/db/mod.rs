pub mod mongo;
pub mod plan_store;

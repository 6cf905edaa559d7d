pub mod directions;
pub mod health;
pub mod hotels;
pub mod places;
pub mod plan;
pub mod weather;

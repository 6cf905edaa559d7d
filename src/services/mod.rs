pub mod directions_service;
pub mod enrichment;
pub mod hotel_service;
pub mod itinerary_generation_service;
pub mod llm_service;
pub mod places_service;
pub mod pricing_service;
pub mod prompt;
pub mod regeneration_service;
pub mod weather_service;

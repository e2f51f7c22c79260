pub mod collection;
pub mod creator;
pub mod events;
pub mod itinerary;
pub mod profile;

pub mod calendar;
pub mod candidate_ranker;
pub mod itinerary;
pub mod mapbox;
pub mod opening_hours;
pub mod overpass;
pub mod travel_estimator;

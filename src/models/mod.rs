pub mod anchor;
pub mod coordinates;
pub mod event;
pub mod place;
pub mod schedule;
pub mod status;
pub mod travel;

pub use anchor::Anchor;
pub use coordinates::Coordinates;
pub use event::{Event, EventKind, Itinerary};
pub use place::{Place, PlaceCategory, ScoredPlace};
pub use schedule::{
    AfterShowKind, AfterShowPick, CustomStop, DoorsExtras, Picks, Preferences,
    ScheduleConfiguration, ShowTiming, SlotPreference,
};
pub use status::{Completeness, Curated};
pub use travel::{EstimateSource, TravelEstimate, TravelMode};

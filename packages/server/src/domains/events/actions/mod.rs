mod create_event;
mod delete_event;
mod queries;

pub use create_event::{create_event, parse_event_time, CreateEventInput};
pub use delete_event::{delete_event, subscribe};
pub use queries::{
    events_by_host, get_event, get_event_for_pending, liked_events, list_events, sorted_events,
    EventDetail, EventListing, ListEventsQuery, SortBy, ALL_CATEGORIES,
};

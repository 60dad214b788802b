pub mod event;
pub mod event_image;
pub mod subscription;

pub use event::{
    Event, EventSummary, HostRef, NewEvent, SearchFilter, REGISTER_EVENT_TYPE,
};
pub use event_image::EventImage;
pub use subscription::Subscription;

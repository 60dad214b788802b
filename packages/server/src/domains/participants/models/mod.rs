pub mod participant;

pub use participant::{Participant, ParticipantContact, ParticipantStatus, ParticipantWithUser};

//! Notification payloads and their rendered emails.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::common::EventId;
use crate::domains::events::models::Event;
use crate::kernel::OutgoingEmail;

/// Event details quoted in participant emails.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EventMailInfo {
    pub event_id: EventId,
    pub title: String,
    pub date: Option<NaiveDate>,
    pub location: Option<String>,
}

impl From<&Event> for EventMailInfo {
    fn from(event: &Event) -> Self {
        Self {
            event_id: event.id,
            title: event.name.clone(),
            date: event.date,
            location: event.location.clone(),
        }
    }
}

impl EventMailInfo {
    fn date_label(&self) -> String {
        self.date
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| "TBD".to_string())
    }

    fn location_label(&self) -> &str {
        self.location.as_deref().unwrap_or("TBD")
    }
}

/// Everything the outbox knows how to deliver. Stored as the `payload`
/// column, tagged by `kind`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NotificationMessage {
    /// To the host, when someone joins their event.
    ParticipantJoined {
        host_name: String,
        participant_name: String,
        event: EventMailInfo,
    },
    ParticipantApproved {
        guest_name: String,
        event: EventMailInfo,
    },
    ParticipantRejected {
        guest_name: String,
        event: EventMailInfo,
    },
    /// To every participant of an event the host removed.
    EventDeleted {
        guest_name: String,
        event: EventMailInfo,
        reason: String,
    },
}

impl NotificationMessage {
    pub fn kind(&self) -> &'static str {
        match self {
            NotificationMessage::ParticipantJoined { .. } => "participant_joined",
            NotificationMessage::ParticipantApproved { .. } => "participant_approved",
            NotificationMessage::ParticipantRejected { .. } => "participant_rejected",
            NotificationMessage::EventDeleted { .. } => "event_deleted",
        }
    }

    pub fn render(&self, to: &str, frontend_url: &str) -> OutgoingEmail {
        match self {
            NotificationMessage::ParticipantJoined {
                host_name,
                participant_name,
                event,
            } => {
                let link = format!("{}/gathering/{}", frontend_url, event.event_id);
                let text = format!(
                    "Hello {host_name},\n\n\
                     A new participant has just signed up for your event!\n\n\
                     Event: {title}\n\
                     Participant: {participant_name}\n\n\
                     You can now approve or decline their request: {link}\n\n\
                     Best,\nThe HiFor Team",
                    title = event.title,
                );
                let html = format!(
                    "<p>Hello {host_name},</p>\
                     <p>A new participant has just signed up for your event!</p>\
                     <p><strong>Event:</strong> {title}</p>\
                     <p><strong>Participant:</strong> {participant_name}</p>\
                     <p>You can now approve or decline their request. \
                     <a href=\"{link}\">Open your event dashboard</a>.</p>\
                     <p>Best,<br/>The HiFor Team</p>",
                    title = event.title,
                );
                OutgoingEmail::text(to, "[HiFor] A new participant has signed up!", text)
                    .with_html(html)
            }
            NotificationMessage::ParticipantApproved { guest_name, event } => {
                let link = format!("{}/gathering/{}", frontend_url, event.event_id);
                let text = format!(
                    "Hello {guest_name},\n\n\
                     Great news! Your participation for the event has been approved.\n\n\
                     Event: {title}\n\
                     Date: {date}\n\
                     Location: {location}\n\n\
                     You're all set! See you at the event.\n\
                     View event details: {link}\n\n\
                     Best,\nThe HiFor Team",
                    title = event.title,
                    date = event.date_label(),
                    location = event.location_label(),
                );
                let html = format!(
                    "<p>Hello {guest_name},</p>\
                     <p>Great news! Your participation for the event has been approved.</p>\
                     <p><strong>Event:</strong> {title}<br/>\
                     <strong>Date:</strong> {date}<br/>\
                     <strong>Location:</strong> {location}</p>\
                     <p>You're all set! See you at the event.</p>\
                     <p><a href=\"{link}\">View Event Details</a></p>\
                     <p>Best,<br/>The HiFor Team</p>",
                    title = event.title,
                    date = event.date_label(),
                    location = event.location_label(),
                );
                OutgoingEmail::text(to, "[HiFor] Your event participation is approved!", text)
                    .with_html(html)
            }
            NotificationMessage::ParticipantRejected { guest_name, event } => {
                let text = format!(
                    "Hello {guest_name},\n\n\
                     Unfortunately, your application for {title} was not approved this time.\n\
                     There are plenty of other events waiting for you: {frontend_url}\n\n\
                     Best,\nThe HiFor Team",
                    title = event.title,
                );
                let html = format!(
                    "<p>Hello {guest_name},</p>\
                     <p>Unfortunately, your application for <strong>{title}</strong> \
                     was not approved this time.</p>\
                     <p>There are plenty of other events waiting for you.</p>\
                     <p><a href=\"{frontend_url}\">Find Other Events</a></p>\
                     <p>Best,<br/>The HiFor Team</p>",
                    title = event.title,
                );
                OutgoingEmail::text(to, "[HiFor] Your event application was declined", text)
                    .with_html(html)
            }
            NotificationMessage::EventDeleted {
                guest_name,
                event,
                reason,
            } => {
                let text = format!(
                    "Hello {guest_name},\n\n\
                     The event you were registered for, {title}, has been deleted \
                     for the following reason:\n\n{reason}\n\n\
                     We apologize for the inconvenience.",
                    title = event.title,
                );
                OutgoingEmail::text(to, "Event Deletion Notification", text)
            }
        }
    }
}

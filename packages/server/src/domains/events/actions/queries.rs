//! Event listings and detail views.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::common::{ChatRoomId, DomainError, DomainResult, EventId};
use crate::domains::chatrooms::models::ChatRoom;
use crate::domains::events::models::{Event, EventImage, EventSummary, SearchFilter};
use crate::domains::likes::models::Like;
use crate::domains::participants::models::{Participant, ParticipantWithUser};
use crate::domains::users::actions::require_user;
use crate::domains::users::{User, UserSummary};

/// Category value meaning "no category filter".
pub const ALL_CATEGORIES: &str = "All";

/// Raw query string of `GET /events`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListEventsQuery {
    pub fetch_type: Option<String>,
    pub category: Option<String>,
    pub query: Option<String>,
    pub date: Option<NaiveDate>,
    pub location: Option<String>,
    #[serde(rename = "type")]
    pub event_type: Option<String>,
}

#[derive(Debug, Clone)]
pub enum EventListing {
    All,
    Hot,
    Search(SearchFilter),
    Category(String),
    Upcoming,
}

impl EventListing {
    pub fn from_query(query: ListEventsQuery) -> DomainResult<Self> {
        let fetch_type = query
            .fetch_type
            .as_deref()
            .ok_or_else(|| DomainError::validation("fetchType is required"))?;

        match fetch_type {
            "all" => Ok(EventListing::All),
            "hot" => Ok(EventListing::Hot),
            "upcoming" => Ok(EventListing::Upcoming),
            "search" => Ok(EventListing::Search(SearchFilter {
                query: query.query,
                date: query.date,
                location: query.location,
                event_type: query.event_type,
            })),
            "category" => match query.category {
                Some(category) if !category.trim().is_empty() => {
                    Ok(EventListing::Category(category))
                }
                _ => Err(DomainError::validation("category is required")),
            },
            other => Err(DomainError::validation(format!("Invalid fetchType: {}", other))),
        }
    }
}

pub async fn list_events(listing: EventListing, pool: &PgPool) -> DomainResult<Vec<EventSummary>> {
    let events = match listing {
        EventListing::All => Event::list_current(pool).await?,
        EventListing::Hot => Event::list_hot(pool).await?,
        EventListing::Upcoming => Event::list_upcoming(pool).await?,
        EventListing::Search(filter) => Event::search(&filter, pool).await?,
        EventListing::Category(category) if category == ALL_CATEGORIES => {
            Event::list_current(pool).await?
        }
        EventListing::Category(category) => Event::list_by_category(&category, pool).await?,
    };
    Ok(events)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortBy {
    Hot,
    Date,
}

impl std::str::FromStr for SortBy {
    type Err = DomainError;

    fn from_str(s: &str) -> DomainResult<Self> {
        match s {
            "hot" => Ok(SortBy::Hot),
            "date" => Ok(SortBy::Date),
            _ => Err(DomainError::validation(format!("Invalid sortBy: {}", s))),
        }
    }
}

/// Events dated today or later.
pub async fn sorted_events(sort_by: SortBy, pool: &PgPool) -> DomainResult<Vec<EventSummary>> {
    let events = match sort_by {
        SortBy::Hot => Event::list_hot(pool).await?,
        SortBy::Date => Event::list_from_today_by_date(pool).await?,
    };
    Ok(events)
}

/// Event page: the event, its host, gallery, participants and likers.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDetail {
    #[serde(flatten)]
    pub event: Event,
    pub host: UserSummary,
    pub images: Vec<EventImage>,
    pub participants: Vec<ParticipantWithUser>,
    pub likes: Vec<UserSummary>,
    pub chat_room_id: Option<ChatRoomId>,
}

async fn load_detail(
    event_id: EventId,
    pending_view: bool,
    pool: &PgPool,
) -> DomainResult<EventDetail> {
    let event = Event::find_by_id(event_id, pool)
        .await?
        .ok_or_else(|| DomainError::not_found("Event", event_id))?;
    let host = User::find_by_id(event.created_by, pool)
        .await?
        .ok_or_else(|| DomainError::not_found("User", event.created_by))?;

    let participants = if pending_view {
        Participant::unrejected_with_users(event.id, pool).await?
    } else {
        Participant::approved_with_users(event.id, pool).await?
    };

    Ok(EventDetail {
        host: UserSummary::from(&host),
        images: EventImage::find_by_event(event.id, pool).await?,
        participants,
        likes: Like::likers(event.id, pool).await?,
        chat_room_id: ChatRoom::find_by_event(event.id, pool).await?.map(|room| room.id),
        event,
    })
}

/// Public event page; lists approved participants only.
pub async fn get_event(event_id: EventId, pool: &PgPool) -> DomainResult<EventDetail> {
    load_detail(event_id, false, pool).await
}

/// Host review page; lists everyone not rejected, with their answers.
pub async fn get_event_for_pending(event_id: EventId, pool: &PgPool) -> DomainResult<EventDetail> {
    load_detail(event_id, true, pool).await
}

pub async fn events_by_host(user_id: &str, pool: &PgPool) -> DomainResult<Vec<EventSummary>> {
    Ok(Event::list_by_host(user_id, pool).await?)
}

pub async fn liked_events(user_id: &str, pool: &PgPool) -> DomainResult<Vec<EventSummary>> {
    let user = require_user(user_id, pool).await?;
    Ok(Event::list_liked_by(user.id, pool).await?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(fetch_type: &str) -> ListEventsQuery {
        ListEventsQuery {
            fetch_type: Some(fetch_type.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn plain_fetch_types_parse() {
        assert!(matches!(EventListing::from_query(query("all")), Ok(EventListing::All)));
        assert!(matches!(EventListing::from_query(query("hot")), Ok(EventListing::Hot)));
        assert!(matches!(
            EventListing::from_query(query("upcoming")),
            Ok(EventListing::Upcoming)
        ));
    }

    #[test]
    fn unknown_or_missing_fetch_type_is_a_validation_error() {
        assert!(matches!(
            EventListing::from_query(query("trending")),
            Err(DomainError::Validation(_))
        ));
        assert!(matches!(
            EventListing::from_query(ListEventsQuery::default()),
            Err(DomainError::Validation(_))
        ));
    }

    #[test]
    fn category_listing_requires_a_category() {
        assert!(EventListing::from_query(query("category")).is_err());

        let mut with_category = query("category");
        with_category.category = Some("Sports".to_string());
        match EventListing::from_query(with_category).unwrap() {
            EventListing::Category(category) => assert_eq!(category, "Sports"),
            other => panic!("unexpected listing {:?}", other),
        }
    }

    #[test]
    fn search_listing_carries_filters() {
        let mut search = query("search");
        search.query = Some("picnic".to_string());
        search.event_type = Some("Register".to_string());
        match EventListing::from_query(search).unwrap() {
            EventListing::Search(filter) => {
                assert_eq!(filter.query.as_deref(), Some("picnic"));
                assert_eq!(filter.event_type.as_deref(), Some("Register"));
                assert!(filter.location.is_none());
            }
            other => panic!("unexpected listing {:?}", other),
        }
    }

    #[test]
    fn sort_by_parses_known_values_only() {
        assert_eq!("hot".parse::<SortBy>().unwrap(), SortBy::Hot);
        assert_eq!("date".parse::<SortBy>().unwrap(), SortBy::Date);
        assert!("likes".parse::<SortBy>().is_err());
    }
}

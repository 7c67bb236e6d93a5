//! User activity events

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Kind of user interaction recorded in the event log
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(from = "String", into = "String")]
pub enum EventType {
    /// Product page was viewed
    View,
    /// Product was clicked in a listing
    Click,
    /// Product was purchased
    Purchase,
    /// Product was added to the cart
    AddToCart,
    /// Any other client-defined event
    Other(String),
}

impl std::fmt::Display for EventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::View => write!(f, "view"),
            Self::Click => write!(f, "click"),
            Self::Purchase => write!(f, "purchase"),
            Self::AddToCart => write!(f, "add_to_cart"),
            Self::Other(s) => write!(f, "{}", s),
        }
    }
}

impl EventType {
    /// Convert a string to an EventType
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "view" => Self::View,
            "click" => Self::Click,
            "purchase" => Self::Purchase,
            "add_to_cart" => Self::AddToCart,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn is_purchase(&self) -> bool {
        matches!(self, Self::Purchase)
    }
}

impl From<String> for EventType {
    fn from(value: String) -> Self {
        Self::from_str(&value)
    }
}

impl From<EventType> for String {
    fn from(value: EventType) -> Self {
        value.to_string()
    }
}

/// A recorded user event. The log is append-only.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserEvent {
    /// Unique identifier for the event
    pub id: String,

    /// The user who produced the event
    pub user_id: String,

    /// What kind of interaction this was
    pub event_type: EventType,

    /// Opaque structured payload, usually carrying a `product_id`
    pub event_data: serde_json::Value,

    /// When the event was recorded
    pub created_at: DateTime<Utc>,
}

impl UserEvent {
    /// Create a new event with a fresh id and the current timestamp
    pub fn new(
        user_id: impl Into<String>,
        event_type: EventType,
        event_data: serde_json::Value,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.into(),
            event_type,
            event_data,
            created_at: Utc::now(),
        }
    }

    /// The product this event refers to, if the payload names one
    pub fn product_id(&self) -> Option<&str> {
        self.event_data.get("product_id").and_then(|v| v.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_event_type_parsing() {
        assert_eq!(EventType::from_str("view"), EventType::View);
        assert_eq!(EventType::from_str("PURCHASE"), EventType::Purchase);
        assert_eq!(EventType::from_str("add_to_cart"), EventType::AddToCart);
        assert_eq!(
            EventType::from_str("wishlist"),
            EventType::Other("wishlist".to_string())
        );
    }

    #[test]
    fn test_event_type_serializes_as_plain_string() {
        let value = serde_json::to_value(EventType::AddToCart).unwrap();
        assert_eq!(value, json!("add_to_cart"));

        let parsed: EventType = serde_json::from_value(json!("click")).unwrap();
        assert_eq!(parsed, EventType::Click);
    }

    #[test]
    fn test_product_id_from_payload() {
        let event = UserEvent::new("u1", EventType::View, json!({"product_id": "p9"}));
        assert_eq!(event.product_id(), Some("p9"));
        assert!(!event.id.is_empty());

        let event = UserEvent::new("u1", EventType::View, json!({"query": "bread"}));
        assert_eq!(event.product_id(), None);
    }
}

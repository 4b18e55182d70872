use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Fixed identifier of the About Us singleton.
pub const ABOUT_US_ID: &str = "about-us";

/// Content served until an admin edits the page for the first time.
pub const DEFAULT_ABOUT_US_CONTENT: &str =
    "Welcome to SpaceTechHub, a center for space technology innovation and research.";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct AboutUs {
    pub id: String,
    pub content: String,
    pub updated_at: DateTime<Utc>,
}

impl AboutUs {
    pub fn new(content: impl Into<String>, updated_at: DateTime<Utc>) -> Self {
        AboutUs {
            id: ABOUT_US_ID.to_string(),
            content: content.into(),
            updated_at,
        }
    }

    pub fn default_now() -> Self {
        AboutUs::new(DEFAULT_ABOUT_US_CONTENT, Utc::now())
    }
}

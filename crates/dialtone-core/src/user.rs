//! User record shown on the dashboard.
//!
//! A `UserRecord` is built once (from the random-user API or from storage)
//! and never mutated afterwards. Fields are private; accessors hand out
//! borrowed views so a partially-filled record cannot be constructed outside
//! of deserialization, which requires every field.

use serde::{Deserialize, Serialize};

/// Person name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Name {
    pub first: String,
    pub last: String,
}

/// Profile picture URLs in three sizes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Picture {
    pub large: String,
    pub medium: String,
    pub thumbnail: String,
}

/// Coarse location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub city: String,
    pub state: String,
    pub country: String,
}

/// The authenticated identity.
///
/// Serialized as `{id, name, email, phone, picture, location}`; this is also
/// the persisted layout under the storage key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    id: String,
    name: Name,
    email: String,
    phone: String,
    picture: Picture,
    location: Location,
}

impl UserRecord {
    pub fn new(
        id: impl Into<String>,
        name: Name,
        email: impl Into<String>,
        phone: impl Into<String>,
        picture: Picture,
        location: Location,
    ) -> Self {
        Self {
            id: id.into(),
            name,
            email: email.into(),
            phone: phone.into(),
            picture,
            location,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &Name {
        &self.name
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn phone(&self) -> &str {
        &self.phone
    }

    pub fn picture(&self) -> &Picture {
        &self.picture
    }

    pub fn location(&self) -> &Location {
        &self.location
    }

    /// Returns "First Last".
    pub fn full_name(&self) -> String {
        format!("{} {}", self.name.first, self.name.last)
    }

    /// Returns "City, State, Country", skipping empty parts.
    pub fn location_line(&self) -> String {
        [
            self.location.city.as_str(),
            self.location.state.as_str(),
            self.location.country.as_str(),
        ]
        .into_iter()
        .filter(|part| !part.trim().is_empty())
        .collect::<Vec<_>>()
        .join(", ")
    }
}

#[cfg(any(test, feature = "test-support"))]
pub mod test_support {
    use super::{Location, Name, Picture, UserRecord};

    /// Builds the Jane Doe record used across tests.
    pub fn jane_doe() -> UserRecord {
        UserRecord::new(
            "a1",
            Name {
                first: "Jane".to_string(),
                last: "Doe".to_string(),
            },
            "j@x.com",
            "0912345678",
            Picture {
                large: "https://example.com/large.jpg".to_string(),
                medium: "https://example.com/medium.jpg".to_string(),
                thumbnail: "https://example.com/thumb.jpg".to_string(),
            },
            Location {
                city: "Springfield".to_string(),
                state: "Illinois".to_string(),
                country: "United States".to_string(),
            },
        )
    }
}

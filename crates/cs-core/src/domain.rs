//! # Domain Records
//!
//! Records delivered by the user-data API (relations, the user profile,
//! course participants) and the two fixed enumerations the certificate
//! wizard chooses from: communication media and document languages.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::identity::{RelationId, UserId};
use crate::temporal::Timestamp;

// ─── Communication Medium ────────────────────────────────────────────

/// How tutoring sessions were held. Serialized with the labels the
/// certificate service expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CommunicationMedium {
    #[serde(rename = "Video-Chat")]
    VideoChat,
    #[serde(rename = "E-Mail")]
    Email,
    #[serde(rename = "Telefon")]
    Phone,
    #[serde(rename = "Chat-Nachrichten")]
    ChatMessages,
}

impl CommunicationMedium {
    /// Every medium, in the order the selection list shows them.
    pub const ALL: [CommunicationMedium; 4] = [
        Self::VideoChat,
        Self::Email,
        Self::Phone,
        Self::ChatMessages,
    ];

    /// The wire label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::VideoChat => "Video-Chat",
            Self::Email => "E-Mail",
            Self::Phone => "Telefon",
            Self::ChatMessages => "Chat-Nachrichten",
        }
    }
}

impl fmt::Display for CommunicationMedium {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for CommunicationMedium {
    type Err = CoreError;

    /// Accepts the wire label or a short ASCII alias, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "video-chat" | "video" => Ok(Self::VideoChat),
            "e-mail" | "email" => Ok(Self::Email),
            "telefon" | "phone" => Ok(Self::Phone),
            "chat-nachrichten" | "chat" => Ok(Self::ChatMessages),
            _ => Err(CoreError::UnknownMedium(s.to_string())),
        }
    }
}

// ─── Language ────────────────────────────────────────────────────────

/// Language of the rendered certificate document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LanguageCode {
    #[default]
    De,
    En,
}

impl LanguageCode {
    /// Every supported language.
    pub const ALL: [LanguageCode; 2] = [Self::De, Self::En];

    /// ISO 639-1 code sent as the `lang` query parameter.
    pub fn code(&self) -> &'static str {
        match self {
            Self::De => "de",
            Self::En => "en",
        }
    }

    /// Name shown in the language selector.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::De => "Deutsch",
            Self::En => "Englisch",
        }
    }
}

impl fmt::Display for LanguageCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for LanguageCode {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "de" => Ok(Self::De),
            "en" => Ok(Self::En),
            _ => Err(CoreError::UnknownLanguage(s.to_string())),
        }
    }
}

// ─── Relations ───────────────────────────────────────────────────────

/// A counterpart the user is (or was) matched with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Relation {
    pub id: RelationId,
    pub first_name: String,
    pub last_name: String,
    /// When the match was made; lower bound for the certificate period.
    pub started_at: Timestamp,
    /// Subjects the counterpart asked for help with.
    pub subjects: Vec<String>,
    /// Whether the match has been dissolved.
    #[serde(default)]
    pub dissolved: bool,
}

impl Relation {
    /// "First Last", as shown in the counterpart selector.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// Whether `subject` is on this counterpart's subject list.
    pub fn offers_subject(&self, subject: &str) -> bool {
        self.subjects.iter().any(|s| s == subject)
    }
}

/// The authenticated user with their active and dissolved matches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: UserId,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub matches: Vec<Relation>,
    #[serde(default)]
    pub dissolved_matches: Vec<Relation>,
}

impl UserProfile {
    /// Active matches followed by dissolved ones.
    pub fn relations(&self) -> impl Iterator<Item = &Relation> {
        self.matches.iter().chain(self.dissolved_matches.iter())
    }

    /// Look up a relation among active and dissolved matches.
    pub fn find_relation(&self, id: &RelationId) -> Option<&Relation> {
        self.relations().find(|r| &r.id == id)
    }

    /// Whether the user has any match a certificate could be issued for.
    pub fn has_relations(&self) -> bool {
        !self.matches.is_empty() || !self.dissolved_matches.is_empty()
    }
}

// ─── Course participants ─────────────────────────────────────────────

/// A pupil enrolled in a course, as listed to the course's instructors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Participant {
    pub firstname: String,
    pub lastname: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grade: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schooltype: Option<String>,
}

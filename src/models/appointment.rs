use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, EnumString};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, AsRefStr, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "snake_case")]
pub enum AppointmentStatus {
    Scheduled,
    Finished,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, AsRefStr, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "snake_case")]
pub enum ChatKind {
    Text,
    Image,
    System,
}

/// One message in an appointment's chat transcript. The author's display
/// name is denormalized onto the message, matching the stored chat schema.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: String,
    pub user_id: String,
    pub user_name: String,
    pub content: String,
    pub timestamp: Timestamp,
    pub kind: ChatKind,
}

/// A scheduled session between a user and an expert, with its chat
/// transcript appended in place.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Appointment {
    pub id: String,
    pub expert_id: String,
    pub user_id: String,
    pub status: AppointmentStatus,
    pub start_time: Timestamp,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finished_time: Option<Timestamp>,
    #[serde(default)]
    pub chats: Vec<ChatMessage>,
}

impl Appointment {
    pub fn new(id: String, expert_id: String, user_id: String, start_time: Timestamp) -> Self {
        Self {
            id,
            expert_id,
            user_id,
            status: AppointmentStatus::Scheduled,
            start_time,
            finished_time: None,
            chats: Vec::new(),
        }
    }

    /// Chat is restricted to the two participants.
    pub fn is_participant(&self, user_id: &str) -> bool {
        self.user_id == user_id || self.expert_id == user_id
    }

    pub fn finish(&mut self, at: Timestamp) {
        self.status = AppointmentStatus::Finished;
        self.finished_time = Some(at);
    }
}

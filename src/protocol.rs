//! Wire model for the board API and the UI <-> Backend channel protocol.

use serde::de::Deserializer;
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};

use crate::clipboard::CopyOutcome;
use crate::view::ContentNode;

/// Content type of a board message. The server sends this as a plain string;
/// anything outside the known set is preserved so the UI can show a
/// placeholder instead of failing the whole list deserialization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageKind {
    Text,
    Image,
    Video,
    File,
    Unknown(String),
}

impl MessageKind {
    pub fn as_str(&self) -> &str {
        match self {
            MessageKind::Text => "text",
            MessageKind::Image => "image",
            MessageKind::Video => "video",
            MessageKind::File => "file",
            MessageKind::Unknown(raw) => raw,
        }
    }
}

impl From<&str> for MessageKind {
    fn from(raw: &str) -> Self {
        match raw {
            "text" => MessageKind::Text,
            "image" => MessageKind::Image,
            "video" => MessageKind::Video,
            "file" => MessageKind::File,
            other => MessageKind::Unknown(other.to_string()),
        }
    }
}

impl Serialize for MessageKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for MessageKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(MessageKind::from(raw.as_str()))
    }
}

/// One board message as served by `GET /messages`.
///
/// `content` holds the literal payload for text messages and a resource URL
/// (usually server-relative, e.g. `/image/aB3k9xQ2`) for everything else.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: MessageKind,
    pub content: String,
    #[serde(default)]
    pub filename: Option<String>,
    pub timestamp: i64,
}

/// Body of `GET /last-update`.
#[derive(Debug, Clone, Deserialize)]
pub struct LastUpdate {
    pub last_update: i64,
}

/// Body of `GET /messages`.
#[derive(Debug, Clone, Deserialize)]
pub struct MessageList {
    pub messages: Vec<Message>,
}

/// Which multipart field an attachment is posted under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttachmentKind {
    Image,
    Video,
    File,
}

impl AttachmentKind {
    /// Multipart form field name expected by `POST /message`.
    pub fn field_name(&self) -> &'static str {
        match self {
            AttachmentKind::Image => "image",
            AttachmentKind::Video => "video",
            AttachmentKind::File => "file",
        }
    }
}

/// A binary attachment staged for upload.
#[derive(Debug, Clone)]
pub struct Attachment {
    pub kind: AttachmentKind,
    pub filename: String,
    pub bytes: Vec<u8>,
}

/// Actions sent from the UI to the Backend
#[derive(Debug, Clone)]
pub enum BackendAction {
    /// Point the backend at a different board and reset the poll marker
    SetServer(String),
    /// Poll now instead of waiting for the next scheduled tick
    Refresh,
    /// Post a message (text and/or one attachment) to the board
    Post {
        text: String,
        attachment: Option<Attachment>,
    },
    /// Post whatever the system clipboard currently holds (text or image)
    PostFromClipboard,
    /// Delete one message by id
    Delete(String),
    /// Delete every message on the board
    DeleteAll,
    /// Copy a content node to the system clipboard
    Copy(Option<ContentNode>),
    /// Fetch image bytes for inline preview
    FetchImage { id: String, url: String },
    /// Stop the backend loop
    Shutdown,
}

/// Events sent from the Backend to the UI
#[derive(Debug, Clone)]
pub enum GuiEvent {
    /// The board changed; here is the full rebuilt message list (newest first)
    MessagesUpdated(Vec<Message>),
    /// An upload finished, successfully or not
    UploadFinished { success: bool, detail: String },
    /// A clipboard copy finished with this outcome
    CopyFinished(CopyOutcome),
    /// Image bytes arrived for an inline preview
    ImageFetched { id: String, bytes: Vec<u8> },
    /// An inline preview could not be fetched
    ImageFetchFailed { id: String, error: String },
    /// A network or backend error worth surfacing
    Error(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_kind_round_trip() {
        for raw in ["text", "image", "video", "file"] {
            let kind = MessageKind::from(raw);
            assert_eq!(kind.as_str(), raw);
            assert!(!matches!(kind, MessageKind::Unknown(_)));
        }
    }

    #[test]
    fn test_message_kind_unknown_preserved() {
        let kind = MessageKind::from("carrier-pigeon");
        assert_eq!(kind, MessageKind::Unknown("carrier-pigeon".into()));
        assert_eq!(kind.as_str(), "carrier-pigeon");
    }

    #[test]
    fn test_message_deserializes_server_shape() {
        let json = r#"{
            "id": "aB3k9xQ2",
            "type": "image",
            "content": "/image/aB3k9xQ2",
            "filename": "screenshot.png",
            "timestamp": 1722470400
        }"#;
        let msg: Message = serde_json::from_str(json).expect("valid message");
        assert_eq!(msg.kind, MessageKind::Image);
        assert_eq!(msg.content, "/image/aB3k9xQ2");
        assert_eq!(msg.filename.as_deref(), Some("screenshot.png"));
        assert_eq!(msg.timestamp, 1722470400);
    }

    #[test]
    fn test_message_with_unrecognized_type_still_parses() {
        let json = r#"{"id":"x","type":"hologram","content":"?","timestamp":1}"#;
        let msg: Message = serde_json::from_str(json).expect("must not fail the list");
        assert_eq!(msg.kind, MessageKind::Unknown("hologram".into()));
    }

    #[test]
    fn test_message_list_parses() {
        let json = r#"{"messages":[
            {"id":"a","type":"text","content":"hi","filename":"a.txt","timestamp":2},
            {"id":"b","type":"file","content":"/file/b","filename":"notes.pdf","timestamp":1}
        ]}"#;
        let list: MessageList = serde_json::from_str(json).expect("valid list");
        assert_eq!(list.messages.len(), 2);
        assert_eq!(list.messages[0].id, "a");
    }

    #[test]
    fn test_attachment_field_names() {
        assert_eq!(AttachmentKind::Image.field_name(), "image");
        assert_eq!(AttachmentKind::Video.field_name(), "video");
        assert_eq!(AttachmentKind::File.field_name(), "file");
    }
}

use std::sync::{Arc, RwLock};

use anyhow::{Result, anyhow};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Email {
    pub id: String,
    pub from: String,
    #[serde(default)]
    pub to: Vec<String>,
    pub subject: String,
    #[serde(default)]
    pub preview: String,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default, alias = "html_body")]
    pub html_body: Option<String>,
    pub date: DateTime<Utc>,
    #[serde(default)]
    pub unread: bool,
    #[serde(default)]
    pub starred: bool,
    pub folder: String,
    #[serde(default, alias = "has_attachments")]
    pub has_attachments: bool,
}

impl Email {
    pub fn sender(&self) -> Mailbox {
        Mailbox::parse(&self.from)
    }
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct Folder {
    pub id: &'static str,
    pub label: &'static str,
}

pub const DEFAULT_FOLDER: &str = "inbox";

pub const FOLDERS: [Folder; 8] = [
    Folder { id: "inbox", label: "Inbox" },
    Folder { id: "starred", label: "Starred" },
    Folder { id: "snoozed", label: "Snoozed" },
    Folder { id: "sent", label: "Sent" },
    Folder { id: "drafts", label: "Drafts" },
    Folder { id: "all", label: "All Mail" },
    Folder { id: "spam", label: "Spam" },
    Folder { id: "trash", label: "Trash" },
];

impl Folder {
    pub fn by_id(id: &str) -> Result<Folder> {
        let needle = id.trim();
        FOLDERS
            .iter()
            .copied()
            .find(|f| f.id.eq_ignore_ascii_case(needle))
            .ok_or_else(|| anyhow!("unknown folder: {}", id))
    }

    /// `all` is every message, `starred` is a flag view; the rest are real folders.
    pub fn contains(&self, email: &Email) -> bool {
        match self.id {
            "all" => true,
            "starred" => email.starred,
            id => email.folder.eq_ignore_ascii_case(id),
        }
    }
}

/// A sender or recipient as written in a header, e.g. `Jane Doe <jane@example.com>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mailbox {
    pub name: Option<String>,
    pub address: String,
}

impl Mailbox {
    pub fn parse(raw: &str) -> Mailbox {
        let raw = raw.trim();
        if let (Some(open), Some(close)) = (raw.rfind('<'), raw.rfind('>')) {
            if open < close {
                let address = raw[open + 1..close].trim().to_string();
                let name = raw[..open].trim().trim_matches('"').trim();
                return Mailbox {
                    name: (!name.is_empty()).then(|| name.to_string()),
                    address,
                };
            }
        }
        if !raw.contains('@') && !raw.is_empty() {
            // Listings without an address only carry the display name.
            return Mailbox {
                name: Some(raw.to_string()),
                address: raw.to_string(),
            };
        }
        Mailbox {
            name: None,
            address: raw.to_string(),
        }
    }

    /// Lower-cased text after the first `@`, empty when there is none.
    pub fn domain(&self) -> String {
        domain_of(&self.address)
    }
}

pub fn domain_of(address: &str) -> String {
    address
        .split('@')
        .nth(1)
        .map(|d| d.trim().to_lowercase())
        .unwrap_or_default()
}

#[derive(Debug, Clone, PartialEq)]
pub struct MailState {
    current_folder: String,
    selected: Option<Email>,
}

impl Default for MailState {
    fn default() -> Self {
        Self {
            current_folder: DEFAULT_FOLDER.to_string(),
            selected: None,
        }
    }
}

impl MailState {
    pub fn current_folder(&self) -> &str {
        &self.current_folder
    }

    pub fn selected_email(&self) -> Option<&Email> {
        self.selected.as_ref()
    }

    pub fn set_current_folder(&mut self, folder: &str) {
        self.current_folder = folder.to_string();
        self.selected = None;
    }

    pub fn set_selected_email(&mut self, email: Option<Email>) {
        self.selected = email;
    }
}

/// Bearer token shared by every clone; the API client reads it per request.
#[derive(Debug, Clone, Default)]
pub struct CredentialStore {
    token: Arc<RwLock<Option<String>>>,
}

impl CredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> Option<String> {
        match self.token.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn set(&self, token: impl Into<String>) {
        let token = token.into();
        let mut guard = match self.token.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *guard = (!token.trim().is_empty()).then_some(token);
    }

    pub fn clear(&self) {
        let mut guard = match self.token.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *guard = None;
    }

    pub fn is_set(&self) -> bool {
        self.get().is_some()
    }
}

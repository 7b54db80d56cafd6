use std::io::{self, BufRead};

use anyhow::{Result, anyhow};
use mythmail_api::ApiClient;
use mythmail_avatar::{AvatarResolver, AvatarResult};
use mythmail_core::{CredentialStore, Email};
use serde_json::{Value as JsonValue, json};

use super::AppConfig;

pub(crate) const CLI_SCHEMA_VERSION: u32 = 1;
pub(crate) const TOKEN_ENV: &str = "MYTHMAIL_TOKEN";
pub(crate) const PASSWORD_ENV: &str = "MYTHMAIL_PASSWORD";

pub(crate) fn output_ok(value: JsonValue) -> Result<()> {
    println!(
        "{}",
        serde_json::to_string(&json!({
            "schema": CLI_SCHEMA_VERSION,
            "ok": true,
            "result": value
        }))?
    );
    Ok(())
}

pub(crate) fn output_error(message: &str) -> Result<()> {
    println!(
        "{}",
        serde_json::to_string(&json!({
            "schema": CLI_SCHEMA_VERSION,
            "ok": false,
            "error": message
        }))?
    );
    Ok(())
}

pub(crate) struct Services {
    pub(crate) api: ApiClient,
    pub(crate) avatars: AvatarResolver,
}

/// Wires the API client and the avatar resolver onto one HTTP client.
pub(crate) fn build_services(config: &AppConfig) -> Result<Services> {
    let credentials = CredentialStore::new();
    if let Ok(token) = std::env::var(TOKEN_ENV) {
        credentials.set(token);
    }
    let api = ApiClient::new(config.api.clone(), credentials)?;
    let avatars = AvatarResolver::from_config(&config.avatar, api.base_url(), api.http().clone());
    Ok(Services { api, avatars })
}

pub(crate) fn read_password() -> Result<String> {
    if let Ok(password) = std::env::var(PASSWORD_ENV) {
        return Ok(password);
    }
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    let password = line.trim_end_matches(['\r', '\n']).to_string();
    if password.is_empty() {
        return Err(anyhow!("no password given (set {} or pipe it on stdin)", PASSWORD_ENV));
    }
    Ok(password)
}

pub(crate) fn summary_to_json(email: &Email, avatar: &AvatarResult) -> JsonValue {
    json!({
        "id": email.id,
        "from": email.from,
        "subject": email.subject,
        "preview": email.preview,
        "date": email.date.to_rfc3339(),
        "unread": email.unread,
        "starred": email.starred,
        "folder": email.folder,
        "has_attachments": email.has_attachments,
        "avatar": avatar,
    })
}

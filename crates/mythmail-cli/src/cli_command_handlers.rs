use std::io::Read;

use anyhow::Result;
use mythmail_api::SendEmailRequest;
use mythmail_avatar::{AvatarPresentation, AvatarResolver, AvatarSlot};
use mythmail_content::{render_body, sanitize};
use mythmail_core::{FOLDERS, Folder, MailState};
use serde_json::json;
use tracing::debug;

use super::{
    AppConfig, CliCommand, build_services, output_error, output_ok, read_password,
    summary_to_json,
};

pub(crate) fn run_cli(
    rt: &tokio::runtime::Runtime,
    command: CliCommand,
    config: &AppConfig,
) -> Result<()> {
    if let Some(err) = config.load_error.as_deref() {
        debug!("config ignored: {}", err);
    }

    match command {
        CliCommand::Folders => {
            let out: Vec<_> = FOLDERS
                .iter()
                .map(|f| json!({ "id": f.id, "label": f.label }))
                .collect();
            output_ok(json!(out))
        }
        CliCommand::Sanitize(cmd) => {
            let raw = match cmd.file {
                Some(path) => std::fs::read_to_string(path)?,
                None => {
                    let mut buf = String::new();
                    std::io::stdin().read_to_string(&mut buf)?;
                    buf
                }
            };
            let clean = sanitize(&raw);
            output_ok(json!({ "html": clean.as_str() }))
        }
        CliCommand::Avatar(cmd) => {
            let services = build_services(config)?;
            let avatar = if cmd.sync {
                services.avatars.resolve_sync(&cmd.email, cmd.name.as_deref())
            } else {
                rt.block_on(services.avatars.resolve(&cmd.email, cmd.name.as_deref()))
            };
            output_ok(json!(avatar))
        }
        CliCommand::List(cmd) => {
            let services = build_services(config)?;
            let mut state = MailState::default();
            if let Some(folder) = cmd.folder.as_deref() {
                state.set_current_folder(Folder::by_id(folder)?.id);
            }
            let emails = rt.block_on(services.api.fetch_emails(state.current_folder()))?;
            let out: Vec<_> = emails
                .iter()
                .map(|email| {
                    let avatar = services.avatars.resolve_sync(&email.from, None);
                    summary_to_json(email, &avatar)
                })
                .collect();
            output_ok(json!({ "folder": state.current_folder(), "emails": out }))
        }
        CliCommand::Show(cmd) => {
            let services = build_services(config)?;
            let mut state = MailState::default();
            if let Some(folder) = cmd.folder.as_deref() {
                state.set_current_folder(Folder::by_id(folder)?.id);
            }
            let Some(email) = rt.block_on(services.api.fetch_email(state.current_folder(), &cmd.id))?
            else {
                return output_error("Message not found");
            };
            state.set_selected_email(Some(email.clone()));
            let avatar = sender_avatar(rt, &services.avatars, &email.from);

            let body = render_body(&email);
            let body = if cmd.text {
                json!({ "text": body.to_text(cmd.width) })
            } else {
                json!({ "html": body.as_str() })
            };
            output_ok(json!({
                "email": {
                    "id": email.id,
                    "from": email.from,
                    "to": email.to,
                    "subject": email.subject,
                    "date": email.date.to_rfc3339(),
                    "unread": email.unread,
                    "starred": email.starred,
                },
                "avatar": avatar.slot.current(),
                "avatar_first_paint": avatar.first_paint,
                "avatar_presentation": avatar.slot.presentation(),
                "avatar_resolved": avatar.resolved,
                "body": body,
            }))
        }
        CliCommand::Login(cmd) => {
            let services = build_services(config)?;
            let password = read_password()?;
            let login = rt.block_on(services.api.login(&cmd.email, &password))?;
            output_ok(json!({ "token": login.token, "user": login.user }))
        }
        CliCommand::Logout => {
            let services = build_services(config)?;
            rt.block_on(services.api.logout())?;
            output_ok(json!({ "logged_out": true }))
        }
        CliCommand::Send(cmd) => {
            let services = build_services(config)?;
            let request = SendEmailRequest {
                to: cmd.to,
                subject: cmd.subject,
                body: cmd.body,
                cc: (!cmd.cc.is_empty()).then_some(cmd.cc),
                bcc: (!cmd.bcc.is_empty()).then_some(cmd.bcc),
            };
            let id = rt.block_on(services.api.send_email(&request))?;
            output_ok(json!({ "sent": true, "id": id }))
        }
        CliCommand::Delete(cmd) => {
            let services = build_services(config)?;
            rt.block_on(services.api.delete_email(&cmd.id))?;
            output_ok(json!({ "deleted": cmd.id }))
        }
        CliCommand::MarkRead(cmd) => {
            let services = build_services(config)?;
            let read = !cmd.unread;
            rt.block_on(services.api.mark_as_read(&cmd.id, read))?;
            output_ok(json!({ "id": cmd.id, "read": read }))
        }
        CliCommand::Star(cmd) => {
            let services = build_services(config)?;
            let starred = !cmd.off;
            rt.block_on(services.api.star_email(&cmd.id, starred))?;
            output_ok(json!({ "id": cmd.id, "starred": starred }))
        }
    }
}

pub(crate) struct SenderAvatar {
    pub(crate) slot: AvatarSlot,
    pub(crate) first_paint: Option<AvatarPresentation>,
    pub(crate) resolved: bool,
}

/// Paints the optimistic avatar, then installs the looked-up one.
pub(crate) fn sender_avatar(
    rt: &tokio::runtime::Runtime,
    resolver: &AvatarResolver,
    from: &str,
) -> SenderAvatar {
    let mut slot = AvatarSlot::new();
    let ticket = slot.show(resolver, from, None);
    let first_paint = slot.presentation();
    let result = rt.block_on(resolver.resolve(from, None));
    let resolved = slot.apply(ticket, result);
    if !resolved {
        debug!(from, "resolved avatar was stale");
    }
    SenderAvatar {
        slot,
        first_paint,
        resolved,
    }
}

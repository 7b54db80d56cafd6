use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "mythmail", version, about = "Webmail client")]
pub(crate) struct Cli {
    /// Raise log verbosity (-v info, -vv debug). MYTHMAIL_LOG overrides it.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub(crate) verbose: u8,
    #[command(subcommand)]
    pub(crate) command: CliCommand,
}

#[derive(Subcommand, Debug)]
pub(crate) enum CliCommand {
    /// List navigation folders.
    Folders,
    /// List the emails of a folder.
    List(ListCmd),
    /// Show one email with its avatar and sanitized body.
    Show(ShowCmd),
    /// Resolve the avatar for an address.
    Avatar(AvatarCmd),
    /// Sanitize an HTML file (or stdin).
    Sanitize(SanitizeCmd),
    Login(LoginCmd),
    Logout,
    Send(SendCmd),
    Delete(IdCmd),
    MarkRead(MarkReadCmd),
    Star(StarCmd),
}

#[derive(Args, Debug)]
pub(crate) struct ListCmd {
    pub(crate) folder: Option<String>,
}

#[derive(Args, Debug)]
pub(crate) struct ShowCmd {
    pub(crate) id: String,
    #[arg(long)]
    pub(crate) folder: Option<String>,
    /// Render the body as terminal text instead of markup.
    #[arg(long)]
    pub(crate) text: bool,
    #[arg(long, default_value_t = 80)]
    pub(crate) width: usize,
}

#[derive(Args, Debug)]
pub(crate) struct AvatarCmd {
    pub(crate) email: String,
    #[arg(long)]
    pub(crate) name: Option<String>,
    /// First-paint result only, no network.
    #[arg(long)]
    pub(crate) sync: bool,
}

#[derive(Args, Debug)]
pub(crate) struct SanitizeCmd {
    pub(crate) file: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub(crate) struct LoginCmd {
    pub(crate) email: String,
}

#[derive(Args, Debug)]
pub(crate) struct SendCmd {
    #[arg(long, required = true)]
    pub(crate) to: Vec<String>,
    #[arg(long)]
    pub(crate) cc: Vec<String>,
    #[arg(long)]
    pub(crate) bcc: Vec<String>,
    #[arg(long)]
    pub(crate) subject: String,
    #[arg(long)]
    pub(crate) body: String,
}

#[derive(Args, Debug)]
pub(crate) struct IdCmd {
    pub(crate) id: String,
}

#[derive(Args, Debug)]
pub(crate) struct MarkReadCmd {
    pub(crate) id: String,
    #[arg(long)]
    pub(crate) unread: bool,
}

#[derive(Args, Debug)]
pub(crate) struct StarCmd {
    pub(crate) id: String,
    #[arg(long)]
    pub(crate) off: bool,
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::{Cli, CliCommand};

    #[test]
    fn parses_show_with_flags() {
        let cli = Cli::try_parse_from(["mythmail", "-vv", "show", "3", "--text", "--folder", "all"])
            .unwrap();
        assert_eq!(cli.verbose, 2);
        match cli.command {
            CliCommand::Show(cmd) => {
                assert_eq!(cmd.id, "3");
                assert!(cmd.text);
                assert_eq!(cmd.folder.as_deref(), Some("all"));
                assert_eq!(cmd.width, 80);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn send_requires_recipient() {
        assert!(Cli::try_parse_from(["mythmail", "send", "--subject", "s", "--body", "b"]).is_err());
        let cli = Cli::try_parse_from([
            "mythmail", "send", "--to", "a@x.com", "--to", "b@x.com", "--subject", "s", "--body",
            "b",
        ])
        .unwrap();
        match cli.command {
            CliCommand::Send(cmd) => assert_eq!(cmd.to, vec!["a@x.com", "b@x.com"]),
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn avatar_and_mark_read_flags() {
        let cli = Cli::try_parse_from(["mythmail", "avatar", "a@acme.com", "--name", "Al", "--sync"])
            .unwrap();
        assert!(matches!(cli.command, CliCommand::Avatar(ref cmd) if cmd.sync && cmd.name.as_deref() == Some("Al")));

        let cli = Cli::try_parse_from(["mythmail", "mark-read", "7", "--unread"]).unwrap();
        assert!(matches!(cli.command, CliCommand::MarkRead(ref cmd) if cmd.unread && cmd.id == "7"));
    }
}

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use desktop_notify::{Hint, Notification, Timeout, Urgency};

/// Struct that gets generated from `RawOpt`.
#[derive(Debug, PartialEq)]
pub struct Opt {
    pub log_debug: bool,
    pub app_name: String,
    pub action: Action,
}

#[derive(Parser, Debug, PartialEq)]
#[command(author = "elkowar", version, about = "Send and track desktop notifications", long_about = None)]
pub(super) struct RawOpt {
    /// Write out debug logs.
    #[arg(long = "debug", global = true)]
    log_debug: bool,

    /// Application name sent along with every notification
    #[arg(short, long, global = true, default_value = "dnotify")]
    app_name: String,

    #[command(subcommand)]
    action: Action,
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum Action {
    /// Show a notification and print the id the server assigned to it.
    #[command(name = "send", alias = "s")]
    Send {
        #[command(flatten)]
        notification: NotificationArgs,

        /// Id of an existing notification that should be replaced
        #[arg(short, long, default_value_t = 0)]
        replace_id: u32,

        /// Wait until the notification is closed or one of its actions is invoked, and print what happened
        #[arg(short, long)]
        wait: bool,
    },

    /// Close the notification with the given id
    #[command(name = "close", alias = "c")]
    Close { id: u32 },

    /// Print the optional features the notification server supports
    #[command(name = "capabilities", alias = "caps")]
    Capabilities,

    /// Print name, vendor and version of the notification server
    #[command(name = "info")]
    Info,

    /// Print the outcome of the notifications with the given ids as they arrive
    #[command(name = "watch", alias = "w")]
    Watch {
        #[arg(required = true)]
        ids: Vec<u32>,
    },

    /// Show a notification through `notify-send`, without talking to the bus directly
    #[command(name = "fallback")]
    Fallback {
        #[command(flatten)]
        notification: NotificationArgs,

        /// Sound file to play after the notification was shown
        #[arg(long)]
        sound_file: Option<PathBuf>,
    },
}

#[derive(Args, Debug, PartialEq)]
pub struct NotificationArgs {
    pub summary: String,

    #[arg(default_value = "")]
    pub body: String,

    /// Icon theme name or path to an image
    #[arg(short, long)]
    pub icon: Option<String>,

    /// One of low, normal or critical
    #[arg(short, long)]
    pub urgency: Option<Urgency>,

    /// Milliseconds until the notification expires. 0 means never, -1 lets the server decide
    #[arg(short = 't', long, allow_negative_numbers = true)]
    pub expire_time: Option<i32>,

    #[arg(short, long)]
    pub category: Option<String>,

    /// Extra hint in the shape `TYPE:NAME:VALUE`, where TYPE is one of boolean, byte, int or string
    #[arg(long = "hint")]
    pub hints: Vec<String>,

    /// Action in the shape `id:label`. The id `default` is used when the notification itself is clicked
    #[arg(short = 'A', long = "action", value_parser = parse_action)]
    pub actions: Vec<(String, String)>,
}

impl Opt {
    pub fn from_env() -> Self {
        let raw: RawOpt = RawOpt::parse();
        raw.into()
    }
}

impl From<RawOpt> for Opt {
    fn from(other: RawOpt) -> Self {
        let RawOpt { log_debug, app_name, action } = other;
        Opt { log_debug, app_name, action }
    }
}

fn parse_action(s: &str) -> Result<(String, String)> {
    let (id, label) =
        s.split_once(':').with_context(|| format!("actions must be in the shape `id:label`, but got: {}", s))?;
    if id.is_empty() {
        bail!("action id must not be empty in `{}`", s);
    }
    Ok((id.to_owned(), label.to_owned()))
}

/// Parse a hint in the `TYPE:NAME:VALUE` shape `notify-send` understands.
pub fn parse_hint(s: &str) -> Result<(String, Hint)> {
    let mut parts = s.splitn(3, ':');
    let (Some(kind), Some(name), Some(value)) = (parts.next(), parts.next(), parts.next()) else {
        bail!("hints must be in the shape `TYPE:NAME:VALUE`, but got: {}", s);
    };
    let hint = match kind {
        "boolean" => Hint::Bool(value.parse().with_context(|| format!("invalid boolean in hint `{}`", s))?),
        "byte" => Hint::Byte(value.parse().with_context(|| format!("invalid byte in hint `{}`", s))?),
        "int" => Hint::I32(value.parse().with_context(|| format!("invalid int in hint `{}`", s))?),
        "string" => Hint::Str(value.to_owned()),
        other => bail!("unsupported hint type `{}`, expected one of boolean, byte, int or string", other),
    };
    Ok((name.to_owned(), hint))
}

impl NotificationArgs {
    pub fn to_notification(&self, app_name: &str) -> Result<Notification> {
        let mut notification = Notification::new(&self.summary, &self.body)?;
        notification.app_name(app_name);
        if let Some(icon) = &self.icon {
            notification.icon(icon);
        }
        if let Some(urgency) = self.urgency {
            notification.urgency(urgency);
        }
        if let Some(expire_time) = self.expire_time {
            notification.timeout(Timeout::from(expire_time));
        }
        if let Some(category) = &self.category {
            notification.category(category);
        }
        for (id, label) in &self.actions {
            notification.action(id, label);
        }
        for hint in &self.hints {
            let (name, value) = parse_hint(hint)?;
            notification.hint(name, value);
        }
        Ok(notification)
    }
}

use std::collections::BTreeMap;

use crate::{gateway::NotifyArgs, names::hint, *};

/// How long a notification stays on screen before the server closes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Timeout {
    /// Let the server decide.
    #[default]
    Default,
    /// Never expire. The notification stays until the user or the application closes it.
    Never,
    Milliseconds(u32),
}

impl From<i32> for Timeout {
    fn from(ms: i32) -> Self {
        match ms {
            0 => Timeout::Never,
            ms if ms < 0 => Timeout::Default,
            ms => Timeout::Milliseconds(ms as u32),
        }
    }
}

impl From<Timeout> for i32 {
    fn from(timeout: Timeout) -> Self {
        match timeout {
            Timeout::Default => -1,
            Timeout::Never => 0,
            Timeout::Milliseconds(ms) => ms.min(i32::MAX as u32) as i32,
        }
    }
}

/// A notification, as it will be sent to the server.
///
/// This is a plain value: it can be changed and sent any number of times. Setting
/// [`replaces_id`](Notification::replaces_id) to an id returned by a previous send updates that
/// notification in place instead of showing a new one.
///
/// The summary is only checked for emptiness by [`Notification::new`]. If it is cleared afterwards,
/// the notification is still sent as-is.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Notification {
    pub app_name: String,
    pub replaces_id: u32,
    /// Icon theme name or absolute path.
    pub icon: String,
    pub summary: String,
    pub body: String,
    /// `(action id, label)` pairs. The id `default` is invoked when the notification itself is
    /// clicked.
    pub actions: Vec<(String, String)>,
    pub hints: BTreeMap<String, Hint>,
    pub timeout: Timeout,
}

impl Notification {
    pub fn new(summary: impl Into<String>, body: impl Into<String>) -> Result<Self> {
        let summary = summary.into();
        if summary.is_empty() {
            return Err(Error::InvalidArgument("a notification must have a summary".to_string()));
        }
        Ok(Self { summary, body: body.into(), ..Default::default() })
    }

    pub fn app_name(&mut self, app_name: impl Into<String>) -> &mut Self {
        self.app_name = app_name.into();
        self
    }

    pub fn replaces(&mut self, id: u32) -> &mut Self {
        self.replaces_id = id;
        self
    }

    pub fn icon(&mut self, icon: impl Into<String>) -> &mut Self {
        self.icon = icon.into();
        self
    }

    pub fn action(&mut self, id: impl Into<String>, label: impl Into<String>) -> &mut Self {
        self.actions.push((id.into(), label.into()));
        self
    }

    pub fn hint(&mut self, key: impl Into<String>, value: impl Into<Hint>) -> &mut Self {
        self.hints.insert(key.into(), value.into());
        self
    }

    pub fn timeout(&mut self, timeout: impl Into<Timeout>) -> &mut Self {
        self.timeout = timeout.into();
        self
    }

    pub fn urgency(&mut self, urgency: Urgency) -> &mut Self {
        self.hint(hint::URGENCY, urgency)
    }

    pub fn category(&mut self, category: impl Into<String>) -> &mut Self {
        self.hint(hint::CATEGORY, category.into())
    }

    /// Attach raw pixels as the `image-data` hint. On error the notification is left unchanged.
    #[allow(clippy::too_many_arguments)]
    pub fn image(
        &mut self,
        width: i32,
        height: i32,
        rowstride: i32,
        has_alpha: bool,
        bits_per_sample: i32,
        channels: i32,
        data: Vec<u8>,
    ) -> Result<&mut Self> {
        let image = ImageData::new(width, height, rowstride, has_alpha, bits_per_sample, channels, data)?;
        Ok(self.hint(hint::IMAGE_DATA, image))
    }

    pub fn image_path(&mut self, path: impl Into<String>) -> &mut Self {
        self.hint(hint::IMAGE_PATH, path.into())
    }

    /// A themeable sound name from the freedesktop.org sound naming spec, e.g. `message-new-instant`.
    pub fn sound_name(&mut self, name: impl Into<String>) -> &mut Self {
        self.hint(hint::SOUND_NAME, name.into())
    }

    pub fn sound_file(&mut self, path: impl Into<String>) -> &mut Self {
        self.hint(hint::SOUND_FILE, path.into())
    }

    pub fn suppress_sound(&mut self, suppress: bool) -> &mut Self {
        self.hint(hint::SUPPRESS_SOUND, suppress)
    }

    pub fn transient(&mut self, transient: bool) -> &mut Self {
        self.hint(hint::TRANSIENT, transient)
    }

    pub fn resident(&mut self, resident: bool) -> &mut Self {
        self.hint(hint::RESIDENT, resident)
    }

    pub fn action_icons(&mut self, action_icons: bool) -> &mut Self {
        self.hint(hint::ACTION_ICONS, action_icons)
    }

    pub fn desktop_entry(&mut self, entry: impl Into<String>) -> &mut Self {
        self.hint(hint::DESKTOP_ENTRY, entry.into())
    }

    /// Screen position the server should point the notification at.
    pub fn position(&mut self, x: i32, y: i32) -> &mut Self {
        self.hint(hint::X, x).hint(hint::Y, y)
    }

    /// The arguments of the `Notify` call for this notification.
    pub fn to_notify_args(&self) -> NotifyArgs {
        NotifyArgs {
            app_name: self.app_name.clone(),
            replaces_id: self.replaces_id,
            app_icon: self.icon.clone(),
            summary: self.summary.clone(),
            body: self.body.clone(),
            actions: self.actions.iter().flat_map(|(id, label)| [id.clone(), label.clone()]).collect(),
            hints: encode_hints(&self.hints),
            expire_timeout: self.timeout.into(),
        }
    }
}

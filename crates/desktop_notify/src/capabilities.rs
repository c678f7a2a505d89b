/// The optional features a notification server advertises through `GetCapabilities`.
///
/// Capability strings this library doesn't know about (including vendor `x-` extensions) are
/// ignored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Capabilities {
    /// Icons can be used instead of text for displaying actions.
    pub action_icons: bool,
    /// The server will provide the specified actions to the user.
    pub actions: bool,
    /// Body text is supported. Some servers only show the summary.
    pub body: bool,
    pub body_hyperlinks: bool,
    pub body_images: bool,
    pub body_markup: bool,
    /// All frames of an image array are rendered as an animation.
    pub icon_multi: bool,
    /// Exactly one frame of an image array is shown.
    pub icon_static: bool,
    /// Notifications are retained until acknowledged or removed by the user, or recalled by the
    /// sender.
    pub persistence: bool,
    pub sound: bool,
}

impl Capabilities {
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut caps = Capabilities::default();
        for name in names {
            match name.as_ref() {
                "action-icons" => caps.action_icons = true,
                "actions" => caps.actions = true,
                "body" => caps.body = true,
                "body-hyperlinks" => caps.body_hyperlinks = true,
                "body-images" => caps.body_images = true,
                "body-markup" => caps.body_markup = true,
                "icon-multi" => caps.icon_multi = true,
                "icon-static" => caps.icon_static = true,
                "persistence" => caps.persistence = true,
                "sound" => caps.sound = true,
                other => log::trace!("ignoring unknown capability {:?}", other),
            }
        }
        caps
    }

    /// The protocol names of all capabilities that are set.
    pub fn names(&self) -> Vec<&'static str> {
        [
            (self.action_icons, "action-icons"),
            (self.actions, "actions"),
            (self.body, "body"),
            (self.body_hyperlinks, "body-hyperlinks"),
            (self.body_images, "body-images"),
            (self.body_markup, "body-markup"),
            (self.icon_multi, "icon-multi"),
            (self.icon_static, "icon-static"),
            (self.persistence, "persistence"),
            (self.sound, "sound"),
        ]
        .into_iter()
        .filter_map(|(set, name)| set.then_some(name))
        .collect()
    }
}

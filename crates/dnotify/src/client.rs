use anyhow::{bail, Context, Result};
use desktop_notify::{
    fallback::{Fallback, Message, Sound},
    Capabilities, Interest, Notifier, Outcomes, Signal,
};
use futures::StreamExt;
use tokio_util::sync::CancellationToken;

use crate::opts::{Action, NotificationArgs};

pub async fn handle_action(app_name: String, action: Action) -> Result<()> {
    match action {
        Action::Send { notification, replace_id, wait } => {
            let notifier = connect().await?;
            let mut notification = notification.to_notification(&app_name)?;
            notification.replaces(replace_id);
            if wait {
                let outcomes = notifier.outcomes().await.context("Failed to subscribe to notification signals")?;
                let interest = notifier.send_and_track(&notification, &outcomes).await?;
                println!("{}", interest.id());
                watch(&outcomes, vec![interest]).await?;
            } else {
                println!("{}", notifier.send(&notification).await?);
            }
        }
        Action::Close { id } => {
            let notifier = connect().await?;
            notifier.close(id).await.with_context(|| format!("Failed to close notification {}", id))?;
        }
        Action::Capabilities => {
            let names = connect().await?.raw_capabilities().await?;
            let known = Capabilities::from_names(&names).names();
            for name in names {
                if known.iter().any(|known| *known == name) {
                    println!("{}", name);
                } else {
                    println!("{} (extension)", name);
                }
            }
        }
        Action::Info => {
            let info = connect().await?.server_information().await?;
            println!("name: {}\nvendor: {}\nversion: {}\nspec version: {}", info.name, info.vendor, info.version, info.spec_version);
        }
        Action::Watch { ids } => {
            let notifier = connect().await?;
            let outcomes = notifier.outcomes().await.context("Failed to subscribe to notification signals")?;
            let interests = ids.into_iter().map(|id| outcomes.register(id)).collect();
            watch(&outcomes, interests).await?;
        }
        Action::Fallback { notification, sound_file } => {
            let fallback = Fallback::detect();
            let message = to_message(notification, sound_file)?;
            fallback.send(&message).await.context("Failed to show notification through notify-send")?;
        }
    }
    Ok(())
}

async fn connect() -> Result<Notifier> {
    Notifier::session().await.context("Failed to connect to the notification server")
}

/// Print each outcome as it arrives, until all of them resolved or ctrl-c is pressed.
async fn watch(outcomes: &Outcomes, interests: Vec<Interest>) -> Result<()> {
    let token = CancellationToken::new();
    let handles: Vec<_> = interests.iter().map(|interest| interest.cancel_handle()).collect();
    let ctrl_c = tokio::spawn({
        let token = token.clone();
        async move {
            tokio::select! {
                _ = token.cancelled() => {}
                _ = tokio::signal::ctrl_c() => {
                    log::info!("Interrupted, no longer waiting for notifications");
                    handles.iter().for_each(|handle| handle.cancel());
                }
            }
        }
    });

    let mut outcome_stream = futures::stream::select_all(interests.into_iter().map(|interest| interest.into_stream().boxed()));
    let mut result = Ok(());
    while let Some(outcome) = outcome_stream.next().await {
        match outcome {
            Ok(Signal::ActionInvoked { id, action_key }) => println!("{}: action {}", id, action_key),
            Ok(Signal::NotificationClosed { id, reason }) => println!("{}: {}", id, reason),
            Err(err) => {
                result = Err(err).context("Lost connection to the notification server");
                break;
            }
        }
    }

    token.cancel();
    let _ = ctrl_c.await;
    log::debug!("{} interests still pending", outcomes.pending());
    result
}

fn to_message(args: NotificationArgs, sound_file: Option<std::path::PathBuf>) -> Result<Message> {
    if !args.actions.is_empty() {
        bail!("actions are not supported by notify-send");
    }
    if args.hints.len() > 1 {
        bail!("notify-send only accepts a single hint");
    }
    let NotificationArgs { summary, body, icon, urgency, expire_time, category, hints, .. } = args;
    Ok(Message {
        icon,
        urgency,
        expire_time: expire_time.and_then(|ms| u32::try_from(ms).ok()),
        category,
        hint: hints.into_iter().next(),
        sound: sound_file.map(Sound::File),
        ..Message::new(summary, body)
    })
}

#[cfg(test)]
mod test {
    use super::*;
    use desktop_notify::{fallback::FallbackError, Urgency};
    use pretty_assertions::assert_eq;

    fn args(summary: &str) -> NotificationArgs {
        NotificationArgs {
            summary: summary.to_string(),
            body: String::new(),
            icon: None,
            urgency: None,
            expire_time: None,
            category: None,
            hints: Vec::new(),
            actions: Vec::new(),
        }
    }

    #[test]
    fn test_to_message() {
        let message = to_message(
            NotificationArgs {
                urgency: Some(Urgency::Low),
                expire_time: Some(-1),
                hints: vec!["int:transient:1".to_string()],
                ..args("Update available")
            },
            Some("/tmp/ding.oga".into()),
        )
        .unwrap();
        assert_eq!(message.title, "Update available");
        assert_eq!(message.urgency, Some(Urgency::Low));
        assert_eq!(message.expire_time, None);
        assert_eq!(message.hint.as_deref(), Some("int:transient:1"));
        assert_eq!(message.sound, Some(Sound::File("/tmp/ding.oga".into())));
    }

    #[test]
    fn test_to_message_rejects_unsupported() {
        assert!(to_message(NotificationArgs { actions: vec![("default".into(), "Open".into())], ..args("x") }, None).is_err());
        assert!(to_message(NotificationArgs { hints: vec!["int:x:1".into(), "int:y:2".into()], ..args("x") }, None).is_err());
    }

    #[tokio::test]
    async fn test_fallback_is_handled_without_the_bus() {
        // fails on the missing text before notify-send or a bus connection is involved
        let err = handle_action("dnotify".to_string(), Action::Fallback { notification: args(""), sound_file: None })
            .await
            .unwrap_err();
        assert!(matches!(err.downcast_ref::<FallbackError>(), Some(FallbackError::MissingText)));
    }
}

//! Notifications through the `notify-send` command line tool, for setups where talking to the bus
//! directly isn't an option. Sounds are played through an external audio player.
//!
//! Nothing here falls back to (or from) [`Notifier`](crate::Notifier); picking a path is up to the
//! application.

use std::{
    ffi::OsString,
    path::{Path, PathBuf},
    process::{Output, Stdio},
};

use tokio::{io::AsyncWriteExt, process::Command};

use crate::Urgency;

/// Audio players tried by [`SoundBackend::resolve`], in order, with the arguments that make them
/// read audio from stdin.
const SOUND_PLAYERS: &[(&str, &[&str])] = &[("paplay", &[]), ("pw-play", &["-"]), ("aplay", &[])];

#[derive(thiserror::Error, Debug)]
pub enum FallbackError {
    #[error("a title or body must be specified")]
    MissingText,
    #[error("no sound backend could be found")]
    NoSoundBackend,
    #[error("{program}: {}: {source}", .output.trim())]
    Process {
        program: String,
        /// Combined stdout and stderr of the process.
        output: String,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Sound {
    File(PathBuf),
    /// Encoded audio, piped to the player's stdin.
    Bytes(Vec<u8>),
}

/// A notification for `notify-send`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Message {
    pub title: String,
    pub body: String,
    pub icon: Option<String>,
    pub urgency: Option<Urgency>,
    /// Milliseconds.
    pub expire_time: Option<u32>,
    pub category: Option<String>,
    /// `TYPE:NAME:VALUE`, as understood by `notify-send --hint`.
    pub hint: Option<String>,
    pub sound: Option<Sound>,
}

impl Message {
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self { title: title.into(), body: body.into(), ..Default::default() }
    }

    pub fn notify_send_args(&self) -> Vec<String> {
        let mut args = vec![self.title.clone()];
        if !self.body.is_empty() {
            args.push(self.body.clone());
        }
        if let Some(icon) = &self.icon {
            args.push(format!("--icon={}", icon));
        }
        if let Some(urgency) = self.urgency {
            args.push(format!("--urgency={}", urgency));
        }
        if let Some(expire_time) = self.expire_time {
            args.push(format!("--expire-time={}", expire_time));
        }
        if let Some(category) = &self.category {
            args.push(format!("--category={}", category));
        }
        if let Some(hint) = &self.hint {
            args.push(format!("--hint={}", hint));
        }
        args
    }
}

/// An audio player found on the system.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SoundBackend {
    pub program: PathBuf,
    pub stdin_args: Vec<String>,
}

impl SoundBackend {
    /// Find the first known audio player on `PATH`.
    pub fn resolve() -> Option<Self> {
        let path = std::env::var_os("PATH").unwrap_or_else(OsString::new);
        Self::resolve_in(std::env::split_paths(&path))
    }

    pub fn resolve_in(dirs: impl IntoIterator<Item = PathBuf>) -> Option<Self> {
        let dirs: Vec<PathBuf> = dirs.into_iter().collect();
        SOUND_PLAYERS.iter().find_map(|(name, stdin_args)| {
            let program = dirs.iter().map(|dir| dir.join(name)).find(|candidate| is_executable(candidate))?;
            log::debug!("using {} to play sounds", program.display());
            Some(SoundBackend { program, stdin_args: stdin_args.iter().map(|arg| arg.to_string()).collect() })
        })
    }
}

fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    path.metadata().map(|meta| meta.is_file() && meta.permissions().mode() & 0o111 != 0).unwrap_or(false)
}

/// The command line notification path, configured once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fallback {
    pub notify_send: PathBuf,
    pub sound_backend: Option<SoundBackend>,
}

impl Fallback {
    pub fn new(notify_send: impl Into<PathBuf>, sound_backend: Option<SoundBackend>) -> Self {
        Self { notify_send: notify_send.into(), sound_backend }
    }

    /// `notify-send` from `PATH`, and whichever audio player is found first.
    pub fn detect() -> Self {
        Self::new("notify-send", SoundBackend::resolve())
    }

    pub async fn send(&self, msg: &Message) -> Result<(), FallbackError> {
        if msg.title.is_empty() && msg.body.is_empty() {
            return Err(FallbackError::MissingText);
        }
        if msg.sound.is_some() && self.sound_backend.is_none() {
            return Err(FallbackError::NoSoundBackend);
        }

        let mut cmd = Command::new(&self.notify_send);
        cmd.args(msg.notify_send_args());
        run(cmd, None).await?;

        if let Some(sound) = &msg.sound {
            self.play_sound(sound).await?;
        }
        Ok(())
    }

    pub async fn play_sound(&self, sound: &Sound) -> Result<(), FallbackError> {
        let backend = self.sound_backend.as_ref().ok_or(FallbackError::NoSoundBackend)?;
        let mut cmd = Command::new(&backend.program);
        match sound {
            Sound::File(path) => {
                cmd.arg(path);
                run(cmd, None).await
            }
            Sound::Bytes(bytes) => {
                cmd.args(&backend.stdin_args);
                run(cmd, Some(bytes)).await
            }
        }
    }
}

async fn run(mut cmd: Command, stdin: Option<&[u8]>) -> Result<(), FallbackError> {
    let program = cmd.as_std().get_program().to_string_lossy().into_owned();
    log::debug!("running {:?}", cmd.as_std());

    cmd.stdin(if stdin.is_some() { Stdio::piped() } else { Stdio::null() })
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    let mut child = cmd.spawn().map_err(|e| process_error(&program, &[], e))?;
    if let (Some(bytes), Some(mut child_stdin)) = (stdin, child.stdin.take()) {
        // dropping the handle closes the pipe, so the player sees EOF
        child_stdin.write_all(bytes).await.map_err(|e| process_error(&program, &[], e))?;
    }

    let Output { status, mut stdout, stderr } =
        child.wait_with_output().await.map_err(|e| process_error(&program, &[], e))?;
    if status.success() {
        return Ok(());
    }
    stdout.extend_from_slice(&stderr);
    Err(process_error(&program, &stdout, std::io::Error::new(std::io::ErrorKind::Other, format!("exited with {}", status))))
}

fn process_error(program: &str, output: &[u8], source: std::io::Error) -> FallbackError {
    FallbackError::Process { program: program.to_owned(), output: String::from_utf8_lossy(output).into_owned(), source }
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_notify_send_args() {
        let msg = Message {
            icon: Some("dialog-warning".to_string()),
            urgency: Some(Urgency::Critical),
            expire_time: Some(3000),
            category: Some("device.error".to_string()),
            hint: Some("int:transient:1".to_string()),
            ..Message::new("Battery low", "5% remaining")
        };
        assert_eq!(
            msg.notify_send_args(),
            vec![
                "Battery low",
                "5% remaining",
                "--icon=dialog-warning",
                "--urgency=critical",
                "--expire-time=3000",
                "--category=device.error",
                "--hint=int:transient:1",
            ]
        );
        assert_eq!(Message::new("Just a title", "").notify_send_args(), vec!["Just a title"]);
    }

    #[test]
    fn test_resolve_without_players() {
        assert_eq!(SoundBackend::resolve_in(Vec::new()), None);
        assert_eq!(SoundBackend::resolve_in(vec![PathBuf::from("/nonexistent/bin")]), None);
    }

    #[test]
    fn test_resolve_prefers_earlier_candidates() {
        use std::os::unix::fs::PermissionsExt;
        let dir = std::env::temp_dir().join(format!("desktop-notify-players-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        for name in ["aplay", "pw-play"] {
            let path = dir.join(name);
            std::fs::write(&path, "#!/bin/sh\n").unwrap();
            std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        }
        // not executable, so it must be skipped
        std::fs::write(dir.join("paplay"), "").unwrap();

        let backend = SoundBackend::resolve_in(vec![dir.clone()]).unwrap();
        assert_eq!(backend.program, dir.join("pw-play"));
        assert_eq!(backend.stdin_args, vec!["-"]);
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[tokio::test]
    async fn test_sound_without_backend() {
        let fallback = Fallback::new("/nonexistent/notify-send", None);
        let sound = Sound::File(PathBuf::from("/usr/share/sounds/freedesktop/stereo/bell.oga"));
        assert!(matches!(fallback.play_sound(&sound).await, Err(FallbackError::NoSoundBackend)));

        // fails before notify-send would even be started
        let msg = Message { sound: Some(sound), ..Message::new("Ding", "") };
        assert!(matches!(fallback.send(&msg).await, Err(FallbackError::NoSoundBackend)));
    }

    #[tokio::test]
    async fn test_missing_text() {
        let fallback = Fallback::new("/nonexistent/notify-send", None);
        assert!(matches!(fallback.send(&Message::default()).await, Err(FallbackError::MissingText)));
    }

    #[tokio::test]
    async fn test_process_error_keeps_output() {
        let fallback = Fallback::new("sh", None);
        let msg = Message::new("-c", "echo 'no notification daemon' >&2; exit 3");
        match fallback.send(&msg).await {
            Err(err @ FallbackError::Process { .. }) => {
                assert_eq!(err.to_string(), "sh: no notification daemon: exited with exit status: 3");
            }
            other => panic!("expected a process error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_spawn_failure() {
        let fallback = Fallback::new("/nonexistent/notify-send", None);
        let err = fallback.send(&Message::new("hello", "")).await.unwrap_err();
        assert!(matches!(err, FallbackError::Process { ref program, .. } if program == "/nonexistent/notify-send"));
    }
}

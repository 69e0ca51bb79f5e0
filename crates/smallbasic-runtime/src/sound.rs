//! The `Sound` class and the audio backends behind it.

use std::io::Write;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use crate::config::RuntimeConfig;
use crate::error::{RuntimeError, RuntimeResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SystemSound {
    Asterisk,
    Beep,
    Exclamation,
    Hand,
}

pub trait AudioBackend: Send {
    fn play_system(&mut self, sound: SystemSound) -> RuntimeResult<()>;

    /// Start playing a media file, returning its length when known
    fn play_media(&mut self, location: &str) -> RuntimeResult<Option<Duration>>;

    fn stop(&mut self) -> RuntimeResult<()>;
    fn pause(&mut self) -> RuntimeResult<()>;
}

/// Rings the terminal bell for every system sound; cannot play media
pub struct TerminalBell;

impl AudioBackend for TerminalBell {
    fn play_system(&mut self, _sound: SystemSound) -> RuntimeResult<()> {
        let mut out = std::io::stdout();
        out.write_all(b"\x07")?;
        out.flush()?;
        Ok(())
    }

    fn play_media(&mut self, _location: &str) -> RuntimeResult<Option<Duration>> {
        Err(RuntimeError::unsupported("media playback"))
    }

    fn stop(&mut self) -> RuntimeResult<()> {
        Ok(())
    }

    fn pause(&mut self) -> RuntimeResult<()> {
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AudioCall {
    System(SystemSound),
    Media(String),
    Stop,
    Pause,
}

#[derive(Default)]
struct AudioLog {
    calls: Vec<AudioCall>,
    media_length: Option<Duration>,
}

/// Backend that only records what it was asked to play
pub struct RecordingAudio {
    log: Arc<Mutex<AudioLog>>,
}

#[derive(Clone)]
pub struct AudioProbe {
    log: Arc<Mutex<AudioLog>>,
}

impl RecordingAudio {
    pub fn new() -> (Self, AudioProbe) {
        let log = Arc::new(Mutex::new(AudioLog::default()));
        (
            Self {
                log: Arc::clone(&log),
            },
            AudioProbe { log },
        )
    }

    fn record(&self, call: AudioCall) -> Option<Duration> {
        let mut log = self.log.lock().unwrap_or_else(|e| e.into_inner());
        log.calls.push(call);
        log.media_length
    }
}

impl AudioProbe {
    pub fn calls(&self) -> Vec<AudioCall> {
        self.log.lock().unwrap_or_else(|e| e.into_inner()).calls.clone()
    }

    /// Length reported for every media file played from now on
    pub fn set_media_length(&self, length: Duration) {
        self.log.lock().unwrap_or_else(|e| e.into_inner()).media_length = Some(length);
    }
}

impl AudioBackend for RecordingAudio {
    fn play_system(&mut self, sound: SystemSound) -> RuntimeResult<()> {
        self.record(AudioCall::System(sound));
        Ok(())
    }

    fn play_media(&mut self, location: &str) -> RuntimeResult<Option<Duration>> {
        Ok(self.record(AudioCall::Media(location.to_string())))
    }

    fn stop(&mut self) -> RuntimeResult<()> {
        self.record(AudioCall::Stop);
        Ok(())
    }

    fn pause(&mut self) -> RuntimeResult<()> {
        self.record(AudioCall::Pause);
        Ok(())
    }
}

struct Player {
    backend: Box<dyn AudioBackend>,
    playing: bool,
}

pub struct Sound {
    player: Mutex<Player>,
    system_wait: Duration,
}

impl Sound {
    pub fn new(config: &RuntimeConfig, backend: Box<dyn AudioBackend>) -> Self {
        Self {
            player: Mutex::new(Player {
                backend,
                playing: false,
            }),
            system_wait: Duration::from_millis(config.system_sound_wait_ms),
        }
    }

    fn player(&self) -> MutexGuard<'_, Player> {
        self.player.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn system(&self, sound: SystemSound, wait: bool) -> RuntimeResult<()> {
        self.player().backend.play_system(sound)?;
        if wait {
            std::thread::sleep(self.system_wait);
        }
        Ok(())
    }

    pub fn play_click(&self) -> RuntimeResult<()> {
        self.system(SystemSound::Asterisk, false)
    }

    pub fn play_click_and_wait(&self) -> RuntimeResult<()> {
        self.system(SystemSound::Asterisk, true)
    }

    pub fn play_chime(&self) -> RuntimeResult<()> {
        self.system(SystemSound::Beep, false)
    }

    pub fn play_chime_and_wait(&self) -> RuntimeResult<()> {
        self.system(SystemSound::Beep, true)
    }

    pub fn play_chimes(&self) -> RuntimeResult<()> {
        self.system(SystemSound::Exclamation, false)
    }

    pub fn play_chimes_and_wait(&self) -> RuntimeResult<()> {
        self.system(SystemSound::Exclamation, true)
    }

    pub fn play_bell_ring(&self) -> RuntimeResult<()> {
        self.system(SystemSound::Hand, false)
    }

    pub fn play_bell_ring_and_wait(&self) -> RuntimeResult<()> {
        self.system(SystemSound::Hand, true)
    }

    fn start(&self, location: &str) -> RuntimeResult<Option<Duration>> {
        let mut player = self.player();
        if player.playing {
            player.backend.stop()?;
            player.playing = false;
        }
        let length = player.backend.play_media(location)?;
        player.playing = true;
        tracing::debug!(location, ?length, "Playing media");
        Ok(length)
    }

    /// Starts playing a file, stopping whatever was playing before
    pub fn play(&self, location: &str) -> RuntimeResult<()> {
        self.start(location).map(|_| ())
    }

    /// Plays a file and blocks until it has finished
    pub fn play_and_wait(&self, location: &str) -> RuntimeResult<()> {
        if let Some(length) = self.start(location)? {
            std::thread::sleep(length);
        }
        self.player().playing = false;
        Ok(())
    }

    pub fn stop(&self) -> RuntimeResult<()> {
        let mut player = self.player();
        player.backend.stop()?;
        player.playing = false;
        Ok(())
    }

    pub fn pause(&self) -> RuntimeResult<()> {
        let mut player = self.player();
        player.backend.pause()?;
        player.playing = false;
        Ok(())
    }

    pub fn is_playing(&self) -> bool {
        self.player().playing
    }
}

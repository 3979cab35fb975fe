//! Recording/realtime lifecycle supervision
//!
//! Two state machines with process lifetime, outliving any single
//! view: the standard recorder (`idle → recording ⇄ paused → idle`)
//! and the realtime connection (`disconnected → connecting →
//! connected ⇄ reconnecting → disconnected`, with an independent
//! stream-pause flag while connected/reconnecting).
//!
//! The supervisor is an injected context object, not ambient global
//! state: construct one at application start and hand it to
//! consumers; tests get a fresh instance each.

use std::sync::Mutex;
use std::time::{Duration, Instant};

use serde::Serialize;
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RecorderState {
    Idle,
    Recording,
    Paused,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionStatus {
    Disconnected,
    Connecting,
    Connected,
    Reconnecting,
}

/// Read-only view for status displays and the navigation guard.
#[derive(Debug, Clone, Serialize)]
pub struct SupervisorStatus {
    pub recorder_state: RecorderState,
    pub connection_status: ConnectionStatus,
    pub stream_paused: bool,
    pub recording_elapsed_secs: u64,
    pub session_elapsed_secs: u64,
    pub guard_unload: bool,
}

/// Wall-clock accumulator that survives pause/resume cycles.
#[derive(Debug, Default)]
struct ElapsedTimer {
    accumulated: Duration,
    running_since: Option<Instant>,
}

impl ElapsedTimer {
    fn restart(&mut self) {
        self.accumulated = Duration::ZERO;
        self.running_since = Some(Instant::now());
    }

    fn pause(&mut self) {
        if let Some(since) = self.running_since.take() {
            self.accumulated += since.elapsed();
        }
    }

    fn resume(&mut self) {
        if self.running_since.is_none() {
            self.running_since = Some(Instant::now());
        }
    }

    fn elapsed(&self) -> Duration {
        match self.running_since {
            Some(since) => self.accumulated + since.elapsed(),
            None => self.accumulated,
        }
    }
}

#[derive(Debug)]
struct SupervisorInner {
    recorder: RecorderState,
    connection: ConnectionStatus,
    stream_paused: bool,
    recording_timer: ElapsedTimer,
    session_timer: ElapsedTimer,
}

/// Process-wide lifecycle context for both workflow modes.
///
/// Invalid transitions are warn-and-ignore no-ops, so stray control
/// calls from a stale view can't corrupt the machine.
#[derive(Debug)]
pub struct SessionSupervisor {
    inner: Mutex<SupervisorInner>,
}

impl Default for SessionSupervisor {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionSupervisor {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(SupervisorInner {
                recorder: RecorderState::Idle,
                connection: ConnectionStatus::Disconnected,
                stream_paused: false,
                recording_timer: ElapsedTimer::default(),
                session_timer: ElapsedTimer::default(),
            }),
        }
    }

    // --- Standard recorder ---

    pub fn start_recording(&self) {
        let mut inner = self.inner.lock().unwrap();
        if inner.recorder != RecorderState::Idle {
            warn!("Recording already started");
            return;
        }
        inner.recorder = RecorderState::Recording;
        inner.recording_timer.restart();
    }

    pub fn pause_recording(&self) {
        let mut inner = self.inner.lock().unwrap();
        if inner.recorder != RecorderState::Recording {
            warn!("Recorder is not recording, ignoring pause");
            return;
        }
        inner.recorder = RecorderState::Paused;
        inner.recording_timer.pause();
    }

    pub fn resume_recording(&self) {
        let mut inner = self.inner.lock().unwrap();
        if inner.recorder != RecorderState::Paused {
            warn!("Recorder is not paused, ignoring resume");
            return;
        }
        inner.recorder = RecorderState::Recording;
        inner.recording_timer.resume();
    }

    /// Stop from either recording or paused; the elapsed total is
    /// retained until the next start.
    pub fn stop_recording(&self) {
        let mut inner = self.inner.lock().unwrap();
        if inner.recorder == RecorderState::Idle {
            warn!("Recorder is idle, ignoring stop");
            return;
        }
        inner.recorder = RecorderState::Idle;
        inner.recording_timer.pause();
    }

    // --- Realtime connection ---

    pub fn begin_connect(&self) {
        let mut inner = self.inner.lock().unwrap();
        if inner.connection != ConnectionStatus::Disconnected {
            warn!("Connection already active, ignoring connect");
            return;
        }
        inner.connection = ConnectionStatus::Connecting;
        inner.stream_paused = false;
        inner.session_timer.restart();
        inner.session_timer.pause();
    }

    pub fn mark_connected(&self) {
        let mut inner = self.inner.lock().unwrap();
        match inner.connection {
            ConnectionStatus::Connecting | ConnectionStatus::Reconnecting => {
                inner.connection = ConnectionStatus::Connected;
                if !inner.stream_paused {
                    inner.session_timer.resume();
                }
            }
            _ => warn!("Not connecting, ignoring mark_connected"),
        }
    }

    pub fn mark_reconnecting(&self) {
        let mut inner = self.inner.lock().unwrap();
        if inner.connection != ConnectionStatus::Connected {
            warn!("Not connected, ignoring mark_reconnecting");
            return;
        }
        inner.connection = ConnectionStatus::Reconnecting;
    }

    pub fn disconnect(&self) {
        let mut inner = self.inner.lock().unwrap();
        if inner.connection == ConnectionStatus::Disconnected {
            warn!("Already disconnected");
            return;
        }
        inner.connection = ConnectionStatus::Disconnected;
        inner.stream_paused = false;
        inner.session_timer.pause();
    }

    /// Suspend local capture/sending without touching the connection
    /// state. Valid while connected or reconnecting.
    pub fn pause_stream(&self) {
        let mut inner = self.inner.lock().unwrap();
        match inner.connection {
            ConnectionStatus::Connected | ConnectionStatus::Reconnecting => {
                inner.stream_paused = true;
                inner.session_timer.pause();
            }
            _ => warn!("No active connection, ignoring pause"),
        }
    }

    pub fn resume_stream(&self) {
        let mut inner = self.inner.lock().unwrap();
        match inner.connection {
            ConnectionStatus::Connected | ConnectionStatus::Reconnecting
                if inner.stream_paused =>
            {
                inner.stream_paused = false;
                inner.session_timer.resume();
            }
            _ => warn!("Stream is not paused, ignoring resume"),
        }
    }

    // --- Read-only status ---

    pub fn recorder_state(&self) -> RecorderState {
        self.inner.lock().unwrap().recorder
    }

    pub fn connection_status(&self) -> ConnectionStatus {
        self.inner.lock().unwrap().connection
    }

    pub fn is_stream_paused(&self) -> bool {
        self.inner.lock().unwrap().stream_paused
    }

    pub fn recording_elapsed(&self) -> Duration {
        self.inner.lock().unwrap().recording_timer.elapsed()
    }

    pub fn session_elapsed(&self) -> Duration {
        self.inner.lock().unwrap().session_timer.elapsed()
    }

    /// True while either machine is active, i.e. leaving the page
    /// would lose an in-progress capture or live session. Advisory
    /// only; the browser can't be forced to honor it.
    pub fn should_guard_unload(&self) -> bool {
        let inner = self.inner.lock().unwrap();
        inner.recorder != RecorderState::Idle
            || inner.connection != ConnectionStatus::Disconnected
    }

    pub fn status(&self) -> SupervisorStatus {
        let inner = self.inner.lock().unwrap();
        SupervisorStatus {
            recorder_state: inner.recorder,
            connection_status: inner.connection,
            stream_paused: inner.stream_paused,
            recording_elapsed_secs: inner.recording_timer.elapsed().as_secs(),
            session_elapsed_secs: inner.session_timer.elapsed().as_secs(),
            guard_unload: inner.recorder != RecorderState::Idle
                || inner.connection != ConnectionStatus::Disconnected,
        }
    }
}

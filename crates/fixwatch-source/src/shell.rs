//! Position source backed by a spawned scripting interpreter.
//!
//! The child process runs a location-watching script fed through stdin and
//! prints line-oriented `Position;...` records on stdout. All adapter state
//! lives in a single actor task; the public handle only posts commands and
//! reads shared snapshots, so no caller ever blocks on the feed.

use std::process::Stdio;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::process::{Child, ChildStdin, Command};
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tokio::time::{sleep_until, Instant};
use tracing::{debug, info, warn};

use fixwatch_proto::{classify, parse_position, FeedLine, PositionFix, WireError};

use crate::{PositionSource, SourceError, SourceEvent};

/// Fixed floor for the update cadence.
pub const MIN_UPDATE_INTERVAL: Duration = Duration::from_millis(1000);

/// Effective timeout for `request_update(0)`; generous to cover a cold start.
const REQUEST_DEFAULT_TIMEOUT: Duration = Duration::from_millis(120_000);

/// Graceful wait for the child before killing it at teardown.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(1);

/// Bundled location-watching script.
pub const DEFAULT_SCRIPT: &str = include_str!("../assets/locate.ps1");

/// How the feed interpreter is launched and driven.
///
/// The defaults target Windows PowerShell reading a script from stdin. Tests
/// and other platforms substitute another interpreter plus matching command
/// strings; the adapter only cares that one poll or keep-alive command
/// eventually yields one output line.
#[derive(Debug, Clone)]
pub struct ShellSourceConfig {
    pub program: String,
    pub args: Vec<String>,
    /// Written once per `request_update` to ask for an immediate reading.
    pub poll_command: String,
    /// Written after each drained output line while continuous mode is
    /// active, to keep the feed flowing.
    pub keepalive_command: String,
    /// Cadence for continuous updates; clamped to `MIN_UPDATE_INTERVAL`.
    pub update_interval: Duration,
}

impl Default for ShellSourceConfig {
    fn default() -> Self {
        Self {
            program: "powershell.exe".into(),
            args: ["-NoLogo", "-NoProfile", "-NonInteractive", "-Command", "-"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            poll_command: "& $position() \r\n".into(),
            keepalive_command: "Start-Sleep -Milliseconds 1000; & $location \r\n".into(),
            update_interval: MIN_UPDATE_INTERVAL,
        }
    }
}

#[derive(Debug)]
enum ActorCommand {
    StartUpdates,
    StopUpdates,
    RequestUpdate(Duration),
}

#[derive(Debug, Default)]
struct Shared {
    last_position: Option<PositionFix>,
    error: SourceError,
}

/// Handle to an external position feed. Dropping (or `close()`-ing) the
/// handle tears the child process down, with a bounded graceful wait.
pub struct ShellPositionSource {
    cmd_tx: mpsc::Sender<ActorCommand>,
    shared: Arc<Mutex<Shared>>,
    events: broadcast::Sender<SourceEvent>,
    script: String,
    task: JoinHandle<()>,
}

impl ShellPositionSource {
    /// Source using the bundled default watcher script.
    ///
    /// Must be called within a tokio runtime.
    pub fn new(config: ShellSourceConfig) -> Self {
        Self::with_script(config, DEFAULT_SCRIPT.to_string())
    }

    /// Source with an override script. An empty script permanently disables
    /// the source: `error()` reports `SourceUnavailable` and no process is
    /// ever spawned.
    pub fn with_script(mut config: ShellSourceConfig, script: String) -> Self {
        config.update_interval = config.update_interval.max(MIN_UPDATE_INTERVAL);

        let (cmd_tx, cmd_rx) = mpsc::channel(16);
        let (events, _) = broadcast::channel(64);
        let shared = Arc::new(Mutex::new(Shared::default()));

        let usable_script = if script.trim().is_empty() {
            shared.lock().unwrap().error = SourceError::SourceUnavailable;
            None
        } else {
            Some(script.clone())
        };

        let actor = FeedActor::new(config, usable_script, shared.clone(), events.clone(), cmd_rx);
        let task = tokio::spawn(actor.run());

        Self { cmd_tx, shared, events, script, task }
    }

    /// The watcher script this source was built with.
    pub fn script(&self) -> &str {
        &self.script
    }

    /// Shut the source down and wait for the child process to be gone.
    pub async fn close(self) {
        let Self { cmd_tx, task, .. } = self;
        drop(cmd_tx);
        if let Err(e) = task.await {
            debug!("feed actor task ended abnormally: {}", e);
        }
    }

    fn send(&self, cmd: ActorCommand) {
        if self.cmd_tx.try_send(cmd).is_err() {
            warn!("position source command dropped (control task not running)");
        }
    }
}

impl PositionSource for ShellPositionSource {
    fn minimum_update_interval(&self) -> Duration {
        MIN_UPDATE_INTERVAL
    }

    fn last_known_position(&self) -> Option<PositionFix> {
        self.shared.lock().unwrap().last_position.clone()
    }

    fn error(&self) -> SourceError {
        self.shared.lock().unwrap().error
    }

    fn subscribe(&self) -> broadcast::Receiver<SourceEvent> {
        self.events.subscribe()
    }

    fn start_updates(&self) {
        self.send(ActorCommand::StartUpdates);
    }

    fn stop_updates(&self) {
        self.send(ActorCommand::StopUpdates);
    }

    fn request_update(&self, timeout: Duration) {
        self.send(ActorCommand::RequestUpdate(timeout));
    }
}

/// Tagged event driving one actor loop iteration.
enum Event {
    Command(Option<ActorCommand>),
    StdoutLine(Option<String>),
    StderrLine(Option<String>),
    PeriodicTimeout,
    SingleShotTimeout,
}

struct FeedActor {
    config: ShellSourceConfig,
    script: Option<String>,
    shared: Arc<Mutex<Shared>>,
    events: broadcast::Sender<SourceEvent>,
    cmd_rx: mpsc::Receiver<ActorCommand>,

    child: Option<Child>,
    stdin: Option<ChildStdin>,
    stdout: Option<Lines<BufReader<tokio::process::ChildStdout>>>,
    stderr: Option<Lines<BufReader<tokio::process::ChildStderr>>>,

    updates_ongoing: bool,
    periodic_deadline: Option<Instant>,
    single_deadline: Option<Instant>,
}

impl FeedActor {
    fn new(
        config: ShellSourceConfig,
        script: Option<String>,
        shared: Arc<Mutex<Shared>>,
        events: broadcast::Sender<SourceEvent>,
        cmd_rx: mpsc::Receiver<ActorCommand>,
    ) -> Self {
        Self {
            config,
            script,
            shared,
            events,
            cmd_rx,
            child: None,
            stdin: None,
            stdout: None,
            stderr: None,
            updates_ongoing: false,
            periodic_deadline: None,
            single_deadline: None,
        }
    }

    async fn run(mut self) {
        loop {
            let event = tokio::select! {
                cmd = self.cmd_rx.recv() => Event::Command(cmd),
                line = next_line(&mut self.stdout) => Event::StdoutLine(line),
                line = next_line(&mut self.stderr) => Event::StderrLine(line),
                _ = sleep_opt(self.periodic_deadline) => Event::PeriodicTimeout,
                _ = sleep_opt(self.single_deadline) => Event::SingleShotTimeout,
            };

            match event {
                Event::Command(None) => break,
                Event::Command(Some(ActorCommand::StartUpdates)) => self.start_updates().await,
                Event::Command(Some(ActorCommand::StopUpdates)) => self.stop_updates().await,
                Event::Command(Some(ActorCommand::RequestUpdate(timeout))) => {
                    self.request_update(timeout).await
                }
                Event::StdoutLine(Some(line)) => self.handle_stdout(line).await,
                Event::StdoutLine(None) => self.handle_process_exit().await,
                Event::StderrLine(Some(line)) => {
                    // diagnostic only, no semantic effect
                    warn!("feed stderr: {}", line.trim_end());
                }
                Event::StderrLine(None) => self.stderr = None,
                Event::PeriodicTimeout => self.on_periodic_timeout(),
                Event::SingleShotTimeout => self.on_single_update_timeout(),
            }
        }
        self.shutdown().await;
    }

    async fn start_updates(&mut self) {
        if !self.ensure_process().await {
            return;
        }
        self.updates_ongoing = true;
        self.periodic_deadline = Some(Instant::now() + self.config.update_interval);
    }

    async fn stop_updates(&mut self) {
        self.periodic_deadline = None;
        if self.updates_ongoing {
            self.updates_ongoing = false;
            self.kill_process().await;
        }
    }

    async fn request_update(&mut self, timeout: Duration) {
        let timeout = if timeout.is_zero() { REQUEST_DEFAULT_TIMEOUT } else { timeout };
        if timeout < MIN_UPDATE_INTERVAL {
            let _ = self.events.send(SourceEvent::UpdateTimeout);
            return;
        }
        if !self.ensure_process().await {
            return;
        }
        self.set_error(SourceError::NoError);
        self.single_deadline = Some(Instant::now() + timeout);
        let poll = self.config.poll_command.clone();
        self.write_command(&poll).await;
    }

    /// Spawn the interpreter if it is not running and feed it the script.
    async fn ensure_process(&mut self) -> bool {
        if self.child.is_some() {
            return true;
        }
        let Some(script) = self.script.clone() else {
            self.updates_ongoing = false;
            self.set_error(SourceError::SourceUnavailable);
            return false;
        };
        match self.spawn_process(&script).await {
            Ok(()) => true,
            Err(e) => {
                warn!("failed to start feed process '{}': {:#}", self.config.program, e);
                self.updates_ongoing = false;
                self.set_error(SourceError::SourceUnavailable);
                false
            }
        }
    }

    async fn spawn_process(&mut self, script: &str) -> Result<()> {
        let mut child = Command::new(&self.config.program)
            .args(&self.config.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .with_context(|| format!("spawn {}", self.config.program))?;

        let mut stdin = child.stdin.take().context("child stdin not piped")?;
        let stdout = child.stdout.take().context("child stdout not piped")?;
        let stderr = child.stderr.take().context("child stderr not piped")?;
        info!("feed process started (pid {:?})", child.id());

        stdin.write_all(script.as_bytes()).await.context("write watcher script")?;
        if !script.ends_with('\n') {
            stdin.write_all(b"\r\n").await.context("write watcher script")?;
        }
        stdin.flush().await.context("flush watcher script")?;

        self.stdin = Some(stdin);
        self.stdout = Some(BufReader::new(stdout).lines());
        self.stderr = Some(BufReader::new(stderr).lines());
        self.child = Some(child);
        Ok(())
    }

    /// Handle one readable burst of feed output: drain every line that is
    /// already buffered, then decide the follow-up exactly once. Acting per
    /// line would let the interpreter's startup chatter (`Permission;`,
    /// `Status;`) trigger the not-continuous kill and discard a `Position;`
    /// record still sitting in the buffer behind it.
    async fn handle_stdout(&mut self, first: String) {
        let mut saw_position = self.process_line(&first);
        let mut eof = false;
        loop {
            match tokio::time::timeout(Duration::ZERO, next_line(&mut self.stdout)).await {
                Ok(Some(line)) => saw_position |= self.process_line(&line),
                Ok(None) => {
                    eof = true;
                    break;
                }
                // nothing more buffered right now
                Err(_) => break,
            }
        }
        if eof {
            self.handle_process_exit().await;
            return;
        }

        // Only a position record answers a poll; chatter does not advance
        // the poll/keep-alive exchange and must not retire the process.
        if !saw_position {
            return;
        }
        if self.updates_ongoing {
            let keepalive = self.config.keepalive_command.clone();
            self.write_command(&keepalive).await;
        } else {
            self.kill_process().await;
        }
    }

    fn process_line(&mut self, line: &str) -> bool {
        match classify(line) {
            FeedLine::Position(payload) => {
                self.process_position(payload);
                true
            }
            // TODO: feed these back into a status/permission surface once
            // the application grows one; log-only for now.
            FeedLine::Status(s) => {
                debug!("feed status (unhandled): {}", s);
                false
            }
            FeedLine::Permission(s) => {
                debug!("feed permission (unhandled): {}", s);
                false
            }
            FeedLine::Unknown(raw) => {
                debug!("unrecognized feed line: '{}'", raw);
                false
            }
            FeedLine::Empty => false,
        }
    }

    fn process_position(&mut self, payload: &str) {
        match parse_position(payload) {
            Ok(Some(fix)) => self.accept_position(fix),
            Ok(None) => debug!("horizontal accuracy unknown, record dropped"),
            Err(WireError::FeedClosed(status)) => {
                debug!("feed closed (status '{}')", status);
                self.set_error(SourceError::Closed);
            }
            Err(WireError::Malformed(detail)) => {
                debug!("could not parse position record: {}", detail);
                self.set_error(SourceError::MalformedData);
            }
        }
    }

    fn accept_position(&mut self, fix: PositionFix) {
        self.periodic_deadline = None;
        self.shared.lock().unwrap().last_position = Some(fix.clone());
        if self.updates_ongoing {
            self.periodic_deadline = Some(Instant::now() + self.config.update_interval);
        }
        self.single_deadline = None;
        self.set_error(SourceError::NoError);
        let _ = self.events.send(SourceEvent::PositionUpdated(fix));
    }

    /// The feed stayed silent for a whole interval: repeat the last fix with
    /// its timestamp advanced by one interval, as if freshly observed. The
    /// stale-coordinates-as-live trade-off is deliberate; downstream
    /// consumers depend on the stream never pausing.
    fn on_periodic_timeout(&mut self) {
        let synthetic = {
            let mut shared = self.shared.lock().unwrap();
            let next = shared
                .last_position
                .as_ref()
                .map(|last| last.advanced_by(self.config.update_interval));
            if let Some(fix) = &next {
                shared.last_position = Some(fix.clone());
            }
            next
        };
        if let Some(fix) = synthetic {
            let _ = self.events.send(SourceEvent::PositionUpdated(fix));
        }
        self.periodic_deadline = Some(Instant::now() + self.config.update_interval);
    }

    fn on_single_update_timeout(&mut self) {
        self.single_deadline = None;
        let _ = self.events.send(SourceEvent::UpdateTimeout);
    }

    async fn handle_process_exit(&mut self) {
        self.updates_ongoing = false;
        self.stdin = None;
        self.stdout = None;
        self.stderr = None;
        if let Some(mut child) = self.child.take() {
            match child.wait().await {
                Ok(status) => info!("feed process exited ({})", status),
                Err(e) => debug!("feed process wait failed: {}", e),
            }
        }
    }

    async fn write_command(&mut self, command: &str) {
        let Some(stdin) = self.stdin.as_mut() else { return };
        let write = async {
            stdin.write_all(command.as_bytes()).await?;
            stdin.flush().await
        };
        if let Err(e) = write.await {
            warn!("feed command write failed: {}", e);
        }
    }

    async fn kill_process(&mut self) {
        self.stdin = None;
        self.stdout = None;
        self.stderr = None;
        if let Some(mut child) = self.child.take() {
            if let Err(e) = child.kill().await {
                debug!("feed process kill failed: {}", e);
            }
        }
    }

    fn set_error(&self, error: SourceError) {
        {
            let mut shared = self.shared.lock().unwrap();
            if shared.error == error {
                return;
            }
            shared.error = error;
        }
        if error != SourceError::NoError {
            let _ = self.events.send(SourceEvent::Error(error));
        }
    }

    /// Bounded teardown: give the child a grace period to exit on its own
    /// (stdin is closed first, which ends well-behaved scripts), then kill.
    async fn shutdown(&mut self) {
        self.stdin = None;
        self.stdout = None;
        self.stderr = None;
        if let Some(mut child) = self.child.take() {
            match tokio::time::timeout(SHUTDOWN_GRACE, child.wait()).await {
                Ok(Ok(status)) => info!("feed process exited ({})", status),
                Ok(Err(e)) => debug!("feed process wait failed: {}", e),
                Err(_) => {
                    warn!("feed process did not exit in time, killing");
                    if let Err(e) = child.kill().await {
                        debug!("feed process kill failed: {}", e);
                    }
                }
            }
        }
    }
}

async fn next_line<R>(lines: &mut Option<Lines<R>>) -> Option<String>
where
    R: AsyncBufRead + Unpin,
{
    match lines {
        Some(reader) => reader.next_line().await.ok().flatten(),
        None => std::future::pending().await,
    }
}

async fn sleep_opt(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    const GOOD_LINE: &str = "Position;Ready;2020-01-01T00:00:00Z;52.5;13.4;34.0;5.0;3.0";

    fn actor(script: Option<&str>) -> (FeedActor, broadcast::Receiver<SourceEvent>) {
        let config = ShellSourceConfig {
            program: "sh".into(),
            args: Vec::new(),
            ..ShellSourceConfig::default()
        };
        let (events, rx) = broadcast::channel(64);
        let shared = Arc::new(Mutex::new(Shared::default()));
        let (_tx, cmd_rx) = mpsc::channel(4);
        let actor = FeedActor::new(config, script.map(Into::into), shared, events, cmd_rx);
        (actor, rx)
    }

    fn expect_fix(rx: &mut broadcast::Receiver<SourceEvent>) -> PositionFix {
        match rx.try_recv().expect("expected an event") {
            SourceEvent::PositionUpdated(fix) => fix,
            other => panic!("expected a position update, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn accepted_line_updates_state_and_emits() {
        let (mut actor, mut rx) = actor(Some(":"));
        actor.handle_stdout(GOOD_LINE.into()).await;

        let fix = expect_fix(&mut rx);
        assert_eq!(fix.latitude, 52.5);
        assert_eq!(fix.longitude, 13.4);
        assert_eq!(fix.altitude, Some(34.0));
        assert_eq!(fix.horizontal_accuracy, 5.0);
        assert_eq!(fix.vertical_accuracy, Some(3.0));
        assert_eq!(actor.shared.lock().unwrap().last_position, Some(fix));
        assert_eq!(actor.shared.lock().unwrap().error, SourceError::NoError);
        assert!(actor.single_deadline.is_none());
    }

    #[tokio::test]
    async fn nan_horizontal_accuracy_is_silently_dropped() {
        let (mut actor, mut rx) = actor(Some(":"));
        actor
            .handle_stdout("Position;Ready;2020-01-01T00:00:00Z;52.5;13.4;34.0;NaN;3.0".into())
            .await;

        assert!(rx.try_recv().is_err());
        assert_eq!(actor.shared.lock().unwrap().error, SourceError::NoError);
        assert!(actor.shared.lock().unwrap().last_position.is_none());
    }

    #[tokio::test]
    async fn nan_vertical_accuracy_drops_altitude() {
        let (mut actor, mut rx) = actor(Some(":"));
        actor
            .handle_stdout("Position;Ready;2020-01-01T00:00:00Z;52.5;13.4;34.0;5.0;NaN".into())
            .await;

        let fix = expect_fix(&mut rx);
        assert_eq!(fix.altitude, None);
        assert_eq!(fix.vertical_accuracy, None);
    }

    #[tokio::test]
    async fn non_ready_status_sets_closed_error() {
        let (mut actor, mut rx) = actor(Some(":"));
        actor
            .handle_stdout("Position;Closed;2020-01-01T00:00:00Z;52.5;13.4;34.0;5.0;3.0".into())
            .await;

        assert!(matches!(rx.try_recv(), Ok(SourceEvent::Error(SourceError::Closed))));
        assert!(rx.try_recv().is_err());
        assert_eq!(actor.shared.lock().unwrap().error, SourceError::Closed);
    }

    #[tokio::test]
    async fn malformed_line_signals_once_per_transition() {
        let (mut actor, mut rx) = actor(Some(":"));
        actor
            .handle_stdout("Position;Ready;2020-01-01T00:00:00Z;north;13.4;34.0;5.0;3.0".into())
            .await;
        actor
            .handle_stdout("Position;Ready;2020-01-01T00:00:00Z;east;13.4;34.0;5.0;3.0".into())
            .await;

        assert!(matches!(
            rx.try_recv(),
            Ok(SourceEvent::Error(SourceError::MalformedData))
        ));
        assert!(rx.try_recv().is_err());

        // a good fix clears the condition, so the next bad line is a new edge
        actor.handle_stdout(GOOD_LINE.into()).await;
        let _ = expect_fix(&mut rx);
        actor
            .handle_stdout("Position;Ready;2020-01-01T00:00:00Z;north;13.4;34.0;5.0;3.0".into())
            .await;
        assert!(matches!(
            rx.try_recv(),
            Ok(SourceEvent::Error(SourceError::MalformedData))
        ));
    }

    #[tokio::test]
    async fn status_and_permission_lines_change_nothing() {
        let (mut actor, mut rx) = actor(Some(":"));
        actor.handle_stdout("Status;Initializing".into()).await;
        actor.handle_stdout("Permission;Denied".into()).await;
        actor.handle_stdout("garbage from the interpreter".into()).await;

        assert!(rx.try_recv().is_err());
        assert_eq!(actor.shared.lock().unwrap().error, SourceError::NoError);
    }

    #[tokio::test]
    async fn periodic_timeout_synthesizes_advanced_fix() {
        let (mut actor, mut rx) = actor(Some(":"));
        actor.handle_stdout(GOOD_LINE.into()).await;
        let _ = expect_fix(&mut rx);

        actor.on_periodic_timeout();
        let synth = expect_fix(&mut rx);
        assert_eq!(synth.timestamp, datetime!(2020-01-01 00:00:01 UTC));
        assert_eq!(synth.latitude, 52.5);
        assert_eq!(synth.longitude, 13.4);
        assert!(actor.periodic_deadline.is_some());

        // it keeps advancing from the synthetic fix, not the original one
        actor.on_periodic_timeout();
        let synth = expect_fix(&mut rx);
        assert_eq!(synth.timestamp, datetime!(2020-01-01 00:00:02 UTC));
    }

    #[tokio::test]
    async fn periodic_timeout_without_a_fix_emits_nothing() {
        let (mut actor, mut rx) = actor(Some(":"));
        actor.on_periodic_timeout();
        assert!(rx.try_recv().is_err());
        assert!(actor.periodic_deadline.is_some());
    }

    #[tokio::test]
    async fn stop_updates_disarms_the_periodic_timer() {
        let (mut actor, _rx) = actor(Some(":"));
        actor.updates_ongoing = true;
        actor.periodic_deadline = Some(Instant::now());

        actor.stop_updates().await;
        assert!(!actor.updates_ongoing);
        assert!(actor.periodic_deadline.is_none());

        // idempotent
        actor.stop_updates().await;
        assert!(actor.periodic_deadline.is_none());
    }

    #[tokio::test]
    async fn sub_minimum_request_times_out_immediately() {
        let (mut actor, mut rx) = actor(Some(":"));
        actor.request_update(Duration::from_millis(500)).await;

        assert!(matches!(rx.try_recv(), Ok(SourceEvent::UpdateTimeout)));
        assert!(actor.child.is_none());
        assert!(actor.single_deadline.is_none());
    }

    #[tokio::test]
    async fn single_update_timeout_event() {
        let (mut actor, mut rx) = actor(Some(":"));
        actor.single_deadline = Some(Instant::now());
        actor.on_single_update_timeout();

        assert!(matches!(rx.try_recv(), Ok(SourceEvent::UpdateTimeout)));
        assert!(actor.single_deadline.is_none());
    }

    #[tokio::test]
    async fn missing_script_reports_source_unavailable() {
        let (mut actor, mut rx) = actor(None);
        actor.start_updates().await;

        assert!(actor.child.is_none());
        assert!(!actor.updates_ongoing);
        assert!(matches!(
            rx.try_recv(),
            Ok(SourceEvent::Error(SourceError::SourceUnavailable))
        ));
        assert_eq!(actor.shared.lock().unwrap().error, SourceError::SourceUnavailable);
    }

    #[tokio::test]
    async fn empty_script_disables_the_source() {
        let source =
            ShellPositionSource::with_script(ShellSourceConfig::default(), "  \n".into());
        assert_eq!(source.error(), SourceError::SourceUnavailable);
        assert!(source.last_known_position().is_none());
        source.close().await;
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn zero_timeout_uses_the_cold_start_default() {
        let (mut actor, _rx) = actor(Some(":\n"));
        let before = Instant::now();
        actor.request_update(Duration::ZERO).await;

        let deadline = actor.single_deadline.expect("single-shot timer armed");
        let armed_for = deadline - before;
        assert!(armed_for >= Duration::from_secs(119) && armed_for <= Duration::from_secs(121));
        assert!(actor.child.is_some());
        actor.shutdown().await;
    }
}

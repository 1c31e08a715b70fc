// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Camera session — state machine over open, preview, capture, and close,
// plus the tokio task that drives it against a native camera.
//
// State machine:
//   Closed -> Opening -> PreviewRunning <-> Capturing
//   any open state -> Closing -> Closed
//
// `CameraSession` is pure: it turns commands and device events into
// `SessionAction`s. `SessionDriver` owns the device and carries the actions
// out, feeding device failures back in as events.

use std::collections::VecDeque;
use std::sync::Arc;

use chrono::Utc;
use nectacam_bridge::{
    CameraEvent, CameraEventSender, NativeCamera, NativePermissions, StillCaptureRequest,
    StreamConfig,
};
use nectacam_core::error::{NectacamError, Result};
use nectacam_core::types::{CaptureId, EnhancementSelection, SurfaceRotation};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};

use crate::pipeline::CapturedImage;

/// Commands buffered between a `CameraHandle` and its driver.
const COMMAND_BUFFER: usize = 16;

// ---------------------------------------------------------------------------
// State machine
// ---------------------------------------------------------------------------

/// Lifecycle of the camera device and its capture session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SessionState {
    #[default]
    Closed,
    Opening,
    PreviewRunning,
    Capturing,
    Closing,
}

impl SessionState {
    /// The device is open or on its way there.
    pub fn is_open(self) -> bool {
        matches!(self, Self::Opening | Self::PreviewRunning | Self::Capturing)
    }
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Closed => "closed",
            Self::Opening => "opening",
            Self::PreviewRunning => "previewing",
            Self::Capturing => "capturing",
            Self::Closing => "closing",
        };
        f.write_str(s)
    }
}

/// Requests from the user side of the camera.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionCommand {
    Open,
    /// Fire the shutter, enhancing the result with this selection.
    Capture(EnhancementSelection),
    Close,
}

/// The shutter press currently in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingCapture {
    pub id: CaptureId,
    pub selection: EnhancementSelection,
}

/// Work the driver must carry out after a transition.
#[derive(Debug)]
pub enum SessionAction {
    OpenDevice,
    ConfigureSession,
    StartPreview,
    SubmitCapture(StillCaptureRequest),
    Deliver(CapturedImage),
    Report(NectacamError),
    CloseDevice,
}

/// Pure camera session state machine.
#[derive(Debug, Default)]
pub struct CameraSession {
    state: SessionState,
    pending: Option<PendingCapture>,
    rotation: SurfaceRotation,
}

impl CameraSession {
    pub fn new(rotation: SurfaceRotation) -> Self {
        Self {
            rotation,
            ..Self::default()
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn pending(&self) -> Option<PendingCapture> {
        self.pending
    }

    /// Forget everything and return to `Closed`.
    pub fn reset(&mut self) {
        self.state = SessionState::Closed;
        self.pending = None;
    }

    fn invalid(&self, action: &str) -> NectacamError {
        NectacamError::InvalidTransition {
            action: action.into(),
            state: self.state.to_string(),
        }
    }

    /// Apply a user command. Commands that make no sense in the current
    /// state fail with `InvalidTransition` and change nothing.
    pub fn handle_command(&mut self, command: SessionCommand) -> Result<Vec<SessionAction>> {
        match command {
            SessionCommand::Open => {
                if self.state != SessionState::Closed {
                    return Err(self.invalid("open"));
                }
                self.state = SessionState::Opening;
                Ok(vec![SessionAction::OpenDevice])
            }
            SessionCommand::Capture(selection) => {
                if self.state != SessionState::PreviewRunning {
                    return Err(self.invalid("capture"));
                }
                let pending = PendingCapture {
                    id: CaptureId::new(),
                    selection,
                };
                self.pending = Some(pending);
                self.state = SessionState::Capturing;
                Ok(vec![SessionAction::SubmitCapture(StillCaptureRequest {
                    capture_id: pending.id,
                    jpeg_orientation: self.rotation.default_jpeg_orientation(),
                })])
            }
            SessionCommand::Close => {
                if !self.state.is_open() {
                    return Ok(Vec::new());
                }
                self.state = SessionState::Closing;
                self.pending = None;
                Ok(vec![SessionAction::CloseDevice])
            }
        }
    }

    /// Apply a device event. Events that do not fit the current state are
    /// logged and dropped.
    pub fn handle_event(&mut self, event: CameraEvent) -> Vec<SessionAction> {
        use SessionState::*;

        match (self.state, event) {
            (Opening, CameraEvent::Opened) => vec![SessionAction::ConfigureSession],
            (Opening, CameraEvent::SessionConfigured) => {
                self.state = PreviewRunning;
                vec![SessionAction::StartPreview]
            }
            (Opening, CameraEvent::SessionConfigureFailed(reason)) => {
                self.state = Closing;
                vec![
                    SessionAction::Report(NectacamError::SessionConfiguration(reason)),
                    SessionAction::CloseDevice,
                ]
            }
            (Capturing, CameraEvent::ImageAvailable(jpeg)) => {
                self.state = PreviewRunning;
                match self.pending.take() {
                    Some(pending) => vec![SessionAction::Deliver(CapturedImage {
                        id: pending.id,
                        selection: pending.selection,
                        jpeg,
                        captured_at: Utc::now(),
                    })],
                    None => Vec::new(),
                }
            }
            (Capturing, CameraEvent::CaptureFailed(reason)) => {
                self.state = PreviewRunning;
                self.pending = None;
                vec![SessionAction::Report(NectacamError::CaptureFailed(reason))]
            }
            (_, CameraEvent::CaptureCompleted) => {
                debug!("Still capture completed on device");
                Vec::new()
            }
            (state, CameraEvent::Disconnected) if state.is_open() => {
                self.state = Closing;
                self.pending = None;
                vec![
                    SessionAction::Report(NectacamError::CameraAccess(
                        "camera disconnected".into(),
                    )),
                    SessionAction::CloseDevice,
                ]
            }
            (state, CameraEvent::Error(code)) if state.is_open() => {
                self.state = Closing;
                self.pending = None;
                vec![
                    SessionAction::Report(NectacamError::CameraAccess(format!(
                        "camera device error {}",
                        code
                    ))),
                    SessionAction::CloseDevice,
                ]
            }
            (_, CameraEvent::Closed) => {
                self.reset();
                Vec::new()
            }
            (state, event) => {
                warn!(%state, ?event, "Ignoring camera event");
                Vec::new()
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Driver
// ---------------------------------------------------------------------------

/// What the driver reports back to its owner.
#[derive(Debug)]
pub enum SessionOutput {
    StateChanged(SessionState),
    Captured(CapturedImage),
    Failed(NectacamError),
}

/// Cloneable sender for session commands.
#[derive(Debug, Clone)]
pub struct CameraHandle {
    commands: mpsc::Sender<SessionCommand>,
}

impl CameraHandle {
    pub async fn send(&self, command: SessionCommand) -> Result<()> {
        self.commands
            .send(command)
            .await
            .map_err(|_| NectacamError::Bridge("camera session has shut down".into()))
    }

    pub async fn open(&self) -> Result<()> {
        self.send(SessionCommand::Open).await
    }

    pub async fn capture(&self, selection: EnhancementSelection) -> Result<()> {
        self.send(SessionCommand::Capture(selection)).await
    }

    pub async fn close(&self) -> Result<()> {
        self.send(SessionCommand::Close).await
    }
}

/// Runs a `CameraSession` against a native camera until every
/// `CameraHandle` has been dropped.
pub struct SessionDriver<C: ?Sized> {
    camera: Arc<C>,
    session: CameraSession,
    camera_index: usize,
    stream: StreamConfig,
    commands: mpsc::Receiver<SessionCommand>,
    events_tx: CameraEventSender,
    events: mpsc::UnboundedReceiver<CameraEvent>,
    outputs: mpsc::UnboundedSender<SessionOutput>,
}

impl<C> SessionDriver<C>
where
    C: NativeCamera + NativePermissions + Send + Sync + ?Sized + 'static,
{
    /// Build a driver for the camera at `camera_index`, returning the
    /// command handle and the output stream alongside it.
    pub fn new(
        camera: Arc<C>,
        camera_index: usize,
        rotation: SurfaceRotation,
    ) -> (Self, CameraHandle, mpsc::UnboundedReceiver<SessionOutput>) {
        let (command_tx, commands) = mpsc::channel(COMMAND_BUFFER);
        let (events_tx, events) = mpsc::unbounded_channel();
        let (outputs, output_rx) = mpsc::unbounded_channel();
        let driver = Self {
            camera,
            session: CameraSession::new(rotation),
            camera_index,
            stream: StreamConfig::for_sizes(&[]),
            commands,
            events_tx,
            events,
            outputs,
        };
        (
            driver,
            CameraHandle {
                commands: command_tx,
            },
            output_rx,
        )
    }

    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }

    #[instrument(skip_all, fields(camera_index = self.camera_index))]
    pub async fn run(mut self) {
        info!("Camera session driver started");
        loop {
            tokio::select! {
                command = self.commands.recv() => match command {
                    Some(command) => self.on_command(command),
                    None => break,
                },
                Some(event) = self.events.recv() => self.on_event(event),
            }
        }

        if self.session.state().is_open() {
            if let Err(err) = self.camera.close_camera() {
                warn!(error = %err, "Failed to close camera on shutdown");
            }
        }
        info!("Camera session driver stopped");
    }

    fn emit(&self, output: SessionOutput) {
        if self.outputs.send(output).is_err() {
            debug!("Session output receiver dropped");
        }
    }

    fn emit_if_changed(&self, before: SessionState) {
        let after = self.session.state();
        if after != before {
            debug!(from = %before, to = %after, "Session state changed");
            self.emit(SessionOutput::StateChanged(after));
        }
    }

    fn step_command(&mut self, command: SessionCommand) -> Vec<SessionAction> {
        let before = self.session.state();
        match self.session.handle_command(command) {
            Ok(actions) => {
                self.emit_if_changed(before);
                actions
            }
            Err(err) => {
                warn!(error = %err, "Rejected session command");
                self.emit(SessionOutput::Failed(err));
                Vec::new()
            }
        }
    }

    fn step_event(&mut self, event: CameraEvent) -> Vec<SessionAction> {
        let before = self.session.state();
        let actions = self.session.handle_event(event);
        self.emit_if_changed(before);
        actions
    }

    fn on_command(&mut self, command: SessionCommand) {
        if command == SessionCommand::Open && self.session.state() == SessionState::Closed {
            if let Err(err) = self.ensure_permission() {
                warn!(error = %err, "Camera permission unavailable");
                self.emit(SessionOutput::Failed(err));
                return;
            }
        }
        let actions = self.step_command(command);
        self.perform(actions);
    }

    fn on_event(&mut self, event: CameraEvent) {
        let actions = self.step_event(event);
        self.perform(actions);
    }

    fn ensure_permission(&self) -> Result<()> {
        if self.camera.has_camera_permission() {
            return Ok(());
        }
        if self.camera.request_camera_permission()? {
            Ok(())
        } else {
            Err(NectacamError::PermissionDenied)
        }
    }

    fn open_device(&mut self) -> Result<()> {
        let ids = self.camera.camera_ids()?;
        let camera_id = ids.get(self.camera_index).cloned().ok_or_else(|| {
            NectacamError::CameraAccess(format!(
                "no camera at index {} ({} available)",
                self.camera_index,
                ids.len()
            ))
        })?;
        let sizes = self.camera.output_sizes(&camera_id)?;
        self.stream = StreamConfig::for_sizes(&sizes);
        info!(
            camera_id = %camera_id,
            width = self.stream.size.width,
            height = self.stream.size.height,
            "Opening camera"
        );
        self.camera.open_camera(&camera_id, self.events_tx.clone())
    }

    /// Carry out actions in order. Device call failures are translated into
    /// the event the device would have sent, so the state machine stays in
    /// charge of every transition.
    fn perform(&mut self, actions: Vec<SessionAction>) {
        let mut queue: VecDeque<SessionAction> = actions.into();
        while let Some(action) = queue.pop_front() {
            match action {
                SessionAction::OpenDevice => {
                    if let Err(err) = self.open_device() {
                        self.emit(SessionOutput::Failed(err));
                        let before = self.session.state();
                        self.session.reset();
                        self.emit_if_changed(before);
                    }
                }
                SessionAction::ConfigureSession => {
                    if let Err(err) = self.camera.create_capture_session(&self.stream) {
                        let event = CameraEvent::SessionConfigureFailed(err.to_string());
                        queue.extend(self.step_event(event));
                    }
                }
                SessionAction::StartPreview => {
                    if let Err(err) = self.camera.start_preview() {
                        self.emit(SessionOutput::Failed(err));
                        queue.extend(self.step_command(SessionCommand::Close));
                    }
                }
                SessionAction::SubmitCapture(request) => {
                    debug!(
                        capture_id = %request.capture_id,
                        jpeg_orientation = request.jpeg_orientation,
                        "Submitting still capture"
                    );
                    if let Err(err) = self.camera.capture_still(&request) {
                        queue.extend(self.step_event(CameraEvent::CaptureFailed(err.to_string())));
                    }
                }
                SessionAction::Deliver(image) => {
                    info!(id = %image.id, bytes = image.jpeg.len(), "Image captured");
                    self.emit(SessionOutput::Captured(image));
                }
                SessionAction::Report(err) => {
                    warn!(error = %err, "Camera session error");
                    self.emit(SessionOutput::Failed(err));
                }
                SessionAction::CloseDevice => {
                    if let Err(err) = self.camera.close_camera() {
                        warn!(error = %err, "Camera close failed; treating device as closed");
                        queue.extend(self.step_event(CameraEvent::Closed));
                    }
                }
            }
        }
    }
}

use crate::session::{Session, SessionError, Snapshot, Still};
use fitmirror_core::Outfit;
use fitmirror_hw::FacingMode;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::time::MissedTickBehavior;

/// Messages sent from handles to the engine thread.
enum EngineRequest {
    Start {
        facing: FacingMode,
        reply: oneshot::Sender<Result<(), SessionError>>,
    },
    Stop {
        reply: oneshot::Sender<()>,
    },
    SwitchCamera {
        reply: oneshot::Sender<Result<(), SessionError>>,
    },
    ApplyOutfit {
        outfit: Outfit,
        reply: oneshot::Sender<Result<(), SessionError>>,
    },
    ClearOutfit {
        reply: oneshot::Sender<()>,
    },
    Capture {
        reply: oneshot::Sender<Option<Still>>,
    },
    Shutdown {
        reply: oneshot::Sender<()>,
    },
}

/// Clone-safe handle to the engine thread.
#[derive(Clone)]
pub struct EngineHandle {
    tx: mpsc::Sender<EngineRequest>,
    snapshots: watch::Receiver<Snapshot>,
}

impl EngineHandle {
    async fn request<T>(
        &self,
        make: impl FnOnce(oneshot::Sender<T>) -> EngineRequest,
    ) -> Result<T, SessionError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .send(make(reply_tx))
            .await
            .map_err(|_| SessionError::EngineClosed)?;
        reply_rx.await.map_err(|_| SessionError::EngineClosed)
    }

    pub async fn start(&self, facing: FacingMode) -> Result<(), SessionError> {
        self.request(|reply| EngineRequest::Start { facing, reply }).await?
    }

    pub async fn stop(&self) -> Result<(), SessionError> {
        self.request(|reply| EngineRequest::Stop { reply }).await
    }

    pub async fn switch_camera(&self) -> Result<(), SessionError> {
        self.request(|reply| EngineRequest::SwitchCamera { reply }).await?
    }

    pub async fn apply_outfit(&self, outfit: Outfit) -> Result<(), SessionError> {
        self.request(|reply| EngineRequest::ApplyOutfit { outfit, reply })
            .await?
    }

    pub async fn clear_outfit(&self) -> Result<(), SessionError> {
        self.request(|reply| EngineRequest::ClearOutfit { reply }).await
    }

    /// `Ok(None)` when capture is not currently allowed.
    pub async fn capture(&self) -> Result<Option<Still>, SessionError> {
        self.request(|reply| EngineRequest::Capture { reply }).await
    }

    /// Stop the session and end the engine thread.
    pub async fn shutdown(&self) -> Result<(), SessionError> {
        self.request(|reply| EngineRequest::Shutdown { reply }).await
    }

    /// Latest published snapshot.
    pub fn snapshot(&self) -> Snapshot {
        self.snapshots.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.snapshots.clone()
    }
}

/// Spawn the engine on a dedicated OS thread.
///
/// The thread owns the session and runs its own single-threaded runtime,
/// so frame capture never blocks the caller's executor. Detection ticks
/// run every `tick_interval` while a camera is held; after every tick or
/// request the full session state is published as one [`Snapshot`].
///
/// The engine stops the session and exits once every handle is dropped.
pub fn spawn_engine(session: Session, tick_interval: Duration) -> EngineHandle {
    let (tx, rx) = mpsc::channel::<EngineRequest>(8);
    let (snap_tx, snap_rx) = watch::channel(session.snapshot());

    std::thread::Builder::new()
        .name("fitmirror-engine".into())
        .spawn(move || {
            let runtime = match tokio::runtime::Builder::new_current_thread()
                .enable_time()
                .build()
            {
                Ok(rt) => rt,
                Err(e) => {
                    tracing::error!(error = %e, "engine runtime failed to start");
                    return;
                }
            };
            runtime.block_on(run(session, rx, snap_tx, tick_interval));
        })
        .expect("failed to spawn engine thread");

    EngineHandle {
        tx,
        snapshots: snap_rx,
    }
}

async fn run(
    mut session: Session,
    mut rx: mpsc::Receiver<EngineRequest>,
    snapshots: watch::Sender<Snapshot>,
    tick_interval: Duration,
) {
    tracing::info!(tick_ms = tick_interval.as_millis() as u64, "engine started");

    let mut ticker = tokio::time::interval(tick_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            req = rx.recv() => {
                let Some(req) = req else { break };
                if !handle(&mut session, req) {
                    break;
                }
            }
            _ = ticker.tick(), if session.state().is_active() => {
                if let Err(e) = session.tick() {
                    tracing::warn!(error = %e, "detection tick failed");
                }
            }
        }
        snapshots.send_replace(session.snapshot());
    }

    session.stop();
    snapshots.send_replace(session.snapshot());
    tracing::info!("engine exiting");
}

/// Apply one request. Returns `false` when the engine should exit.
fn handle(session: &mut Session, req: EngineRequest) -> bool {
    match req {
        EngineRequest::Start { facing, reply } => {
            let _ = reply.send(session.start(facing));
        }
        EngineRequest::Stop { reply } => {
            session.stop();
            let _ = reply.send(());
        }
        EngineRequest::SwitchCamera { reply } => {
            let _ = reply.send(session.switch_camera());
        }
        EngineRequest::ApplyOutfit { outfit, reply } => {
            let _ = reply.send(session.apply_outfit(outfit));
        }
        EngineRequest::ClearOutfit { reply } => {
            session.clear_outfit();
            let _ = reply.send(());
        }
        EngineRequest::Capture { reply } => {
            let _ = reply.send(session.capture());
        }
        EngineRequest::Shutdown { reply } => {
            session.stop();
            let _ = reply.send(());
            return false;
        }
    }
    true
}

/// Consume snapshots every `period` until the session is no longer
/// holding a camera. Never touches session state. Returns the number of
/// frames handed to `draw`.
pub async fn run_render_loop<F>(
    mut snapshots: watch::Receiver<Snapshot>,
    period: Duration,
    mut draw: F,
) -> u64
where
    F: FnMut(&Snapshot),
{
    let mut frame = tokio::time::interval(period);
    frame.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut drawn = 0;

    loop {
        frame.tick().await;
        let snapshot = snapshots.borrow_and_update();
        if !snapshot.state.is_active() {
            break;
        }
        draw(&snapshot);
        drawn += 1;
    }

    tracing::debug!(frames = drawn, "render loop finished");
    drawn
}

//! Wires the client, channel manager and view together.
//!
//! One invariant lives here: when the submission result carries a
//! session id (and no synchronous snapshot), the channel is opened
//! before control returns to the caller, so the first pushed event can
//! never be lost to a setup race.

use anyhow::Result;
use tokio::sync::mpsc;
use tracing::info;

use crate::api::BackendClient;
use crate::channel::{ChannelEvent, ChannelManager};
use crate::config::Config;
use crate::progress::Progress;
use crate::types::JobRequest;
use crate::view::ViewState;

/// Drives one job at a time. A new submission supersedes the previous
/// one: view state is reset and the prior channel forcibly closed.
pub struct JobRunner {
    client: BackendClient,
    channel: ChannelManager,
    view: ViewState,
    expected_steps: usize,
    events: Option<mpsc::Receiver<ChannelEvent>>,
}

impl JobRunner {
    pub fn new(config: &Config) -> Result<Self> {
        let client = BackendClient::new(&config.backend.base_url)?;
        let channel = ChannelManager::with_queue_capacity(
            &config.backend.ws_base(),
            config.channel.queue_capacity,
        );
        Ok(Self {
            client,
            channel,
            view: ViewState::new(),
            expected_steps: config.progress.expected_steps,
            events: None,
        })
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    pub fn progress(&self) -> Progress {
        self.view.progress(self.expected_steps)
    }

    /// True while a channel receiver is attached (events may still
    /// arrive).
    pub fn has_live_channel(&self) -> bool {
        self.events.is_some()
    }

    /// Submit a job. On return the view reflects the one-shot result and
    /// the push channel, if one is called for, is already open.
    pub async fn submit(&mut self, request: &JobRequest) {
        self.view.reset_for_submission();
        self.channel.close();
        self.events = None;

        match self.client.submit(request).await {
            Ok(result) => {
                // A synchronous snapshot means there is nothing left to
                // stream; only a session id without one opens a channel.
                if result.snapshot.is_none() {
                    if let Some(session_id) = result.session_id.as_deref() {
                        info!(session_id, "opening progress channel");
                        self.events = Some(self.channel.open(session_id));
                    }
                }
                self.view.apply_result(result);
            }
            Err(err) => {
                self.view.apply_error(&err);
            }
        }
    }

    /// Receive and apply the next channel event.
    ///
    /// Returns the applied event, or `None` once the channel is finished
    /// (closed, superseded, or never opened).
    pub async fn pump(&mut self) -> Option<ChannelEvent> {
        let rx = self.events.as_mut()?;
        match rx.recv().await {
            Some(event) => {
                if matches!(event, ChannelEvent::Closed) {
                    self.events = None;
                }
                self.view.apply_channel_event(event.clone());
                Some(event)
            }
            None => {
                // Sender gone without a close marker (superseded task).
                self.events = None;
                self.view.apply_channel_event(ChannelEvent::Closed);
                None
            }
        }
    }

    /// Drain the channel until it closes.
    pub async fn run_to_close(&mut self) {
        while self.pump().await.is_some() {}
    }

    /// Best-effort fetch of a step's screenshot artifact.
    pub async fn fetch_screenshot(&self, image_ref: &str) -> Option<Vec<u8>> {
        self.client.fetch_screenshot(image_ref).await
    }
}

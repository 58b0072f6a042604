//! Main Application
//!
//! The App struct manages the TUI lifecycle as a thin display client:
//! - Event loop (keyboard, resize)
//! - StudioClient for orchestration
//! - DisplayState for rendering
//!
//! The App:
//! 1. Stages the reference files and starts a run
//! 2. Lets the embedded Conductor apply completions every frame
//! 3. Receives ConductorMessages and updates DisplayState
//! 4. Renders based on DisplayState

use std::path::PathBuf;
use std::time::{Duration, Instant};

use crossterm::event::{Event, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use futures::StreamExt;
use ratatui::backend::Backend;
use ratatui::Terminal;

use atelier_core::{ConceptGateway, ReferenceSlot, RunRequest};

use crate::display::DisplayState;
use crate::studio_client::StudioClient;
use crate::view;
use crate::widgets::TextBlockState;

/// Frame budget (~20 FPS is plenty for a mostly static card)
const FRAME_DURATION: Duration = Duration::from_millis(50);

/// Main application state
pub struct App<G: ConceptGateway> {
    // === Core State ===
    /// Is the app still running?
    running: bool,

    // === Conductor Integration ===
    /// Client for communicating with the embedded Conductor
    client: StudioClient<G>,
    /// Display state derived from ConductorMessages
    display: DisplayState,

    // === Run Input ===
    /// The request re-issued by `r`
    request: RunRequest,
    /// Last local problem (staging or validation), shown in the status bar
    notice: Option<String>,

    // === UI State ===
    /// Card scroll position
    card: TextBlockState,
}

impl<G: ConceptGateway> App<G> {
    /// Create a new App around a client
    pub fn new(client: StudioClient<G>) -> Self {
        let display = DisplayState::from_snapshot(&client.snapshot());
        Self {
            running: true,
            client,
            display,
            request: RunRequest::default(),
            notice: None,
            card: TextBlockState::default(),
        }
    }

    /// Stage the three reference files
    ///
    /// A file that cannot be read or staged leaves its slot empty; the run
    /// request then fails validation and the problem shows in the status bar.
    pub async fn load_references(&mut self, paths: [PathBuf; 3]) {
        let mut request = RunRequest::default();
        for (slot, path) in ReferenceSlot::ALL.into_iter().zip(paths) {
            match self.client.stage_file(&path).await {
                Ok(staged) => {
                    self.display.set_upload(slot, staged.preview);
                    if let Some(payload) = staged.payload {
                        request = request.with_reference(slot, payload);
                    }
                }
                Err(e) => {
                    tracing::warn!(slot = %slot, error = %e, "Could not stage reference");
                    self.display.set_upload(slot, None);
                }
            }
        }
        self.request = request;
    }

    /// Start (or supersede) a run with the staged references
    pub async fn start_run(&mut self) {
        match self.client.start_run(self.request.clone()).await {
            Ok(run_id) => {
                tracing::info!(run_id = %run_id, "Run requested");
                self.notice = None;
                self.card.scroll_to_top();
            }
            Err(e) => self.notice = Some(e.to_string()),
        }
    }

    /// Main event loop
    pub async fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> anyhow::Result<()> {
        // Create async event stream for non-blocking terminal events
        let mut event_stream = EventStream::new();

        self.render(terminal)?;

        while self.running {
            let frame_start = Instant::now();

            tokio::select! {
                biased;

                // Terminal events have priority
                maybe_event = event_stream.next() => {
                    match maybe_event {
                        // Only handle Press events (not Release or Repeat)
                        Some(Ok(Event::Key(key))) if key.kind == KeyEventKind::Press => {
                            self.handle_key(key).await;
                        }
                        Some(Ok(_)) => {}
                        Some(Err(e)) => tracing::warn!("Terminal event error: {}", e),
                        None => self.running = false,
                    }
                }

                // Frame tick
                _ = tokio::time::sleep(FRAME_DURATION) => {}
            }

            // Let the Conductor apply whatever completed
            self.client.poll().await;

            // Receive and process messages from Conductor
            self.process_conductor_messages();

            self.render(terminal)?;

            // Frame rate limiting
            let elapsed = frame_start.elapsed();
            if elapsed < FRAME_DURATION {
                tokio::time::sleep(FRAME_DURATION - elapsed).await;
            }
        }

        Ok(())
    }

    /// Process all pending messages from the Conductor
    pub fn process_conductor_messages(&mut self) {
        for msg in self.client.recv_all() {
            self.display.apply_message(msg);
        }
    }

    /// Handle keyboard input
    async fn handle_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => self.running = false,
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.running = false;
            }
            KeyCode::Char('r') => self.start_run().await,
            KeyCode::Up => self.card.scroll(-1),
            KeyCode::Down => self.card.scroll(1),
            KeyCode::PageUp => self.card.scroll(-10),
            KeyCode::PageDown => self.card.scroll(10),
            KeyCode::Home => self.card.scroll_to_top(),
            _ => {}
        }
    }

    fn render<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> anyhow::Result<()> {
        terminal.draw(|frame| {
            let area = frame.area();
            view::render(
                &self.display,
                self.notice.as_deref(),
                &mut self.card,
                area,
                frame.buffer_mut(),
            );
        })?;
        Ok(())
    }

    /// Current display state
    pub fn display(&self) -> &DisplayState {
        &self.display
    }

    /// Local notice shown in the status bar
    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    /// The embedded client
    pub fn client_mut(&mut self) -> &mut StudioClient<G> {
        &mut self.client
    }
}

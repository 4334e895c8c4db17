//! # Live Recording Module
//!
//! Runs one session against real event sources and persists the result.
//!
//! ## Architecture
//! - **LiveRecorder**: Owns the session lifecycle and the two background threads
//! - **Ticker Thread**: Closes a frequency window every `window_ms`
//! - **Writer Thread**: Appends finished sessions to the history store
//!
//! Sensor sources deliver through `listener()`; the ticker and the sources all
//! write through the same `SessionHandle`. History I/O happens on the writer
//! thread so `stop` never blocks on storage.

use crate::config::Config;
use crate::error::SessionError;
use crate::history::{HistoryStore, KeyValueStore};
use crate::sensor::{Clock, SensorRegistration, SessionHandle};
use crate::session::{LiveStats, SessionSummary};
use crossbeam_channel::{bounded, select, tick, unbounded, Receiver, Sender};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// Command sent from the recorder to the writer thread
#[derive(Debug)]
enum WriterCommand {
    /// Persist a finished session
    Append(SessionSummary),
    /// Drain and exit
    Stop,
}

pub struct LiveRecorder {
    registration: Arc<SensorRegistration<SessionHandle>>,
    clock: Arc<dyn Clock>,
    /// Dropping this sender stops the ticker thread
    ticker_stop: Option<Sender<()>>,
    ticker_thread: Option<thread::JoinHandle<()>>,
    command_tx: Sender<WriterCommand>,
    writer_thread: Option<thread::JoinHandle<()>>,
}

impl LiveRecorder {
    /// Start a session now and begin ticking frequency windows
    pub fn start<S>(
        config: &Config,
        history: HistoryStore<S>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, SessionError>
    where
        S: KeyValueStore + Send + 'static,
    {
        let handle = SessionHandle::new(config.detector);
        handle.start(clock.now_ms())?;

        let (command_tx, command_rx) = unbounded();
        let writer_thread = thread::spawn(move || {
            Self::writer_loop(command_rx, history);
        });

        let (ticker_stop, stop_rx) = bounded::<()>(0);
        let window = Duration::from_millis(config.frequency.window_ms.max(1) as u64);
        let ticker_thread = {
            let handle = handle.clone();
            let clock = clock.clone();
            thread::spawn(move || {
                Self::ticker_loop(window, stop_rx, handle, clock);
            })
        };

        Ok(Self {
            registration: Arc::new(SensorRegistration::new(handle)),
            clock,
            ticker_stop: Some(ticker_stop),
            ticker_thread: Some(ticker_thread),
            command_tx,
            writer_thread: Some(writer_thread),
        })
    }

    /// Listener to register with the sensor sources
    pub fn listener(&self) -> Arc<SensorRegistration<SessionHandle>> {
        self.registration.clone()
    }

    pub fn handle(&self) -> &SessionHandle {
        self.registration.listener()
    }

    pub fn live_stats(&self) -> Option<LiveStats> {
        self.handle().live_stats(self.clock.now_ms())
    }

    /// Stop the session, queue it for persistence and return its summary
    pub fn stop(&mut self) -> Result<SessionSummary, SessionError> {
        self.registration.unregister();
        self.stop_ticker();

        let summary = self.handle().stop(self.clock.now_ms())?;

        if let Err(e) = self.command_tx.send(WriterCommand::Append(summary)) {
            log::error!("Failed to queue session for saving: {}", e);
        }

        Ok(summary)
    }

    fn stop_ticker(&mut self) {
        self.ticker_stop.take();
        if let Some(handle) = self.ticker_thread.take() {
            let _ = handle.join();
        }
    }

    fn ticker_loop(
        window: Duration,
        stop_rx: Receiver<()>,
        handle: SessionHandle,
        clock: Arc<dyn Clock>,
    ) {
        let ticker = tick(window);
        loop {
            select! {
                recv(ticker) -> _ => {
                    if handle.flush_window(clock.now_ms()).is_none() {
                        break;
                    }
                }
                recv(stop_rx) -> _ => break,
            }
        }
        log::debug!("Ticker thread stopped");
    }

    /// Writer thread loop
    ///
    /// Appends each finished session in arrival order until told to stop.
    fn writer_loop<S: KeyValueStore>(
        command_rx: Receiver<WriterCommand>,
        mut history: HistoryStore<S>,
    ) {
        loop {
            match command_rx.recv() {
                Ok(WriterCommand::Append(summary)) => {
                    if let Err(e) = history.append(summary) {
                        log::error!("Failed to save session: {}", e);
                    }
                }
                Ok(WriterCommand::Stop) => {
                    log::info!("Writer thread stopped");
                    break;
                }
                Err(_) => {
                    log::info!("Writer thread: command channel closed");
                    break;
                }
            }
        }
    }
}

impl Drop for LiveRecorder {
    fn drop(&mut self) {
        self.registration.unregister();
        self.stop_ticker();

        // Queued appends are processed before Stop
        let _ = self.command_tx.send(WriterCommand::Stop);

        if let Some(handle) = self.writer_thread.take() {
            let _ = handle.join();
        }
    }
}

//! A scenario's connection to the editor.

use std::cell::RefCell;
use std::rc::Rc;

use stagehand_foundation::names::editor;
use stagehand_foundation::EditorBus;
use tracing::debug;

use crate::bus::Dispatcher;
use crate::config::HarnessConfig;
use crate::error::HarnessResult;
use crate::report::{LabelPair, Reporter};

/// Owns the bus, the record stream, and the notification dispatcher.
///
/// Every facade is an `impl Session` block in its own module; a scenario only
/// ever holds `&mut Session`.
pub struct Session {
    pub(crate) bus: Box<dyn EditorBus>,
    pub(crate) reporter: Reporter,
    pub(crate) config: HarnessConfig,
    pub(crate) dispatcher: Rc<RefCell<Dispatcher>>,
    pub(crate) waiting: bool,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("reporter", &self.reporter)
            .field("config", &self.config)
            .field("waiting", &self.waiting)
            .finish_non_exhaustive()
    }
}

impl Session {
    /// Creates a session over `bus`.
    #[must_use]
    pub fn new(bus: Box<dyn EditorBus>, reporter: Reporter, config: HarnessConfig) -> Self {
        Self {
            bus,
            reporter,
            config,
            dispatcher: Rc::new(RefCell::new(Dispatcher::default())),
            waiting: false,
        }
    }

    /// Timing configuration.
    #[must_use]
    pub fn config(&self) -> &HarnessConfig {
        &self.config
    }

    /// The record stream.
    #[must_use]
    pub fn reporter(&self) -> &Reporter {
        &self.reporter
    }

    /// Mutable access to the record stream.
    pub fn reporter_mut(&mut self) -> &mut Reporter {
        &mut self.reporter
    }

    /// Consumes the session, returning its record stream.
    #[must_use]
    pub fn into_reporter(self) -> Reporter {
        self.reporter
    }

    /// Raw bus access for calls no facade covers.
    pub fn bus_mut(&mut self) -> &mut dyn EditorBus {
        self.bus.as_mut()
    }

    /// Returns false once the editor is gone.
    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.bus.is_alive()
    }

    // --- Records ---

    /// Advisory line.
    pub fn info(&mut self, message: impl std::fmt::Display) {
        self.reporter.info(message);
    }

    /// Emits one pass/fail record. Returns `outcome`.
    pub fn record(&mut self, labels: &LabelPair, outcome: bool) -> bool {
        self.reporter.record(labels, outcome)
    }

    /// Emits one record; a false outcome aborts the scenario once queued
    /// notifications were delivered.
    ///
    /// # Errors
    ///
    /// Returns `Fatal` when `outcome` is false.
    pub fn critical(&mut self, labels: &LabelPair, outcome: bool) -> HarnessResult<()> {
        if let Err(fatal) = self.reporter.critical(labels, outcome) {
            self.dispatch_notifications();
            return Err(fatal.into());
        }
        Ok(())
    }

    // --- Editor-wide requests ---

    /// Undoes the last edit and waits for propagation. Returns false when
    /// there was nothing to undo.
    ///
    /// # Errors
    ///
    /// Returns an error if the bus call fails.
    pub fn undo(&mut self) -> HarnessResult<bool> {
        let undone: bool = self.broadcast(editor::BUS, editor::UNDO, &[])?;
        self.wait_for_propagation()?;
        debug!(undone, "undo");
        Ok(undone)
    }

    /// Redoes the last undone edit and waits for propagation.
    ///
    /// # Errors
    ///
    /// Returns an error if the bus call fails.
    pub fn redo(&mut self) -> HarnessResult<bool> {
        let redone: bool = self.broadcast(editor::BUS, editor::REDO, &[])?;
        self.wait_for_propagation()?;
        debug!(redone, "redo");
        Ok(redone)
    }

    /// Starts game mode.
    ///
    /// # Errors
    ///
    /// Returns an error if the bus call fails.
    pub fn enter_game_mode(&mut self) -> HarnessResult<()> {
        self.broadcast::<()>(editor::BUS, editor::ENTER_GAME_MODE, &[])?;
        Ok(())
    }

    /// Stops game mode, restoring the edit-time level.
    ///
    /// # Errors
    ///
    /// Returns an error if the bus call fails.
    pub fn exit_game_mode(&mut self) -> HarnessResult<()> {
        self.broadcast::<()>(editor::BUS, editor::EXIT_GAME_MODE, &[])?;
        Ok(())
    }

    /// True while game mode runs.
    ///
    /// # Errors
    ///
    /// Returns an error if the bus call fails.
    pub fn is_in_game_mode(&mut self) -> HarnessResult<bool> {
        Ok(self.broadcast(editor::BUS, editor::IS_IN_GAME_MODE, &[])?)
    }
}

//=========================================================================
// Event Collector
//=========================================================================
//
// Engine-side inbox with bounded polling and shutdown detection.
//
// Architecture:
//   Receiver<PlatformEvent> → collect_frame() → Vec<Event> → TickControl
//
// Bounded polling prevents a flooding host from starving the update loop;
// whatever is left stays queued for the next tick.
//
//=========================================================================

//=== External Dependencies ===============================================

use crossbeam_channel::{Receiver, TryRecvError};
use log::{trace, warn};

//=== Internal Dependencies ===============================================

use super::PlatformEvent;
use crate::core::event::Event;

//=== TickControl =========================================================

/// Update loop control signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickControl {
    Continue,
    Exit,
}

//=== EventCollector ======================================================

/// Collects host messages with bounded polling and converts them into
/// tree events.
pub(crate) struct EventCollector {
    receiver: Receiver<PlatformEvent>,
    events: Vec<Event>,
    max_messages: usize,
}

impl EventCollector {
    pub(crate) fn new(receiver: Receiver<PlatformEvent>, max_messages: usize) -> Self {
        Self {
            receiver,
            events: Vec::with_capacity(16),
            max_messages,
        }
    }

    /// Drains pending messages (at most `max_messages` per call).
    pub(crate) fn collect_frame(&mut self) -> TickControl {
        self.events.clear();
        let mut drained = 0;

        while drained < self.max_messages {
            match self.receiver.try_recv() {
                Ok(message) => {
                    drained += 1;
                    if self.handle_message(message) == TickControl::Exit {
                        return TickControl::Exit;
                    }
                }
                Err(TryRecvError::Disconnected) => return TickControl::Exit,
                Err(TryRecvError::Empty) => break,
            }
        }

        if drained >= self.max_messages {
            warn!(target: "engine", "Event queue backlog: drained {} messages this frame", drained);
        }
        if !self.events.is_empty() {
            trace!(target: "engine", "Collected {} events", self.events.len());
        }

        TickControl::Continue
    }

    /// Returns the events collected this frame.
    pub(crate) fn events(&self) -> &[Event] {
        &self.events
    }

    /// Takes the collected events, leaving an empty buffer.
    pub(crate) fn take_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }

    fn handle_message(&mut self, message: PlatformEvent) -> TickControl {
        match message {
            PlatformEvent::Events(batch) => {
                self.events.extend(batch.into_iter().map(Event::from));
                TickControl::Continue
            }
            PlatformEvent::Quit => TickControl::Exit,
        }
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

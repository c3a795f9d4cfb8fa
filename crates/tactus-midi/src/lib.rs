//! MIDI control transport for tactus
//!
//! This crate provides:
//! - MIDI port discovery and connection via midir
//! - Control Change parsing from the driver callback
//! - A bounded inbound queue (drop-newest on overflow)
//! - Outbound CC sending with silent no-op when unconnected
//!
//! # Architecture
//!
//! ```text
//! MIDI device -> midir callback -> flume channel -> app poll -> mixer
//! ```
//!
//! The midir callback is synchronous and runs on the driver thread; the
//! bounded flume channel bridges it to the app's own cadence without ever
//! blocking the driver.

mod connection;
mod input;
mod messages;
mod output;

pub use connection::{list_input_ports, list_output_ports, MidiConnectionError};
pub use input::{parse_cc, MidiInputHandler};
pub use messages::{CcMessage, CC_PAN, CC_VOLUME};
pub use output::CcSender;

use flume::{Receiver, Sender};

/// MIDI transport facade
///
/// Owns the inbound listener, the outbound sender and the queue between the
/// driver thread and the app. One handler lives for the whole session;
/// `connect` replaces any previous connection.
pub struct MidiHandler {
    input: Option<MidiInputHandler>,
    sender: CcSender,
    message_tx: Sender<CcMessage>,
    message_rx: Receiver<CcMessage>,
    input_port_name: Option<String>,
    output_port_name: Option<String>,
}

impl MidiHandler {
    /// Create an unconnected handler
    pub fn new() -> Self {
        let (message_tx, message_rx) = flume::bounded(input::QUEUE_CAPACITY);
        Self {
            input: None,
            sender: CcSender::disconnected(),
            message_tx,
            message_rx,
            input_port_name: None,
            output_port_name: None,
        }
    }

    /// Connect input and/or output ports by listing index
    ///
    /// Any existing connection is dropped first. If the input connect fails
    /// after an output was opened, the output is released too so a failed
    /// connect leaves the handler fully disconnected.
    pub fn connect(
        &mut self,
        input_idx: Option<usize>,
        output_idx: Option<usize>,
    ) -> Result<(), MidiConnectionError> {
        self.disconnect();

        if let Some(idx) = output_idx {
            let (connection, name) = connection::connect_output_by_index(idx)?;
            self.sender = CcSender::new(connection);
            self.output_port_name = Some(name);
        }

        if let Some(idx) = input_idx {
            let (midi_in, port, name) = match connection::input_port_by_index(idx) {
                Ok(resolved) => resolved,
                Err(e) => {
                    self.disconnect();
                    return Err(e);
                }
            };
            match MidiInputHandler::connect(midi_in, &port, self.message_tx.clone()) {
                Ok(handler) => {
                    self.input = Some(handler);
                    self.input_port_name = Some(name);
                }
                Err(e) => {
                    self.disconnect();
                    return Err(e);
                }
            }
        }

        Ok(())
    }

    /// Try to receive a pending inbound message (non-blocking)
    pub fn try_recv(&self) -> Option<CcMessage> {
        self.message_rx.try_recv().ok()
    }

    /// Drain all pending inbound messages
    pub fn drain(&self) -> impl Iterator<Item = CcMessage> + '_ {
        std::iter::from_fn(|| self.try_recv())
    }

    /// Send one outbound CC; no-op when no output port is connected
    pub fn send_cc(&mut self, channel: u8, controller: u8, value: u8) {
        self.sender.send(channel, controller, value);
    }

    /// Whether any port (input or output) is connected
    pub fn is_connected(&self) -> bool {
        self.input.is_some() || self.sender.is_connected()
    }

    /// Name of the connected input port
    pub fn input_port_name(&self) -> &str {
        self.input_port_name.as_deref().unwrap_or("None")
    }

    /// Name of the connected output port
    pub fn output_port_name(&self) -> &str {
        self.output_port_name.as_deref().unwrap_or("None")
    }

    /// Drop both connections. Idempotent.
    pub fn disconnect(&mut self) {
        self.input = None;
        self.sender = CcSender::disconnected();
        self.input_port_name = None;
        self.output_port_name = None;
    }

    /// Release all MIDI resources. Idempotent.
    pub fn close(&mut self) {
        self.disconnect();
    }
}

impl Default for MidiHandler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unconnected_handler() {
        let mut handler = MidiHandler::new();
        assert!(!handler.is_connected());
        assert_eq!(handler.input_port_name(), "None");
        assert_eq!(handler.output_port_name(), "None");
        assert!(handler.try_recv().is_none());

        // Sends without a destination are silent no-ops
        handler.send_cc(0, CC_VOLUME, 100);

        handler.close();
        handler.close();
        assert!(!handler.is_connected());
    }

    #[test]
    fn test_drain_empty() {
        let handler = MidiHandler::new();
        assert_eq!(handler.drain().count(), 0);
    }
}

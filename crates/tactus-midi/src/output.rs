//! Outbound Control Change sending
//!
//! A [`CcSender`] wraps an optional midir output connection. Sending without
//! a destination is a silent no-op so the mixer can fan out unconditionally;
//! a failed send on a live connection is logged and otherwise swallowed.

use midir::MidiOutputConnection;

/// Outbound CC sender, connected or not
pub struct CcSender {
    connection: Option<MidiOutputConnection>,
}

impl CcSender {
    /// A sender with no destination; every send is a no-op
    pub fn disconnected() -> Self {
        Self { connection: None }
    }

    pub(crate) fn new(connection: MidiOutputConnection) -> Self {
        Self {
            connection: Some(connection),
        }
    }

    pub fn is_connected(&self) -> bool {
        self.connection.is_some()
    }

    /// Send one Control Change triple
    pub fn send(&mut self, channel: u8, controller: u8, value: u8) {
        let Some(connection) = self.connection.as_mut() else {
            return;
        };

        let message = [0xB0 | (channel & 0x0F), controller & 0x7F, value & 0x7F];
        log::debug!(
            "[MIDI OUT] CC ch={} cc={:#04x} val={}",
            channel,
            controller,
            value
        );
        if let Err(e) = connection.send(&message) {
            log::warn!("MIDI output: Failed to send message: {}", e);
        }
    }
}

impl Default for CcSender {
    fn default() -> Self {
        Self::disconnected()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disconnected_send_is_silent() {
        let mut sender = CcSender::disconnected();
        assert!(!sender.is_connected());
        // Must not panic or error without a destination
        sender.send(0, 7, 100);
        sender.send(15, 10, 0);
    }
}

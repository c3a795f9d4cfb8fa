//! MIDI input handling
//!
//! The midir callback runs on the driver's thread: it parses Control Change
//! bytes and pushes them into a bounded flume queue with `try_send`. A full
//! queue drops the newest message - the driver thread is never blocked, and
//! a stale control stream beats a stalled one.

use flume::Sender;
use midir::{MidiInput, MidiInputConnection, MidiInputPort};

use crate::connection::MidiConnectionError;
use crate::messages::CcMessage;

/// Inbound queue depth; overflow drops the newest message
pub(crate) const QUEUE_CAPACITY: usize = 100;

/// Parse raw MIDI bytes into a Control Change message
///
/// Status byte 0xBn carries the channel in its low nibble; everything that
/// is not a complete CC message (notes, pitch bend, running status
/// fragments) is ignored.
pub fn parse_cc(data: &[u8]) -> Option<CcMessage> {
    if data.len() < 3 {
        return None;
    }

    let status = data[0];
    if status & 0xF0 != 0xB0 {
        return None;
    }

    Some(CcMessage {
        channel: status & 0x0F,
        controller: data[1],
        value: data[2],
    })
}

/// Push a message into the inbound queue, dropping it if the queue is full
pub(crate) fn enqueue(tx: &Sender<CcMessage>, msg: CcMessage) {
    if tx.try_send(msg).is_err() {
        log::warn!("MIDI: Inbound queue full, dropping message");
    }
}

/// MIDI input listener
///
/// Owns the midir connection; dropping it stops the listener.
pub struct MidiInputHandler {
    /// The midir connection (kept alive for the duration)
    _connection: MidiInputConnection<Sender<CcMessage>>,
}

impl MidiInputHandler {
    /// Attach the CC callback to a resolved port
    pub(crate) fn connect(
        midi_in: MidiInput,
        port: &MidiInputPort,
        message_tx: Sender<CcMessage>,
    ) -> Result<Self, MidiConnectionError> {
        let connection = midi_in
            .connect(port, "tactus-midi-input", Self::midi_callback, message_tx)
            .map_err(|e| MidiConnectionError::ConnectionError(e.to_string()))?;

        log::info!("MIDI: Input listener connected");
        Ok(Self {
            _connection: connection,
        })
    }

    /// The midir callback function
    ///
    /// Called from the MIDI driver thread whenever a message is received.
    /// Must be fast and non-blocking.
    fn midi_callback(_timestamp: u64, data: &[u8], message_tx: &mut Sender<CcMessage>) {
        let Some(msg) = parse_cc(data) else {
            return;
        };
        log::debug!("[MIDI IN] {:?}", msg);
        enqueue(message_tx, msg);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_cc() {
        let data = [0xB2, 0x07, 0x64]; // CC, channel 2, controller 7, value 100
        let msg = parse_cc(&data).unwrap();
        assert_eq!(msg.channel, 2);
        assert_eq!(msg.controller, 0x07);
        assert_eq!(msg.value, 0x64);
    }

    #[test]
    fn test_parse_cc_channel_nibble() {
        let msg = parse_cc(&[0xBF, 0x0A, 0x40]).unwrap();
        assert_eq!(msg.channel, 15);
        assert_eq!(msg.controller, 0x0A);
    }

    #[test]
    fn test_non_cc_messages_ignored() {
        assert!(parse_cc(&[0x90, 0x3C, 0x7F]).is_none(), "note on");
        assert!(parse_cc(&[0x80, 0x3C, 0x40]).is_none(), "note off");
        assert!(parse_cc(&[0xE0, 0x00, 0x40]).is_none(), "pitch bend");
    }

    #[test]
    fn test_truncated_messages_ignored() {
        assert!(parse_cc(&[]).is_none());
        assert!(parse_cc(&[0xB0]).is_none());
        assert!(parse_cc(&[0xB0, 0x07]).is_none());
    }

    #[test]
    fn test_enqueue_drops_newest_on_overflow() {
        let (tx, rx) = flume::bounded(2);
        let msg = |value| CcMessage {
            channel: 0,
            controller: 7,
            value,
        };

        enqueue(&tx, msg(1));
        enqueue(&tx, msg(2));
        enqueue(&tx, msg(3)); // queue full: dropped

        assert_eq!(rx.try_recv().unwrap().value, 1);
        assert_eq!(rx.try_recv().unwrap().value, 2);
        assert!(rx.try_recv().is_err(), "overflowing message must be gone");
    }
}

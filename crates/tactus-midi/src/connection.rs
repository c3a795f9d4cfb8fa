//! MIDI port discovery and connection
//!
//! Uses midir for cross-platform MIDI I/O (ALSA on Linux, CoreMIDI on
//! macOS, WinMM on Windows). Ports are addressed by index into the listing
//! a device selector shows; connect operations are one-shot and any retry
//! policy belongs to the caller.

use midir::{MidiInput, MidiInputPort, MidiOutput, MidiOutputConnection};

/// Error type for MIDI connection operations
#[derive(Debug, thiserror::Error)]
pub enum MidiConnectionError {
    #[error("Failed to initialize MIDI input: {0}")]
    InputInitError(String),

    #[error("Failed to initialize MIDI output: {0}")]
    OutputInitError(String),

    #[error("No MIDI port at index {0}")]
    PortOutOfRange(usize),

    #[error("Failed to connect to MIDI port: {0}")]
    ConnectionError(String),

    #[error("Failed to get port info: {0}")]
    PortInfoError(String),
}

/// List all available MIDI input port names
pub fn list_input_ports() -> Result<Vec<String>, MidiConnectionError> {
    let midi_in = MidiInput::new("tactus-midi-list")
        .map_err(|e| MidiConnectionError::InputInitError(e.to_string()))?;

    Ok(midi_in
        .ports()
        .iter()
        .filter_map(|port| midi_in.port_name(port).ok())
        .collect())
}

/// List all available MIDI output port names
pub fn list_output_ports() -> Result<Vec<String>, MidiConnectionError> {
    let midi_out = MidiOutput::new("tactus-midi-list")
        .map_err(|e| MidiConnectionError::OutputInitError(e.to_string()))?;

    Ok(midi_out
        .ports()
        .iter()
        .filter_map(|port| midi_out.port_name(port).ok())
        .collect())
}

/// Resolve an input port by listing index
///
/// Returns the `MidiInput` alongside the port so the caller can attach its
/// own callback when connecting.
pub(crate) fn input_port_by_index(
    idx: usize,
) -> Result<(MidiInput, MidiInputPort, String), MidiConnectionError> {
    let midi_in = MidiInput::new("tactus-midi-in")
        .map_err(|e| MidiConnectionError::InputInitError(e.to_string()))?;

    let port = midi_in
        .ports()
        .into_iter()
        .nth(idx)
        .ok_or(MidiConnectionError::PortOutOfRange(idx))?;

    let name = midi_in
        .port_name(&port)
        .map_err(|e| MidiConnectionError::PortInfoError(e.to_string()))?;
    log::info!("MIDI: Found input port: {}", name);

    Ok((midi_in, port, name))
}

/// Connect to an output port by listing index
pub(crate) fn connect_output_by_index(
    idx: usize,
) -> Result<(MidiOutputConnection, String), MidiConnectionError> {
    let midi_out = MidiOutput::new("tactus-midi-out")
        .map_err(|e| MidiConnectionError::OutputInitError(e.to_string()))?;

    let port = midi_out
        .ports()
        .into_iter()
        .nth(idx)
        .ok_or(MidiConnectionError::PortOutOfRange(idx))?;

    let name = midi_out
        .port_name(&port)
        .map_err(|e| MidiConnectionError::PortInfoError(e.to_string()))?;
    log::info!("MIDI: Found output port: {}", name);

    let connection = midi_out
        .connect(&port, "tactus-midi-output")
        .map_err(|e| MidiConnectionError::ConnectionError(e.to_string()))?;

    log::info!("MIDI: Connected to output port");
    Ok((connection, name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_ports() {
        // Verifies enumeration doesn't crash; actual port availability
        // depends on the system
        let _input_ports = list_input_ports();
        let _output_ports = list_output_ports();
    }
}

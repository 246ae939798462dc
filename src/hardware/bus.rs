// Serial servo-bus protocol (Feetech STS-family, Dynamixel 1.0 style).
//
// Every device on the robot (drive wheels, launcher, intake, elevator, arm
// joint, gripper servo) is a bus servo addressed by a one-byte ID.
// Packet format: [0xFF, 0xFF, ID, Length, Instruction, Params..., Checksum]

use serialport::{self, SerialPort};
use std::io::{Read, Write};
use std::time::Duration;
use tracing::trace;

pub const DEFAULT_BAUDRATE: u32 = 1_000_000;
pub const DEFAULT_TIMEOUT_MS: u64 = 100;

const HEADER: [u8; 2] = [0xFF, 0xFF];

#[repr(u8)]
#[derive(Debug, Clone, Copy)]
enum Instruction {
    Ping = 0x01,
    Read = 0x02,
    Write = 0x03,
}

/// Register map (RAM area) for the STS-family servos we use.
#[repr(u8)]
#[derive(Debug, Clone, Copy)]
pub enum Register {
    /// 1 byte: 0=position, 1=velocity, 2=PWM, 3=step
    OperatingMode = 33,
    /// 1 byte: 0=off, 1=on
    TorqueEnable = 40,
    /// 2 bytes
    GoalPosition = 42,
    /// 2 bytes, sign-magnitude
    GoalVelocity = 46,
    /// 2 bytes: drive strength, 0..=1000
    TorqueLimit = 48,
    /// 1 byte: 0=unlocked, 1=locked
    Lock = 55,
    /// 2 bytes, read-only
    PresentPosition = 56,
    /// 2 bytes, read-only, sign-magnitude
    PresentVelocity = 58,
}

#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OperatingMode {
    Position = 0,
    Velocity = 1,
}

#[derive(Debug, thiserror::Error)]
pub enum BusError {
    #[error("serial port error: {0}")]
    Serial(#[from] serialport::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid response from servo {id}: {reason}")]
    InvalidResponse { id: u8, reason: String },

    #[error("checksum mismatch for servo {id}")]
    ChecksumMismatch { id: u8 },

    #[error("servo {id} reported error status 0x{status:02X}")]
    ServoError { id: u8, status: u8 },

    #[error("timeout waiting for response from servo {id}")]
    Timeout { id: u8 },
}

pub type Result<T> = std::result::Result<T, BusError>;

/// Handle to the shared serial bus. One per robot; all device adapters go
/// through it.
pub struct ServoBus {
    port: Box<dyn SerialPort>,
}

impl ServoBus {
    pub fn open(port_name: &str) -> Result<Self> {
        Self::open_with_baudrate(port_name, DEFAULT_BAUDRATE)
    }

    pub fn open_with_baudrate(port_name: &str, baudrate: u32) -> Result<Self> {
        let port = serialport::new(port_name, baudrate)
            .timeout(Duration::from_millis(DEFAULT_TIMEOUT_MS))
            .open()?;
        Ok(Self { port })
    }

    /// Checksum over everything after the header: inverted low byte of the sum.
    fn checksum(data: &[u8]) -> u8 {
        let sum: u16 = data.iter().map(|&b| b as u16).sum();
        (!sum & 0xFF) as u8
    }

    fn build_packet(id: u8, instruction: Instruction, params: &[u8]) -> Vec<u8> {
        let length = (params.len() + 2) as u8; // instruction + params + checksum
        let mut packet = Vec::with_capacity(6 + params.len());
        packet.extend_from_slice(&HEADER);
        packet.push(id);
        packet.push(length);
        packet.push(instruction as u8);
        packet.extend_from_slice(params);
        packet.push(Self::checksum(&packet[2..]));
        packet
    }

    fn send_packet(&mut self, packet: &[u8]) -> Result<()> {
        self.port.write_all(packet)?;
        self.port.flush()?;
        Ok(())
    }

    fn read_response(&mut self, expected_id: u8) -> Result<Vec<u8>> {
        let mut header = [0u8; 2];
        self.port.read_exact(&mut header).map_err(|e| {
            if e.kind() == std::io::ErrorKind::TimedOut {
                BusError::Timeout { id: expected_id }
            } else {
                BusError::Io(e)
            }
        })?;
        if header != HEADER {
            return Err(BusError::InvalidResponse {
                id: expected_id,
                reason: format!("bad header {:02X?}", header),
            });
        }

        let mut id_length = [0u8; 2];
        self.port.read_exact(&mut id_length)?;
        let id = id_length[0];
        let length = id_length[1] as usize;
        if id != expected_id {
            return Err(BusError::InvalidResponse {
                id: expected_id,
                reason: format!("id mismatch: expected {}, got {}", expected_id, id),
            });
        }

        // error byte + params + checksum
        let mut remaining = vec![0u8; length];
        self.port.read_exact(&mut remaining)?;

        let mut checksum_data = vec![id, length as u8];
        checksum_data.extend_from_slice(&remaining[..remaining.len() - 1]);
        if Self::checksum(&checksum_data) != remaining[remaining.len() - 1] {
            return Err(BusError::ChecksumMismatch { id });
        }

        let status = remaining[0];
        if status != 0 {
            return Err(BusError::ServoError { id, status });
        }
        Ok(remaining[1..remaining.len() - 1].to_vec())
    }

    /// Check whether a servo answers on the bus.
    pub fn ping(&mut self, id: u8) -> Result<bool> {
        let packet = Self::build_packet(id, Instruction::Ping, &[]);
        self.send_packet(&packet)?;
        match self.read_response(id) {
            Ok(_) => Ok(true),
            Err(BusError::Timeout { .. }) => Ok(false),
            Err(e) => Err(e),
        }
    }

    pub fn write_u8(&mut self, id: u8, register: Register, value: u8) -> Result<()> {
        trace!(id, ?register, value, "bus write u8");
        let packet = Self::build_packet(id, Instruction::Write, &[register as u8, value]);
        self.send_packet(&packet)?;
        let _ = self.read_response(id)?;
        Ok(())
    }

    pub fn write_u16(&mut self, id: u8, register: Register, value: u16) -> Result<()> {
        trace!(id, ?register, value, "bus write u16");
        let params = [register as u8, (value & 0xFF) as u8, (value >> 8) as u8];
        let packet = Self::build_packet(id, Instruction::Write, &params);
        self.send_packet(&packet)?;
        let _ = self.read_response(id)?;
        Ok(())
    }

    /// Write a signed value in the servo's sign-magnitude encoding.
    pub fn write_i16(&mut self, id: u8, register: Register, value: i16) -> Result<()> {
        self.write_u16(id, register, encode_sign_magnitude(value))
    }

    pub fn read_u16(&mut self, id: u8, register: Register) -> Result<u16> {
        let packet = Self::build_packet(id, Instruction::Read, &[register as u8, 2]);
        self.send_packet(&packet)?;
        let response = self.read_response(id)?;
        if response.len() < 2 {
            return Err(BusError::InvalidResponse {
                id,
                reason: format!("expected 2 bytes, got {}", response.len()),
            });
        }
        Ok(u16::from_le_bytes([response[0], response[1]]))
    }

    pub fn read_i16(&mut self, id: u8, register: Register) -> Result<i16> {
        Ok(decode_sign_magnitude(self.read_u16(id, register)?))
    }

    // === High-level device setup ===

    pub fn enable_torque(&mut self, id: u8) -> Result<()> {
        self.write_u8(id, Register::TorqueEnable, 1)?;
        self.write_u8(id, Register::Lock, 1)
    }

    pub fn disable_torque(&mut self, id: u8) -> Result<()> {
        self.write_u8(id, Register::TorqueEnable, 0)?;
        self.write_u8(id, Register::Lock, 0)
    }

    /// Torque must be disabled before changing the mode.
    pub fn set_operating_mode(&mut self, id: u8, mode: OperatingMode) -> Result<()> {
        self.write_u8(id, Register::OperatingMode, mode as u8)
    }

    pub fn set_velocity(&mut self, id: u8, velocity: i16) -> Result<()> {
        self.write_i16(id, Register::GoalVelocity, velocity)
    }

    pub fn get_velocity(&mut self, id: u8) -> Result<i16> {
        self.read_i16(id, Register::PresentVelocity)
    }

    pub fn set_goal_position(&mut self, id: u8, counts: u16) -> Result<()> {
        self.write_u16(id, Register::GoalPosition, counts)
    }

    pub fn get_position(&mut self, id: u8) -> Result<u16> {
        self.read_u16(id, Register::PresentPosition)
    }

    /// Drive strength as a fraction of maximum, mapped to the 0..=1000
    /// torque-limit register.
    pub fn set_torque_limit(&mut self, id: u8, fraction: f64) -> Result<()> {
        let raw = (fraction.clamp(0.0, 1.0) * 1000.0).round() as u16;
        self.write_u16(id, Register::TorqueLimit, raw)
    }
}

/// Sign-magnitude encoding: bit 15 is the direction, bits 0-14 the magnitude.
fn encode_sign_magnitude(value: i16) -> u16 {
    if value >= 0 {
        value as u16
    } else {
        0x8000 | value.unsigned_abs()
    }
}

fn decode_sign_magnitude(raw: u16) -> i16 {
    let magnitude = (raw & 0x7FFF) as i16;
    if raw & 0x8000 != 0 { -magnitude } else { magnitude }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checksum() {
        // id=1, length=4, write, addr=30, data=[0, 2]: ~(1+4+3+30+0+2) = 215
        let data = [1u8, 4, 0x03, 30, 0, 2];
        assert_eq!(ServoBus::checksum(&data), 215);
    }

    #[test]
    fn test_sign_magnitude_round_trip() {
        assert_eq!(encode_sign_magnitude(0), 0);
        assert_eq!(encode_sign_magnitude(1213), 1213);
        assert_eq!(encode_sign_magnitude(-1213), 0x8000 | 1213);
        assert_eq!(decode_sign_magnitude(0x8001), -1);
        for v in [-3000i16, -1, 0, 1, 3000] {
            assert_eq!(decode_sign_magnitude(encode_sign_magnitude(v)), v);
        }
    }

    #[test]
    fn test_ping_packet_layout() {
        let packet = ServoBus::build_packet(9, Instruction::Ping, &[]);
        assert_eq!(packet.len(), 6);
        assert_eq!(&packet[..2], &HEADER);
        assert_eq!(packet[2], 9); // id
        assert_eq!(packet[3], 2); // instruction + checksum
        assert_eq!(packet[4], 0x01);
    }

    #[test]
    fn test_write_packet_layout() {
        let packet =
            ServoBus::build_packet(7, Instruction::Write, &[Register::GoalPosition as u8, 0x34, 0x12]);
        assert_eq!(packet[2], 7); // id
        assert_eq!(packet[3], 5); // instruction + 3 params + checksum
        assert_eq!(packet[4], 0x03);
        assert_eq!(packet[5], 42); // GoalPosition address
    }
}

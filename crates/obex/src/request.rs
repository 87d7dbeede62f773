use super::*;

/// SETPATH flag bits.
pub const SETPATH_GO_TO_PARENT_FOLDER: u8 = 0x01;
pub const SETPATH_DO_NOT_CREATE_FOLDER: u8 = 0x02;

/// An OBEX request packet.
///
/// CONNECT, SETPATH, and ACTION carry extra fields between the packet
/// length and the headers; every other operation, known or not, is
/// `Other`.
#[derive(Clone, Debug, PartialEq)]
pub enum Request {
  Connect {
    is_final: bool,
    version: u8,
    flags: u8,
    maximum_packet_length: u16,
    headers: Headers,
  },
  Setpath {
    is_final: bool,
    flags: u8,
    constants: u8,
    headers: Headers,
  },
  Action {
    is_final: bool,
    action_identifier: u16,
    headers: Headers,
  },
  Other {
    opcode: Opcode,
    is_final: bool,
    headers: Headers,
  },
}

impl Request {
  pub fn put(is_final: bool, headers: Headers) -> Self {
    Self::Other {
      opcode: Opcode::PUT,
      is_final,
      headers,
    }
  }

  pub fn get(headers: Headers) -> Self {
    Self::Other {
      opcode: Opcode::GET,
      is_final: true,
      headers,
    }
  }

  pub fn disconnect(headers: Headers) -> Self {
    Self::Other {
      opcode: Opcode::DISCONNECT,
      is_final: true,
      headers,
    }
  }

  pub fn opcode(&self) -> Opcode {
    match self {
      Self::Connect { .. } => Opcode::CONNECT,
      Self::Setpath { .. } => Opcode::SETPATH,
      Self::Action { .. } => Opcode::ACTION,
      Self::Other { opcode, .. } => *opcode,
    }
  }

  pub fn is_final(&self) -> bool {
    match self {
      Self::Connect { is_final, .. }
      | Self::Setpath { is_final, .. }
      | Self::Action { is_final, .. }
      | Self::Other { is_final, .. } => *is_final,
    }
  }

  pub fn headers(&self) -> &Headers {
    match self {
      Self::Connect { headers, .. }
      | Self::Setpath { headers, .. }
      | Self::Action { headers, .. }
      | Self::Other { headers, .. } => headers,
    }
  }

  pub fn to_bytes(&self) -> Vec<u8> {
    let header_bytes = self.headers().to_bytes();
    let first = self.opcode().0 | u8::from(self.is_final()) << 7;

    let mut bytes = Vec::with_capacity(header_bytes.len() + 7);
    bytes.push(first);

    match self {
      Self::Connect {
        version,
        flags,
        maximum_packet_length,
        ..
      } => {
        put_length(&mut bytes, header_bytes.len() + 7);
        bytes.push(*version);
        bytes.push(*flags);
        bytes.extend_from_slice(&maximum_packet_length.to_be_bytes());
      }
      Self::Setpath {
        flags, constants, ..
      } => {
        put_length(&mut bytes, header_bytes.len() + 5);
        bytes.push(*flags);
        bytes.push(*constants);
      }
      Self::Action {
        action_identifier, ..
      } => {
        put_length(&mut bytes, header_bytes.len() + 5);
        bytes.extend_from_slice(&action_identifier.to_be_bytes());
      }
      Self::Other { .. } => {
        put_length(&mut bytes, header_bytes.len() + 3);
      }
    }

    bytes.extend_from_slice(&header_bytes);
    bytes
  }

  pub fn from_bytes(data: &[u8]) -> Result<Self> {
    ensure!(
      data.len() >= 3,
      TruncatedError {
        expected: 3usize,
        actual: data.len(),
      },
    );

    let opcode = Opcode(data[0] & !FINAL_FLAG);
    let is_final = data[0] & FINAL_FLAG != 0;

    match opcode {
      Opcode::CONNECT => {
        ensure!(
          data.len() >= 7,
          TruncatedError {
            expected: 7usize,
            actual: data.len(),
          },
        );
        Ok(Self::Connect {
          is_final,
          version: data[3],
          flags: data[4],
          maximum_packet_length: u16::from_be_bytes([data[5], data[6]]),
          headers: Headers::parse(data, 7)?,
        })
      }
      Opcode::SETPATH => {
        ensure!(
          data.len() >= 5,
          TruncatedError {
            expected: 5usize,
            actual: data.len(),
          },
        );
        Ok(Self::Setpath {
          is_final,
          flags: data[3],
          constants: data[4],
          headers: Headers::parse(data, 5)?,
        })
      }
      Opcode::ACTION => {
        ensure!(
          data.len() >= 5,
          TruncatedError {
            expected: 5usize,
            actual: data.len(),
          },
        );
        Ok(Self::Action {
          is_final,
          action_identifier: u16::from_be_bytes([data[3], data[4]]),
          headers: Headers::parse(data, 5)?,
        })
      }
      opcode => Ok(Self::Other {
        opcode,
        is_final,
        headers: Headers::parse(data, 3)?,
      }),
    }
  }
}

pub(crate) fn put_length(bytes: &mut Vec<u8>, length: usize) {
  assert!(length <= usize::from(u16::MAX), "packet too long");
  bytes.extend_from_slice(&(length as u16).to_be_bytes());
}

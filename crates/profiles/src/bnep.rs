//! Bluetooth Network Encapsulation Protocol, version 1.0, the packet layer
//! under the PAN profile.

use super::*;

pub const PSM: u16 = 0x000F;

#[derive(Debug, Snafu)]
#[snafu(context(suffix(Error)))]
pub enum Error {
  #[snafu(display("unknown BNEP packet type 0x{value:02X}"))]
  PacketType { value: u8 },
  #[snafu(display("BNEP packet truncated: need {need} bytes but have {have}"))]
  Truncated { need: usize, have: usize },
  #[snafu(display("invalid service UUID in setup payload"))]
  Uuid { source: bluetooth::uuid::Error },
}

type Result<T = (), E = Error> = std::result::Result<T, E>;

/// BNEP packet type, low seven bits of the first octet. The high bit is
/// the extension flag.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct PacketType(pub u8);

impl PacketType {
  pub const COMPRESSED_ETHERNET: Self = Self(0x02);
  pub const COMPRESSED_ETHERNET_DEST_ONLY: Self = Self(0x04);
  pub const COMPRESSED_ETHERNET_SOURCE_ONLY: Self = Self(0x03);
  pub const CONTROL: Self = Self(0x01);
  pub const GENERAL_ETHERNET: Self = Self(0x00);

  fn name(self) -> Option<&'static str> {
    match self {
      Self::COMPRESSED_ETHERNET => Some("COMPRESSED_ETHERNET"),
      Self::COMPRESSED_ETHERNET_DEST_ONLY => Some("COMPRESSED_ETHERNET_DEST_ONLY"),
      Self::COMPRESSED_ETHERNET_SOURCE_ONLY => Some("COMPRESSED_ETHERNET_SOURCE_ONLY"),
      Self::CONTROL => Some("CONTROL"),
      Self::GENERAL_ETHERNET => Some("GENERAL_ETHERNET"),
      _ => None,
    }
  }
}

impl Display for PacketType {
  fn fmt(&self, f: &mut Formatter) -> fmt::Result {
    match self.name() {
      Some(name) => write!(f, "{name}[0x{:02X}]", self.0),
      None => write!(f, "0x{:02X}", self.0),
    }
  }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ControlType(pub u8);

impl ControlType {
  pub const COMMAND_NOT_UNDERSTOOD: Self = Self(0x00);
  pub const FILTER_MULTI_ADDR_RESPONSE: Self = Self(0x06);
  pub const FILTER_MULTI_ADDR_SET: Self = Self(0x05);
  pub const FILTER_NET_TYPE_RESPONSE: Self = Self(0x04);
  pub const FILTER_NET_TYPE_SET: Self = Self(0x03);
  pub const SETUP_CONNECTION_REQUEST: Self = Self(0x01);
  pub const SETUP_CONNECTION_RESPONSE: Self = Self(0x02);

  fn name(self) -> Option<&'static str> {
    match self {
      Self::COMMAND_NOT_UNDERSTOOD => Some("COMMAND_NOT_UNDERSTOOD"),
      Self::FILTER_MULTI_ADDR_RESPONSE => Some("FILTER_MULTI_ADDR_RESPONSE"),
      Self::FILTER_MULTI_ADDR_SET => Some("FILTER_MULTI_ADDR_SET"),
      Self::FILTER_NET_TYPE_RESPONSE => Some("FILTER_NET_TYPE_RESPONSE"),
      Self::FILTER_NET_TYPE_SET => Some("FILTER_NET_TYPE_SET"),
      Self::SETUP_CONNECTION_REQUEST => Some("SETUP_CONNECTION_REQUEST"),
      Self::SETUP_CONNECTION_RESPONSE => Some("SETUP_CONNECTION_RESPONSE"),
      _ => None,
    }
  }
}

impl Display for ControlType {
  fn fmt(&self, f: &mut Formatter) -> fmt::Result {
    match self.name() {
      Some(name) => write!(f, "{name}[0x{:02X}]", self.0),
      None => write!(f, "0x{:02X}", self.0),
    }
  }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct SetupConnectionResponseCode(pub u16);

impl SetupConnectionResponseCode {
  pub const CONNECTION_NOT_ALLOWED: Self = Self(0x0004);
  pub const INVALID_DESTINATION_SERVICE_UUID: Self = Self(0x0001);
  pub const INVALID_SERVICE_UUID_SIZE: Self = Self(0x0003);
  pub const INVALID_SOURCE_SERVICE_UUID: Self = Self(0x0002);
  pub const OPERATION_SUCCESSFUL: Self = Self(0x0000);

  fn name(self) -> Option<&'static str> {
    match self {
      Self::CONNECTION_NOT_ALLOWED => Some("CONNECTION_NOT_ALLOWED"),
      Self::INVALID_DESTINATION_SERVICE_UUID => Some("INVALID_DESTINATION_SERVICE_UUID"),
      Self::INVALID_SERVICE_UUID_SIZE => Some("INVALID_SERVICE_UUID_SIZE"),
      Self::INVALID_SOURCE_SERVICE_UUID => Some("INVALID_SOURCE_SERVICE_UUID"),
      Self::OPERATION_SUCCESSFUL => Some("OPERATION_SUCCESSFUL"),
      _ => None,
    }
  }
}

impl Display for SetupConnectionResponseCode {
  fn fmt(&self, f: &mut Formatter) -> fmt::Result {
    match self.name() {
      Some(name) => write!(f, "{name}[0x{:04X}]", self.0),
      None => write!(f, "0x{:04X}", self.0),
    }
  }
}

/// A BNEP packet.
///
/// Addresses ride the wire least significant octet first, matching the
/// HCI convention rather than Ethernet's.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Packet {
  GeneralEthernet {
    extension_flag: bool,
    destination_address: Address,
    source_address: Address,
    network_protocol_type: u16,
    payload: Vec<u8>,
  },
  Control {
    extension_flag: bool,
    control_type: ControlType,
    payload: Vec<u8>,
  },
  CompressedEthernet {
    extension_flag: bool,
    network_protocol_type: u16,
    payload: Vec<u8>,
  },
  CompressedEthernetSourceOnly {
    extension_flag: bool,
    source_address: Address,
    network_protocol_type: u16,
    payload: Vec<u8>,
  },
  CompressedEthernetDestOnly {
    extension_flag: bool,
    destination_address: Address,
    network_protocol_type: u16,
    payload: Vec<u8>,
  },
}

impl Packet {
  pub fn packet_type(&self) -> PacketType {
    match self {
      Self::GeneralEthernet { .. } => PacketType::GENERAL_ETHERNET,
      Self::Control { .. } => PacketType::CONTROL,
      Self::CompressedEthernet { .. } => PacketType::COMPRESSED_ETHERNET,
      Self::CompressedEthernetSourceOnly { .. } => PacketType::COMPRESSED_ETHERNET_SOURCE_ONLY,
      Self::CompressedEthernetDestOnly { .. } => PacketType::COMPRESSED_ETHERNET_DEST_ONLY,
    }
  }

  pub fn extension_flag(&self) -> bool {
    match self {
      Self::GeneralEthernet { extension_flag, .. }
      | Self::Control { extension_flag, .. }
      | Self::CompressedEthernet { extension_flag, .. }
      | Self::CompressedEthernetSourceOnly { extension_flag, .. }
      | Self::CompressedEthernetDestOnly { extension_flag, .. } => *extension_flag,
    }
  }

  pub fn to_bytes(&self) -> Vec<u8> {
    let mut out = vec![self.packet_type().0 | u8::from(self.extension_flag()) << 7];

    match self {
      Self::GeneralEthernet {
        destination_address,
        source_address,
        network_protocol_type,
        payload,
        ..
      } => {
        out.extend_from_slice(&destination_address.to_le_bytes());
        out.extend_from_slice(&source_address.to_le_bytes());
        out.extend_from_slice(&network_protocol_type.to_be_bytes());
        out.extend_from_slice(payload);
      }
      Self::Control {
        control_type,
        payload,
        ..
      } => {
        out.push(control_type.0);
        out.extend_from_slice(payload);
      }
      Self::CompressedEthernet {
        network_protocol_type,
        payload,
        ..
      } => {
        out.extend_from_slice(&network_protocol_type.to_be_bytes());
        out.extend_from_slice(payload);
      }
      Self::CompressedEthernetSourceOnly {
        source_address,
        network_protocol_type,
        payload,
        ..
      } => {
        out.extend_from_slice(&source_address.to_le_bytes());
        out.extend_from_slice(&network_protocol_type.to_be_bytes());
        out.extend_from_slice(payload);
      }
      Self::CompressedEthernetDestOnly {
        destination_address,
        network_protocol_type,
        payload,
        ..
      } => {
        out.extend_from_slice(&destination_address.to_le_bytes());
        out.extend_from_slice(&network_protocol_type.to_be_bytes());
        out.extend_from_slice(payload);
      }
    }

    out
  }

  pub fn from_bytes(pdu: &[u8]) -> Result<Self> {
    ensure!(
      !pdu.is_empty(),
      TruncatedError {
        need: 1usize,
        have: 0usize,
      },
    );

    let extension_flag = pdu[0] >> 7 != 0;

    match PacketType(pdu[0] & 0x7F) {
      PacketType::GENERAL_ETHERNET => {
        let (header, payload) = split(pdu, 15)?;
        Ok(Self::GeneralEthernet {
          extension_flag,
          destination_address: Address::from_le_bytes(header[1..7].try_into().unwrap()),
          source_address: Address::from_le_bytes(header[7..13].try_into().unwrap()),
          network_protocol_type: u16::from_be_bytes(header[13..15].try_into().unwrap()),
          payload: payload.to_vec(),
        })
      }
      PacketType::CONTROL => {
        let (header, payload) = split(pdu, 2)?;
        Ok(Self::Control {
          extension_flag,
          control_type: ControlType(header[1]),
          payload: payload.to_vec(),
        })
      }
      PacketType::COMPRESSED_ETHERNET => {
        let (header, payload) = split(pdu, 3)?;
        Ok(Self::CompressedEthernet {
          extension_flag,
          network_protocol_type: u16::from_be_bytes(header[1..3].try_into().unwrap()),
          payload: payload.to_vec(),
        })
      }
      PacketType::COMPRESSED_ETHERNET_SOURCE_ONLY => {
        let (header, payload) = split(pdu, 9)?;
        Ok(Self::CompressedEthernetSourceOnly {
          extension_flag,
          source_address: Address::from_le_bytes(header[1..7].try_into().unwrap()),
          network_protocol_type: u16::from_be_bytes(header[7..9].try_into().unwrap()),
          payload: payload.to_vec(),
        })
      }
      PacketType::COMPRESSED_ETHERNET_DEST_ONLY => {
        let (header, payload) = split(pdu, 9)?;
        Ok(Self::CompressedEthernetDestOnly {
          extension_flag,
          destination_address: Address::from_le_bytes(header[1..7].try_into().unwrap()),
          network_protocol_type: u16::from_be_bytes(header[7..9].try_into().unwrap()),
          payload: payload.to_vec(),
        })
      }
      PacketType(value) => Err(Error::PacketType { value }),
    }
  }
}

fn split(pdu: &[u8], header: usize) -> Result<(&[u8], &[u8])> {
  ensure!(
    pdu.len() >= header,
    TruncatedError {
      need: header,
      have: pdu.len(),
    },
  );
  Ok(pdu.split_at(header))
}

/// SETUP_CONNECTION_REQUEST payload: a uuid size octet, then the
/// destination and source service UUIDs, big-endian, both the same width.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct SetupConnectionRequest {
  pub destination_service: Uuid,
  pub source_service: Uuid,
}

impl SetupConnectionRequest {
  pub fn to_payload(&self) -> Vec<u8> {
    let destination = self.destination_service.to_be_bytes();
    let source = self.source_service.to_be_bytes();
    assert_eq!(destination.len(), source.len(), "mismatched service UUID widths");

    let mut out = vec![destination.len().try_into().unwrap()];
    out.extend_from_slice(&destination);
    out.extend_from_slice(&source);
    out
  }

  pub fn to_packet(&self) -> Packet {
    Packet::Control {
      extension_flag: false,
      control_type: ControlType::SETUP_CONNECTION_REQUEST,
      payload: self.to_payload(),
    }
  }

  pub fn from_payload(payload: &[u8]) -> Result<Self> {
    let size = usize::from(*payload.first().context(TruncatedError {
      need: 1usize,
      have: 0usize,
    })?);

    ensure!(
      payload.len() >= 1 + size * 2,
      TruncatedError {
        need: 1 + size * 2,
        have: payload.len(),
      },
    );

    Ok(Self {
      destination_service: Uuid::from_be_bytes(&payload[1..1 + size]).context(UuidError)?,
      source_service: Uuid::from_be_bytes(&payload[1 + size..1 + size * 2]).context(UuidError)?,
    })
  }
}

/// SETUP_CONNECTION_RESPONSE payload: the response code, big-endian.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct SetupConnectionResponse(pub SetupConnectionResponseCode);

impl SetupConnectionResponse {
  pub fn to_packet(&self) -> Packet {
    Packet::Control {
      extension_flag: false,
      control_type: ControlType::SETUP_CONNECTION_RESPONSE,
      payload: self.0 .0.to_be_bytes().to_vec(),
    }
  }

  pub fn from_payload(payload: &[u8]) -> Result<Self> {
    ensure!(
      payload.len() >= 2,
      TruncatedError {
        need: 2usize,
        have: payload.len(),
      },
    );

    Ok(Self(SetupConnectionResponseCode(u16::from_be_bytes(
      payload[..2].try_into().unwrap(),
    ))))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn address(s: &str) -> Address {
    s.parse().unwrap()
  }

  #[test]
  fn packet_round_trips() {
    #[track_caller]
    fn case(packet: Packet, bytes: &[u8]) {
      assert_eq!(packet.to_bytes(), bytes);
      assert_eq!(Packet::from_bytes(bytes).unwrap(), packet);
    }

    case(
      Packet::GeneralEthernet {
        extension_flag: false,
        destination_address: address("01:02:03:04:05:06"),
        source_address: address("0A:0B:0C:0D:0E:0F"),
        network_protocol_type: 0x0800,
        payload: vec![0xDE, 0xAD],
      },
      &[
        0x00, 0x06, 0x05, 0x04, 0x03, 0x02, 0x01, 0x0F, 0x0E, 0x0D, 0x0C, 0x0B, 0x0A, 0x08, 0x00,
        0xDE, 0xAD,
      ],
    );

    case(
      Packet::Control {
        extension_flag: false,
        control_type: ControlType::SETUP_CONNECTION_RESPONSE,
        payload: vec![0x00, 0x00],
      },
      &[0x01, 0x02, 0x00, 0x00],
    );

    case(
      Packet::CompressedEthernet {
        extension_flag: true,
        network_protocol_type: 0x86DD,
        payload: vec![0x01],
      },
      &[0x82, 0x86, 0xDD, 0x01],
    );

    case(
      Packet::CompressedEthernetSourceOnly {
        extension_flag: false,
        source_address: address("01:02:03:04:05:06"),
        network_protocol_type: 0x0800,
        payload: vec![],
      },
      &[0x03, 0x06, 0x05, 0x04, 0x03, 0x02, 0x01, 0x08, 0x00],
    );

    case(
      Packet::CompressedEthernetDestOnly {
        extension_flag: false,
        destination_address: address("01:02:03:04:05:06"),
        network_protocol_type: 0x0800,
        payload: vec![0x55],
      },
      &[0x04, 0x06, 0x05, 0x04, 0x03, 0x02, 0x01, 0x08, 0x00, 0x55],
    );
  }

  #[test]
  fn parse_errors() {
    assert!(matches!(
      Packet::from_bytes(&[]),
      Err(Error::Truncated { need: 1, have: 0 }),
    ));

    assert!(matches!(
      Packet::from_bytes(&[0x05]),
      Err(Error::PacketType { value: 0x05 }),
    ));

    assert!(matches!(
      Packet::from_bytes(&[0x00, 0x01, 0x02]),
      Err(Error::Truncated { need: 15, have: 3 }),
    ));

    assert!(matches!(
      Packet::from_bytes(&[0x01]),
      Err(Error::Truncated { need: 2, have: 1 }),
    ));
  }

  #[test]
  fn setup_request_payload() {
    let request = SetupConnectionRequest {
      destination_service: Uuid::Uuid16(0x1116),
      source_service: Uuid::Uuid16(0x1115),
    };

    let payload = request.to_payload();
    assert_eq!(payload, [0x02, 0x11, 0x16, 0x11, 0x15]);
    assert_eq!(SetupConnectionRequest::from_payload(&payload).unwrap(), request);

    let Packet::Control { control_type, .. } = request.to_packet() else {
      panic!("expected control packet");
    };
    assert_eq!(control_type, ControlType::SETUP_CONNECTION_REQUEST);

    assert!(matches!(
      SetupConnectionRequest::from_payload(&[0x02, 0x11, 0x16, 0x11]),
      Err(Error::Truncated { need: 5, have: 4 }),
    ));
  }

  #[test]
  fn setup_response_payload() {
    let response = SetupConnectionResponse(SetupConnectionResponseCode::CONNECTION_NOT_ALLOWED);

    let Packet::Control { payload, .. } = response.to_packet() else {
      panic!("expected control packet");
    };
    assert_eq!(payload, [0x00, 0x04]);
    assert_eq!(SetupConnectionResponse::from_payload(&payload).unwrap(), response);

    assert!(matches!(
      SetupConnectionResponse::from_payload(&[0x00]),
      Err(Error::Truncated { need: 2, have: 1 }),
    ));
  }

  #[test]
  fn display() {
    assert_eq!(PacketType::CONTROL.to_string(), "CONTROL[0x01]");
    assert_eq!(PacketType(0x7F).to_string(), "0x7F");
    assert_eq!(
      SetupConnectionResponseCode::OPERATION_SUCCESSFUL.to_string(),
      "OPERATION_SUCCESSFUL[0x0000]",
    );
  }
}

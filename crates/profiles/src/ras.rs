//! Ranging Service structures: the control point operations, the
//! segmentation and ranging headers, and the channel sounding ranging
//! data carried by the on-demand and real-time characteristics.

use super::*;

pub const ON_DEMAND_RANGING_DATA_CHARACTERISTIC: Uuid = Uuid::Uuid16(0x2C16);
pub const RANGING_DATA_OVERWRITTEN_CHARACTERISTIC: Uuid = Uuid::Uuid16(0x2C19);
pub const RANGING_DATA_READY_CHARACTERISTIC: Uuid = Uuid::Uuid16(0x2C18);
pub const RANGING_SERVICE: Uuid = Uuid::Uuid16(0x185B);
pub const RAS_CONTROL_POINT_CHARACTERISTIC: Uuid = Uuid::Uuid16(0x2C17);
pub const RAS_FEATURES_CHARACTERISTIC: Uuid = Uuid::Uuid16(0x2C14);
pub const REAL_TIME_RANGING_DATA_CHARACTERISTIC: Uuid = Uuid::Uuid16(0x2C15);

#[derive(Debug, Snafu)]
#[snafu(context(suffix(Error)))]
pub enum Error {
  #[snafu(display("unsupported control point op code {op_code:#04X}"))]
  OpCode { op_code: u8 },
  #[snafu(display("unsupported control point response op code {op_code:#04X}"))]
  ResponseOpCode { op_code: u8 },
  #[snafu(display("unknown step mode {mode:#04X}"))]
  StepMode { mode: u8 },
  #[snafu(display("ranging data truncated: need at least {need} bytes"))]
  Truncated { need: usize },
}

type Result<T = (), E = Error> = std::result::Result<T, E>;

/// The RAS Features characteristic value.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct RasFeatures(pub u32);

impl RasFeatures {
  pub const ABORT_OPERATION: Self = Self(1 << 2);
  pub const FILTER_RANGING_DATA: Self = Self(1 << 3);
  pub const REAL_TIME_RANGING_DATA: Self = Self(1 << 0);
  pub const RETRIEVE_LOST_RANGING_DATA_SEGMENTS: Self = Self(1 << 1);

  pub fn contains(self, other: Self) -> bool {
    self.0 & other.0 == other.0
  }
}

impl BitOr for RasFeatures {
  type Output = Self;

  fn bitor(self, other: Self) -> Self {
    Self(self.0 | other.0)
  }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct OpCode(pub u8);

impl OpCode {
  pub const ABORT_OPERATION: Self = Self(0x03);
  pub const ACK_RANGING_DATA: Self = Self(0x01);
  pub const GET_RANGING_DATA: Self = Self(0x00);
  pub const RETRIEVE_LOST_RANGING_DATA_SEGMENTS: Self = Self(0x02);
  pub const SET_FILTER: Self = Self(0x04);

  fn name(self) -> Option<&'static str> {
    match self {
      Self::ABORT_OPERATION => Some("ABORT_OPERATION"),
      Self::ACK_RANGING_DATA => Some("ACK_RANGING_DATA"),
      Self::GET_RANGING_DATA => Some("GET_RANGING_DATA"),
      Self::RETRIEVE_LOST_RANGING_DATA_SEGMENTS => Some("RETRIEVE_LOST_RANGING_DATA_SEGMENTS"),
      Self::SET_FILTER => Some("SET_FILTER"),
      _ => None,
    }
  }
}

impl Display for OpCode {
  fn fmt(&self, f: &mut Formatter) -> fmt::Result {
    match self.name() {
      Some(name) => write!(f, "{name}[0x{:02X}]", self.0),
      None => write!(f, "0x{:02X}", self.0),
    }
  }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ResponseOpCode(pub u8);

impl ResponseOpCode {
  pub const COMPLETE_LOST_RANGING_DATA_RESPONSE: Self = Self(0x01);
  pub const COMPLETE_RANGING_DATA_RESPONSE: Self = Self(0x00);
  pub const RESPONSE_CODE: Self = Self(0x02);

  fn name(self) -> Option<&'static str> {
    match self {
      Self::COMPLETE_LOST_RANGING_DATA_RESPONSE => Some("COMPLETE_LOST_RANGING_DATA_RESPONSE"),
      Self::COMPLETE_RANGING_DATA_RESPONSE => Some("COMPLETE_RANGING_DATA_RESPONSE"),
      Self::RESPONSE_CODE => Some("RESPONSE_CODE"),
      _ => None,
    }
  }
}

impl Display for ResponseOpCode {
  fn fmt(&self, f: &mut Formatter) -> fmt::Result {
    match self.name() {
      Some(name) => write!(f, "{name}[0x{:02X}]", self.0),
      None => write!(f, "0x{:02X}", self.0),
    }
  }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ResponseCode(pub u8);

impl ResponseCode {
  pub const ABORT_UNSUCCESSFUL: Self = Self(0x05);
  pub const INVALID_PARAMETER: Self = Self(0x03);
  pub const NO_RECORDS_FOUND: Self = Self(0x08);
  pub const OP_CODE_NOT_SUPPORTED: Self = Self(0x02);
  pub const PROCEDURE_NOT_COMPLETED: Self = Self(0x06);
  pub const SERVER_BUSY: Self = Self(0x07);
  pub const SUCCESS: Self = Self(0x01);
  pub const SUCCESS_PERSISTED: Self = Self(0x04);

  fn name(self) -> Option<&'static str> {
    match self {
      Self::ABORT_UNSUCCESSFUL => Some("ABORT_UNSUCCESSFUL"),
      Self::INVALID_PARAMETER => Some("INVALID_PARAMETER"),
      Self::NO_RECORDS_FOUND => Some("NO_RECORDS_FOUND"),
      Self::OP_CODE_NOT_SUPPORTED => Some("OP_CODE_NOT_SUPPORTED"),
      Self::PROCEDURE_NOT_COMPLETED => Some("PROCEDURE_NOT_COMPLETED"),
      Self::SERVER_BUSY => Some("SERVER_BUSY"),
      Self::SUCCESS => Some("SUCCESS"),
      Self::SUCCESS_PERSISTED => Some("SUCCESS_PERSISTED"),
      _ => None,
    }
  }
}

impl Display for ResponseCode {
  fn fmt(&self, f: &mut Formatter) -> fmt::Result {
    match self.name() {
      Some(name) => write!(f, "{name}[0x{:02X}]", self.0),
      None => write!(f, "0x{:02X}", self.0),
    }
  }
}

/// An operation written to the RAS Control Point. Multi-octet parameters
/// are little-endian.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Operation {
  GetRangingData {
    ranging_counter: u16,
  },
  AckRangingData {
    ranging_counter: u16,
  },
  RetrieveLostRangingDataSegments {
    ranging_counter: u16,
    first_segment_index: u8,
    last_segment_index: u8,
  },
  AbortOperation,
  SetFilter {
    filter_configuration: u16,
  },
}

impl Operation {
  pub fn op_code(&self) -> OpCode {
    match self {
      Self::GetRangingData { .. } => OpCode::GET_RANGING_DATA,
      Self::AckRangingData { .. } => OpCode::ACK_RANGING_DATA,
      Self::RetrieveLostRangingDataSegments { .. } => {
        OpCode::RETRIEVE_LOST_RANGING_DATA_SEGMENTS
      }
      Self::AbortOperation => OpCode::ABORT_OPERATION,
      Self::SetFilter { .. } => OpCode::SET_FILTER,
    }
  }

  pub fn to_bytes(&self) -> Vec<u8> {
    let mut out = vec![self.op_code().0];

    match self {
      Self::GetRangingData { ranging_counter } | Self::AckRangingData { ranging_counter } => {
        out.extend_from_slice(&ranging_counter.to_le_bytes());
      }
      Self::RetrieveLostRangingDataSegments {
        ranging_counter,
        first_segment_index,
        last_segment_index,
      } => {
        out.extend_from_slice(&ranging_counter.to_le_bytes());
        out.push(*first_segment_index);
        out.push(*last_segment_index);
      }
      Self::AbortOperation => {}
      Self::SetFilter {
        filter_configuration,
      } => {
        out.extend_from_slice(&filter_configuration.to_le_bytes());
      }
    }

    out
  }

  pub fn from_bytes(data: &[u8]) -> Result<Self> {
    let (&op_code, parameters) = data.split_first().context(TruncatedError { need: 1usize })?;

    match OpCode(op_code) {
      OpCode::GET_RANGING_DATA => {
        ensure!(parameters.len() >= 2, TruncatedError { need: 3usize });
        Ok(Self::GetRangingData {
          ranging_counter: u16::from_le_bytes([parameters[0], parameters[1]]),
        })
      }
      OpCode::ACK_RANGING_DATA => {
        ensure!(parameters.len() >= 2, TruncatedError { need: 3usize });
        Ok(Self::AckRangingData {
          ranging_counter: u16::from_le_bytes([parameters[0], parameters[1]]),
        })
      }
      OpCode::RETRIEVE_LOST_RANGING_DATA_SEGMENTS => {
        ensure!(parameters.len() >= 4, TruncatedError { need: 5usize });
        Ok(Self::RetrieveLostRangingDataSegments {
          ranging_counter: u16::from_le_bytes([parameters[0], parameters[1]]),
          first_segment_index: parameters[2],
          last_segment_index: parameters[3],
        })
      }
      OpCode::ABORT_OPERATION => Ok(Self::AbortOperation),
      OpCode::SET_FILTER => {
        ensure!(parameters.len() >= 2, TruncatedError { need: 3usize });
        Ok(Self::SetFilter {
          filter_configuration: u16::from_le_bytes([parameters[0], parameters[1]]),
        })
      }
      OpCode(op_code) => Err(Error::OpCode { op_code }),
    }
  }
}

/// An indication from the RAS Control Point answering an [`Operation`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum OperationResponse {
  CompleteRangingData {
    ranging_counter: u16,
  },
  CompleteLostRangingDataSegments {
    ranging_counter: u16,
    first_segment_index: u8,
    last_segment_index: u8,
  },
  ResponseCode {
    code: ResponseCode,
  },
}

impl OperationResponse {
  pub fn op_code(&self) -> ResponseOpCode {
    match self {
      Self::CompleteRangingData { .. } => ResponseOpCode::COMPLETE_RANGING_DATA_RESPONSE,
      Self::CompleteLostRangingDataSegments { .. } => {
        ResponseOpCode::COMPLETE_LOST_RANGING_DATA_RESPONSE
      }
      Self::ResponseCode { .. } => ResponseOpCode::RESPONSE_CODE,
    }
  }

  pub fn to_bytes(&self) -> Vec<u8> {
    let mut out = vec![self.op_code().0];

    match self {
      Self::CompleteRangingData { ranging_counter } => {
        out.extend_from_slice(&ranging_counter.to_le_bytes());
      }
      Self::CompleteLostRangingDataSegments {
        ranging_counter,
        first_segment_index,
        last_segment_index,
      } => {
        out.extend_from_slice(&ranging_counter.to_le_bytes());
        out.push(*first_segment_index);
        out.push(*last_segment_index);
      }
      Self::ResponseCode { code } => out.push(code.0),
    }

    out
  }

  pub fn from_bytes(data: &[u8]) -> Result<Self> {
    let (&op_code, parameters) = data.split_first().context(TruncatedError { need: 1usize })?;

    match ResponseOpCode(op_code) {
      ResponseOpCode::COMPLETE_RANGING_DATA_RESPONSE => {
        ensure!(parameters.len() >= 2, TruncatedError { need: 3usize });
        Ok(Self::CompleteRangingData {
          ranging_counter: u16::from_le_bytes([parameters[0], parameters[1]]),
        })
      }
      ResponseOpCode::COMPLETE_LOST_RANGING_DATA_RESPONSE => {
        ensure!(parameters.len() >= 4, TruncatedError { need: 5usize });
        Ok(Self::CompleteLostRangingDataSegments {
          ranging_counter: u16::from_le_bytes([parameters[0], parameters[1]]),
          first_segment_index: parameters[2],
          last_segment_index: parameters[3],
        })
      }
      ResponseOpCode::RESPONSE_CODE => {
        ensure!(!parameters.is_empty(), TruncatedError { need: 2usize });
        Ok(Self::ResponseCode {
          code: ResponseCode(parameters[0]),
        })
      }
      ResponseOpCode(op_code) => Err(Error::ResponseOpCode { op_code }),
    }
  }
}

/// The one-octet header prefixed to each notified segment of a ranging
/// data record.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct SegmentationHeader {
  pub is_first: bool,
  pub is_last: bool,
  pub segment_index: u8,
}

impl SegmentationHeader {
  pub fn to_byte(self) -> u8 {
    (self.segment_index & 0x3F) << 2
      | u8::from(self.is_first)
      | u8::from(self.is_last) << 1
  }

  pub fn from_byte(byte: u8) -> Self {
    Self {
      is_first: byte & 0x01 != 0,
      is_last: byte & 0x02 != 0,
      segment_index: byte >> 2,
    }
  }
}

/// The four-octet header opening a ranging data record: a 12-bit rolling
/// procedure counter and a 4-bit configuration id packed little-endian,
/// the selected TX power, and the antenna paths mask.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct RangingHeader {
  pub ranging_counter: u16,
  pub configuration_id: u8,
  pub selected_tx_power: i8,
  pub antenna_paths_mask: u8,
}

impl RangingHeader {
  pub fn to_bytes(&self) -> Vec<u8> {
    let packed = u16::from(self.configuration_id) << 12 | self.ranging_counter & 0x0FFF;

    let mut out = Vec::with_capacity(4);
    out.extend_from_slice(&packed.to_le_bytes());
    out.push(self.selected_tx_power as u8);
    out.push(self.antenna_paths_mask);
    out
  }

  pub fn from_bytes(data: &[u8]) -> Result<Self> {
    ensure!(data.len() >= 4, TruncatedError { need: 4usize });

    let packed = u16::from_le_bytes([data[0], data[1]]);

    Ok(Self {
      ranging_counter: packed & 0x0FFF,
      configuration_id: (packed >> 12) as u8,
      selected_tx_power: data[2] as i8,
      antenna_paths_mask: data[3],
    })
  }

  /// One antenna path per bit set in the mask.
  pub fn antenna_paths(&self) -> usize {
    self.antenna_paths_mask.count_ones() as usize
  }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CsRole {
  Initiator,
  Reflector,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RttType {
  AaOnly,
  SoundingSequence32Bit,
  SoundingSequence96Bit,
  RandomPayload32Bit,
  RandomPayload64Bit,
  RandomPayload96Bit,
  RandomPayload128Bit,
}

impl RttType {
  fn has_sounding_sequence(self) -> bool {
    matches!(self, Self::SoundingSequence32Bit | Self::SoundingSequence96Bit)
  }
}

/// The channel sounding parameters a ranging data record was produced
/// under. Step data lengths depend on them.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ChannelSoundingConfig {
  pub role: CsRole,
  pub rtt_type: RttType,
}

/// One channel sounding step: the mode octet followed by mode-specific
/// data whose length depends on the sounding configuration and the
/// number of antenna paths.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Step {
  pub mode: u8,
  pub data: Vec<u8>,
}

impl Step {
  pub fn to_bytes(&self) -> Vec<u8> {
    let mut out = Vec::with_capacity(1 + self.data.len());
    out.push(self.mode);
    out.extend_from_slice(&self.data);
    out
  }

  fn parse(data: &mut &[u8], config: ChannelSoundingConfig, antenna_paths: usize) -> Result<Self> {
    let (&mode, rest) = data.split_first().context(TruncatedError { need: 1usize })?;

    let length = match mode {
      0 => {
        if config.role == CsRole::Initiator {
          5
        } else {
          3
        }
      }
      1 => {
        if config.rtt_type.has_sounding_sequence() {
          12
        } else {
          6
        }
      }
      2 => (antenna_paths + 1) * 4 + 1,
      3 => {
        (antenna_paths + 1) * 4
          + if config.rtt_type.has_sounding_sequence() {
            13
          } else {
            7
          }
      }
      mode => return Err(Error::StepMode { mode }),
    };

    ensure!(rest.len() >= length, TruncatedError { need: length });

    let (step_data, rest) = rest.split_at(length);
    *data = rest;

    Ok(Self {
      mode,
      data: step_data.to_vec(),
    })
  }
}

/// One channel sounding subevent: an eight-octet header followed by the
/// reported steps.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Subevent {
  pub start_acl_connection_event: u16,
  pub frequency_compensation: u16,
  pub ranging_done_status: u8,
  pub subevent_done_status: u8,
  pub ranging_abort_reason: u8,
  pub subevent_abort_reason: u8,
  pub reference_power_level: i8,
  pub steps: Vec<Step>,
}

impl Subevent {
  pub fn to_bytes(&self) -> Vec<u8> {
    assert!(self.steps.len() <= 0xFF, "too many steps");

    let mut out = Vec::new();
    out.extend_from_slice(&self.start_acl_connection_event.to_le_bytes());
    out.extend_from_slice(&self.frequency_compensation.to_le_bytes());
    out.push(self.ranging_done_status | self.subevent_done_status << 4);
    out.push(self.ranging_abort_reason | self.subevent_abort_reason << 4);
    out.push(self.reference_power_level as u8);
    out.push(self.steps.len() as u8);

    for step in &self.steps {
      out.extend_from_slice(&step.to_bytes());
    }

    out
  }

  fn parse(data: &mut &[u8], config: ChannelSoundingConfig, antenna_paths: usize) -> Result<Self> {
    ensure!(data.len() >= 8, TruncatedError { need: 8usize });

    let (header, mut rest) = data.split_at(8);
    let num_steps = header[7];

    let mut steps = Vec::with_capacity(num_steps.into());
    for _ in 0..num_steps {
      steps.push(Step::parse(&mut rest, config, antenna_paths)?);
    }

    *data = rest;

    Ok(Self {
      start_acl_connection_event: u16::from_le_bytes([header[0], header[1]]),
      frequency_compensation: u16::from_le_bytes([header[2], header[3]]),
      ranging_done_status: header[4] & 0x0F,
      subevent_done_status: header[4] >> 4,
      ranging_abort_reason: header[5] & 0x0F,
      subevent_abort_reason: header[5] >> 4,
      reference_power_level: header[6] as i8,
      steps,
    })
  }
}

/// A complete ranging data record: the ranging header followed by
/// subevents until the record is exhausted.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RangingData {
  pub ranging_header: RangingHeader,
  pub subevents: Vec<Subevent>,
}

impl RangingData {
  pub fn to_bytes(&self) -> Vec<u8> {
    let mut out = self.ranging_header.to_bytes();

    for subevent in &self.subevents {
      out.extend_from_slice(&subevent.to_bytes());
    }

    out
  }

  pub fn from_bytes(data: &[u8], config: ChannelSoundingConfig) -> Result<Self> {
    let ranging_header = RangingHeader::from_bytes(data)?;
    let antenna_paths = ranging_header.antenna_paths();

    let mut rest = &data[4..];
    let mut subevents = Vec::new();

    while !rest.is_empty() {
      subevents.push(Subevent::parse(&mut rest, config, antenna_paths)?);
    }

    Ok(Self {
      ranging_header,
      subevents,
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  const INITIATOR_AA_ONLY: ChannelSoundingConfig = ChannelSoundingConfig {
    role: CsRole::Initiator,
    rtt_type: RttType::AaOnly,
  };

  const REFLECTOR_SOUNDING: ChannelSoundingConfig = ChannelSoundingConfig {
    role: CsRole::Reflector,
    rtt_type: RttType::SoundingSequence96Bit,
  };

  #[test]
  fn operation_wire_forms() {
    let operation = Operation::GetRangingData {
      ranging_counter: 0x0005,
    };
    assert_eq!(operation.to_bytes(), [0x00, 0x05, 0x00]);
    assert_eq!(Operation::from_bytes(&[0x00, 0x05, 0x00]).unwrap(), operation);

    let operation = Operation::RetrieveLostRangingDataSegments {
      ranging_counter: 0x1234,
      first_segment_index: 2,
      last_segment_index: 7,
    };
    assert_eq!(operation.to_bytes(), [0x02, 0x34, 0x12, 0x02, 0x07]);
    assert_eq!(
      Operation::from_bytes(&operation.to_bytes()).unwrap(),
      operation,
    );

    assert_eq!(Operation::AbortOperation.to_bytes(), [0x03]);
    assert_eq!(
      Operation::from_bytes(&[0x03]).unwrap(),
      Operation::AbortOperation,
    );

    let operation = Operation::SetFilter {
      filter_configuration: 0x0102,
    };
    assert_eq!(operation.to_bytes(), [0x04, 0x02, 0x01]);

    assert!(matches!(
      Operation::from_bytes(&[0x07]),
      Err(Error::OpCode { op_code: 0x07 }),
    ));
    assert!(matches!(
      Operation::from_bytes(&[]),
      Err(Error::Truncated { need: 1 }),
    ));
    assert!(matches!(
      Operation::from_bytes(&[0x00, 0x05]),
      Err(Error::Truncated { need: 3 }),
    ));
  }

  #[test]
  fn response_wire_forms() {
    let response = OperationResponse::CompleteRangingData {
      ranging_counter: 0x1234,
    };
    assert_eq!(response.to_bytes(), [0x00, 0x34, 0x12]);
    assert_eq!(
      OperationResponse::from_bytes(&response.to_bytes()).unwrap(),
      response,
    );

    let response = OperationResponse::ResponseCode {
      code: ResponseCode::NO_RECORDS_FOUND,
    };
    assert_eq!(response.to_bytes(), [0x02, 0x08]);
    assert_eq!(
      OperationResponse::from_bytes(&response.to_bytes()).unwrap(),
      response,
    );

    assert!(matches!(
      OperationResponse::from_bytes(&[0x05]),
      Err(Error::ResponseOpCode { op_code: 0x05 }),
    ));
  }

  #[test]
  fn segmentation_header() {
    let header = SegmentationHeader {
      is_first: true,
      is_last: true,
      segment_index: 5,
    };
    assert_eq!(header.to_byte(), 0x17);
    assert_eq!(SegmentationHeader::from_byte(0x17), header);

    let middle = SegmentationHeader {
      is_first: false,
      is_last: false,
      segment_index: 0x3F,
    };
    assert_eq!(middle.to_byte(), 0xFC);
    assert_eq!(SegmentationHeader::from_byte(0xFC), middle);
  }

  #[test]
  fn ranging_header_packs_twelve_bit_counter() {
    let header = RangingHeader {
      ranging_counter: 0x0ABC,
      configuration_id: 0x05,
      selected_tx_power: -20,
      antenna_paths_mask: 0b0000_0101,
    };

    let bytes = header.to_bytes();
    assert_eq!(bytes, [0xBC, 0x5A, 0xEC, 0x05]);

    let parsed = RangingHeader::from_bytes(&bytes).unwrap();
    assert_eq!(parsed, header);
    assert_eq!(parsed.ranging_counter, 0x0ABC);
    assert_eq!(parsed.antenna_paths(), 2);

    // Counters wrap at twelve bits.
    let wrapped = RangingHeader {
      ranging_counter: 0x1FFF,
      ..header
    };
    assert_eq!(
      RangingHeader::from_bytes(&wrapped.to_bytes())
        .unwrap()
        .ranging_counter,
      0x0FFF,
    );
  }

  #[test]
  fn ranging_data_round_trips() {
    let data = RangingData {
      ranging_header: RangingHeader {
        ranging_counter: 77,
        configuration_id: 1,
        selected_tx_power: 4,
        antenna_paths_mask: 0b0000_0101,
      },
      subevents: vec![Subevent {
        start_acl_connection_event: 0x0102,
        frequency_compensation: 0x0304,
        ranging_done_status: 0x0,
        subevent_done_status: 0x0,
        ranging_abort_reason: 0x0,
        subevent_abort_reason: 0x0,
        reference_power_level: -10,
        steps: vec![
          Step {
            mode: 0,
            data: vec![0; 5],
          },
          Step {
            mode: 1,
            data: vec![1; 6],
          },
          Step {
            mode: 2,
            data: vec![2; 13],
          },
          Step {
            mode: 3,
            data: vec![3; 19],
          },
        ],
      }],
    };

    let parsed = RangingData::from_bytes(&data.to_bytes(), INITIATOR_AA_ONLY).unwrap();
    assert_eq!(parsed, data);
  }

  #[test]
  fn step_lengths_follow_configuration() {
    // Mode 0 shrinks to three octets for a reflector; modes 1 and 3 grow
    // with a sounding sequence RTT type.
    let data = RangingData {
      ranging_header: RangingHeader {
        ranging_counter: 1,
        configuration_id: 0,
        selected_tx_power: 0,
        antenna_paths_mask: 0,
      },
      subevents: vec![Subevent {
        start_acl_connection_event: 1,
        frequency_compensation: 2,
        ranging_done_status: 0x1,
        subevent_done_status: 0x2,
        ranging_abort_reason: 0x3,
        subevent_abort_reason: 0x4,
        reference_power_level: 0,
        steps: vec![
          Step {
            mode: 0,
            data: vec![0; 3],
          },
          Step {
            mode: 1,
            data: vec![1; 12],
          },
          Step {
            mode: 3,
            data: vec![3; 17],
          },
        ],
      }],
    };

    let parsed = RangingData::from_bytes(&data.to_bytes(), REFLECTOR_SOUNDING).unwrap();
    assert_eq!(parsed, data);

    let subevent = &parsed.subevents[0];
    assert_eq!(subevent.ranging_done_status, 0x1);
    assert_eq!(subevent.subevent_done_status, 0x2);
    assert_eq!(subevent.ranging_abort_reason, 0x3);
    assert_eq!(subevent.subevent_abort_reason, 0x4);
  }

  #[test]
  fn malformed_ranging_data() {
    assert!(matches!(
      RangingData::from_bytes(&[0x00, 0x00], INITIATOR_AA_ONLY),
      Err(Error::Truncated { need: 4 }),
    ));

    // A subevent header claiming a step the data does not carry.
    let mut bytes = RangingHeader {
      ranging_counter: 0,
      configuration_id: 0,
      selected_tx_power: 0,
      antenna_paths_mask: 0,
    }
    .to_bytes();
    bytes.extend_from_slice(&[0x01, 0x00, 0x02, 0x00, 0x00, 0x00, 0x00, 0x01]);
    bytes.push(0x04);
    assert!(matches!(
      RangingData::from_bytes(&bytes, INITIATOR_AA_ONLY),
      Err(Error::StepMode { mode: 0x04 }),
    ));

    bytes.pop();
    bytes.push(0x00);
    assert!(matches!(
      RangingData::from_bytes(&bytes, INITIATOR_AA_ONLY),
      Err(Error::Truncated { need: 5 }),
    ));

    // Stray octets after the last subevent are not a valid header.
    let mut bytes = RangingData {
      ranging_header: RangingHeader {
        ranging_counter: 0,
        configuration_id: 0,
        selected_tx_power: 0,
        antenna_paths_mask: 0,
      },
      subevents: Vec::new(),
    }
    .to_bytes();
    bytes.extend_from_slice(&[0x01, 0x02, 0x03]);
    assert!(matches!(
      RangingData::from_bytes(&bytes, INITIATOR_AA_ONLY),
      Err(Error::Truncated { need: 8 }),
    ));
  }

  #[test]
  fn features() {
    let features = RasFeatures::REAL_TIME_RANGING_DATA | RasFeatures::ABORT_OPERATION;

    assert_eq!(features.0, 0x05);
    assert!(features.contains(RasFeatures::ABORT_OPERATION));
    assert!(!features.contains(RasFeatures::FILTER_RANGING_DATA));
  }
}

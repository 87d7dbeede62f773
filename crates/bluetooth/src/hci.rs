use super::*;

pub const VENDOR_OGF: u8 = 0x3F;
pub const VENDOR_EVENT_CODE: u8 = 0xFF;

#[derive(Debug, Snafu)]
#[snafu(context(suffix(Error)))]
pub enum Error {
  #[snafu(display("event code {code:#04X} is not a vendor event"))]
  NotVendor { code: u8 },
  #[snafu(display("parameter length {declared} does not match {actual} parameter bytes"))]
  ParameterLength { declared: usize, actual: usize },
  #[snafu(display("invalid role {value:#04X}"))]
  Role { value: u8 },
  #[snafu(display("vendor event carries no subevent code"))]
  Subevent,
  #[snafu(display("packet truncated: need at least {need} bytes"))]
  Truncated { need: usize },
}

/// HCI command opcode: opcode group in the top six bits, opcode command in
/// the bottom ten. Little-endian on the wire, like all HCI integers.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Opcode {
  pub ogf: u8,
  pub ocf: u16,
}

impl Opcode {
  pub fn new(ogf: u8, ocf: u16) -> Self {
    assert!(ogf < 0x40 && ocf < 0x400, "opcode field out of range");
    Self { ogf, ocf }
  }

  pub fn vendor(ocf: u16) -> Self {
    Self::new(VENDOR_OGF, ocf)
  }

  pub fn value(self) -> u16 {
    u16::from(self.ogf) << 10 | self.ocf
  }

  pub fn from_value(value: u16) -> Self {
    Self {
      ogf: (value >> 10) as u8,
      ocf: value & 0x03FF,
    }
  }
}

impl Display for Opcode {
  fn fmt(&self, f: &mut Formatter) -> fmt::Result {
    write!(f, "0x{:04X}", self.value())
  }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Command {
  pub opcode: Opcode,
  pub parameters: Vec<u8>,
}

impl Command {
  pub fn to_bytes(&self) -> Vec<u8> {
    assert!(self.parameters.len() <= 0xFF, "command parameters too long");

    let mut out = Vec::with_capacity(3 + self.parameters.len());
    out.extend_from_slice(&self.opcode.value().to_le_bytes());
    out.push(self.parameters.len() as u8);
    out.extend_from_slice(&self.parameters);
    out
  }

  pub fn from_bytes(data: &[u8]) -> Result<Self, Error> {
    ensure!(data.len() >= 3, TruncatedError { need: 3usize });

    let declared = usize::from(data[2]);
    let actual = data.len() - 3;

    ensure!(declared == actual, ParameterLengthError { declared, actual });

    Ok(Self {
      opcode: Opcode::from_value(u16::from_le_bytes([data[0], data[1]])),
      parameters: data[3..].to_vec(),
    })
  }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Event {
  pub code: u8,
  pub parameters: Vec<u8>,
}

impl Event {
  pub fn to_bytes(&self) -> Vec<u8> {
    assert!(self.parameters.len() <= 0xFF, "event parameters too long");

    let mut out = Vec::with_capacity(2 + self.parameters.len());
    out.push(self.code);
    out.push(self.parameters.len() as u8);
    out.extend_from_slice(&self.parameters);
    out
  }

  pub fn from_bytes(data: &[u8]) -> Result<Self, Error> {
    ensure!(data.len() >= 2, TruncatedError { need: 2usize });

    let declared = usize::from(data[1]);
    let actual = data.len() - 2;

    ensure!(declared == actual, ParameterLengthError { declared, actual });

    Ok(Self {
      code: data[0],
      parameters: data[2..].to_vec(),
    })
  }
}

/// A vendor-specific event: event code 0xFF, first parameter octet the
/// subevent code.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct VendorEvent {
  pub subevent: u8,
  pub parameters: Vec<u8>,
}

impl VendorEvent {
  pub fn to_event(&self) -> Event {
    let mut parameters = Vec::with_capacity(1 + self.parameters.len());
    parameters.push(self.subevent);
    parameters.extend_from_slice(&self.parameters);

    Event {
      code: VENDOR_EVENT_CODE,
      parameters,
    }
  }
}

impl TryFrom<&Event> for VendorEvent {
  type Error = Error;

  fn try_from(event: &Event) -> Result<Self, Self::Error> {
    ensure!(
      event.code == VENDOR_EVENT_CODE,
      NotVendorError { code: event.code },
    );

    let (subevent, parameters) = event.parameters.split_first().context(SubeventError)?;

    Ok(Self {
      subevent: *subevent,
      parameters: parameters.to_vec(),
    })
  }
}

/// A device address followed by an address type octet, the layout vendor
/// events carry peer identities in.
pub fn parse_address_with_type(data: &[u8]) -> Result<(Address, u8), Error> {
  ensure!(data.len() >= 7, TruncatedError { need: 7usize });

  Ok((
    Address::from_le_bytes(data[..6].try_into().unwrap()),
    data[6],
  ))
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Role {
  Central = 0,
  Peripheral = 1,
}

impl TryFrom<u8> for Role {
  type Error = Error;

  fn try_from(value: u8) -> Result<Self, Self::Error> {
    match value {
      0 => Ok(Self::Central),
      1 => Ok(Self::Peripheral),
      _ => Err(Error::Role { value }),
    }
  }
}

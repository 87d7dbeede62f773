use super::*;

#[derive(Debug, Snafu)]
#[snafu(context(suffix(Error)))]
pub enum Error {
  #[snafu(display("invalid UUID digits `{input}`"))]
  Digits {
    input: String,
    source: ParseIntError,
  },
  #[snafu(display("invalid UUID `{input}`"))]
  Form { input: String },
  #[snafu(display("invalid UUID length {len}: expected 2, 4, or 16 octets"))]
  WireLength { len: usize },
}

/// A Bluetooth UUID in 16, 32, or 128-bit form. 16 and 32-bit values expand
/// onto the Bluetooth Base UUID; equality compares expanded values.
#[derive(Clone, Copy, Debug)]
pub enum Uuid {
  Uuid16(u16),
  Uuid32(u32),
  Uuid128(u128),
}

impl Uuid {
  pub const BASE: u128 = 0x00000000_0000_1000_8000_00805F9B34FB;

  pub const SDP_PROTOCOL: Self = Self::Uuid16(0x0001);
  pub const RFCOMM_PROTOCOL: Self = Self::Uuid16(0x0003);
  pub const OBEX_PROTOCOL: Self = Self::Uuid16(0x0008);
  pub const BNEP_PROTOCOL: Self = Self::Uuid16(0x000F);
  pub const HIDP_PROTOCOL: Self = Self::Uuid16(0x0011);
  pub const L2CAP_PROTOCOL: Self = Self::Uuid16(0x0100);

  pub const PUBLIC_BROWSE_ROOT: Self = Self::Uuid16(0x1002);

  pub const OBJECT_PUSH_SERVICE: Self = Self::Uuid16(0x1105);
  pub const PANU_SERVICE: Self = Self::Uuid16(0x1115);
  pub const NAP_SERVICE: Self = Self::Uuid16(0x1116);
  pub const GN_SERVICE: Self = Self::Uuid16(0x1117);
  pub const HUMAN_INTERFACE_DEVICE_SERVICE: Self = Self::Uuid16(0x1124);
  pub const PHONEBOOK_ACCESS_PCE_SERVICE: Self = Self::Uuid16(0x112E);
  pub const PHONEBOOK_ACCESS_PSE_SERVICE: Self = Self::Uuid16(0x112F);
  pub const PHONEBOOK_ACCESS_SERVICE: Self = Self::Uuid16(0x1130);
  pub const MESSAGE_ACCESS_SERVER_SERVICE: Self = Self::Uuid16(0x1132);
  pub const MESSAGE_NOTIFICATION_SERVER_SERVICE: Self = Self::Uuid16(0x1133);
  pub const MESSAGE_ACCESS_SERVICE: Self = Self::Uuid16(0x1134);

  pub fn as_u128(self) -> u128 {
    match self {
      Self::Uuid16(value) => u128::from(value) << 96 | Self::BASE,
      Self::Uuid32(value) => u128::from(value) << 96 | Self::BASE,
      Self::Uuid128(value) => value,
    }
  }

  /// Shortest big-endian wire form, as carried in SDP data elements.
  pub fn to_be_bytes(self) -> Vec<u8> {
    match self {
      Self::Uuid16(value) => value.to_be_bytes().into(),
      Self::Uuid32(value) => value.to_be_bytes().into(),
      Self::Uuid128(value) => value.to_be_bytes().into(),
    }
  }

  /// Shortest little-endian wire form, as carried in BNEP connection setup
  /// payloads.
  pub fn to_le_bytes(self) -> Vec<u8> {
    let mut bytes = self.to_be_bytes();
    bytes.reverse();
    bytes
  }

  pub fn from_be_bytes(bytes: &[u8]) -> Result<Self, Error> {
    match bytes.len() {
      2 => Ok(Self::Uuid16(u16::from_be_bytes(bytes.try_into().unwrap()))),
      4 => Ok(Self::Uuid32(u32::from_be_bytes(bytes.try_into().unwrap()))),
      16 => Ok(Self::Uuid128(u128::from_be_bytes(
        bytes.try_into().unwrap(),
      ))),
      len => Err(Error::WireLength { len }),
    }
  }

  pub fn from_le_bytes(bytes: &[u8]) -> Result<Self, Error> {
    let mut bytes = bytes.to_vec();
    bytes.reverse();
    Self::from_be_bytes(&bytes)
  }
}

impl PartialEq for Uuid {
  fn eq(&self, other: &Self) -> bool {
    self.as_u128() == other.as_u128()
  }
}

impl Eq for Uuid {}

impl Display for Uuid {
  fn fmt(&self, f: &mut Formatter) -> fmt::Result {
    match self {
      Self::Uuid16(value) => write!(f, "0x{value:04X}"),
      Self::Uuid32(value) => write!(f, "0x{value:08X}"),
      Self::Uuid128(value) => write!(
        f,
        "{:08x}-{:04x}-{:04x}-{:04x}-{:012x}",
        (value >> 96) as u32,
        (value >> 80) as u16,
        (value >> 64) as u16,
        (value >> 48) as u16,
        value & 0xFFFF_FFFF_FFFF,
      ),
    }
  }
}

impl FromStr for Uuid {
  type Err = Error;

  fn from_str(input: &str) -> Result<Self, Self::Err> {
    if input.contains('-') {
      let hyphens = [8, 13, 18, 23];

      ensure!(
        input.len() == 36 && hyphens.iter().all(|i| input.as_bytes()[*i] == b'-'),
        FormError { input },
      );

      let digits = input.replace('-', "");

      return Ok(Self::Uuid128(
        u128::from_str_radix(&digits, 16).context(DigitsError { input })?,
      ));
    }

    let digits = input.strip_prefix("0x").unwrap_or(input);

    match digits.len() {
      4 => Ok(Self::Uuid16(
        u16::from_str_radix(digits, 16).context(DigitsError { input })?,
      )),
      8 => Ok(Self::Uuid32(
        u32::from_str_radix(digits, 16).context(DigitsError { input })?,
      )),
      _ => Err(Error::Form { input: input.into() }),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn expansion() {
    assert_eq!(
      Uuid::Uuid16(0x1105).as_u128(),
      0x00001105_0000_1000_8000_00805F9B34FB,
    );

    assert_eq!(
      Uuid::Uuid16(0x1105),
      Uuid::Uuid128(0x00001105_0000_1000_8000_00805F9B34FB),
    );

    assert_eq!(Uuid::Uuid16(0x1105), Uuid::Uuid32(0x00001105));

    assert_ne!(Uuid::Uuid16(0x1105), Uuid::Uuid16(0x1106));
  }

  #[test]
  fn wire_order() {
    assert_eq!(Uuid::Uuid16(0x1115).to_be_bytes(), [0x11, 0x15]);
    assert_eq!(Uuid::Uuid16(0x1115).to_le_bytes(), [0x15, 0x11]);

    assert_eq!(
      Uuid::from_le_bytes(&[0x15, 0x11]).unwrap(),
      Uuid::Uuid16(0x1115),
    );

    assert!(matches!(
      Uuid::from_be_bytes(&[1, 2, 3]),
      Err(Error::WireLength { len: 3 }),
    ));
  }

  #[test]
  fn from_str() {
    #[track_caller]
    fn case(s: &str, uuid: Uuid) {
      assert_eq!(s.parse::<Uuid>().unwrap(), uuid);
      assert_eq!(uuid.to_string(), s);
    }

    case("0x1105", Uuid::Uuid16(0x1105));
    case("0x12345678", Uuid::Uuid32(0x12345678));
    case(
      "796135f0-f0c5-11d8-0966-0800200c9a66",
      Uuid::Uuid128(0x796135f0_f0c5_11d8_0966_0800200c9a66),
    );

    assert!(matches!(
      "0x123".parse::<Uuid>(),
      Err(Error::Form { .. }),
    ));

    assert!(matches!(
      "796135f0f0c511d809660800200c9a66".parse::<Uuid>(),
      Err(Error::Form { .. }),
    ));
  }
}

use super::*;

#[derive(Debug, Snafu)]
#[snafu(context(suffix(Error)))]
pub enum Error {
  #[snafu(display("invalid address digits `{input}`"))]
  Digits {
    input: String,
    source: hex::FromHexError,
  },
  #[snafu(display("invalid address `{input}`: expected {} octets", Address::LEN))]
  Length { input: String },
}

/// A 6-octet Bluetooth device address, stored in display order, most
/// significant octet first.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Address([u8; Address::LEN]);

impl Address {
  pub const ANY: Self = Self([0; Self::LEN]);
  pub const LEN: usize = 6;

  pub fn as_bytes(&self) -> &[u8; Self::LEN] {
    &self.0
  }

  /// Wire order on HCI and BNEP setup payloads, least significant octet
  /// first.
  pub fn to_le_bytes(self) -> [u8; Self::LEN] {
    let mut bytes = self.0;
    bytes.reverse();
    bytes
  }

  pub fn from_le_bytes(mut bytes: [u8; Self::LEN]) -> Self {
    bytes.reverse();
    Self(bytes)
  }

  /// A random static address: top two bits of the most significant octet
  /// set, the rest random.
  pub fn random_static() -> Self {
    let mut bytes: [u8; Self::LEN] = rand::random();
    bytes[0] |= 0xC0;
    Self(bytes)
  }
}

impl From<[u8; Address::LEN]> for Address {
  fn from(bytes: [u8; Address::LEN]) -> Self {
    Self(bytes)
  }
}

impl Display for Address {
  fn fmt(&self, f: &mut Formatter) -> fmt::Result {
    for (i, octet) in self.0.iter().enumerate() {
      if i > 0 {
        write!(f, ":")?;
      }
      write!(f, "{octet:02X}")?;
    }
    Ok(())
  }
}

impl FromStr for Address {
  type Err = Error;

  fn from_str(input: &str) -> Result<Self, Self::Err> {
    let digits = input.replace(':', "");

    let bytes = hex::decode(&digits).context(DigitsError { input })?;

    Ok(Self(
      bytes
        .try_into()
        .map_err(|_| Error::Length { input: input.into() })?,
    ))
  }
}

impl<'de> Deserialize<'de> for Address {
  fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
  where
    D: serde::Deserializer<'de>,
  {
    String::deserialize(deserializer)?
      .parse()
      .map_err(serde::de::Error::custom)
  }
}

impl Serialize for Address {
  fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
  where
    S: Serializer,
  {
    serializer.collect_str(self)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn from_str() {
    #[track_caller]
    fn case(s: &str, address: Address) {
      assert_eq!(s.parse::<Address>().unwrap(), address);
      assert_eq!(address.to_string(), s);
    }

    case(
      "00:11:22:33:44:55",
      Address::from([0x00, 0x11, 0x22, 0x33, 0x44, 0x55]),
    );

    case(
      "F8:0F:F9:72:EA:4C",
      Address::from([0xF8, 0x0F, 0xF9, 0x72, 0xEA, 0x4C]),
    );

    assert_eq!(
      "f80ff972ea4c".parse::<Address>().unwrap(),
      Address::from([0xF8, 0x0F, 0xF9, 0x72, 0xEA, 0x4C]),
    );

    assert!(matches!(
      "00:11:22:33:44".parse::<Address>(),
      Err(Error::Length { .. }),
    ));

    assert!(matches!(
      "00:11:22:33:44:5g".parse::<Address>(),
      Err(Error::Digits { .. }),
    ));
  }

  #[test]
  fn wire_order() {
    let address = "01:02:03:04:05:06".parse::<Address>().unwrap();

    assert_eq!(address.to_le_bytes(), [6, 5, 4, 3, 2, 1]);

    assert_eq!(Address::from_le_bytes([6, 5, 4, 3, 2, 1]), address);
  }

  #[test]
  fn random_static() {
    for _ in 0..16 {
      let address = Address::random_static();
      assert_eq!(address.as_bytes()[0] & 0xC0, 0xC0);
    }
  }

  #[test]
  fn serde() {
    let address = "F8:0F:F9:72:EA:4C".parse::<Address>().unwrap();

    let json = serde_json::to_string(&address).unwrap();

    assert_eq!(json, "\"F8:0F:F9:72:EA:4C\"");

    assert_eq!(serde_json::from_str::<Address>(&json).unwrap(), address);
  }
}

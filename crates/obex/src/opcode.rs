use super::*;

/// OBEX operation code, without the final bit.
///
/// Open set: unknown opcodes survive parsing so a server can answer them
/// with `NOT_IMPLEMENTED`.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Opcode(pub u8);

impl Opcode {
  pub const ABORT: Self = Self(0x7F);
  pub const ACTION: Self = Self(0x06);
  pub const CONNECT: Self = Self(0x00);
  pub const DISCONNECT: Self = Self(0x01);
  pub const GET: Self = Self(0x03);
  pub const PUT: Self = Self(0x02);
  pub const SESSION: Self = Self(0x07);
  pub const SETPATH: Self = Self(0x05);

  fn name(self) -> Option<&'static str> {
    match self {
      Self::ABORT => Some("ABORT"),
      Self::ACTION => Some("ACTION"),
      Self::CONNECT => Some("CONNECT"),
      Self::DISCONNECT => Some("DISCONNECT"),
      Self::GET => Some("GET"),
      Self::PUT => Some("PUT"),
      Self::SESSION => Some("SESSION"),
      Self::SETPATH => Some("SETPATH"),
      _ => None,
    }
  }
}

impl Display for Opcode {
  fn fmt(&self, f: &mut Formatter) -> fmt::Result {
    match self.name() {
      Some(name) => write!(f, "{name}[0x{:02X}]", self.0),
      None => write!(f, "0x{:02X}", self.0),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn display() {
    assert_eq!(Opcode::CONNECT.to_string(), "CONNECT[0x00]");
    assert_eq!(Opcode::ABORT.to_string(), "ABORT[0x7F]");
    assert_eq!(Opcode(0x44).to_string(), "0x44");
  }
}

use super::*;

/// OBEX response code, without the final bit. See OBEX 1.5 section 3.2.1.
///
/// Open set, like [`Opcode`]: codes a peer sends that this crate does not
/// know about are preserved rather than rejected.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct ResponseCode(pub u8);

impl ResponseCode {
  pub const ACCEPTED: Self = Self(0x22);
  pub const BAD_GATEWAY: Self = Self(0x52);
  pub const BAD_REQUEST: Self = Self(0x40);
  pub const CONFLICT: Self = Self(0x49);
  pub const CONTINUE: Self = Self(0x10);
  pub const CREATED: Self = Self(0x21);
  pub const DATABASE_FULL: Self = Self(0x60);
  pub const DATABASE_LOCKED: Self = Self(0x61);
  pub const FORBIDDEN: Self = Self(0x43);
  pub const GATEWAY_TIMEOUT: Self = Self(0x54);
  pub const GONE: Self = Self(0x4A);
  pub const HTTP_VERSION_NOT_SUPPORTED: Self = Self(0x55);
  pub const INTERNAL_SERVER_ERROR: Self = Self(0x50);
  pub const LENGTH_REQUIRED: Self = Self(0x4B);
  pub const METHOD_NOT_ALLOWED: Self = Self(0x45);
  pub const MOVED_PERMANENTLY: Self = Self(0x31);
  pub const MOVED_TEMPORARILY: Self = Self(0x32);
  pub const MULTIPLE_CHOICES: Self = Self(0x30);
  pub const NON_AUTHORITATIVE_INFORMATION: Self = Self(0x23);
  pub const NOT_ACCEPTABLE: Self = Self(0x46);
  pub const NOT_FOUND: Self = Self(0x44);
  pub const NOT_IMPLEMENTED: Self = Self(0x51);
  pub const NOT_MODIFIED: Self = Self(0x34);
  pub const NO_CONTENT: Self = Self(0x24);
  pub const PARTIAL_CONTENT: Self = Self(0x26);
  pub const PAYMENT_REQUIRED: Self = Self(0x42);
  pub const PRECONDITION_FAILED: Self = Self(0x4C);
  pub const PROXY_AUTHENTICATION_REQUIRED: Self = Self(0x47);
  pub const REQUESTED_ENTITY_TOO_LARGE: Self = Self(0x4D);
  pub const REQUEST_TIME_OUT: Self = Self(0x48);
  pub const REQUEST_URL_TOO_LARGE: Self = Self(0x4E);
  pub const RESET_CONTENT: Self = Self(0x25);
  pub const SEE_OTHER: Self = Self(0x33);
  pub const SERVICE_UNAVAILABLE: Self = Self(0x53);
  pub const SUCCESS: Self = Self(0x20);
  pub const UNAUTHORIZED: Self = Self(0x41);
  pub const UNSUPPORTED_MEDIA_TYPE: Self = Self(0x4F);
  pub const USE_PROXY: Self = Self(0x35);

  fn name(self) -> Option<&'static str> {
    match self {
      Self::ACCEPTED => Some("ACCEPTED"),
      Self::BAD_GATEWAY => Some("BAD_GATEWAY"),
      Self::BAD_REQUEST => Some("BAD_REQUEST"),
      Self::CONFLICT => Some("CONFLICT"),
      Self::CONTINUE => Some("CONTINUE"),
      Self::CREATED => Some("CREATED"),
      Self::DATABASE_FULL => Some("DATABASE_FULL"),
      Self::DATABASE_LOCKED => Some("DATABASE_LOCKED"),
      Self::FORBIDDEN => Some("FORBIDDEN"),
      Self::GATEWAY_TIMEOUT => Some("GATEWAY_TIMEOUT"),
      Self::GONE => Some("GONE"),
      Self::HTTP_VERSION_NOT_SUPPORTED => Some("HTTP_VERSION_NOT_SUPPORTED"),
      Self::INTERNAL_SERVER_ERROR => Some("INTERNAL_SERVER_ERROR"),
      Self::LENGTH_REQUIRED => Some("LENGTH_REQUIRED"),
      Self::METHOD_NOT_ALLOWED => Some("METHOD_NOT_ALLOWED"),
      Self::MOVED_PERMANENTLY => Some("MOVED_PERMANENTLY"),
      Self::MOVED_TEMPORARILY => Some("MOVED_TEMPORARILY"),
      Self::MULTIPLE_CHOICES => Some("MULTIPLE_CHOICES"),
      Self::NON_AUTHORITATIVE_INFORMATION => {
        Some("NON_AUTHORITATIVE_INFORMATION")
      }
      Self::NOT_ACCEPTABLE => Some("NOT_ACCEPTABLE"),
      Self::NOT_FOUND => Some("NOT_FOUND"),
      Self::NOT_IMPLEMENTED => Some("NOT_IMPLEMENTED"),
      Self::NOT_MODIFIED => Some("NOT_MODIFIED"),
      Self::NO_CONTENT => Some("NO_CONTENT"),
      Self::PARTIAL_CONTENT => Some("PARTIAL_CONTENT"),
      Self::PAYMENT_REQUIRED => Some("PAYMENT_REQUIRED"),
      Self::PRECONDITION_FAILED => Some("PRECONDITION_FAILED"),
      Self::PROXY_AUTHENTICATION_REQUIRED => {
        Some("PROXY_AUTHENTICATION_REQUIRED")
      }
      Self::REQUESTED_ENTITY_TOO_LARGE => Some("REQUESTED_ENTITY_TOO_LARGE"),
      Self::REQUEST_TIME_OUT => Some("REQUEST_TIME_OUT"),
      Self::REQUEST_URL_TOO_LARGE => Some("REQUEST_URL_TOO_LARGE"),
      Self::RESET_CONTENT => Some("RESET_CONTENT"),
      Self::SEE_OTHER => Some("SEE_OTHER"),
      Self::SERVICE_UNAVAILABLE => Some("SERVICE_UNAVAILABLE"),
      Self::SUCCESS => Some("SUCCESS"),
      Self::UNAUTHORIZED => Some("UNAUTHORIZED"),
      Self::UNSUPPORTED_MEDIA_TYPE => Some("UNSUPPORTED_MEDIA_TYPE"),
      Self::USE_PROXY => Some("USE_PROXY"),
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

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn display() {
    assert_eq!(ResponseCode::SUCCESS.to_string(), "SUCCESS[0x20]");
    assert_eq!(
      ResponseCode::DATABASE_LOCKED.to_string(),
      "DATABASE_LOCKED[0x61]",
    );
    assert_eq!(ResponseCode(0x7E).to_string(), "0x7E");
  }
}

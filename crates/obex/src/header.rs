use super::*;

/// OBEX header identifier. The top two bits select the value encoding:
/// `00` null-terminated UTF-16BE text, `01` byte sequence, `10` one byte,
/// `11` four bytes big-endian.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct HeaderIdentifier(pub u8);

impl HeaderIdentifier {
  pub const ACTION_ID: Self = Self(0x94);
  pub const APP_PARAMETERS: Self = Self(0x4C);
  pub const AUTH_CHALLENGE: Self = Self(0x4D);
  pub const AUTH_RESPONSE: Self = Self(0x4E);
  pub const BODY: Self = Self(0x48);
  pub const CONNECTION_ID: Self = Self(0xCB);
  pub const COUNT: Self = Self(0xC0);
  pub const CREATOR_ID: Self = Self(0xCF);
  pub const DESCRIPTION: Self = Self(0x05);
  pub const DEST_NAME: Self = Self(0x15);
  pub const END_OF_BODY: Self = Self(0x49);
  pub const HTTP: Self = Self(0x47);
  pub const LENGTH: Self = Self(0xC3);
  pub const NAME: Self = Self(0x01);
  pub const OBJECT_CLASS: Self = Self(0x51);
  pub const PERMISSIONS: Self = Self(0xD6);
  pub const SESSION_PARAMETERS: Self = Self(0x52);
  pub const SESSION_SEQUENCE_NUMBER: Self = Self(0x93);
  pub const SINGLE_RESPONSE_MODE: Self = Self(0x97);
  pub const SINGLE_RESPONSE_MODE_PARAMETERS: Self = Self(0x98);
  pub const TARGET: Self = Self(0x46);
  pub const TIME: Self = Self(0x44);
  pub const TYPE: Self = Self(0x42);
  pub const WAN_UUID: Self = Self(0x50);
  pub const WHO: Self = Self(0x4A);

  fn name(self) -> Option<&'static str> {
    match self {
      Self::ACTION_ID => Some("ACTION_ID"),
      Self::APP_PARAMETERS => Some("APP_PARAMETERS"),
      Self::AUTH_CHALLENGE => Some("AUTH_CHALLENGE"),
      Self::AUTH_RESPONSE => Some("AUTH_RESPONSE"),
      Self::BODY => Some("BODY"),
      Self::CONNECTION_ID => Some("CONNECTION_ID"),
      Self::COUNT => Some("COUNT"),
      Self::CREATOR_ID => Some("CREATOR_ID"),
      Self::DESCRIPTION => Some("DESCRIPTION"),
      Self::DEST_NAME => Some("DEST_NAME"),
      Self::END_OF_BODY => Some("END_OF_BODY"),
      Self::HTTP => Some("HTTP"),
      Self::LENGTH => Some("LENGTH"),
      Self::NAME => Some("NAME"),
      Self::OBJECT_CLASS => Some("OBJECT_CLASS"),
      Self::PERMISSIONS => Some("PERMISSIONS"),
      Self::SESSION_PARAMETERS => Some("SESSION_PARAMETERS"),
      Self::SESSION_SEQUENCE_NUMBER => Some("SESSION_SEQUENCE_NUMBER"),
      Self::SINGLE_RESPONSE_MODE => Some("SINGLE_RESPONSE_MODE"),
      Self::SINGLE_RESPONSE_MODE_PARAMETERS => {
        Some("SINGLE_RESPONSE_MODE_PARAMETERS")
      }
      Self::TARGET => Some("TARGET"),
      Self::TIME => Some("TIME"),
      Self::TYPE => Some("TYPE"),
      Self::WAN_UUID => Some("WAN_UUID"),
      Self::WHO => Some("WHO"),
      _ => None,
    }
  }
}

impl Display for HeaderIdentifier {
  fn fmt(&self, f: &mut Formatter) -> fmt::Result {
    match self.name() {
      Some(name) => write!(f, "{name}[0x{:02X}]", self.0),
      None => write!(f, "0x{:02X}", self.0),
    }
  }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[repr(u8)]
pub enum SingleResponseMode {
  Disabled = 0x00,
  Enabled = 0x01,
  Supported = 0x02,
}

/// The headers of a single OBEX packet, one optional slot per identifier.
///
/// `to_bytes` emits headers in declaration order, which keeps `NAME` and
/// `TYPE` ahead of `BODY` the way peers expect.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Headers {
  pub count: Option<u32>,
  pub name: Option<String>,
  pub ty: Option<Vec<u8>>,
  pub length: Option<u32>,
  pub time: Option<Vec<u8>>,
  pub description: Option<String>,
  pub target: Option<Vec<u8>>,
  pub http: Option<Vec<u8>>,
  pub body: Option<Vec<u8>>,
  pub end_of_body: Option<Vec<u8>>,
  pub who: Option<Vec<u8>>,
  pub connection_id: Option<u32>,
  pub app_parameters: Option<Vec<u8>>,
  pub auth_challenge: Option<Vec<u8>>,
  pub auth_response: Option<Vec<u8>>,
  pub creator_id: Option<u32>,
  pub wan_uuid: Option<Vec<u8>>,
  pub object_class: Option<Vec<u8>>,
  pub session_parameters: Option<Vec<u8>>,
  pub session_sequence_number: Option<u8>,
  pub action_id: Option<u8>,
  pub dest_name: Option<String>,
  pub permissions: Option<u32>,
  pub single_response_mode: Option<u8>,
  pub single_response_mode_parameters: Option<u8>,
}

impl Headers {
  pub fn to_bytes(&self) -> Vec<u8> {
    let mut bytes = Vec::new();

    put_u32(&mut bytes, HeaderIdentifier::COUNT, self.count);
    put_text(&mut bytes, HeaderIdentifier::NAME, self.name.as_deref());
    put_bytes(&mut bytes, HeaderIdentifier::TYPE, self.ty.as_deref());
    put_u32(&mut bytes, HeaderIdentifier::LENGTH, self.length);
    put_bytes(&mut bytes, HeaderIdentifier::TIME, self.time.as_deref());
    put_text(
      &mut bytes,
      HeaderIdentifier::DESCRIPTION,
      self.description.as_deref(),
    );
    put_bytes(&mut bytes, HeaderIdentifier::TARGET, self.target.as_deref());
    put_bytes(&mut bytes, HeaderIdentifier::HTTP, self.http.as_deref());
    put_bytes(&mut bytes, HeaderIdentifier::BODY, self.body.as_deref());
    put_bytes(
      &mut bytes,
      HeaderIdentifier::END_OF_BODY,
      self.end_of_body.as_deref(),
    );
    put_bytes(&mut bytes, HeaderIdentifier::WHO, self.who.as_deref());
    put_u32(
      &mut bytes,
      HeaderIdentifier::CONNECTION_ID,
      self.connection_id,
    );
    put_bytes(
      &mut bytes,
      HeaderIdentifier::APP_PARAMETERS,
      self.app_parameters.as_deref(),
    );
    put_bytes(
      &mut bytes,
      HeaderIdentifier::AUTH_CHALLENGE,
      self.auth_challenge.as_deref(),
    );
    put_bytes(
      &mut bytes,
      HeaderIdentifier::AUTH_RESPONSE,
      self.auth_response.as_deref(),
    );
    put_u32(&mut bytes, HeaderIdentifier::CREATOR_ID, self.creator_id);
    put_bytes(
      &mut bytes,
      HeaderIdentifier::WAN_UUID,
      self.wan_uuid.as_deref(),
    );
    put_bytes(
      &mut bytes,
      HeaderIdentifier::OBJECT_CLASS,
      self.object_class.as_deref(),
    );
    put_bytes(
      &mut bytes,
      HeaderIdentifier::SESSION_PARAMETERS,
      self.session_parameters.as_deref(),
    );
    put_u8(
      &mut bytes,
      HeaderIdentifier::SESSION_SEQUENCE_NUMBER,
      self.session_sequence_number,
    );
    put_u8(&mut bytes, HeaderIdentifier::ACTION_ID, self.action_id);
    put_text(
      &mut bytes,
      HeaderIdentifier::DEST_NAME,
      self.dest_name.as_deref(),
    );
    put_u32(&mut bytes, HeaderIdentifier::PERMISSIONS, self.permissions);
    put_u8(
      &mut bytes,
      HeaderIdentifier::SINGLE_RESPONSE_MODE,
      self.single_response_mode,
    );
    put_u8(
      &mut bytes,
      HeaderIdentifier::SINGLE_RESPONSE_MODE_PARAMETERS,
      self.single_response_mode_parameters,
    );

    bytes
  }

  pub fn from_bytes(data: &[u8]) -> Result<Self> {
    Self::parse(data, 0)
  }

  pub(crate) fn parse(data: &[u8], mut offset: usize) -> Result<Self> {
    let mut headers = Self::default();

    while offset < data.len() {
      let id = HeaderIdentifier(data[offset]);
      offset += 1;

      match id {
        HeaderIdentifier::COUNT => {
          headers.count = Some(take_u32(data, &mut offset)?);
        }
        HeaderIdentifier::NAME => {
          headers.name = Some(take_text(data, &mut offset)?);
        }
        HeaderIdentifier::TYPE => {
          headers.ty = Some(take_bytes(data, &mut offset)?);
        }
        HeaderIdentifier::LENGTH => {
          headers.length = Some(take_u32(data, &mut offset)?);
        }
        HeaderIdentifier::TIME => {
          headers.time = Some(take_bytes(data, &mut offset)?);
        }
        HeaderIdentifier::DESCRIPTION => {
          headers.description = Some(take_text(data, &mut offset)?);
        }
        HeaderIdentifier::TARGET => {
          headers.target = Some(take_bytes(data, &mut offset)?);
        }
        HeaderIdentifier::HTTP => {
          headers.http = Some(take_bytes(data, &mut offset)?);
        }
        HeaderIdentifier::BODY => {
          headers.body = Some(take_bytes(data, &mut offset)?);
        }
        HeaderIdentifier::END_OF_BODY => {
          headers.end_of_body = Some(take_bytes(data, &mut offset)?);
        }
        HeaderIdentifier::WHO => {
          headers.who = Some(take_bytes(data, &mut offset)?);
        }
        HeaderIdentifier::CONNECTION_ID => {
          headers.connection_id = Some(take_u32(data, &mut offset)?);
        }
        HeaderIdentifier::APP_PARAMETERS => {
          headers.app_parameters = Some(take_bytes(data, &mut offset)?);
        }
        HeaderIdentifier::AUTH_CHALLENGE => {
          headers.auth_challenge = Some(take_bytes(data, &mut offset)?);
        }
        HeaderIdentifier::AUTH_RESPONSE => {
          headers.auth_response = Some(take_bytes(data, &mut offset)?);
        }
        HeaderIdentifier::CREATOR_ID => {
          headers.creator_id = Some(take_u32(data, &mut offset)?);
        }
        HeaderIdentifier::WAN_UUID => {
          headers.wan_uuid = Some(take_bytes(data, &mut offset)?);
        }
        HeaderIdentifier::OBJECT_CLASS => {
          headers.object_class = Some(take_bytes(data, &mut offset)?);
        }
        HeaderIdentifier::SESSION_PARAMETERS => {
          headers.session_parameters = Some(take_bytes(data, &mut offset)?);
        }
        HeaderIdentifier::SESSION_SEQUENCE_NUMBER => {
          headers.session_sequence_number = Some(take_u8(data, &mut offset)?);
        }
        HeaderIdentifier::ACTION_ID => {
          headers.action_id = Some(take_u8(data, &mut offset)?);
        }
        HeaderIdentifier::DEST_NAME => {
          headers.dest_name = Some(take_text(data, &mut offset)?);
        }
        HeaderIdentifier::PERMISSIONS => {
          headers.permissions = Some(take_u32(data, &mut offset)?);
        }
        HeaderIdentifier::SINGLE_RESPONSE_MODE => {
          headers.single_response_mode = Some(take_u8(data, &mut offset)?);
        }
        HeaderIdentifier::SINGLE_RESPONSE_MODE_PARAMETERS => {
          headers.single_response_mode_parameters =
            Some(take_u8(data, &mut offset)?);
        }
        HeaderIdentifier(id) => return HeaderIdentifierError { id }.fail(),
      }
    }

    Ok(headers)
  }
}

fn put_u8(bytes: &mut Vec<u8>, id: HeaderIdentifier, value: Option<u8>) {
  if let Some(value) = value {
    bytes.push(id.0);
    bytes.push(value);
  }
}

fn put_u32(bytes: &mut Vec<u8>, id: HeaderIdentifier, value: Option<u32>) {
  if let Some(value) = value {
    bytes.push(id.0);
    bytes.extend_from_slice(&value.to_be_bytes());
  }
}

fn put_bytes(bytes: &mut Vec<u8>, id: HeaderIdentifier, value: Option<&[u8]>) {
  if let Some(value) = value {
    let total = value.len() + 3;
    assert!(total <= usize::from(u16::MAX), "header too long");
    bytes.push(id.0);
    bytes.extend_from_slice(&(total as u16).to_be_bytes());
    bytes.extend_from_slice(value);
  }
}

fn put_text(bytes: &mut Vec<u8>, id: HeaderIdentifier, value: Option<&str>) {
  if let Some(value) = value {
    let mut encoded = value
      .encode_utf16()
      .flat_map(u16::to_be_bytes)
      .collect::<Vec<u8>>();

    if !value.ends_with('\0') {
      encoded.extend_from_slice(&[0, 0]);
    }

    let total = encoded.len() + 3;
    assert!(total <= usize::from(u16::MAX), "header too long");
    bytes.push(id.0);
    bytes.extend_from_slice(&(total as u16).to_be_bytes());
    bytes.extend_from_slice(&encoded);
  }
}

fn take_u8(data: &[u8], offset: &mut usize) -> Result<u8> {
  ensure!(
    *offset < data.len(),
    TruncatedError {
      expected: *offset + 1,
      actual: data.len(),
    },
  );
  let value = data[*offset];
  *offset += 1;
  Ok(value)
}

fn take_u32(data: &[u8], offset: &mut usize) -> Result<u32> {
  ensure!(
    *offset + 4 <= data.len(),
    TruncatedError {
      expected: *offset + 4,
      actual: data.len(),
    },
  );
  let value = u32::from_be_bytes([
    data[*offset],
    data[*offset + 1],
    data[*offset + 2],
    data[*offset + 3],
  ]);
  *offset += 4;
  Ok(value)
}

fn take_variable<'a>(data: &'a [u8], offset: &mut usize) -> Result<&'a [u8]> {
  ensure!(
    *offset + 2 <= data.len(),
    TruncatedError {
      expected: *offset + 2,
      actual: data.len(),
    },
  );

  let total =
    usize::from(u16::from_be_bytes([data[*offset], data[*offset + 1]]));
  ensure!(total >= 3, HeaderLengthError { length: total });

  let end = *offset + 2 + (total - 3);
  ensure!(
    end <= data.len(),
    TruncatedError {
      expected: end,
      actual: data.len(),
    },
  );

  let payload = &data[*offset + 2..end];
  *offset = end;
  Ok(payload)
}

fn take_bytes(data: &[u8], offset: &mut usize) -> Result<Vec<u8>> {
  Ok(take_variable(data, offset)?.to_vec())
}

fn take_text(data: &[u8], offset: &mut usize) -> Result<String> {
  let payload = take_variable(data, offset)?;
  ensure!(
    payload.len() % 2 == 0,
    TextLengthError {
      length: payload.len(),
    },
  );

  let units = payload
    .chunks(2)
    .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
    .collect::<Vec<u16>>();

  let mut text = String::from_utf16(&units).context(HeaderTextError)?;

  if text.ends_with('\0') {
    text.pop();
  }

  Ok(text)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn text_encoding() {
    let headers = Headers {
      name: Some("A".into()),
      ..Default::default()
    };

    assert_eq!(
      headers.to_bytes(),
      [0x01, 0x00, 0x07, 0x00, 0x41, 0x00, 0x00],
    );

    assert_eq!(Headers::from_bytes(&headers.to_bytes()).unwrap(), headers);
  }

  #[test]
  fn scalar_encodings() {
    let headers = Headers {
      count: Some(0xCAFE_BABE),
      action_id: Some(0x02),
      ..Default::default()
    };

    assert_eq!(
      headers.to_bytes(),
      [0xC0, 0xCA, 0xFE, 0xBA, 0xBE, 0x94, 0x02],
    );

    assert_eq!(Headers::from_bytes(&headers.to_bytes()).unwrap(), headers);
  }

  #[test]
  fn byte_sequence_encoding() {
    let headers = Headers {
      body: Some(b"hi".to_vec()),
      ..Default::default()
    };

    assert_eq!(headers.to_bytes(), [0x48, 0x00, 0x05, b'h', b'i']);
  }

  #[test]
  fn emission_order() {
    let headers = Headers {
      body: Some(b"x".to_vec()),
      name: Some("x".into()),
      connection_id: Some(1),
      ..Default::default()
    };

    let bytes = headers.to_bytes();

    assert_eq!(bytes[0], HeaderIdentifier::NAME.0);
    assert_eq!(bytes[7], HeaderIdentifier::BODY.0);
    assert_eq!(bytes[11], HeaderIdentifier::CONNECTION_ID.0);
  }

  #[test]
  fn terminated_text_round_trip() {
    let headers = Headers {
      name: Some("x.vcf\0".into()),
      ..Default::default()
    };

    let parsed = Headers::from_bytes(&headers.to_bytes()).unwrap();

    assert_eq!(parsed.name.unwrap(), "x.vcf");
  }

  #[test]
  fn unknown_identifier() {
    assert!(matches!(
      Headers::from_bytes(&[0x96, 0x00]),
      Err(Error::HeaderIdentifier { id: 0x96 }),
    ));
  }

  #[test]
  fn truncated() {
    assert!(matches!(
      Headers::from_bytes(&[0xC0, 0x00, 0x01]),
      Err(Error::Truncated { .. }),
    ));

    assert!(matches!(
      Headers::from_bytes(&[0x48, 0x00, 0x10, 0x00]),
      Err(Error::Truncated { .. }),
    ));
  }

  #[test]
  fn undersized_length() {
    assert!(matches!(
      Headers::from_bytes(&[0x48, 0x00, 0x02]),
      Err(Error::HeaderLength { length: 2 }),
    ));
  }
}

use super::*;

/// An OBEX response packet for every operation except CONNECT.
#[derive(Clone, Debug, PartialEq)]
pub struct Response {
  pub code: ResponseCode,
  pub is_final: bool,
  pub headers: Headers,
}

impl Response {
  pub fn new(code: ResponseCode) -> Self {
    Self {
      code,
      is_final: true,
      headers: Headers::default(),
    }
  }

  pub fn with_headers(code: ResponseCode, headers: Headers) -> Self {
    Self {
      code,
      is_final: true,
      headers,
    }
  }

  pub fn to_bytes(&self) -> Vec<u8> {
    let header_bytes = self.headers.to_bytes();

    let mut bytes = Vec::with_capacity(header_bytes.len() + 3);
    bytes.push(self.code.0 | u8::from(self.is_final) << 7);
    request::put_length(&mut bytes, header_bytes.len() + 3);
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

    Ok(Self {
      code: ResponseCode(data[0] & !FINAL_FLAG),
      is_final: data[0] & FINAL_FLAG != 0,
      headers: Headers::parse(data, 3)?,
    })
  }
}

/// The CONNECT response, which carries the peer's OBEX version and maximum
/// packet length between the packet length and the headers.
#[derive(Clone, Debug, PartialEq)]
pub struct ConnectResponse {
  pub code: ResponseCode,
  pub is_final: bool,
  pub version: u8,
  pub flags: u8,
  pub maximum_packet_length: u16,
  pub headers: Headers,
}

impl ConnectResponse {
  pub fn to_bytes(&self) -> Vec<u8> {
    let header_bytes = self.headers.to_bytes();

    let mut bytes = Vec::with_capacity(header_bytes.len() + 7);
    bytes.push(self.code.0 | u8::from(self.is_final) << 7);
    request::put_length(&mut bytes, header_bytes.len() + 7);
    bytes.push(self.version);
    bytes.push(self.flags);
    bytes.extend_from_slice(&self.maximum_packet_length.to_be_bytes());
    bytes.extend_from_slice(&header_bytes);
    bytes
  }

  pub fn from_bytes(data: &[u8]) -> Result<Self> {
    ensure!(
      data.len() >= 7,
      TruncatedError {
        expected: 7usize,
        actual: data.len(),
      },
    );

    Ok(Self {
      code: ResponseCode(data[0] & !FINAL_FLAG),
      is_final: data[0] & FINAL_FLAG != 0,
      version: data[3],
      flags: data[4],
      maximum_packet_length: u16::from_be_bytes([data[5], data[6]]),
      headers: Headers::parse(data, 7)?,
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn response_encoding() {
    let response = Response::new(ResponseCode::NOT_IMPLEMENTED);

    assert_eq!(response.to_bytes(), [0xD1, 0x00, 0x03]);

    assert_eq!(Response::from_bytes(&response.to_bytes()).unwrap(), response);
  }

  #[test]
  fn response_with_headers() {
    let response = Response::with_headers(
      ResponseCode::SUCCESS,
      Headers {
        connection_id: Some(7),
        ..Default::default()
      },
    );

    assert_eq!(
      response.to_bytes(),
      [0xA0, 0x00, 0x08, 0xCB, 0x00, 0x00, 0x00, 0x07],
    );
  }

  #[test]
  fn connect_response_round_trip() {
    let response = ConnectResponse {
      code: ResponseCode::SUCCESS,
      is_final: true,
      version: VERSION_1_0,
      flags: 0,
      maximum_packet_length: 0x2000,
      headers: Headers {
        who: Some(vec![0x01, 0x02]),
        ..Default::default()
      },
    };

    let bytes = response.to_bytes();

    assert_eq!(&bytes[..7], [0xA0, 0x00, 0x0C, 0x10, 0x00, 0x20, 0x00]);

    assert_eq!(ConnectResponse::from_bytes(&bytes).unwrap(), response);
  }

  #[test]
  fn unknown_code_preserved() {
    let response = Response::from_bytes(&[0xFE, 0x00, 0x03]).unwrap();

    assert_eq!(response.code, ResponseCode(0x7E));
    assert!(response.is_final);
  }
}

//! Object Push Profile, version 1.2: an OBEX client that pushes whole
//! objects and a server handler that accumulates them.

use super::*;

pub const FORMAT_ANY: u8 = 0xFF;
pub const FORMAT_I_CALENDAR_2_0: u8 = 0x04;
pub const FORMAT_V_CALENDAR_1_0: u8 = 0x03;
pub const FORMAT_V_CARD_2_1: u8 = 0x01;
pub const FORMAT_V_CARD_3_0: u8 = 0x02;
pub const FORMAT_V_MESSAGE: u8 = 0x06;
pub const FORMAT_V_NOTE: u8 = 0x05;
pub const GOEP_L2CAP_PSM_ATTRIBUTE_ID: u16 = 0x0200;
// Same as Android.
pub const MAX_RFCOMM_OBEX_PACKET_LENGTH: u16 = 65530;
pub const MIN_PACKET_LENGTH: u16 = 256;
pub const SERVICE_VERSION_ATTRIBUTE_ID: u16 = 0x0300;
pub const SUPPORTED_FORMAT_LIST_ATTRIBUTE_ID: u16 = 0x0303;

#[derive(Debug, Snafu)]
#[snafu(context(suffix(Error)))]
pub enum Error {
  #[snafu(display("first packet headers leave no room for a body"))]
  HeaderOverflow,
  #[snafu(display("incomplete OPP service record"))]
  IncompleteRecord,
  #[snafu(display("not connected"))]
  NotConnected,
  #[snafu(display("object too large for the OBEX length header: {length} bytes"))]
  ObjectLength { length: usize },
  #[snafu(display("peer maximum packet length too small: {length}"))]
  PacketLength { length: u16 },
  #[snafu(display("unexpected OBEX response: {code}"))]
  Response { code: ResponseCode },
  #[snafu(display("OBEX session error"))]
  Session { source: obex::Error },
}

type Result<T = (), E = Error> = std::result::Result<T, E>;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Version(pub u16);

impl Version {
  pub const V_1_0: Self = Self(0x0100);
  pub const V_1_1: Self = Self(0x0101);
  pub const V_1_2: Self = Self(0x0102);

  fn name(self) -> Option<&'static str> {
    match self {
      Self::V_1_0 => Some("V_1_0"),
      Self::V_1_1 => Some("V_1_1"),
      Self::V_1_2 => Some("V_1_2"),
      _ => None,
    }
  }
}

impl Display for Version {
  fn fmt(&self, f: &mut Formatter) -> fmt::Result {
    match self.name() {
      Some(name) => write!(f, "{name}[0x{:04X}]", self.0),
      None => write!(f, "0x{:04X}", self.0),
    }
  }
}

/// Header bytes of a continuation PUT packet: the connection id and an
/// empty body header.
pub fn min_put_header_size() -> usize {
  Request::put(
    true,
    Headers {
      connection_id: Some(0),
      body: Some(Vec::new()),
      ..Default::default()
    },
  )
  .to_bytes()
  .len()
}

/// Header bytes of a first PUT packet at their largest: the connection id,
/// an empty name, an empty type, a zero length, and an empty body header.
pub fn max_put_header_size() -> usize {
  Request::put(
    true,
    Headers {
      connection_id: Some(0),
      name: Some(String::new()),
      ty: Some(Vec::new()),
      length: Some(0),
      body: Some(Vec::new()),
      ..Default::default()
    },
  )
  .to_bytes()
  .len()
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SdpInfo {
  pub service_record_handle: u32,
  pub rfcomm_channel: u8,
  pub profile_version: Version,
  pub supported_formats: Vec<u8>,
  pub goep_l2cap_psm: Option<u16>,
}

impl SdpInfo {
  pub fn service_record(&self) -> ServiceRecord {
    let mut attributes = vec![
      ServiceAttribute::new(
        sdp::SERVICE_RECORD_HANDLE_ATTRIBUTE_ID,
        DataElement::unsigned_32(self.service_record_handle),
      ),
      ServiceAttribute::new(
        sdp::SERVICE_CLASS_ID_LIST_ATTRIBUTE_ID,
        DataElement::sequence(vec![DataElement::uuid(Uuid::OBJECT_PUSH_SERVICE)]),
      ),
      ServiceAttribute::new(
        sdp::PROTOCOL_DESCRIPTOR_LIST_ATTRIBUTE_ID,
        DataElement::sequence(vec![
          DataElement::sequence(vec![DataElement::uuid(Uuid::L2CAP_PROTOCOL)]),
          DataElement::sequence(vec![
            DataElement::uuid(Uuid::RFCOMM_PROTOCOL),
            DataElement::unsigned_8(self.rfcomm_channel),
          ]),
          DataElement::sequence(vec![DataElement::uuid(Uuid::OBEX_PROTOCOL)]),
        ]),
      ),
      ServiceAttribute::new(
        sdp::BLUETOOTH_PROFILE_DESCRIPTOR_LIST_ATTRIBUTE_ID,
        DataElement::sequence(vec![DataElement::sequence(vec![
          DataElement::uuid(Uuid::OBJECT_PUSH_SERVICE),
          DataElement::unsigned_16(self.profile_version.0),
        ])]),
      ),
      ServiceAttribute::new(
        SUPPORTED_FORMAT_LIST_ATTRIBUTE_ID,
        DataElement::sequence(
          self
            .supported_formats
            .iter()
            .map(|format| DataElement::unsigned_8(*format))
            .collect(),
        ),
      ),
    ];

    if let Some(psm) = self.goep_l2cap_psm {
      attributes.push(ServiceAttribute::new(
        GOEP_L2CAP_PSM_ATTRIBUTE_ID,
        DataElement::unsigned_16(psm),
      ));
    }

    ServiceRecord::new(attributes)
  }

  pub fn from_record(record: &ServiceRecord) -> Result<Self> {
    let service_record_handle = record
      .attribute(sdp::SERVICE_RECORD_HANDLE_ATTRIBUTE_ID)
      .and_then(DataElement::as_unsigned)
      .and_then(|handle| handle.try_into().ok())
      .context(IncompleteRecordError)?;

    let rfcomm_channel = record
      .attribute(sdp::PROTOCOL_DESCRIPTOR_LIST_ATTRIBUTE_ID)
      .and_then(DataElement::as_sequence)
      .and_then(|protocols| protocols.get(1))
      .and_then(DataElement::as_sequence)
      .and_then(|rfcomm| rfcomm.get(1))
      .and_then(DataElement::as_unsigned)
      .and_then(|channel| channel.try_into().ok())
      .context(IncompleteRecordError)?;

    let profile_version = record
      .attribute(sdp::BLUETOOTH_PROFILE_DESCRIPTOR_LIST_ATTRIBUTE_ID)
      .and_then(DataElement::as_sequence)
      .and_then(|profiles| profiles.first())
      .and_then(DataElement::as_sequence)
      .and_then(|profile| profile.get(1))
      .and_then(DataElement::as_unsigned)
      .and_then(|version| version.try_into().ok())
      .map(Version)
      .context(IncompleteRecordError)?;

    let supported_formats = record
      .attribute(SUPPORTED_FORMAT_LIST_ATTRIBUTE_ID)
      .and_then(DataElement::as_sequence)
      .map(|formats| {
        formats
          .iter()
          .filter_map(|format| format.as_unsigned()?.try_into().ok())
          .collect()
      })
      .context(IncompleteRecordError)?;

    let goep_l2cap_psm = record
      .attribute(GOEP_L2CAP_PSM_ATTRIBUTE_ID)
      .and_then(DataElement::as_unsigned)
      .and_then(|psm| psm.try_into().ok());

    Ok(Self {
      service_record_handle,
      rfcomm_channel,
      profile_version,
      supported_formats,
      goep_l2cap_psm,
    })
  }
}

/// An OPP client over an OBEX bearer.
pub struct Client<S> {
  session: ClientSession<S>,
  connection_id: Option<u32>,
  peer_maximum_packet_length: Option<u16>,
}

impl<S> Client<S>
where
  S: AsyncRead + AsyncWrite + Unpin,
{
  pub fn new(bearer: S) -> Self {
    Self {
      session: ClientSession::new(bearer),
      connection_id: None,
      peer_maximum_packet_length: None,
    }
  }

  /// Announces `count` objects and records the connection id and maximum
  /// packet length the server grants.
  pub async fn connect(&mut self, count: u32) -> Result {
    let response = self
      .session
      .send_connect_request(&Request::Connect {
        is_final: true,
        version: obex::VERSION_1_0,
        flags: 0,
        maximum_packet_length: MAX_RFCOMM_OBEX_PACKET_LENGTH,
        headers: Headers {
          count: Some(count),
          ..Default::default()
        },
      })
      .await
      .context(SessionError)?;

    self.connection_id = response.headers.connection_id;
    self.peer_maximum_packet_length = Some(response.maximum_packet_length);

    Ok(())
  }

  /// Pushes one object, split into body chunks sized to the peer's
  /// maximum packet length. Only the first chunk carries the name, type,
  /// and length headers.
  pub async fn push_object(&mut self, name: &str, ty: Option<&str>, payload: &[u8]) -> Result {
    let maximum_packet_length = self.peer_maximum_packet_length.context(NotConnectedError)?;

    ensure!(
      maximum_packet_length >= MIN_PACKET_LENGTH,
      PacketLengthError {
        length: maximum_packet_length,
      },
    );

    let length = u32::try_from(payload.len())
      .ok()
      .context(ObjectLengthError {
        length: payload.len(),
      })?;

    let mut offset = 0;

    while offset < payload.len() {
      let first = offset == 0;

      let mut overhead = if first {
        max_put_header_size() + name.encode_utf16().count() * 2 + 2
      } else {
        min_put_header_size()
      };

      if first {
        if let Some(ty) = ty {
          overhead += ty.len();
        }
      }

      let max_body = usize::from(maximum_packet_length)
        .checked_sub(overhead)
        .filter(|max_body| *max_body > 0)
        .context(HeaderOverflowError)?;

      let end = payload.len().min(offset + max_body);
      let is_final = end == payload.len();
      let body = payload[offset..end].to_vec();

      let mut headers = Headers {
        name: first.then(|| name.into()),
        ty: ty.filter(|_| first).map(|ty| ty.as_bytes().to_vec()),
        length: first.then_some(length),
        connection_id: self.connection_id,
        ..Default::default()
      };

      if is_final {
        headers.end_of_body = Some(body);
      } else {
        headers.body = Some(body);
      }

      let response = self
        .session
        .send_request(&Request::put(is_final, headers))
        .await
        .context(SessionError)?;

      let expected = if is_final {
        ResponseCode::SUCCESS
      } else {
        ResponseCode::CONTINUE
      };

      ensure!(
        response.code == expected,
        ResponseError {
          code: response.code,
        },
      );

      offset = end;
    }

    Ok(())
  }

  pub async fn disconnect(&mut self) -> Result {
    let response = self
      .session
      .send_request(&Request::disconnect(Headers {
        connection_id: self.connection_id,
        ..Default::default()
      }))
      .await
      .context(SessionError)?;

    ensure!(
      response.code == ResponseCode::SUCCESS,
      ResponseError {
        code: response.code,
      },
    );

    Ok(())
  }
}

/// An object accumulated from a peer's PUT packets.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ReceivedObject {
  pub name: Option<String>,
  pub length: Option<u32>,
  pub ty: Option<String>,
  pub body: Vec<u8>,
}

/// Server side of an object push exchange. Completed objects come out of
/// the receiver handed back by [`ServerHandler::new`].
pub struct ServerHandler {
  /// The object count announced in the peer's CONNECT request.
  pub count: Option<u32>,
  completed: mpsc::UnboundedSender<ReceivedObject>,
  connections: HashSet<u32>,
  sessions: HashMap<u32, ReceivedObject>,
}

impl ServerHandler {
  pub fn new() -> (Self, mpsc::UnboundedReceiver<ReceivedObject>) {
    let (completed, receiver) = mpsc::unbounded_channel();

    (
      Self {
        count: None,
        completed,
        connections: HashSet::new(),
        sessions: HashMap::new(),
      },
      receiver,
    )
  }
}

impl Handler for ServerHandler {
  fn on_connect(&mut self, request: &Request) -> ConnectResponse {
    let Request::Connect {
      version,
      flags,
      headers,
      ..
    } = request
    else {
      return ConnectResponse {
        code: ResponseCode::BAD_REQUEST,
        is_final: true,
        version: obex::VERSION_1_0,
        flags: 0,
        maximum_packet_length: MAX_RFCOMM_OBEX_PACKET_LENGTH,
        headers: Headers::default(),
      };
    };

    let connection_id = self.connections.iter().max().map_or(1, |max| max + 1);
    self.connections.insert(connection_id);
    self.count = headers.count;

    ConnectResponse {
      code: ResponseCode::SUCCESS,
      is_final: true,
      version: *version,
      flags: *flags,
      maximum_packet_length: MAX_RFCOMM_OBEX_PACKET_LENGTH,
      headers: Headers {
        connection_id: Some(connection_id),
        ..Default::default()
      },
    }
  }

  fn on_disconnect(&mut self, request: &Request) -> Response {
    match request.headers().connection_id {
      Some(connection_id) if self.connections.remove(&connection_id) => {
        Response::new(ResponseCode::SUCCESS)
      }
      _ => Response::new(ResponseCode::NOT_FOUND),
    }
  }

  fn on_put(&mut self, request: &Request) -> Response {
    let headers = request.headers();

    let Some(connection_id) = headers
      .connection_id
      .filter(|connection_id| self.connections.contains(connection_id))
    else {
      return Response::new(ResponseCode::NOT_FOUND);
    };

    // An empty body header counts as absent; an empty end-of-body header
    // completes an empty object.
    let Some(body) = headers
      .body
      .as_deref()
      .filter(|body| !body.is_empty())
      .or(headers.end_of_body.as_deref())
    else {
      return Response::new(ResponseCode::FORBIDDEN);
    };

    let transfer = self.sessions.entry(connection_id).or_default();
    transfer.body.extend_from_slice(body);

    if let Some(length) = headers.length {
      transfer.length = Some(length);
    }

    if let Some(name) = &headers.name {
      transfer.name = Some(name.clone());
    }

    if let Some(ty) = &headers.ty {
      transfer.ty = Some(String::from_utf8_lossy(ty).into_owned());
    }

    if headers.end_of_body.is_some() || request.is_final() {
      if let Some(transfer) = self.sessions.remove(&connection_id) {
        self.completed.send(transfer).ok();
      }

      Response::new(ResponseCode::SUCCESS)
    } else {
      Response::new(ResponseCode::CONTINUE)
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn put_header_sizes() {
    assert_eq!(min_put_header_size(), 11);
    assert_eq!(max_put_header_size(), 24);
  }

  #[test]
  fn version_display() {
    assert_eq!(Version::V_1_2.to_string(), "V_1_2[0x0102]");
    assert_eq!(Version(0x0103).to_string(), "0x0103");
  }

  #[test]
  fn sdp_info_round_trips() {
    let info = SdpInfo {
      service_record_handle: 0x00010001,
      rfcomm_channel: 5,
      profile_version: Version::V_1_2,
      supported_formats: vec![FORMAT_V_CARD_2_1, FORMAT_ANY],
      goep_l2cap_psm: Some(0x1001),
    };

    let record = info.service_record();
    assert_eq!(record.service_class_ids(), [Uuid::OBJECT_PUSH_SERVICE]);
    assert_eq!(SdpInfo::from_record(&record).unwrap(), info);

    let info = SdpInfo {
      goep_l2cap_psm: None,
      ..info
    };
    assert_eq!(SdpInfo::from_record(&info.service_record()).unwrap(), info);

    assert!(matches!(
      SdpInfo::from_record(&ServiceRecord::new(Vec::new())),
      Err(Error::IncompleteRecord),
    ));
  }

  #[test]
  fn connection_ids_count_up() {
    let (mut handler, _completed) = ServerHandler::new();

    let connect = Request::Connect {
      is_final: true,
      version: obex::VERSION_1_0,
      flags: 0,
      maximum_packet_length: 0xFFFF,
      headers: Headers::default(),
    };

    assert_eq!(
      handler.on_connect(&connect).headers.connection_id,
      Some(1),
    );
    assert_eq!(
      handler.on_connect(&connect).headers.connection_id,
      Some(2),
    );

    let disconnect = |connection_id| {
      Request::disconnect(Headers {
        connection_id,
        ..Default::default()
      })
    };

    assert_eq!(
      handler.on_disconnect(&disconnect(Some(1))).code,
      ResponseCode::SUCCESS,
    );
    assert_eq!(
      handler.on_disconnect(&disconnect(Some(1))).code,
      ResponseCode::NOT_FOUND,
    );
    assert_eq!(
      handler.on_disconnect(&disconnect(None)).code,
      ResponseCode::NOT_FOUND,
    );

    assert_eq!(
      handler.on_connect(&connect).headers.connection_id,
      Some(3),
    );
  }

  #[test]
  fn put_bodies_gate_the_response() {
    let (mut handler, mut completed) = ServerHandler::new();

    let response = handler.on_put(&Request::put(
      true,
      Headers {
        connection_id: Some(9),
        end_of_body: Some(b"x".to_vec()),
        ..Default::default()
      },
    ));
    assert_eq!(response.code, ResponseCode::NOT_FOUND);

    let connection_id = handler
      .on_connect(&Request::Connect {
        is_final: true,
        version: obex::VERSION_1_0,
        flags: 0,
        maximum_packet_length: 0xFFFF,
        headers: Headers::default(),
      })
      .headers
      .connection_id;

    let put = |headers| Request::put(true, headers);

    let response = handler.on_put(&put(Headers {
      connection_id,
      ..Default::default()
    }));
    assert_eq!(response.code, ResponseCode::FORBIDDEN);

    let response = handler.on_put(&put(Headers {
      connection_id,
      body: Some(Vec::new()),
      ..Default::default()
    }));
    assert_eq!(response.code, ResponseCode::FORBIDDEN);

    let response = handler.on_put(&put(Headers {
      connection_id,
      end_of_body: Some(Vec::new()),
      ..Default::default()
    }));
    assert_eq!(response.code, ResponseCode::SUCCESS);
    assert_eq!(completed.try_recv().unwrap(), ReceivedObject::default());
  }

  #[tokio::test]
  async fn push_preconditions() {
    let (client_end, _server_end) = tokio::io::duplex(64);
    let mut client = Client::new(client_end);

    assert!(matches!(
      client.push_object("a", None, b"x").await,
      Err(Error::NotConnected),
    ));

    client.peer_maximum_packet_length = Some(100);
    assert!(matches!(
      client.push_object("a", None, b"x").await,
      Err(Error::PacketLength { length: 100 }),
    ));

    client.peer_maximum_packet_length = Some(300);
    let name = "x".repeat(200);
    assert!(matches!(
      client.push_object(&name, None, b"x").await,
      Err(Error::HeaderOverflow),
    ));
  }

  #[tokio::test]
  async fn push_objects() {
    let (client_end, server_end) = tokio::io::duplex(0x40000);

    let (handler, mut completed) = ServerHandler::new();

    let server = tokio::spawn(async move {
      let mut session = obex::ServerSession::new(server_end, handler);
      session.serve().await.unwrap();
      session.into_handler()
    });

    let mut client = Client::new(client_end);
    client.connect(2).await.unwrap();

    client
      .push_object(
        "card.vcf",
        Some("text/x-vcard"),
        b"BEGIN:VCARD\nEND:VCARD\n",
      )
      .await
      .unwrap();

    let object = completed.recv().await.unwrap();
    assert_eq!(object.name.as_deref(), Some("card.vcf"));
    assert_eq!(object.ty.as_deref(), Some("text/x-vcard"));
    assert_eq!(object.length, Some(22));
    assert_eq!(object.body, b"BEGIN:VCARD\nEND:VCARD\n");

    // An empty object sends no packets at all.
    client.push_object("empty.txt", None, b"").await.unwrap();

    let large = vec![0x5A; 70_000];
    client.push_object("blob.bin", None, &large).await.unwrap();

    let object = completed.recv().await.unwrap();
    assert_eq!(object.name.as_deref(), Some("blob.bin"));
    assert_eq!(object.length, Some(70_000));
    assert_eq!(object.body, large);

    client.disconnect().await.unwrap();
    drop(client);

    let handler = server.await.unwrap();
    assert_eq!(handler.count, Some(2));
    assert!(handler.connections.is_empty());
  }
}

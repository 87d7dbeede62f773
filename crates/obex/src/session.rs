use super::*;

/// Reads one length-framed OBEX packet. Returns `None` when the bearer
/// closes cleanly at a packet boundary.
async fn read_packet<S>(bearer: &mut S) -> Result<Option<Vec<u8>>>
where
  S: AsyncRead + Unpin,
{
  let mut prefix = [0; 3];

  if bearer.read(&mut prefix[..1]).await.context(BearerError)? == 0 {
    return Ok(None);
  }

  bearer
    .read_exact(&mut prefix[1..])
    .await
    .context(BearerError)?;

  let length = usize::from(u16::from_be_bytes([prefix[1], prefix[2]]));
  ensure!(length >= 3, PacketLengthError { length });

  let mut packet = vec![0; length];
  packet[..3].copy_from_slice(&prefix);
  bearer
    .read_exact(&mut packet[3..])
    .await
    .context(BearerError)?;

  Ok(Some(packet))
}

async fn write_packet<S>(bearer: &mut S, packet: &[u8]) -> Result
where
  S: AsyncWrite + Unpin,
{
  bearer.write_all(packet).await.context(BearerError)?;
  bearer.flush().await.context(BearerError)
}

/// An OBEX client session over a reliable bearer.
///
/// CONNECT responses have a different wire shape from every other
/// response, so they get their own send method.
pub struct ClientSession<S> {
  bearer: S,
}

impl<S> ClientSession<S>
where
  S: AsyncRead + AsyncWrite + Unpin,
{
  pub fn new(bearer: S) -> Self {
    Self { bearer }
  }

  pub async fn send_connect_request(
    &mut self,
    request: &Request,
  ) -> Result<ConnectResponse> {
    debug!(">>> sending OBEX request {}", request.opcode());
    write_packet(&mut self.bearer, &request.to_bytes()).await?;

    let packet = read_packet(&mut self.bearer).await?.context(ClosedError)?;
    let response = ConnectResponse::from_bytes(&packet)?;
    debug!("<<< received OBEX response {}", response.code);
    Ok(response)
  }

  pub async fn send_request(&mut self, request: &Request) -> Result<Response> {
    debug!(">>> sending OBEX request {}", request.opcode());
    write_packet(&mut self.bearer, &request.to_bytes()).await?;

    let packet = read_packet(&mut self.bearer).await?.context(ClosedError)?;
    let response = Response::from_bytes(&packet)?;
    debug!("<<< received OBEX response {}", response.code);
    Ok(response)
  }

  pub fn into_bearer(self) -> S {
    self.bearer
  }
}

/// Per-operation request handlers for an OBEX server session.
///
/// Every operation defaults to `NOT_IMPLEMENTED`; profiles override the
/// operations they support.
pub trait Handler {
  fn on_connect(&mut self, _request: &Request) -> ConnectResponse {
    ConnectResponse {
      code: ResponseCode::NOT_IMPLEMENTED,
      is_final: true,
      version: 0,
      flags: 0,
      maximum_packet_length: 0,
      headers: Headers::default(),
    }
  }

  fn on_disconnect(&mut self, _request: &Request) -> Response {
    Response::new(ResponseCode::NOT_IMPLEMENTED)
  }

  fn on_put(&mut self, _request: &Request) -> Response {
    Response::new(ResponseCode::NOT_IMPLEMENTED)
  }

  fn on_get(&mut self, _request: &Request) -> Response {
    Response::new(ResponseCode::NOT_IMPLEMENTED)
  }

  fn on_setpath(&mut self, _request: &Request) -> Response {
    Response::new(ResponseCode::NOT_IMPLEMENTED)
  }

  fn on_action(&mut self, _request: &Request) -> Response {
    Response::new(ResponseCode::NOT_IMPLEMENTED)
  }

  fn on_session(&mut self, _request: &Request) -> Response {
    Response::new(ResponseCode::NOT_IMPLEMENTED)
  }

  fn on_abort(&mut self, _request: &Request) -> Response {
    Response::new(ResponseCode::NOT_IMPLEMENTED)
  }
}

/// An OBEX server session: reads requests off the bearer, dispatches them
/// to the handler by opcode, and writes the handler's responses back.
pub struct ServerSession<S, H> {
  bearer: S,
  handler: H,
}

impl<S, H> ServerSession<S, H>
where
  S: AsyncRead + AsyncWrite + Unpin,
  H: Handler,
{
  pub fn new(bearer: S, handler: H) -> Self {
    Self { bearer, handler }
  }

  pub fn handler(&self) -> &H {
    &self.handler
  }

  pub fn handler_mut(&mut self) -> &mut H {
    &mut self.handler
  }

  pub fn into_handler(self) -> H {
    self.handler
  }

  /// Serves requests until the peer closes the bearer.
  pub async fn serve(&mut self) -> Result {
    while let Some(packet) = read_packet(&mut self.bearer).await? {
      let request = Request::from_bytes(&packet)?;
      debug!("<<< received OBEX request {}", request.opcode());

      let response = match request.opcode() {
        Opcode::CONNECT => self.handler.on_connect(&request).to_bytes(),
        Opcode::DISCONNECT => self.handler.on_disconnect(&request).to_bytes(),
        Opcode::PUT => self.handler.on_put(&request).to_bytes(),
        Opcode::GET => self.handler.on_get(&request).to_bytes(),
        Opcode::SETPATH => self.handler.on_setpath(&request).to_bytes(),
        Opcode::ACTION => self.handler.on_action(&request).to_bytes(),
        Opcode::SESSION => self.handler.on_session(&request).to_bytes(),
        Opcode::ABORT => self.handler.on_abort(&request).to_bytes(),
        _ => Response::new(ResponseCode::NOT_IMPLEMENTED).to_bytes(),
      };

      debug!(">>> sending OBEX response ({} bytes)", response.len());
      write_packet(&mut self.bearer, &response).await?;
    }

    Ok(())
  }
}

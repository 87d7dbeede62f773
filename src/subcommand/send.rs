use super::*;

#[derive(Parser)]
pub struct Send {
  #[arg(long, help = "Connect to OBEX server at <PEER>.")]
  peer: SocketAddr,
  #[arg(long, help = "Push the contents of <FILE>.")]
  file: Utf8PathBuf,
  #[arg(long = "type", help = "Send <TYPE> as the object type.")]
  ty: Option<String>,
  #[arg(
    long,
    default_value = "3",
    help = "Make up to <ATTEMPTS> connection attempts."
  )]
  attempts: u32,
}

impl Send {
  pub fn run(self) -> Result {
    let name = self
      .file
      .file_name()
      .context(error::FileName { path: &self.file })?
      .to_owned();

    let payload = fs::read(&self.file).context(error::Io { path: &self.file })?;

    Runtime::new().context(error::Runtime)?.block_on(async {
      let policy = Policy {
        attempts: self.attempts,
        initial_delay: Duration::from_secs(1),
        max_delay: Duration::from_secs(8),
      };

      let stream = retry(policy, || TcpStream::connect(self.peer))
        .await
        .context(error::Connect { address: self.peer })?;

      info!("connected to {}", self.peer);

      push(stream, &name, self.ty.as_deref(), &payload)
        .await?
        .print();

      Ok(())
    })
  }
}

async fn push<S: AsyncRead + AsyncWrite + Unpin>(
  stream: S,
  name: &str,
  ty: Option<&str>,
  payload: &[u8],
) -> Result<Report> {
  let mut client = opp::Client::new(stream);

  let start = Instant::now();

  client.connect(1).await.context(error::Push)?;

  client
    .push_object(name, ty, payload)
    .await
    .context(error::Push)?;

  client.disconnect().await.context(error::Push)?;

  Ok(Report::new(
    name.into(),
    payload.len() as u64,
    start.elapsed(),
  ))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[tokio::test]
  async fn push_delivers_object() {
    let (client_end, server_end) = tokio::io::duplex(0x4000);

    let (handler, mut completed) = opp::ServerHandler::new();

    let server = tokio::spawn(async move {
      let mut session = obex::ServerSession::new(server_end, handler);
      session.serve().await.unwrap();
    });

    let report = push(client_end, "hello.txt", Some("text/plain"), b"hello over obex")
      .await
      .unwrap();

    assert_eq!(report.name, "hello.txt");
    assert_eq!(report.size, 15);

    let object = completed.recv().await.unwrap();

    assert_eq!(object.name.as_deref(), Some("hello.txt"));
    assert_eq!(object.ty.as_deref(), Some("text/plain"));
    assert_eq!(object.body, b"hello over obex");

    server.await.unwrap();
  }
}

use super::*;

#[derive(Parser)]
pub struct Receive {
  #[arg(long, help = "Listen for OBEX connections on <ADDRESS>.")]
  address: SocketAddr,
  #[arg(long, help = "Store received objects in <DIRECTORY>.")]
  directory: Utf8PathBuf,
  #[arg(long, help = "Exit after the first session.")]
  once: bool,
}

impl Receive {
  pub fn run(self) -> Result {
    fs::create_dir_all(&self.directory).context(error::Io {
      path: &self.directory,
    })?;

    Runtime::new().context(error::Runtime)?.block_on(async {
      let listener = TcpListener::bind(self.address).await.context(error::Bind {
        address: self.address,
      })?;

      info!("listening on {}", self.address);

      loop {
        let (stream, peer) = listener.accept().await.context(error::Accept)?;

        info!("session from {peer}");

        if let Err(err) = self.serve(stream).await {
          if matches!(err, Error::Session { .. }) && !self.once {
            warn!("session failed: {err}");
          } else {
            return Err(err);
          }
        }

        if self.once {
          return Ok(());
        }
      }
    })
  }

  async fn serve<S: AsyncRead + AsyncWrite + Unpin>(&self, stream: S) -> Result {
    let (handler, mut completed) = opp::ServerHandler::new();

    let mut session = obex::ServerSession::new(stream, handler);

    let serve = session.serve();
    tokio::pin!(serve);

    let mut start = Instant::now();

    loop {
      tokio::select! {
        result = &mut serve => {
          result.context(error::Session)?;
          break;
        }
        Some(object) = completed.recv() => {
          self.store(object, start.elapsed())?;
          start = Instant::now();
        }
      }
    }

    while let Ok(object) = completed.try_recv() {
      self.store(object, start.elapsed())?;
      start = Instant::now();
    }

    Ok(())
  }

  fn store(&self, object: opp::ReceivedObject, elapsed: Duration) -> Result {
    let name = filename(object.name.as_deref().unwrap_or("object"));

    let path = self.directory.join(&name);

    fs::write(&path, &object.body).context(error::Io { path: &path })?;

    info!("stored `{path}`");

    Report::new(name, object.body.len() as u64, elapsed).print();

    Ok(())
  }
}

/// Object names come from the peer: strip path separators and control
/// characters before using one as a file name.
fn filename(name: &str) -> String {
  let name = name
    .chars()
    .map(|c| {
      if c == '/' || c == '\\' || c == ':' || c.is_control() {
        '_'
      } else {
        c
      }
    })
    .collect::<String>();

  let name = name.trim_start_matches('.');

  if name.is_empty() {
    "object".into()
  } else {
    name.into()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn filenames_are_sanitized() {
    #[track_caller]
    fn case(input: &str, expected: &str) {
      assert_eq!(filename(input), expected);
    }

    case("report.txt", "report.txt");
    case("../../etc/passwd", "_.._etc_passwd");
    case("..\\boot.ini", "_boot.ini");
    case("a:b\nc", "a_b_c");
    case("...", "object");
    case("", "object");
  }

  #[tokio::test]
  async fn sessions_store_objects() {
    let tempdir = tempdir();

    let receive = Receive {
      address: "127.0.0.1:0".parse().unwrap(),
      directory: tempdir.path_utf8().into(),
      once: true,
    };

    let (client_end, server_end) = tokio::io::duplex(0x4000);

    let client = tokio::spawn(async move {
      let mut client = opp::Client::new(client_end);
      client.connect(2).await.unwrap();
      client
        .push_object("hello.txt", Some("text/plain"), b"hello")
        .await
        .unwrap();
      client.push_object("../evil", None, b"payload").await.unwrap();
      client.disconnect().await.unwrap();
    });

    receive.serve(server_end).await.unwrap();

    client.await.unwrap();

    assert_eq!(
      fs::read_to_string(tempdir.path_utf8().join("hello.txt")).unwrap(),
      "hello",
    );

    assert_eq!(
      fs::read(tempdir.path_utf8().join("_evil")).unwrap(),
      b"payload",
    );
  }
}

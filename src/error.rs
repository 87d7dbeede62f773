use super::*;

#[derive(Debug, Snafu)]
#[snafu(context(suffix(false)), visibility(pub))]
pub(crate) enum Error {
  #[snafu(display("failed to accept connection"))]
  Accept {
    backtrace: Option<Backtrace>,
    source: io::Error,
  },
  #[snafu(display("failed to listen on {address}"))]
  Bind {
    address: SocketAddr,
    backtrace: Option<Backtrace>,
    source: io::Error,
  },
  #[snafu(display("invalid broadcast id `{id}`"))]
  BroadcastId {
    backtrace: Option<Backtrace>,
    id: String,
    source: ParseIntError,
  },
  #[snafu(display("failed to connect to {address}"))]
  Connect {
    address: SocketAddr,
    backtrace: Option<Backtrace>,
    source: io::Error,
  },
  #[snafu(display("path `{path}` has no file name"))]
  FileName {
    backtrace: Option<Backtrace>,
    path: Utf8PathBuf,
  },
  #[snafu(display("I/O error at `{path}`"))]
  Io {
    backtrace: Option<Backtrace>,
    path: Utf8PathBuf,
    source: io::Error,
  },
  #[snafu(display("object push failed"))]
  Push {
    backtrace: Option<Backtrace>,
    source: profiles::opp::Error,
  },
  #[snafu(display("I/O error initializing async runtime"))]
  Runtime {
    backtrace: Option<Backtrace>,
    source: io::Error,
  },
  #[snafu(display("OBEX session failed"))]
  Session {
    backtrace: Option<Backtrace>,
    source: obex::Error,
  },
  #[snafu(display("invalid broadcast audio URI"))]
  Uri {
    backtrace: Option<Backtrace>,
    source: bluetooth::auracast::Error,
  },
}

impl Error {
  pub(crate) fn report(&self) {
    eprintln!("error: {self}");

    for (i, err) in self.iter_chain().skip(1).enumerate() {
      if i == 0 {
        eprintln!();
        eprintln!("because:");
      }

      eprintln!("- {err}");
    }

    if let Some(backtrace) = self.backtrace() {
      if backtrace.status() == BacktraceStatus::Captured {
        eprintln!();
        eprintln!("backtrace:");
        eprintln!("{backtrace}");
      }
    }
  }
}

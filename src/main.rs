#![allow(clippy::result_large_err)]

use {
  self::{
    error::Error,
    report::Report,
    retry::{retry, Policy},
    subcommand::Subcommand,
  },
  bluetooth::{Address, AdvertiserAddressType, BroadcastAudioUri},
  camino::Utf8PathBuf,
  clap::Parser,
  libc::EXIT_FAILURE,
  log::{info, warn},
  profiles::opp,
  serde::Serialize,
  snafu::{ErrorCompat, OptionExt, ResultExt, Snafu},
  std::{
    backtrace::{Backtrace, BacktraceStatus},
    fmt::Display,
    fs,
    future::Future,
    io,
    net::SocketAddr,
    num::ParseIntError,
    process,
    time::{Duration, Instant},
  },
  tokio::{
    io::{AsyncRead, AsyncWrite},
    net::{TcpListener, TcpStream},
  },
};

#[cfg(test)]
#[macro_use]
mod test;

#[cfg(test)]
use test::*;

mod error;
mod report;
mod retry;
mod subcommand;

type Result<T = (), E = Error> = std::result::Result<T, E>;

fn main() {
  env_logger::init();

  if let Err(err) = Subcommand::parse().run() {
    err.report();
    process::exit(EXIT_FAILURE)
  }
}

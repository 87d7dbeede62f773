use {
  self::uri::Uri,
  super::*,
  clap::builder::{
    styling::{AnsiColor, Effects},
    Styles,
  },
  tokio::runtime::Runtime,
};

mod receive;
mod send;
mod uri;

#[derive(Parser)]
#[command(
  version,
  styles = Styles::styled()
    .header(AnsiColor::Green.on_default() | Effects::BOLD)
    .usage(AnsiColor::Green.on_default() | Effects::BOLD)
    .literal(AnsiColor::Blue.on_default() | Effects::BOLD)
    .placeholder(AnsiColor::Cyan.on_default()))
]
pub enum Subcommand {
  Receive(receive::Receive),
  Send(send::Send),
  #[command(subcommand)]
  Uri(Uri),
}

impl Subcommand {
  pub fn run(self) -> Result {
    match self {
      Self::Receive(receive) => receive.run(),
      Self::Send(send) => send.run(),
      Self::Uri(uri) => uri.run(),
    }
  }
}

//! Object Exchange protocol, the session layer under the OPP, PBAP, and MAP
//! profiles.
//!
//! See IrDA Object Exchange Protocol, version 1.5:
//! https://btprodspecificationrefs.blob.core.windows.net/ext-ref/IrDA/OBEX15.pdf

use {
  log::debug,
  snafu::{ensure, OptionExt, ResultExt, Snafu},
  std::{
    fmt::{self, Display, Formatter},
    io,
  },
  tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt},
};

pub use {
  header::{HeaderIdentifier, Headers, SingleResponseMode},
  opcode::Opcode,
  request::{Request, SETPATH_DO_NOT_CREATE_FOLDER, SETPATH_GO_TO_PARENT_FOLDER},
  response::{ConnectResponse, Response},
  response_code::ResponseCode,
  session::{ClientSession, Handler, ServerSession},
};

mod header;
mod opcode;
mod request;
mod response;
mod response_code;
mod session;

pub const FINAL_FLAG: u8 = 0x80;
pub const VERSION_1_0: u8 = 0x10;

type Result<T = (), E = Error> = std::result::Result<T, E>;

#[derive(Debug, Snafu)]
#[snafu(context(suffix(Error)), visibility(pub(crate)))]
pub enum Error {
  #[snafu(display("I/O error on OBEX bearer"))]
  Bearer { source: io::Error },
  #[snafu(display("bearer closed before response"))]
  Closed,
  #[snafu(display("unknown header identifier 0x{id:02X}"))]
  HeaderIdentifier { id: u8 },
  #[snafu(display("header length {length} shorter than minimum 3"))]
  HeaderLength { length: usize },
  #[snafu(display("header text is not valid UTF-16"))]
  HeaderText { source: std::string::FromUtf16Error },
  #[snafu(display("packet length {length} shorter than minimum 3"))]
  PacketLength { length: usize },
  #[snafu(display("header text length {length} is odd"))]
  TextLength { length: usize },
  #[snafu(display("packet truncated: need {expected} bytes but have {actual}"))]
  Truncated { expected: usize, actual: usize },
}

//! Bluetooth profile surfaces: the object push, phone book access, and
//! message access OBEX profiles, personal area networking over BNEP, the
//! HID interconnect, and the ranging service codecs.

use {
  bluetooth::{channel, sdp, Address, Channel, DataElement, ServiceAttribute, ServiceRecord, Uuid},
  bytes::Bytes,
  log::{debug, error, warn},
  obex::{ClientSession, ConnectResponse, Handler, Headers, Request, Response, ResponseCode},
  snafu::{ensure, OptionExt, ResultExt, Snafu},
  std::{
    collections::{HashMap, HashSet},
    fmt::{self, Display, Formatter},
    num::ParseIntError,
    ops::BitOr,
    str::Utf8Error,
  },
  strum::IntoStaticStr,
  tokio::{
    io::{AsyncRead, AsyncWrite},
    sync::mpsc,
  },
};

pub mod bnep;
pub mod hid;
pub mod message_access;
pub mod opp;
pub mod pan;
pub mod pbap;
pub mod ras;

fn rfcomm_channel(record: &ServiceRecord) -> Option<u8> {
  record
    .attribute(sdp::PROTOCOL_DESCRIPTOR_LIST_ATTRIBUTE_ID)
    .and_then(DataElement::as_sequence)?
    .iter()
    .find_map(|entry| {
      let entry = entry.as_sequence()?;

      if entry.first()?.as_uuid()? == Uuid::RFCOMM_PROTOCOL {
        entry.get(1)?.as_unsigned()?.try_into().ok()
      } else {
        None
      }
    })
}

fn profile_version(record: &ServiceRecord, profile: Uuid) -> Option<u16> {
  record
    .attribute(sdp::BLUETOOTH_PROFILE_DESCRIPTOR_LIST_ATTRIBUTE_ID)
    .and_then(DataElement::as_sequence)?
    .iter()
    .find_map(|entry| {
      let entry = entry.as_sequence()?;

      if entry.first()?.as_uuid()? == profile {
        entry.get(1)?.as_unsigned()?.try_into().ok()
      } else {
        None
      }
    })
}

fn service_name(record: &ServiceRecord, default: &str) -> String {
  record
    .attribute(sdp::PRIMARY_LANGUAGE_BASE_ID + sdp::SERVICE_NAME_ATTRIBUTE_ID_OFFSET)
    .and_then(DataElement::as_text)
    .unwrap_or(default)
    .into()
}

use {
  base64::{engine::general_purpose::STANDARD as BASE64, Engine},
  bytes::Bytes,
  serde::{Deserialize, Serialize, Serializer},
  snafu::{ensure, OptionExt, ResultExt, Snafu},
  std::{
    fmt::{self, Display, Formatter},
    num::ParseIntError,
    str::FromStr,
  },
  tokio::sync::mpsc,
};

pub use {
  address::Address,
  auracast::{AdvertiserAddressType, BroadcastAudioUri},
  channel::Channel,
  sdp::{DataElement, ServiceAttribute, ServiceRecord},
  uuid::Uuid,
};

pub mod address;
pub mod auracast;
pub mod channel;
pub mod hci;
pub mod sdp;
pub mod uuid;

//! Message Access Profile, version 1.4: MAS and MNS service records, the
//! application parameters header, and an MNS server that collects event
//! reports pushed by the message server.

use super::*;

pub const EVENT_REPORT_TYPE: &[u8] = b"x-bt/MAP-event-report\0";
pub const GOEP_L2CAP_PSM_ATTRIBUTE_ID: u16 = 0x0200;
pub const MAP_SUPPORTED_FEATURES_ATTRIBUTE_ID: u16 = 0x0317;
pub const MAS_INSTANCE_ID_ATTRIBUTE_ID: u16 = 0x0315;

/// Carried in the CONNECT request target header of a MAS session.
pub const MAS_TARGET_UUID: Uuid = Uuid::Uuid128(0xbb582b40_420c_11db_b0de_0800200c9a66);

pub const MAX_RFCOMM_OBEX_PACKET_LENGTH: u16 = 65530;
pub const MESSAGE_LISTING_TYPE: &[u8] = b"x-bt/MAP-msg-listing\0";
pub const MESSAGE_TYPE: &[u8] = b"x-bt/message\0";

/// Carried in the CONNECT request target header of an MNS session.
pub const MNS_TARGET_UUID: Uuid = Uuid::Uuid128(0xbb582b41_420c_11db_b0de_0800200c9a66);

pub const NOTIFICATION_REGISTRATION_TYPE: &[u8] = b"x-bt/MAP-NotificationRegistration\0";
pub const SUPPORTED_MESSAGE_TYPES_ATTRIBUTE_ID: u16 = 0x0316;

#[derive(Debug, Snafu)]
#[snafu(context(suffix(Error)))]
pub enum Error {
  #[snafu(display("bad hexadecimal value for application parameter {tag}"))]
  Hex { tag: Tag, source: ParseIntError },
  #[snafu(display("incomplete MAP service record"))]
  IncompleteRecord,
  #[snafu(display("unknown application parameter tag 0x{tag:02X}"))]
  Tag { tag: u8 },
  #[snafu(display("application parameter {tag} is not valid UTF-8"))]
  Text { tag: Tag, source: Utf8Error },
  #[snafu(display("truncated application parameters at offset {offset}"))]
  Truncated { offset: usize },
  #[snafu(display("bad length {length} for application parameter {tag}"))]
  ValueLength { tag: Tag, length: usize },
  #[snafu(display("unsupported MAP version 0x{value:04X}"))]
  Version { value: u16 },
}

type Result<T = (), E = Error> = std::result::Result<T, E>;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Version {
  V1_0 = 0x0100,
  V1_1 = 0x0101,
  V1_2 = 0x0102,
  V1_3 = 0x0103,
  V1_4 = 0x0104,
}

impl TryFrom<u16> for Version {
  type Error = Error;

  fn try_from(value: u16) -> Result<Self> {
    match value {
      0x0100 => Ok(Self::V1_0),
      0x0101 => Ok(Self::V1_1),
      0x0102 => Ok(Self::V1_2),
      0x0103 => Ok(Self::V1_3),
      0x0104 => Ok(Self::V1_4),
      value => Err(Error::Version { value }),
    }
  }
}

/// Message types advertised in the MAS service record. The bit layout
/// differs from [`FilterMessageType`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct SupportedMessageTypes(pub u8);

impl SupportedMessageTypes {
  pub const EMAIL: Self = Self(1 << 0);
  pub const IM: Self = Self(1 << 4);
  pub const MMS: Self = Self(1 << 3);
  pub const SMS_CDMA: Self = Self(1 << 2);
  pub const SMS_GSM: Self = Self(1 << 1);

  pub fn contains(self, other: Self) -> bool {
    self.0 & other.0 == other.0
  }
}

impl BitOr for SupportedMessageTypes {
  type Output = Self;

  fn bitor(self, other: Self) -> Self {
    Self(self.0 | other.0)
  }
}

/// Message types selected by the FilterMessageType application parameter.
/// The bit layout differs from [`SupportedMessageTypes`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct FilterMessageType(pub u8);

impl FilterMessageType {
  pub const EMAIL: Self = Self(1 << 2);
  pub const IM: Self = Self(1 << 4);
  pub const MMS: Self = Self(1 << 3);
  pub const SMS_CDMA: Self = Self(1 << 1);
  pub const SMS_GSM: Self = Self(1 << 0);

  pub fn contains(self, other: Self) -> bool {
    self.0 & other.0 == other.0
  }
}

impl BitOr for FilterMessageType {
  type Output = Self;

  fn bitor(self, other: Self) -> Self {
    Self(self.0 | other.0)
  }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct SupportedFeatures(pub u32);

impl SupportedFeatures {
  pub const BROWSING_FEATURE: Self = Self(1 << 2);
  pub const CONVERSATION_LISTING: Self = Self(1 << 20);
  pub const CONVERSATION_VERSION_COUNTERS: Self = Self(1 << 13);
  pub const DATABASE_IDENTIFIER: Self = Self(1 << 11);
  pub const DELETE_FEATURE: Self = Self(1 << 4);
  pub const EVENT_REPORT_VERSION_1_2: Self = Self(1 << 7);
  pub const EXTENDED_EVENT_REPORT_1_1: Self = Self(1 << 6);
  pub const FOLDER_VERSION_COUNTER: Self = Self(1 << 12);
  pub const INSTANCE_INFORMATION_FEATURE: Self = Self(1 << 5);
  pub const MAP_SUPPORTED_FEATURES_IN_CONNECT_REQUEST: Self = Self(1 << 19);
  pub const MESSAGES_LISTING_FORMAT_VERSION_1_1: Self = Self(1 << 9);
  pub const MESSAGE_FORMAT_VERSION_1_1: Self = Self(1 << 8);
  pub const NOTIFICATION_FEATURE: Self = Self(1 << 1);
  pub const NOTIFICATION_FILTERING: Self = Self(1 << 17);
  pub const NOTIFICATION_REGISTRATION_FEATURE: Self = Self(1 << 0);
  pub const OWNER_STATUS: Self = Self(1 << 21);
  pub const PARTICIPANT_CHAT_STATE_CHANGE_NOTIFICATION: Self = Self(1 << 15);
  pub const PARTICIPANT_PRESENCE_CHANGE_NOTIFICATION: Self = Self(1 << 14);
  pub const PBAP_CONTACT_CROSS_REFERENCE: Self = Self(1 << 16);
  pub const PERSISTENT_MESSAGE_HANDLES: Self = Self(1 << 10);
  pub const UPLOADING_FEATURE: Self = Self(1 << 3);
  pub const UTC_OFFSET_TIMESTAMP_FORMAT: Self = Self(1 << 18);

  pub fn contains(self, other: Self) -> bool {
    self.0 & other.0 == other.0
  }
}

impl BitOr for SupportedFeatures {
  type Output = Self;

  fn bitor(self, other: Self) -> Self {
    Self(self.0 | other.0)
  }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Charset(pub u8);

impl Charset {
  pub const UTF_8: Self = Self(1 << 0);
}

/// Message listing property bits for the ParameterMask application
/// parameter.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct PropertyMask(pub u32);

impl PropertyMask {
  pub const ATTACHMENT_MIME: Self = Self(1 << 20);
  pub const ATTACHMENT_SIZE: Self = Self(1 << 10);
  pub const CONVERSATION_ID: Self = Self(1 << 17);
  pub const CONVERSATION_NAME: Self = Self(1 << 18);
  pub const DATETIME: Self = Self(1 << 1);
  pub const DELIVERY_STATUS: Self = Self(1 << 16);
  pub const DIRECTION: Self = Self(1 << 19);
  pub const PRIORITY: Self = Self(1 << 11);
  pub const PROTECTED: Self = Self(1 << 14);
  pub const READ: Self = Self(1 << 12);
  pub const RECEPTION_STATUS: Self = Self(1 << 8);
  pub const RECIPIENT_ADDRESSING: Self = Self(1 << 5);
  pub const RECIPIENT_NAME: Self = Self(1 << 4);
  pub const REPLYTO_ADDRESSING: Self = Self(1 << 15);
  pub const SENDER_ADDRESSING: Self = Self(1 << 3);
  pub const SENDER_NAME: Self = Self(1 << 2);
  pub const SENT: Self = Self(1 << 13);
  pub const SIZE: Self = Self(1 << 7);
  pub const SUBJECT: Self = Self(1 << 0);
  pub const TEXT: Self = Self(1 << 9);
  pub const TYPE: Self = Self(1 << 6);

  pub fn contains(self, other: Self) -> bool {
    self.0 & other.0 == other.0
  }
}

impl BitOr for PropertyMask {
  type Output = Self;

  fn bitor(self, other: Self) -> Self {
    Self(self.0 | other.0)
  }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Tag(pub u8);

impl Tag {
  pub const ATTACHMENT: Self = Self(0x0A);
  pub const CHARSET: Self = Self(0x14);
  pub const CHAT_STATE: Self = Self(0x21);
  pub const CONVERSATION_ID: Self = Self(0x22);
  pub const CONVERSATION_LISTING_VERSION_COUNTER: Self = Self(0x1B);
  pub const CONV_PARAMETER_MASK: Self = Self(0x26);
  pub const DATABASE_IDENTIFIER: Self = Self(0x1A);
  pub const END_FILTER_PERIOD_END: Self = Self(0x05);
  pub const EXTENDED_DATA: Self = Self(0x28);
  pub const FILTER_LAST_ACTIVITY_BEGIN: Self = Self(0x1F);
  pub const FILTER_LAST_ACTIVITY_END: Self = Self(0x20);
  pub const FILTER_MESSAGE_HANDLE: Self = Self(0x24);
  pub const FILTER_MESSAGE_TYPE: Self = Self(0x03);
  pub const FILTER_PERIOD_BEGIN: Self = Self(0x04);
  pub const FILTER_READ_STATUS: Self = Self(0x06);
  pub const FOLDER_LISTING_SIZE: Self = Self(0x11);
  pub const FOLDER_VERSION_COUNTER: Self = Self(0x23);
  pub const FRACTION_DELIVER: Self = Self(0x16);
  pub const FRACTION_REQUEST: Self = Self(0x15);
  pub const LAST_ACTIVITY: Self = Self(0x1E);
  pub const LISTING_SIZE: Self = Self(0x12);
  pub const LIST_START_OFFSET: Self = Self(0x02);
  pub const MAP_SUPPORTED_FEATURES: Self = Self(0x29);
  pub const MAS_INSTANCE_ID: Self = Self(0x0F);
  pub const MAX_LIST_COUNT: Self = Self(0x01);
  pub const MSE_TIME: Self = Self(0x19);
  pub const NEW_MESSAGE: Self = Self(0x0D);
  pub const NOTIFICATION_FILTER_MASK: Self = Self(0x25);
  pub const NOTIFICATION_STATUS: Self = Self(0x0E);
  pub const OWNER_UCI: Self = Self(0x27);
  pub const PARAMETER_MASK: Self = Self(0x10);
  pub const PRESENCE_AVAILABILITY: Self = Self(0x1C);
  pub const PRESENCE_TEXT: Self = Self(0x1D);
  pub const RETRY: Self = Self(0x0C);
  pub const STATUS_INDICATOR: Self = Self(0x17);
  pub const STATUS_VALUE: Self = Self(0x18);
  pub const SUBJECT_LENGTH: Self = Self(0x13);
  pub const TRANSPARENT: Self = Self(0x0B);

  fn name(self) -> Option<&'static str> {
    match self {
      Self::ATTACHMENT => Some("ATTACHMENT"),
      Self::CHARSET => Some("CHARSET"),
      Self::CHAT_STATE => Some("CHAT_STATE"),
      Self::CONVERSATION_ID => Some("CONVERSATION_ID"),
      Self::CONVERSATION_LISTING_VERSION_COUNTER => Some("CONVERSATION_LISTING_VERSION_COUNTER"),
      Self::CONV_PARAMETER_MASK => Some("CONV_PARAMETER_MASK"),
      Self::DATABASE_IDENTIFIER => Some("DATABASE_IDENTIFIER"),
      Self::END_FILTER_PERIOD_END => Some("END_FILTER_PERIOD_END"),
      Self::EXTENDED_DATA => Some("EXTENDED_DATA"),
      Self::FILTER_LAST_ACTIVITY_BEGIN => Some("FILTER_LAST_ACTIVITY_BEGIN"),
      Self::FILTER_LAST_ACTIVITY_END => Some("FILTER_LAST_ACTIVITY_END"),
      Self::FILTER_MESSAGE_HANDLE => Some("FILTER_MESSAGE_HANDLE"),
      Self::FILTER_MESSAGE_TYPE => Some("FILTER_MESSAGE_TYPE"),
      Self::FILTER_PERIOD_BEGIN => Some("FILTER_PERIOD_BEGIN"),
      Self::FILTER_READ_STATUS => Some("FILTER_READ_STATUS"),
      Self::FOLDER_LISTING_SIZE => Some("FOLDER_LISTING_SIZE"),
      Self::FOLDER_VERSION_COUNTER => Some("FOLDER_VERSION_COUNTER"),
      Self::FRACTION_DELIVER => Some("FRACTION_DELIVER"),
      Self::FRACTION_REQUEST => Some("FRACTION_REQUEST"),
      Self::LAST_ACTIVITY => Some("LAST_ACTIVITY"),
      Self::LISTING_SIZE => Some("LISTING_SIZE"),
      Self::LIST_START_OFFSET => Some("LIST_START_OFFSET"),
      Self::MAP_SUPPORTED_FEATURES => Some("MAP_SUPPORTED_FEATURES"),
      Self::MAS_INSTANCE_ID => Some("MAS_INSTANCE_ID"),
      Self::MAX_LIST_COUNT => Some("MAX_LIST_COUNT"),
      Self::MSE_TIME => Some("MSE_TIME"),
      Self::NEW_MESSAGE => Some("NEW_MESSAGE"),
      Self::NOTIFICATION_FILTER_MASK => Some("NOTIFICATION_FILTER_MASK"),
      Self::NOTIFICATION_STATUS => Some("NOTIFICATION_STATUS"),
      Self::OWNER_UCI => Some("OWNER_UCI"),
      Self::PARAMETER_MASK => Some("PARAMETER_MASK"),
      Self::PRESENCE_AVAILABILITY => Some("PRESENCE_AVAILABILITY"),
      Self::PRESENCE_TEXT => Some("PRESENCE_TEXT"),
      Self::RETRY => Some("RETRY"),
      Self::STATUS_INDICATOR => Some("STATUS_INDICATOR"),
      Self::STATUS_VALUE => Some("STATUS_VALUE"),
      Self::SUBJECT_LENGTH => Some("SUBJECT_LENGTH"),
      Self::TRANSPARENT => Some("TRANSPARENT"),
      _ => None,
    }
  }
}

impl Display for Tag {
  fn fmt(&self, f: &mut Formatter) -> fmt::Result {
    match self.name() {
      Some(name) => write!(f, "{name}[0x{:02X}]", self.0),
      None => write!(f, "0x{:02X}", self.0),
    }
  }
}

/// The MAP application parameters header. Fields are declared in tag
/// order, and serialization emits them in that order. Identifier and
/// version counter values travel as hexadecimal text on the wire.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ApplicationParameters {
  pub max_list_count: Option<u16>,
  pub list_start_offset: Option<u16>,
  pub filter_message_type: Option<u8>,
  pub filter_period_begin: Option<String>,
  pub end_filter_period_end: Option<String>,
  pub filter_read_status: Option<u8>,
  pub attachment: Option<u8>,
  pub transparent: Option<u8>,
  pub retry: Option<u8>,
  pub new_message: Option<u8>,
  pub notification_status: Option<u8>,
  pub mas_instance_id: Option<u8>,
  pub parameter_mask: Option<u32>,
  pub folder_listing_size: Option<u16>,
  pub listing_size: Option<u16>,
  pub subject_length: Option<u8>,
  pub charset: Option<u8>,
  pub fraction_request: Option<u8>,
  pub fraction_deliver: Option<u8>,
  pub status_indicator: Option<u8>,
  pub status_value: Option<u8>,
  pub mse_time: Option<String>,
  pub database_identifier: Option<u128>,
  pub conversation_listing_version_counter: Option<u128>,
  pub presence_availability: Option<u8>,
  pub presence_text: Option<String>,
  pub last_activity: Option<String>,
  pub filter_last_activity_begin: Option<String>,
  pub filter_last_activity_end: Option<String>,
  pub chat_state: Option<u8>,
  pub conversation_id: Option<u128>,
  pub folder_version_counter: Option<u128>,
  pub filter_message_handle: Option<u64>,
  pub notification_filter_mask: Option<u32>,
  pub conv_parameter_mask: Option<u32>,
  pub owner_uci: Option<String>,
  pub extended_data: Option<String>,
  pub map_supported_features: Option<u32>,
}

impl ApplicationParameters {
  pub fn to_bytes(&self) -> Vec<u8> {
    fn put<const N: usize>(out: &mut Vec<u8>, tag: Tag, value: Option<[u8; N]>) {
      if let Some(value) = value {
        out.push(tag.0);
        out.push(N.try_into().unwrap());
        out.extend_from_slice(&value);
      }
    }

    fn put_text(out: &mut Vec<u8>, tag: Tag, value: Option<&str>) {
      if let Some(value) = value {
        assert!(
          value.len() <= usize::from(u8::MAX),
          "application parameter too long",
        );
        out.push(tag.0);
        out.push(value.len().try_into().unwrap());
        out.extend_from_slice(value.as_bytes());
      }
    }

    fn put_hex(out: &mut Vec<u8>, tag: Tag, value: Option<u128>) {
      put_text(out, tag, value.map(|value| format!("{value:#x}")).as_deref());
    }

    let mut out = Vec::new();

    put(
      &mut out,
      Tag::MAX_LIST_COUNT,
      self.max_list_count.map(u16::to_be_bytes),
    );
    put(
      &mut out,
      Tag::LIST_START_OFFSET,
      self.list_start_offset.map(u16::to_be_bytes),
    );
    put(
      &mut out,
      Tag::FILTER_MESSAGE_TYPE,
      self.filter_message_type.map(u8::to_be_bytes),
    );
    put_text(
      &mut out,
      Tag::FILTER_PERIOD_BEGIN,
      self.filter_period_begin.as_deref(),
    );
    put_text(
      &mut out,
      Tag::END_FILTER_PERIOD_END,
      self.end_filter_period_end.as_deref(),
    );
    put(
      &mut out,
      Tag::FILTER_READ_STATUS,
      self.filter_read_status.map(u8::to_be_bytes),
    );
    put(&mut out, Tag::ATTACHMENT, self.attachment.map(u8::to_be_bytes));
    put(
      &mut out,
      Tag::TRANSPARENT,
      self.transparent.map(u8::to_be_bytes),
    );
    put(&mut out, Tag::RETRY, self.retry.map(u8::to_be_bytes));
    put(
      &mut out,
      Tag::NEW_MESSAGE,
      self.new_message.map(u8::to_be_bytes),
    );
    put(
      &mut out,
      Tag::NOTIFICATION_STATUS,
      self.notification_status.map(u8::to_be_bytes),
    );
    put(
      &mut out,
      Tag::MAS_INSTANCE_ID,
      self.mas_instance_id.map(u8::to_be_bytes),
    );
    put(
      &mut out,
      Tag::PARAMETER_MASK,
      self.parameter_mask.map(u32::to_be_bytes),
    );
    put(
      &mut out,
      Tag::FOLDER_LISTING_SIZE,
      self.folder_listing_size.map(u16::to_be_bytes),
    );
    put(
      &mut out,
      Tag::LISTING_SIZE,
      self.listing_size.map(u16::to_be_bytes),
    );
    put(
      &mut out,
      Tag::SUBJECT_LENGTH,
      self.subject_length.map(u8::to_be_bytes),
    );
    put(&mut out, Tag::CHARSET, self.charset.map(u8::to_be_bytes));
    put(
      &mut out,
      Tag::FRACTION_REQUEST,
      self.fraction_request.map(u8::to_be_bytes),
    );
    put(
      &mut out,
      Tag::FRACTION_DELIVER,
      self.fraction_deliver.map(u8::to_be_bytes),
    );
    put(
      &mut out,
      Tag::STATUS_INDICATOR,
      self.status_indicator.map(u8::to_be_bytes),
    );
    put(
      &mut out,
      Tag::STATUS_VALUE,
      self.status_value.map(u8::to_be_bytes),
    );
    put_text(&mut out, Tag::MSE_TIME, self.mse_time.as_deref());
    put_hex(
      &mut out,
      Tag::DATABASE_IDENTIFIER,
      self.database_identifier,
    );
    put_hex(
      &mut out,
      Tag::CONVERSATION_LISTING_VERSION_COUNTER,
      self.conversation_listing_version_counter,
    );
    put(
      &mut out,
      Tag::PRESENCE_AVAILABILITY,
      self.presence_availability.map(u8::to_be_bytes),
    );
    put_text(&mut out, Tag::PRESENCE_TEXT, self.presence_text.as_deref());
    put_text(&mut out, Tag::LAST_ACTIVITY, self.last_activity.as_deref());
    put_text(
      &mut out,
      Tag::FILTER_LAST_ACTIVITY_BEGIN,
      self.filter_last_activity_begin.as_deref(),
    );
    put_text(
      &mut out,
      Tag::FILTER_LAST_ACTIVITY_END,
      self.filter_last_activity_end.as_deref(),
    );
    put(&mut out, Tag::CHAT_STATE, self.chat_state.map(u8::to_be_bytes));
    put_hex(&mut out, Tag::CONVERSATION_ID, self.conversation_id);
    put_hex(
      &mut out,
      Tag::FOLDER_VERSION_COUNTER,
      self.folder_version_counter,
    );
    put_hex(
      &mut out,
      Tag::FILTER_MESSAGE_HANDLE,
      self.filter_message_handle.map(u128::from),
    );
    put(
      &mut out,
      Tag::NOTIFICATION_FILTER_MASK,
      self.notification_filter_mask.map(u32::to_be_bytes),
    );
    put(
      &mut out,
      Tag::CONV_PARAMETER_MASK,
      self.conv_parameter_mask.map(u32::to_be_bytes),
    );
    put_text(&mut out, Tag::OWNER_UCI, self.owner_uci.as_deref());
    put_text(&mut out, Tag::EXTENDED_DATA, self.extended_data.as_deref());
    put(
      &mut out,
      Tag::MAP_SUPPORTED_FEATURES,
      self.map_supported_features.map(u32::to_be_bytes),
    );

    out
  }

  pub fn from_bytes(data: &[u8]) -> Result<Self> {
    fn fixed<const N: usize>(tag: Tag, value: &[u8]) -> Result<[u8; N]> {
      value.try_into().ok().context(ValueLengthError {
        tag,
        length: value.len(),
      })
    }

    fn text(tag: Tag, value: &[u8]) -> Result<&str> {
      std::str::from_utf8(value).context(TextError { tag })
    }

    fn digits(text: &str) -> &str {
      text
        .strip_prefix("0x")
        .or_else(|| text.strip_prefix("0X"))
        .unwrap_or(text)
    }

    fn hex_64(tag: Tag, value: &[u8]) -> Result<u64> {
      u64::from_str_radix(digits(text(tag, value)?), 16).context(HexError { tag })
    }

    fn hex_128(tag: Tag, value: &[u8]) -> Result<u128> {
      u128::from_str_radix(digits(text(tag, value)?), 16).context(HexError { tag })
    }

    let mut parameters = Self::default();
    let mut offset = 0;

    while offset < data.len() {
      ensure!(data.len() - offset >= 2, TruncatedError { offset });

      let tag = Tag(data[offset]);
      let length = usize::from(data[offset + 1]);
      offset += 2;

      ensure!(data.len() - offset >= length, TruncatedError { offset });

      let value = &data[offset..offset + length];
      offset += length;

      match tag {
        Tag::MAX_LIST_COUNT => {
          parameters.max_list_count = Some(u16::from_be_bytes(fixed(tag, value)?))
        }
        Tag::LIST_START_OFFSET => {
          parameters.list_start_offset = Some(u16::from_be_bytes(fixed(tag, value)?))
        }
        Tag::FILTER_MESSAGE_TYPE => {
          parameters.filter_message_type = Some(u8::from_be_bytes(fixed(tag, value)?))
        }
        Tag::FILTER_PERIOD_BEGIN => {
          parameters.filter_period_begin = Some(text(tag, value)?.into())
        }
        Tag::END_FILTER_PERIOD_END => {
          parameters.end_filter_period_end = Some(text(tag, value)?.into())
        }
        Tag::FILTER_READ_STATUS => {
          parameters.filter_read_status = Some(u8::from_be_bytes(fixed(tag, value)?))
        }
        Tag::ATTACHMENT => parameters.attachment = Some(u8::from_be_bytes(fixed(tag, value)?)),
        Tag::TRANSPARENT => parameters.transparent = Some(u8::from_be_bytes(fixed(tag, value)?)),
        Tag::RETRY => parameters.retry = Some(u8::from_be_bytes(fixed(tag, value)?)),
        Tag::NEW_MESSAGE => parameters.new_message = Some(u8::from_be_bytes(fixed(tag, value)?)),
        Tag::NOTIFICATION_STATUS => {
          parameters.notification_status = Some(u8::from_be_bytes(fixed(tag, value)?))
        }
        Tag::MAS_INSTANCE_ID => {
          parameters.mas_instance_id = Some(u8::from_be_bytes(fixed(tag, value)?))
        }
        Tag::PARAMETER_MASK => {
          parameters.parameter_mask = Some(u32::from_be_bytes(fixed(tag, value)?))
        }
        Tag::FOLDER_LISTING_SIZE => {
          parameters.folder_listing_size = Some(u16::from_be_bytes(fixed(tag, value)?))
        }
        Tag::LISTING_SIZE => {
          parameters.listing_size = Some(u16::from_be_bytes(fixed(tag, value)?))
        }
        Tag::SUBJECT_LENGTH => {
          parameters.subject_length = Some(u8::from_be_bytes(fixed(tag, value)?))
        }
        Tag::CHARSET => parameters.charset = Some(u8::from_be_bytes(fixed(tag, value)?)),
        Tag::FRACTION_REQUEST => {
          parameters.fraction_request = Some(u8::from_be_bytes(fixed(tag, value)?))
        }
        Tag::FRACTION_DELIVER => {
          parameters.fraction_deliver = Some(u8::from_be_bytes(fixed(tag, value)?))
        }
        Tag::STATUS_INDICATOR => {
          parameters.status_indicator = Some(u8::from_be_bytes(fixed(tag, value)?))
        }
        Tag::STATUS_VALUE => {
          parameters.status_value = Some(u8::from_be_bytes(fixed(tag, value)?))
        }
        Tag::MSE_TIME => parameters.mse_time = Some(text(tag, value)?.into()),
        Tag::DATABASE_IDENTIFIER => {
          parameters.database_identifier = Some(hex_128(tag, value)?)
        }
        Tag::CONVERSATION_LISTING_VERSION_COUNTER => {
          parameters.conversation_listing_version_counter = Some(hex_128(tag, value)?)
        }
        Tag::PRESENCE_AVAILABILITY => {
          parameters.presence_availability = Some(u8::from_be_bytes(fixed(tag, value)?))
        }
        Tag::PRESENCE_TEXT => parameters.presence_text = Some(text(tag, value)?.into()),
        Tag::LAST_ACTIVITY => parameters.last_activity = Some(text(tag, value)?.into()),
        Tag::FILTER_LAST_ACTIVITY_BEGIN => {
          parameters.filter_last_activity_begin = Some(text(tag, value)?.into())
        }
        Tag::FILTER_LAST_ACTIVITY_END => {
          parameters.filter_last_activity_end = Some(text(tag, value)?.into())
        }
        Tag::CHAT_STATE => parameters.chat_state = Some(u8::from_be_bytes(fixed(tag, value)?)),
        Tag::CONVERSATION_ID => parameters.conversation_id = Some(hex_128(tag, value)?),
        Tag::FOLDER_VERSION_COUNTER => {
          parameters.folder_version_counter = Some(hex_128(tag, value)?)
        }
        Tag::FILTER_MESSAGE_HANDLE => {
          parameters.filter_message_handle = Some(hex_64(tag, value)?)
        }
        Tag::NOTIFICATION_FILTER_MASK => {
          parameters.notification_filter_mask = Some(u32::from_be_bytes(fixed(tag, value)?))
        }
        Tag::CONV_PARAMETER_MASK => {
          parameters.conv_parameter_mask = Some(u32::from_be_bytes(fixed(tag, value)?))
        }
        Tag::OWNER_UCI => parameters.owner_uci = Some(text(tag, value)?.into()),
        Tag::EXTENDED_DATA => parameters.extended_data = Some(text(tag, value)?.into()),
        Tag::MAP_SUPPORTED_FEATURES => {
          parameters.map_supported_features = Some(u32::from_be_bytes(fixed(tag, value)?))
        }
        Tag(tag) => return Err(Error::Tag { tag }),
      }
    }

    Ok(parameters)
  }
}

/// SDP information for a message access service on the message server.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct MasSdpInfo {
  pub service_record_handle: u32,
  pub rfcomm_channel: u8,
  pub mas_instance_id: u8,
  pub version: Version,
  pub service_name: String,
  pub supported_message_types: SupportedMessageTypes,
  pub supported_features: SupportedFeatures,
  pub goep_l2cap_psm: Option<u16>,
}

impl MasSdpInfo {
  pub const DEFAULT_SERVICE_NAME: &'static str = "MAP MAS";

  pub fn service_record(&self) -> ServiceRecord {
    let mut attributes = vec![
      ServiceAttribute::new(
        sdp::SERVICE_RECORD_HANDLE_ATTRIBUTE_ID,
        DataElement::unsigned_32(self.service_record_handle),
      ),
      ServiceAttribute::new(
        sdp::SERVICE_CLASS_ID_LIST_ATTRIBUTE_ID,
        DataElement::sequence(vec![DataElement::uuid(
          Uuid::MESSAGE_ACCESS_SERVER_SERVICE,
        )]),
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
          DataElement::uuid(Uuid::MESSAGE_ACCESS_SERVICE),
          DataElement::unsigned_16(self.version as u16),
        ])]),
      ),
      ServiceAttribute::new(
        sdp::PRIMARY_LANGUAGE_BASE_ID + sdp::SERVICE_NAME_ATTRIBUTE_ID_OFFSET,
        DataElement::text(self.service_name.as_str()),
      ),
      ServiceAttribute::new(
        MAS_INSTANCE_ID_ATTRIBUTE_ID,
        DataElement::unsigned_8(self.mas_instance_id),
      ),
      ServiceAttribute::new(
        SUPPORTED_MESSAGE_TYPES_ATTRIBUTE_ID,
        DataElement::unsigned_8(self.supported_message_types.0),
      ),
      ServiceAttribute::new(
        MAP_SUPPORTED_FEATURES_ATTRIBUTE_ID,
        DataElement::unsigned_32(self.supported_features.0),
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

    let rfcomm_channel = rfcomm_channel(record).context(IncompleteRecordError)?;

    let version = profile_version(record, Uuid::MESSAGE_ACCESS_SERVICE)
      .context(IncompleteRecordError)?
      .try_into()?;

    let mas_instance_id = record
      .attribute(MAS_INSTANCE_ID_ATTRIBUTE_ID)
      .and_then(DataElement::as_unsigned)
      .and_then(|instance| instance.try_into().ok())
      .context(IncompleteRecordError)?;

    let supported_message_types = record
      .attribute(SUPPORTED_MESSAGE_TYPES_ATTRIBUTE_ID)
      .and_then(DataElement::as_unsigned)
      .and_then(|types| types.try_into().ok())
      .map(SupportedMessageTypes)
      .context(IncompleteRecordError)?;

    let supported_features = record
      .attribute(MAP_SUPPORTED_FEATURES_ATTRIBUTE_ID)
      .and_then(DataElement::as_unsigned)
      .and_then(|features| features.try_into().ok())
      .map(SupportedFeatures)
      .context(IncompleteRecordError)?;

    let goep_l2cap_psm = record
      .attribute(GOEP_L2CAP_PSM_ATTRIBUTE_ID)
      .and_then(DataElement::as_unsigned)
      .and_then(|psm| psm.try_into().ok());

    Ok(Self {
      service_record_handle,
      rfcomm_channel,
      mas_instance_id,
      version,
      service_name: service_name(record, Self::DEFAULT_SERVICE_NAME),
      supported_message_types,
      supported_features,
      goep_l2cap_psm,
    })
  }
}

/// SDP information for a message notification service on the message
/// client.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct MnsSdpInfo {
  pub service_record_handle: u32,
  pub rfcomm_channel: u8,
  pub version: Version,
  pub service_name: String,
  pub supported_features: SupportedFeatures,
  pub goep_l2cap_psm: Option<u16>,
}

impl MnsSdpInfo {
  pub const DEFAULT_SERVICE_NAME: &'static str = "MAP MNS";

  pub fn service_record(&self) -> ServiceRecord {
    let mut attributes = vec![
      ServiceAttribute::new(
        sdp::SERVICE_RECORD_HANDLE_ATTRIBUTE_ID,
        DataElement::unsigned_32(self.service_record_handle),
      ),
      ServiceAttribute::new(
        sdp::SERVICE_CLASS_ID_LIST_ATTRIBUTE_ID,
        DataElement::sequence(vec![DataElement::uuid(
          Uuid::MESSAGE_NOTIFICATION_SERVER_SERVICE,
        )]),
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
          DataElement::uuid(Uuid::MESSAGE_ACCESS_SERVICE),
          DataElement::unsigned_16(self.version as u16),
        ])]),
      ),
      ServiceAttribute::new(
        sdp::PRIMARY_LANGUAGE_BASE_ID + sdp::SERVICE_NAME_ATTRIBUTE_ID_OFFSET,
        DataElement::text(self.service_name.as_str()),
      ),
      ServiceAttribute::new(
        MAP_SUPPORTED_FEATURES_ATTRIBUTE_ID,
        DataElement::unsigned_32(self.supported_features.0),
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

    let rfcomm_channel = rfcomm_channel(record).context(IncompleteRecordError)?;

    let version = profile_version(record, Uuid::MESSAGE_ACCESS_SERVICE)
      .context(IncompleteRecordError)?
      .try_into()?;

    let supported_features = record
      .attribute(MAP_SUPPORTED_FEATURES_ATTRIBUTE_ID)
      .and_then(DataElement::as_unsigned)
      .and_then(|features| features.try_into().ok())
      .map(SupportedFeatures)
      .context(IncompleteRecordError)?;

    let goep_l2cap_psm = record
      .attribute(GOEP_L2CAP_PSM_ATTRIBUTE_ID)
      .and_then(DataElement::as_unsigned)
      .and_then(|psm| psm.try_into().ok());

    Ok(Self {
      service_record_handle,
      rfcomm_channel,
      version,
      service_name: service_name(record, Self::DEFAULT_SERVICE_NAME),
      supported_features,
      goep_l2cap_psm,
    })
  }
}

/// Message notification server. Event reports pushed by the message
/// server come out of the receiver handed back by [`MnsHandler::new`].
pub struct MnsHandler {
  /// Whether a CONNECT request has been answered, accepted or not.
  pub connected: bool,
  events: mpsc::UnboundedSender<Vec<u8>>,
}

impl MnsHandler {
  pub fn new() -> (Self, mpsc::UnboundedReceiver<Vec<u8>>) {
    let (events, receiver) = mpsc::unbounded_channel();

    (
      Self {
        connected: false,
        events,
      },
      receiver,
    )
  }
}

impl Handler for MnsHandler {
  fn on_connect(&mut self, request: &Request) -> ConnectResponse {
    self.connected = true;

    let mut response = ConnectResponse {
      code: ResponseCode::BAD_REQUEST,
      is_final: true,
      version: obex::VERSION_1_0,
      flags: 0,
      maximum_packet_length: MAX_RFCOMM_OBEX_PACKET_LENGTH,
      headers: Headers::default(),
    };

    if let Some(target) = request.headers().target.as_deref() {
      if target == MNS_TARGET_UUID.to_be_bytes() {
        response.code = ResponseCode::SUCCESS;
        response.headers.connection_id = Some(1);
        response.headers.who = Some(target.to_vec());
      }
    }

    response
  }

  fn on_put(&mut self, request: &Request) -> Response {
    let headers = request.headers();

    let body = headers
      .body
      .as_deref()
      .filter(|body| !body.is_empty())
      .or(headers.end_of_body.as_deref())
      .filter(|body| !body.is_empty());

    match body {
      Some(body) if headers.ty.as_deref() == Some(EVENT_REPORT_TYPE) => {
        self.events.send(body.to_vec()).ok();
        Response::new(ResponseCode::SUCCESS)
      }
      _ => Response::new(ResponseCode::BAD_REQUEST),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn target_uuid_bytes() {
    assert_eq!(
      MAS_TARGET_UUID.to_be_bytes(),
      [
        0xBB, 0x58, 0x2B, 0x40, 0x42, 0x0C, 0x11, 0xDB, 0xB0, 0xDE, 0x08, 0x00, 0x20, 0x0C, 0x9A,
        0x66,
      ],
    );
    assert_eq!(
      MNS_TARGET_UUID.to_be_bytes(),
      [
        0xBB, 0x58, 0x2B, 0x41, 0x42, 0x0C, 0x11, 0xDB, 0xB0, 0xDE, 0x08, 0x00, 0x20, 0x0C, 0x9A,
        0x66,
      ],
    );
  }

  #[test]
  fn application_parameters_wire_form() {
    let parameters = ApplicationParameters {
      max_list_count: Some(1024),
      charset: Some(Charset::UTF_8.0),
      conversation_id: Some(0xDEAD_BEEF),
      ..Default::default()
    };

    assert_eq!(
      parameters.to_bytes(),
      [
        &[Tag::MAX_LIST_COUNT.0, 2, 0x04, 0x00][..],
        &[Tag::CHARSET.0, 1, 0x01],
        &[Tag::CONVERSATION_ID.0, 10],
        b"0xdeadbeef",
      ]
      .concat(),
    );
    assert_eq!(
      ApplicationParameters::from_bytes(&parameters.to_bytes()).unwrap(),
      parameters,
    );
  }

  #[test]
  fn application_parameters_round_trip() {
    let parameters = ApplicationParameters {
      max_list_count: Some(50),
      list_start_offset: Some(10),
      filter_message_type: Some((FilterMessageType::SMS_GSM | FilterMessageType::EMAIL).0),
      filter_period_begin: Some("20240101T000000".into()),
      attachment: Some(1),
      notification_status: Some(1),
      mas_instance_id: Some(3),
      parameter_mask: Some((PropertyMask::SUBJECT | PropertyMask::DATETIME).0),
      charset: Some(Charset::UTF_8.0),
      mse_time: Some("20240601T120000+0200".into()),
      database_identifier: Some(0x1234_5678_9ABC_DEF0_1122_3344_5566_7788),
      conversation_id: Some(0),
      folder_version_counter: Some(u128::MAX),
      filter_message_handle: Some(0xFEDC_BA98_7654_3210),
      map_supported_features: Some(
        (SupportedFeatures::NOTIFICATION_REGISTRATION_FEATURE
          | SupportedFeatures::NOTIFICATION_FEATURE)
          .0,
      ),
      ..Default::default()
    };

    assert_eq!(
      ApplicationParameters::from_bytes(&parameters.to_bytes()).unwrap(),
      parameters,
    );
  }

  #[test]
  fn hexadecimal_values_accept_bare_digits() {
    let parameters = ApplicationParameters::from_bytes(
      &[&[Tag::FILTER_MESSAGE_HANDLE.0, 4][..], b"BEEF"].concat(),
    )
    .unwrap();
    assert_eq!(parameters.filter_message_handle, Some(0xBEEF));

    let parameters = ApplicationParameters::from_bytes(
      &[&[Tag::CONVERSATION_ID.0, 4][..], b"0X1f"].concat(),
    )
    .unwrap();
    assert_eq!(parameters.conversation_id, Some(0x1F));
  }

  #[test]
  fn application_parameter_errors() {
    assert!(matches!(
      ApplicationParameters::from_bytes(&[0x07, 1, 0]),
      Err(Error::Tag { tag: 0x07 }),
    ));

    assert!(matches!(
      ApplicationParameters::from_bytes(&[0x01]),
      Err(Error::Truncated { offset: 0 }),
    ));

    assert!(matches!(
      ApplicationParameters::from_bytes(&[0x01, 4, 0, 0]),
      Err(Error::Truncated { offset: 2 }),
    ));

    assert!(matches!(
      ApplicationParameters::from_bytes(&[0x01, 1, 0]),
      Err(Error::ValueLength {
        tag: Tag::MAX_LIST_COUNT,
        length: 1,
      }),
    ));

    assert!(matches!(
      ApplicationParameters::from_bytes(&[&[Tag::CONVERSATION_ID.0, 2][..], b"zz"].concat()),
      Err(Error::Hex {
        tag: Tag::CONVERSATION_ID,
        ..
      }),
    ));

    assert!(matches!(
      ApplicationParameters::from_bytes(&[Tag::MSE_TIME.0, 1, 0xFF]),
      Err(Error::Text {
        tag: Tag::MSE_TIME,
        ..
      }),
    ));
  }

  #[test]
  fn message_type_bit_layouts_differ() {
    assert_eq!(SupportedMessageTypes::EMAIL.0, 1 << 0);
    assert_eq!(SupportedMessageTypes::SMS_GSM.0, 1 << 1);
    assert_eq!(FilterMessageType::EMAIL.0, 1 << 2);
    assert_eq!(FilterMessageType::SMS_GSM.0, 1 << 0);

    let types = SupportedMessageTypes::EMAIL | SupportedMessageTypes::MMS;
    assert!(types.contains(SupportedMessageTypes::MMS));
    assert!(!types.contains(SupportedMessageTypes::IM));
  }

  #[test]
  fn mas_record_round_trips() {
    let info = MasSdpInfo {
      service_record_handle: 0x00010003,
      rfcomm_channel: 5,
      mas_instance_id: 0,
      version: Version::V1_4,
      service_name: MasSdpInfo::DEFAULT_SERVICE_NAME.into(),
      supported_message_types: SupportedMessageTypes::SMS_GSM | SupportedMessageTypes::EMAIL,
      supported_features: SupportedFeatures::NOTIFICATION_REGISTRATION_FEATURE
        | SupportedFeatures::BROWSING_FEATURE,
      goep_l2cap_psm: Some(0x1005),
    };

    let record = info.service_record();

    let protocols = record
      .attribute(sdp::PROTOCOL_DESCRIPTOR_LIST_ATTRIBUTE_ID)
      .and_then(DataElement::as_sequence)
      .unwrap();
    assert_eq!(
      protocols[2],
      DataElement::sequence(vec![DataElement::uuid(Uuid::OBEX_PROTOCOL)]),
    );
    assert_eq!(
      record.service_class_ids(),
      [Uuid::MESSAGE_ACCESS_SERVER_SERVICE],
    );

    assert_eq!(MasSdpInfo::from_record(&record).unwrap(), info);

    let info = MasSdpInfo {
      goep_l2cap_psm: None,
      ..info
    };
    assert_eq!(MasSdpInfo::from_record(&info.service_record()).unwrap(), info);
  }

  #[test]
  fn mns_record_round_trips() {
    let info = MnsSdpInfo {
      service_record_handle: 0x00010004,
      rfcomm_channel: 6,
      version: Version::V1_2,
      service_name: "My MNS".into(),
      supported_features: SupportedFeatures::NOTIFICATION_FEATURE,
      goep_l2cap_psm: None,
    };

    let record = info.service_record();
    assert_eq!(
      record.service_class_ids(),
      [Uuid::MESSAGE_NOTIFICATION_SERVER_SERVICE],
    );
    assert_eq!(MnsSdpInfo::from_record(&record).unwrap(), info);

    let stripped = ServiceRecord::new(
      record
        .attributes()
        .iter()
        .filter(|attribute| {
          attribute.id != sdp::PRIMARY_LANGUAGE_BASE_ID + sdp::SERVICE_NAME_ATTRIBUTE_ID_OFFSET
        })
        .cloned()
        .collect(),
    );
    assert_eq!(
      MnsSdpInfo::from_record(&stripped).unwrap().service_name,
      MnsSdpInfo::DEFAULT_SERVICE_NAME,
    );

    assert!(matches!(
      MnsSdpInfo::from_record(&ServiceRecord::new(Vec::new())),
      Err(Error::IncompleteRecord),
    ));
  }

  #[tokio::test]
  async fn mns_handler_accepts_event_reports() {
    let (client_end, server_end) = tokio::io::duplex(0x4000);

    let (handler, mut events) = MnsHandler::new();

    let server = tokio::spawn(async move {
      let mut session = obex::ServerSession::new(server_end, handler);
      session.serve().await.unwrap();
      session.into_handler()
    });

    let mut client = ClientSession::new(client_end);

    let response = client
      .send_connect_request(&Request::Connect {
        is_final: true,
        version: obex::VERSION_1_0,
        flags: 0,
        maximum_packet_length: 0x2000,
        headers: Headers {
          target: Some(MNS_TARGET_UUID.to_be_bytes()),
          ..Default::default()
        },
      })
      .await
      .unwrap();

    assert_eq!(response.code, ResponseCode::SUCCESS);
    assert_eq!(response.maximum_packet_length, MAX_RFCOMM_OBEX_PACKET_LENGTH);
    assert_eq!(response.headers.connection_id, Some(1));
    assert_eq!(
      response.headers.who.as_deref(),
      Some(MNS_TARGET_UUID.to_be_bytes().as_slice()),
    );

    let response = client
      .send_request(&Request::put(
        true,
        Headers {
          connection_id: Some(1),
          ty: Some(EVENT_REPORT_TYPE.to_vec()),
          end_of_body: Some(b"<MAP-event-report version=\"1.0\"/>".to_vec()),
          ..Default::default()
        },
      ))
      .await
      .unwrap();
    assert_eq!(response.code, ResponseCode::SUCCESS);
    assert_eq!(
      events.recv().await.unwrap(),
      b"<MAP-event-report version=\"1.0\"/>",
    );

    let response = client
      .send_request(&Request::put(
        true,
        Headers {
          ty: Some(MESSAGE_TYPE.to_vec()),
          end_of_body: Some(b"BEGIN:BMSG\r\nEND:BMSG\r\n".to_vec()),
          ..Default::default()
        },
      ))
      .await
      .unwrap();
    assert_eq!(response.code, ResponseCode::BAD_REQUEST);

    let response = client
      .send_request(&Request::put(
        true,
        Headers {
          ty: Some(EVENT_REPORT_TYPE.to_vec()),
          end_of_body: Some(Vec::new()),
          ..Default::default()
        },
      ))
      .await
      .unwrap();
    assert_eq!(response.code, ResponseCode::BAD_REQUEST);

    drop(client);

    let handler = server.await.unwrap();
    assert!(handler.connected);
  }

  #[tokio::test]
  async fn mns_handler_rejects_unknown_targets() {
    let (client_end, server_end) = tokio::io::duplex(0x4000);

    let (handler, _events) = MnsHandler::new();

    let server = tokio::spawn(async move {
      let mut session = obex::ServerSession::new(server_end, handler);
      session.serve().await.unwrap();
      session.into_handler()
    });

    let mut client = ClientSession::new(client_end);

    let response = client
      .send_connect_request(&Request::Connect {
        is_final: true,
        version: obex::VERSION_1_0,
        flags: 0,
        maximum_packet_length: 0x2000,
        headers: Headers {
          target: Some(MAS_TARGET_UUID.to_be_bytes()),
          ..Default::default()
        },
      })
      .await
      .unwrap();

    assert_eq!(response.code, ResponseCode::BAD_REQUEST);
    assert_eq!(response.headers.connection_id, None);
    assert_eq!(response.headers.who, None);

    drop(client);

    let handler = server.await.unwrap();
    assert!(handler.connected);
  }
}

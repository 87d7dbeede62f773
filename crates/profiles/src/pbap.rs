//! Phone Book Access Profile, version 1.2: PSE and PCE service records
//! and the application parameters header carried in PBAP requests.

use super::*;

pub const GOEP_L2CAP_PSM_ATTRIBUTE_ID: u16 = 0x0200;
pub const PBAP_SUPPORTED_FEATURES_ATTRIBUTE_ID: u16 = 0x0317;
pub const SUPPORTED_REPOSITORIES_ATTRIBUTE_ID: u16 = 0x0314;

/// Carried in the CONNECT request target header.
pub const TARGET_UUID: Uuid = Uuid::Uuid128(0x796135f0_f0c5_11d8_0966_0800200c9a66);

#[derive(Debug, Snafu)]
#[snafu(context(suffix(Error)))]
pub enum Error {
  #[snafu(display("incomplete PBAP service record"))]
  IncompleteRecord,
  #[snafu(display("unknown application parameter tag 0x{tag:02X}"))]
  Tag { tag: u8 },
  #[snafu(display("truncated application parameters at offset {offset}"))]
  Truncated { offset: usize },
  #[snafu(display("bad length {length} for application parameter {tag}"))]
  ValueLength { tag: Tag, length: usize },
  #[snafu(display("unsupported PBAP version 0x{value:04X}"))]
  Version { value: u16 },
}

type Result<T = (), E = Error> = std::result::Result<T, E>;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Version {
  V1_0 = 0x0100,
  V1_1 = 0x0101,
  V1_2 = 0x0102,
}

impl TryFrom<u16> for Version {
  type Error = Error;

  fn try_from(value: u16) -> Result<Self> {
    match value {
      0x0100 => Ok(Self::V1_0),
      0x0101 => Ok(Self::V1_1),
      0x0102 => Ok(Self::V1_2),
      value => Err(Error::Version { value }),
    }
  }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct SupportedRepositories(pub u8);

impl SupportedRepositories {
  pub const FAVORITES: Self = Self(0x08);
  pub const LOCAL_PHONEBOOK: Self = Self(0x01);
  pub const SIM_CARD: Self = Self(0x02);
  pub const SPEED_DIAL: Self = Self(0x04);

  pub fn contains(self, other: Self) -> bool {
    self.0 & other.0 == other.0
  }
}

impl BitOr for SupportedRepositories {
  type Output = Self;

  fn bitor(self, other: Self) -> Self {
    Self(self.0 | other.0)
  }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct SupportedFeatures(pub u32);

impl SupportedFeatures {
  pub const BROWSING: Self = Self(0x0002);
  pub const CONTACT_REFERENCING: Self = Self(0x0100);
  pub const DATABASE_IDENTIFIER: Self = Self(0x0004);
  pub const DEFAULT_CONTACT_IMAGE_FORMAT: Self = Self(0x0200);
  pub const DOWNLOAD: Self = Self(0x0001);
  pub const ENHANCED_MISSED_CALLS: Self = Self(0x0020);
  pub const FOLDER_VERSION_COUNTERS: Self = Self(0x0008);
  pub const VCARD_SELECTING: Self = Self(0x0010);
  pub const X_BT_UCI_VCARD_PROPERTY: Self = Self(0x0040);
  pub const X_BT_UID_VCARD_PROPERTY: Self = Self(0x0080);

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

/// vCard property selector bits. Bits 32 through 38 are reserved.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct PropertyMask(pub u64);

impl PropertyMask {
  pub const ADR: Self = Self(1 << 5);
  pub const AGENT: Self = Self(1 << 15);
  pub const BDAY: Self = Self(1 << 4);
  pub const CATEGORIES: Self = Self(1 << 24);
  pub const CLASS: Self = Self(1 << 26);
  pub const EMAIL: Self = Self(1 << 8);
  pub const FN: Self = Self(1 << 1);
  pub const GEO: Self = Self(1 << 11);
  pub const KEY: Self = Self(1 << 22);
  pub const LABEL: Self = Self(1 << 6);
  pub const LOGO: Self = Self(1 << 14);
  pub const MAILER: Self = Self(1 << 9);
  pub const N: Self = Self(1 << 2);
  pub const NICKNAME: Self = Self(1 << 23);
  pub const NOTE: Self = Self(1 << 17);
  pub const ORG: Self = Self(1 << 16);
  pub const PHOTO: Self = Self(1 << 3);
  pub const PROID: Self = Self(1 << 25);
  pub const PROPRIETARY_FILTER: Self = Self(1 << 39);
  pub const REV: Self = Self(1 << 18);
  pub const ROLE: Self = Self(1 << 13);
  pub const SORT_STRING: Self = Self(1 << 27);
  pub const SOUND: Self = Self(1 << 19);
  pub const TEL: Self = Self(1 << 7);
  pub const TITLE: Self = Self(1 << 12);
  pub const TZ: Self = Self(1 << 10);
  pub const UID: Self = Self(1 << 21);
  pub const URL: Self = Self(1 << 20);
  pub const VERSION: Self = Self(1 << 0);
  pub const X_BT_SPEEDDIALKEY: Self = Self(1 << 29);
  pub const X_BT_UCI: Self = Self(1 << 30);
  pub const X_BT_UID: Self = Self(1 << 31);
  pub const X_IRMC_CALL_DATETIME: Self = Self(1 << 28);

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
pub enum Order {
  Indexed = 0x00,
  Alphanumeric = 0x01,
  Phonetic = 0x02,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SearchProperty {
  Name = 0x00,
  Number = 0x01,
  Sound = 0x02,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Format {
  V2_1 = 0x00,
  V3_0 = 0x01,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum VCardSelectorOperator {
  Or = 0x00,
  And = 0x01,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ResetNewMissedCalls {
  Reset = 0x01,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Tag(pub u8);

impl Tag {
  pub const DATABASE_IDENTIFIER: Self = Self(0x0D);
  pub const FORMAT: Self = Self(0x07);
  pub const LIST_START_OFFSET: Self = Self(0x05);
  pub const MAX_LIST_COUNT: Self = Self(0x04);
  pub const NEW_MISSED_CALLS: Self = Self(0x09);
  pub const ORDER: Self = Self(0x01);
  pub const PBAP_SUPPORTED_FEATURES: Self = Self(0x10);
  pub const PHONEBOOK_SIZE: Self = Self(0x08);
  pub const PRIMARY_FOLDER_VERSION: Self = Self(0x0A);
  pub const PROPERTY_SELECTOR: Self = Self(0x06);
  pub const RESET_NEW_MISSED_CALLS: Self = Self(0x0F);
  pub const SEARCH_PROPERTY: Self = Self(0x03);
  pub const SEARCH_VALUE: Self = Self(0x02);
  pub const SECONDARY_FOLDER_VERSION: Self = Self(0x0B);
  pub const V_CARD_SELECTOR: Self = Self(0x0C);
  pub const V_CARD_SELECTOR_OPERATOR: Self = Self(0x0E);

  fn name(self) -> Option<&'static str> {
    match self {
      Self::DATABASE_IDENTIFIER => Some("DATABASE_IDENTIFIER"),
      Self::FORMAT => Some("FORMAT"),
      Self::LIST_START_OFFSET => Some("LIST_START_OFFSET"),
      Self::MAX_LIST_COUNT => Some("MAX_LIST_COUNT"),
      Self::NEW_MISSED_CALLS => Some("NEW_MISSED_CALLS"),
      Self::ORDER => Some("ORDER"),
      Self::PBAP_SUPPORTED_FEATURES => Some("PBAP_SUPPORTED_FEATURES"),
      Self::PHONEBOOK_SIZE => Some("PHONEBOOK_SIZE"),
      Self::PRIMARY_FOLDER_VERSION => Some("PRIMARY_FOLDER_VERSION"),
      Self::PROPERTY_SELECTOR => Some("PROPERTY_SELECTOR"),
      Self::RESET_NEW_MISSED_CALLS => Some("RESET_NEW_MISSED_CALLS"),
      Self::SEARCH_PROPERTY => Some("SEARCH_PROPERTY"),
      Self::SEARCH_VALUE => Some("SEARCH_VALUE"),
      Self::SECONDARY_FOLDER_VERSION => Some("SECONDARY_FOLDER_VERSION"),
      Self::V_CARD_SELECTOR => Some("V_CARD_SELECTOR"),
      Self::V_CARD_SELECTOR_OPERATOR => Some("V_CARD_SELECTOR_OPERATOR"),
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

/// The PBAP application parameters header. Fields are declared in tag
/// order, and serialization emits them in that order.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ApplicationParameters {
  pub order: Option<u8>,
  pub search_value: Option<Vec<u8>>,
  pub search_property: Option<u8>,
  pub max_list_count: Option<u16>,
  pub list_start_offset: Option<u16>,
  pub property_selector: Option<u64>,
  pub format: Option<u8>,
  pub phonebook_size: Option<u16>,
  pub new_missed_calls: Option<u8>,
  pub primary_folder_version: Option<u128>,
  pub secondary_folder_version: Option<u128>,
  pub v_card_selector: Option<u64>,
  pub database_identifier: Option<u128>,
  pub v_card_selector_operator: Option<u8>,
  pub reset_new_missed_calls: Option<u8>,
  pub pbap_supported_features: Option<u32>,
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

    let mut out = Vec::new();

    put(&mut out, Tag::ORDER, self.order.map(u8::to_be_bytes));

    if let Some(search_value) = &self.search_value {
      assert!(
        search_value.len() <= usize::from(u8::MAX),
        "search value too long",
      );
      out.push(Tag::SEARCH_VALUE.0);
      out.push(search_value.len().try_into().unwrap());
      out.extend_from_slice(search_value);
    }

    put(
      &mut out,
      Tag::SEARCH_PROPERTY,
      self.search_property.map(u8::to_be_bytes),
    );
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
      Tag::PROPERTY_SELECTOR,
      self.property_selector.map(u64::to_be_bytes),
    );
    put(&mut out, Tag::FORMAT, self.format.map(u8::to_be_bytes));
    put(
      &mut out,
      Tag::PHONEBOOK_SIZE,
      self.phonebook_size.map(u16::to_be_bytes),
    );
    put(
      &mut out,
      Tag::NEW_MISSED_CALLS,
      self.new_missed_calls.map(u8::to_be_bytes),
    );
    put(
      &mut out,
      Tag::PRIMARY_FOLDER_VERSION,
      self.primary_folder_version.map(u128::to_be_bytes),
    );
    put(
      &mut out,
      Tag::SECONDARY_FOLDER_VERSION,
      self.secondary_folder_version.map(u128::to_be_bytes),
    );
    put(
      &mut out,
      Tag::V_CARD_SELECTOR,
      self.v_card_selector.map(u64::to_be_bytes),
    );
    put(
      &mut out,
      Tag::DATABASE_IDENTIFIER,
      self.database_identifier.map(u128::to_be_bytes),
    );
    put(
      &mut out,
      Tag::V_CARD_SELECTOR_OPERATOR,
      self.v_card_selector_operator.map(u8::to_be_bytes),
    );
    put(
      &mut out,
      Tag::RESET_NEW_MISSED_CALLS,
      self.reset_new_missed_calls.map(u8::to_be_bytes),
    );
    put(
      &mut out,
      Tag::PBAP_SUPPORTED_FEATURES,
      self.pbap_supported_features.map(u32::to_be_bytes),
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
        Tag::ORDER => parameters.order = Some(u8::from_be_bytes(fixed(tag, value)?)),
        Tag::SEARCH_VALUE => parameters.search_value = Some(value.to_vec()),
        Tag::SEARCH_PROPERTY => {
          parameters.search_property = Some(u8::from_be_bytes(fixed(tag, value)?))
        }
        Tag::MAX_LIST_COUNT => {
          parameters.max_list_count = Some(u16::from_be_bytes(fixed(tag, value)?))
        }
        Tag::LIST_START_OFFSET => {
          parameters.list_start_offset = Some(u16::from_be_bytes(fixed(tag, value)?))
        }
        Tag::PROPERTY_SELECTOR => {
          parameters.property_selector = Some(u64::from_be_bytes(fixed(tag, value)?))
        }
        Tag::FORMAT => parameters.format = Some(u8::from_be_bytes(fixed(tag, value)?)),
        Tag::PHONEBOOK_SIZE => {
          parameters.phonebook_size = Some(u16::from_be_bytes(fixed(tag, value)?))
        }
        Tag::NEW_MISSED_CALLS => {
          parameters.new_missed_calls = Some(u8::from_be_bytes(fixed(tag, value)?))
        }
        Tag::PRIMARY_FOLDER_VERSION => {
          parameters.primary_folder_version = Some(u128::from_be_bytes(fixed(tag, value)?))
        }
        Tag::SECONDARY_FOLDER_VERSION => {
          parameters.secondary_folder_version = Some(u128::from_be_bytes(fixed(tag, value)?))
        }
        Tag::V_CARD_SELECTOR => {
          parameters.v_card_selector = Some(u64::from_be_bytes(fixed(tag, value)?))
        }
        Tag::DATABASE_IDENTIFIER => {
          parameters.database_identifier = Some(u128::from_be_bytes(fixed(tag, value)?))
        }
        Tag::V_CARD_SELECTOR_OPERATOR => {
          parameters.v_card_selector_operator = Some(u8::from_be_bytes(fixed(tag, value)?))
        }
        Tag::RESET_NEW_MISSED_CALLS => {
          parameters.reset_new_missed_calls = Some(u8::from_be_bytes(fixed(tag, value)?))
        }
        Tag::PBAP_SUPPORTED_FEATURES => {
          parameters.pbap_supported_features = Some(u32::from_be_bytes(fixed(tag, value)?))
        }
        Tag(tag) => return Err(Error::Tag { tag }),
      }
    }

    Ok(parameters)
  }
}

/// SDP information for a phone book server.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PseSdpInfo {
  pub service_record_handle: u32,
  pub rfcomm_channel: u8,
  pub version: Version,
  pub service_name: String,
  pub supported_repositories: SupportedRepositories,
  pub supported_features: SupportedFeatures,
  pub goep_l2cap_psm: Option<u16>,
}

impl PseSdpInfo {
  pub const DEFAULT_SERVICE_NAME: &'static str = "Phonebook Access PSE";

  pub fn service_record(&self) -> ServiceRecord {
    let mut attributes = vec![
      ServiceAttribute::new(
        sdp::SERVICE_RECORD_HANDLE_ATTRIBUTE_ID,
        DataElement::unsigned_32(self.service_record_handle),
      ),
      ServiceAttribute::new(
        sdp::SERVICE_CLASS_ID_LIST_ATTRIBUTE_ID,
        DataElement::sequence(vec![DataElement::uuid(
          Uuid::PHONEBOOK_ACCESS_PSE_SERVICE,
        )]),
      ),
      // The third protocol entry names the PSE service itself, not OBEX.
      ServiceAttribute::new(
        sdp::PROTOCOL_DESCRIPTOR_LIST_ATTRIBUTE_ID,
        DataElement::sequence(vec![
          DataElement::sequence(vec![DataElement::uuid(Uuid::L2CAP_PROTOCOL)]),
          DataElement::sequence(vec![
            DataElement::uuid(Uuid::RFCOMM_PROTOCOL),
            DataElement::unsigned_8(self.rfcomm_channel),
          ]),
          DataElement::sequence(vec![DataElement::uuid(
            Uuid::PHONEBOOK_ACCESS_PSE_SERVICE,
          )]),
        ]),
      ),
      ServiceAttribute::new(
        sdp::BLUETOOTH_PROFILE_DESCRIPTOR_LIST_ATTRIBUTE_ID,
        DataElement::sequence(vec![DataElement::sequence(vec![
          DataElement::uuid(Uuid::PHONEBOOK_ACCESS_SERVICE),
          DataElement::unsigned_16(self.version as u16),
        ])]),
      ),
      ServiceAttribute::new(
        sdp::PRIMARY_LANGUAGE_BASE_ID + sdp::SERVICE_NAME_ATTRIBUTE_ID_OFFSET,
        DataElement::text(self.service_name.as_str()),
      ),
      ServiceAttribute::new(
        SUPPORTED_REPOSITORIES_ATTRIBUTE_ID,
        DataElement::unsigned_8(self.supported_repositories.0),
      ),
      ServiceAttribute::new(
        PBAP_SUPPORTED_FEATURES_ATTRIBUTE_ID,
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

    let version = profile_version(record, Uuid::PHONEBOOK_ACCESS_SERVICE)
      .context(IncompleteRecordError)?
      .try_into()?;

    let supported_repositories = record
      .attribute(SUPPORTED_REPOSITORIES_ATTRIBUTE_ID)
      .and_then(DataElement::as_unsigned)
      .and_then(|repositories| repositories.try_into().ok())
      .map(SupportedRepositories)
      .context(IncompleteRecordError)?;

    let supported_features = record
      .attribute(PBAP_SUPPORTED_FEATURES_ATTRIBUTE_ID)
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
      supported_repositories,
      supported_features,
      goep_l2cap_psm,
    })
  }
}

/// SDP information for a phone book client.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PceSdpInfo {
  pub service_record_handle: u32,
  pub version: Version,
  pub service_name: String,
}

impl PceSdpInfo {
  pub const DEFAULT_SERVICE_NAME: &'static str = "Phonebook Access PCE";

  pub fn service_record(&self) -> ServiceRecord {
    ServiceRecord::new(vec![
      ServiceAttribute::new(
        sdp::SERVICE_RECORD_HANDLE_ATTRIBUTE_ID,
        DataElement::unsigned_32(self.service_record_handle),
      ),
      ServiceAttribute::new(
        sdp::SERVICE_CLASS_ID_LIST_ATTRIBUTE_ID,
        DataElement::sequence(vec![DataElement::uuid(
          Uuid::PHONEBOOK_ACCESS_PCE_SERVICE,
        )]),
      ),
      ServiceAttribute::new(
        sdp::BLUETOOTH_PROFILE_DESCRIPTOR_LIST_ATTRIBUTE_ID,
        DataElement::sequence(vec![DataElement::sequence(vec![
          DataElement::uuid(Uuid::PHONEBOOK_ACCESS_SERVICE),
          DataElement::unsigned_16(self.version as u16),
        ])]),
      ),
      ServiceAttribute::new(
        sdp::PRIMARY_LANGUAGE_BASE_ID + sdp::SERVICE_NAME_ATTRIBUTE_ID_OFFSET,
        DataElement::text(self.service_name.as_str()),
      ),
    ])
  }

  pub fn from_record(record: &ServiceRecord) -> Result<Self> {
    let service_record_handle = record
      .attribute(sdp::SERVICE_RECORD_HANDLE_ATTRIBUTE_ID)
      .and_then(DataElement::as_unsigned)
      .and_then(|handle| handle.try_into().ok())
      .context(IncompleteRecordError)?;

    let version = profile_version(record, Uuid::PHONEBOOK_ACCESS_SERVICE)
      .context(IncompleteRecordError)?
      .try_into()?;

    Ok(Self {
      service_record_handle,
      version,
      service_name: service_name(record, Self::DEFAULT_SERVICE_NAME),
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn target_uuid_bytes() {
    assert_eq!(
      TARGET_UUID.to_be_bytes(),
      [
        0x79, 0x61, 0x35, 0xF0, 0xF0, 0xC5, 0x11, 0xD8, 0x09, 0x66, 0x08, 0x00, 0x20, 0x0C, 0x9A,
        0x66,
      ],
    );
  }

  #[test]
  fn application_parameters_wire_form() {
    let parameters = ApplicationParameters {
      max_list_count: Some(0x1234),
      format: Some(Format::V2_1 as u8),
      ..Default::default()
    };

    assert_eq!(parameters.to_bytes(), [0x04, 2, 0x12, 0x34, 0x07, 1, 0x00]);
    assert_eq!(
      ApplicationParameters::from_bytes(&parameters.to_bytes()).unwrap(),
      parameters,
    );
  }

  #[test]
  fn application_parameters_round_trip() {
    let parameters = ApplicationParameters {
      order: Some(Order::Alphanumeric as u8),
      search_value: Some(b"Smith".to_vec()),
      search_property: Some(SearchProperty::Name as u8),
      list_start_offset: Some(10),
      property_selector: Some((PropertyMask::FN | PropertyMask::TEL).0),
      phonebook_size: Some(42),
      new_missed_calls: Some(3),
      primary_folder_version: Some(0x0102_0304_0506_0708_090A_0B0C_0D0E_0F10),
      v_card_selector_operator: Some(VCardSelectorOperator::And as u8),
      reset_new_missed_calls: Some(ResetNewMissedCalls::Reset as u8),
      pbap_supported_features: Some((SupportedFeatures::DOWNLOAD | SupportedFeatures::BROWSING).0),
      ..Default::default()
    };

    assert_eq!(
      ApplicationParameters::from_bytes(&parameters.to_bytes()).unwrap(),
      parameters,
    );
  }

  #[test]
  fn application_parameter_errors() {
    assert!(matches!(
      ApplicationParameters::from_bytes(&[0x11, 1, 0]),
      Err(Error::Tag { tag: 0x11 }),
    ));

    assert!(matches!(
      ApplicationParameters::from_bytes(&[0x04]),
      Err(Error::Truncated { offset: 0 }),
    ));

    assert!(matches!(
      ApplicationParameters::from_bytes(&[0x04, 4, 0, 0]),
      Err(Error::Truncated { offset: 2 }),
    ));

    assert!(matches!(
      ApplicationParameters::from_bytes(&[0x04, 1, 0]),
      Err(Error::ValueLength {
        tag: Tag::MAX_LIST_COUNT,
        length: 1,
      }),
    ));
  }

  #[test]
  fn masks() {
    let features = SupportedFeatures::DOWNLOAD | SupportedFeatures::BROWSING;
    assert_eq!(features.0, 0x0003);
    assert!(features.contains(SupportedFeatures::DOWNLOAD));
    assert!(!features.contains(SupportedFeatures::VCARD_SELECTING));

    let mask = PropertyMask::VERSION | PropertyMask::FN | PropertyMask::N | PropertyMask::TEL;
    assert_eq!(mask.0, 0b1000_0111);
    assert_eq!(PropertyMask::PROPRIETARY_FILTER.0, 1 << 39);

    let repositories = SupportedRepositories::LOCAL_PHONEBOOK | SupportedRepositories::FAVORITES;
    assert!(repositories.contains(SupportedRepositories::FAVORITES));
    assert!(!repositories.contains(SupportedRepositories::SIM_CARD));
  }

  #[test]
  fn pse_record_round_trips() {
    let info = PseSdpInfo {
      service_record_handle: 0x00010002,
      rfcomm_channel: 7,
      version: Version::V1_2,
      service_name: PseSdpInfo::DEFAULT_SERVICE_NAME.into(),
      supported_repositories: SupportedRepositories::LOCAL_PHONEBOOK
        | SupportedRepositories::SIM_CARD,
      supported_features: SupportedFeatures::DOWNLOAD | SupportedFeatures::BROWSING,
      goep_l2cap_psm: Some(0x1003),
    };

    let record = info.service_record();

    let protocols = record
      .attribute(sdp::PROTOCOL_DESCRIPTOR_LIST_ATTRIBUTE_ID)
      .and_then(DataElement::as_sequence)
      .unwrap();
    assert_eq!(
      protocols[2],
      DataElement::sequence(vec![DataElement::uuid(
        Uuid::PHONEBOOK_ACCESS_PSE_SERVICE,
      )]),
    );

    assert_eq!(PseSdpInfo::from_record(&record).unwrap(), info);

    let info = PseSdpInfo {
      goep_l2cap_psm: None,
      ..info
    };
    assert_eq!(PseSdpInfo::from_record(&info.service_record()).unwrap(), info);
  }

  #[test]
  fn pce_record_round_trips() {
    let info = PceSdpInfo {
      service_record_handle: 3,
      version: Version::V1_1,
      service_name: "My PCE".into(),
    };

    let record = info.service_record();
    assert_eq!(
      record.service_class_ids(),
      [Uuid::PHONEBOOK_ACCESS_PCE_SERVICE],
    );
    assert_eq!(PceSdpInfo::from_record(&record).unwrap(), info);

    assert!(matches!(
      PceSdpInfo::from_record(&ServiceRecord::new(Vec::new())),
      Err(Error::IncompleteRecord),
    ));
  }

  #[test]
  fn version_values_are_strict() {
    assert_eq!(Version::try_from(0x0102).unwrap(), Version::V1_2);
    assert!(matches!(
      Version::try_from(0x0103),
      Err(Error::Version { value: 0x0103 }),
    ));
  }
}

use super::*;

pub const SERVICE_RECORD_HANDLE_ATTRIBUTE_ID: u16 = 0x0000;
pub const SERVICE_CLASS_ID_LIST_ATTRIBUTE_ID: u16 = 0x0001;
pub const PROTOCOL_DESCRIPTOR_LIST_ATTRIBUTE_ID: u16 = 0x0004;
pub const BROWSE_GROUP_LIST_ATTRIBUTE_ID: u16 = 0x0005;
pub const LANGUAGE_BASE_ATTRIBUTE_ID_LIST_ATTRIBUTE_ID: u16 = 0x0006;
pub const BLUETOOTH_PROFILE_DESCRIPTOR_LIST_ATTRIBUTE_ID: u16 = 0x0009;
pub const ADDITIONAL_PROTOCOL_DESCRIPTOR_LIST_ATTRIBUTE_ID: u16 = 0x000D;

pub const SERVICE_NAME_ATTRIBUTE_ID_OFFSET: u16 = 0x0000;
pub const SERVICE_DESCRIPTION_ATTRIBUTE_ID_OFFSET: u16 = 0x0001;

pub const LANGUAGE_ENGLISH: u16 = 0x656E;
pub const ENCODING_UTF8: u16 = 0x006A;
pub const PRIMARY_LANGUAGE_BASE_ID: u16 = 0x0100;

const MAX_DEPTH: usize = 16;

#[derive(Debug, Snafu)]
#[snafu(context(suffix(Error)))]
pub enum Error {
  #[snafu(display("attribute id must be a 16-bit unsigned integer"))]
  AttributeId,
  #[snafu(display("attribute list must pair ids with values"))]
  AttributeList,
  #[snafu(display("data element nested deeper than {MAX_DEPTH} levels"))]
  Depth,
  #[snafu(display("invalid size index {size_index} for type index {type_index}"))]
  SizeIndex { type_index: u8, size_index: u8 },
  #[snafu(display("{len} bytes of trailing data after element"))]
  TrailingData { len: usize },
  #[snafu(display("data element truncated: need {need} bytes at offset {offset}"))]
  Truncated { offset: usize, need: usize },
  #[snafu(display("invalid type index {type_index}"))]
  TypeIndex { type_index: u8 },
  #[snafu(display("invalid UUID in data element"))]
  Uuid { source: uuid::Error },
  #[snafu(display("text element is not valid UTF-8"))]
  Utf8 { source: std::string::FromUtf8Error },
}

/// An SDP data element, see Bluetooth Core, Vol 3, Part B, Section 3.
///
/// The wire form is a descriptor byte, type index in the top five bits and
/// size index in the bottom three, followed by a big-endian payload. Size
/// indexes 0 through 4 are fixed widths of 1, 2, 4, 8, and 16 bytes; 5, 6,
/// and 7 prefix the payload with a u8, u16, or u32 length.
#[derive(Clone, Debug, PartialEq)]
pub enum DataElement {
  Nil,
  Unsigned { value: u64, size: u8 },
  Signed { value: i64, size: u8 },
  Uuid(Uuid),
  Text(Vec<u8>),
  Bool(bool),
  Sequence(Vec<DataElement>),
  Alternative(Vec<DataElement>),
  Url(String),
}

impl DataElement {
  pub fn unsigned_8(value: u8) -> Self {
    Self::Unsigned {
      value: value.into(),
      size: 1,
    }
  }

  pub fn unsigned_16(value: u16) -> Self {
    Self::Unsigned {
      value: value.into(),
      size: 2,
    }
  }

  pub fn unsigned_32(value: u32) -> Self {
    Self::Unsigned {
      value: value.into(),
      size: 4,
    }
  }

  pub fn unsigned_64(value: u64) -> Self {
    Self::Unsigned { value, size: 8 }
  }

  pub fn uuid(value: Uuid) -> Self {
    Self::Uuid(value)
  }

  pub fn text(value: impl Into<String>) -> Self {
    Self::Text(value.into().into_bytes())
  }

  /// Text elements hold raw bytes on the wire; HID report maps travel in
  /// one, so not every text element is a string.
  pub fn text_bytes(value: impl Into<Vec<u8>>) -> Self {
    Self::Text(value.into())
  }

  pub fn sequence(elements: Vec<DataElement>) -> Self {
    Self::Sequence(elements)
  }

  /// The element's value as a u64, if it is an unsigned integer.
  pub fn as_unsigned(&self) -> Option<u64> {
    match self {
      Self::Unsigned { value, .. } => Some(*value),
      _ => None,
    }
  }

  pub fn as_uuid(&self) -> Option<Uuid> {
    match self {
      Self::Uuid(uuid) => Some(*uuid),
      _ => None,
    }
  }

  pub fn as_text(&self) -> Option<&str> {
    match self {
      Self::Text(text) => std::str::from_utf8(text).ok(),
      _ => None,
    }
  }

  pub fn as_text_bytes(&self) -> Option<&[u8]> {
    match self {
      Self::Text(text) => Some(text),
      _ => None,
    }
  }

  pub fn as_bool(&self) -> Option<bool> {
    match self {
      Self::Bool(value) => Some(*value),
      _ => None,
    }
  }

  pub fn as_sequence(&self) -> Option<&[DataElement]> {
    match self {
      Self::Sequence(elements) => Some(elements),
      _ => None,
    }
  }

  pub fn to_bytes(&self) -> Vec<u8> {
    let mut out = Vec::new();
    self.write(&mut out);
    out
  }

  pub fn from_bytes(data: &[u8]) -> Result<Self, Error> {
    let (element, end) = Self::parse(data, 0, 0)?;

    ensure!(end == data.len(), TrailingDataError { len: data.len() - end });

    Ok(element)
  }

  fn write(&self, out: &mut Vec<u8>) {
    match self {
      Self::Nil => out.push(0),
      Self::Unsigned { value, size } => {
        assert!(matches!(size, 1 | 2 | 4 | 8), "invalid integer size");
        assert!(
          *size == 8 || *value >> (size * 8) == 0,
          "unsigned integer out of range",
        );
        out.push(1 << 3 | size_index(*size));
        out.extend_from_slice(&value.to_be_bytes()[8 - usize::from(*size)..]);
      }
      Self::Signed { value, size } => {
        assert!(matches!(size, 1 | 2 | 4 | 8), "invalid integer size");
        assert!(
          *size == 8 || (*value >> (size * 8 - 1) == 0 || *value >> (size * 8 - 1) == -1),
          "signed integer out of range",
        );
        out.push(2 << 3 | size_index(*size));
        out.extend_from_slice(&value.to_be_bytes()[8 - usize::from(*size)..]);
      }
      Self::Uuid(uuid) => {
        let bytes = uuid.to_be_bytes();
        out.push(3 << 3 | size_index(bytes.len().try_into().unwrap()));
        out.extend_from_slice(&bytes);
      }
      Self::Text(text) => write_variable(out, 4, text),
      Self::Bool(value) => {
        out.push(5 << 3);
        out.push((*value).into());
      }
      Self::Sequence(elements) => write_variable(out, 6, &write_all(elements)),
      Self::Alternative(elements) => write_variable(out, 7, &write_all(elements)),
      Self::Url(url) => write_variable(out, 8, url.as_bytes()),
    }
  }

  fn parse(data: &[u8], offset: usize, depth: usize) -> Result<(Self, usize), Error> {
    ensure!(depth < MAX_DEPTH, DepthError);

    let descriptor = *data.get(offset).context(TruncatedError { offset, need: 1usize })?;

    let type_index = descriptor >> 3;
    let size_index = descriptor & 0x07;

    let context = SizeIndexError {
      type_index,
      size_index,
    };

    let (len, data_offset) = match size_index {
      0 if type_index == 0 => (0, offset + 1),
      0 => (1, offset + 1),
      1 => (2, offset + 1),
      2 => (4, offset + 1),
      3 => (8, offset + 1),
      4 => (16, offset + 1),
      5 => {
        let prefix = take(data, offset + 1, 1)?;
        (usize::from(prefix[0]), offset + 2)
      }
      6 => {
        let prefix = take(data, offset + 1, 2)?;
        (
          usize::from(u16::from_be_bytes(prefix.try_into().unwrap())),
          offset + 3,
        )
      }
      _ => {
        let prefix = take(data, offset + 1, 4)?;
        (
          u32::from_be_bytes(prefix.try_into().unwrap()) as usize,
          offset + 5,
        )
      }
    };

    let payload = take(data, data_offset, len)?;
    let end = data_offset + len;

    let element = match type_index {
      0 => {
        ensure!(size_index == 0, context);
        Self::Nil
      }
      1 => {
        ensure!(size_index <= 3, context);
        let mut bytes = [0; 8];
        bytes[8 - len..].copy_from_slice(payload);
        Self::Unsigned {
          value: u64::from_be_bytes(bytes),
          size: len.try_into().unwrap(),
        }
      }
      2 => {
        ensure!(size_index <= 3, context);
        let value = match len {
          1 => i8::from_be_bytes(payload.try_into().unwrap()).into(),
          2 => i16::from_be_bytes(payload.try_into().unwrap()).into(),
          4 => i32::from_be_bytes(payload.try_into().unwrap()).into(),
          _ => i64::from_be_bytes(payload.try_into().unwrap()),
        };
        Self::Signed {
          value,
          size: len.try_into().unwrap(),
        }
      }
      3 => {
        ensure!(matches!(size_index, 1 | 2 | 4), context);
        Self::Uuid(Uuid::from_be_bytes(payload).context(UuidError)?)
      }
      4 => {
        ensure!(size_index >= 5, context);
        Self::Text(payload.to_vec())
      }
      8 => {
        ensure!(size_index >= 5, context);
        Self::Url(String::from_utf8(payload.to_vec()).context(Utf8Error)?)
      }
      5 => {
        ensure!(size_index == 0, context);
        Self::Bool(payload[0] != 0)
      }
      6 | 7 => {
        ensure!(size_index >= 5, context);

        let mut elements = Vec::new();
        let mut inner = data_offset;

        while inner < end {
          let (element, next) = Self::parse(&data[..end], inner, depth + 1)?;
          elements.push(element);
          inner = next;
        }

        if type_index == 6 {
          Self::Sequence(elements)
        } else {
          Self::Alternative(elements)
        }
      }
      _ => return Err(Error::TypeIndex { type_index }),
    };

    Ok((element, end))
  }
}

fn size_index(size: u8) -> u8 {
  match size {
    1 => 0,
    2 => 1,
    4 => 2,
    8 => 3,
    16 => 4,
    _ => unreachable!(),
  }
}

fn write_variable(out: &mut Vec<u8>, type_index: u8, data: &[u8]) {
  if let Ok(len) = u8::try_from(data.len()) {
    out.push(type_index << 3 | 5);
    out.push(len);
  } else if let Ok(len) = u16::try_from(data.len()) {
    out.push(type_index << 3 | 6);
    out.extend_from_slice(&len.to_be_bytes());
  } else {
    out.push(type_index << 3 | 7);
    out.extend_from_slice(&u32::try_from(data.len()).unwrap().to_be_bytes());
  }
  out.extend_from_slice(data);
}

fn write_all(elements: &[DataElement]) -> Vec<u8> {
  let mut out = Vec::new();
  for element in elements {
    element.write(&mut out);
  }
  out
}

fn take(data: &[u8], offset: usize, need: usize) -> Result<&[u8], Error> {
  data
    .get(offset..offset + need)
    .context(TruncatedError { offset, need })
}

#[derive(Clone, Debug, PartialEq)]
pub struct ServiceAttribute {
  pub id: u16,
  pub value: DataElement,
}

impl ServiceAttribute {
  pub fn new(id: u16, value: DataElement) -> Self {
    Self { id, value }
  }
}

/// The language base attribute every record of the original profiles
/// carries: English, UTF-8, primary language base 0x0100.
pub fn language_base_attribute() -> ServiceAttribute {
  ServiceAttribute::new(
    LANGUAGE_BASE_ATTRIBUTE_ID_LIST_ATTRIBUTE_ID,
    DataElement::sequence(vec![
      DataElement::unsigned_16(LANGUAGE_ENGLISH),
      DataElement::unsigned_16(ENCODING_UTF8),
      DataElement::unsigned_16(PRIMARY_LANGUAGE_BASE_ID),
    ]),
  )
}

/// A service record as an SDP attribute list: a sequence alternating
/// attribute ids and attribute values, ids ascending.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ServiceRecord(Vec<ServiceAttribute>);

impl ServiceRecord {
  pub fn new(attributes: Vec<ServiceAttribute>) -> Self {
    Self(attributes)
  }

  pub fn attributes(&self) -> &[ServiceAttribute] {
    &self.0
  }

  pub fn attribute(&self, id: u16) -> Option<&DataElement> {
    self
      .0
      .iter()
      .find(|attribute| attribute.id == id)
      .map(|attribute| &attribute.value)
  }

  pub fn service_class_ids(&self) -> Vec<Uuid> {
    self
      .attribute(SERVICE_CLASS_ID_LIST_ATTRIBUTE_ID)
      .and_then(DataElement::as_sequence)
      .map(|elements| elements.iter().filter_map(DataElement::as_uuid).collect())
      .unwrap_or_default()
  }

  pub fn to_bytes(&self) -> Vec<u8> {
    let mut elements = Vec::new();

    for attribute in &self.0 {
      elements.push(DataElement::unsigned_16(attribute.id));
      elements.push(attribute.value.clone());
    }

    DataElement::Sequence(elements).to_bytes()
  }

  pub fn from_bytes(data: &[u8]) -> Result<Self, Error> {
    let DataElement::Sequence(elements) = DataElement::from_bytes(data)? else {
      return Err(Error::AttributeList);
    };

    ensure!(elements.len() % 2 == 0, AttributeListError);

    let mut attributes = Vec::new();

    for pair in elements.chunks(2) {
      let &DataElement::Unsigned { value, size: 2 } = &pair[0] else {
        return Err(Error::AttributeId);
      };

      attributes.push(ServiceAttribute::new(
        value.try_into().map_err(|_| Error::AttributeId)?,
        pair[1].clone(),
      ));
    }

    Ok(Self(attributes))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn scalar_encodings() {
    #[track_caller]
    fn case(element: DataElement, bytes: &[u8]) {
      assert_eq!(element.to_bytes(), bytes);
      assert_eq!(DataElement::from_bytes(bytes).unwrap(), element);
    }

    case(DataElement::Nil, &[0x00]);
    case(DataElement::unsigned_8(0x42), &[0x08, 0x42]);
    case(DataElement::unsigned_16(0x0100), &[0x09, 0x01, 0x00]);
    case(
      DataElement::unsigned_32(0x000F_4240),
      &[0x0A, 0x00, 0x0F, 0x42, 0x40],
    );
    case(DataElement::Signed { value: -1, size: 1 }, &[0x10, 0xFF]);
    case(
      DataElement::uuid(Uuid::Uuid16(0x1105)),
      &[0x19, 0x11, 0x05],
    );
    case(DataElement::Bool(true), &[0x28, 0x01]);
    case(DataElement::text("en"), &[0x25, 0x02, 0x65, 0x6E]);
    case(
      DataElement::text_bytes(vec![0x85, 0x01, 0x02]),
      &[0x25, 0x03, 0x85, 0x01, 0x02],
    );
    case(
      DataElement::Url("https://example.com".into()),
      &[
        0x45, 0x13, 0x68, 0x74, 0x74, 0x70, 0x73, 0x3A, 0x2F, 0x2F, 0x65, 0x78, 0x61, 0x6D, 0x70,
        0x6C, 0x65, 0x2E, 0x63, 0x6F, 0x6D,
      ],
    );
  }

  #[test]
  fn uuid128_encoding() {
    let uuid = Uuid::Uuid128(0x796135f0_f0c5_11d8_0966_0800200c9a66);

    let mut expected = vec![0x1C];
    expected.extend_from_slice(&uuid.as_u128().to_be_bytes());

    assert_eq!(DataElement::uuid(uuid).to_bytes(), expected);
    assert_eq!(
      DataElement::from_bytes(&expected).unwrap(),
      DataElement::uuid(uuid),
    );
  }

  #[test]
  fn sequences() {
    let element = DataElement::sequence(vec![
      DataElement::uuid(Uuid::Uuid16(0x0100)),
      DataElement::unsigned_16(0x000F),
    ]);

    let bytes = [0x35, 0x06, 0x19, 0x01, 0x00, 0x09, 0x00, 0x0F];

    assert_eq!(element.to_bytes(), bytes);
    assert_eq!(DataElement::from_bytes(&bytes).unwrap(), element);

    let alternative = DataElement::Alternative(vec![DataElement::Nil, DataElement::Nil]);
    assert_eq!(alternative.to_bytes(), [0x3D, 0x02, 0x00, 0x00]);
  }

  #[test]
  fn long_text() {
    let text = "x".repeat(300);

    let bytes = DataElement::text(text.as_str()).to_bytes();

    assert_eq!(bytes[0], 0x26);
    assert_eq!(&bytes[1..3], &300u16.to_be_bytes());
    assert_eq!(DataElement::from_bytes(&bytes).unwrap(), DataElement::text(text));
  }

  #[test]
  fn parse_errors() {
    assert!(matches!(
      DataElement::from_bytes(&[]),
      Err(Error::Truncated { .. }),
    ));

    assert!(matches!(
      DataElement::from_bytes(&[0x09, 0x01]),
      Err(Error::Truncated { .. }),
    ));

    assert!(matches!(
      DataElement::from_bytes(&[0x48, 0x00]),
      Err(Error::TypeIndex { type_index: 9 }),
    ));

    assert!(matches!(
      DataElement::from_bytes(&[0x0C, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0]),
      Err(Error::SizeIndex {
        type_index: 1,
        size_index: 4,
      }),
    ));

    assert!(matches!(
      DataElement::from_bytes(&[0x08, 0x42, 0xFF]),
      Err(Error::TrailingData { len: 1 }),
    ));
  }

  #[test]
  fn record_round_trip() {
    let record = ServiceRecord::new(vec![
      ServiceAttribute::new(
        SERVICE_RECORD_HANDLE_ATTRIBUTE_ID,
        DataElement::unsigned_32(0x00010001),
      ),
      ServiceAttribute::new(
        SERVICE_CLASS_ID_LIST_ATTRIBUTE_ID,
        DataElement::sequence(vec![DataElement::uuid(Uuid::Uuid16(0x1115))]),
      ),
      language_base_attribute(),
    ]);

    let bytes = record.to_bytes();

    assert_eq!(ServiceRecord::from_bytes(&bytes).unwrap(), record);

    assert_eq!(record.service_class_ids(), [Uuid::Uuid16(0x1115)]);

    assert_eq!(
      record.attribute(SERVICE_RECORD_HANDLE_ATTRIBUTE_ID),
      Some(&DataElement::unsigned_32(0x00010001)),
    );

    assert_eq!(record.attribute(0x0300), None);
  }

  #[test]
  fn attribute_list_errors() {
    assert!(matches!(
      ServiceRecord::from_bytes(&DataElement::unsigned_8(1).to_bytes()),
      Err(Error::AttributeList),
    ));

    let odd = DataElement::sequence(vec![DataElement::unsigned_16(1)]);
    assert!(matches!(
      ServiceRecord::from_bytes(&odd.to_bytes()),
      Err(Error::AttributeList),
    ));

    let bad_id = DataElement::sequence(vec![DataElement::unsigned_8(1), DataElement::Nil]);
    assert!(matches!(
      ServiceRecord::from_bytes(&bad_id.to_bytes()),
      Err(Error::AttributeId),
    ));
  }
}

use super::*;

/// See
/// https://www.bluetooth.com/specifications/specs/broadcast-audio-uniform-resource-identifier/.
pub const SCHEME: &str = "BLUETOOTH:UUID:184F;";
pub const SUFFIX: &str = ";;";

#[derive(Debug, Snafu)]
#[snafu(context(suffix(Error)))]
pub enum Error {
  #[snafu(display("invalid advertiser address"))]
  AdvertiserAddress { source: address::Error },
  #[snafu(display("invalid advertiser address type"))]
  AddressType { source: ParseIntError },
  #[snafu(display("unknown advertiser address type `{value}`"))]
  AddressTypeName { value: String },
  #[snafu(display("advertiser address type {value} out of range"))]
  AddressTypeValue { value: u8 },
  #[snafu(display("invalid base64 value in `{key}` element"))]
  Base64 {
    key: String,
    source: base64::DecodeError,
  },
  #[snafu(display("invalid URI element `{element}`"))]
  Element { element: String },
  #[snafu(display("invalid hex value in `{key}` element"))]
  Hex {
    key: String,
    source: ParseIntError,
  },
  #[snafu(display("broadcast name is not valid UTF-8"))]
  NameUtf8 { source: std::string::FromUtf8Error },
  #[snafu(display("URI `{input}` does not start with `{SCHEME}`"))]
  Scheme { input: String },
}

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AdvertiserAddressType {
  Public = 0,
  Random = 1,
}

impl TryFrom<u8> for AdvertiserAddressType {
  type Error = Error;

  fn try_from(value: u8) -> Result<Self, Self::Error> {
    match value {
      0 => Ok(Self::Public),
      1 => Ok(Self::Random),
      _ => Err(Error::AddressTypeValue { value }),
    }
  }
}

impl FromStr for AdvertiserAddressType {
  type Err = Error;

  fn from_str(input: &str) -> Result<Self, Self::Err> {
    match input {
      "public" => Ok(Self::Public),
      "random" => Ok(Self::Random),
      _ => Err(Error::AddressTypeName { value: input.into() }),
    }
  }
}

/// A Broadcast Audio URI, the QR-code string form of a broadcast audio
/// stream announcement. `BS`, `NB`, and `SM` elements repeat, one entry per
/// subgroup; everything else appears at most once.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct BroadcastAudioUri {
  pub broadcast_name: String,
  pub advertiser_address_type: Option<AdvertiserAddressType>,
  pub advertiser_address: Option<Address>,
  pub broadcast_id: Option<u32>,
  pub broadcast_code: Option<Vec<u8>>,
  pub standard_quality: Option<bool>,
  pub high_quality: Option<bool>,
  pub vendor_specific: Option<String>,
  pub advertising_sid: Option<u8>,
  pub pa_interval: Option<u16>,
  pub num_subgroups: Option<u8>,
  pub bis_sync: Vec<u32>,
  pub sg_number_of_bises: Vec<u8>,
  pub sg_metadata: Vec<Vec<u8>>,
  pub public_broadcast_announcement_metadata: Option<Vec<u8>>,
}

impl Display for BroadcastAudioUri {
  fn fmt(&self, f: &mut Formatter) -> fmt::Result {
    write!(f, "{SCHEME}")?;

    write!(f, "BN:{}", BASE64.encode(self.broadcast_name.as_bytes()))?;

    if let Some(address_type) = self.advertiser_address_type {
      write!(f, ";AT:{:X}", address_type as u8)?;
    }

    if let Some(address) = self.advertiser_address {
      write!(f, ";AD:{}", hex::encode_upper(address.as_bytes()))?;
    }

    if let Some(broadcast_id) = self.broadcast_id {
      write!(f, ";BI:{broadcast_id:X}")?;
    }

    if let Some(broadcast_code) = &self.broadcast_code {
      write!(f, ";BC:{}", BASE64.encode(broadcast_code))?;
    }

    if let Some(standard_quality) = self.standard_quality {
      write!(f, ";SQ:{}", u8::from(standard_quality))?;
    }

    if let Some(high_quality) = self.high_quality {
      write!(f, ";HQ:{}", u8::from(high_quality))?;
    }

    if let Some(vendor_specific) = &self.vendor_specific {
      write!(f, ";VS:{vendor_specific}")?;
    }

    if let Some(advertising_sid) = self.advertising_sid {
      write!(f, ";AS:{advertising_sid:X}")?;
    }

    if let Some(pa_interval) = self.pa_interval {
      write!(f, ";PI:{pa_interval:X}")?;
    }

    if let Some(num_subgroups) = self.num_subgroups {
      write!(f, ";NS:{num_subgroups:X}")?;
    }

    for bis_sync in &self.bis_sync {
      write!(f, ";BS:{bis_sync:X}")?;
    }

    for number_of_bises in &self.sg_number_of_bises {
      write!(f, ";NB:{number_of_bises:X}")?;
    }

    for metadata in &self.sg_metadata {
      write!(f, ";SM:{}", BASE64.encode(metadata))?;
    }

    if let Some(metadata) = &self.public_broadcast_announcement_metadata {
      write!(f, ";PM:{}", BASE64.encode(metadata))?;
    }

    write!(f, "{SUFFIX}")
  }
}

impl FromStr for BroadcastAudioUri {
  type Err = Error;

  fn from_str(input: &str) -> Result<Self, Self::Err> {
    let body = input.strip_prefix(SCHEME).context(SchemeError { input })?;
    let body = body.strip_suffix(SUFFIX).unwrap_or(body);

    let mut uri = Self::default();

    for element in body.split(';') {
      let (key, value) = element.split_once(':').context(ElementError { element })?;

      match key {
        "BN" => {
          uri.broadcast_name =
            String::from_utf8(BASE64.decode(value).context(Base64Error { key })?)
              .context(NameUtf8Error)?;
        }
        "AT" => {
          uri.advertiser_address_type = Some(
            value
              .parse::<u8>()
              .context(AddressTypeError)?
              .try_into()?,
          );
        }
        "AD" => {
          uri.advertiser_address =
            Some(value.parse().context(AdvertiserAddressError)?);
        }
        "BI" => {
          uri.broadcast_id =
            Some(u32::from_str_radix(value, 16).context(HexError { key })?);
        }
        "BC" => {
          uri.broadcast_code = Some(BASE64.decode(value).context(Base64Error { key })?);
        }
        "SQ" => {
          uri.standard_quality =
            Some(u8::from_str_radix(value, 16).context(HexError { key })? != 0);
        }
        "HQ" => {
          uri.high_quality =
            Some(u8::from_str_radix(value, 16).context(HexError { key })? != 0);
        }
        "VS" => {
          uri.vendor_specific = Some(value.into());
        }
        "AS" => {
          uri.advertising_sid =
            Some(u8::from_str_radix(value, 16).context(HexError { key })?);
        }
        "PI" => {
          uri.pa_interval =
            Some(u16::from_str_radix(value, 16).context(HexError { key })?);
        }
        "NS" => {
          uri.num_subgroups =
            Some(u8::from_str_radix(value, 16).context(HexError { key })?);
        }
        "BS" => {
          uri
            .bis_sync
            .push(u32::from_str_radix(value, 16).context(HexError { key })?);
        }
        "NB" => {
          uri
            .sg_number_of_bises
            .push(u8::from_str_radix(value, 16).context(HexError { key })?);
        }
        "SM" => {
          uri
            .sg_metadata
            .push(BASE64.decode(value).context(Base64Error { key })?);
        }
        "PM" => {
          uri.public_broadcast_announcement_metadata =
            Some(BASE64.decode(value).context(Base64Error { key })?);
        }
        _ => log::warn!("unknown broadcast audio URI element `{key}`"),
      }
    }

    Ok(uri)
  }
}

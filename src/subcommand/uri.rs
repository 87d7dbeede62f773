use super::*;

#[derive(Parser)]
pub enum Uri {
  Decode(Decode),
  Encode(Encode),
}

impl Uri {
  pub fn run(self) -> Result {
    match self {
      Self::Decode(decode) => decode.run(),
      Self::Encode(encode) => encode.run(),
    }
  }
}

#[derive(Parser)]
pub struct Decode {
  #[arg(help = "Decode broadcast audio <URI>.")]
  uri: String,
}

impl Decode {
  pub fn run(self) -> Result {
    println!("{}", serde_json::to_string_pretty(&self.parse()?).unwrap());

    Ok(())
  }

  fn parse(&self) -> Result<BroadcastAudioUri> {
    self.uri.parse().context(error::Uri)
  }
}

#[derive(Parser)]
pub struct Encode {
  #[arg(long, help = "Set broadcast name to <BROADCAST_NAME>.")]
  broadcast_name: String,
  #[arg(long, help = "Set advertiser address type to `public` or `random`.")]
  advertiser_address_type: Option<AdvertiserAddressType>,
  #[arg(long, help = "Set advertiser address to <ADVERTISER_ADDRESS>.")]
  advertiser_address: Option<Address>,
  #[arg(long, help = "Set broadcast id to hexadecimal <BROADCAST_ID>.")]
  broadcast_id: Option<String>,
  #[arg(long, help = "Set broadcast code to the bytes of <BROADCAST_CODE>.")]
  broadcast_code: Option<String>,
  #[arg(long, help = "Announce standard quality audio.")]
  standard_quality: bool,
  #[arg(long, help = "Announce high quality audio.")]
  high_quality: bool,
}

impl Encode {
  pub fn run(self) -> Result {
    println!("{}", self.uri()?);

    Ok(())
  }

  fn uri(self) -> Result<BroadcastAudioUri> {
    let broadcast_id = match &self.broadcast_id {
      Some(id) => Some(
        u32::from_str_radix(id.strip_prefix("0x").unwrap_or(id), 16)
          .context(error::BroadcastId { id })?,
      ),
      None => None,
    };

    Ok(BroadcastAudioUri {
      broadcast_name: self.broadcast_name,
      advertiser_address_type: self.advertiser_address_type,
      advertiser_address: self.advertiser_address,
      broadcast_id,
      broadcast_code: self.broadcast_code.map(String::into_bytes),
      standard_quality: self.standard_quality.then_some(true),
      high_quality: self.high_quality.then_some(true),
      ..Default::default()
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn decode() {
    let uri = Decode {
      uri: "BLUETOOTH:UUID:184F;BN:SG93ZHk=;AT:1;AD:F80FF972EA4C;BI:DE51A9;SQ:1;;".into(),
    }
    .parse()
    .unwrap();

    assert_eq!(uri.broadcast_name, "Howdy");
    assert_eq!(uri.broadcast_id, Some(0xDE51A9));
    assert_eq!(
      uri.advertiser_address_type,
      Some(AdvertiserAddressType::Random),
    );
  }

  #[test]
  fn decode_rejects_invalid_uri() {
    assert_matches!(
      Decode {
        uri: "https://example.com".into(),
      }
      .parse(),
      Err(Error::Uri { .. }),
    );
  }

  #[test]
  fn encode() {
    assert_eq!(
      Encode {
        broadcast_name: "Howdy".into(),
        advertiser_address_type: Some(AdvertiserAddressType::Random),
        advertiser_address: Some("F8:0F:F9:72:EA:4C".parse().unwrap()),
        broadcast_id: Some("0xDE51A9".into()),
        broadcast_code: None,
        standard_quality: true,
        high_quality: false,
      }
      .uri()
      .unwrap()
      .to_string(),
      "BLUETOOTH:UUID:184F;BN:SG93ZHk=;AT:1;AD:F80FF972EA4C;BI:DE51A9;SQ:1;;",
    );
  }

  #[test]
  fn encode_rejects_invalid_broadcast_id() {
    assert_matches!(
      Encode {
        broadcast_name: "Howdy".into(),
        advertiser_address_type: None,
        advertiser_address: None,
        broadcast_id: Some("xyz".into()),
        broadcast_code: None,
        standard_quality: false,
        high_quality: false,
      }
      .uri(),
      Err(Error::BroadcastId { .. }),
    );
  }
}

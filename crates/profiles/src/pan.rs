//! Personal Area Networking profile, version 1.0: NAP, GN, and PANU
//! service records and Ethernet frame transport over BNEP.

use super::*;

pub const IPV4_SUBNET_ATTRIBUTE_ID: u16 = 0x030D;
pub const IPV6_SUBNET_ATTRIBUTE_ID: u16 = 0x030E;
pub const IP_SUBNET_ATTRIBUTE_ID: u16 = 0x0200;
pub const MAX_NET_ACCESS_RATE_ATTRIBUTE_ID: u16 = 0x030C;
pub const NET_ACCESS_TYPE_ATTRIBUTE_ID: u16 = 0x030B;
pub const SECURITY_DESCRIPTION_ATTRIBUTE_ID: u16 = 0x030A;

#[derive(Debug, Snafu)]
#[snafu(context(suffix(Error)))]
pub enum Error {
  #[snafu(display("BNEP packet error"))]
  Bnep { source: bnep::Error },
  #[snafu(display("BNEP channel error"))]
  Channel { source: channel::Error },
  #[snafu(display("channel closed during setup"))]
  Closed,
  #[snafu(display("Ethernet frame too short: {len} bytes"))]
  FrameLength { len: usize },
  #[snafu(display("connection setup failed: {code}"))]
  Setup {
    code: bnep::SetupConnectionResponseCode,
  },
}

type Result<T = (), E = Error> = std::result::Result<T, E>;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SecurityDescription {
  None = 0x0000,
  ServiceLevelEnforcedSecurity = 0x0001,
  Ieee8021X = 0x0002,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum NetAccessType {
  Pstn = 0x0000,
  Isdn = 0x0001,
  Dsl = 0x0002,
  CableModem = 0x0003,
  Ethernet10Mb = 0x0004,
  Ethernet100Mb = 0x0005,
  TokenRing4Mb = 0x0006,
  TokenRing16Mb = 0x0007,
  TokenRing100Mb = 0x0008,
  Fddi = 0x0009,
  Gsm = 0x000A,
  Cdma = 0x000B,
  Gprs = 0x000C,
  Cellular3G = 0x000D,
  Other = 0xFFFE,
}

pub fn nap_service_record(
  service_record_handle: u32,
  security_description: SecurityDescription,
  net_access_type: NetAccessType,
  max_net_access_rate: u32,
) -> ServiceRecord {
  let mut attributes = common_attributes(
    service_record_handle,
    Uuid::NAP_SERVICE,
    "Network Access Point Service",
    "Personal Ad-hoc which provides access to a network",
    security_description,
  );

  attributes.push(ServiceAttribute::new(
    NET_ACCESS_TYPE_ATTRIBUTE_ID,
    DataElement::unsigned_16(net_access_type as u16),
  ));

  attributes.push(ServiceAttribute::new(
    MAX_NET_ACCESS_RATE_ATTRIBUTE_ID,
    DataElement::unsigned_32(max_net_access_rate),
  ));

  ServiceRecord::new(attributes)
}

pub fn gn_service_record(
  service_record_handle: u32,
  security_description: SecurityDescription,
) -> ServiceRecord {
  ServiceRecord::new(common_attributes(
    service_record_handle,
    Uuid::GN_SERVICE,
    "Group Ad-hoc Network Service",
    "Personal Group Ad-hoc Network Service",
    security_description,
  ))
}

pub fn panu_service_record(
  service_record_handle: u32,
  security_description: SecurityDescription,
) -> ServiceRecord {
  ServiceRecord::new(common_attributes(
    service_record_handle,
    Uuid::PANU_SERVICE,
    "Personal Ad-hoc User Service",
    "Personal Ad-hoc User Service",
    security_description,
  ))
}

fn common_attributes(
  service_record_handle: u32,
  service_class: Uuid,
  name: &str,
  description: &str,
  security_description: SecurityDescription,
) -> Vec<ServiceAttribute> {
  vec![
    ServiceAttribute::new(
      sdp::SERVICE_RECORD_HANDLE_ATTRIBUTE_ID,
      DataElement::unsigned_32(service_record_handle),
    ),
    ServiceAttribute::new(
      sdp::SERVICE_CLASS_ID_LIST_ATTRIBUTE_ID,
      DataElement::sequence(vec![DataElement::uuid(service_class)]),
    ),
    ServiceAttribute::new(
      sdp::PROTOCOL_DESCRIPTOR_LIST_ATTRIBUTE_ID,
      DataElement::sequence(vec![
        DataElement::sequence(vec![
          DataElement::uuid(Uuid::L2CAP_PROTOCOL),
          DataElement::unsigned_16(bnep::PSM),
        ]),
        DataElement::sequence(vec![
          DataElement::uuid(Uuid::BNEP_PROTOCOL),
          DataElement::unsigned_16(0x0100),
        ]),
      ]),
    ),
    sdp::language_base_attribute(),
    // Flat, not the nested form the OBEX profiles use.
    ServiceAttribute::new(
      sdp::BLUETOOTH_PROFILE_DESCRIPTOR_LIST_ATTRIBUTE_ID,
      DataElement::sequence(vec![
        DataElement::uuid(service_class),
        DataElement::unsigned_16(0x0100),
      ]),
    ),
    ServiceAttribute::new(
      sdp::PRIMARY_LANGUAGE_BASE_ID + sdp::SERVICE_NAME_ATTRIBUTE_ID_OFFSET,
      DataElement::text(name),
    ),
    ServiceAttribute::new(
      sdp::PRIMARY_LANGUAGE_BASE_ID + sdp::SERVICE_DESCRIPTION_ATTRIBUTE_ID_OFFSET,
      DataElement::text(description),
    ),
    ServiceAttribute::new(
      SECURITY_DESCRIPTION_ATTRIBUTE_ID,
      DataElement::unsigned_16(security_description as u16),
    ),
  ]
}

/// The first service class of each remote record: the PAN roles the peer
/// offers.
pub fn supported_services(records: &[ServiceRecord]) -> Vec<Uuid> {
  records
    .iter()
    .filter_map(|record| record.service_class_ids().first().copied())
    .collect()
}

/// An Ethernet frame as PAN carries it: source address before destination,
/// an absent address encoding as six zero octets.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct EthernetFrame {
  pub source_address: Option<Address>,
  pub destination_address: Option<Address>,
  pub protocol_type: u16,
  pub payload: Vec<u8>,
}

impl EthernetFrame {
  pub fn to_bytes(&self) -> Vec<u8> {
    let mut out = Vec::with_capacity(14 + self.payload.len());
    out.extend_from_slice(&self.source_address.unwrap_or(Address::ANY).to_le_bytes());
    out.extend_from_slice(&self.destination_address.unwrap_or(Address::ANY).to_le_bytes());
    out.extend_from_slice(&self.protocol_type.to_be_bytes());
    out.extend_from_slice(&self.payload);
    out
  }

  pub fn from_bytes(data: &[u8]) -> Result<Self> {
    ensure!(data.len() >= 14, FrameLengthError { len: data.len() });

    Ok(Self {
      source_address: Some(Address::from_le_bytes(data[..6].try_into().unwrap())),
      destination_address: Some(Address::from_le_bytes(data[6..12].try_into().unwrap())),
      protocol_type: u16::from_be_bytes(data[12..14].try_into().unwrap()),
      payload: data[14..].to_vec(),
    })
  }
}

/// A PAN connection over a BNEP channel, either side of the setup
/// exchange.
pub struct Connection {
  channel: Channel,
  pub source_service: Uuid,
  pub destination_service: Uuid,
}

impl Connection {
  /// Opens the connection: sends the setup request and waits for the
  /// peer's verdict, skipping unrelated packets.
  pub async fn connect(
    mut channel: Channel,
    source_service: Uuid,
    destination_service: Uuid,
  ) -> Result<Self> {
    let request = bnep::SetupConnectionRequest {
      destination_service,
      source_service,
    };

    channel
      .send(request.to_packet().to_bytes())
      .context(ChannelError)?;

    loop {
      let pdu = channel.recv().await.context(ClosedError)?;

      let packet = bnep::Packet::from_bytes(&pdu).context(BnepError)?;

      let bnep::Packet::Control {
        control_type: bnep::ControlType::SETUP_CONNECTION_RESPONSE,
        payload,
        ..
      } = packet
      else {
        debug!(
          "ignoring {} packet before setup response",
          packet.packet_type(),
        );
        continue;
      };

      let response = bnep::SetupConnectionResponse::from_payload(&payload).context(BnepError)?;

      ensure!(
        response.0 == bnep::SetupConnectionResponseCode::OPERATION_SUCCESSFUL,
        SetupError { code: response.0 },
      );

      return Ok(Self {
        channel,
        source_service,
        destination_service,
      });
    }
  }

  /// Accepts the peer's setup request, recording the roles it asked for.
  pub async fn accept(mut channel: Channel) -> Result<Self> {
    loop {
      let pdu = channel.recv().await.context(ClosedError)?;

      let packet = bnep::Packet::from_bytes(&pdu).context(BnepError)?;

      let bnep::Packet::Control {
        control_type: bnep::ControlType::SETUP_CONNECTION_REQUEST,
        payload,
        ..
      } = packet
      else {
        debug!(
          "ignoring {} packet before setup request",
          packet.packet_type(),
        );
        continue;
      };

      let request = bnep::SetupConnectionRequest::from_payload(&payload).context(BnepError)?;

      channel
        .send(
          bnep::SetupConnectionResponse(bnep::SetupConnectionResponseCode::OPERATION_SUCCESSFUL)
            .to_packet()
            .to_bytes(),
        )
        .context(ChannelError)?;

      return Ok(Self {
        channel,
        source_service: request.source_service,
        destination_service: request.destination_service,
      });
    }
  }

  /// Sends an Ethernet frame, compressing away the addresses the caller
  /// asks to strip.
  pub fn send_ethernet_frame(
    &self,
    frame: &EthernetFrame,
    strip_source: bool,
    strip_destination: bool,
  ) -> Result {
    let source_address = frame.source_address.unwrap_or(Address::ANY);
    let destination_address = frame.destination_address.unwrap_or(Address::ANY);

    let packet = match (strip_source, strip_destination) {
      (false, false) => bnep::Packet::GeneralEthernet {
        extension_flag: false,
        destination_address,
        source_address,
        network_protocol_type: frame.protocol_type,
        payload: frame.payload.clone(),
      },
      (true, false) => bnep::Packet::CompressedEthernetDestOnly {
        extension_flag: false,
        destination_address,
        network_protocol_type: frame.protocol_type,
        payload: frame.payload.clone(),
      },
      (false, true) => bnep::Packet::CompressedEthernetSourceOnly {
        extension_flag: false,
        source_address,
        network_protocol_type: frame.protocol_type,
        payload: frame.payload.clone(),
      },
      (true, true) => bnep::Packet::CompressedEthernet {
        extension_flag: false,
        network_protocol_type: frame.protocol_type,
        payload: frame.payload.clone(),
      },
    };

    self.send_packet(&packet)
  }

  pub fn send_packet(&self, packet: &bnep::Packet) -> Result {
    self.channel.send(packet.to_bytes()).context(ChannelError)
  }

  /// Receives the next Ethernet frame, answering in-band control packets
  /// along the way. `None` once the channel closes.
  pub async fn recv_ethernet_frame(&mut self) -> Result<Option<EthernetFrame>> {
    loop {
      let Some(pdu) = self.channel.recv().await else {
        return Ok(None);
      };

      let packet = match bnep::Packet::from_bytes(&pdu) {
        Ok(packet) => packet,
        Err(err) => {
          error!("discarding malformed BNEP packet: {err}");
          continue;
        }
      };

      match packet {
        bnep::Packet::GeneralEthernet {
          destination_address,
          source_address,
          network_protocol_type,
          payload,
          ..
        } => {
          return Ok(Some(EthernetFrame {
            source_address: Some(source_address),
            destination_address: Some(destination_address),
            protocol_type: network_protocol_type,
            payload,
          }))
        }
        bnep::Packet::CompressedEthernet {
          network_protocol_type,
          payload,
          ..
        } => {
          return Ok(Some(EthernetFrame {
            source_address: None,
            destination_address: None,
            protocol_type: network_protocol_type,
            payload,
          }))
        }
        bnep::Packet::CompressedEthernetSourceOnly {
          source_address,
          network_protocol_type,
          payload,
          ..
        } => {
          return Ok(Some(EthernetFrame {
            source_address: Some(source_address),
            destination_address: None,
            protocol_type: network_protocol_type,
            payload,
          }))
        }
        bnep::Packet::CompressedEthernetDestOnly {
          destination_address,
          network_protocol_type,
          payload,
          ..
        } => {
          return Ok(Some(EthernetFrame {
            source_address: None,
            destination_address: Some(destination_address),
            protocol_type: network_protocol_type,
            payload,
          }))
        }
        bnep::Packet::Control {
          control_type,
          payload,
          ..
        } => self.handle_control(control_type, &payload)?,
      }
    }
  }

  fn handle_control(&mut self, control_type: bnep::ControlType, payload: &[u8]) -> Result {
    match control_type {
      bnep::ControlType::SETUP_CONNECTION_REQUEST => {
        match bnep::SetupConnectionRequest::from_payload(payload) {
          Ok(request) => {
            self.destination_service = request.destination_service;
            self.source_service = request.source_service;
            self.send_packet(
              &bnep::SetupConnectionResponse(
                bnep::SetupConnectionResponseCode::OPERATION_SUCCESSFUL,
              )
              .to_packet(),
            )?;
          }
          Err(err) => error!("discarding malformed setup request: {err}"),
        }
      }
      bnep::ControlType::SETUP_CONNECTION_RESPONSE => {
        debug!("ignoring unsolicited setup response");
      }
      control_type => {
        self.send_packet(&bnep::Packet::Control {
          extension_flag: false,
          control_type: bnep::ControlType::COMMAND_NOT_UNDERSTOOD,
          payload: vec![control_type.0],
        })?;
      }
    }

    Ok(())
  }
}

//! HID profile interconnect: the device service record, the HIDP message
//! codec carried over the control and interrupt channels, and the device
//! and host ends of a connection.

use super::*;

pub const BATTERY_POWER_ATTRIBUTE_ID: u16 = 0x0209;
pub const BOOT_DEVICE_ATTRIBUTE_ID: u16 = 0x020E;

/// The boot keyboard report descriptor from the USB HID specification:
/// eight modifier bits, a reserved octet, five LED bits, and a six key
/// array.
pub const BOOT_KEYBOARD_REPORT_MAP: &[u8] = &[
  0x05, 0x01, // Usage Page (Generic Desktop)
  0x09, 0x06, // Usage (Keyboard)
  0xA1, 0x01, // Collection (Application)
  0x05, 0x07, //   Usage Page (Keyboard/Keypad)
  0x19, 0xE0, //   Usage Minimum (Left Control)
  0x29, 0xE7, //   Usage Maximum (Right GUI)
  0x15, 0x00, //   Logical Minimum (0)
  0x25, 0x01, //   Logical Maximum (1)
  0x75, 0x01, //   Report Size (1)
  0x95, 0x08, //   Report Count (8)
  0x81, 0x02, //   Input (Data, Variable, Absolute)
  0x95, 0x01, //   Report Count (1)
  0x75, 0x08, //   Report Size (8)
  0x81, 0x01, //   Input (Constant)
  0x95, 0x05, //   Report Count (5)
  0x75, 0x01, //   Report Size (1)
  0x05, 0x08, //   Usage Page (LEDs)
  0x19, 0x01, //   Usage Minimum (Num Lock)
  0x29, 0x05, //   Usage Maximum (Kana)
  0x91, 0x02, //   Output (Data, Variable, Absolute)
  0x95, 0x01, //   Report Count (1)
  0x75, 0x03, //   Report Size (3)
  0x91, 0x01, //   Output (Constant)
  0x95, 0x06, //   Report Count (6)
  0x75, 0x08, //   Report Size (8)
  0x15, 0x00, //   Logical Minimum (0)
  0x25, 0x65, //   Logical Maximum (101)
  0x05, 0x07, //   Usage Page (Keyboard/Keypad)
  0x19, 0x00, //   Usage Minimum (0)
  0x29, 0x65, //   Usage Maximum (101)
  0x81, 0x00, //   Input (Data, Array)
  0xC0, // End Collection
];

/// Set in a GET_REPORT parameter when a buffer size trails the report id.
pub const BUFFER_SIZE_FLAG: u8 = 0x08;

pub const CONTROL_PSM: u16 = 0x0011;
pub const COUNTRY_CODE_ATTRIBUTE_ID: u16 = 0x0203;
pub const DESCRIPTOR_LIST_ATTRIBUTE_ID: u16 = 0x0206;
pub const DEVICE_RELEASE_NUMBER_ATTRIBUTE_ID: u16 = 0x0200; // Deprecated.
pub const DEVICE_SUBCLASS_ATTRIBUTE_ID: u16 = 0x0202;
pub const INTERRUPT_PSM: u16 = 0x0013;
pub const LANGID_BASE_LIST_ATTRIBUTE_ID: u16 = 0x0207;
pub const NORMALLY_CONNECTABLE_ATTRIBUTE_ID: u16 = 0x020D;
pub const PARSER_VERSION_ATTRIBUTE_ID: u16 = 0x0201;
pub const PROFILE_VERSION_ATTRIBUTE_ID: u16 = 0x020B; // Deprecated.
pub const PROVIDER_NAME_ATTRIBUTE_ID: u16 = 0x0102;
pub const RECONNECT_INITIATE_ATTRIBUTE_ID: u16 = 0x0205;
pub const REMOTE_WAKE_ATTRIBUTE_ID: u16 = 0x020A;
pub const SDP_DISABLE_ATTRIBUTE_ID: u16 = 0x0208; // Deprecated.
pub const SERVICE_DESCRIPTION_ATTRIBUTE_ID: u16 = 0x0101;
pub const SERVICE_NAME_ATTRIBUTE_ID: u16 = 0x0100;
pub const SSR_HOST_MAX_LATENCY_ATTRIBUTE_ID: u16 = 0x020F;
pub const SSR_HOST_MIN_TIMEOUT_ATTRIBUTE_ID: u16 = 0x0210;
pub const SUPERVISION_TIMEOUT_ATTRIBUTE_ID: u16 = 0x020C;
pub const VIRTUAL_CABLE_ATTRIBUTE_ID: u16 = 0x0204;

#[derive(Debug, Snafu)]
#[snafu(context(suffix(Error)))]
pub enum Error {
  #[snafu(display("HID channel error"))]
  Channel { source: channel::Error },
  #[snafu(display("incomplete HID service record"))]
  IncompleteRecord,
}

type Result<T = (), E = Error> = std::result::Result<T, E>;

/// HID device SDP information. [`SdpInformation::new`] fills in the
/// defaults of a virtually cabled boot keyboard combo device.
#[derive(Clone, Debug, PartialEq)]
pub struct SdpInformation {
  pub service_record_handle: u32,
  pub version_number: u16,
  pub parser_version: u32,
  pub device_subclass: u32,
  pub country_code: u32,
  pub virtual_cable: bool,
  pub reconnect_initiate: bool,
  pub report_descriptor_type: u16,
  pub report_map: Vec<u8>,
  pub langid_base_language: u16,
  pub langid_base_bluetooth_string_offset: u16,
  pub boot_device: bool,
  pub battery_power: Option<bool>,
  pub remote_wake: Option<bool>,
  pub supervision_timeout: Option<u16>,
  pub normally_connectable: Option<bool>,
  pub service_name: Option<Vec<u8>>,
  pub service_description: Option<Vec<u8>>,
  pub provider_name: Option<Vec<u8>>,
  pub ssr_host_max_latency: Option<u16>,
  pub ssr_host_min_timeout: Option<u16>,
}

impl SdpInformation {
  pub fn new(service_record_handle: u32, report_map: impl Into<Vec<u8>>) -> Self {
    Self {
      service_record_handle,
      version_number: 0x0101,
      parser_version: 0x0111,
      device_subclass: 0xC0, // Combo keyboard and pointing device.
      country_code: 0x21,    // USA.
      virtual_cable: true,
      reconnect_initiate: true,
      report_descriptor_type: 0x22, // Report descriptor.
      report_map: report_map.into(),
      langid_base_language: 0x0409, // en_US.
      langid_base_bluetooth_string_offset: 0x0100,
      boot_device: true,
      battery_power: Some(true),
      remote_wake: Some(true),
      supervision_timeout: Some(0x0C80),
      normally_connectable: Some(true),
      service_name: Some(b"Navi HID".to_vec()),
      service_description: Some(b"Navi".to_vec()),
      provider_name: Some(b"Navi".to_vec()),
      ssr_host_max_latency: Some(0x0640),
      ssr_host_min_timeout: Some(0x0C80),
    }
  }

  pub fn service_record(&self) -> ServiceRecord {
    let mut attributes = vec![
      ServiceAttribute::new(
        sdp::SERVICE_RECORD_HANDLE_ATTRIBUTE_ID,
        DataElement::unsigned_32(self.service_record_handle),
      ),
      ServiceAttribute::new(
        sdp::BROWSE_GROUP_LIST_ATTRIBUTE_ID,
        DataElement::sequence(vec![DataElement::uuid(Uuid::PUBLIC_BROWSE_ROOT)]),
      ),
      ServiceAttribute::new(
        sdp::SERVICE_CLASS_ID_LIST_ATTRIBUTE_ID,
        DataElement::sequence(vec![DataElement::uuid(
          Uuid::HUMAN_INTERFACE_DEVICE_SERVICE,
        )]),
      ),
      ServiceAttribute::new(
        sdp::PROTOCOL_DESCRIPTOR_LIST_ATTRIBUTE_ID,
        DataElement::sequence(vec![
          DataElement::sequence(vec![
            DataElement::uuid(Uuid::L2CAP_PROTOCOL),
            DataElement::unsigned_16(CONTROL_PSM),
          ]),
          DataElement::sequence(vec![DataElement::uuid(Uuid::HIDP_PROTOCOL)]),
        ]),
      ),
      sdp::language_base_attribute(),
      ServiceAttribute::new(
        sdp::BLUETOOTH_PROFILE_DESCRIPTOR_LIST_ATTRIBUTE_ID,
        DataElement::sequence(vec![DataElement::sequence(vec![
          DataElement::uuid(Uuid::HUMAN_INTERFACE_DEVICE_SERVICE),
          DataElement::unsigned_16(self.version_number),
        ])]),
      ),
      // The interrupt channel protocol stack, one nesting level deeper
      // than the primary protocol descriptor list.
      ServiceAttribute::new(
        sdp::ADDITIONAL_PROTOCOL_DESCRIPTOR_LIST_ATTRIBUTE_ID,
        DataElement::sequence(vec![DataElement::sequence(vec![
          DataElement::sequence(vec![
            DataElement::uuid(Uuid::L2CAP_PROTOCOL),
            DataElement::unsigned_16(INTERRUPT_PSM),
          ]),
          DataElement::sequence(vec![DataElement::uuid(Uuid::HIDP_PROTOCOL)]),
        ])]),
      ),
    ];

    if let Some(service_name) = &self.service_name {
      attributes.push(ServiceAttribute::new(
        SERVICE_NAME_ATTRIBUTE_ID,
        DataElement::text_bytes(service_name.clone()),
      ));
    }

    if let Some(service_description) = &self.service_description {
      attributes.push(ServiceAttribute::new(
        SERVICE_DESCRIPTION_ATTRIBUTE_ID,
        DataElement::text_bytes(service_description.clone()),
      ));
    }

    if let Some(provider_name) = &self.provider_name {
      attributes.push(ServiceAttribute::new(
        PROVIDER_NAME_ATTRIBUTE_ID,
        DataElement::text_bytes(provider_name.clone()),
      ));
    }

    attributes.extend([
      ServiceAttribute::new(
        PARSER_VERSION_ATTRIBUTE_ID,
        DataElement::unsigned_32(self.parser_version),
      ),
      ServiceAttribute::new(
        DEVICE_SUBCLASS_ATTRIBUTE_ID,
        DataElement::unsigned_32(self.device_subclass),
      ),
      ServiceAttribute::new(
        COUNTRY_CODE_ATTRIBUTE_ID,
        DataElement::unsigned_32(self.country_code),
      ),
      ServiceAttribute::new(
        VIRTUAL_CABLE_ATTRIBUTE_ID,
        DataElement::Bool(self.virtual_cable),
      ),
      ServiceAttribute::new(
        RECONNECT_INITIATE_ATTRIBUTE_ID,
        DataElement::Bool(self.reconnect_initiate),
      ),
      ServiceAttribute::new(
        DESCRIPTOR_LIST_ATTRIBUTE_ID,
        DataElement::sequence(vec![DataElement::sequence(vec![
          DataElement::unsigned_16(self.report_descriptor_type),
          DataElement::text_bytes(self.report_map.clone()),
        ])]),
      ),
      ServiceAttribute::new(
        LANGID_BASE_LIST_ATTRIBUTE_ID,
        DataElement::sequence(vec![DataElement::sequence(vec![
          DataElement::unsigned_16(self.langid_base_language),
          DataElement::unsigned_16(self.langid_base_bluetooth_string_offset),
        ])]),
      ),
      ServiceAttribute::new(
        BOOT_DEVICE_ATTRIBUTE_ID,
        DataElement::Bool(self.boot_device),
      ),
    ]);

    if let Some(battery_power) = self.battery_power {
      attributes.push(ServiceAttribute::new(
        BATTERY_POWER_ATTRIBUTE_ID,
        DataElement::Bool(battery_power),
      ));
    }

    if let Some(remote_wake) = self.remote_wake {
      attributes.push(ServiceAttribute::new(
        REMOTE_WAKE_ATTRIBUTE_ID,
        DataElement::Bool(remote_wake),
      ));
    }

    if let Some(supervision_timeout) = self.supervision_timeout {
      attributes.push(ServiceAttribute::new(
        SUPERVISION_TIMEOUT_ATTRIBUTE_ID,
        DataElement::unsigned_16(supervision_timeout),
      ));
    }

    if let Some(normally_connectable) = self.normally_connectable {
      attributes.push(ServiceAttribute::new(
        NORMALLY_CONNECTABLE_ATTRIBUTE_ID,
        DataElement::Bool(normally_connectable),
      ));
    }

    if let Some(ssr_host_max_latency) = self.ssr_host_max_latency {
      attributes.push(ServiceAttribute::new(
        SSR_HOST_MAX_LATENCY_ATTRIBUTE_ID,
        DataElement::unsigned_16(ssr_host_max_latency),
      ));
    }

    if let Some(ssr_host_min_timeout) = self.ssr_host_min_timeout {
      attributes.push(ServiceAttribute::new(
        SSR_HOST_MIN_TIMEOUT_ATTRIBUTE_ID,
        DataElement::unsigned_16(ssr_host_min_timeout),
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

    let version_number = profile_version(record, Uuid::HUMAN_INTERFACE_DEVICE_SERVICE)
      .context(IncompleteRecordError)?;

    let parser_version = record
      .attribute(PARSER_VERSION_ATTRIBUTE_ID)
      .and_then(DataElement::as_unsigned)
      .and_then(|version| version.try_into().ok())
      .context(IncompleteRecordError)?;

    let device_subclass = record
      .attribute(DEVICE_SUBCLASS_ATTRIBUTE_ID)
      .and_then(DataElement::as_unsigned)
      .and_then(|subclass| subclass.try_into().ok())
      .context(IncompleteRecordError)?;

    let country_code = record
      .attribute(COUNTRY_CODE_ATTRIBUTE_ID)
      .and_then(DataElement::as_unsigned)
      .and_then(|code| code.try_into().ok())
      .context(IncompleteRecordError)?;

    let virtual_cable = record
      .attribute(VIRTUAL_CABLE_ATTRIBUTE_ID)
      .and_then(DataElement::as_bool)
      .context(IncompleteRecordError)?;

    let reconnect_initiate = record
      .attribute(RECONNECT_INITIATE_ATTRIBUTE_ID)
      .and_then(DataElement::as_bool)
      .context(IncompleteRecordError)?;

    let descriptor = record
      .attribute(DESCRIPTOR_LIST_ATTRIBUTE_ID)
      .and_then(DataElement::as_sequence)
      .and_then(|list| list.first())
      .and_then(DataElement::as_sequence)
      .context(IncompleteRecordError)?;

    let report_descriptor_type = descriptor
      .first()
      .and_then(DataElement::as_unsigned)
      .and_then(|ty| ty.try_into().ok())
      .context(IncompleteRecordError)?;

    let report_map = descriptor
      .get(1)
      .and_then(DataElement::as_text_bytes)
      .context(IncompleteRecordError)?
      .to_vec();

    let langid_base = record
      .attribute(LANGID_BASE_LIST_ATTRIBUTE_ID)
      .and_then(DataElement::as_sequence)
      .and_then(|list| list.first())
      .and_then(DataElement::as_sequence)
      .context(IncompleteRecordError)?;

    let langid_base_language = langid_base
      .first()
      .and_then(DataElement::as_unsigned)
      .and_then(|language| language.try_into().ok())
      .context(IncompleteRecordError)?;

    let langid_base_bluetooth_string_offset = langid_base
      .get(1)
      .and_then(DataElement::as_unsigned)
      .and_then(|offset| offset.try_into().ok())
      .context(IncompleteRecordError)?;

    let boot_device = record
      .attribute(BOOT_DEVICE_ATTRIBUTE_ID)
      .and_then(DataElement::as_bool)
      .context(IncompleteRecordError)?;

    Ok(Self {
      service_record_handle,
      version_number,
      parser_version,
      device_subclass,
      country_code,
      virtual_cable,
      reconnect_initiate,
      report_descriptor_type,
      report_map,
      langid_base_language,
      langid_base_bluetooth_string_offset,
      boot_device,
      battery_power: record
        .attribute(BATTERY_POWER_ATTRIBUTE_ID)
        .and_then(DataElement::as_bool),
      remote_wake: record
        .attribute(REMOTE_WAKE_ATTRIBUTE_ID)
        .and_then(DataElement::as_bool),
      supervision_timeout: record
        .attribute(SUPERVISION_TIMEOUT_ATTRIBUTE_ID)
        .and_then(DataElement::as_unsigned)
        .and_then(|timeout| timeout.try_into().ok()),
      normally_connectable: record
        .attribute(NORMALLY_CONNECTABLE_ATTRIBUTE_ID)
        .and_then(DataElement::as_bool),
      service_name: record
        .attribute(SERVICE_NAME_ATTRIBUTE_ID)
        .and_then(DataElement::as_text_bytes)
        .map(|name| name.to_vec()),
      service_description: record
        .attribute(SERVICE_DESCRIPTION_ATTRIBUTE_ID)
        .and_then(DataElement::as_text_bytes)
        .map(|description| description.to_vec()),
      provider_name: record
        .attribute(PROVIDER_NAME_ATTRIBUTE_ID)
        .and_then(DataElement::as_text_bytes)
        .map(|name| name.to_vec()),
      ssr_host_max_latency: record
        .attribute(SSR_HOST_MAX_LATENCY_ATTRIBUTE_ID)
        .and_then(DataElement::as_unsigned)
        .and_then(|latency| latency.try_into().ok()),
      ssr_host_min_timeout: record
        .attribute(SSR_HOST_MIN_TIMEOUT_ATTRIBUTE_ID)
        .and_then(DataElement::as_unsigned)
        .and_then(|timeout| timeout.try_into().ok()),
    })
  }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct MessageType(pub u8);

impl MessageType {
  pub const CONTROL: Self = Self(0x01);
  pub const DATA: Self = Self(0x0A);
  pub const GET_PROTOCOL: Self = Self(0x06);
  pub const GET_REPORT: Self = Self(0x04);
  pub const HANDSHAKE: Self = Self(0x00);
  pub const SET_PROTOCOL: Self = Self(0x07);
  pub const SET_REPORT: Self = Self(0x05);

  fn name(self) -> Option<&'static str> {
    match self {
      Self::CONTROL => Some("CONTROL"),
      Self::DATA => Some("DATA"),
      Self::GET_PROTOCOL => Some("GET_PROTOCOL"),
      Self::GET_REPORT => Some("GET_REPORT"),
      Self::HANDSHAKE => Some("HANDSHAKE"),
      Self::SET_PROTOCOL => Some("SET_PROTOCOL"),
      Self::SET_REPORT => Some("SET_REPORT"),
      _ => None,
    }
  }
}

impl Display for MessageType {
  fn fmt(&self, f: &mut Formatter) -> fmt::Result {
    match self.name() {
      Some(name) => write!(f, "{name}[0x{:02X}]", self.0),
      None => write!(f, "0x{:02X}", self.0),
    }
  }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct HandshakeResult(pub u8);

impl HandshakeResult {
  pub const ERR_FATAL: Self = Self(0x0F);
  pub const ERR_INVALID_PARAMETER: Self = Self(0x04);
  pub const ERR_INVALID_REPORT_ID: Self = Self(0x02);
  pub const ERR_UNKNOWN: Self = Self(0x0E);
  pub const ERR_UNSUPPORTED_REQUEST: Self = Self(0x03);
  pub const NOT_READY: Self = Self(0x01);
  pub const SUCCESSFUL: Self = Self(0x00);

  fn name(self) -> Option<&'static str> {
    match self {
      Self::ERR_FATAL => Some("ERR_FATAL"),
      Self::ERR_INVALID_PARAMETER => Some("ERR_INVALID_PARAMETER"),
      Self::ERR_INVALID_REPORT_ID => Some("ERR_INVALID_REPORT_ID"),
      Self::ERR_UNKNOWN => Some("ERR_UNKNOWN"),
      Self::ERR_UNSUPPORTED_REQUEST => Some("ERR_UNSUPPORTED_REQUEST"),
      Self::NOT_READY => Some("NOT_READY"),
      Self::SUCCESSFUL => Some("SUCCESSFUL"),
      _ => None,
    }
  }
}

impl Display for HandshakeResult {
  fn fmt(&self, f: &mut Formatter) -> fmt::Result {
    match self.name() {
      Some(name) => write!(f, "{name}[0x{:02X}]", self.0),
      None => write!(f, "0x{:02X}", self.0),
    }
  }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ControlCommand(pub u8);

impl ControlCommand {
  pub const EXIT_SUSPEND: Self = Self(0x04);
  pub const SUSPEND: Self = Self(0x03);
  pub const VIRTUAL_CABLE_UNPLUG: Self = Self(0x05);

  fn name(self) -> Option<&'static str> {
    match self {
      Self::EXIT_SUSPEND => Some("EXIT_SUSPEND"),
      Self::SUSPEND => Some("SUSPEND"),
      Self::VIRTUAL_CABLE_UNPLUG => Some("VIRTUAL_CABLE_UNPLUG"),
      _ => None,
    }
  }
}

impl Display for ControlCommand {
  fn fmt(&self, f: &mut Formatter) -> fmt::Result {
    match self.name() {
      Some(name) => write!(f, "{name}[0x{:02X}]", self.0),
      None => write!(f, "0x{:02X}", self.0),
    }
  }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ReportType(pub u8);

impl ReportType {
  pub const FEATURE: Self = Self(0x03);
  pub const INPUT: Self = Self(0x01);
  pub const OTHER: Self = Self(0x00);
  pub const OUTPUT: Self = Self(0x02);

  fn name(self) -> Option<&'static str> {
    match self {
      Self::FEATURE => Some("FEATURE"),
      Self::INPUT => Some("INPUT"),
      Self::OTHER => Some("OTHER"),
      Self::OUTPUT => Some("OUTPUT"),
      _ => None,
    }
  }
}

impl Display for ReportType {
  fn fmt(&self, f: &mut Formatter) -> fmt::Result {
    match self.name() {
      Some(name) => write!(f, "{name}[0x{:02X}]", self.0),
      None => write!(f, "0x{:02X}", self.0),
    }
  }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ProtocolMode(pub u8);

impl ProtocolMode {
  pub const BOOT: Self = Self(0x00);
  pub const REPORT: Self = Self(0x01);

  fn name(self) -> Option<&'static str> {
    match self {
      Self::BOOT => Some("BOOT"),
      Self::REPORT => Some("REPORT"),
      _ => None,
    }
  }
}

impl Display for ProtocolMode {
  fn fmt(&self, f: &mut Formatter) -> fmt::Result {
    match self.name() {
      Some(name) => write!(f, "{name}[0x{:02X}]", self.0),
      None => write!(f, "0x{:02X}", self.0),
    }
  }
}

/// Events surfaced by [`Device::next_event`] and [`Host::next_event`].
/// Data events carry the whole pdu, header octet included.
#[derive(Clone, Debug, Eq, IntoStaticStr, PartialEq)]
#[strum(serialize_all = "snake_case")]
pub enum Event {
  ControlData { pdu: Bytes },
  ExitSuspend,
  Handshake { result: HandshakeResult },
  InterruptData { pdu: Bytes },
  Suspend,
  VirtualCableUnplug,
}

impl Event {
  pub fn name(&self) -> &'static str {
    self.into()
  }
}

fn message(message_type: MessageType, param: u8, payload: &[u8]) -> Vec<u8> {
  let mut message = Vec::with_capacity(1 + payload.len());
  message.push(message_type.0 << 4 | param);
  message.extend_from_slice(payload);
  message
}

/// Answers the control requests a HID host may send. Every operation
/// acknowledges with SUCCESSFUL unless overridden.
pub trait DeviceHandler {
  fn on_get_report(&mut self, _report_type: ReportType, _payload: &[u8]) -> HandshakeResult {
    HandshakeResult::SUCCESSFUL
  }

  fn on_set_report(&mut self, _report_type: ReportType, _payload: &[u8]) -> HandshakeResult {
    HandshakeResult::SUCCESSFUL
  }

  fn on_get_protocol(&mut self) -> HandshakeResult {
    HandshakeResult::SUCCESSFUL
  }

  fn on_set_protocol(&mut self, _mode: ProtocolMode) -> HandshakeResult {
    HandshakeResult::SUCCESSFUL
  }
}

/// The device end of a HID interconnect.
pub struct Device<H> {
  control: Channel,
  interrupt: Channel,
  handler: H,
}

impl<H: DeviceHandler> Device<H> {
  pub fn new(control: Channel, interrupt: Channel, handler: H) -> Self {
    Self {
      control,
      interrupt,
      handler,
    }
  }

  pub fn handler(&self) -> &H {
    &self.handler
  }

  pub fn handler_mut(&mut self) -> &mut H {
    &mut self.handler
  }

  pub fn into_handler(self) -> H {
    self.handler
  }

  pub fn send_handshake(&self, result: HandshakeResult) -> Result {
    self
      .control
      .send(message(MessageType::HANDSHAKE, result.0, &[]))
      .context(ChannelError)
  }

  /// Sends a DATA message on the control channel.
  pub fn send_control_data(&self, report_type: ReportType, data: &[u8]) -> Result {
    self
      .control
      .send(message(MessageType::DATA, report_type.0, data))
      .context(ChannelError)
  }

  /// Sends an input report on the interrupt channel.
  pub fn send_input_report(&self, data: &[u8]) -> Result {
    self
      .interrupt
      .send(message(MessageType::DATA, ReportType::INPUT.0, data))
      .context(ChannelError)
  }

  pub fn virtual_cable_unplug(&self) -> Result {
    self
      .control
      .send(message(
        MessageType::CONTROL,
        ControlCommand::VIRTUAL_CABLE_UNPLUG.0,
        &[],
      ))
      .context(ChannelError)
  }

  /// Waits for the next event, answering control requests through the
  /// handler along the way. Returns `None` once either channel closes.
  pub async fn next_event(&mut self) -> Result<Option<Event>> {
    loop {
      tokio::select! {
        pdu = self.control.recv() => match pdu {
          Some(pdu) => {
            if let Some(event) = self.on_control_pdu(&pdu)? {
              debug!("HID device event: {}", event.name());
              return Ok(Some(event));
            }
          }
          None => return Ok(None),
        },
        pdu = self.interrupt.recv() => {
          return Ok(pdu.map(|pdu| Event::InterruptData { pdu }));
        }
      }
    }
  }

  fn on_control_pdu(&mut self, pdu: &Bytes) -> Result<Option<Event>> {
    let Some((&header, payload)) = pdu.split_first() else {
      error!("dropping empty HID control pdu");
      return Ok(None);
    };

    let message_type = MessageType(header >> 4);
    let param = header & 0x0F;

    let event = match message_type {
      MessageType::GET_REPORT => {
        // Bit 3 of the parameter flags a trailing buffer size.
        let result = self
          .handler
          .on_get_report(ReportType(param & 0x03), payload);
        self.send_handshake(result)?;
        None
      }
      MessageType::SET_REPORT => {
        let result = self.handler.on_set_report(ReportType(param), payload);
        self.send_handshake(result)?;
        None
      }
      MessageType::GET_PROTOCOL => {
        let result = self.handler.on_get_protocol();
        self.send_handshake(result)?;
        None
      }
      MessageType::SET_PROTOCOL => {
        let result = self.handler.on_set_protocol(ProtocolMode(param));
        self.send_handshake(result)?;
        None
      }
      MessageType::DATA => Some(Event::ControlData { pdu: pdu.clone() }),
      MessageType::CONTROL => match ControlCommand(param) {
        ControlCommand::SUSPEND => Some(Event::Suspend),
        ControlCommand::EXIT_SUSPEND => Some(Event::ExitSuspend),
        ControlCommand::VIRTUAL_CABLE_UNPLUG => Some(Event::VirtualCableUnplug),
        command => {
          debug!("unsupported HID control operation {command}");
          self.send_handshake(HandshakeResult::ERR_UNSUPPORTED_REQUEST)?;
          None
        }
      },
      message_type => {
        debug!("unsupported HID message {message_type}");
        self.send_handshake(HandshakeResult::ERR_UNSUPPORTED_REQUEST)?;
        None
      }
    };

    Ok(event)
  }
}

/// The host end of a HID interconnect.
pub struct Host {
  control: Channel,
  interrupt: Channel,
}

impl Host {
  pub fn new(control: Channel, interrupt: Channel) -> Self {
    Self { control, interrupt }
  }

  /// A zero `buffer_size` requests the report at its native size and
  /// omits the trailing buffer size field.
  pub fn get_report(&self, report_type: ReportType, report_id: u8, buffer_size: u16) -> Result {
    let mut payload = vec![report_id];
    let mut param = report_type.0;

    if buffer_size != 0 {
      param |= BUFFER_SIZE_FLAG;
      payload.extend_from_slice(&buffer_size.to_le_bytes());
    }

    self
      .control
      .send(message(MessageType::GET_REPORT, param, &payload))
      .context(ChannelError)
  }

  pub fn set_report(&self, report_type: ReportType, data: &[u8]) -> Result {
    self
      .control
      .send(message(MessageType::SET_REPORT, report_type.0, data))
      .context(ChannelError)
  }

  pub fn get_protocol(&self) -> Result {
    self
      .control
      .send(message(MessageType::GET_PROTOCOL, 0, &[]))
      .context(ChannelError)
  }

  pub fn set_protocol(&self, mode: ProtocolMode) -> Result {
    self
      .control
      .send(message(MessageType::SET_PROTOCOL, mode.0, &[]))
      .context(ChannelError)
  }

  pub fn suspend(&self) -> Result {
    self
      .control
      .send(message(MessageType::CONTROL, ControlCommand::SUSPEND.0, &[]))
      .context(ChannelError)
  }

  pub fn exit_suspend(&self) -> Result {
    self
      .control
      .send(message(
        MessageType::CONTROL,
        ControlCommand::EXIT_SUSPEND.0,
        &[],
      ))
      .context(ChannelError)
  }

  pub fn virtual_cable_unplug(&self) -> Result {
    self
      .control
      .send(message(
        MessageType::CONTROL,
        ControlCommand::VIRTUAL_CABLE_UNPLUG.0,
        &[],
      ))
      .context(ChannelError)
  }

  /// Sends an output report on the interrupt channel.
  pub fn send_output_report(&self, data: &[u8]) -> Result {
    self
      .interrupt
      .send(message(MessageType::DATA, ReportType::OUTPUT.0, data))
      .context(ChannelError)
  }

  /// Waits for the next event. Messages a host has no business with are
  /// ignored. Returns `None` once either channel closes.
  pub async fn next_event(&mut self) -> Option<Event> {
    loop {
      tokio::select! {
        pdu = self.control.recv() => match pdu {
          Some(pdu) => {
            if let Some(event) = Self::on_control_pdu(&pdu) {
              debug!("HID host event: {}", event.name());
              return Some(event);
            }
          }
          None => return None,
        },
        pdu = self.interrupt.recv() => {
          return pdu.map(|pdu| Event::InterruptData { pdu });
        }
      }
    }
  }

  fn on_control_pdu(pdu: &Bytes) -> Option<Event> {
    let Some(&header) = pdu.first() else {
      error!("dropping empty HID control pdu");
      return None;
    };

    let message_type = MessageType(header >> 4);
    let param = header & 0x0F;

    match message_type {
      MessageType::HANDSHAKE => Some(Event::Handshake {
        result: HandshakeResult(param),
      }),
      MessageType::DATA => Some(Event::ControlData { pdu: pdu.clone() }),
      MessageType::CONTROL if ControlCommand(param) == ControlCommand::VIRTUAL_CABLE_UNPLUG => {
        Some(Event::VirtualCableUnplug)
      }
      message_type => {
        debug!("ignoring HID message {message_type}");
        None
      }
    }
  }
}

/// USB HID keyboard usage ids, see the HID Usage Tables, Keyboard/Keypad
/// page (0x07).
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct KeyCode(pub u8);

impl KeyCode {
  pub const A: Self = Self(0x04);
  pub const APOSTROPHE: Self = Self(0x34);
  pub const B: Self = Self(0x05);
  pub const BACKSLASH: Self = Self(0x31);
  pub const BACKSPACE: Self = Self(0x2A);
  pub const C: Self = Self(0x06);
  pub const CAPSLOCK: Self = Self(0x39);
  pub const COMMA: Self = Self(0x36);
  pub const D: Self = Self(0x07);
  pub const DELETE: Self = Self(0x4C);
  pub const DOT: Self = Self(0x37);
  pub const DOWN: Self = Self(0x51);
  pub const E: Self = Self(0x08);
  pub const END: Self = Self(0x4D);
  pub const ENTER: Self = Self(0x28);
  pub const EQUAL: Self = Self(0x2E);
  pub const ERR_OVF: Self = Self(0x01);
  pub const ESC: Self = Self(0x29);
  pub const F: Self = Self(0x09);
  pub const F1: Self = Self(0x3A);
  pub const F10: Self = Self(0x43);
  pub const F11: Self = Self(0x44);
  pub const F12: Self = Self(0x45);
  pub const F2: Self = Self(0x3B);
  pub const F3: Self = Self(0x3C);
  pub const F4: Self = Self(0x3D);
  pub const F5: Self = Self(0x3E);
  pub const F6: Self = Self(0x3F);
  pub const F7: Self = Self(0x40);
  pub const F8: Self = Self(0x41);
  pub const F9: Self = Self(0x42);
  pub const G: Self = Self(0x0A);
  pub const GRAVE: Self = Self(0x35);
  pub const H: Self = Self(0x0B);
  pub const HASHTILDE: Self = Self(0x32);
  pub const HOME: Self = Self(0x4A);
  pub const I: Self = Self(0x0C);
  pub const INSERT: Self = Self(0x49);
  pub const J: Self = Self(0x0D);
  pub const K: Self = Self(0x0E);
  pub const KEY_0: Self = Self(0x27);
  pub const KEY_1: Self = Self(0x1E);
  pub const KEY_2: Self = Self(0x1F);
  pub const KEY_3: Self = Self(0x20);
  pub const KEY_4: Self = Self(0x21);
  pub const KEY_5: Self = Self(0x22);
  pub const KEY_6: Self = Self(0x23);
  pub const KEY_7: Self = Self(0x24);
  pub const KEY_8: Self = Self(0x25);
  pub const KEY_9: Self = Self(0x26);
  pub const L: Self = Self(0x0F);
  pub const LEFT: Self = Self(0x50);
  pub const LEFTBRACE: Self = Self(0x2F);
  pub const M: Self = Self(0x10);
  pub const MINUS: Self = Self(0x2D);
  pub const N: Self = Self(0x11);
  pub const NONE: Self = Self(0x00);
  pub const O: Self = Self(0x12);
  pub const P: Self = Self(0x13);
  pub const PAGEDOWN: Self = Self(0x4E);
  pub const PAGEUP: Self = Self(0x4B);
  pub const PAUSE: Self = Self(0x48);
  pub const Q: Self = Self(0x14);
  pub const R: Self = Self(0x15);
  pub const RIGHT: Self = Self(0x4F);
  pub const RIGHTBRACE: Self = Self(0x30);
  pub const S: Self = Self(0x16);
  pub const SCROLLLOCK: Self = Self(0x47);
  pub const SEMICOLON: Self = Self(0x33);
  pub const SLASH: Self = Self(0x38);
  pub const SPACE: Self = Self(0x2C);
  pub const SYSRQ: Self = Self(0x46);
  pub const T: Self = Self(0x17);
  pub const TAB: Self = Self(0x2B);
  pub const U: Self = Self(0x18);
  pub const UP: Self = Self(0x52);
  pub const V: Self = Self(0x19);
  pub const W: Self = Self(0x1A);
  pub const X: Self = Self(0x1B);
  pub const Y: Self = Self(0x1C);
  pub const Z: Self = Self(0x1D);
}

/// Builds an 8-byte boot keyboard input report: a modifier bit mask, a
/// reserved octet, and up to six key slots.
pub fn boot_keyboard_input_report(modifiers: u8, keys: &[KeyCode]) -> [u8; 8] {
  assert!(keys.len() <= 6, "too many keys for a boot report");

  let mut report = [0; 8];
  report[0] = modifiers;

  for (slot, key) in report[2..].iter_mut().zip(keys) {
    *slot = key.0;
  }

  report
}

#[cfg(test)]
mod tests {
  use super::*;

  struct Accepting;

  impl DeviceHandler for Accepting {}

  struct Rejecting;

  impl DeviceHandler for Rejecting {
    fn on_get_report(&mut self, _report_type: ReportType, _payload: &[u8]) -> HandshakeResult {
      HandshakeResult::ERR_INVALID_REPORT_ID
    }
  }

  #[test]
  fn record_round_trips() {
    let information = SdpInformation::new(0x00010001, BOOT_KEYBOARD_REPORT_MAP);
    let record = information.service_record();

    assert_eq!(
      record.service_class_ids(),
      [Uuid::HUMAN_INTERFACE_DEVICE_SERVICE],
    );

    let additional = record
      .attribute(sdp::ADDITIONAL_PROTOCOL_DESCRIPTOR_LIST_ATTRIBUTE_ID)
      .and_then(DataElement::as_sequence)
      .and_then(|list| list.first())
      .and_then(DataElement::as_sequence)
      .unwrap();
    assert_eq!(
      additional[0],
      DataElement::sequence(vec![
        DataElement::uuid(Uuid::L2CAP_PROTOCOL),
        DataElement::unsigned_16(INTERRUPT_PSM),
      ]),
    );

    assert_eq!(SdpInformation::from_record(&record).unwrap(), information);

    let information = SdpInformation {
      battery_power: None,
      remote_wake: None,
      supervision_timeout: None,
      normally_connectable: None,
      service_name: None,
      service_description: None,
      provider_name: None,
      ssr_host_max_latency: None,
      ssr_host_min_timeout: None,
      ..information
    };
    assert_eq!(
      SdpInformation::from_record(&information.service_record()).unwrap(),
      information,
    );

    assert!(matches!(
      SdpInformation::from_record(&ServiceRecord::new(Vec::new())),
      Err(Error::IncompleteRecord),
    ));
  }

  #[test]
  fn record_defaults() {
    let information = SdpInformation::new(1, BOOT_KEYBOARD_REPORT_MAP);

    assert_eq!(information.version_number, 0x0101);
    assert_eq!(information.parser_version, 0x0111);
    assert_eq!(information.device_subclass, 0xC0);
    assert_eq!(information.country_code, 0x21);
    assert_eq!(information.report_descriptor_type, 0x22);
    assert_eq!(information.service_name.as_deref(), Some(&b"Navi HID"[..]));
    assert_eq!(information.provider_name.as_deref(), Some(&b"Navi"[..]));
    assert!(information.boot_device);
    assert_eq!(information.supervision_timeout, Some(0x0C80));
  }

  #[tokio::test]
  async fn host_message_wire_forms() {
    let (control, mut control_peer) = Channel::pair(8);
    let (interrupt, mut interrupt_peer) = Channel::pair(8);
    let host = Host::new(control, interrupt);

    host.get_report(ReportType::FEATURE, 2, 0).unwrap();
    assert_eq!(control_peer.recv().await.unwrap(), &[0x43, 0x02][..]);

    host.get_report(ReportType::INPUT, 1, 512).unwrap();
    assert_eq!(
      control_peer.recv().await.unwrap(),
      &[0x49, 0x01, 0x00, 0x02][..],
    );

    host.set_report(ReportType::OUTPUT, &[0x01, 0x02]).unwrap();
    assert_eq!(control_peer.recv().await.unwrap(), &[0x52, 0x01, 0x02][..]);

    host.get_protocol().unwrap();
    assert_eq!(control_peer.recv().await.unwrap(), &[0x60][..]);

    host.set_protocol(ProtocolMode::BOOT).unwrap();
    assert_eq!(control_peer.recv().await.unwrap(), &[0x70][..]);

    host.suspend().unwrap();
    assert_eq!(control_peer.recv().await.unwrap(), &[0x13][..]);

    host.exit_suspend().unwrap();
    assert_eq!(control_peer.recv().await.unwrap(), &[0x14][..]);

    host.virtual_cable_unplug().unwrap();
    assert_eq!(control_peer.recv().await.unwrap(), &[0x15][..]);

    host.send_output_report(&[0x09]).unwrap();
    assert_eq!(interrupt_peer.recv().await.unwrap(), &[0xA2, 0x09][..]);
  }

  #[tokio::test]
  async fn device_answers_control_requests() {
    let (control, mut control_peer) = Channel::pair(8);
    let (interrupt, _interrupt_peer) = Channel::pair(8);
    let mut device = Device::new(control, interrupt, Accepting);

    // A burst of host requests, an empty pdu, and a suspend control
    // operation.
    control_peer.send(vec![0x43, 0x02]).unwrap();
    control_peer.send(vec![0x52, 0x01, 0x02]).unwrap();
    control_peer.send(vec![0x60]).unwrap();
    control_peer.send(vec![0x71]).unwrap();
    control_peer.send(vec![0x80]).unwrap();
    control_peer.send(Bytes::new()).unwrap();
    control_peer.send(vec![0x13]).unwrap();

    assert_eq!(device.next_event().await.unwrap(), Some(Event::Suspend));

    for _ in 0..4 {
      assert_eq!(control_peer.recv().await.unwrap(), &[0x00][..]);
    }
    // The unknown message type gets ERR_UNSUPPORTED_REQUEST.
    assert_eq!(control_peer.recv().await.unwrap(), &[0x03][..]);

    control_peer.send(vec![0x14]).unwrap();
    assert_eq!(device.next_event().await.unwrap(), Some(Event::ExitSuspend));

    control_peer.send(vec![0x15]).unwrap();
    assert_eq!(
      device.next_event().await.unwrap(),
      Some(Event::VirtualCableUnplug),
    );

    control_peer.send(vec![0xA2, 0x07]).unwrap();
    assert_eq!(
      device.next_event().await.unwrap(),
      Some(Event::ControlData {
        pdu: Bytes::from_static(&[0xA2, 0x07]),
      }),
    );

    drop(control_peer);
    assert_eq!(device.next_event().await.unwrap(), None);
  }

  #[tokio::test]
  async fn device_handler_verdict_is_sent() {
    let (control, mut control_peer) = Channel::pair(8);
    let (interrupt, _interrupt_peer) = Channel::pair(8);
    let mut device = Device::new(control, interrupt, Rejecting);

    control_peer.send(vec![0x43, 0x02]).unwrap();
    control_peer.send(vec![0x15]).unwrap();

    assert_eq!(
      device.next_event().await.unwrap(),
      Some(Event::VirtualCableUnplug),
    );
    assert_eq!(control_peer.recv().await.unwrap(), &[0x02][..]);
  }

  #[tokio::test]
  async fn host_ignores_request_messages() {
    let (control, mut control_peer) = Channel::pair(8);
    let (interrupt, _interrupt_peer) = Channel::pair(8);
    let mut host = Host::new(control, interrupt);

    // Requests and non-unplug control operations mean nothing to a host.
    control_peer.send(vec![0x43, 0x02]).unwrap();
    control_peer.send(vec![0x13]).unwrap();
    control_peer.send(Bytes::new()).unwrap();
    control_peer.send(vec![0x0E]).unwrap();

    assert_eq!(
      host.next_event().await,
      Some(Event::Handshake {
        result: HandshakeResult::ERR_UNKNOWN,
      }),
    );

    drop(control_peer);
    assert_eq!(host.next_event().await, None);
  }

  #[tokio::test]
  async fn interrupt_reports_flow_both_ways() {
    let (device_control, host_control) = Channel::pair(8);
    let (device_interrupt, host_interrupt) = Channel::pair(8);

    let mut device = Device::new(device_control, device_interrupt, Accepting);
    let mut host = Host::new(host_control, host_interrupt);

    let report = boot_keyboard_input_report(0x02, &[KeyCode::A]);
    device.send_input_report(&report).unwrap();
    assert_eq!(
      host.next_event().await,
      Some(Event::InterruptData {
        pdu: Bytes::from(message(MessageType::DATA, ReportType::INPUT.0, &report)),
      }),
    );

    host.send_output_report(&[0x01]).unwrap();
    assert_eq!(
      device.next_event().await.unwrap(),
      Some(Event::InterruptData {
        pdu: Bytes::from_static(&[0xA2, 0x01]),
      }),
    );

    device.send_handshake(HandshakeResult::SUCCESSFUL).unwrap();
    assert_eq!(
      host.next_event().await,
      Some(Event::Handshake {
        result: HandshakeResult::SUCCESSFUL,
      }),
    );

    device
      .send_control_data(ReportType::FEATURE, &[0x0A])
      .unwrap();
    assert_eq!(
      host.next_event().await,
      Some(Event::ControlData {
        pdu: Bytes::from_static(&[0xA3, 0x0A]),
      }),
    );

    device.virtual_cable_unplug().unwrap();
    assert_eq!(host.next_event().await, Some(Event::VirtualCableUnplug));

    drop(device);
    assert_eq!(host.next_event().await, None);
  }

  #[test]
  fn boot_keyboard_reports() {
    assert_eq!(
      boot_keyboard_input_report(0x02, &[KeyCode::A, KeyCode::B]),
      [0x02, 0x00, 0x04, 0x05, 0x00, 0x00, 0x00, 0x00],
    );
    assert_eq!(boot_keyboard_input_report(0, &[]), [0; 8]);
    assert_eq!(KeyCode::KEY_0.0, 0x27);
    assert_eq!(KeyCode::UP.0, 0x52);
  }

  #[test]
  fn event_names() {
    assert_eq!(Event::VirtualCableUnplug.name(), "virtual_cable_unplug");
    assert_eq!(Event::Suspend.name(), "suspend");
    assert_eq!(
      Event::Handshake {
        result: HandshakeResult::SUCCESSFUL,
      }
      .name(),
      "handshake",
    );
  }
}

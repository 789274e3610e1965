//! Vendor HID feature report carrying the host's indicator state.
//!
//! Some hosts don't deliver LED output reports to a device without a keyboard interface, or
//! deliver them late. A host-side helper can instead write the indicator byte to this feature
//! report. Accepted reports are normalized into [`IndicatorChanged`] exactly like the LED
//! output report, so the automouse controller can't tell the two sources apart.

use embassy_usb::Builder;
use embassy_usb::class::hid::{Config, HidBootProtocol, HidSubclass, HidWriter, ReportId, RequestHandler, State};
use embassy_usb::control::OutResponse;
use embassy_usb::driver::Driver;
use rmk_trackball_types::led_indicator::LedIndicator;
use static_cell::StaticCell;

use crate::event::publish_event;
use crate::indicator::IndicatorChanged;

/// Report ID of the indicator feature report
pub const FEATURE_REPORT_ID: u8 = 0x01;

/// One 8-bit feature report on the vendor usage page 0xFF00
#[rustfmt::skip]
pub const VENDOR_REPORT_DESCRIPTOR: &[u8] = &[
    0x06, 0x00, 0xFF,  // Usage Page (Vendor Defined 0xFF00)
    0x09, 0x01,        // Usage (Vendor Usage 1)
    0xA1, 0x01,        // Collection (Application)
    0x85, 0x01,        //   Report ID (1)
    0x15, 0x00,        //   Logical Minimum (0)
    0x26, 0xFF, 0x00,  //   Logical Maximum (255)
    0x75, 0x08,        //   Report Size (8)
    0x95, 0x01,        //   Report Count (1)
    0xB1, 0x02,        //   Feature (Data, Variable, Absolute)
    0xC0,              // End Collection
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FeatureReportError {
    /// The report must hold the report ID and the indicator byte
    TooShort(usize),
    UnknownReportId(u8),
}

impl core::fmt::Display for FeatureReportError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            FeatureReportError::TooShort(len) => write!(f, "feature report too short: {} bytes", len),
            FeatureReportError::UnknownReportId(id) => write!(f, "unknown feature report id {}", id),
        }
    }
}

/// Parse `[report id, indicator bits]`, trailing bytes are ignored
pub fn parse_feature_report(data: &[u8]) -> Result<LedIndicator, FeatureReportError> {
    match data {
        [FEATURE_REPORT_ID, indicator, ..] => Ok(LedIndicator::from_bits(*indicator)),
        [id, _, ..] => Err(FeatureReportError::UnknownReportId(*id)),
        _ => Err(FeatureReportError::TooShort(data.len())),
    }
}

/// Handles SET_REPORT requests on the vendor interface
pub struct FeatureReportHandler {
    mask: LedIndicator,
}

impl FeatureReportHandler {
    pub fn new(mask: LedIndicator) -> Self {
        Self { mask }
    }
}

impl RequestHandler for FeatureReportHandler {
    fn set_report(&mut self, id: ReportId, data: &[u8]) -> OutResponse {
        let ReportId::Feature(FEATURE_REPORT_ID) = id else {
            warn!("Unsupported report {:?} on the indicator interface", id);
            return OutResponse::Rejected;
        };
        let indicator = match parse_feature_report(data) {
            Ok(indicator) => indicator,
            Err(e) => {
                warn!("Malformed indicator feature report: {:?}", e);
                return OutResponse::Rejected;
            }
        };

        let changed = IndicatorChanged::from_indicators(indicator, self.mask);
        debug!("Indicator feature report {:?} -> {:?}", indicator, changed);
        publish_event(changed);
        OutResponse::Accepted
    }
}

/// Add the vendor indicator interface to the USB device.
///
/// The side channel is optional: without a USB builder it's disabled and indicators only arrive
/// through [`crate::event::LedIndicatorEvent`].
pub fn add_feature_channel<D: Driver<'static>>(
    builder: Option<&mut Builder<'static, D>>,
    mask: LedIndicator,
) -> Option<HidWriter<'static, D, 8>> {
    let Some(builder) = builder else {
        error!("No USB device for the indicator feature channel, side channel disabled");
        return None;
    };
    let (state, config) = feature_channel_config(mask)?;
    Some(HidWriter::new(builder, state, config))
}

/// Take the HID state and the class config of the indicator interface, `None` if they're taken
fn feature_channel_config(mask: LedIndicator) -> Option<(&'static mut State<'static>, Config<'static>)> {
    static STATE: StaticCell<State> = StaticCell::new();
    static HANDLER: StaticCell<FeatureReportHandler> = StaticCell::new();

    let (Some(state), Some(handler)) = (STATE.try_init(State::new()), HANDLER.try_init(FeatureReportHandler::new(mask)))
    else {
        error!("Indicator feature channel already added");
        return None;
    };

    let config = Config {
        report_descriptor: VENDOR_REPORT_DESCRIPTOR,
        request_handler: Some(handler),
        poll_ms: 10,
        max_packet_size: 8,
        hid_subclass: HidSubclass::No,
        hid_boot_protocol: HidBootProtocol::None,
    };
    Some((state, config))
}

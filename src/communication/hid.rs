//! Gamepad report hand-off
//!
//! The wireless HID transport (advertising, pairing, connection state) is
//! external. It only has to accept packed reports through [`ReportSink`].

use crate::platform::Result;
use jtracker_core::output::{GamepadReport, REPORT_LEN};
use nalgebra::Quaternion;

/// Transport that notifies the host of a new report
#[allow(async_fn_in_trait)]
pub trait ReportSink {
    /// Queue one packed report for notification
    async fn notify(&mut self, report: &[u8; REPORT_LEN]) -> Result<()>;
}

/// Turns orientations into gamepad reports, skipping repeats
pub struct HidReporter<R: ReportSink> {
    sink: R,
    last: Option<GamepadReport>,
    sent: u32,
}

impl<R: ReportSink> HidReporter<R> {
    /// Reporter on `sink`
    pub fn new(sink: R) -> Self {
        Self {
            sink,
            last: None,
            sent: 0,
        }
    }

    /// Reports handed to the sink
    pub fn sent(&self) -> u32 {
        self.sent
    }

    /// Send `orientation` unless it quantizes to the last report.
    ///
    /// Returns `true` if a report was handed off. A failed hand-off is
    /// retried with the next orientation.
    pub async fn report(&mut self, orientation: &Quaternion<f32>) -> Result<bool> {
        let report = GamepadReport::from_orientation(orientation);
        if self.last == Some(report) {
            return Ok(false);
        }
        self.sink.notify(&report.to_bytes()).await?;
        self.last = Some(report);
        self.sent = self.sent.wrapping_add(1);
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::error::{NetworkError, PlatformError};
    use jtracker_core::output::hid::AXIS_SCALE;
    use std::vec::Vec;

    #[derive(Default)]
    struct Notifications {
        reports: Vec<[u8; REPORT_LEN]>,
        fail: bool,
    }

    impl ReportSink for Notifications {
        async fn notify(&mut self, report: &[u8; REPORT_LEN]) -> Result<()> {
            if self.fail {
                return Err(PlatformError::Network(NetworkError::SendFailed));
            }
            self.reports.push(*report);
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_identity_report_bytes() {
        let mut hid = HidReporter::new(Notifications::default());
        assert!(hid.report(&Quaternion::identity()).await.unwrap());

        let bytes = hid.sink.reports[0];
        assert_eq!(bytes[0], 0b0000_0001);
        // slider carries w
        let slider = i16::from_le_bytes([bytes[13], bytes[14]]);
        assert_eq!(slider, AXIS_SCALE as i16);
    }

    #[tokio::test]
    async fn test_repeats_are_skipped() {
        let mut hid = HidReporter::new(Notifications::default());
        let q = Quaternion::new(0.8, 0.6, 0.0, 0.0);
        assert!(hid.report(&q).await.unwrap());
        assert!(!hid.report(&q).await.unwrap());
        assert!(hid.report(&Quaternion::identity()).await.unwrap());
        assert_eq!(hid.sent(), 2);
    }

    #[tokio::test]
    async fn test_failed_notify_is_retried() {
        let mut hid = HidReporter::new(Notifications {
            fail: true,
            ..Default::default()
        });
        let q = Quaternion::identity();
        assert!(hid.report(&q).await.is_err());

        hid.sink.fail = false;
        assert!(hid.report(&q).await.unwrap());
    }
}

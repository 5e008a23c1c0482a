use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;

use actions::{ConsumerCode, HidOutput, KeyCode, OutputError};
use tracing::{debug, trace};

use crate::layout::us_keystroke;
use crate::report::{consumer_report, KeyboardReport};

/// Linux USB gadget HID endpoints (`/dev/hidgN`).
pub type GadgetHidOutput = ReportWriter<File>;

/// Writes raw keyboard and consumer-control reports to two endpoints.
///
/// A missing endpoint reports `Disconnected` when an action needs it.
pub struct ReportWriter<W> {
    keyboard: Option<W>,
    consumer: Option<W>,
}

impl GadgetHidOutput {
    pub fn open(keyboard: Option<&Path>, consumer: Option<&Path>) -> io::Result<Self> {
        let open = |p: &Path| OpenOptions::new().write(true).open(p);
        let keyboard = keyboard.map(open).transpose()?;
        let consumer = consumer.map(open).transpose()?;
        debug!(
            keyboard = keyboard.is_some(),
            consumer = consumer.is_some(),
            "HID gadget endpoints opened"
        );
        Ok(Self::new(keyboard, consumer))
    }
}

impl<W: Write> ReportWriter<W> {
    pub fn new(keyboard: Option<W>, consumer: Option<W>) -> Self {
        Self { keyboard, consumer }
    }

    pub fn into_inner(self) -> (Option<W>, Option<W>) {
        (self.keyboard, self.consumer)
    }

    fn keyboard_report(&mut self, report: KeyboardReport) -> Result<(), OutputError> {
        let w = self.keyboard.as_mut().ok_or(OutputError::Disconnected)?;
        trace!(report = ?report.as_bytes(), "keyboard report");
        w.write_all(report.as_bytes())?;
        w.flush()?;
        Ok(())
    }

    fn consumer_report(&mut self, bytes: [u8; 2]) -> Result<(), OutputError> {
        let w = self.consumer.as_mut().ok_or(OutputError::Disconnected)?;
        trace!(report = ?bytes, "consumer report");
        w.write_all(&bytes)?;
        w.flush()?;
        Ok(())
    }
}

impl<W: Write> HidOutput for ReportWriter<W> {
    fn send_control_code(&mut self, code: ConsumerCode) -> Result<(), OutputError> {
        self.consumer_report(consumer_report(Some(code)))?;
        self.consumer_report(consumer_report(None))
    }

    fn press_combo(&mut self, keys: &[KeyCode]) -> Result<(), OutputError> {
        let report = KeyboardReport::new(keys)?;
        self.keyboard_report(report)
    }

    fn release_all(&mut self) -> Result<(), OutputError> {
        self.keyboard_report(KeyboardReport::EMPTY)
    }

    fn write_text(&mut self, text: &str) -> Result<(), OutputError> {
        // Resolve everything up front so an untypeable character sends nothing.
        let strokes = text
            .chars()
            .map(|c| us_keystroke(c).ok_or(OutputError::Untypeable(c)))
            .collect::<Result<Vec<_>, _>>()?;

        for (key, shift) in strokes {
            let report = if shift {
                KeyboardReport::new(&[KeyCode::LeftShift, key])?
            } else {
                KeyboardReport::new(&[key])?
            };
            self.keyboard_report(report)?;
            self.keyboard_report(KeyboardReport::EMPTY)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn writer() -> ReportWriter<Vec<u8>> {
        ReportWriter::new(Some(Vec::new()), Some(Vec::new()))
    }

    #[test]
    fn control_code_presses_then_releases() {
        let mut out = writer();
        out.send_control_code(ConsumerCode::Mute).unwrap();
        let (kbd, consumer) = out.into_inner();
        assert!(kbd.unwrap().is_empty());
        assert_eq!(consumer.unwrap(), [0xE2, 0x00, 0x00, 0x00]);
    }

    #[test]
    fn combo_and_release() {
        let mut out = writer();
        out.press_combo(&[KeyCode::LeftGui, KeyCode::E]).unwrap();
        out.release_all().unwrap();
        let kbd = out.into_inner().0.unwrap();
        assert_eq!(kbd, [0x08, 0, 0x08, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn text_is_typed_key_by_key() {
        let mut out = writer();
        out.write_text("Hi").unwrap();
        let kbd = out.into_inner().0.unwrap();
        let reports: Vec<&[u8]> = kbd.chunks(8).collect();
        assert_eq!(reports.len(), 4);
        assert_eq!(reports[0], [0x02, 0, 0x0B, 0, 0, 0, 0, 0]);
        assert_eq!(reports[1], [0; 8]);
        assert_eq!(reports[2], [0x00, 0, 0x0C, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn untypeable_text_sends_nothing() {
        let mut out = writer();
        assert!(matches!(out.write_text("café"), Err(OutputError::Untypeable('é'))));
        assert!(out.into_inner().0.unwrap().is_empty());
    }

    #[test]
    fn missing_endpoint_is_disconnected() {
        let mut out: ReportWriter<Vec<u8>> = ReportWriter::new(Some(Vec::new()), None);
        assert!(matches!(
            out.send_control_code(ConsumerCode::Mute),
            Err(OutputError::Disconnected)
        ));
        assert!(out.press_combo(&[KeyCode::A]).is_ok());
    }
}

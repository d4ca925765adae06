//! Query document
//!
//! Snapshot of every thermistor's current temperature, in segment order and
//! then wiring order, as served by the `/api/thermistors` endpoint:
//!
//! ```json
//! {
//!   "thermistors": [
//!     { "segmentNumber": 1, "thermistorNumber": 1, "temperature": 24 }
//!   ],
//!   "count": 1,
//!   "timestamp": 1700000000000
//! }
//! ```

use heapless::Vec;

use crate::constants::buffers::MAX_REPORT_ENTRIES;
use crate::segment::Segment;
use crate::time::Timestamp;

/// One thermistor in the query document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct ThermistorEntry {
    /// Segment id
    pub segment_number: u8,
    /// 1-based position within the segment
    pub thermistor_number: u16,
    /// Whole °C
    pub temperature: i16,
}

/// Query response body
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ThermistorReport {
    /// Entries in segment order, then thermistor order
    pub thermistors: Vec<ThermistorEntry, MAX_REPORT_ENTRIES>,
    /// Number of entries
    pub count: usize,
    /// When the samples were taken (ms)
    pub timestamp: Timestamp,
}

impl ThermistorReport {
    /// Build the document from freshly sampled segments
    pub fn from_segments<'a, I>(segments: I, timestamp: Timestamp) -> Self
    where
        I: IntoIterator<Item = &'a Segment>,
    {
        let mut thermistors = Vec::new();
        'segments: for segment in segments {
            for (index, thermistor) in segment.thermistors().iter().enumerate() {
                let entry = ThermistorEntry {
                    segment_number: segment.id().0,
                    thermistor_number: index as u16 + 1,
                    temperature: thermistor.temperature,
                };
                if thermistors.push(entry).is_err() {
                    break 'segments;
                }
            }
        }

        Self {
            count: thermistors.len(),
            thermistors,
            timestamp,
        }
    }

    /// Entry for a segment and 1-based thermistor number
    pub fn find(&self, segment_number: u8, thermistor_number: u16) -> Option<&ThermistorEntry> {
        self.thermistors
            .iter()
            .find(|e| {
                e.segment_number == segment_number && e.thermistor_number == thermistor_number
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::segment::SegmentId;
    use crate::thermistor::ChannelId;

    fn segment(id: u8, temps: &[i16]) -> Segment {
        let channels: Vec<ChannelId, 8> = (0..temps.len() as u8).map(ChannelId).collect();
        let mut segment = Segment::new(SegmentId(id), &channels).unwrap();
        for (t, &temp) in segment.thermistors_mut().iter_mut().zip(temps) {
            t.record(1.8, temp as f32);
        }
        segment
    }

    #[test]
    fn entries_follow_segment_then_wiring_order() {
        let segments = [segment(1, &[24, 25]), segment(2, &[-3])];
        let report = ThermistorReport::from_segments(&segments, 42);

        assert_eq!(report.count, 3);
        assert_eq!(report.timestamp, 42);
        let order: Vec<(u8, u16, i16), 4> = report
            .thermistors
            .iter()
            .map(|e| (e.segment_number, e.thermistor_number, e.temperature))
            .collect();
        assert_eq!(order.as_slice(), &[(1, 1, 24), (1, 2, 25), (2, 1, -3)]);
        assert_eq!(report.find(2, 1).map(|e| e.temperature), Some(-3));
        assert!(report.find(2, 2).is_none());
    }

    #[test]
    fn empty_pack_gives_empty_report() {
        let report = ThermistorReport::from_segments(&[], 0);
        assert_eq!(report.count, 0);
        assert!(report.thermistors.is_empty());
    }
}

//! Fuzz target: persisted calibration and watcher records
//!
//! Decodes arbitrary blobs as both record kinds and verifies:
//! - No panics under arbitrary byte inputs
//! - Only blobs of the exact record width are accepted
//! - An accepted record encodes back to the same bytes
//!
//! cargo fuzz run fuzz_record_decode

#![no_main]

use libfuzzer_sys::fuzz_target;
use levelguard::records::{CalibrationRecord, WatcherRecord};

fuzz_target!(|data: &[u8]| {
    if let Ok(rec) = CalibrationRecord::decode(data) {
        assert_eq!(data.len(), CalibrationRecord::ENCODED_LEN);
        assert_eq!(&rec.encode()[..], data);
    }

    if let Ok(rec) = WatcherRecord::decode(data) {
        assert_eq!(data.len(), WatcherRecord::ENCODED_LEN);
        // Bytes after a text field's terminator are padding and may differ.
        let again = WatcherRecord::decode(&rec.encode()).expect("re-encoded record must decode");
        assert_eq!(again, rec);
    }
});

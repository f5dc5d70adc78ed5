//! Fuzz target: remote `SensorState` payload decoder
//!
//! Feeds arbitrary bytes (as lossy UTF-8) to `decode_state` and verifies:
//! - No panics under arbitrary input
//! - A decoded state always carries a code in 0..=4
//! - `UnknownState` is only reported for codes outside 0..=4
//!
//! cargo fuzz run fuzz_state_payload

#![no_main]

use libfuzzer_sys::fuzz_target;
use levelguard::error::RemoteError;
use levelguard::watcher::decode_state;

fuzz_target!(|data: &[u8]| {
    let body = String::from_utf8_lossy(data);
    match decode_state(&body) {
        Ok(Some(state)) => assert!(state.code() <= 4),
        Ok(None) | Err(RemoteError::Decode) => {}
        Err(RemoteError::UnknownState(code)) => {
            assert!(!(0..=4).contains(&code), "valid code {code} rejected");
        }
        Err(other) => panic!("decoder produced transport error {other:?}"),
    }
});

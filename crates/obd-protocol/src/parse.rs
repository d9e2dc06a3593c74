//! Response Text Parsing
//!
//! ELM327-style adapters answer in ASCII: hexadecimal byte tokens separated
//! by spaces, with embedded `\r`/`\n`, command echoes, prompt characters and
//! occasional noise (`SEARCHING...`, `NO DATA`). Parsing is deliberately
//! lenient: salvage the numeric payload, drop everything else. Framing is
//! never validated strictly here; too few usable bytes is signaled by the
//! short result and handled at decode time.

use crate::mode;
use crate::pid::Pid;

/// Filter raw response text down to the data bytes for one PID.
///
/// Runs the best-effort token filter, strips the `41 <pid>` positive-response
/// header when the adapter echoed one, and truncates to the PID's expected
/// byte count. The result is shorter than expected exactly when the response
/// did not carry enough usable payload.
pub fn extract_payload(raw: &[u8], pid: Pid) -> Vec<u8> {
    let mut bytes = filter_hex_tokens(raw);
    if bytes.len() >= 2
        && bytes[0] == mode::CURRENT_DATA + mode::REPLY_OFFSET
        && bytes[1] == pid.as_hex()
    {
        bytes.drain(..2);
    }
    bytes.truncate(pid.response_bytes());
    bytes
}

/// Best-effort token filter: keep only tokens that are a valid byte.
///
/// The input is split on ASCII whitespace (which disposes of `\r`/`\n` line
/// terminators along the way). A token counts as a byte iff it is one or two
/// hex digits; single-digit tokens are accepted. Everything else is dropped
/// silently, in keeping with the noisy channel.
pub fn filter_hex_tokens(raw: &[u8]) -> Vec<u8> {
    String::from_utf8_lossy(raw)
        .split_ascii_whitespace()
        .filter(|token| token.len() <= 2 && token.bytes().all(|b| b.is_ascii_hexdigit()))
        .filter_map(|token| u8::from_str_radix(token, 16).ok())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_clean_response() {
        assert_eq!(filter_hex_tokens(b"0F 90\r"), vec![0x0F, 0x90]);
    }

    #[test]
    fn test_echo_header_is_stripped() {
        assert_eq!(
            extract_payload(b"41 0C 0F 90\r\n", Pid::Rpm),
            vec![0x0F, 0x90]
        );
        assert_eq!(extract_payload(b"41 11 E6\r", Pid::Throttle), vec![0xE6]);
    }

    #[test]
    fn test_headerless_response_passes_through() {
        assert_eq!(extract_payload(b"0F 90\r", Pid::Rpm), vec![0x0F, 0x90]);
    }

    #[test]
    fn test_header_for_other_pid_is_kept() {
        // 41 11 is not the RPM header; treat it as payload, not an echo
        assert_eq!(extract_payload(b"41 11 E6\r", Pid::Rpm), vec![0x41, 0x11]);
    }

    #[test]
    fn test_single_digit_tokens_are_accepted() {
        // "A" is not a two-digit byte but is a valid hex digit (0x0A)
        assert_eq!(filter_hex_tokens(b"0F A\r"), vec![0x0F, 0x0A]);
    }

    #[test]
    fn test_noise_tokens_are_dropped() {
        assert_eq!(filter_hex_tokens(b"SEARCHING...\r\n41 0C 1A F8\r\n>"),
            vec![0x41, 0x0C, 0x1A, 0xF8]);
        assert_eq!(filter_hex_tokens(b"NO DATA\r>"), vec![]);
        assert_eq!(filter_hex_tokens(b">"), vec![]);
    }

    #[test]
    fn test_tokens_longer_than_a_byte_are_dropped() {
        assert_eq!(filter_hex_tokens(b"410C 0F 90\r"), vec![0x0F, 0x90]);
    }

    #[test]
    fn test_payload_is_truncated_to_expected_count() {
        assert_eq!(extract_payload(b"41 11 E6 00 00\r", Pid::Throttle), vec![0xE6]);
    }

    #[test]
    fn test_empty_and_blank_input() {
        assert_eq!(filter_hex_tokens(b""), vec![]);
        assert_eq!(filter_hex_tokens(b"\r\n"), vec![]);
    }

    proptest! {
        #[test]
        fn filter_never_panics(raw in proptest::collection::vec(any::<u8>(), 0..128)) {
            let _ = filter_hex_tokens(&raw);
        }

        #[test]
        fn spaced_hex_round_trips(bytes in proptest::collection::vec(any::<u8>(), 0..16)) {
            let text = bytes
                .iter()
                .map(|b| format!("{b:02X}"))
                .collect::<Vec<_>>()
                .join(" ");
            prop_assert_eq!(filter_hex_tokens(text.as_bytes()), bytes);
        }

        #[test]
        fn payload_never_exceeds_expected_count(
            raw in proptest::collection::vec(any::<u8>(), 0..128)
        ) {
            prop_assert!(extract_payload(&raw, Pid::Rpm).len() <= 2);
            prop_assert!(extract_payload(&raw, Pid::Throttle).len() <= 1);
        }
    }
}

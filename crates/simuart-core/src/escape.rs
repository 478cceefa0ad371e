/// Renders one byte for console traces: common control characters as
/// backslash escapes, printable ASCII as-is, everything else as `\ooo`.
pub fn escape_byte(byte: u8) -> String {
    match byte {
        b'\n' => "\\n".to_string(),
        b'\r' => "\\r".to_string(),
        b'\t' => "\\t".to_string(),
        0x20..=0x7e => (byte as char).to_string(),
        _ => format!("\\{byte:03o}"),
    }
}

/// `XX (c)` form used by the per-byte trace.
pub fn describe_byte(byte: u8) -> String {
    format!("{byte:02X} ({})", escape_byte(byte))
}

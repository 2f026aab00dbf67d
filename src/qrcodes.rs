//! QR payload generation for parts.
//!
//! Each part carries a QR payload encoding its identifier so a scan on the
//! shop floor resolves straight to the part record. Rendering the payload
//! into an image (and hosting the file the stored URL points at) is the
//! responsibility of the QR collaborator; this module only owns the payload
//! and URL conventions.

/// Data encoded into a part's QR code
pub fn qr_payload(part_id: i32) -> String {
    part_id.to_string()
}

/// URL under which the rendered QR image for a part is served
pub fn qr_code_url(part_id: i32) -> String {
    format!("/qrcodes/part_{}.png", part_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_and_url_encode_the_part_id() {
        assert_eq!(qr_payload(42), "42");
        assert_eq!(qr_code_url(42), "/qrcodes/part_42.png");
    }
}

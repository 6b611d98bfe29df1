//! Wi-Fi join code rendering
//!
//! Encodes the standard `WIFI:` join payload as a QR code and renders it
//! with Unicode half-block characters, two QR rows per terminal line.

use qrcode::{EcLevel, QrCode};

/// Build the Wi-Fi join payload for a network and credential
pub fn wifi_payload(network_name: &str, credential: &str) -> String {
    format!("WIFI:T:WPA;S:{};P:{};;", network_name, credential)
}

/// A scannable Wi-Fi join code
pub struct WifiJoinCode {
    payload: String,
    /// Generated QR module matrix
    matrix: Option<Vec<Vec<bool>>>,
    /// Error message if generation failed
    error: Option<String>,
}

impl WifiJoinCode {
    /// Encode a join code for `network_name` and `credential`
    ///
    /// Low error correction, matching the capacity choice for join payloads.
    pub fn new(network_name: &str, credential: &str) -> Self {
        let payload = wifi_payload(network_name, credential);
        let (matrix, error) = match QrCode::with_error_correction_level(&payload, EcLevel::L) {
            Ok(code) => {
                let matrix: Vec<Vec<bool>> = code
                    .render::<char>()
                    .quiet_zone(false)
                    .module_dimensions(1, 1)
                    .build()
                    .lines()
                    .map(|line| line.chars().map(|c| c != ' ').collect())
                    .collect();
                (Some(matrix), None)
            }
            Err(e) => (None, Some(format!("QR generation failed: {}", e))),
        };

        Self {
            payload,
            matrix,
            error,
        }
    }

    /// The encoded payload string
    pub fn payload(&self) -> &str {
        &self.payload
    }

    /// Rendering failure, if any
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Render using Unicode half blocks, or `None` when generation failed
    ///
    /// Uses ▀ (upper half) ▄ (lower half) █ (full) and space for 2 rows at
    /// a time.
    pub fn render(&self) -> Option<String> {
        let matrix = self.matrix.as_ref()?;

        let qr_height = matrix.len();
        let qr_width = matrix.first().map(|r| r.len()).unwrap_or(0);
        let display_height = qr_height.div_ceil(2);

        let mut out = String::with_capacity(display_height * (qr_width + 1));
        for row in 0..display_height {
            let top_row = row * 2;
            let bottom_row = row * 2 + 1;

            for col in 0..qr_width {
                let top = matrix
                    .get(top_row)
                    .and_then(|r| r.get(col))
                    .copied()
                    .unwrap_or(false);
                let bottom = matrix
                    .get(bottom_row)
                    .and_then(|r| r.get(col))
                    .copied()
                    .unwrap_or(false);

                let block = match (top, bottom) {
                    (true, true) => '█',
                    (true, false) => '▀',
                    (false, true) => '▄',
                    (false, false) => ' ',
                };
                out.push(block);
            }
            out.push('\n');
        }

        Some(out)
    }
}

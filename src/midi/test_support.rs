//! Hand-encoded SMF fixtures for unit tests

/// Encode a variable length quantity
fn vlq(mut value: u32) -> Vec<u8> {
    let mut out = vec![(value & 0x7F) as u8];
    value >>= 7;
    while value > 0 {
        out.insert(0, ((value & 0x7F) as u8) | 0x80);
        value >>= 7;
    }
    out
}

/// Builder for the body of one MTrk chunk
#[derive(Default)]
pub struct TrackBytes {
    bytes: Vec<u8>,
}

impl TrackBytes {
    pub fn new() -> Self {
        Self::default()
    }

    fn event(mut self, delta: u32, body: &[u8]) -> Self {
        self.bytes.extend(vlq(delta));
        self.bytes.extend_from_slice(body);
        self
    }

    pub fn meta(self, delta: u32, meta_type: u8, data: &[u8]) -> Self {
        let mut body = vec![0xFF, meta_type];
        body.extend(vlq(data.len() as u32));
        body.extend_from_slice(data);
        self.event(delta, &body)
    }

    pub fn tempo(self, delta: u32, micros: u32) -> Self {
        let b = micros.to_be_bytes();
        self.meta(delta, 0x51, &b[1..])
    }

    pub fn time_signature(self, delta: u32, numerator: u8, denominator_pow2: u8) -> Self {
        self.meta(delta, 0x58, &[numerator, denominator_pow2, 24, 8])
    }

    pub fn key_signature(self, delta: u32, sharps: i8, minor: bool) -> Self {
        self.meta(delta, 0x59, &[sharps as u8, minor as u8])
    }

    pub fn note_on(self, delta: u32, channel: u8, key: u8, velocity: u8) -> Self {
        self.event(delta, &[0x90 | channel, key, velocity])
    }

    pub fn note_off(self, delta: u32, channel: u8, key: u8, velocity: u8) -> Self {
        self.event(delta, &[0x80 | channel, key, velocity])
    }

    pub fn control(self, delta: u32, channel: u8, controller: u8, value: u8) -> Self {
        self.event(delta, &[0xB0 | channel, controller, value])
    }

    pub fn program(self, delta: u32, channel: u8, program: u8) -> Self {
        self.event(delta, &[0xC0 | channel, program])
    }

    pub fn pitch_bend(self, delta: u32, channel: u8, value: u16) -> Self {
        self.event(delta, &[0xE0 | channel, (value & 0x7F) as u8, (value >> 7) as u8])
    }

    pub fn end(self, delta: u32) -> Vec<u8> {
        self.event(delta, &[0xFF, 0x2F, 0x00]).bytes
    }
}

/// Wrap track bodies into a complete file
pub fn smf_bytes(format: u16, ticks_per_quarter: u16, tracks: &[Vec<u8>]) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(b"MThd");
    out.extend_from_slice(&6u32.to_be_bytes());
    out.extend_from_slice(&format.to_be_bytes());
    out.extend_from_slice(&(tracks.len() as u16).to_be_bytes());
    out.extend_from_slice(&ticks_per_quarter.to_be_bytes());
    for track in tracks {
        out.extend_from_slice(b"MTrk");
        out.extend_from_slice(&(track.len() as u32).to_be_bytes());
        out.extend_from_slice(track);
    }
    out
}

//! Shared fixtures: hand-encoded SMF files and temp paths

#![allow(dead_code)]

use std::path::PathBuf;

fn vlq(mut value: u32) -> Vec<u8> {
    let mut out = vec![(value & 0x7F) as u8];
    value >>= 7;
    while value > 0 {
        out.insert(0, ((value & 0x7F) as u8) | 0x80);
        value >>= 7;
    }
    out
}

#[derive(Default)]
pub struct TrackBytes {
    bytes: Vec<u8>,
}

impl TrackBytes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn raw(mut self, delta: u32, body: &[u8]) -> Self {
        self.bytes.extend(vlq(delta));
        self.bytes.extend_from_slice(body);
        self
    }

    pub fn meta(self, delta: u32, meta_type: u8, data: &[u8]) -> Self {
        let mut body = vec![0xFF, meta_type];
        body.extend(vlq(data.len() as u32));
        body.extend_from_slice(data);
        self.raw(delta, &body)
    }

    pub fn tempo(self, delta: u32, micros: u32) -> Self {
        self.meta(delta, 0x51, &micros.to_be_bytes()[1..])
    }

    pub fn key_signature(self, delta: u32, sharps: i8, minor: bool) -> Self {
        self.meta(delta, 0x59, &[sharps as u8, minor as u8])
    }

    pub fn note_on(self, delta: u32, channel: u8, key: u8, velocity: u8) -> Self {
        self.raw(delta, &[0x90 | channel, key, velocity])
    }

    pub fn note_off(self, delta: u32, channel: u8, key: u8, velocity: u8) -> Self {
        self.raw(delta, &[0x80 | channel, key, velocity])
    }

    pub fn control(self, delta: u32, channel: u8, controller: u8, value: u8) -> Self {
        self.raw(delta, &[0xB0 | channel, controller, value])
    }

    pub fn program(self, delta: u32, channel: u8, program: u8) -> Self {
        self.raw(delta, &[0xC0 | channel, program])
    }

    pub fn end(self, delta: u32) -> Vec<u8> {
        self.raw(delta, &[0xFF, 0x2F, 0x00]).bytes
    }
}

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

/// Format 1 file: conductor track with two tempo changes, two instrument tracks
pub fn song() -> Vec<u8> {
    let conductor = TrackBytes::new()
        .meta(0, 0x03, b"Tempo")
        .tempo(0, 500_000)
        .key_signature(0, 0, false)
        .tempo(1920, 600_000)
        .key_signature(0, 3, true)
        .end(0);
    let piano = TrackBytes::new()
        .meta(0, 0x03, b"Piano")
        .program(0, 0, 0)
        .note_on(0, 0, 60, 100)
        .note_on(0, 0, 64, 90)
        .control(240, 0, 64, 127)
        .note_off(240, 0, 60, 40)
        .note_off(0, 0, 64, 40)
        .note_on(480, 0, 67, 110)
        // running status note off via velocity 0
        .raw(960, &[67, 0])
        .end(960);
    let drums = TrackBytes::new()
        .note_on(0, 9, 36, 127)
        .note_on(480, 9, 36, 0)
        .note_on(0, 9, 38, 100)
        .note_off(480, 9, 38, 0)
        .raw(0, &[0xF0, 0x03, 0x7E, 0x7F, 0xF7])
        .end(0);
    smf_bytes(1, 480, &[conductor, piano, drums])
}

/// Format 0 file: one tempo at tick 0, last event at `end_tick`
pub fn single_tempo(ticks_per_quarter: u16, end_tick: u32) -> Vec<u8> {
    let track = TrackBytes::new()
        .tempo(0, 500_000)
        .note_on(0, 0, 60, 100)
        .note_off(end_tick, 0, 60, 0)
        .end(0);
    smf_bytes(0, ticks_per_quarter, &[track])
}

pub fn temp_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("{}-{}", uuid::Uuid::new_v4(), name))
}

pub fn write_temp(name: &str, bytes: &[u8]) -> PathBuf {
    let path = temp_path(name);
    std::fs::write(&path, bytes).unwrap();
    path
}

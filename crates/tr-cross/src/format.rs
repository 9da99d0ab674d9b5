//! Binary layout of a region's cross-region section.
//!
//! ```text
//! header
//!   version            u32
//!   num_transitions    u32
//!   transitions_size   u64   bytes of the transitions blob
//!   base_lat, base_lon i32   PointCode all deltas start from
//!   bits_per_mask      u8
//!   section_count      u32
//!   sections           section_count × { size u64, enters u32, exits u32, vehicle u8 }
//! transitions blob     num_transitions × transition
//! weight blobs         one per section, enters × exits × f32, row-major by enter
//! ```
//!
//! All integers are little-endian.  A transition is encoded as LEB128
//! feature id and segment index, the back point as a zig-zag LEB128 delta
//! from the base, the front point as a delta from the back point, then the
//! road mask, one-way mask and `forward_is_enter` packed LSB-first into
//! `ceil((2 × bits_per_mask + 1) / 8)` bytes.

use tr_core::{FeatureId, PointCode, RegionId, TravelMode};

use crate::error::corrupted;
use crate::{Connector, CrossResult, Transition};

pub const FORMAT_VERSION: u32 = 1;

/// Mask width this build writes.
pub const BITS_PER_MASK: u8 = TravelMode::COUNT as u8;

const HEADER_FIXED: usize = 4 + 4 + 8 + 4 + 4 + 1 + 4;
const SECTION_HEADER: usize = 8 + 4 + 4 + 1;

// ── Writing ───────────────────────────────────────────────────────────────────

/// Encode `transitions` and the weight sections of `connectors`.
///
/// Connectors without weights are skipped.
pub fn serialize(base: PointCode, transitions: &[Transition], connectors: &[&Connector]) -> Vec<u8> {
    let mut blob = Vec::new();
    for t in transitions {
        write_transition(&mut blob, base, BITS_PER_MASK, t);
    }

    let sections: Vec<(&Connector, &[u8])> =
        connectors.iter().filter_map(|c| c.raw_weights().map(|raw| (*c, raw))).collect();

    let mut out = Vec::with_capacity(HEADER_FIXED + sections.len() * SECTION_HEADER + blob.len());
    out.extend_from_slice(&FORMAT_VERSION.to_le_bytes());
    out.extend_from_slice(&(transitions.len() as u32).to_le_bytes());
    out.extend_from_slice(&(blob.len() as u64).to_le_bytes());
    out.extend_from_slice(&base.lat.to_le_bytes());
    out.extend_from_slice(&base.lon.to_le_bytes());
    out.push(BITS_PER_MASK);
    out.extend_from_slice(&(sections.len() as u32).to_le_bytes());
    for (c, raw) in &sections {
        out.extend_from_slice(&(raw.len() as u64).to_le_bytes());
        out.extend_from_slice(&(c.enters().len() as u32).to_le_bytes());
        out.extend_from_slice(&(c.exits().len() as u32).to_le_bytes());
        out.push(c.mode().code());
    }
    out.extend_from_slice(&blob);
    for (_, raw) in &sections {
        out.extend_from_slice(raw);
    }
    out
}

fn write_transition(out: &mut Vec<u8>, base: PointCode, bits: u8, t: &Transition) {
    write_varint(out, t.feature.index() as u64);
    write_varint(out, t.segment_idx as u64);
    write_varint(out, zigzag(t.back_point.lat as i64 - base.lat as i64));
    write_varint(out, zigzag(t.back_point.lon as i64 - base.lon as i64));
    write_varint(out, zigzag(t.front_point.lat as i64 - t.back_point.lat as i64));
    write_varint(out, zigzag(t.front_point.lon as i64 - t.back_point.lon as i64));

    let mut bitw = BitWriter::new(out);
    bitw.write(t.road_mask as u32, bits);
    bitw.write(t.one_way_mask as u32, bits);
    bitw.write(t.forward_is_enter as u32, 1);
    bitw.flush();
}

fn write_varint(out: &mut Vec<u8>, mut v: u64) {
    while v >= 0x80 {
        out.push((v as u8) | 0x80);
        v >>= 7;
    }
    out.push(v as u8);
}

#[inline]
fn zigzag(v: i64) -> u64 {
    ((v << 1) ^ (v >> 63)) as u64
}

#[inline]
fn unzigzag(v: u64) -> i64 {
    ((v >> 1) as i64) ^ -((v & 1) as i64)
}

struct BitWriter<'a> {
    out: &'a mut Vec<u8>,
    acc: u32,
    used: u8,
}

impl<'a> BitWriter<'a> {
    fn new(out: &'a mut Vec<u8>) -> Self {
        Self { out, acc: 0, used: 0 }
    }

    fn write(&mut self, value: u32, bits: u8) {
        for i in 0..bits {
            self.acc |= ((value >> i) & 1) << self.used;
            self.used += 1;
            if self.used == 8 {
                self.out.push(self.acc as u8);
                self.acc = 0;
                self.used = 0;
            }
        }
    }

    fn flush(&mut self) {
        if self.used > 0 {
            self.out.push(self.acc as u8);
            self.acc = 0;
            self.used = 0;
        }
    }
}

// ── Reading ───────────────────────────────────────────────────────────────────

struct Reader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    fn take(&mut self, n: usize) -> CrossResult<&'a [u8]> {
        let end = self.pos.checked_add(n).filter(|&e| e <= self.data.len());
        let Some(end) = end else {
            return Err(corrupted(format!("truncated at byte {} (wanted {n} more)", self.pos)));
        };
        let s = &self.data[self.pos..end];
        self.pos = end;
        Ok(s)
    }

    fn array<const N: usize>(&mut self) -> CrossResult<[u8; N]> {
        let mut a = [0u8; N];
        a.copy_from_slice(self.take(N)?);
        Ok(a)
    }

    fn u8(&mut self) -> CrossResult<u8> {
        Ok(self.take(1)?[0])
    }

    fn u32(&mut self) -> CrossResult<u32> {
        self.array().map(u32::from_le_bytes)
    }

    fn i32(&mut self) -> CrossResult<i32> {
        self.array().map(i32::from_le_bytes)
    }

    fn u64(&mut self) -> CrossResult<u64> {
        self.array().map(u64::from_le_bytes)
    }

    fn varint(&mut self) -> CrossResult<u64> {
        let mut v = 0u64;
        for shift in (0..64).step_by(7) {
            let b = self.u8()?;
            v |= ((b & 0x7f) as u64) << shift;
            if b & 0x80 == 0 {
                return Ok(v);
            }
        }
        Err(corrupted("varint longer than 10 bytes"))
    }
}

/// One weight section header.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct SectionHeader {
    pub size: u64,
    pub num_enters: u32,
    pub num_exits: u32,
    pub vehicle: TravelMode,
}

/// A parsed region section; weight blobs stay borrowed.
#[derive(Debug)]
pub struct Decoded<'a> {
    pub base: PointCode,
    pub transitions: Vec<Transition>,
    pub sections: Vec<(SectionHeader, &'a [u8])>,
}

/// Parse and validate a whole region section.
pub fn decode(data: &[u8]) -> CrossResult<Decoded<'_>> {
    let mut r = Reader::new(data);

    let version = r.u32()?;
    if version != FORMAT_VERSION {
        return Err(corrupted(format!("unknown version {version}")));
    }
    let num_transitions = r.u32()?;
    let transitions_size = usize::try_from(r.u64()?).map_err(|_| corrupted("transitions blob too large"))?;
    let base = PointCode { lat: r.i32()?, lon: r.i32()? };
    let bits = r.u8()?;
    if bits == 0 || bits > 8 {
        return Err(corrupted(format!("bits_per_mask {bits} out of range")));
    }
    let section_count = r.u32()?;

    let mut headers = Vec::new();
    for _ in 0..section_count {
        let size = r.u64()?;
        let num_enters = r.u32()?;
        let num_exits = r.u32()?;
        let code = r.u8()?;
        let vehicle = TravelMode::from_code(code).ok_or_else(|| corrupted(format!("unknown vehicle code {code}")))?;
        let expected = (num_enters as u64)
            .checked_mul(num_exits as u64)
            .and_then(|n| n.checked_mul(4))
            .ok_or_else(|| corrupted(format!("{vehicle} section of {num_enters}x{num_exits} weights is too large")))?;
        if size != expected {
            return Err(corrupted(format!(
                "{vehicle} section size {size} does not hold {num_enters}x{num_exits} weights"
            )));
        }
        headers.push(SectionHeader { size, num_enters, num_exits, vehicle });
    }

    let blob = r.take(transitions_size)?;
    let mut tr = Reader::new(blob);
    let mut transitions = Vec::with_capacity(num_transitions.min(1 << 16) as usize);
    for _ in 0..num_transitions {
        transitions.push(read_transition(&mut tr, base, bits)?);
    }
    if tr.pos != blob.len() {
        return Err(corrupted(format!(
            "transitions blob has {} trailing bytes",
            blob.len() - tr.pos
        )));
    }

    let mut sections = Vec::with_capacity(headers.len());
    for h in headers {
        sections.push((h, r.take(h.size as usize)?));
    }
    Ok(Decoded { base, transitions, sections })
}

fn read_transition(r: &mut Reader<'_>, base: PointCode, bits: u8) -> CrossResult<Transition> {
    let feature = u32::try_from(r.varint()?).map_err(|_| corrupted("feature id overflow"))?;
    let segment_idx = u32::try_from(r.varint()?).map_err(|_| corrupted("segment index overflow"))?;
    let back = PointCode {
        lat: delta(base.lat, unzigzag(r.varint()?))?,
        lon: delta(base.lon, unzigzag(r.varint()?))?,
    };
    let front = PointCode {
        lat: delta(back.lat, unzigzag(r.varint()?))?,
        lon: delta(back.lon, unzigzag(r.varint()?))?,
    };

    let flag_bits = 2 * bits as usize + 1;
    let flags = r.take(flag_bits.div_ceil(8))?;
    let bit = |i: usize| (flags[i / 8] >> (i % 8)) & 1;
    let field = |start: usize| (0..bits as usize).fold(0u8, |acc, i| acc | (bit(start + i) << i));
    let road_mask = field(0) & TravelMode::ALL_MASK;
    let one_way_mask = field(bits as usize) & TravelMode::ALL_MASK;
    let forward_is_enter = bit(2 * bits as usize) == 1;

    Ok(Transition {
        feature: FeatureId(feature),
        segment_idx,
        road_mask,
        one_way_mask,
        forward_is_enter,
        back_point: back,
        front_point: front,
    })
}

fn delta(from: i32, d: i64) -> CrossResult<i32> {
    i32::try_from(from as i64 + d).map_err(|_| corrupted("coordinate delta out of range"))
}

// ── Connector ─────────────────────────────────────────────────────────────────

impl Connector {
    /// Read the connector for `mode` out of a region section.
    ///
    /// A weight section whose enter or exit count disagrees with the parsed
    /// transitions is [`CrossError::CorruptedData`](crate::CrossError).  A
    /// missing section yields a connector without weights.
    pub fn deserialize(region: RegionId, mode: TravelMode, data: &[u8]) -> CrossResult<Connector> {
        let decoded = decode(data)?;
        let mut connector = Connector::new(region, mode, &decoded.transitions);
        if let Some((h, raw)) = decoded.sections.iter().find(|(h, _)| h.vehicle == mode) {
            if h.num_enters as usize != connector.enters().len() || h.num_exits as usize != connector.exits().len() {
                return Err(corrupted(format!(
                    "{mode} section is {}x{} but transitions give {}x{}",
                    h.num_enters,
                    h.num_exits,
                    connector.enters().len(),
                    connector.exits().len()
                )));
            }
            connector.set_raw_weights(raw.to_vec());
        }
        log::debug!("region {region}: read {connector:?}");
        Ok(connector)
    }
}

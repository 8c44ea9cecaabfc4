// CRC32 (ISO-HDLC, reversed polynomial 0xEDB88320) and CRC32C
// (Castagnoli, reversed polynomial 0x82F63B78), one byte at a time.
//
// The guest CRC32* instructions do not pre- or post-invert the accumulator;
// callers that want the standard check value do that themselves.

pub const CRC32_REV_POLY: u32 = 0xEDB8_8320;
pub const CRC32C_REV_POLY: u32 = 0x82F6_3B78;

const fn build_table(poly: u32) -> [u32; 256] {
    let mut table = [0u32; 256];
    let mut i = 0u32;
    while i < 256 {
        let mut crc = i;
        let mut j = 0;
        while j < 8 {
            if crc & 1 != 0 {
                crc = (crc >> 1) ^ poly;
            } else {
                crc >>= 1;
            }
            j += 1;
        }
        table[i as usize] = crc;
        i += 1;
    }
    table
}

static CRC32_TABLE: [u32; 256] = build_table(CRC32_REV_POLY);
static CRC32C_TABLE: [u32; 256] = build_table(CRC32C_REV_POLY);

#[inline]
fn step(table: &[u32; 256], crc: u32, byte: u8) -> u32 {
    table[((crc ^ byte as u32) & 0xFF) as usize] ^ (crc >> 8)
}

fn update(table: &[u32; 256], mut crc: u32, value: u64, bytes: usize) -> u32 {
    for i in 0..bytes {
        crc = step(table, crc, (value >> (i * 8)) as u8);
    }
    crc
}

// ---------------------------------------------------------------------------
// CRC32 (ISO)
// ---------------------------------------------------------------------------

pub fn crc32b(crc: u32, value: u8) -> u32 {
    update(&CRC32_TABLE, crc, value as u64, 1)
}

pub fn crc32h(crc: u32, value: u16) -> u32 {
    update(&CRC32_TABLE, crc, value as u64, 2)
}

pub fn crc32w(crc: u32, value: u32) -> u32 {
    update(&CRC32_TABLE, crc, value as u64, 4)
}

pub fn crc32x(crc: u32, value: u64) -> u32 {
    update(&CRC32_TABLE, crc, value, 8)
}

// ---------------------------------------------------------------------------
// CRC32C (Castagnoli)
// ---------------------------------------------------------------------------

pub fn crc32cb(crc: u32, value: u8) -> u32 {
    update(&CRC32C_TABLE, crc, value as u64, 1)
}

pub fn crc32ch(crc: u32, value: u16) -> u32 {
    update(&CRC32C_TABLE, crc, value as u64, 2)
}

pub fn crc32cw(crc: u32, value: u32) -> u32 {
    update(&CRC32C_TABLE, crc, value as u64, 4)
}

pub fn crc32cx(crc: u32, value: u64) -> u32 {
    update(&CRC32C_TABLE, crc, value, 8)
}

/// Width-generic entry used by the emitted helper calls; `size` is 0..=3 for b/h/w/x.
pub fn crc32_sized(castagnoli: bool, crc: u32, value: u64, size: usize) -> u32 {
    if size > 3 {
        panic!("Invalid CRC32 operand size {}", size);
    }
    let table = if castagnoli { &CRC32C_TABLE } else { &CRC32_TABLE };
    update(table, crc, value, 1 << size)
}

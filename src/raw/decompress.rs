//! The decompression core.
//!
//! The token loop trusts the header but bounds every read against the
//! declared compressed size and every match against the declared
//! decompressed size. Anything out of range makes the core return 0, which
//! the framed layer surfaces as a corrupt-stream error; nothing is ever
//! written outside the destination.

use super::{
    fetch_at, DecoderTable, Level, Params, CWORD_LEN, MINOFFSET, UNCOMPRESSED_END,
    UNCONDITIONAL_MATCHLEN,
};

/// Number of literal tokens encoded by the low nibble of the control word,
/// so a run of up to 4 literals is consumed in one step.
const BITLUT: [i64; 16] = [4, 0, 1, 0, 2, 0, 1, 0, 3, 0, 1, 0, 2, 0, 1, 0];

/// Decode one frame.
///
/// `source` must be exactly the frame: its length is the declared
/// compressed size, with the token stream beginning at `first_token`.
/// Output is written to `destination[dst_base..dst_base + size]`, which
/// must be in range. `history` is the lowest destination position matches
/// may reach back to; with a streaming buffer that is 0 so that matches can
/// cross frame boundaries.
///
/// Returns `size`, or 0 if the stream is corrupt.
pub fn decompress_core(
    params: &Params,
    table: Option<&mut DecoderTable>,
    source: &[u8],
    first_token: usize,
    destination: &mut [u8],
    dst_base: usize,
    size: usize,
    history: i64,
) -> usize {
    let mut table = table;
    let dst_base = dst_base as i64;
    let last_source_byte = source.len() as i64 - 1;
    let last_destination_byte = dst_base + size as i64 - 1;
    let last_matchstart = last_destination_byte - UNCONDITIONAL_MATCHLEN - UNCOMPRESSED_END;

    let mut src = first_token as i64;
    let mut dst = dst_base;
    let mut cword_val: u32 = 1;
    let mut last_hashed = dst_base - 1;

    loop {
        if cword_val == 1 {
            // The previous control word is spent; the next 4 bytes are the
            // new one.
            if src + CWORD_LEN - 1 > last_source_byte {
                return 0;
            }
            cword_val = fetch_at(source, src);
            src += CWORD_LEN;
        }

        if src + 4 - 1 > last_source_byte {
            return 0;
        }

        let fetch = fetch_at(source, src);

        if cword_val & 1 == 1 {
            let matchlen: u32;
            let offset2: i64;

            match params.level {
                Level::One => {
                    cword_val >>= 1;
                    let hash = (fetch >> 4) & 0xfff;
                    offset2 = table
                        .as_deref()
                        .expect("levels 1 and 2 carry a decoder table")
                        .offset(hash, 0);

                    if fetch & 0xf != 0 {
                        matchlen = (fetch & 0xf) + 2;
                        src += 2;
                    } else {
                        matchlen = source[(src + 2) as usize] as u32;
                        src += 3;
                    }
                }
                Level::Two => {
                    cword_val >>= 1;
                    let hash = (fetch >> 5) & 0x7ff;
                    let k = (fetch & 0x3) as usize;
                    offset2 = table
                        .as_deref()
                        .expect("levels 1 and 2 carry a decoder table")
                        .offset(hash, k);

                    if fetch & 28 != 0 {
                        matchlen = ((fetch >> 2) & 0x7) + 2;
                        src += 2;
                    } else {
                        matchlen = source[(src + 2) as usize] as u32;
                        src += 3;
                    }
                }
                Level::Three => {
                    cword_val >>= 1;
                    let offset: u32;
                    if fetch & 3 == 0 {
                        offset = (fetch & 0xff) >> 2;
                        matchlen = 3;
                        src += 1;
                    } else if fetch & 2 == 0 {
                        offset = (fetch & 0xffff) >> 2;
                        matchlen = 3;
                        src += 2;
                    } else if fetch & 1 == 0 {
                        offset = (fetch & 0xffff) >> 6;
                        matchlen = ((fetch >> 2) & 15) + 3;
                        src += 2;
                    } else if fetch & 127 != 3 {
                        offset = (fetch >> 7) & 0x1ffff;
                        matchlen = ((fetch >> 2) & 0x1f) + 2;
                        src += 3;
                    } else {
                        offset = fetch >> 15;
                        matchlen = ((fetch >> 7) & 255) + 3;
                        src += 4;
                    }
                    offset2 = dst - offset as i64;
                }
            }

            if offset2 < history || offset2 > dst - MINOFFSET - 1 {
                return 0;
            }
            if matchlen as i64 > last_destination_byte - dst - UNCOMPRESSED_END + 1 {
                return 0;
            }

            copy_up(destination, dst, offset2, matchlen as i64);
            dst += matchlen as i64;

            if let Some(table) = table.as_deref_mut() {
                // The bytes just matched from were produced without being
                // hashed; enter everything up to the match start, then skip
                // the match interior the way the encoder did.
                table.update_upto(destination, &mut last_hashed, dst - matchlen as i64);
                last_hashed = dst - 1;
            }
        } else if dst < last_matchstart {
            let n = BITLUT[(cword_val & 0xf) as usize];
            let d = dst as usize;
            let s = src as usize;
            destination[d..d + 4].copy_from_slice(&source[s..s + 4]);
            cword_val >>= n as u32;
            dst += n;
            src += n;

            if let Some(table) = table.as_deref_mut() {
                table.update_upto(destination, &mut last_hashed, dst - 3);
            }
        } else {
            // Inside the unconditional literal tail every remaining token
            // is a literal, so control words are skipped, not read.
            while dst <= last_destination_byte {
                if cword_val == 1 {
                    src += CWORD_LEN;
                    cword_val = 1 << 31;
                }
                if src >= last_source_byte + 1 {
                    return 0;
                }

                destination[dst as usize] = source[src as usize];
                dst += 1;
                src += 1;
                cword_val >>= 1;
            }

            if let Some(table) = table.as_deref_mut() {
                table.update_upto(destination, &mut last_hashed, last_destination_byte - 3);
            }
            return size;
        }
    }
}

/// Forward copy within `destination`, 4 bytes at a time stepping by 3.
///
/// With a back-distance of exactly 3 each step extends the pattern by three
/// fresh bytes, which is what makes run expansion work; the up-to-3-byte
/// overshoot lands inside the validated region.
fn copy_up(destination: &mut [u8], dst: i64, src: i64, n: i64) {
    let dst = dst as usize;
    let src = src as usize;
    let mut f = 0usize;
    loop {
        for i in 0..4 {
            destination[dst + f + i] = destination[src + f + i];
        }
        f += (MINOFFSET + 1) as usize;
        if f >= n as usize {
            break;
        }
    }
}

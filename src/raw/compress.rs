//! The compression core.
//!
//! One scan loop over the source drives all three levels. Tokens are
//! classified by 32-bit control words whose high bit is a travelling end
//! marker: every flush seeds the working word with `1 << 31`, literals and
//! matches shift it right, and the marker reaching bit 0 is the signal to
//! write the word out and reserve space for the next one.

use super::{
    fetch_at, same, write_token, EncoderTable, Level, Params, CWORD_LEN, MINOFFSET,
    UNCOMPRESSED_END, UNCONDITIONAL_MATCHLEN,
};

/// Compress `size` bytes of `source` starting at `src_base` into
/// `destination` starting at `dst_base`. Returns the payload length in
/// bytes (at least 9), or 0 if the output grew past the expansion limit and
/// the caller should fall back to a raw literal frame.
///
/// The destination must extend at least 400 bytes past `dst_base + size`;
/// the encoder writes tokens before it can know the abort decision.
pub fn compress_core(
    params: &Params,
    table: &mut EncoderTable,
    source: &[u8],
    src_base: usize,
    destination: &mut [u8],
    dst_base: usize,
    size: usize,
) -> usize {
    let src_base = src_base as i64;
    let dst_base = dst_base as i64;
    let size = size as i64;
    let last_byte = size - 1;
    let last_matchstart = last_byte - UNCONDITIONAL_MATCHLEN - UNCOMPRESSED_END;

    let mut src: i64 = 0;
    let mut dst: i64 = CWORD_LEN;
    let mut cword_ptr: i64 = 0;
    let mut cword_val: u32 = 1 << 31;
    let mut fetch: u32 = 0;
    let mut lits: u32 = 0;

    if src <= last_matchstart {
        fetch = fetch_at(source, src + src_base);
    }

    while src <= last_matchstart {
        if cword_val & 1 == 1 {
            // Past the midpoint, give up as soon as the output stops
            // shrinking by at least 1/32.
            if src > size >> 1 && dst > src - (src >> 5) {
                return 0;
            }

            write_token(destination, cword_ptr + dst_base, (cword_val >> 1) | (1 << 31), 4);
            cword_ptr = dst;
            dst += CWORD_LEN;
            cword_val = 1 << 31;
        }

        match table {
            EncoderTable::Cache(cache) => {
                let mut hash = params.level.hash(fetch);
                let (cached_fetch, o) = cache.swap(hash, fetch, src + src_base);
                let cached = fetch ^ cached_fetch;

                // A usable candidate either sits far enough back, or is the
                // distance-1 case inside a run of at least 6 equal bytes
                // with 3 literals already emitted.
                if cached & 0xff_ffff == 0
                    && o != params.offset_base
                    && (src + src_base - o > MINOFFSET
                        || (src + src_base == o + 1
                            && lits >= 3
                            && src > 3
                            && same(source, (src + src_base - 3) as usize, 6)))
                {
                    if cached != 0 {
                        // Low 24 bits matched but the cached fourth byte
                        // differs: emit the fixed length-3 form.
                        hash <<= 4;
                        cword_val = (cword_val >> 1) | (1 << 31);
                        write_token(destination, dst + dst_base, (3 - 2) | hash, 2);
                        src += 3;
                        dst += 2;
                    } else {
                        // The full cached read matched, so 4 bytes are
                        // already known equal; extend greedily from there.
                        let old_src = src;
                        hash <<= 4;
                        cword_val = (cword_val >> 1) | (1 << 31);
                        src += 4;

                        if source[(o + src - old_src) as usize] == source[(src + src_base) as usize] {
                            src += 1;
                            if source[(o + src - old_src) as usize]
                                == source[(src + src_base) as usize]
                            {
                                let remaining =
                                    (last_byte - UNCOMPRESSED_END - (src - 5) + 1).min(255);
                                src += 1;
                                while source[(o + src - old_src) as usize]
                                    == source[(src + src_base) as usize]
                                    && src - old_src < remaining
                                {
                                    src += 1;
                                }
                            }
                        }

                        let matchlen = src - old_src;
                        if matchlen < 18 {
                            write_token(
                                destination,
                                dst + dst_base,
                                (matchlen as u32 - 2) | hash,
                                2,
                            );
                            dst += 2;
                        } else {
                            write_token(
                                destination,
                                dst + dst_base,
                                ((matchlen as u32) << 16) | hash,
                                3,
                            );
                            dst += 3;
                        }
                    }
                    fetch = fetch_at(source, src + src_base);
                    lits = 0;
                } else {
                    lits += 1;
                    destination[(dst + dst_base) as usize] = source[(src + src_base) as usize];
                    src += 1;
                    dst += 1;
                    cword_val >>= 1;
                    fetch = fetch_at(source, src + src_base);
                }
            }

            EncoderTable::Buckets(buckets) => {
                let remaining = (last_byte - UNCOMPRESSED_END - src + 1).min(255);

                fetch = fetch_at(source, src + src_base);
                let hash = params.level.hash(fetch);
                let counter = buckets.counter(hash);

                let mut offset2 = buckets.slot(hash, 0);
                let mut matchlen: i64;
                if offset2 + MINOFFSET < src + src_base
                    && counter > 0
                    && (fetch_at(source, offset2) ^ fetch) & 0xff_ffff == 0
                {
                    matchlen = 3;
                    if source[(offset2 + matchlen) as usize]
                        == source[(src + src_base + matchlen) as usize]
                    {
                        matchlen = 4;
                        while source[(offset2 + matchlen) as usize]
                            == source[(src + src_base + matchlen) as usize]
                            && matchlen < remaining
                        {
                            matchlen += 1;
                        }
                    }
                } else {
                    matchlen = 0;
                }

                let mut best_k: u32 = 0;
                for k in 1..params.level.pointers() {
                    if counter as usize <= k {
                        break;
                    }
                    let o = buckets.slot(hash, k);
                    // Level 2 pre-screens candidates on the byte just past
                    // the current best match; level 3 compares every one.
                    let candidate = match params.level {
                        Level::Three => {
                            (fetch_at(source, o) ^ fetch) & 0xff_ffff == 0
                                && o < src + src_base - MINOFFSET
                        }
                        _ => {
                            source[(src + src_base + matchlen) as usize]
                                == source[(o + matchlen) as usize]
                                && (fetch_at(source, o) ^ fetch) & 0xff_ffff == 0
                                && o < src + src_base - MINOFFSET
                        }
                    };
                    if candidate {
                        let mut m: i64 = 3;
                        while source[(o + m) as usize] == source[(src + src_base + m) as usize]
                            && m < remaining
                        {
                            m += 1;
                        }
                        // Level 3 breaks length ties toward the closer
                        // offset so it can use the narrower encodings.
                        let better = match params.level {
                            Level::Three => m > matchlen || (m == matchlen && o > offset2),
                            _ => m > matchlen,
                        };
                        if better {
                            offset2 = o;
                            matchlen = m;
                            best_k = k as u32;
                        }
                    }
                }

                let o = offset2;
                buckets.insert(hash, src + src_base);

                match params.level {
                    Level::Three => {
                        if matchlen > 2 && src + src_base - o < 131071 {
                            let offset = (src + src_base - o) as u32;

                            // Positions covered by the match will never be
                            // scanned, so enter them into the table now.
                            for u in 1..matchlen {
                                let hash = params.level.hash_at(source, src + src_base + u);
                                buckets.insert(hash, src + src_base + u);
                            }

                            cword_val = (cword_val >> 1) | (1 << 31);
                            src += matchlen;

                            if matchlen == 3 && offset <= 63 {
                                destination[(dst + dst_base) as usize] = (offset << 2) as u8;
                                dst += 1;
                            } else if matchlen == 3 && offset <= 16383 {
                                write_token(destination, dst + dst_base, (offset << 2) | 1, 2);
                                dst += 2;
                            } else if matchlen <= 18 && offset <= 1023 {
                                write_token(
                                    destination,
                                    dst + dst_base,
                                    ((matchlen as u32 - 3) << 2) | (offset << 6) | 2,
                                    2,
                                );
                                dst += 2;
                            } else if matchlen <= 33 {
                                write_token(
                                    destination,
                                    dst + dst_base,
                                    ((matchlen as u32 - 2) << 2) | (offset << 7) | 3,
                                    3,
                                );
                                dst += 3;
                            } else {
                                write_token(
                                    destination,
                                    dst + dst_base,
                                    ((matchlen as u32 - 3) << 7) | (offset << 15) | 3,
                                    4,
                                );
                                dst += 4;
                            }
                        } else {
                            destination[(dst + dst_base) as usize] =
                                source[(src + src_base) as usize];
                            src += 1;
                            dst += 1;
                            cword_val >>= 1;
                        }
                    }
                    _ => {
                        if matchlen > 2 {
                            cword_val = (cword_val >> 1) | (1 << 31);
                            src += matchlen;

                            if matchlen < 10 {
                                write_token(
                                    destination,
                                    dst + dst_base,
                                    best_k | ((matchlen as u32 - 2) << 2) | (hash << 5),
                                    2,
                                );
                                dst += 2;
                            } else {
                                write_token(
                                    destination,
                                    dst + dst_base,
                                    best_k | ((matchlen as u32) << 16) | (hash << 5),
                                    3,
                                );
                                dst += 3;
                            }
                        } else {
                            destination[(dst + dst_base) as usize] =
                                source[(src + src_base) as usize];
                            src += 1;
                            dst += 1;
                            cword_val >>= 1;
                        }
                    }
                }
            }
        }
    }

    // Unconditional literal tail. Levels 1 and 2 keep feeding the
    // dictionary where a whole fetch still fits, so the decoder's mirror
    // update stays in sync across frame boundaries.
    while src <= last_byte {
        if cword_val & 1 == 1 {
            write_token(destination, cword_ptr + dst_base, (cword_val >> 1) | (1 << 31), 4);
            cword_ptr = dst;
            dst += CWORD_LEN;
            cword_val = 1 << 31;
        }

        if src <= last_byte - 3 {
            match table {
                EncoderTable::Cache(cache) => {
                    let tail_fetch = fetch_at(source, src + src_base);
                    let hash = params.level.hash(tail_fetch);
                    cache.store(hash, tail_fetch, src + src_base);
                }
                EncoderTable::Buckets(buckets) => {
                    if params.level == Level::Two {
                        let hash = params.level.hash_at(source, src + src_base);
                        buckets.insert(hash, src + src_base);
                    }
                }
            }
        }

        destination[(dst + dst_base) as usize] = source[(src + src_base) as usize];
        src += 1;
        dst += 1;
        cword_val >>= 1;
    }

    // Walk the end marker down to bit 0 and flush the final control word.
    while cword_val & 1 != 1 {
        cword_val >>= 1;
    }
    write_token(destination, cword_ptr + dst_base, (cword_val >> 1) | (1 << 31), 4);

    dst.max(9) as usize
}

//! Hex dump rendering for memory contents

use std::fmt::Write;

const BYTES_PER_ROW: usize = 16;

/// Render bytes as a canonical hex dump
///
/// Each row shows the offset, sixteen hex bytes and their printable ASCII.
/// Consecutive identical rows are collapsed into a single `*` line. The
/// final line holds the total length.
pub fn hexdump(bytes: &[u8]) -> String {
    let mut out = String::new();
    let mut prev: Option<&[u8]> = None;
    let mut skipping = false;

    for (row, chunk) in bytes.chunks(BYTES_PER_ROW).enumerate() {
        if prev == Some(chunk) && chunk.len() == BYTES_PER_ROW {
            if !skipping {
                out.push_str("*\n");
                skipping = true;
            }
            continue;
        }
        skipping = false;
        prev = Some(chunk);
        write_row(&mut out, row * BYTES_PER_ROW, chunk);
    }

    let _ = writeln!(out, "{:08x}", bytes.len());
    out
}

fn write_row(out: &mut String, offset: usize, chunk: &[u8]) {
    let _ = write!(out, "{:08x} ", offset);
    for i in 0..BYTES_PER_ROW {
        if i == BYTES_PER_ROW / 2 {
            out.push(' ');
        }
        match chunk.get(i) {
            Some(b) => {
                let _ = write!(out, " {:02x}", b);
            }
            None => out.push_str("   "),
        }
    }

    out.push_str("  |");
    out.extend(chunk.iter().map(|&b| {
        if b.is_ascii_graphic() || b == b' ' {
            b as char
        } else {
            '.'
        }
    }));
    out.push_str("|\n");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_row() {
        let dump = hexdump(b"AVR\x00\x01\xff");
        assert_eq!(
            dump,
            "00000000  41 56 52 00 01 ff                                 |AVR...|\n00000006\n"
        );
    }

    #[test]
    fn test_full_row_spacing() {
        let bytes: Vec<u8> = (0x30..0x40).collect();
        let dump = hexdump(&bytes);
        assert_eq!(
            dump,
            "00000000  30 31 32 33 34 35 36 37  38 39 3a 3b 3c 3d 3e 3f  |0123456789:;<=>?|\n00000010\n"
        );
    }

    #[test]
    fn test_repeated_rows_collapse() {
        let mut bytes = vec![0xFF; 64];
        bytes[50] = 0x0c;
        let dump = hexdump(&bytes);
        let lines: Vec<&str> = dump.lines().collect();

        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("00000000  ff ff"));
        assert_eq!(lines[1], "*");
        assert!(lines[2].starts_with("00000030  ff ff 0c ff"));
        assert_eq!(lines[3], "00000040");
    }

    #[test]
    fn test_empty() {
        assert_eq!(hexdump(&[]), "00000000\n");
    }
}

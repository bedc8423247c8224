/// Extension reported when no signature or heuristic matches.
pub const UNKNOWN_EXTENSION: &str = "unknown";

/// Number of leading bytes inspected by the printable-text heuristic.
const TEXT_SAMPLE: usize = 4096;

/// Magic byte signatures as `(offset, magic, extension)`.
const SIGNATURES: &[(usize, &[u8], &str)] = &[
    (0, b"\x89PNG\r\n\x1a\n", "png"),
    (0, b"\xd0\xcf\x11\xe0\xa1\xb1\x1a\xe1", "ole"),
    (0, b"7z\xbc\xaf\x27\x1c", "7z"),
    (0, b"\xfd7zXZ\x00", "xz"),
    (0, b"Rar!\x1a\x07", "rar"),
    (0, b"GIF87a", "gif"),
    (0, b"GIF89a", "gif"),
    (0, b"%PDF-", "pdf"),
    (0, b"{\\rtf", "rtf"),
    (0, b"<?xml", "xml"),
    (0, b"\x7fELF", "elf"),
    (0, b"PK\x03\x04", "zip"),
    (0, b"MSCF", "cab"),
    (0, b"\xca\xfe\xba\xbe", "class"),
    (0, b"dex\n", "dex"),
    (0, b"\x00asm", "wasm"),
    (0, b"\xff\xd8\xff", "jpg"),
    (0, b"BZh", "bz2"),
    (0, b"\x1f\x8b", "gz"),
    (0, b"MZ", "exe"),
    (257, b"ustar", "tar"),
];

///
/// Guesses a file extension for `data`.
///
/// Signatures are checked first. Data that does not match any signature but
/// consists of printable ASCII is reported as `txt`. Everything else yields
/// [`UNKNOWN_EXTENSION`].
///
/// ## Arguments
///
/// * `data`: The payload to inspect.
/// * `size`: The payload size, as computed by the oracle. Clamped to `data.len()`.
///
pub fn guess_extension(data: &[u8], size: usize) -> &'static str {
    let size = size.min(data.len());
    if size == 0 {
        return UNKNOWN_EXTENSION;
    }

    for &(offset, magic, ext) in SIGNATURES {
        if size >= offset + magic.len() && &data[offset..offset + magic.len()] == magic {
            return ext;
        }
    }

    let sample = &data[..size.min(TEXT_SAMPLE)];
    if sample
        .iter()
        .all(|&b| b.is_ascii_graphic() || b.is_ascii_whitespace())
    {
        return "txt";
    }

    UNKNOWN_EXTENSION
}

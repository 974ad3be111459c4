// ============================================================
// Layer 4 — NumPy Label Array Reader
// ============================================================
// Per-session labels ship as `.npy` files: one value per frame.
//
// File layout (NumPy format 1.0 / 2.0 / 3.0):
//
//   \x93NUMPY  major  minor  header_len  header  data
//   6 bytes    u8     u8     u16 (v1)    ASCII   raw little-endian
//                            u32 (v2+)   dict
//
// The header is a Python dict literal, e.g.
//   {'descr': '<i8', 'fortran_order': False, 'shape': (1234,), }
//
// Only 1-D data (or shapes with a single non-unit dimension) is
// accepted. Integer, unsigned, bool and float dtypes are read;
// float values must be integral since they are class labels.

use std::{fs, path::Path};

use once_cell::sync::Lazy;
use regex::Regex;

use crate::domain::errors::DatasetError;

const MAGIC: &[u8; 6] = b"\x93NUMPY";

static DESCR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"'descr'\s*:\s*'([^']+)'").expect("static regex"));
static FORTRAN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"'fortran_order'\s*:\s*(True|False)").expect("static regex"));
static SHAPE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"'shape'\s*:\s*\(([^)]*)\)").expect("static regex"));

/// Read a label array from disk.
pub fn read_labels(path: &Path) -> Result<Vec<i64>, DatasetError> {
    let bytes = fs::read(path).map_err(|e| DatasetError::io(path, e))?;
    parse_labels(&bytes).map_err(|reason| DatasetError::Npy {
        path: path.to_path_buf(),
        reason,
    })
}

/// Decode the bytes of an `.npy` file into integer labels.
pub fn parse_labels(bytes: &[u8]) -> Result<Vec<i64>, String> {
    if bytes.len() < 10 || &bytes[..6] != MAGIC {
        return Err("missing \\x93NUMPY magic".to_string());
    }

    let (header_len, header_start) = match bytes[6] {
        1 => (u16::from_le_bytes([bytes[8], bytes[9]]) as usize, 10),
        2 | 3 => {
            if bytes.len() < 12 {
                return Err("truncated header length".to_string());
            }
            let len = u32::from_le_bytes([bytes[8], bytes[9], bytes[10], bytes[11]]);
            (len as usize, 12)
        }
        v => return Err(format!("unsupported format version {v}")),
    };

    let header_end = header_start + header_len;
    if bytes.len() < header_end {
        return Err("truncated header".to_string());
    }
    let header = std::str::from_utf8(&bytes[header_start..header_end])
        .map_err(|_| "header is not valid UTF-8".to_string())?;
    let header = Header::parse(header)?;

    header.dtype.decode(&bytes[header_end..], header.len)
}

// ─── Header ───────────────────────────────────────────────────────────────────
struct Header {
    dtype: Dtype,
    len:   usize,
}

impl Header {
    fn parse(text: &str) -> Result<Self, String> {
        let descr = DESCR_RE
            .captures(text)
            .map(|c| c[1].to_string())
            .ok_or_else(|| "header has no 'descr'".to_string())?;
        if FORTRAN_RE.captures(text).is_none() {
            return Err("header has no 'fortran_order'".to_string());
        }
        let shape = SHAPE_RE
            .captures(text)
            .map(|c| c[1].to_string())
            .ok_or_else(|| "header has no 'shape'".to_string())?;

        let dims: Vec<usize> = shape
            .split(',')
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .map(|d| d.parse::<usize>().map_err(|_| format!("bad shape dimension '{d}'")))
            .collect::<Result<_, _>>()?;

        if dims.is_empty() {
            return Err("scalar arrays are not label arrays".to_string());
        }
        if dims.iter().filter(|&&d| d != 1).count() > 1 {
            return Err(format!("expected a 1-D array, got shape {dims:?}"));
        }

        let len = dims
            .iter()
            .try_fold(1usize, |acc, &d| acc.checked_mul(d))
            .ok_or_else(|| format!("shape {dims:?} overflows"))?;

        Ok(Self { dtype: Dtype::parse(&descr)?, len })
    }
}

// ─── Dtype ────────────────────────────────────────────────────────────────────
#[derive(Debug, Clone, Copy, PartialEq)]
enum Kind {
    Bool,
    Int,
    Uint,
    Float,
}

#[derive(Debug, Clone, Copy)]
struct Dtype {
    kind: Kind,
    size: usize,
}

impl Dtype {
    fn parse(descr: &str) -> Result<Self, String> {
        let mut chars = descr.chars();
        let order = chars.next().ok_or("empty descr")?;
        let kind  = match chars.next() {
            Some('b') => Kind::Bool,
            Some('i') => Kind::Int,
            Some('u') => Kind::Uint,
            Some('f') => Kind::Float,
            _ => return Err(format!("unsupported dtype '{descr}'")),
        };
        let size: usize = chars
            .as_str()
            .parse()
            .map_err(|_| format!("unsupported dtype '{descr}'"))?;

        let supported = match kind {
            Kind::Bool                => size == 1,
            Kind::Int | Kind::Uint    => matches!(size, 1 | 2 | 4 | 8),
            Kind::Float               => matches!(size, 4 | 8),
        };
        if !supported {
            return Err(format!("unsupported dtype '{descr}'"));
        }
        // Multi-byte values must be little-endian (or native on a LE host)
        if size > 1 && !matches!(order, '<' | '=') {
            return Err(format!("unsupported byte order in '{descr}'"));
        }

        Ok(Self { kind, size })
    }

    fn decode(self, data: &[u8], len: usize) -> Result<Vec<i64>, String> {
        let needed = len
            .checked_mul(self.size)
            .ok_or_else(|| format!("{len} values of {} bytes overflow", self.size))?;
        if data.len() < needed {
            return Err(format!(
                "data section holds {} bytes, shape needs {needed}",
                data.len()
            ));
        }

        data[..needed]
            .chunks_exact(self.size)
            .map(|chunk| self.decode_one(chunk))
            .collect()
    }

    fn decode_one(self, b: &[u8]) -> Result<i64, String> {
        let value = match (self.kind, self.size) {
            (Kind::Bool, _)  => i64::from(b[0] != 0),
            (Kind::Int, 1)   => i64::from(b[0] as i8),
            (Kind::Int, 2)   => i64::from(i16::from_le_bytes([b[0], b[1]])),
            (Kind::Int, 4)   => i64::from(i32::from_le_bytes([b[0], b[1], b[2], b[3]])),
            (Kind::Int, _)   => i64::from_le_bytes(to_array8(b)),
            (Kind::Uint, 1)  => i64::from(b[0]),
            (Kind::Uint, 2)  => i64::from(u16::from_le_bytes([b[0], b[1]])),
            (Kind::Uint, 4)  => i64::from(u32::from_le_bytes([b[0], b[1], b[2], b[3]])),
            (Kind::Uint, _)  => {
                let v = u64::from_le_bytes(to_array8(b));
                i64::try_from(v).map_err(|_| format!("label {v} does not fit in i64"))?
            }
            (Kind::Float, 4) => float_label(f64::from(f32::from_le_bytes([b[0], b[1], b[2], b[3]])))?,
            (Kind::Float, _) => float_label(f64::from_le_bytes(to_array8(b)))?,
        };
        Ok(value)
    }
}

fn to_array8(b: &[u8]) -> [u8; 8] {
    let mut out = [0u8; 8];
    out.copy_from_slice(&b[..8]);
    out
}

fn float_label(v: f64) -> Result<i64, String> {
    if !v.is_finite() || v.fract() != 0.0 {
        return Err(format!("non-integral label value {v}"));
    }
    Ok(v as i64)
}

// ─── Test Support ─────────────────────────────────────────────────────────────
/// Encode labels as a format 1.0 `<i8` `.npy` file.
#[cfg(test)]
pub(crate) fn encode_i64(values: &[i64]) -> Vec<u8> {
    let mut dict = format!(
        "{{'descr': '<i8', 'fortran_order': False, 'shape': ({},), }}",
        values.len()
    );
    // Header (magic + version + len + dict + '\n') is padded to 64 bytes
    while (10 + dict.len() + 1) % 64 != 0 {
        dict.push(' ');
    }
    dict.push('\n');

    let mut out = Vec::with_capacity(10 + dict.len() + values.len() * 8);
    out.extend_from_slice(MAGIC);
    out.extend_from_slice(&[1, 0]);
    out.extend_from_slice(&(dict.len() as u16).to_le_bytes());
    out.extend_from_slice(dict.as_bytes());
    for v in values {
        out.extend_from_slice(&v.to_le_bytes());
    }
    out
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    fn with_header(descr: &str, shape: &str, data: &[u8]) -> Vec<u8> {
        let dict = format!("{{'descr': '{descr}', 'fortran_order': False, 'shape': {shape}, }}\n");
        let mut out = Vec::new();
        out.extend_from_slice(MAGIC);
        out.extend_from_slice(&[1, 0]);
        out.extend_from_slice(&(dict.len() as u16).to_le_bytes());
        out.extend_from_slice(dict.as_bytes());
        out.extend_from_slice(data);
        out
    }

    #[test]
    fn test_reads_i64_array() {
        let bytes = encode_i64(&[0, 3, 23, 1]);
        assert_eq!(parse_labels(&bytes).unwrap(), vec![0, 3, 23, 1]);
    }

    #[test]
    fn test_reads_uint8_and_float64() {
        let bytes = with_header("|u1", "(3,)", &[2, 0, 12]);
        assert_eq!(parse_labels(&bytes).unwrap(), vec![2, 0, 12]);

        let data: Vec<u8> = [1.0f64, 7.0].iter().flat_map(|v| v.to_le_bytes()).collect();
        let bytes = with_header("<f8", "(2,)", &data);
        assert_eq!(parse_labels(&bytes).unwrap(), vec![1, 7]);
    }

    #[test]
    fn test_column_vector_is_accepted() {
        let data: Vec<u8> = [5i32, 6].iter().flat_map(|v| v.to_le_bytes()).collect();
        let bytes = with_header("<i4", "(2, 1)", &data);
        assert_eq!(parse_labels(&bytes).unwrap(), vec![5, 6]);
    }

    #[test]
    fn test_rejects_non_integral_float() {
        let data: Vec<u8> = 1.5f32.to_le_bytes().to_vec();
        let bytes = with_header("<f4", "(1,)", &data);
        assert!(parse_labels(&bytes).is_err());
    }

    #[test]
    fn test_rejects_matrix_and_big_endian() {
        let bytes = with_header("<i8", "(2, 2)", &[0u8; 32]);
        assert!(parse_labels(&bytes).is_err());

        let bytes = with_header(">i8", "(1,)", &[0u8; 8]);
        assert!(parse_labels(&bytes).is_err());
    }

    #[test]
    fn test_rejects_truncated_data() {
        let mut bytes = encode_i64(&[1, 2, 3]);
        bytes.truncate(bytes.len() - 4);
        assert!(parse_labels(&bytes).is_err());
    }

    #[test]
    fn test_rejects_oversized_shape() {
        let bytes = with_header("<i8", "(4611686018427387904,)", &[0u8; 8]);
        assert!(parse_labels(&bytes).unwrap_err().contains("overflow"));

        let bytes = with_header("<i4", "(1, 4611686018427387904)", &[0u8; 4]);
        assert!(parse_labels(&bytes).unwrap_err().contains("overflow"));
    }

    #[test]
    fn test_rejects_missing_magic() {
        assert!(parse_labels(b"not an npy file at all").is_err());
    }
}

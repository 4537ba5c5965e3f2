//! NumPy `.npy` array files.
//!
//! Layout: the magic `\x93NUMPY`, a major/minor version byte pair, a
//! little-endian header length (u16 for v1, u32 for v2 and v3), then an
//! ASCII Python dict literal such as
//! `{'descr': '<f8', 'fortran_order': False, 'shape': (1000,), }`
//! padded with spaces and a newline, then the raw array data.
//!
//! Only little-endian numeric arrays in C order are read. N-D arrays are
//! flattened in C order and their shape is kept alongside the data.

use std::io::Write;
use std::path::Path;

use crate::{Error, Result};

const MAGIC: &[u8; 6] = b"\x93NUMPY";

/// Header plus data is padded to a multiple of this.
const ALIGN: usize = 64;

/// Element types accepted by [`read_npy`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NpyDtype {
    /// `<f4`
    F32,
    /// `<f8`
    F64,
    /// `<i2`
    I16,
    /// `<i4`
    I32,
    /// `<i8`
    I64,
}

impl NpyDtype {
    fn parse(descr: &str) -> Result<Self> {
        match descr {
            "<f4" => Ok(Self::F32),
            "<f8" => Ok(Self::F64),
            "<i2" => Ok(Self::I16),
            "<i4" => Ok(Self::I32),
            "<i8" => Ok(Self::I64),
            other if other.starts_with('>') => Err(Error::UnsupportedFormat(format!(
                "big-endian dtype {other}"
            ))),
            other => Err(Error::UnsupportedFormat(format!("dtype {other}"))),
        }
    }

    /// Bytes per element.
    pub fn size(self) -> usize {
        match self {
            Self::I16 => 2,
            Self::F32 | Self::I32 => 4,
            Self::F64 | Self::I64 => 8,
        }
    }

    fn decode(self, bytes: &[u8]) -> f64 {
        // Callers hand in exactly `size()` bytes
        let mut buf = [0u8; 8];
        buf[..bytes.len()].copy_from_slice(bytes);
        match self {
            Self::F32 => f64::from(f32::from_le_bytes([buf[0], buf[1], buf[2], buf[3]])),
            Self::F64 => f64::from_le_bytes(buf),
            Self::I16 => f64::from(i16::from_le_bytes([buf[0], buf[1]])),
            Self::I32 => f64::from(i32::from_le_bytes([buf[0], buf[1], buf[2], buf[3]])),
            Self::I64 => i64::from_le_bytes(buf) as f64,
        }
    }
}

/// An array loaded from a `.npy` file, widened to `f64`.
#[derive(Debug, Clone, PartialEq)]
pub struct NpyArray {
    /// Elements in C order.
    pub data: Vec<f64>,
    /// Array shape; empty for a 0-d scalar.
    pub shape: Vec<usize>,
    /// Element type on disk.
    pub dtype: NpyDtype,
}

impl NpyArray {
    /// Total element count.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// True if the array has no elements.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Read a `.npy` file.
pub fn read_npy<P: AsRef<Path>>(path: P) -> Result<NpyArray> {
    let bytes = std::fs::read(path.as_ref())?;
    let array = parse_npy(&bytes)?;
    tracing::debug!(
        path = %path.as_ref().display(),
        shape = ?array.shape,
        dtype = ?array.dtype,
        "read NPY array"
    );
    Ok(array)
}

/// Parse the contents of a `.npy` file.
pub fn parse_npy(bytes: &[u8]) -> Result<NpyArray> {
    if bytes.len() < 10 || &bytes[..6] != MAGIC {
        return Err(Error::Npy("missing \\x93NUMPY magic".into()));
    }

    let major = bytes[6];
    let (header_len, header_start) = match major {
        1 => (usize::from(u16::from_le_bytes([bytes[8], bytes[9]])), 10),
        2 | 3 => {
            if bytes.len() < 12 {
                return Err(Error::Npy("truncated header length".into()));
            }
            let len = u32::from_le_bytes([bytes[8], bytes[9], bytes[10], bytes[11]]);
            (len as usize, 12)
        }
        other => return Err(Error::UnsupportedFormat(format!("NPY version {other}"))),
    };

    let data_start = header_start + header_len;
    let header = bytes
        .get(header_start..data_start)
        .ok_or_else(|| Error::Npy("header runs past end of file".into()))?;
    let header = std::str::from_utf8(header)
        .map_err(|e| Error::Npy(format!("header is not text: {e}")))?;

    let dtype = NpyDtype::parse(&dict_value(header, "descr")?.replace(['\'', '"'], ""))?;
    match dict_value(header, "fortran_order")?.as_str() {
        "False" => {}
        "True" => {
            return Err(Error::UnsupportedFormat("Fortran-order array".into()));
        }
        other => return Err(Error::Npy(format!("fortran_order = {other}"))),
    }
    let shape = parse_shape(&dict_value(header, "shape")?)?;

    let needed = shape
        .iter()
        .try_fold(dtype.size(), |bytes, &dim| bytes.checked_mul(dim))
        .ok_or_else(|| Error::Npy(format!("shape {shape:?} overflows")))?;
    let payload = &bytes[data_start..];
    if payload.len() < needed {
        return Err(Error::Npy(format!(
            "expected {needed} data bytes, found {}",
            payload.len()
        )));
    }

    let data = payload[..needed]
        .chunks_exact(dtype.size())
        .map(|chunk| dtype.decode(chunk))
        .collect();

    Ok(NpyArray { data, shape, dtype })
}

/// Raw text of `key`'s value in the header dict.
fn dict_value(header: &str, key: &str) -> Result<String> {
    let missing = || Error::Npy(format!("header has no '{key}' entry"));
    let pattern = format!("'{key}'");
    let after_key = header.find(&pattern).ok_or_else(missing)? + pattern.len();
    let rest = header[after_key..].trim_start();
    let rest = rest.strip_prefix(':').ok_or_else(missing)?.trim_start();

    let end = if rest.starts_with('(') {
        rest.find(')').map(|i| i + 1)
    } else {
        rest.find([',', '}'])
    }
    .ok_or_else(|| Error::Npy(format!("unterminated '{key}' value")))?;

    Ok(rest[..end].trim().to_string())
}

fn parse_shape(text: &str) -> Result<Vec<usize>> {
    let inner = text
        .strip_prefix('(')
        .and_then(|t| t.strip_suffix(')'))
        .ok_or_else(|| Error::Npy(format!("shape is not a tuple: {text}")))?;

    inner
        .split(',')
        .map(str::trim)
        .filter(|dim| !dim.is_empty())
        .map(|dim| {
            dim.trim_end_matches('L')
                .parse::<usize>()
                .map_err(|e| Error::Npy(format!("bad dimension {dim}: {e}")))
        })
        .collect()
}

/// Write a 1-D `<f8` array in NPY v1.0 format.
pub fn write_npy<P: AsRef<Path>>(path: P, data: &[f64]) -> Result<()> {
    let mut header = format!(
        "{{'descr': '<f8', 'fortran_order': False, 'shape': ({},), }}",
        data.len()
    );
    // Magic, version and length take 10 bytes; the header ends in '\n'
    let unpadded = 10 + header.len() + 1;
    let padding = (ALIGN - unpadded % ALIGN) % ALIGN;
    header.push_str(&" ".repeat(padding));
    header.push('\n');

    let header_len = u16::try_from(header.len())
        .map_err(|_| Error::Npy("header longer than 65535 bytes".into()))?;

    let mut file = std::io::BufWriter::new(std::fs::File::create(path.as_ref())?);
    file.write_all(MAGIC)?;
    file.write_all(&[1, 0])?;
    file.write_all(&header_len.to_le_bytes())?;
    file.write_all(header.as_bytes())?;
    for &value in data {
        file.write_all(&value.to_le_bytes())?;
    }
    file.flush()?;

    tracing::debug!(path = %path.as_ref().display(), len = data.len(), "wrote NPY array");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    fn npy_bytes(major: u8, header: &str, payload: &[u8]) -> Vec<u8> {
        let mut bytes = MAGIC.to_vec();
        bytes.extend_from_slice(&[major, 0]);
        if major == 1 {
            bytes.extend_from_slice(&(header.len() as u16).to_le_bytes());
        } else {
            bytes.extend_from_slice(&(header.len() as u32).to_le_bytes());
        }
        bytes.extend_from_slice(header.as_bytes());
        bytes.extend_from_slice(payload);
        bytes
    }

    #[test]
    fn test_write_then_read() {
        let data = vec![0.5, -1.25, 3.0, 1e-9];
        let file = NamedTempFile::new().unwrap();
        write_npy(file.path(), &data).unwrap();

        let bytes = std::fs::read(file.path()).unwrap();
        let header_len = u16::from_le_bytes([bytes[8], bytes[9]]) as usize;
        assert_eq!((10 + header_len) % ALIGN, 0);
        assert_eq!(bytes[10 + header_len - 1], b'\n');

        let array = read_npy(file.path()).unwrap();
        assert_eq!(array.data, data);
        assert_eq!(array.shape, vec![4]);
        assert_eq!(array.dtype, NpyDtype::F64);
    }

    #[test]
    fn test_reads_f32_v2() {
        let payload: Vec<u8> = [1.5f32, -2.0].iter().flat_map(|v| v.to_le_bytes()).collect();
        let bytes = npy_bytes(
            2,
            "{'descr': '<f4', 'fortran_order': False, 'shape': (2,), }\n",
            &payload,
        );
        let array = parse_npy(&bytes).unwrap();
        assert_eq!(array.data, vec![1.5, -2.0]);
    }

    #[test]
    fn test_reads_int16_matrix_in_c_order() {
        let payload: Vec<u8> = [1i16, 2, 3, 4, 5, 6]
            .iter()
            .flat_map(|v| v.to_le_bytes())
            .collect();
        let bytes = npy_bytes(
            1,
            "{'descr': '<i2', 'fortran_order': False, 'shape': (2, 3), }\n",
            &payload,
        );
        let array = parse_npy(&bytes).unwrap();
        assert_eq!(array.shape, vec![2, 3]);
        assert_eq!(array.data, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
    }

    #[test]
    fn test_rejects_fortran_order() {
        let bytes = npy_bytes(
            1,
            "{'descr': '<f8', 'fortran_order': True, 'shape': (1,), }\n",
            &1.0f64.to_le_bytes(),
        );
        assert!(matches!(
            parse_npy(&bytes),
            Err(Error::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_rejects_big_endian() {
        let bytes = npy_bytes(
            1,
            "{'descr': '>f8', 'fortran_order': False, 'shape': (1,), }\n",
            &1.0f64.to_be_bytes(),
        );
        assert!(matches!(
            parse_npy(&bytes),
            Err(Error::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_rejects_truncated_data() {
        let bytes = npy_bytes(
            1,
            "{'descr': '<f8', 'fortran_order': False, 'shape': (3,), }\n",
            &1.0f64.to_le_bytes(),
        );
        assert!(matches!(parse_npy(&bytes), Err(Error::Npy(_))));
    }

    #[test]
    fn test_rejects_overflowing_shape() {
        // 2^32 · 2^32 · 16 elements cannot be addressed
        let bytes = npy_bytes(
            1,
            "{'descr': '<f8', 'fortran_order': False, 'shape': (4294967296, 4294967296, 16), }\n",
            &1.0f64.to_le_bytes(),
        );
        match parse_npy(&bytes) {
            Err(Error::Npy(msg)) => assert!(msg.contains("overflows"), "{msg}"),
            other => panic!("expected an overflow error, got {other:?}"),
        }
    }

    #[test]
    fn test_rejects_missing_magic() {
        assert!(matches!(
            parse_npy(b"not an npy file"),
            Err(Error::Npy(_))
        ));
    }

    #[test]
    fn test_scalar_shape() {
        let bytes = npy_bytes(
            1,
            "{'descr': '<i8', 'fortran_order': False, 'shape': (), }\n",
            &42i64.to_le_bytes(),
        );
        let array = parse_npy(&bytes).unwrap();
        assert!(array.shape.is_empty());
        assert_eq!(array.data, vec![42.0]);
    }
}

/*******************************************************************************
 *     ___                  _   ____  ____
 *    / _ \ _   _  ___  ___| |_|  _ \| __ )
 *   | | | | | | |/ _ \/ __| __| | | |  _ \
 *   | |_| | |_| |  __/\__ \ |_| |_| | |_) |
 *    \__\_\\__,_|\___||___/\__|____/|____/
 *
 *  Copyright (c) 2014-2019 Appsicle
 *  Copyright (c) 2019-2026 QuestDB
 *
 *  Licensed under the Apache License, Version 2.0 (the "License");
 *  you may not use this file except in compliance with the License.
 *  You may obtain a copy of the License at
 *
 *  http://www.apache.org/licenses/LICENSE-2.0
 *
 *  Unless required by applicable law or agreed to in writing, software
 *  distributed under the License is distributed on an "AS IS" BASIS,
 *  WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 *  See the License for the specific language governing permissions and
 *  limitations under the License.
 *
 ******************************************************************************/

use parquet_format_safe::CompressionCodec;

use crate::parquet::error::{fmt_err, ParquetError, ParquetResult};

/// Page compression codec.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Compression {
    #[default]
    Uncompressed,
    Snappy,
    Gzip,
    Lzo,
    Brotli,
    Lz4,
    Zstd,
    Lz4Raw,
}

impl Compression {
    pub fn is_supported(self) -> bool {
        match self {
            Compression::Uncompressed => true,
            Compression::Snappy => cfg!(feature = "snappy"),
            Compression::Gzip => cfg!(feature = "gzip"),
            Compression::Zstd => cfg!(feature = "zstd"),
            Compression::Lz4Raw => cfg!(feature = "lz4"),
            Compression::Lzo | Compression::Brotli | Compression::Lz4 => false,
        }
    }
}

impl TryFrom<CompressionCodec> for Compression {
    type Error = ParquetError;

    fn try_from(codec: CompressionCodec) -> ParquetResult<Self> {
        Ok(match codec {
            CompressionCodec::UNCOMPRESSED => Compression::Uncompressed,
            CompressionCodec::SNAPPY => Compression::Snappy,
            CompressionCodec::GZIP => Compression::Gzip,
            CompressionCodec::LZO => Compression::Lzo,
            CompressionCodec::BROTLI => Compression::Brotli,
            CompressionCodec::LZ4 => Compression::Lz4,
            CompressionCodec::ZSTD => Compression::Zstd,
            CompressionCodec::LZ4_RAW => Compression::Lz4Raw,
            other => return Err(fmt_err!(Unsupported, "unknown compression codec id {}", other.0)),
        })
    }
}

impl From<Compression> for CompressionCodec {
    fn from(codec: Compression) -> Self {
        match codec {
            Compression::Uncompressed => CompressionCodec::UNCOMPRESSED,
            Compression::Snappy => CompressionCodec::SNAPPY,
            Compression::Gzip => CompressionCodec::GZIP,
            Compression::Lzo => CompressionCodec::LZO,
            Compression::Brotli => CompressionCodec::BROTLI,
            Compression::Lz4 => CompressionCodec::LZ4,
            Compression::Zstd => CompressionCodec::ZSTD,
            Compression::Lz4Raw => CompressionCodec::LZ4_RAW,
        }
    }
}

fn unsupported(codec: Compression) -> ParquetError {
    fmt_err!(Unsupported, "compression codec {:?} is not available in this build", codec)
}

/// Compresses `input` with `codec`, appending to `output`.
pub fn compress(codec: Compression, input: &[u8], output: &mut Vec<u8>) -> ParquetResult<()> {
    match codec {
        Compression::Uncompressed => {
            output.extend_from_slice(input);
            Ok(())
        }
        #[cfg(feature = "snappy")]
        Compression::Snappy => {
            let start = output.len();
            output.resize(start + snap::raw::max_compress_len(input.len()), 0);
            let written = snap::raw::Encoder::new()
                .compress(input, &mut output[start..])
                .map_err(|e| fmt_err!(Corruption, "snappy compression failed: {e}"))?;
            output.truncate(start + written);
            Ok(())
        }
        #[cfg(feature = "gzip")]
        Compression::Gzip => {
            use std::io::Write;
            let mut encoder =
                flate2::write::GzEncoder::new(output, flate2::Compression::default());
            encoder.write_all(input)?;
            encoder.finish()?;
            Ok(())
        }
        #[cfg(feature = "zstd")]
        Compression::Zstd => {
            let compressed = zstd::bulk::compress(input, zstd::DEFAULT_COMPRESSION_LEVEL)?;
            output.extend_from_slice(&compressed);
            Ok(())
        }
        #[cfg(feature = "lz4")]
        Compression::Lz4Raw => {
            output.extend_from_slice(&lz4_flex::block::compress(input));
            Ok(())
        }
        _ => Err(unsupported(codec)),
    }
}

/// Decompresses `input` into `output`, which must have exactly the uncompressed size.
pub fn decompress(codec: Compression, input: &[u8], output: &mut [u8]) -> ParquetResult<()> {
    match codec {
        Compression::Uncompressed => {
            if input.len() != output.len() {
                return Err(fmt_err!(
                    Corruption,
                    "uncompressed page holds {} bytes, header declares {}",
                    input.len(),
                    output.len()
                ));
            }
            output.copy_from_slice(input);
            Ok(())
        }
        #[cfg(feature = "snappy")]
        Compression::Snappy => {
            let len = snap::raw::decompress_len(input)
                .map_err(|e| fmt_err!(Corruption, "invalid snappy page: {e}"))?;
            check_len(len, output.len())?;
            snap::raw::Decoder::new()
                .decompress(input, output)
                .map_err(|e| fmt_err!(Corruption, "invalid snappy page: {e}"))?;
            Ok(())
        }
        #[cfg(feature = "gzip")]
        Compression::Gzip => {
            use std::io::Read;
            let mut decoder = flate2::read::MultiGzDecoder::new(input);
            let mut read = 0;
            while read < output.len() {
                let n = decoder
                    .read(&mut output[read..])
                    .map_err(|e| fmt_err!(Corruption, "invalid gzip page: {e}"))?;
                if n == 0 {
                    break;
                }
                read += n;
            }
            check_len(read, output.len())
        }
        #[cfg(feature = "zstd")]
        Compression::Zstd => {
            let n = zstd::bulk::decompress_to_buffer(input, output)
                .map_err(|e| fmt_err!(Corruption, "invalid zstd page: {e}"))?;
            check_len(n, output.len())
        }
        #[cfg(feature = "lz4")]
        Compression::Lz4Raw => {
            let n = lz4_flex::block::decompress_into(input, output)
                .map_err(|e| fmt_err!(Corruption, "invalid lz4 page: {e}"))?;
            check_len(n, output.len())
        }
        _ => Err(unsupported(codec)),
    }
}

fn check_len(actual: usize, expected: usize) -> ParquetResult<()> {
    if actual != expected {
        return Err(fmt_err!(
            Corruption,
            "page decompressed to {actual} bytes, header declares {expected}"
        ));
    }
    Ok(())
}

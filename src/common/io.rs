//! Common, IO-related code.

use std::{
    fs::File,
    io::{BufRead, BufReader, BufWriter, Write},
    path::Path,
};

use flate2::{bufread::MultiGzDecoder, write::GzEncoder, Compression};

fn is_gz<P: AsRef<Path>>(path: P) -> bool {
    path.as_ref().extension().map(|s| s.to_str()) == Some(Some("gz"))
}

/// Transparently open a file with gzip decoder.
pub fn open_read_maybe_gz<P>(path: P) -> std::io::Result<Box<dyn BufRead>>
where
    P: AsRef<Path>,
{
    if is_gz(&path) {
        tracing::trace!("Opening {:?} as gzip for reading", path.as_ref());
        let file = File::open(path)?;
        let bufreader = BufReader::new(file);
        let decoder = MultiGzDecoder::new(bufreader);
        Ok(Box::new(BufReader::new(decoder)))
    } else {
        tracing::trace!("Opening {:?} as plain text for reading", path.as_ref());
        let file = File::open(path)?;
        Ok(Box::new(BufReader::new(file)))
    }
}

/// Output file that is either plain or gzip-compressed.
///
/// Call `finish()` when done so that errors writing the gzip trailer reach
/// the caller.
pub enum MaybeGzWriter {
    Plain(BufWriter<File>),
    Gz(GzEncoder<BufWriter<File>>),
}

impl MaybeGzWriter {
    /// Write the gzip trailer, if any, and flush the underlying file.
    pub fn finish(self) -> std::io::Result<()> {
        match self {
            MaybeGzWriter::Plain(mut writer) => writer.flush(),
            MaybeGzWriter::Gz(encoder) => encoder.finish()?.flush(),
        }
    }
}

impl Write for MaybeGzWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        match self {
            MaybeGzWriter::Plain(writer) => writer.write(buf),
            MaybeGzWriter::Gz(encoder) => encoder.write(buf),
        }
    }

    fn flush(&mut self) -> std::io::Result<()> {
        match self {
            MaybeGzWriter::Plain(writer) => writer.flush(),
            MaybeGzWriter::Gz(encoder) => encoder.flush(),
        }
    }
}

/// Transparently open a file with gzip encoder.
pub fn open_write_maybe_gz<P>(path: P) -> std::io::Result<MaybeGzWriter>
where
    P: AsRef<Path>,
{
    if is_gz(&path) {
        tracing::trace!("Opening {:?} as gzip for writing", path.as_ref());
        let file = File::create(path)?;
        let bufwriter = BufWriter::new(file);
        let encoder = GzEncoder::new(bufwriter, Compression::default());
        Ok(MaybeGzWriter::Gz(encoder))
    } else {
        tracing::trace!("Opening {:?} as plain text for writing", path.as_ref());
        let file = File::create(path)?;
        Ok(MaybeGzWriter::Plain(BufWriter::new(file)))
    }
}

/// Read all lines of a (maybe gzip-compressed) file.
pub fn read_lines<P: AsRef<Path>>(path: P) -> std::io::Result<Vec<String>> {
    open_read_maybe_gz(path)?.lines().collect()
}

#[cfg(test)]
mod test {
    use std::io::{Read, Write};

    use pretty_assertions::assert_eq;

    #[rstest::rstest]
    #[case("test.txt")]
    #[case("test.txt.gz")]
    fn write_then_read_maybe_gz(#[case] filename: &str) -> Result<(), anyhow::Error> {
        let tmp_dir = temp_testdir::TempDir::default();

        {
            let mut f = super::open_write_maybe_gz(tmp_dir.join(filename))?;
            f.write_all(b"RGP_123_1\nRGP_123_2\n")?;
            f.finish()?;
        }

        let mut buf = String::new();
        super::open_read_maybe_gz(tmp_dir.join(filename))?.read_to_string(&mut buf)?;
        assert_eq!(buf, "RGP_123_1\nRGP_123_2\n");

        Ok(())
    }

    #[test]
    fn gz_output_is_compressed() -> Result<(), anyhow::Error> {
        let tmp_dir = temp_testdir::TempDir::default();
        {
            let mut f = super::open_write_maybe_gz(tmp_dir.join("out.txt.gz"))?;
            f.write_all(b"x")?;
            f.finish()?;
        }

        let raw = std::fs::read(tmp_dir.join("out.txt.gz"))?;
        assert_eq!(&raw[0..2], &[0x1f, 0x8b]);
        // trailer ends with the uncompressed size
        assert_eq!(&raw[raw.len() - 4..], &[1, 0, 0, 0]);

        Ok(())
    }

    #[test]
    fn finish_writes_complete_gz_member() -> Result<(), anyhow::Error> {
        let tmp_dir = temp_testdir::TempDir::default();
        let path = tmp_dir.join("out.txt.gz");
        let mut f = super::open_write_maybe_gz(&path)?;
        f.write_all(b"RGP_123\tholdout\n")?;
        f.finish()?;

        let mut buf = String::new();
        flate2::read::GzDecoder::new(std::fs::File::open(&path)?).read_to_string(&mut buf)?;
        assert_eq!(buf, "RGP_123\tholdout\n");

        Ok(())
    }

    #[test]
    fn read_lines() -> Result<(), anyhow::Error> {
        let lines = super::read_lines("tests/groups/samples.txt")?;

        assert_eq!(lines[0], "RGP_123_1");

        Ok(())
    }

    #[test]
    fn read_lines_missing_file() {
        let err = super::read_lines("tests/does/not/exist.txt").unwrap_err();

        assert_eq!(err.kind(), std::io::ErrorKind::NotFound);
    }
}

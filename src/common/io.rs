//! Common, IO-related code.

use std::{
    fs::File,
    io::{BufRead, BufReader, BufWriter, Write},
    path::Path,
};

use flate2::{bufread::MultiGzDecoder, write::GzEncoder, Compression};

/// Transparently open a file with gzip decoder.
pub fn open_read_maybe_gz<P>(path: P) -> Result<Box<dyn BufRead>, anyhow::Error>
where
    P: AsRef<Path>,
{
    if path.as_ref().extension().map(|s| s.to_str()) == Some(Some("gz")) {
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

/// Transparently open a file with gzip encoder.
pub fn open_write_maybe_gz<P>(path: P) -> Result<Box<dyn Write>, anyhow::Error>
where
    P: AsRef<Path>,
{
    if path.as_ref().extension().map(|s| s.to_str()) == Some(Some("gz")) {
        tracing::trace!("Opening {:?} as gzip for writing", path.as_ref());
        let file = File::create(path)?;
        let bufwriter = BufWriter::new(file);
        let encoder = GzEncoder::new(bufwriter, Compression::default());
        Ok(Box::new(encoder))
    } else {
        tracing::trace!("Opening {:?} as plain text for writing", path.as_ref());
        let file = File::create(path)?;
        Ok(Box::new(BufWriter::new(file)))
    }
}

/// Read one JSON value per line, skipping blank lines.
pub fn read_json_lines<T, P>(path: P) -> Result<Vec<T>, anyhow::Error>
where
    T: serde::de::DeserializeOwned,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let reader = open_read_maybe_gz(path)
        .map_err(|e| anyhow::anyhow!("could not open {:?}: {}", path, e))?;

    let mut result = Vec::new();
    for (lineno, line) in reader.lines().enumerate() {
        let line = line.map_err(|e| anyhow::anyhow!("could not read {:?}: {}", path, e))?;
        if line.trim().is_empty() {
            continue;
        }
        let value = serde_json::from_str(&line).map_err(|e| {
            anyhow::anyhow!("could not parse line {} of {:?}: {}", lineno + 1, path, e)
        })?;
        result.push(value);
    }
    Ok(result)
}

#[cfg(test)]
mod test {
    use std::io::{Read, Write};

    use pretty_assertions::assert_eq;

    #[rstest::rstest]
    #[case::plain("test.txt")]
    #[case::gzip("test.txt.gz")]
    fn write_then_read_maybe_gz(#[case] filename: &str) -> Result<(), anyhow::Error> {
        let tmp_dir = temp_testdir::TempDir::default();

        {
            let mut f = super::open_write_maybe_gz(tmp_dir.join(filename))?;
            writeln!(f, "hello")?;
            f.flush()?;
        }

        let mut raw = Vec::new();
        std::fs::File::open(tmp_dir.join(filename))?.read_to_end(&mut raw)?;
        // gzip magic bytes
        assert_eq!(raw.starts_with(&[0x1f, 0x8b]), filename.ends_with(".gz"));

        let mut contents = String::new();
        super::open_read_maybe_gz(tmp_dir.join(filename))?.read_to_string(&mut contents)?;
        assert_eq!(contents, "hello\n");

        Ok(())
    }

    #[derive(Debug, PartialEq, serde::Deserialize)]
    struct Entry {
        name: String,
        count: u32,
    }

    #[test]
    fn read_json_lines() -> Result<(), anyhow::Error> {
        let tmp_dir = temp_testdir::TempDir::default();
        let path = tmp_dir.join("entries.jsonl");
        std::fs::write(
            &path,
            "{\"name\": \"a\", \"count\": 1}\n\n{\"name\": \"b\", \"count\": 2}\n",
        )?;

        let entries: Vec<Entry> = super::read_json_lines(&path)?;

        assert_eq!(
            entries,
            vec![
                Entry {
                    name: "a".into(),
                    count: 1
                },
                Entry {
                    name: "b".into(),
                    count: 2
                },
            ]
        );

        Ok(())
    }

    #[test]
    fn read_json_lines_reports_line() -> Result<(), anyhow::Error> {
        let tmp_dir = temp_testdir::TempDir::default();
        let path = tmp_dir.join("broken.jsonl");
        std::fs::write(&path, "{\"name\": \"a\", \"count\": 1}\nnot json\n")?;

        let err = super::read_json_lines::<Entry, _>(&path)
            .expect_err("second line is broken")
            .to_string();

        assert!(err.contains("line 2"), "{}", err);

        Ok(())
    }
}

use std::{
    fs::File,
    io::{self, BufWriter, Write as _},
    path::{Path, PathBuf},
};

use anyhow::Context;

/// JSON sink that is either stdout or a freshly created file.
#[derive(Debug, Clone)]
pub enum Output {
    Stdout,
    File(PathBuf),
}

impl Output {
    pub fn from_path(path: Option<PathBuf>) -> Self {
        path.map_or(Output::Stdout, Output::File)
    }

    pub fn display_path(&self) -> String {
        match self {
            Output::Stdout => "stdout".to_string(),
            Output::File(path) => path.display().to_string(),
        }
    }

    /// Writes `value` as pretty-printed JSON followed by a newline.
    pub fn write_json<T>(&self, value: &T) -> anyhow::Result<()>
    where
        T: serde::Serialize,
    {
        match self {
            Output::Stdout => write_json_to(&mut io::stdout().lock(), value),
            Output::File(path) => {
                let file = File::create(path).with_context(|| {
                    format!("Failed to create output file: {}", path.display())
                })?;
                write_json_to(&mut BufWriter::new(file), value)
            }
        }
        .with_context(|| format!("Failed to write JSON to {}", self.display_path()))
    }
}

fn write_json_to<W, T>(writer: &mut W, value: &T) -> io::Result<()>
where
    W: io::Write,
    T: serde::Serialize,
{
    serde_json::to_writer_pretty(&mut *writer, value)?;
    writeln!(writer)?;
    writer.flush()
}

pub fn read_json_file<T, P>(file_kind: &str, path: P) -> anyhow::Result<T>
where
    T: serde::de::DeserializeOwned,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let file = File::open(path)
        .with_context(|| format!("Failed to open {} file: {}", file_kind, path.display()))?;
    let value = serde_json::from_reader(io::BufReader::new(file)).with_context(|| {
        format!(
            "Failed to parse {} JSON file: {}",
            file_kind,
            path.display()
        )
    })?;
    Ok(value)
}

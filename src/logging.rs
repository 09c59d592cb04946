use std::fs::OpenOptions;
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing::Level;
use tracing_subscriber::Layer;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

pub const MAX_LOG_FILE_BYTES: u64 = 10 * 1024 * 1024;

/// Stdout logging, plus a size-capped file when `log_file` is given.
pub fn init_logging(log_level: Level, log_file: Option<&str>) {
    let level_filter = LevelFilter::from_level(log_level);
    let stdout_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stdout)
        .with_filter(level_filter);

    let file_layer = log_file.map(|path| {
        tracing_subscriber::fmt::layer()
            .with_ansi(false)
            .with_writer(capped_writer_factory(PathBuf::from(path), MAX_LOG_FILE_BYTES))
            .with_filter(level_filter)
    });

    tracing_subscriber::registry()
        .with(stdout_layer)
        .with(file_layer)
        .init();
}

fn capped_writer_factory(path: PathBuf, max_len: u64) -> impl Fn() -> CappedFileWriter {
    let lock = Arc::new(Mutex::new(()));
    move || CappedFileWriter { path: path.clone(), max_len, lock: lock.clone() }
}

/// Appends to `path`; once the file reaches `max_len` only its newest half
/// is kept.
struct CappedFileWriter {
    path: PathBuf,
    max_len: u64,
    lock: Arc<Mutex<()>>,
}

fn keep_tail(path: &Path, keep_bytes: u64) -> io::Result<()> {
    let mut tail = Vec::new();
    {
        let mut rf = OpenOptions::new().read(true).open(path)?;
        let size = rf.metadata()?.len();
        rf.seek(SeekFrom::Start(size.saturating_sub(keep_bytes)))?;
        rf.read_to_end(&mut tail)?;
    }
    let mut wf = OpenOptions::new().write(true).truncate(true).open(path)?;
    wf.write_all(&tail)
}

impl Write for CappedFileWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        // A poisoned lock only means another writer panicked mid-write
        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());

        let over_cap = std::fs::metadata(&self.path)
            .map(|meta| meta.len() >= self.max_len)
            .unwrap_or(false);
        if over_cap {
            keep_tail(&self.path, self.max_len / 2)?;
        }

        let mut file = OpenOptions::new().create(true).append(true).open(&self.path)?;
        file.write_all(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capped_writer_keeps_newest_half() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("proxy.log");
        let make_writer = capped_writer_factory(path.clone(), 10);

        make_writer().write_all(b"0123456789").unwrap();
        make_writer().write_all(b"ab").unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, "56789ab");
    }
}

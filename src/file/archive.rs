//! Streamed ZIP archives of stored files.
//!
//! Archives are written entry by entry straight into the caller's sink. Only
//! the central directory (one record per entry) is held in memory; file
//! contents pass through in [`CHUNK_SIZE`] pieces.

use std::collections::HashSet;
use std::io;

use async_zip::tokio::write::ZipFileWriter;
use async_zip::{Compression, DeflateOption, ZipDateTime, ZipEntryBuilder};
use bytes::Bytes;
use chrono::{DateTime, Utc};
use futures::io::AsyncWriteExt as _;
use futures::{future, Stream, StreamExt};
use tokio::io::{AsyncReadExt, AsyncWrite, AsyncWriteExt, DuplexStream};
use tokio::task::JoinHandle;
use tokio_util::io::ReaderStream;

use super::store::FileStore;
use crate::datetime::{filename_stamp, from_system_time};
use crate::{FiledropError, Result};

/// Bytes read from a source file per compressor write.
pub const CHUNK_SIZE: usize = 64 * 1024;

/// Capacity of the pipe between the archive task and the response body.
const PIPE_CAPACITY: usize = 256 * 1024;

/// Upper bound on names accepted in one selection.
pub const MAX_SELECTION: usize = 1000;

/// A stored file and the name it gets inside the archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    pub stored_name: String,
    pub archive_name: String,
}

impl ArchiveEntry {
    pub fn new(stored_name: impl Into<String>, archive_name: impl Into<String>) -> Self {
        Self {
            stored_name: stored_name.into(),
            archive_name: archive_name.into(),
        }
    }

    /// Entry archived under its stored name.
    ///
    /// Stored names are unique, so entries built this way never collide
    /// inside one archive even when two uploads share an original name.
    pub fn stored(stored_name: impl Into<String>) -> Self {
        let stored_name = stored_name.into();
        Self {
            archive_name: stored_name.clone(),
            stored_name,
        }
    }
}

/// Which files an archive should contain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArchiveRequest {
    /// Every file in the store.
    All,
    /// Exactly these stored names, in this order.
    Selected(Vec<String>),
}

impl ArchiveRequest {
    /// Turn the request into archive entries.
    ///
    /// Every selected name must be an existing regular file; one unknown name
    /// fails the whole request.
    pub fn entries(&self, store: &FileStore) -> Result<Vec<ArchiveEntry>> {
        match self {
            ArchiveRequest::All => {
                let files = store.list()?;
                if files.is_empty() {
                    return Err(FiledropError::NotFound("Files to archive".to_string()));
                }
                Ok(files
                    .into_iter()
                    .map(|f| ArchiveEntry::stored(f.stored_name))
                    .collect())
            }
            ArchiveRequest::Selected(names) => {
                if names.is_empty() {
                    return Err(FiledropError::Validation("No files selected".to_string()));
                }
                if names.len() > MAX_SELECTION {
                    return Err(FiledropError::Validation(format!(
                        "Too many files selected (max {MAX_SELECTION})"
                    )));
                }

                let mut seen = HashSet::new();
                let mut entries = Vec::with_capacity(names.len());
                for name in names {
                    if !seen.insert(name.as_str()) {
                        return Err(FiledropError::Validation(format!(
                            "File {name} selected more than once"
                        )));
                    }
                    store.stat(name)?;
                    entries.push(ArchiveEntry::stored(name.clone()));
                }
                Ok(entries)
            }
        }
    }

    /// Suggested download name, e.g. `all-files_3-files_2023-11-14_22-13-20.zip`.
    pub fn file_name(&self, count: usize, now: DateTime<Utc>) -> String {
        let label = match self {
            ArchiveRequest::All => "all-files",
            ArchiveRequest::Selected(_) => "selected-files",
        };
        format!("{label}_{count}-files_{}.zip", filename_stamp(&now))
    }
}

/// Write a ZIP of `entries` into `sink` and return the sink.
///
/// All entries are checked before the first byte is written, so a missing
/// file produces [`FiledropError::NotFound`] and an untouched sink. Errors
/// after that point (read failure, sink closed) abort immediately and leave
/// an incomplete archive behind.
pub async fn build_zip<W>(store: &FileStore, entries: &[ArchiveEntry], sink: W) -> Result<W>
where
    W: AsyncWrite + Unpin,
{
    for entry in entries {
        store.stat(&entry.stored_name)?;
    }

    let mut writer = ZipFileWriter::with_tokio(sink);
    let mut buf = vec![0u8; CHUNK_SIZE];

    for entry in entries {
        let mut file = store.open_read(&entry.stored_name).await?;
        let modified = from_system_time(file.metadata().await?.modified()?);

        let builder = ZipEntryBuilder::new(entry.archive_name.clone().into(), Compression::Deflate)
            .deflate_option(DeflateOption::Maximum)
            .last_modification_date(ZipDateTime::from_chrono(&modified));

        let mut entry_writer = writer.write_entry_stream(builder).await?;
        let mut written = 0u64;
        loop {
            let n = file.read(&mut buf).await?;
            if n == 0 {
                break;
            }
            entry_writer.write_all(&buf[..n]).await?;
            written += n as u64;
        }
        entry_writer.close().await?;

        tracing::debug!(
            entry = %entry.archive_name,
            bytes = written,
            "Added archive entry"
        );
    }

    let mut sink = writer.close().await?.into_inner();
    sink.flush().await?;

    Ok(sink)
}

/// Build a ZIP in a background task and expose it as a lazy chunk stream.
///
/// The stream is single-pass. If the build fails, the last item is an error
/// so the transport can abort instead of ending the body cleanly. Dropping
/// the stream makes the next write in the task fail, which stops the build
/// and closes its open files.
pub fn zip_stream(
    store: FileStore,
    entries: Vec<ArchiveEntry>,
) -> impl Stream<Item = io::Result<Bytes>> + Send + 'static {
    let (reader, task) = spawn_build(store, entries);

    let outcome = futures::stream::once(async move {
        match task.await {
            Ok(Ok(())) => None,
            Ok(Err(e)) => Some(Err(io::Error::other(e.to_string()))),
            Err(e) => Some(Err(io::Error::other(e))),
        }
    })
    .filter_map(future::ready);

    ReaderStream::new(reader).chain(outcome)
}

/// Spawn the archive build, returning the read half of its pipe and the task.
fn spawn_build(store: FileStore, entries: Vec<ArchiveEntry>) -> (DuplexStream, JoinHandle<Result<()>>) {
    let (writer, reader) = tokio::io::duplex(PIPE_CAPACITY);

    let task = tokio::spawn(async move {
        match build_zip(&store, &entries, writer).await {
            Ok(_) => {
                tracing::info!(entries = entries.len(), "Archive stream completed");
                Ok(())
            }
            Err(e) => {
                tracing::warn!(entries = entries.len(), error = %e, "Archive stream aborted");
                Err(e)
            }
        }
    });

    (reader, task)
}

use crate::allocator::PageAllocator;
use crate::api::DiskManager;
use crate::errors::{DiskError, DiskResult};
use page::PAGE_SIZE;
use page::page_id::PageId;
use std::fs;
use std::fs::{File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

#[cfg(unix)]
use std::os::unix::fs::FileExt;
#[cfg(windows)]
use std::os::windows::fs::FileExt;

/// A disk based page store backed by a single database file.
///
/// Page `n` lives at byte offset `n * PAGE_SIZE`. Reads of pages that were allocated but never
/// written (including reads past the end of the file) produce zeroes.
///
/// Reclaimed page ids are only tracked for the lifetime of the instance; on reopen the allocator
/// resumes after the last page present in the file.
#[derive(Debug)]
pub struct DiskFileManager {
    path: PathBuf,
    file: File,
    allocator: Mutex<PageAllocator>,
}

impl DiskFileManager {
    /// Opens (or creates) the database file at `path`, creating parent directories as needed.
    pub fn open(path: impl Into<PathBuf>) -> DiskResult<Self> {
        let path = path.into();

        Self::ensure_parent_dir(&path).map_err(|source| DiskError::Open {
            path: path.clone(),
            source,
        })?;

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)
            .map_err(|source| DiskError::Open {
                path: path.clone(),
                source,
            })?;

        let len = file
            .metadata()
            .map_err(|source| DiskError::Open {
                path: path.clone(),
                source,
            })?
            .len();
        let pages_on_disk = u32::try_from(len.div_ceil(PAGE_SIZE as u64))
            .map_err(|_| DiskError::OutOfPageIds)?;

        tracing::debug!(path = %path.display(), pages_on_disk, "opened database file");

        Ok(Self {
            path,
            file,
            allocator: Mutex::new(PageAllocator::starting_at(pages_on_disk)),
        })
    }

    /// Path of the backing database file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of page ids handed out at least once, including pages found in the file on open.
    pub fn num_pages(&self) -> u32 {
        self.allocator().high_water_mark()
    }

    /// Flushes file contents and metadata to stable storage.
    pub fn sync_all(&self) -> DiskResult<()> {
        self.file.sync_all().map_err(|source| DiskError::Io {
            page_id: PageId::INVALID,
            source,
        })
    }

    fn allocator(&self) -> std::sync::MutexGuard<'_, PageAllocator> {
        self.allocator.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn check_buffer(len: usize) -> DiskResult<()> {
        if len != PAGE_SIZE {
            return Err(DiskError::BufferSize {
                expected: PAGE_SIZE,
                actual: len,
            });
        }
        Ok(())
    }

    #[inline]
    fn read_at(file: &File, buf: &mut [u8], offset: u64) -> io::Result<usize> {
        #[cfg(unix)]
        {
            file.read_at(buf, offset)
        }

        #[cfg(windows)]
        {
            file.seek_read(buf, offset)
        }
    }

    #[inline]
    fn write_at(file: &File, buf: &[u8], offset: u64) -> io::Result<usize> {
        #[cfg(unix)]
        {
            file.write_at(buf, offset)
        }

        #[cfg(windows)]
        {
            file.seek_write(buf, offset)
        }
    }

    fn ensure_parent_dir(path: &Path) -> io::Result<()> {
        match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => fs::create_dir_all(parent),
            _ => Ok(()),
        }
    }
}

impl DiskManager for DiskFileManager {
    fn read_page(&self, page_id: PageId, destination: &mut [u8]) -> DiskResult<()> {
        Self::check_buffer(destination.len())?;
        if !page_id.is_valid() {
            return Err(DiskError::InvalidPage(page_id));
        }

        let offset = page_id.file_offset(PAGE_SIZE);

        let mut read = 0;
        while read < PAGE_SIZE {
            match Self::read_at(&self.file, &mut destination[read..], offset + read as u64) {
                // end of file: the rest of the page was never written
                Ok(0) => break,
                Ok(n) => read += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(source) => return Err(DiskError::Io { page_id, source }),
            }
        }
        destination[read..].fill(0);

        Ok(())
    }

    fn write_page(&self, page_id: PageId, page_data: &[u8]) -> DiskResult<()> {
        Self::check_buffer(page_data.len())?;
        if !page_id.is_valid() {
            return Err(DiskError::InvalidPage(page_id));
        }

        let offset = page_id.file_offset(PAGE_SIZE);

        let mut written = 0;
        while written < PAGE_SIZE {
            match Self::write_at(&self.file, &page_data[written..], offset + written as u64) {
                Ok(0) => {
                    return Err(DiskError::Io {
                        page_id,
                        source: io::Error::from(io::ErrorKind::WriteZero),
                    });
                }
                Ok(n) => written += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(source) => return Err(DiskError::Io { page_id, source }),
            }
        }

        Ok(())
    }

    fn allocate_page(&self) -> DiskResult<PageId> {
        let page_id = self.allocator().allocate()?;
        tracing::trace!(%page_id, "allocated page");
        Ok(page_id)
    }

    fn deallocate_page(&self, page_id: PageId) -> DiskResult<()> {
        self.allocator().deallocate(page_id)?;
        tracing::trace!(%page_id, "deallocated page");
        Ok(())
    }
}

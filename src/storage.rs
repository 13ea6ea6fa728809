// File: ./src/storage.rs
// Per-day record files: one pretty-printed JSON object per date.
//
// The on-disk shape (`{"doing": [], "done": [], "blocker": [], "misc": []}`,
// 2-space indent) is read by other tools. Do not change it.
use crate::context::AppContext;
use crate::error::{Result, StatuslyError};
use crate::model::{Category, DailyRecord, format_date};
use chrono::NaiveDate;
use fs2::FileExt;
use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Keyed get/put of daily records.
pub trait RecordStore: Send + Sync {
    /// Returns an empty record when nothing was written for `date`.
    /// Fails with `CorruptDailyRecord` when the stored data cannot be decoded.
    fn get(&self, date: NaiveDate) -> Result<DailyRecord>;

    fn put(&self, date: NaiveDate, record: &DailyRecord) -> Result<()>;
}

/// Load-extend-save for one day, the `log add` operation.
///
/// Nothing is written when every list is empty.
pub fn append<I>(store: &dyn RecordStore, date: NaiveDate, entries: I) -> Result<DailyRecord>
where
    I: IntoIterator<Item = (Category, Vec<String>)>,
{
    let mut record = store.get(date)?;
    let mut changed = false;
    for (category, items) in entries {
        if items.is_empty() {
            continue;
        }
        record.extend(category, items);
        changed = true;
    }
    if changed {
        store.put(date, &record)?;
    }
    Ok(record)
}

pub struct FileRecordStore {
    dir: PathBuf,
}

impl FileRecordStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn from_context(ctx: &dyn AppContext) -> anyhow::Result<Self> {
        Ok(Self::new(ctx.get_logs_dir()?))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, date: NaiveDate) -> PathBuf {
        self.dir.join(format!("{}.json", format_date(date)))
    }

    fn get_lock_path(file_path: &Path) -> PathBuf {
        let mut lock_path = file_path.to_path_buf();
        if let Some(ext) = lock_path.extension() {
            let mut new_ext = ext.to_os_string();
            new_ext.push(".lock");
            lock_path.set_extension(new_ext);
        } else {
            lock_path.set_extension("lock");
        }
        lock_path
    }

    /// Runs `f` while holding an exclusive advisory lock next to `file_path`.
    pub fn with_lock<F, T>(file_path: &Path, f: F) -> Result<T>
    where
        F: FnOnce() -> Result<T>,
    {
        let lock_path = Self::get_lock_path(file_path);
        let file = fs::OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&lock_path)?;

        file.lock_exclusive()?;
        let result = f();
        FileExt::unlock(&file)?;
        result
    }

    /// Reads `path` under a shared lock when a writer has left a lock file.
    ///
    /// Never creates the lock file, so reads work in a directory we cannot write.
    fn read_shared(path: &Path) -> Result<Option<String>> {
        let lock = fs::File::open(Self::get_lock_path(path)).ok();
        if let Some(file) = &lock {
            file.lock_shared()?;
        }
        let content = match fs::read_to_string(path) {
            Ok(c) => Some(c),
            Err(e) if e.kind() == ErrorKind::NotFound => None,
            Err(e) => return Err(e.into()),
        };
        if let Some(file) = &lock {
            FileExt::unlock(file)?;
        }
        Ok(content)
    }

    /// Atomic write: write to a .tmp file then rename over the target.
    pub fn atomic_write<P: AsRef<Path>, C: AsRef<[u8]>>(path: P, contents: C) -> Result<()> {
        let path = path.as_ref();
        let mut tmp_name = path.as_os_str().to_owned();
        tmp_name.push(".tmp");
        let tmp_path = PathBuf::from(tmp_name);
        fs::write(&tmp_path, contents)?;
        fs::rename(tmp_path, path)?;
        Ok(())
    }
}

impl RecordStore for FileRecordStore {
    fn get(&self, date: NaiveDate) -> Result<DailyRecord> {
        let path = self.path_for(date);
        let Some(content) = Self::read_shared(&path)? else {
            return Ok(DailyRecord::default());
        };

        serde_json::from_str(&content).map_err(|e| StatuslyError::CorruptDailyRecord {
            date: format_date(date),
            reason: e.to_string(),
        })
    }

    fn put(&self, date: NaiveDate, record: &DailyRecord) -> Result<()> {
        fs::create_dir_all(&self.dir)?;
        let path = self.path_for(date);
        Self::with_lock(&path, || {
            // serde_json's pretty printer indents with two spaces.
            let json = serde_json::to_string_pretty(record)?;
            Self::atomic_write(&path, json)?;
            Ok(())
        })?;
        log::debug!("Saved daily record {}", path.display());
        Ok(())
    }
}

/// In-memory store. Counts reads so callers can assert how many days were visited.
#[derive(Default)]
pub struct MemoryStore {
    records: Mutex<HashMap<NaiveDate, DailyRecord>>,
    corrupt: Mutex<Vec<NaiveDate>>,
    reads: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_record(self, date: NaiveDate, record: DailyRecord) -> Self {
        if let Ok(mut map) = self.records.lock() {
            map.insert(date, record);
        }
        self
    }

    /// Make `get` fail for `date` as if its file were damaged.
    pub fn with_corrupt(self, date: NaiveDate) -> Self {
        if let Ok(mut list) = self.corrupt.lock() {
            list.push(date);
        }
        self
    }

    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }
}

impl RecordStore for MemoryStore {
    fn get(&self, date: NaiveDate) -> Result<DailyRecord> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        fn poisoned<E>(date: NaiveDate) -> impl FnOnce(E) -> StatuslyError {
            move |_| StatuslyError::CorruptDailyRecord {
                date: format_date(date),
                reason: "store lock poisoned".to_string(),
            }
        }
        if self.corrupt.lock().map_err(poisoned(date))?.contains(&date) {
            return Err(StatuslyError::CorruptDailyRecord {
                date: format_date(date),
                reason: "marked corrupt".to_string(),
            });
        }
        Ok(self
            .records
            .lock()
            .map_err(poisoned(date))?
            .get(&date)
            .cloned()
            .unwrap_or_default())
    }

    fn put(&self, date: NaiveDate, record: &DailyRecord) -> Result<()> {
        let mut map = self
            .records
            .lock()
            .map_err(|_| StatuslyError::Io(std::io::Error::other("store lock poisoned")))?;
        map.insert(date, record.clone());
        Ok(())
    }
}

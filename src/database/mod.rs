//! Файловое хранилище пользователей: один JSON-объект `id -> UserSession`.
//!
//! Файл переписывается целиком после каждой мутации через временный файл и
//! атомарный `rename`, поэтому оборванная запись не портит последнюю удачную.
//! Рассчитано на тысячи пользователей, не больше.

use std::collections::{BTreeMap, HashMap};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use tokio::sync::Mutex;

use crate::models::{UserId, UserSession};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[derive(Clone)]
pub struct Store {
    inner: Arc<Mutex<StoreInner>>,
}

struct StoreInner {
    path: PathBuf,
    users: HashMap<UserId, UserSession>,
    /// Число успешных записей файла с момента загрузки.
    revision: u64,
}

impl Store {
    /// Читает файл целиком. Отсутствующий файл даёт пустое хранилище,
    /// повреждённый переименовывается в `*.corrupt-<время>`.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();

        let temp = temp_path(&path);
        if temp.exists() {
            log::warn!("🧹 Discarding unfinished write {}", temp.display());
            fs::remove_file(&temp)?;
        }

        let users = match fs::read(&path) {
            Ok(bytes) => match parse_users(&bytes) {
                Ok(users) => users,
                Err(e) => {
                    let quarantine = quarantine_path(&path);
                    log::error!(
                        "❌ Store {} is corrupt ({}), moving it to {}",
                        path.display(),
                        e,
                        quarantine.display()
                    );
                    fs::rename(&path, &quarantine)?;
                    HashMap::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => HashMap::new(),
            Err(e) => return Err(e.into()),
        };

        log::info!("✅ Loaded {} user records from {}", users.len(), path.display());

        Ok(Self {
            inner: Arc::new(Mutex::new(StoreInner { path, users, revision: 0 })),
        })
    }

    /// Запись пользователя или свежая запись по умолчанию.
    pub async fn get(&self, id: UserId) -> UserSession {
        let inner = self.inner.lock().await;
        inner
            .users
            .get(&id)
            .cloned()
            .unwrap_or_else(|| UserSession::new(id))
    }

    /// Вливает изменения в запись (создавая её при необходимости) и
    /// сохраняет всё хранилище. При ошибке записи память уже обновлена.
    pub async fn upsert<F>(&self, id: UserId, merge: F) -> Result<UserSession, StoreError>
    where
        F: FnOnce(&mut UserSession),
    {
        let mut inner = self.inner.lock().await;
        let session = inner
            .users
            .entry(id)
            .or_insert_with(|| UserSession::new(id));
        merge(session);
        let updated = session.clone();

        inner.persist()?;
        Ok(updated)
    }

    pub async fn all(&self) -> Vec<UserSession> {
        let inner = self.inner.lock().await;
        inner.users.values().cloned().collect()
    }

    pub async fn persist(&self) -> Result<(), StoreError> {
        self.inner.lock().await.persist()
    }

    pub async fn revision(&self) -> u64 {
        self.inner.lock().await.revision
    }
}

impl StoreInner {
    fn persist(&mut self) -> Result<(), StoreError> {
        let start_time = Instant::now();
        let temp = temp_path(&self.path);

        let keyed: BTreeMap<String, &UserSession> = self
            .users
            .iter()
            .map(|(id, session)| (id.to_string(), session))
            .collect();

        {
            let file = File::create(&temp)?;
            let mut writer = BufWriter::new(file);
            serde_json::to_writer_pretty(&mut writer, &keyed)?;
            writer.flush()?;
            writer.get_ref().sync_all()?;
        }

        fs::rename(&temp, &self.path)?;
        self.revision += 1;

        log::debug!(
            "💾 Store saved ({} users, rev {}) in {:?}",
            self.users.len(),
            self.revision,
            start_time.elapsed()
        );
        Ok(())
    }
}

fn parse_users(bytes: &[u8]) -> Result<HashMap<UserId, UserSession>, serde_json::Error> {
    let keyed: BTreeMap<String, UserSession> = serde_json::from_slice(bytes)?;
    Ok(keyed
        .into_values()
        .map(|session| (session.id, session))
        .collect())
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".tmp");
    PathBuf::from(name)
}

fn quarantine_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(format!(".corrupt-{}", Utc::now().format("%Y%m%dT%H%M%S")));
    PathBuf::from(name)
}

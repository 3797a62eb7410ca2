//! State persisted between pages: the session ID, the configuration and session data.

use crate::config::SimulationConfig;
use crate::error::{Error, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

pub const SESSION_ID_KEY: &str = "simulationSessionId";
pub const CONFIG_KEY: &str = "simulationConfig";
pub const SESSION_DATA_KEY: &str = "sessionData";

/// A string key-value store that survives page navigation.
pub trait SessionStore {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&mut self, key: &str, value: String) -> Result<()>;
    fn remove(&mut self, key: &str) -> Result<()>;
}

/// A store that lives as long as the process.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    values: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Default::default()
    }
}

impl SessionStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: String) -> Result<()> {
        self.values.insert(key.to_owned(), value);
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.values.remove(key);
        Ok(())
    }
}

/// A store keeping one `<key>.json` file per key in a directory.
#[derive(Clone, Debug)]
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    /// Opens a store in `dir`, creating the directory if needed.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl SessionStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        match std::fs::read_to_string(self.path(key)) {
            Ok(value) => Ok(Some(value)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn set(&mut self, key: &str, value: String) -> Result<()> {
        std::fs::write(self.path(key), value)?;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        match std::fs::remove_file(self.path(key)) {
            Err(err) if err.kind() != std::io::ErrorKind::NotFound => Err(err.into()),
            _ => Ok(()),
        }
    }
}

/// Progress through setup that later pages rely on.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SessionData {
    /// The chosen network.
    pub network: Option<String>,
    /// The ID the backend gave the saved configuration.
    pub config_id: Option<String>,
    /// The session ID of the last launched run.
    pub last_run: Option<String>,
}

/// Everything persisted for the current session.
#[derive(Clone, Debug, PartialEq)]
pub struct PersistedSession {
    pub session_id: Option<String>,
    pub config: SimulationConfig,
    pub data: SessionData,
}

impl PersistedSession {
    /// Loads the persisted session. A configuration must have been saved.
    pub fn load(store: &impl SessionStore) -> Result<Self> {
        let config = read_json(store, CONFIG_KEY)?.ok_or(Error::MissingPrerequisite {
            what: "simulation configuration",
        })?;
        Ok(Self {
            session_id: store.get(SESSION_ID_KEY)?,
            config,
            data: read_json(store, SESSION_DATA_KEY)?.unwrap_or_default(),
        })
    }

    /// The launched run's session ID, required by the run and results pages.
    pub fn require_session_id(&self) -> Result<&str> {
        self.session_id
            .as_deref()
            .ok_or(Error::MissingPrerequisite { what: "simulation session" })
    }
}

pub fn save_config(store: &mut impl SessionStore, config: &SimulationConfig) -> Result<()> {
    write_json(store, CONFIG_KEY, config)
}

pub fn save_session_data(store: &mut impl SessionStore, data: &SessionData) -> Result<()> {
    write_json(store, SESSION_DATA_KEY, data)
}

pub fn save_session_id(store: &mut impl SessionStore, session_id: &str) -> Result<()> {
    store.set(SESSION_ID_KEY, session_id.to_owned())
}

/// Forgets everything persisted for the session.
pub fn clear(store: &mut impl SessionStore) -> Result<()> {
    for key in [SESSION_ID_KEY, CONFIG_KEY, SESSION_DATA_KEY] {
        store.remove(key)?;
    }
    Ok(())
}

fn read_json<T: DeserializeOwned>(store: &impl SessionStore, key: &str) -> Result<Option<T>> {
    let Some(raw) = store.get(key)? else {
        return Ok(None);
    };
    serde_json::from_str(&raw)
        .map(Some)
        .map_err(|source| Error::MalformedPersisted {
            key: key.to_owned(),
            source,
        })
}

fn write_json<T: Serialize>(store: &mut impl SessionStore, key: &str, value: &T) -> Result<()> {
    store.set(key, serde_json::to_string(value)?)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn missing_config_is_a_missing_prerequisite() {
        let store = MemoryStore::new();
        assert!(matches!(
            PersistedSession::load(&store),
            Err(Error::MissingPrerequisite { .. })
        ));
    }

    #[test]
    fn corrupt_config_asks_for_restart() {
        let mut store = MemoryStore::new();
        store.set(CONFIG_KEY, "{not json".into()).unwrap();
        let err = PersistedSession::load(&store).unwrap_err();
        assert!(matches!(err, Error::MalformedPersisted { ref key, .. } if key == CONFIG_KEY));
        assert!(err.to_string().contains("restart"));
    }

    #[test]
    fn saved_session_loads_back() {
        let mut store = MemoryStore::new();
        let config = SimulationConfig {
            duration: 900.0,
            ..Default::default()
        };
        save_config(&mut store, &config).unwrap();
        save_session_id(&mut store, "sess-1").unwrap();

        let session = PersistedSession::load(&store).unwrap();
        assert_eq!(session.config, config);
        assert_eq!(session.require_session_id().unwrap(), "sess-1");
        assert_eq!(session.data, SessionData::default());

        clear(&mut store).unwrap();
        assert!(PersistedSession::load(&store).is_err());
    }

    #[test]
    fn file_store_round_trip() {
        let dir = std::env::temp_dir().join(format!("traffic-console-store-{}", std::process::id()));
        let mut store = JsonFileStore::open(&dir).unwrap();
        assert_eq!(store.get(SESSION_ID_KEY).unwrap(), None);
        store.set(SESSION_ID_KEY, "abc".into()).unwrap();
        assert_eq!(store.get(SESSION_ID_KEY).unwrap().as_deref(), Some("abc"));
        store.remove(SESSION_ID_KEY).unwrap();
        store.remove(SESSION_ID_KEY).unwrap();
        assert_eq!(store.get(SESSION_ID_KEY).unwrap(), None);
        std::fs::remove_dir_all(store.dir()).unwrap();
    }
}

//! Persisted scene state
//!
//! Each list is saved as a versioned envelope `{ "version": n, "state": [...] }`
//! under its own key. Loading walks old envelopes forward one schema step at
//! a time on raw JSON, then deserializes with default-fill, so saved state
//! from any earlier version keeps loading. Entries that still fail to parse
//! are skipped with a warning instead of failing the whole scene.
//!
//! | version | shape change                                               |
//! |---------|------------------------------------------------------------|
//! | 1       | `solid`/`gradient`/`noise`/`texture`, `phi`/`theta`, `rect` |
//! | 2       | `scrim` becomes `procedural_scrim`, `selected` added        |
//! | 3       | `latlon` and `ts` added, `rectangle` spelled out            |
//! | 4       | nested `placement` and `animation`, `sky_gradient` added    |

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use parking_lot::RwLock;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Map, Value};

use crate::camera::{normalize_selection, Camera};
use crate::error::{SceneError, SceneResult};
use crate::light::Light;
use crate::signal::Signal;
use crate::store::SceneSnapshot;

/// Newest schema this build reads and the one it writes
pub const SCHEMA_VERSION: u32 = 4;

pub const LIGHTS_KEY: &str = "lightform.lights";
pub const CAMERAS_KEY: &str = "lightform.cameras";
pub const SIGNALS_KEY: &str = "lightform.signals";
/// Single-blob key written by the first editor releases
pub const LEGACY_KEY: &str = "env-storage";

/// String key-value backend
pub trait KeyValueStorage: Send + Sync {
    fn get(&self, key: &str) -> SceneResult<Option<String>>;
    fn set(&self, key: &str, value: &str) -> SceneResult<()>;
    fn remove(&self, key: &str) -> SceneResult<()>;
}

/// Volatile storage, mostly for tests and headless runs
#[derive(Default)]
pub struct MemoryStorage {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStorage for MemoryStorage {
    fn get(&self, key: &str) -> SceneResult<Option<String>> {
        Ok(self.entries.read().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> SceneResult<()> {
        self.entries.write().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> SceneResult<()> {
        self.entries.write().remove(key);
        Ok(())
    }
}

/// One `<key>.json` file per key inside a directory
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    /// Open (and create if needed) a storage directory
    pub fn open(dir: impl AsRef<Path>) -> SceneResult<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> SceneResult<PathBuf> {
        if key.is_empty() || key.contains(['/', '\\']) || key.starts_with('.') {
            return Err(SceneError::Storage(format!("invalid key '{}'", key)));
        }
        Ok(self.dir.join(format!("{}.json", key)))
    }
}

impl KeyValueStorage for FileStorage {
    fn get(&self, key: &str) -> SceneResult<Option<String>> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> SceneResult<()> {
        let path = self.path_for(key)?;
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> SceneResult<()> {
        let path = self.path_for(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

// ----------------------------------------------------------------------
// Save
// ----------------------------------------------------------------------

fn save_list<T: Serialize>(storage: &dyn KeyValueStorage, key: &str, items: &[T]) -> SceneResult<()> {
    let envelope = json!({ "version": SCHEMA_VERSION, "state": items });
    storage.set(key, &serde_json::to_string(&envelope)?)
}

/// Write every list at the current schema version
pub fn save_scene(storage: &dyn KeyValueStorage, snapshot: &SceneSnapshot) -> SceneResult<()> {
    save_list(storage, LIGHTS_KEY, &snapshot.lights)?;
    save_list(storage, CAMERAS_KEY, &snapshot.cameras)?;
    save_list(storage, SIGNALS_KEY, &snapshot.signals)?;
    log::debug!(
        "Saved {} light(s), {} camera(s), {} signal(s)",
        snapshot.lights.len(),
        snapshot.cameras.len(),
        snapshot.signals.len()
    );
    Ok(())
}

// ----------------------------------------------------------------------
// Load
// ----------------------------------------------------------------------

/// Read saved state; `None` when nothing was ever saved
pub fn load_scene(storage: &dyn KeyValueStorage) -> SceneResult<Option<SceneSnapshot>> {
    let Some(raw_lights) = storage.get(LIGHTS_KEY)? else {
        return load_legacy(storage);
    };

    let (version, lights) = open_envelope(&raw_lights)?;
    let lights = decode_lights(lights, version);

    let mut cameras = match storage.get(CAMERAS_KEY)? {
        Some(raw) => {
            let (version, items) = open_envelope(&raw)?;
            decode_items::<Camera>(items, version, "camera")
        }
        None => Vec::new(),
    };
    if cameras.is_empty() {
        cameras.push(Camera::default());
    }
    normalize_selection(&mut cameras);

    let signals = match storage.get(SIGNALS_KEY)? {
        Some(raw) => {
            let (version, items) = open_envelope(&raw)?;
            decode_items::<Signal>(items, version, "signal")
        }
        None => Vec::new(),
    };

    Ok(Some(SceneSnapshot { lights, cameras, signals }))
}

/// Import the single-blob state of the first editor releases
fn load_legacy(storage: &dyn KeyValueStorage) -> SceneResult<Option<SceneSnapshot>> {
    let Some(raw) = storage.get(LEGACY_KEY)? else {
        return Ok(None);
    };
    let root: Value = serde_json::from_str(&raw)?;
    let version = read_version(&root)?;
    let state = root.get("state").cloned().unwrap_or(Value::Null);

    let list = |name: &str| match state.get(name) {
        Some(Value::Array(items)) => items.clone(),
        _ => Vec::new(),
    };

    let lights = decode_lights(list("lights"), version);
    let mut cameras = decode_items::<Camera>(list("cameras"), version, "camera");
    if let Some(selected) = state.get("selectedCameraId").and_then(Value::as_str) {
        for camera in cameras.iter_mut() {
            camera.selected = camera.id.as_str() == selected;
        }
    }
    if cameras.is_empty() {
        cameras.push(Camera::default());
    }
    normalize_selection(&mut cameras);
    let signals = decode_items::<Signal>(list("signals"), version, "signal");

    log::info!("Imported {} light(s) from legacy state v{}", lights.len(), version);
    Ok(Some(SceneSnapshot { lights, cameras, signals }))
}

fn read_version(root: &Value) -> SceneResult<u32> {
    let found = root.get("version").and_then(Value::as_u64).unwrap_or(1);
    match u32::try_from(found) {
        Ok(version) if version <= SCHEMA_VERSION => Ok(version.max(1)),
        _ => Err(SceneError::UnsupportedVersion { found, supported: SCHEMA_VERSION }),
    }
}

fn open_envelope(raw: &str) -> SceneResult<(u32, Vec<Value>)> {
    let root: Value = serde_json::from_str(raw)?;
    let version = read_version(&root)?;
    match root.get("state") {
        Some(Value::Array(items)) => Ok((version, items.clone())),
        Some(Value::Null) | None => Ok((version, Vec::new())),
        Some(_) => Err(SceneError::Storage("envelope state is not a list".to_string())),
    }
}

fn decode_lights(items: Vec<Value>, version: u32) -> Vec<Light> {
    let items = items.into_iter().map(|item| migrate_light(item, version)).collect();
    decode_items(items, SCHEMA_VERSION, "light")
}

fn decode_items<T: DeserializeOwned>(items: Vec<Value>, version: u32, what: &str) -> Vec<T> {
    items
        .into_iter()
        .enumerate()
        .filter_map(|(i, item)| match serde_json::from_value(item) {
            Ok(value) => Some(value),
            Err(e) => {
                log::warn!("Skipping unreadable {} #{} (schema v{}): {}", what, i, version, e);
                None
            }
        })
        .collect()
}

// ----------------------------------------------------------------------
// Migrations
// ----------------------------------------------------------------------

/// Bring one saved light from `from` up to the current schema
pub fn migrate_light(mut value: Value, from: u32) -> Value {
    let Some(fields) = value.as_object_mut() else {
        return value;
    };
    if from < 2 {
        v1_to_v2(fields);
    }
    if from < 3 {
        v2_to_v3(fields);
    }
    if from < 4 {
        v3_to_v4(fields);
    }
    value
}

fn v1_to_v2(fields: &mut Map<String, Value>) {
    if fields.get("type").and_then(Value::as_str) == Some("scrim") {
        fields.insert("type".into(), json!("procedural_scrim"));
    }
    if let Some(algorithm) = fields.remove("algorithm") {
        if !fields.contains_key("noiseType") {
            let name = algorithm.as_str().map(str::to_ascii_lowercase).unwrap_or_default();
            let known = matches!(name.as_str(), "perlin" | "simplex" | "cell" | "curl");
            fields.insert("noiseType".into(), json!(if known { name.as_str() } else { "perlin" }));
        }
    }
    fields.entry("selected").or_insert(json!(false));
}

fn v2_to_v3(fields: &mut Map<String, Value>) {
    fields.entry("ts").or_insert(json!(0));
    if fields.get("shape").and_then(Value::as_str) == Some("rect") {
        fields.insert("shape".into(), json!("rectangle"));
    }
}

fn v3_to_v4(fields: &mut Map<String, Value>) {
    let latlon = fields.remove("latlon");
    let phi = fields.remove("phi");
    let theta = fields.remove("theta");
    if !fields.contains_key("placement") {
        let placement = match (latlon, phi, theta) {
            (Some(Value::Object(ll)), _, _) => json!({
                "mode": "latlon",
                "x": ll.get("x").and_then(Value::as_f64).unwrap_or(0.0),
                "y": ll.get("y").and_then(Value::as_f64).unwrap_or(0.0),
            }),
            (_, Some(phi), Some(theta)) if phi.is_number() && theta.is_number() => json!({
                "mode": "spherical",
                "phi": phi,
                "theta": theta,
            }),
            _ => json!({ "mode": "latlon", "x": 0.0, "y": 0.0 }),
        };
        fields.insert("placement".into(), placement);
    }

    const FLAT_ANIMATION: [(&str, &str); 5] = [
        ("animate", "enabled"),
        ("animationSpeed", "speed"),
        ("animationRotationIntensity", "rotationIntensity"),
        ("animationFloatIntensity", "floatIntensity"),
        ("animationFloatingRange", "floatingRange"),
    ];
    let mut animation = Map::new();
    for (old, new) in FLAT_ANIMATION {
        if let Some(v) = fields.remove(old) {
            animation.insert(new.to_string(), v);
        }
    }
    if !animation.is_empty() && !fields.contains_key("animation") {
        fields.insert("animation".into(), Value::Object(animation));
    }

    // Early texture lights saved the live texture object instead of its key
    if fields.get("type").and_then(Value::as_str) == Some("texture") {
        let map_is_key = matches!(fields.get("map"), Some(Value::String(_)));
        if !map_is_key {
            log::warn!(
                "Texture light {} has no resource key; it will render the fallback",
                fields.get("id").and_then(Value::as_str).unwrap_or("?")
            );
            fields.insert("map".into(), json!(""));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::light::{LightKind, Placement, Shape};

    #[test]
    fn test_v1_light_migrates() {
        let v1 = json!({
            "id": "light-1",
            "name": "Light A",
            "shape": "rect",
            "type": "noise",
            "algorithm": "simplex",
            "phi": 1.0,
            "theta": 0.5,
            "animate": true,
            "animationSpeed": 2.0,
        });
        let light: Light = serde_json::from_value(migrate_light(v1, 1)).unwrap();
        assert_eq!(light.shape, Shape::Rectangle);
        assert_eq!(light.placement, Placement::Spherical { phi: 1.0, theta: 0.5 });
        assert!(light.animation.enabled);
        assert_eq!(light.animation.speed, 2.0);
        match light.kind {
            LightKind::Noise(p) => assert_eq!(p.noise_type, crate::light::NoiseType::Simplex),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_v2_scrim_and_v3_latlon() {
        let v1 = json!({ "id": "s", "type": "scrim", "lightDistance": 0.5 });
        let light: Light = serde_json::from_value(migrate_light(v1, 1)).unwrap();
        assert_eq!(light.kind.type_name(), "procedural_scrim");

        let v3 = json!({ "id": "l", "type": "solid", "color": "#fff", "latlon": { "x": 0.2, "y": -0.4 } });
        let light: Light = serde_json::from_value(migrate_light(v3, 3)).unwrap();
        assert_eq!(light.placement, Placement::Latlon { x: 0.2, y: -0.4 });
    }

    #[test]
    fn test_texture_object_map_becomes_key() {
        let v3 = json!({ "id": "t", "type": "texture", "map": { "uuid": "abc" } });
        let light: Light = serde_json::from_value(migrate_light(v3, 3)).unwrap();
        assert_eq!(light.kind.texture_key(), Some(""));
    }

    #[test]
    fn test_save_load_memory() {
        let storage = MemoryStorage::new();
        assert!(load_scene(&storage).unwrap().is_none());

        let snapshot = SceneSnapshot {
            lights: vec![Light::new("a", "A", LightKind::default())],
            cameras: vec![Camera::default()],
            signals: Vec::new(),
        };
        save_scene(&storage, &snapshot).unwrap();
        assert_eq!(load_scene(&storage).unwrap(), Some(snapshot));
    }

    #[test]
    fn test_future_version_rejected() {
        let storage = MemoryStorage::new();
        storage.set(LIGHTS_KEY, r#"{ "version": 99, "state": [] }"#).unwrap();
        assert!(matches!(
            load_scene(&storage),
            Err(SceneError::UnsupportedVersion { found: 99, .. })
        ));
    }

    #[test]
    fn test_oversized_version_not_truncated() {
        let storage = MemoryStorage::new();
        let raw = format!(r#"{{ "version": {}, "state": [] }}"#, (1u64 << 32) + 1);
        storage.set(LIGHTS_KEY, &raw).unwrap();
        assert!(matches!(
            load_scene(&storage),
            Err(SceneError::UnsupportedVersion { found, .. }) if found == (1u64 << 32) + 1
        ));
    }

    #[test]
    fn test_bad_entries_skipped() {
        let storage = MemoryStorage::new();
        storage
            .set(LIGHTS_KEY, r#"{ "version": 4, "state": [ { "id": "ok", "type": "solid" }, { "type": "bogus" } ] }"#)
            .unwrap();
        let snapshot = load_scene(&storage).unwrap().unwrap();
        assert_eq!(snapshot.lights.len(), 1);
        assert_eq!(snapshot.cameras.len(), 1);
        assert!(snapshot.cameras[0].selected);
    }

    #[test]
    fn test_legacy_blob_import() {
        let storage = MemoryStorage::new();
        let blob = json!({
            "version": 1,
            "state": {
                "lights": [{ "id": "light-1", "type": "solid", "color": "#fff", "shape": "rect", "phi": 1.57, "theta": 0 }],
                "cameras": [
                    { "id": "default", "name": "Default", "position": [0, 0, 5], "rotation": [0, 0, 0] },
                    { "id": "top", "name": "Top", "position": [0, 5, 0], "rotation": [0, 0, 0] }
                ],
                "selectedCameraId": "top"
            }
        });
        storage.set(LEGACY_KEY, &blob.to_string()).unwrap();
        let snapshot = load_scene(&storage).unwrap().unwrap();
        assert_eq!(snapshot.lights.len(), 1);
        assert!(snapshot.cameras[1].selected);
        assert!(!snapshot.cameras[0].selected);
    }

    #[test]
    fn test_file_storage_rejects_path_keys() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::open(dir.path()).unwrap();
        assert!(storage.set("../escape", "x").is_err());
        storage.set("ok", "1").unwrap();
        assert_eq!(storage.get("ok").unwrap().as_deref(), Some("1"));
        storage.remove("ok").unwrap();
        assert_eq!(storage.get("ok").unwrap(), None);
    }
}

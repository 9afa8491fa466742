//! Scene store
//!
//! Owns the light, camera and signal lists. Every list lives behind an
//! `Arc` and every write is copy-on-write: the current list is cloned, the
//! change is applied to the clone, and the new list replaces the old one in
//! a single swap. Readers holding an earlier snapshot never observe a
//! partial update, and a failed write leaves the store untouched.
//!
//! Subscribers receive [`StoreEvent`]s scoped to the entity that changed.

use core::sync::atomic::{AtomicU64, Ordering};
use std::collections::HashSet;
use std::sync::Arc;

use crossbeam_channel::{unbounded, Receiver, Sender};
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};

use crate::camera::{normalize_selection, Camera};
use crate::error::{SceneError, SceneResult};
use crate::id::{CameraId, IdGenerator, LightId, SignalId};
use crate::light::{any_solo, effective_visibility, Light, LightKind, ScrimParams};
use crate::signal::Signal;

/// Change notification, scoped to the entity that changed
#[derive(Clone, Debug, PartialEq)]
pub enum StoreEvent {
    LightAdded(LightId),
    LightUpdated(LightId),
    LightRemoved(LightId),
    /// The whole light list was replaced
    LightsReplaced,
    SoloChanged(bool),
    SelectionChanged(Option<LightId>),
    CameraAdded(CameraId),
    CameraUpdated(CameraId),
    CameraSelected(CameraId),
    SignalsChanged,
}

/// Owned copy of the whole store
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SceneSnapshot {
    pub lights: Vec<Light>,
    pub cameras: Vec<Camera>,
    pub signals: Vec<Signal>,
}

/// Process-wide scene state with structured access
pub struct SceneStore {
    lights: RwLock<Arc<Vec<Light>>>,
    cameras: RwLock<Arc<Vec<Camera>>>,
    signals: RwLock<Arc<Vec<Signal>>>,
    /// Monotonic write counter, stamped into `Light::ts`
    revision: AtomicU64,
    ids: IdGenerator,
    subscribers: Mutex<Vec<Sender<StoreEvent>>>,
}

impl SceneStore {
    /// Empty store with the default camera
    pub fn new() -> Self {
        Self {
            lights: RwLock::new(Arc::new(Vec::new())),
            cameras: RwLock::new(Arc::new(vec![Camera::default()])),
            signals: RwLock::new(Arc::new(Vec::new())),
            revision: AtomicU64::new(0),
            ids: IdGenerator::new(),
            subscribers: Mutex::new(Vec::new()),
        }
    }

    /// Store seeded with the starter scene: one white scrim light
    pub fn with_default_scene() -> Self {
        let store = Self::new();
        let light = Light::new("light-1", "Light A", LightKind::ProceduralScrim(ScrimParams::default()));
        store.replace_lights(vec![light]);
        store
    }

    /// Store restored from a snapshot
    pub fn from_snapshot(snapshot: SceneSnapshot) -> Self {
        let store = Self::new();
        store.restore(snapshot);
        store
    }

    // ------------------------------------------------------------------
    // Notification
    // ------------------------------------------------------------------

    /// Receive every future change
    pub fn subscribe(&self) -> Receiver<StoreEvent> {
        let (tx, rx) = unbounded();
        self.subscribers.lock().push(tx);
        rx
    }

    fn emit(&self, events: Vec<StoreEvent>) {
        if events.is_empty() {
            return;
        }
        let mut subscribers = self.subscribers.lock();
        subscribers.retain(|tx| events.iter().all(|e| tx.send(e.clone()).is_ok()));
    }

    // ------------------------------------------------------------------
    // Reads
    // ------------------------------------------------------------------

    /// Current light list
    pub fn lights(&self) -> Arc<Vec<Light>> {
        self.lights.read().clone()
    }

    /// Copy of one light
    pub fn light(&self, id: &LightId) -> Option<Light> {
        self.lights.read().iter().find(|l| &l.id == id).cloned()
    }

    /// Whether any light is soloed
    pub fn is_solo(&self) -> bool {
        any_solo(&self.lights.read())
    }

    /// Render-time visibility of one light
    pub fn is_effectively_visible(&self, id: &LightId) -> SceneResult<bool> {
        let lights = self.lights();
        let solo = any_solo(&lights);
        lights
            .iter()
            .find(|l| &l.id == id)
            .map(|l| effective_visibility(l, solo))
            .ok_or_else(|| SceneError::LightNotFound(id.clone()))
    }

    /// The selected light, if any
    pub fn selected_light(&self) -> Option<Light> {
        self.lights.read().iter().find(|l| l.selected).cloned()
    }

    /// Current write revision
    pub fn revision(&self) -> u64 {
        self.revision.load(Ordering::Acquire)
    }

    pub fn cameras(&self) -> Arc<Vec<Camera>> {
        self.cameras.read().clone()
    }

    /// The active camera
    pub fn selected_camera(&self) -> Option<Camera> {
        self.cameras.read().iter().find(|c| c.selected).cloned()
    }

    pub fn signals(&self) -> Arc<Vec<Signal>> {
        self.signals.read().clone()
    }

    /// Signals driving one light, in list order
    pub fn signals_for_target(&self, target: &LightId) -> Vec<Signal> {
        self.signals.read().iter().filter(|s| &s.target_id == target).cloned().collect()
    }

    /// Owned copy of every list
    pub fn snapshot(&self) -> SceneSnapshot {
        SceneSnapshot {
            lights: self.lights().as_ref().clone(),
            cameras: self.cameras().as_ref().clone(),
            signals: self.signals().as_ref().clone(),
        }
    }

    // ------------------------------------------------------------------
    // Copy-on-write core
    // ------------------------------------------------------------------

    /// Apply `f` to a private copy of the light list and swap it in on success
    fn write_lights<R>(
        &self,
        f: impl FnOnce(&mut Vec<Light>, u64) -> SceneResult<(R, Vec<StoreEvent>)>,
    ) -> SceneResult<R> {
        let (result, events) = {
            let mut guard = self.lights.write();
            let mut next = guard.as_ref().clone();
            let was_solo = any_solo(&next);
            // only bumped under the lights write lock, and only on commit
            let revision = self.revision.load(Ordering::Acquire) + 1;

            let (result, mut events) = f(&mut next, revision)?;

            let is_solo = any_solo(&next);
            if was_solo != is_solo {
                events.push(StoreEvent::SoloChanged(is_solo));
            }
            *guard = Arc::new(next);
            self.revision.store(revision, Ordering::Release);
            (result, events)
        };
        self.emit(events);
        Ok(result)
    }

    fn write_cameras<R>(
        &self,
        f: impl FnOnce(&mut Vec<Camera>) -> SceneResult<(R, Vec<StoreEvent>)>,
    ) -> SceneResult<R> {
        let (result, events) = {
            let mut guard = self.cameras.write();
            let mut next = guard.as_ref().clone();
            let out = f(&mut next)?;
            *guard = Arc::new(next);
            out
        };
        self.emit(events);
        Ok(result)
    }

    fn write_signals<R>(&self, f: impl FnOnce(&mut Vec<Signal>) -> SceneResult<R>) -> SceneResult<R> {
        let result = {
            let mut guard = self.signals.write();
            let mut next = guard.as_ref().clone();
            let out = f(&mut next)?;
            *guard = Arc::new(next);
            out
        };
        self.emit(vec![StoreEvent::SignalsChanged]);
        Ok(result)
    }

    fn position(lights: &[Light], id: &LightId) -> SceneResult<usize> {
        lights.iter().position(|l| &l.id == id).ok_or_else(|| {
            log::warn!("Light not found: {}", id);
            SceneError::LightNotFound(id.clone())
        })
    }

    fn sanitized(mut light: Light) -> Light {
        let changed = light.sanitize();
        if !changed.is_empty() {
            log::warn!("Clamped out-of-range fields on {}: {:?}", light.id, changed);
        }
        light
    }

    // ------------------------------------------------------------------
    // Light CRUD
    // ------------------------------------------------------------------

    /// Append a light; an empty or taken id is replaced with a fresh one
    pub fn add_light(&self, light: Light) -> LightId {
        let added = self.write_lights(|lights, revision| {
            let mut light = Self::sanitized(light);
            if light.id.is_empty() || lights.iter().any(|l| l.id == light.id) {
                let fresh = self.ids.next_unused("light", |k| lights.iter().any(|l| l.id.as_str() == k));
                light.id = LightId::new(fresh);
            }
            light.ts = revision;
            let id = light.id.clone();
            log::debug!("Added light {} ({})", id, light.kind.type_name());
            lights.push(light);
            Ok((id.clone(), vec![StoreEvent::LightAdded(id)]))
        });
        // The closure above never fails
        added.unwrap_or_default()
    }

    /// Apply `edit` to the light with `id`
    ///
    /// The id cannot change; the result is sanitized before it is stored.
    pub fn update_light(&self, id: &LightId, edit: impl FnOnce(&mut Light)) -> SceneResult<()> {
        self.write_lights(|lights, revision| {
            let index = Self::position(lights, id)?;
            let mut light = lights[index].clone();
            edit(&mut light);
            light.id = id.clone();
            light.ts = revision;
            lights[index] = Self::sanitized(light);
            log::debug!("Updated light {}", id);
            Ok(((), vec![StoreEvent::LightUpdated(id.clone())]))
        })
    }

    /// Spread a JSON object of camelCase fields over the light with `id`
    pub fn merge_light(&self, id: &LightId, patch: &serde_json::Value) -> SceneResult<()> {
        let fields = patch
            .as_object()
            .ok_or_else(|| SceneError::InvalidPatch("expected a JSON object".to_string()))?;
        if let Some(patch_id) = fields.get("id") {
            if patch_id.as_str() != Some(id.as_str()) {
                return Err(SceneError::InvalidPatch(format!("cannot change id of {}", id)));
            }
        }

        self.write_lights(|lights, revision| {
            let index = Self::position(lights, id)?;
            let mut merged = serde_json::to_value(&lights[index])?;
            if let Some(target) = merged.as_object_mut() {
                for (key, value) in fields {
                    target.insert(key.clone(), value.clone());
                }
            }
            let mut light: Light =
                serde_json::from_value(merged).map_err(|e| SceneError::InvalidPatch(e.to_string()))?;
            light.ts = revision;
            lights[index] = Self::sanitized(light);
            log::debug!("Merged {} field(s) into light {}", fields.len(), id);
            Ok(((), vec![StoreEvent::LightUpdated(id.clone())]))
        })
    }

    /// Append a copy of `id` with a fresh id and " (copy)" name suffix
    pub fn duplicate_light(&self, id: &LightId) -> SceneResult<LightId> {
        self.write_lights(|lights, revision| {
            let index = Self::position(lights, id)?;
            let fresh = self.ids.next_unused("light", |k| lights.iter().any(|l| l.id.as_str() == k));
            let mut copy = lights[index].duplicate_as(LightId::new(fresh));
            copy.ts = revision;
            let new_id = copy.id.clone();
            log::debug!("Duplicated light {} as {}", id, new_id);
            lights.push(copy);
            Ok((new_id.clone(), vec![StoreEvent::LightAdded(new_id)]))
        })
    }

    /// Remove a light
    ///
    /// Removing the last soloed light ends solo mode, so every light falls
    /// back to its own `visible` flag.
    pub fn delete_light(&self, id: &LightId) -> SceneResult<Light> {
        self.write_lights(|lights, _| {
            let index = Self::position(lights, id)?;
            let removed = lights.remove(index);
            let mut events = vec![StoreEvent::LightRemoved(id.clone())];
            if removed.selected {
                events.push(StoreEvent::SelectionChanged(None));
            }
            log::debug!("Deleted light {}", id);
            Ok((removed, events))
        })
    }

    /// Replace the whole light list at once
    pub fn replace_lights(&self, lights: Vec<Light>) {
        let result = self.write_lights(|current, revision| {
            let mut seen = HashSet::new();
            let mut next = Vec::with_capacity(lights.len());
            for light in lights {
                let mut light = Self::sanitized(light);
                if light.id.is_empty() || !seen.insert(light.id.clone()) {
                    let fresh = self.ids.next_unused("light", |k| seen.contains(&LightId::from(k)));
                    light.id = LightId::new(fresh);
                    seen.insert(light.id.clone());
                }
                light.ts = revision;
                next.push(light);
            }
            *current = next;
            Ok(((), vec![StoreEvent::LightsReplaced]))
        });
        if let Err(e) = result {
            log::error!("Failed to replace lights: {}", e);
        }
    }

    // ------------------------------------------------------------------
    // Visibility and solo
    // ------------------------------------------------------------------

    /// Solo `id`, or end solo mode if `id` is already soloed
    ///
    /// Soloing forces the light's own `visible` on. Other lights keep
    /// their flags; only their effective visibility changes.
    pub fn toggle_solo(&self, id: &LightId) -> SceneResult<bool> {
        self.write_lights(|lights, revision| {
            let index = Self::position(lights, id)?;
            let unsolo = lights[index].solo;

            let mut events = Vec::new();
            for (i, light) in lights.iter_mut().enumerate() {
                let solo = !unsolo && i == index;
                let visible = if solo { true } else { light.visible };
                if light.solo != solo || light.visible != visible {
                    light.solo = solo;
                    light.visible = visible;
                    light.ts = revision;
                    events.push(StoreEvent::LightUpdated(light.id.clone()));
                }
            }
            log::debug!("Solo {} -> {}", id, !unsolo);
            Ok((!unsolo, events))
        })
    }

    pub fn set_light_visible(&self, id: &LightId, visible: bool) -> SceneResult<()> {
        self.update_light(id, |light| light.visible = visible)
    }

    /// Flip a light's own `visible` flag; returns the new value
    pub fn toggle_light_visibility(&self, id: &LightId) -> SceneResult<bool> {
        let mut visible = false;
        self.update_light(id, |light| {
            light.visible = !light.visible;
            visible = light.visible;
        })?;
        Ok(visible)
    }

    // ------------------------------------------------------------------
    // Selection
    // ------------------------------------------------------------------

    fn set_selection(&self, id: Option<&LightId>) -> SceneResult<()> {
        self.write_lights(|lights, revision| {
            if let Some(id) = id {
                Self::position(lights, id)?;
            }
            let mut events = Vec::new();
            for light in lights.iter_mut() {
                let selected = Some(&light.id) == id;
                if light.selected != selected {
                    light.selected = selected;
                    light.ts = revision;
                }
            }
            events.push(StoreEvent::SelectionChanged(id.cloned()));
            Ok(((), events))
        })
    }

    /// Select one light, deselecting every other
    pub fn select_light(&self, id: &LightId) -> SceneResult<()> {
        self.set_selection(Some(id))
    }

    /// Select `id`, or clear the selection if it is already selected
    pub fn toggle_selection(&self, id: &LightId) -> SceneResult<()> {
        let selected = self.light(id).map(|l| l.selected).ok_or_else(|| {
            log::warn!("Light not found: {}", id);
            SceneError::LightNotFound(id.clone())
        })?;
        if selected {
            self.set_selection(None)
        } else {
            self.set_selection(Some(id))
        }
    }

    pub fn deselect_all(&self) {
        if let Err(e) = self.set_selection(None) {
            log::error!("Failed to clear selection: {}", e);
        }
    }

    pub fn remove_selected_light(&self) -> SceneResult<Light> {
        let selected = self.selected_light().ok_or(SceneError::NothingSelected)?;
        self.delete_light(&selected.id)
    }

    pub fn duplicate_selected_light(&self) -> SceneResult<LightId> {
        let selected = self.selected_light().ok_or(SceneError::NothingSelected)?;
        self.duplicate_light(&selected.id)
    }

    // ------------------------------------------------------------------
    // Cameras
    // ------------------------------------------------------------------

    /// Append a camera; a selected camera takes over the selection
    pub fn add_camera(&self, camera: Camera) -> SceneResult<CameraId> {
        self.write_cameras(|cameras| {
            let mut camera = camera;
            if camera.id.is_empty() || cameras.iter().any(|c| c.id == camera.id) {
                let fresh = self.ids.next_unused("camera", |k| cameras.iter().any(|c| c.id.as_str() == k));
                camera.id = CameraId::new(fresh);
            }
            let id = camera.id.clone();
            let mut events = vec![StoreEvent::CameraAdded(id.clone())];
            if camera.selected {
                for other in cameras.iter_mut() {
                    other.selected = false;
                }
                events.push(StoreEvent::CameraSelected(id.clone()));
            }
            cameras.push(camera);
            normalize_selection(cameras);
            Ok((id, events))
        })
    }

    /// Make `id` the only selected camera
    pub fn select_camera(&self, id: &CameraId) -> SceneResult<()> {
        self.write_cameras(|cameras| {
            if !cameras.iter().any(|c| &c.id == id) {
                log::warn!("Camera not found: {}", id);
                return Err(SceneError::CameraNotFound(id.clone()));
            }
            for camera in cameras.iter_mut() {
                camera.selected = &camera.id == id;
            }
            Ok(((), vec![StoreEvent::CameraSelected(id.clone())]))
        })
    }

    /// Edit the active camera; its id and selection are preserved
    pub fn update_selected_camera(&self, edit: impl FnOnce(&mut Camera)) -> SceneResult<()> {
        self.write_cameras(|cameras| {
            let camera = cameras
                .iter_mut()
                .find(|c| c.selected)
                .ok_or_else(|| SceneError::CameraNotFound(CameraId::from("<selected>")))?;
            let id = camera.id.clone();
            edit(camera);
            camera.id = id.clone();
            camera.selected = true;
            Ok(((), vec![StoreEvent::CameraUpdated(id)]))
        })
    }

    // ------------------------------------------------------------------
    // Signals
    // ------------------------------------------------------------------

    pub fn add_signal(&self, signal: Signal) -> SceneResult<SignalId> {
        self.write_signals(|signals| {
            let mut signal = signal;
            signal.sanitize();
            if signal.id.is_empty() || signals.iter().any(|s| s.id == signal.id) {
                let fresh = self.ids.next_unused("signal", |k| signals.iter().any(|s| s.id.as_str() == k));
                signal.id = SignalId::new(fresh);
            }
            let id = signal.id.clone();
            signals.push(signal);
            Ok(id)
        })
    }

    pub fn remove_signal(&self, id: &SignalId) -> SceneResult<Signal> {
        self.write_signals(|signals| {
            let index = signals
                .iter()
                .position(|s| &s.id == id)
                .ok_or_else(|| SceneError::SignalNotFound(id.clone()))?;
            Ok(signals.remove(index))
        })
    }

    pub fn update_signal(&self, id: &SignalId, edit: impl FnOnce(&mut Signal)) -> SceneResult<()> {
        self.write_signals(|signals| {
            let signal = signals
                .iter_mut()
                .find(|s| &s.id == id)
                .ok_or_else(|| SceneError::SignalNotFound(id.clone()))?;
            edit(signal);
            signal.id = id.clone();
            signal.sanitize();
            Ok(())
        })
    }

    // ------------------------------------------------------------------
    // Bulk
    // ------------------------------------------------------------------

    /// Replace every list with the snapshot's contents
    pub fn restore(&self, snapshot: SceneSnapshot) {
        self.replace_lights(snapshot.lights);

        let mut cameras = snapshot.cameras;
        if cameras.is_empty() {
            cameras.push(Camera::default());
        }
        normalize_selection(&mut cameras);
        *self.cameras.write() = Arc::new(cameras);

        let mut signals = snapshot.signals;
        for signal in signals.iter_mut() {
            signal.sanitize();
        }
        *self.signals.write() = Arc::new(signals);
        self.emit(vec![StoreEvent::SignalsChanged]);
    }
}

impl Default for SceneStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::light::{SolidParams, UmbrellaParams};
    use crate::signal::{Axis, SignalProperty};

    fn solid(id: &str, name: &str) -> Light {
        Light::new(id, name, LightKind::Solid(SolidParams::default()))
    }

    #[test]
    fn test_add_assigns_fresh_id_on_collision() {
        let store = SceneStore::new();
        let a = store.add_light(solid("light-1", "A"));
        let b = store.add_light(solid("light-1", "B"));
        assert_eq!(a.as_str(), "light-1");
        assert_ne!(a, b);
        assert_eq!(store.lights().len(), 2);
    }

    #[test]
    fn test_add_sanitizes() {
        let store = SceneStore::new();
        let mut light = Light::new(
            "u",
            "U",
            LightKind::ProceduralUmbrella(UmbrellaParams { light_sides: 0, ..Default::default() }),
        );
        light.opacity = 3.0;
        let id = store.add_light(light);
        let stored = store.light(&id).unwrap();
        assert_eq!(stored.opacity, 1.0);
        match stored.kind {
            LightKind::ProceduralUmbrella(p) => assert_eq!(p.light_sides, 3),
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_update_unknown_is_error_and_noop() {
        let store = SceneStore::with_default_scene();
        let before = store.lights();
        let revision = store.revision();
        let err = store.update_light(&LightId::from("nope"), |l| l.intensity = 5.0);
        assert!(matches!(err, Err(SceneError::LightNotFound(_))));
        assert!(store.delete_light(&LightId::from("nope")).is_err());
        assert!(Arc::ptr_eq(&before, &store.lights()));
        assert_eq!(store.revision(), revision);
    }

    #[test]
    fn test_snapshot_isolated_from_writes() {
        let store = SceneStore::with_default_scene();
        let id = LightId::from("light-1");
        let before = store.lights();
        store.update_light(&id, |l| l.intensity = 3.0).unwrap();
        assert_eq!(before[0].intensity, 1.0);
        assert_eq!(store.light(&id).unwrap().intensity, 3.0);
    }

    #[test]
    fn test_ts_increases() {
        let store = SceneStore::with_default_scene();
        let id = LightId::from("light-1");
        let t0 = store.light(&id).unwrap().ts;
        store.update_light(&id, |l| l.rotation = 0.5).unwrap();
        let t1 = store.light(&id).unwrap().ts;
        assert!(t1 > t0);
    }

    #[test]
    fn test_update_cannot_change_id() {
        let store = SceneStore::with_default_scene();
        let id = LightId::from("light-1");
        store.update_light(&id, |l| l.id = LightId::from("other")).unwrap();
        assert!(store.light(&id).is_some());
    }

    #[test]
    fn test_merge_light() {
        let store = SceneStore::with_default_scene();
        let id = LightId::from("light-1");
        store
            .merge_light(&id, &serde_json::json!({ "intensity": 2.5, "lightDistance": 0.6 }))
            .unwrap();
        let light = store.light(&id).unwrap();
        assert_eq!(light.intensity, 2.5);
        match light.kind {
            LightKind::ProceduralScrim(p) => assert_eq!(p.light_distance, 0.6),
            _ => unreachable!(),
        }

        let err = store.merge_light(&id, &serde_json::json!({ "id": "light-9" }));
        assert!(matches!(err, Err(SceneError::InvalidPatch(_))));
        let err = store.merge_light(&id, &serde_json::json!({ "intensity": "bright" }));
        assert!(matches!(err, Err(SceneError::InvalidPatch(_))));
        assert_eq!(store.light(&id).unwrap().intensity, 2.5);
    }

    #[test]
    fn test_merge_changes_type() {
        let store = SceneStore::with_default_scene();
        let id = LightId::from("light-1");
        store
            .merge_light(&id, &serde_json::json!({ "type": "solid", "color": "#00ff00" }))
            .unwrap();
        match store.light(&id).unwrap().kind {
            LightKind::Solid(p) => assert_eq!(p.color.to_hex(), "#00ff00"),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_selection_is_single() {
        let store = SceneStore::new();
        let a = store.add_light(solid("a", "A"));
        let b = store.add_light(solid("b", "B"));
        store.select_light(&a).unwrap();
        store.select_light(&b).unwrap();
        let selected: Vec<_> = store.lights().iter().filter(|l| l.selected).map(|l| l.id.clone()).collect();
        assert_eq!(selected, vec![b.clone()]);

        store.toggle_selection(&b).unwrap();
        assert!(store.selected_light().is_none());
        assert!(matches!(store.remove_selected_light(), Err(SceneError::NothingSelected)));
    }

    #[test]
    fn test_selected_helpers() {
        let store = SceneStore::new();
        let a = store.add_light(solid("a", "A"));
        store.select_light(&a).unwrap();
        let copy = store.duplicate_selected_light().unwrap();
        assert_eq!(store.light(&copy).unwrap().name, "A (copy)");
        store.remove_selected_light().unwrap();
        assert!(store.light(&a).is_none());
        assert_eq!(store.lights().len(), 1);
    }

    #[test]
    fn test_toggle_visibility() {
        let store = SceneStore::with_default_scene();
        let id = LightId::from("light-1");
        assert!(!store.toggle_light_visibility(&id).unwrap());
        assert!(!store.is_effectively_visible(&id).unwrap());
        store.set_light_visible(&id, true).unwrap();
        assert!(store.is_effectively_visible(&id).unwrap());
    }

    #[test]
    fn test_events_scoped() {
        let store = SceneStore::new();
        let rx = store.subscribe();
        let id = store.add_light(solid("a", "A"));
        store.update_light(&id, |l| l.intensity = 2.0).unwrap();
        store.toggle_solo(&id).unwrap();

        let events: Vec<_> = rx.try_iter().collect();
        assert_eq!(events[0], StoreEvent::LightAdded(id.clone()));
        assert_eq!(events[1], StoreEvent::LightUpdated(id.clone()));
        assert!(events.contains(&StoreEvent::SoloChanged(true)));
    }

    #[test]
    fn test_dropped_subscriber_is_pruned() {
        let store = SceneStore::new();
        drop(store.subscribe());
        store.add_light(solid("a", "A"));
        assert!(store.subscribers.lock().is_empty());
    }

    #[test]
    fn test_cameras() {
        let store = SceneStore::new();
        assert_eq!(store.selected_camera().unwrap().id.as_str(), "default");

        let id = store.add_camera(Camera::new("top", "Top", [0.0, 8.0, 0.0])).unwrap();
        assert_eq!(store.selected_camera().unwrap().id.as_str(), "default");

        store.select_camera(&id).unwrap();
        store.update_selected_camera(|c| c.position = [1.0, 2.0, 3.0]).unwrap();
        let cam = store.selected_camera().unwrap();
        assert_eq!(cam.id, id);
        assert_eq!(cam.position, [1.0, 2.0, 3.0]);
        assert_eq!(store.cameras().iter().filter(|c| c.selected).count(), 1);

        assert!(matches!(
            store.select_camera(&CameraId::from("missing")),
            Err(SceneError::CameraNotFound(_))
        ));
    }

    #[test]
    fn test_signals_crud() {
        let store = SceneStore::with_default_scene();
        let target = LightId::from("light-1");
        let id = store
            .add_signal(Signal::new("s1", target.clone(), SignalProperty::Rotation, Axis::Z))
            .unwrap();
        store.add_signal(Signal::new("s2", "other", SignalProperty::Scale, Axis::X)).unwrap();
        assert_eq!(store.signals_for_target(&target).len(), 1);

        store.update_signal(&id, |s| s.end = 3.0).unwrap();
        assert_eq!(store.signals_for_target(&target)[0].end, 3.0);

        store.remove_signal(&id).unwrap();
        assert!(store.signals_for_target(&target).is_empty());
        assert!(matches!(store.remove_signal(&id), Err(SceneError::SignalNotFound(_))));
    }

    #[test]
    fn test_snapshot_restore() {
        let store = SceneStore::with_default_scene();
        store.add_light(solid("b", "B"));
        let snapshot = store.snapshot();

        let other = SceneStore::from_snapshot(snapshot.clone());
        assert_eq!(other.lights().len(), 2);
        assert_eq!(other.cameras().len(), 1);
        assert_eq!(other.snapshot().lights[1].name, snapshot.lights[1].name);
    }
}

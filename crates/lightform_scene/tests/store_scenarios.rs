//! Cross-module scenarios for the scene store

use lightform_scene::persist::{load_scene, save_scene, FileStorage, KeyValueStorage, LIGHTS_KEY};
use lightform_scene::{effective_visibility, Light, LightId, LightKind, SceneStore, SolidParams};

fn solid(name: &str) -> Light {
    Light::new("", name, LightKind::Solid(SolidParams::default()))
}

/// Either nothing is soloed and visibility follows `visible`, or something
/// is soloed and visibility follows `solo`.
fn assert_solo_policy(store: &SceneStore) {
    let lights = store.lights();
    let solo = lights.iter().any(|l| l.solo);
    assert_eq!(solo, store.is_solo());
    for light in lights.iter() {
        let expected = if solo { light.solo } else { light.visible };
        assert_eq!(effective_visibility(light, store.is_solo()), expected);
        assert_eq!(store.is_effectively_visible(&light.id).unwrap(), expected);
    }
}

#[test]
fn test_add_and_solo_scenario() {
    let store = SceneStore::new();
    let a = store.add_light(solid("A"));
    let b = store.add_light(solid("B"));
    assert!(store.is_effectively_visible(&a).unwrap());
    assert!(store.is_effectively_visible(&b).unwrap());
    assert!(!store.is_solo());

    assert!(store.toggle_solo(&b).unwrap());
    assert!(!store.is_effectively_visible(&a).unwrap());
    assert!(store.is_effectively_visible(&b).unwrap());
    assert!(store.is_solo());

    assert!(!store.toggle_solo(&b).unwrap());
    assert!(store.is_effectively_visible(&a).unwrap());
    assert!(store.is_effectively_visible(&b).unwrap());
    assert!(!store.is_solo());
}

#[test]
fn test_solo_policy_holds_over_sequences() {
    let store = SceneStore::new();
    let ids: Vec<LightId> = (0..4).map(|i| store.add_light(solid(&format!("L{}", i)))).collect();
    store.set_light_visible(&ids[2], false).unwrap();

    // Deterministic pseudo-random walk over toggles and deletes
    let mut state = 7u32;
    let mut live = ids.clone();
    for step in 0..60 {
        state = state.wrapping_mul(1_103_515_245).wrapping_add(12_345);
        let pick = &live[(state >> 16) as usize % live.len()];
        if step % 17 == 16 && live.len() > 1 {
            let id = pick.clone();
            store.delete_light(&id).unwrap();
            live.retain(|l| l != &id);
        } else if step % 5 == 4 {
            store.toggle_light_visibility(pick).unwrap();
        } else {
            store.toggle_solo(pick).unwrap();
        }
        assert_solo_policy(&store);
    }
}

#[test]
fn test_solo_forces_visible_and_unsolo_restores_flags() {
    let store = SceneStore::new();
    let a = store.add_light(solid("A"));
    let b = store.add_light(solid("B"));
    store.set_light_visible(&a, false).unwrap();
    store.set_light_visible(&b, false).unwrap();

    store.toggle_solo(&a).unwrap();
    assert!(store.light(&a).unwrap().visible);
    assert!(store.is_effectively_visible(&a).unwrap());

    store.toggle_solo(&a).unwrap();
    assert!(store.is_effectively_visible(&a).unwrap());
    assert!(!store.is_effectively_visible(&b).unwrap());
}

#[test]
fn test_deleting_soloed_light_ends_solo() {
    let store = SceneStore::new();
    let a = store.add_light(solid("A"));
    let b = store.add_light(solid("B"));
    store.toggle_solo(&b).unwrap();
    store.delete_light(&b).unwrap();
    assert!(!store.is_solo());
    assert!(store.is_effectively_visible(&a).unwrap());
}

#[test]
fn test_duplicate_identity() {
    let store = SceneStore::with_default_scene();
    let source_id = LightId::from("light-1");
    store
        .update_light(&source_id, |l| {
            l.solo = true;
            l.selected = true;
            l.intensity = 2.5;
            l.rotation = 0.4;
        })
        .unwrap();
    let source = store.light(&source_id).unwrap();

    let copy_id = store.duplicate_light(&source_id).unwrap();
    let copy = store.light(&copy_id).unwrap();

    let ids: Vec<_> = store.lights().iter().map(|l| l.id.clone()).collect();
    assert_eq!(ids.iter().filter(|id| **id == copy_id).count(), 1);
    assert_ne!(copy_id, source_id);
    assert_eq!(copy.name, format!("{} (copy)", source.name));
    assert!(!copy.solo);
    assert!(!copy.selected);

    let mut expected = source.clone();
    expected.id = copy.id.clone();
    expected.name = copy.name.clone();
    expected.solo = false;
    expected.selected = false;
    expected.ts = copy.ts;
    assert_eq!(copy, expected);
}

#[test]
fn test_not_found_leaves_store_untouched() {
    let store = SceneStore::with_default_scene();
    let before = store.snapshot();
    let missing = LightId::from("missing");

    assert!(store.update_light(&missing, |l| l.intensity = 9.0).is_err());
    assert!(store.duplicate_light(&missing).is_err());
    assert!(store.delete_light(&missing).is_err());
    assert!(store.toggle_solo(&missing).is_err());
    assert!(store.select_light(&missing).is_err());
    assert!(store.toggle_selection(&missing).is_err());

    assert_eq!(store.snapshot(), before);
}

#[test]
fn test_file_persistence_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let storage = FileStorage::open(dir.path().join("state")).unwrap();

    let store = SceneStore::with_default_scene();
    store.add_light(solid("B"));
    save_scene(&storage, &store.snapshot()).unwrap();

    let loaded = load_scene(&storage).unwrap().unwrap();
    let restored = SceneStore::from_snapshot(loaded);
    assert_eq!(restored.lights().len(), 2);
    assert_eq!(restored.lights()[1].name, "B");
}

#[test]
fn test_file_persistence_migrates_v1() {
    let dir = tempfile::tempdir().unwrap();
    let storage = FileStorage::open(dir.path()).unwrap();
    storage
        .set(
            LIGHTS_KEY,
            r##"{
                "version": 1,
                "state": [
                    { "id": "light-1", "name": "Key", "type": "gradient", "colorA": "#fff", "colorB": "#000",
                      "shape": "rect", "distance": 4, "phi": 1.5707963267948966, "theta": 0, "scale": -1 }
                ]
            }"##,
        )
        .unwrap();

    let snapshot = load_scene(&storage).unwrap().unwrap();
    let store = SceneStore::from_snapshot(snapshot);
    let light = store.light(&LightId::from("light-1")).unwrap();
    assert_eq!(light.kind.type_name(), "gradient");
    assert_eq!(light.scale, 0.0);
    assert_eq!(store.cameras().len(), 1);
}

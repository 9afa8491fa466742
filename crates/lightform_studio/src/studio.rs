//! Headless studio session
//!
//! One run loads the persisted scene, steps the frame loop, renders the
//! environment cubemap, exports it, writes the generated code and saves
//! the scene back. A failed export aborts the run before anything is
//! written to storage.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use lightform_codegen::{generate, CodegenOptions};
use lightform_env::{ComposeConfig, Compositor, CubeRenderer, Cubemap, EnvironmentScene};
use lightform_export::{export_cubemap, save};
use lightform_scene::{load_scene, save_scene, FileStorage, SceneStore};
use lightform_shade::{FileTextureLoader, TextureCache};

use crate::config::StudioConfig;
use crate::error::StudioResult;

/// Longest wait for outstanding texture decodes before the export frame
const TEXTURE_TIMEOUT: Duration = Duration::from_secs(30);

/// What a run produced
#[derive(Debug, Clone, PartialEq)]
pub struct StudioReport {
    pub lights: usize,
    pub frames: u32,
    pub export_path: PathBuf,
    pub code_path: Option<PathBuf>,
}

/// A loaded scene plus everything needed to render it
pub struct Studio {
    config: StudioConfig,
    storage: FileStorage,
    store: SceneStore,
    textures: TextureCache,
    compositor: Compositor,
}

impl Studio {
    /// Open storage and load the persisted scene, or the default one
    pub fn open(config: StudioConfig) -> StudioResult<Self> {
        let storage = FileStorage::open(&config.storage.dir)?;
        let store = match load_scene(&storage)? {
            Some(snapshot) => {
                log::info!("Loaded {} light(s) from {}", snapshot.lights.len(), config.storage.dir.display());
                SceneStore::from_snapshot(snapshot)
            }
            None => {
                log::info!("No saved scene, starting from the default scene");
                SceneStore::with_default_scene()
            }
        };

        let textures = TextureCache::new(Arc::new(FileTextureLoader::new(&config.environment.texture_root)));
        let compositor = Compositor::new(ComposeConfig {
            background: config.environment.background,
            falloff: config.environment.falloff.kind(),
            animate: config.animation.enabled,
        });

        Ok(Self { config, storage, store, textures, compositor })
    }

    pub fn store(&self) -> &SceneStore {
        &self.store
    }

    pub fn config(&self) -> &StudioConfig {
        &self.config
    }

    /// Compose one frame at playback `time`
    pub fn frame(&self, time: f64) -> EnvironmentScene {
        self.textures.poll();
        let lights = self.store.lights();
        let signals = self.store.signals();
        self.compositor.compose(&lights, &signals, &self.textures, time)
    }

    /// Step the frame loop, then compose the export frame
    ///
    /// Texture lights still decoding after the loop are waited for so the
    /// exported frame is complete.
    pub fn simulate(&self) -> EnvironmentScene {
        let frames = self.config.animation.frames;
        for frame in 0..frames {
            let scene = self.frame(self.config.animation.time_of(frame));
            if !scene.is_complete() {
                log::debug!("Frame {}: {} panel(s) deferred", frame, scene.deferred.len());
            }
        }

        let time = self.config.animation.time_of(frames);
        let scene = self.frame(time);
        if scene.is_complete() {
            return scene;
        }
        if !self.textures.wait_idle(TEXTURE_TIMEOUT) {
            log::warn!("Textures still decoding after {:?}", TEXTURE_TIMEOUT);
        }
        self.frame(time)
    }

    /// Render the export frame into a cubemap
    pub fn render(&self) -> StudioResult<Cubemap> {
        let scene = self.simulate();
        log::info!("Rendering {} panel(s)", scene.panels.len());
        Ok(CubeRenderer::new(self.config.environment.face_size).render(&scene)?)
    }

    /// Write the generated scene code, if enabled
    pub fn write_code(&self) -> StudioResult<Option<PathBuf>> {
        if !self.config.code.enabled {
            return Ok(None);
        }
        let options = CodegenOptions {
            resolution: self.config.code.resolution,
            background: self.config.environment.background,
        };
        let code = generate(&self.store.lights(), &options);
        let path = self.config.code.path.clone();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&path, code)?;
        log::info!("Wrote scene code to {}", path.display());
        Ok(Some(path))
    }

    /// Persist the current scene
    pub fn save(&self) -> StudioResult<()> {
        save_scene(&self.storage, &self.store.snapshot())?;
        Ok(())
    }

    /// Full session: render, export, write code, save
    pub fn run(&self) -> StudioResult<StudioReport> {
        let cubemap = self.render()?;
        let exported = export_cubemap(&cubemap, &self.config.export.options())?;
        let export_path = save(&exported, &self.config.export.dir)?;
        let code_path = self.write_code()?;
        self.save()?;

        Ok(StudioReport {
            lights: self.store.lights().len(),
            frames: self.config.animation.frames,
            export_path,
            code_path,
        })
    }
}

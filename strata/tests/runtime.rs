mod common;

use common::{CountingBackend, CountingLoader, TIMEOUT, quad, wait_for};
use std::sync::Arc;
use strata::assets::{AssetDatabase, MaterialAsset, ModelAsset, TextureAsset};
use strata::scene::{LoadedScene, Scene, Transform};
use strata::{GpuJobs, Runtime};

fn runtime(
    assets: &Arc<AssetDatabase>,
    scene: &Arc<LoadedScene>,
    loader: &CountingLoader,
) -> Runtime<CountingBackend> {
    Runtime::builder()
        .assets(assets.clone())
        .scene(scene.clone())
        .loader(Box::new(loader.clone()))
        .loader_threads(2)
        .batching(true)
        .build()
        .unwrap()
}

fn populate(assets: &AssetDatabase) -> Scene {
    let material = assets
        .import("materials/stone.mat", MaterialAsset::builder().name("Stone").build())
        .unwrap();
    let model = assets
        .import("models/wall.model", ModelAsset::single(quad(), material))
        .unwrap();

    let mut scene = Scene::new("Walls");
    let shared = scene.add_transform(Transform::default());
    for i in 0..4 {
        scene.add_entity(
            strata::scene::Entity::new(format!("Wall {i}"))
                .with_transform(shared)
                .with_mesh_renderer(strata::scene::MeshRenderer::new(model)),
        );
    }
    scene
}

#[test]
fn scene_load_builds_draw_calls() {
    let (assets, scene, loader) = (AssetDatabase::new(), LoadedScene::new(), CountingLoader::default());
    let runtime = runtime(&assets, &scene, &loader);
    let gpu = common::gpu_thread();
    let backend = CountingBackend::default();

    scene.load(populate(&assets));
    assert!(runtime.draw_call_worker().wait_until_idle(TIMEOUT));

    let stats = runtime.draw_calls().stats();
    assert_eq!(stats.draw_calls, 1);
    assert_eq!(stats.vertices, 16);
    assert_eq!(stats.triangles, 8);

    assert_eq!(
        runtime.process_gpu_jobs(&gpu, &backend),
        GpuJobs {
            textures: 0,
            mesh_buffers: 1,
        }
    );
    let list = runtime.draw_calls().lock();
    assert_eq!(list[0].mesh_buffer().map(|b| **b), Some(16));
}

#[test]
fn scene_unload_clears_draw_calls() {
    let (assets, scene, loader) = (AssetDatabase::new(), LoadedScene::new(), CountingLoader::default());
    let runtime = runtime(&assets, &scene, &loader);

    scene.load(populate(&assets));
    assert!(runtime.draw_call_worker().wait_until_idle(TIMEOUT));
    assert!(!runtime.draw_calls().is_empty());

    scene.unload();
    assert!(runtime.draw_calls().is_empty());
    assert!(runtime.draw_call_worker().wait_until_idle(TIMEOUT));
    assert!(runtime.draw_calls().is_empty());
}

#[test]
fn model_changes_trigger_rebuilds() {
    let (assets, scene, loader) = (AssetDatabase::new(), LoadedScene::new(), CountingLoader::default());
    let runtime = runtime(&assets, &scene, &loader);
    let worker = runtime.draw_call_worker();

    scene.load(populate(&assets));
    assert!(worker.wait_until_idle(TIMEOUT));
    let before = worker.rebuild_count();

    let material = assets
        .import("materials/glass.mat", MaterialAsset::builder().name("Glass").transparent(true).build())
        .unwrap();
    assert!(worker.wait_until_idle(TIMEOUT));
    assert!(worker.rebuild_count() > before);

    let model = assets.id_of("models/wall.model").unwrap();
    assets
        .reimport(model, ModelAsset::single(quad(), material))
        .unwrap();
    assert!(worker.wait_until_idle(TIMEOUT));

    // all four walls are transparent now and no longer merged
    assert_eq!(runtime.draw_calls().len(), 4);
}

#[test]
fn texture_lifecycle() {
    let (assets, scene, loader) = (AssetDatabase::new(), LoadedScene::new(), CountingLoader::default());
    let runtime = runtime(&assets, &scene, &loader);
    let gpu = common::gpu_thread();
    let backend = CountingBackend::default();

    let texture = assets
        .import("textures/brick.png", TextureAsset::new("textures/brick.png"))
        .unwrap();
    assert!(wait_for(|| runtime.textures().pending_uploads() == 1));

    assert_eq!(runtime.process_gpu_jobs(&gpu, &backend).textures, 1);
    assert_eq!(runtime.texture(texture).as_deref(), Some(&(4, 4)));

    assets.remove(texture.id()).unwrap();
    assert!(runtime.texture(texture).is_none());
    assert_eq!(loader.load_count(), 1);
}

#[test]
fn removed_texture_is_not_uploaded_later() {
    let (assets, scene, loader) = (AssetDatabase::new(), LoadedScene::new(), CountingLoader::default());
    let runtime = runtime(&assets, &scene, &loader);
    let gpu = common::gpu_thread();
    let backend = CountingBackend::default();

    let texture = assets
        .import("textures/brick.png", TextureAsset::new("textures/brick.png"))
        .unwrap();
    assert!(wait_for(|| runtime.textures().pending_uploads() == 1));

    // decoded, not yet uploaded
    assets.remove(texture.id()).unwrap();

    assert_eq!(runtime.process_gpu_jobs(&gpu, &backend).textures, 0);
    assert!(runtime.texture(texture).is_none());
    assert_eq!(runtime.textures().loaded_count(), 0);
    assert_eq!(backend.textures.load(std::sync::atomic::Ordering::SeqCst), 0);
    assert!(!runtime.textures().is_requested("textures/brick.png"));
}

#[test]
fn reimport_all_reloads_textures() {
    let (assets, scene, loader) = (AssetDatabase::new(), LoadedScene::new(), CountingLoader::default());
    let texture = assets
        .import("textures/brick.png", TextureAsset::new("textures/brick.png"))
        .unwrap();

    // textures already in the database are requested on startup
    let runtime = runtime(&assets, &scene, &loader);
    let gpu = common::gpu_thread();
    let backend = CountingBackend::default();

    assert!(wait_for(|| runtime.textures().pending_uploads() == 1));
    runtime.process_gpu_jobs(&gpu, &backend);
    assert!(runtime.texture(texture).is_some());

    scene.load(populate(&assets));
    assert!(runtime.draw_call_worker().wait_until_idle(TIMEOUT));

    assets.reimport_all();
    assert!(runtime.texture(texture).is_none());

    assert!(wait_for(|| runtime.textures().pending_uploads() == 1));
    runtime.process_gpu_jobs(&gpu, &backend);
    assert!(runtime.texture(texture).is_some());
    assert_eq!(loader.load_count(), 2);

    assert!(runtime.draw_call_worker().wait_until_idle(TIMEOUT));
    assert_eq!(runtime.draw_calls().len(), 1);
}

#[test]
fn dropping_the_runtime_unsubscribes() {
    let (assets, scene, loader) = (AssetDatabase::new(), LoadedScene::new(), CountingLoader::default());
    let runtime = runtime(&assets, &scene, &loader);
    assert_eq!(assets.events().subscriber_count(), 1);

    drop(runtime);
    assert_eq!(assets.events().subscriber_count(), 0);

    // nothing left to react
    assets
        .import("textures/late.png", TextureAsset::new("textures/late.png"))
        .unwrap();
    scene.load(Scene::new("Late"));
    assert_eq!(loader.load_count(), 0);
}

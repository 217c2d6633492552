//! End-to-end scene behaviour against the headless backend.

use approx::assert_relative_eq;
use glasscard::{
    CardCatalog, CardOverrides, Color, DrawRecord, Effect, HeadlessHost, HeadlessRenderer,
    HostSurface, LifecycleState, Release, RenderDestination, Renderer, RotationDegrees,
    SceneConfig, SceneLifecycle,
};

fn scene() -> SceneLifecycle<HeadlessRenderer> {
    SceneLifecycle::new(CardCatalog::base_card(), SceneConfig::new())
}

fn presented(scene: &SceneLifecycle<HeadlessRenderer>) -> usize {
    scene.renderer().map_or(0, HeadlessRenderer::frames_presented)
}

#[test]
fn attach_renders_one_anti_aliased_frame() {
    let mut host = HeadlessHost::new(800, 600);
    let mut scene = scene();
    scene.attach(&mut host).unwrap();

    assert_eq!(scene.state(), LifecycleState::Attached);
    assert_eq!(host.outputs().len(), 1);
    assert_eq!(host.events().resize_listener_count(), 1);
    assert_eq!(presented(&scene), 1);

    let renderer = scene.renderer().unwrap();
    assert_eq!(
        renderer.effects(),
        vec![Effect::SmaaEdges, Effect::SmaaWeights, Effect::SmaaBlend]
    );
    assert!(matches!(
        renderer.draws().last(),
        Some(DrawRecord::Effect {
            destination: RenderDestination::Screen,
            ..
        })
    ));
    assert!(matches!(
        renderer.draws().first(),
        Some(DrawRecord::Scene {
            destination: RenderDestination::Target(_),
            ..
        })
    ));
}

#[test]
fn camera_starts_from_host_aspect_and_distance() {
    let mut host = HeadlessHost::new(800, 600);
    let mut scene = scene();
    scene.attach(&mut host).unwrap();

    let camera = scene.camera().unwrap();
    assert_relative_eq!(camera.aspect, 800.0 / 600.0);
    assert_eq!(camera.fov, 50.0);
    assert_eq!(camera.position.z, 6.0);
}

#[test]
fn rotation_update_renders_exactly_once() {
    let mut host = HeadlessHost::new(800, 600);
    let mut scene = scene();
    scene.attach(&mut host).unwrap();

    scene.set_rotation(RotationDegrees::new(30.0, -10.0, 5.0));

    assert_eq!(presented(&scene), 2);
    let transforms = scene.renderer().unwrap().last_scene_transforms().unwrap();
    assert_eq!(transforms.len(), 1);
    assert_relative_eq!(transforms[0].rotation.x, 30f32.to_radians());
    assert_relative_eq!(transforms[0].rotation.y, (-10f32).to_radians());
    assert_relative_eq!(transforms[0].rotation.z, 5f32.to_radians());
}

#[test]
fn rotation_before_attach_is_used_by_attach() {
    let mut host = HeadlessHost::new(800, 600);
    let mut scene = scene();
    scene.set_rotation(RotationDegrees::new(0.0, 45.0, 0.0));
    assert_eq!(scene.frames_rendered(), 0);

    scene.attach(&mut host).unwrap();
    let transforms = scene.renderer().unwrap().last_scene_transforms().unwrap();
    assert_relative_eq!(transforms[0].rotation.y, 45f32.to_radians());
    assert_eq!(transforms[0].rotation.x, 0.0);
}

#[test]
fn resize_updates_aspect_and_renders() {
    let mut host = HeadlessHost::new(800, 600);
    let mut scene = scene();
    scene.attach(&mut host).unwrap();

    assert!(host.set_client_size(1920, 1080));
    scene.handle_resize(&host);

    assert_eq!(presented(&scene), 2);
    assert_relative_eq!(scene.camera().unwrap().aspect, 1920.0 / 1080.0);
    assert_relative_eq!(
        scene.renderer().unwrap().last_camera_aspect().unwrap(),
        1920.0 / 1080.0
    );
    assert_eq!(scene.pipeline().unwrap().resolution(), (1920, 1080));
}

#[test]
fn zero_height_resize_is_skipped() {
    let mut host = HeadlessHost::new(800, 600);
    let mut scene = scene();
    scene.attach(&mut host).unwrap();

    host.set_client_size(800, 0);
    scene.handle_resize(&host);

    assert_eq!(presented(&scene), 1);
    assert_relative_eq!(scene.camera().unwrap().aspect, 800.0 / 600.0);
}

#[test]
fn high_dpi_hosts_render_at_device_resolution() {
    let mut host = HeadlessHost::new(800, 600).with_pixel_ratio(2.0);
    let mut scene = scene();
    scene.attach(&mut host).unwrap();

    let renderer = scene.renderer().unwrap();
    assert_eq!(renderer.drawing_buffer_size(), (1600, 1200));
    assert!(renderer.target_sizes().iter().all(|&size| size == (1600, 1200)));
}

#[test]
fn detach_releases_everything_and_ignores_later_events() {
    let mut host = HeadlessHost::new(800, 600);
    let mut scene = scene();
    scene.attach(&mut host).unwrap();
    assert!(scene.renderer().unwrap().live_resources() > 0);

    scene.detach(&mut host);

    assert_eq!(scene.state(), LifecycleState::Detached);
    assert!(host.outputs().is_empty());
    assert!(!host.events().has_resize_listeners());
    assert!(scene.renderer().is_none());
    assert!(scene.card().is_none());

    let frames = scene.frames_rendered();
    host.set_client_size(1024, 768);
    scene.handle_resize(&host);
    scene.set_rotation(RotationDegrees::new(10.0, 10.0, 10.0));
    assert_eq!(scene.frames_rendered(), frames);

    // Second detach and re-attach are both no-ops.
    scene.detach(&mut host);
    scene.attach(&mut host).unwrap();
    assert_eq!(scene.state(), LifecycleState::Detached);
    assert_eq!(host.renderers_created(), 1);
}

#[test]
fn detach_releases_pipeline_then_renderer_then_card_then_output() {
    let mut host = HeadlessHost::new(800, 600);
    let mut scene = scene();
    scene.attach(&mut host).unwrap();
    let frame = scene.request_frame(&mut host).unwrap();
    let output = host.outputs()[0];
    let targets = scene.renderer().unwrap().live_targets();
    assert!(targets > 0);
    assert!(host.release_log().records().is_empty());

    scene.detach(&mut host);

    let records = host.release_log().records();
    assert!(records.iter().all(|record| record.resize_listeners == 0));

    let releases = host.release_log().releases();
    assert_eq!(releases.len(), targets + 5);
    assert_eq!(releases[0], Release::Frame(frame));
    assert!(
        releases[1..=targets]
            .iter()
            .all(|release| matches!(release, Release::Target(_)))
    );
    assert!(matches!(
        &releases[targets + 1..],
        [
            Release::Renderer,
            Release::Geometry(_),
            Release::Material(_),
            Release::Output(id),
        ] if *id == output
    ));
}

#[test]
fn detach_cancels_pending_frames() {
    let mut host = HeadlessHost::new(800, 600);
    let mut scene = scene();
    scene.attach(&mut host).unwrap();

    let id = scene.request_frame(&mut host).unwrap();
    assert_eq!(scene.request_frame(&mut host), Some(id));
    assert_eq!(host.pending_frames(), &[id]);

    scene.detach(&mut host);
    assert!(host.pending_frames().is_empty());
    assert!(!scene.on_animation_frame(id));
}

#[test]
fn animation_frame_renders_once() {
    let mut host = HeadlessHost::new(800, 600);
    let mut scene = scene();
    scene.attach(&mut host).unwrap();

    scene.request_frame(&mut host);
    let id = host.fire_frame().unwrap();
    assert!(scene.on_animation_frame(id));
    assert!(!scene.on_animation_frame(id));
    assert_eq!(presented(&scene), 2);
}

#[test]
fn failed_attach_leaves_host_untouched() {
    let mut host = HeadlessHost::failing(800, 600);
    let mut scene = scene();

    assert!(scene.attach(&mut host).is_err());
    assert_eq!(scene.state(), LifecycleState::Unattached);
    assert!(host.outputs().is_empty());
    assert!(!host.events().has_resize_listeners());
    assert_eq!(scene.frames_rendered(), 0);
}

#[test]
fn custom_cards_flow_through_to_the_material() {
    let card = CardCatalog::base_card().merged(
        &CardOverrides::new()
            .color(Color::hex(0x60a5fa))
            .roughness(0.3),
    );
    let mut host = HeadlessHost::new(640, 480);
    let mut scene = SceneLifecycle::<HeadlessRenderer>::new(card, SceneConfig::new());
    scene.attach(&mut host).unwrap();

    let entity = scene.card().unwrap();
    assert_eq!(entity.material().color.to_hex(), 0x60a5fa);
    assert_eq!(entity.material().roughness, 0.3);
}

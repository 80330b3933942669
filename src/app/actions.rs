//! Applies panel actions, load completions and gizmo events to the
//! registry and the editor context.
//!
//! This is the only layer that sees raw numeric input, so non-finite values
//! and non-positive scales are dropped here before the registry is called.

use crate::assets::{model, LoadKind, LoadOutcome, Loaded};
use crate::context::EditorContext;
use crate::engine::material::DEFAULT_MESH_COLOR;
use crate::engine::{
    hex_to_rgb, Geometry, LightKind, LightNode, Node, NodeId, PrimitiveShape, StandardMaterial,
    Transform,
};
use crate::render::GizmoEvent;
use crate::scene::export::generate_code;
use crate::scene::registry::{EntryId, EntryKind, LightParams, ObjectRegistry, TransformEdit};
use crate::scene::serialization::SceneDocument;
use crate::ui::UiAction;
use glam::Vec3;
use std::time::Instant;

pub const CODE_COPIED: &str = "Three.js code copied to clipboard!";
pub const SELECT_MESH_FIRST: &str = "Please select an object to apply texture";

/// Side effects the window layer has to carry out for an action.
#[derive(Debug)]
pub enum AppRequest {
    OpenModel,
    OpenEnvironment,
    OpenTexture(EntryId),
    SaveScene(Box<SceneDocument>),
    CopyText(String),
}

fn finite(value: f32) -> Option<f32> {
    value.is_finite().then_some(value)
}

fn finite3(values: [f32; 3]) -> Option<[f32; 3]> {
    values.iter().all(|v| v.is_finite()).then_some(values)
}

fn accept_transform(edit: TransformEdit) -> Option<TransformEdit> {
    match edit {
        TransformEdit::Position(_, value) | TransformEdit::RotationDeg(_, value) => {
            finite(value).map(|_| edit)
        }
        TransformEdit::Scale(_, value) => finite(value).filter(|v| *v > 0.0).map(|_| edit),
    }
}

fn accept_light(params: LightParams) -> Option<LightParams> {
    finite3(params.color)?;
    finite(params.intensity)?;
    finite(params.distance)?;
    finite(params.angle_deg)?;
    finite(params.penumbra)?;
    Some(params)
}

pub fn apply_action(
    ctx: &mut EditorContext,
    registry: &mut ObjectRegistry,
    action: UiAction,
    now: Instant,
) -> Option<AppRequest> {
    match action {
        UiAction::AddPrimitive(shape) => {
            let id = spawn_primitive(ctx, registry, shape);
            registry.select(ctx, Some(id));
        }
        UiAction::AddLight(kind) => {
            let id = spawn_light(ctx, registry, kind);
            registry.select(ctx, Some(id));
        }
        UiAction::ImportModel => return Some(AppRequest::OpenModel),
        UiAction::LoadEnvironment => return Some(AppRequest::OpenEnvironment),
        UiAction::Select(id) => registry.select(ctx, id),
        UiAction::Remove(id) => registry.remove(ctx, id),
        UiAction::SetVisible(id, visible) => registry.set_visible(ctx, id, visible),
        UiAction::Rename(id, name) => registry.rename(ctx, id, &name),
        UiAction::SetTransformMode(mode) => registry.set_transform_mode(ctx, mode),
        UiAction::EditTransform(id, edit) => {
            if let Some(edit) = accept_transform(edit) {
                registry.set_transform(ctx, id, edit);
            }
        }
        UiAction::SetGeometry(id, shape) => registry.set_geometry(ctx, id, shape),
        UiAction::SetMaterial(id, params) => {
            if finite3(params.color).is_some()
                && params.metalness.is_finite()
                && params.roughness.is_finite()
            {
                registry.set_material_params(ctx, id, params);
            }
        }
        UiAction::SetLight(id, params) => {
            if let Some(params) = accept_light(params) {
                registry.set_light_params(ctx, id, params);
            }
        }
        UiAction::UploadTexture(id) => {
            let is_mesh = registry.get(id).map_or(false, |entry| entry.mesh().is_some());
            if is_mesh {
                return Some(AppRequest::OpenTexture(id));
            }
            ctx.status.flash(SELECT_MESH_FIRST, now);
        }
        UiAction::RemoveTexture(id, slot) => registry.remove_texture(ctx, id, slot),
        UiAction::SetTextureKind(id, slot, kind) => registry.set_texture_kind(ctx, id, slot, kind),
        UiAction::SetTextureIntensity(id, slot, value) => {
            if let Some(value) = finite(value) {
                registry.set_texture_intensity(ctx, id, slot, value);
            }
        }
        UiAction::SetTextureOpacity(id, slot, value) => {
            if let Some(value) = finite(value) {
                registry.set_texture_opacity(ctx, id, slot, value);
            }
        }
        UiAction::SetCameraKind(kind) => {
            ctx.camera.set_kind(kind);
            registry.refresh_camera(ctx);
        }
        UiAction::SetCameraPosition(axis, value) => {
            if let Some(value) = finite(value) {
                ctx.camera.position[axis.index()] = value;
                ctx.orbit.stop();
                registry.refresh_camera(ctx);
            }
        }
        UiAction::SetCameraTarget(axis, value) => {
            if let Some(value) = finite(value) {
                ctx.camera.target[axis.index()] = value;
                ctx.orbit.stop();
                registry.refresh_camera(ctx);
            }
        }
        UiAction::SetBackground(color) => {
            if let Some(color) = finite3(color) {
                ctx.settings.background = color.map(|c| c.clamp(0.0, 1.0));
            }
        }
        UiAction::SetAmbientIntensity(value) => {
            if let Some(value) = finite(value) {
                ctx.settings.ambient_intensity = value.max(0.0);
            }
        }
        UiAction::SetFog(enabled) => ctx.settings.fog_enabled = enabled,
        UiAction::SetFogDensity(value) => {
            if let Some(value) = finite(value) {
                ctx.settings.fog_density = value.max(0.0);
            }
        }
        UiAction::SetShadows(enabled) => registry.set_shadows(ctx, enabled),
        UiAction::SetEnvironmentIntensity(value) => {
            if let Some(value) = finite(value) {
                ctx.settings.environment_intensity = value.max(0.0);
            }
        }
        UiAction::ExportScene => {
            return Some(AppRequest::SaveScene(Box::new(SceneDocument::capture(ctx, registry))));
        }
        UiAction::CopyCode => {
            let code = generate_code(ctx, registry);
            ctx.status.flash(CODE_COPIED, now);
            return Some(AppRequest::CopyText(code));
        }
    }
    None
}

/// Applies one drained load completion. Failures only reach the status line.
pub fn apply_load_outcome(
    ctx: &mut EditorContext,
    registry: &mut ObjectRegistry,
    outcome: LoadOutcome,
    now: Instant,
) {
    let loaded = match outcome.result {
        Ok(loaded) => loaded,
        Err(err) => {
            log::warn!("Load of {} failed: {err}", outcome.source.display());
            ctx.status.flash(format!("Error loading {}: {err}", outcome.source.display()), now);
            return;
        }
    };

    match (outcome.kind, loaded) {
        (LoadKind::Model, Loaded::Model(imported)) => {
            let root = model::instantiate(&mut ctx.scene, &imported);
            if !ctx.settings.shadows {
                disable_subtree_shadows(ctx, root);
            }
            let id = registry
                .add(ctx, root, Some(imported.name.clone()), EntryKind::Model)
                .id();
            log::info!("Imported '{}' ({} meshes)", imported.name, imported.mesh_count());
            registry.select(ctx, Some(id));
        }
        (LoadKind::Texture { entry }, Loaded::Texture(texture)) => {
            if registry.attach_texture(ctx, entry, texture).is_none() {
                log::debug!("Texture {} arrived for a removed entry", outcome.source.display());
            }
        }
        (LoadKind::Environment, Loaded::Environment(environment)) => {
            log::info!(
                "Environment '{}' {}x{}, mean radiance {:?}",
                environment.name,
                environment.width,
                environment.height,
                environment.average()
            );
            ctx.environment = Some(environment);
        }
        (kind, _) => log::warn!("Load result does not match request {kind:?}"),
    }
}

fn disable_subtree_shadows(ctx: &mut EditorContext, root: NodeId) {
    for id in ctx.scene.descendants(root) {
        if let Some(mesh) = ctx.scene.get_mut(id).and_then(|n| n.as_mesh_mut()) {
            mesh.cast_shadow = false;
            mesh.receive_shadow = false;
        }
    }
}

/// Orbit is paused while the gizmo drags; the panel re-syncs once it stops.
pub fn process_gizmo_events(ctx: &mut EditorContext, registry: &mut ObjectRegistry) {
    for event in ctx.gizmo.take_events() {
        let GizmoEvent::DraggingChanged(dragging) = event;
        ctx.orbit.enabled = !dragging;
        if dragging {
            ctx.orbit.stop();
        } else {
            registry.sync_controls_from_selection(ctx);
        }
    }
}

pub fn spawn_primitive(ctx: &mut EditorContext, registry: &mut ObjectRegistry, shape: PrimitiveShape) -> EntryId {
    let mut node = Node::mesh(
        shape.label(),
        Geometry::Primitive(shape),
        StandardMaterial::with_color(hex_to_rgb(DEFAULT_MESH_COLOR)),
    );
    if let Some(mesh) = node.as_mesh_mut() {
        mesh.cast_shadow = ctx.settings.shadows;
        mesh.receive_shadow = ctx.settings.shadows;
    }
    let node = ctx.scene.add_to_root(node);
    registry.add(ctx, node, None, EntryKind::Mesh).id()
}

pub fn spawn_light(ctx: &mut EditorContext, registry: &mut ObjectRegistry, kind: LightKind) -> EntryId {
    let mut light = LightNode::new(kind);
    light.cast_shadow = ctx.settings.shadows;
    let node = Node::light(kind.label(), light)
        .with_transform(Transform::from_position(Vec3::from_array(kind.default_position())));
    let node = ctx.scene.add_to_root(node);
    registry.add(ctx, node, None, EntryKind::from_light(kind)).id()
}

/// Start-up scene: one selected box and the key light.
pub fn bootstrap_default_scene(ctx: &mut EditorContext, registry: &mut ObjectRegistry) {
    let cube = spawn_primitive(ctx, registry, PrimitiveShape::Box);
    spawn_light(ctx, registry, LightKind::Directional);
    registry.select(ctx, Some(cube));
}

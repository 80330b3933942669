pub mod panels;

use crate::context::SceneSettings;
use crate::engine::{Axis, LightKind, PrimitiveShape};
use crate::render::{CameraKind, GizmoMode};
use crate::scene::material::{MaterialParams, TextureKind, TextureSlotId, TEXTURE_INTENSITY_MAX};
use crate::scene::registry::{EntryId, LightParams, TransformEdit};
use panels::{LightFields, PanelState, PropertyPanel, TextureRow};

/// One user intent from the side panel. Values are taken as typed; the
/// action layer filters anything the registry should not see.
#[derive(Debug, Clone, PartialEq)]
pub enum UiAction {
    AddPrimitive(PrimitiveShape),
    AddLight(LightKind),
    ImportModel,
    LoadEnvironment,
    Select(Option<EntryId>),
    Remove(EntryId),
    SetVisible(EntryId, bool),
    Rename(EntryId, String),
    SetTransformMode(Option<GizmoMode>),
    EditTransform(EntryId, TransformEdit),
    SetGeometry(EntryId, PrimitiveShape),
    SetMaterial(EntryId, MaterialParams),
    SetLight(EntryId, LightParams),
    UploadTexture(EntryId),
    RemoveTexture(EntryId, TextureSlotId),
    SetTextureKind(EntryId, TextureSlotId, TextureKind),
    SetTextureIntensity(EntryId, TextureSlotId, f32),
    SetTextureOpacity(EntryId, TextureSlotId, f32),
    SetCameraKind(CameraKind),
    SetCameraPosition(Axis, f32),
    SetCameraTarget(Axis, f32),
    SetBackground([f32; 3]),
    SetAmbientIntensity(f32),
    SetFog(bool),
    SetFogDensity(f32),
    SetShadows(bool),
    SetEnvironmentIntensity(f32),
    ExportScene,
    CopyCode,
}

/// Read-only inputs for one panel frame.
pub struct UiView<'a> {
    pub panels: &'a PanelState,
    pub selected: Option<EntryId>,
    pub settings: &'a SceneSettings,
    pub environment: Option<&'a str>,
    pub status: &'a str,
    pub pending_loads: usize,
}

/// Panel state that has to outlive a frame.
#[derive(Debug, Default)]
pub struct UiState {
    name_draft: String,
    name_owner: Option<EntryId>,
}

impl UiState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn show(&mut self, ctx: &egui::Context, view: &UiView, width: f32) -> Vec<UiAction> {
        let mut actions = Vec::new();

        egui::TopBottomPanel::bottom("scenepad_status").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.label(view.status);
                if view.pending_loads > 0 {
                    ui.separator();
                    ui.spinner();
                    ui.label(format!("loading {}", view.pending_loads));
                }
            });
        });

        egui::SidePanel::right("scenepad_side_panel")
            .exact_width(width)
            .resizable(false)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    self.add_section(ui, &mut actions);
                    self.objects_section(ui, view, &mut actions);
                    self.lights_section(ui, view, &mut actions);
                    self.properties_section(ui, view, &mut actions);
                    camera_section(ui, view, &mut actions);
                    scene_section(ui, view, &mut actions);
                    ui.separator();
                    ui.horizontal(|ui| {
                        if ui.button("Export Scene").clicked() {
                            actions.push(UiAction::ExportScene);
                        }
                        if ui.button("Copy Three.js Code").clicked() {
                            actions.push(UiAction::CopyCode);
                        }
                    });
                });
            });

        actions
    }

    fn add_section(&mut self, ui: &mut egui::Ui, actions: &mut Vec<UiAction>) {
        egui::CollapsingHeader::new("Add")
            .default_open(true)
            .show(ui, |ui| {
                ui.horizontal_wrapped(|ui| {
                    for shape in PrimitiveShape::ALL {
                        if ui.button(shape.label()).clicked() {
                            actions.push(UiAction::AddPrimitive(shape));
                        }
                    }
                });
                ui.horizontal_wrapped(|ui| {
                    for kind in LightKind::ALL {
                        if ui.button(kind.label()).clicked() {
                            actions.push(UiAction::AddLight(kind));
                        }
                    }
                });
                ui.horizontal(|ui| {
                    if ui.button("Import Model...").clicked() {
                        actions.push(UiAction::ImportModel);
                    }
                    if ui.button("Environment (HDR)...").clicked() {
                        actions.push(UiAction::LoadEnvironment);
                    }
                });
            });
    }

    fn objects_section(&mut self, ui: &mut egui::Ui, view: &UiView, actions: &mut Vec<UiAction>) {
        egui::CollapsingHeader::new("Objects")
            .default_open(true)
            .show(ui, |ui| {
                if view.panels.objects.is_empty() {
                    ui.weak("Empty scene");
                }
                for row in &view.panels.objects {
                    ui.horizontal(|ui| {
                        let mut visible = row.visible;
                        if ui.checkbox(&mut visible, "").changed() {
                            actions.push(UiAction::SetVisible(row.id, visible));
                        }
                        if ui.selectable_label(row.selected, &row.name).clicked() {
                            actions.push(UiAction::Select(Some(row.id)));
                        }
                        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                            if ui.small_button("Delete").clicked() {
                                actions.push(UiAction::Remove(row.id));
                            }
                        });
                    });
                }
            });
    }

    fn lights_section(&mut self, ui: &mut egui::Ui, view: &UiView, actions: &mut Vec<UiAction>) {
        egui::CollapsingHeader::new("Lights")
            .default_open(false)
            .show(ui, |ui| {
                for row in &view.panels.lights {
                    let label = format!("{} ({})", row.name, row.kind.label());
                    if ui.selectable_label(row.selected, label).clicked() {
                        actions.push(UiAction::Select(Some(row.id)));
                    }
                }
            });
    }

    fn properties_section(&mut self, ui: &mut egui::Ui, view: &UiView, actions: &mut Vec<UiAction>) {
        let panel = &view.panels.properties;
        egui::CollapsingHeader::new("Properties")
            .default_open(true)
            .show(ui, |ui| {
                transform_mode_row(ui, view.panels.transform_mode, actions);
                ui.add_enabled_ui(panel.enabled, |ui| {
                    let Some(id) = view.selected.filter(|_| panel.enabled) else {
                        ui.weak("Nothing selected");
                        return;
                    };
                    self.name_row(ui, id, panel, actions);
                    if panel.sections.transform {
                        transform_rows(ui, id, panel, actions);
                    }
                    if panel.sections.geometry {
                        geometry_row(ui, id, panel, actions);
                    }
                    if panel.sections.material {
                        material_rows(ui, id, panel.material, actions);
                    }
                    if let (true, Some(light)) = (panel.sections.light, panel.light) {
                        light_rows(ui, id, light, actions);
                    }
                    if panel.sections.textures {
                        texture_rows(ui, id, &view.panels.textures, actions);
                    }
                });
            });
    }

    fn name_row(&mut self, ui: &mut egui::Ui, id: EntryId, panel: &PropertyPanel, actions: &mut Vec<UiAction>) {
        if self.name_owner != Some(id) {
            self.name_owner = Some(id);
            self.name_draft = panel.name.clone();
        }
        ui.horizontal(|ui| {
            ui.label("Name");
            let response = ui.text_edit_singleline(&mut self.name_draft);
            if response.lost_focus() && self.name_draft != panel.name {
                actions.push(UiAction::Rename(id, self.name_draft.clone()));
            }
            if !response.has_focus() && !response.lost_focus() {
                self.name_draft.clone_from(&panel.name);
            }
        });
    }
}

fn transform_mode_row(ui: &mut egui::Ui, current: Option<GizmoMode>, actions: &mut Vec<UiAction>) {
    ui.horizontal(|ui| {
        for mode in GizmoMode::ALL {
            if ui.selectable_label(current == Some(mode), mode.label()).clicked() {
                actions.push(UiAction::SetTransformMode(Some(mode)));
            }
        }
        if ui.selectable_label(current.is_none(), "Disable").clicked() {
            actions.push(UiAction::SetTransformMode(None));
        }
    });
}

fn axis_row<F>(ui: &mut egui::Ui, label: &str, values: [f32; 3], speed: f64, mut edit: F)
where
    F: FnMut(Axis, f32),
{
    ui.horizontal(|ui| {
        ui.label(label);
        for axis in Axis::ALL {
            let mut value = values[axis.index()];
            let response = ui.add(
                egui::DragValue::new(&mut value)
                    .speed(speed)
                    .max_decimals(3)
                    .prefix(format!("{}: ", axis.label())),
            );
            if response.changed() {
                edit(axis, value);
            }
        }
    });
}

fn transform_rows(ui: &mut egui::Ui, id: EntryId, panel: &PropertyPanel, actions: &mut Vec<UiAction>) {
    axis_row(ui, "Position", panel.position, 0.05, |axis, value| {
        actions.push(UiAction::EditTransform(id, TransformEdit::Position(axis, value)));
    });
    axis_row(ui, "Rotation", panel.rotation_deg, 1.0, |axis, value| {
        actions.push(UiAction::EditTransform(id, TransformEdit::RotationDeg(axis, value)));
    });
    if panel.sections.scale {
        axis_row(ui, "Scale", panel.scale, 0.01, |axis, value| {
            actions.push(UiAction::EditTransform(id, TransformEdit::Scale(axis, value)));
        });
    }
}

fn geometry_row(ui: &mut egui::Ui, id: EntryId, panel: &PropertyPanel, actions: &mut Vec<UiAction>) {
    let Some(current) = panel.geometry else {
        return;
    };
    let mut choice = current;
    egui::ComboBox::from_label("Geometry")
        .selected_text(current.label())
        .show_ui(ui, |ui| {
            for shape in PrimitiveShape::ALL {
                ui.selectable_value(&mut choice, shape, shape.label());
            }
        });
    if choice != current {
        actions.push(UiAction::SetGeometry(id, choice));
    }
}

fn material_rows(ui: &mut egui::Ui, id: EntryId, current: MaterialParams, actions: &mut Vec<UiAction>) {
    let mut params = current;
    ui.horizontal(|ui| {
        ui.label("Color");
        ui.color_edit_button_rgb(&mut params.color);
    });
    ui.add(egui::Slider::new(&mut params.metalness, 0.0..=1.0).text("Metalness"));
    ui.add(egui::Slider::new(&mut params.roughness, 0.0..=1.0).text("Roughness"));
    ui.checkbox(&mut params.wireframe, "Wireframe");
    if params != current {
        actions.push(UiAction::SetMaterial(id, params));
    }
}

fn light_rows(ui: &mut egui::Ui, id: EntryId, fields: LightFields, actions: &mut Vec<UiAction>) {
    let mut params = LightParams {
        color: fields.color,
        intensity: fields.intensity,
        cast_shadow: fields.cast_shadow,
        distance: fields.distance,
        angle_deg: fields.angle_deg,
        penumbra: fields.penumbra,
    };
    let before = params;
    ui.horizontal(|ui| {
        ui.label("Light color");
        ui.color_edit_button_rgb(&mut params.color);
    });
    ui.add(egui::Slider::new(&mut params.intensity, 0.0..=10.0).text("Intensity"));
    ui.checkbox(&mut params.cast_shadow, "Cast shadow");
    if fields.kind != LightKind::Directional {
        ui.add(egui::Slider::new(&mut params.distance, 0.0..=100.0).text("Distance"));
    }
    if fields.kind == LightKind::Spot {
        ui.add(egui::Slider::new(&mut params.angle_deg, 0.0..=90.0).text("Angle"));
        ui.add(egui::Slider::new(&mut params.penumbra, 0.0..=1.0).text("Penumbra"));
    }
    if params != before {
        actions.push(UiAction::SetLight(id, params));
    }
}

fn texture_rows(ui: &mut egui::Ui, id: EntryId, rows: &[TextureRow], actions: &mut Vec<UiAction>) {
    ui.separator();
    ui.horizontal(|ui| {
        ui.strong("Textures");
        if ui.button("Upload...").clicked() {
            actions.push(UiAction::UploadTexture(id));
        }
    });
    for row in rows {
        ui.push_id(row.id.to_string(), |ui| {
            ui.horizontal(|ui| {
                ui.label(&row.display_name);
                let mut kind = row.kind;
                egui::ComboBox::from_id_salt("kind")
                    .selected_text(kind.label())
                    .show_ui(ui, |ui| {
                        for option in TextureKind::ALL {
                            ui.selectable_value(&mut kind, option, option.label());
                        }
                    });
                if kind != row.kind {
                    actions.push(UiAction::SetTextureKind(id, row.id, kind));
                }
                if ui.small_button("Remove").clicked() {
                    actions.push(UiAction::RemoveTexture(id, row.id));
                }
            });
            let mut intensity = row.intensity;
            if ui
                .add(egui::Slider::new(&mut intensity, 0.0..=TEXTURE_INTENSITY_MAX).text("Intensity"))
                .changed()
            {
                actions.push(UiAction::SetTextureIntensity(id, row.id, intensity));
            }
            if row.kind == TextureKind::Diffuse {
                let mut opacity = row.opacity;
                if ui.add(egui::Slider::new(&mut opacity, 0.0..=1.0).text("Opacity")).changed() {
                    actions.push(UiAction::SetTextureOpacity(id, row.id, opacity));
                }
            }
        });
    }
}

fn camera_section(ui: &mut egui::Ui, view: &UiView, actions: &mut Vec<UiAction>) {
    let camera = view.panels.camera;
    egui::CollapsingHeader::new("Camera")
        .default_open(false)
        .show(ui, |ui| {
            ui.horizontal(|ui| {
                for kind in [CameraKind::Perspective, CameraKind::Orthographic] {
                    if ui.selectable_label(camera.kind == kind, kind.label()).clicked() && camera.kind != kind {
                        actions.push(UiAction::SetCameraKind(kind));
                    }
                }
            });
            axis_row(ui, "Position", camera.position, 0.05, |axis, value| {
                actions.push(UiAction::SetCameraPosition(axis, value));
            });
            axis_row(ui, "Look at", camera.target, 0.05, |axis, value| {
                actions.push(UiAction::SetCameraTarget(axis, value));
            });
        });
}

fn scene_section(ui: &mut egui::Ui, view: &UiView, actions: &mut Vec<UiAction>) {
    let settings = view.settings;
    egui::CollapsingHeader::new("Scene")
        .default_open(false)
        .show(ui, |ui| {
            let mut background = settings.background;
            ui.horizontal(|ui| {
                ui.label("Background");
                if ui.color_edit_button_rgb(&mut background).changed() {
                    actions.push(UiAction::SetBackground(background));
                }
            });
            let mut ambient = settings.ambient_intensity;
            if ui.add(egui::Slider::new(&mut ambient, 0.0..=2.0).text("Ambient")).changed() {
                actions.push(UiAction::SetAmbientIntensity(ambient));
            }
            let mut fog = settings.fog_enabled;
            if ui.checkbox(&mut fog, "Fog").changed() {
                actions.push(UiAction::SetFog(fog));
            }
            let mut density = settings.fog_density;
            if ui
                .add_enabled(fog, egui::Slider::new(&mut density, 0.0..=0.2).text("Density").max_decimals(3))
                .changed()
            {
                actions.push(UiAction::SetFogDensity(density));
            }
            let mut shadows = settings.shadows;
            if ui.checkbox(&mut shadows, "Shadows").changed() {
                actions.push(UiAction::SetShadows(shadows));
            }
            match view.environment {
                Some(name) => {
                    ui.label(format!("Environment: {name}"));
                    let mut intensity = settings.environment_intensity;
                    if ui.add(egui::Slider::new(&mut intensity, 0.0..=3.0).text("Env intensity")).changed() {
                        actions.push(UiAction::SetEnvironmentIntensity(intensity));
                    }
                }
                None => {
                    ui.weak("No environment loaded");
                }
            }
        });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EditorConfig;

    fn run_frame(state: &mut UiState, view: &UiView) -> Vec<UiAction> {
        let ctx = egui::Context::default();
        let mut out = Vec::new();
        let input = egui::RawInput {
            screen_rect: Some(egui::Rect::from_min_size(egui::Pos2::ZERO, egui::vec2(1600.0, 900.0))),
            ..Default::default()
        };
        let _ = ctx.run(input, |ctx| {
            out = state.show(ctx, view, 320.0);
        });
        out
    }

    #[test]
    fn idle_frame_emits_nothing() {
        let settings = SceneSettings::from_config(&EditorConfig::default());
        let panels = PanelState::default();
        let view = UiView {
            panels: &panels,
            selected: None,
            settings: &settings,
            environment: None,
            status: "Selected: None",
            pending_loads: 2,
        };
        let mut state = UiState::new();
        assert!(run_frame(&mut state, &view).is_empty());
    }

    #[test]
    fn name_draft_follows_selection() {
        let settings = SceneSettings::from_config(&EditorConfig::default());
        let mut panels = PanelState::default();
        panels.properties.enabled = true;
        panels.properties.name = "Box 1".to_string();
        let view = UiView {
            panels: &panels,
            selected: Some(EntryId(1)),
            settings: &settings,
            environment: Some("studio.hdr"),
            status: "Selected: Box 1",
            pending_loads: 0,
        };
        let mut state = UiState::new();
        assert!(run_frame(&mut state, &view).is_empty());
        assert_eq!(state.name_draft, "Box 1");
        assert_eq!(state.name_owner, Some(EntryId(1)));
    }
}

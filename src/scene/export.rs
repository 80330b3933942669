//! Source snippet that rebuilds the current scene in a three.js page.

use crate::context::{EditorContext, GRID_DIVISIONS, GRID_SIZE, GROUND_COLOR};
use crate::engine::{rgb_to_hex, LightKind, NodeKind};
use crate::render::CameraKind;
use crate::scene::registry::ObjectRegistry;

pub fn generate_code(ctx: &EditorContext, registry: &ObjectRegistry) -> String {
    let settings = &ctx.settings;
    let background = rgb_to_hex(settings.background);
    let camera = &ctx.camera;
    let params = camera.params;
    let [tx, ty, tz] = camera.target.to_array();
    let [px, py, pz] = camera.position.to_array();

    let mut code = String::from("// Three.js Scene exported from scenepad\n\n");
    code.push_str("// Create scene\n");
    code.push_str("const scene = new THREE.Scene();\n");
    code.push_str(&format!("scene.background = new THREE.Color(0x{background:06x});\n\n"));

    if settings.fog_enabled {
        code.push_str("// Add fog\n");
        code.push_str(&format!(
            "scene.fog = new THREE.FogExp2(0x{background:06x}, {});\n\n",
            settings.fog_density
        ));
    }

    code.push_str("// Setup camera\n");
    match camera.kind {
        CameraKind::Perspective => code.push_str(&format!(
            "const camera = new THREE.PerspectiveCamera({}, window.innerWidth / window.innerHeight, {}, {});\n",
            params.fov_deg, params.near, params.far
        )),
        CameraKind::Orthographic => {
            let h = params.ortho_half_height;
            code.push_str(&format!(
                "const camera = new THREE.OrthographicCamera({}, {h}, {h}, {}, {}, {});\n",
                -h, -h, params.near, params.far
            ))
        }
    }
    code.push_str(&format!("camera.position.set({px:.2}, {py:.2}, {pz:.2});\n"));
    code.push_str(&format!("camera.lookAt({tx:.2}, {ty:.2}, {tz:.2});\n\n"));

    code.push_str("// Setup renderer\n");
    code.push_str("const renderer = new THREE.WebGLRenderer({ antialias: true });\n");
    code.push_str("renderer.setSize(window.innerWidth, window.innerHeight);\n");
    code.push_str(&format!("renderer.shadowMap.enabled = {};\n", settings.shadows));
    code.push_str("document.body.appendChild(renderer.domElement);\n\n");

    code.push_str("// Setup controls\n");
    code.push_str("const controls = new THREE.OrbitControls(camera, renderer.domElement);\n");
    code.push_str("controls.enableDamping = true;\n");
    code.push_str(&format!("controls.target.set({tx:.2}, {ty:.2}, {tz:.2});\n\n"));

    code.push_str("// Lighting\n");
    code.push_str(&format!(
        "const ambientLight = new THREE.AmbientLight(0xffffff, {});\n",
        settings.ambient_intensity
    ));
    code.push_str("scene.add(ambientLight);\n\n");

    code.push_str("// Grid and ground\n");
    code.push_str(&format!(
        "const gridHelper = new THREE.GridHelper({GRID_SIZE}, {GRID_DIVISIONS}, 0x444444, 0x222222);\n"
    ));
    code.push_str("scene.add(gridHelper);\n\n");
    code.push_str(&format!("const groundGeometry = new THREE.PlaneGeometry({GRID_SIZE}, {GRID_SIZE});\n"));
    code.push_str("const groundMaterial = new THREE.MeshStandardMaterial({\n");
    code.push_str(&format!("  color: 0x{GROUND_COLOR:06x},\n"));
    code.push_str("  roughness: 1,\n");
    code.push_str("  metalness: 0\n");
    code.push_str("});\n");
    code.push_str("const ground = new THREE.Mesh(groundGeometry, groundMaterial);\n");
    code.push_str("ground.rotation.x = -Math.PI / 2;\n");
    code.push_str("ground.position.y = -0.01;\n");
    code.push_str(&format!("ground.receiveShadow = {};\n", settings.shadows));
    code.push_str("scene.add(ground);\n\n");

    code.push_str("// Objects\n");
    for (index, entry) in registry.entries().iter().enumerate() {
        code.push_str(&format!("// {}\n", entry.name()));
        let Some(node) = ctx.scene.get(entry.node()) else {
            continue;
        };
        let [x, y, z] = node.transform.position.to_array();
        let [rx, ry, rz] = node.transform.rotation.to_array();
        let [sx, sy, sz] = node.transform.scale.to_array();

        match &node.kind {
            NodeKind::Mesh(mesh) if mesh.geometry.shape().is_some() => {
                let material = &mesh.material;
                code.push_str(&format!("const material{index} = new THREE.MeshStandardMaterial({{\n"));
                code.push_str(&format!("  color: 0x{:06x},\n", rgb_to_hex(material.color)));
                code.push_str(&format!("  metalness: {},\n", material.metalness));
                code.push_str(&format!("  roughness: {},\n", material.roughness));
                code.push_str(&format!("  wireframe: {}", material.wireframe));
                if material.transparent {
                    code.push_str(&format!(",\n  transparent: true,\n  opacity: {}", material.opacity));
                }
                code.push('\n');
                if material.has_any_map() {
                    code.push_str("  // Note: You'll need to load the textures separately\n");
                }
                code.push_str("});\n\n");

                if let Some(shape) = mesh.geometry.shape() {
                    code.push_str(&format!(
                        "const geometry{index} = new THREE.{};\n",
                        shape.constructor()
                    ));
                }
                code.push_str(&format!(
                    "const mesh{index} = new THREE.Mesh(geometry{index}, material{index});\n"
                ));
                code.push_str(&format!("mesh{index}.position.set({x:.2}, {y:.2}, {z:.2});\n"));
                code.push_str(&format!("mesh{index}.rotation.set({rx:.2}, {ry:.2}, {rz:.2});\n"));
                code.push_str(&format!("mesh{index}.scale.set({sx:.2}, {sy:.2}, {sz:.2});\n"));
                code.push_str(&format!("mesh{index}.visible = {};\n", node.visible));
                code.push_str(&format!("mesh{index}.castShadow = {};\n", mesh.cast_shadow));
                code.push_str(&format!("mesh{index}.receiveShadow = {};\n", mesh.receive_shadow));
                code.push_str(&format!("scene.add(mesh{index});\n\n"));
            }
            NodeKind::Light(light) => {
                let color = rgb_to_hex(light.color);
                let args = match light.kind {
                    LightKind::Directional => format!("0x{color:06x}, {}", light.intensity),
                    LightKind::Point => {
                        format!("0x{color:06x}, {}, {}", light.intensity, light.distance)
                    }
                    LightKind::Spot => format!(
                        "0x{color:06x}, {}, {}, {:.4}, {}",
                        light.intensity, light.distance, light.angle, light.penumbra
                    ),
                };
                code.push_str(&format!(
                    "const light{index} = new THREE.{}({args});\n",
                    light.kind.class_name()
                ));
                code.push_str(&format!("light{index}.position.set({x:.2}, {y:.2}, {z:.2});\n"));
                code.push_str(&format!("light{index}.castShadow = {};\n", light.cast_shadow));
                code.push_str(&format!("scene.add(light{index});\n\n"));
            }
            _ => {
                code.push_str("// This is a complex object (e.g., imported model)\n");
                code.push_str("// You'll need to import it using GLTFLoader\n\n");
            }
        }
    }

    code.push_str("// Animation loop\n");
    code.push_str("function animate() {\n");
    code.push_str("  requestAnimationFrame(animate);\n");
    code.push_str("  controls.update();\n");
    code.push_str("  renderer.render(scene, camera);\n");
    code.push_str("}\n\n");
    code.push_str("animate();\n\n");

    code.push_str("// Handle window resize\n");
    code.push_str("window.addEventListener('resize', () => {\n");
    code.push_str("  const width = window.innerWidth;\n");
    code.push_str("  const height = window.innerHeight;\n");
    match camera.kind {
        CameraKind::Perspective => code.push_str("  camera.aspect = width / height;\n"),
        CameraKind::Orthographic => {
            let h = params.ortho_half_height;
            code.push_str(&format!("  camera.left = -{h} * (width / height);\n"));
            code.push_str(&format!("  camera.right = {h} * (width / height);\n"));
        }
    }
    code.push_str("  camera.updateProjectionMatrix();\n");
    code.push_str("  renderer.setSize(width, height);\n");
    code.push_str("});\n");
    code
}

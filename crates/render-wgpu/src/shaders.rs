/// Shared globals, vertex layout and fog, prepended to every shader below.
const COMMON: &str = r#"
struct Globals {
    view_proj: mat4x4<f32>,
    camera_pos: vec4<f32>,
    ambient: vec4<f32>,
    fog_color: vec4<f32>,
    // time, speed, scale, thickness
    scroll: vec4<f32>,
    // near, far, light count, unused
    fog_range: vec4<f32>,
    // w = 0: directional (xyz points at the light), w = 1: point light
    light_pos: array<vec4<f32>, 4>,
    light_color: array<vec4<f32>, 4>,
};

@group(0) @binding(0)
var<uniform> globals: Globals;

struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
    @location(2) uv: vec2<f32>,
    @location(3) center: vec3<f32>,
};

struct InstanceInput {
    @location(4) model_0: vec4<f32>,
    @location(5) model_1: vec4<f32>,
    @location(6) model_2: vec4<f32>,
    @location(7) model_3: vec4<f32>,
    @location(8) color: vec4<f32>,
    // x: highlighted
    @location(9) params: vec4<f32>,
};

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) world_pos: vec3<f32>,
    @location(1) world_normal: vec3<f32>,
    @location(2) color: vec4<f32>,
    @location(3) center: vec3<f32>,
    @location(4) height: f32,
};

fn model_of(instance: InstanceInput) -> mat4x4<f32> {
    return mat4x4<f32>(instance.model_0, instance.model_1, instance.model_2, instance.model_3);
}

fn base_color(instance: InstanceInput) -> vec4<f32> {
    if (instance.params.x > 0.5) {
        return vec4<f32>(mix(instance.color.rgb, vec3<f32>(1.0, 0.85, 0.2), 0.6), max(instance.color.a, 0.6));
    }
    return instance.color;
}

fn apply_fog(color: vec3<f32>, world_pos: vec3<f32>) -> vec3<f32> {
    let dist = distance(world_pos, globals.camera_pos.xyz);
    let f = smoothstep(globals.fog_range.x, globals.fog_range.y, dist);
    return mix(color, globals.fog_color.rgb, f);
}

fn lighting(world_pos: vec3<f32>, n: vec3<f32>) -> vec3<f32> {
    var total = globals.ambient.rgb;
    let count = u32(globals.fog_range.z);
    for (var i = 0u; i < count; i = i + 1u) {
        let lp = globals.light_pos[i];
        var dir = normalize(lp.xyz);
        var atten = 1.0;
        if (lp.w > 0.5) {
            let to_light = lp.xyz - world_pos;
            dir = normalize(to_light);
            atten = 1.0 / (1.0 + 0.00002 * dot(to_light, to_light));
        }
        total = total + globals.light_color[i].rgb * max(dot(n, dir), 0.0) * atten;
    }
    return total;
}
"#;

const MESH_BODY: &str = r#"
@vertex
fn vs_main(vertex: VertexInput, instance: InstanceInput) -> VertexOutput {
    let model = model_of(instance);
    let world = model * vec4<f32>(vertex.position, 1.0);
    var out: VertexOutput;
    out.clip_position = globals.view_proj * world;
    out.world_pos = world.xyz;
    out.world_normal = normalize((model * vec4<f32>(vertex.normal, 0.0)).xyz);
    out.color = base_color(instance);
    out.center = vertex.center;
    out.height = 0.0;
    return out;
}

@fragment
fn fs_lit(in: VertexOutput) -> @location(0) vec4<f32> {
    let n = normalize(in.world_normal);
    let rgb = in.color.rgb * lighting(in.world_pos, n);
    return vec4<f32>(apply_fog(rgb, in.world_pos), in.color.a);
}

@fragment
fn fs_unlit(in: VertexOutput) -> @location(0) vec4<f32> {
    return vec4<f32>(apply_fog(in.color.rgb, in.world_pos), in.color.a);
}
"#;

const TERRAIN_BODY: &str = r#"
fn hash(p: vec2<f32>) -> f32 {
    return fract(sin(dot(p, vec2<f32>(12.9898, 78.233))) * 43758.5453);
}

// Height is keyed to the terrain's own frame: the mesh jumps back by one
// row every wrap, and the sample row jumps forward by the same amount.
@vertex
fn vs_terrain(vertex: VertexInput, instance: InstanceInput) -> VertexOutput {
    let model = model_of(instance);
    var world = model * vec4<f32>(vertex.position, 1.0);

    let travel = globals.scroll.x * globals.scroll.y;
    let scale = max(globals.scroll.z, 0.0001);
    let row = round((world.z - model[3].z) - floor(travel / scale) * scale);
    let side = clamp(abs(world.x) / 250.0, 0.0, 1.0);
    let h = side * side * (25.0 + 70.0 * hash(vec2<f32>(round(world.x), row)));
    world.y = world.y + h;

    var out: VertexOutput;
    out.clip_position = globals.view_proj * world;
    out.world_pos = world.xyz;
    out.world_normal = vec3<f32>(0.0, 1.0, 0.0);
    out.color = base_color(instance);
    out.center = vertex.center;
    out.height = h;
    return out;
}

@fragment
fn fs_terrain(in: VertexOutput) -> @location(0) vec4<f32> {
    let glow = clamp(in.height / 95.0, 0.0, 1.0);
    var rgb = in.color.rgb + vec3<f32>(0.25, 0.05, 0.35) * glow;
    let d = fwidth(in.center);
    let a = smoothstep(vec3<f32>(0.0), d * globals.scroll.w, in.center);
    let edge = 1.0 - min(min(a.x, a.y), a.z);
    rgb = mix(rgb, vec3<f32>(1.0, 0.17, 0.84), edge * 0.35);
    return vec4<f32>(apply_fog(rgb, in.world_pos), 1.0);
}

@fragment
fn fs_wire(in: VertexOutput) -> @location(0) vec4<f32> {
    return vec4<f32>(apply_fog(in.color.rgb, in.world_pos), in.color.a);
}
"#;

/// Lit and unlit scene meshes.
pub fn mesh_shader() -> String {
    format!("{COMMON}{MESH_BODY}")
}

/// Displaced terrain surface plus its wire overlay; both share `vs_terrain`.
pub fn terrain_shader() -> String {
    format!("{COMMON}{TERRAIN_BODY}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entry_points_present() {
        let mesh = mesh_shader();
        for entry in ["fn vs_main", "fn fs_lit", "fn fs_unlit"] {
            assert!(mesh.contains(entry), "{entry}");
        }
        let terrain = terrain_shader();
        for entry in ["fn vs_terrain", "fn fs_terrain", "fn fs_wire"] {
            assert!(terrain.contains(entry), "{entry}");
        }
    }
}

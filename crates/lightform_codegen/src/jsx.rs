//! Environment component generation
//!
//! The output is a React Three Fiber component: one `<Lightformer>` per
//! light (hidden ones included, with `visible={false}`), sky gradients as
//! back-faced spheres, and each light's appearance as a layer material.
//! Positions go through `setFromSphericalCoords(distance, phi, theta)`, the
//! same convention the renderer places panels with.

use lightform_scene::{Color, GradientAxis, Light, LightKind, NoiseType};

use crate::writer::{comment_text, num, string_literal, CodeWriter};

/// Generation settings
#[derive(Clone, Debug, PartialEq)]
pub struct CodegenOptions {
    /// `resolution` prop of the environment
    pub resolution: u32,
    /// Solid background fill
    pub background: Option<Color>,
}

impl Default for CodegenOptions {
    fn default() -> Self {
        Self { resolution: 2048, background: None }
    }
}

const HEADER: &str = r#"import * as THREE from "three";
import { Environment, Float, Lightformer, useTexture } from "@react-three/drei";
import { LayerMaterial, Color, Gradient, Noise, Texture } from "lamina";
import { ProceduralScrimLayer, ProceduralUmbrellaLayer } from "./layers";
"#;

/// Generate the environment component for `lights`
///
/// A pure function of its inputs: unchanged lights give byte-identical
/// text.
pub fn generate(lights: &[Light], options: &CodegenOptions) -> String {
    let mut w = CodeWriter::new(3);
    if let Some(color) = options.background {
        w.line(format!(r#"<color attach="background" args={{[{}]}} />"#, string_literal(&color.to_hex())));
    }
    if lights.is_empty() {
        w.line("{/* No lights */}");
    }
    for light in lights {
        w.blank();
        write_light(&mut w, light);
    }

    log::debug!("Generated scene code for {} light(s)", lights.len());
    format!(
        r#"{header}
export function Env() {{
  return (
    <Environment resolution={{{resolution}}} background>
{body}    </Environment>
  );
}}
"#,
        header = HEADER,
        resolution = options.resolution,
        body = w.finish(),
    )
}

fn write_light(w: &mut CodeWriter, light: &Light) {
    w.line(format!("{{/* {} */}}", comment_text(&light.name)));

    if let LightKind::SkyGradient(sky) = &light.kind {
        w.open(format!("<mesh visible={{{}}} scale={{100}}>", light.visible));
        w.line("<sphereGeometry args={[1, 64, 64]} />");
        w.open("<LayerMaterial side={THREE.BackSide} toneMapped={false}>");
        w.line(format!(
            r#"<Gradient colorA={} colorB={} axes="y" start={{0}} end={{1}} />"#,
            string_literal(&sky.color2.to_hex()),
            string_literal(&sky.color.to_hex()),
        ));
        w.close("</LayerMaterial>");
        w.close("</mesh>");
        return;
    }

    let anim = &light.animation;
    if anim.enabled {
        w.open(format!(
            "<Float speed={{{}}} rotationIntensity={{{}}} floatIntensity={{{}}} floatingRange={{[{}, {}]}}>",
            num(anim.speed),
            num(anim.rotation_intensity),
            num(anim.float_intensity),
            num(anim.floating_range.0),
            num(anim.floating_range.1),
        ));
    }

    let angles = light.angles();
    let [tx, ty, tz] = light.target;
    w.open("<Lightformer");
    w.line(format!("visible={{{}}}", light.visible));
    w.line(format!("form={}", string_literal(light.shape.form_name())));
    w.line(format!("intensity={{{}}}", num(light.intensity)));
    w.open("position={new THREE.Vector3().setFromSphericalCoords(");
    w.line(format!("{}, // distance", num(light.distance)));
    w.line(format!("{}, // phi", num(angles.phi)));
    w.line(format!("{} // theta", num(angles.theta)));
    w.close(")}");
    w.line(format!("rotation={{[0, 0, {}]}}", num(light.rotation)));
    w.line(format!(
        "scale={{[{}, {}, {}]}}",
        num(light.scale * light.scale_x),
        num(light.scale * light.scale_y),
        num(light.scale),
    ));
    w.line(format!("target={{[{}, {}, {}]}}", num(tx), num(ty), num(tz)));
    w.line("castShadow={false}");
    w.line("receiveShadow={false}");
    w.reopen(">");
    w.open(format!(
        "<LayerMaterial transparent alpha={{{}}} side={{THREE.DoubleSide}} toneMapped={{false}}>",
        num(light.opacity)
    ));
    write_layers(w, &light.kind);
    w.close("</LayerMaterial>");
    w.close("</Lightformer>");

    if anim.enabled {
        w.close("</Float>");
    }
}

fn write_layers(w: &mut CodeWriter, kind: &LightKind) {
    let hex = |c: &Color| string_literal(&c.to_hex());
    match kind {
        LightKind::Solid(p) => {
            w.line(format!("<Color color={} />", hex(&p.color)));
        }
        LightKind::Gradient(p) => {
            let axes = match p.axes {
                GradientAxis::X => "x",
                GradientAxis::Y => "y",
            };
            w.line(format!(
                "<Gradient colorA={} colorB={} contrast={{{}}} axes={} />",
                hex(&p.color_a),
                hex(&p.color_b),
                num(p.contrast),
                string_literal(axes),
            ));
        }
        LightKind::Noise(p) => {
            let noise = match p.noise_type {
                NoiseType::Perlin => "perlin",
                NoiseType::Simplex => "simplex",
                NoiseType::Cell => "cell",
                NoiseType::Curl => "curl",
            };
            w.line(format!(
                "<Noise colorA={} colorB={} colorC={} colorD={} type={} scale={{{}}} />",
                hex(&p.color_a),
                hex(&p.color_b),
                hex(&p.color_c),
                hex(&p.color_d),
                string_literal(noise),
                num(p.noise_scale),
            ));
        }
        LightKind::Texture(p) => {
            w.line(format!("<Texture map={{useTexture({})}} />", string_literal(&p.map)));
            w.line(format!(r#"<Color color={} mode="multiply" />"#, hex(&p.color)));
        }
        LightKind::ProceduralScrim(p) => {
            w.line(format!(
                "<ProceduralScrimLayer color={} lightPosition={{[{}, {}]}} lightDistance={{{}}} />",
                hex(&p.color),
                num(p.light_position.x),
                num(p.light_position.y),
                num(p.light_distance),
            ));
        }
        LightKind::ProceduralUmbrella(p) => {
            w.line(format!(
                "<ProceduralUmbrellaLayer color={} lightSides={{{}}} />",
                hex(&p.color),
                p.light_sides
            ));
        }
        // drawn as an enclosing sphere by write_light
        LightKind::SkyGradient(_) => {}
    }
}

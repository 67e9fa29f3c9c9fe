use anyhow::{anyhow, Context, Result};
use glam::Vec3;
use roxmltree::{Document, Node};
use serde::{Deserialize, Serialize};

use crate::obj::ObjMesh;

/// Selectable shading behavior for a submesh.
///
/// Runtime overrides pick from this list by digit key; there is no other way
/// to swap shaders while the viewer runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShadingMode {
    /// Checker texture modulated by diffuse lighting.
    Textured,
    /// Plain diffuse lighting over the material tint.
    Diffuse,
    /// Sky reflection blended with the tint from the eye direction.
    Reflective,
    /// Surface normals visualized as color.
    Normals,
}

impl ShadingMode {
    /// Every selectable mode, in keyboard order (digit 1 upward).
    pub const ALL: [ShadingMode; 4] = [
        ShadingMode::Textured,
        ShadingMode::Diffuse,
        ShadingMode::Reflective,
        ShadingMode::Normals,
    ];

    /// Maps a one-based selection index to a mode.
    pub fn from_index(index: usize) -> Option<Self> {
        index
            .checked_sub(1)
            .and_then(|index| Self::ALL.get(index).copied())
    }

    pub fn label(self) -> &'static str {
        match self {
            ShadingMode::Textured => "textured",
            ShadingMode::Diffuse => "diffuse",
            ShadingMode::Reflective => "reflective",
            ShadingMode::Normals => "normals",
        }
    }

    fn parse(value: &str) -> Result<Self> {
        match value {
            "textured" => Ok(ShadingMode::Textured),
            "diffuse" => Ok(ShadingMode::Diffuse),
            "reflective" => Ok(ShadingMode::Reflective),
            "normals" => Ok(ShadingMode::Normals),
            other => Err(anyhow!("unknown shading mode <{other}>")),
        }
    }
}

/// Material assignment for one named submesh.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialDescriptor {
    /// Submesh name the descriptor applies to.
    pub submesh: String,
    pub mode: ShadingMode,
    /// Color tint multiplied into the shaded result.
    #[serde(default = "default_tint")]
    pub tint: Vec3,
    /// Texture name, kept for manifests that reference external art. The
    /// viewer substitutes its generated checker for any value here.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub texture: Option<String>,
}

fn default_tint() -> Vec3 {
    Vec3::ONE
}

/// Submesh material assignments parsed from a manifest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialLibrary {
    pub materials: Vec<MaterialDescriptor>,
    /// Mode applied to submeshes the manifest does not name.
    pub default_mode: ShadingMode,
}

impl Default for MaterialLibrary {
    fn default() -> Self {
        Self {
            materials: Vec::new(),
            default_mode: ShadingMode::Textured,
        }
    }
}

/// Submesh index paired with its resolved material, produced once at load
/// time.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedMaterial {
    pub submesh_index: usize,
    pub descriptor: MaterialDescriptor,
}

impl MaterialLibrary {
    /// Parses the material manifest XML.
    ///
    /// ```xml
    /// <materials default="diffuse">
    ///     <material>
    ///         <submesh>body</submesh>
    ///         <mode>textured</mode>
    ///         <tint>255 255 255</tint>
    ///         <texture>checker</texture>
    ///     </material>
    /// </materials>
    /// ```
    pub fn from_xml(xml: &str) -> Result<Self> {
        let document = Document::parse(xml).context("invalid material manifest XML")?;
        let root = document.root_element();
        if !root.has_tag_name("materials") {
            return Err(anyhow!("manifest root element must be <materials>"));
        }

        let default_mode = match root.attribute("default") {
            Some(value) => ShadingMode::parse(value)?,
            None => ShadingMode::Textured,
        };

        let mut materials = Vec::new();
        for node in root.children().filter(|n| n.has_tag_name("material")) {
            let submesh = required_text(&node, "submesh")?;
            let mode = ShadingMode::parse(&required_text(&node, "mode")?)?;
            let tint = parse_tint(optional_text(&node, "tint"))?;
            let texture = optional_text(&node, "texture");
            materials.push(MaterialDescriptor {
                submesh,
                mode,
                tint,
                texture,
            });
        }

        Ok(Self {
            materials,
            default_mode,
        })
    }

    /// Looks up the descriptor for a submesh name.
    pub fn get(&self, submesh: &str) -> Option<&MaterialDescriptor> {
        self.materials
            .iter()
            .find(|material| material.submesh == submesh)
    }

    /// Resolves every submesh of the mesh to a material.
    ///
    /// This runs once when the model loads; the frame loop only ever sees the
    /// resolved list. Unmapped submeshes fall back to the library default
    /// mode with a white tint.
    pub fn resolve_for_mesh(&self, mesh: &ObjMesh) -> Vec<ResolvedMaterial> {
        mesh.submeshes
            .iter()
            .enumerate()
            .map(|(submesh_index, submesh)| {
                let descriptor = self.get(&submesh.name).cloned().unwrap_or_else(|| {
                    MaterialDescriptor {
                        submesh: submesh.name.clone(),
                        mode: self.default_mode,
                        tint: default_tint(),
                        texture: None,
                    }
                });
                ResolvedMaterial {
                    submesh_index,
                    descriptor,
                }
            })
            .collect()
    }
}

fn required_text(node: &Node<'_, '_>, tag: &str) -> Result<String> {
    optional_text(node, tag).ok_or_else(|| anyhow!("<{tag}> tag is missing"))
}

fn optional_text(node: &Node<'_, '_>, tag: &str) -> Option<String> {
    node.children()
        .find(|child| child.has_tag_name(tag))
        .and_then(|child| child.text())
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(|text| text.to_string())
}

fn parse_tint(value: Option<String>) -> Result<Vec3> {
    let Some(value) = value else {
        return Ok(default_tint());
    };
    let mut numbers = value
        .split_whitespace()
        .filter_map(|component| component.parse::<f32>().ok());
    let r = numbers
        .next()
        .ok_or_else(|| anyhow!("tint is missing components"))?;
    let g = numbers
        .next()
        .ok_or_else(|| anyhow!("tint is missing components"))?;
    let b = numbers
        .next()
        .ok_or_else(|| anyhow!("tint is missing components"))?;
    Ok(Vec3::new(r / 255.0, g / 255.0, b / 255.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::obj::load_obj_from_str;

    const SAMPLE: &str = r#"
    <materials default="diffuse">
        <material>
            <submesh>body</submesh>
            <mode>textured</mode>
            <tint>255 128 0</tint>
            <texture>checker</texture>
        </material>
        <material>
            <submesh>visor</submesh>
            <mode>reflective</mode>
        </material>
    </materials>
    "#;

    #[test]
    fn parse_manifest_populates_materials() {
        let library = MaterialLibrary::from_xml(SAMPLE).unwrap();
        assert_eq!(library.materials.len(), 2);
        assert_eq!(library.default_mode, ShadingMode::Diffuse);

        let body = library.get("body").unwrap();
        assert_eq!(body.mode, ShadingMode::Textured);
        assert_eq!(body.tint, Vec3::new(1.0, 128.0 / 255.0, 0.0));
        assert_eq!(body.texture.as_deref(), Some("checker"));

        let visor = library.get("visor").unwrap();
        assert_eq!(visor.mode, ShadingMode::Reflective);
        assert_eq!(visor.tint, Vec3::ONE);
    }

    #[test]
    fn missing_submesh_tag_is_an_error() {
        let bad = "<materials><material><mode>diffuse</mode></material></materials>";
        assert!(MaterialLibrary::from_xml(bad).is_err());
    }

    #[test]
    fn unknown_mode_is_an_error() {
        let bad =
            "<materials><material><submesh>a</submesh><mode>glitter</mode></material></materials>";
        assert!(MaterialLibrary::from_xml(bad).is_err());
    }

    #[test]
    fn resolution_covers_every_submesh_once() {
        let obj = "\
v 0 0 0
v 1 0 0
v 0 1 0
v 1 1 0
usemtl body
f 1 2 3
usemtl fin
f 2 4 3
";
        let mesh = load_obj_from_str(obj).unwrap();
        let library = MaterialLibrary::from_xml(SAMPLE).unwrap();
        let resolved = library.resolve_for_mesh(&mesh);

        assert_eq!(resolved.len(), 2);
        assert_eq!(resolved[0].descriptor.mode, ShadingMode::Textured);
        // "fin" is not in the manifest: default mode applies.
        assert_eq!(resolved[1].descriptor.mode, ShadingMode::Diffuse);
        assert_eq!(resolved[1].descriptor.submesh, "fin");
    }

    #[test]
    fn digit_selection_maps_to_modes() {
        assert_eq!(ShadingMode::from_index(1), Some(ShadingMode::Textured));
        assert_eq!(ShadingMode::from_index(4), Some(ShadingMode::Normals));
        assert_eq!(ShadingMode::from_index(0), None);
        assert_eq!(ShadingMode::from_index(5), None);
    }
}

use std::collections::HashSet;
use std::sync::Arc;

use base64::Engine;
use glam::{Affine3A, Mat4, Quat, Vec3, Vec4};
use rustc_hash::FxHashMap;

use crate::animation::{
    AnimationClip, InterpolationMode, KeyframeTrack, Track,
};
use crate::assets::io::AssetReader;
use crate::assets::loader::LoadProgress;
use crate::assets::prefab::{Prefab, PrefabNode, PrefabSkeleton};
use crate::errors::{Result, StageError};
use crate::resources::{
    ColorSpace, Geometry, Mesh, MeshStandardMaterial, Side, Texture, TextureSampler,
};
use crate::scene::Transform;

/// glTF 2.0 loader producing a [`Prefab`].
///
/// Supports `.glb` and `.gltf`, buffers and images from the GLB chunk,
/// `data:` URIs, or files next to the model.
pub struct GltfLoader<'a, R: AssetReader> {
    reader: &'a R,
}

impl<'a, R: AssetReader> GltfLoader<'a, R> {
    pub fn new(reader: &'a R) -> Self {
        Self { reader }
    }

    /// Reads `uri` through the reader, reporting progress for the main file
    /// only, then parses it.
    pub async fn load<F>(&self, uri: &str, on_progress: F) -> Result<Prefab>
    where
        F: FnMut(LoadProgress) + Send,
    {
        let bytes = self.reader.read_bytes(uri, on_progress).await?;
        let gltf = gltf::Gltf::from_slice(&bytes)?;

        let buffers = self.load_buffers(&gltf).await?;
        let images = self.load_images(&gltf, &buffers).await?;

        build_prefab(&gltf, &buffers, &images)
    }

    async fn load_buffers(&self, gltf: &gltf::Gltf) -> Result<Vec<Vec<u8>>> {
        let mut buffer_data = Vec::new();
        for buffer in gltf.buffers() {
            let data = match buffer.source() {
                gltf::buffer::Source::Bin => gltf
                    .blob
                    .clone()
                    .ok_or_else(|| StageError::InvalidAsset("Missing GLB binary chunk".to_string()))?,
                gltf::buffer::Source::Uri(uri) => self.read_uri(uri).await?,
            };
            if data.len() < buffer.length() {
                return Err(StageError::InvalidAsset(format!(
                    "Buffer {} holds {} bytes, expected {}",
                    buffer.index(),
                    data.len(),
                    buffer.length()
                )));
            }
            buffer_data.push(data);
        }
        Ok(buffer_data)
    }

    /// 解码所有图像，按 glTF image 索引存放
    async fn load_images(&self, gltf: &gltf::Gltf, buffers: &[Vec<u8>]) -> Result<Vec<(u32, u32, Vec<u8>)>> {
        let mut images = Vec::new();
        for image in gltf.images() {
            let bytes = match image.source() {
                gltf::image::Source::View { view, .. } => {
                    let start = view.offset();
                    let end = start + view.length();
                    buffers
                        .get(view.buffer().index())
                        .and_then(|b| b.get(start..end))
                        .ok_or_else(|| {
                            StageError::InvalidAsset(format!("Image {} view out of range", image.index()))
                        })?
                        .to_vec()
                }
                gltf::image::Source::Uri { uri, .. } => self.read_uri(uri).await?,
            };
            let rgba = image::load_from_memory(&bytes)?.to_rgba8();
            images.push((rgba.width(), rgba.height(), rgba.into_raw()));
        }
        Ok(images)
    }

    async fn read_uri(&self, uri: &str) -> Result<Vec<u8>> {
        match decode_data_uri(uri) {
            Some(decoded) => decoded,
            None => self.reader.read_bytes(uri, |_| {}).await,
        }
    }
}

/// `Some` for `data:` URIs, `None` for anything to be fetched.
fn decode_data_uri(uri: &str) -> Option<Result<Vec<u8>>> {
    let rest = uri.strip_prefix("data:")?;
    let Some((header, payload)) = rest.split_once(',') else {
        return Some(Err(StageError::InvalidAsset("Malformed data URI".to_string())));
    };
    if !header.ends_with(";base64") {
        return Some(Err(StageError::InvalidAsset(
            "Only base64 data URIs are supported".to_string(),
        )));
    }
    Some(
        base64::engine::general_purpose::STANDARD
            .decode(payload)
            .map_err(StageError::from),
    )
}

// ============================================================================
// Prefab construction (sync; all bytes are in memory)
// ============================================================================

/// Builds a [`Prefab`] from a parsed document and its resolved buffers and
/// decoded images.
pub fn build_prefab(gltf: &gltf::Document, buffers: &[Vec<u8>], images: &[(u32, u32, Vec<u8>)]) -> Result<Prefab> {
    let mut ctx = PrefabContext {
        buffers,
        textures: FxHashMap::default(),
        materials: FxHashMap::default(),
        default_material: Arc::new(MeshStandardMaterial::default()),
        images,
    };

    let mut prefab = Prefab::new();

    // 1. 节点（浅层）
    for node in gltf.nodes() {
        let (t, r, s) = node.transform().decomposed();
        prefab.nodes.push(PrefabNode {
            name: Some(node_name(&node)),
            transform: Transform::from_trs(Vec3::from_array(t), Quat::from_array(r), Vec3::from_array(s)),
            children_indices: node.children().map(|c| c.index()).collect(),
            mesh: None,
            skin_index: node.skin().map(|s| s.index()),
        });
    }

    // 2. 网格：单 primitive 直接挂在节点上，多 primitive 拆成子节点
    for node in gltf.nodes() {
        let Some(mesh) = node.mesh() else {
            continue;
        };
        let mesh_name = mesh.name().map_or_else(|| format!("Mesh_{}", mesh.index()), str::to_string);
        let primitives: Vec<_> = mesh
            .primitives()
            .filter(|p| p.mode() == gltf::mesh::Mode::Triangles)
            .collect();

        if let [primitive] = primitives.as_slice() {
            prefab.nodes[node.index()].mesh = Some(ctx.load_primitive(&mesh_name, primitive)?);
            continue;
        }
        for (i, primitive) in primitives.iter().enumerate() {
            let name = format!("{mesh_name}_{i}");
            let child_index = prefab.nodes.len();
            prefab.nodes.push(PrefabNode {
                name: Some(name.clone()),
                transform: Transform::new(),
                children_indices: Vec::new(),
                mesh: Some(ctx.load_primitive(&name, primitive)?),
                skin_index: node.skin().map(|s| s.index()),
            });
            prefab.nodes[node.index()].children_indices.push(child_index);
        }
    }

    // 3. 根节点
    let scene = gltf.default_scene().or_else(|| gltf.scenes().next());
    prefab.root_indices = match scene {
        Some(scene) => scene.nodes().map(|n| n.index()).collect(),
        None => {
            let children: HashSet<usize> = gltf.nodes().flat_map(|n| n.children().map(|c| c.index())).collect();
            (0..gltf.nodes().len()).filter(|i| !children.contains(i)).collect()
        }
    };

    // 4. 骨骼
    for skin in gltf.skins() {
        prefab.skeletons.push(load_skin(&skin, buffers));
    }

    // 5. 动画
    prefab.animations = load_animations(gltf, buffers)?;

    Ok(prefab)
}

fn node_name(node: &gltf::Node) -> String {
    node.name().map_or_else(|| format!("Node_{}", node.index()), str::to_string)
}

struct PrefabContext<'a> {
    buffers: &'a [Vec<u8>],
    images: &'a [(u32, u32, Vec<u8>)],
    textures: FxHashMap<usize, Arc<Texture>>,
    materials: FxHashMap<usize, Arc<MeshStandardMaterial>>,
    default_material: Arc<MeshStandardMaterial>,
}

impl PrefabContext<'_> {
    fn load_primitive(&mut self, name: &str, primitive: &gltf::Primitive) -> Result<Mesh> {
        let geometry = self.load_primitive_geometry(name, primitive)?;
        let material = self.material(&primitive.material())?;
        Ok(Mesh::new(Arc::new(geometry), material).with_name(name))
    }

    fn load_primitive_geometry(&self, name: &str, primitive: &gltf::Primitive) -> Result<Geometry> {
        let buffers = self.buffers;
        let reader = primitive.reader(|buffer| buffers.get(buffer.index()).map(Vec::as_slice));

        let mut geometry = Geometry::new();
        geometry.positions = reader
            .read_positions()
            .ok_or_else(|| StageError::InvalidAsset(format!("Primitive of '{name}' has no positions")))?
            .collect();

        if let Some(iter) = reader.read_normals() {
            geometry.normals = iter.collect();
        }
        if let Some(iter) = reader.read_tex_coords(0) {
            geometry.uvs = iter.into_f32().collect();
        }
        if let Some(iter) = reader.read_joints(0) {
            geometry.joints = iter.into_u16().collect();
        }
        if let Some(iter) = reader.read_weights(0) {
            geometry.weights = iter.into_f32().collect();
        }
        if let Some(iter) = reader.read_indices() {
            geometry.indices = iter.into_u32().collect();
        }

        geometry.fill_missing_attributes();
        Ok(geometry)
    }

    fn material(&mut self, material: &gltf::Material) -> Result<Arc<MeshStandardMaterial>> {
        let Some(index) = material.index() else {
            return Ok(Arc::clone(&self.default_material));
        };
        if let Some(cached) = self.materials.get(&index) {
            return Ok(Arc::clone(cached));
        }

        let pbr = material.pbr_metallic_roughness();
        let mut engine_mat = MeshStandardMaterial::new(Vec4::from_array(pbr.base_color_factor()))
            .with_roughness(pbr.roughness_factor())
            .with_metalness(pbr.metallic_factor());
        engine_mat.emissive = Vec3::from_array(material.emissive_factor());
        if let Some(name) = material.name() {
            engine_mat.name = name.to_string();
        }
        if material.double_sided() {
            engine_mat.side = Side::Double;
        }
        if let Some(info) = pbr.base_color_texture() {
            engine_mat.map = Some(self.texture(&info.texture())?);
        }

        let engine_mat = Arc::new(engine_mat);
        self.materials.insert(index, Arc::clone(&engine_mat));
        Ok(engine_mat)
    }

    fn texture(&mut self, texture: &gltf::Texture) -> Result<Arc<Texture>> {
        if let Some(cached) = self.textures.get(&texture.index()) {
            return Ok(Arc::clone(cached));
        }

        let image_index = texture.source().index();
        let (width, height, data) = self
            .images
            .get(image_index)
            .ok_or_else(|| StageError::InvalidAsset(format!("Texture refers to missing image {image_index}")))?;

        let name = texture.name().map_or_else(|| format!("Texture_{}", texture.index()), str::to_string);
        let mut engine_tex = Texture::new_rgba8(name, *width, *height, data.clone());
        engine_tex.color_space = ColorSpace::Srgb;
        engine_tex.sampler = convert_sampler(&texture.sampler());

        let engine_tex = Arc::new(engine_tex);
        self.textures.insert(texture.index(), Arc::clone(&engine_tex));
        Ok(engine_tex)
    }
}

fn convert_sampler(sampler: &gltf::texture::Sampler) -> TextureSampler {
    use gltf::texture::{MagFilter, MinFilter, WrappingMode};

    let wrap = |mode: WrappingMode| match mode {
        WrappingMode::ClampToEdge => wgpu::AddressMode::ClampToEdge,
        WrappingMode::MirroredRepeat => wgpu::AddressMode::MirrorRepeat,
        WrappingMode::Repeat => wgpu::AddressMode::Repeat,
    };

    TextureSampler {
        address_mode_u: wrap(sampler.wrap_s()),
        address_mode_v: wrap(sampler.wrap_t()),
        mag_filter: match sampler.mag_filter() {
            Some(MagFilter::Nearest) => wgpu::FilterMode::Nearest,
            _ => wgpu::FilterMode::Linear,
        },
        min_filter: match sampler.min_filter() {
            Some(MinFilter::Nearest | MinFilter::NearestMipmapNearest | MinFilter::NearestMipmapLinear) => {
                wgpu::FilterMode::Nearest
            }
            _ => wgpu::FilterMode::Linear,
        },
    }
}

fn load_skin(skin: &gltf::Skin, buffers: &[Vec<u8>]) -> PrefabSkeleton {
    let name = skin.name().unwrap_or("Skeleton").to_string();
    let joints: Vec<gltf::Node> = skin.joints().collect();

    // 1. Inverse Bind Matrices
    let reader = skin.reader(|buffer| buffers.get(buffer.index()).map(Vec::as_slice));
    let inverse_bind_matrices: Vec<Affine3A> = match reader.read_inverse_bind_matrices() {
        Some(iter) => iter
            .map(|m| Affine3A::from_mat4(Mat4::from_cols_array_2d(&m)))
            .collect(),
        None => vec![Affine3A::IDENTITY; joints.len()],
    };

    // 2. 根骨骼：优先使用显式的 skeleton，否则取第一个在关节集合内没有父节点的骨骼
    let joint_indices: HashSet<usize> = joints.iter().map(gltf::Node::index).collect();
    let child_joints: HashSet<usize> = joints
        .iter()
        .flat_map(|n| n.children().map(|c| c.index()))
        .filter(|i| joint_indices.contains(i))
        .collect();

    let root_bone_index = skin
        .skeleton()
        .and_then(|root| joints.iter().position(|n| n.index() == root.index()))
        .or_else(|| joints.iter().position(|n| !child_joints.contains(&n.index())))
        .unwrap_or(0);

    PrefabSkeleton {
        name,
        root_bone_index,
        bone_indices: joints.iter().map(gltf::Node::index).collect(),
        inverse_bind_matrices,
    }
}

fn load_animations(gltf: &gltf::Document, buffers: &[Vec<u8>]) -> Result<Vec<Arc<AnimationClip>>> {
    use gltf::animation::{Interpolation, Property, util::ReadOutputs};

    let mut animations = Vec::new();

    for anim in gltf.animations() {
        let mut tracks = Vec::new();

        for channel in anim.channels() {
            let reader = channel.reader(|buffer| buffers.get(buffer.index()).map(Vec::as_slice));
            let node_name = node_name(&channel.target().node());

            let Some(inputs) = reader.read_inputs() else {
                log::warn!("Animation channel on '{node_name}' has no keyframe times, skipped");
                continue;
            };
            let times: Vec<f32> = inputs.collect();

            let interpolation = match channel.sampler().interpolation() {
                Interpolation::Linear => InterpolationMode::Linear,
                Interpolation::Step => InterpolationMode::Step,
                Interpolation::CubicSpline => InterpolationMode::CubicSpline,
            };

            let track = match (channel.target().property(), reader.read_outputs()) {
                (Property::Translation, Some(ReadOutputs::Translations(iter))) => Track::translation(
                    node_name,
                    KeyframeTrack::new(times, iter.map(Vec3::from_array).collect(), interpolation),
                ),
                (Property::Rotation, Some(ReadOutputs::Rotations(iter))) => Track::rotation(
                    node_name,
                    KeyframeTrack::new(times, iter.into_f32().map(Quat::from_array).collect(), interpolation),
                ),
                (Property::Scale, Some(ReadOutputs::Scales(iter))) => Track::scale(
                    node_name,
                    KeyframeTrack::new(times, iter.map(Vec3::from_array).collect(), interpolation),
                ),
                // Morph target weights are not animated by the stage.
                _ => continue,
            };
            if !track.data.is_consistent() {
                log::warn!(
                    "Animation '{}': channel {:?} on '{}' has keyframe values that do not match its times, skipped",
                    anim.name().unwrap_or_default(),
                    track.meta.target,
                    track.meta.node_name,
                );
                continue;
            }
            tracks.push(track);
        }

        let name = anim.name().map_or_else(|| format!("Animation_{}", anim.index()), str::to_string);
        animations.push(Arc::new(AnimationClip::new(name, tracks)));
    }

    Ok(animations)
}

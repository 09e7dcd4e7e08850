//! [`GpuBackend`] on top of a `wgpu` device.

use crate::error::{
    BackendError, EmptyMeshErr, NoAdapterErr, NoBackendSelectedErr, RequestDeviceErr,
    ShaderCompilationErr, TextureTooLargeErr, UnsupportedBackendErr,
};
use crate::gpu::GpuBackend;
use futures::executor::block_on;
use more_asserts::debug_assert_le;
use snafu::{OptionExt, ResultExt, ensure};
use std::borrow::Cow;
use std::sync::Arc;
use strata_asset::{DecodedImage, Mesh, ShaderSources, ShaderStage};
use strata_utils::RuntimeArgs;
use tracing::{debug, info, trace};
use wgpu::util::{BufferInitDescriptor, DeviceExt, TextureDataOrder};
use wgpu::{
    Adapter, Backends, BufferUsages, CompilationMessageType, Device, DeviceDescriptor,
    ExperimentalFeatures, Extent3d, Features, Instance, InstanceDescriptor, Limits, MemoryHints,
    PowerPreference, Queue, RequestAdapterOptions, ShaderModuleDescriptor, ShaderSource,
    TextureDescriptor, TextureDimension, TextureFormat, TextureUsages,
};

const DEFAULT_BACKENDS: &[&str] = &["dx12", "metal", "vulkan", "gl"];

type Result<T, E = BackendError> = std::result::Result<T, E>;

#[derive(Debug)]
pub struct WgpuTexture {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
}

#[derive(Debug)]
pub struct WgpuMeshBuffer {
    pub vertex_buffer: wgpu::Buffer,
    pub vertex_count: u32,
    pub index_buffer: Option<wgpu::Buffer>,
    pub index_count: u32,
}

impl WgpuMeshBuffer {
    pub fn bind(&self, pass: &mut wgpu::RenderPass<'_>) {
        pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        if let Some(index_buffer) = &self.index_buffer {
            pass.set_index_buffer(index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        }
    }

    pub fn draw(&self, pass: &mut wgpu::RenderPass<'_>) {
        self.bind(pass);
        if self.index_buffer.is_some() {
            pass.draw_indexed(0..self.index_count, 0, 0..1);
        } else {
            pass.draw(0..self.vertex_count, 0..1);
        }
    }
}

#[derive(Debug)]
pub struct WgpuProgram {
    pub module: wgpu::ShaderModule,
    pub stages: Vec<ShaderStage>,
}

pub struct WgpuBackend {
    device: Arc<Device>,
    queue: Arc<Queue>,
}

fn parse_backend(name: &str) -> Result<Backends> {
    let backend = match name {
        "vulkan" | "vk" => Backends::VULKAN,
        "metal" | "mtl" => Backends::METAL,
        "dx12" | "d3d12" => Backends::DX12,
        "gl" | "opengl" | "gles" => Backends::GL,
        "webgpu" => Backends::BROWSER_WEBGPU,
        _ => return UnsupportedBackendErr { name }.fail(),
    };

    ensure!(
        Instance::enabled_backend_features().contains(backend),
        UnsupportedBackendErr { name }
    );
    Ok(backend)
}

impl WgpuBackend {
    /// Wraps an existing device, e.g. one shared with a windowing layer.
    pub fn from_device(device: Arc<Device>, queue: Arc<Queue>) -> Self {
        WgpuBackend { device, queue }
    }

    /// Creates a headless device on the first usable backend of `--force-backend`,
    /// or of the platform defaults.
    pub fn new() -> Result<Self> {
        match &RuntimeArgs::get().force_backend {
            Some(names) => Self::with_backends(names),
            None => {
                let available: Vec<&str> = DEFAULT_BACKENDS
                    .iter()
                    .copied()
                    .filter(|name| parse_backend(name).is_ok())
                    .collect();
                Self::with_backends(&available)
            }
        }
    }

    /// Tries the backends in order. Every name has to be known and compiled in.
    pub fn with_backends(names: &[impl AsRef<str>]) -> Result<Self> {
        ensure!(!names.is_empty(), NoBackendSelectedErr);

        let backends = names
            .iter()
            .map(|name| parse_backend(name.as_ref()))
            .collect::<Result<Vec<_>>>()?;
        trace!("Starting with backends: {backends:?}");

        for backend in backends {
            let mut desc = InstanceDescriptor::from_env_or_default();
            desc.backends = backend;

            let instance = Instance::new(&desc);
            match block_on(Self::setup_adapter(&instance)) {
                Some(adapter) => {
                    info!("Selected backend: {:?}", adapter.get_info().backend);
                    let (device, queue) = block_on(Self::get_device_and_queue(&adapter))?;
                    return Ok(WgpuBackend { device, queue });
                }
                None => debug!("No adapter on backend {backend:?}"),
            }
        }

        NoAdapterErr.fail()
    }

    async fn setup_adapter(instance: &Instance) -> Option<Adapter> {
        instance
            .request_adapter(&RequestAdapterOptions {
                power_preference: PowerPreference::HighPerformance,
                compatible_surface: None,
                ..RequestAdapterOptions::default()
            })
            .await
            .ok()
    }

    async fn get_device_and_queue(adapter: &Adapter) -> Result<(Arc<Device>, Arc<Queue>)> {
        let (device, queue) = adapter
            .request_device(&DeviceDescriptor {
                label: Some("Strata Device"),
                required_features: Features::default(),
                required_limits: Limits::default(),
                experimental_features: ExperimentalFeatures::disabled(),
                memory_hints: MemoryHints::default(),
                trace: wgpu::Trace::Off,
            })
            .await
            .context(RequestDeviceErr)?;

        Ok((Arc::new(device), Arc::new(queue)))
    }

    pub fn device(&self) -> &Device {
        &self.device
    }

    pub fn queue(&self) -> &Queue {
        &self.queue
    }
}

impl GpuBackend for WgpuBackend {
    type Texture = WgpuTexture;
    type MeshBuffer = WgpuMeshBuffer;
    type Program = WgpuProgram;

    #[profiling::function]
    fn create_texture(&self, label: &str, image: &DecodedImage) -> Result<WgpuTexture> {
        let max = self.device.limits().max_texture_dimension_2d;
        ensure!(
            image.width <= max && image.height <= max,
            TextureTooLargeErr {
                width: image.width,
                height: image.height,
                max,
            }
        );
        debug_assert_le!(
            image.width as usize * image.height as usize * 4,
            image.byte_len()
        );

        let texture = self.device.create_texture_with_data(
            &self.queue,
            &TextureDescriptor {
                label: Some(label),
                size: Extent3d {
                    width: image.width,
                    height: image.height,
                    depth_or_array_layers: 1,
                },
                mip_level_count: 1,
                sample_count: 1,
                dimension: TextureDimension::D2,
                format: TextureFormat::Rgba8UnormSrgb,
                usage: TextureUsages::TEXTURE_BINDING | TextureUsages::COPY_DST,
                view_formats: &[],
            },
            TextureDataOrder::LayerMajor,
            &image.pixels,
        );
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        Ok(WgpuTexture { texture, view })
    }

    #[profiling::function]
    fn create_mesh_buffer(&self, mesh: &Mesh) -> Result<WgpuMeshBuffer> {
        ensure!(!mesh.is_empty(), EmptyMeshErr);

        let vertex_buffer = self.device.create_buffer_init(&BufferInitDescriptor {
            label: Some("Mesh Vertex Buffer"),
            contents: bytemuck::cast_slice(mesh.vertices()),
            usage: BufferUsages::VERTEX,
        });
        let index_buffer = mesh.indices().map(|indices| {
            self.device.create_buffer_init(&BufferInitDescriptor {
                label: Some("Mesh Index Buffer"),
                contents: bytemuck::cast_slice(indices),
                usage: BufferUsages::INDEX,
            })
        });

        Ok(WgpuMeshBuffer {
            vertex_buffer,
            vertex_count: mesh.vertex_count() as u32,
            index_buffer,
            index_count: mesh.indices_count() as u32,
        })
    }

    #[profiling::function]
    fn compile_program(&self, sources: &ShaderSources) -> Result<WgpuProgram> {
        let module = self.device.create_shader_module(ShaderModuleDescriptor {
            label: Some("Strata Shader Program"),
            source: ShaderSource::Wgsl(Cow::Owned(sources.combined())),
        });

        let info = block_on(module.get_compilation_info());
        let errors: Vec<&str> = info
            .messages
            .iter()
            .filter(|msg| matches!(msg.message_type, CompilationMessageType::Error))
            .map(|msg| msg.message.as_str())
            .collect();
        ensure!(
            errors.is_empty(),
            ShaderCompilationErr {
                message: errors.join("\n")
            }
        );

        Ok(WgpuProgram {
            module,
            stages: sources.stages().map(|(stage, _)| stage).collect(),
        })
    }
}

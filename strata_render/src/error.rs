use std::path::PathBuf;
use std::thread::ThreadId;
use snafu::Snafu;

#[derive(Debug, Snafu)]
#[snafu(context(suffix(Err)), visibility(pub(crate)))]
pub enum BackendError {
    #[snafu(display("No graphics API was selected"))]
    NoBackendSelected,

    #[snafu(display("The graphics API \"{name}\" is not supported"))]
    UnsupportedBackend { name: String },

    #[snafu(display("Couldn't find an adapter for any of the selected graphics APIs"))]
    NoAdapter,

    #[cfg(feature = "wgpu")]
    #[snafu(display("Unable to get device: {source}"))]
    RequestDevice { source: wgpu::RequestDeviceError },

    #[snafu(display("Texture of {width}x{height} exceeds the device limit of {max}"))]
    TextureTooLarge { width: u32, height: u32, max: u32 },

    #[snafu(display("Refusing to create a GPU buffer for an empty mesh"))]
    EmptyMesh,

    #[snafu(display("Shader has no stages"))]
    EmptyShader,

    #[snafu(display("Shader failed to compile: {message}"))]
    ShaderCompilation { message: String },

    #[snafu(display("The GPU thread is already bound to {owner:?}"))]
    GpuThreadTaken { owner: ThreadId },
}

#[derive(Debug, Snafu)]
#[snafu(context(suffix(Err)), visibility(pub(crate)))]
pub enum ImageLoadError {
    #[snafu(display("Failed to decode image {}: {source}", path.display()))]
    Decode {
        path: PathBuf,
        source: image::ImageError,
    },

    #[snafu(display("Image {} has no pixels", path.display()))]
    EmptyImage { path: PathBuf },

    #[snafu(display("Failed to load image {}: {message}", path.display()))]
    Load { path: PathBuf, message: String },
}

#[derive(Debug, Snafu)]
#[snafu(context(suffix(Err)), visibility(pub(crate)))]
pub enum WorkerError {
    #[snafu(display("Failed to spawn thread \"{name}\": {source}"))]
    Spawn {
        name: String,
        source: std::io::Error,
    },
}

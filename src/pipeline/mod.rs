pub(crate) mod config;
pub(crate) mod import;
pub(crate) mod synthesis;

/// Pixel format tag shared by the texture export and YUV import tools.
pub const PIXEL_FORMAT: &str = "ycbcr420";

pub const EXPORT_TEXTURE_TOOL: &str = "vsrs/export_texture";
pub const EXPORT_DEPTH_TOOL: &str = "vsrs/export_depth";
pub const CAMERA_EXPORT_TOOL: &str = "camera/export_mpeg";
pub const YUV_IMPORT_TOOL: &str = "misc/yuv_import";
pub const DEPTH_REPROJECTION_TOOL: &str = "kinect/depth_reprojection";

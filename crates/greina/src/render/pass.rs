//! Render pass orchestration.
//!
//! One pass per frame: clear color and depth, then encode whatever the
//! fractals submitted to the [`WgpuBackend`] during the tick.

use super::gpu::GpuContext;
use super::wgpu_backend::WgpuBackend;

/// Background color of the frame.
#[derive(Debug, Clone, Copy)]
pub struct ClearColor(pub [f64; 4]);

impl Default for ClearColor {
    fn default() -> Self {
        Self([0.05, 0.05, 0.08, 1.0])
    }
}

/// Render a single frame and present it.
///
/// Returns the number of indirect draws encoded. If no surface texture can be
/// acquired, the draws recorded for this frame are discarded and the surface
/// error is returned.
pub fn render_frame(
    gpu: &GpuContext,
    backend: &mut WgpuBackend,
    clear_color: ClearColor,
) -> Result<usize, wgpu::SurfaceError> {
    let (width, height) = gpu.surface_size();
    backend.resize(width, height);

    let output = match gpu.surface.get_current_texture() {
        Ok(output) => output,
        Err(e) => {
            let dropped = backend.discard_draws();
            log::debug!("Frame skipped ({e}), dropped {dropped} recorded draws");
            return Err(e);
        }
    };
    let view = output
        .texture
        .create_view(&wgpu::TextureViewDescriptor::default());
    let mut encoder = gpu
        .device
        .create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("greina frame encoder"),
        });

    let encoded = {
        let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("fractal render pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: &view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color {
                        r: clear_color.0[0],
                        g: clear_color.0[1],
                        b: clear_color.0[2],
                        a: clear_color.0[3],
                    }),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: &backend.pipeline.depth_texture,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
        });
        log::trace!("Encoding {} recorded draws", backend.pending_draws());
        backend.encode(&mut render_pass)
    };

    gpu.queue.submit(std::iter::once(encoder.finish()));
    output.present();

    Ok(encoded)
}

pub(crate) mod buffers;
pub(crate) mod pass;
pub(crate) mod passes;

pub(crate) use crate::shaders::Shaders;

use glam::UVec2;
use glimmer_gpu::{FrameParams, PassParams};

use self::buffers::FrameBuffers;
use self::passes::Passes;
use crate::{
    Camera, FrameDecision, GiConfig, HistoryEvent, PipelineState, Texture,
};

/// External per-frame resources, supplied by the host frame pipeline.
///
/// Texture views are cheap handles; the renderer keeps clones and rebuilds
/// its bind groups whenever a new set is supplied.
#[derive(Clone, Debug)]
pub struct FrameInputs {
    /// Min-filtered depth pyramid over the full screen; mip 0 is the full
    /// resolution, every level halves each axis and keeps the closest depth.
    /// Expected as a color-format (`r32float`-class) mip chain.
    pub depth: wgpu::TextureView,

    /// Camera-space normals at full resolution.
    pub normals: wgpu::TextureView,

    /// Per-pixel uv motion from the current to the previous frame; the host
    /// passes a zero/black placeholder when motion is unavailable.
    pub motion: wgpu::TextureView,

    /// Previous frame's color mip chain; its absence short-circuits the
    /// whole frame to a black output.
    pub prev_color: Option<wgpu::TextureView>,

    /// Previous frame's depth, kept by the broader frame pipeline; without
    /// it every history sample is treated as untrustworthy.
    pub history_depth: Option<wgpu::TextureView>,

    /// Previous frame's normals, same provenance as `history_depth`.
    pub history_normals: Option<wgpu::TextureView>,
}

/// Per-frame scalars that change every frame, unlike [`FrameInputs`].
#[derive(Clone, Debug)]
pub struct FrameContext {
    pub camera: Camera,
    pub exposure: f32,
    pub prev_exposure: f32,

    /// Nominally `1.0`; the host lowers it when it knows history is stale.
    pub history_validity: f32,
}

/// The indirect-diffuse pipeline, GPU flavour.
#[derive(Debug)]
pub struct GiRenderer {
    config: GiConfig,
    state: PipelineState,
    shaders: Shaders,
    sampler: wgpu::Sampler,
    output: Texture,
    inputs: Option<FrameInputs>,
    resources: Option<(FrameBuffers, Passes)>,
}

impl GiRenderer {
    pub fn new(device: &wgpu::Device, config: GiConfig, camera: &Camera) -> Self {
        log::info!("Creating renderer; camera={{ {} }}", camera.describe());

        let shaders = Shaders::new(device);

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("glimmer_input_sampler"),
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        let output = Texture::new(
            device,
            "glimmer_output",
            camera.screen_size,
            wgpu::TextureFormat::Rgba16Float,
        );

        Self {
            config: config.sanitized(),
            state: PipelineState::default(),
            shaders,
            sampler,
            output,
            inputs: None,
            resources: None,
        }
    }

    pub fn config(&self) -> &GiConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: GiConfig) {
        self.config = config.sanitized();
    }

    /// Supplies (or replaces) the external resources; bind groups are
    /// rebuilt lazily on the next rendered frame.
    pub fn set_inputs(&mut self, inputs: FrameInputs) {
        self.inputs = Some(inputs);
        self.resources = None;
    }

    /// Discards accumulated history; the next frame renders as a first
    /// frame.
    pub fn reset_history(&mut self) {
        log::debug!("Resetting history");

        self.state.reset_history();
    }

    pub fn output(&self) -> &Texture {
        &self.output
    }

    /// Renders one frame of indirect diffuse into the output texture.
    ///
    /// Never fails: with the pipeline disabled or the previous-frame color
    /// missing the output is cleared to black and nothing is dispatched.
    pub fn render_indirect_diffuse(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        encoder: &mut wgpu::CommandEncoder,
        ctx: &FrameContext,
    ) -> &Texture {
        let screen_size = ctx.camera.screen_size;

        if self.output.size() != screen_size {
            self.output = Texture::new(
                device,
                "glimmer_output",
                screen_size,
                wgpu::TextureFormat::Rgba16Float,
            );

            self.resources = None;
        }

        let prev_color_ok = self
            .inputs
            .as_ref()
            .is_some_and(|inputs| inputs.prev_color.is_some());

        let decision = FrameDecision::new(
            &self.config,
            screen_size,
            prev_color_ok,
            &mut self.state,
        );

        let plan = match decision {
            FrameDecision::Skip(reason) => {
                log::debug!("Skipping frame: {reason:?}");

                self.output.clear(encoder);

                // Stale radiance must not survive an input outage
                if let Some((buffers, _)) = &self.resources {
                    for history in &buffers.history {
                        history.clear(encoder);
                    }
                }

                self.state.reset_history();

                return &self.output;
            }

            FrameDecision::Run(plan) => plan,
        };

        let Some(inputs) = self.inputs.clone() else {
            return &self.output;
        };

        let stale = self
            .resources
            .as_ref()
            .is_none_or(|(buffers, _)| {
                buffers.working_size() != plan.working_size
            });

        if stale {
            let buffers = FrameBuffers::new(device, plan.working_size);

            let passes = Passes::new(
                device,
                &self.shaders,
                &buffers,
                &inputs,
                &self.output,
                &self.sampler,
            );

            self.resources = Some((buffers, passes));
        }

        let Some((buffers, passes)) = self.resources.as_mut() else {
            return &self.output;
        };

        let config = &self.config;
        let working_camera = ctx.camera.serialize().at_scale(plan.resolution_scale);

        // Without depth/normal history the validator has nothing to compare
        // against; the whole mask goes invalid
        let history_validity = if plan.history_event == HistoryEvent::Reallocated
            || inputs.history_depth.is_none()
            || inputs.history_normals.is_none()
        {
            0.0
        } else {
            ctx.history_validity
        };

        *buffers.camera = working_camera;

        *buffers.frame = FrameParams::build(
            &working_camera,
            self.state.frame(),
            config.thickness,
            config.accumulation_factor,
            ctx.exposure,
            ctx.prev_exposure,
            history_validity,
            plan.resolution_scale,
            config.ray_steps,
            config.ray_miss_fallback,
            config.filter_radius,
            config.ambient,
        );

        let base_mip = if plan.resolution_scale < 0.75 { 1 } else { 0 };

        for (idx, denoiser) in plan.denoisers.iter().enumerate() {
            let jitter_phase = if denoiser.jitter {
                self.state.jitter_phase() as i32
            } else {
                -1
            };

            *buffers.spatial_params[idx] = PassParams {
                radius: denoiser.radius,
                jitter_phase,
                mip: base_mip,
                pad: 0,
            };

            *buffers.spatial_half_params[idx] = PassParams {
                radius: denoiser.radius,
                jitter_phase,
                mip: base_mip + 1,
                pad: 0,
            };
        }

        *buffers.gather_params = PassParams {
            radius: 0.0,
            jitter_phase: -1,
            mip: base_mip,
            pad: 0,
        };

        *buffers.upsample_params = PassParams {
            radius: 0.0,
            jitter_phase: -1,
            mip: 0,
            pad: 0,
        };

        buffers.camera.flush(queue);
        buffers.frame.flush(queue);

        for params in &mut buffers.spatial_params {
            params.flush(queue);
        }

        for params in &mut buffers.spatial_half_params {
            params.flush(queue);
        }

        buffers.gather_params.flush(queue);
        buffers.upsample_params.flush(queue);
        buffers.points.flush(queue);

        if plan.init_point_distribution {
            self.state.mark_points_ready();
        }

        if plan.history_event == HistoryEvent::Reallocated {
            for history in &buffers.history {
                history.clear(encoder);
            }
        }

        let alternate = self.state.is_alternate();
        let size = plan.working_size;

        passes.trace.run(encoder, size, alternate);
        passes.reproject.run(encoder, size, alternate);

        for (idx, _) in plan.denoisers.iter().enumerate() {
            passes.validate.run(encoder, size, alternate);
            passes.temporal[idx].run(encoder, size, alternate);

            if plan.half_resolution_filter {
                let half = (size / 2).max(UVec2::ONE);

                passes.spatial_half[idx].run(encoder, half, alternate);
                passes.gather.run(encoder, size, alternate);
            } else {
                passes.spatial[idx].run(encoder, size, alternate);
            }
        }

        if plan.upsample {
            passes.upsample.run(encoder, screen_size, alternate);
        } else {
            encoder.copy_texture_to_texture(
                buffers.radiance[0].texture().as_image_copy(),
                self.output.texture().as_image_copy(),
                wgpu::Extent3d {
                    width: size.x,
                    height: size.y,
                    depth_or_array_layers: 1,
                },
            );
        }

        self.state.advance();

        &self.output
    }
}

use glam::UVec2;
use glimmer_gpu::{
    downsample_average, downsample_min, BilateralFilter, ColorPyramid,
    DepthPyramid, FrameParams, HistoryValidator, PointDistribution,
    Reprojector, TemporalAccumulator, TexelGrid, Tracer, Upsampler,
    POINT_DISTRIBUTION_SIZE,
};

use crate::{
    FrameContext, FrameDecision, FramePlan, GiConfig, HistoryEvent,
    HistorySlot, PipelineState,
};

/// External per-frame resources of the software path; the [`TexelGrid`]
/// counterpart of [`crate::FrameInputs`].
///
/// All grids are at the full screen resolution; the renderer derives its own
/// working-resolution copies when running scaled down.
#[derive(Clone, Debug)]
pub struct SoftwareFrameInputs {
    pub depth: TexelGrid,
    pub normals: TexelGrid,
    pub motion: TexelGrid,
    pub prev_color: Option<TexelGrid>,
    pub history_depth: Option<TexelGrid>,
    pub history_normals: Option<TexelGrid>,
}

/// The indirect-diffuse pipeline executed on the CPU, stage by stage, with
/// the same per-texel kernels the shaders mirror.
///
/// Exists for correctness work: every frame-level behavior of the GPU
/// renderer (skipping, planning, history lifecycle, exposure handling) goes
/// through the same [`FrameDecision`] here, so properties of the pipeline can
/// be asserted without a device.
#[derive(Clone, Debug, Default)]
pub struct SoftwareRenderer {
    config: GiConfig,
    state: PipelineState,
    points: Option<PointDistribution>,
    history: [Option<TexelGrid>; 2],
    last_plan: Option<FramePlan>,
}

impl SoftwareRenderer {
    pub fn new(config: GiConfig) -> Self {
        Self {
            config: config.sanitized(),
            state: PipelineState::default(),
            points: None,
            history: [None, None],
            last_plan: None,
        }
    }

    pub fn config(&self) -> &GiConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: GiConfig) {
        self.config = config.sanitized();
    }

    pub fn state(&self) -> &PipelineState {
        &self.state
    }

    /// Schedule of the most recently rendered (non-skipped) frame.
    pub fn last_plan(&self) -> Option<&FramePlan> {
        self.last_plan.as_ref()
    }

    pub fn reset_history(&mut self) {
        self.state.reset_history();
        self.history = [None, None];
    }

    /// Renders one frame, returning the screen-resolution radiance grid.
    pub fn render(
        &mut self,
        ctx: &FrameContext,
        inputs: &SoftwareFrameInputs,
    ) -> TexelGrid {
        let screen_size = ctx.camera.screen_size;

        let decision = FrameDecision::new(
            &self.config,
            screen_size,
            inputs.prev_color.is_some(),
            &mut self.state,
        );

        let plan = match decision {
            FrameDecision::Skip(reason) => {
                log::debug!("Skipping frame: {reason:?}");

                self.reset_history();
                self.last_plan = None;

                return TexelGrid::new(screen_size);
            }

            FrameDecision::Run(plan) => plan,
        };

        let output = self.run(&plan, ctx, inputs);

        self.state.advance();
        self.last_plan = Some(plan);

        output
    }

    fn run(
        &mut self,
        plan: &FramePlan,
        ctx: &FrameContext,
        inputs: &SoftwareFrameInputs,
    ) -> TexelGrid {
        let working = plan.working_size;

        if plan.history_event == HistoryEvent::Reallocated {
            self.history = [None, None];
        }

        let camera = ctx.camera.serialize().at_scale(plan.resolution_scale);

        let (depth, normals, motion) = if plan.resolution_scale < 1.0 {
            (
                downsample_min(&inputs.depth),
                downsample_average(&inputs.normals),
                downsample_average(&inputs.motion),
            )
        } else {
            (
                inputs.depth.clone(),
                inputs.normals.clone(),
                inputs.motion.clone(),
            )
        };

        let history_depth = inputs.history_depth.as_ref().map(|grid| {
            if plan.resolution_scale < 1.0 {
                downsample_min(grid)
            } else {
                grid.clone()
            }
        });

        let history_normals = inputs.history_normals.as_ref().map(|grid| {
            if plan.resolution_scale < 1.0 {
                downsample_average(grid)
            } else {
                grid.clone()
            }
        });

        let history_validity = if plan.history_event
            == HistoryEvent::Reallocated
            || history_depth.is_none()
            || history_normals.is_none()
        {
            0.0
        } else {
            ctx.history_validity
        };

        let params = FrameParams::build(
            &camera,
            self.state.frame(),
            self.config.thickness,
            self.config.accumulation_factor,
            ctx.exposure,
            ctx.prev_exposure,
            history_validity,
            plan.resolution_scale,
            self.config.ray_steps,
            self.config.ray_miss_fallback,
            self.config.filter_radius,
            self.config.ambient,
        );

        let pyramid = DepthPyramid::build(&depth);

        let tracer = Tracer {
            camera: &camera,
            params: &params,
            pyramid: &pyramid,
            normals: &normals,
        };

        let mut hits = TexelGrid::new(working);

        for_each_texel(working, |pos| {
            hits.write(pos, tracer.trace(pos).serialize());
        });

        // The previous color stays at its native resolution; it is only ever
        // sampled by uv
        let prev_color = inputs
            .prev_color
            .as_ref()
            .map(ColorPyramid::build)
            .unwrap_or_else(|| ColorPyramid::build(&TexelGrid::new(working)));

        let reprojector = Reprojector {
            camera: &camera,
            params: &params,
            prev_color: &prev_color,
            hits: &hits,
        };

        let mut radiance = TexelGrid::new(working);

        for_each_texel(working, |pos| {
            radiance.write(pos, reprojector.reproject(pos));
        });

        if plan.init_point_distribution {
            self.points =
                Some(PointDistribution::generate(POINT_DISTRIBUTION_SIZE));

            self.state.mark_points_ready();
        }

        for denoiser in &plan.denoisers {
            let idx = slot_index(denoiser.slot);

            let mut mask = TexelGrid::new(working);

            HistoryValidator {
                camera: &camera,
                params: &params,
                depth: &depth,
                normals: &normals,
                history_depth: history_depth.as_ref(),
                history_normals: history_normals.as_ref(),
                motion: &motion,
                history_size: self
                    .history[idx]
                    .as_ref()
                    .map_or(working, TexelGrid::size),
            }
            .validate_into(&mut mask);

            let accumulated = match &self.history[idx] {
                Some(history) if denoiser.blend_history => {
                    let accumulator = TemporalAccumulator {
                        params: &params,
                        radiance: &radiance,
                        history,
                        validation: &mask,
                        motion: &motion,
                    };

                    let mut out = TexelGrid::new(working);

                    accumulator.accumulate_into(&mut out);
                    out
                }

                // No usable history for this slot; commit the raw estimate
                // so next frame has something to blend with
                _ => radiance.clone(),
            };

            self.history[idx] = Some(accumulated.clone());

            let points = self
                .points
                .get_or_insert_with(|| {
                    PointDistribution::generate(POINT_DISTRIBUTION_SIZE)
                })
                .clone();

            let jitter_phase = denoiser
                .jitter
                .then(|| self.state.jitter_phase());

            radiance = if plan.half_resolution_filter {
                let half_depth = downsample_min(&depth);
                let half_normals = downsample_average(&normals);
                let half_radiance = downsample_average(&accumulated);

                let filter = BilateralFilter {
                    camera: &camera,
                    radiance: &half_radiance,
                    depth: &half_depth,
                    normals: &half_normals,
                    points: &points,
                    radius: denoiser.radius,
                    jitter_phase,
                };

                let mut filtered = TexelGrid::new(half_radiance.size());

                filter.filter_into(&mut filtered);

                let upsampler = Upsampler {
                    camera: &camera,
                    source: &filtered,
                    source_depth: &half_depth,
                    target_depth: &depth,
                };

                let mut gathered = TexelGrid::new(working);

                upsampler.upsample_into(&mut gathered);
                gathered
            } else {
                let filter = BilateralFilter {
                    camera: &camera,
                    radiance: &accumulated,
                    depth: &depth,
                    normals: &normals,
                    points: &points,
                    radius: denoiser.radius,
                    jitter_phase,
                };

                let mut filtered = TexelGrid::new(working);

                filter.filter_into(&mut filtered);
                filtered
            };
        }

        if plan.upsample {
            let upsampler = Upsampler {
                camera: &camera,
                source: &radiance,
                source_depth: &depth,
                target_depth: &inputs.depth,
            };

            let mut output = TexelGrid::new(inputs.depth.size());

            upsampler.upsample_into(&mut output);
            output
        } else {
            radiance
        }
    }
}

fn slot_index(slot: HistorySlot) -> usize {
    match slot {
        HistorySlot::Primary => 0,
        HistorySlot::SecondPass => 1,
    }
}

fn for_each_texel(size: UVec2, mut f: impl FnMut(UVec2)) {
    for y in 0..size.y {
        for x in 0..size.x {
            f(UVec2::new(x, y));
        }
    }
}

#[cfg(test)]
mod tests {
    use glam::{uvec2, Mat4, Vec4};
    use glimmer_gpu::zero_motion;

    use crate::Camera;

    use super::*;

    fn camera(size: UVec2) -> Camera {
        let fov_y = std::f32::consts::FRAC_PI_2;

        Camera {
            projection: Mat4::perspective_rh(fov_y, 1.0, 0.1, 100.0),
            screen_size: size,
            near: 0.1,
            far: 100.0,
            fov_y,
        }
    }

    fn ctx(size: UVec2) -> FrameContext {
        FrameContext {
            camera: camera(size),
            exposure: 1.0,
            prev_exposure: 1.0,
            history_validity: 1.0,
        }
    }

    fn inputs(size: UVec2) -> SoftwareFrameInputs {
        let camera = camera(size).serialize();
        let (_, depth) = camera.view_to_uv(glam::vec3(0.0, 0.0, -10.0));

        let depth_grid =
            TexelGrid::splat(size, Vec4::new(depth, 0.0, 0.0, 0.0));

        SoftwareFrameInputs {
            depth: depth_grid.clone(),
            normals: TexelGrid::splat(size, Vec4::new(0.0, 0.0, 1.0, 0.0)),
            motion: zero_motion(size),
            prev_color: Some(TexelGrid::splat(size, Vec4::ONE)),
            history_depth: Some(depth_grid),
            history_normals: Some(TexelGrid::splat(
                size,
                Vec4::new(0.0, 0.0, 1.0, 0.0),
            )),
        }
    }

    #[test]
    fn skipped_frames_reset_history() {
        let size = uvec2(16, 16);
        let mut renderer = SoftwareRenderer::new(GiConfig::default());

        renderer.render(&ctx(size), &inputs(size));
        renderer.render(&ctx(size), &inputs(size));

        let mut without_color = inputs(size);

        without_color.prev_color = None;
        renderer.render(&ctx(size), &without_color);

        assert!(renderer.last_plan().is_none());
        assert!(renderer.history.iter().all(Option::is_none));

        // Recovery frame plans a reallocation
        renderer.render(&ctx(size), &inputs(size));

        let plan = renderer.last_plan().unwrap();

        assert_eq!(plan.history_event, HistoryEvent::Reallocated);
    }

    #[test]
    fn output_tracks_screen_size() {
        let size = uvec2(16, 8);
        let mut renderer = SoftwareRenderer::new(GiConfig {
            half_resolution: true,
            ..GiConfig::default()
        });

        let output = renderer.render(&ctx(size), &inputs(size));

        assert_eq!(size, output.size());
        assert_eq!(
            uvec2(8, 4),
            renderer.last_plan().unwrap().working_size,
        );
    }
}

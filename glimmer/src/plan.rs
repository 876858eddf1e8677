use glam::UVec2;

use crate::{working_size, GiConfig, HistoryEvent, HistorySlot, PipelineState};

/// Why a frame produced no GPU work.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SkipReason {
    Disabled,
    MissingPreviousColor,
}

/// Per-frame decision of the orchestrator; either a black-output short
/// circuit or a concrete stage schedule.
#[derive(Clone, Debug, PartialEq)]
pub enum FrameDecision {
    Skip(SkipReason),
    Run(FramePlan),
}

impl FrameDecision {
    /// Plans the frame; the only entry point that mutates [`PipelineState`].
    pub fn new(
        config: &GiConfig,
        screen_size: UVec2,
        prev_color_available: bool,
        state: &mut PipelineState,
    ) -> Self {
        let config = config.sanitized();

        if !config.enabled {
            return Self::Skip(SkipReason::Disabled);
        }

        if !prev_color_available {
            return Self::Skip(SkipReason::MissingPreviousColor);
        }

        let scale = config.resolution_scale();
        let working_size = working_size(screen_size, scale);
        let history_event = state.prepare(working_size, scale);
        let blend_history = history_event == HistoryEvent::Kept;

        let mut denoisers = Vec::new();

        if config.denoise {
            denoisers.push(DenoiserPass {
                slot: HistorySlot::Primary,
                radius: config.filter_radius,
                jitter: config.jitter_filter,
                blend_history,
            });

            if config.second_denoiser_pass {
                denoisers.push(DenoiserPass {
                    slot: HistorySlot::SecondPass,
                    radius: config.filter_radius * 0.5,
                    jitter: false,
                    blend_history,
                });
            }
        }

        Self::Run(FramePlan {
            working_size,
            resolution_scale: scale,
            history_event,
            init_point_distribution: config.denoise && !state.points_ready(),
            half_resolution_filter: config.denoise
                && config.half_resolution_filter,
            upsample: config.half_resolution,
            async_trace: config.async_compute && config.denoise,
            denoisers,
        })
    }
}

/// One temporal + spatial denoiser instance within a frame.
#[derive(Clone, Debug, PartialEq)]
pub struct DenoiserPass {
    pub slot: HistorySlot,
    pub radius: f32,
    pub jitter: bool,

    /// Whether the temporal stage may blend with history; off on
    /// reallocation frames.
    pub blend_history: bool,
}

/// Concrete schedule for one frame.
#[derive(Clone, Debug, PartialEq)]
pub struct FramePlan {
    pub working_size: UVec2,
    pub resolution_scale: f32,
    pub history_event: HistoryEvent,
    pub init_point_distribution: bool,
    pub denoisers: Vec<DenoiserPass>,
    pub half_resolution_filter: bool,
    pub upsample: bool,

    /// Tracing + reprojection are eligible for an async compute queue; only
    /// set while accumulation-based denoising is active.
    pub async_trace: bool,
}

impl FramePlan {
    /// Declares the frame's stages with their resource usages, in dispatch
    /// order, for the host's dependency tracking.
    pub fn stages(&self) -> Vec<Stage> {
        let mut stages = Vec::new();
        let mut radiance = 0;

        stages.push(Stage {
            name: "trace",
            resources: vec![
                ResourceUsage::Read(ResourceId::Depth),
                ResourceUsage::Read(ResourceId::Normals),
                ResourceUsage::Write(ResourceId::Hits),
            ],
        });

        stages.push(Stage {
            name: "reproject",
            resources: vec![
                ResourceUsage::Read(ResourceId::Hits),
                ResourceUsage::Read(ResourceId::PrevColor),
                ResourceUsage::Write(ResourceId::Radiance(radiance)),
            ],
        });

        for denoiser in &self.denoisers {
            stages.push(Stage {
                name: "validate",
                resources: vec![
                    ResourceUsage::Read(ResourceId::Depth),
                    ResourceUsage::Read(ResourceId::Normals),
                    ResourceUsage::Read(ResourceId::Motion),
                    ResourceUsage::Write(ResourceId::ValidationMask),
                ],
            });

            stages.push(Stage {
                name: "temporal",
                resources: vec![
                    ResourceUsage::Read(ResourceId::Radiance(radiance)),
                    ResourceUsage::Read(ResourceId::ValidationMask),
                    ResourceUsage::Read(ResourceId::Motion),
                    ResourceUsage::Read(ResourceId::HistoryRead(
                        denoiser.slot,
                    )),
                    ResourceUsage::Write(ResourceId::Radiance(radiance + 1)),
                    ResourceUsage::Write(ResourceId::HistoryWrite(
                        denoiser.slot,
                    )),
                ],
            });

            radiance += 1;

            stages.push(Stage {
                name: "spatial",
                resources: vec![
                    ResourceUsage::Read(ResourceId::Radiance(radiance)),
                    ResourceUsage::Read(ResourceId::Depth),
                    ResourceUsage::Read(ResourceId::Normals),
                    ResourceUsage::Write(ResourceId::Radiance(radiance + 1)),
                ],
            });

            radiance += 1;
        }

        stages.push(Stage {
            name: if self.upsample { "upsample" } else { "resolve" },
            resources: vec![
                ResourceUsage::Read(ResourceId::Radiance(radiance)),
                ResourceUsage::Read(ResourceId::Depth),
                ResourceUsage::Write(ResourceId::Output),
            ],
        });

        stages
    }
}

/// Logical resource id; radiance estimates carry a generation so that each
/// denoising step reads one buffer and writes another.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ResourceId {
    Depth,
    Normals,
    Motion,
    PrevColor,
    Hits,
    Radiance(u32),
    ValidationMask,
    HistoryRead(HistorySlot),
    HistoryWrite(HistorySlot),
    Output,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResourceUsage {
    Read(ResourceId),
    Write(ResourceId),
}

#[derive(Clone, Debug, PartialEq)]
pub struct Stage {
    pub name: &'static str,
    pub resources: Vec<ResourceUsage>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plan(config: &GiConfig) -> FramePlan {
        let mut state = PipelineState::default();

        match FrameDecision::new(config, UVec2::new(256, 128), true, &mut state)
        {
            FrameDecision::Run(plan) => plan,
            FrameDecision::Skip(reason) => panic!("skipped: {reason:?}"),
        }
    }

    #[test]
    fn disabled_config_skips() {
        let mut state = PipelineState::default();

        let decision = FrameDecision::new(
            &GiConfig {
                enabled: false,
                ..Default::default()
            },
            UVec2::new(256, 128),
            true,
            &mut state,
        );

        assert_eq!(decision, FrameDecision::Skip(SkipReason::Disabled));
    }

    #[test]
    fn missing_previous_color_skips() {
        let mut state = PipelineState::default();

        let decision = FrameDecision::new(
            &GiConfig::default(),
            UVec2::new(256, 128),
            false,
            &mut state,
        );

        assert_eq!(
            decision,
            FrameDecision::Skip(SkipReason::MissingPreviousColor),
        );
    }

    #[test]
    fn half_resolution_halves_and_upsamples() {
        let plan = plan(&GiConfig {
            half_resolution: true,
            ..Default::default()
        });

        assert_eq!(plan.working_size, UVec2::new(128, 64));
        assert!(plan.upsample);
    }

    #[test]
    fn first_frame_disables_history_blending() {
        let plan = plan(&GiConfig::default());

        assert_eq!(plan.history_event, HistoryEvent::Reallocated);
        assert!(plan.denoisers.iter().all(|pass| !pass.blend_history));
    }

    #[test]
    fn second_pass_halves_radius_and_drops_jitter() {
        let plan = plan(&GiConfig {
            second_denoiser_pass: true,
            filter_radius: 16.0,
            ..Default::default()
        });

        assert_eq!(plan.denoisers.len(), 2);
        assert_eq!(plan.denoisers[1].slot, HistorySlot::SecondPass);
        assert_eq!(plan.denoisers[1].radius, 8.0);
        assert!(!plan.denoisers[1].jitter);
    }

    #[test]
    fn async_tracing_requires_denoising() {
        let with_denoise = plan(&GiConfig {
            async_compute: true,
            ..Default::default()
        });

        let without_denoise = plan(&GiConfig {
            async_compute: true,
            denoise: false,
            ..Default::default()
        });

        assert!(with_denoise.async_trace);
        assert!(!without_denoise.async_trace);
    }

    #[test]
    fn stages_declare_no_hazards() {
        let plan = plan(&GiConfig {
            second_denoiser_pass: true,
            half_resolution: true,
            ..Default::default()
        });

        let mut written = Vec::new();

        for stage in plan.stages() {
            let reads: Vec<_> = stage
                .resources
                .iter()
                .filter_map(|usage| match usage {
                    ResourceUsage::Read(id) => Some(*id),
                    ResourceUsage::Write(_) => None,
                })
                .collect();

            for usage in &stage.resources {
                if let ResourceUsage::Write(id) = usage {
                    assert!(
                        !reads.contains(id),
                        "{}: read-write hazard on {id:?}",
                        stage.name,
                    );

                    assert!(
                        !written.contains(id),
                        "{}: {id:?} written twice",
                        stage.name,
                    );

                    written.push(*id);
                }
            }
        }

        for slot in HistorySlot::all() {
            assert!(!written.contains(&ResourceId::HistoryRead(slot)));
        }
    }

    #[test]
    fn history_is_written_only_by_temporal_stages() {
        let plan = plan(&GiConfig {
            second_denoiser_pass: true,
            ..Default::default()
        });

        for stage in plan.stages() {
            for usage in &stage.resources {
                if let ResourceUsage::Write(ResourceId::HistoryWrite(_)) =
                    usage
                {
                    assert_eq!(stage.name, "temporal");
                }
            }
        }
    }

    #[test]
    fn point_distribution_initializes_at_most_once() {
        let mut state = PipelineState::default();
        let config = GiConfig::default();
        let screen = UVec2::new(256, 128);

        let FrameDecision::Run(first) =
            FrameDecision::new(&config, screen, true, &mut state)
        else {
            panic!("skipped");
        };

        assert!(first.init_point_distribution);
        state.mark_points_ready();

        let FrameDecision::Run(second) =
            FrameDecision::new(&config, screen, true, &mut state)
        else {
            panic!("skipped");
        };

        assert!(!second.init_point_distribution);
    }
}

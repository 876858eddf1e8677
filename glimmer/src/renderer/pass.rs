use glam::UVec2;

use crate::{BindGroup, DoubleBufferedBindable};

/// One compute dispatch; owns the pipeline plus parity-swapped bind groups.
#[derive(Debug)]
pub struct ComputePass {
    label: String,
    bind_groups: Vec<BindGroup>,
    pipeline: wgpu::ComputePipeline,
}

impl ComputePass {
    pub fn builder<'a>(label: impl ToString) -> ComputePassBuilder<'a> {
        ComputePassBuilder {
            label: label.to_string(),
            groups: Default::default(),
        }
    }

    /// Dispatches over `size` pixels in 8x8 workgroups; `alternate` selects
    /// the double-buffer parity.
    pub fn run(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        size: UVec2,
        alternate: bool,
    ) {
        let label = format!("glimmer_{}_pass", self.label);

        let mut pass =
            encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
                label: Some(&label),
                timestamp_writes: None,
            });

        pass.set_pipeline(&self.pipeline);

        for (bind_group_idx, bind_group) in self.bind_groups.iter().enumerate()
        {
            pass.set_bind_group(
                bind_group_idx as u32,
                bind_group.get(alternate),
                &[],
            );
        }

        pass.dispatch_workgroups((size.x + 7) / 8, (size.y + 7) / 8, 1);
    }
}

pub struct ComputePassBuilder<'a> {
    label: String,
    groups: Vec<Vec<&'a dyn DoubleBufferedBindable>>,
}

impl<'a> ComputePassBuilder<'a> {
    pub fn bind<const N: usize>(
        mut self,
        items: [&'a dyn DoubleBufferedBindable; N],
    ) -> Self {
        self.groups.push(items.to_vec());
        self
    }

    pub fn build(
        self,
        device: &wgpu::Device,
        module: &wgpu::ShaderModule,
        entry_point: &'static str,
    ) -> ComputePass {
        log::debug!("Initializing pass: {}:{}", self.label, entry_point);

        let bind_groups: Vec<_> = self
            .groups
            .iter()
            .enumerate()
            .map(|(group_idx, items)| {
                BindGroup::new(
                    device,
                    &format!("glimmer_{}_bg{group_idx}", self.label),
                    items,
                )
            })
            .collect();

        let bind_group_layouts: Vec<_> =
            bind_groups.iter().map(|bg| bg.layout()).collect();

        let pipeline_layout_label =
            format!("glimmer_{}_pipeline_layout", self.label);

        let pipeline_layout =
            device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some(&pipeline_layout_label),
                bind_group_layouts: &bind_group_layouts,
                push_constant_ranges: &[],
            });

        let pipeline_label = format!("glimmer_{}_pipeline", self.label);

        let pipeline =
            device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
                label: Some(&pipeline_label),
                layout: Some(&pipeline_layout),
                module,
                entry_point: Some(entry_point),
                compilation_options: wgpu::PipelineCompilationOptions {
                    zero_initialize_workgroup_memory: false,
                    ..Default::default()
                },
                cache: None,
            });

        ComputePass {
            label: self.label,
            bind_groups,
            pipeline,
        }
    }
}

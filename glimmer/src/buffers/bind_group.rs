/// Object that can be attached to a pipeline, e.g. a buffer or a texture;
/// one item may span several consecutive bindings (e.g. a sampled texture
/// binds the view and the sampler).
pub trait Bindable {
    fn bind(
        &self,
        binding: u32,
    ) -> Vec<(wgpu::BindGroupLayoutEntry, wgpu::BindingResource)>;
}

/// Object that exists in two parity-swapped versions, like the history
/// buffers; single-versioned [`Bindable`]s qualify by presenting the same
/// resource for both parities.
pub trait DoubleBufferedBindable {
    fn bind(
        &self,
        binding: u32,
    ) -> Vec<(wgpu::BindGroupLayoutEntry, [wgpu::BindingResource; 2])>;
}

impl<T> DoubleBufferedBindable for T
where
    T: Bindable,
{
    fn bind(
        &self,
        binding: u32,
    ) -> Vec<(wgpu::BindGroupLayoutEntry, [wgpu::BindingResource; 2])> {
        T::bind(self, binding)
            .into_iter()
            .map(|(layout, resource)| {
                let resources = [resource.clone(), resource];

                (layout, resources)
            })
            .collect()
    }
}

/// Parity-swapped pair of wgpu bind groups over a shared layout; `get()`
/// selects the half matching the frame parity.
#[derive(Debug)]
pub struct BindGroup {
    groups: [wgpu::BindGroup; 2],
    layout: wgpu::BindGroupLayout,
}

impl BindGroup {
    /// Creates the layout and both parity halves out of a flat item list;
    /// bindings are assigned in item order, so the list must mirror the
    /// shader's `@binding` declarations exactly.
    pub fn new(
        device: &wgpu::Device,
        label: &str,
        items: &[&dyn DoubleBufferedBindable],
    ) -> Self {
        let mut layouts = Vec::new();
        let mut entries_a = Vec::new();
        let mut entries_b = Vec::new();

        for item in items {
            for (layout, [resource_a, resource_b]) in
                item.bind(layouts.len() as u32)
            {
                entries_a.push(wgpu::BindGroupEntry {
                    binding: layout.binding,
                    resource: resource_a,
                });

                entries_b.push(wgpu::BindGroupEntry {
                    binding: layout.binding,
                    resource: resource_b,
                });

                layouts.push(layout);
            }
        }

        let layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some(&format!("{label}_layout")),
                entries: &layouts,
            });

        let groups = [entries_a, entries_b].map(|entries| {
            device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some(label),
                layout: &layout,
                entries: &entries,
            })
        });

        Self { groups, layout }
    }

    pub fn get(&self, alternate: bool) -> &wgpu::BindGroup {
        &self.groups[alternate as usize]
    }

    pub fn layout(&self) -> &wgpu::BindGroupLayout {
        &self.layout
    }
}

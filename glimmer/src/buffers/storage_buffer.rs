use std::ops::{Deref, DerefMut};
use std::{any, mem};

use bytemuck::Pod;

use super::Bindable;

/// Read-only storage buffer shadowed on the host; used for small lookup
/// tables such as the spatial filter's sample points.
#[derive(Debug)]
pub struct StorageBuffer<T> {
    buffer: wgpu::Buffer,
    data: Vec<T>,
    dirty: bool,
}

impl<T> StorageBuffer<T>
where
    T: Pod,
{
    pub fn new(
        device: &wgpu::Device,
        label: impl AsRef<str>,
        data: Vec<T>,
    ) -> Self {
        let label = label.as_ref();
        let size = data.len() * mem::size_of::<T>();

        log::debug!(
            "Allocating storage buffer `{label}`; ty={}, size={size}",
            any::type_name::<T>(),
        );

        assert!(size > 0);

        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(label),
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::STORAGE,
            size: size as _,
            mapped_at_creation: false,
        });

        Self {
            buffer,
            data,
            dirty: true,
        }
    }

    pub fn flush(&mut self, queue: &wgpu::Queue) {
        if !mem::take(&mut self.dirty) {
            return;
        }

        queue.write_buffer(&self.buffer, 0, bytemuck::cast_slice(&self.data));
    }
}

impl<T> Deref for StorageBuffer<T> {
    type Target = Vec<T>;

    fn deref(&self) -> &Self::Target {
        &self.data
    }
}

impl<T> DerefMut for StorageBuffer<T> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.dirty = true;

        &mut self.data
    }
}

impl<T> Bindable for StorageBuffer<T> {
    fn bind(
        &self,
        binding: u32,
    ) -> Vec<(wgpu::BindGroupLayoutEntry, wgpu::BindingResource)> {
        let layout = wgpu::BindGroupLayoutEntry {
            binding,
            visibility: wgpu::ShaderStages::COMPUTE,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Storage { read_only: true },
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        };

        let resource = self.buffer.as_entire_binding();

        vec![(layout, resource)]
    }
}

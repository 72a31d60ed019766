//! Streaming particle attributes into GPU-resident buffers.
//!
//! Every uploaded attribute gets its own buffer. Each buffer holds two
//! regions:
//!
//! ```text
//! [0, capacity)                          particles, rewritten every frame
//! [capacity, capacity + static_vertices) static scene geometry, written once
//! ```
//!
//! Only the first `len` particle slots are written per frame. Whatever sits
//! beyond them is never drawn, because the draw call uses the uploaded
//! count rather than the buffer contents.

use glam::{Vec3, Vec4};

use crate::store::ParticleStore;

/// Destination a column of bytes can be written into.
///
/// The GPU backend implements this over a `wgpu::Buffer`; tests record writes.
pub trait UploadBuffer {
    /// Write `data` at byte `offset`.
    fn write(&mut self, offset: u64, data: &[u8]);
}

/// Per-vertex attributes uploaded for every particle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParticleAttribute {
    Position,
    StartColor,
    EndColor,
    ColorSpeed,
    Age,
    Lighting,
    Size,
    Blur,
}

impl ParticleAttribute {
    /// All attributes in shader location order.
    pub const ALL: [ParticleAttribute; 8] = [
        ParticleAttribute::Position,
        ParticleAttribute::StartColor,
        ParticleAttribute::EndColor,
        ParticleAttribute::ColorSpeed,
        ParticleAttribute::Age,
        ParticleAttribute::Lighting,
        ParticleAttribute::Size,
        ParticleAttribute::Blur,
    ];

    /// Size in bytes of one element.
    pub const fn element_size(self) -> u64 {
        match self {
            ParticleAttribute::Position => 12,
            ParticleAttribute::StartColor | ParticleAttribute::EndColor => 16,
            _ => 4,
        }
    }

    /// Shader location the attribute is bound to.
    pub const fn location(self) -> u32 {
        self as u32
    }

    pub const fn label(self) -> &'static str {
        match self {
            ParticleAttribute::Position => "Position Buffer",
            ParticleAttribute::StartColor => "Start Color Buffer",
            ParticleAttribute::EndColor => "End Color Buffer",
            ParticleAttribute::ColorSpeed => "Color Speed Buffer",
            ParticleAttribute::Age => "Age Buffer",
            ParticleAttribute::Lighting => "Lighting Buffer",
            ParticleAttribute::Size => "Size Buffer",
            ParticleAttribute::Blur => "Blur Buffer",
        }
    }
}

/// Slot layout shared by every attribute buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SceneLayout {
    /// Particle slots at the head of each buffer.
    pub capacity: usize,
    /// Static vertices reserved at the tail.
    pub static_vertices: usize,
}

impl SceneLayout {
    pub fn new(capacity: usize, static_vertices: usize) -> Self {
        Self {
            capacity,
            static_vertices,
        }
    }

    /// First vertex index of the static region.
    pub fn static_first_vertex(&self) -> u32 {
        self.capacity as u32
    }

    /// Byte size of the buffer backing `attribute`.
    pub fn buffer_size(&self, attribute: ParticleAttribute) -> u64 {
        (self.capacity + self.static_vertices) as u64 * attribute.element_size()
    }

    /// Byte offset of the static region in the buffer backing `attribute`.
    pub fn static_offset(&self, attribute: ParticleAttribute) -> u64 {
        self.capacity as u64 * attribute.element_size()
    }
}

/// Static scene vertices stored in the tail region.
#[derive(Debug, Clone, PartialEq)]
pub struct StaticGeometry {
    pub positions: Vec<Vec3>,
    pub colors: Vec<Vec4>,
}

impl StaticGeometry {
    /// Ground plane spanning the arena, in triangle-strip order.
    pub fn ground() -> Self {
        Self {
            positions: vec![
                Vec3::new(-100.0, 0.0, 0.0),
                Vec3::new(-100.0, 0.0, 200.0),
                Vec3::new(100.0, 0.0, 0.0),
                Vec3::new(100.0, 0.0, 200.0),
            ],
            colors: vec![
                Vec4::new(0.2, 0.0, 0.0, 1.0),
                Vec4::new(0.0, 0.2, 0.0, 1.0),
                Vec4::new(0.0, 0.2, 0.2, 1.0),
                Vec4::new(0.0, 0.0, 0.2, 1.0),
            ],
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }
}

/// One buffer per [`ParticleAttribute`].
#[derive(Debug)]
pub struct AttributeBuffers<B> {
    pub position: B,
    pub start_color: B,
    pub end_color: B,
    pub color_speed: B,
    pub age: B,
    pub lighting: B,
    pub size: B,
    pub blur: B,
}

impl<B> AttributeBuffers<B> {
    pub fn get(&self, attribute: ParticleAttribute) -> &B {
        match attribute {
            ParticleAttribute::Position => &self.position,
            ParticleAttribute::StartColor => &self.start_color,
            ParticleAttribute::EndColor => &self.end_color,
            ParticleAttribute::ColorSpeed => &self.color_speed,
            ParticleAttribute::Age => &self.age,
            ParticleAttribute::Lighting => &self.lighting,
            ParticleAttribute::Size => &self.size,
            ParticleAttribute::Blur => &self.blur,
        }
    }

    pub fn get_mut(&mut self, attribute: ParticleAttribute) -> &mut B {
        match attribute {
            ParticleAttribute::Position => &mut self.position,
            ParticleAttribute::StartColor => &mut self.start_color,
            ParticleAttribute::EndColor => &mut self.end_color,
            ParticleAttribute::ColorSpeed => &mut self.color_speed,
            ParticleAttribute::Age => &mut self.age,
            ParticleAttribute::Lighting => &mut self.lighting,
            ParticleAttribute::Size => &mut self.size,
            ParticleAttribute::Blur => &mut self.blur,
        }
    }
}

/// Keeps GPU attribute buffers in step with the particle store.
pub struct RenderSync<B> {
    layout: SceneLayout,
    buffers: AttributeBuffers<B>,
    uploaded: usize,
}

impl<B: UploadBuffer> RenderSync<B> {
    /// Create one buffer per attribute through `create(attribute, byte_size)`.
    pub fn new<F>(layout: SceneLayout, mut create: F) -> Self
    where
        F: FnMut(ParticleAttribute, u64) -> B,
    {
        let mut make = |a: ParticleAttribute| create(a, layout.buffer_size(a));
        let buffers = AttributeBuffers {
            position: make(ParticleAttribute::Position),
            start_color: make(ParticleAttribute::StartColor),
            end_color: make(ParticleAttribute::EndColor),
            color_speed: make(ParticleAttribute::ColorSpeed),
            age: make(ParticleAttribute::Age),
            lighting: make(ParticleAttribute::Lighting),
            size: make(ParticleAttribute::Size),
            blur: make(ParticleAttribute::Blur),
        };
        Self {
            layout,
            buffers,
            uploaded: 0,
        }
    }

    /// Write static geometry into the tail region. Call once at startup.
    ///
    /// Attributes the geometry doesn't carry are zeroed, which leaves the
    /// geometry unlit and colour-static.
    pub fn write_static(&mut self, geometry: &StaticGeometry) {
        let count = geometry.vertex_count().min(self.layout.static_vertices);
        let layout = self.layout;

        let positions = &geometry.positions[..count];
        let colors = &geometry.colors[..count.min(geometry.colors.len())];
        let zeros = vec![0.0_f32; count];

        for attribute in ParticleAttribute::ALL {
            let offset = layout.static_offset(attribute);
            let bytes: &[u8] = match attribute {
                ParticleAttribute::Position => bytemuck::cast_slice(positions),
                ParticleAttribute::StartColor | ParticleAttribute::EndColor => {
                    bytemuck::cast_slice(colors)
                }
                _ => bytemuck::cast_slice(&zeros),
            };
            self.buffers.get_mut(attribute).write(offset, bytes);
        }
    }

    /// Upload the first `store.len()` elements of every column at offset 0.
    pub fn sync<const N: usize>(&mut self, store: &ParticleStore<N>) {
        let count = store.len().min(self.layout.capacity);
        let b = &mut self.buffers;

        b.position.write(0, bytemuck::cast_slice(&store.positions()[..count]));
        b.start_color.write(0, bytemuck::cast_slice(&store.start_colors()[..count]));
        b.end_color.write(0, bytemuck::cast_slice(&store.end_colors()[..count]));
        b.color_speed.write(0, bytemuck::cast_slice(&store.color_speeds()[..count]));
        b.age.write(0, bytemuck::cast_slice(&store.ages()[..count]));
        b.lighting.write(0, bytemuck::cast_slice(&store.lightings()[..count]));
        b.size.write(0, bytemuck::cast_slice(&store.sizes()[..count]));
        b.blur.write(0, bytemuck::cast_slice(&store.blurs()[..count]));

        self.uploaded = count;
    }

    /// Particle count for the draw call.
    #[inline]
    pub fn draw_count(&self) -> u32 {
        self.uploaded as u32
    }

    pub fn layout(&self) -> SceneLayout {
        self.layout
    }

    pub fn buffers(&self) -> &AttributeBuffers<B> {
        &self.buffers
    }
}

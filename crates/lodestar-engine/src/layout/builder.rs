use bytemuck::Pod;
use smallvec::SmallVec;

use super::{ComponentType, LayoutError, VertexAttribute};

/// Maximum number of attributes in one layout.
pub const MAX_ATTRIBUTES: usize = 4;

/// Ordered, bounded list of vertex attributes describing one interleaved
/// vertex format.
///
/// ```
/// use lodestar_engine::layout::{ComponentType, VertexLayout};
///
/// let mut layout = VertexLayout::new();
/// layout
///     .begin()
///     .set("position", 2, ComponentType::Float)
///     .set_normalized("color", 4, ComponentType::UnsignedByte)
///     .end();
///
/// assert_eq!(layout.stride(), 12);
/// assert_eq!(layout.attributes()[1].offset_bytes, 8);
/// ```
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct VertexLayout {
    attributes: SmallVec<[VertexAttribute; MAX_ATTRIBUTES]>,
    ended: bool,
}

impl VertexLayout {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clears every attribute and reopens the layout for declarations.
    pub fn begin(&mut self) -> &mut Self {
        self.attributes.clear();
        self.ended = false;
        self
    }

    /// Appends an attribute.
    ///
    /// # Panics
    ///
    /// When called more than [`MAX_ATTRIBUTES`] times since `begin()`, after
    /// `end()`, or with a component count outside `1..=4`. Use
    /// [`try_set`](Self::try_set) to get an error instead.
    pub fn set(&mut self, name: &str, count: u32, component_type: ComponentType) -> &mut Self {
        if let Err(err) = self.push(name, count, component_type, false) {
            panic!("VertexLayout::set: {err}");
        }
        self
    }

    /// Like [`set`](Self::set) for an integer attribute read as normalized.
    pub fn set_normalized(
        &mut self,
        name: &str,
        count: u32,
        component_type: ComponentType,
    ) -> &mut Self {
        if let Err(err) = self.push(name, count, component_type, true) {
            panic!("VertexLayout::set_normalized: {err}");
        }
        self
    }

    /// Fallible form of [`set`](Self::set) / [`set_normalized`](Self::set_normalized).
    pub fn try_set(
        &mut self,
        name: &str,
        count: u32,
        component_type: ComponentType,
        normalized: bool,
    ) -> Result<&mut Self, LayoutError> {
        self.push(name, count, component_type, normalized)?;
        Ok(self)
    }

    fn push(
        &mut self,
        name: &str,
        count: u32,
        component_type: ComponentType,
        normalized: bool,
    ) -> Result<(), LayoutError> {
        if self.ended {
            return Err(LayoutError::AlreadyEnded);
        }
        if self.attributes.len() >= MAX_ATTRIBUTES {
            return Err(LayoutError::CapacityExceeded {
                max: MAX_ATTRIBUTES,
            });
        }
        if !(1..=4).contains(&count) {
            return Err(LayoutError::InvalidComponentCount {
                name: name.to_string(),
                count,
            });
        }

        self.attributes
            .push(VertexAttribute::new(name, count, component_type, normalized));
        Ok(())
    }

    /// Derives stride and offsets for tight packing in declaration order.
    pub fn end(&mut self) -> &mut Self {
        let stride = self.total_size_bytes();
        let mut offset = 0;
        for attr in &mut self.attributes {
            attr.stride_bytes = stride;
            attr.offset_bytes = offset;
            offset += attr.size_bytes();
        }
        self.ended = true;
        self
    }

    /// Sum of all attribute sizes.
    pub fn total_size_bytes(&self) -> u32 {
        self.attributes.iter().map(VertexAttribute::size_bytes).sum()
    }

    /// Byte distance between consecutive vertices. Valid after `end()`.
    pub fn stride(&self) -> u32 {
        self.attributes.first().map_or(0, |a| a.stride_bytes)
    }

    pub fn attributes(&self) -> &[VertexAttribute] {
        &self.attributes
    }

    pub fn get(&self, name: &str) -> Option<&VertexAttribute> {
        self.attributes.iter().find(|a| a.name == name)
    }

    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    pub fn is_ended(&self) -> bool {
        self.ended
    }

    /// Views `vertices` as the bytes of an interleaved vertex buffer.
    ///
    /// Fails unless the layout was ended and `T` is exactly one stride long.
    pub fn cast_vertices<'v, T: Pod>(&self, vertices: &'v [T]) -> Result<&'v [u8], LayoutError> {
        if !self.ended {
            return Err(LayoutError::NotEnded);
        }
        let size = std::mem::size_of::<T>();
        if size != self.stride() as usize {
            return Err(LayoutError::VertexSizeMismatch {
                stride: self.stride(),
                size,
            });
        }
        Ok(bytemuck::cast_slice(vertices))
    }

    /// Converts to wgpu attributes, resolving each name to a shader location.
    pub fn to_wgpu<F>(&self, mut resolve: F) -> Result<WgpuVertexLayout, LayoutError>
    where
        F: FnMut(&str) -> Option<u32>,
    {
        if !self.ended {
            return Err(LayoutError::NotEnded);
        }

        let attributes = self
            .attributes
            .iter()
            .map(|a| {
                let format = a.format().ok_or_else(|| LayoutError::UnsupportedFormat {
                    name: a.name.clone(),
                    component_type: a.component_type,
                    count: a.component_count,
                    normalized: a.normalized,
                })?;
                let shader_location =
                    resolve(&a.name).ok_or_else(|| LayoutError::UnresolvedAttribute {
                        name: a.name.clone(),
                    })?;

                Ok(wgpu::VertexAttribute {
                    format,
                    offset: u64::from(a.offset_bytes),
                    shader_location,
                })
            })
            .collect::<Result<Vec<_>, LayoutError>>()?;

        Ok(WgpuVertexLayout {
            stride: u64::from(self.stride()),
            attributes,
        })
    }
}

/// Owned wgpu form of a [`VertexLayout`].
#[derive(Debug, Clone, PartialEq)]
pub struct WgpuVertexLayout {
    pub stride: u64,
    pub attributes: Vec<wgpu::VertexAttribute>,
}

impl WgpuVertexLayout {
    pub fn buffer_layout(&self) -> wgpu::VertexBufferLayout<'_> {
        wgpu::VertexBufferLayout {
            array_stride: self.stride,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &self.attributes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn position_color() -> VertexLayout {
        let mut l = VertexLayout::new();
        l.begin()
            .set("position", 2, ComponentType::Float)
            .set_normalized("color", 4, ComponentType::UnsignedByte)
            .end();
        l
    }

    // ── end() ─────────────────────────────────────────────────────────────

    #[test]
    fn position_color_packs_to_twelve_bytes() {
        let l = position_color();
        assert_eq!(l.stride(), 12);
        assert_eq!(l.total_size_bytes(), 12);
        assert_eq!(l.get("position").unwrap().offset_bytes, 0);
        assert_eq!(l.get("color").unwrap().offset_bytes, 8);
        assert!(l.get("color").unwrap().normalized);
        assert!(l.attributes().iter().all(|a| a.stride_bytes == 12));
    }

    #[test]
    fn offsets_are_prefix_sums_for_every_length() {
        let decls = [
            ("a", 3, ComponentType::Float),
            ("b", 2, ComponentType::Short),
            ("c", 1, ComponentType::Byte),
            ("d", 4, ComponentType::UnsignedInt),
        ];

        for n in 1..=MAX_ATTRIBUTES {
            let mut l = VertexLayout::new();
            l.begin();
            for &(name, count, ty) in &decls[..n] {
                l.set(name, count, ty);
            }
            l.end();

            let attrs = l.attributes();
            assert_eq!(attrs[0].offset_bytes, 0);
            for pair in attrs.windows(2) {
                assert!(pair[1].offset_bytes > pair[0].offset_bytes);
                assert_eq!(pair[1].offset_bytes, pair[0].offset_bytes + pair[0].size_bytes());
            }

            let sum: u32 = attrs.iter().map(VertexAttribute::size_bytes).sum();
            assert!(attrs.iter().all(|a| a.stride_bytes == sum));
        }
    }

    #[test]
    fn set_leaves_stride_and_offset_unset() {
        let mut l = VertexLayout::new();
        l.begin().set("position", 3, ComponentType::Float);
        let a = &l.attributes()[0];
        assert_eq!((a.stride_bytes, a.offset_bytes), (0, 0));
        assert!(!l.is_ended());
    }

    // ── begin() ───────────────────────────────────────────────────────────

    #[test]
    fn begin_resets_everything() {
        let mut l = position_color();
        l.begin();
        assert!(l.is_empty());
        assert_eq!(l.stride(), 0);

        l.set("uv", 2, ComponentType::Float).end();
        assert_eq!(l.len(), 1);
        assert_eq!(l.stride(), 8);
    }

    // ── capacity / contract ───────────────────────────────────────────────

    #[test]
    fn try_set_rejects_fifth_attribute() {
        let mut l = VertexLayout::new();
        l.begin();
        for name in ["a", "b", "c", "d"] {
            l.try_set(name, 1, ComponentType::Float, false).unwrap();
        }
        assert_eq!(
            l.try_set("e", 1, ComponentType::Float, false).unwrap_err(),
            LayoutError::CapacityExceeded { max: MAX_ATTRIBUTES }
        );
        assert_eq!(l.len(), MAX_ATTRIBUTES);
    }

    #[test]
    #[should_panic(expected = "at most 4 attributes")]
    fn set_past_capacity_panics() {
        let mut l = VertexLayout::new();
        l.begin()
            .set("a", 1, ComponentType::Float)
            .set("b", 1, ComponentType::Float)
            .set("c", 1, ComponentType::Float)
            .set("d", 1, ComponentType::Float)
            .set("e", 1, ComponentType::Float);
    }

    #[test]
    fn component_count_must_be_one_to_four() {
        let mut l = VertexLayout::new();
        l.begin();
        assert!(matches!(
            l.try_set("x", 0, ComponentType::Float, false),
            Err(LayoutError::InvalidComponentCount { count: 0, .. })
        ));
        assert!(matches!(
            l.try_set("x", 5, ComponentType::Float, false),
            Err(LayoutError::InvalidComponentCount { count: 5, .. })
        ));
    }

    #[test]
    fn declarations_after_end_need_begin() {
        let mut l = position_color();
        assert_eq!(
            l.try_set("uv", 2, ComponentType::Float, false).unwrap_err(),
            LayoutError::AlreadyEnded
        );
    }

    // ── to_wgpu ───────────────────────────────────────────────────────────

    #[test]
    fn to_wgpu_resolves_locations_by_name() {
        let l = position_color();
        let w = l
            .to_wgpu(|name| match name {
                "position" => Some(0),
                "color" => Some(1),
                _ => None,
            })
            .unwrap();

        assert_eq!(w.stride, 12);
        assert_eq!(w.attributes[0].format, wgpu::VertexFormat::Float32x2);
        assert_eq!(w.attributes[1].format, wgpu::VertexFormat::Unorm8x4);
        assert_eq!(w.attributes[1].offset, 8);
        assert_eq!(w.attributes[1].shader_location, 1);
        assert_eq!(w.buffer_layout().array_stride, 12);
    }

    #[test]
    fn to_wgpu_reports_unknown_name() {
        let l = position_color();
        let err = l.to_wgpu(|name| (name == "position").then_some(0)).unwrap_err();
        assert_eq!(err, LayoutError::UnresolvedAttribute { name: "color".into() });
    }

    #[test]
    fn to_wgpu_requires_end() {
        let mut l = VertexLayout::new();
        l.begin().set("position", 2, ComponentType::Float);
        assert_eq!(l.to_wgpu(|_| Some(0)).unwrap_err(), LayoutError::NotEnded);
    }

    // ── cast_vertices ─────────────────────────────────────────────────────

    #[repr(C)]
    #[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
    struct ColoredPoint {
        position: [f32; 2],
        color: [u8; 4],
    }

    #[test]
    fn cast_vertices_matches_stride() {
        let l = position_color();
        let points = [
            ColoredPoint { position: [0.0, 1.0], color: [255, 0, 0, 255] },
            ColoredPoint { position: [1.0, 0.0], color: [0, 0, 255, 255] },
        ];

        let bytes = l.cast_vertices(&points).unwrap();
        assert_eq!(bytes.len(), 24);
        assert_eq!(&bytes[8..12], &[255, 0, 0, 255]);
        assert_eq!(&bytes[12..16], &0.0f32.to_ne_bytes());
    }

    #[test]
    fn cast_vertices_rejects_wrong_vertex_size() {
        let l = position_color();
        let err = l.cast_vertices(&[[0.0f32; 4]]).unwrap_err();
        assert_eq!(err, LayoutError::VertexSizeMismatch { stride: 12, size: 16 });
    }

    #[test]
    fn cast_vertices_requires_end() {
        let mut l = VertexLayout::new();
        l.begin().set("position", 2, ComponentType::Float);
        assert_eq!(l.cast_vertices(&[[0.0f32; 2]]).unwrap_err(), LayoutError::NotEnded);
    }
}

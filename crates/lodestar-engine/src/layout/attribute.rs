/// Scalar type of one vertex attribute component.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum ComponentType {
    Byte,
    UnsignedByte,
    Short,
    UnsignedShort,
    Int,
    UnsignedInt,
    Float,
}

impl ComponentType {
    pub const ALL: [ComponentType; 7] = [
        ComponentType::Byte,
        ComponentType::UnsignedByte,
        ComponentType::Short,
        ComponentType::UnsignedShort,
        ComponentType::Int,
        ComponentType::UnsignedInt,
        ComponentType::Float,
    ];

    /// Size of one component in bytes.
    pub const fn size_bytes(self) -> u32 {
        match self {
            ComponentType::Byte | ComponentType::UnsignedByte => 1,
            ComponentType::Short | ComponentType::UnsignedShort => 2,
            ComponentType::Int | ComponentType::UnsignedInt | ComponentType::Float => 4,
        }
    }

    /// Component type code as used by glTF accessors (5120..=5126).
    pub const fn code(self) -> u32 {
        match self {
            ComponentType::Byte => 5120,
            ComponentType::UnsignedByte => 5121,
            ComponentType::Short => 5122,
            ComponentType::UnsignedShort => 5123,
            ComponentType::Int => 5124,
            ComponentType::UnsignedInt => 5125,
            ComponentType::Float => 5126,
        }
    }

    /// Inverse of [`code`](Self::code). Unknown codes yield `None`.
    pub fn from_code(code: u32) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.code() == code)
    }
}

/// One named per-vertex input.
///
/// `stride_bytes` and `offset_bytes` are derived by [`VertexLayout::end`]
/// and stay zero until then.
///
/// [`VertexLayout::end`]: super::VertexLayout::end
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct VertexAttribute {
    pub name: String,
    pub component_count: u32,
    pub component_type: ComponentType,
    /// Integer values are rescaled to [0, 1] (unsigned) or [-1, 1] (signed) on read.
    pub normalized: bool,
    pub stride_bytes: u32,
    pub offset_bytes: u32,
}

impl VertexAttribute {
    pub(crate) fn new(
        name: &str,
        component_count: u32,
        component_type: ComponentType,
        normalized: bool,
    ) -> Self {
        Self {
            name: name.to_string(),
            component_count,
            component_type,
            normalized,
            stride_bytes: 0,
            offset_bytes: 0,
        }
    }

    /// `component_count * component_type.size_bytes()`.
    pub fn size_bytes(&self) -> u32 {
        self.component_count * self.component_type.size_bytes()
    }

    /// GPU vertex format for this attribute, if the GPU has one.
    ///
    /// 8- and 16-bit types have no 3-component formats, 32-bit integers have
    /// no normalized formats. `normalized` is ignored for floats.
    pub fn format(&self) -> Option<wgpu::VertexFormat> {
        use wgpu::VertexFormat as F;
        use ComponentType as T;

        let n = self.normalized;
        let format = match (self.component_type, self.component_count) {
            (T::Byte, 1) => if n { F::Snorm8 } else { F::Sint8 },
            (T::Byte, 2) => if n { F::Snorm8x2 } else { F::Sint8x2 },
            (T::Byte, 4) => if n { F::Snorm8x4 } else { F::Sint8x4 },
            (T::UnsignedByte, 1) => if n { F::Unorm8 } else { F::Uint8 },
            (T::UnsignedByte, 2) => if n { F::Unorm8x2 } else { F::Uint8x2 },
            (T::UnsignedByte, 4) => if n { F::Unorm8x4 } else { F::Uint8x4 },
            (T::Short, 1) => if n { F::Snorm16 } else { F::Sint16 },
            (T::Short, 2) => if n { F::Snorm16x2 } else { F::Sint16x2 },
            (T::Short, 4) => if n { F::Snorm16x4 } else { F::Sint16x4 },
            (T::UnsignedShort, 1) => if n { F::Unorm16 } else { F::Uint16 },
            (T::UnsignedShort, 2) => if n { F::Unorm16x2 } else { F::Uint16x2 },
            (T::UnsignedShort, 4) => if n { F::Unorm16x4 } else { F::Uint16x4 },
            (T::Int | T::UnsignedInt, _) if n => return None,
            (T::Int, 1) => F::Sint32,
            (T::Int, 2) => F::Sint32x2,
            (T::Int, 3) => F::Sint32x3,
            (T::Int, 4) => F::Sint32x4,
            (T::UnsignedInt, 1) => F::Uint32,
            (T::UnsignedInt, 2) => F::Uint32x2,
            (T::UnsignedInt, 3) => F::Uint32x3,
            (T::UnsignedInt, 4) => F::Uint32x4,
            (T::Float, 1) => F::Float32,
            (T::Float, 2) => F::Float32x2,
            (T::Float, 3) => F::Float32x3,
            (T::Float, 4) => F::Float32x4,
            _ => return None,
        };

        Some(format)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn component_sizes() {
        assert_eq!(ComponentType::Byte.size_bytes(), 1);
        assert_eq!(ComponentType::UnsignedByte.size_bytes(), 1);
        assert_eq!(ComponentType::Short.size_bytes(), 2);
        assert_eq!(ComponentType::UnsignedShort.size_bytes(), 2);
        assert_eq!(ComponentType::Int.size_bytes(), 4);
        assert_eq!(ComponentType::UnsignedInt.size_bytes(), 4);
        assert_eq!(ComponentType::Float.size_bytes(), 4);
    }

    #[test]
    fn codes_round_trip_and_reject_unknown() {
        for t in ComponentType::ALL {
            assert_eq!(ComponentType::from_code(t.code()), Some(t));
        }
        assert_eq!(ComponentType::from_code(5127), None);
        assert_eq!(ComponentType::from_code(0), None);
    }

    #[test]
    fn format_matches_wgpu_size() {
        let a = VertexAttribute::new("color", 4, ComponentType::UnsignedByte, true);
        let f = a.format().unwrap();
        assert_eq!(f, wgpu::VertexFormat::Unorm8x4);
        assert_eq!(f.size(), u64::from(a.size_bytes()));

        let p = VertexAttribute::new("position", 3, ComponentType::Float, false);
        assert_eq!(p.format().unwrap().size(), u64::from(p.size_bytes()));
    }

    #[test]
    fn formats_without_gpu_equivalent() {
        assert!(VertexAttribute::new("a", 3, ComponentType::UnsignedByte, false).format().is_none());
        assert!(VertexAttribute::new("a", 3, ComponentType::Short, true).format().is_none());
        assert!(VertexAttribute::new("a", 2, ComponentType::Int, true).format().is_none());
    }
}

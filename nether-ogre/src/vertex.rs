//! Vertex declaration types and the format/usage code tables

/// Storage format of one vertex element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VertexFormat {
    Float1,
    Float2,
    Float3,
    Float4,
    /// Packed 8-bit colour (ARGB/ABGR/legacy colour codes)
    Colour,
    Short2,
    Short4,
    UByte4,
    UByte4Norm,
    Short2Norm,
    Short4Norm,
}

impl VertexFormat {
    /// Map an on-disk element type code
    pub fn from_code(code: u16) -> Option<Self> {
        Some(match code {
            0 => Self::Float1,
            1 => Self::Float2,
            2 => Self::Float3,
            3 => Self::Float4,
            4 | 11 => Self::Colour,
            6 => Self::Short2,
            8 => Self::Short4,
            9 => Self::UByte4,
            30 => Self::UByte4Norm,
            31 => Self::Short2Norm,
            32 => Self::Short4Norm,
            _ => return None,
        })
    }

    /// Size in bytes of one element of this format
    pub const fn size(self) -> u16 {
        match self {
            Self::Float1 => 4,
            Self::Float2 => 8,
            Self::Float3 => 12,
            Self::Float4 => 16,
            Self::Colour | Self::UByte4 | Self::UByte4Norm => 4,
            Self::Short2 | Self::Short2Norm => 4,
            Self::Short4 | Self::Short4Norm => 8,
        }
    }
}

/// Semantic of one vertex element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VertexUsage {
    Position,
    BlendWeights,
    BlendIndices,
    Normal,
    Diffuse,
    TextureCoordinates,
    Binormal,
    Tangent,
}

impl VertexUsage {
    /// Map an on-disk element semantic code
    pub fn from_code(code: u16) -> Option<Self> {
        Some(match code {
            1 => Self::Position,
            2 => Self::BlendWeights,
            3 => Self::BlendIndices,
            4 => Self::Normal,
            5 => Self::Diffuse,
            7 => Self::TextureCoordinates,
            8 => Self::Binormal,
            9 => Self::Tangent,
            _ => return None,
        })
    }
}

/// One entry of a vertex declaration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VertexElement {
    /// Buffer binding index this element is read from
    pub source: u16,
    /// Byte offset inside one vertex of that binding
    pub offset: u16,
    pub format: VertexFormat,
    pub usage: VertexUsage,
    /// Distinguishes repeated usages, e.g. several texture coordinate sets
    pub usage_index: u16,
}

/// Elements sharing one binding index, in declaration order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VertexLayout {
    pub elements: Vec<VertexElement>,
}

impl VertexLayout {
    /// Collect the elements of `declaration` bound to `source`
    pub fn for_binding(declaration: &[VertexElement], source: u16) -> Self {
        Self {
            elements: declaration
                .iter()
                .filter(|e| e.source == source)
                .copied()
                .collect(),
        }
    }

    /// Sum of element sizes
    pub fn stride(&self) -> u32 {
        self.elements.iter().map(|e| u32::from(e.format.size())).sum()
    }

    pub fn find(&self, usage: VertexUsage, usage_index: u16) -> Option<&VertexElement> {
        self.elements
            .iter()
            .find(|e| e.usage == usage && e.usage_index == usage_index)
    }
}

/// Raw vertex data for one binding index
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VertexBufferBinding {
    pub binding_index: u16,
    pub stride: u16,
    pub layout: VertexLayout,
    /// `vertex_count * stride` bytes, little-endian as stored on disk
    pub data: Vec<u8>,
}

impl VertexBufferBinding {
    pub fn vertex_count(&self) -> usize {
        if self.stride == 0 {
            0
        } else {
            self.data.len() / self.stride as usize
        }
    }
}

use crate::gfx::backend::BufferId;

/// Component type of vertex attribute data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataType {
    Byte,
    UnsignedByte,
    Short,
    UnsignedShort,
    Int,
    UnsignedInt,
    Float,
}

/// How the GPU reads one attribute out of its buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AttributeLayout {
    /// Components per vertex, 1 to 4
    pub components: u8,
    pub data_type: DataType,
    pub normalized: bool,
    /// Bytes between consecutive vertices, 0 for tightly packed
    pub stride: u32,
    /// Byte offset of the first component
    pub offset: u32,
}

impl AttributeLayout {
    /// Tightly packed, non-normalized `f32` components.
    pub fn floats(components: u8) -> Self {
        Self {
            components,
            data_type: DataType::Float,
            normalized: false,
            stride: 0,
            offset: 0,
        }
    }

    pub fn with_data_type(mut self, data_type: DataType) -> Self {
        self.data_type = data_type;
        self
    }

    pub fn with_normalized(mut self, normalized: bool) -> Self {
        self.normalized = normalized;
        self
    }

    pub fn with_stride(mut self, stride: u32) -> Self {
        self.stride = stride;
        self
    }

    pub fn with_offset(mut self, offset: u32) -> Self {
        self.offset = offset;
        self
    }
}

/// A named vertex attribute fed from a GPU buffer.
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeBinding {
    pub name: String,
    pub buffer: BufferId,
    pub layout: AttributeLayout,
}

impl AttributeBinding {
    pub fn new(name: impl Into<String>, buffer: BufferId, layout: AttributeLayout) -> Self {
        Self {
            name: name.into(),
            buffer,
            layout,
        }
    }
}

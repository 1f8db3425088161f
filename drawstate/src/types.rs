//! Value types stored in a draw-state snapshot
//!
//! Graphics API enums and plain structs are mirrored as `#[repr(transparent)]`
//! or `#[repr(C)]` wrappers over `u32`. Every value is `Pod`, so it can live in
//! the snapshot arena and be compared or hashed as raw bytes.

use bytemuck::{Pod, Zeroable};
use xxhash_rust::xxh3::xxh3_64;

macro_rules! api_enum {
    (
        $(#[$meta:meta])*
        $name:ident { $($variant:ident = $value:expr),* $(,)? }
    ) => {
        $(#[$meta])*
        #[repr(transparent)]
        #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Pod, Zeroable)]
        pub struct $name(pub u32);

        impl $name {
            $(pub const $variant: Self = Self($value);)*
        }
    };
}

api_enum! {
    /// API boolean, `0` or `1`
    Bool32 { FALSE = 0, TRUE = 1 }
}

impl Bool32 {
    pub const fn is_true(self) -> bool {
        self.0 != 0
    }
}

api_enum! {
    /// Attachment and vertex attribute format
    Format {
        UNDEFINED = 0,
        R8G8B8A8_UNORM = 37,
        B8G8R8A8_UNORM = 44,
        R32G32_SFLOAT = 103,
        R32G32B32_SFLOAT = 106,
        R16G16B16A16_SFLOAT = 97,
        R32G32B32A32_SFLOAT = 109,
        D16_UNORM = 124,
        D32_SFLOAT = 126,
        S8_UINT = 127,
        D24_UNORM_S8_UINT = 129,
        D32_SFLOAT_S8_UINT = 130,
    }
}

api_enum! {
    CullModeFlags { NONE = 0, FRONT = 1, BACK = 2, FRONT_AND_BACK = 3 }
}

api_enum! {
    FrontFace { COUNTER_CLOCKWISE = 0, CLOCKWISE = 1 }
}

api_enum! {
    PrimitiveTopology {
        POINT_LIST = 0,
        LINE_LIST = 1,
        LINE_STRIP = 2,
        TRIANGLE_LIST = 3,
        TRIANGLE_STRIP = 4,
        TRIANGLE_FAN = 5,
        PATCH_LIST = 10,
    }
}

api_enum! {
    CompareOp {
        NEVER = 0,
        LESS = 1,
        EQUAL = 2,
        LESS_OR_EQUAL = 3,
        GREATER = 4,
        NOT_EQUAL = 5,
        GREATER_OR_EQUAL = 6,
        ALWAYS = 7,
    }
}

api_enum! {
    StencilOp {
        KEEP = 0,
        ZERO = 1,
        REPLACE = 2,
        INCREMENT_AND_CLAMP = 3,
        DECREMENT_AND_CLAMP = 4,
        INVERT = 5,
        INCREMENT_AND_WRAP = 6,
        DECREMENT_AND_WRAP = 7,
    }
}

api_enum! {
    LogicOp { CLEAR = 0, AND = 1, COPY = 3, NO_OP = 5, XOR = 6, OR = 7, INVERT = 10, SET = 15 }
}

api_enum! {
    PolygonMode { FILL = 0, LINE = 1, POINT = 2 }
}

api_enum! {
    SampleCountFlags { TYPE_1 = 1, TYPE_2 = 2, TYPE_4 = 4, TYPE_8 = 8, TYPE_16 = 16 }
}

/// One word of a multisample coverage mask
pub type SampleMask = u32;

api_enum! {
    TessellationDomainOrigin { UPPER_LEFT = 0, LOWER_LEFT = 1 }
}

api_enum! {
    ConservativeRasterizationMode { DISABLED = 0, OVERESTIMATE = 1, UNDERESTIMATE = 2 }
}

api_enum! {
    ProvokingVertexMode { FIRST_VERTEX = 0, LAST_VERTEX = 1 }
}

api_enum! {
    LineRasterizationMode { DEFAULT = 0, RECTANGULAR = 1, BRESENHAM = 2, RECTANGULAR_SMOOTH = 3 }
}

api_enum! {
    CoverageModulationMode { NONE = 0, RGB = 1, ALPHA = 2, RGBA = 3 }
}

api_enum! {
    CoverageReductionMode { MERGE = 0, TRUNCATE = 1 }
}

api_enum! {
    ViewportCoordinateSwizzle {
        POSITIVE_X = 0,
        NEGATIVE_X = 1,
        POSITIVE_Y = 2,
        NEGATIVE_Y = 3,
        POSITIVE_Z = 4,
        NEGATIVE_Z = 5,
        POSITIVE_W = 6,
        NEGATIVE_W = 7,
    }
}

api_enum! {
    BlendFactor {
        ZERO = 0,
        ONE = 1,
        SRC_COLOR = 2,
        ONE_MINUS_SRC_COLOR = 3,
        DST_COLOR = 4,
        ONE_MINUS_DST_COLOR = 5,
        SRC_ALPHA = 6,
        ONE_MINUS_SRC_ALPHA = 7,
        DST_ALPHA = 8,
        ONE_MINUS_DST_ALPHA = 9,
    }
}

api_enum! {
    BlendOp { ADD = 0, SUBTRACT = 1, REVERSE_SUBTRACT = 2, MIN = 3, MAX = 4 }
}

api_enum! {
    /// Color write mask bits
    ColorComponentFlags { R = 1, G = 2, B = 4, A = 8, RGBA = 15 }
}

api_enum! {
    VertexInputRate { VERTEX = 0, INSTANCE = 1 }
}

/// Stencil operations and masks for one face
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Pod, Zeroable)]
pub struct StencilOpState {
    pub fail_op: StencilOp,
    pub pass_op: StencilOp,
    pub depth_fail_op: StencilOp,
    pub compare_op: CompareOp,
    pub compare_mask: u32,
    pub write_mask: u32,
    pub reference: u32,
}

/// Per-attachment blend state
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Pod, Zeroable)]
pub struct ColorBlendAttachmentState {
    pub blend_enable: Bool32,
    pub src_color_blend_factor: BlendFactor,
    pub dst_color_blend_factor: BlendFactor,
    pub color_blend_op: BlendOp,
    pub src_alpha_blend_factor: BlendFactor,
    pub dst_alpha_blend_factor: BlendFactor,
    pub alpha_blend_op: BlendOp,
    pub color_write_mask: ColorComponentFlags,
}

#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Pod, Zeroable)]
pub struct ViewportSwizzle {
    pub x: ViewportCoordinateSwizzle,
    pub y: ViewportCoordinateSwizzle,
    pub z: ViewportCoordinateSwizzle,
    pub w: ViewportCoordinateSwizzle,
}

#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Pod, Zeroable)]
pub struct VertexInputAttributeDescription {
    pub location: u32,
    pub binding: u32,
    pub format: Format,
    pub offset: u32,
}

#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Pod, Zeroable)]
pub struct VertexInputBindingDescription {
    pub binding: u32,
    pub stride: u32,
    pub input_rate: VertexInputRate,
    pub divisor: u32,
}

/// Comparable handle for the shader bound to one stage slot
///
/// Two snapshots agree on a stage when their identities are equal; the value
/// itself is opaque to this crate. `NONE` means no shader is bound.
#[repr(transparent)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Pod, Zeroable)]
pub struct ShaderIdentity(pub u64);

impl ShaderIdentity {
    pub const NONE: Self = Self(0);
}

/// Shader stage slots tracked per snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum ShaderStage {
    Vertex = 0,
    Fragment = 1,
    TessellationControl = 2,
    TessellationEvaluation = 3,
    Geometry = 4,
    Mesh = 5,
    Task = 6,
}

impl ShaderStage {
    pub const COUNT: usize = 7;

    pub const ALL: [ShaderStage; Self::COUNT] = [
        ShaderStage::Vertex,
        ShaderStage::Fragment,
        ShaderStage::TessellationControl,
        ShaderStage::TessellationEvaluation,
        ShaderStage::Geometry,
        ShaderStage::Mesh,
        ShaderStage::Task,
    ];

    /// Slot index into the comparable shader array
    pub const fn index(self) -> usize {
        self as usize
    }

    pub const fn name(self) -> &'static str {
        match self {
            ShaderStage::Vertex => "vertex",
            ShaderStage::Fragment => "fragment",
            ShaderStage::TessellationControl => "tessellation_control",
            ShaderStage::TessellationEvaluation => "tessellation_evaluation",
            ShaderStage::Geometry => "geometry",
            ShaderStage::Mesh => "mesh",
            ShaderStage::Task => "task",
        }
    }
}

/// A value that can be stored in a snapshot field.
///
/// Equality and hashing operate on the value's bytes. Floating point fields are
/// therefore equal only when their bit patterns match, which keeps equality
/// reflexive for NaN.
pub trait StateValue: Pod {
    fn state_eq(&self, other: &Self) -> bool {
        bytemuck::bytes_of(self) == bytemuck::bytes_of(other)
    }

    fn state_hash(&self) -> u64 {
        xxh3_64(bytemuck::bytes_of(self))
    }

    /// True for the "undefined" sentinel of format-like values
    fn is_undefined(&self) -> bool {
        false
    }
}

impl StateValue for Format {
    fn is_undefined(&self) -> bool {
        *self == Format::UNDEFINED
    }
}

macro_rules! impl_state_value {
    ($($ty:ty),* $(,)?) => {
        $(impl StateValue for $ty {})*
    };
}

impl_state_value!(
    u32,
    f32,
    Bool32,
    CullModeFlags,
    FrontFace,
    PrimitiveTopology,
    CompareOp,
    StencilOpState,
    LogicOp,
    PolygonMode,
    SampleCountFlags,
    TessellationDomainOrigin,
    ConservativeRasterizationMode,
    ProvokingVertexMode,
    LineRasterizationMode,
    CoverageModulationMode,
    CoverageReductionMode,
    ViewportSwizzle,
    ColorBlendAttachmentState,
    VertexInputAttributeDescription,
    VertexInputBindingDescription,
    ShaderIdentity,
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zeroed_values_are_api_defaults() {
        assert_eq!(Format::zeroed(), Format::UNDEFINED);
        assert_eq!(Bool32::zeroed(), Bool32::FALSE);
        assert_eq!(CompareOp::zeroed(), CompareOp::NEVER);
        assert_eq!(ShaderIdentity::zeroed(), ShaderIdentity::NONE);
    }

    #[test]
    fn test_float_state_eq_is_bitwise() {
        let nan = f32::NAN;
        // Should be reflexive even for NaN
        assert!(nan.state_eq(&nan));
        // Should distinguish signed zeros
        assert!(!0.0f32.state_eq(&-0.0f32));
    }

    #[test]
    fn test_state_hash_follows_value() {
        let a = StencilOpState {
            compare_op: CompareOp::ALWAYS,
            write_mask: 0xff,
            ..Default::default()
        };
        let mut b = a;
        assert_eq!(a.state_hash(), b.state_hash());

        b.reference = 1;
        assert_ne!(a.state_hash(), b.state_hash());
    }

    #[test]
    fn test_only_format_has_undefined_sentinel() {
        assert!(Format::UNDEFINED.is_undefined());
        assert!(!Format::D24_UNORM_S8_UINT.is_undefined());
        assert!(!0u32.is_undefined());
    }

    #[test]
    fn test_shader_stage_indices_are_dense() {
        for (i, stage) in ShaderStage::ALL.iter().enumerate() {
            assert_eq!(stage.index(), i);
        }
    }
}

//! State catalog
//!
//! Static description of every tracked field: which group owns it, its arity,
//! which pipeline-library subset (if any) it gates, and whether the "unused
//! attachments" relaxation applies to it. Plus the immutable per-device
//! `StateCatalog` that says which optional groups are active.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::types::ShaderStage;

/// Logical group of draw state
///
/// Ordinals are stable and double as bit positions in [`StateGroups`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum StateGroup {
    /// Baseline state, always present
    Misc = 0,
    ExtendedDynamicState = 1,
    ExtendedDynamicState2 = 2,
    ExtendedDynamicState3 = 3,
    VertexInputDynamicState = 4,
}

impl StateGroup {
    pub const COUNT: usize = 5;

    pub const ALL: [StateGroup; Self::COUNT] = [
        StateGroup::Misc,
        StateGroup::ExtendedDynamicState,
        StateGroup::ExtendedDynamicState2,
        StateGroup::ExtendedDynamicState3,
        StateGroup::VertexInputDynamicState,
    ];

    pub const fn ordinal(self) -> u32 {
        self as u32
    }

    pub const fn from_ordinal(ordinal: u32) -> Option<Self> {
        match ordinal {
            0 => Some(StateGroup::Misc),
            1 => Some(StateGroup::ExtendedDynamicState),
            2 => Some(StateGroup::ExtendedDynamicState2),
            3 => Some(StateGroup::ExtendedDynamicState3),
            4 => Some(StateGroup::VertexInputDynamicState),
            _ => None,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            StateGroup::Misc => "MISC",
            StateGroup::ExtendedDynamicState => "EXTENDED_DYNAMIC_STATE",
            StateGroup::ExtendedDynamicState2 => "EXTENDED_DYNAMIC_STATE_2",
            StateGroup::ExtendedDynamicState3 => "EXTENDED_DYNAMIC_STATE_3",
            StateGroup::VertexInputDynamicState => "VERTEX_INPUT_DYNAMIC_STATE",
        }
    }

    pub const fn flag(self) -> StateGroups {
        StateGroups::from_bits_retain(1 << self as u32)
    }

    /// Fields owned by this group, in declaration order
    pub fn fields(self) -> impl Iterator<Item = FieldId> {
        FIELDS
            .iter()
            .filter(move |info| info.group == self)
            .map(|info| info.id)
    }
}

impl fmt::Display for StateGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

bitflags::bitflags! {
    /// Set of state groups, indexed by ordinal
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct StateGroups: u32 {
        const MISC = 1 << 0;
        const EXTENDED_DYNAMIC_STATE = 1 << 1;
        const EXTENDED_DYNAMIC_STATE_2 = 1 << 2;
        const EXTENDED_DYNAMIC_STATE_3 = 1 << 3;
        const VERTEX_INPUT_DYNAMIC_STATE = 1 << 4;
    }
}

impl StateGroups {
    /// Iterate the contained groups in ordinal order
    pub fn groups(self) -> impl Iterator<Item = StateGroup> {
        StateGroup::ALL
            .into_iter()
            .filter(move |group| self.contains(group.flag()))
    }
}

/// Device limit that sizes an init-time array
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LimitKind {
    MaxColorAttachments,
    MaxVertexInputAttributes,
    MaxVertexInputBindings,
    MaxViewports,
}

impl LimitKind {
    pub const fn name(self) -> &'static str {
        match self {
            LimitKind::MaxColorAttachments => "max_color_attachments",
            LimitKind::MaxVertexInputAttributes => "max_vertex_input_attributes",
            LimitKind::MaxVertexInputBindings => "max_vertex_input_bindings",
            LimitKind::MaxViewports => "max_viewports",
        }
    }
}

/// Device limits queried once per device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceLimits {
    pub max_color_attachments: u32,
    pub max_vertex_input_attributes: u32,
    pub max_vertex_input_bindings: u32,
    pub max_viewports: u32,
}

impl Default for DeviceLimits {
    fn default() -> Self {
        Self {
            max_color_attachments: 8,
            max_vertex_input_attributes: 32,
            max_vertex_input_bindings: 32,
            max_viewports: 16,
        }
    }
}

impl DeviceLimits {
    pub const fn get(&self, kind: LimitKind) -> u32 {
        match kind {
            LimitKind::MaxColorAttachments => self.max_color_attachments,
            LimitKind::MaxVertexInputAttributes => self.max_vertex_input_attributes,
            LimitKind::MaxVertexInputBindings => self.max_vertex_input_bindings,
            LimitKind::MaxViewports => self.max_viewports,
        }
    }
}

/// Length class of a field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Arity {
    Scalar,
    /// Fixed length known at build time
    CompileTimeArray(usize),
    /// Length taken from a device limit when the snapshot is created
    InitTimeArray(LimitKind),
}

impl Arity {
    pub const fn is_array(self) -> bool {
        !matches!(self, Arity::Scalar)
    }
}

/// Independently linkable part of a pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PipelineSubset {
    PreRasterizationShaders,
    FragmentShader,
}

impl PipelineSubset {
    pub const ALL: [PipelineSubset; 2] = [
        PipelineSubset::PreRasterizationShaders,
        PipelineSubset::FragmentShader,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            PipelineSubset::PreRasterizationShaders => "pre_rasterization_shaders",
            PipelineSubset::FragmentShader => "fragment_shader",
        }
    }

    /// Shader slots linked into this subset
    pub const fn shader_stages(self) -> &'static [ShaderStage] {
        match self {
            PipelineSubset::PreRasterizationShaders => &[
                ShaderStage::Vertex,
                ShaderStage::TessellationControl,
                ShaderStage::TessellationEvaluation,
                ShaderStage::Geometry,
                ShaderStage::Task,
                ShaderStage::Mesh,
            ],
            PipelineSubset::FragmentShader => &[ShaderStage::Fragment],
        }
    }

    /// Fields whose values gate relinking this subset
    pub fn fields(self) -> impl Iterator<Item = FieldId> {
        FIELDS
            .iter()
            .filter(move |info| info.subset == Some(self))
            .map(|info| info.id)
    }
}

/// How the "unused attachment formats may be ignored" capability affects a field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Relaxation {
    /// Always compared exactly
    Strict,
    /// Equal when the relaxed side holds `Format::UNDEFINED`
    UndefinedFormat,
    /// Not compared when either side is relaxed
    AttachmentCount,
}

/// Identifier of every tracked field, in declaration order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FieldId {
    // MISC
    DepthAttachmentFormat,
    StencilAttachmentFormat,
    ColorAttachmentFormats,
    NumColorAttachments,
    ColorBlendAttachmentStates,
    ComparableShaders,
    // EXTENDED_DYNAMIC_STATE
    CullMode,
    DepthBoundsTestEnable,
    DepthCompareOp,
    DepthTestEnable,
    DepthWriteEnable,
    FrontFace,
    PrimitiveTopology,
    NumScissors,
    NumViewports,
    StencilFront,
    StencilBack,
    StencilTestEnable,
    // EXTENDED_DYNAMIC_STATE_2
    LogicOp,
    PrimitiveRestartEnable,
    RasterizerDiscardEnable,
    DepthBiasEnable,
    PatchControlPoints,
    // EXTENDED_DYNAMIC_STATE_3
    PolygonMode,
    RasterizationSamples,
    LogicOpEnable,
    DepthClampEnable,
    DomainOrigin,
    AlphaToOneEnable,
    AlphaToCoverageEnable,
    SampleMasks,
    RasterizationStream,
    ConservativeRasterizationMode,
    ExtraPrimitiveOverestimationSize,
    DepthClipEnable,
    SampleLocationsEnable,
    ProvokingVertexMode,
    LineRasterizationMode,
    StippledLineEnable,
    NegativeOneToOne,
    CoverageModulationMode,
    CoverageModulationTableEnable,
    CoverageModulationTableValues,
    CoverageModulationTableCount,
    CoverageReductionMode,
    CoverageToColorEnable,
    CoverageToColorLocation,
    ViewportWScalingEnable,
    ViewportSwizzleCount,
    ViewportSwizzles,
    ShadingRateImageEnable,
    RepresentativeFragmentTestEnable,
    // VERTEX_INPUT_DYNAMIC_STATE
    VertexInputAttributeDescriptions,
    VertexInputBindingDescriptions,
    NumVertexInputAttributeDescriptions,
    NumVertexInputBindingDescriptions,
}

impl FieldId {
    pub const COUNT: usize = 56;

    pub fn info(self) -> &'static FieldInfo {
        &FIELDS[self as usize]
    }

    pub fn name(self) -> &'static str {
        self.info().name
    }

    pub fn group(self) -> StateGroup {
        self.info().group
    }

    pub fn arity(self) -> Arity {
        self.info().arity
    }

    pub fn subset(self) -> Option<PipelineSubset> {
        self.info().subset
    }

    pub fn relaxation(self) -> Relaxation {
        self.info().relaxation
    }
}

/// Static description of one field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldInfo {
    pub id: FieldId,
    pub name: &'static str,
    pub group: StateGroup,
    pub arity: Arity,
    pub subset: Option<PipelineSubset>,
    pub relaxation: Relaxation,
}

impl FieldInfo {
    const fn scalar(id: FieldId, name: &'static str, group: StateGroup) -> Self {
        Self {
            id,
            name,
            group,
            arity: Arity::Scalar,
            subset: None,
            relaxation: Relaxation::Strict,
        }
    }

    const fn array(id: FieldId, name: &'static str, group: StateGroup, len: usize) -> Self {
        Self {
            arity: Arity::CompileTimeArray(len),
            ..Self::scalar(id, name, group)
        }
    }

    const fn limited(id: FieldId, name: &'static str, group: StateGroup, limit: LimitKind) -> Self {
        Self {
            arity: Arity::InitTimeArray(limit),
            ..Self::scalar(id, name, group)
        }
    }

    const fn pre_rasterization(self) -> Self {
        Self {
            subset: Some(PipelineSubset::PreRasterizationShaders),
            ..self
        }
    }

    const fn fragment(self) -> Self {
        Self {
            subset: Some(PipelineSubset::FragmentShader),
            ..self
        }
    }

    const fn relaxed(self, relaxation: Relaxation) -> Self {
        Self { relaxation, ..self }
    }
}

/// Words in the sample mask array (up to 64 samples)
pub const MAX_SAMPLE_MASK_WORDS: usize = 2;

/// Entries in the coverage modulation table
pub const MAX_COVERAGE_MODULATION_TABLE_VALUES: usize = 64;

const MISC: StateGroup = StateGroup::Misc;
const EDS: StateGroup = StateGroup::ExtendedDynamicState;
const EDS2: StateGroup = StateGroup::ExtendedDynamicState2;
const EDS3: StateGroup = StateGroup::ExtendedDynamicState3;
const VI: StateGroup = StateGroup::VertexInputDynamicState;

/// Field table indexed by `FieldId as usize`
pub static FIELDS: [FieldInfo; FieldId::COUNT] = [
    FieldInfo::scalar(FieldId::DepthAttachmentFormat, "depth_attachment_format", MISC)
        .relaxed(Relaxation::UndefinedFormat),
    FieldInfo::scalar(FieldId::StencilAttachmentFormat, "stencil_attachment_format", MISC)
        .relaxed(Relaxation::UndefinedFormat),
    FieldInfo::limited(
        FieldId::ColorAttachmentFormats,
        "color_attachment_formats",
        MISC,
        LimitKind::MaxColorAttachments,
    )
    .relaxed(Relaxation::UndefinedFormat),
    FieldInfo::scalar(FieldId::NumColorAttachments, "num_color_attachments", MISC)
        .relaxed(Relaxation::AttachmentCount),
    FieldInfo::limited(
        FieldId::ColorBlendAttachmentStates,
        "color_blend_attachment_states",
        MISC,
        LimitKind::MaxColorAttachments,
    ),
    FieldInfo::array(
        FieldId::ComparableShaders,
        "comparable_shaders",
        MISC,
        ShaderStage::COUNT,
    ),
    FieldInfo::scalar(FieldId::CullMode, "cull_mode", EDS).pre_rasterization(),
    FieldInfo::scalar(FieldId::DepthBoundsTestEnable, "depth_bounds_test_enable", EDS).fragment(),
    FieldInfo::scalar(FieldId::DepthCompareOp, "depth_compare_op", EDS).fragment(),
    FieldInfo::scalar(FieldId::DepthTestEnable, "depth_test_enable", EDS).fragment(),
    FieldInfo::scalar(FieldId::DepthWriteEnable, "depth_write_enable", EDS).fragment(),
    FieldInfo::scalar(FieldId::FrontFace, "front_face", EDS).pre_rasterization(),
    FieldInfo::scalar(FieldId::PrimitiveTopology, "primitive_topology", EDS),
    FieldInfo::scalar(FieldId::NumScissors, "num_scissors", EDS).pre_rasterization(),
    FieldInfo::scalar(FieldId::NumViewports, "num_viewports", EDS).pre_rasterization(),
    FieldInfo::scalar(FieldId::StencilFront, "stencil_front", EDS).fragment(),
    FieldInfo::scalar(FieldId::StencilBack, "stencil_back", EDS).fragment(),
    FieldInfo::scalar(FieldId::StencilTestEnable, "stencil_test_enable", EDS),
    FieldInfo::scalar(FieldId::LogicOp, "logic_op", EDS2),
    FieldInfo::scalar(FieldId::PrimitiveRestartEnable, "primitive_restart_enable", EDS2),
    FieldInfo::scalar(FieldId::RasterizerDiscardEnable, "rasterizer_discard_enable", EDS2),
    FieldInfo::scalar(FieldId::DepthBiasEnable, "depth_bias_enable", EDS2).pre_rasterization(),
    FieldInfo::scalar(FieldId::PatchControlPoints, "patch_control_points", EDS2)
        .pre_rasterization(),
    FieldInfo::scalar(FieldId::PolygonMode, "polygon_mode", EDS3).pre_rasterization(),
    FieldInfo::scalar(FieldId::RasterizationSamples, "rasterization_samples", EDS3).fragment(),
    FieldInfo::scalar(FieldId::LogicOpEnable, "logic_op_enable", EDS3),
    FieldInfo::scalar(FieldId::DepthClampEnable, "depth_clamp_enable", EDS3).pre_rasterization(),
    FieldInfo::scalar(FieldId::DomainOrigin, "domain_origin", EDS3),
    FieldInfo::scalar(FieldId::AlphaToOneEnable, "alpha_to_one_enable", EDS3).fragment(),
    FieldInfo::scalar(FieldId::AlphaToCoverageEnable, "alpha_to_coverage_enable", EDS3).fragment(),
    FieldInfo::array(FieldId::SampleMasks, "sample_masks", EDS3, MAX_SAMPLE_MASK_WORDS).fragment(),
    FieldInfo::scalar(FieldId::RasterizationStream, "rasterization_stream", EDS3),
    FieldInfo::scalar(
        FieldId::ConservativeRasterizationMode,
        "conservative_rasterization_mode",
        EDS3,
    ),
    FieldInfo::scalar(
        FieldId::ExtraPrimitiveOverestimationSize,
        "extra_primitive_overestimation_size",
        EDS3,
    ),
    FieldInfo::scalar(FieldId::DepthClipEnable, "depth_clip_enable", EDS3),
    FieldInfo::scalar(FieldId::SampleLocationsEnable, "sample_locations_enable", EDS3),
    FieldInfo::scalar(FieldId::ProvokingVertexMode, "provoking_vertex_mode", EDS3),
    FieldInfo::scalar(FieldId::LineRasterizationMode, "line_rasterization_mode", EDS3),
    FieldInfo::scalar(FieldId::StippledLineEnable, "stippled_line_enable", EDS3),
    FieldInfo::scalar(FieldId::NegativeOneToOne, "negative_one_to_one", EDS3),
    FieldInfo::scalar(FieldId::CoverageModulationMode, "coverage_modulation_mode", EDS3),
    FieldInfo::scalar(
        FieldId::CoverageModulationTableEnable,
        "coverage_modulation_table_enable",
        EDS3,
    ),
    FieldInfo::array(
        FieldId::CoverageModulationTableValues,
        "coverage_modulation_table_values",
        EDS3,
        MAX_COVERAGE_MODULATION_TABLE_VALUES,
    ),
    FieldInfo::scalar(
        FieldId::CoverageModulationTableCount,
        "coverage_modulation_table_count",
        EDS3,
    ),
    FieldInfo::scalar(FieldId::CoverageReductionMode, "coverage_reduction_mode", EDS3),
    FieldInfo::scalar(FieldId::CoverageToColorEnable, "coverage_to_color_enable", EDS3),
    FieldInfo::scalar(FieldId::CoverageToColorLocation, "coverage_to_color_location", EDS3),
    FieldInfo::scalar(FieldId::ViewportWScalingEnable, "viewport_w_scaling_enable", EDS3),
    FieldInfo::scalar(FieldId::ViewportSwizzleCount, "viewport_swizzle_count", EDS3),
    FieldInfo::limited(
        FieldId::ViewportSwizzles,
        "viewport_swizzles",
        EDS3,
        LimitKind::MaxViewports,
    ),
    FieldInfo::scalar(FieldId::ShadingRateImageEnable, "shading_rate_image_enable", EDS3),
    FieldInfo::scalar(
        FieldId::RepresentativeFragmentTestEnable,
        "representative_fragment_test_enable",
        EDS3,
    ),
    FieldInfo::limited(
        FieldId::VertexInputAttributeDescriptions,
        "vertex_input_attribute_descriptions",
        VI,
        LimitKind::MaxVertexInputAttributes,
    ),
    FieldInfo::limited(
        FieldId::VertexInputBindingDescriptions,
        "vertex_input_binding_descriptions",
        VI,
        LimitKind::MaxVertexInputBindings,
    ),
    FieldInfo::scalar(
        FieldId::NumVertexInputAttributeDescriptions,
        "num_vertex_input_attribute_descriptions",
        VI,
    ),
    FieldInfo::scalar(
        FieldId::NumVertexInputBindingDescriptions,
        "num_vertex_input_binding_descriptions",
        VI,
    ),
];

/// Immutable per-device view of which groups are tracked
///
/// Built once from negotiated extensions and shared by every snapshot created
/// for that device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateCatalog {
    active_groups: StateGroups,
    ignore_unused_attachments: bool,
}

impl StateCatalog {
    /// MISC is always active, whether or not it is in `active_groups`
    pub fn new(active_groups: StateGroups, ignore_unused_attachments: bool) -> Self {
        Self {
            active_groups: active_groups | StateGroups::MISC,
            ignore_unused_attachments,
        }
    }

    /// Every group active, no relaxation
    pub fn all_groups() -> Self {
        Self::new(StateGroups::all(), false)
    }

    pub fn active_groups(&self) -> StateGroups {
        self.active_groups
    }

    pub fn is_group_active(&self, group: StateGroup) -> bool {
        self.active_groups.contains(group.flag())
    }

    /// Whether unused attachment formats may be ignored when comparing
    pub fn ignores_unused_attachments(&self) -> bool {
        self.ignore_unused_attachments
    }

    /// Fields of the active groups, in declaration order
    pub fn active_fields(&self) -> impl Iterator<Item = &'static FieldInfo> + '_ {
        FIELDS
            .iter()
            .filter(move |info| self.is_group_active(info.group))
    }
}

impl Default for StateCatalog {
    fn default() -> Self {
        Self::new(StateGroups::MISC, false)
    }
}

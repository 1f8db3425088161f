//! Per-group field storage and accessors
//!
//! Each group is a plain struct of scalar fields plus its compile-time arrays.
//! `state_group!` generates the struct, its partial hash and comparisons, and
//! the setter/getter pair on [`DrawStateSnapshot`] for every scalar field.

use bytemuck::Zeroable;

use super::DrawStateSnapshot;
use super::hash::{PartialHasher, Relax};
use crate::arena::ArrayField;
use crate::catalog::{
    FieldId, MAX_COVERAGE_MODULATION_TABLE_VALUES, MAX_SAMPLE_MASK_WORDS, StateGroup,
};
use crate::types::{
    Bool32, ColorBlendAttachmentState, CompareOp, ConservativeRasterizationMode,
    CoverageModulationMode, CoverageReductionMode, CullModeFlags, Format, FrontFace,
    LineRasterizationMode, LogicOp, PolygonMode, PrimitiveTopology, ProvokingVertexMode,
    SampleCountFlags, SampleMask, ShaderIdentity, ShaderStage, StateValue, StencilOpState,
    TessellationDomainOrigin, VertexInputAttributeDescription, VertexInputBindingDescription,
    ViewportSwizzle,
};

/// Overwrite `slot` if `value` differs. Returns whether it changed.
fn store<T: StateValue>(slot: &mut T, value: T) -> bool {
    if slot.state_eq(&value) {
        return false;
    }
    *slot = value;
    true
}

macro_rules! state_group {
    (
        $(#[$meta:meta])*
        $name:ident($group:ident) in $member:ident {
            $($id:ident => $field:ident / $setter:ident: $ty:ty;)*
        }
        arrays {
            $($aid:ident => $afield:ident: [$aty:ty; $len:expr];)*
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, Zeroable)]
        pub(crate) struct $name {
            $($field: $ty,)*
            $($afield: [$aty; $len],)*
        }

        impl $name {
            /// Seeded fold over every scalar field; arrays are not hashed
            pub(crate) fn partial_hash(&self, relaxed: bool) -> u64 {
                let mut hasher = PartialHasher::new(relaxed);
                $(hasher.fold(FieldId::$id, &self.$field);)*
                hasher.finish()
            }

            pub(crate) fn fields_eq(&self, other: &Self, relax: Relax) -> bool {
                $(relax.value_eq(FieldId::$id, &self.$field, &other.$field) &&)*
                $(relax.slice_eq(FieldId::$aid, &self.$afield, &other.$afield) &&)*
                true
            }

            /// `None` when `field` is not stored in this struct
            pub(crate) fn field_eq(&self, other: &Self, field: FieldId, relax: Relax) -> Option<bool> {
                match field {
                    $(FieldId::$id => Some(relax.value_eq(field, &self.$field, &other.$field)),)*
                    $(FieldId::$aid => Some(relax.slice_eq(field, &self.$afield, &other.$afield)),)*
                    _ => None,
                }
            }
        }

        impl DrawStateSnapshot {
            $(
                pub fn $setter(&mut self, value: $ty) {
                    if store(&mut self.$member.$field, value) {
                        self.touch(StateGroup::$group);
                    }
                }

                pub fn $field(&self) -> $ty {
                    self.$member.$field
                }
            )*
        }
    };
}

state_group! {
    /// Baseline pipeline state
    MiscState(Misc) in misc {
        DepthAttachmentFormat => depth_attachment_format / set_depth_attachment_format: Format;
        StencilAttachmentFormat => stencil_attachment_format / set_stencil_attachment_format: Format;
        NumColorAttachments => num_color_attachments / set_num_color_attachments: u32;
    }
    arrays {
        ComparableShaders => comparable_shaders: [ShaderIdentity; ShaderStage::COUNT];
    }
}

state_group! {
    EdsState(ExtendedDynamicState) in eds {
        CullMode => cull_mode / set_cull_mode: CullModeFlags;
        DepthBoundsTestEnable => depth_bounds_test_enable / set_depth_bounds_test_enable: Bool32;
        DepthCompareOp => depth_compare_op / set_depth_compare_op: CompareOp;
        DepthTestEnable => depth_test_enable / set_depth_test_enable: Bool32;
        DepthWriteEnable => depth_write_enable / set_depth_write_enable: Bool32;
        FrontFace => front_face / set_front_face: FrontFace;
        PrimitiveTopology => primitive_topology / set_primitive_topology: PrimitiveTopology;
        NumScissors => num_scissors / set_num_scissors: u32;
        NumViewports => num_viewports / set_num_viewports: u32;
        StencilFront => stencil_front / set_stencil_front: StencilOpState;
        StencilBack => stencil_back / set_stencil_back: StencilOpState;
        StencilTestEnable => stencil_test_enable / set_stencil_test_enable: Bool32;
    }
    arrays {}
}

state_group! {
    Eds2State(ExtendedDynamicState2) in eds2 {
        LogicOp => logic_op / set_logic_op: LogicOp;
        PrimitiveRestartEnable => primitive_restart_enable / set_primitive_restart_enable: Bool32;
        RasterizerDiscardEnable => rasterizer_discard_enable / set_rasterizer_discard_enable: Bool32;
        DepthBiasEnable => depth_bias_enable / set_depth_bias_enable: Bool32;
        PatchControlPoints => patch_control_points / set_patch_control_points: u32;
    }
    arrays {}
}

state_group! {
    Eds3State(ExtendedDynamicState3) in eds3 {
        PolygonMode => polygon_mode / set_polygon_mode: PolygonMode;
        RasterizationSamples => rasterization_samples / set_rasterization_samples: SampleCountFlags;
        LogicOpEnable => logic_op_enable / set_logic_op_enable: Bool32;
        DepthClampEnable => depth_clamp_enable / set_depth_clamp_enable: Bool32;
        DomainOrigin => domain_origin / set_domain_origin: TessellationDomainOrigin;
        AlphaToOneEnable => alpha_to_one_enable / set_alpha_to_one_enable: Bool32;
        AlphaToCoverageEnable => alpha_to_coverage_enable / set_alpha_to_coverage_enable: Bool32;
        RasterizationStream => rasterization_stream / set_rasterization_stream: u32;
        ConservativeRasterizationMode => conservative_rasterization_mode
            / set_conservative_rasterization_mode: ConservativeRasterizationMode;
        ExtraPrimitiveOverestimationSize => extra_primitive_overestimation_size
            / set_extra_primitive_overestimation_size: f32;
        DepthClipEnable => depth_clip_enable / set_depth_clip_enable: Bool32;
        SampleLocationsEnable => sample_locations_enable / set_sample_locations_enable: Bool32;
        ProvokingVertexMode => provoking_vertex_mode / set_provoking_vertex_mode: ProvokingVertexMode;
        LineRasterizationMode => line_rasterization_mode
            / set_line_rasterization_mode: LineRasterizationMode;
        StippledLineEnable => stippled_line_enable / set_stippled_line_enable: Bool32;
        NegativeOneToOne => negative_one_to_one / set_negative_one_to_one: Bool32;
        CoverageModulationMode => coverage_modulation_mode
            / set_coverage_modulation_mode: CoverageModulationMode;
        CoverageModulationTableEnable => coverage_modulation_table_enable
            / set_coverage_modulation_table_enable: Bool32;
        CoverageModulationTableCount => coverage_modulation_table_count
            / set_coverage_modulation_table_count: u32;
        CoverageReductionMode => coverage_reduction_mode
            / set_coverage_reduction_mode: CoverageReductionMode;
        CoverageToColorEnable => coverage_to_color_enable / set_coverage_to_color_enable: Bool32;
        CoverageToColorLocation => coverage_to_color_location
            / set_coverage_to_color_location: u32;
        ViewportWScalingEnable => viewport_w_scaling_enable
            / set_viewport_w_scaling_enable: Bool32;
        ViewportSwizzleCount => viewport_swizzle_count / set_viewport_swizzle_count: u32;
        ShadingRateImageEnable => shading_rate_image_enable
            / set_shading_rate_image_enable: Bool32;
        RepresentativeFragmentTestEnable => representative_fragment_test_enable
            / set_representative_fragment_test_enable: Bool32;
    }
    arrays {
        SampleMasks => sample_masks: [SampleMask; MAX_SAMPLE_MASK_WORDS];
        CoverageModulationTableValues => coverage_modulation_table_values:
            [f32; MAX_COVERAGE_MODULATION_TABLE_VALUES];
    }
}

state_group! {
    VertexInputState(VertexInputDynamicState) in vertex_input {
        NumVertexInputAttributeDescriptions => num_vertex_input_attribute_descriptions
            / set_num_vertex_input_attribute_descriptions: u32;
        NumVertexInputBindingDescriptions => num_vertex_input_binding_descriptions
            / set_num_vertex_input_binding_descriptions: u32;
    }
    arrays {}
}

// Array accessors. Setters compare the single element being written; an index
// past the array length panics.
impl DrawStateSnapshot {
    pub fn set_comparable_shader(&mut self, stage: ShaderStage, shader: ShaderIdentity) {
        if store(&mut self.misc.comparable_shaders[stage.index()], shader) {
            self.touch(StateGroup::Misc);
        }
    }

    pub fn comparable_shader(&self, stage: ShaderStage) -> ShaderIdentity {
        self.misc.comparable_shaders[stage.index()]
    }

    pub fn comparable_shaders(&self) -> &[ShaderIdentity; ShaderStage::COUNT] {
        &self.misc.comparable_shaders
    }

    pub fn set_sample_mask(&mut self, index: usize, mask: SampleMask) {
        if store(&mut self.eds3.sample_masks[index], mask) {
            self.touch(StateGroup::ExtendedDynamicState3);
        }
    }

    pub fn sample_masks(&self) -> &[SampleMask; MAX_SAMPLE_MASK_WORDS] {
        &self.eds3.sample_masks
    }

    pub fn set_coverage_modulation_table_value(&mut self, index: usize, value: f32) {
        if store(&mut self.eds3.coverage_modulation_table_values[index], value) {
            self.touch(StateGroup::ExtendedDynamicState3);
        }
    }

    pub fn coverage_modulation_table_values(&self) -> &[f32; MAX_COVERAGE_MODULATION_TABLE_VALUES] {
        &self.eds3.coverage_modulation_table_values
    }

    pub fn set_color_attachment_format(&mut self, index: usize, format: Format) {
        self.store_arena(ArrayField::ColorAttachmentFormats, index, format);
    }

    pub fn color_attachment_formats(&self) -> &[Format] {
        self.arena.slice(ArrayField::ColorAttachmentFormats)
    }

    pub fn set_color_blend_attachment_state(
        &mut self,
        index: usize,
        state: ColorBlendAttachmentState,
    ) {
        self.store_arena(ArrayField::ColorBlendAttachmentStates, index, state);
    }

    pub fn color_blend_attachment_states(&self) -> &[ColorBlendAttachmentState] {
        self.arena.slice(ArrayField::ColorBlendAttachmentStates)
    }

    pub fn set_viewport_swizzle(&mut self, index: usize, swizzle: ViewportSwizzle) {
        self.store_arena(ArrayField::ViewportSwizzles, index, swizzle);
    }

    pub fn viewport_swizzles(&self) -> &[ViewportSwizzle] {
        self.arena.slice(ArrayField::ViewportSwizzles)
    }

    pub fn set_vertex_input_attribute_description(
        &mut self,
        index: usize,
        description: VertexInputAttributeDescription,
    ) {
        self.store_arena(ArrayField::VertexInputAttributeDescriptions, index, description);
    }

    pub fn vertex_input_attribute_descriptions(&self) -> &[VertexInputAttributeDescription] {
        self.arena.slice(ArrayField::VertexInputAttributeDescriptions)
    }

    pub fn set_vertex_input_binding_description(
        &mut self,
        index: usize,
        description: VertexInputBindingDescription,
    ) {
        self.store_arena(ArrayField::VertexInputBindingDescriptions, index, description);
    }

    pub fn vertex_input_binding_descriptions(&self) -> &[VertexInputBindingDescription] {
        self.arena.slice(ArrayField::VertexInputBindingDescriptions)
    }

    fn store_arena<T: StateValue>(&mut self, array: ArrayField, index: usize, value: T) {
        let slots = self.arena.slice_mut::<T>(array);
        assert!(
            index < slots.len(),
            "{} index {} out of range (len {})",
            array.field().name(),
            index,
            slots.len()
        );
        if store(&mut slots[index], value) {
            self.touch(array.field().group());
        }
    }
}

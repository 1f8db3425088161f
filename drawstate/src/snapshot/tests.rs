use std::sync::Arc;

use super::*;
use crate::catalog::{FieldId, PipelineSubset};
use crate::types::{
    SampleCountFlags, ShaderIdentity, ShaderStage, StencilOpState, VertexInputBindingDescription,
    ViewportSwizzle,
};

fn snapshot_with(catalog: StateCatalog) -> DrawStateSnapshot {
    DrawStateSnapshot::new(Arc::new(catalog), DeviceLimits::default()).unwrap()
}

fn full_snapshot() -> DrawStateSnapshot {
    snapshot_with(StateCatalog::all_groups())
}

fn relaxed_catalog() -> StateCatalog {
    StateCatalog::new(StateGroups::all(), true)
}

// =============================================================
// Construction
// =============================================================

#[test]
fn test_new_snapshot_is_globally_dirty() {
    let snapshot = full_snapshot();
    // Creation counts as an allocation event, not a group change
    assert!(snapshot.is_dirty());
    assert!(snapshot.dirty_groups().is_empty());
}

#[test]
fn test_init_time_arrays_sized_from_limits() {
    let limits = DeviceLimits {
        max_color_attachments: 3,
        max_vertex_input_attributes: 5,
        max_vertex_input_bindings: 2,
        max_viewports: 4,
    };
    let snapshot = DrawStateSnapshot::new(Arc::new(StateCatalog::all_groups()), limits).unwrap();

    assert_eq!(snapshot.color_attachment_formats().len(), 3);
    assert_eq!(snapshot.color_blend_attachment_states().len(), 3);
    assert_eq!(snapshot.viewport_swizzles().len(), 4);
    assert_eq!(snapshot.vertex_input_attribute_descriptions().len(), 5);
    assert_eq!(snapshot.vertex_input_binding_descriptions().len(), 2);
    assert!(snapshot.color_attachment_formats().iter().all(|f| *f == Format::UNDEFINED));
}

// =============================================================
// Setters and dirty tracking
// =============================================================

#[test]
fn test_num_color_attachments_scenario() {
    let mut snapshot = full_snapshot();
    snapshot.clear_dirty();
    assert_eq!(snapshot.num_color_attachments(), 0);

    // Should be a no-op
    snapshot.set_num_color_attachments(0);
    assert!(snapshot.dirty_groups().is_empty());
    assert!(!snapshot.is_dirty());

    snapshot.set_num_color_attachments(4);
    assert!(snapshot.is_group_dirty(StateGroup::Misc));
    assert!(snapshot.is_dirty());
    assert_eq!(snapshot.num_color_attachments(), 4);

    snapshot.clear_dirty();
    assert!(snapshot.dirty_groups().is_empty());
    assert!(!snapshot.is_dirty());
}

#[test]
fn test_setters_are_idempotent() {
    let mut snapshot = full_snapshot();
    snapshot.clear_dirty();

    snapshot.set_cull_mode(CullModeFlags::BACK);
    assert_eq!(snapshot.dirty_groups(), StateGroups::EXTENDED_DYNAMIC_STATE);
    snapshot.clear_dirty();

    // Second identical write should change nothing
    snapshot.set_cull_mode(CullModeFlags::BACK);
    assert!(!snapshot.is_dirty());
    assert_eq!(snapshot.cull_mode(), CullModeFlags::BACK);
}

#[test]
fn test_each_setter_marks_only_its_group() {
    let mut snapshot = full_snapshot();
    snapshot.clear_dirty();

    snapshot.set_patch_control_points(3);
    snapshot.set_rasterization_samples(SampleCountFlags::TYPE_4);
    assert_eq!(
        snapshot.dirty_groups(),
        StateGroups::EXTENDED_DYNAMIC_STATE_2 | StateGroups::EXTENDED_DYNAMIC_STATE_3
    );
    assert!(!snapshot.is_group_dirty(StateGroup::Misc));
    assert!(!snapshot.is_group_dirty(StateGroup::VertexInputDynamicState));
}

#[test]
fn test_array_setters_compare_single_element() {
    let mut snapshot = full_snapshot();
    snapshot.clear_dirty();

    snapshot.set_sample_mask(1, 0);
    snapshot.set_color_attachment_format(2, Format::UNDEFINED);
    assert!(!snapshot.is_dirty());

    snapshot.set_sample_mask(1, 0xffff_ffff);
    assert_eq!(snapshot.dirty_groups(), StateGroups::EXTENDED_DYNAMIC_STATE_3);
    assert_eq!(snapshot.sample_masks(), &[0, 0xffff_ffff]);

    snapshot.set_vertex_input_binding_description(
        1,
        VertexInputBindingDescription {
            binding: 1,
            stride: 32,
            ..Default::default()
        },
    );
    assert!(snapshot.is_group_dirty(StateGroup::VertexInputDynamicState));
    assert_eq!(snapshot.vertex_input_binding_descriptions()[1].stride, 32);
}

#[test]
fn test_comparable_shader_marks_misc() {
    let mut snapshot = full_snapshot();
    snapshot.clear_dirty();

    snapshot.set_comparable_shader(ShaderStage::Geometry, ShaderIdentity(9));
    assert_eq!(snapshot.dirty_groups(), StateGroups::MISC);
    assert_eq!(snapshot.comparable_shader(ShaderStage::Geometry), ShaderIdentity(9));
    assert_eq!(
        snapshot.comparable_shaders()[ShaderStage::Geometry.index()],
        ShaderIdentity(9)
    );
}

#[test]
fn test_float_fields_compare_bitwise() {
    let mut snapshot = full_snapshot();
    snapshot.set_extra_primitive_overestimation_size(f32::NAN);
    snapshot.clear_dirty();

    // Same NaN bits should not be reported as a change
    snapshot.set_extra_primitive_overestimation_size(f32::NAN);
    assert!(!snapshot.is_dirty());
}

#[test]
#[should_panic(expected = "out of range")]
fn test_init_time_index_out_of_range_panics() {
    let mut snapshot = full_snapshot();
    let len = snapshot.viewport_swizzles().len();
    snapshot.set_viewport_swizzle(len, ViewportSwizzle::default());
}

#[test]
#[should_panic]
fn test_compile_time_index_out_of_range_panics() {
    let mut snapshot = full_snapshot();
    snapshot.set_sample_mask(2, 1);
}

// =============================================================
// Hashing
// =============================================================

#[test]
fn test_partial_hash_stable() {
    let mut snapshot = full_snapshot();
    snapshot.set_front_face(crate::types::FrontFace::CLOCKWISE);

    let first = snapshot.partial_hash(StateGroup::ExtendedDynamicState);
    // Changes in another group should not matter
    snapshot.set_logic_op(crate::types::LogicOp::XOR);
    assert_eq!(snapshot.partial_hash(StateGroup::ExtendedDynamicState), first);
}

#[test]
fn test_partial_hash_follows_scalar_changes() {
    let mut snapshot = full_snapshot();
    let before = snapshot.partial_hash(StateGroup::ExtendedDynamicState);

    snapshot.set_stencil_front(StencilOpState {
        reference: 1,
        ..Default::default()
    });
    assert_ne!(snapshot.partial_hash(StateGroup::ExtendedDynamicState), before);
}

#[test]
fn test_partial_hash_ignores_arrays() {
    let mut a = full_snapshot();
    let mut b = full_snapshot();
    b.set_coverage_modulation_table_value(10, 0.5);
    b.set_viewport_swizzle(0, ViewportSwizzle {
        w: crate::types::ViewportCoordinateSwizzle::NEGATIVE_W,
        ..Default::default()
    });

    assert_eq!(
        a.partial_hash(StateGroup::ExtendedDynamicState3),
        b.partial_hash(StateGroup::ExtendedDynamicState3)
    );
    assert_eq!(a.cache_hash(), b.cache_hash());
    // Equality still tells them apart
    assert_ne!(a, b);
}

#[test]
fn test_partial_hash_by_ordinal_matches_group() {
    let mut snapshot = full_snapshot();
    snapshot.set_num_vertex_input_binding_descriptions(2);
    for group in StateGroup::ALL {
        assert_eq!(
            snapshot.partial_hash_by_ordinal(group.ordinal()),
            snapshot.partial_hash(group)
        );
    }
}

#[test]
#[should_panic(expected = "not mapped")]
fn test_partial_hash_unmapped_ordinal_panics() {
    let snapshot = full_snapshot();
    snapshot.partial_hash_by_ordinal(StateGroup::COUNT as u32);
}

#[test]
fn test_cache_hash_matches_full_recompute() {
    let mut snapshot = full_snapshot();
    assert_eq!(snapshot.cache_hash(), snapshot.compute_hash());

    snapshot.set_depth_test_enable(Bool32::TRUE);
    snapshot.set_polygon_mode(PolygonMode::LINE);
    assert_eq!(snapshot.cache_hash(), snapshot.compute_hash());

    // Clearing dirty bits should leave the cached hash valid
    snapshot.clear_dirty();
    snapshot.set_num_scissors(2);
    assert_eq!(snapshot.cache_hash(), snapshot.compute_hash());
}

#[test]
fn test_cache_hash_returns_to_previous_value() {
    let mut snapshot = full_snapshot();
    let original = snapshot.cache_hash();

    snapshot.set_primitive_topology(PrimitiveTopology::POINT_LIST);
    let changed = snapshot.cache_hash();
    assert_ne!(changed, original);

    snapshot.set_primitive_topology(PrimitiveTopology::default());
    assert_eq!(snapshot.cache_hash(), original);
}

#[test]
fn test_inactive_groups_excluded_from_cache_hash() {
    let mut snapshot = snapshot_with(StateCatalog::default());
    let before = snapshot.cache_hash();

    snapshot.set_polygon_mode(PolygonMode::POINT);
    assert!(snapshot.is_group_dirty(StateGroup::ExtendedDynamicState3));
    assert_eq!(snapshot.cache_hash(), before);
}

// =============================================================
// Equality
// =============================================================

#[test]
fn test_equality_reflexive_and_symmetric() {
    let mut a = full_snapshot();
    a.apply_default_state();
    let mut b = full_snapshot();
    b.apply_default_state();

    assert_eq!(a, a);
    assert_eq!(a, b);
    assert_eq!(b, a);

    b.set_depth_compare_op(CompareOp::GREATER);
    assert_ne!(a, b);
    assert_ne!(b, a);
}

#[test]
fn test_try_clone_is_equal_and_independent() {
    let mut original = full_snapshot();
    original.set_color_attachment_format(0, Format::B8G8R8A8_UNORM);
    let mut copy = original.try_clone().unwrap();
    assert_eq!(original, copy);

    copy.set_color_attachment_format(0, Format::R8G8B8A8_UNORM);
    assert_eq!(original.color_attachment_formats()[0], Format::B8G8R8A8_UNORM);
    assert_ne!(original, copy);
}

#[test]
fn test_different_limits_are_unequal() {
    let a = full_snapshot();
    let limits = DeviceLimits {
        max_viewports: 1,
        ..DeviceLimits::default()
    };
    let b = DrawStateSnapshot::new(Arc::new(StateCatalog::all_groups()), limits).unwrap();
    assert_ne!(a, b);
}

fn std_hash(snapshot: &DrawStateSnapshot) -> u64 {
    use std::collections::hash_map::DefaultHasher;
    use std::hash::{Hash, Hasher};

    let mut hasher = DefaultHasher::new();
    snapshot.hash(&mut hasher);
    hasher.finish()
}

#[test]
fn test_different_catalogs_are_unequal() {
    // Should never be equal while hashing over different group sets
    let all = full_snapshot();
    let misc_only = snapshot_with(StateCatalog::new(StateGroups::MISC, false));
    assert_ne!(all, misc_only);
    assert_ne!(misc_only, all);

    // Should never be equal while skipping different fields in the hash
    let mut relaxed = snapshot_with(relaxed_catalog());
    let mut strict = full_snapshot();
    relaxed.set_depth_attachment_format(Format::UNDEFINED);
    strict.set_depth_attachment_format(Format::D24_UNORM_S8_UINT);
    assert_ne!(relaxed, strict);
}

#[test]
fn test_equal_implies_equal_hash() {
    let catalogs = [
        StateCatalog::all_groups(),
        StateCatalog::default(),
        StateCatalog::new(StateGroups::MISC, false),
        relaxed_catalog(),
        StateCatalog::new(StateGroups::EXTENDED_DYNAMIC_STATE, true),
    ];
    let formats = [Format::UNDEFINED, Format::D24_UNORM_S8_UINT];

    let mut snapshots = Vec::new();
    for catalog in &catalogs {
        for format in formats {
            // Separate Arcs for each snapshot so equality can't lean on pointers
            let mut snapshot = snapshot_with(catalog.clone());
            snapshot.set_depth_attachment_format(format);
            snapshots.push(snapshot);
        }
    }

    for a in &snapshots {
        for b in &snapshots {
            if a == b {
                assert_eq!(std_hash(a), std_hash(b));
                assert_eq!(a.compute_hash(), b.compute_hash());
            }
        }
    }
}

#[test]
fn test_lookup_across_catalogs_agrees_with_eq() {
    use crate::key::DrawStateKey;
    use hashbrown::HashMap;

    let mut relaxed = snapshot_with(relaxed_catalog());
    let mut strict = full_snapshot();
    relaxed.set_depth_attachment_format(Format::UNDEFINED);
    strict.set_depth_attachment_format(Format::D24_UNORM_S8_UINT);

    let mut cache = HashMap::new();
    cache.insert(DrawStateKey::new(&mut strict).unwrap(), 1);
    assert_eq!(cache.get(&relaxed.lookup_key()), None);

    // Same catalog contents in another Arc still hit
    let mut twin = snapshot_with(StateCatalog::all_groups());
    twin.set_depth_attachment_format(Format::D24_UNORM_S8_UINT);
    assert_eq!(twin, strict);
    assert_eq!(cache.get(&twin.lookup_key()), Some(&1));
}

#[test]
fn test_field_eq_covers_every_field() {
    let a = full_snapshot();
    let b = full_snapshot();
    for info in crate::catalog::FIELDS.iter() {
        assert!(a.field_eq(&b, info.id), "{} should compare equal", info.name);
    }
}

// =============================================================
// Subset comparison
// =============================================================

#[test]
fn test_fragment_only_difference() {
    let a = full_snapshot();
    let mut b = full_snapshot();
    b.set_depth_write_enable(Bool32::TRUE);

    assert!(a.compare_state_subset(&b, PipelineSubset::PreRasterizationShaders));
    assert!(!a.compare_state_subset(&b, PipelineSubset::FragmentShader));
}

#[test]
fn test_pre_rasterization_only_difference() {
    let a = full_snapshot();
    let mut b = full_snapshot();
    b.set_depth_clamp_enable(Bool32::TRUE);

    assert!(!a.compare_state_subset(&b, PipelineSubset::PreRasterizationShaders));
    assert!(a.compare_state_subset(&b, PipelineSubset::FragmentShader));
}

#[test]
fn test_unmapped_fields_never_gate_subsets() {
    let a = full_snapshot();
    let mut b = full_snapshot();
    b.set_primitive_topology(PrimitiveTopology::LINE_STRIP);
    b.set_stencil_test_enable(Bool32::TRUE);
    b.set_num_color_attachments(3);
    b.set_viewport_swizzle(1, ViewportSwizzle {
        x: crate::types::ViewportCoordinateSwizzle::NEGATIVE_X,
        ..Default::default()
    });

    assert_ne!(a, b);
    for subset in PipelineSubset::ALL {
        assert!(a.compare_state_subset(&b, subset));
    }
}

#[test]
fn test_subset_shader_identity() {
    let a = full_snapshot();
    let mut b = full_snapshot();
    b.set_comparable_shader(ShaderStage::Fragment, ShaderIdentity(42));

    assert!(a.compare_state_subset(&b, PipelineSubset::PreRasterizationShaders));
    assert!(!a.compare_state_subset(&b, PipelineSubset::FragmentShader));

    b.set_comparable_shader(ShaderStage::Mesh, ShaderIdentity(7));
    assert!(!a.compare_state_subset(&b, PipelineSubset::PreRasterizationShaders));
}

#[test]
fn test_subset_compares_sample_mask_array() {
    let a = full_snapshot();
    let mut b = full_snapshot();
    b.set_sample_mask(0, 0b1010);

    assert!(!a.compare_state_subset(&b, PipelineSubset::FragmentShader));
    assert!(!a.field_eq(&b, FieldId::SampleMasks));
}

// =============================================================
// Unused attachment relaxation
// =============================================================

#[test]
fn test_undefined_format_relaxed() {
    let mut a = snapshot_with(relaxed_catalog());
    let mut b = snapshot_with(relaxed_catalog());
    a.set_depth_attachment_format(Format::UNDEFINED);
    b.set_depth_attachment_format(Format::D32_SFLOAT);

    assert!(a.field_eq(&b, FieldId::DepthAttachmentFormat));
    assert_eq!(a, b);
    assert_eq!(a.cache_hash(), b.cache_hash());
}

#[test]
fn test_undefined_format_strict_without_relaxation() {
    let mut a = full_snapshot();
    let mut b = full_snapshot();
    a.set_depth_attachment_format(Format::UNDEFINED);
    b.set_depth_attachment_format(Format::D32_SFLOAT);

    assert!(!a.field_eq(&b, FieldId::DepthAttachmentFormat));
    assert_ne!(a, b);
}

#[test]
fn test_concrete_formats_still_compared_when_relaxed() {
    let mut a = snapshot_with(relaxed_catalog());
    let mut b = snapshot_with(relaxed_catalog());
    a.set_stencil_attachment_format(Format::S8_UINT);
    b.set_stencil_attachment_format(Format::D24_UNORM_S8_UINT);

    assert_ne!(a, b);
}

#[test]
fn test_relaxation_applies_to_color_formats_and_count() {
    let mut a = snapshot_with(relaxed_catalog());
    let mut b = snapshot_with(relaxed_catalog());
    a.set_num_color_attachments(1);
    a.set_color_attachment_format(0, Format::R8G8B8A8_UNORM);
    b.set_num_color_attachments(2);
    b.set_color_attachment_format(0, Format::R8G8B8A8_UNORM);
    b.set_color_attachment_format(1, Format::R16G16B16A16_SFLOAT);

    assert_eq!(a, b);
    assert_eq!(a.cache_hash(), b.cache_hash());
}

#[test]
fn test_relaxation_on_one_side_only() {
    let mut relaxed = snapshot_with(relaxed_catalog());
    let mut strict = full_snapshot();
    relaxed.set_depth_attachment_format(Format::UNDEFINED);
    strict.set_depth_attachment_format(Format::D16_UNORM);

    // The relaxed side holds UNDEFINED, so the field matches either way round
    assert!(relaxed.field_eq(&strict, FieldId::DepthAttachmentFormat));
    assert!(strict.field_eq(&relaxed, FieldId::DepthAttachmentFormat));

    relaxed.set_depth_attachment_format(Format::D16_UNORM);
    strict.set_depth_attachment_format(Format::UNDEFINED);
    assert!(!relaxed.field_eq(&strict, FieldId::DepthAttachmentFormat));
}

// =============================================================
// Default state
// =============================================================

#[test]
fn test_apply_default_state() {
    let mut snapshot = full_snapshot();
    snapshot.clear_dirty();
    snapshot.apply_default_state();

    assert_eq!(snapshot.num_color_attachments(), 1);
    assert_eq!(snapshot.color_attachment_formats()[0], Format::R8G8B8A8_UNORM);
    assert_eq!(snapshot.color_attachment_formats()[1], Format::UNDEFINED);
    assert!(snapshot.color_blend_attachment_states()[0].blend_enable.is_true());
    assert_eq!(snapshot.primitive_topology(), PrimitiveTopology::TRIANGLE_LIST);
    assert_eq!(snapshot.cull_mode(), CullModeFlags::FRONT);
    assert_eq!(snapshot.depth_compare_op(), CompareOp::LESS);
    assert_eq!(snapshot.depth_attachment_format(), Format::UNDEFINED);
    assert!(snapshot.is_group_dirty(StateGroup::Misc));
    assert!(snapshot.is_group_dirty(StateGroup::ExtendedDynamicState));
    // FILL is already the zeroed value
    assert!(!snapshot.is_group_dirty(StateGroup::ExtendedDynamicState3));
}

#[test]
fn test_apply_default_state_relaxed_fills_every_slot() {
    let mut snapshot = snapshot_with(relaxed_catalog());
    snapshot.apply_default_state();

    assert!(
        snapshot
            .color_attachment_formats()
            .iter()
            .all(|f| *f == Format::R8G8B8A8_UNORM)
    );
    assert_eq!(snapshot.depth_attachment_format(), Format::D24_UNORM_S8_UINT);
    assert_eq!(snapshot.stencil_attachment_format(), Format::D24_UNORM_S8_UINT);
}

#[test]
fn test_apply_default_state_without_color_attachments() {
    let limits = DeviceLimits {
        max_color_attachments: 0,
        ..DeviceLimits::default()
    };
    let mut snapshot = DrawStateSnapshot::new(Arc::new(StateCatalog::all_groups()), limits).unwrap();
    snapshot.apply_default_state();

    assert_eq!(snapshot.num_color_attachments(), 0);
    assert!(snapshot.color_attachment_formats().is_empty());
}

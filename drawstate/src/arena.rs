//! Arena for init-time arrays
//!
//! Every array whose length comes from a device limit lives in one block
//! allocated when the snapshot is created. Layout happens in two passes over a
//! single recorded list:
//!
//! 1. [`ArenaLayout::reserve`] records `(field, element size, alignment, count)`
//!    for each array and accumulates the aligned total.
//! 2. [`ArenaLayout::place`] walks the same records in the same order and hands
//!    out the offset of each array.
//!
//! Both passes advance the cursor with [`ArenaRecord::advance`], so the bytes
//! placed always equal the bytes reserved.
//!
//! Fixed-size group state lives inline in `DrawStateSnapshot`; only the
//! limit-sized arrays are reserved here.

use std::mem::{align_of, size_of};

use bytemuck::Pod;
use smallvec::SmallVec;

use crate::catalog::{DeviceLimits, FieldId, LimitKind};
use crate::error::DrawStateError;
use crate::types::{
    ColorBlendAttachmentState, Format, VertexInputAttributeDescription,
    VertexInputBindingDescription, ViewportSwizzle,
};

/// Alignment of the backing block
const BLOCK_ALIGN: usize = align_of::<u64>();

/// Arrays stored in the arena, in layout order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArrayField {
    ColorAttachmentFormats,
    ColorBlendAttachmentStates,
    ViewportSwizzles,
    VertexInputAttributeDescriptions,
    VertexInputBindingDescriptions,
}

impl ArrayField {
    pub const COUNT: usize = 5;

    pub const ALL: [ArrayField; Self::COUNT] = [
        ArrayField::ColorAttachmentFormats,
        ArrayField::ColorBlendAttachmentStates,
        ArrayField::ViewportSwizzles,
        ArrayField::VertexInputAttributeDescriptions,
        ArrayField::VertexInputBindingDescriptions,
    ];

    pub const fn field(self) -> FieldId {
        match self {
            ArrayField::ColorAttachmentFormats => FieldId::ColorAttachmentFormats,
            ArrayField::ColorBlendAttachmentStates => FieldId::ColorBlendAttachmentStates,
            ArrayField::ViewportSwizzles => FieldId::ViewportSwizzles,
            ArrayField::VertexInputAttributeDescriptions => {
                FieldId::VertexInputAttributeDescriptions
            }
            ArrayField::VertexInputBindingDescriptions => FieldId::VertexInputBindingDescriptions,
        }
    }

    /// Arena array backing `field`, if it is an init-time array
    pub const fn from_field(field: FieldId) -> Option<Self> {
        match field {
            FieldId::ColorAttachmentFormats => Some(ArrayField::ColorAttachmentFormats),
            FieldId::ColorBlendAttachmentStates => Some(ArrayField::ColorBlendAttachmentStates),
            FieldId::ViewportSwizzles => Some(ArrayField::ViewportSwizzles),
            FieldId::VertexInputAttributeDescriptions => {
                Some(ArrayField::VertexInputAttributeDescriptions)
            }
            FieldId::VertexInputBindingDescriptions => {
                Some(ArrayField::VertexInputBindingDescriptions)
            }
            _ => None,
        }
    }

    pub const fn limit(self) -> LimitKind {
        match self {
            ArrayField::ColorAttachmentFormats | ArrayField::ColorBlendAttachmentStates => {
                LimitKind::MaxColorAttachments
            }
            ArrayField::ViewportSwizzles => LimitKind::MaxViewports,
            ArrayField::VertexInputAttributeDescriptions => LimitKind::MaxVertexInputAttributes,
            ArrayField::VertexInputBindingDescriptions => LimitKind::MaxVertexInputBindings,
        }
    }

    pub const fn element_size(self) -> usize {
        match self {
            ArrayField::ColorAttachmentFormats => size_of::<Format>(),
            ArrayField::ColorBlendAttachmentStates => size_of::<ColorBlendAttachmentState>(),
            ArrayField::ViewportSwizzles => size_of::<ViewportSwizzle>(),
            ArrayField::VertexInputAttributeDescriptions => {
                size_of::<VertexInputAttributeDescription>()
            }
            ArrayField::VertexInputBindingDescriptions => {
                size_of::<VertexInputBindingDescription>()
            }
        }
    }

    pub const fn element_align(self) -> usize {
        match self {
            ArrayField::ColorAttachmentFormats => align_of::<Format>(),
            ArrayField::ColorBlendAttachmentStates => align_of::<ColorBlendAttachmentState>(),
            ArrayField::ViewportSwizzles => align_of::<ViewportSwizzle>(),
            ArrayField::VertexInputAttributeDescriptions => {
                align_of::<VertexInputAttributeDescription>()
            }
            ArrayField::VertexInputBindingDescriptions => {
                align_of::<VertexInputBindingDescription>()
            }
        }
    }

    const fn index(self) -> usize {
        self as usize
    }
}

fn align_up(offset: usize, align: usize) -> Option<usize> {
    debug_assert!(align.is_power_of_two());
    Some(offset.checked_add(align - 1)? & !(align - 1))
}

/// One array reserved in pass 1
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArenaRecord {
    pub field: ArrayField,
    pub element_size: usize,
    pub align: usize,
    pub count: usize,
}

impl ArenaRecord {
    /// Byte length of the array
    pub fn len_bytes(&self) -> usize {
        self.element_size * self.count
    }

    /// Offset of this array and the cursor after it, starting from `cursor`.
    ///
    /// Empty arrays take no space and do not realign the cursor.
    fn advance(&self, cursor: usize) -> Option<(usize, usize)> {
        if self.count == 0 {
            return Some((cursor, cursor));
        }
        let offset = align_up(cursor, self.align)?;
        let len = self.element_size.checked_mul(self.count)?;
        Some((offset, offset.checked_add(len)?))
    }
}

/// Reservation record shared by both layout passes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArenaLayout {
    records: SmallVec<[ArenaRecord; ArrayField::COUNT]>,
    size: usize,
    align: usize,
}

impl ArenaLayout {
    /// Pass 1: reserve space for every init-time array sized by `limits`.
    pub fn reserve(limits: &DeviceLimits) -> Result<Self, DrawStateError> {
        let mut layout = Self {
            records: SmallVec::new(),
            size: 0,
            align: 1,
        };
        for field in ArrayField::ALL {
            layout.add(field, limits.get(field.limit()) as usize)?;
        }
        Ok(layout)
    }

    fn add(&mut self, field: ArrayField, count: usize) -> Result<(), DrawStateError> {
        let record = ArenaRecord {
            field,
            element_size: field.element_size(),
            align: field.element_align(),
            count,
        };
        let (_, end) = record
            .advance(self.size)
            .ok_or(DrawStateError::ArenaOverflow { field, count })?;
        if count > 0 {
            self.align = self.align.max(record.align);
        }
        self.size = end;
        self.records.push(record);
        Ok(())
    }

    /// Total bytes reserved
    pub fn size(&self) -> usize {
        self.size
    }

    /// Largest element alignment among non-empty arrays
    pub fn align(&self) -> usize {
        self.align
    }

    pub fn records(&self) -> &[ArenaRecord] {
        &self.records
    }

    /// Pass 2: assign each reserved array its offset.
    ///
    /// # Panics
    ///
    /// Panics if the placed size disagrees with the reserved size.
    pub fn place(&self) -> ArenaPlacement {
        let mut spans = [ArraySpan::EMPTY; ArrayField::COUNT];
        let mut cursor = 0;
        for record in &self.records {
            // Reservation already proved these fit
            let Some((offset, end)) = record.advance(cursor) else {
                panic!("{:?} overflowed during placement", record.field);
            };
            spans[record.field.index()] = ArraySpan {
                offset,
                count: record.count,
                len_bytes: end - offset,
            };
            cursor = end;
        }
        assert_eq!(
            cursor, self.size,
            "arena placement advanced {} bytes but {} were reserved",
            cursor, self.size
        );
        ArenaPlacement {
            spans,
            consumed: cursor,
        }
    }
}

/// Location of one array inside the block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArraySpan {
    pub offset: usize,
    pub count: usize,
    pub len_bytes: usize,
}

impl ArraySpan {
    const EMPTY: Self = Self {
        offset: 0,
        count: 0,
        len_bytes: 0,
    };
}

/// Output of pass 2
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArenaPlacement {
    spans: [ArraySpan; ArrayField::COUNT],
    consumed: usize,
}

impl ArenaPlacement {
    pub fn span(&self, field: ArrayField) -> ArraySpan {
        self.spans[field.index()]
    }

    /// Bytes advanced by the placement pass
    pub fn consumed(&self) -> usize {
        self.consumed
    }
}

/// Single zero-initialised block holding every init-time array
#[derive(Debug)]
pub struct Arena {
    words: Vec<u64>,
    placement: ArenaPlacement,
}

impl Arena {
    /// Allocate the block described by `layout` and place every array in it.
    pub fn new(layout: &ArenaLayout) -> Result<Self, DrawStateError> {
        assert!(
            layout.align() <= BLOCK_ALIGN,
            "element alignment {} exceeds arena block alignment",
            layout.align()
        );
        let words = alloc_words(layout.size().div_ceil(BLOCK_ALIGN), layout.size())?;
        let placement = layout.place();
        tracing::debug!(
            "Allocated draw-state arena: {} bytes for {} arrays",
            placement.consumed(),
            layout.records().len()
        );
        Ok(Self { words, placement })
    }

    /// Deep copy with its own block
    pub fn try_clone(&self) -> Result<Self, DrawStateError> {
        let mut words = Vec::new();
        words
            .try_reserve_exact(self.words.len())
            .map_err(|_| DrawStateError::ArenaAllocation {
                bytes: self.placement.consumed(),
            })?;
        words.extend_from_slice(&self.words);
        Ok(Self {
            words,
            placement: self.placement.clone(),
        })
    }

    pub fn placement(&self) -> &ArenaPlacement {
        &self.placement
    }

    /// Bytes in use (excluding tail padding of the last word)
    pub fn size_bytes(&self) -> usize {
        self.placement.consumed()
    }

    /// Typed view of one array.
    pub fn slice<T: Pod>(&self, field: ArrayField) -> &[T] {
        debug_assert_eq!(size_of::<T>(), field.element_size());
        let span = self.placement.span(field);
        if span.count == 0 {
            return &[];
        }
        let bytes: &[u8] = bytemuck::cast_slice(self.words.as_slice());
        bytemuck::cast_slice(&bytes[span.offset..span.offset + span.len_bytes])
    }

    /// Mutable typed view of one array.
    pub fn slice_mut<T: Pod>(&mut self, field: ArrayField) -> &mut [T] {
        debug_assert_eq!(size_of::<T>(), field.element_size());
        let span = self.placement.span(field);
        if span.count == 0 {
            return &mut [];
        }
        let bytes: &mut [u8] = bytemuck::cast_slice_mut(self.words.as_mut_slice());
        bytemuck::cast_slice_mut(&mut bytes[span.offset..span.offset + span.len_bytes])
    }
}

fn alloc_words(count: usize, bytes: usize) -> Result<Vec<u64>, DrawStateError> {
    let mut words = Vec::new();
    words
        .try_reserve_exact(count)
        .map_err(|_| DrawStateError::ArenaAllocation { bytes })?;
    words.resize(count, 0);
    Ok(words)
}

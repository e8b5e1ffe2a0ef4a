//! Scratch copies of API structures with wrapped handles replaced by driver
//! handles, including handles buried in pNext extension chains.
//!
//! The copies are shallow: only the structures and arrays that contain
//! handles are duplicated; everything else still points at application
//! memory.

use std::ffi::c_void;
use std::mem::{align_of, size_of, ManuallyDrop, MaybeUninit};
use std::ptr;

use ash::vk;
use ash::vk::Handle;
use smallvec::SmallVec;
use vkl_core::HandleTable;

use crate::params::{unwrap_array, HandleVec};

/// Handle words a scratch holds inline before arrays go to the heap.
pub const INLINE_WORDS: usize = 64;

type Release = unsafe fn(*mut u8, usize, usize);

/// Owns the storage behind unwrapped copies for the duration of a driver
/// call, or until a deferred operation completes.
///
/// Short handle arrays live in an inline arena, so pointers handed out stay
/// valid only while the scratch stays where it is. A scratch that must
/// outlive its call is boxed before the first copy is taken.
///
/// Only `Copy` values are stored, so releasing the storage never runs drop
/// glue that could look at application memory.
pub struct Scratch {
    words: [MaybeUninit<u64>; INLINE_WORDS],
    used: usize,
    allocations: SmallVec<[(*mut u8, usize, usize, Release); 8]>,
}

// The allocations are exclusively owned and only freed, never read, by the
// thread that drops the scratch.
unsafe impl Send for Scratch {}

unsafe fn release_box<T>(ptr: *mut u8, _len: usize, _cap: usize) {
    unsafe {
        drop(Box::from_raw(ptr.cast::<T>()));
    }
}

unsafe fn release_vec<T>(ptr: *mut u8, len: usize, cap: usize) {
    unsafe {
        drop(Vec::from_raw_parts(ptr.cast::<T>(), len, cap));
    }
}

impl Scratch {
    pub fn new() -> Self {
        Self {
            words: [MaybeUninit::uninit(); INLINE_WORDS],
            used: 0,
            allocations: SmallVec::new(),
        }
    }

    /// Move `value` to stable heap storage and return a pointer to it.
    pub fn push<T: Copy>(&mut self, value: T) -> *mut T {
        let ptr = Box::into_raw(Box::new(value));
        self.allocations.push((ptr.cast::<u8>(), 0, 0, release_box::<T>));
        ptr
    }

    /// Keep `values` alive and return a pointer to the first element.
    pub fn push_slice<T: Copy>(&mut self, values: Vec<T>) -> *mut T {
        let mut values = ManuallyDrop::new(values);
        let ptr = values.as_mut_ptr();
        self.allocations
            .push((ptr.cast::<u8>(), values.len(), values.capacity(), release_vec::<T>));
        ptr
    }

    /// Keep an unwrapped handle array alive. Arrays that fit are copied into
    /// the inline arena; the rest keep their heap buffer.
    pub fn push_handles<H: Handle + Copy>(&mut self, handles: HandleVec<H>) -> *const H {
        let fits_word = size_of::<H>() == size_of::<u64>() && align_of::<H>() <= align_of::<u64>();
        if !handles.spilled() && fits_word && self.used + handles.len() <= INLINE_WORDS {
            let at = self.words[self.used..].as_mut_ptr().cast::<H>();
            // SAFETY: `at` has room for `handles.len()` word-sized values.
            unsafe { ptr::copy_nonoverlapping(handles.as_ptr(), at, handles.len()) };
            self.used += handles.len();
            return at;
        }
        self.push_slice(handles.into_vec())
    }

    pub fn is_empty(&self) -> bool {
        self.used == 0 && self.allocations.is_empty()
    }

    /// Heap allocations held, not counting the inline arena.
    pub fn heap_allocations(&self) -> usize {
        self.allocations.len()
    }
}

impl Default for Scratch {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Scratch {
    fn drop(&mut self) {
        for (ptr, len, cap, release) in self.allocations.drain(..) {
            unsafe { release(ptr, len, cap) };
        }
    }
}

/// Copy a handle array with every element unwrapped. Null stays null.
pub unsafe fn unwrap_handles<H: Handle + Copy>(
    handles: &HandleTable,
    scratch: &mut Scratch,
    ptr: *const H,
    count: u32,
) -> *const H {
    unsafe {
        if ptr.is_null() || count == 0 {
            return ptr;
        }
        scratch.push_handles(unwrap_array(handles, ptr, count))
    }
}

/// Copy an array of structures, letting `fix` unwrap each copy in place.
pub unsafe fn unwrap_structs<T: Copy>(
    scratch: &mut Scratch,
    ptr: *const T,
    count: u32,
    mut fix: impl FnMut(&mut Scratch, &mut T),
) -> *const T {
    unsafe {
        if ptr.is_null() || count == 0 {
            return ptr;
        }
        let mut copies = std::slice::from_raw_parts(ptr, count as usize).to_vec();
        for copy in copies.iter_mut() {
            fix(scratch, copy);
        }
        scratch.push_slice(copies)
    }
}

/// Copy a single structure, letting `fix` unwrap the copy in place.
pub unsafe fn unwrap_struct<T: Copy>(
    scratch: &mut Scratch,
    ptr: *const T,
    fix: impl FnOnce(&mut Scratch, &mut T),
) -> *const T {
    unsafe {
        if ptr.is_null() {
            return ptr;
        }
        let copy = scratch.push(*ptr);
        fix(scratch, &mut *copy);
        copy
    }
}

// ── pNext chains ────────────────────────────────────────────

#[repr(C)]
struct ChainHeader {
    s_type: vk::StructureType,
    p_next: *const c_void,
}

fn carries_handles(s_type: vk::StructureType) -> bool {
    matches!(
        s_type,
        vk::StructureType::PIPELINE_LIBRARY_CREATE_INFO_KHR
            | vk::StructureType::MEMORY_DEDICATED_ALLOCATE_INFO
            | vk::StructureType::SAMPLER_YCBCR_CONVERSION_INFO
            | vk::StructureType::IMAGE_SWAPCHAIN_CREATE_INFO_KHR
            | vk::StructureType::BIND_IMAGE_MEMORY_SWAPCHAIN_INFO_KHR
            | vk::StructureType::RENDER_PASS_ATTACHMENT_BEGIN_INFO
            | vk::StructureType::WRITE_DESCRIPTOR_SET_ACCELERATION_STRUCTURE_KHR
            | vk::StructureType::SWAPCHAIN_PRESENT_FENCE_INFO_EXT
    )
}

unsafe fn chain_carries_handles(mut node: *const c_void) -> bool {
    unsafe {
        while !node.is_null() {
            let header = &*(node as *const ChainHeader);
            if carries_handles(header.s_type) {
                return true;
            }
            node = header.p_next;
        }
        false
    }
}

/// Copy one chain node, unwrapping it if it carries handles. Returns `None`
/// for structures this layer does not know the layout of.
unsafe fn copy_node(
    handles: &HandleTable,
    scratch: &mut Scratch,
    node: *const ChainHeader,
) -> Option<*mut ChainHeader> {
    unsafe {
        macro_rules! verbatim {
            ($ty:ty) => {
                scratch.push(*(node as *const $ty)) as *mut ChainHeader
            };
        }
        macro_rules! fixed {
            ($ty:ty, |$s:ident, $v:ident| $body:block) => {{
                let copy = scratch.push(*(node as *const $ty));
                let $v = &mut *copy;
                let $s = &mut *scratch;
                $body
                copy as *mut ChainHeader
            }};
        }

        let copy = match (*node).s_type {
            vk::StructureType::PIPELINE_LIBRARY_CREATE_INFO_KHR => {
                fixed!(vk::PipelineLibraryCreateInfoKHR<'_>, |s, v| {
                    v.p_libraries = unwrap_handles(handles, s, v.p_libraries, v.library_count);
                })
            }
            vk::StructureType::MEMORY_DEDICATED_ALLOCATE_INFO => {
                fixed!(vk::MemoryDedicatedAllocateInfo<'_>, |_s, v| {
                    v.image = handles.unwrap_handle(v.image);
                    v.buffer = handles.unwrap_handle(v.buffer);
                })
            }
            vk::StructureType::SAMPLER_YCBCR_CONVERSION_INFO => {
                fixed!(vk::SamplerYcbcrConversionInfo<'_>, |_s, v| {
                    v.conversion = handles.unwrap_handle(v.conversion);
                })
            }
            vk::StructureType::IMAGE_SWAPCHAIN_CREATE_INFO_KHR => {
                fixed!(vk::ImageSwapchainCreateInfoKHR<'_>, |_s, v| {
                    v.swapchain = handles.unwrap_handle(v.swapchain);
                })
            }
            vk::StructureType::BIND_IMAGE_MEMORY_SWAPCHAIN_INFO_KHR => {
                fixed!(vk::BindImageMemorySwapchainInfoKHR<'_>, |_s, v| {
                    v.swapchain = handles.unwrap_handle(v.swapchain);
                })
            }
            vk::StructureType::RENDER_PASS_ATTACHMENT_BEGIN_INFO => {
                fixed!(vk::RenderPassAttachmentBeginInfo<'_>, |s, v| {
                    v.p_attachments = unwrap_handles(handles, s, v.p_attachments, v.attachment_count);
                })
            }
            vk::StructureType::WRITE_DESCRIPTOR_SET_ACCELERATION_STRUCTURE_KHR => {
                fixed!(vk::WriteDescriptorSetAccelerationStructureKHR<'_>, |s, v| {
                    v.p_acceleration_structures = unwrap_handles(
                        handles,
                        s,
                        v.p_acceleration_structures,
                        v.acceleration_structure_count,
                    );
                })
            }
            vk::StructureType::SWAPCHAIN_PRESENT_FENCE_INFO_EXT => {
                fixed!(vk::SwapchainPresentFenceInfoEXT<'_>, |s, v| {
                    v.p_fences = unwrap_handles(handles, s, v.p_fences, v.swapchain_count);
                })
            }

            // Handle-free structures, copied as they are so the walk can go on
            // past them.
            vk::StructureType::PIPELINE_RENDERING_CREATE_INFO => {
                verbatim!(vk::PipelineRenderingCreateInfo<'_>)
            }
            vk::StructureType::PIPELINE_CREATION_FEEDBACK_CREATE_INFO => {
                verbatim!(vk::PipelineCreationFeedbackCreateInfo<'_>)
            }
            vk::StructureType::PIPELINE_SHADER_STAGE_REQUIRED_SUBGROUP_SIZE_CREATE_INFO => {
                verbatim!(vk::PipelineShaderStageRequiredSubgroupSizeCreateInfo<'_>)
            }
            vk::StructureType::SHADER_MODULE_CREATE_INFO => verbatim!(vk::ShaderModuleCreateInfo<'_>),
            vk::StructureType::DESCRIPTOR_SET_LAYOUT_BINDING_FLAGS_CREATE_INFO => {
                verbatim!(vk::DescriptorSetLayoutBindingFlagsCreateInfo<'_>)
            }
            vk::StructureType::MEMORY_ALLOCATE_FLAGS_INFO => verbatim!(vk::MemoryAllocateFlagsInfo<'_>),
            vk::StructureType::EXPORT_MEMORY_ALLOCATE_INFO => {
                verbatim!(vk::ExportMemoryAllocateInfo<'_>)
            }
            vk::StructureType::MEMORY_PRIORITY_ALLOCATE_INFO_EXT => {
                verbatim!(vk::MemoryPriorityAllocateInfoEXT<'_>)
            }
            vk::StructureType::EXTERNAL_MEMORY_IMAGE_CREATE_INFO => {
                verbatim!(vk::ExternalMemoryImageCreateInfo<'_>)
            }
            vk::StructureType::EXTERNAL_MEMORY_BUFFER_CREATE_INFO => {
                verbatim!(vk::ExternalMemoryBufferCreateInfo<'_>)
            }
            vk::StructureType::IMAGE_FORMAT_LIST_CREATE_INFO => {
                verbatim!(vk::ImageFormatListCreateInfo<'_>)
            }
            vk::StructureType::IMAGE_VIEW_USAGE_CREATE_INFO => {
                verbatim!(vk::ImageViewUsageCreateInfo<'_>)
            }
            vk::StructureType::SEMAPHORE_TYPE_CREATE_INFO => verbatim!(vk::SemaphoreTypeCreateInfo<'_>),
            vk::StructureType::TIMELINE_SEMAPHORE_SUBMIT_INFO => {
                verbatim!(vk::TimelineSemaphoreSubmitInfo<'_>)
            }
            vk::StructureType::DEVICE_GROUP_SUBMIT_INFO => verbatim!(vk::DeviceGroupSubmitInfo<'_>),
            vk::StructureType::SAMPLER_REDUCTION_MODE_CREATE_INFO => {
                verbatim!(vk::SamplerReductionModeCreateInfo<'_>)
            }
            vk::StructureType::PRESENT_ID_KHR => verbatim!(vk::PresentIdKHR<'_>),

            // Memory allocation
            vk::StructureType::IMPORT_MEMORY_FD_INFO_KHR => verbatim!(vk::ImportMemoryFdInfoKHR<'_>),
            vk::StructureType::IMPORT_MEMORY_HOST_POINTER_INFO_EXT => {
                verbatim!(vk::ImportMemoryHostPointerInfoEXT<'_>)
            }
            vk::StructureType::IMPORT_MEMORY_WIN32_HANDLE_INFO_KHR => {
                verbatim!(vk::ImportMemoryWin32HandleInfoKHR<'_>)
            }
            vk::StructureType::EXPORT_MEMORY_WIN32_HANDLE_INFO_KHR => {
                verbatim!(vk::ExportMemoryWin32HandleInfoKHR<'_>)
            }
            vk::StructureType::MEMORY_OPAQUE_CAPTURE_ADDRESS_ALLOCATE_INFO => {
                verbatim!(vk::MemoryOpaqueCaptureAddressAllocateInfo<'_>)
            }

            // Buffers and images
            vk::StructureType::BUFFER_OPAQUE_CAPTURE_ADDRESS_CREATE_INFO => {
                verbatim!(vk::BufferOpaqueCaptureAddressCreateInfo<'_>)
            }
            vk::StructureType::BUFFER_DEVICE_ADDRESS_CREATE_INFO_EXT => {
                verbatim!(vk::BufferDeviceAddressCreateInfoEXT<'_>)
            }
            vk::StructureType::BUFFER_USAGE_FLAGS_2_CREATE_INFO_KHR => {
                verbatim!(vk::BufferUsageFlags2CreateInfoKHR<'_>)
            }
            vk::StructureType::IMAGE_STENCIL_USAGE_CREATE_INFO => {
                verbatim!(vk::ImageStencilUsageCreateInfo<'_>)
            }
            vk::StructureType::IMAGE_DRM_FORMAT_MODIFIER_LIST_CREATE_INFO_EXT => {
                verbatim!(vk::ImageDrmFormatModifierListCreateInfoEXT<'_>)
            }
            vk::StructureType::IMAGE_DRM_FORMAT_MODIFIER_EXPLICIT_CREATE_INFO_EXT => {
                verbatim!(vk::ImageDrmFormatModifierExplicitCreateInfoEXT<'_>)
            }
            vk::StructureType::IMAGE_COMPRESSION_CONTROL_EXT => {
                verbatim!(vk::ImageCompressionControlEXT<'_>)
            }
            vk::StructureType::IMAGE_VIEW_ASTC_DECODE_MODE_EXT => {
                verbatim!(vk::ImageViewASTCDecodeModeEXT<'_>)
            }
            vk::StructureType::IMAGE_VIEW_MIN_LOD_CREATE_INFO_EXT => {
                verbatim!(vk::ImageViewMinLodCreateInfoEXT<'_>)
            }
            vk::StructureType::IMAGE_VIEW_SLICED_CREATE_INFO_EXT => {
                verbatim!(vk::ImageViewSlicedCreateInfoEXT<'_>)
            }
            vk::StructureType::SAMPLER_CUSTOM_BORDER_COLOR_CREATE_INFO_EXT => {
                verbatim!(vk::SamplerCustomBorderColorCreateInfoEXT<'_>)
            }
            vk::StructureType::SAMPLER_BORDER_COLOR_COMPONENT_MAPPING_CREATE_INFO_EXT => {
                verbatim!(vk::SamplerBorderColorComponentMappingCreateInfoEXT<'_>)
            }
            vk::StructureType::SAMPLE_LOCATIONS_INFO_EXT => verbatim!(vk::SampleLocationsInfoEXT<'_>),
            vk::StructureType::EXTERNAL_MEMORY_ACQUIRE_UNMODIFIED_EXT => {
                verbatim!(vk::ExternalMemoryAcquireUnmodifiedEXT<'_>)
            }

            // Binding, sync and submission
            vk::StructureType::BIND_BUFFER_MEMORY_DEVICE_GROUP_INFO => {
                verbatim!(vk::BindBufferMemoryDeviceGroupInfo<'_>)
            }
            vk::StructureType::BIND_IMAGE_MEMORY_DEVICE_GROUP_INFO => {
                verbatim!(vk::BindImageMemoryDeviceGroupInfo<'_>)
            }
            vk::StructureType::BIND_IMAGE_PLANE_MEMORY_INFO => {
                verbatim!(vk::BindImagePlaneMemoryInfo<'_>)
            }
            vk::StructureType::EXPORT_SEMAPHORE_CREATE_INFO => {
                verbatim!(vk::ExportSemaphoreCreateInfo<'_>)
            }
            vk::StructureType::EXPORT_FENCE_CREATE_INFO => verbatim!(vk::ExportFenceCreateInfo<'_>),
            vk::StructureType::PROTECTED_SUBMIT_INFO => verbatim!(vk::ProtectedSubmitInfo<'_>),
            vk::StructureType::PERFORMANCE_QUERY_SUBMIT_INFO_KHR => {
                verbatim!(vk::PerformanceQuerySubmitInfoKHR<'_>)
            }
            vk::StructureType::DEVICE_GROUP_BIND_SPARSE_INFO => {
                verbatim!(vk::DeviceGroupBindSparseInfo<'_>)
            }
            vk::StructureType::QUERY_POOL_PERFORMANCE_CREATE_INFO_KHR => {
                verbatim!(vk::QueryPoolPerformanceCreateInfoKHR<'_>)
            }

            // Pipelines and descriptors
            vk::StructureType::PIPELINE_CREATE_FLAGS_2_CREATE_INFO_KHR => {
                verbatim!(vk::PipelineCreateFlags2CreateInfoKHR<'_>)
            }
            vk::StructureType::PIPELINE_ROBUSTNESS_CREATE_INFO_EXT => {
                verbatim!(vk::PipelineRobustnessCreateInfoEXT<'_>)
            }
            vk::StructureType::GRAPHICS_PIPELINE_LIBRARY_CREATE_INFO_EXT => {
                verbatim!(vk::GraphicsPipelineLibraryCreateInfoEXT<'_>)
            }
            vk::StructureType::PIPELINE_DISCARD_RECTANGLE_STATE_CREATE_INFO_EXT => {
                verbatim!(vk::PipelineDiscardRectangleStateCreateInfoEXT<'_>)
            }
            vk::StructureType::PIPELINE_FRAGMENT_SHADING_RATE_STATE_CREATE_INFO_KHR => {
                verbatim!(vk::PipelineFragmentShadingRateStateCreateInfoKHR<'_>)
            }
            vk::StructureType::PIPELINE_VERTEX_INPUT_DIVISOR_STATE_CREATE_INFO_KHR => {
                verbatim!(vk::PipelineVertexInputDivisorStateCreateInfoKHR<'_>)
            }
            vk::StructureType::DESCRIPTOR_POOL_INLINE_UNIFORM_BLOCK_CREATE_INFO => {
                verbatim!(vk::DescriptorPoolInlineUniformBlockCreateInfo<'_>)
            }
            vk::StructureType::MUTABLE_DESCRIPTOR_TYPE_CREATE_INFO_EXT => {
                verbatim!(vk::MutableDescriptorTypeCreateInfoEXT<'_>)
            }
            vk::StructureType::DESCRIPTOR_SET_VARIABLE_DESCRIPTOR_COUNT_ALLOCATE_INFO => {
                verbatim!(vk::DescriptorSetVariableDescriptorCountAllocateInfo<'_>)
            }
            vk::StructureType::WRITE_DESCRIPTOR_SET_INLINE_UNIFORM_BLOCK => {
                verbatim!(vk::WriteDescriptorSetInlineUniformBlock<'_>)
            }
            vk::StructureType::ACCELERATION_STRUCTURE_MOTION_INFO_NV => {
                verbatim!(vk::AccelerationStructureMotionInfoNV<'_>)
            }

            // Render passes and command buffers
            vk::StructureType::RENDER_PASS_INPUT_ATTACHMENT_ASPECT_CREATE_INFO => {
                verbatim!(vk::RenderPassInputAttachmentAspectCreateInfo<'_>)
            }
            vk::StructureType::RENDER_PASS_MULTIVIEW_CREATE_INFO => {
                verbatim!(vk::RenderPassMultiviewCreateInfo<'_>)
            }
            vk::StructureType::RENDER_PASS_FRAGMENT_DENSITY_MAP_CREATE_INFO_EXT => {
                verbatim!(vk::RenderPassFragmentDensityMapCreateInfoEXT<'_>)
            }
            vk::StructureType::FRAMEBUFFER_ATTACHMENTS_CREATE_INFO => {
                verbatim!(vk::FramebufferAttachmentsCreateInfo<'_>)
            }
            vk::StructureType::RENDER_PASS_SAMPLE_LOCATIONS_BEGIN_INFO_EXT => {
                verbatim!(vk::RenderPassSampleLocationsBeginInfoEXT<'_>)
            }
            vk::StructureType::DEVICE_GROUP_RENDER_PASS_BEGIN_INFO => {
                verbatim!(vk::DeviceGroupRenderPassBeginInfo<'_>)
            }
            vk::StructureType::DEVICE_GROUP_COMMAND_BUFFER_BEGIN_INFO => {
                verbatim!(vk::DeviceGroupCommandBufferBeginInfo<'_>)
            }
            vk::StructureType::COMMAND_BUFFER_INHERITANCE_RENDERING_INFO => {
                verbatim!(vk::CommandBufferInheritanceRenderingInfo<'_>)
            }

            // Swapchains and presentation
            vk::StructureType::DEVICE_GROUP_SWAPCHAIN_CREATE_INFO_KHR => {
                verbatim!(vk::DeviceGroupSwapchainCreateInfoKHR<'_>)
            }
            vk::StructureType::SWAPCHAIN_PRESENT_MODES_CREATE_INFO_EXT => {
                verbatim!(vk::SwapchainPresentModesCreateInfoEXT<'_>)
            }
            vk::StructureType::SWAPCHAIN_PRESENT_SCALING_CREATE_INFO_EXT => {
                verbatim!(vk::SwapchainPresentScalingCreateInfoEXT<'_>)
            }
            vk::StructureType::SWAPCHAIN_COUNTER_CREATE_INFO_EXT => {
                verbatim!(vk::SwapchainCounterCreateInfoEXT<'_>)
            }
            vk::StructureType::DEVICE_GROUP_PRESENT_INFO_KHR => {
                verbatim!(vk::DeviceGroupPresentInfoKHR<'_>)
            }
            vk::StructureType::SWAPCHAIN_PRESENT_MODE_INFO_EXT => {
                verbatim!(vk::SwapchainPresentModeInfoEXT<'_>)
            }
            vk::StructureType::PRESENT_REGIONS_KHR => verbatim!(vk::PresentRegionsKHR<'_>),
            vk::StructureType::PRESENT_TIMES_INFO_GOOGLE => verbatim!(vk::PresentTimesInfoGOOGLE<'_>),
            vk::StructureType::DISPLAY_PRESENT_INFO_KHR => verbatim!(vk::DisplayPresentInfoKHR<'_>),

            _ => return None,
        };
        Some(copy)
    }
}

/// Walk an extension chain and return a chain in which every handle of a
/// recognized extension structure is a driver handle.
///
/// Chains without handle-bearing structures are returned untouched. Copying
/// stops at the first structure of unknown layout; the rest of the chain is
/// linked in as it came from the application.
pub unsafe fn unwrap_pnext_chain(
    handles: &HandleTable,
    scratch: &mut Scratch,
    p_next: *const c_void,
) -> *const c_void {
    unsafe {
        if p_next.is_null() || !handles.wrapping_enabled() || !chain_carries_handles(p_next) {
            return p_next;
        }

        let mut head: *const c_void = ptr::null();
        let mut tail: *mut ChainHeader = ptr::null_mut();
        let mut node = p_next as *const ChainHeader;

        while !node.is_null() {
            let next = (*node).p_next;
            let link: *const c_void = match copy_node(handles, scratch, node) {
                Some(copy) => copy as *const c_void,
                None => {
                    if chain_carries_handles(next) {
                        tracing::warn!(
                            "pNext chain: {:?} has an unknown layout; handles further down the chain are forwarded wrapped",
                            (*node).s_type
                        );
                    }
                    node as *const c_void
                }
            };

            if tail.is_null() {
                head = link;
            } else {
                (*tail).p_next = link;
            }
            if link == node as *const c_void {
                break;
            }
            tail = link as *mut ChainHeader;
            node = next as *const ChainHeader;
        }
        head
    }
}

/// Unwrap a shader stage in place, including its own extension chain.
pub unsafe fn unwrap_shader_stage(
    handles: &HandleTable,
    scratch: &mut Scratch,
    stage: &mut vk::PipelineShaderStageCreateInfo<'_>,
) {
    unsafe {
        stage.module = handles.unwrap_handle(stage.module);
        stage.p_next = unwrap_pnext_chain(handles, scratch, stage.p_next);
    }
}

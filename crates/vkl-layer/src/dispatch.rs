//! Dispatch keys and the next-layer dispatch tables.
//!
//! The Vulkan loader requires that dispatchable handles (VkInstance,
//! VkPhysicalDevice, VkDevice, VkQueue, VkCommandBuffer) have their first
//! `sizeof(void*)` bytes point to its dispatch table. Every handle created
//! from the same instance or device carries the same pointer, which makes it
//! the key the layer files its per-instance and per-device state under.

use std::collections::HashMap;
use std::ffi::{c_void, CStr};
use std::sync::Arc;

use ash::vk;
use ash::vk::Handle;
use parking_lot::Mutex;
use vkl_core::{DeferredLedger, HandleTable};

use crate::safe_struct::{unwrap_handles, unwrap_struct, unwrap_structs, Scratch};

/// The loader's dispatch table pointer, read from a dispatchable handle.
pub type DispatchKey = usize;

/// Read the dispatch key of a dispatchable handle.
///
/// # Safety
/// `handle` must be null or a live dispatchable handle.
pub unsafe fn dispatch_key<H: Handle + Copy>(handle: H) -> DispatchKey {
    unsafe {
        let raw = handle.as_raw();
        if raw == 0 {
            return 0;
        }
        *(raw as usize as *const DispatchKey)
    }
}

fn to_void(f: vk::PFN_vkVoidFunction) -> *const c_void {
    match f {
        Some(f) => f as *const c_void,
        None => std::ptr::null(),
    }
}

// ── Instance ────────────────────────────────────────────────

/// Function pointers of the next layer for instance-level entry points.
pub struct InstanceDispatch {
    pub(crate) handles: Arc<HandleTable>,
    pub(crate) get_instance_proc_addr: vk::PFN_vkGetInstanceProcAddr,
    pub(crate) v1_0: ash::InstanceFnV1_0,
    pub(crate) surface: ash::khr::surface::InstanceFn,
    pub(crate) swapchain: ash::khr::swapchain::InstanceFn,
    pub(crate) headless_surface: ash::ext::headless_surface::InstanceFn,
}

impl InstanceDispatch {
    /// Resolve every instance-level pointer through the next layer.
    ///
    /// # Safety
    /// `get_instance_proc_addr` must be the next layer's entry point for
    /// `instance`.
    pub unsafe fn load(
        instance: vk::Instance,
        get_instance_proc_addr: vk::PFN_vkGetInstanceProcAddr,
        handles: Arc<HandleTable>,
    ) -> Self {
        unsafe {
            let mut load = |name: &CStr| to_void(get_instance_proc_addr(instance, name.as_ptr()));
            Self {
                handles,
                get_instance_proc_addr,
                v1_0: ash::InstanceFnV1_0::load(&mut load),
                surface: ash::khr::surface::InstanceFn::load(&mut load),
                swapchain: ash::khr::swapchain::InstanceFn::load(&mut load),
                headless_surface: ash::ext::headless_surface::InstanceFn::load(&mut load),
            }
        }
    }

    /// Forward a name lookup to the next layer.
    pub unsafe fn next_proc_addr(
        &self,
        instance: vk::Instance,
        name: &CStr,
    ) -> vk::PFN_vkVoidFunction {
        unsafe {
            (self.get_instance_proc_addr)(instance, name.as_ptr())
        }
    }

    pub fn handles(&self) -> &HandleTable {
        &self.handles
    }

    pub(crate) fn unwrap<H: Handle + Copy>(&self, handle: H) -> H {
        self.handles.unwrap_handle(handle)
    }
}

// ── Device ──────────────────────────────────────────────────

/// Function pointers of the next layer for device-level entry points, plus
/// the state the forwarding code needs to wrap and unwrap handles.
pub struct DeviceDispatch {
    pub(crate) handles: Arc<HandleTable>,
    pub(crate) deferred: Arc<DeferredLedger>,
    /// Swapchain -> driver image -> wrapped image, so repeated queries hand
    /// out the same wrapped ids.
    pub(crate) swapchain_images: Mutex<HashMap<u64, HashMap<u64, u64>>>,
    /// Descriptor update template -> its entries, for rewriting the raw
    /// data blob of template updates.
    pub(crate) update_templates: Mutex<HashMap<u64, Arc<[vk::DescriptorUpdateTemplateEntry]>>>,
    pub(crate) get_device_proc_addr: vk::PFN_vkGetDeviceProcAddr,
    pub(crate) v1_0: ash::DeviceFnV1_0,
    pub(crate) v1_1: ash::DeviceFnV1_1,
    pub(crate) swapchain: ash::khr::swapchain::DeviceFn,
    pub(crate) present_wait: ash::khr::present_wait::DeviceFn,
    pub(crate) deferred_host_operations: ash::khr::deferred_host_operations::DeviceFn,
    pub(crate) acceleration_structure: ash::khr::acceleration_structure::DeviceFn,
    pub(crate) ray_tracing_pipeline: ash::khr::ray_tracing_pipeline::DeviceFn,
}

impl DeviceDispatch {
    /// Resolve every device-level pointer through the next layer.
    ///
    /// # Safety
    /// `get_device_proc_addr` must be the next layer's entry point for
    /// `device`.
    pub unsafe fn load(
        device: vk::Device,
        get_device_proc_addr: vk::PFN_vkGetDeviceProcAddr,
        handles: Arc<HandleTable>,
        deferred: Arc<DeferredLedger>,
    ) -> Self {
        unsafe {
            let mut load = |name: &CStr| to_void(get_device_proc_addr(device, name.as_ptr()));
            Self {
                handles,
                deferred,
                swapchain_images: Mutex::new(HashMap::new()),
                update_templates: Mutex::new(HashMap::new()),
                get_device_proc_addr,
                v1_0: ash::DeviceFnV1_0::load(&mut load),
                v1_1: ash::DeviceFnV1_1::load(&mut load),
                swapchain: ash::khr::swapchain::DeviceFn::load(&mut load),
                present_wait: ash::khr::present_wait::DeviceFn::load(&mut load),
                deferred_host_operations: ash::khr::deferred_host_operations::DeviceFn::load(&mut load),
                acceleration_structure: ash::khr::acceleration_structure::DeviceFn::load(&mut load),
                ray_tracing_pipeline: ash::khr::ray_tracing_pipeline::DeviceFn::load(&mut load),
            }
        }
    }

    /// Forward a name lookup to the next layer.
    pub unsafe fn next_proc_addr(&self, device: vk::Device, name: &CStr) -> vk::PFN_vkVoidFunction {
        unsafe {
            (self.get_device_proc_addr)(device, name.as_ptr())
        }
    }

    pub fn handles(&self) -> &HandleTable {
        &self.handles
    }

    pub fn deferred(&self) -> &DeferredLedger {
        &self.deferred
    }

    // ── Unwrap / wrap helpers ───────────────────────────────

    pub(crate) fn unwrap<H: Handle + Copy>(&self, handle: H) -> H {
        self.handles.unwrap_handle(handle)
    }

    /// A copy of `*ptr` with its handles unwrapped by `fix`, or `ptr` itself
    /// when wrapping is off.
    pub(crate) unsafe fn local<T: Copy>(
        &self,
        scratch: &mut Scratch,
        ptr: *const T,
        fix: impl FnOnce(&HandleTable, &mut Scratch, &mut T),
    ) -> *const T {
        unsafe {
            if !self.handles.wrapping_enabled() {
                return ptr;
            }
            let handles = &*self.handles;
            unwrap_struct(scratch, ptr, |s, v| fix(handles, s, v))
        }
    }

    /// Like [`local`](Self::local), for an array of structures.
    pub(crate) unsafe fn local_array<T: Copy>(
        &self,
        scratch: &mut Scratch,
        ptr: *const T,
        count: u32,
        mut fix: impl FnMut(&HandleTable, &mut Scratch, &mut T),
    ) -> *const T {
        unsafe {
            if !self.handles.wrapping_enabled() {
                return ptr;
            }
            let handles = &*self.handles;
            unwrap_structs(scratch, ptr, count, |s, v| fix(handles, s, v))
        }
    }

    pub(crate) unsafe fn local_handles<H: Handle + Copy>(
        &self,
        scratch: &mut Scratch,
        ptr: *const H,
        count: u32,
    ) -> *const H {
        unsafe {
            if !self.handles.wrapping_enabled() {
                return ptr;
            }
            unwrap_handles(&self.handles, scratch, ptr, count)
        }
    }

    /// Replace the handle a create call wrote with a wrapped one.
    pub(crate) unsafe fn wrap_created<H: Handle + Copy>(
        &self,
        result: vk::Result,
        p_handle: *mut H,
        parent: Option<u64>,
    ) {
        unsafe {
            if result == vk::Result::SUCCESS && !p_handle.is_null() {
                *p_handle = self.handles.wrap_new(*p_handle, parent);
            }
        }
    }

    /// Wrap every non-null handle of an output array in place.
    pub(crate) unsafe fn wrap_created_array<H: Handle + Copy>(
        &self,
        p_handles: *mut H,
        count: u32,
        parent: Option<u64>,
    ) {
        unsafe {
            if p_handles.is_null() {
                return;
            }
            for i in 0..count as usize {
                let slot = p_handles.add(i);
                if (*slot).as_raw() != 0 {
                    *slot = self.handles.wrap_new(*slot, parent);
                }
            }
        }
    }
}

/// Forward a `vkCreate*` call whose create info carries no handles outside
/// its extension chain.
macro_rules! forward_create {
    ($name:ident, $table:ident . $func:ident, $info:ty, $out:ty) => {
        pub unsafe fn $name(
            &self,
            device: ash::vk::Device,
            p_create_info: *const $info,
            p_allocator: *const ash::vk::AllocationCallbacks<'_>,
            p_out: *mut $out,
        ) -> ash::vk::Result {
            unsafe {
                let mut scratch = $crate::safe_struct::Scratch::new();
                let create_info = self.local(&mut scratch, p_create_info, |handles, s, ci| {
                    ci.p_next = $crate::safe_struct::unwrap_pnext_chain(handles, s, ci.p_next);
                });
                let result = (self.$table.$func)(device, create_info, p_allocator, p_out);
                self.wrap_created(result, p_out, None);
                result
            }
        }
    };
}

/// Forward a `vkDestroy*` call, retiring the wrapped handle first.
macro_rules! forward_destroy {
    ($name:ident, $table:ident . $func:ident, $handle:ty) => {
        pub unsafe fn $name(
            &self,
            device: ash::vk::Device,
            handle: $handle,
            p_allocator: *const ash::vk::AllocationCallbacks<'_>,
        ) {
            unsafe {
                let native = self.handles.erase(handle);
                (self.$table.$func)(device, native, p_allocator)
            }
        }
    };
}

/// Look up the context an intercept runs under, returning `$ret` when the
/// handle belongs to no registered instance or device.
macro_rules! context_or_return {
    (device, $handle:expr, $ret:expr) => {
        $crate::context::device_or_return!($handle, $ret)
    };
    (instance, $handle:expr, $ret:expr) => {
        $crate::context::instance_or_return!($handle, $ret)
    };
}

/// Generate intercepts for calls whose only wrapped parameters are plain
/// handles. Hooks receive the first parameter and the listed ones; the
/// handles named in `unwrap` are swapped for the driver's before forwarding.
macro_rules! forward_intercepts {
    () => {};
    (
        $scope:ident fn $name:ident($first:ident: $first_ty:ty $(, $p:ident: $pt:ty)*) -> vk::Result
            = $table:ident.$func:ident;
            hooks $pre:ident, $post:ident($($h:ident),*);
            unwrap($($u:ident),*);
        $($rest:tt)*
    ) => {
        pub unsafe extern "system" fn $name($first: $first_ty $(, $p: $pt)*) -> ash::vk::Result {
            unsafe {
                let ctx = $crate::dispatch::context_or_return!(
                    $scope,
                    $first,
                    ash::vk::Result::ERROR_INITIALIZATION_FAILED
                );
                let mut record = vkl_core::RecordObject::new(stringify!($name));
                ctx.chain.pre(|vo| vo.$pre($first, $($h,)* &record));
                record.result = {
                    $(let $u = ctx.dispatch.unwrap($u);)*
                    (ctx.dispatch.$table.$func)($first $(, $p)*)
                };
                ctx.chain.post(|vo| vo.$post($first, $($h,)* &record));
                record.result
            }
        }

        $crate::dispatch::forward_intercepts!($($rest)*);
    };
    (
        $scope:ident fn $name:ident($first:ident: $first_ty:ty $(, $p:ident: $pt:ty)*)
            = $table:ident.$func:ident;
            hooks $pre:ident, $post:ident($($h:ident),*);
            unwrap($($u:ident),*);
        $($rest:tt)*
    ) => {
        pub unsafe extern "system" fn $name($first: $first_ty $(, $p: $pt)*) {
            unsafe {
                let ctx = $crate::dispatch::context_or_return!($scope, $first, ());
                let record = vkl_core::RecordObject::new(stringify!($name));
                ctx.chain.pre(|vo| vo.$pre($first, $($h,)* &record));
                {
                    $(let $u = ctx.dispatch.unwrap($u);)*
                    (ctx.dispatch.$table.$func)($first $(, $p)*);
                }
                ctx.chain.post(|vo| vo.$post($first, $($h,)* &record));
            }
        }

        $crate::dispatch::forward_intercepts!($($rest)*);
    };
}

pub(crate) use context_or_return;
pub(crate) use forward_create;
pub(crate) use forward_destroy;
pub(crate) use forward_intercepts;

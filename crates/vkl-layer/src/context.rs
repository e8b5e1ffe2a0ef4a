//! Per-instance and per-device layer state, filed under dispatch keys.
//!
//! A context owns the next layer's dispatch table and the validation chain
//! built for its instance or device. Contexts are created by the
//! registration calls and dropped by the `vkDestroyInstance` /
//! `vkDestroyDevice` intercepts.

use std::sync::{Arc, OnceLock};

use ash::vk;
use ash::vk::Handle;
use dashmap::DashMap;
use vkl_core::{
    config::default_settings_path, CoreError, DeferredLedger, HandleTable, LayerSettings, LogSink,
    RecordObject, ReportSink,
};

use crate::chain::{ChainScope, ValidationChain, ValidatorRegistry};
use crate::dispatch::{dispatch_key, DeviceDispatch, DispatchKey, InstanceDispatch};
use crate::thread_safety::ThreadSafety;

/// What an instance is registered with.
pub struct LayerOptions {
    pub settings: LayerSettings,
    pub validators: ValidatorRegistry,
    pub sink: Arc<dyn ReportSink>,
}

impl Default for LayerOptions {
    fn default() -> Self {
        Self {
            settings: LayerSettings::load_or_default(&default_settings_path()),
            validators: ValidatorRegistry::default(),
            sink: Arc::new(LogSink),
        }
    }
}

pub struct InstanceContext {
    pub instance: vk::Instance,
    pub settings: LayerSettings,
    pub dispatch: InstanceDispatch,
    pub chain: ValidationChain,
    pub thread_safety: Option<Arc<ThreadSafety>>,
    validators: ValidatorRegistry,
}

pub struct DeviceContext {
    pub device: vk::Device,
    pub physical_device: vk::PhysicalDevice,
    pub instance: Arc<InstanceContext>,
    pub dispatch: DeviceDispatch,
    pub chain: ValidationChain,
    pub thread_safety: Option<Arc<ThreadSafety>>,
}

impl DeviceContext {
    pub fn handles(&self) -> &HandleTable {
        self.dispatch.handles()
    }

    pub fn deferred(&self) -> &DeferredLedger {
        self.dispatch.deferred()
    }
}

// ── Registry ────────────────────────────────────────────────

static INSTANCES: OnceLock<DashMap<DispatchKey, Arc<InstanceContext>>> = OnceLock::new();
static DEVICES: OnceLock<DashMap<DispatchKey, Arc<DeviceContext>>> = OnceLock::new();

fn instances() -> &'static DashMap<DispatchKey, Arc<InstanceContext>> {
    INSTANCES.get_or_init(DashMap::new)
}

fn devices() -> &'static DashMap<DispatchKey, Arc<DeviceContext>> {
    DEVICES.get_or_init(DashMap::new)
}

/// The instance context for an instance or one of its physical devices.
///
/// # Safety
/// `handle` must be null or a live dispatchable handle.
pub unsafe fn instance_context<H: Handle + Copy>(handle: H) -> Option<Arc<InstanceContext>> {
    let key = unsafe { dispatch_key(handle) };
    instances().get(&key)
        .map(|entry| entry.value().clone())
}

/// The device context for a device, or one of its queues or command buffers.
///
/// # Safety
/// `handle` must be null or a live dispatchable handle.
pub unsafe fn device_context<H: Handle + Copy>(handle: H) -> Option<Arc<DeviceContext>> {
    let key = unsafe { dispatch_key(handle) };
    devices().get(&key)
        .map(|entry| entry.value().clone())
}

/// Build and file the context for a freshly created instance.
///
/// # Safety
/// `instance` must be a live instance whose first word is its dispatch key,
/// and `get_instance_proc_addr` the next layer's entry point for it.
pub unsafe fn register_instance(
    instance: vk::Instance,
    get_instance_proc_addr: vk::PFN_vkGetInstanceProcAddr,
    options: LayerOptions,
) -> Arc<InstanceContext> {
    vkl_common::init_logging();

    let LayerOptions {
        settings,
        validators,
        sink,
    } = options;

    let handles = Arc::new(HandleTable::new(settings.wrap_handles));
    handles.create_object(instance);
    let dispatch = unsafe { InstanceDispatch::load(instance, get_instance_proc_addr, handles) };
    let thread_safety = settings
        .thread_safety
        .then(|| ThreadSafety::for_instance(sink));
    let chain = ValidationChain::build(
        ChainScope::Instance { instance },
        &settings,
        &validators,
        thread_safety.clone(),
    );

    let record = RecordObject::new("vkCreateInstance");
    chain.post(|vo| vo.post_call_record_create_instance(instance, &record));

    let ctx = Arc::new(InstanceContext {
        instance,
        settings,
        dispatch,
        chain,
        thread_safety,
        validators,
    });
    let key = unsafe { dispatch_key(instance) };
    instances().insert(key, ctx.clone());
    tracing::debug!(
        instance = format_args!("{:#x}", instance.as_raw()),
        key = format_args!("{:#x}", key),
        validators = ?ctx.chain.kinds(),
        "instance registered"
    );
    ctx
}

/// Build and file the context for a freshly created device. The instance is
/// found through `physical_device`.
///
/// # Safety
/// `device` must be a live device whose first word is its dispatch key, and
/// `get_device_proc_addr` the next layer's entry point for it.
pub unsafe fn register_device(
    physical_device: vk::PhysicalDevice,
    device: vk::Device,
    get_device_proc_addr: vk::PFN_vkGetDeviceProcAddr,
) -> Result<Arc<DeviceContext>, CoreError> {
    let instance_key = unsafe { dispatch_key(physical_device) };
    let instance = unsafe { instance_context(physical_device) }
        .ok_or(CoreError::UnknownDispatchKey(instance_key))?;

    let handles = instance.dispatch.handles.clone();
    handles.create_object(device);
    let deferred = Arc::new(DeferredLedger::new());
    let dispatch =
        unsafe { DeviceDispatch::load(device, get_device_proc_addr, handles, deferred.clone()) };
    let thread_safety = instance
        .thread_safety
        .as_ref()
        .map(|parent| ThreadSafety::for_device(parent.clone(), deferred));
    let chain = ValidationChain::build(
        ChainScope::Device {
            physical_device,
            device,
        },
        &instance.settings,
        &instance.validators,
        thread_safety.clone(),
    );

    let record = RecordObject::new("vkCreateDevice");
    chain.post(|vo| vo.post_call_record_create_device(physical_device, device, &record));

    let ctx = Arc::new(DeviceContext {
        device,
        physical_device,
        instance,
        dispatch,
        chain,
        thread_safety,
    });
    let key = unsafe { dispatch_key(device) };
    devices().insert(key, ctx.clone());
    tracing::debug!(
        device = format_args!("{:#x}", device.as_raw()),
        key = format_args!("{:#x}", key),
        "device registered"
    );
    Ok(ctx)
}

pub(crate) unsafe fn unregister_instance(instance: vk::Instance) -> Option<Arc<InstanceContext>> {
    let key = unsafe { dispatch_key(instance) };
    let removed = instances().remove(&key).map(|(_, ctx)| ctx);
    if removed.is_some() {
        tracing::debug!(key = format_args!("{:#x}", key), "instance unregistered");
    }
    removed
}

pub(crate) unsafe fn unregister_device(device: vk::Device) -> Option<Arc<DeviceContext>> {
    let key = unsafe { dispatch_key(device) };
    let removed = devices().remove(&key).map(|(_, ctx)| ctx);
    if removed.is_some() {
        tracing::debug!(key = format_args!("{:#x}", key), "device unregistered");
    }
    removed
}

/// Look up the device context or bail out of the intercept.
macro_rules! device_or_return {
    ($handle:expr, $ret:expr) => {
        match $crate::context::device_context($handle) {
            Some(ctx) => ctx,
            None => {
                tracing::error!(
                    handle = format_args!("{:#x}", ash::vk::Handle::as_raw($handle)),
                    "call on an unregistered device"
                );
                return $ret;
            }
        }
    };
    ($handle:expr) => {
        $crate::context::device_or_return!($handle, ())
    };
}

macro_rules! instance_or_return {
    ($handle:expr, $ret:expr) => {
        match $crate::context::instance_context($handle) {
            Some(ctx) => ctx,
            None => {
                tracing::error!(
                    handle = format_args!("{:#x}", ash::vk::Handle::as_raw($handle)),
                    "call on an unregistered instance"
                );
                return $ret;
            }
        }
    };
    ($handle:expr) => {
        $crate::context::instance_or_return!($handle, ())
    };
}

pub(crate) use device_or_return;
pub(crate) use instance_or_return;

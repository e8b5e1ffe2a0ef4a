//! Validation chain construction and hook ordering.

mod common;

use std::sync::Arc;

use ash::vk;
use ash::vk::Handle;
use common::TestEnv;
use parking_lot::Mutex;
use vkl_core::{LayerSettings, RecordObject};
use vkl_layer::{ChainScope, ValidationObject, ValidatorKind, ValidatorRegistry};

type Log = Arc<Mutex<Vec<String>>>;

/// Logs buffer creation as seen by one validator.
struct Recorder {
    kind: ValidatorKind,
    name: &'static str,
    log: Log,
}

impl ValidationObject for Recorder {
    fn kind(&self) -> ValidatorKind {
        self.kind
    }

    fn pre_call_record_create_buffer(
        &self,
        _device: vk::Device,
        create_info: &vk::BufferCreateInfo<'_>,
        _record: &RecordObject,
    ) {
        self.log
            .lock()
            .push(format!("{} pre size={}", self.name, create_info.size));
    }

    fn post_call_record_create_buffer(
        &self,
        _device: vk::Device,
        _create_info: &vk::BufferCreateInfo<'_>,
        buffer: vk::Buffer,
        record: &RecordObject,
    ) {
        self.log.lock().push(format!(
            "{} post {:?} {:#x}",
            self.name,
            record.result,
            buffer.as_raw()
        ));
    }
}

fn register(registry: &mut ValidatorRegistry, kind: ValidatorKind, name: &'static str, log: &Log) {
    let log = Arc::clone(log);
    registry.register(kind, move |_scope: &ChainScope| {
        Arc::new(Recorder {
            kind,
            name,
            log: Arc::clone(&log),
        }) as Arc<dyn ValidationObject>
    });
}

#[test]
fn test_hooks_run_in_chain_order() {
    let log = Log::default();
    let mut registry = ValidatorRegistry::new();
    // Registration order does not decide chain order.
    register(&mut registry, ValidatorKind::BestPractices, "best", &log);
    register(&mut registry, ValidatorKind::Core, "core", &log);
    register(&mut registry, ValidatorKind::Stateless, "stateless", &log);
    let settings = LayerSettings {
        best_practices: true,
        ..LayerSettings::default()
    };
    let env = TestEnv::build(settings, registry);

    let buffer = env.buffer();

    let created = format!("{:#x}", buffer.as_raw());
    assert_eq!(
        *log.lock(),
        vec![
            "stateless pre size=256".to_string(),
            "core pre size=256".to_string(),
            "best pre size=256".to_string(),
            format!("stateless post SUCCESS {created}"),
            format!("core post SUCCESS {created}"),
            format!("best post SUCCESS {created}"),
        ]
    );
    assert_eq!(
        env.ctx.chain.kinds(),
        vec![
            ValidatorKind::ThreadSafety,
            ValidatorKind::Stateless,
            ValidatorKind::Core,
            ValidatorKind::BestPractices,
        ]
    );
}

#[test]
fn test_post_hooks_see_null_after_failure() {
    let log = Log::default();
    let mut registry = ValidatorRegistry::new();
    register(&mut registry, ValidatorKind::Core, "core", &log);
    let env = TestEnv::build(LayerSettings::default(), registry);

    let (result, _) = env.create_buffer(0);

    assert_eq!(result, vk::Result::ERROR_OUT_OF_DEVICE_MEMORY);
    assert_eq!(
        *log.lock(),
        vec![
            "core pre size=0".to_string(),
            "core post ERROR_OUT_OF_DEVICE_MEMORY 0x0".to_string(),
        ]
    );
}

#[test]
fn test_disabled_validators_are_skipped() {
    let log = Log::default();
    let mut registry = ValidatorRegistry::new();
    register(&mut registry, ValidatorKind::GpuAssisted, "gpu", &log);
    register(&mut registry, ValidatorKind::ObjectLifetimes, "lifetimes", &log);
    let settings = LayerSettings {
        object_lifetimes: false,
        ..LayerSettings::default()
    };
    let env = TestEnv::build(settings, registry);

    env.buffer();

    assert!(log.lock().is_empty());
    assert_eq!(env.ctx.chain.kinds(), vec![ValidatorKind::ThreadSafety]);
}

#[test]
fn test_thread_safety_can_be_turned_off() {
    let settings = LayerSettings {
        thread_safety: false,
        ..LayerSettings::default()
    };
    let env = TestEnv::build(settings, ValidatorRegistry::new());

    assert!(env.ctx.thread_safety.is_none());
    assert!(env.instance_ctx.thread_safety.is_none());
    assert!(env.ctx.chain.is_empty());

    // Calls are still forwarded and wrapped.
    let buffer = env.buffer();
    assert_ne!(buffer.as_raw(), env.driver.last("vkCreateBuffer")[0]);
}

#[test]
fn test_registered_thread_safety_is_ignored() {
    let log = Log::default();
    let mut registry = ValidatorRegistry::new();
    register(&mut registry, ValidatorKind::ThreadSafety, "impostor", &log);
    register(&mut registry, ValidatorKind::Core, "core", &log);
    let env = TestEnv::build(LayerSettings::default(), registry);

    env.buffer();

    let kinds = env.ctx.chain.kinds();
    assert_eq!(kinds, vec![ValidatorKind::ThreadSafety, ValidatorKind::Core]);
    assert!(log.lock().iter().all(|line| line.starts_with("core")));
    // The built-in tracker occupies the slot and tracks the new buffer.
    assert_eq!(env.thread_safety().tracked_count(vk::ObjectType::BUFFER), 1);
}

#[test]
fn test_factories_build_per_scope() {
    let scopes = Arc::new(Mutex::new(Vec::new()));
    let mut registry = ValidatorRegistry::new();
    let seen = Arc::clone(&scopes);
    registry.register(ValidatorKind::Stateless, move |scope: &ChainScope| {
        seen.lock().push(*scope);
        Arc::new(Recorder {
            kind: ValidatorKind::Stateless,
            name: "stateless",
            log: Log::default(),
        }) as Arc<dyn ValidationObject>
    });
    let env = TestEnv::build(LayerSettings::default(), registry);

    let scopes = scopes.lock();
    assert_eq!(scopes.len(), 2);
    assert!(matches!(scopes[0], ChainScope::Instance { instance } if instance == env.instance));
    assert!(matches!(
        scopes[1],
        ChainScope::Device { physical_device, device }
            if physical_device == env.physical_device && device == env.device
    ));
    assert_eq!(env.instance_ctx.chain.len(), 2);
}

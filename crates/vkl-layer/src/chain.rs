//! The ordered validation object chain built for each instance and device.

use std::sync::Arc;

use ash::vk;
use vkl_core::LayerSettings;

use crate::thread_safety::ThreadSafety;
use crate::validation_object::ValidationObject;

/// Validator families, in chain order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ValidatorKind {
    ThreadSafety,
    Stateless,
    ObjectLifetimes,
    Core,
    BestPractices,
    GpuAssisted,
    DebugPrintf,
    SyncValidation,
}

impl ValidatorKind {
    pub const ALL: [ValidatorKind; 8] = [
        ValidatorKind::ThreadSafety,
        ValidatorKind::Stateless,
        ValidatorKind::ObjectLifetimes,
        ValidatorKind::Core,
        ValidatorKind::BestPractices,
        ValidatorKind::GpuAssisted,
        ValidatorKind::DebugPrintf,
        ValidatorKind::SyncValidation,
    ];

    pub fn enabled(self, settings: &LayerSettings) -> bool {
        match self {
            ValidatorKind::ThreadSafety => settings.thread_safety,
            ValidatorKind::Stateless => settings.stateless,
            ValidatorKind::ObjectLifetimes => settings.object_lifetimes,
            ValidatorKind::Core => settings.core,
            ValidatorKind::BestPractices => settings.best_practices,
            ValidatorKind::GpuAssisted => settings.gpu_assisted,
            ValidatorKind::DebugPrintf => settings.debug_printf,
            ValidatorKind::SyncValidation => settings.sync_validation,
        }
    }
}

/// What a chain is being built for.
#[derive(Debug, Clone, Copy)]
pub enum ChainScope {
    Instance {
        instance: vk::Instance,
    },
    Device {
        physical_device: vk::PhysicalDevice,
        device: vk::Device,
    },
}

pub type ValidatorFactory = Arc<dyn Fn(&ChainScope) -> Arc<dyn ValidationObject> + Send + Sync>;

/// Factories for validators implemented outside this crate, consulted each
/// time a chain is built.
#[derive(Clone, Default)]
pub struct ValidatorRegistry {
    factories: Vec<(ValidatorKind, ValidatorFactory)>,
}

impl ValidatorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<F>(&mut self, kind: ValidatorKind, factory: F)
    where
        F: Fn(&ChainScope) -> Arc<dyn ValidationObject> + Send + Sync + 'static,
    {
        self.factories.push((kind, Arc::new(factory)));
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}

/// Validators invoked around every driver call, pre hooks and post hooks
/// both in chain order.
pub struct ValidationChain {
    objects: Vec<Arc<dyn ValidationObject>>,
}

impl ValidationChain {
    pub fn build(
        scope: ChainScope,
        settings: &LayerSettings,
        registry: &ValidatorRegistry,
        thread_safety: Option<Arc<ThreadSafety>>,
    ) -> Self {
        let mut objects: Vec<Arc<dyn ValidationObject>> = Vec::new();
        for kind in ValidatorKind::ALL {
            if !kind.enabled(settings) {
                continue;
            }
            if kind == ValidatorKind::ThreadSafety {
                if let Some(ts) = &thread_safety {
                    objects.push(ts.clone());
                }
                continue;
            }
            for (_, factory) in registry.factories.iter().filter(|(k, _)| *k == kind) {
                objects.push(factory(&scope));
            }
        }

        if registry
            .factories
            .iter()
            .any(|(k, _)| *k == ValidatorKind::ThreadSafety)
        {
            tracing::warn!("registered thread-safety validators are ignored; the built-in one is used");
        }

        tracing::debug!(
            ?scope,
            validators = ?objects.iter().map(|vo| vo.kind()).collect::<Vec<_>>(),
            "validation chain built"
        );
        Self { objects }
    }

    #[inline]
    pub fn pre(&self, mut f: impl FnMut(&dyn ValidationObject)) {
        for vo in &self.objects {
            f(vo.as_ref());
        }
    }

    #[inline]
    pub fn post(&self, mut f: impl FnMut(&dyn ValidationObject)) {
        for vo in &self.objects {
            f(vo.as_ref());
        }
    }

    pub fn kinds(&self) -> Vec<ValidatorKind> {
        self.objects.iter().map(|vo| vo.kind()).collect()
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

//! Tool components and their lazy loader

use std::fmt;
use std::sync::{Arc, OnceLock};

use tracing::debug;

/// A runnable tool: text in, outcome out.
pub trait ToolComponent: Send + Sync {
    fn run(&self, input: &str) -> ToolOutcome;
}

/// Result of running a tool component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolOutcome {
    Success {
        output: String,
        warnings: Vec<String>,
    },
    Failure {
        /// Where in the input the failure was detected, if known
        locator: Option<String>,
        message: String,
    },
}

impl ToolOutcome {
    pub fn success(output: impl Into<String>) -> Self {
        Self::Success {
            output: output.into(),
            warnings: Vec::new(),
        }
    }

    pub fn failure(locator: Option<String>, message: impl Into<String>) -> Self {
        Self::Failure {
            locator,
            message: message.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    pub fn output(&self) -> Option<&str> {
        match self {
            Self::Success { output, .. } => Some(output),
            Self::Failure { .. } => None,
        }
    }
}

type Factory = dyn Fn() -> Arc<dyn ToolComponent> + Send + Sync;

struct Inner {
    factory: Box<Factory>,
    loaded: OnceLock<Arc<dyn ToolComponent>>,
}

/// Deferred component factory.
///
/// The component is built on the first [`load`](Self::load) and shared by
/// every clone afterwards.
#[derive(Clone)]
pub struct LazyComponent {
    inner: Arc<Inner>,
}

impl LazyComponent {
    pub fn new<F>(factory: F) -> Self
    where
        F: Fn() -> Arc<dyn ToolComponent> + Send + Sync + 'static,
    {
        Self {
            inner: Arc::new(Inner {
                factory: Box::new(factory),
                loaded: OnceLock::new(),
            }),
        }
    }

    pub fn load(&self) -> Arc<dyn ToolComponent> {
        Arc::clone(self.inner.loaded.get_or_init(|| {
            debug!("Loading tool component");
            (self.inner.factory)()
        }))
    }

    pub fn is_loaded(&self) -> bool {
        self.inner.loaded.get().is_some()
    }
}

impl fmt::Debug for LazyComponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LazyComponent")
            .field("loaded", &self.is_loaded())
            .finish()
    }
}

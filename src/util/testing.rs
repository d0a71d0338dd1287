use std::env;
use std::sync::{Arc, Once};

use tracing::{debug, info};
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    prelude::*,
    EnvFilter,
};

use crate::config::{Settings, StoreBackend};
use crate::infrastructure::di::ServiceContainer;
use crate::infrastructure::MemoryStore;

static TEST_SETUP: Once = Once::new();

pub fn init_test_setup() {
    TEST_SETUP.call_once(|| {
        if env::var("RUST_LOG").is_err() {
            env::set_var("RUST_LOG", "debug");
        }
        // global logging subscriber, used by all tracing log macros
        setup_test_logging();
        info!("Test Setup complete");
    });
}

fn setup_test_logging() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));

    let subscriber = tracing_subscriber::registry().with(
        fmt::layer()
            .with_test_writer()
            .with_target(true)
            .with_span_events(FmtSpan::CLOSE)
            .with_filter(env_filter),
    );

    // Only set if we haven't already set a global subscriber
    if tracing::dispatcher::has_been_set() {
        debug!("Tracing subscriber already set");
    } else {
        subscriber.try_init().unwrap_or_else(|e| {
            eprintln!("Error: Failed to set up logging: {}", e);
        });
    }
}

/// Services wired to a fresh in-memory store with default settings.
pub fn memory_container() -> ServiceContainer {
    let settings = Settings {
        store: StoreBackend::Memory,
        ..Settings::default()
    };
    ServiceContainer::with_deps(settings, Arc::new(MemoryStore::new()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_test_setup() {
        init_test_setup();
        init_test_setup();
    }

    #[test]
    fn given_memory_container_when_created_then_store_is_empty() {
        let container = memory_container();
        assert_eq!(container.tree_store.describe(), "memory");
        assert!(container.skills.list_nodes(None).unwrap().is_empty());
    }
}

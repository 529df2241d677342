//! Builder assembling an [`EnrollmentService`] from configuration and collaborators.

use std::sync::Arc;

use crate::config::EnrollmentConfig;
use crate::core::{
    AuditSink, ClassCapacityProvider, EnrollmentError, EnrollmentService, EnrollmentStore,
    InMemoryAuditSink, MemberLookup,
};
use crate::infra::{InMemoryDirectory, InMemoryEnrollmentStore};
use crate::util::clock::{Clock, SystemClock};

/// Step-by-step construction of an enrollment service.
pub struct ServiceBuilder<S> {
    config: EnrollmentConfig,
    store: Arc<S>,
    classes: Option<Arc<dyn ClassCapacityProvider>>,
    members: Option<Arc<dyn MemberLookup>>,
    clock: Arc<dyn Clock>,
    audit: Option<Arc<dyn AuditSink>>,
}

impl<S> ServiceBuilder<S>
where
    S: EnrollmentStore,
{
    /// Start from a config and a record store.
    pub fn new(config: EnrollmentConfig, store: Arc<S>) -> Self {
        Self {
            config,
            store,
            classes: None,
            members: None,
            clock: Arc::new(SystemClock),
            audit: None,
        }
    }

    /// Configuration being built with.
    pub const fn config(&self) -> &EnrollmentConfig {
        &self.config
    }

    /// Class capacity lookups.
    #[must_use]
    pub fn classes(mut self, classes: Arc<dyn ClassCapacityProvider>) -> Self {
        self.classes = Some(classes);
        self
    }

    /// Member existence lookups.
    #[must_use]
    pub fn members(mut self, members: Arc<dyn MemberLookup>) -> Self {
        self.members = Some(members);
        self
    }

    /// Use one directory for both class and member lookups.
    #[must_use]
    pub fn directory<D>(self, directory: Arc<D>) -> Self
    where
        D: ClassCapacityProvider + MemberLookup + 'static,
    {
        let classes: Arc<dyn ClassCapacityProvider> = directory.clone();
        let members: Arc<dyn MemberLookup> = directory;
        self.classes(classes).members(members)
    }

    /// Override the time source.
    #[must_use]
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Attach an audit sink.
    #[must_use]
    pub fn audit(mut self, audit: Arc<dyn AuditSink>) -> Self {
        self.audit = Some(audit);
        self
    }

    /// Attach an in-memory audit sink sized from the config and return it
    /// alongside the builder.
    pub fn in_memory_audit(self) -> (Self, Arc<InMemoryAuditSink>) {
        let sink = Arc::new(InMemoryAuditSink::new(self.config.audit_buffer));
        let builder = self.audit(sink.clone());
        (builder, sink)
    }

    /// Validate the config and assemble the service.
    ///
    /// # Errors
    ///
    /// Returns [`EnrollmentError::Backend`] for an invalid config or a
    /// missing lookup collaborator.
    pub fn build(self) -> Result<EnrollmentService<S>, EnrollmentError> {
        self.config
            .validate()
            .map_err(|e| EnrollmentError::Backend(format!("config invalid: {e}")))?;
        let classes = self.classes.ok_or_else(|| {
            EnrollmentError::Backend("class capacity provider not configured".into())
        })?;
        let members = self
            .members
            .ok_or_else(|| EnrollmentError::Backend("member lookup not configured".into()))?;

        let service = EnrollmentService::new(&self.config, self.store, classes, members, self.clock);
        Ok(match self.audit {
            Some(audit) => service.with_audit(audit),
            None => service,
        })
    }
}

impl ServiceBuilder<InMemoryEnrollmentStore> {
    /// In-memory store plus the given in-memory directory.
    pub fn in_memory(config: EnrollmentConfig, directory: Arc<InMemoryDirectory>) -> Self {
        Self::new(config, Arc::new(InMemoryEnrollmentStore::new())).directory(directory)
    }
}

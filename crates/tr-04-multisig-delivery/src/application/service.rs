//! Multisig Deliverer Service

use crate::adapters::default_reader_factory;
use crate::config::DeliveryConfig;
use crate::domain::errors::DeliveryError;
use crate::domain::policy::{place, Placement};
use crate::ports::inbound::SafeTxDeliverer;
use crate::ports::outbound::{SafeNonceReader, SafeReaderFactory};
use async_trait::async_trait;
use parking_lot::RwLock;
use shared_types::{Address, LedgerTransport, Message};
use std::collections::HashMap;
use std::sync::Arc;
use tr_03_dispatcher::MessageScheduler;
use tracing::debug;

pub struct MultisigDeliverer {
    transport: Arc<dyn LedgerTransport>,
    scheduler: Arc<dyn MessageScheduler>,
    config: DeliveryConfig,
    factory: Box<dyn SafeReaderFactory>,
    // TODO: bound this cache once a relayer serves enough contracts for it to matter
    readers: RwLock<HashMap<Address, Arc<dyn SafeNonceReader>>>,
}

impl MultisigDeliverer {
    pub fn new(
        transport: Arc<dyn LedgerTransport>,
        scheduler: Arc<dyn MessageScheduler>,
        config: DeliveryConfig,
    ) -> Self {
        Self {
            transport,
            scheduler,
            config,
            factory: Box::new(default_reader_factory),
            readers: RwLock::new(HashMap::new()),
        }
    }

    /// Replace how readers for new contracts are built.
    pub fn with_reader_factory(mut self, factory: impl SafeReaderFactory + 'static) -> Self {
        self.factory = Box::new(factory);
        self
    }

    pub fn relayer(&self) -> Address {
        self.config.relayer
    }

    pub fn cached_readers(&self) -> usize {
        self.readers.read().len()
    }

    fn reader(&self, contract: Address) -> Result<Arc<dyn SafeNonceReader>, DeliveryError> {
        if let Some(reader) = self.readers.read().get(&contract) {
            return Ok(Arc::clone(reader));
        }
        let reader = self
            .factory
            .create(contract, Arc::clone(&self.transport))?;
        self.readers.write().insert(contract, Arc::clone(&reader));
        Ok(reader)
    }
}

#[async_trait]
impl SafeTxDeliverer for MultisigDeliverer {
    async fn deliver(&self, req: &mut Message, safe_nonce: u64) -> Result<(), DeliveryError> {
        if req.from != self.config.relayer {
            return Err(DeliveryError::SenderMismatch {
                expected: self.config.relayer,
                actual: req.from,
            });
        }
        let contract = req.to.ok_or(DeliveryError::MissingDestination)?;

        let on_chain = self.reader(contract)?.nonce().await?;

        match place(contract, on_chain, safe_nonce) {
            Placement::Immediate => {}
            Placement::After(dependency) => {
                req.after_msg = Some(dependency);
                debug!(
                    msg_id = ?req.id(),
                    after_msg = ?dependency,
                    on_chain,
                    safe_nonce,
                    "[tr-04] Execution waits for previous sequence"
                );
            }
            Placement::Stale => {
                return Err(DeliveryError::StaleSequence {
                    on_chain,
                    requested: safe_nonce,
                });
            }
        }

        self.scheduler.schedule_msg(req.clone()).await?;
        debug!(msg_id = ?req.id(), contract = ?contract, safe_nonce, "[tr-04] Execution scheduled");
        Ok(())
    }
}

use std::sync::Arc;

use custody_store::{InMemoryLedger, TxReceipt};
use tracing::{debug, info, warn};

use crate::error::{RegistryError, RegistryResult};
use crate::invocation::{Function, Invocation};
use crate::response::Response;

/// Result of an invocation that committed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Execution {
    pub function: Function,
    pub payload: Vec<u8>,
    pub receipt: TxReceipt,
}

/// Hosts the registry on a ledger: one invocation, one transaction.
///
/// The transaction commits only if the operation succeeds, so a failed
/// invocation never leaves a partial write behind. A commit rejected for
/// conflicting with a concurrent invocation is reported as a store error.
#[derive(Clone, Debug)]
pub struct Contract {
    ledger: Arc<InMemoryLedger>,
}

impl Contract {
    pub fn new(ledger: Arc<InMemoryLedger>) -> Self {
        Self { ledger }
    }

    pub fn ledger(&self) -> &Arc<InMemoryLedger> {
        &self.ledger
    }

    /// Instantiation hook. The registry needs no initial state.
    pub fn init(&self) -> Response {
        Response::success(Vec::new())
    }

    /// Run a decoded invocation in its own transaction.
    pub fn execute(&self, invocation: &Invocation) -> RegistryResult<Execution> {
        let function = invocation.function();
        let mut tx = self.ledger.begin();
        let tx_id = tx.tx_id();
        debug!(tx_id, %function, item_id = ?invocation.item_id(), "invocation started");

        let payload = invocation.execute(&mut tx)?;
        let receipt = tx.commit().map_err(|e| {
            warn!(tx_id, %function, error = %e, "commit rejected");
            RegistryError::from(e)
        })?;

        if receipt.writes > 0 {
            info!(tx_id, %function, version = receipt.version, writes = receipt.writes, "invocation committed");
        }
        Ok(Execution {
            function,
            payload,
            receipt,
        })
    }

    /// Resolve `function` with `args` and run it.
    pub fn call<A: AsRef<[u8]>>(&self, function: &str, args: &[A]) -> RegistryResult<Execution> {
        let invocation = Invocation::parse(function, args).map_err(|e| {
            if matches!(e, RegistryError::UnknownFunction(_)) {
                warn!(function, "invoke did not find function");
            }
            e
        })?;
        self.execute(&invocation)
    }

    /// Resolve and run, reporting the outcome as a [`Response`].
    pub fn invoke<A: AsRef<[u8]>>(&self, function: &str, args: &[A]) -> Response {
        match self.call(function, args) {
            Ok(execution) => Response::success(execution.payload),
            Err(err) => {
                debug!(function, kind = err.kind(), error = %err, "invocation failed");
                Response::from(err)
            }
        }
    }
}

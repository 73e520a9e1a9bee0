use futures::future::join_all;
use std::{future::Future, sync::Arc};
use tracing::{debug, warn};

use crate::ipfs::{ContentStore, IpfsError};

/// Run `op` against every store concurrently. Failures are logged and dropped;
/// returns how many stores succeeded.
pub(crate) async fn replicate<F, Fut>(stores: &[Arc<dyn ContentStore>], what: &str, op: F) -> usize
where
    F: Fn(Arc<dyn ContentStore>) -> Fut,
    Fut: Future<Output = Result<(), IpfsError>>,
{
    let results = join_all(stores.iter().map(|store| {
        let endpoint = store.endpoint();
        let fut = op(Arc::clone(store));
        async move { (endpoint, fut.await) }
    }))
    .await;

    let mut replicated = 0;
    for (endpoint, result) in results {
        match result {
            Ok(()) => {
                debug!("replicated {what} to {endpoint}");
                replicated += 1;
            }
            Err(err) => warn!("could not replicate {what} to {endpoint}: {err}"),
        }
    }
    replicated
}

/*! Integration tests for Restbind.
 *
 * This test suite is organized as a single integration test binary
 * following the pattern described by matklad in
 * https://matklad.github.io/2021/02/27/delete-cargo-integration-tests.html
 *
 * The module structure mirrors the main library structure:
 * - collection: Reconciliation properties and collection sync against a transport
 * - model: Model lifecycle (save, fetch, destroy) inside and outside collections
 * - observer: Change notification delivered to UI-style subscribers
 * - transport: HttpTransport against a local stub REST server, transport configuration
 */

use tracing_subscriber::EnvFilter;

#[ctor::ctor]
fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("restbind=info".parse().unwrap()),
        )
        .with_test_writer()
        .try_init();
}

mod collection;
mod helpers;
mod model;
mod observer;
mod transport;

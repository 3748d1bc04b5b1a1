use axum_test::TestServer;
use rusqlite::Connection;

use crate::{AppState, build_router};

/// The owner token used by most endpoint tests.
pub(crate) const TEST_OWNER: &str = "owner-a";
/// A second owner for checking that data stays partitioned.
pub(crate) const OTHER_OWNER: &str = "owner-b";

pub(crate) fn get_test_state() -> AppState {
    let connection = Connection::open_in_memory().expect("Could not open in-memory database.");

    AppState::new(connection, "Etc/UTC").expect("Could not create app state.")
}

/// A server over the full router backed by a fresh in-memory database.
pub(crate) fn get_test_server() -> TestServer {
    TestServer::try_new(build_router(get_test_state(), None)).expect("Could not create test server.")
}

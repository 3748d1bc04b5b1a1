#![allow(missing_docs)]

pub(crate) mod fixtures;
pub(crate) mod http;

pub(crate) use fixtures::transaction_at;
pub(crate) use http::{OTHER_OWNER, TEST_OWNER, get_test_server, get_test_state};

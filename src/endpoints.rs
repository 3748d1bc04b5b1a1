//! The API endpoint URIs.
//!
//! For endpoints that take a parameter, e.g., '/api/budgets/{category}', use [format_endpoint].

use std::fmt::Display;

/// The route to list, create and bulk delete transactions.
pub const TRANSACTIONS_API: &str = "/api/transactions";
/// The route to access a single transaction.
pub const TRANSACTION: &str = "/api/transactions/{transaction_id}";
/// The route to list and create budgets.
pub const BUDGETS_API: &str = "/api/budgets";
/// The route to access the budget of a single category.
pub const BUDGET: &str = "/api/budgets/{category}";
/// The route for the owner's overall balance.
pub const BALANCE: &str = "/api/balance";
/// The route for the spending report over a period.
pub const REPORTS: &str = "/api/reports";
/// The route for the monthly progress of each budget.
pub const BUDGET_REPORT: &str = "/api/reports/budgets";

/// Replace the parameter in `endpoint_path` with `value`.
///
/// A parameter is a string that starts with a left brace and ends with a right brace.
/// For example, in the endpoint path '/api/budgets/{category}', '{category}' is the parameter.
///
/// Only the first parameter is replaced. `value` is inserted as is, so callers
/// should percent-encode values that are not URI safe.
///
/// If no parameter is found in `endpoint_path`, the function returns the
/// the original `endpoint_path`.
pub fn format_endpoint(endpoint_path: &str, value: impl Display) -> String {
    let Some(param_start) = endpoint_path.find('{') else {
        return endpoint_path.to_owned();
    };

    let param_end = endpoint_path[param_start..]
        .find('}')
        .map(|offset| param_start + offset + 1)
        .unwrap_or(endpoint_path.len());

    format!(
        "{}{}{}",
        &endpoint_path[..param_start],
        value,
        &endpoint_path[param_end..]
    )
}

// These tests are here so that we know when we call `Uri::from_shared` it will not panic.
#[cfg(test)]
mod endpoints_tests {
    use axum::http::Uri;

    use crate::endpoints::{self, format_endpoint};

    fn assert_endpoint_is_valid_uri(uri: &str) {
        assert!(uri.parse::<Uri>().is_ok(), "{uri} is not a valid URI");
    }

    #[test]
    fn endpoints_are_valid_uris() {
        assert_endpoint_is_valid_uri(endpoints::TRANSACTIONS_API);
        assert_endpoint_is_valid_uri(endpoints::TRANSACTION);
        assert_endpoint_is_valid_uri(endpoints::BUDGETS_API);
        assert_endpoint_is_valid_uri(endpoints::BUDGET);
        assert_endpoint_is_valid_uri(endpoints::BALANCE);
        assert_endpoint_is_valid_uri(endpoints::REPORTS);
        assert_endpoint_is_valid_uri(endpoints::BUDGET_REPORT);
    }

    #[test]
    fn produces_valid_uri() {
        let formatted_path = format_endpoint(endpoints::TRANSACTION, 1);

        assert_eq!(formatted_path, "/api/transactions/1");
        assert!(formatted_path.parse::<Uri>().is_ok());

        let formatted_path = format_endpoint(endpoints::BUDGET, "Food");

        assert_eq!(formatted_path, "/api/budgets/Food");
        assert!(formatted_path.parse::<Uri>().is_ok());
    }

    #[test]
    fn returns_original_path_with_no_parameter() {
        let formatted_path = format_endpoint("/hello/world", 1);

        assert_eq!(formatted_path, "/hello/world");
    }

    #[test]
    fn parameter_in_middle() {
        let formatted_path = format_endpoint("/hello/{world}/bye", 1);

        assert_eq!(formatted_path, "/hello/1/bye");
        assert!(formatted_path.parse::<Uri>().is_ok());
    }
}

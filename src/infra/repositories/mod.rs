//! Repository layer - Data access abstraction
//!
//! One repository per table. Each exposes a trait (mocked in unit tests)
//! and a SeaORM-backed `*Store` implementation.

mod customer_repository;
pub(crate) mod entities;
mod invoice_repository;
mod user_repository;

pub use customer_repository::{CustomerRepository, CustomerStore};
pub use invoice_repository::{InvoiceRepository, InvoiceStore, InvoiceTotals};
pub use user_repository::{UserRepository, UserStore};

#[cfg(test)]
pub use customer_repository::MockCustomerRepository;
#[cfg(test)]
pub use invoice_repository::MockInvoiceRepository;
#[cfg(test)]
pub use user_repository::MockUserRepository;

/// `ILIKE` pattern matching `query` anywhere, with wildcards in the query
/// itself escaped.
pub(crate) fn like_pattern(query: &str) -> String {
    let mut pattern = String::with_capacity(query.len() + 2);
    pattern.push('%');
    for c in query.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

#[cfg(test)]
mod tests {
    use super::like_pattern;

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern(""), "%%");
        assert_eq!(like_pattern("lee"), "%lee%");
        assert_eq!(like_pattern("50%_off"), "%50\\%\\_off%");
        assert_eq!(like_pattern("a\\b"), "%a\\\\b%");
    }
}

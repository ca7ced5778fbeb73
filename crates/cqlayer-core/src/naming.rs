//! Field/column naming conventions.
//!
//! The store names columns in `snake_case`; the application names fields in
//! `camelCase`. Every comparison between a field and a column goes through
//! [`Naming::normalize`] first.

use convert_case::{Case, Casing};

///
/// Naming
///
/// Bidirectional name-case conversion.
/// `normalize` must be pure and idempotent:
/// `normalize(normalize(x)) == normalize(x)`.
///

pub trait Naming: Send + Sync {
    /// Map an application name onto the store's column convention.
    fn normalize(&self, name: &str) -> String;

    /// Map a column name back onto the application convention.
    fn denormalize(&self, column: &str) -> String;
}

///
/// SnakeCaseNaming
///

#[derive(Clone, Copy, Debug, Default)]
pub struct SnakeCaseNaming;

impl Naming for SnakeCaseNaming {
    /// Every uppercase letter after the first character starts a new
    /// word. Digits and existing underscores never split a word, so
    /// `address2` and `user_id2` stay intact.
    fn normalize(&self, name: &str) -> String {
        let mut out = String::with_capacity(name.len() + 4);
        for (i, ch) in name.chars().enumerate() {
            if ch.is_uppercase() {
                if i != 0 {
                    out.push('_');
                }
                out.extend(ch.to_lowercase());
            } else {
                out.push(ch);
            }
        }

        out
    }

    fn denormalize(&self, column: &str) -> String {
        column.to_case(Case::Camel)
    }
}

///
/// IdentityNaming
///
/// Leaves names untouched; for stores whose columns already follow the
/// application convention.
///

#[derive(Clone, Copy, Debug, Default)]
pub struct IdentityNaming;

impl Naming for IdentityNaming {
    fn normalize(&self, name: &str) -> String {
        name.to_string()
    }

    fn denormalize(&self, column: &str) -> String {
        column.to_string()
    }
}

///
/// TESTS
///
